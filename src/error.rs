//! Error types shared by the store, the window-system adapters and the
//! profile manager.

use std::io;

use thiserror::Error;

pub type Result<T, E = WisaError> = std::result::Result<T, E>;

/// Failure talking to the window system.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("application '{app}' is not running")]
    AppNotRunning { app: String },

    #[error("no window titled '{title}' for application '{app}'")]
    WindowNotFound { app: String, title: String },

    #[error("window automation was denied: {0}")]
    Denied(String),

    #[error("automation script failed: {0}")]
    ScriptFailed(String),

    #[error("failed to launch automation helper: {0}")]
    Spawn(#[source] io::Error),

    #[error("automation worker stopped: {0}")]
    Worker(String),
}

/// Errors surfaced by the public profile API.
#[derive(Debug, Error)]
pub enum WisaError {
    #[error("profile '{0}' not found")]
    NotFound(String),

    #[error("invalid profile name: {0}")]
    Validation(String),

    #[error("store error: {0:#}")]
    Store(anyhow::Error),

    #[error(transparent)]
    Automation(#[from] AutomationError),
}

impl WisaError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, WisaError::NotFound(_))
    }
}

// Store tasks run as `anyhow` closures on the DB thread; typed errors raised
// inside them are recovered here so callers can still match on them.
impl From<anyhow::Error> for WisaError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<WisaError>() {
            Ok(typed) => typed,
            Err(other) => WisaError::Store(other),
        }
    }
}
