//! Restore engine: stored `WindowState` records → live window geometry.
//!
//! Each record is applied on its own, in stored order. A record whose window
//! can't be found, or whose geometry request fails, is noted and skipped.
//! When several live windows share an app and title, the window system's
//! first match wins.

use crate::db::models::WindowState;
use crate::error::AutomationError;
use crate::window_system::WindowSystem;
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

#[derive(Debug)]
pub struct RestoreFailure {
    pub state: WindowState,
    pub error: AutomationError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The profile had no windows.
    NothingToRestore,
    Complete,
    /// At least one window could not be restored.
    Partial,
}

#[derive(Debug, Default)]
pub struct RestoreSummary {
    pub attempted: usize,
    pub restored: usize,
    pub failures: Vec<RestoreFailure>,
}

impl RestoreSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn outcome(&self) -> RestoreOutcome {
        if self.attempted == 0 {
            RestoreOutcome::NothingToRestore
        } else if self.failures.is_empty() {
            RestoreOutcome::Complete
        } else {
            RestoreOutcome::Partial
        }
    }
}

pub fn restore(window_system: &dyn WindowSystem, states: &[WindowState]) -> RestoreSummary {
    let mut summary = RestoreSummary {
        attempted: states.len(),
        ..RestoreSummary::default()
    };

    for state in states {
        match window_system.set_window_geometry(&state.target()) {
            Ok(()) => summary.restored += 1,
            Err(error) => {
                log_warn!(
                    "Error restoring window state for {} - {}: {error}",
                    state.app_name,
                    state.window_title
                );
                summary.failures.push(RestoreFailure {
                    state: state.clone(),
                    error,
                });
            }
        }
    }

    log_info!(
        "Restore finished: {} of {} windows applied",
        summary.restored,
        summary.attempted
    );
    summary
}
