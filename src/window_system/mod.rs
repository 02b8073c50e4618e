//! Boundary to the operating system's window automation.
//!
//! The layout code only depends on [`WindowSystem`]. Concrete backends shell
//! out to whatever the platform offers and are injected at startup; tests use
//! an in-memory fake.

mod osascript;
mod record;

#[cfg(test)]
pub(crate) mod fake;

pub use osascript::OsaScriptWindowSystem;
pub use record::{decode_record, decode_records, RecordError};

use crate::db::models::GeometryRequest;
use crate::error::AutomationError;

/// Blocking window enumeration and placement.
///
/// Calls may spawn external processes and take hundreds of milliseconds, so
/// callers on an async runtime should run them on a blocking thread.
pub trait WindowSystem: Send + Sync {
    /// Every visible `(application, window)` pair as text records, one per
    /// line: `app,title,x,y,width,height`. Unreadable titles are empty.
    fn enumerate_windows(&self) -> Result<String, AutomationError>;

    /// Move and resize the first live window whose application and title
    /// match the request exactly.
    fn set_window_geometry(&self, request: &GeometryRequest<'_>) -> Result<(), AutomationError>;
}
