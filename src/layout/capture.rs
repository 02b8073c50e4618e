//! Snapshot capture: live windows → `WindowState` records.

use crate::db::models::WindowState;
use crate::error::AutomationError;
use crate::window_system::{decode_records, WindowSystem};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// What a capture produced. A failed enumeration is not an error: it yields
/// no states and carries the cause in `warning`.
#[derive(Debug, Default)]
pub struct CaptureReport {
    pub states: Vec<WindowState>,
    /// Records dropped by the decoder.
    pub skipped: usize,
    pub warning: Option<AutomationError>,
}

impl CaptureReport {
    pub fn failed(warning: AutomationError) -> Self {
        Self {
            warning: Some(warning),
            ..Self::default()
        }
    }
}

/// One state per enumerated window, in enumeration order.
pub fn capture(window_system: &dyn WindowSystem) -> CaptureReport {
    let listing = match window_system.enumerate_windows() {
        Ok(listing) => listing,
        Err(err) => {
            log_warn!("Window enumeration failed, capturing nothing: {err}");
            return CaptureReport::failed(err);
        }
    };

    let (states, skipped) = decode_records(&listing);
    log_info!(
        "Captured {} windows ({} malformed records skipped)",
        states.len(),
        skipped
    );

    CaptureReport {
        states,
        skipped,
        warning: None,
    }
}
