//! Capture, restore and the profile workflow that ties them to the store.

pub mod capture;
mod manager;
pub mod restore;
mod status;

pub use capture::{capture, CaptureReport};
pub use manager::{ProfileManager, DEFAULT_STATUS_CLEAR_DELAY};
pub use restore::{restore, RestoreFailure, RestoreOutcome, RestoreSummary};
pub use status::{StatusBoard, StatusMessage};
