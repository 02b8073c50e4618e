use std::{sync::Arc, time::Duration};

use tokio::task;

use super::{
    capture::{capture, CaptureReport},
    restore::{restore, RestoreSummary},
    status::StatusBoard,
};
use crate::db::{
    models::{validate_profile_name, ProfileSummary, WindowState},
    Database,
};
use crate::error::{AutomationError, Result};
use crate::window_system::WindowSystem;
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

pub const DEFAULT_STATUS_CLEAR_DELAY: Duration = Duration::from_secs(3);

/// Save, load, list and delete layout profiles.
///
/// Every call names its profile explicitly; the manager keeps no notion of a
/// selected profile. Window-system work runs on Tokio's blocking pool.
#[derive(Clone)]
pub struct ProfileManager {
    db: Database,
    window_system: Arc<dyn WindowSystem>,
    status: StatusBoard,
    status_clear_delay: Duration,
}

impl ProfileManager {
    pub fn new(db: Database, window_system: Arc<dyn WindowSystem>) -> Self {
        Self {
            db,
            window_system,
            status: StatusBoard::new(),
            status_clear_delay: DEFAULT_STATUS_CLEAR_DELAY,
        }
    }

    pub fn with_status_clear_delay(mut self, delay: Duration) -> Self {
        self.status_clear_delay = delay;
        self
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// Capture the live layout and store it under `profile_name`, replacing
    /// whatever the profile held. Returns how many windows were saved.
    pub async fn save_current_layout(&self, profile_name: &str) -> Result<usize> {
        validate_profile_name(profile_name)?;

        self.status.post("Saving window states...");
        let report = self.capture_blocking().await;
        if let Some(warning) = &report.warning {
            self.status
                .post(format!("Could not read window positions: {warning}"));
        }

        let saved = report.states.len();
        self.db.replace_states(profile_name, report.states).await?;

        log_info!("Saved {saved} window states to profile '{profile_name}'");
        if report.warning.is_none() {
            self.status
                .post(format!("Saved {saved} window states to profile '{profile_name}'"));
        }
        Ok(saved)
    }

    /// Re-apply a stored layout. Individual windows that can't be restored
    /// are reported in the summary rather than failing the call.
    pub async fn load_and_apply(&self, profile_name: &str) -> Result<RestoreSummary> {
        validate_profile_name(profile_name)?;

        let states = self.db.get_states(profile_name).await?;
        if states.is_empty() {
            self.status.post_transient(
                format!("No window states found for profile '{profile_name}'"),
                self.status_clear_delay,
            );
            return Ok(RestoreSummary::default());
        }

        self.status.post("Restoring window states...");
        let summary = self.restore_blocking(states).await?;

        if summary.failed() > 0 {
            log_warn!(
                "Profile '{profile_name}': {} of {} windows could not be restored",
                summary.failed(),
                summary.attempted
            );
        }
        self.status.post_transient(
            format!(
                "Restored {} of {} window states from profile '{profile_name}'",
                summary.restored, summary.attempted
            ),
            self.status_clear_delay,
        );
        Ok(summary)
    }

    pub async fn list_profiles(&self) -> Result<Vec<String>> {
        self.db.list_profiles().await
    }

    pub async fn profile_summaries(&self) -> Result<Vec<ProfileSummary>> {
        self.db.profile_summaries().await
    }

    /// Stored states for preview, without touching any windows.
    pub async fn profile_states(&self, profile_name: &str) -> Result<Vec<WindowState>> {
        validate_profile_name(profile_name)?;
        self.db.get_states(profile_name).await
    }

    pub async fn remove_profile(&self, profile_name: &str) -> Result<()> {
        validate_profile_name(profile_name)?;
        self.db.delete_profile(profile_name).await?;

        log_info!("Deleted profile '{profile_name}'");
        self.status.post(format!("Deleted profile '{profile_name}'"));
        Ok(())
    }

    async fn capture_blocking(&self) -> CaptureReport {
        let window_system = Arc::clone(&self.window_system);
        match task::spawn_blocking(move || capture(window_system.as_ref())).await {
            Ok(report) => report,
            Err(err) => {
                log_warn!("Capture worker failed: {err}");
                CaptureReport::failed(AutomationError::Worker(err.to_string()))
            }
        }
    }

    async fn restore_blocking(&self, states: Vec<WindowState>) -> Result<RestoreSummary> {
        let window_system = Arc::clone(&self.window_system);
        let summary = task::spawn_blocking(move || restore(window_system.as_ref(), &states))
            .await
            .map_err(|err| AutomationError::Worker(err.to_string()))?;
        Ok(summary)
    }
}
