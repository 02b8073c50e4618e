use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

const DB_PATH_ENV: &str = "WISA_DB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where profiles are stored. `None` means the platform data directory.
    pub database_path: Option<PathBuf>,
    /// How long restore status lines stay up.
    pub status_clear_secs: u64,
    pub osascript_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: None,
            status_clear_secs: 3,
            osascript_path: "osascript".into(),
        }
    }
}

impl Settings {
    pub fn status_clear_delay(&self) -> Duration {
        Duration::from_secs(self.status_clear_secs)
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: Settings,
}

impl SettingsStore {
    /// `<config dir>/wisa/settings.json`.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("could not determine config directory"))?;
        Ok(config_dir.join("wisa").join("settings.json"))
    }

    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Ignoring unreadable settings in {}: {err}",
                    path.display()
                );
                Settings::default()
            })
        } else {
            Settings::default()
        };

        Ok(Self { path, data })
    }

    pub fn settings(&self) -> &Settings {
        &self.data
    }

    /// Write the current settings out if no file exists yet, so there is
    /// something to edit.
    pub fn persist_if_missing(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
        }
        self.persist()
    }

    /// `WISA_DB`, then the configured path, then the platform data directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(DB_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &self.data.database_path {
            return Ok(path.clone());
        }
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow!("could not determine data directory"))?;
        Ok(data_dir.join("wisa").join("wisa.sqlite3"))
    }

    fn persist(&self) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
