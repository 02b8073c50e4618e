pub mod cli;
pub mod db;
pub mod error;
pub mod layout;
pub mod settings;
pub mod utils;
pub mod window_system;

use std::sync::Arc;

use clap::Parser;
use log::warn;

pub use db::{Database, WindowState};
pub use error::{AutomationError, WisaError};
pub use layout::{ProfileManager, RestoreOutcome, RestoreSummary};
pub use window_system::{OsaScriptWindowSystem, WindowSystem};

use cli::Cli;
use settings::SettingsStore;

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    utils::logging::init(cli.verbose || utils::logging::debug_requested());
    log::info!("Wisa starting up...");

    let settings_path = match cli.settings {
        Some(path) => path,
        None => SettingsStore::default_path()?,
    };
    let settings = SettingsStore::new(settings_path)?;
    if let Err(err) = settings.persist_if_missing() {
        warn!("Could not write default settings: {err:#}");
    }

    let database = Database::new(settings.database_path()?)?;
    let backend = Arc::new(OsaScriptWindowSystem::new(
        settings.settings().osascript_path.clone(),
    ));
    let manager = ProfileManager::new(database, backend)
        .with_status_clear_delay(settings.settings().status_clear_delay());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(cli::execute(&manager, cli.command, &mut std::io::stdout()))
}
