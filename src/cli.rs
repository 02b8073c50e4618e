use std::{io::Write, path::PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::db::models::WindowState;
use crate::layout::{ProfileManager, RestoreOutcome};

#[derive(Parser, Debug)]
#[command(name = "wisa", version, about = "Save and restore window layouts")]
pub struct Cli {
    /// Settings file to use instead of the default location
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Capture every visible window into PROFILE, replacing its contents
    Save { profile: String },
    /// Move and resize live windows to match PROFILE
    Load { profile: String },
    /// List saved profiles
    List,
    /// Print the windows stored in PROFILE
    Show { profile: String },
    /// Delete PROFILE and everything stored in it
    Delete { profile: String },
}

pub async fn execute(manager: &ProfileManager, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Save { profile } => {
            let saved = manager.save_current_layout(&profile).await?;
            writeln!(out, "Saved {saved} window states to profile '{profile}'")?;
        }
        Command::Load { profile } => {
            let summary = manager.load_and_apply(&profile).await?;
            match summary.outcome() {
                RestoreOutcome::NothingToRestore => {
                    writeln!(out, "No window states found for profile '{profile}'")?;
                }
                RestoreOutcome::Complete => {
                    writeln!(
                        out,
                        "Restored {} window states from profile '{profile}'",
                        summary.restored
                    )?;
                }
                RestoreOutcome::Partial => {
                    writeln!(
                        out,
                        "Restored {} of {} window states from profile '{profile}'; {} could not be restored:",
                        summary.restored,
                        summary.attempted,
                        summary.failed()
                    )?;
                    for failure in &summary.failures {
                        writeln!(
                            out,
                            "  - {} - {}: {}",
                            failure.state.app_name, failure.state.window_title, failure.error
                        )?;
                    }
                }
            }
        }
        Command::List => {
            let summaries = manager.profile_summaries().await?;
            if summaries.is_empty() {
                writeln!(out, "No profiles saved yet")?;
            }
            for summary in summaries {
                let saved_at = summary
                    .saved_at
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".into());
                writeln!(
                    out,
                    "{}\t{} windows\tsaved {saved_at}",
                    summary.name, summary.window_count
                )?;
            }
        }
        Command::Show { profile } => {
            let states = manager.profile_states(&profile).await?;
            write!(out, "{}", format_states(&states))?;
        }
        Command::Delete { profile } => {
            manager.remove_profile(&profile).await?;
            writeln!(out, "Deleted profile '{profile}'")?;
        }
    }
    Ok(())
}

pub fn format_states(states: &[WindowState]) -> String {
    if states.is_empty() {
        return "No window states found for this profile\n".into();
    }

    let mut text = format!("Profile has {} window states:\n\n", states.len());
    for (i, state) in states.iter().enumerate() {
        text.push_str(&format!(
            "{}. {} - {}\n   Position: ({:.0}, {:.0}) Size: {:.0} x {:.0}\n\n",
            i + 1,
            state.app_name,
            state.window_title,
            state.x,
            state.y,
            state.width,
            state.height
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::Database;
    use crate::window_system::fake::FakeWindowSystem;

    fn manager(live: Vec<WindowState>) -> (ProfileManager, Database) {
        let db = Database::in_memory().unwrap();
        let ws = Arc::new(FakeWindowSystem::new(live));
        (ProfileManager::new(db.clone(), ws), db)
    }

    async fn run(manager: &ProfileManager, command: Command) -> String {
        let mut out = Vec::new();
        execute(manager, command, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["wisa", "-v", "save", "work"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Save { ref profile } if profile == "work"));
        assert!(Cli::try_parse_from(["wisa", "load"]).is_err());
    }

    #[test]
    fn formats_states_like_the_listing() {
        let text = format_states(&[WindowState::new("Mail", "Inbox", 0.0, 25.4, 800.0, 600.0)]);
        assert_eq!(
            text,
            "Profile has 1 window states:\n\n1. Mail - Inbox\n   Position: (0, 25) Size: 800 x 600\n\n"
        );
        assert_eq!(format_states(&[]), "No window states found for this profile\n");
    }

    #[tokio::test]
    async fn save_list_show_load_delete() {
        let (manager, _db) = manager(vec![WindowState::new(
            "Terminal", "bash", 800.0, 0.0, 400.0, 300.0,
        )]);

        let saved = run(&manager, Command::Save { profile: "work".into() }).await;
        assert_eq!(saved, "Saved 1 window states to profile 'work'\n");

        let listed = run(&manager, Command::List).await;
        assert!(listed.starts_with("work\t1 windows\tsaved "));

        let shown = run(&manager, Command::Show { profile: "work".into() }).await;
        assert!(shown.contains("1. Terminal - bash"));

        let loaded = run(&manager, Command::Load { profile: "work".into() }).await;
        assert_eq!(loaded, "Restored 1 window states from profile 'work'\n");

        let deleted = run(&manager, Command::Delete { profile: "work".into() }).await;
        assert_eq!(deleted, "Deleted profile 'work'\n");
        assert_eq!(run(&manager, Command::List).await, "No profiles saved yet\n");
    }

    #[tokio::test]
    async fn partial_load_lists_failures() {
        let (manager, db) = manager(vec![WindowState::new("Mail", "Inbox", 0.0, 0.0, 10.0, 10.0)]);
        // "Gone" is stored but not on screen.
        db.replace_states(
            "work",
            vec![
                WindowState::new("Mail", "Inbox", 0.0, 0.0, 10.0, 10.0),
                WindowState::new("Mail", "Gone", 0.0, 0.0, 10.0, 10.0),
            ],
        )
        .await
        .unwrap();

        let loaded = run(&manager, Command::Load { profile: "work".into() }).await;
        assert!(loaded.starts_with("Restored 1 of 2 window states from profile 'work'; 1 could not"));
        assert!(loaded.contains("  - Mail - Gone: no window titled 'Gone'"));
    }
}
