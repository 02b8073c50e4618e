use anyhow::{ensure, Context, Result};
use log::info;
use rusqlite::Connection;

/// Schema scripts by the `user_version` they bring the store to.
const MIGRATIONS: &[(i32, &str)] = &[
    (1, include_str!("schemas/schema_v1.sql")),
    (2, include_str!("schemas/schema_v2.sql")),
];

pub const SCHEMA_VERSION: i32 = MIGRATIONS[MIGRATIONS.len() - 1].0;

/// Bring the store up to `SCHEMA_VERSION`. Pending scripts run in a single
/// transaction, so a failed upgrade leaves the previous schema in place.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let found: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read schema version")?;
    ensure!(
        found <= SCHEMA_VERSION,
        "profile store schema v{found} is newer than supported schema v{SCHEMA_VERSION}"
    );

    let pending: Vec<&(i32, &str)> = MIGRATIONS
        .iter()
        .filter(|(version, _)| *version > found)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .context("failed to open migration transaction")?;
    for (version, script) in pending {
        tx.execute_batch(script)
            .with_context(|| format!("failed to apply schema v{version}"))?;
        info!("Profile store upgraded to schema v{version}");
    }
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)
        .context("failed to record schema version")?;
    tx.commit().context("failed to commit migrations")
}
