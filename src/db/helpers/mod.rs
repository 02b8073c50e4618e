//! Conversions between SQLite column values and model fields.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

/// Capture-order index as stored in `window_states.position`.
pub fn position_to_sql(position: usize) -> Result<i64> {
    i64::try_from(position).map_err(|_| anyhow!("window position {position} is out of range"))
}

pub fn window_count_from_sql(count: i64) -> Result<usize> {
    usize::try_from(count).map_err(|_| anyhow!("negative window count {count}"))
}

/// `profiles.saved_at`, NULL for profiles written before schema v2.
pub fn saved_at_from_sql(raw: Option<String>) -> Result<Option<DateTime<Utc>>> {
    raw.map(|raw| {
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .with_context(|| format!("invalid saved_at timestamp {raw:?}"))
    })
    .transpose()
}
