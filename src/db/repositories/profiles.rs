use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{
    helpers::{position_to_sql, saved_at_from_sql, window_count_from_sql},
    models::{ProfileSummary, WindowState},
    Database,
};
use crate::error::{Result as WisaResult, WisaError};

fn row_to_window_state(row: &Row<'_>) -> rusqlite::Result<WindowState> {
    Ok(WindowState {
        app_name: row.get("app_name")?,
        window_title: row.get("window_title")?,
        x: row.get("x")?,
        y: row.get("y")?,
        width: row.get("width")?,
        height: row.get("height")?,
    })
}

pub struct ProfileRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn find_id(&self, name: &str) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM profiles WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .context("failed to look up profile")
    }

    /// Like `find_id`, but an unknown name is a `WisaError::NotFound`.
    pub fn require_id(&self, name: &str) -> Result<i64> {
        match self.find_id(name)? {
            Some(id) => Ok(id),
            None => Err(WisaError::NotFound(name.to_string()).into()),
        }
    }

    pub fn list_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM profiles ORDER BY name ASC")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()
            .context("failed to list profiles")?;
        Ok(names)
    }

    pub fn summaries(&self) -> Result<Vec<ProfileSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.name, p.saved_at, COUNT(w.id)
             FROM profiles p
             LEFT JOIN window_states w ON w.profile_id = p.id
             GROUP BY p.id
             ORDER BY p.name ASC",
        )?;

        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(ProfileSummary {
                name: row.get(0)?,
                saved_at: saved_at_from_sql(row.get(1)?)?,
                window_count: window_count_from_sql(row.get(2)?)?,
            });
        }
        Ok(summaries)
    }

    pub fn states(&self, profile_id: i64) -> Result<Vec<WindowState>> {
        let mut stmt = self.conn.prepare(
            "SELECT app_name, window_title, x, y, width, height
             FROM window_states
             WHERE profile_id = ?1
             ORDER BY position ASC",
        )?;
        let states = stmt
            .query_map(params![profile_id], row_to_window_state)?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read window states")?;
        Ok(states)
    }

    /// Create the profile if needed and stamp it as saved at `now`.
    pub fn upsert(&self, name: &str, now: DateTime<Utc>) -> Result<i64> {
        let now = now.to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO profiles (name, created_at, saved_at)
                 VALUES (?1, ?2, ?2)
                 ON CONFLICT(name) DO UPDATE SET
                     saved_at = excluded.saved_at",
                params![name, now],
            )
            .context("failed to upsert profile")?;
        self.require_id(name)
    }

    pub fn clear_states(&self, profile_id: i64) -> Result<usize> {
        self.conn
            .execute(
                "DELETE FROM window_states WHERE profile_id = ?1",
                params![profile_id],
            )
            .context("failed to clear existing window states")
    }

    pub fn insert_states(&self, profile_id: i64, states: &[WindowState]) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO window_states
                 (profile_id, position, app_name, window_title, x, y, width, height)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;

        for (position, state) in states.iter().enumerate() {
            stmt.execute(params![
                profile_id,
                position_to_sql(position)?,
                state.app_name,
                state.window_title,
                state.x,
                state.y,
                state.width,
                state.height,
            ])
            .with_context(|| {
                format!(
                    "failed to insert window state for {} - {}",
                    state.app_name, state.window_title
                )
            })?;
        }
        Ok(())
    }

    pub fn delete(&self, profile_id: i64) -> Result<()> {
        self.clear_states(profile_id)?;
        self.conn
            .execute("DELETE FROM profiles WHERE id = ?1", params![profile_id])
            .context("failed to delete profile")?;
        Ok(())
    }
}

// Profile store operations. Each call is a single task on the DB thread, and
// the writes run inside one transaction.
impl Database {
    /// Profile names in lexicographic order.
    pub async fn list_profiles(&self) -> WisaResult<Vec<String>> {
        self.execute(|conn| ProfileRepository::new(conn).list_names())
            .await
            .map_err(WisaError::from)
    }

    pub async fn profile_summaries(&self) -> WisaResult<Vec<ProfileSummary>> {
        self.execute(|conn| ProfileRepository::new(conn).summaries())
            .await
            .map_err(WisaError::from)
    }

    /// Stored states in capture order.
    pub async fn get_states(&self, name: &str) -> WisaResult<Vec<WindowState>> {
        let name = name.to_string();
        self.execute(move |conn| {
            let repo = ProfileRepository::new(conn);
            let profile_id = repo.require_id(&name)?;
            repo.states(profile_id)
        })
        .await
        .map_err(WisaError::from)
    }

    /// Upsert the profile and swap its whole state list in one transaction.
    pub async fn replace_states(&self, name: &str, states: Vec<WindowState>) -> WisaResult<()> {
        let name = name.to_string();
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open replace transaction")?;
            {
                let repo = ProfileRepository::new(&tx);
                let profile_id = repo.upsert(&name, Utc::now())?;
                repo.clear_states(profile_id)?;
                repo.insert_states(profile_id, &states)?;
            }
            tx.commit().context("failed to commit window states")?;
            Ok(())
        })
        .await
        .map_err(WisaError::from)
    }

    pub async fn delete_profile(&self, name: &str) -> WisaResult<()> {
        let name = name.to_string();
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open delete transaction")?;
            {
                let repo = ProfileRepository::new(&tx);
                let profile_id = repo.require_id(&name)?;
                repo.delete(profile_id)?;
            }
            tx.commit().context("failed to commit profile deletion")?;
            Ok(())
        })
        .await
        .map_err(WisaError::from)
    }
}
