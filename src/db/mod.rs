use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{debug, error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use models::{ProfileSummary, WindowState};

type StoreTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

/// Thread owning the SQLite connection, fed through a task queue.
///
/// Dropping the worker closes the queue, which ends the thread's loop once
/// queued tasks are done, and then joins the thread.
struct StoreWorker {
    queue: Option<mpsc::Sender<StoreTask>>,
    thread: Option<JoinHandle<()>>,
}

impl StoreWorker {
    fn start<F>(open: F) -> Result<Self>
    where
        F: FnOnce() -> Result<Connection> + Send + 'static,
    {
        let (queue, tasks) = mpsc::channel::<StoreTask>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();

        let thread = thread::Builder::new()
            .name("wisa-db".into())
            .spawn(move || {
                let opened = open().and_then(|mut conn| {
                    prepare_connection(&mut conn)?;
                    Ok(conn)
                });
                let mut conn = match opened {
                    Ok(conn) => {
                        let _ = ready_tx.send(Ok(()));
                        conn
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };

                for task in tasks {
                    task(&mut conn);
                }
                info!("Profile store thread stopped");
            })
            .context("failed to start profile store thread")?;

        ready_rx
            .recv()
            .context("profile store thread exited during startup")??;

        Ok(Self {
            queue: Some(queue),
            thread: Some(thread),
        })
    }

    fn submit(&self, task: StoreTask) -> Result<()> {
        let queue = self
            .queue
            .as_ref()
            .ok_or_else(|| anyhow!("profile store is closed"))?;
        queue
            .send(task)
            .map_err(|_| anyhow!("profile store thread has stopped"))
    }
}

impl Drop for StoreWorker {
    fn drop(&mut self) {
        drop(self.queue.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Profile store thread panicked");
            }
        }
    }
}

/// WAL where the backend allows it, enforced foreign keys, current schema.
fn prepare_connection(conn: &mut Connection) -> Result<()> {
    let journal: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .context("failed to set journal mode")?;
    if !journal.eq_ignore_ascii_case("wal") {
        debug!("Profile store journal mode is {journal}");
    }

    // Profile deletion relies on the cascade.
    conn.pragma_update(None, "foreign_keys", true)
        .context("failed to enable foreign keys")?;

    migrations::run_migrations(conn)
}

/// Handle to the profile store.
///
/// One worker thread owns the SQLite connection and runs every task to
/// completion before picking up the next, so writes never interleave and a
/// reader can't see a profile halfway through a replace.
#[derive(Clone)]
pub struct Database {
    worker: Arc<StoreWorker>,
    path: Option<Arc<Path>>,
}

impl Database {
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let target = path.clone();
        let worker = StoreWorker::start(move || {
            Connection::open(&target).with_context(|| {
                format!("failed to open profile store at {}", target.display())
            })
        })?;
        info!("Profile store opened at {}", path.display());

        Ok(Self {
            worker: Arc::new(worker),
            path: Some(Arc::from(path)),
        })
    }

    /// Private, non-persistent store. Contents vanish with the last handle.
    pub fn in_memory() -> Result<Self> {
        let worker = StoreWorker::start(|| {
            Connection::open_in_memory().context("failed to open in-memory profile store")
        })?;
        Ok(Self {
            worker: Arc::new(worker),
            path: None,
        })
    }

    /// `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `task` on the store thread and wait for its result.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.worker.submit(Box::new(move |conn| {
            // A caller that stopped waiting gets nothing.
            let _ = reply_tx.send(task(conn));
        }))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("profile store thread dropped the request"))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_backed_store_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("wisa.sqlite3");

        let db = Database::new(path.clone()).unwrap();
        assert_eq!(db.path(), Some(path.as_path()));
        assert!(path.exists());

        let fk: i64 = db
            .execute(|conn| Ok(conn.pragma_query_value(None, "foreign_keys", |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn unopenable_path_fails_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        // A directory can't be opened as a database file.
        assert!(Database::new(dir.path().to_path_buf()).is_err());
    }

    #[tokio::test]
    async fn clones_share_one_store_until_the_last_is_dropped() {
        let db = Database::in_memory().unwrap();
        let clone = db.clone();
        clone
            .execute(|conn| Ok(conn.execute_batch("CREATE TABLE scratch (n INTEGER)")?))
            .await
            .unwrap();
        drop(clone);

        let tables: i64 = db
            .execute(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE name = 'scratch'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[tokio::test]
    async fn task_errors_are_returned_to_caller() {
        let db = Database::in_memory().unwrap();
        assert!(db.path().is_none());

        let err = db
            .execute(|_conn| -> Result<()> { Err(anyhow!("boom")) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
