//! Task data-access contract and its SQLite implementation.
//!
//! # Responsibility
//! - Persist task rows in the `tasks` table.
//! - Publish a live query over the full table.
//!
//! # Invariants
//! - Every statement runs on the blocking pool; async callers never block.
//! - A snapshot is emitted once per subscription start and after every
//!   effective change. Deleting a missing row is not a change.
//! - Snapshots are ordered by ascending `id`.

use crate::db::{open_db, open_db_in_memory};
use crate::model::task::{reserve_task_ids_through, TaskId};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use log::{debug, warn};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub type StoreResult<T> = Result<T, StoreError>;

/// Live, restartable query over every task row.
pub type TaskRecordStream = BoxStream<'static, StoreResult<Vec<TaskRecord>>>;

/// Error raised by task persistence and observation.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// The database file was written by a newer schema than this build knows.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Insert hit an existing primary key.
    Conflict(TaskId),
    /// Update targeted a row that does not exist.
    NotFound(TaskId),
    InvalidData(String),
    /// Blocking worker panicked or the connection lock was poisoned.
    Worker(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "task database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Conflict(id) => write!(f, "task already exists: {id}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::Worker(message) => write!(f, "task store worker failure: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::Conflict(_)
            | Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::Worker(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Row shape of the `tasks` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: TaskId,
    pub task: String,
    pub selected: bool,
}

/// Data-access interface over task rows.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns a lazy stream: current snapshot first, then one snapshot per
    /// change. Each call starts an independent subscription.
    fn observe_all(&self) -> TaskRecordStream;

    /// Fails with `StoreError::Conflict` when `record.id` already exists.
    async fn insert(&self, record: TaskRecord) -> StoreResult<()>;

    /// Fails with `StoreError::NotFound` when `record.id` does not exist.
    async fn update(&self, record: TaskRecord) -> StoreResult<()>;

    /// Removing a missing id succeeds without side effects.
    async fn delete(&self, record: TaskRecord) -> StoreResult<()>;
}

/// SQLite-backed task store sharing one connection.
pub struct SqliteTaskStore {
    shared: Arc<Shared>,
}

struct Shared {
    conn: Mutex<Connection>,
    generation: watch::Sender<u64>,
}

impl SqliteTaskStore {
    /// Opens a file-backed store, creating and migrating the file if needed.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps an already migrated connection.
    ///
    /// Seeds the task id generator with the largest persisted id.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        let max_id: Option<TaskId> =
            conn.query_row("SELECT MAX(id) FROM tasks;", [], |row| row.get(0))?;
        if let Some(max_id) = max_id {
            reserve_task_ids_through(max_id);
        }

        let (generation, _) = watch::channel(0);
        Ok(Self {
            shared: Arc::new(Shared {
                conn: Mutex::new(conn),
                generation,
            }),
        })
    }

    async fn run<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        run_blocking(Arc::clone(&self.shared), op).await
    }

    fn notify_changed(&self) {
        self.shared
            .generation
            .send_modify(|generation| *generation = generation.wrapping_add(1));
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn observe_all(&self) -> TaskRecordStream {
        let shared = Arc::clone(&self.shared);
        let changes = shared.generation.subscribe();

        stream::unfold(
            (shared, changes, true),
            |(shared, mut changes, first)| async move {
                if !first && changes.changed().await.is_err() {
                    return None;
                }
                let generation = *changes.borrow_and_update();
                let snapshot = run_blocking(Arc::clone(&shared), select_all).await;
                if let Err(err) = &snapshot {
                    warn!("event=task_observe module=store status=error generation={generation} error={err}");
                }
                Some((snapshot, (shared, changes, false)))
            },
        )
        .boxed()
    }

    async fn insert(&self, record: TaskRecord) -> StoreResult<()> {
        let id = record.id;
        let result = self
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO tasks (id, task, selected) VALUES (?1, ?2, ?3);",
                    params![record.id, record.task, record.selected],
                )
                .map_err(|err| map_insert_error(err, id))?;
                Ok(())
            })
            .await;
        log_mutation("task_insert", id, &result);
        result?;

        self.notify_changed();
        Ok(())
    }

    async fn update(&self, record: TaskRecord) -> StoreResult<()> {
        let id = record.id;
        let result = self
            .run(move |conn| {
                let changed = conn.execute(
                    "UPDATE tasks SET task = ?1, selected = ?2 WHERE id = ?3;",
                    params![record.task, record.selected, record.id],
                )?;
                if changed == 0 {
                    return Err(StoreError::NotFound(id));
                }
                Ok(())
            })
            .await;
        log_mutation("task_update", id, &result);
        result?;

        self.notify_changed();
        Ok(())
    }

    async fn delete(&self, record: TaskRecord) -> StoreResult<()> {
        let id = record.id;
        let result = self
            .run(move |conn| Ok(conn.execute("DELETE FROM tasks WHERE id = ?1;", [id])?))
            .await
            .map(|changed| changed > 0);
        log_mutation("task_delete", id, &result);

        if result? {
            self.notify_changed();
        }
        Ok(())
    }
}

async fn run_blocking<T, F>(shared: Arc<Shared>, op: F) -> StoreResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let conn = shared
            .conn
            .lock()
            .map_err(|_| StoreError::Worker("connection lock poisoned".to_string()))?;
        op(&conn)
    })
    .await
    .map_err(|err| StoreError::Worker(err.to_string()))?
}

fn select_all(conn: &Connection) -> StoreResult<Vec<TaskRecord>> {
    let mut stmt = conn.prepare("SELECT id, task, selected FROM tasks ORDER BY id ASC;")?;
    let mut rows = stmt.query([])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(parse_record(row)?);
    }
    Ok(records)
}

fn parse_record(row: &Row<'_>) -> StoreResult<TaskRecord> {
    let selected = match row.get::<_, i64>("selected")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid selected value `{other}` in tasks.selected"
            )));
        }
    };

    Ok(TaskRecord {
        id: row.get("id")?,
        task: row.get("task")?,
        selected,
    })
}

fn map_insert_error(err: rusqlite::Error, id: TaskId) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            StoreError::Conflict(id)
        }
        other => other.into(),
    }
}

fn log_mutation<T>(event: &str, id: TaskId, result: &StoreResult<T>) {
    match result {
        Ok(_) => debug!("event={event} module=store status=ok task_id={id}"),
        Err(err) => warn!("event={event} module=store status=error task_id={id} error={err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_record, SqliteTaskStore, StoreError};
    use rusqlite::Connection;

    #[test]
    fn parse_record_rejects_out_of_range_flag() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn
            .query_row("SELECT 1 AS id, 'x' AS task, 3 AS selected;", [], |row| {
                Ok(parse_record(row))
            })
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(message) if message.contains("selected")));
    }

    #[test]
    fn from_connection_requires_migrated_schema() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(matches!(
            SqliteTaskStore::from_connection(conn),
            Err(StoreError::Sqlite(_))
        ));
    }
}
