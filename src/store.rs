//! Task store backed by an embedded SQLite database.
//!
//! The store is the only owner of `id`, `createdAt`, and `updatedAt`.
//! Every write is durable before the call returns. There is no soft
//! delete: a task is either present or gone. Updates are per-record
//! last-write-wins; concurrent writers get no conflict detection.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::task::{NewTask, Priority, Task, TaskPatch};

/// Errors from the task store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task {0} not found")]
    NotFound(Uuid),
    #[error("title is required and must not be empty")]
    EmptyTitle,
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    priority    TEXT NOT NULL DEFAULT 'medium',
    completed   INTEGER NOT NULL DEFAULT 0,
    due_date    TEXT,
    ai_priority TEXT,
    ai_reason   TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
";

/// SQLite-backed task store. The connection is guarded by an async
/// mutex; each public method is one independent, durable operation.
pub struct TaskStore {
    conn: Mutex<Connection>,
}

impl TaskStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store. Used by tests and demos.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// List all tasks, newest-created first.
    pub async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, title, description, priority, completed, due_date,
                    ai_priority, ai_reason, created_at, updated_at
             FROM tasks ORDER BY created_at DESC, rowid DESC",
        )?;
        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    /// Fetch a single task by id.
    pub async fn get(&self, id: Uuid) -> Result<Task, StoreError> {
        let conn = self.conn.lock().await;
        fetch_task(&conn, id)
    }

    /// Create a task; the store assigns id and timestamps.
    pub async fn create(&self, new: NewTask) -> Result<Task, StoreError> {
        let title = new.title.trim().to_string();
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title,
            description: new.description,
            priority: new.priority,
            completed: new.completed,
            due_date: new.due_date,
            ai_priority: None,
            ai_reason: None,
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO tasks (id, title, description, priority, completed, due_date,
                                ai_priority, ai_reason, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                task.id.to_string(),
                task.title,
                task.description,
                task.priority.as_str(),
                task.completed,
                task.due_date.map(|d| d.to_string()),
                task.ai_priority.map(|p| p.as_str()),
                task.ai_reason,
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
            ],
        )?;

        tracing::debug!(task_id = %task.id, "Created task");
        Ok(task)
    }

    /// Merge a partial update into an existing task and persist it.
    /// `updatedAt` is bumped on every successful update.
    pub async fn update(&self, id: Uuid, patch: &TaskPatch) -> Result<Task, StoreError> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(StoreError::EmptyTitle);
            }
        }

        let conn = self.conn.lock().await;
        let mut task = fetch_task(&conn, id)?;
        patch.apply_to(&mut task);
        task.title = task.title.trim().to_string();
        task.updated_at = Utc::now();

        conn.execute(
            "UPDATE tasks
             SET title = ?2, description = ?3, priority = ?4, completed = ?5,
                 due_date = ?6, ai_priority = ?7, ai_reason = ?8, updated_at = ?9
             WHERE id = ?1",
            params![
                task.id.to_string(),
                task.title,
                task.description,
                task.priority.as_str(),
                task.completed,
                task.due_date.map(|d| d.to_string()),
                task.ai_priority.map(|p| p.as_str()),
                task.ai_reason,
                task.updated_at.to_rfc3339(),
            ],
        )?;

        tracing::debug!(task_id = %task.id, "Updated task");
        Ok(task)
    }

    /// Remove a task permanently, returning its final snapshot.
    pub async fn delete(&self, id: Uuid) -> Result<Task, StoreError> {
        let conn = self.conn.lock().await;
        let task = fetch_task(&conn, id)?;
        conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])?;
        tracing::debug!(task_id = %id, "Deleted task");
        Ok(task)
    }
}

fn fetch_task(conn: &Connection, id: Uuid) -> Result<Task, StoreError> {
    conn.query_row(
        "SELECT id, title, description, priority, completed, due_date,
                ai_priority, ai_reason, created_at, updated_at
         FROM tasks WHERE id = ?1",
        params![id.to_string()],
        task_from_row,
    )
    .optional()?
    .ok_or(StoreError::NotFound(id))
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let id: String = row.get(0)?;
    let priority: String = row.get(3)?;
    let due_date: Option<String> = row.get(5)?;
    let ai_priority: Option<String> = row.get(6)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;

    Ok(Task {
        id: id.parse().map_err(|e| column_error(0, e))?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority: priority.parse().map_err(|e| column_error(3, e))?,
        completed: row.get(4)?,
        due_date: due_date
            .map(|d| d.parse::<NaiveDate>())
            .transpose()
            .map_err(|e| column_error(5, e))?,
        ai_priority: ai_priority
            .map(|p| p.parse::<Priority>())
            .transpose()
            .map_err(|e| column_error(6, e))?,
        ai_reason: row.get(7)?,
        created_at: parse_timestamp(&created_at, 8)?,
        updated_at: parse_timestamp(&updated_at, 9)?,
    })
}

fn parse_timestamp(value: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| column_error(column, e))
}

fn column_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}
