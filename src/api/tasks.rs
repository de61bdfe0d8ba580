//! CRUD endpoints for the task resource.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::{NewTask, Task, TaskPatch};

use super::error::ApiError;
use super::routes::AppState;

/// Response for DELETE, carrying the removed record's snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub task: Task,
}

/// Request body for PATCH /api/tasks/bulk-update.
#[derive(Debug, Serialize, Deserialize)]
pub struct BulkUpdateRequest {
    pub tasks: Vec<BulkTaskUpdate>,
}

/// One entry in a bulk update: a task id plus the fields to merge.
#[derive(Debug, Serialize, Deserialize)]
pub struct BulkTaskUpdate {
    pub id: Uuid,
    #[serde(flatten)]
    pub patch: TaskPatch,
}

/// Per-entry outcome of a bulk update. Entries are independent; a
/// failed entry never rolls back the others.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BulkUpdateEntry {
    Updated(Task),
    Failed { id: Uuid, error: String },
}

/// GET /api/tasks - all tasks, newest-created first.
pub async fn list_tasks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.store.list().await?;
    Ok(Json(tasks))
}

/// POST /api/tasks - create a task.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = state.store.create(new).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/tasks/:id - merge a partial or full payload into a task.
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    let task = state.store.update(id, &patch).await?;
    Ok(Json(task))
}

/// DELETE /api/tasks/:id - remove a task permanently.
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let task = state.store.delete(id).await?;
    Ok(Json(DeleteResponse {
        message: "Task deleted successfully".to_string(),
        task,
    }))
}

/// PATCH /api/tasks/bulk-update - apply independent per-task updates.
///
/// There is no batch atomicity: each entry succeeds or fails on its
/// own, and the response mirrors the request order.
pub async fn bulk_update_tasks(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BulkUpdateRequest>,
) -> Result<Json<Vec<BulkUpdateEntry>>, ApiError> {
    let mut results = Vec::with_capacity(req.tasks.len());
    for entry in &req.tasks {
        match state.store.update(entry.id, &entry.patch).await {
            Ok(task) => results.push(BulkUpdateEntry::Updated(task)),
            Err(err) => {
                tracing::warn!(task_id = %entry.id, error = %err, "Bulk update entry failed");
                results.push(BulkUpdateEntry::Failed {
                    id: entry.id,
                    error: err.to_string(),
                });
            }
        }
    }
    Ok(Json(results))
}
