//! HTTP client for the Task API.
//!
//! Thin wrappers over the CRUD endpoints. Failures to reach the
//! backend at all surface as a distinct "server unreachable" error so
//! callers never confuse them with API-level failures.

use uuid::Uuid;

use crate::api::{BulkTaskUpdate, BulkUpdateEntry, BulkUpdateRequest, DeleteResponse};
use crate::task::{NewTask, Task, TaskPatch};

/// Errors from the Task API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Unable to reach the backend API; make sure the server is running")]
    Unreachable(#[source] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("invalid response from backend: {0}")]
    InvalidResponse(String),
}

/// Client for the task CRUD endpoints.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// All tasks, newest-created first.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let response = self.execute(self.http.get(self.url("/tasks"))).await?;
        decode(response).await
    }

    /// Create a task; the server assigns id and timestamps.
    pub async fn create_task(&self, new: &NewTask) -> Result<Task, ClientError> {
        let response = self
            .execute(self.http.post(self.url("/tasks")).json(new))
            .await?;
        decode(response).await
    }

    /// Merge a partial update into a task.
    pub async fn update_task(&self, id: Uuid, patch: &TaskPatch) -> Result<Task, ClientError> {
        let response = self
            .execute(self.http.put(self.url(&format!("/tasks/{id}"))).json(patch))
            .await?;
        decode(response).await
    }

    /// Delete a task, returning its final snapshot.
    pub async fn delete_task(&self, id: Uuid) -> Result<Task, ClientError> {
        let response = self
            .execute(self.http.delete(self.url(&format!("/tasks/{id}"))))
            .await?;
        let deleted: DeleteResponse = decode(response).await?;
        Ok(deleted.task)
    }

    /// Apply independent per-task updates. The result mirrors the
    /// request order; entries fail individually, never as a batch.
    pub async fn bulk_update(
        &self,
        updates: Vec<BulkTaskUpdate>,
    ) -> Result<Vec<BulkUpdateEntry>, ClientError> {
        let request = BulkUpdateRequest { tasks: updates };
        let response = self
            .execute(
                self.http
                    .patch(self.url("/tasks/bulk-update"))
                    .json(&request),
            )
            .await?;
        decode(response).await
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let response = request.send().await.map_err(ClientError::Unreachable)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message: extract_error_message(&body, status.as_u16()),
        })
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    response
        .json()
        .await
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

/// Pull a human-readable message from a `{message, error}` payload.
fn extract_error_message(body: &str, status: u16) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("request failed with status {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_message_field() {
        assert_eq!(
            extract_error_message(r#"{"message":"Task not found"}"#, 404),
            "Task not found"
        );
        assert_eq!(
            extract_error_message(r#"{"error":"API key is required"}"#, 400),
            "API key is required"
        );
        assert_eq!(
            extract_error_message("<html>oops</html>", 502),
            "request failed with status 502"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:5000/api/");
        assert_eq!(client.url("/tasks"), "http://localhost:5000/api/tasks");
    }
}
