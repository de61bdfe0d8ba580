//! HTTP API: task CRUD endpoints and the AI proxy.

pub mod ai;
pub mod error;
pub mod routes;
pub mod tasks;

pub use ai::{GenerateRequest, GenerateResponse};
pub use error::ApiError;
pub use routes::{router, serve, AppState};
pub use tasks::{BulkTaskUpdate, BulkUpdateEntry, BulkUpdateRequest, DeleteResponse};
