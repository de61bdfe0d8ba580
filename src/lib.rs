//! # Taskdeck
//!
//! An AI-assisted personal task manager.
//!
//! This library provides:
//! - An HTTP API for task CRUD plus an AI proxy endpoint
//! - A SQLite-backed task store
//! - A client state layer: API access, local settings, derived views
//! - AI request orchestration with classified retry and backoff
//!
//! ## Architecture
//!
//! ```text
//!   Presentation (out of scope)
//!            │
//!            ▼
//!   Client state layer ──► Task API ──► Task store (SQLite)
//!            │
//!            └──────────► AI proxy ──► generative-language API
//! ```
//!
//! The proxy exists so the browser never holds the vendor key or
//! fights cross-origin restrictions; retry logic lives client-side in
//! the `ai` module.
//!
//! ## Modules
//! - `api`: axum routes for tasks and the AI proxy
//! - `store`: persistence for task records
//! - `client`: task API client, settings, derived views
//! - `ai`: retrying orchestration of generation requests

pub mod ai;
pub mod api;
pub mod client;
pub mod config;
pub mod store;
pub mod task;

pub use config::Config;
pub use task::{NewTask, Priority, Task, TaskPatch};
