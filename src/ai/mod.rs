//! Client-side AI request orchestration.
//!
//! Invokes the backend AI proxy reliably despite a flaky or
//! cold-starting upstream model: bounded retry with backoff classified
//! by failure kind, then validation of the generated text into
//! structured results.

mod error;
mod orchestrator;
mod prompts;
mod proxy;

pub use error::{classify_response, AiError, AiErrorKind, RetryConfig, RetryDecision};
pub use orchestrator::{
    extract_json_object, AiOrchestrator, Prioritization, PriorityAssignment, ProductivityInsights,
    TaskSuggestion, NO_ACTIVE_TASKS,
};
pub use prompts::TaskSummary;
pub use proxy::{generate_with_retry, Generator, ProxyClient};
