//! AI use cases: prioritization, productivity insights, and task
//! suggestions.
//!
//! Each call goes through the retrying generator, then extracts and
//! validates the first JSON object in the generated text. Shapes that
//! fail validation are rejected as malformed, never coerced.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::settings::SettingsStore;
use crate::client::views::{self, PriorityDistribution, TaskStatistics};
use crate::task::{Priority, Task};

use super::error::{AiError, RetryConfig};
use super::prompts::{self, TaskSummary};
use super::proxy::{generate_with_retry, Generator, ProxyClient};

/// Token budget for the list-sized prompts.
const DEFAULT_MAX_TOKENS: u32 = 2000;
/// Smaller budget for single-task suggestions.
const SUGGESTION_MAX_TOKENS: u32 = 1000;

/// Message returned when there is nothing to prioritize.
pub const NO_ACTIVE_TASKS: &str = "No active tasks to prioritize";

/// A per-task priority suggestion from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityAssignment {
    pub id: Uuid,
    pub priority: Priority,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
struct PrioritizationReply {
    priorities: Vec<PriorityAssignment>,
    summary: String,
}

/// Result of a prioritization run: the full task list with AI
/// priorities merged onto matched incomplete tasks.
#[derive(Debug, Clone)]
pub struct Prioritization {
    pub tasks: Vec<Task>,
    pub reasoning: String,
    pub details: Vec<PriorityAssignment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsightsReply {
    completion_analysis: String,
    recommendations: Vec<String>,
    focus_areas: Vec<String>,
    #[serde(default)]
    motivational_tip: Option<String>,
}

/// Productivity insights with the statistics they were computed from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityInsights {
    pub completion_analysis: String,
    pub recommendations: Vec<String>,
    pub focus_areas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motivational_tip: Option<String>,
    pub statistics: TaskStatistics,
}

/// Pre-fill material for a task-creation form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSuggestion {
    pub description: String,
    #[serde(default)]
    pub subtasks: Vec<String>,
    pub suggested_priority: Priority,
}

/// Orchestrates AI requests for the client state layer.
pub struct AiOrchestrator<G> {
    generator: G,
    retry: RetryConfig,
}

impl AiOrchestrator<ProxyClient> {
    /// Orchestrator talking to the backend proxy at `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_generator(ProxyClient::new(base_url, api_key))
    }

    /// Build from the settings store; fails if no API key is stored.
    pub async fn from_settings(
        base_url: impl Into<String>,
        settings: &SettingsStore,
    ) -> Result<Self, AiError> {
        let api_key = settings.api_key().await.ok_or_else(AiError::missing_key)?;
        Ok(Self::new(base_url, api_key))
    }
}

impl<G: Generator> AiOrchestrator<G> {
    pub fn with_generator(generator: G) -> Self {
        Self {
            generator,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Ask the model to re-rank the incomplete tasks.
    ///
    /// Completed tasks pass through untouched, as do tasks the model
    /// does not mention. With no incomplete tasks this short-circuits
    /// without any AI call.
    pub async fn prioritize(&self, tasks: &[Task]) -> Result<Prioritization, AiError> {
        let summaries: Vec<TaskSummary> = tasks
            .iter()
            .filter(|t| !t.completed)
            .map(TaskSummary::from)
            .collect();

        if summaries.is_empty() {
            return Ok(Prioritization {
                tasks: tasks.to_vec(),
                reasoning: NO_ACTIVE_TASKS.to_string(),
                details: Vec::new(),
            });
        }

        let prompt = prompts::prioritization(&summaries);
        let text =
            generate_with_retry(&self.generator, &prompt, DEFAULT_MAX_TOKENS, &self.retry).await?;
        let reply: PrioritizationReply = parse_reply(&text)?;

        let merged = tasks
            .iter()
            .cloned()
            .map(|mut task| {
                if !task.completed {
                    if let Some(assignment) = reply.priorities.iter().find(|p| p.id == task.id) {
                        task.ai_priority = Some(assignment.priority);
                        task.ai_reason = Some(assignment.reason.clone());
                    }
                }
                task
            })
            .collect();

        Ok(Prioritization {
            tasks: merged,
            reasoning: reply.summary,
            details: reply.priorities,
        })
    }

    /// Ask the model for productivity insights over the current list.
    /// The computed statistics ride along in the result.
    pub async fn insights(
        &self,
        tasks: &[Task],
        today: NaiveDate,
    ) -> Result<ProductivityInsights, AiError> {
        let statistics = views::task_statistics(tasks, today);
        let distribution: PriorityDistribution = views::priority_distribution(tasks);

        let prompt = prompts::insights(&statistics, &distribution);
        let text =
            generate_with_retry(&self.generator, &prompt, DEFAULT_MAX_TOKENS, &self.retry).await?;
        let reply: InsightsReply = parse_reply(&text)?;

        Ok(ProductivityInsights {
            completion_analysis: reply.completion_analysis,
            recommendations: reply.recommendations,
            focus_areas: reply.focus_areas,
            motivational_tip: reply.motivational_tip,
            statistics,
        })
    }

    /// Ask the model to flesh out a task from its title alone.
    pub async fn suggest(&self, task_title: &str) -> Result<TaskSuggestion, AiError> {
        let prompt = prompts::suggestions(task_title);
        let text =
            generate_with_retry(&self.generator, &prompt, SUGGESTION_MAX_TOKENS, &self.retry)
                .await?;
        parse_reply(&text)
    }
}

/// Extract the first JSON object substring from generated text. The
/// model is prompted to emit bare JSON but may wrap it in prose.
pub fn extract_json_object(text: &str) -> Result<&str, AiError> {
    static JSON_OBJECT: OnceLock<Regex> = OnceLock::new();
    let re = JSON_OBJECT.get_or_init(|| {
        Regex::new(r"(?s)\{.*\}").expect("static pattern compiles")
    });
    re.find(text)
        .map(|m| m.as_str())
        .ok_or_else(|| AiError::malformed("Invalid AI response format: no JSON object found"))
}

fn parse_reply<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, AiError> {
    let json = extract_json_object(text)?;
    serde_json::from_str(json)
        .map_err(|e| AiError::malformed(format!("Invalid AI response format: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::error::AiErrorKind;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedGenerator {
        reply: String,
        calls: AtomicUsize,
    }

    impl FixedGenerator {
        fn new(reply: impl Into<String>) -> Self {
            Self {
                reply: reply.into(),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Generator for FixedGenerator {
        async fn generate_once(&self, _prompt: &str, _max_tokens: u32) -> Result<String, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn task(title: &str, completed: bool) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            priority: Priority::Medium,
            completed,
            due_date: None,
            ai_priority: None,
            ai_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn extracts_json_surrounded_by_prose() {
        let text = "Sure! Here is the plan:\n{\"summary\": \"do it\"}\nHope that helps.";
        assert_eq!(extract_json_object(text).unwrap(), "{\"summary\": \"do it\"}");
    }

    #[test]
    fn no_json_object_is_a_malformed_response() {
        let err = extract_json_object("I cannot help with that.").unwrap_err();
        assert_eq!(err.kind, AiErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn prioritize_short_circuits_with_no_active_tasks() {
        let generator = FixedGenerator::new("should never be called");
        let orchestrator = AiOrchestrator::with_generator(generator);

        let tasks = vec![task("done a", true), task("done b", true)];
        let result = orchestrator.prioritize(&tasks).await.unwrap();

        assert_eq!(result.reasoning, NO_ACTIVE_TASKS);
        assert_eq!(result.tasks.len(), 2);
        assert!(result.details.is_empty());
        assert_eq!(orchestrator.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn prioritize_merges_onto_matched_incomplete_tasks() {
        let active = task("write report", false);
        let completed = task("old chore", true);
        let unmatched = task("walk dog", false);

        let reply = format!(
            r#"Here you go: {{"priorities":[{{"id":"{}","priority":"urgent","reason":"due soon"}}],"summary":"deadline first"}}"#,
            active.id
        );
        let orchestrator = AiOrchestrator::with_generator(FixedGenerator::new(reply));

        let tasks = vec![active.clone(), completed.clone(), unmatched.clone()];
        let result = orchestrator.prioritize(&tasks).await.unwrap();

        assert_eq!(result.reasoning, "deadline first");
        let merged_active = result.tasks.iter().find(|t| t.id == active.id).unwrap();
        assert_eq!(merged_active.ai_priority, Some(Priority::Urgent));
        assert_eq!(merged_active.ai_reason.as_deref(), Some("due soon"));
        // Stored priority must survive untouched.
        assert_eq!(merged_active.priority, Priority::Medium);

        let merged_unmatched = result.tasks.iter().find(|t| t.id == unmatched.id).unwrap();
        assert!(merged_unmatched.ai_priority.is_none());
        let merged_completed = result.tasks.iter().find(|t| t.id == completed.id).unwrap();
        assert!(merged_completed.ai_priority.is_none());
    }

    #[tokio::test]
    async fn prioritize_rejects_invalid_priority_levels() {
        let active = task("write report", false);
        let reply = format!(
            r#"{{"priorities":[{{"id":"{}","priority":"critical","reason":"x"}}],"summary":"s"}}"#,
            active.id
        );
        let orchestrator = AiOrchestrator::with_generator(FixedGenerator::new(reply));

        let err = orchestrator.prioritize(&[active]).await.unwrap_err();
        assert_eq!(err.kind, AiErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn insights_attach_computed_statistics() {
        let reply = r#"{"completionAnalysis":"steady","recommendations":["finish the report"],"focusAreas":["deadlines"],"motivationalTip":"keep going"}"#;
        let orchestrator = AiOrchestrator::with_generator(FixedGenerator::new(reply));

        let mut done = task("done", true);
        done.completed = true;
        let tasks = vec![done, task("active", false)];
        let today = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();

        let insights = orchestrator.insights(&tasks, today).await.unwrap();
        assert_eq!(insights.completion_analysis, "steady");
        assert_eq!(insights.statistics.total, 2);
        assert_eq!(insights.statistics.completion_rate, 50);
        assert_eq!(insights.motivational_tip.as_deref(), Some("keep going"));
    }

    #[tokio::test]
    async fn suggest_parses_the_suggestion_shape() {
        let reply = r#"Some preamble {"description":"Plan and book the trip","subtasks":["compare flights","reserve hotel"],"suggestedPriority":"high"} trailing text"#;
        let orchestrator = AiOrchestrator::with_generator(FixedGenerator::new(reply));

        let suggestion = orchestrator.suggest("book holiday").await.unwrap();
        assert_eq!(suggestion.suggested_priority, Priority::High);
        assert_eq!(suggestion.subtasks.len(), 2);
    }

    #[tokio::test]
    async fn suggest_with_no_json_fails_as_malformed() {
        let orchestrator =
            AiOrchestrator::with_generator(FixedGenerator::new("plain prose, no object"));
        let err = orchestrator.suggest("anything").await.unwrap_err();
        assert_eq!(err.kind, AiErrorKind::MalformedResponse);
    }
}
