//! Prompt templates for the AI use cases.
//!
//! Each template asks the model for JSON only; the orchestrator still
//! tolerates prose around the object when parsing.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::views::{PriorityDistribution, TaskStatistics};
use crate::task::{Priority, Task};

/// Compact task view embedded in the prioritization prompt.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub id: uuid::Uuid,
    pub title: String,
    pub description: String,
    pub current_priority: Priority,
    pub due_date: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: if task.description.is_empty() {
                "No description".to_string()
            } else {
                task.description.clone()
            },
            current_priority: task.priority,
            due_date: task
                .due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "No due date".to_string()),
            created_at: task.created_at,
        }
    }
}

pub fn prioritization(tasks: &[TaskSummary]) -> String {
    let summary = serde_json::to_string_pretty(tasks).unwrap_or_default();
    format!(
        r#"You are an AI task prioritization assistant. Analyze these tasks and suggest optimal priority levels.

Tasks:
{summary}

Priority levels: urgent, high, medium, low

Consider:
1. Due dates and urgency
2. Task complexity (based on description)
3. Current priority
4. Creation date

Respond with ONLY a valid JSON object in this exact format (no additional text):
{{
  "priorities": [
    {{"id": "task_id", "priority": "urgent|high|medium|low", "reason": "brief reason"}}
  ],
  "summary": "Overall prioritization strategy"
}}"#
    )
}

pub fn insights(stats: &TaskStatistics, dist: &PriorityDistribution) -> String {
    format!(
        r#"You are a productivity coach AI. Analyze this task data and provide actionable insights.

Statistics:
- Total tasks: {total}
- Completed: {completed}
- Active: {active}
- Overdue: {overdue}
- Completion rate: {rate}%

Active tasks by priority:
- Urgent: {urgent}
- High: {high}
- Medium: {medium}
- Low: {low}

Provide insights in ONLY valid JSON format (no additional text):
{{
  "completionAnalysis": "Analysis of completion rate and patterns",
  "recommendations": [
    "Specific actionable recommendation 1",
    "Specific actionable recommendation 2",
    "Specific actionable recommendation 3"
  ],
  "focusAreas": [
    "Priority area 1",
    "Priority area 2"
  ],
  "motivationalTip": "Encouraging message"
}}"#,
        total = stats.total,
        completed = stats.completed,
        active = stats.active,
        overdue = stats.overdue,
        rate = stats.completion_rate,
        urgent = dist.urgent,
        high = dist.high,
        medium = dist.medium,
        low = dist.low,
    )
}

pub fn suggestions(task_title: &str) -> String {
    format!(
        r#"You are a task planning assistant. Given this task: "{task_title}"

Suggest:
1. A more detailed description
2. 2-3 subtasks to break it down
3. Estimated priority level

Respond with ONLY valid JSON (no additional text):
{{
  "description": "Detailed description",
  "subtasks": ["subtask 1", "subtask 2"],
  "suggestedPriority": "urgent|high|medium|low"
}}"#
    )
}
