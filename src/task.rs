//! Task model and payload types.
//!
//! A task is the single entity in the system. The store assigns `id`
//! and timestamps; everything else comes from the caller. The wire
//! format is camelCase JSON to match the HTTP API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Priority level for a task. `urgent` outranks `high` outranks
/// `medium` outranks `low`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Numeric rank used for sorting; higher sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Urgent => 4,
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub const ALL: [Priority; 4] = [
        Priority::Urgent,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = InvalidPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "urgent" => Ok(Priority::Urgent),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(InvalidPriority(other.to_string())),
        }
    }
}

/// Error for a priority string outside the four enumerated levels.
#[derive(Debug, thiserror::Error)]
#[error("invalid priority level: {0:?} (expected urgent, high, medium, or low)")]
pub struct InvalidPriority(pub String);

/// A stored task record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Set only by the AI prioritization feature. When present it
    /// overrides `priority` for display and sorting, but never
    /// replaces the stored `priority` value.
    #[serde(default)]
    pub ai_priority: Option<Priority>,
    #[serde(default)]
    pub ai_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Priority used for display and sorting: `aiPriority` when set,
    /// else the stored `priority`.
    pub fn effective_priority(&self) -> Priority {
        self.ai_priority.unwrap_or(self.priority)
    }
}

/// Payload for creating a task. Only `title` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update for a task. Absent fields are left untouched; for
/// the optional fields an explicit JSON `null` clears the value
/// (hence the nested `Option`). The `id` is never updatable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub ai_priority: Option<Option<Priority>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub ai_reason: Option<Option<String>>,
}

impl TaskPatch {
    /// True if the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
            && self.due_date.is_none()
            && self.ai_priority.is_none()
            && self.ai_reason.is_none()
    }

    /// Merge this patch into an existing task. Does not touch `id`,
    /// `createdAt`, or `updatedAt`; the store owns those.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(ai_priority) = self.ai_priority {
            task.ai_priority = ai_priority;
        }
        if let Some(ai_reason) = &self.ai_reason {
            task.ai_reason = ai_reason.clone();
        }
    }
}

/// Deserialize a field that distinguishes "absent" from "null":
/// absent stays `None` (via `#[serde(default)]`), present-but-null
/// becomes `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_round_trips_lowercase() {
        for p in Priority::ALL {
            assert_eq!(p.as_str().parse::<Priority>().unwrap(), p);
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{}\"", p.as_str()));
        }
        assert!("critical".parse::<Priority>().is_err());
    }

    #[test]
    fn priority_default_is_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
        let task: NewTask = serde_json::from_str(r#"{"title":"write report"}"#).unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.completed);
        assert!(task.due_date.is_none());
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let patch: TaskPatch = serde_json::from_str(r#"{"title":"renamed"}"#).unwrap();
        assert_eq!(patch.title.as_deref(), Some("renamed"));
        assert!(patch.due_date.is_none());

        let patch: TaskPatch = serde_json::from_str(r#"{"dueDate":null}"#).unwrap();
        assert_eq!(patch.due_date, Some(None));

        let patch: TaskPatch = serde_json::from_str(r#"{"dueDate":"2026-09-01"}"#).unwrap();
        assert_eq!(
            patch.due_date,
            Some(Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()))
        );
    }

    #[test]
    fn patch_rejects_unknown_priority() {
        let result = serde_json::from_str::<TaskPatch>(r#"{"priority":"asap"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn effective_priority_prefers_ai_priority() {
        let now = Utc::now();
        let mut task = Task {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: String::new(),
            priority: Priority::Low,
            completed: false,
            due_date: None,
            ai_priority: None,
            ai_reason: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(task.effective_priority(), Priority::Low);
        task.ai_priority = Some(Priority::Urgent);
        assert_eq!(task.effective_priority(), Priority::Urgent);
    }
}
