//! Derived views over an in-memory task list.
//!
//! Pure computations, no I/O. Every date-sensitive function takes
//! `today` explicitly; the thin `*_now` wrappers fill in the local
//! date for callers that want it.

use std::cmp::Reverse;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::task::{Priority, Task};

/// Filter options for a task list view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    /// Incomplete tasks due today.
    Today,
    /// Incomplete tasks with a future due date (not today).
    Upcoming,
    Completed,
    /// Incomplete tasks whose due date is strictly in the past.
    Overdue,
}

/// Aggregate statistics over a task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatistics {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub overdue: usize,
    pub today: usize,
    /// Percentage of tasks completed, rounded; 0 for an empty list.
    pub completion_rate: u32,
}

/// Counts of incomplete tasks per stored priority level. AI-suggested
/// priorities do not shift the distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityDistribution {
    pub urgent: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// A task is overdue when it has a due date strictly in the past and
/// is not completed. Due today is not overdue.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    !task.completed && task.due_date.is_some_and(|due| due < today)
}

/// Apply a filter to a task list, preserving order.
pub fn filter_tasks(tasks: &[Task], filter: TaskFilter, today: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| match filter {
            TaskFilter::All => true,
            TaskFilter::Today => !task.completed && task.due_date == Some(today),
            TaskFilter::Upcoming => {
                !task.completed && task.due_date.is_some_and(|due| due > today)
            }
            TaskFilter::Completed => task.completed,
            TaskFilter::Overdue => is_overdue(task, today),
        })
        .cloned()
        .collect()
}

/// Sort by effective priority (aiPriority when set, else priority),
/// urgent first. The sort is stable: ties keep their relative order.
pub fn sort_by_effective_priority(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by_key(|task| Reverse(task.effective_priority().rank()));
    sorted
}

/// Compute aggregate statistics for a task list.
pub fn task_statistics(tasks: &[Task], today: NaiveDate) -> TaskStatistics {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let overdue = tasks.iter().filter(|t| is_overdue(t, today)).count();
    let due_today = tasks
        .iter()
        .filter(|t| !t.completed && t.due_date == Some(today))
        .count();

    let completion_rate = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    };

    TaskStatistics {
        total,
        completed,
        active: total - completed,
        overdue,
        today: due_today,
        completion_rate,
    }
}

/// Count incomplete tasks per stored priority level.
pub fn priority_distribution(tasks: &[Task]) -> PriorityDistribution {
    let mut dist = PriorityDistribution::default();
    for task in tasks.iter().filter(|t| !t.completed) {
        match task.priority {
            Priority::Urgent => dist.urgent += 1,
            Priority::High => dist.high += 1,
            Priority::Medium => dist.medium += 1,
            Priority::Low => dist.low += 1,
        }
    }
    dist
}

/// Human-readable due date relative to `today`.
pub fn format_due_date(due_date: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(due) = due_date else {
        return "No due date".to_string();
    };

    let days = (due - today).num_days();
    match days {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        d if d < 0 => format!("{} days overdue", -d),
        d if d <= 7 => due.format("%A").to_string(),
        _ => due.format("%b %-d, %Y").to_string(),
    }
}

/// Statistics as of the local date.
pub fn task_statistics_now(tasks: &[Task]) -> TaskStatistics {
    task_statistics(tasks, Local::now().date_naive())
}

/// Filtered view as of the local date.
pub fn filter_tasks_now(tasks: &[Task], filter: TaskFilter) -> Vec<Task> {
    filter_tasks(tasks, filter, Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn task(title: &str, priority: Priority) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            priority,
            completed: false,
            due_date: None,
            ai_priority: None,
            ai_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 26).unwrap()
    }

    #[test]
    fn completion_rate_of_empty_list_is_zero() {
        let stats = task_statistics(&[], today());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion_rate, 0);
    }

    #[test]
    fn statistics_count_each_bucket() {
        let day = today();
        let mut done = task("done", Priority::Low);
        done.completed = true;
        let mut overdue = task("overdue", Priority::High);
        overdue.due_date = day.pred_opt();
        let mut due_today = task("today", Priority::Medium);
        due_today.due_date = Some(day);

        let stats = task_statistics(&[done, overdue, due_today], day);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.today, 1);
        assert_eq!(stats.completion_rate, 33);
    }

    #[test]
    fn sort_is_stable_within_a_priority() {
        let tasks = vec![
            task("low", Priority::Low),
            task("urgent-a", Priority::Urgent),
            task("medium", Priority::Medium),
            task("urgent-b", Priority::Urgent),
        ];

        let sorted = sort_by_effective_priority(&tasks);
        let titles: Vec<&str> = sorted.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["urgent-a", "urgent-b", "medium", "low"]);
    }

    #[test]
    fn ai_priority_overrides_for_sorting_only() {
        let mut boosted = task("boosted", Priority::Low);
        boosted.ai_priority = Some(Priority::Urgent);
        let plain = task("plain", Priority::High);

        let sorted = sort_by_effective_priority(&[plain, boosted.clone()]);
        assert_eq!(sorted[0].title, "boosted");
        // Stored priority is untouched.
        assert_eq!(boosted.priority, Priority::Low);
    }

    #[test]
    fn due_today_is_neither_overdue_nor_upcoming() {
        let day = today();
        let mut t = task("due today", Priority::Medium);
        t.due_date = Some(day);
        let tasks = vec![t.clone()];

        assert!(!is_overdue(&t, day));
        assert_eq!(filter_tasks(&tasks, TaskFilter::Today, day).len(), 1);
        assert!(filter_tasks(&tasks, TaskFilter::Overdue, day).is_empty());
        assert!(filter_tasks(&tasks, TaskFilter::Upcoming, day).is_empty());
    }

    #[test]
    fn overdue_requires_incomplete() {
        let day = today();
        let mut t = task("late but done", Priority::Medium);
        t.due_date = day.pred_opt();
        t.completed = true;
        assert!(!is_overdue(&t, day));
        assert!(filter_tasks(&[t], TaskFilter::Overdue, day).is_empty());
    }

    #[test]
    fn distribution_uses_stored_priority_and_skips_completed() {
        let mut boosted = task("boosted", Priority::Low);
        boosted.ai_priority = Some(Priority::Urgent);
        let mut done = task("done", Priority::Urgent);
        done.completed = true;
        let tasks = vec![boosted, done, task("plain", Priority::Medium)];

        let dist = priority_distribution(&tasks);
        assert_eq!(dist.urgent, 0);
        assert_eq!(dist.medium, 1);
        assert_eq!(dist.low, 1);
    }

    #[test]
    fn due_date_formatting() {
        let day = today();
        assert_eq!(format_due_date(None, day), "No due date");
        assert_eq!(format_due_date(Some(day), day), "Today");
        assert_eq!(format_due_date(day.succ_opt(), day), "Tomorrow");
        assert_eq!(
            format_due_date(NaiveDate::from_ymd_opt(2026, 8, 23), day),
            "3 days overdue"
        );
        // 2026-08-31 is within a week: weekday name.
        assert_eq!(
            format_due_date(NaiveDate::from_ymd_opt(2026, 8, 31), day),
            "Monday"
        );
        assert_eq!(
            format_due_date(NaiveDate::from_ymd_opt(2026, 10, 5), day),
            "Oct 5, 2026"
        );
    }
}
