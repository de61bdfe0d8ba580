//! Client state layer: Task API access, local settings, and derived
//! views. A presentation layer sits on top of this; nothing here
//! renders anything.

pub mod http;
pub mod settings;
pub mod views;

pub use http::{ApiClient, ClientError};
pub use settings::{Settings, SettingsStore};
pub use views::{
    filter_tasks, format_due_date, is_overdue, priority_distribution,
    sort_by_effective_priority, task_statistics, PriorityDistribution, TaskFilter, TaskStatistics,
};
