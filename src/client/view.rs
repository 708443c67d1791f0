//! Presentation helpers computed from fetched data on every render.

use crate::models::{Priority, Todo};
use crate::services::health::{Liveness, MemoryUsage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TodoFilter {
    pub const ALL: [TodoFilter; 3] = [TodoFilter::All, TodoFilter::Active, TodoFilter::Completed];

    pub fn label(&self) -> &'static str {
        match self {
            TodoFilter::All => "All Tasks",
            TodoFilter::Active => "Active",
            TodoFilter::Completed => "Completed",
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            TodoFilter::All => true,
            TodoFilter::Active => !todo.completed,
            TodoFilter::Completed => todo.completed,
        }
    }

    /// Keeps the server's ordering.
    pub fn apply<'a>(&self, todos: &'a [Todo]) -> Vec<&'a Todo> {
        todos.iter().filter(|todo| self.matches(todo)).collect()
    }
}

impl FromStr for TodoFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TodoFilter::All),
            "active" => Ok(TodoFilter::Active),
            "completed" => Ok(TodoFilter::Completed),
            other => Err(format!("unknown filter `{}`", other)),
        }
    }
}

/// "High Priority", "Medium Priority", ...
pub fn priority_label(priority: Priority) -> String {
    let name = priority.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{} Priority", first.to_uppercase(), chars.as_str()),
        None => "Priority".to_string(),
    }
}

/// Coarse age of a todo: whole days, else whole hours, else "Just now".
pub fn relative_time(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(created_at);
    let hours = elapsed.num_hours();
    let days = hours / 24;
    if days > 0 {
        format!("{} day{} ago", days, if days > 1 { "s" } else { "" })
    } else if hours > 0 {
        format!("{} hour{} ago", hours, if hours > 1 { "s" } else { "" })
    } else {
        "Just now".to_string()
    }
}

pub fn memory_usage_percent(memory: &MemoryUsage) -> f64 {
    if memory.total == 0 {
        return 0.0;
    }
    f64::from(memory.used) / f64::from(memory.total) * 100.0
}

pub fn uptime_hours(liveness: &Liveness) -> u64 {
    (liveness.uptime.max(0.0) / 3600.0).floor() as u64
}
