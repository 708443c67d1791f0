// cloudtodo/src/models.rs
use crate::schema::todos;
use chrono::{DateTime, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown priority `{0}` (expected low, medium or high)")]
pub struct UnknownPriority(pub String);

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(UnknownPriority(other.to_string())),
        }
    }
}

impl ToSql<Text, Pg> for Priority {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        <str as ToSql<Text, Pg>>::to_sql(self.as_str(), out)
    }
}

impl FromSql<Text, Pg> for Priority {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        Ok(raw.parse::<Priority>()?)
    }
}

#[derive(Queryable, Identifiable, Selectable, Serialize, Deserialize, Debug, PartialEq, Clone)]
#[diesel(table_name = todos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Creation payload accepted by `POST /api/todos`.
///
/// Server-assigned fields (`id`, `createdAt`, `completedAt`) are not part of
/// the payload and are ignored if a client sends them.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl CreateTodo {
    pub fn new(title: impl Into<String>) -> Self {
        CreateTodo {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        check_title(&self.title, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Applies the creation defaults. An empty description is stored as null.
    pub fn into_new_todo(self) -> NewTodo {
        NewTodo {
            title: self.title,
            description: self.description.filter(|d| !d.is_empty()),
            completed: self.completed.unwrap_or(false),
            priority: self.priority.unwrap_or_default(),
        }
    }
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = todos)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
}

/// Partial update accepted by `PATCH /api/todos/<id>`.
///
/// Nullable columns use a double option: `None` leaves the column alone,
/// `Some(None)` clears it. The other fields may be omitted but not null.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl UpdateTodo {
    pub fn completed(completed: bool) -> Self {
        UpdateTodo {
            completed: Some(completed),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if let Some(title) = &self.title {
            check_title(title, &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.completed_at.is_none()
    }

    /// Resolves the update into the columns to write. When `completed` is
    /// present it always decides `completed_at`, overriding any value the
    /// client supplied.
    pub fn into_changeset(self, now: DateTime<Utc>) -> TodoChangeset {
        let completed_at = match self.completed {
            Some(true) => Some(Some(now)),
            Some(false) => Some(None),
            None => self.completed_at,
        };
        TodoChangeset {
            title: self.title,
            description: self.description,
            completed: self.completed,
            priority: self.priority,
            completed_at,
        }
    }
}

#[derive(AsChangeset, Debug, Clone, Default, PartialEq)]
#[diesel(table_name = todos)]
pub struct TodoChangeset {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl TodoChangeset {
    pub fn is_empty(&self) -> bool {
        *self == TodoChangeset::default()
    }

    pub fn apply_to(self, todo: &mut Todo) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(description) = self.description {
            todo.description = description;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        if let Some(priority) = self.priority {
            todo.priority = priority;
        }
        if let Some(completed_at) = self.completed_at {
            todo.completed_at = completed_at;
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
}

impl TodoStats {
    pub fn tally<I>(flags: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let (total, completed) = flags
            .into_iter()
            .fold((0, 0), |(total, done), flag| (total + 1, done + usize::from(flag)));
        TodoStats {
            total,
            completed,
            active: total - completed,
        }
    }
}

fn check_title(title: &str, errors: &mut Vec<String>) {
    if title.trim().is_empty() {
        errors.push("title: must not be empty".to_string());
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// Optional field of a NOT NULL column: absent is fine, an explicit null is not.
fn non_null<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
