//! To-do record types and the request payloads that create or change them.
//!
//! All types serialize with lowerCamelCase field names, matching the JSON
//! contract of the HTTP API.

use crate::error::{TodoError, TodoResult};
use crate::ids::TodoId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Priority assigned when a create request does not carry one.
pub const DEFAULT_PRIORITY: i32 = 1;

/// Message returned for a blank or missing title on create.
pub const TITLE_REQUIRED: &str = "Title is required.";

/// A single to-do record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Unconstrained: any integer is stored verbatim.
    pub priority: i32,
}

impl TodoItem {
    /// Apply a partial update in place, stamping completion with `now`.
    ///
    /// A blank `title` is ignored rather than rejected. Setting `is_completed`
    /// always recomputes `completed_at`, even when the flag does not change.
    pub fn apply(&mut self, update: TodoUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            if !title.trim().is_empty() {
                self.title = title;
            }
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(completed) = update.is_completed {
            self.is_completed = completed;
            self.completed_at = completed.then_some(now);
        }
    }
}

/// Body of `POST /todos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: DEFAULT_PRIORITY,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Reject blank or whitespace-only titles.
    pub fn validate(&self) -> TodoResult<()> {
        if self.title.trim().is_empty() {
            return Err(TodoError::Validation(TITLE_REQUIRED.to_string()));
        }
        Ok(())
    }
}

/// Body of `PUT /todos/{id}`. Absent (or `null`) fields keep their prior value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

impl TodoUpdate {
    /// Update that only flips the completion flag.
    pub fn completion(completed: bool) -> Self {
        Self {
            is_completed: Some(completed),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn item(now: DateTime<Utc>) -> TodoItem {
        TodoItem {
            id: TodoId(1),
            title: "Write report".into(),
            description: Some("quarterly".into()),
            is_completed: false,
            created_at: now,
            completed_at: None,
            priority: 2,
        }
    }

    #[test]
    fn test_item_json_shape_is_camel_case() {
        let now = Utc::now();
        let value = serde_json::to_value(item(now)).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "completedAt",
                "createdAt",
                "description",
                "id",
                "isCompleted",
                "priority",
                "title"
            ]
        );
        assert_eq!(value["completedAt"], serde_json::Value::Null);
        assert_eq!(value["id"], 1);
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn test_new_todo_defaults() {
        let parsed: NewTodo = serde_json::from_value(json!({"title": "Buy milk"})).unwrap();
        assert_eq!(parsed.priority, DEFAULT_PRIORITY);
        assert_eq!(parsed.description, None);

        let missing: NewTodo = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.title, "");
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_whitespace_title() {
        let err = NewTodo::new("   \t").validate().unwrap_err();
        assert_eq!(err, TodoError::Validation(TITLE_REQUIRED.to_string()));
        assert!(NewTodo::new("ok").validate().is_ok());
    }

    #[test]
    fn test_apply_ignores_blank_title_and_keeps_unspecified_fields() {
        let now = Utc::now();
        let mut todo = item(now);
        todo.apply(
            TodoUpdate {
                title: Some("  ".into()),
                priority: Some(-40),
                ..TodoUpdate::default()
            },
            now,
        );
        assert_eq!(todo.title, "Write report");
        assert_eq!(todo.description.as_deref(), Some("quarterly"));
        assert_eq!(todo.priority, -40);
        assert!(!todo.is_completed);
    }

    #[test]
    fn test_apply_explicit_empty_description_replaces() {
        let now = Utc::now();
        let mut todo = item(now);
        let update: TodoUpdate = serde_json::from_value(json!({"description": ""})).unwrap();
        todo.apply(update, now);
        assert_eq!(todo.description.as_deref(), Some(""));

        let null_update: TodoUpdate =
            serde_json::from_value(json!({"description": null})).unwrap();
        todo.apply(null_update, now);
        assert_eq!(todo.description.as_deref(), Some(""));
    }

    #[test]
    fn test_apply_completion_restamps() {
        let t0 = Utc::now();
        let t1 = t0 + Duration::minutes(5);
        let mut todo = item(t0);
        todo.apply(TodoUpdate::completion(true), t0);
        assert_eq!(todo.completed_at, Some(t0));
        todo.apply(TodoUpdate::completion(true), t1);
        assert_eq!(todo.completed_at, Some(t1));
        todo.apply(TodoUpdate::completion(false), t1);
        assert!(!todo.is_completed);
        assert_eq!(todo.completed_at, None);
    }
}
