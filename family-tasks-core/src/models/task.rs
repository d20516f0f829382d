use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{validate, Patch};
use crate::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub assigned_to: Option<i64>,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn state(&self) -> TaskState {
        if self.is_completed {
            TaskState::Completed
        } else {
            TaskState::Pending
        }
    }

    /// Open and past its due date.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed && self.due_date.is_some_and(|due| due < now)
    }
}

/// Completion state of a task. There is no intermediate state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Completed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "validate::deserialize_timestamp_opt")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_to: Option<i64>,
    #[serde(default)]
    pub category_id: Option<i64>,
}

impl CreateTaskInput {
    /// A task with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            assigned_to: None,
            category_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::non_empty("title", &self.title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTaskInput {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub title: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub description: Patch<String>,
    #[serde(
        default,
        deserialize_with = "validate::deserialize_timestamp_patch",
        skip_serializing_if = "Patch::is_absent"
    )]
    pub due_date: Patch<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub is_completed: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub assigned_to: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub category_id: Patch<i64>,
}

impl UpdateTaskInput {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            title: Patch::Absent,
            description: Patch::Absent,
            due_date: Patch::Absent,
            is_completed: Patch::Absent,
            assigned_to: Patch::Absent,
            category_id: Patch::Absent,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::required_patch("title", &self.title)?;
        if self.is_completed.is_null() {
            return Err(ValidationError::NotNullable {
                field: "is_completed",
            });
        }
        Ok(())
    }

    /// Merge into the stored row. `updated_at` is set by the caller.
    pub fn apply(self, current: Task) -> Task {
        Task {
            id: current.id,
            title: self.title.apply_required(current.title),
            description: self.description.apply(current.description),
            due_date: self.due_date.apply(current.due_date),
            is_completed: self.is_completed.apply_required(current.is_completed),
            assigned_to: self.assigned_to.apply(current.assigned_to),
            category_id: self.category_id.apply(current.category_id),
            created_at: current.created_at,
            updated_at: current.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToggleTaskCompletionInput {
    pub id: i64,
    pub is_completed: bool,
}

/// Payload of every delete procedure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteInput {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub success: bool,
}
