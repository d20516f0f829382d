use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{validate, Patch};
use crate::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Conventionally a hex color code such as `#10b981`; not validated.
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl CreateCategoryInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::non_empty("name", &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCategoryInput {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub description: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub color: Patch<String>,
}

impl UpdateCategoryInput {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            name: Patch::Absent,
            description: Patch::Absent,
            color: Patch::Absent,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::required_patch("name", &self.name)
    }

    pub fn apply(self, current: Category) -> Category {
        Category {
            id: current.id,
            name: self.name.apply_required(current.name),
            description: self.description.apply(current.description),
            color: self.color.apply(current.color),
            created_at: current.created_at,
        }
    }
}
