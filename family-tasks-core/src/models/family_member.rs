use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{validate, Patch};
use crate::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFamilyMemberInput {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl CreateFamilyMemberInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::non_empty("name", &self.name)?;
        if let Some(email) = &self.email {
            validate::email(email)?;
        }
        if let Some(avatar_url) = &self.avatar_url {
            validate::url(avatar_url)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateFamilyMemberInput {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub email: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub avatar_url: Patch<String>,
}

impl UpdateFamilyMemberInput {
    /// An update that changes nothing.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            name: Patch::Absent,
            email: Patch::Absent,
            avatar_url: Patch::Absent,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::required_patch("name", &self.name)?;
        if let Patch::Value(email) = &self.email {
            validate::email(email)?;
        }
        if let Patch::Value(avatar_url) = &self.avatar_url {
            validate::url(avatar_url)?;
        }
        Ok(())
    }

    pub fn apply(self, current: FamilyMember) -> FamilyMember {
        FamilyMember {
            id: current.id,
            name: self.name.apply_required(current.name),
            email: self.email.apply(current.email),
            avatar_url: self.avatar_url.apply(current.avatar_url),
            created_at: current.created_at,
        }
    }
}
