//! The named procedures of the request contract and their dispatcher.
//!
//! HTTP and MCP both funnel into [`dispatch`], so payload decoding and error
//! mapping are identical on every transport.

use chrono::{DateTime, Utc};
use family_tasks_core::Database;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    Healthcheck,
    CreateFamilyMember,
    GetFamilyMembers,
    UpdateFamilyMember,
    DeleteFamilyMember,
    CreateCategory,
    GetCategories,
    UpdateCategory,
    DeleteCategory,
    CreateTask,
    GetTasks,
    UpdateTask,
    DeleteTask,
    ToggleTaskCompletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureKind {
    Query,
    Mutation,
}

impl Procedure {
    pub const ALL: [Procedure; 14] = [
        Self::Healthcheck,
        Self::CreateFamilyMember,
        Self::GetFamilyMembers,
        Self::UpdateFamilyMember,
        Self::DeleteFamilyMember,
        Self::CreateCategory,
        Self::GetCategories,
        Self::UpdateCategory,
        Self::DeleteCategory,
        Self::CreateTask,
        Self::GetTasks,
        Self::UpdateTask,
        Self::DeleteTask,
        Self::ToggleTaskCompletion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthcheck => "healthcheck",
            Self::CreateFamilyMember => "createFamilyMember",
            Self::GetFamilyMembers => "getFamilyMembers",
            Self::UpdateFamilyMember => "updateFamilyMember",
            Self::DeleteFamilyMember => "deleteFamilyMember",
            Self::CreateCategory => "createCategory",
            Self::GetCategories => "getCategories",
            Self::UpdateCategory => "updateCategory",
            Self::DeleteCategory => "deleteCategory",
            Self::CreateTask => "createTask",
            Self::GetTasks => "getTasks",
            Self::UpdateTask => "updateTask",
            Self::DeleteTask => "deleteTask",
            Self::ToggleTaskCompletion => "toggleTaskCompletion",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|procedure| procedure.as_str() == s)
    }

    pub fn kind(&self) -> ProcedureKind {
        match self {
            Self::Healthcheck | Self::GetFamilyMembers | Self::GetCategories | Self::GetTasks => {
                ProcedureKind::Query
            }
            _ => ProcedureKind::Mutation,
        }
    }

    pub fn is_query(&self) -> bool {
        self.kind() == ProcedureKind::Query
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn now() -> Self {
        Self {
            status: "ok".into(),
            timestamp: Utc::now(),
        }
    }
}

/// Decode `params` for `procedure`, run it against `db`, and encode the result.
///
/// Query procedures ignore `params`.
pub fn dispatch(db: &Database, procedure: Procedure, params: Value) -> Result<Value, ApiError> {
    tracing::debug!("Dispatching {}", procedure.as_str());

    match procedure {
        Procedure::Healthcheck => encode(HealthStatus::now()),

        Procedure::CreateFamilyMember => encode(db.create_family_member(decode(params)?)?),
        Procedure::GetFamilyMembers => encode(db.get_family_members()?),
        Procedure::UpdateFamilyMember => encode(db.update_family_member(decode(params)?)?),
        Procedure::DeleteFamilyMember => encode(db.delete_family_member(decode(params)?)?),

        Procedure::CreateCategory => encode(db.create_category(decode(params)?)?),
        Procedure::GetCategories => encode(db.get_categories()?),
        Procedure::UpdateCategory => encode(db.update_category(decode(params)?)?),
        Procedure::DeleteCategory => encode(db.delete_category(decode(params)?)?),

        Procedure::CreateTask => encode(db.create_task(decode(params)?)?),
        Procedure::GetTasks => encode(db.get_tasks()?),
        Procedure::UpdateTask => encode(db.update_task(decode(params)?)?),
        Procedure::DeleteTask => encode(db.delete_task(decode(params)?)?),
        Procedure::ToggleTaskCompletion => encode(db.toggle_task_completion(decode(params)?)?),
    }
}

fn decode<T: DeserializeOwned>(params: Value) -> Result<T, ApiError> {
    serde_json::from_value(params).map_err(|e| ApiError::InvalidPayload(e.to_string()))
}

fn encode<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn setup_db() -> Database {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn names_round_trip() {
        for procedure in Procedure::ALL {
            assert_eq!(Procedure::from_str(procedure.as_str()), Some(procedure));
        }
        assert_eq!(Procedure::from_str("dropTables"), None);
    }

    #[test]
    fn only_reads_and_healthcheck_are_queries() {
        let queries: Vec<_> = Procedure::ALL.into_iter().filter(Procedure::is_query).collect();
        assert_eq!(
            queries,
            vec![
                Procedure::Healthcheck,
                Procedure::GetFamilyMembers,
                Procedure::GetCategories,
                Procedure::GetTasks,
            ]
        );
    }

    #[test]
    fn missing_required_field_is_invalid_payload() {
        let db = setup_db();
        let err = dispatch(&db, Procedure::CreateTask, json!({"description": "no title"}))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidPayload(_)));
    }

    #[test]
    fn update_payload_keeps_absent_and_null_apart() {
        let db = setup_db();
        let task = dispatch(
            &db,
            Procedure::CreateTask,
            json!({"title": "Clean kitchen", "description": "All of it"}),
        )
        .unwrap();
        let id = task["id"].as_i64().unwrap();

        let untouched = dispatch(&db, Procedure::UpdateTask, json!({"id": id})).unwrap();
        assert_eq!(untouched["description"], "All of it");

        let cleared =
            dispatch(&db, Procedure::UpdateTask, json!({"id": id, "description": null})).unwrap();
        assert_eq!(cleared["description"], Value::Null);
    }
}
