use std::time::Duration;

use family_tasks_core::models::*;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::api::{ApiResponse, ErrorKind, HealthStatus, Procedure};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Rpc { kind: ErrorKind, message: String },
    #[error("malformed response from {0}")]
    Malformed(&'static str),
    /// Raised by the offline board while applying a mutation locally.
    #[error(transparent)]
    Local(#[from] family_tasks_core::Error),
}

/// HTTP client for the `/rpc/{procedure}` contract.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    base_url: String,
}

impl RpcClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn query<T: DeserializeOwned>(&self, procedure: Procedure) -> Result<T, ClientError> {
        let request = self.http.get(self.url(procedure));
        Self::unwrap_envelope(procedure, request.send().await?).await
    }

    pub async fn mutate<P: Serialize, T: DeserializeOwned>(
        &self,
        procedure: Procedure,
        params: &P,
    ) -> Result<T, ClientError> {
        let request = self.http.post(self.url(procedure)).json(params);
        Self::unwrap_envelope(procedure, request.send().await?).await
    }

    fn url(&self, procedure: Procedure) -> String {
        format!("{}/rpc/{}", self.base_url, procedure.as_str())
    }

    async fn unwrap_envelope<T: DeserializeOwned>(
        procedure: Procedure,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let envelope: ApiResponse<T> = response.json().await?;
        match envelope {
            ApiResponse {
                ok: true,
                data: Some(data),
                ..
            } => Ok(data),
            ApiResponse {
                error: Some(error), ..
            } => Err(ClientError::Rpc {
                kind: error.kind,
                message: error.message,
            }),
            _ => Err(ClientError::Malformed(procedure.as_str())),
        }
    }

    pub async fn healthcheck(&self) -> Result<HealthStatus, ClientError> {
        self.query(Procedure::Healthcheck).await
    }

    pub async fn get_family_members(&self) -> Result<Vec<FamilyMember>, ClientError> {
        self.query(Procedure::GetFamilyMembers).await
    }

    pub async fn create_family_member(
        &self,
        input: &CreateFamilyMemberInput,
    ) -> Result<FamilyMember, ClientError> {
        self.mutate(Procedure::CreateFamilyMember, input).await
    }

    pub async fn update_family_member(
        &self,
        input: &UpdateFamilyMemberInput,
    ) -> Result<FamilyMember, ClientError> {
        self.mutate(Procedure::UpdateFamilyMember, input).await
    }

    pub async fn delete_family_member(&self, id: i64) -> Result<DeleteResult, ClientError> {
        self.mutate(Procedure::DeleteFamilyMember, &DeleteInput { id })
            .await
    }

    pub async fn get_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.query(Procedure::GetCategories).await
    }

    pub async fn create_category(&self, input: &CreateCategoryInput) -> Result<Category, ClientError> {
        self.mutate(Procedure::CreateCategory, input).await
    }

    pub async fn update_category(&self, input: &UpdateCategoryInput) -> Result<Category, ClientError> {
        self.mutate(Procedure::UpdateCategory, input).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<DeleteResult, ClientError> {
        self.mutate(Procedure::DeleteCategory, &DeleteInput { id }).await
    }

    pub async fn get_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.query(Procedure::GetTasks).await
    }

    pub async fn create_task(&self, input: &CreateTaskInput) -> Result<Task, ClientError> {
        self.mutate(Procedure::CreateTask, input).await
    }

    pub async fn update_task(&self, input: &UpdateTaskInput) -> Result<Task, ClientError> {
        self.mutate(Procedure::UpdateTask, input).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<DeleteResult, ClientError> {
        self.mutate(Procedure::DeleteTask, &DeleteInput { id }).await
    }

    pub async fn toggle_task_completion(
        &self,
        id: i64,
        is_completed: bool,
    ) -> Result<Task, ClientError> {
        self.mutate(
            Procedure::ToggleTaskCompletion,
            &ToggleTaskCompletionInput { id, is_completed },
        )
        .await
    }
}
