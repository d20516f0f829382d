use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router,
    schemars::JsonSchema,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{dispatch, ApiError, ErrorKind, HealthStatus, Procedure, ProcedureKind};
use family_tasks_core::Database;

#[derive(Clone)]
pub struct McpServer {
    db: Database,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CallProcedureRequest {
    #[schemars(description = "Procedure name, e.g. createTask or getFamilyMembers")]
    pub procedure: String,
    #[schemars(description = "JSON payload for the procedure; omit for queries")]
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ProcedureInfo {
    pub name: &'static str,
    pub kind: ProcedureKind,
}

impl McpServer {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            tool_router: Self::tool_router(),
        }
    }

    fn to_mcp_error(err: ApiError) -> McpError {
        match err.kind() {
            ErrorKind::Store => McpError::internal_error(err.to_string(), None),
            _ => McpError::invalid_params(err.to_string(), None),
        }
    }

    fn run_procedure(&self, req: CallProcedureRequest) -> Result<Value, McpError> {
        let procedure = Procedure::from_str(&req.procedure)
            .ok_or_else(|| Self::to_mcp_error(ApiError::UnknownProcedure(req.procedure.clone())))?;

        dispatch(&self.db, procedure, req.params.unwrap_or(Value::Null)).map_err(Self::to_mcp_error)
    }

    fn json_result(value: &impl Serialize) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_router]
impl McpServer {
    #[tool(description = "Check that the family task server is up and report its clock")]
    async fn healthcheck(&self) -> Result<CallToolResult, McpError> {
        Self::json_result(&HealthStatus::now())
    }

    #[tool(description = "List every procedure and whether it is a query or a mutation")]
    async fn list_procedures(&self) -> Result<CallToolResult, McpError> {
        let procedures: Vec<ProcedureInfo> = Procedure::ALL
            .into_iter()
            .map(|procedure| ProcedureInfo {
                name: procedure.as_str(),
                kind: procedure.kind(),
            })
            .collect();
        Self::json_result(&procedures)
    }

    #[tool(description = "Call a family task procedure (members, categories, tasks) with a JSON payload")]
    async fn call_procedure(
        &self,
        params: Parameters<CallProcedureRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.run_procedure(params.0)?;
        Self::json_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Family Tasks MCP server: manage family members, categories and tasks".into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(db: Database) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(db);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
