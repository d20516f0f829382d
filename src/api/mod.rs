//! HTTP transport for the request contract.
//!
//! Every procedure lives at `/rpc/{procedure}`. Mutations take `POST` with a
//! JSON body; queries also answer `GET` and ignore the body.

mod error;
mod procedures;
mod response;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::Method,
    routing::get,
    Json, Router,
};
use family_tasks_core::Database;
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::{ApiError, ErrorKind};
pub use procedures::{dispatch, HealthStatus, Procedure, ProcedureKind};
pub use response::{ApiResponse, ErrorBody};

pub fn create_router(db: Database) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/rpc/{procedure}", get(call_procedure).post(call_procedure))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(db)
}

async fn health() -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(HealthStatus::now()))
}

async fn call_procedure(
    State(db): State<Database>,
    method: Method,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let procedure =
        Procedure::from_str(&name).ok_or_else(|| ApiError::UnknownProcedure(name.clone()))?;

    if method == Method::GET && !procedure.is_query() {
        return Err(ApiError::MethodNotAllowed(name));
    }

    let params = parse_body(&body)?;
    // rusqlite blocks; keep it off the async workers
    let data = tokio::task::spawn_blocking(move || dispatch(&db, procedure, params))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(ApiResponse::success(data)))
}

fn parse_body(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidPayload(e.to_string()))
}
