use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::ok;
use crate::error::{Result, ServerError};
use crate::session::require_session;
use crate::state::AppState;

/// Cancellation request body. `cancellation_type` uses the billing
/// backend's spellings.
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub cancellation_type: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// GET /api/services/list
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    list_inner(&state, &headers).await
}

async fn list_inner(state: &Arc<AppState>, headers: &HeaderMap) -> Result<Response> {
    let auth = require_session(state, headers)?;
    let services = state.whmcs.get_services(&auth.client_id).await?;
    Ok(ok(json!({ "services": services })).into_response())
}

/// GET /api/services/{id}
pub async fn detail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response> {
    detail_inner(&state, &headers, &id).await
}

async fn detail_inner(state: &Arc<AppState>, headers: &HeaderMap, id: &str) -> Result<Response> {
    let auth = require_session(state, headers)?;
    let service = state.whmcs.get_service(&auth.client_id, id).await?;
    Ok(ok(json!({ "service": service })).into_response())
}

/// POST /api/services/{id}/cancel
///
/// File a cancellation request for one of the client's services.
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<CancelRequest>,
) -> Result<Response> {
    cancel_inner(&state, &headers, &id, req).await
}

async fn cancel_inner(
    state: &Arc<AppState>,
    headers: &HeaderMap,
    id: &str,
    req: CancelRequest,
) -> Result<Response> {
    let auth = require_session(state, headers)?;

    let cancellation_type = match req.cancellation_type.as_str() {
        "Immediate" | "End of Billing Period" => req.cancellation_type.as_str(),
        other => {
            return Err(ServerError::BadRequest(format!(
                "invalid cancellation type '{other}'"
            )))
        }
    };

    let result = state
        .whmcs
        .cancel_service(&auth.client_id, id, cancellation_type, req.reason.as_deref())
        .await?;

    tracing::info!(client_id = %auth.client_id, service_id = id, "cancellation requested");
    Ok(ok(json!({ "cancellation": result })).into_response())
}

/// POST /api/services
///
/// Legacy entry point with a `path` field in the body.
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response> {
    let path = body["path"]
        .as_str()
        .ok_or_else(|| ServerError::BadRequest("path is required".to_string()))?
        .trim_matches('/')
        .to_string();
    let segments: Vec<&str> = path.split('/').collect();

    match segments.as_slice() {
        ["list"] => list_inner(&state, &headers).await,
        [id, "cancel"] => {
            let id = id.to_string();
            let req = serde_json::from_value(body)
                .map_err(|e| ServerError::BadRequest(format!("invalid body: {e}")))?;
            cancel_inner(&state, &headers, &id, req).await
        }
        [id] => detail_inner(&state, &headers, id).await,
        _ => Err(ServerError::NotFound(format!(
            "unknown services path {path}"
        ))),
    }
}
