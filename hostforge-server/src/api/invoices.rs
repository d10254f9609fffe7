use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::api::ok;
use crate::error::{Result, ServerError};
use crate::session::require_session;
use crate::state::AppState;

/// GET /api/invoices/list
///
/// The authenticated client's invoices.
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    list_inner(&state, &headers).await
}

async fn list_inner(state: &Arc<AppState>, headers: &HeaderMap) -> Result<Response> {
    let auth = require_session(state, headers)?;
    let invoices = state.whmcs.get_invoices(&auth.client_id).await?;
    Ok(ok(json!({ "invoices": invoices })).into_response())
}

/// GET /api/invoices/{id}
///
/// One invoice; 404 unless it exists and belongs to the client.
pub async fn detail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response> {
    detail_inner(&state, &headers, &id).await
}

async fn detail_inner(state: &Arc<AppState>, headers: &HeaderMap, id: &str) -> Result<Response> {
    let auth = require_session(state, headers)?;
    let invoice = state.whmcs.get_invoice(&auth.client_id, id).await?;
    Ok(ok(json!({ "invoice": invoice })).into_response())
}

/// POST /api/invoices
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
        [id] => detail_inner(&state, &headers, id).await,
        _ => Err(ServerError::NotFound(format!(
            "unknown invoices path {path}"
        ))),
    }
}
