use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use hostforge_core::validate;

use crate::api::ok;
use crate::error::{Result, ServerError};
use crate::session::require_session;
use crate::state::AppState;

/// New ticket request body.
#[derive(Debug, Deserialize)]
pub struct OpenTicketRequest {
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub department_id: Option<u32>,
}

/// Ticket reply request body.
#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub message: String,
}

/// GET /api/tickets/list
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    list_inner(&state, &headers).await
}

async fn list_inner(state: &Arc<AppState>, headers: &HeaderMap) -> Result<Response> {
    let auth = require_session(state, headers)?;
    let tickets = state.whmcs.get_tickets(&auth.client_id).await?;
    Ok(ok(json!({ "tickets": tickets })).into_response())
}

/// POST /api/tickets/open
pub async fn open(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<OpenTicketRequest>,
) -> Result<Response> {
    open_inner(&state, &headers, req).await
}

async fn open_inner(
    state: &Arc<AppState>,
    headers: &HeaderMap,
    req: OpenTicketRequest,
) -> Result<Response> {
    let auth = require_session(state, headers)?;
    let subject = validate::subject(&req.subject)?;
    let message = validate::message_body(&req.message)?;

    let ticket = state
        .whmcs
        .open_ticket(&auth.client_id, req.department_id, &subject, &message)
        .await?;

    tracing::info!(client_id = %auth.client_id, "ticket opened");
    Ok(ok(json!({ "ticket": ticket })).into_response())
}

/// POST /api/tickets/{id}/reply
pub async fn reply(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<ReplyRequest>,
) -> Result<Response> {
    reply_inner(&state, &headers, &id, req).await
}

async fn reply_inner(
    state: &Arc<AppState>,
    headers: &HeaderMap,
    id: &str,
    req: ReplyRequest,
) -> Result<Response> {
    let auth = require_session(state, headers)?;
    let message = validate::message_body(&req.message)?;

    let result = state
        .whmcs
        .reply_ticket(&auth.client_id, id, &message)
        .await?;

    Ok(ok(json!({ "reply": result })).into_response())
}

/// POST /api/tickets
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
        ["open"] => {
            let req = serde_json::from_value(body)
                .map_err(|e| ServerError::BadRequest(format!("invalid body: {e}")))?;
            open_inner(&state, &headers, req).await
        }
        [id, "reply"] => {
            let id = id.to_string();
            let req = serde_json::from_value(body)
                .map_err(|e| ServerError::BadRequest(format!("invalid body: {e}")))?;
            reply_inner(&state, &headers, &id, req).await
        }
        _ => Err(ServerError::NotFound(format!(
            "unknown tickets path {path}"
        ))),
    }
}
