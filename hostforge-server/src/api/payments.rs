use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use hostforge_core::checkout::OrderSession;
use hostforge_core::constants::CURRENCY;

use crate::api::ok;
use crate::error::{Result, ServerError};
use crate::payments::{crypto, paysafe};
use crate::state::AppState;

/// Request naming the checkout session a payment is for. The charge
/// amount always comes from the stored session, never from the client.
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub session: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub intent_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CaptureRequest {
    pub order_id: String,
}

/// Fetch the live checkout session a payment refers to.
fn checkout_session(state: &Arc<AppState>, raw: &str) -> Result<OrderSession> {
    let id: Uuid = raw
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid checkout session id {raw}")))?;
    state
        .checkouts
        .get(id)
        .ok_or_else(|| ServerError::NotFound(format!("checkout session {id} not found")))
}

/// POST /api/payments/stripe/intent
pub async fn stripe_intent(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Response> {
    stripe_intent_inner(&state, req).await
}

async fn stripe_intent_inner(state: &Arc<AppState>, req: SessionRequest) -> Result<Response> {
    let session = checkout_session(state, &req.session)?;
    let intent = state
        .gateways
        .stripe
        .create_intent(session.amount_cents, CURRENCY, &session.id.to_string())
        .await?;
    Ok(ok(intent).into_response())
}

/// POST /api/payments/stripe/confirm
pub async fn stripe_confirm(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Response> {
    stripe_confirm_inner(&state, req).await
}

async fn stripe_confirm_inner(state: &Arc<AppState>, req: ConfirmRequest) -> Result<Response> {
    let result = state.gateways.stripe.confirm_intent(&req.intent_id).await?;
    Ok(ok(result).into_response())
}

/// POST /api/payments/paypal/order
pub async fn paypal_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Response> {
    paypal_order_inner(&state, req).await
}

async fn paypal_order_inner(state: &Arc<AppState>, req: SessionRequest) -> Result<Response> {
    let session = checkout_session(state, &req.session)?;
    let order = state
        .gateways
        .paypal
        .create_order(session.amount_cents, CURRENCY)
        .await?;
    Ok(ok(order).into_response())
}

/// POST /api/payments/paypal/capture
pub async fn paypal_capture(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CaptureRequest>,
) -> Result<Response> {
    paypal_capture_inner(&state, req).await
}

async fn paypal_capture_inner(state: &Arc<AppState>, req: CaptureRequest) -> Result<Response> {
    let result = state.gateways.paypal.capture_order(&req.order_id).await?;
    Ok(ok(result).into_response())
}

/// POST /api/payments/crypto/invoice
pub async fn crypto_invoice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Response> {
    crypto_invoice_inner(&state, req)
}

fn crypto_invoice_inner(state: &Arc<AppState>, req: SessionRequest) -> Result<Response> {
    let session = checkout_session(state, &req.session)?;
    let invoice = crypto::create_invoice(session.amount_cents, CURRENCY, &session.id.to_string());
    Ok(ok(invoice).into_response())
}

/// POST /api/payments/paysafe/session
pub async fn paysafe_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Response> {
    paysafe_session_inner(&state, req)
}

fn paysafe_session_inner(state: &Arc<AppState>, req: SessionRequest) -> Result<Response> {
    let session = checkout_session(state, &req.session)?;
    let paysafe =
        paysafe::create_session(session.amount_cents, CURRENCY, &session.id.to_string());
    Ok(ok(paysafe).into_response())
}

/// POST /api/payments
///
/// Legacy entry point with a `path` field in the body.
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Response> {
    let path = body["path"]
        .as_str()
        .ok_or_else(|| ServerError::BadRequest("path is required".to_string()))?
        .trim_matches('/')
        .to_string();
    let segments: Vec<&str> = path.split('/').collect();

    match segments.as_slice() {
        ["stripe", "intent"] => stripe_intent_inner(&state, parse_body(body)?).await,
        ["stripe", "confirm"] => stripe_confirm_inner(&state, parse_body(body)?).await,
        ["paypal", "order"] => paypal_order_inner(&state, parse_body(body)?).await,
        ["paypal", "capture"] => paypal_capture_inner(&state, parse_body(body)?).await,
        ["crypto", "invoice"] => crypto_invoice_inner(&state, parse_body(body)?),
        ["paysafe", "session"] => paysafe_session_inner(&state, parse_body(body)?),
        _ => Err(ServerError::NotFound(format!(
            "unknown payments path {path}"
        ))),
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| ServerError::BadRequest(format!("invalid body: {e}")))
}
