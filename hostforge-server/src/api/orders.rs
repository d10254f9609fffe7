use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use hostforge_core::checkout::{
    resolve_entry, CheckoutStep, DetailsInput, EntryParams, EntryResolution, OrderSession,
    PaymentMethod,
};
use hostforge_core::traits::{Clock, SystemClock};

use crate::api::ok;
use crate::error::{Result, ServerError};
use crate::session::require_session;
use crate::state::AppState;

/// Checkout entry request: the storefront forwards its URL query
/// parameters verbatim.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutEntryRequest {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub billing: Option<String>,
    /// A previously issued checkout session id to re-attach to.
    #[serde(default)]
    pub session: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectPaymentRequest {
    pub method: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub session: String,
}

fn session_json(session: &OrderSession) -> Value {
    json!({ "kind": "session", "session": session })
}

fn parse_session_id(raw: &str) -> Result<Uuid> {
    raw.parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid checkout session id {raw}")))
}

/// POST /api/orders/checkout
///
/// Resolve the URL-driven entry point. An existing session wins; then a
/// resolvable plan (its product implied); then a bare product directs to
/// plan selection; anything else lands on the catalog root.
pub async fn checkout_entry(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckoutEntryRequest>,
) -> Result<Response> {
    checkout_entry_inner(&state, req).await
}

async fn checkout_entry_inner(
    state: &Arc<AppState>,
    req: CheckoutEntryRequest,
) -> Result<Response> {
    // Re-attach to a live session when the caller has one. Unknown or
    // expired ids fall through to fresh resolution.
    if let Some(raw) = req.session.as_deref() {
        if let Ok(id) = raw.parse::<Uuid>() {
            if let Some(session) = state.checkouts.get(id) {
                return Ok(ok(session_json(&session)).into_response());
            }
        }
        tracing::debug!(session = raw, "stale checkout session, resolving fresh");
    }

    let params = EntryParams {
        product: req.product,
        plan: req.plan,
        billing: req.billing,
    };

    match resolve_entry(&state.catalog, &params)? {
        EntryResolution::NewOrder {
            plan_id,
            billing_cycle,
            ..
        } => {
            let session = OrderSession::new(
                &state.catalog,
                &plan_id,
                billing_cycle,
                SystemClock.now_secs(),
            )?;
            state.checkouts.insert(session.clone());
            tracing::info!(session = %session.id, plan = %plan_id, "checkout session created");
            Ok(ok(session_json(&session)).into_response())
        }
        EntryResolution::SelectPlan { product_slug } => {
            let plans = state.catalog.plans_for(&product_slug);
            Ok(ok(json!({
                "kind": "select_plan",
                "product_slug": product_slug,
                "plans": plans,
            }))
            .into_response())
        }
        EntryResolution::CatalogRoot => Ok(ok(json!({
            "kind": "catalog",
            "products": state.catalog.products(),
        }))
        .into_response()),
    }
}

/// POST /api/orders/checkout/{id}/details
pub async fn submit_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<DetailsInput>,
) -> Result<Response> {
    submit_details_inner(&state, &id, input)
}

fn submit_details_inner(state: &Arc<AppState>, id: &str, input: DetailsInput) -> Result<Response> {
    let id = parse_session_id(id)?;
    let session = state
        .checkouts
        .update(id, |s, now| s.submit_details(&input, now).map_err(Into::into))?;
    Ok(ok(session_json(&session)).into_response())
}

/// POST /api/orders/checkout/{id}/payment
pub async fn select_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SelectPaymentRequest>,
) -> Result<Response> {
    select_payment_inner(&state, &id, req)
}

fn select_payment_inner(
    state: &Arc<AppState>,
    id: &str,
    req: SelectPaymentRequest,
) -> Result<Response> {
    let id = parse_session_id(id)?;
    let method = PaymentMethod::parse(&req.method)?;
    let session = state
        .checkouts
        .update(id, |s, now| s.select_payment(method, now).map_err(Into::into))?;
    Ok(ok(session_json(&session)).into_response())
}

/// POST /api/orders/place
///
/// Place the order for the authenticated client. The checkout session
/// must be at the payment step with a method selected; the order lands in
/// the billing backend under the mapped product id, and the session is
/// dropped once placed.
pub async fn place(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Response> {
    place_inner(&state, &headers, req).await
}

async fn place_inner(
    state: &Arc<AppState>,
    headers: &HeaderMap,
    req: PlaceOrderRequest,
) -> Result<Response> {
    let auth = require_session(state, headers)?;
    let id = parse_session_id(&req.session)?;

    let session = state
        .checkouts
        .get(id)
        .ok_or_else(|| ServerError::NotFound(format!("checkout session {id} not found")))?;

    if session.step != CheckoutStep::Payment {
        return Err(ServerError::BadRequest(format!(
            "checkout session is at step {:?}, not ready to place",
            session.step
        )));
    }
    let Some(method) = session.payment_method else {
        return Err(ServerError::BadRequest(
            "no payment method selected".to_string(),
        ));
    };

    let product_id = state
        .catalog
        .whmcs_product_id(&session.plan_id)
        .ok_or_else(|| {
            ServerError::Internal(format!("plan {} has no billing mapping", session.plan_id))
        })?;

    let method_name = match method {
        PaymentMethod::Stripe => "stripe",
        PaymentMethod::Paypal => "paypal",
        PaymentMethod::Crypto => "crypto",
        PaymentMethod::Paysafe => "paysafe",
    };

    let placed = state
        .whmcs
        .add_order(&auth.client_id, product_id, session.billing_cycle, method_name)
        .await?;

    // Only a placed order retires the session.
    let _ = state
        .checkouts
        .update(id, |s, now| s.complete(now).map_err(Into::into));
    state.checkouts.remove(id);

    tracing::info!(
        client_id = %auth.client_id,
        order_id = %placed.order_id,
        plan = %session.plan_id,
        "order placed"
    );

    Ok(ok(json!({
        "order_id": placed.order_id,
        "invoice_id": placed.invoice_id,
        "amount_cents": session.amount_cents,
    }))
    .into_response())
}

/// GET /api/orders/list
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    list_inner(&state, &headers).await
}

async fn list_inner(state: &Arc<AppState>, headers: &HeaderMap) -> Result<Response> {
    let auth = require_session(state, headers)?;
    let orders = state.whmcs.get_orders(&auth.client_id).await?;
    Ok(ok(json!({ "orders": orders })).into_response())
}

/// POST /api/orders
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
        ["checkout"] => checkout_entry_inner(&state, parse_body(body)?).await,
        ["checkout", id, "details"] => {
            let id = id.to_string();
            submit_details_inner(&state, &id, parse_body(body)?)
        }
        ["checkout", id, "payment"] => {
            let id = id.to_string();
            select_payment_inner(&state, &id, parse_body(body)?)
        }
        ["place"] => place_inner(&state, &headers, parse_body(body)?).await,
        ["list"] => list_inner(&state, &headers).await,
        _ => Err(ServerError::NotFound(format!("unknown orders path {path}"))),
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| ServerError::BadRequest(format!("invalid body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;
    use axum::http::StatusCode;

    use hostforge_core::catalog::BillingCycle;

    use crate::config::Config;
    use crate::session::jwt;
    use crate::session::store::SessionData;
    use crate::whmcs::mock;

    fn test_state() -> Arc<AppState> {
        let config = Config {
            port: 0,
            database_url: None,
            allowed_origins: vec![],
            jwt_secret: "test-secret".to_string(),
            session_ttl_secs: 3_600,
            checkout_ttl_secs: 600,
            whmcs: None,
            stripe_secret_key: None,
            stripe_webhook_secret: None,
            paypal_client_id: None,
            paypal_client_secret: None,
            paypal_mode: "sandbox".to_string(),
            dev_mode: true,
            status_check_interval_secs: 60,
        };
        Arc::new(AppState::new(config, None))
    }

    fn auth_headers(state: &Arc<AppState>) -> HeaderMap {
        let token = jwt::issue(
            &state.config.jwt_secret,
            mock::DEMO_CLIENT_ID,
            mock::DEMO_EMAIL,
            mock::DEMO_NAME,
            "client",
            3_600,
        )
        .unwrap();
        let now = chrono::Utc::now().timestamp() as u64;
        state.sessions.insert(
            token.clone(),
            SessionData {
                client_id: mock::DEMO_CLIENT_ID.to_string(),
                email: mock::DEMO_EMAIL.to_string(),
                name: mock::DEMO_NAME.to_string(),
                role: "client".to_string(),
                expires_at: now + 3_600,
            },
        );
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
        headers
    }

    fn details() -> DetailsInput {
        DetailsInput {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            country: "GB".to_string(),
            postcode: None,
        }
    }

    fn seeded_session(state: &Arc<AppState>) -> Uuid {
        let session = OrderSession::new(
            &state.catalog,
            "mc-iron",
            BillingCycle::Annual,
            SystemClock.now_secs(),
        )
        .unwrap();
        let id = session.id;
        state.checkouts.insert(session);
        id
    }

    #[tokio::test]
    async fn test_entry_with_plan_creates_session() {
        let state = test_state();
        let resp = checkout_entry_inner(
            &state,
            CheckoutEntryRequest {
                product: None,
                plan: Some("mc-iron".to_string()),
                billing: Some("annual".to_string()),
                session: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.checkouts.len(), 1);
    }

    #[tokio::test]
    async fn test_entry_reattaches_to_live_session() {
        let state = test_state();
        let id = seeded_session(&state);
        let resp = checkout_entry_inner(
            &state,
            CheckoutEntryRequest {
                product: None,
                plan: None,
                billing: None,
                session: Some(id.to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        // Re-attaching must not have created a second session.
        assert_eq!(state.checkouts.len(), 1);
    }

    #[tokio::test]
    async fn test_entry_with_stale_session_falls_through() {
        let state = test_state();
        let resp = checkout_entry_inner(
            &state,
            CheckoutEntryRequest {
                product: Some("valheim".to_string()),
                plan: None,
                billing: None,
                session: Some(Uuid::new_v4().to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.checkouts.len(), 0);
    }

    #[tokio::test]
    async fn test_place_requires_auth() {
        let state = test_state();
        let id = seeded_session(&state);
        let err = place_inner(
            &state,
            &HeaderMap::new(),
            PlaceOrderRequest {
                session: id.to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServerError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_place_refuses_unready_session() {
        let state = test_state();
        let id = seeded_session(&state);
        let headers = auth_headers(&state);
        // Still at the details step.
        let err = place_inner(
            &state,
            &headers,
            PlaceOrderRequest {
                session: id.to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
        // The session survives a refused place.
        assert!(state.checkouts.get(id).is_some());
    }

    #[tokio::test]
    async fn test_full_checkout_flow_places_and_retires() {
        let state = test_state();
        let id = seeded_session(&state);

        submit_details_inner(&state, &id.to_string(), details()).unwrap();
        select_payment_inner(
            &state,
            &id.to_string(),
            SelectPaymentRequest {
                method: "stripe".to_string(),
            },
        )
        .unwrap();

        let headers = auth_headers(&state);
        let resp = place_inner(
            &state,
            &headers,
            PlaceOrderRequest {
                session: id.to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        // A placed order retires its checkout session.
        assert!(state.checkouts.get(id).is_none());
    }

    #[tokio::test]
    async fn test_unknown_payment_method_rejected() {
        let state = test_state();
        let id = seeded_session(&state);
        submit_details_inner(&state, &id.to_string(), details()).unwrap();
        let err = select_payment_inner(
            &state,
            &id.to_string(),
            SelectPaymentRequest {
                method: "barter".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }
}
