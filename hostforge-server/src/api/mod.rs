pub mod auth;
pub mod invoices;
pub mod orders;
pub mod payments;
pub mod services;
pub mod status;
pub mod tickets;
pub mod webhooks;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN, USER_AGENT};
use axum::http::{HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use hostforge_core::ratelimit::{client_key, RateScope};
use hostforge_core::traits::SystemClock;

use crate::error::ServerError;
use crate::state::AppState;

/// Wrap a successful payload in the uniform response envelope.
pub(crate) fn ok(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Build the Axum router with all API routes, CORS, rate limiting, and
/// tracing middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            state
                .config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        ))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
        .route("/", post(auth::dispatch));

    let order_routes = Router::new()
        .route("/checkout", post(orders::checkout_entry))
        .route("/checkout/:id/details", post(orders::submit_details))
        .route("/checkout/:id/payment", post(orders::select_payment))
        .route("/place", post(orders::place))
        .route("/list", get(orders::list))
        .route("/", post(orders::dispatch));

    let invoice_routes = Router::new()
        .route("/list", get(invoices::list))
        .route("/:id", get(invoices::detail))
        .route("/", post(invoices::dispatch));

    let service_routes = Router::new()
        .route("/list", get(services::list))
        .route("/:id", get(services::detail))
        .route("/:id/cancel", post(services::cancel))
        .route("/", post(services::dispatch));

    let ticket_routes = Router::new()
        .route("/list", get(tickets::list))
        .route("/open", post(tickets::open))
        .route("/:id/reply", post(tickets::reply))
        .route("/", post(tickets::dispatch));

    let payment_routes = Router::new()
        .route("/stripe/intent", post(payments::stripe_intent))
        .route("/stripe/confirm", post(payments::stripe_confirm))
        .route("/paypal/order", post(payments::paypal_order))
        .route("/paypal/capture", post(payments::paypal_capture))
        .route("/crypto/invoice", post(payments::crypto_invoice))
        .route("/paysafe/session", post(payments::paysafe_session))
        .route("/", post(payments::dispatch));

    let webhook_routes = Router::new()
        .route("/stripe", post(webhooks::stripe))
        .route("/paypal", post(webhooks::paypal))
        .route("/crypto", post(webhooks::crypto))
        .route("/paysafe", post(webhooks::paysafe));

    let status_routes = Router::new()
        .route("/monitors", get(status::list_monitors).post(status::create_monitor))
        .route("/monitors/:id/history", get(status::history));

    let catalog_routes = Router::new()
        .route("/products", get(catalog_products))
        .route("/products/:slug", get(catalog_product));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/invoices", invoice_routes)
        .nest("/api/services", service_routes)
        .nest("/api/tickets", ticket_routes)
        .nest("/api/payments", payment_routes)
        .nest("/api/webhooks", webhook_routes)
        .nest("/api/status", status_routes)
        .nest("/api/catalog", catalog_routes)
        .route("/health", get(health_check))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Simple health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

/// GET /api/catalog/products
///
/// The full catalog: products with their plans.
async fn catalog_products(State(state): State<Arc<AppState>>) -> Json<Value> {
    let products: Vec<Value> = state
        .catalog
        .products()
        .iter()
        .map(|product| {
            json!({
                "product": product,
                "plans": state.catalog.plans_for(product.slug),
            })
        })
        .collect();
    ok(json!({ "products": products }))
}

/// GET /api/catalog/products/{slug}
async fn catalog_product(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(slug): axum::extract::Path<String>,
) -> Result<Json<Value>, ServerError> {
    let product = state.catalog.product(&slug)?;
    Ok(ok(json!({
        "product": product,
        "plans": state.catalog.plans_for(product.slug),
    })))
}

/// Which rate scope a request falls under, by path prefix.
fn scope_for_path(path: &str) -> RateScope {
    if path.starts_with("/api/auth") {
        RateScope::Auth
    } else if path.starts_with("/api/orders") || path.starts_with("/api/payments") {
        RateScope::Order
    } else {
        RateScope::General
    }
}

/// Fixed-window rate limiting, keyed by client IP with a UA+Origin
/// fallback. Rejections answer 429 with the seconds until the window
/// resets.
async fn rate_limit(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let scope = scope_for_path(req.uri().path());

    let headers = req.headers();
    let forwarded_ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string());
    let peer_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string());
    let ip = forwarded_ip.or(peer_ip);

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let origin = headers
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let key = client_key(ip.as_deref(), user_agent, origin);

    if let Err(err) = state.limiter.check(scope, &key, &SystemClock) {
        return ServerError::from(err).into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_for_path() {
        assert_eq!(scope_for_path("/api/auth/login"), RateScope::Auth);
        assert_eq!(scope_for_path("/api/orders/checkout"), RateScope::Order);
        assert_eq!(scope_for_path("/api/payments/stripe/intent"), RateScope::Order);
        assert_eq!(scope_for_path("/api/tickets/list"), RateScope::General);
        assert_eq!(scope_for_path("/health"), RateScope::General);
    }
}
