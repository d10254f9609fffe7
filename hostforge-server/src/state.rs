use sqlx::PgPool;

use hostforge_core::catalog::Catalog;
use hostforge_core::ratelimit::FixedWindowLimiter;

use crate::checkout::CheckoutStore;
use crate::config::Config;
use crate::payments::PaymentGateways;
use crate::session::store::SessionStore;
use crate::whmcs::WhmcsClient;

/// Shared application state passed to all handlers via Axum's State
/// extractor.
pub struct AppState {
    pub config: Config,
    /// Postgres pool for the status subsystem. `None` disables it.
    pub pool: Option<PgPool>,
    pub catalog: Catalog,
    /// In-memory login sessions keyed by token.
    pub sessions: SessionStore,
    /// In-flight checkout sessions keyed by session id.
    pub checkouts: CheckoutStore,
    /// Fixed-window request counters.
    pub limiter: FixedWindowLimiter,
    pub whmcs: WhmcsClient,
    pub gateways: PaymentGateways,
    /// Shared HTTP client for the status checker.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, pool: Option<PgPool>) -> Self {
        let http = reqwest::Client::new();
        let whmcs = WhmcsClient::new(config.whmcs.clone(), http.clone());
        let gateways = PaymentGateways::new(&config, http.clone());
        let checkouts = CheckoutStore::new(config.checkout_ttl_secs);

        Self {
            config,
            pool,
            catalog: Catalog::builtin(),
            sessions: SessionStore::new(),
            checkouts,
            limiter: FixedWindowLimiter::new(),
            whmcs,
            gateways,
            http,
        }
    }
}
