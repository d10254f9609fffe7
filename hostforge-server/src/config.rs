use std::env;

use hostforge_core::constants::{CHECKOUT_TTL_SECS, SESSION_TTL_SECS};

/// WHMCS API credentials. All three must be present for live mode.
#[derive(Clone)]
pub struct WhmcsCredentials {
    pub url: String,
    pub identifier: String,
    pub secret: String,
}

/// Server configuration loaded from environment variables.
///
/// Credentials that are absent put the corresponding subsystem into mock
/// mode rather than failing startup; `DATABASE_URL` being absent disables
/// the status subsystem only.
#[derive(Clone)]
pub struct Config {
    /// Port for the HTTP listener.
    pub port: u16,
    /// PostgreSQL connection URL for the status subsystem.
    pub database_url: Option<String>,
    /// Exact-match CORS origin allow-list.
    pub allowed_origins: Vec<String>,
    /// HS256 signing secret for session tokens.
    pub jwt_secret: String,
    /// Login session lifetime in seconds.
    pub session_ttl_secs: u64,
    /// Checkout session idle lifetime in seconds.
    pub checkout_ttl_secs: u64,
    /// WHMCS credentials; `None` selects mock mode.
    pub whmcs: Option<WhmcsCredentials>,
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub paypal_client_id: Option<String>,
    pub paypal_client_secret: Option<String>,
    /// "sandbox" or "live".
    pub paypal_mode: String,
    /// Relaxes webhook signature enforcement when no secret is configured.
    pub dev_mode: bool,
    /// Interval between status-monitor probe rounds.
    pub status_check_interval_secs: u64,
}

fn opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let whmcs = match (opt("WHMCS_URL"), opt("WHMCS_IDENTIFIER"), opt("WHMCS_SECRET")) {
            (Some(url), Some(identifier), Some(secret)) => Some(WhmcsCredentials {
                url: url.trim_end_matches('/').to_string(),
                identifier,
                secret,
            }),
            _ => None,
        };

        let jwt_secret = opt("JWT_SECRET").unwrap_or_else(|| {
            let generated = uuid::Uuid::new_v4().to_string();
            tracing::warn!(
                "JWT_SECRET not set, using an ephemeral secret; sessions will not survive restarts"
            );
            generated
        });

        let allowed_origins = opt("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".to_string())
            .split(',')
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Self {
            port: parsed_or("PORT", 8080),
            database_url: opt("DATABASE_URL"),
            allowed_origins,
            jwt_secret,
            session_ttl_secs: parsed_or("SESSION_TTL_SECS", SESSION_TTL_SECS),
            checkout_ttl_secs: parsed_or("CHECKOUT_TTL_SECS", CHECKOUT_TTL_SECS),
            whmcs,
            stripe_secret_key: opt("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: opt("STRIPE_WEBHOOK_SECRET"),
            paypal_client_id: opt("PAYPAL_CLIENT_ID"),
            paypal_client_secret: opt("PAYPAL_CLIENT_SECRET"),
            paypal_mode: opt("PAYPAL_MODE").unwrap_or_else(|| "sandbox".to_string()),
            dev_mode: matches!(
                env::var("DEV_MODE").as_deref(),
                Ok("1") | Ok("true") | Ok("TRUE")
            ),
            status_check_interval_secs: parsed_or("STATUS_CHECK_INTERVAL_SECS", 60),
        }
    }
}
