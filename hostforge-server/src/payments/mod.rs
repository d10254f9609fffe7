//! Payment provider integrations.
//!
//! Every gateway is mock-capable: missing credentials select mock mode,
//! where responses are fabricated deterministically and flagged
//! `"mock": true`. Amounts always come from the stored checkout session,
//! never from the client.

pub mod crypto;
pub mod paypal;
pub mod paysafe;
pub mod stripe;

use crate::config::Config;

pub use paypal::PaypalGateway;
pub use stripe::StripeGateway;

/// All configured gateways, built once at startup and shared via state.
pub struct PaymentGateways {
    pub stripe: StripeGateway,
    pub paypal: PaypalGateway,
}

impl PaymentGateways {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            stripe: StripeGateway::new(
                config.stripe_secret_key.clone(),
                config.stripe_webhook_secret.clone(),
                http.clone(),
            ),
            paypal: PaypalGateway::new(
                config.paypal_client_id.clone(),
                config.paypal_client_secret.clone(),
                config.paypal_mode.clone(),
                http,
            ),
        }
    }
}

/// Render cents as a decimal amount string ("1234" -> "12.34").
pub(crate) fn cents_to_decimal(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cents_to_decimal() {
        assert_eq!(cents_to_decimal(999), "9.99");
        assert_eq!(cents_to_decimal(10_189), "101.89");
        assert_eq!(cents_to_decimal(5), "0.05");
        assert_eq!(cents_to_decimal(100), "1.00");
    }
}
