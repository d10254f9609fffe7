use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;

use crate::error::{Result, ServerError};

type HmacSha256 = Hmac<Sha256>;

/// Webhook timestamp tolerance in seconds. Events signed further in the
/// past are treated as replays.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Stripe PaymentIntent gateway. Mock mode without a secret key.
pub struct StripeGateway {
    secret_key: Option<String>,
    webhook_secret: Option<String>,
    http: reqwest::Client,
}

impl StripeGateway {
    pub fn new(
        secret_key: Option<String>,
        webhook_secret: Option<String>,
        http: reqwest::Client,
    ) -> Self {
        if secret_key.is_none() {
            tracing::info!("Stripe key absent, gateway in mock mode");
        }
        Self {
            secret_key,
            webhook_secret,
            http,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.secret_key.is_none()
    }

    pub fn has_webhook_secret(&self) -> bool {
        self.webhook_secret.is_some()
    }

    /// Create a PaymentIntent for a checkout session's amount.
    pub async fn create_intent(
        &self,
        amount_cents: u64,
        currency: &str,
        order_ref: &str,
    ) -> Result<Value> {
        let Some(key) = &self.secret_key else {
            return Ok(json!({
                "intent_id": format!("pi_mock_{order_ref}"),
                "client_secret": format!("pi_mock_{order_ref}_secret"),
                "amount_cents": amount_cents,
                "currency": currency,
                "status": "requires_confirmation",
                "mock": true,
            }));
        };

        let response = self
            .http
            .post("https://api.stripe.com/v1/payment_intents")
            .bearer_auth(key)
            .form(&[
                ("amount", amount_cents.to_string()),
                ("currency", currency.to_string()),
                ("metadata[order_ref]", order_ref.to_string()),
            ])
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("Stripe request failed: {e}")))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ServerError::Upstream(format!("Stripe response was not JSON: {e}")))?;

        if let Some(err) = body["error"]["message"].as_str() {
            return Err(ServerError::Upstream(format!("Stripe error: {err}")));
        }

        Ok(json!({
            "intent_id": body["id"],
            "client_secret": body["client_secret"],
            "amount_cents": amount_cents,
            "currency": currency,
            "status": body["status"],
        }))
    }

    /// Confirm a PaymentIntent.
    pub async fn confirm_intent(&self, intent_id: &str) -> Result<Value> {
        let Some(key) = &self.secret_key else {
            return Ok(json!({
                "intent_id": intent_id,
                "status": "succeeded",
                "mock": true,
            }));
        };

        let url = format!("https://api.stripe.com/v1/payment_intents/{intent_id}/confirm");
        let response = self
            .http
            .post(&url)
            .bearer_auth(key)
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("Stripe request failed: {e}")))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ServerError::Upstream(format!("Stripe response was not JSON: {e}")))?;

        if let Some(err) = body["error"]["message"].as_str() {
            return Err(ServerError::Upstream(format!("Stripe error: {err}")));
        }

        Ok(json!({
            "intent_id": body["id"],
            "status": body["status"],
        }))
    }

    /// Verify a `Stripe-Signature` header against the raw request body.
    ///
    /// The header carries `t=<unix-ts>,v1=<hex hmac>` where the HMAC is
    /// SHA-256 over `"{t}.{body}"` keyed by the webhook secret. The compare
    /// is constant-time and timestamps older than the tolerance are
    /// rejected. Anything malformed verifies false rather than erroring.
    pub fn verify_webhook_signature(&self, payload: &[u8], header: &str) -> Result<bool> {
        let secret = self
            .webhook_secret
            .as_ref()
            .ok_or_else(|| ServerError::Internal("no Stripe webhook secret".to_string()))?;

        let mut timestamp: Option<&str> = None;
        let mut signature: Option<&str> = None;
        for part in header.split(',') {
            let part = part.trim();
            if let Some(t) = part.strip_prefix("t=") {
                timestamp = Some(t);
            } else if let Some(v1) = part.strip_prefix("v1=") {
                signature = Some(v1);
            }
        }
        let (Some(timestamp), Some(signature)) = (timestamp, signature) else {
            return Ok(false);
        };

        let Ok(ts) = timestamp.parse::<i64>() else {
            return Ok(false);
        };
        let now = chrono::Utc::now().timestamp();
        if (now - ts).abs() > SIGNATURE_TOLERANCE_SECS {
            return Ok(false);
        }

        let Ok(expected) = hex::decode(signature) else {
            return Ok(false);
        };

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| ServerError::Internal(format!("HMAC init failed: {e}")))?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);

        Ok(mac.verify_slice(&expected).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEBHOOK_SECRET: &str = "whsec_test123secret456";

    fn gateway() -> StripeGateway {
        StripeGateway::new(
            None,
            Some(WEBHOOK_SECRET.to_string()),
            reqwest::Client::new(),
        )
    }

    fn sign(payload: &[u8], secret: &str, timestamp: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, String::from_utf8_lossy(payload)).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn now_ts() -> String {
        chrono::Utc::now().timestamp().to_string()
    }

    #[test]
    fn test_valid_signature_accepted() {
        let payload = br#"{"type":"payment_intent.succeeded"}"#;
        let ts = now_ts();
        let header = format!("t={},v1={}", ts, sign(payload, WEBHOOK_SECRET, &ts));
        assert!(gateway().verify_webhook_signature(payload, &header).unwrap());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = br#"{"type":"payment_intent.succeeded"}"#;
        let ts = now_ts();
        let header = format!("t={},v1={}", ts, sign(payload, "wrong_secret", &ts));
        assert!(!gateway().verify_webhook_signature(payload, &header).unwrap());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let original = br#"{"type":"payment_intent.succeeded"}"#;
        let tampered = br#"{"type":"payment_intent.succeeded","extra":true}"#;
        let ts = now_ts();
        let header = format!("t={},v1={}", ts, sign(original, WEBHOOK_SECRET, &ts));
        assert!(!gateway().verify_webhook_signature(tampered, &header).unwrap());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = br#"{"type":"payment_intent.succeeded"}"#;
        let ts = (chrono::Utc::now().timestamp() - 600).to_string();
        let header = format!("t={},v1={}", ts, sign(payload, WEBHOOK_SECRET, &ts));
        assert!(!gateway().verify_webhook_signature(payload, &header).unwrap());
    }

    #[test]
    fn test_malformed_header_verifies_false() {
        let payload = b"{}";
        let g = gateway();
        assert!(!g.verify_webhook_signature(payload, "").unwrap());
        assert!(!g.verify_webhook_signature(payload, "v1=abcd").unwrap());
        assert!(!g.verify_webhook_signature(payload, "t=123").unwrap());
        assert!(!g
            .verify_webhook_signature(payload, "t=notanumber,v1=abcd")
            .unwrap());
        let ts = now_ts();
        assert!(!g
            .verify_webhook_signature(payload, &format!("t={ts},v1=zz-not-hex"))
            .unwrap());
    }

    #[test]
    fn test_no_secret_is_an_error() {
        let g = StripeGateway::new(None, None, reqwest::Client::new());
        assert!(g.verify_webhook_signature(b"{}", "t=1,v1=aa").is_err());
    }

    #[tokio::test]
    async fn test_mock_intent_is_deterministic() {
        let g = gateway();
        let a = g.create_intent(999, "usd", "ord-1").await.unwrap();
        let b = g.create_intent(999, "usd", "ord-1").await.unwrap();
        assert_eq!(a["intent_id"], b["intent_id"]);
        assert_eq!(a["mock"], serde_json::json!(true));
        assert_eq!(a["status"], "requires_confirmation");

        let confirmed = g.confirm_intent("pi_mock_ord-1").await.unwrap();
        assert_eq!(confirmed["status"], "succeeded");
    }
}
