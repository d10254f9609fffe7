use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::error::{Result, ServerError};
use crate::payments::cents_to_decimal;

/// PayPal checkout-orders gateway. Mock mode unless both OAuth credentials
/// are present.
pub struct PaypalGateway {
    client_id: Option<String>,
    client_secret: Option<String>,
    mode: String,
    http: reqwest::Client,
    /// Cached OAuth access token and its expiry.
    token: RwLock<Option<(String, DateTime<Utc>)>>,
}

impl PaypalGateway {
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        mode: String,
        http: reqwest::Client,
    ) -> Self {
        if client_id.is_none() || client_secret.is_none() {
            tracing::info!("PayPal credentials absent, gateway in mock mode");
        }
        Self {
            client_id,
            client_secret,
            mode,
            http,
            token: RwLock::new(None),
        }
    }

    pub fn is_mock(&self) -> bool {
        self.client_id.is_none() || self.client_secret.is_none()
    }

    fn base_url(&self) -> &str {
        if self.mode == "live" {
            "https://api-m.paypal.com"
        } else {
            "https://api-m.sandbox.paypal.com"
        }
    }

    /// Fetch (or reuse) an OAuth access token via client credentials.
    async fn access_token(&self) -> Result<String> {
        if let Some((token, expires)) = self.token.read().await.as_ref() {
            if *expires > Utc::now() {
                return Ok(token.clone());
            }
        }

        let (Some(id), Some(secret)) = (&self.client_id, &self.client_secret) else {
            return Err(ServerError::Internal("PayPal token in mock mode".to_string()));
        };

        let url = format!("{}/v1/oauth2/token", self.base_url());
        let response = self
            .http
            .post(&url)
            .basic_auth(id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("PayPal token request failed: {e}")))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ServerError::Upstream(format!("PayPal token response not JSON: {e}")))?;

        let token = body["access_token"]
            .as_str()
            .ok_or_else(|| ServerError::Upstream("PayPal token response missing access_token".to_string()))?
            .to_string();
        let expires_in = body["expires_in"].as_i64().unwrap_or(300);

        // Refresh a minute before the token actually dies.
        let expires = Utc::now() + Duration::seconds((expires_in - 60).max(60));
        *self.token.write().await = Some((token.clone(), expires));
        Ok(token)
    }

    /// Create a checkout order.
    pub async fn create_order(&self, amount_cents: u64, currency: &str) -> Result<Value> {
        if self.is_mock() {
            return Ok(json!({
                "order_id": format!("PAYPAL-MOCK-{amount_cents}"),
                "status": "CREATED",
                "mock": true,
            }));
        }

        let token = self.access_token().await?;
        let url = format!("{}/v2/checkout/orders", self.base_url());
        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": {
                    "currency_code": currency.to_uppercase(),
                    "value": cents_to_decimal(amount_cents),
                }
            }]
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("PayPal request failed: {e}")))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ServerError::Upstream(format!("PayPal response was not JSON: {e}")))?;

        let order_id = body["id"]
            .as_str()
            .ok_or_else(|| ServerError::Upstream("PayPal order response missing id".to_string()))?;

        Ok(json!({
            "order_id": order_id,
            "status": body["status"],
        }))
    }

    /// Capture a previously created order.
    pub async fn capture_order(&self, order_id: &str) -> Result<Value> {
        if self.is_mock() {
            return Ok(json!({
                "order_id": order_id,
                "status": "COMPLETED",
                "mock": true,
            }));
        }

        let token = self.access_token().await?;
        let url = format!("{}/v2/checkout/orders/{order_id}/capture", self.base_url());
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("PayPal request failed: {e}")))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ServerError::Upstream(format!("PayPal response was not JSON: {e}")))?;

        Ok(json!({
            "order_id": order_id,
            "status": body["status"],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_gateway() -> PaypalGateway {
        PaypalGateway::new(None, None, "sandbox".to_string(), reqwest::Client::new())
    }

    #[test]
    fn test_base_url_follows_mode() {
        let sandbox = mock_gateway();
        assert_eq!(sandbox.base_url(), "https://api-m.sandbox.paypal.com");

        let live = PaypalGateway::new(None, None, "live".to_string(), reqwest::Client::new());
        assert_eq!(live.base_url(), "https://api-m.paypal.com");
    }

    #[tokio::test]
    async fn test_mock_order_flow() {
        let g = mock_gateway();
        let created = g.create_order(1_299, "usd").await.unwrap();
        assert_eq!(created["status"], "CREATED");
        assert_eq!(created["mock"], json!(true));

        let order_id = created["order_id"].as_str().unwrap();
        let captured = g.capture_order(order_id).await.unwrap();
        assert_eq!(captured["status"], "COMPLETED");
    }

    #[test]
    fn test_partial_credentials_still_mock() {
        let g = PaypalGateway::new(
            Some("client-id".to_string()),
            None,
            "sandbox".to_string(),
            reqwest::Client::new(),
        );
        assert!(g.is_mock());
    }
}
