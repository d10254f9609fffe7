use std::time::Duration;

use serde_json::Value;

use hostforge_core::catalog::BillingCycle;

use crate::config::WhmcsCredentials;
use crate::error::{Result, ServerError};
use crate::whmcs::mock;

/// Client for the WHMCS HTTP API.
///
/// Live calls are form-encoded POSTs to `{url}/includes/api.php` carrying
/// `identifier`, `secret`, and `action`. Without credentials the client
/// runs in mock mode and answers every action from a canned dataset, so
/// the whole API surface works in development.
pub struct WhmcsClient {
    credentials: Option<WhmcsCredentials>,
    http: reqwest::Client,
}

/// A client account as WHMCS reports it.
#[derive(Debug, Clone)]
pub struct ClientAccount {
    pub client_id: String,
    pub email: String,
    pub name: String,
}

/// Identifiers returned by a successfully placed order.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: String,
    pub invoice_id: String,
}

impl WhmcsClient {
    pub fn new(credentials: Option<WhmcsCredentials>, http: reqwest::Client) -> Self {
        match &credentials {
            Some(c) => tracing::info!(url = %c.url, "WHMCS client in live mode"),
            None => tracing::info!("WHMCS credentials absent, using mock mode"),
        }
        Self { credentials, http }
    }

    pub fn is_mock(&self) -> bool {
        self.credentials.is_none()
    }

    /// One round trip to the WHMCS API. `params` are the action-specific
    /// form fields. Errors if the transport fails, the response is not
    /// JSON, or the body reports `result != "success"`.
    async fn call(&self, action: &str, params: &[(&str, String)]) -> Result<Value> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or_else(|| ServerError::Internal("WHMCS call in mock mode".to_string()))?;

        let mut form: Vec<(&str, String)> = vec![
            ("identifier", creds.identifier.clone()),
            ("secret", creds.secret.clone()),
            ("action", action.to_string()),
            ("responsetype", "json".to_string()),
        ];
        form.extend(params.iter().cloned());

        let url = format!("{}/includes/api.php", creds.url);
        let response = self
            .http
            .post(&url)
            .form(&form)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("WHMCS request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ServerError::Upstream(format!(
                "WHMCS returned HTTP {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ServerError::Upstream(format!("WHMCS response was not JSON: {e}")))?;

        if body["result"].as_str() != Some("success") {
            let message = body["message"]
                .as_str()
                .unwrap_or("WHMCS reported an error")
                .to_string();
            tracing::warn!(action, message = %message, "WHMCS call failed");
            return Err(ServerError::Upstream(message));
        }

        Ok(body)
    }

    /// `ValidateLogin`: check credentials, returning the client account.
    pub async fn validate_login(&self, email: &str, password: &str) -> Result<ClientAccount> {
        if self.is_mock() {
            return mock::validate_login(email, password);
        }

        let body = self
            .call(
                "ValidateLogin",
                &[
                    ("email", email.to_string()),
                    ("password2", password.to_string()),
                ],
            )
            .await
            .map_err(|_| ServerError::Unauthorized("invalid email or password".to_string()))?;

        let client_id = value_to_id(&body["userid"])
            .ok_or_else(|| ServerError::Upstream("WHMCS login response missing userid".to_string()))?;

        Ok(ClientAccount {
            client_id,
            email: email.to_string(),
            name: body["name"].as_str().unwrap_or(email).to_string(),
        })
    }

    /// `AddClient`: register a new client account.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_client(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
        country: &str,
        phone: Option<&str>,
        postcode: Option<&str>,
    ) -> Result<ClientAccount> {
        if self.is_mock() {
            return mock::add_client(first_name, last_name, email);
        }

        let mut params = vec![
            ("firstname", first_name.to_string()),
            ("lastname", last_name.to_string()),
            ("email", email.to_string()),
            ("password2", password.to_string()),
            ("country", country.to_string()),
        ];
        if let Some(phone) = phone {
            params.push(("phonenumber", phone.to_string()));
        }
        if let Some(postcode) = postcode {
            params.push(("postcode", postcode.to_string()));
        }

        let body = self.call("AddClient", &params).await?;
        let client_id = value_to_id(&body["clientid"]).ok_or_else(|| {
            ServerError::Upstream("WHMCS AddClient response missing clientid".to_string())
        })?;

        Ok(ClientAccount {
            client_id,
            email: email.to_string(),
            name: format!("{first_name} {last_name}"),
        })
    }

    /// `AddOrder`: place an order for one product.
    pub async fn add_order(
        &self,
        client_id: &str,
        whmcs_product_id: u32,
        cycle: BillingCycle,
        payment_method: &str,
    ) -> Result<PlacedOrder> {
        if self.is_mock() {
            return mock::add_order(client_id, whmcs_product_id);
        }

        let body = self
            .call(
                "AddOrder",
                &[
                    ("clientid", client_id.to_string()),
                    ("pid[0]", whmcs_product_id.to_string()),
                    ("billingcycle[0]", cycle.whmcs_name().to_string()),
                    ("paymentmethod", payment_method.to_string()),
                ],
            )
            .await?;

        let order_id = value_to_id(&body["orderid"]).ok_or_else(|| {
            ServerError::Upstream("WHMCS AddOrder response missing orderid".to_string())
        })?;
        let invoice_id = value_to_id(&body["invoiceid"]).unwrap_or_default();

        Ok(PlacedOrder {
            order_id,
            invoice_id,
        })
    }

    /// `GetOrders` for one client.
    pub async fn get_orders(&self, client_id: &str) -> Result<Value> {
        if self.is_mock() {
            return Ok(mock::orders(client_id));
        }
        let body = self
            .call("GetOrders", &[("userid", client_id.to_string())])
            .await?;
        Ok(body["orders"]["order"].clone())
    }

    /// `GetInvoices` for one client.
    pub async fn get_invoices(&self, client_id: &str) -> Result<Value> {
        if self.is_mock() {
            return Ok(mock::invoices(client_id));
        }
        let body = self
            .call("GetInvoices", &[("userid", client_id.to_string())])
            .await?;
        Ok(body["invoices"]["invoice"].clone())
    }

    /// `GetInvoice`: one invoice, refused unless it belongs to the client.
    pub async fn get_invoice(&self, client_id: &str, invoice_id: &str) -> Result<Value> {
        if self.is_mock() {
            return mock::invoice(client_id, invoice_id);
        }
        let body = self
            .call("GetInvoice", &[("invoiceid", invoice_id.to_string())])
            .await?;
        if value_to_id(&body["userid"]).as_deref() != Some(client_id) {
            return Err(ServerError::NotFound(format!(
                "invoice {invoice_id} not found"
            )));
        }
        Ok(body)
    }

    /// `GetClientsProducts`: the client's provisioned services.
    pub async fn get_services(&self, client_id: &str) -> Result<Value> {
        if self.is_mock() {
            return Ok(mock::services(client_id));
        }
        let body = self
            .call("GetClientsProducts", &[("clientid", client_id.to_string())])
            .await?;
        Ok(body["products"]["product"].clone())
    }

    /// One service, refused unless it belongs to the client.
    pub async fn get_service(&self, client_id: &str, service_id: &str) -> Result<Value> {
        if self.is_mock() {
            return mock::service(client_id, service_id);
        }
        let body = self
            .call(
                "GetClientsProducts",
                &[
                    ("clientid", client_id.to_string()),
                    ("serviceid", service_id.to_string()),
                ],
            )
            .await?;
        let product = body["products"]["product"]
            .as_array()
            .and_then(|list| list.first())
            .cloned()
            .ok_or_else(|| ServerError::NotFound(format!("service {service_id} not found")))?;
        Ok(product)
    }

    /// `AddCancelRequest` for one service.
    pub async fn cancel_service(
        &self,
        client_id: &str,
        service_id: &str,
        cancellation_type: &str,
        reason: Option<&str>,
    ) -> Result<Value> {
        if self.is_mock() {
            return mock::cancel_service(client_id, service_id, cancellation_type);
        }

        // Ownership check before the cancel lands.
        self.get_service(client_id, service_id).await?;

        let mut params = vec![
            ("serviceid", service_id.to_string()),
            ("type", cancellation_type.to_string()),
        ];
        if let Some(reason) = reason {
            params.push(("reason", reason.to_string()));
        }
        self.call("AddCancelRequest", &params).await
    }

    /// `GetTickets` for one client.
    pub async fn get_tickets(&self, client_id: &str) -> Result<Value> {
        if self.is_mock() {
            return Ok(mock::tickets(client_id));
        }
        let body = self
            .call("GetTickets", &[("clientid", client_id.to_string())])
            .await?;
        Ok(body["tickets"]["ticket"].clone())
    }

    /// `OpenTicket` for one client.
    pub async fn open_ticket(
        &self,
        client_id: &str,
        department_id: Option<u32>,
        subject: &str,
        message: &str,
    ) -> Result<Value> {
        if self.is_mock() {
            return mock::open_ticket(client_id, subject);
        }

        let mut params = vec![
            ("clientid", client_id.to_string()),
            ("subject", subject.to_string()),
            ("message", message.to_string()),
        ];
        if let Some(dept) = department_id {
            params.push(("deptid", dept.to_string()));
        }
        self.call("OpenTicket", &params).await
    }

    /// `AddTicketReply`.
    pub async fn reply_ticket(
        &self,
        client_id: &str,
        ticket_id: &str,
        message: &str,
    ) -> Result<Value> {
        if self.is_mock() {
            return mock::reply_ticket(client_id, ticket_id, message);
        }
        self.call(
            "AddTicketReply",
            &[
                ("ticketid", ticket_id.to_string()),
                ("clientid", client_id.to_string()),
                ("message", message.to_string()),
            ],
        )
        .await
    }
}

/// WHMCS is inconsistent about numeric fields: ids arrive as numbers or
/// strings depending on the action.
fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_to_id() {
        assert_eq!(value_to_id(&serde_json::json!(42)).unwrap(), "42");
        assert_eq!(value_to_id(&serde_json::json!("42")).unwrap(), "42");
        assert!(value_to_id(&serde_json::json!("")).is_none());
        assert!(value_to_id(&serde_json::json!(null)).is_none());
    }
}
