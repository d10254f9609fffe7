//! Paysafe checkout stub: fabricates a hosted-payment session pointing at
//! the provider's sandbox redirect.

use serde_json::{json, Value};

use crate::payments::cents_to_decimal;

pub fn create_session(amount_cents: u64, currency: &str, order_ref: &str) -> Value {
    let tag: String = order_ref.chars().filter(char::is_ascii_alphanumeric).collect();
    json!({
        "session_id": format!("ps_{tag}"),
        "redirect_url": format!("https://checkout.sandbox.paysafe.example/session/ps_{tag}"),
        "amount": cents_to_decimal(amount_cents),
        "currency": currency,
        "status": "initiated",
        "mock": true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_shape() {
        let session = create_session(2_499, "usd", "ord-7");
        assert_eq!(session["session_id"], "ps_ord7");
        assert_eq!(session["amount"], "24.99");
        assert!(session["redirect_url"]
            .as_str()
            .unwrap()
            .contains("ps_ord7"));
    }
}
