//! Crypto payment stub. Always a stub: there is no live provider behind
//! it; the invoice shape matches what the storefront expects to render.

use serde_json::{json, Value};

use crate::payments::cents_to_decimal;

/// Fabricate a crypto invoice for a checkout session. Deterministic per
/// order reference so refreshes show the same address.
pub fn create_invoice(amount_cents: u64, currency: &str, order_ref: &str) -> Value {
    let tag: String = order_ref.chars().filter(char::is_ascii_alphanumeric).collect();
    json!({
        "invoice_id": format!("cr_{tag}"),
        "pay_address": format!("bc1q{:0>32}", tag.to_ascii_lowercase()),
        "pay_currency": "BTC",
        "price_amount": cents_to_decimal(amount_cents),
        "price_currency": currency,
        "status": "waiting",
        "mock": true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_is_deterministic() {
        let a = create_invoice(999, "usd", "ord-42");
        let b = create_invoice(999, "usd", "ord-42");
        assert_eq!(a, b);
        assert_eq!(a["status"], "waiting");
        assert_eq!(a["price_amount"], "9.99");
    }
}
