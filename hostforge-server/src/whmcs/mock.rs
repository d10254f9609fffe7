//! Canned WHMCS responses for credential-less development.
//!
//! The dataset is one demo client with two services, two invoices, and one
//! open ticket. Fabricated ids are derived from the inputs so repeated
//! calls stay consistent within a process.

use serde_json::{json, Value};

use crate::error::{Result, ServerError};
use crate::whmcs::client::{ClientAccount, PlacedOrder};

/// The demo account accepted by mock login.
pub const DEMO_EMAIL: &str = "demo@hostforge.example";
pub const DEMO_PASSWORD: &str = "demo1234";
pub const DEMO_CLIENT_ID: &str = "1001";
pub const DEMO_NAME: &str = "Demo Customer";

/// Small stable hash for fabricating ids from inputs.
fn fabricate_id(seed: &str, base: u64) -> String {
    let sum: u64 = seed.bytes().map(u64::from).sum();
    (base + sum % 9_000).to_string()
}

pub fn validate_login(email: &str, password: &str) -> Result<ClientAccount> {
    if email == DEMO_EMAIL && password == DEMO_PASSWORD {
        Ok(ClientAccount {
            client_id: DEMO_CLIENT_ID.to_string(),
            email: DEMO_EMAIL.to_string(),
            name: DEMO_NAME.to_string(),
        })
    } else {
        Err(ServerError::Unauthorized(
            "invalid email or password".to_string(),
        ))
    }
}

pub fn add_client(first_name: &str, last_name: &str, email: &str) -> Result<ClientAccount> {
    if email == DEMO_EMAIL {
        return Err(ServerError::Conflict(format!(
            "a client with email {email} already exists"
        )));
    }
    Ok(ClientAccount {
        client_id: fabricate_id(email, 2_000),
        email: email.to_string(),
        name: format!("{first_name} {last_name}"),
    })
}

pub fn add_order(client_id: &str, whmcs_product_id: u32) -> Result<PlacedOrder> {
    let seed = format!("{client_id}:{whmcs_product_id}");
    Ok(PlacedOrder {
        order_id: fabricate_id(&seed, 5_000),
        invoice_id: fabricate_id(&seed, 7_000),
    })
}

pub fn orders(client_id: &str) -> Value {
    json!([
        {
            "id": "5100",
            "ordernum": "202506150001",
            "userid": client_id,
            "date": "2025-06-15 09:12:44",
            "status": "Active",
            "amount": "9.99",
            "paymentmethod": "stripe",
        }
    ])
}

pub fn invoices(client_id: &str) -> Value {
    json!([
        {
            "id": "7001",
            "userid": client_id,
            "invoicenum": "INV-7001",
            "date": "2025-06-15",
            "duedate": "2025-06-22",
            "total": "9.99",
            "status": "Paid",
        },
        {
            "id": "7002",
            "userid": client_id,
            "invoicenum": "INV-7002",
            "date": "2025-07-15",
            "duedate": "2025-07-22",
            "total": "9.99",
            "status": "Unpaid",
        }
    ])
}

pub fn invoice(client_id: &str, invoice_id: &str) -> Result<Value> {
    let list = invoices(client_id);
    list.as_array()
        .and_then(|items| {
            items
                .iter()
                .find(|item| item["id"].as_str() == Some(invoice_id))
                .cloned()
        })
        .ok_or_else(|| ServerError::NotFound(format!("invoice {invoice_id} not found")))
}

pub fn services(client_id: &str) -> Value {
    json!([
        {
            "id": "3001",
            "clientid": client_id,
            "name": "Minecraft Server Hosting - Iron",
            "domain": "mc-1.hostforge.example",
            "status": "Active",
            "regdate": "2025-06-15",
            "nextduedate": "2025-08-15",
            "billingcycle": "Monthly",
            "recurringamount": "9.99",
        },
        {
            "id": "3002",
            "clientid": client_id,
            "name": "Cloud VPS - Cloud 2",
            "domain": "vps-7.hostforge.example",
            "status": "Active",
            "regdate": "2025-05-02",
            "nextduedate": "2025-09-02",
            "billingcycle": "Quarterly",
            "recurringamount": "34.20",
        }
    ])
}

pub fn service(client_id: &str, service_id: &str) -> Result<Value> {
    let list = services(client_id);
    list.as_array()
        .and_then(|items| {
            items
                .iter()
                .find(|item| item["id"].as_str() == Some(service_id))
                .cloned()
        })
        .ok_or_else(|| ServerError::NotFound(format!("service {service_id} not found")))
}

pub fn cancel_service(
    client_id: &str,
    service_id: &str,
    cancellation_type: &str,
) -> Result<Value> {
    // Same ownership rule as live mode.
    service(client_id, service_id)?;
    Ok(json!({
        "serviceid": service_id,
        "type": cancellation_type,
        "status": "Cancellation Requested",
    }))
}

pub fn tickets(client_id: &str) -> Value {
    json!([
        {
            "id": "9001",
            "tid": "482911",
            "clientid": client_id,
            "subject": "Server not responding after modpack install",
            "status": "Answered",
            "lastreply": "2025-07-28 16:40:02",
            "department": "Technical Support",
        }
    ])
}

pub fn open_ticket(client_id: &str, subject: &str) -> Result<Value> {
    Ok(json!({
        "id": fabricate_id(&format!("{client_id}:{subject}"), 9_100),
        "clientid": client_id,
        "subject": subject,
        "status": "Open",
    }))
}

pub fn reply_ticket(client_id: &str, ticket_id: &str, _message: &str) -> Result<Value> {
    let list = tickets(client_id);
    let known = list
        .as_array()
        .map(|items| {
            items
                .iter()
                .any(|item| item["id"].as_str() == Some(ticket_id))
        })
        .unwrap_or(false);
    if !known {
        return Err(ServerError::NotFound(format!(
            "ticket {ticket_id} not found"
        )));
    }
    Ok(json!({
        "ticketid": ticket_id,
        "status": "Customer-Reply",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_login() {
        assert!(validate_login(DEMO_EMAIL, DEMO_PASSWORD).is_ok());
        assert!(validate_login(DEMO_EMAIL, "wrong").is_err());
        assert!(validate_login("who@example.com", DEMO_PASSWORD).is_err());
    }

    #[test]
    fn test_register_conflicts_with_demo() {
        assert!(add_client("A", "B", DEMO_EMAIL).is_err());
        assert!(add_client("A", "B", "new@example.com").is_ok());
    }

    #[test]
    fn test_fabricated_ids_are_stable() {
        let a = add_order("1001", 102).unwrap();
        let b = add_order("1001", 102).unwrap();
        assert_eq!(a.order_id, b.order_id);
        assert_eq!(a.invoice_id, b.invoice_id);
    }

    #[test]
    fn test_list_and_detail_agree() {
        let list = invoices(DEMO_CLIENT_ID);
        for item in list.as_array().unwrap() {
            let id = item["id"].as_str().unwrap();
            let detail = invoice(DEMO_CLIENT_ID, id).unwrap();
            assert_eq!(detail["id"], item["id"]);
            assert_eq!(detail["status"], item["status"]);
        }
        assert!(invoice(DEMO_CLIENT_ID, "nope").is_err());

        let list = services(DEMO_CLIENT_ID);
        for item in list.as_array().unwrap() {
            let id = item["id"].as_str().unwrap();
            assert!(service(DEMO_CLIENT_ID, id).is_ok());
        }
        assert!(service(DEMO_CLIENT_ID, "nope").is_err());
    }

    #[test]
    fn test_cancel_checks_ownership() {
        assert!(cancel_service(DEMO_CLIENT_ID, "3001", "Immediate").is_ok());
        assert!(cancel_service(DEMO_CLIENT_ID, "9999", "Immediate").is_err());
    }

    #[test]
    fn test_reply_requires_known_ticket() {
        assert!(reply_ticket(DEMO_CLIENT_ID, "9001", "hi").is_ok());
        assert!(reply_ticket(DEMO_CLIENT_ID, "1234", "hi").is_err());
    }
}
