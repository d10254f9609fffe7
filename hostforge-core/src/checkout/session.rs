use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{BillingCycle, Catalog};
use crate::error::{CoreError, Result};
use crate::validate;

/// Where a customer is in the checkout flow. Steps only ever advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    Plan,
    Details,
    Payment,
    Done,
}

/// Validated customer contact fields collected at the details step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country: String,
    pub postcode: Option<String>,
}

/// Raw form input for the details step, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailsInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub country: String,
    #[serde(default)]
    pub postcode: Option<String>,
}

impl CustomerDetails {
    /// Validate and sanitize raw form input.
    pub fn parse(input: &DetailsInput) -> Result<Self> {
        Ok(Self {
            first_name: validate::person_name("first name", &input.first_name)?,
            last_name: validate::person_name("last name", &input.last_name)?,
            email: validate::email(&input.email)?,
            phone: input.phone.as_deref().map(validate::phone).transpose()?,
            country: validate::country_code(&input.country)?,
            postcode: input.postcode.as_deref().map(validate::postcode).transpose()?,
        })
    }
}

/// Payment rails a checkout can settle on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Stripe,
    Paypal,
    Crypto,
    Paysafe,
}

impl PaymentMethod {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stripe" => Ok(PaymentMethod::Stripe),
            "paypal" => Ok(PaymentMethod::Paypal),
            "crypto" => Ok(PaymentMethod::Crypto),
            "paysafe" => Ok(PaymentMethod::Paysafe),
            other => Err(CoreError::Validation(format!(
                "unknown payment method '{other}'"
            ))),
        }
    }
}

/// One customer's in-flight order. Created once a plan is resolved and
/// mutated in place as the customer moves through the steps. Discarded
/// after the order is placed or the session goes idle past its TTL.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSession {
    pub id: Uuid,
    pub product_slug: String,
    pub plan_id: String,
    pub billing_cycle: BillingCycle,
    pub step: CheckoutStep,
    pub customer: Option<CustomerDetails>,
    pub payment_method: Option<PaymentMethod>,
    /// Total for one renewal, fixed at creation from the plan and cycle.
    pub amount_cents: u64,
    pub created_at: u64,
    pub updated_at: u64,
}

impl OrderSession {
    /// Start a session for a resolved plan. The plan is already chosen, so
    /// the session begins at the details step.
    pub fn new(
        catalog: &Catalog,
        plan_id: &str,
        cycle: BillingCycle,
        now_secs: u64,
    ) -> Result<Self> {
        let plan = catalog.plan(plan_id)?;
        Ok(Self {
            id: Uuid::new_v4(),
            product_slug: plan.product_slug.to_string(),
            plan_id: plan.id.to_string(),
            billing_cycle: cycle,
            step: CheckoutStep::Details,
            customer: None,
            payment_method: None,
            amount_cents: cycle.price_cents(plan.monthly_price_cents),
            created_at: now_secs,
            updated_at: now_secs,
        })
    }

    fn expect_step(&self, want: CheckoutStep, doing: &str) -> Result<()> {
        if self.step != want {
            return Err(CoreError::CheckoutState(format!(
                "cannot {doing} at step {:?}",
                self.step
            )));
        }
        Ok(())
    }

    /// Submit customer details. Legal only at the details step; advances
    /// to payment. Invalid input leaves the session untouched.
    pub fn submit_details(&mut self, input: &DetailsInput, now_secs: u64) -> Result<()> {
        self.expect_step(CheckoutStep::Details, "submit details")?;
        let details = CustomerDetails::parse(input)?;
        self.customer = Some(details);
        self.step = CheckoutStep::Payment;
        self.updated_at = now_secs;
        Ok(())
    }

    /// Record the payment method. Legal only at the payment step.
    pub fn select_payment(&mut self, method: PaymentMethod, now_secs: u64) -> Result<()> {
        self.expect_step(CheckoutStep::Payment, "select a payment method")?;
        self.payment_method = Some(method);
        self.updated_at = now_secs;
        Ok(())
    }

    /// Mark the order placed. Legal only at the payment step with a method
    /// already selected. Terminal.
    pub fn complete(&mut self, now_secs: u64) -> Result<()> {
        self.expect_step(CheckoutStep::Payment, "complete checkout")?;
        if self.payment_method.is_none() {
            return Err(CoreError::CheckoutState(
                "no payment method selected".to_string(),
            ));
        }
        self.step = CheckoutStep::Done;
        self.updated_at = now_secs;
        Ok(())
    }

    /// Whether the session has sat idle past its TTL.
    pub fn is_expired(&self, ttl_secs: u64, now_secs: u64) -> bool {
        now_secs.saturating_sub(self.updated_at) >= ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details_input() -> DetailsInput {
        DetailsInput {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            country: "gb".to_string(),
            postcode: Some("SW1A 1AA".to_string()),
        }
    }

    fn new_session() -> OrderSession {
        let catalog = Catalog::builtin();
        OrderSession::new(&catalog, "mc-iron", BillingCycle::Monthly, 1_000).unwrap()
    }

    #[test]
    fn test_amount_follows_plan_and_cycle() {
        let catalog = Catalog::builtin();
        let monthly = OrderSession::new(&catalog, "mc-iron", BillingCycle::Monthly, 0).unwrap();
        assert_eq!(monthly.amount_cents, 999);

        let annual = OrderSession::new(&catalog, "mc-iron", BillingCycle::Annual, 0).unwrap();
        // 999 * 12 = 11988, 15% off rounded down.
        assert_eq!(annual.amount_cents, 10_189);
    }

    #[test]
    fn test_unknown_plan_refused() {
        let catalog = Catalog::builtin();
        assert!(OrderSession::new(&catalog, "nope", BillingCycle::Monthly, 0).is_err());
    }

    #[test]
    fn test_happy_path() {
        let mut session = new_session();
        assert_eq!(session.step, CheckoutStep::Details);

        session.submit_details(&details_input(), 1_010).unwrap();
        assert_eq!(session.step, CheckoutStep::Payment);
        assert_eq!(session.customer.as_ref().unwrap().country, "GB");
        assert_eq!(session.updated_at, 1_010);

        session.select_payment(PaymentMethod::Stripe, 1_020).unwrap();
        session.complete(1_030).unwrap();
        assert_eq!(session.step, CheckoutStep::Done);
    }

    #[test]
    fn test_details_twice_rejected() {
        let mut session = new_session();
        session.submit_details(&details_input(), 1_010).unwrap();
        let err = session.submit_details(&details_input(), 1_020).unwrap_err();
        assert!(err.to_string().contains("Payment"));
        // The failed call must not have touched the session.
        assert_eq!(session.updated_at, 1_010);
    }

    #[test]
    fn test_invalid_details_do_not_mutate() {
        let mut session = new_session();
        let mut bad = details_input();
        bad.email = "not-an-email".to_string();
        assert!(session.submit_details(&bad, 1_010).is_err());
        assert_eq!(session.step, CheckoutStep::Details);
        assert!(session.customer.is_none());
        assert_eq!(session.updated_at, 1_000);
    }

    #[test]
    fn test_complete_requires_method() {
        let mut session = new_session();
        session.submit_details(&details_input(), 1_010).unwrap();
        assert!(session.complete(1_020).is_err());
        session.select_payment(PaymentMethod::Paypal, 1_020).unwrap();
        session.complete(1_030).unwrap();
    }

    #[test]
    fn test_complete_is_terminal() {
        let mut session = new_session();
        session.submit_details(&details_input(), 1_010).unwrap();
        session.select_payment(PaymentMethod::Crypto, 1_020).unwrap();
        session.complete(1_030).unwrap();
        assert!(session.complete(1_040).is_err());
        assert!(session.select_payment(PaymentMethod::Stripe, 1_040).is_err());
    }

    #[test]
    fn test_expiry() {
        let session = new_session();
        assert!(!session.is_expired(600, 1_000));
        assert!(!session.is_expired(600, 1_599));
        assert!(session.is_expired(600, 1_600));
    }
}
