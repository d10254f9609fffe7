use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// How often a service renews. Longer cycles earn a percentage discount
/// off the plain monthly total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl BillingCycle {
    /// Number of months covered by one renewal.
    pub fn months(&self) -> u64 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Quarterly => 3,
            BillingCycle::SemiAnnual => 6,
            BillingCycle::Annual => 12,
        }
    }

    /// Percentage discount off the monthly total.
    pub fn discount_percent(&self) -> u64 {
        match self {
            BillingCycle::Monthly => 0,
            BillingCycle::Quarterly => 5,
            BillingCycle::SemiAnnual => 10,
            BillingCycle::Annual => 15,
        }
    }

    /// Total price in cents for one renewal of a plan, rounded down.
    pub fn price_cents(&self, monthly_price_cents: u64) -> u64 {
        let undiscounted = monthly_price_cents * self.months();
        undiscounted * (100 - self.discount_percent()) / 100
    }

    /// The spelling used in the billing backend's API.
    pub fn whmcs_name(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Quarterly => "quarterly",
            BillingCycle::SemiAnnual => "semiannually",
            BillingCycle::Annual => "annually",
        }
    }

    /// Parse the query-string spelling.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(BillingCycle::Monthly),
            "quarterly" => Ok(BillingCycle::Quarterly),
            "semiannual" => Ok(BillingCycle::SemiAnnual),
            "annual" => Ok(BillingCycle::Annual),
            other => Err(CoreError::UnknownBillingCycle(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_price_is_plain() {
        assert_eq!(BillingCycle::Monthly.price_cents(999), 999);
    }

    #[test]
    fn test_annual_discount() {
        // 999 * 12 = 11988; 15% off = 10189.8, rounded down.
        assert_eq!(BillingCycle::Annual.price_cents(999), 10_189);
    }

    #[test]
    fn test_quarterly_discount() {
        // 1000 * 3 = 3000; 5% off = 2850.
        assert_eq!(BillingCycle::Quarterly.price_cents(1_000), 2_850);
    }

    #[test]
    fn test_parse_accepts_query_spellings() {
        assert_eq!(
            BillingCycle::parse("monthly").unwrap(),
            BillingCycle::Monthly
        );
        assert_eq!(
            BillingCycle::parse("SemiAnnual").unwrap(),
            BillingCycle::SemiAnnual
        );
        assert_eq!(BillingCycle::parse(" annual ").unwrap(), BillingCycle::Annual);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(BillingCycle::parse("biennial").is_err());
        assert!(BillingCycle::parse("").is_err());
    }
}
