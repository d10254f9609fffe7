//! Product catalog: immutable reference data for everything sellable.

pub mod billing;
mod data;

pub use billing::BillingCycle;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Top-level product family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    GameServer,
    Vps,
    WebHosting,
}

/// A question/answer pair shown on a product page.
#[derive(Debug, Clone, Serialize)]
pub struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

/// A sellable product. Plans hang off it by `product_slug`.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub slug: &'static str,
    pub name: &'static str,
    pub category: ProductCategory,
    pub description: &'static str,
    pub faqs: &'static [Faq],
}

/// A concrete tier of a product, priced per month. `whmcs_product_id` is
/// the billing backend's identifier for this tier; orders are always placed
/// against it, never against the local plan id.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub id: &'static str,
    pub product_slug: &'static str,
    pub name: &'static str,
    pub monthly_price_cents: u64,
    pub features: &'static [&'static str],
    pub whmcs_product_id: u32,
}

/// The full catalog. Built once at startup from the built-in dataset.
pub struct Catalog {
    products: &'static [Product],
    plans: &'static [Plan],
}

impl Catalog {
    /// The built-in dataset: game servers, VPS tiers, and web hosting.
    pub fn builtin() -> Self {
        Self {
            products: data::PRODUCTS,
            plans: data::PLANS,
        }
    }

    pub fn products(&self) -> &[Product] {
        self.products
    }

    pub fn plans(&self) -> &[Plan] {
        self.plans
    }

    /// Look up a product by slug.
    pub fn product(&self, slug: &str) -> Result<&Product> {
        self.products
            .iter()
            .find(|p| p.slug == slug)
            .ok_or_else(|| CoreError::UnknownProduct(slug.to_string()))
    }

    /// Look up a plan by id.
    pub fn plan(&self, plan_id: &str) -> Result<&Plan> {
        self.plans
            .iter()
            .find(|p| p.id == plan_id)
            .ok_or_else(|| CoreError::UnknownPlan(plan_id.to_string()))
    }

    /// All plans belonging to a product.
    pub fn plans_for(&self, slug: &str) -> Vec<&Plan> {
        self.plans
            .iter()
            .filter(|p| p.product_slug == slug)
            .collect()
    }

    /// The billing backend's product id for a plan. Unknown plans get no
    /// mapping and cannot be ordered.
    pub fn whmcs_product_id(&self, plan_id: &str) -> Option<u32> {
        self.plans
            .iter()
            .find(|p| p.id == plan_id)
            .map(|p| p.whmcs_product_id)
    }
}
