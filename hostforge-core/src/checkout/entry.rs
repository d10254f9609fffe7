use serde::{Deserialize, Serialize};

use crate::catalog::{BillingCycle, Catalog};
use crate::error::{CoreError, Result};

/// The URL-driven entry parameters of the checkout flow, as they arrive
/// from the storefront (`?product=…&plan=…&billing=…&session=…`). The
/// `session` parameter is resolved against the server-side store before
/// this module is consulted; by the time `resolve_entry` runs it has
/// already missed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryParams {
    pub product: Option<String>,
    pub plan: Option<String>,
    pub billing: Option<String>,
}

/// Where the entry parameters land the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryResolution {
    /// Product and plan both resolved: start a session at the details step.
    NewOrder {
        product_slug: String,
        plan_id: String,
        billing_cycle: BillingCycle,
    },
    /// Only the product resolved: send the customer to plan selection.
    SelectPlan { product_slug: String },
    /// Nothing usable: send the customer to the catalog root.
    CatalogRoot,
}

/// Resolve the entry parameters against the catalog.
///
/// A `plan` that resolves wins and implies its product; a `product`
/// explicitly contradicting the plan's product is an error rather than a
/// silent override. A `plan` that does not resolve is treated as absent.
/// `billing` defaults to monthly when missing or unparseable.
pub fn resolve_entry(catalog: &Catalog, params: &EntryParams) -> Result<EntryResolution> {
    let cycle = params
        .billing
        .as_deref()
        .and_then(|b| BillingCycle::parse(b).ok())
        .unwrap_or(BillingCycle::Monthly);

    if let Some(plan_id) = params.plan.as_deref() {
        if let Ok(plan) = catalog.plan(plan_id) {
            if let Some(product) = params.product.as_deref() {
                if product != plan.product_slug {
                    return Err(CoreError::Validation(format!(
                        "plan {} does not belong to product {}",
                        plan.id, product
                    )));
                }
            }
            return Ok(EntryResolution::NewOrder {
                product_slug: plan.product_slug.to_string(),
                plan_id: plan.id.to_string(),
                billing_cycle: cycle,
            });
        }
    }

    if let Some(product) = params.product.as_deref() {
        if catalog.product(product).is_ok() {
            return Ok(EntryResolution::SelectPlan {
                product_slug: product.to_string(),
            });
        }
    }

    Ok(EntryResolution::CatalogRoot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(product: Option<&str>, plan: Option<&str>, billing: Option<&str>) -> EntryParams {
        EntryParams {
            product: product.map(str::to_string),
            plan: plan.map(str::to_string),
            billing: billing.map(str::to_string),
        }
    }

    #[test]
    fn test_plan_implies_product() {
        let catalog = Catalog::builtin();
        let resolution =
            resolve_entry(&catalog, &params(None, Some("mc-iron"), Some("annual"))).unwrap();
        assert_eq!(
            resolution,
            EntryResolution::NewOrder {
                product_slug: "minecraft".to_string(),
                plan_id: "mc-iron".to_string(),
                billing_cycle: BillingCycle::Annual,
            }
        );
    }

    #[test]
    fn test_matching_product_and_plan() {
        let catalog = Catalog::builtin();
        let resolution =
            resolve_entry(&catalog, &params(Some("minecraft"), Some("mc-dirt"), None)).unwrap();
        assert!(matches!(resolution, EntryResolution::NewOrder { .. }));
    }

    #[test]
    fn test_mismatched_product_and_plan_is_error() {
        let catalog = Catalog::builtin();
        assert!(resolve_entry(&catalog, &params(Some("valheim"), Some("mc-dirt"), None)).is_err());
    }

    #[test]
    fn test_unknown_plan_falls_back_to_product() {
        let catalog = Catalog::builtin();
        let resolution =
            resolve_entry(&catalog, &params(Some("valheim"), Some("mc-gold"), None)).unwrap();
        assert_eq!(
            resolution,
            EntryResolution::SelectPlan {
                product_slug: "valheim".to_string(),
            }
        );
    }

    #[test]
    fn test_product_only() {
        let catalog = Catalog::builtin();
        let resolution = resolve_entry(&catalog, &params(Some("vps-cloud"), None, None)).unwrap();
        assert_eq!(
            resolution,
            EntryResolution::SelectPlan {
                product_slug: "vps-cloud".to_string(),
            }
        );
    }

    #[test]
    fn test_nothing_usable_goes_to_catalog() {
        let catalog = Catalog::builtin();
        assert_eq!(
            resolve_entry(&catalog, &params(None, None, None)).unwrap(),
            EntryResolution::CatalogRoot
        );
        assert_eq!(
            resolve_entry(&catalog, &params(Some("not-a-product"), None, None)).unwrap(),
            EntryResolution::CatalogRoot
        );
    }

    #[test]
    fn test_bad_billing_defaults_to_monthly() {
        let catalog = Catalog::builtin();
        let resolution =
            resolve_entry(&catalog, &params(None, Some("mc-dirt"), Some("weekly"))).unwrap();
        match resolution {
            EntryResolution::NewOrder { billing_cycle, .. } => {
                assert_eq!(billing_cycle, BillingCycle::Monthly)
            }
            other => panic!("unexpected resolution {other:?}"),
        }
    }
}
