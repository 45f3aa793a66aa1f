use crate::catalog::{
    feature_info, feature_portal, portal_info, BundleKey, PricingCatalog,
    DEFAULT_TWO_PORTAL_DISCOUNT,
};
use crate::types::{BillingCycle, LineItem, Portal, PriceBreakdown};

/// Computes an itemized price for a portal/feature selection.
///
/// Features whose owning portal is not selected are dropped from the
/// quote; the HTTP layer validates them before calling in, so a dropped
/// feature here only happens for internal callers recomputing old carts.
/// The bundle discount applies to portal base prices only and is rounded
/// on the monthly amount before the billing multiplier is applied.
pub fn calculate(
    catalog: &PricingCatalog,
    portals: &[Portal],
    features: &[String],
    billing_cycle: BillingCycle,
) -> PriceBreakdown {
    let multiplier = billing_cycle.multiplier();

    let base_price: i64 = portals.iter().map(|p| catalog.portal_price(*p)).sum();

    let selected_features: Vec<&String> = features
        .iter()
        .filter(|id| feature_portal(id).is_some_and(|owner| portals.contains(&owner)))
        .collect();
    let add_on_price: i64 = selected_features
        .iter()
        .map(|id| catalog.feature_price(id))
        .sum();

    let discount_percentage = bundle_discount_for(catalog, portals);
    let discount_amount = (base_price as f64 * discount_percentage / 100.0).round() as i64;

    let subtotal = base_price + add_on_price;
    let total = (subtotal - discount_amount) * multiplier;

    let portal_items = portals
        .iter()
        .map(|p| LineItem {
            id: p.to_string(),
            name: portal_info(*p).name.to_string(),
            price: catalog.portal_price(*p) * multiplier,
        })
        .collect();

    let feature_items = selected_features
        .iter()
        .map(|id| LineItem {
            id: (*id).clone(),
            name: feature_info(id).0.to_string(),
            price: catalog.feature_price(id) * multiplier,
        })
        .collect();

    PriceBreakdown {
        base_price: base_price * multiplier,
        add_on_price: add_on_price * multiplier,
        subtotal: subtotal * multiplier,
        discount_percentage,
        discount_amount: discount_amount * multiplier,
        total,
        billing_cycle,
        portals: portal_items,
        features: feature_items,
    }
}

/// Discount percent for a portal combination. Named bundles first, then the
/// flat two-portal discount, else none.
fn bundle_discount_for(catalog: &PricingCatalog, portals: &[Portal]) -> f64 {
    match portals.len() {
        3 => catalog.bundle_discount(BundleKey::AllThree),
        2 => {
            if portals.contains(&Portal::Admin) && portals.contains(&Portal::Teacher) {
                catalog.bundle_discount(BundleKey::AdminTeacher)
            } else if portals.contains(&Portal::Teacher) && portals.contains(&Portal::Student) {
                catalog.bundle_discount(BundleKey::TeacherStudent)
            } else {
                DEFAULT_TWO_PORTAL_DISCOUNT
            }
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_portal_monthly() {
        let catalog = PricingCatalog::default();
        let breakdown = calculate(&catalog, &[Portal::Admin], &[], BillingCycle::Monthly);
        assert_eq!(breakdown.base_price, 2000);
        assert_eq!(breakdown.add_on_price, 0);
        assert_eq!(breakdown.discount_percentage, 0.0);
        assert_eq!(breakdown.discount_amount, 0);
        assert_eq!(breakdown.total, 2000);
    }

    #[test]
    fn single_portal_annual_bills_ten_months() {
        let catalog = PricingCatalog::default();
        let breakdown = calculate(&catalog, &[Portal::Admin], &[], BillingCycle::Annual);
        assert_eq!(breakdown.base_price, 20000);
        assert_eq!(breakdown.subtotal, 20000);
        assert_eq!(breakdown.total, 20000);
        assert_eq!(breakdown.portals[0].price, 20000);
    }

    #[test]
    fn admin_teacher_bundle_with_feature() {
        let catalog = PricingCatalog::default();
        let breakdown = calculate(
            &catalog,
            &[Portal::Admin, Portal::Teacher],
            &strings(&["fee_management"]),
            BillingCycle::Monthly,
        );
        assert_eq!(breakdown.base_price, 2800);
        assert_eq!(breakdown.add_on_price, 500);
        assert_eq!(breakdown.subtotal, 3300);
        assert_eq!(breakdown.discount_percentage, 15.0);
        assert_eq!(breakdown.discount_amount, 420);
        assert_eq!(breakdown.total, 2880);
    }

    #[test]
    fn discount_table_for_portal_pairs() {
        let catalog = PricingCatalog::default();
        let cases = [
            (vec![Portal::Admin, Portal::Teacher], 15.0),
            (vec![Portal::Teacher, Portal::Student], 10.0),
            (vec![Portal::Admin, Portal::Student], 10.0),
            (vec![Portal::Admin, Portal::Teacher, Portal::Student], 20.0),
        ];
        for (portals, expected) in cases {
            let breakdown = calculate(&catalog, &portals, &[], BillingCycle::Monthly);
            assert_eq!(
                breakdown.discount_percentage, expected,
                "portals {portals:?}"
            );
        }
    }

    #[test]
    fn feature_without_its_portal_is_dropped() {
        let catalog = PricingCatalog::default();
        let breakdown = calculate(
            &catalog,
            &[Portal::Teacher],
            &strings(&["fee_management", "gradebook"]),
            BillingCycle::Monthly,
        );
        assert_eq!(breakdown.add_on_price, 300);
        assert_eq!(breakdown.features.len(), 1);
        assert_eq!(breakdown.features[0].id, "gradebook");
    }

    #[test]
    fn discount_applies_to_base_only_and_scales_after_rounding() {
        let catalog = PricingCatalog::default();
        let breakdown = calculate(
            &catalog,
            &[Portal::Admin, Portal::Teacher, Portal::Student],
            &strings(&["gradebook", "grade_access"]),
            BillingCycle::Annual,
        );
        // base 3200, 20% of base = 640, addons 450
        assert_eq!(breakdown.base_price, 32000);
        assert_eq!(breakdown.add_on_price, 4500);
        assert_eq!(breakdown.discount_amount, 6400);
        assert_eq!(breakdown.total, 30100);
        assert_eq!(
            breakdown.total,
            breakdown.subtotal - breakdown.discount_amount
        );
    }

    #[test]
    fn empty_selection_prices_to_zero() {
        let catalog = PricingCatalog::default();
        let breakdown = calculate(&catalog, &[], &[], BillingCycle::Monthly);
        assert_eq!(breakdown.total, 0);
        assert!(breakdown.portals.is_empty());
        assert!(breakdown.features.is_empty());
    }

    #[test]
    fn breakdown_serializes_camel_case() {
        let catalog = PricingCatalog::default();
        let breakdown = calculate(&catalog, &[Portal::Student], &[], BillingCycle::Monthly);
        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["basePrice"], 400);
        assert_eq!(json["billingCycle"], "monthly");
        assert!(json.get("base_price").is_none());
    }
}
