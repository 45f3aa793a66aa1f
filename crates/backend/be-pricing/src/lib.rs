//! Portal pricing: the mutable price catalog and the pure price calculator.
//!
//! Monetary amounts are integer INR; the payment layer converts to paise at
//! the provider boundary.

pub mod calculator;
pub mod catalog;
pub mod types;

pub use calculator::calculate;
pub use catalog::{
    feature_portal, portal_features, BundleKey, CatalogError, PricingCatalog, SharedCatalog,
};
pub use types::{BillingCycle, LineItem, Portal, PriceBreakdown};
