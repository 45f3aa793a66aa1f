use serde::{Deserialize, Serialize};

/// A purchasable product tier. Closed set: unknown portal ids are rejected
/// when request bodies are parsed, never deep in business logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Portal {
    Admin,
    Teacher,
    Student,
}

impl Portal {
    pub const ALL: [Portal; 3] = [Portal::Admin, Portal::Teacher, Portal::Student];

    pub fn as_str(&self) -> &'static str {
        match self {
            Portal::Admin => "admin",
            Portal::Teacher => "teacher",
            Portal::Student => "student",
        }
    }

    /// Parses a list of portal ids, deduplicating while preserving order.
    /// Returns the full list of unknown ids so callers can report them all
    /// in one validation error.
    pub fn parse_list(ids: &[String]) -> Result<Vec<Portal>, Vec<String>> {
        let mut portals = Vec::new();
        let mut invalid = Vec::new();
        for id in ids {
            match id.parse::<Portal>() {
                Ok(p) if !portals.contains(&p) => portals.push(p),
                Ok(_) => {}
                Err(_) => invalid.push(id.clone()),
            }
        }
        if invalid.is_empty() {
            Ok(portals)
        } else {
            Err(invalid)
        }
    }
}

impl std::fmt::Display for Portal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Portal {
    type Err = UnknownPortal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Portal::Admin),
            "teacher" => Ok(Portal::Teacher),
            "student" => Ok(Portal::Student),
            other => Err(UnknownPortal(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown portal: {0}")]
pub struct UnknownPortal(pub String);

/// Billing cycle. Annual bills 10 months for 12 months of service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "billing_cycle", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Annual,
}

impl BillingCycle {
    /// Number of months charged per cycle.
    pub fn multiplier(&self) -> i64 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Annual => 10,
        }
    }

    /// Number of calendar months of service granted per cycle.
    pub fn service_months(&self) -> u32 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Annual => 12,
        }
    }
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingCycle::Monthly => f.write_str("monthly"),
            BillingCycle::Annual => f.write_str("annual"),
        }
    }
}

impl std::str::FromStr for BillingCycle {
    type Err = UnknownBillingCycle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(BillingCycle::Monthly),
            "annual" => Ok(BillingCycle::Annual),
            other => Err(UnknownBillingCycle(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown billing cycle: {0}")]
pub struct UnknownBillingCycle(pub String);

/// One priced line (a portal or a feature) in a breakdown, already scaled by
/// the billing multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub price: i64,
}

/// The itemized result of a price calculation. Every monetary field is
/// scaled by the billing multiplier; the bundle discount is computed on the
/// pre-scale base price and rounded before scaling, so
/// `total == (subtotal - discount_amount)` holds exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub base_price: i64,
    pub add_on_price: i64,
    pub subtotal: i64,
    pub discount_percentage: f64,
    pub discount_amount: i64,
    pub total: i64,
    pub billing_cycle: BillingCycle,
    pub portals: Vec<LineItem>,
    pub features: Vec<LineItem>,
}
