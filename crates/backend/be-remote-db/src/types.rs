use be_pricing::BillingCycle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationParams {
    offset: u32,
    limit: u32,
    order: SortOrder,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self::new(0, 10, "desc".to_string())
    }
}

impl PaginationParams {
    pub const MAX_LIMIT: u32 = 100;

    /// Unknown sort orders fall back to newest-first.
    pub fn new(offset: u32, limit: u32, order: String) -> Self {
        let order = match order.to_lowercase().as_str() {
            "asc" => SortOrder::Asc,
            _ => SortOrder::Desc,
        };
        Self {
            offset,
            limit: limit.min(Self::MAX_LIMIT),
            order,
        }
    }

    pub fn offset(&self) -> i64 {
        self.offset as i64
    }

    pub fn limit(&self) -> i64 {
        self.limit as i64
    }

    pub fn order(&self) -> &SortOrder {
        &self.order
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
    Failed,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Failed,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    Cancelled,
}

/// Account row. The subscription fields are a denormalized snapshot of the
/// user's current entitlements, replaced wholesale on activation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub subscription_status: Option<SubscriptionStatus>,
    pub current_subscription_id: Option<Uuid>,
    pub purchased_portals: Vec<String>,
    pub enabled_features: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A local order mirroring a provider order. Amounts are major INR units;
/// conversion to paise happens only at the provider boundary.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider_order_id: String,
    pub receipt: String,
    pub amount: i64,
    pub currency: String,
    pub portals: Vec<String>,
    pub features: Vec<String>,
    pub billing_cycle: BillingCycle,
    pub status: OrderStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_id: Uuid,
    pub provider_order_id: String,
    pub payment_id: String,
    #[serde(skip_serializing)]
    pub signature: String,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub subscription_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub portals: Vec<String>,
    pub features: Vec<String>,
    pub billing_cycle: BillingCycle,
    pub amount: i64,
    pub status: SubscriptionStatus,
    pub auto_renew: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of the activation transaction.
#[derive(Debug, Clone)]
pub struct ActivatedSubscription {
    pub subscription: Subscription,
    pub payment: Payment,
}
