use bon::bon;
use chrono::{DateTime, Utc};
use sqlx::{
    migrate::MigrateDatabase,
    postgres::{PgPool, PgPoolOptions},
};
use std::time::Duration;
use uuid::Uuid;

use be_pricing::BillingCycle;

use crate::{
    PaginationParams,
    error::{DbError, DbResult},
    types::{ActivatedSubscription, Order, Payment, Subscription, User, UserRole},
};

#[derive(Debug)]
pub struct DatabaseManager {
    pub pool: PgPool,
}

#[bon]
impl DatabaseManager {
    pub async fn new(database_url: &str) -> DbResult<Self> {
        if !sqlx::Postgres::database_exists(database_url).await? {
            sqlx::Postgres::create_database(database_url).await?;
        }

        let pool = PgPoolOptions::new()
            .max_connections(50)
            .min_connections(3)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;

        let db_manager = DatabaseManager { pool };

        Self::run_migrations(&db_manager.pool).await?;

        Ok(db_manager)
    }

    /// Pool without an eager connection. Router tests construct state with
    /// this; any query against it still fails without a live database.
    pub fn connect_lazy(database_url: &str) -> DbResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(database_url)
            .map_err(|e| DbError::Connection(e.to_string()))?;
        Ok(DatabaseManager { pool })
    }

    async fn run_migrations(pool: &PgPool) -> DbResult<()> {
        let migrator = sqlx::migrate!("./src/migrations");
        migrator.run(pool).await?;
        Ok(())
    }

    #[builder]
    pub async fn create_user(
        &self,
        username: String,
        email: String,
        role: Option<UserRole>,
    ) -> DbResult<User> {
        let user_id = Uuid::now_v7();
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, role, purchased_portals, enabled_features, created_at, updated_at)
            VALUES ($1, $2, $3, $4, '{}', '{}', $5, $6)
            RETURNING id, username, email, role, subscription_status, current_subscription_id,
                      purchased_portals, enabled_features, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&username)
        .bind(&email)
        .bind(role.unwrap_or(UserRole::User))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    #[builder]
    pub async fn get_user(&self, id: Uuid) -> DbResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, role, subscription_status, current_subscription_id,
                   purchased_portals, enabled_features, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found_with_id("user", id.to_string()))?;

        Ok(user)
    }

    #[builder]
    pub async fn create_order(
        &self,
        user_id: Uuid,
        provider_order_id: String,
        receipt: String,
        amount: i64,
        currency: String,
        portals: Vec<String>,
        features: Vec<String>,
        billing_cycle: BillingCycle,
        expires_at: DateTime<Utc>,
    ) -> DbResult<Order> {
        let order_id = Uuid::now_v7();
        let now = Utc::now();

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, user_id, provider_order_id, receipt, amount, currency,
                portals, features, billing_cycle, status, expires_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'created', $10, $11, $12)
            RETURNING id, user_id, provider_order_id, receipt, amount, currency,
                      portals, features, billing_cycle, status, expires_at, created_at, updated_at
            "#,
        )
        .bind(order_id)
        .bind(user_id)
        .bind(&provider_order_id)
        .bind(&receipt)
        .bind(amount)
        .bind(&currency)
        .bind(&portals)
        .bind(&features)
        .bind(billing_cycle)
        .bind(expires_at)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(order)
    }

    /// Scoped to the caller: an order id belonging to another user reads as
    /// absent, never as someone else's order.
    #[builder]
    pub async fn get_order_for_user(
        &self,
        provider_order_id: &str,
        user_id: Uuid,
    ) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, provider_order_id, receipt, amount, currency,
                   portals, features, billing_cycle, status, expires_at, created_at, updated_at
            FROM orders
            WHERE provider_order_id = $1 AND user_id = $2
            "#,
        )
        .bind(provider_order_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Marks an order failed unless it already completed. Returns whether a
    /// row changed; a miss is not an error (webhooks may outrun order
    /// persistence or repeat).
    #[builder]
    pub async fn mark_order_failed(&self, provider_order_id: &str) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'failed', updated_at = $2
            WHERE provider_order_id = $1 AND status <> 'paid'
            "#,
        )
        .bind(provider_order_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[builder]
    pub async fn mark_order_expired(&self, provider_order_id: &str) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'expired', updated_at = $2
            WHERE provider_order_id = $1 AND status = 'created'
            "#,
        )
        .bind(provider_order_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The activation transaction: flips the order `created -> paid` with a
    /// compare-and-swap, supersedes any existing active subscription, inserts
    /// the new subscription and payment, and replaces the user's entitlement
    /// snapshot. All-or-nothing; a lost CAS surfaces as `Conflict` so the
    /// handler can report the order as already processed.
    #[builder]
    pub async fn activate_subscription(
        &self,
        provider_order_id: String,
        user_id: Uuid,
        payment_id: String,
        signature: String,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> DbResult<ActivatedSubscription> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = 'paid', updated_at = $3
            WHERE provider_order_id = $1 AND user_id = $2 AND status = 'created'
            RETURNING id, user_id, provider_order_id, receipt, amount, currency,
                      portals, features, billing_cycle, status, expires_at, created_at, updated_at
            "#,
        )
        .bind(&provider_order_id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::conflict("order already processed"))?;

        sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'inactive', updated_at = $2
            WHERE user_id = $1 AND status = 'active'
            "#,
        )
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let subscription_id = Uuid::now_v7();
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (
                id, user_id, portals, features, billing_cycle, amount,
                status, auto_renew, start_date, end_date, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'active', TRUE, $7, $8, $9, $10)
            RETURNING id, user_id, portals, features, billing_cycle, amount,
                      status, auto_renew, start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(subscription_id)
        .bind(user_id)
        .bind(&order.portals)
        .bind(&order.features)
        .bind(order.billing_cycle)
        .bind(order.amount)
        .bind(start_date)
        .bind(end_date)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (
                id, user_id, order_id, provider_order_id, payment_id, signature,
                amount, currency, status, subscription_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'success', $9, $10)
            RETURNING id, user_id, order_id, provider_order_id, payment_id, signature,
                      amount, currency, status, subscription_id, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(order.id)
        .bind(&provider_order_id)
        .bind(&payment_id)
        .bind(&signature)
        .bind(order.amount)
        .bind(&order.currency)
        .bind(subscription_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE users
            SET subscription_status = 'active',
                current_subscription_id = $2,
                purchased_portals = $3,
                enabled_features = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(subscription_id)
        .bind(&order.portals)
        .bind(&order.features)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            subscription_id = %subscription_id,
            provider_order_id = %provider_order_id,
            "subscription activated"
        );

        Ok(ActivatedSubscription {
            subscription,
            payment,
        })
    }

    #[builder]
    pub async fn get_active_subscription(&self, user_id: Uuid) -> DbResult<Option<Subscription>> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, user_id, portals, features, billing_cycle, amount,
                   status, auto_renew, start_date, end_date, created_at, updated_at
            FROM subscriptions
            WHERE user_id = $1 AND status = 'active'
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscription)
    }

    /// Lazy-expiry transition. Conditional on the row still being active so
    /// concurrent readers settle on a single state change.
    #[builder]
    pub async fn expire_subscription(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
    ) -> DbResult<bool> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'inactive', updated_at = $3
            WHERE id = $1 AND user_id = $2 AND status = 'active'
            "#,
        )
        .bind(subscription_id)
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let expired = result.rows_affected() > 0;
        if expired {
            sqlx::query(
                r#"
                UPDATE users
                SET subscription_status = 'inactive', updated_at = $2
                WHERE id = $1 AND current_subscription_id = $3
                "#,
            )
            .bind(user_id)
            .bind(now)
            .bind(subscription_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(expired)
    }

    #[builder]
    pub async fn toggle_auto_renew(&self, user_id: Uuid) -> DbResult<Option<Subscription>> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            UPDATE subscriptions
            SET auto_renew = NOT auto_renew, updated_at = $2
            WHERE user_id = $1 AND status = 'active'
            RETURNING id, user_id, portals, features, billing_cycle, amount,
                      status, auto_renew, start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscription)
    }

    /// Cancellation keeps access until the paid-up end date; only the status
    /// and auto-renew flag flip here.
    #[builder]
    pub async fn cancel_subscription(&self, user_id: Uuid) -> DbResult<Option<Subscription>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            UPDATE subscriptions
            SET status = 'cancelled', auto_renew = FALSE, updated_at = $2
            WHERE user_id = $1 AND status = 'active'
            RETURNING id, user_id, portals, features, billing_cycle, amount,
                      status, auto_renew, start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        if subscription.is_some() {
            sqlx::query(
                r#"
                UPDATE users
                SET subscription_status = 'cancelled', updated_at = $2
                WHERE id = $1
                "#,
            )
            .bind(user_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(subscription)
    }

    #[builder]
    pub async fn list_payments(
        &self,
        user_id: Uuid,
        pagination: PaginationParams,
    ) -> DbResult<Vec<Payment>> {
        let query = format!(
            r#"
            SELECT id, user_id, order_id, provider_order_id, payment_id, signature,
                   amount, currency, status, subscription_id, created_at
            FROM payments
            WHERE user_id = $1
            ORDER BY created_at {}
            LIMIT $2 OFFSET $3
            "#,
            pagination.order()
        );

        let payments = sqlx::query_as::<_, Payment>(&query)
            .bind(user_id)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(payments)
    }

    #[builder]
    pub async fn count_payments(&self, user_id: Uuid) -> DbResult<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM payments WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
