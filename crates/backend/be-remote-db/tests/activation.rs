//! Activation and expiry tests against a live Postgres instance. Every test
//! skips itself unless SCHOOLSTACK_TEST_DATABASE_URL points at a disposable
//! database the test run may write to.

use be_remote_db::{
    ActivatedSubscription, BillingCycle, DatabaseManager, DbError, Order, OrderStatus,
    PaymentStatus, SubscriptionStatus, User,
};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

async fn test_db() -> Option<DatabaseManager> {
    let url = std::env::var("SCHOOLSTACK_TEST_DATABASE_URL").ok()?;
    Some(
        DatabaseManager::new(&url)
            .await
            .expect("test database must be reachable"),
    )
}

async fn seed_user(db: &DatabaseManager) -> User {
    let tag = Uuid::now_v7().simple().to_string();
    db.create_user()
        .username(format!("user_{tag}"))
        .email(format!("user_{tag}@example.com"))
        .call()
        .await
        .unwrap()
}

async fn seed_order(db: &DatabaseManager, user_id: Uuid) -> Order {
    let tag = Uuid::now_v7().simple().to_string();
    db.create_order()
        .user_id(user_id)
        .provider_order_id(format!("order_{tag}"))
        .receipt(format!("rcpt_{tag}"))
        .amount(2880)
        .currency("INR".to_string())
        .portals(vec!["admin".to_string(), "teacher".to_string()])
        .features(vec!["fee_management".to_string()])
        .billing_cycle(BillingCycle::Monthly)
        .expires_at(Utc::now() + Duration::minutes(30))
        .call()
        .await
        .unwrap()
}

async fn activate(
    db: &DatabaseManager,
    user_id: Uuid,
    provider_order_id: &str,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> Result<ActivatedSubscription, DbError> {
    db.activate_subscription()
        .provider_order_id(provider_order_id.to_string())
        .user_id(user_id)
        .payment_id(format!("pay_{}", Uuid::now_v7().simple()))
        .signature("sig".to_string())
        .start_date(start_date)
        .end_date(end_date)
        .call()
        .await
}

#[tokio::test]
async fn activation_is_at_most_once_per_order() {
    let Some(db) = test_db().await else { return };
    let user = seed_user(&db).await;
    let order = seed_order(&db, user.id).await;

    let start = Utc::now();
    let end = start + Duration::days(30);

    let activated = activate(&db, user.id, &order.provider_order_id, start, end)
        .await
        .unwrap();
    assert_eq!(activated.payment.status, PaymentStatus::Success);
    assert_eq!(activated.subscription.amount, 2880);

    // A retry of the same order loses the compare-and-swap.
    let err = activate(&db, user.id, &order.provider_order_id, start, end)
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let reread = db
        .get_order_for_user()
        .provider_order_id(&order.provider_order_id)
        .user_id(user.id)
        .call()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reread.status, OrderStatus::Paid);

    let active = db
        .get_active_subscription()
        .user_id(user.id)
        .call()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, activated.subscription.id);
}

#[tokio::test]
async fn new_activation_supersedes_previous_subscription() {
    let Some(db) = test_db().await else { return };
    let user = seed_user(&db).await;

    let start = Utc::now();
    let end = start + Duration::days(30);

    let first_order = seed_order(&db, user.id).await;
    activate(&db, user.id, &first_order.provider_order_id, start, end)
        .await
        .unwrap();

    let second_order = seed_order(&db, user.id).await;
    let second = activate(&db, user.id, &second_order.provider_order_id, start, end)
        .await
        .unwrap();

    // The partial unique index allows this only because the first row was
    // flipped to inactive inside the same transaction.
    let active = db
        .get_active_subscription()
        .user_id(user.id)
        .call()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, second.subscription.id);

    let user_row = db.get_user().id(user.id).call().await.unwrap();
    assert_eq!(user_row.current_subscription_id, Some(second.subscription.id));
    assert_eq!(user_row.subscription_status, Some(SubscriptionStatus::Active));
}

#[tokio::test]
async fn expiry_transition_settles_once() {
    let Some(db) = test_db().await else { return };
    let user = seed_user(&db).await;
    let order = seed_order(&db, user.id).await;

    // End date already past, as a subscription looks when read after lapsing.
    let start = Utc::now() - Duration::days(31);
    let end = Utc::now() - Duration::days(1);
    activate(&db, user.id, &order.provider_order_id, start, end)
        .await
        .unwrap();

    let subscription = db
        .get_active_subscription()
        .user_id(user.id)
        .call()
        .await
        .unwrap()
        .unwrap();
    assert!(subscription.end_date < Utc::now());

    let expired = db
        .expire_subscription()
        .subscription_id(subscription.id)
        .user_id(user.id)
        .call()
        .await
        .unwrap();
    assert!(expired);

    // Concurrent readers racing the same transition see a single state
    // change; the second attempt is a no-op.
    let repeat = db
        .expire_subscription()
        .subscription_id(subscription.id)
        .user_id(user.id)
        .call()
        .await
        .unwrap();
    assert!(!repeat);

    let active = db
        .get_active_subscription()
        .user_id(user.id)
        .call()
        .await
        .unwrap();
    assert!(active.is_none());

    let user_row = db.get_user().id(user.id).call().await.unwrap();
    assert_eq!(
        user_row.subscription_status,
        Some(SubscriptionStatus::Inactive)
    );
}
