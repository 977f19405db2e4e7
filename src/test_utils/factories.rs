//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{Duration, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::{
    application::use_cases::{
        payment::{InvoiceProfile, PaymentTransactionProfile, UserProfile},
        subscription::{SubscriptionPlanProfile, SubscriptionProfile},
    },
    domain::entities::{
        invoice_status::InvoiceStatus, payment_status::PaymentStatus,
        subscription::SubscriptionStatus, user_role::UserRole,
    },
};

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Create a test plan with sensible defaults.
pub fn create_test_plan(
    overrides: impl FnOnce(&mut SubscriptionPlanProfile),
) -> SubscriptionPlanProfile {
    let mut plan = SubscriptionPlanProfile {
        id: Uuid::new_v4(),
        slug: "bronze".to_string(),
        name: "Bronze".to_string(),
        description: Some("Starter plan for a single restaurant".to_string()),
        price_monthly_cents: 1999,
        price_annual_cents: 19990,
        currency: "ETB".to_string(),
        features: serde_json::json!({
            "max_restaurants": 1,
            "max_categories": 10,
            "max_menu_items": 50,
            "max_staff_accounts": 3
        }),
        display_order: 1,
        is_active: true,
        created_at: Some(now()),
        updated_at: Some(now()),
    };
    overrides(&mut plan);
    plan
}

/// Create an active subscription on `plan` with thirty days left.
pub fn create_test_subscription(
    owner_id: Uuid,
    plan: &SubscriptionPlanProfile,
    overrides: impl FnOnce(&mut SubscriptionProfile),
) -> SubscriptionProfile {
    let mut subscription = SubscriptionProfile {
        id: Uuid::new_v4(),
        owner_id,
        plan_id: plan.id,
        plan_slug: plan.slug.clone(),
        status: SubscriptionStatus::Active,
        current_period_start: now() - Duration::days(1),
        current_period_end: now() + Duration::days(30),
        trial_end: None,
        cancelled_at: None,
        provider_subscription_id: None,
        created_at: Some(now()),
        updated_at: Some(now()),
    };
    overrides(&mut subscription);
    subscription
}

/// Create an active owner account.
pub fn create_test_user(overrides: impl FnOnce(&mut UserProfile)) -> UserProfile {
    let mut user = UserProfile {
        id: Uuid::new_v4(),
        email: "owner@restaurant.com".to_string(),
        full_name: "Abebe Kebede".to_string(),
        role: UserRole::Owner,
        owner_id: None,
        restaurant_id: None,
        is_active: true,
    };
    overrides(&mut user);
    user
}

/// Create a pending transaction.
pub fn create_test_transaction(
    owner_id: Uuid,
    tx_ref: &str,
    overrides: impl FnOnce(&mut PaymentTransactionProfile),
) -> PaymentTransactionProfile {
    let mut transaction = PaymentTransactionProfile {
        id: Uuid::new_v4(),
        owner_id,
        amount_cents: 1999,
        currency: "ETB".to_string(),
        status: PaymentStatus::Pending,
        tx_ref: tx_ref.to_string(),
        reference: Some("registration:bronze".to_string()),
        provider_transaction_ref: None,
        created_at: Some(now()),
        updated_at: Some(now()),
    };
    overrides(&mut transaction);
    transaction
}

/// Create a pending invoice numbered after `tx_ref`.
pub fn create_test_invoice(
    owner_id: Uuid,
    subscription_id: Uuid,
    tx_ref: &str,
    overrides: impl FnOnce(&mut InvoiceProfile),
) -> InvoiceProfile {
    let mut invoice = InvoiceProfile {
        id: Uuid::new_v4(),
        invoice_number: tx_ref.to_string(),
        subscription_id,
        owner_id,
        amount_cents: 1999,
        currency: "ETB".to_string(),
        status: InvoiceStatus::Pending,
        billing_period_start: now(),
        billing_period_end: now() + Duration::days(30),
        paid_at: None,
        created_at: Some(now()),
    };
    overrides(&mut invoice);
    invoice
}
