//! In-memory mock implementations for billing-related repository traits.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::{
        payment::{
            CompletePaymentInput, CompletedPayment, CreateInvoiceInput, CreateTransactionInput,
            InvoiceProfile, InvoiceRepo, PaymentCompletionRepo, PaymentRetryJobProfile,
            PaymentRetryJobRepo, PaymentTransactionProfile, PaymentTransactionRepo, UserProfile,
            UserRepo,
        },
        payment_webhook::{PaymentWebhookEventProfile, PaymentWebhookRepo},
        subscription::{
            CreateSubscriptionInput, SubscriptionPlanProfile, SubscriptionPlanRepo,
            SubscriptionProfile, SubscriptionRepo,
        },
        tier_gate::TenantUsageRepo,
    },
    domain::entities::{
        invoice_status::InvoiceStatus, payment_status::PaymentStatus,
        subscription::SubscriptionStatus,
    },
};

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

// ============================================================================
// InMemoryBillingStore
// ============================================================================

#[derive(Default)]
struct BillingState {
    plans: HashMap<Uuid, SubscriptionPlanProfile>,
    /// Insertion order doubles as creation order.
    subscriptions: Vec<SubscriptionProfile>,
    transactions: HashMap<String, PaymentTransactionProfile>,
    invoices: HashMap<String, InvoiceProfile>,
    users: HashMap<Uuid, UserProfile>,
    retry_jobs: Vec<PaymentRetryJobProfile>,
    webhook_events: HashMap<String, PaymentWebhookEventProfile>,
}

/// Every billing table behind one lock, so multi-table writes are atomic
/// the way the Postgres transaction makes them.
#[derive(Default)]
pub struct InMemoryBillingStore {
    state: Mutex<BillingState>,
}

impl InMemoryBillingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_plan(&self, plan: SubscriptionPlanProfile) -> SubscriptionPlanProfile {
        self.state
            .lock()
            .unwrap()
            .plans
            .insert(plan.id, plan.clone());
        plan
    }

    pub fn insert_subscription(&self, subscription: SubscriptionProfile) -> SubscriptionProfile {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .push(subscription.clone());
        subscription
    }

    pub fn insert_user(&self, user: UserProfile) -> UserProfile {
        self.state.lock().unwrap().users.insert(user.id, user.clone());
        user
    }

    pub fn insert_transaction(
        &self,
        transaction: PaymentTransactionProfile,
    ) -> PaymentTransactionProfile {
        self.state
            .lock()
            .unwrap()
            .transactions
            .insert(transaction.tx_ref.clone(), transaction.clone());
        transaction
    }

    pub fn insert_invoice(&self, invoice: InvoiceProfile) -> InvoiceProfile {
        self.state
            .lock()
            .unwrap()
            .invoices
            .insert(invoice.invoice_number.clone(), invoice.clone());
        invoice
    }

    pub fn subscription(&self, id: Uuid) -> Option<SubscriptionProfile> {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub fn subscriptions_for(&self, owner_id: Uuid) -> Vec<SubscriptionProfile> {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect()
    }

    pub fn transaction(&self, tx_ref: &str) -> Option<PaymentTransactionProfile> {
        self.state.lock().unwrap().transactions.get(tx_ref).cloned()
    }

    pub fn transaction_count(&self) -> usize {
        self.state.lock().unwrap().transactions.len()
    }

    pub fn invoice(&self, invoice_number: &str) -> Option<InvoiceProfile> {
        self.state
            .lock()
            .unwrap()
            .invoices
            .get(invoice_number)
            .cloned()
    }

    pub fn user(&self, id: Uuid) -> Option<UserProfile> {
        self.state.lock().unwrap().users.get(&id).cloned()
    }

    pub fn retry_jobs(&self) -> Vec<PaymentRetryJobProfile> {
        self.state.lock().unwrap().retry_jobs.clone()
    }

    pub fn webhook_event(&self, provider_event_id: &str) -> Option<PaymentWebhookEventProfile> {
        self.state
            .lock()
            .unwrap()
            .webhook_events
            .get(provider_event_id)
            .cloned()
    }

    pub fn webhook_event_count(&self) -> usize {
        self.state.lock().unwrap().webhook_events.len()
    }
}

#[async_trait]
impl SubscriptionPlanRepo for InMemoryBillingStore {
    async fn list_active(&self) -> AppResult<Vec<SubscriptionPlanProfile>> {
        let mut plans: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .plans
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect();
        plans.sort_by_key(|p| p.display_order);
        Ok(plans)
    }

    async fn get_by_slug(&self, slug: &str) -> AppResult<Option<SubscriptionPlanProfile>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .plans
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<SubscriptionPlanProfile>> {
        Ok(self.state.lock().unwrap().plans.get(&id).cloned())
    }
}

#[async_trait]
impl SubscriptionRepo for InMemoryBillingStore {
    async fn get_active_by_owner(&self, owner_id: Uuid) -> AppResult<Option<SubscriptionProfile>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .rev()
            .find(|s| {
                s.owner_id == owner_id
                    && matches!(
                        s.status,
                        SubscriptionStatus::Active | SubscriptionStatus::Trialing
                    )
            })
            .cloned())
    }

    async fn get_latest_by_owner(&self, owner_id: Uuid) -> AppResult<Option<SubscriptionProfile>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .rev()
            .find(|s| s.owner_id == owner_id)
            .cloned())
    }

    async fn create(&self, input: &CreateSubscriptionInput) -> AppResult<SubscriptionProfile> {
        let mut state = self.state.lock().unwrap();
        let plan_slug = state
            .plans
            .get(&input.plan_id)
            .map(|p| p.slug.clone())
            .ok_or(AppError::NotFound)?;

        let subscription = SubscriptionProfile {
            id: Uuid::new_v4(),
            owner_id: input.owner_id,
            plan_id: input.plan_id,
            plan_slug,
            status: input.status,
            current_period_start: input.current_period_start,
            current_period_end: input.current_period_end,
            trial_end: input.trial_end,
            cancelled_at: None,
            provider_subscription_id: None,
            created_at: Some(now()),
            updated_at: Some(now()),
        };
        state.subscriptions.push(subscription.clone());
        Ok(subscription)
    }

    async fn update_status(&self, id: Uuid, status: SubscriptionStatus) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let subscription = state
            .subscriptions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(AppError::NotFound)?;
        subscription.status = status;
        subscription.updated_at = Some(now());
        Ok(())
    }

    async fn supersede_others(&self, owner_id: Uuid, keep_id: Uuid) -> AppResult<u64> {
        let mut state = self.state.lock().unwrap();
        let mut touched = 0;
        for subscription in state.subscriptions.iter_mut().filter(|s| {
            s.owner_id == owner_id && s.id != keep_id && s.status != SubscriptionStatus::Cancelled
        }) {
            subscription.status = SubscriptionStatus::Cancelled;
            subscription.cancelled_at = Some(now());
            touched += 1;
        }
        Ok(touched)
    }
}

#[async_trait]
impl PaymentTransactionRepo for InMemoryBillingStore {
    async fn create(&self, input: &CreateTransactionInput) -> AppResult<PaymentTransactionProfile> {
        let mut state = self.state.lock().unwrap();
        if state.transactions.contains_key(&input.tx_ref) {
            return Err(AppError::InvalidInput("Resource already exists".into()));
        }
        let transaction = PaymentTransactionProfile {
            id: Uuid::new_v4(),
            owner_id: input.owner_id,
            amount_cents: input.amount_cents,
            currency: input.currency.clone(),
            status: PaymentStatus::Pending,
            tx_ref: input.tx_ref.clone(),
            reference: Some(input.reference.clone()),
            provider_transaction_ref: None,
            created_at: Some(now()),
            updated_at: Some(now()),
        };
        state
            .transactions
            .insert(input.tx_ref.clone(), transaction.clone());
        Ok(transaction)
    }

    async fn get_by_tx_ref(&self, tx_ref: &str) -> AppResult<Option<PaymentTransactionProfile>> {
        Ok(self.transaction(tx_ref))
    }

    async fn mark_failed(
        &self,
        tx_ref: &str,
        provider_reference: Option<&str>,
    ) -> AppResult<Option<PaymentTransactionProfile>> {
        let mut state = self.state.lock().unwrap();
        let Some(transaction) = state
            .transactions
            .get_mut(tx_ref)
            .filter(|t| !t.status.is_completed())
        else {
            return Ok(None);
        };
        transaction.status = PaymentStatus::Failed;
        if let Some(reference) = provider_reference {
            transaction.provider_transaction_ref = Some(reference.to_string());
        }
        transaction.updated_at = Some(now());
        Ok(Some(transaction.clone()))
    }
}

#[async_trait]
impl InvoiceRepo for InMemoryBillingStore {
    async fn create(&self, input: &CreateInvoiceInput) -> AppResult<InvoiceProfile> {
        let mut state = self.state.lock().unwrap();
        if state.invoices.contains_key(&input.invoice_number) {
            return Err(AppError::InvalidInput("Resource already exists".into()));
        }
        let invoice = InvoiceProfile {
            id: Uuid::new_v4(),
            invoice_number: input.invoice_number.clone(),
            subscription_id: input.subscription_id,
            owner_id: input.owner_id,
            amount_cents: input.amount_cents,
            currency: input.currency.clone(),
            status: InvoiceStatus::Pending,
            billing_period_start: input.billing_period_start,
            billing_period_end: input.billing_period_end,
            paid_at: None,
            created_at: Some(now()),
        };
        state
            .invoices
            .insert(input.invoice_number.clone(), invoice.clone());
        Ok(invoice)
    }

    async fn mark_failed(&self, invoice_number: &str) -> AppResult<Option<InvoiceProfile>> {
        let mut state = self.state.lock().unwrap();
        let Some(invoice) = state
            .invoices
            .get_mut(invoice_number)
            .filter(|i| i.status != InvoiceStatus::Paid)
        else {
            return Ok(None);
        };
        invoice.status = InvoiceStatus::Failed;
        Ok(Some(invoice.clone()))
    }
}

#[async_trait]
impl PaymentCompletionRepo for InMemoryBillingStore {
    async fn complete_payment(
        &self,
        input: &CompletePaymentInput,
    ) -> AppResult<Option<CompletedPayment>> {
        let mut state = self.state.lock().unwrap();

        // Validate everything before the first write so a failure leaves no trace.
        let transaction = state
            .transactions
            .get(&input.tx_ref)
            .ok_or(AppError::NotFound)?;
        if transaction.status.is_completed() {
            return Ok(None);
        }
        let invoice = state
            .invoices
            .get(&input.tx_ref)
            .cloned()
            .ok_or(AppError::NotFound)?;
        let index = state
            .subscriptions
            .iter()
            .position(|s| s.id == invoice.subscription_id)
            .ok_or(AppError::NotFound)?;
        let plan = input
            .plan_id
            .and_then(|id| state.plans.get(&id))
            .map(|p| (p.id, p.slug.clone()));

        if let Some(transaction) = state.transactions.get_mut(&input.tx_ref) {
            transaction.status = PaymentStatus::Completed;
            transaction.provider_transaction_ref = Some(input.provider_reference.clone());
            transaction.updated_at = Some(now());
        }
        if let Some(invoice) = state.invoices.get_mut(&input.tx_ref) {
            invoice.status = InvoiceStatus::Paid;
            invoice.paid_at = Some(now());
        }
        let subscription = &mut state.subscriptions[index];
        subscription.status = SubscriptionStatus::Active;
        subscription.current_period_start = input.period_start;
        subscription.current_period_end = input.period_end;
        if let Some((plan_id, plan_slug)) = plan {
            subscription.plan_id = plan_id;
            subscription.plan_slug = plan_slug;
        }
        subscription.updated_at = Some(now());

        Ok(Some(CompletedPayment {
            owner_id: invoice.owner_id,
            subscription_id: invoice.subscription_id,
            invoice_number: invoice.invoice_number,
            amount_cents: invoice.amount_cents,
            currency: invoice.currency,
        }))
    }
}

#[async_trait]
impl PaymentRetryJobRepo for InMemoryBillingStore {
    async fn schedule(
        &self,
        subscription_id: Uuid,
        scheduled_for: NaiveDateTime,
    ) -> AppResult<PaymentRetryJobProfile> {
        let job = PaymentRetryJobProfile {
            id: Uuid::new_v4(),
            subscription_id,
            scheduled_for,
            created_at: Some(now()),
        };
        self.state.lock().unwrap().retry_jobs.push(job.clone());
        Ok(job)
    }
}

#[async_trait]
impl UserRepo for InMemoryBillingStore {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        Ok(self.user(id))
    }

    async fn activate(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let user = state.users.get_mut(&id).ok_or(AppError::NotFound)?;
        user.is_active = true;
        Ok(())
    }
}

#[async_trait]
impl PaymentWebhookRepo for InMemoryBillingStore {
    async fn record(
        &self,
        provider_event_id: &str,
        event_type: &str,
        payload: &JsonValue,
    ) -> AppResult<PaymentWebhookEventProfile> {
        let mut state = self.state.lock().unwrap();
        if state.webhook_events.contains_key(provider_event_id) {
            return Err(AppError::DuplicateWebhook);
        }
        let event = PaymentWebhookEventProfile {
            id: Uuid::new_v4(),
            provider_event_id: provider_event_id.to_string(),
            event_type: event_type.to_string(),
            payload: payload.clone(),
            processed: false,
            processed_at: None,
            created_at: Some(now()),
        };
        state
            .webhook_events
            .insert(provider_event_id.to_string(), event.clone());
        Ok(event)
    }

    async fn mark_processed(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let event = state
            .webhook_events
            .values_mut()
            .find(|e| e.id == id)
            .ok_or(AppError::NotFound)?;
        event.processed = true;
        event.processed_at = Some(now());
        Ok(())
    }
}

// ============================================================================
// InMemoryTenantUsage
// ============================================================================

#[derive(Default)]
struct UsageState {
    /// restaurant id -> owner id
    restaurants: HashMap<Uuid, Uuid>,
    categories: HashMap<Uuid, i64>,
    menu_items: HashMap<Uuid, i64>,
    staff: HashMap<Uuid, i64>,
}

#[derive(Default)]
pub struct InMemoryTenantUsage {
    state: Mutex<UsageState>,
}

impl InMemoryTenantUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_restaurant(&self, owner_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().restaurants.insert(id, owner_id);
        id
    }

    pub fn add_category(&self, restaurant_id: Uuid) {
        *self
            .state
            .lock()
            .unwrap()
            .categories
            .entry(restaurant_id)
            .or_default() += 1;
    }

    pub fn add_menu_item(&self, restaurant_id: Uuid) {
        *self
            .state
            .lock()
            .unwrap()
            .menu_items
            .entry(restaurant_id)
            .or_default() += 1;
    }

    pub fn add_staff(&self, owner_id: Uuid) {
        *self
            .state
            .lock()
            .unwrap()
            .staff
            .entry(owner_id)
            .or_default() += 1;
    }
}

#[async_trait]
impl TenantUsageRepo for InMemoryTenantUsage {
    async fn count_restaurants_by_owner(&self, owner_id: Uuid) -> AppResult<i64> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .restaurants
            .values()
            .filter(|owner| **owner == owner_id)
            .count() as i64)
    }

    async fn count_categories_in_restaurant(&self, restaurant_id: Uuid) -> AppResult<i64> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .categories
            .get(&restaurant_id)
            .copied()
            .unwrap_or(0))
    }

    async fn count_menu_items_in_restaurant(&self, restaurant_id: Uuid) -> AppResult<i64> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .menu_items
            .get(&restaurant_id)
            .copied()
            .unwrap_or(0))
    }

    async fn count_staff_by_owner(&self, owner_id: Uuid) -> AppResult<i64> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .staff
            .get(&owner_id)
            .copied()
            .unwrap_or(0))
    }

    async fn get_restaurant_owner(&self, restaurant_id: Uuid) -> AppResult<Option<Uuid>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .restaurants
            .get(&restaurant_id)
            .copied())
    }
}
