use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::{
            notification_sink::{NotificationSink, PaymentNotification},
            payment_provider::{CheckoutRequest, PaymentProviderPort, TxRef},
        },
        use_cases::subscription::{
            CreateSubscriptionInput, SubscriptionPlanProfile, SubscriptionPlanRepo,
            SubscriptionProfile, SubscriptionRepo,
        },
        validators::{is_valid_email, is_valid_plan_slug, is_valid_tx_ref, normalize_plan_slug},
    },
    domain::entities::{
        invoice_status::InvoiceStatus,
        payment_status::PaymentStatus,
        payment_type::{PaymentType, PlanReference},
        subscription::{SubscriptionStatus, one_month_after},
        user_role::UserRole,
    },
};

/// A new subscription inherits the current period end only when more than
/// this many days remain.
pub const CARRY_FORWARD_MIN_DAYS: f64 = 5.0;

const CHECKOUT_DESCRIPTION: &str = "Monthly subscription";

// ============================================================================
// Profile Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PaymentTransactionProfile {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub tx_ref: String,
    /// `"{type}:{plan_slug}"`, see [`PlanReference`].
    pub reference: Option<String>,
    pub provider_transaction_ref: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceProfile {
    pub id: Uuid,
    /// Same value as the transaction's `tx_ref`.
    pub invoice_number: String,
    pub subscription_id: Uuid,
    pub owner_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub status: InvoiceStatus,
    pub billing_period_start: NaiveDateTime,
    pub billing_period_end: NaiveDateTime,
    pub paid_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub owner_id: Option<Uuid>,
    pub restaurant_id: Option<Uuid>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentRetryJobProfile {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub scheduled_for: NaiveDateTime,
    pub created_at: Option<NaiveDateTime>,
}

// ============================================================================
// Input Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub owner_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub tx_ref: String,
    pub reference: String,
}

#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    pub invoice_number: String,
    pub subscription_id: Uuid,
    pub owner_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub billing_period_start: NaiveDateTime,
    pub billing_period_end: NaiveDateTime,
}

/// Writes applied atomically when a payment is confirmed.
#[derive(Debug, Clone)]
pub struct CompletePaymentInput {
    pub tx_ref: String,
    pub provider_reference: String,
    /// Plan recovered from the transaction reference. `None` keeps the
    /// subscription's current plan.
    pub plan_id: Option<Uuid>,
    pub period_start: NaiveDateTime,
    pub period_end: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct InitiatePaymentInput {
    pub owner_id: Uuid,
    pub plan_slug: String,
    pub payment_type: PaymentType,
    pub email: Option<String>,
    pub name: Option<String>,
}

// ============================================================================
// Result Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedPayment {
    pub owner_id: Uuid,
    pub subscription_id: Uuid,
    pub invoice_number: String,
    pub amount_cents: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Completed(CompletedPayment),
    /// The transaction was already settled; nothing was written.
    AlreadyCompleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// Provider confirmed the payment. `reconciled` is false when the
    /// confirmation could not be applied yet; the webhook will retry it.
    Confirmed { tx_ref: String, reconciled: bool },
    NotVerified { tx_ref: String, status: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureOutcome {
    Recorded {
        subscription_id: Option<Uuid>,
        retry_at: Option<NaiveDateTime>,
    },
    /// A completed transaction is never downgraded by a late failure event.
    IgnoredCompleted,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitiatePaymentResult {
    pub checkout_url: String,
    pub tx_ref: String,
    pub subscription_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
}

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait PaymentTransactionRepo: Send + Sync {
    async fn create(&self, input: &CreateTransactionInput) -> AppResult<PaymentTransactionProfile>;
    async fn get_by_tx_ref(&self, tx_ref: &str) -> AppResult<Option<PaymentTransactionProfile>>;
    /// Marks a not-yet-completed transaction failed. Returns `None` when the
    /// transaction is missing or already completed.
    async fn mark_failed(
        &self,
        tx_ref: &str,
        provider_reference: Option<&str>,
    ) -> AppResult<Option<PaymentTransactionProfile>>;
}

#[async_trait]
pub trait InvoiceRepo: Send + Sync {
    async fn create(&self, input: &CreateInvoiceInput) -> AppResult<InvoiceProfile>;
    async fn mark_failed(&self, invoice_number: &str) -> AppResult<Option<InvoiceProfile>>;
}

/// The transaction, invoice and subscription writes of a confirmed payment.
#[async_trait]
pub trait PaymentCompletionRepo: Send + Sync {
    /// Applies all writes or none. Returns `None` when the transaction was
    /// already completed by a concurrent caller.
    async fn complete_payment(
        &self,
        input: &CompletePaymentInput,
    ) -> AppResult<Option<CompletedPayment>>;
}

#[async_trait]
pub trait PaymentRetryJobRepo: Send + Sync {
    async fn schedule(
        &self,
        subscription_id: Uuid,
        scheduled_for: NaiveDateTime,
    ) -> AppResult<PaymentRetryJobProfile>;
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>>;
    async fn activate(&self, id: Uuid) -> AppResult<()>;
}

// ============================================================================
// Pricing
// ============================================================================

/// The billing period and price an owner is currently paying for.
#[derive(Debug, Clone, Copy)]
pub struct CurrentBilling {
    pub period_start: NaiveDateTime,
    pub period_end: NaiveDateTime,
    pub price_cents: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingBasis {
    NoActivePeriod,
    PeriodEndingSoon,
    DegeneratePeriod,
    Upgrade,
    SameTierChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AmountQuote {
    pub amount_cents: i64,
    pub basis: PricingBasis,
}

fn fractional_days(later: NaiveDateTime, earlier: NaiveDateTime) -> f64 {
    (later - earlier).num_seconds() as f64 / 86_400.0
}

/// Price of a checkout for `new_price_cents`.
///
/// Every basis charges the new plan's flat monthly price; mid-cycle changes
/// are not prorated. The basis is reported so callers can log why.
pub fn calculate_amount(
    current: Option<CurrentBilling>,
    new_price_cents: i32,
    payment_type: PaymentType,
    now: NaiveDateTime,
) -> AmountQuote {
    let full = i64::from(new_price_cents);
    let quote = |basis| AmountQuote {
        amount_cents: full,
        basis,
    };

    let Some(current) = current else {
        return quote(PricingBasis::NoActivePeriod);
    };
    if fractional_days(current.period_end, now) < CARRY_FORWARD_MIN_DAYS {
        return quote(PricingBasis::PeriodEndingSoon);
    }
    if fractional_days(current.period_end, current.period_start) <= 0.0 {
        return quote(PricingBasis::DegeneratePeriod);
    }
    if new_price_cents > current.price_cents && payment_type != PaymentType::Update {
        return quote(PricingBasis::Upgrade);
    }
    quote(PricingBasis::SameTierChange)
}

// ============================================================================
// Use Cases
// ============================================================================

/// URLs handed to the provider and to notification links.
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub callback_url: String,
    pub return_url: String,
    pub app_base_url: String,
}

impl PaymentSettings {
    /// Keeps any query the configured return URL already carries.
    pub fn return_url_for(&self, tx_ref: &TxRef) -> String {
        match url::Url::parse(&self.return_url) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("tx_ref", tx_ref.as_str());
                url.into()
            }
            Err(e) => {
                tracing::warn!(return_url = %self.return_url, error = %e, "Return URL is not absolute");
                format!("{}?tx_ref={}", self.return_url, tx_ref.as_str())
            }
        }
    }

    pub fn billing_url(&self) -> String {
        format!("{}/billing", self.app_base_url.trim_end_matches('/'))
    }
}

#[derive(Clone)]
pub struct PaymentUseCases {
    plan_repo: Arc<dyn SubscriptionPlanRepo>,
    subscription_repo: Arc<dyn SubscriptionRepo>,
    transaction_repo: Arc<dyn PaymentTransactionRepo>,
    invoice_repo: Arc<dyn InvoiceRepo>,
    completion_repo: Arc<dyn PaymentCompletionRepo>,
    retry_job_repo: Arc<dyn PaymentRetryJobRepo>,
    user_repo: Arc<dyn UserRepo>,
    provider: Arc<dyn PaymentProviderPort>,
    notifier: Arc<dyn NotificationSink>,
    settings: PaymentSettings,
}

impl PaymentUseCases {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        plan_repo: Arc<dyn SubscriptionPlanRepo>,
        subscription_repo: Arc<dyn SubscriptionRepo>,
        transaction_repo: Arc<dyn PaymentTransactionRepo>,
        invoice_repo: Arc<dyn InvoiceRepo>,
        completion_repo: Arc<dyn PaymentCompletionRepo>,
        retry_job_repo: Arc<dyn PaymentRetryJobRepo>,
        user_repo: Arc<dyn UserRepo>,
        provider: Arc<dyn PaymentProviderPort>,
        notifier: Arc<dyn NotificationSink>,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            plan_repo,
            subscription_repo,
            transaction_repo,
            invoice_repo,
            completion_repo,
            retry_job_repo,
            user_repo,
            provider,
            notifier,
            settings,
        }
    }

    // ------------------------------------------------------------------------
    // Initiation
    // ------------------------------------------------------------------------

    /// Opens a hosted checkout for `plan_slug` and returns where to send the
    /// owner.
    #[instrument(skip(self, input), fields(owner_id = %input.owner_id, payment_type = %input.payment_type))]
    pub async fn initiate_payment(
        &self,
        input: InitiatePaymentInput,
    ) -> AppResult<InitiatePaymentResult> {
        let slug = normalize_plan_slug(&input.plan_slug);
        if !is_valid_plan_slug(&slug) {
            return Err(AppError::InvalidInput("Invalid plan".into()));
        }
        let plan = self
            .plan_repo
            .get_by_slug(&slug)
            .await?
            .filter(|plan| plan.is_active)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown plan: {}", slug)))?;
        if plan.price_monthly_cents <= 0 {
            return Err(AppError::InvalidInput(format!(
                "Plan {} cannot be purchased",
                plan.slug
            )));
        }

        let (email, name) = self.resolve_contact(&input).await?;

        let now = Utc::now().naive_utc();
        let current = self.current_paid_period(input.owner_id, now).await?;
        let subscription = self
            .resolve_target_subscription(input.owner_id, &plan, current.as_ref(), now)
            .await?;

        let quote = calculate_amount(
            current.as_ref().map(|(sub, price_cents)| CurrentBilling {
                period_start: sub.current_period_start,
                period_end: sub.current_period_end,
                price_cents: *price_cents,
            }),
            plan.price_monthly_cents,
            input.payment_type,
            now,
        );

        let tx_ref = TxRef::generate();
        let reference = PlanReference::new(input.payment_type, &plan.slug).encode();

        self.transaction_repo
            .create(&CreateTransactionInput {
                owner_id: input.owner_id,
                amount_cents: quote.amount_cents,
                currency: plan.currency.clone(),
                tx_ref: tx_ref.to_string(),
                reference,
            })
            .await?;

        self.invoice_repo
            .create(&CreateInvoiceInput {
                invoice_number: tx_ref.to_string(),
                subscription_id: subscription.id,
                owner_id: input.owner_id,
                amount_cents: quote.amount_cents,
                currency: plan.currency.clone(),
                billing_period_start: now,
                billing_period_end: one_month_after(now),
            })
            .await?;

        let request = CheckoutRequest {
            tx_ref: tx_ref.clone(),
            amount_cents: quote.amount_cents,
            currency: plan.currency.clone(),
            email,
            first_name: name,
            callback_url: self.settings.callback_url.clone(),
            return_url: self.settings.return_url_for(&tx_ref),
            title: format!("{} Plan", plan.name),
            description: CHECKOUT_DESCRIPTION.to_string(),
        };

        let session = self.provider.initialize_checkout(&request).await.map_err(|e| {
            tracing::error!(
                tx_ref = %tx_ref,
                provider = self.provider.provider_name(),
                error = %e,
                "Checkout initialization failed, transaction left pending"
            );
            e
        })?;

        tracing::info!(
            tx_ref = %tx_ref,
            subscription_id = %subscription.id,
            plan_slug = %plan.slug,
            amount_cents = quote.amount_cents,
            basis = ?quote.basis,
            "Checkout initialized"
        );

        Ok(InitiatePaymentResult {
            checkout_url: session.checkout_url,
            tx_ref: tx_ref.to_string(),
            subscription_id: subscription.id,
            amount_cents: quote.amount_cents,
            currency: plan.currency,
        })
    }

    async fn resolve_contact(&self, input: &InitiatePaymentInput) -> AppResult<(String, String)> {
        let explicit_email = input
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());
        let explicit_name = input
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let (email, name) = match (explicit_email, explicit_name) {
            (Some(email), Some(name)) => (email.to_string(), name.to_string()),
            _ => {
                let user = self
                    .user_repo
                    .get_by_id(input.owner_id)
                    .await?
                    .ok_or(AppError::NotFound)?;
                (
                    explicit_email.map(str::to_string).unwrap_or(user.email),
                    explicit_name.map(str::to_string).unwrap_or(user.full_name),
                )
            }
        };

        if !is_valid_email(&email) {
            return Err(AppError::InvalidInput("Invalid billing email".into()));
        }
        Ok((email, name))
    }

    /// The owner's paid, unexpired subscription and its plan price.
    async fn current_paid_period(
        &self,
        owner_id: Uuid,
        now: NaiveDateTime,
    ) -> AppResult<Option<(SubscriptionProfile, i32)>> {
        let Some(current) = self
            .subscription_repo
            .get_active_by_owner(owner_id)
            .await?
            .filter(|s| s.status == SubscriptionStatus::Active && s.grants_access_at(now))
        else {
            return Ok(None);
        };

        let price_cents = match self.plan_repo.get_by_slug(&current.plan_slug).await? {
            Some(plan) => plan.price_monthly_cents,
            None => {
                tracing::warn!(
                    subscription_id = %current.id,
                    plan_slug = %current.plan_slug,
                    "Active subscription references a missing plan"
                );
                0
            }
        };
        Ok(Some((current, price_cents)))
    }

    async fn resolve_target_subscription(
        &self,
        owner_id: Uuid,
        plan: &SubscriptionPlanProfile,
        current: Option<&(SubscriptionProfile, i32)>,
        now: NaiveDateTime,
    ) -> AppResult<SubscriptionProfile> {
        let latest = self.subscription_repo.get_latest_by_owner(owner_id).await?;
        if let Some(latest) = latest.filter(|s| s.status.is_incomplete() && s.plan_slug == plan.slug) {
            tracing::debug!(subscription_id = %latest.id, "Reusing incomplete subscription");
            return Ok(latest);
        }

        let period_end = match current {
            Some((sub, _))
                if fractional_days(sub.current_period_end, now) > CARRY_FORWARD_MIN_DAYS =>
            {
                sub.current_period_end
            }
            _ => one_month_after(now),
        };

        self.subscription_repo
            .create(&CreateSubscriptionInput {
                owner_id,
                plan_id: plan.id,
                status: SubscriptionStatus::Incomplete,
                current_period_start: now,
                current_period_end: period_end,
                trial_end: None,
            })
            .await
    }

    // ------------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------------

    /// Settles a confirmed payment. Safe to call any number of times for the
    /// same `tx_ref`; only the first call writes.
    #[instrument(skip(self))]
    pub async fn complete_payment(
        &self,
        tx_ref: &str,
        provider_reference: &str,
    ) -> AppResult<CompletionOutcome> {
        let transaction = self
            .transaction_repo
            .get_by_tx_ref(tx_ref)
            .await?
            .ok_or(AppError::NotFound)?;
        if transaction.status.is_completed() {
            tracing::debug!(tx_ref, "Transaction already completed");
            return Ok(CompletionOutcome::AlreadyCompleted);
        }

        let plan_id = self.plan_for_reference(&transaction).await?;
        let now = Utc::now().naive_utc();

        let completed = match self
            .completion_repo
            .complete_payment(&CompletePaymentInput {
                tx_ref: tx_ref.to_string(),
                provider_reference: provider_reference.to_string(),
                plan_id,
                period_start: now,
                period_end: one_month_after(now),
            })
            .await
        {
            Ok(Some(completed)) => completed,
            Ok(None) => return Ok(CompletionOutcome::AlreadyCompleted),
            Err(e) => {
                tracing::error!(
                    tx_ref,
                    invoice_number = tx_ref,
                    provider_reference,
                    owner_id = %transaction.owner_id,
                    error = %e,
                    "Payment reconciliation failed, needs manual replay"
                );
                return Err(e);
            }
        };

        match self
            .subscription_repo
            .supersede_others(completed.owner_id, completed.subscription_id)
            .await
        {
            Ok(0) => {}
            Ok(count) => tracing::info!(
                owner_id = %completed.owner_id,
                subscription_id = %completed.subscription_id,
                count,
                "Superseded previous subscriptions"
            ),
            Err(e) => tracing::warn!(
                owner_id = %completed.owner_id,
                subscription_id = %completed.subscription_id,
                error = %e,
                "Failed to supersede previous subscriptions"
            ),
        }

        if let Err(e) = self.user_repo.activate(completed.owner_id).await {
            tracing::warn!(owner_id = %completed.owner_id, error = %e, "Failed to activate owner");
        }

        let invoice_number = completed.invoice_number.clone();
        let amount_cents = completed.amount_cents;
        let currency = completed.currency.clone();
        self.notify_owner(completed.owner_id, |user| PaymentNotification::Succeeded {
            to: user.email,
            name: user.full_name,
            invoice_number,
            amount_cents,
            currency,
        })
        .await;

        tracing::info!(
            tx_ref,
            subscription_id = %completed.subscription_id,
            owner_id = %completed.owner_id,
            "Payment completed"
        );
        Ok(CompletionOutcome::Completed(completed))
    }

    async fn plan_for_reference(
        &self,
        transaction: &PaymentTransactionProfile,
    ) -> AppResult<Option<Uuid>> {
        let Some(reference) = transaction.reference.as_deref().and_then(PlanReference::parse)
        else {
            tracing::warn!(
                tx_ref = %transaction.tx_ref,
                reference = ?transaction.reference,
                "Transaction reference does not name a plan"
            );
            return Ok(None);
        };

        let plan = self.plan_repo.get_by_slug(&reference.plan_slug).await?;
        if plan.is_none() {
            tracing::warn!(
                tx_ref = %transaction.tx_ref,
                plan_slug = %reference.plan_slug,
                "Transaction references an unknown plan"
            );
        }
        Ok(plan.map(|p| p.id))
    }

    /// Browser return from the hosted checkout: verify with the provider,
    /// then reconcile.
    #[instrument(skip(self))]
    pub async fn confirm_return(&self, tx_ref: &str) -> AppResult<ReturnOutcome> {
        if !is_valid_tx_ref(tx_ref) {
            return Err(AppError::InvalidInput("Invalid transaction reference".into()));
        }

        let verification = self
            .provider
            .verify_transaction(&TxRef::new(tx_ref))
            .await?;

        if !verification.verified {
            tracing::info!(tx_ref, status = ?verification.status, "Payment not verified");
            return Ok(ReturnOutcome::NotVerified {
                tx_ref: tx_ref.to_string(),
                status: verification.status,
            });
        }

        let provider_reference = verification
            .provider_reference
            .unwrap_or_else(|| tx_ref.to_string());

        let reconciled = match self.complete_payment(tx_ref, &provider_reference).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(tx_ref, error = %e, "Verified payment could not be reconciled");
                false
            }
        };

        Ok(ReturnOutcome::Confirmed {
            tx_ref: tx_ref.to_string(),
            reconciled,
        })
    }

    // ------------------------------------------------------------------------
    // Failure and pending
    // ------------------------------------------------------------------------

    /// Records a failed charge: the transaction fails; the invoice, the
    /// subscription and the retry schedule follow on a best-effort basis.
    #[instrument(skip(self))]
    pub async fn fail_payment(
        &self,
        tx_ref: &str,
        provider_reference: Option<&str>,
    ) -> AppResult<FailureOutcome> {
        let Some(transaction) = self
            .transaction_repo
            .mark_failed(tx_ref, provider_reference)
            .await?
        else {
            return match self.transaction_repo.get_by_tx_ref(tx_ref).await? {
                Some(_) => {
                    tracing::warn!(tx_ref, "Ignoring failure event for completed transaction");
                    Ok(FailureOutcome::IgnoredCompleted)
                }
                None => Err(AppError::NotFound),
            };
        };

        let invoice = match self.invoice_repo.mark_failed(tx_ref).await {
            Ok(Some(invoice)) => Some(invoice),
            Ok(None) => {
                tracing::warn!(tx_ref, "No invoice for failed transaction");
                None
            }
            Err(e) => {
                tracing::warn!(tx_ref, error = %e, "Failed to mark invoice failed");
                None
            }
        };

        let mut retry_at = None;
        if let Some(invoice) = &invoice {
            if let Err(e) = self
                .subscription_repo
                .update_status(invoice.subscription_id, SubscriptionStatus::PastDue)
                .await
            {
                tracing::warn!(
                    subscription_id = %invoice.subscription_id,
                    error = %e,
                    "Failed to mark subscription past due"
                );
            }

            let scheduled_for = Utc::now().naive_utc() + Duration::days(1);
            match self
                .retry_job_repo
                .schedule(invoice.subscription_id, scheduled_for)
                .await
            {
                Ok(job) => retry_at = Some(job.scheduled_for),
                Err(e) => tracing::warn!(
                    subscription_id = %invoice.subscription_id,
                    error = %e,
                    "Failed to schedule payment retry"
                ),
            }
        }

        let update_payment_url = self.settings.billing_url();
        self.notify_owner(transaction.owner_id, |user| PaymentNotification::Failed {
            to: user.email,
            name: user.full_name,
            update_payment_url,
        })
        .await;

        tracing::info!(tx_ref, owner_id = %transaction.owner_id, "Payment failure recorded");
        Ok(FailureOutcome::Recorded {
            subscription_id: invoice.map(|i| i.subscription_id),
            retry_at,
        })
    }

    /// Pending payments change no state; the owner is only told.
    pub async fn notify_pending(&self, tx_ref: &str) -> AppResult<()> {
        let transaction = self
            .transaction_repo
            .get_by_tx_ref(tx_ref)
            .await?
            .ok_or(AppError::NotFound)?;

        self.notify_owner(transaction.owner_id, |user| PaymentNotification::Pending {
            to: user.email,
            name: user.full_name,
        })
        .await;
        Ok(())
    }

    async fn notify_owner(
        &self,
        owner_id: Uuid,
        build: impl FnOnce(UserProfile) -> PaymentNotification,
    ) {
        let user = match self.user_repo.get_by_id(owner_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::warn!(owner_id = %owner_id, "Owner not found, skipping notification");
                return;
            }
            Err(e) => {
                tracing::warn!(owner_id = %owner_id, error = %e, "Failed to load owner for notification");
                return;
            }
        };

        let notification = build(user);
        let kind = notification.kind();
        if let Err(e) = self.notifier.enqueue(notification).await {
            tracing::warn!(owner_id = %owner_id, kind, error = %e, "Failed to queue notification");
        }
    }
}
