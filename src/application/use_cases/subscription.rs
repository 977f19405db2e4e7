use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{
        feature_limits::FeatureLimits,
        subscription::{SubscriptionStatus, days_remaining, grants_access},
    },
};

/// Plan assigned to every freshly activated account.
pub const TRIAL_PLAN_SLUG: &str = "free-trial";

// ============================================================================
// Profile Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionPlanProfile {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub price_monthly_cents: i32,
    pub price_annual_cents: i32,
    pub currency: String,
    /// Raw `FeatureLimits` JSON as stored.
    pub features: serde_json::Value,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl SubscriptionPlanProfile {
    pub fn feature_limits(&self) -> Result<FeatureLimits, serde_json::Error> {
        FeatureLimits::from_json(&self.features)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionProfile {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub plan_id: Uuid,
    pub plan_slug: String,
    pub status: SubscriptionStatus,
    pub current_period_start: NaiveDateTime,
    pub current_period_end: NaiveDateTime,
    pub trial_end: Option<NaiveDateTime>,
    pub cancelled_at: Option<NaiveDateTime>,
    pub provider_subscription_id: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl SubscriptionProfile {
    pub fn grants_access_at(&self, now: NaiveDateTime) -> bool {
        grants_access(
            self.status,
            self.current_period_end,
            self.trial_end,
            now,
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionDetails {
    pub plan_name: String,
    pub plan_slug: String,
    pub price_cents: i32,
    pub currency: String,
    pub status: SubscriptionStatus,
    pub current_period_start: NaiveDateTime,
    pub current_period_end: NaiveDateTime,
    pub trial_end: Option<NaiveDateTime>,
    pub days_remaining: i64,
    pub features: FeatureLimits,
}

// ============================================================================
// Input Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct CreateSubscriptionInput {
    pub owner_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub current_period_start: NaiveDateTime,
    pub current_period_end: NaiveDateTime,
    pub trial_end: Option<NaiveDateTime>,
}

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait SubscriptionPlanRepo: Send + Sync {
    /// Active plans ordered by display order.
    async fn list_active(&self) -> AppResult<Vec<SubscriptionPlanProfile>>;
    async fn get_by_slug(&self, slug: &str) -> AppResult<Option<SubscriptionPlanProfile>>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<SubscriptionPlanProfile>>;
}

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    /// Newest row in `active` or `trialing` for the owner. Owners may hold
    /// stale rows, so this never assumes a single match.
    async fn get_active_by_owner(&self, owner_id: Uuid) -> AppResult<Option<SubscriptionProfile>>;
    /// Newest row of any status for the owner.
    async fn get_latest_by_owner(&self, owner_id: Uuid) -> AppResult<Option<SubscriptionProfile>>;
    async fn create(&self, input: &CreateSubscriptionInput) -> AppResult<SubscriptionProfile>;
    async fn update_status(&self, id: Uuid, status: SubscriptionStatus) -> AppResult<()>;
    /// Cancels every other non-cancelled row of the owner. Returns rows touched.
    async fn supersede_others(&self, owner_id: Uuid, keep_id: Uuid) -> AppResult<u64>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct SubscriptionUseCases {
    plan_repo: Arc<dyn SubscriptionPlanRepo>,
    subscription_repo: Arc<dyn SubscriptionRepo>,
    trial_days: i64,
}

impl SubscriptionUseCases {
    pub fn new(
        plan_repo: Arc<dyn SubscriptionPlanRepo>,
        subscription_repo: Arc<dyn SubscriptionRepo>,
        trial_days: i64,
    ) -> Self {
        Self {
            plan_repo,
            subscription_repo,
            trial_days,
        }
    }

    pub async fn list_plans(&self) -> AppResult<Vec<SubscriptionPlanProfile>> {
        self.plan_repo.list_active().await
    }

    /// Active plan by slug; unknown or retired slugs are a validation error.
    pub async fn get_plan_by_slug(&self, slug: &str) -> AppResult<SubscriptionPlanProfile> {
        self.plan_repo
            .get_by_slug(slug)
            .await?
            .filter(|plan| plan.is_active)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown plan: {}", slug)))
    }

    /// The owner's currently valid subscription together with its plan.
    pub async fn get_valid_subscription(
        &self,
        owner_id: Uuid,
    ) -> AppResult<(SubscriptionProfile, SubscriptionPlanProfile)> {
        let now = Utc::now().naive_utc();

        let subscription = self
            .subscription_repo
            .get_active_by_owner(owner_id)
            .await?
            .filter(|s| s.grants_access_at(now))
            .ok_or(AppError::SubscriptionInactive)?;

        let plan = self
            .plan_repo
            .get_by_id(subscription.plan_id)
            .await?
            .ok_or_else(|| {
                tracing::error!(
                    subscription_id = %subscription.id,
                    plan_id = %subscription.plan_id,
                    "Subscription references a missing plan"
                );
                AppError::Internal("Subscription plan not found".into())
            })?;

        Ok((subscription, plan))
    }

    /// Limits in force for the owner.
    ///
    /// A plan whose features cannot be decoded blocks gated actions instead of
    /// falling back to zero limits, because zero means unlimited.
    pub async fn get_feature_limits(&self, owner_id: Uuid) -> AppResult<FeatureLimits> {
        let (subscription, plan) = self.get_valid_subscription(owner_id).await?;

        plan.feature_limits().map_err(|e| {
            tracing::warn!(
                owner_id = %owner_id,
                subscription_id = %subscription.id,
                plan_slug = %plan.slug,
                error = %e,
                "Failed to parse plan features, refusing gated action"
            );
            AppError::Internal("Subscription features are unreadable".into())
        })
    }

    /// The subscription in force, or the most recent row when none is.
    pub async fn get_subscription_details(&self, owner_id: Uuid) -> AppResult<SubscriptionDetails> {
        let subscription = match self.subscription_repo.get_active_by_owner(owner_id).await? {
            Some(subscription) => subscription,
            None => self
                .subscription_repo
                .get_latest_by_owner(owner_id)
                .await?
                .ok_or(AppError::NotFound)?,
        };

        let plan = self
            .plan_repo
            .get_by_id(subscription.plan_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let features = plan.feature_limits().unwrap_or_else(|e| {
            tracing::warn!(plan_slug = %plan.slug, error = %e, "Failed to parse plan features");
            FeatureLimits::default()
        });

        let now = Utc::now().naive_utc();
        let ends_at = match (subscription.status, subscription.trial_end) {
            (SubscriptionStatus::Trialing, Some(trial_end)) => trial_end,
            _ => subscription.current_period_end,
        };

        Ok(SubscriptionDetails {
            plan_name: plan.name,
            plan_slug: plan.slug,
            price_cents: plan.price_monthly_cents,
            currency: plan.currency,
            status: subscription.status,
            current_period_start: subscription.current_period_start,
            current_period_end: subscription.current_period_end,
            trial_end: subscription.trial_end,
            days_remaining: days_remaining(ends_at, now),
            features,
        })
    }

    /// Opens the trial window for a newly activated owner.
    ///
    /// Returns the current row unchanged when the owner already has a trial or
    /// paid subscription; an owner whose earlier subscription lapsed gets no
    /// second trial.
    pub async fn start_trial(&self, owner_id: Uuid) -> AppResult<SubscriptionProfile> {
        if let Some(current) = self.subscription_repo.get_active_by_owner(owner_id).await? {
            tracing::debug!(owner_id = %owner_id, status = %current.status, "Trial not started, subscription exists");
            return Ok(current);
        }
        if let Some(previous) = self.subscription_repo.get_latest_by_owner(owner_id).await? {
            if !previous.status.is_incomplete() {
                return Err(AppError::InvalidInput("Trial already used".into()));
            }
        }

        let plan = self.get_plan_by_slug(TRIAL_PLAN_SLUG).await?;
        let now = Utc::now().naive_utc();
        let trial_end = now + Duration::days(self.trial_days);

        let subscription = self
            .subscription_repo
            .create(&CreateSubscriptionInput {
                owner_id,
                plan_id: plan.id,
                status: SubscriptionStatus::Trialing,
                current_period_start: now,
                current_period_end: trial_end,
                trial_end: Some(trial_end),
            })
            .await?;

        tracing::info!(
            owner_id = %owner_id,
            subscription_id = %subscription.id,
            trial_end = %trial_end,
            "Trial subscription started"
        );
        Ok(subscription)
    }
}
