use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        identity::{Actor, OwnerScope},
        use_cases::subscription::SubscriptionUseCases,
    },
    domain::entities::{feature_limits::limit_reached, gated_resource::GatedResource},
};

/// Read-only counters over tenant data.
#[async_trait]
pub trait TenantUsageRepo: Send + Sync {
    async fn count_restaurants_by_owner(&self, owner_id: Uuid) -> AppResult<i64>;
    async fn count_categories_in_restaurant(&self, restaurant_id: Uuid) -> AppResult<i64>;
    async fn count_menu_items_in_restaurant(&self, restaurant_id: Uuid) -> AppResult<i64>;
    /// Staff across all of the owner's restaurants.
    async fn count_staff_by_owner(&self, owner_id: Uuid) -> AppResult<i64>;
    async fn get_restaurant_owner(&self, restaurant_id: Uuid) -> AppResult<Option<Uuid>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GateDecision {
    /// Admin actor; no plan applies.
    Exempt,
    Allowed {
        resource: GatedResource,
        current: i64,
        /// Zero or below means unlimited.
        limit: i32,
    },
}

#[derive(Clone)]
pub struct TierGateUseCases {
    subscriptions: Arc<SubscriptionUseCases>,
    usage_repo: Arc<dyn TenantUsageRepo>,
}

impl TierGateUseCases {
    pub fn new(
        subscriptions: Arc<SubscriptionUseCases>,
        usage_repo: Arc<dyn TenantUsageRepo>,
    ) -> Self {
        Self {
            subscriptions,
            usage_repo,
        }
    }

    /// Precondition for creating one more `resource`.
    ///
    /// `restaurant_id` is required for categories and menu items; staff actors
    /// fall back to their bound restaurant.
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id, role = %actor.role))]
    pub async fn check(
        &self,
        actor: &Actor,
        resource: GatedResource,
        restaurant_id: Option<Uuid>,
    ) -> AppResult<GateDecision> {
        let owner_id = match actor.owner_scope()? {
            OwnerScope::Exempt => return Ok(GateDecision::Exempt),
            OwnerScope::Owner(owner_id) => owner_id,
        };

        let limits = self.subscriptions.get_feature_limits(owner_id).await?;
        let limit = resource.limit_in(&limits);

        let current = match resource {
            GatedResource::Restaurant => {
                self.usage_repo.count_restaurants_by_owner(owner_id).await?
            }
            GatedResource::Staff => self.usage_repo.count_staff_by_owner(owner_id).await?,
            GatedResource::Category | GatedResource::MenuItem => {
                let restaurant_id = restaurant_id.or(actor.restaurant_id).ok_or_else(|| {
                    AppError::InvalidInput("restaurant_id is required".into())
                })?;
                self.ensure_restaurant_owned_by(restaurant_id, owner_id)
                    .await?;

                if resource == GatedResource::Category {
                    self.usage_repo
                        .count_categories_in_restaurant(restaurant_id)
                        .await?
                } else {
                    self.usage_repo
                        .count_menu_items_in_restaurant(restaurant_id)
                        .await?
                }
            }
        };

        if limit_reached(limit, current) {
            tracing::info!(
                owner_id = %owner_id,
                resource = %resource,
                current,
                limit,
                "Tier limit reached"
            );
            return Err(AppError::TierLimitExceeded {
                resource,
                current,
                limit,
            });
        }

        Ok(GateDecision::Allowed {
            resource,
            current,
            limit,
        })
    }

    async fn ensure_restaurant_owned_by(&self, restaurant_id: Uuid, owner_id: Uuid) -> AppResult<()> {
        match self.usage_repo.get_restaurant_owner(restaurant_id).await? {
            Some(actual) if actual == owner_id => Ok(()),
            Some(_) => Err(AppError::Forbidden),
            None => Err(AppError::NotFound),
        }
    }
}
