use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::subscription::{
        CreateSubscriptionInput, SubscriptionProfile, SubscriptionRepo,
    },
    domain::entities::subscription::SubscriptionStatus,
};

fn row_to_profile(row: sqlx::postgres::PgRow) -> SubscriptionProfile {
    SubscriptionProfile {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        plan_id: row.get("plan_id"),
        plan_slug: row.get("plan_slug"),
        status: row.get("status"),
        current_period_start: row.get("current_period_start"),
        current_period_end: row.get("current_period_end"),
        trial_end: row.get("trial_end"),
        cancelled_at: row.get("cancelled_at"),
        provider_subscription_id: row.get("provider_subscription_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Columns of `s` joined with its plan `p`.
const SELECT_COLS: &str = r#"
    s.id, s.owner_id, s.plan_id, p.slug AS plan_slug, s.status,
    s.current_period_start, s.current_period_end, s.trial_end, s.cancelled_at,
    s.provider_subscription_id, s.created_at, s.updated_at
"#;

const FROM_JOINED: &str =
    "FROM subscriptions s JOIN subscription_plans p ON p.id = s.plan_id";

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn get_active_by_owner(&self, owner_id: Uuid) -> AppResult<Option<SubscriptionProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} {} WHERE s.owner_id = $1 AND s.status IN ('active', 'trialing') ORDER BY s.created_at DESC LIMIT 1",
            SELECT_COLS, FROM_JOINED
        ))
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn get_latest_by_owner(&self, owner_id: Uuid) -> AppResult<Option<SubscriptionProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} {} WHERE s.owner_id = $1 ORDER BY s.created_at DESC LIMIT 1",
            SELECT_COLS, FROM_JOINED
        ))
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn create(&self, input: &CreateSubscriptionInput) -> AppResult<SubscriptionProfile> {
        let row = sqlx::query(&format!(
            r#"
            WITH s AS (
                INSERT INTO subscriptions (
                    id, owner_id, plan_id, status,
                    current_period_start, current_period_end, trial_end
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
            )
            SELECT {} FROM s JOIN subscription_plans p ON p.id = s.plan_id
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(input.owner_id)
        .bind(input.plan_id)
        .bind(input.status)
        .bind(input.current_period_start)
        .bind(input.current_period_end)
        .bind(input.trial_end)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_profile(row))
    }

    async fn update_status(&self, id: Uuid, status: SubscriptionStatus) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE subscriptions SET status = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn supersede_others(&self, owner_id: Uuid, keep_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'cancelled', cancelled_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP
            WHERE owner_id = $1 AND id <> $2 AND status <> 'cancelled'
            "#,
        )
        .bind(owner_id)
        .bind(keep_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }
}
