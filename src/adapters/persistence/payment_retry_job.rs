use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::payment::{PaymentRetryJobProfile, PaymentRetryJobRepo},
};

#[async_trait]
impl PaymentRetryJobRepo for PostgresPersistence {
    async fn schedule(
        &self,
        subscription_id: Uuid,
        scheduled_for: NaiveDateTime,
    ) -> AppResult<PaymentRetryJobProfile> {
        let row = sqlx::query(
            r#"
            INSERT INTO payment_retry_jobs (id, subscription_id, scheduled_for)
            VALUES ($1, $2, $3)
            RETURNING id, subscription_id, scheduled_for, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(subscription_id)
        .bind(scheduled_for)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(PaymentRetryJobProfile {
            id: row.get("id"),
            subscription_id: row.get("subscription_id"),
            scheduled_for: row.get("scheduled_for"),
            created_at: row.get("created_at"),
        })
    }
}
