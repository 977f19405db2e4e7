use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::{PostgresPersistence, is_unique_violation},
    app_error::{AppError, AppResult},
    application::use_cases::payment_webhook::{PaymentWebhookEventProfile, PaymentWebhookRepo},
};

fn row_to_profile(row: sqlx::postgres::PgRow) -> PaymentWebhookEventProfile {
    PaymentWebhookEventProfile {
        id: row.get("id"),
        provider_event_id: row.get("provider_event_id"),
        event_type: row.get("event_type"),
        payload: row.get("payload"),
        processed: row.get("processed"),
        processed_at: row.get("processed_at"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl PaymentWebhookRepo for PostgresPersistence {
    async fn record(
        &self,
        provider_event_id: &str,
        event_type: &str,
        payload: &JsonValue,
    ) -> AppResult<PaymentWebhookEventProfile> {
        let row = sqlx::query(
            r#"
            INSERT INTO payment_webhook_events (id, provider_event_id, event_type, payload)
            VALUES ($1, $2, $3, $4)
            RETURNING id, provider_event_id, event_type, payload, processed, processed_at, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(provider_event_id)
        .bind(event_type)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateWebhook
            } else {
                AppError::from(e)
            }
        })?;
        Ok(row_to_profile(row))
    }

    async fn mark_processed(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE payment_webhook_events SET processed = true, processed_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }
}
