use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::payment::{
        CreateTransactionInput, PaymentTransactionProfile, PaymentTransactionRepo,
    },
};

fn row_to_profile(row: sqlx::postgres::PgRow) -> PaymentTransactionProfile {
    PaymentTransactionProfile {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        amount_cents: row.get("amount_cents"),
        currency: row.get("currency"),
        status: row.get("status"),
        tx_ref: row.get("tx_ref"),
        reference: row.get("reference"),
        provider_transaction_ref: row.get("provider_transaction_ref"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, owner_id, amount_cents, currency, status, tx_ref, reference,
    provider_transaction_ref, created_at, updated_at
"#;

#[async_trait]
impl PaymentTransactionRepo for PostgresPersistence {
    async fn create(&self, input: &CreateTransactionInput) -> AppResult<PaymentTransactionProfile> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO payment_transactions (id, owner_id, amount_cents, currency, status, tx_ref, reference)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(input.owner_id)
        .bind(input.amount_cents)
        .bind(&input.currency)
        .bind(&input.tx_ref)
        .bind(&input.reference)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_profile(row))
    }

    async fn get_by_tx_ref(&self, tx_ref: &str) -> AppResult<Option<PaymentTransactionProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM payment_transactions WHERE tx_ref = $1",
            SELECT_COLS
        ))
        .bind(tx_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn mark_failed(
        &self,
        tx_ref: &str,
        provider_reference: Option<&str>,
    ) -> AppResult<Option<PaymentTransactionProfile>> {
        // Conditional update: a completed payment is never downgraded.
        let row = sqlx::query(&format!(
            r#"
            UPDATE payment_transactions
            SET status = 'failed',
                provider_transaction_ref = COALESCE($2, provider_transaction_ref),
                updated_at = CURRENT_TIMESTAMP
            WHERE tx_ref = $1 AND status <> 'completed'
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(tx_ref)
        .bind(provider_reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }
}
