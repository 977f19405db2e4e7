use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::payment::{CreateInvoiceInput, InvoiceProfile, InvoiceRepo},
};

fn row_to_profile(row: sqlx::postgres::PgRow) -> InvoiceProfile {
    InvoiceProfile {
        id: row.get("id"),
        invoice_number: row.get("invoice_number"),
        subscription_id: row.get("subscription_id"),
        owner_id: row.get("owner_id"),
        amount_cents: row.get("amount_cents"),
        currency: row.get("currency"),
        status: row.get("status"),
        billing_period_start: row.get("billing_period_start"),
        billing_period_end: row.get("billing_period_end"),
        paid_at: row.get("paid_at"),
        created_at: row.get("created_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, invoice_number, subscription_id, owner_id, amount_cents, currency, status,
    billing_period_start, billing_period_end, paid_at, created_at
"#;

#[async_trait]
impl InvoiceRepo for PostgresPersistence {
    async fn create(&self, input: &CreateInvoiceInput) -> AppResult<InvoiceProfile> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO invoices (
                id, invoice_number, subscription_id, owner_id, amount_cents, currency,
                status, billing_period_start, billing_period_end
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, $8)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.invoice_number)
        .bind(input.subscription_id)
        .bind(input.owner_id)
        .bind(input.amount_cents)
        .bind(&input.currency)
        .bind(input.billing_period_start)
        .bind(input.billing_period_end)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_profile(row))
    }

    async fn mark_failed(&self, invoice_number: &str) -> AppResult<Option<InvoiceProfile>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE invoices SET status = 'failed'
            WHERE invoice_number = $1 AND status <> 'paid'
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(invoice_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }
}
