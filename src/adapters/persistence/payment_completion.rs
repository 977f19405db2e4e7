use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::payment::{
        CompletePaymentInput, CompletedPayment, PaymentCompletionRepo,
    },
};

#[async_trait]
impl PaymentCompletionRepo for PostgresPersistence {
    /// Transaction, invoice and subscription move together or not at all.
    /// Returning early drops `tx`, which rolls back.
    async fn complete_payment(
        &self,
        input: &CompletePaymentInput,
    ) -> AppResult<Option<CompletedPayment>> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        // Check-and-set in one statement: of two racing callers only one
        // sees a row come back.
        let claimed = sqlx::query(
            r#"
            UPDATE payment_transactions
            SET status = 'completed', provider_transaction_ref = $2, updated_at = CURRENT_TIMESTAMP
            WHERE tx_ref = $1 AND status <> 'completed'
            RETURNING id
            "#,
        )
        .bind(&input.tx_ref)
        .bind(&input.provider_reference)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::from)?;

        if claimed.is_none() {
            let exists: Option<i32> =
                sqlx::query_scalar("SELECT 1 FROM payment_transactions WHERE tx_ref = $1")
                    .bind(&input.tx_ref)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(AppError::from)?;
            return match exists {
                Some(_) => Ok(None),
                None => Err(AppError::NotFound),
            };
        }

        let invoice = sqlx::query(
            r#"
            UPDATE invoices
            SET status = 'paid', paid_at = CURRENT_TIMESTAMP
            WHERE invoice_number = $1
            RETURNING invoice_number, subscription_id, owner_id, amount_cents, currency
            "#,
        )
        .bind(&input.tx_ref)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| {
            tracing::error!(tx_ref = %input.tx_ref, "Completed transaction has no invoice");
            AppError::NotFound
        })?;

        let completed = CompletedPayment {
            owner_id: invoice.get("owner_id"),
            subscription_id: invoice.get("subscription_id"),
            invoice_number: invoice.get("invoice_number"),
            amount_cents: invoice.get("amount_cents"),
            currency: invoice.get("currency"),
        };

        let updated = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'active',
                current_period_start = $2,
                current_period_end = $3,
                plan_id = COALESCE($4, plan_id),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            "#,
        )
        .bind(completed.subscription_id)
        .bind(input.period_start)
        .bind(input.period_end)
        .bind(input.plan_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from)?;

        if updated.rows_affected() == 0 {
            tracing::error!(
                tx_ref = %input.tx_ref,
                subscription_id = %completed.subscription_id,
                "Invoice references a missing subscription"
            );
            return Err(AppError::NotFound);
        }

        tx.commit().await.map_err(AppError::from)?;
        Ok(Some(completed))
    }
}
