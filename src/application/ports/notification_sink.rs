use async_trait::async_trait;

use crate::app_error::AppResult;

/// Owner-facing payment notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentNotification {
    Succeeded {
        to: String,
        name: String,
        invoice_number: String,
        amount_cents: i64,
        currency: String,
    },
    Failed {
        to: String,
        name: String,
        update_payment_url: String,
    },
    Pending {
        to: String,
        name: String,
    },
}

impl PaymentNotification {
    pub fn recipient(&self) -> &str {
        match self {
            PaymentNotification::Succeeded { to, .. }
            | PaymentNotification::Failed { to, .. }
            | PaymentNotification::Pending { to, .. } => to,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PaymentNotification::Succeeded { .. } => "payment_succeeded",
            PaymentNotification::Failed { .. } => "payment_failed",
            PaymentNotification::Pending { .. } => "payment_pending",
        }
    }
}

/// Queue for outbound notifications.
///
/// `enqueue` must return quickly; delivery happens elsewhere and its failure
/// never reaches the caller.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn enqueue(&self, notification: PaymentNotification) -> AppResult<()>;
}
