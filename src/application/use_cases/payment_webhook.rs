use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::payment::PaymentUseCases,
    domain::entities::webhook_event::WebhookEventType,
    infra::webhook_signer::{sign_payload, verify_signature},
};

// ============================================================================
// Payload Types
// ============================================================================

/// Provider webhook body: `{event, data}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: WebhookData,
}

/// String fields read `null` as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookData {
    #[serde(deserialize_with = "null_as_empty")]
    pub tx_ref: String,
    /// Provider-assigned reference; the idempotency key.
    #[serde(deserialize_with = "null_as_empty")]
    pub reference: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub status: String,
    /// The provider sends this as a string or a number.
    pub amount: JsonValue,
    #[serde(deserialize_with = "null_as_empty")]
    pub currency: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub email: String,
    /// RFC 3339 string or unix seconds; kept as sent.
    pub created_at: JsonValue,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Ledger
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PaymentWebhookEventProfile {
    pub id: Uuid,
    pub provider_event_id: String,
    pub event_type: String,
    pub payload: JsonValue,
    pub processed: bool,
    pub processed_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}

#[async_trait]
pub trait PaymentWebhookRepo: Send + Sync {
    /// Fails with `AppError::DuplicateWebhook` when `provider_event_id` has
    /// already been recorded.
    async fn record(
        &self,
        provider_event_id: &str,
        event_type: &str,
        payload: &JsonValue,
    ) -> AppResult<PaymentWebhookEventProfile>;

    async fn mark_processed(&self, id: Uuid) -> AppResult<()>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone, Default)]
pub struct WebhookSettings {
    /// Unset means every delivery is rejected.
    pub secret: Option<SecretString>,
    pub test_endpoint_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum WebhookOutcome {
    Processed(WebhookEventType),
    /// Same provider event seen before; acknowledged without side effects.
    Duplicate,
    Ignored(String),
}

#[derive(Clone)]
pub struct PaymentWebhookUseCases {
    webhook_repo: Arc<dyn PaymentWebhookRepo>,
    payments: Arc<PaymentUseCases>,
    settings: WebhookSettings,
}

impl PaymentWebhookUseCases {
    pub fn new(
        webhook_repo: Arc<dyn PaymentWebhookRepo>,
        payments: Arc<PaymentUseCases>,
        settings: WebhookSettings,
    ) -> Self {
        Self {
            webhook_repo,
            payments,
            settings,
        }
    }

    pub fn test_endpoint_enabled(&self) -> bool {
        self.settings.test_endpoint_enabled
    }

    /// Verifies, records and dispatches one delivery.
    ///
    /// Only signature problems are meant to be surfaced to the provider; the
    /// HTTP layer acknowledges every other error.
    pub async fn process(&self, body: &[u8], signature: Option<&str>) -> AppResult<WebhookOutcome> {
        let secret = self.secret()?;
        let signature = signature.ok_or_else(|| {
            tracing::warn!("Webhook delivery without signature header");
            AppError::SignatureInvalid
        })?;
        verify_signature(secret.expose_secret(), body, signature).map_err(|e| {
            tracing::warn!("Webhook signature mismatch");
            e
        })?;

        let payload: JsonValue = serde_json::from_slice(body)
            .map_err(|e| AppError::InvalidInput(format!("Malformed webhook payload: {}", e)))?;
        let envelope: WebhookEnvelope = serde_json::from_value(payload.clone())
            .map_err(|e| AppError::InvalidInput(format!("Malformed webhook payload: {}", e)))?;

        let event_id = envelope.data.reference.trim();
        if event_id.is_empty() {
            tracing::warn!(event_type = %envelope.event, "Webhook without provider reference");
            return Ok(WebhookOutcome::Ignored("missing reference".into()));
        }

        let record = match self
            .webhook_repo
            .record(event_id, &envelope.event, &payload)
            .await
        {
            Ok(record) => record,
            Err(AppError::DuplicateWebhook) => {
                tracing::info!(provider_event_id = event_id, "Duplicate webhook delivery");
                return Ok(WebhookOutcome::Duplicate);
            }
            Err(e) => return Err(e),
        };
        if record.processed {
            return Ok(WebhookOutcome::Duplicate);
        }

        let outcome = self.dispatch(&envelope).await.map_err(|e| {
            tracing::error!(
                provider_event_id = event_id,
                event_type = %envelope.event,
                tx_ref = %envelope.data.tx_ref,
                error = %e,
                "Webhook dispatch failed"
            );
            e
        })?;

        if let Err(e) = self.webhook_repo.mark_processed(record.id).await {
            tracing::warn!(webhook_event_id = %record.id, error = %e, "Failed to mark webhook processed");
        }
        Ok(outcome)
    }

    async fn dispatch(&self, envelope: &WebhookEnvelope) -> AppResult<WebhookOutcome> {
        let Some(event_type) = WebhookEventType::parse(&envelope.event) else {
            tracing::info!(event_type = %envelope.event, "Ignoring unhandled webhook event");
            return Ok(WebhookOutcome::Ignored(format!(
                "unhandled event {}",
                envelope.event
            )));
        };

        let data = &envelope.data;
        if data.tx_ref.is_empty() {
            tracing::warn!(event_type = %event_type, "Webhook without tx_ref");
            return Ok(WebhookOutcome::Ignored("missing tx_ref".into()));
        }

        match event_type {
            WebhookEventType::PaymentSuccess => {
                self.payments
                    .complete_payment(&data.tx_ref, &data.reference)
                    .await?;
            }
            WebhookEventType::PaymentFailed => {
                self.payments
                    .fail_payment(&data.tx_ref, Some(&data.reference))
                    .await?;
            }
            WebhookEventType::PaymentPending => {
                self.payments.notify_pending(&data.tx_ref).await?;
            }
        }

        tracing::info!(event_type = %event_type, tx_ref = %data.tx_ref, "Webhook processed");
        Ok(WebhookOutcome::Processed(event_type))
    }

    /// Runs a self-signed provider payload through [`Self::process`].
    /// `kind` is the event suffix: `success`, `failed` or `pending`.
    pub async fn simulate(&self, kind: &str, tx_ref: &str) -> AppResult<WebhookOutcome> {
        if !self.settings.test_endpoint_enabled {
            return Err(AppError::NotFound);
        }
        let event_type = WebhookEventType::parse(&format!("payment.{}", kind))
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown event type: {}", kind)))?;
        if tx_ref.trim().is_empty() {
            return Err(AppError::InvalidInput("tx_ref is required".into()));
        }

        let reference = format!("ref_{}", Uuid::new_v4().simple());
        let envelope = simulated_envelope(event_type, tx_ref, &reference);
        let body = serde_json::to_vec(&envelope)
            .map_err(|e| AppError::Internal(format!("Failed to encode payload: {}", e)))?;
        let signature = sign_payload(self.secret()?.expose_secret(), &body);

        tracing::info!(event_type = %event_type, tx_ref, "Simulating webhook delivery");
        self.process(&body, Some(&signature)).await
    }

    fn secret(&self) -> AppResult<&SecretString> {
        self.settings.secret.as_ref().ok_or_else(|| {
            tracing::error!("CHAPA_WEBHOOK_SECRET is not set, rejecting webhook");
            AppError::SignatureInvalid
        })
    }
}

/// Payload shaped like a real provider delivery for `tx_ref`.
pub fn simulated_envelope(event_type: WebhookEventType, tx_ref: &str, reference: &str) -> WebhookEnvelope {
    WebhookEnvelope {
        event: event_type.as_str().to_string(),
        data: WebhookData {
            tx_ref: tx_ref.to_string(),
            reference: reference.to_string(),
            status: event_type.data_status().to_string(),
            amount: JsonValue::String("19.99".into()),
            currency: "ETB".into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            email: "test@example.com".into(),
            created_at: JsonValue::String(Utc::now().to_rfc3339()),
        },
    }
}
