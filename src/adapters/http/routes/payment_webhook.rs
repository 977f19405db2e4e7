use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::use_cases::payment_webhook::WebhookOutcome,
    infra::webhook_signer::SIGNATURE_HEADER,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhook", post(receive_webhook))
        .route("/test", post(simulate_webhook))
}

#[derive(Serialize)]
struct WebhookAck {
    received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<WebhookOutcome>,
}

/// Raw body is required: the signature covers the exact bytes sent.
///
/// Only signature failures are surfaced (401). Everything else is
/// acknowledged so the provider stops retrying a delivery we cannot use.
async fn receive_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    match app_state
        .payment_webhook_use_cases
        .process(&body, signature)
        .await
    {
        Ok(outcome) => Ok(Json(WebhookAck {
            received: true,
            result: Some(outcome),
        })),
        Err(AppError::SignatureInvalid) => Err(AppError::SignatureInvalid),
        Err(e) => {
            tracing::error!(error = %e, "Webhook processing failed, acknowledging");
            Ok(Json(WebhookAck {
                received: true,
                result: None,
            }))
        }
    }
}

#[derive(Deserialize)]
struct SimulateQuery {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    tx_ref: String,
}

async fn simulate_webhook(
    State(app_state): State<AppState>,
    Query(query): Query<SimulateQuery>,
) -> AppResult<impl IntoResponse> {
    let outcome = app_state
        .payment_webhook_use_cases
        .simulate(&query.kind, &query.tx_ref)
        .await?;

    Ok(Json(WebhookAck {
        received: true,
        result: Some(outcome),
    }))
}
