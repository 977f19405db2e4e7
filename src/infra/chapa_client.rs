use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_provider::{
        CheckoutRequest, CheckoutSession, PaymentProviderPort, PaymentVerification, TxRef,
        format_amount,
    },
    infra::http_client::{PAYMENT_PROVIDER_TIMEOUT, build_client_with_timeout},
};

#[derive(Clone)]
pub struct ChapaClient {
    client: Client,
    secret_key: SecretString,
    base_url: String,
}

impl ChapaClient {
    pub fn new(secret_key: SecretString, base_url: &Url) -> Self {
        Self {
            client: build_client_with_timeout(PAYMENT_PROVIDER_TIMEOUT),
            secret_key,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key.expose_secret())
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    pub async fn initialize(&self, body: &ChapaInitializeRequest<'_>) -> AppResult<ChapaInitializeResponse> {
        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .header("Authorization", self.auth_header())
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Chapa request failed: {}", e)))?;

        self.handle_response(response).await
    }

    pub async fn verify(&self, tx_ref: &str) -> AppResult<ChapaVerifyResponse> {
        let response = self
            .client
            .get(format!("{}/transaction/verify/{}", self.base_url, tx_ref))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Chapa request failed: {}", e)))?;

        self.handle_response(response).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Chapa API error");

            if let Ok(error) = serde_json::from_str::<ChapaErrorResponse>(&body) {
                return Err(AppError::Provider(format!(
                    "Chapa error: {}",
                    error.message_text()
                )));
            }

            return Err(AppError::Provider(format!(
                "Chapa API error: {} - {}",
                status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse Chapa response");
            AppError::Provider(format!("Failed to parse Chapa response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentProviderPort for ChapaClient {
    fn provider_name(&self) -> &'static str {
        "chapa"
    }

    async fn initialize_checkout(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession> {
        let amount = format_amount(request.amount_cents);
        let body = ChapaInitializeRequest {
            amount: &amount,
            currency: &request.currency,
            email: &request.email,
            first_name: &request.first_name,
            tx_ref: request.tx_ref.as_str(),
            callback_url: &request.callback_url,
            return_url: &request.return_url,
            customization: ChapaCustomization {
                title: &request.title,
                description: &request.description,
            },
        };

        let response = self.initialize(&body).await?;
        if response.status != "success" {
            return Err(AppError::Provider(format!(
                "Chapa initialize returned status {}",
                response.status
            )));
        }

        let checkout_url = response
            .data
            .and_then(|d| d.checkout_url)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::Provider("Chapa response has no checkout_url".into()))?;

        Ok(CheckoutSession { checkout_url })
    }

    async fn verify_transaction(&self, tx_ref: &TxRef) -> AppResult<PaymentVerification> {
        let response = self.verify(tx_ref.as_str()).await?;
        Ok(response.into_verification())
    }
}

// ============================================================================
// Chapa Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ChapaInitializeRequest<'a> {
    pub amount: &'a str,
    pub currency: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub tx_ref: &'a str,
    pub callback_url: &'a str,
    pub return_url: &'a str,
    pub customization: ChapaCustomization<'a>,
}

#[derive(Debug, Serialize)]
pub struct ChapaCustomization<'a> {
    pub title: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChapaInitializeResponse {
    pub status: String,
    pub data: Option<ChapaCheckoutData>,
}

#[derive(Debug, Deserialize)]
pub struct ChapaCheckoutData {
    pub checkout_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChapaVerifyResponse {
    pub status: String,
    pub data: Option<ChapaVerifyData>,
}

#[derive(Debug, Deserialize)]
pub struct ChapaVerifyData {
    pub status: Option<String>,
    pub reference: Option<String>,
}

impl ChapaVerifyResponse {
    /// Verified only when the call and the payment both report success.
    pub fn into_verification(self) -> PaymentVerification {
        let (status, reference) = match self.data {
            Some(data) => (data.status, data.reference),
            None => (None, None),
        };
        PaymentVerification {
            verified: self.status == "success" && status.as_deref() == Some("success"),
            provider_reference: reference.filter(|r| !r.is_empty()),
            status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChapaErrorResponse {
    message: serde_json::Value,
}

impl ChapaErrorResponse {
    fn message_text(&self) -> String {
        match &self.message {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
