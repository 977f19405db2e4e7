//! Fakes for the outbound ports: payment provider and notification sink.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::{
        notification_sink::{NotificationSink, PaymentNotification},
        payment_provider::{
            CheckoutRequest, CheckoutSession, PaymentProviderPort, PaymentVerification, TxRef,
        },
    },
};

// ============================================================================
// FakePaymentProvider
// ============================================================================

#[derive(Default)]
struct ProviderState {
    checkouts: Vec<CheckoutRequest>,
    verifications: HashMap<String, PaymentVerification>,
    fail_checkout: bool,
    fail_verify: bool,
}

/// Records checkout requests and answers verifications from a script.
/// Unscripted references verify as pending.
#[derive(Default)]
pub struct FakePaymentProvider {
    state: Mutex<ProviderState>,
}

impl FakePaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_checkout(&self) {
        self.state.lock().unwrap().fail_checkout = true;
    }

    pub fn fail_verify(&self) {
        self.state.lock().unwrap().fail_verify = true;
    }

    pub fn verify_as(&self, tx_ref: &str, verified: bool, provider_reference: Option<&str>) {
        let verification = PaymentVerification {
            verified,
            provider_reference: provider_reference.map(str::to_string),
            status: Some(if verified { "success" } else { "failed" }.to_string()),
        };
        self.state
            .lock()
            .unwrap()
            .verifications
            .insert(tx_ref.to_string(), verification);
    }

    pub fn last_checkout(&self) -> Option<CheckoutRequest> {
        self.state.lock().unwrap().checkouts.last().cloned()
    }
}

#[async_trait]
impl PaymentProviderPort for FakePaymentProvider {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    async fn initialize_checkout(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession> {
        let mut state = self.state.lock().unwrap();
        state.checkouts.push(request.clone());
        if state.fail_checkout {
            return Err(AppError::Provider("checkout unavailable".into()));
        }
        Ok(CheckoutSession {
            checkout_url: format!("https://checkout.chapa.test/pay/{}", request.tx_ref),
        })
    }

    async fn verify_transaction(&self, tx_ref: &TxRef) -> AppResult<PaymentVerification> {
        let state = self.state.lock().unwrap();
        if state.fail_verify {
            return Err(AppError::Provider("verify unavailable".into()));
        }
        Ok(state
            .verifications
            .get(tx_ref.as_str())
            .cloned()
            .unwrap_or(PaymentVerification {
                verified: false,
                provider_reference: None,
                status: Some("pending".into()),
            }))
    }
}

// ============================================================================
// RecordingNotificationSink
// ============================================================================

#[derive(Default)]
pub struct RecordingNotificationSink {
    sent: Mutex<Vec<PaymentNotification>>,
    fail: Mutex<bool>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_enqueue(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn sent(&self) -> Vec<PaymentNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn enqueue(&self, notification: PaymentNotification) -> AppResult<()> {
        if *self.fail.lock().unwrap() {
            return Err(AppError::Internal("notification queue unavailable".into()));
        }
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}
