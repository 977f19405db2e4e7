use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        identity::Actor,
        jwt,
        use_cases::{
            payment::PaymentUseCases, payment_webhook::PaymentWebhookUseCases,
            subscription::SubscriptionUseCases, tier_gate::TierGateUseCases,
        },
    },
    infra::config::AppConfig,
    test_utils::{
        FakePaymentProvider, InMemoryBillingStore, InMemoryTenantUsage, RecordingNotificationSink,
    },
};

pub const TEST_JWT_SECRET: &str = "test_jwt_secret";
pub const TEST_WEBHOOK_SECRET: &str = "whsec_chapa_test";

// ============================================================================
// TestAppStateBuilder
// ============================================================================

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// Seed the shared store before `build()`; the handles stay valid afterwards
/// for assertions.
///
/// ```ignore
/// let builder = TestAppStateBuilder::new();
/// let plan = builder.store().insert_plan(create_test_plan(|_| {}));
/// let token = builder.token_for(&Actor::owner(owner_id));
/// let app_state = builder.build();
/// ```
pub struct TestAppStateBuilder {
    store: Arc<InMemoryBillingStore>,
    usage: Arc<InMemoryTenantUsage>,
    provider: Arc<FakePaymentProvider>,
    sink: Arc<RecordingNotificationSink>,
    webhook_secret: Option<String>,
    test_endpoint_enabled: bool,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryBillingStore::new()),
            usage: Arc::new(InMemoryTenantUsage::new()),
            provider: Arc::new(FakePaymentProvider::new()),
            sink: Arc::new(RecordingNotificationSink::new()),
            webhook_secret: Some(TEST_WEBHOOK_SECRET.to_string()),
            test_endpoint_enabled: false,
        }
    }

    pub fn store(&self) -> Arc<InMemoryBillingStore> {
        self.store.clone()
    }

    pub fn usage(&self) -> Arc<InMemoryTenantUsage> {
        self.usage.clone()
    }

    pub fn provider(&self) -> Arc<FakePaymentProvider> {
        self.provider.clone()
    }

    pub fn sink(&self) -> Arc<RecordingNotificationSink> {
        self.sink.clone()
    }

    /// Remove the webhook secret (all deliveries are then rejected).
    pub fn without_webhook_secret(mut self) -> Self {
        self.webhook_secret = None;
        self
    }

    pub fn with_test_endpoint(mut self) -> Self {
        self.test_endpoint_enabled = true;
        self
    }

    /// Sign an access token the built state will accept.
    pub fn token_for(&self, actor: &Actor) -> String {
        jwt::issue(
            actor,
            &SecretString::from(TEST_JWT_SECRET),
            Duration::hours(1),
        )
        .unwrap()
    }

    /// Build the AppState with all configured mocks.
    pub fn build(self) -> AppState {
        let config = AppConfig {
            database_url: String::new(),
            bind_addr: "127.0.0.1:8080".parse::<SocketAddr>().unwrap(),
            jwt_secret: SecretString::from(TEST_JWT_SECRET),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            app_base_url: Url::parse("http://localhost:3000").unwrap(),
            chapa_secret_key: SecretString::from("CHASECK_TEST-key"),
            chapa_webhook_secret: self.webhook_secret.map(SecretString::from),
            chapa_base_url: Url::parse("https://api.chapa.test/v1").unwrap(),
            chapa_callback_url: "http://localhost:8080/api/payment/chapa/webhook".to_string(),
            chapa_return_url: "http://localhost:8080/payment/success".to_string(),
            resend_api_key: String::new(),
            email_from: "billing@menuvista.test".to_string(),
            trial_days: 14,
            enable_webhook_test_endpoint: self.test_endpoint_enabled,
        };

        let subscription_use_cases = Arc::new(SubscriptionUseCases::new(
            self.store.clone(),
            self.store.clone(),
            config.trial_days,
        ));

        let tier_gate_use_cases = Arc::new(TierGateUseCases::new(
            subscription_use_cases.clone(),
            self.usage,
        ));

        let payment_use_cases = Arc::new(PaymentUseCases::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.provider,
            self.sink,
            config.payment_settings(),
        ));

        let payment_webhook_use_cases = Arc::new(PaymentWebhookUseCases::new(
            self.store,
            payment_use_cases.clone(),
            config.webhook_settings(),
        ));

        AppState {
            config: Arc::new(config),
            subscription_use_cases,
            tier_gate_use_cases,
            payment_use_cases,
            payment_webhook_use_cases,
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
