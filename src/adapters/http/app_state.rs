use std::sync::Arc;

use crate::{
    application::use_cases::{
        payment::PaymentUseCases, payment_webhook::PaymentWebhookUseCases,
        subscription::SubscriptionUseCases, tier_gate::TierGateUseCases,
    },
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub subscription_use_cases: Arc<SubscriptionUseCases>,
    pub tier_gate_use_cases: Arc<TierGateUseCases>,
    pub payment_use_cases: Arc<PaymentUseCases>,
    pub payment_webhook_use_cases: Arc<PaymentWebhookUseCases>,
}
