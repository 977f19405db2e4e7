use crate::{
    adapters::http::app_state::AppState,
    infra::{
        chapa_client::ChapaClient,
        config::AppConfig,
        email_notifier::{EmailNotificationSink, ResendEmailSender},
        postgres_persistence,
    },
    use_cases::{
        payment::PaymentUseCases, payment_webhook::PaymentWebhookUseCases,
        subscription::SubscriptionUseCases, tier_gate::TierGateUseCases,
    },
};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);

    let provider = Arc::new(ChapaClient::new(
        config.chapa_secret_key.clone(),
        &config.chapa_base_url,
    ));

    let email = ResendEmailSender::new(config.resend_api_key.clone(), config.email_from.clone());
    let notifier = Arc::new(EmailNotificationSink::new(
        email,
        config.app_base_url.to_string(),
    ));

    let subscription_use_cases = Arc::new(SubscriptionUseCases::new(
        postgres_arc.clone(),
        postgres_arc.clone(),
        config.trial_days,
    ));

    let tier_gate_use_cases = Arc::new(TierGateUseCases::new(
        subscription_use_cases.clone(),
        postgres_arc.clone(),
    ));

    let payment_use_cases = Arc::new(PaymentUseCases::new(
        postgres_arc.clone(),
        postgres_arc.clone(),
        postgres_arc.clone(),
        postgres_arc.clone(),
        postgres_arc.clone(),
        postgres_arc.clone(),
        postgres_arc.clone(),
        provider,
        notifier,
        config.payment_settings(),
    ));

    let payment_webhook_use_cases = Arc::new(PaymentWebhookUseCases::new(
        postgres_arc,
        payment_use_cases.clone(),
        config.webhook_settings(),
    ));

    Ok(AppState {
        config: Arc::new(config),
        subscription_use_cases,
        tier_gate_use_cases,
        payment_use_cases,
        payment_webhook_use_cases,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "menuvista_billing=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer().with_target(false).with_level(true).pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
