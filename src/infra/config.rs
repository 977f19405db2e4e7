use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

use crate::application::use_cases::{payment::PaymentSettings, payment_webhook::WebhookSettings};

pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: SecretString,
    pub cors_origin: HeaderValue,
    /// Frontend origin; notification links point here.
    pub app_base_url: Url,
    pub chapa_secret_key: SecretString,
    /// Shared secret for `Chapa-Signature`. Unset rejects every webhook.
    pub chapa_webhook_secret: Option<SecretString>,
    pub chapa_base_url: Url,
    pub chapa_callback_url: String,
    pub chapa_return_url: String,
    pub resend_api_key: String,
    pub email_from: String,
    pub trial_days: i64,
    /// Exposes `POST /api/payment/chapa/test`. Never enable in production.
    pub enable_webhook_test_endpoint: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url: String = get_env("DATABASE_URL");
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:8080".parse().unwrap());

        let jwt_secret: SecretString = SecretString::new(get_env::<String>("JWT_SECRET").into());
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let app_base_url: Url = get_env("APP_BASE_URL");

        let chapa_secret_key: SecretString =
            SecretString::new(get_env::<String>("CHAPA_SECRET_KEY").into());
        let chapa_webhook_secret: Option<SecretString> = std::env::var("CHAPA_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| SecretString::new(s.into()));
        let chapa_base_url: Url = get_env_default(
            "CHAPA_BASE_URL",
            "https://api.chapa.co/v1".parse().unwrap(),
        );
        let chapa_callback_url: String = get_env("CHAPA_CALLBACK_URL");
        let chapa_return_url: String = get_env("CHAPA_RETURN_URL");

        let resend_api_key: String = get_env("RESEND_API_KEY");
        let email_from: String =
            get_env_default("EMAIL_FROM", "MenuVista <billing@menuvista.com>".to_string());

        let trial_days: i64 = get_env_default("TRIAL_DAYS", 14);
        let enable_webhook_test_endpoint: bool =
            get_env_default("ENABLE_WEBHOOK_TEST_ENDPOINT", false);

        Self {
            database_url,
            bind_addr,
            jwt_secret,
            cors_origin,
            app_base_url,
            chapa_secret_key,
            chapa_webhook_secret,
            chapa_base_url,
            chapa_callback_url,
            chapa_return_url,
            resend_api_key,
            email_from,
            trial_days,
            enable_webhook_test_endpoint,
        }
    }

    pub fn payment_settings(&self) -> PaymentSettings {
        PaymentSettings {
            callback_url: self.chapa_callback_url.clone(),
            return_url: self.chapa_return_url.clone(),
            app_base_url: self.app_base_url.to_string(),
        }
    }

    pub fn webhook_settings(&self) -> WebhookSettings {
        WebhookSettings {
            secret: self.chapa_webhook_secret.clone(),
            test_endpoint_enabled: self.enable_webhook_test_endpoint,
        }
    }
}
