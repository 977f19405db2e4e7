use thiserror::Error;

use crate::domain::entities::gated_resource::GatedResource;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Subscription is inactive or expired")]
    SubscriptionInactive,

    #[error("{} limit reached ({current}/{limit}). Upgrade your plan.", resource.label())]
    TierLimitExceeded {
        resource: GatedResource,
        current: i64,
        limit: i32,
    },

    #[error("Payment provider error: {0}")]
    Provider(String),

    #[error("Invalid webhook signature")]
    SignatureInvalid,

    #[error("Webhook already received")]
    DuplicateWebhook,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    DatabaseError,
    InvalidCredentials,
    InvalidInput,
    Forbidden,
    NotFound,
    SubscriptionInactive,
    TierLimitExceeded,
    ProviderError,
    SignatureInvalid,
    DuplicateWebhook,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::SubscriptionInactive => "SUBSCRIPTION_INACTIVE",
            ErrorCode::TierLimitExceeded => "TIER_LIMIT_EXCEEDED",
            ErrorCode::ProviderError => "PROVIDER_ERROR",
            ErrorCode::SignatureInvalid => "SIGNATURE_INVALID",
            ErrorCode::DuplicateWebhook => "DUPLICATE_WEBHOOK",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
            AppError::Forbidden => ErrorCode::Forbidden,
            AppError::NotFound => ErrorCode::NotFound,
            AppError::SubscriptionInactive => ErrorCode::SubscriptionInactive,
            AppError::TierLimitExceeded { .. } => ErrorCode::TierLimitExceeded,
            AppError::Provider(_) => ErrorCode::ProviderError,
            AppError::SignatureInvalid => ErrorCode::SignatureInvalid,
            AppError::DuplicateWebhook => ErrorCode::DuplicateWebhook,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
