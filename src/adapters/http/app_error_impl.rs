use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        match &self {
            AppError::TierLimitExceeded { .. }
            | AppError::SubscriptionInactive
            | AppError::DuplicateWebhook
            | AppError::InvalidInput(_)
            | AppError::NotFound => tracing::warn!(error = %self, "Request rejected"),
            _ => tracing::error!(error = ?self, "Request failed"),
        }

        let code = self.code();
        let display = self.to_string();
        match self {
            AppError::Database(_) | AppError::Internal(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, code, None)
            }
            AppError::InvalidCredentials | AppError::SignatureInvalid => {
                error_resp(StatusCode::UNAUTHORIZED, code, None)
            }
            AppError::InvalidInput(msg) => error_resp(StatusCode::BAD_REQUEST, code, Some(msg)),
            AppError::Forbidden => error_resp(StatusCode::FORBIDDEN, code, None),
            AppError::NotFound => error_resp(StatusCode::NOT_FOUND, code, None),
            AppError::SubscriptionInactive => error_resp(
                StatusCode::PAYMENT_REQUIRED,
                code,
                Some("Subscription is inactive or expired".into()),
            ),
            AppError::TierLimitExceeded { .. } => {
                error_resp(StatusCode::FORBIDDEN, code, Some(display))
            }
            AppError::Provider(_) => error_resp(StatusCode::BAD_GATEWAY, code, None),
            AppError::DuplicateWebhook => error_resp(StatusCode::OK, code, None),
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::gated_resource::GatedResource;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        let cases = [
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::SubscriptionInactive, StatusCode::PAYMENT_REQUIRED),
            (
                AppError::TierLimitExceeded {
                    resource: GatedResource::Staff,
                    current: 2,
                    limit: 2,
                },
                StatusCode::FORBIDDEN,
            ),
            (AppError::Provider("down".into()), StatusCode::BAD_GATEWAY),
            (AppError::SignatureInvalid, StatusCode::UNAUTHORIZED),
            (AppError::DuplicateWebhook, StatusCode::OK),
            (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
