use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;

use crate::{
    adapters::http::{
        app_state::AppState,
        middleware::{AuthUser, require_owner},
    },
    app_error::AppResult,
    application::{
        identity::Actor,
        use_cases::payment::{InitiatePaymentInput, InitiatePaymentResult},
    },
    domain::entities::payment_type::PaymentType,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/initiate", post(initiate_payment))
        .route("/renew", post(renew_subscription))
        .route("/upgrade", post(upgrade_subscription))
}

#[derive(Deserialize)]
struct InitiatePaymentPayload {
    plan: String,
    #[serde(rename = "type", default)]
    payment_type: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct PlanPayload {
    plan: String,
}

async fn initiate_payment(
    State(app_state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<InitiatePaymentPayload>,
) -> AppResult<impl IntoResponse> {
    let owner_id = require_owner(&actor)?;

    // The type only labels the checkout; unknown values are not an error.
    let payment_type = match payload.payment_type.as_deref().map(str::trim) {
        None | Some("") => PaymentType::Registration,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(payment_type = raw, "Unknown payment type, using registration");
            PaymentType::Registration
        }),
    };

    let result = app_state
        .payment_use_cases
        .initiate_payment(InitiatePaymentInput {
            owner_id,
            plan_slug: payload.plan,
            payment_type,
            email: payload.email,
            name: payload.name,
        })
        .await?;

    Ok(Json(result))
}

async fn renew_subscription(
    State(app_state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<PlanPayload>,
) -> AppResult<impl IntoResponse> {
    start_typed_checkout(&app_state, &actor, payload.plan, PaymentType::Renewal).await
}

async fn upgrade_subscription(
    State(app_state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<PlanPayload>,
) -> AppResult<impl IntoResponse> {
    start_typed_checkout(&app_state, &actor, payload.plan, PaymentType::Upgrade).await
}

async fn start_typed_checkout(
    app_state: &AppState,
    actor: &Actor,
    plan_slug: String,
    payment_type: PaymentType,
) -> AppResult<Json<InitiatePaymentResult>> {
    let owner_id = require_owner(actor)?;
    let result = app_state
        .payment_use_cases
        .initiate_payment(InitiatePaymentInput {
            owner_id,
            plan_slug,
            payment_type,
            email: None,
            name: None,
        })
        .await?;
    Ok(Json(result))
}
