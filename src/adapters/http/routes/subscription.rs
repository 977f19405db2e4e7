use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    adapters::http::{
        app_state::AppState,
        middleware::{AuthUser, RestaurantScope, require_owner},
    },
    app_error::{AppError, AppResult},
    domain::entities::gated_resource::GatedResource,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/me", get(get_my_subscription))
        .route("/trial", post(start_trial))
        .route("/limits/{resource}", get(check_limit))
}

async fn list_plans(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let plans = app_state.subscription_use_cases.list_plans().await?;
    Ok(Json(plans))
}

/// Staff see their owner's subscription; admins have none.
async fn get_my_subscription(
    State(app_state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> AppResult<impl IntoResponse> {
    let owner_id = actor.tenant_owner_id()?;
    let details = app_state
        .subscription_use_cases
        .get_subscription_details(owner_id)
        .await?;
    Ok(Json(details))
}

/// Called once the owner account is activated. Repeat calls return the
/// subscription already in place.
async fn start_trial(
    State(app_state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> AppResult<impl IntoResponse> {
    let owner_id = require_owner(&actor)?;
    app_state.subscription_use_cases.start_trial(owner_id).await?;
    let details = app_state
        .subscription_use_cases
        .get_subscription_details(owner_id)
        .await?;
    Ok(Json(details))
}

/// Preflight for the tier gate: the same decision the create routes enforce.
async fn check_limit(
    State(app_state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(resource): Path<String>,
    Query(scope): Query<RestaurantScope>,
) -> AppResult<impl IntoResponse> {
    let resource: GatedResource = resource
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Unknown resource: {}", resource)))?;

    let decision = app_state
        .tier_gate_use_cases
        .check(&actor, resource, scope.restaurant_id)
        .await?;
    Ok(Json(decision))
}
