use axum::{
    extract::{FromRequestParts, Query, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::{identity::Actor, jwt},
    domain::entities::{gated_resource::GatedResource, user_role::UserRole},
};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Caller identity from `Authorization: Bearer` or the `access_token` cookie.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Actor);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .or_else(|| {
                CookieJar::from_headers(&parts.headers)
                    .get(ACCESS_TOKEN_COOKIE)
                    .map(|c| c.value().to_owned())
            })
            .ok_or(AppError::InvalidCredentials)?;

        let claims = jwt::verify(&token, &state.config.jwt_secret)?;
        Ok(AuthUser(claims.into_actor()?))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Owner-only endpoints act on the caller's own billing.
pub fn require_owner(actor: &Actor) -> AppResult<Uuid> {
    match actor.role {
        UserRole::Owner => Ok(actor.user_id),
        UserRole::Admin | UserRole::Staff => Err(AppError::Forbidden),
    }
}

// ============================================================================
// Tier gate
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct RestaurantScope {
    pub restaurant_id: Option<Uuid>,
}

async fn enforce(
    app_state: &AppState,
    actor: &Actor,
    resource: GatedResource,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let scope = Query::<RestaurantScope>::try_from_uri(request.uri())
        .map(|Query(scope)| scope)
        .unwrap_or_default();

    app_state
        .tier_gate_use_cases
        .check(actor, resource, scope.restaurant_id)
        .await?;

    Ok(next.run(request).await)
}

/// Place on routes that create a restaurant.
pub async fn restaurant_limit(
    State(app_state): State<AppState>,
    AuthUser(actor): AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&app_state, &actor, GatedResource::Restaurant, request, next).await
}

/// Place on routes that create a category; expects `?restaurant_id=` unless
/// the caller is staff.
pub async fn category_limit(
    State(app_state): State<AppState>,
    AuthUser(actor): AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&app_state, &actor, GatedResource::Category, request, next).await
}

pub async fn menu_item_limit(
    State(app_state): State<AppState>,
    AuthUser(actor): AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&app_state, &actor, GatedResource::MenuItem, request, next).await
}

pub async fn staff_limit(
    State(app_state): State<AppState>,
    AuthUser(actor): AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&app_state, &actor, GatedResource::Staff, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, middleware::from_fn_with_state, routing::post};
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;

    use crate::test_utils::{TestAppStateBuilder, create_test_plan, create_test_subscription};

    fn gated_router(app_state: AppState) -> Router<()> {
        let created = || async { StatusCode::CREATED };
        Router::new()
            .merge(
                Router::new()
                    .route("/menu-items", post(created))
                    .route_layer(from_fn_with_state(app_state.clone(), menu_item_limit)),
            )
            .merge(
                Router::new()
                    .route("/categories", post(created))
                    .route_layer(from_fn_with_state(app_state.clone(), category_limit)),
            )
            .merge(
                Router::new()
                    .route("/restaurants", post(created))
                    .route_layer(from_fn_with_state(app_state.clone(), restaurant_limit)),
            )
            .merge(
                Router::new()
                    .route("/staff", post(created))
                    .route_layer(from_fn_with_state(app_state.clone(), staff_limit)),
            )
            .with_state(app_state)
    }

    #[tokio::test]
    async fn gate_blocks_creation_at_limit() {
        let builder = TestAppStateBuilder::new();
        let plan = builder
            .store()
            .insert_plan(create_test_plan(|p| p.features = serde_json::json!({"max_menu_items": 1})));
        let owner_id = Uuid::new_v4();
        builder
            .store()
            .insert_subscription(create_test_subscription(owner_id, &plan, |_| {}));
        let restaurant_id = builder.usage().add_restaurant(owner_id);
        let token = builder.token_for(&Actor::owner(owner_id));

        let usage = builder.usage();
        let server = TestServer::new(gated_router(builder.build())).unwrap();

        let path = format!("/menu-items?restaurant_id={restaurant_id}");
        server
            .post(&path)
            .add_header("Authorization", format!("Bearer {}", token))
            .await
            .assert_status(StatusCode::CREATED);

        usage.add_menu_item(restaurant_id);
        let response = server
            .post(&path)
            .add_header("Authorization", format!("Bearer {}", token))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "TIER_LIMIT_EXCEEDED");
        assert_eq!(
            body["message"],
            "Menu item limit reached (1/1). Upgrade your plan."
        );
    }

    #[tokio::test]
    async fn each_gate_counts_its_own_resource() {
        let builder = TestAppStateBuilder::new();
        let plan = builder.store().insert_plan(create_test_plan(|p| {
            p.features = serde_json::json!({
                "max_restaurants": 1,
                "max_categories": 2,
                "max_staff_accounts": 1
            })
        }));
        let owner_id = Uuid::new_v4();
        builder
            .store()
            .insert_subscription(create_test_subscription(owner_id, &plan, |_| {}));
        let restaurant_id = builder.usage().add_restaurant(owner_id);
        builder.usage().add_category(restaurant_id);
        let token = builder.token_for(&Actor::owner(owner_id));
        let server = TestServer::new(gated_router(builder.build())).unwrap();
        let auth = format!("Bearer {}", token);

        server
            .post("/restaurants")
            .add_header("Authorization", auth.clone())
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .post(&format!("/categories?restaurant_id={restaurant_id}"))
            .add_header("Authorization", auth.clone())
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post("/staff")
            .add_header("Authorization", auth)
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn gate_requires_identity() {
        let server = TestServer::new(gated_router(TestAppStateBuilder::new().build())).unwrap();
        server
            .post("/menu-items")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn access_cookie_is_accepted() {
        let builder = TestAppStateBuilder::new();
        let token = builder.token_for(&Actor::admin(Uuid::new_v4()));
        let server = TestServer::new(gated_router(builder.build())).unwrap();

        server
            .post("/menu-items")
            .add_cookie(Cookie::new(ACCESS_TOKEN_COOKIE, token))
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));
        headers.insert(AUTHORIZATION, "Basic xyz".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }
}
