use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::identity::Actor,
    domain::entities::user_role::UserRole,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn into_actor(self) -> AppResult<Actor> {
        let user_id = parse_id(&self.sub)?;
        let owner_id = self.owner_id.as_deref().map(parse_id).transpose()?;
        let restaurant_id = self.restaurant_id.as_deref().map(parse_id).transpose()?;

        // Owners act for themselves even if the token omits owner_id.
        let owner_id = match self.role {
            UserRole::Owner => Some(user_id),
            _ => owner_id,
        };

        Ok(Actor {
            user_id,
            role: self.role,
            owner_id,
            restaurant_id,
        })
    }
}

fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidCredentials)
}

/// Tokens are minted by the account service; tests mint their own.
#[cfg(test)]
pub fn issue(actor: &Actor, secret: &SecretString, ttl: time::Duration) -> AppResult<String> {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    let claims = Claims {
        sub: actor.user_id.to_string(),
        role: actor.role,
        owner_id: actor.owner_id.map(|id| id.to_string()),
        restaurant_id: actor.restaurant_id.map(|id| id.to_string()),
        iat: now,
        exp: now + ttl.whole_seconds(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

pub fn verify(token: &str, secret: &SecretString) -> AppResult<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "Token validation failed");
        AppError::InvalidCredentials
    })
}
