use crate::errors::ServiceError;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Roles understood by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Operator,
    Customer,
}

impl Role {
    /// Admins and operators may act on resources they do not own
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin | Role::Operator)
    }
}

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub role: Role,
    pub iat: i64, // Issued at time
    pub exp: i64, // Expiration time
}

/// Authentication service that handles token issuance and validation
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: usize,
}

impl AuthService {
    pub fn new(jwt_secret: &str, expiration_secs: usize) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            expiration_secs,
        }
    }

    /// Issues a signed token for a user
    pub fn issue_token(&self, user_id: Uuid, role: Role) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now,
            exp: now + self.expiration_secs as i64,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::InternalError(format!("Failed to sign token: {}", e)))
    }

    /// Validates a token and extracts its claims
    pub fn verify(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ServiceError::Unauthorized("Token has expired".to_string())
                }
                _ => ServiceError::Unauthorized("Invalid authentication token".to_string()),
            })
    }
}

/// Authenticated caller extracted from the Authorization header
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}

/// Optional variant of [`AuthUser`] for endpoints that serve both
/// authenticated customers and guests.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| raw.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(parts: &Parts) -> Result<AuthUser, ServiceError> {
    let auth_service = parts
        .extensions
        .get::<Arc<AuthService>>()
        .ok_or_else(|| {
            ServiceError::InternalError("Authentication service not configured".to_string())
        })?
        .clone();

    let token = bearer_token(parts).ok_or_else(|| {
        ServiceError::Unauthorized("Missing or malformed Authorization header".to_string())
    })?;

    let claims = auth_service.verify(token)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ServiceError::Unauthorized("Invalid token subject".to_string()))?;

    Ok(AuthUser {
        user_id,
        role: claims.role,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticate(parts)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if bearer_token(parts).is_none() {
            return Ok(MaybeAuthUser(None));
        }
        // A token was presented; a bad one is an error rather than a guest
        authenticate(parts).map(|user| MaybeAuthUser(Some(user)))
    }
}
