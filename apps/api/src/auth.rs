//! JWT authentication module.
//!
//! Tokens are issued by the identity service; this server only verifies
//! them and turns the claims into a [`Principal`] for ledger attribution.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;

const ACCESS_TOKEN: &str = "access";

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Display name used for `addedBy`/`soldBy`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    /// Token type ("access")
    pub token_type: String,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    access_lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, access_lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            access_lifetime_secs,
        }
    }

    /// Generate an access token.
    pub fn generate_access_token(
        &self,
        user_id: &str,
        username: Option<&str>,
    ) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.map(str::to_string),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: ACCESS_TOKEN.to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            ApiError::unauthenticated("Invalid or expired token")
        })?;

        Ok(token_data.claims)
    }

    /// Validate that a token is an access token.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, ApiError> {
        let claims = self.validate_token(token)?;

        if claims.token_type != ACCESS_TOKEN {
            return Err(ApiError::unauthenticated("Expected access token"));
        }

        Ok(claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Principal
// =============================================================================

/// The authenticated caller.
///
/// Required by the mutating endpoints; read endpoints do not extract it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub username: Option<String>,
}

impl Principal {
    /// Name recorded on ledger rows: the username, else the subject.
    pub fn actor(&self) -> &str {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.user_id)
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Principal {
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

impl<S> FromRequestParts<S> for Principal
where
    Arc<JwtManager>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthenticated("Missing authorization header"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthenticated("Expected a bearer token"))?;

        let jwt = Arc::<JwtManager>::from_ref(state);
        let claims = jwt.validate_access_token(token)?;

        Ok(Principal::from(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);

        let token = manager
            .generate_access_token("user-001", Some("aziz"))
            .unwrap();

        let claims = manager.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, "user-001");
        assert_eq!(claims.username.as_deref(), Some("aziz"));
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtManager::new("one-secret".to_string(), 3600);
        let verifier = JwtManager::new("other-secret".to_string(), 3600);

        let token = issuer.generate_access_token("user-001", None).unwrap();
        let err = verifier.validate_access_token(&token).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s leeway
        let manager = JwtManager::new("test-secret".to_string(), -120);

        let token = manager.generate_access_token("user-001", None).unwrap();
        assert!(manager.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic dXNlcg=="), None);
    }

    #[test]
    fn test_principal_actor_falls_back_to_subject() {
        let named = Principal {
            user_id: "u1".to_string(),
            username: Some("aziz".to_string()),
        };
        assert_eq!(named.actor(), "aziz");

        let anonymous = Principal {
            user_id: "u1".to_string(),
            username: Some("  ".to_string()),
        };
        assert_eq!(anonymous.actor(), "u1");
    }
}
