// Admin authentication: session tokens and the guard for admin routes

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AuthConfig;
use crate::models::AppState;
use crate::types::{AppError, AppResult};

const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(config: &AuthConfig) -> AppResult<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: ADMIN_SUBJECT.to_string(),
        iat: now,
        exp: now + config.token_ttl_secs,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign token: {}", e)))
}

pub fn verify_jwt(token: &str, config: &AuthConfig) -> AppResult<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        debug!(error = %e, "Rejected admin token");
        AppError::Auth("Invalid or expired session".to_string())
    })?;

    if data.claims.sub != ADMIN_SUBJECT {
        return Err(AppError::Auth("Invalid or expired session".to_string()));
    }

    Ok(data.claims)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verify the bearer token on a request.
pub fn authorize(headers: &HeaderMap, config: &AuthConfig) -> AppResult<Claims> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::Auth("Login required".to_string()))?;
    verify_jwt(token, config)
}

/// Extractor guarding admin handlers. Rejects with 401 before the body is
/// read.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Claims);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authorize(&parts.headers, &state.config.auth).map(AdminSession)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config(ttl: i64) -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_secs: ttl,
            initial_admin_password: "admin123".to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let config = config(3600);
        let token = issue_token(&config).unwrap();
        let claims = verify_jwt(&token, &config).unwrap();
        assert_eq!(claims.sub, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_token(&config(3600)).unwrap();
        let mut other = config(3600);
        other.jwt_secret = "another-secret".to_string();
        assert!(matches!(verify_jwt(&token, &other), Err(AppError::Auth(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Past the default 60s leeway
        let config = config(-120);
        let token = issue_token(&config).unwrap();
        assert!(verify_jwt(&token, &config).is_err());
    }

    #[test]
    fn test_authorize_requires_bearer() {
        let config = config(3600);
        assert!(authorize(&HeaderMap::new(), &config).is_err());

        let mut headers = HeaderMap::new();
        let token = issue_token(&config).unwrap();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        assert!(authorize(&headers, &config).is_ok());
    }
}
