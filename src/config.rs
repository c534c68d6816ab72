use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

use crate::limiter::{DEFAULT_MAX_SUBMISSIONS, DEFAULT_WINDOW_HOURS};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub limits: LimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    /// Header set by the reverse proxy in front of the server (for example
    /// `cf-connecting-ip`). Unset means proxy headers are ignored and the TCP
    /// peer is the client address.
    pub trusted_proxy_header: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// S3-compatible bucket holding review images. Uploads are disabled when
/// `bucket` is empty.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub public_base_url: Option<String>,
}

#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub initial_admin_password: String,
}

// Secrets stay out of the startup log line
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"***")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("initial_admin_password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitConfig {
    pub max_submissions: i32,
    pub window_hours: i64,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_submissions: DEFAULT_MAX_SUBMISSIONS,
            window_hours: DEFAULT_WINDOW_HOURS,
        }
    }
}

impl StorageConfig {
    pub fn is_enabled(&self) -> bool {
        !self.bucket.trim().is_empty()
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .context("PORT must be a port number")?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                trusted_proxy_header: non_empty("TRUSTED_PROXY_HEADER")
                    .map(|h| h.trim().to_ascii_lowercase()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
                max_connections: env::var("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
                min_connections: env::var("DB_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()?,
                acquire_timeout_secs: env::var("DB_ACQUIRE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()?,
            },
            storage: StorageConfig {
                bucket: env::var("S3_BUCKET").unwrap_or_default(),
                region: env::var("S3_REGION").unwrap_or_else(|_| "auto".to_string()),
                endpoint: non_empty("S3_ENDPOINT"),
                access_key_id: non_empty("AWS_ACCESS_KEY_ID"),
                secret_access_key: non_empty("AWS_SECRET_ACCESS_KEY"),
                public_base_url: non_empty("S3_PUBLIC_URL")
                    .map(|url| url.trim_end_matches('/').to_string()),
            },
            auth: AuthConfig {
                jwt_secret: env::var("ADMIN_JWT_SECRET").context("ADMIN_JWT_SECRET must be set")?,
                token_ttl_secs: env::var("ADMIN_TOKEN_TTL_SECS")
                    .unwrap_or_else(|_| "43200".to_string())
                    .parse()?,
                initial_admin_password: env::var("ADMIN_INITIAL_PASSWORD")
                    .unwrap_or_else(|_| "admin123".to_string()),
            },
            limits: LimitConfig {
                max_submissions: env::var("INQUIRY_LIMIT_MAX")
                    .unwrap_or_else(|_| DEFAULT_MAX_SUBMISSIONS.to_string())
                    .parse()?,
                window_hours: env::var("INQUIRY_LIMIT_WINDOW_HOURS")
                    .unwrap_or_else(|_| DEFAULT_WINDOW_HOURS.to_string())
                    .parse()?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_debug_masks_secrets() {
        let auth = AuthConfig {
            jwt_secret: "super-secret".to_string(),
            token_ttl_secs: 60,
            initial_admin_password: "admin123".to_string(),
        };
        let printed = format!("{:?}", auth);
        assert!(!printed.contains("super-secret"));
        assert!(!printed.contains("admin123"));
    }

    #[test]
    fn test_storage_enabled_requires_bucket() {
        let mut storage = StorageConfig {
            bucket: "  ".to_string(),
            region: "auto".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            public_base_url: None,
        };
        assert!(!storage.is_enabled());
        storage.bucket = "reviews".to_string();
        assert!(storage.is_enabled());
    }
}
