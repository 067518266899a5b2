//! Server-level settings read once from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::CmsError;

pub const DEFAULT_JWT_SECRET: &str = "default-jwt-secret-change-in-production";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Prefix for resolved media URLs; empty keeps them site-relative.
    pub media_base_url: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            environment: "development".to_string(),
            media_base_url: String::new(),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            media_base_url: std::env::var("MEDIA_BASE_URL").unwrap_or(defaults.media_base_url),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, CmsError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| CmsError::InvalidInput(format!("invalid HOST/PORT configuration: {}", e)))
    }

    /// Production must not run with the built-in JWT secret.
    pub fn check_secrets(&self) -> Result<(), CmsError> {
        if !self.is_production() {
            return Ok(());
        }
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        if secret.is_empty() || secret == DEFAULT_JWT_SECRET {
            return Err(CmsError::Internal(
                "JWT_SECRET must be set to a secure, unique value in production".to_string(),
            ));
        }

        let admin_email = std::env::var("ADMIN_EMAIL").unwrap_or_default();
        if admin_email.is_empty() || admin_email == "admin@example.com" {
            tracing::warn!("SECURITY: ADMIN_EMAIL is using an insecure default");
        }
        let password_set =
            std::env::var("ADMIN_HASH_PASSWORD").is_ok() || std::env::var("ADMIN_PASSWORD").is_ok();
        if !password_set {
            tracing::warn!(
                "SECURITY: neither ADMIN_HASH_PASSWORD nor ADMIN_PASSWORD is set; \
                 the fallback editor password is insecure"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr_from_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 3001);
    }

    #[test]
    fn test_bad_host_is_rejected() {
        let config = AppConfig {
            host: "not a host".to_string(),
            ..AppConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_development_skips_secret_check() {
        assert!(AppConfig::default().check_secrets().is_ok());
    }
}
