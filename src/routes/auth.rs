/**
 * Authentication Routes
 * Editor login and JWT bearer verification
 */
use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, convert::Infallible, net::SocketAddr, sync::Arc};
use tokio::sync::RwLock;

use crate::config::DEFAULT_JWT_SECRET;
use crate::error::{CmsError, CmsResult};
use crate::store::{AuthProvider, CurrentUser};

// ============================================================================
// Configuration
// ============================================================================

lazy_static::lazy_static! {
    pub static ref JWT_SECRET: String = std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());

    pub static ref ADMIN_EMAIL: String = std::env::var("ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@example.com".to_string());

    /// bcrypt hash of the editor password; ADMIN_HASH_PASSWORD wins over
    /// ADMIN_PASSWORD.
    pub static ref ADMIN_PASSWORD_HASH: String = {
        if let Ok(hash) = std::env::var("ADMIN_HASH_PASSWORD") {
            hash
        } else if let Ok(plain) = std::env::var("ADMIN_PASSWORD") {
            hash(&plain, DEFAULT_COST).unwrap_or_default()
        } else {
            hash("admin123", DEFAULT_COST).unwrap_or_default()
        }
    };

    /// IP -> timestamp of the last login attempt.
    static ref RATE_LIMIT: Arc<RwLock<HashMap<String, i64>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

/// Editor sessions are long; there is no refresh flow.
const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 8 * 60;

#[cfg_attr(test, allow(dead_code))]
const RATE_LIMIT_WINDOW_SECS: i64 = 10;

const EDITOR_ROLE: &str = "editor";

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub user: Option<UserInfo>,
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoginResponse {
    fn failure(message: &str) -> Json<Self> {
        Json(Self {
            success: false,
            user: None,
            access_token: None,
            expires_in: None,
            error: Some(message.to_string()),
        })
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub is_valid: bool,
    pub user: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Tokens
// ============================================================================

/// Signed HS256 access token for an editor.
pub fn issue_access_token(email: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: email.to_string(),
        role: EDITOR_ROLE.to_string(),
        exp: (now + Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
}

pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// ============================================================================
// Bearer extractor
// ============================================================================

/// Caller identity from the `Authorization: Bearer` header. Missing or
/// invalid tokens yield an anonymous caller; writes then fail with 401.
#[derive(Debug, Clone, Default)]
pub struct BearerAuth(pub Option<CurrentUser>);

impl BearerAuth {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let user = extract_bearer_token(headers).and_then(|token| {
            verify_access_token(token)
                .map_err(|e| tracing::debug!(error = %e, "bearer token rejected"))
                .ok()
                .map(|claims| CurrentUser { email: claims.sub })
        });
        Self(user)
    }

    pub fn require(&self) -> CmsResult<CurrentUser> {
        self.0.clone().ok_or(CmsError::Unauthorized)
    }
}

impl AuthProvider for BearerAuth {
    fn current_user(&self) -> Option<CurrentUser> {
        self.0.clone()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for BearerAuth {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn check_rate_limit(ip: &str) -> bool {
    #[cfg(test)]
    {
        let _ = ip;
        true
    }

    #[cfg(not(test))]
    {
        let now = Utc::now().timestamp();
        let mut limits = RATE_LIMIT.write().await;
        limits.retain(|_, last| now - *last < RATE_LIMIT_WINDOW_SECS);
        if limits.contains_key(ip) {
            return false;
        }
        limits.insert(ip.to_string(), now);
        true
    }
}

/// POST /api/auth/login
pub async fn login(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let ip = addr.ip().to_string();

    if !check_rate_limit(&ip).await {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            LoginResponse::failure("Too many requests. Please try again later."),
        );
    }

    if payload.email.is_empty() || payload.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            LoginResponse::failure("Email and password are required"),
        );
    }
    if !payload.email.contains('@') {
        return (
            StatusCode::BAD_REQUEST,
            LoginResponse::failure("Invalid email format"),
        );
    }

    let email_matches = payload.email.eq_ignore_ascii_case(&ADMIN_EMAIL);
    // bcrypt is CPU-bound; keep it off the async workers.
    let password = payload.password.clone();
    let password_ok = tokio::task::spawn_blocking(move || {
        verify(&password, &ADMIN_PASSWORD_HASH).unwrap_or(false)
    })
    .await
    .unwrap_or(false);

    if !email_matches || !password_ok {
        tracing::warn!(ip = %ip, "failed login attempt");
        return (
            StatusCode::UNAUTHORIZED,
            LoginResponse::failure("Invalid credentials"),
        );
    }

    let email = ADMIN_EMAIL.clone();
    match issue_access_token(&email) {
        Ok(token) => {
            tracing::info!(user = %email, "editor logged in");
            (
                StatusCode::OK,
                Json(LoginResponse {
                    success: true,
                    user: Some(UserInfo {
                        email,
                        role: EDITOR_ROLE.to_string(),
                    }),
                    access_token: Some(token),
                    expires_in: Some(ACCESS_TOKEN_EXPIRY_MINUTES * 60),
                    error: None,
                }),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to create access token");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                LoginResponse::failure("Failed to create token"),
            )
        }
    }
}

/// POST /api/auth/verify
pub async fn verify_token(headers: HeaderMap) -> impl IntoResponse {
    let Some(token) = extract_bearer_token(&headers) else {
        return Json(VerifyResponse {
            success: false,
            is_valid: false,
            user: None,
            error: Some("No authorization token provided".to_string()),
        });
    };

    match verify_access_token(token) {
        Ok(claims) => Json(VerifyResponse {
            success: true,
            is_valid: true,
            user: Some(UserInfo {
                email: claims.sub,
                role: claims.role,
            }),
            error: None,
        }),
        Err(e) => {
            tracing::debug!(error = %e, "token verification failed");
            Json(VerifyResponse {
                success: false,
                is_valid: false,
                user: None,
                error: Some("Invalid or expired token".to_string()),
            })
        }
    }
}
