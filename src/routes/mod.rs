/**
 * Routes Module
 * API and public site route handlers
 */
pub mod auth;
pub mod blocks;
pub mod health;
pub mod media;
pub mod pages;
pub mod site;
pub mod theme;

use serde::{Deserialize, Serialize};

use crate::blocks::registry::ValidationError;

/// JSON error body shared by every API route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationError>>,
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::{Body, Bytes},
        http::{Request, StatusCode},
        Router,
    };
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::state::AppState;

    pub fn state() -> AppState {
        AppState::in_memory(AppConfig::default())
    }

    pub fn bearer() -> String {
        let token = super::auth::issue_access_token("praxis@example.de").unwrap();
        format!("Bearer {}", token)
    }

    pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Bytes) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    pub fn json_request(
        method: &str,
        uri: &str,
        auth: Option<&str>,
        body: &serde_json::Value,
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        builder
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    pub fn get_request(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(uri);
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        builder.body(Body::empty()).unwrap()
    }
}
