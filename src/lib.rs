//! physio-cms - block-based CMS and page renderer for the Physiotherapie and
//! Physio-Konzept sites.

pub mod blocks;
pub mod config;
pub mod db;
pub mod document;
pub mod error;
pub mod logging;
pub mod page;
pub mod render;
pub mod routes;
pub mod state;
pub mod store;
pub mod theme;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, trace::TraceLayer,
};

use config::AppConfig;
use state::AppState;
use store::{ContentStore, MemoryContentStore, PgContentStore};

/// Configure CORS from ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN,
/// falling back to the local admin dev server.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .map(|s| {
            s.split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect::<Vec<HeaderValue>>()
        })
        .filter(|origins| !origins.is_empty())
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    let upload_limit = state.config.max_upload_bytes + 64 * 1024;

    Router::new()
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/verify", post(routes::auth::verify_token))
        .route("/api/blocks/schema", get(routes::blocks::schema))
        .route(
            "/api/pages",
            get(routes::pages::list_pages).post(routes::pages::create_page),
        )
        .route(
            "/api/pages/{id}",
            get(routes::pages::get_page)
                .patch(routes::pages::update_page)
                .delete(routes::pages::delete_page),
        )
        .route(
            "/api/pages/{id}/blocks",
            get(routes::blocks::get_blocks).put(routes::blocks::save_blocks),
        )
        .route("/api/pages/{id}/blocks/edits", post(routes::blocks::apply_edits))
        .route("/api/pages/{id}/preview", post(routes::blocks::preview))
        .route("/api/theme/{brand}", get(routes::theme::get_theme))
        .route(
            "/api/media",
            get(routes::media::list_media)
                .post(routes::media::upload_media)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/media/{key}", delete(routes::media::delete_media))
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors();
    let body_limit = state.config.max_upload_bytes.max(2 * 1024 * 1024) + 64 * 1024;
    let uploads = ServeDir::new(&state.config.upload_dir);

    api_routes(&state)
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed))
        .route("/health/ready", get(routes::health::health_ready))
        .route("/{brand}", get(routes::site::brand_home))
        .route("/{brand}/{slug}", get(routes::site::public_page))
        .nest_service("/uploads", uploads)
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
}

/// PostgreSQL when DATABASE_URL is set and reachable, otherwise in-memory.
async fn connect_store() -> Arc<dyn ContentStore> {
    let Some(db_config) = db::DbConfig::from_env() else {
        tracing::info!("DATABASE_URL not set; using in-memory content store");
        return Arc::new(MemoryContentStore::new());
    };

    match db::init_pool(db_config).await {
        Ok(pool) => {
            if let Err(e) = db::run_migrations(&pool).await {
                tracing::error!(error = %e, "failed to run database migrations");
            }
            Arc::new(PgContentStore::new(pool))
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "failed to initialize database pool; continuing with in-memory content store"
            );
            Arc::new(MemoryContentStore::new())
        }
    }
}

/// Run the server (used by main).
pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    // Dropping the guards stops the background log writers.
    let _log_guards = logging::init(&logging::LogConfig::from_env());

    routes::health::init_start_time();

    let config = AppConfig::from_env();
    config.check_secrets()?;
    let addr = config.socket_addr()?;

    let store = connect_store().await;
    let app = create_app(AppState::new(store, config));

    tracing::info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{get_request, send};
    use axum::http::StatusCode;

    fn app() -> Router {
        create_app(AppState::in_memory(AppConfig::default()))
    }

    #[tokio::test]
    async fn test_static_routes_win_over_brand_pages() {
        let (status, _) = send(app(), get_request("/health", None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(app(), get_request("/api/blocks/schema", None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_public_page_is_html_404() {
        let res = tower::ServiceExt::oneshot(app(), get_request("/physiotherapy/nirgendwo", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let content_type = res.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }
}
