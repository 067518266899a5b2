/**
 * Public Site Routes
 * Server-rendered pages per brand
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::state::AppState;
use crate::theme::{Brand, RenderContext};

/// Slug rendered for a bare `/{brand}` request.
pub const HOME_SLUG: &str = "start";

/// GET /{brand}
pub async fn brand_home(State(state): State<AppState>, Path(brand): Path<String>) -> Response {
    render_public(&state, &brand, HOME_SLUG).await
}

/// GET /{brand}/{slug}
pub async fn public_page(
    State(state): State<AppState>,
    Path((brand, slug)): Path<(String, String)>,
) -> Response {
    render_public(&state, &brand, &slug).await
}

fn status_page(state: &AppState, brand: Brand, status: StatusCode, title: &str, message: &str) -> Response {
    let ctx = RenderContext::public(brand);
    let html = state.renderer.render_status_page(&ctx, title, message);
    (status, Html(html)).into_response()
}

fn not_found(state: &AppState, brand: Brand) -> Response {
    status_page(
        state,
        brand,
        StatusCode::NOT_FOUND,
        "Seite nicht gefunden",
        "Die angeforderte Seite existiert nicht.",
    )
}

async fn render_public(state: &AppState, brand: &str, slug: &str) -> Response {
    let Ok(brand) = brand.parse::<Brand>() else {
        return not_found(state, Brand::Physiotherapy);
    };

    let page = match state.documents.published_page(brand, slug).await {
        Ok(Some(page)) => page,
        Ok(None) => return not_found(state, brand),
        Err(e) => {
            tracing::error!(%brand, slug, error = %e, "page lookup failed");
            return status_page(
                state,
                brand,
                StatusCode::SERVICE_UNAVAILABLE,
                "Vorübergehend nicht verfügbar",
                "Bitte versuchen Sie es in wenigen Minuten erneut.",
            );
        }
    };

    // A block load failure still serves the page chrome.
    let blocks = match state.documents.load(page.id).await {
        Ok(loaded) => loaded.blocks,
        Err(e) => {
            tracing::error!(page_id = %page.id, error = %e, "rendering page without blocks");
            Vec::new()
        }
    };

    let ctx = RenderContext::public(brand);
    Html(state.renderer.render_page(&page, &blocks, &ctx)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{Block, BlockType};
    use crate::page::{NewPage, PageStatus};
    use crate::routes::test_support::{get_request, send, state};
    use crate::store::CurrentUser;
    use axum::{routing::get, Router};

    fn router(state: AppState) -> Router {
        Router::new()
            .route("/{brand}", get(brand_home))
            .route("/{brand}/{slug}", get(public_page))
            .with_state(state)
    }

    async fn seeded(status: PageStatus) -> AppState {
        let state = state();
        let editor = Some(CurrentUser {
            email: "praxis@example.de".to_string(),
        });
        let page = state
            .documents
            .create_page(
                &editor,
                NewPage {
                    brand: Brand::PhysioKonzept,
                    slug: "start".to_string(),
                    title: "Willkommen".to_string(),
                    status,
                },
            )
            .await
            .unwrap();
        let hero = Block::new(BlockType::Hero);
        state.documents.save(&editor, page.id, [&hero]).await.unwrap();
        state
    }

    #[tokio::test]
    async fn test_published_page_renders() {
        let state = seeded(PageStatus::Published).await;
        let (status, bytes) = send(router(state), get_request("/physio-konzept/start", None)).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("<title>Willkommen | Physio-Konzept</title>"));
        assert!(html.contains("cms-hero"));
        assert!(!html.contains("data-cms-path"));
    }

    #[tokio::test]
    async fn test_brand_root_serves_home_page() {
        let state = seeded(PageStatus::Published).await;
        let (status, _) = send(router(state), get_request("/physio-konzept", None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_draft_is_not_public() {
        let state = seeded(PageStatus::Draft).await;
        let (status, _) = send(router(state), get_request("/physio-konzept/start", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_page_and_brand_are_not_found() {
        let state = seeded(PageStatus::Published).await;
        let (status, bytes) =
            send(router(state.clone()), get_request("/physiotherapy/team", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(String::from_utf8_lossy(&bytes).contains("Seite nicht gefunden"));

        let (status, _) = send(router(state), get_request("/wellness/start", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
