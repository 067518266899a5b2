/**
 * Page Routes
 * Admin CRUD for pages; every route requires an editor token
 */
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CmsResult;
use crate::page::{NewPage, Page, PageUpdate};
use crate::routes::auth::BearerAuth;
use crate::state::AppState;
use crate::theme::Brand;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub brand: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageListResponse {
    pub pages: Vec<Page>,
    pub total: usize,
}

/// GET /api/pages?brand=
pub async fn list_pages(
    State(state): State<AppState>,
    auth: BearerAuth,
    Query(query): Query<ListQuery>,
) -> CmsResult<Json<PageListResponse>> {
    auth.require()?;
    let brand = query
        .brand
        .as_deref()
        .filter(|b| !b.is_empty())
        .map(str::parse::<Brand>)
        .transpose()?;
    let pages = state.documents.list_pages(brand).await?;
    let total = pages.len();
    Ok(Json(PageListResponse { pages, total }))
}

/// POST /api/pages
pub async fn create_page(
    State(state): State<AppState>,
    auth: BearerAuth,
    Json(payload): Json<NewPage>,
) -> CmsResult<impl IntoResponse> {
    let page = state.documents.create_page(&auth, payload).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

/// GET /api/pages/{id}
pub async fn get_page(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(id): Path<Uuid>,
) -> CmsResult<Json<Page>> {
    auth.require()?;
    Ok(Json(state.documents.page(id).await?))
}

/// PATCH /api/pages/{id}
pub async fn update_page(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(id): Path<Uuid>,
    Json(payload): Json<PageUpdate>,
) -> CmsResult<Json<Page>> {
    Ok(Json(state.documents.update_page(&auth, id, payload).await?))
}

/// DELETE /api/pages/{id} - blocks go with the page.
pub async fn delete_page(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(id): Path<Uuid>,
) -> CmsResult<StatusCode> {
    state.documents.delete_page(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{bearer, get_request, json_request, send, state};
    use axum::routing::get;
    use axum::Router;
    use serde_json::json;

    fn router() -> Router {
        Router::new()
            .route("/api/pages", get(list_pages).post(create_page))
            .route(
                "/api/pages/{id}",
                get(get_page).patch(update_page).delete(delete_page),
            )
            .with_state(state())
    }

    #[tokio::test]
    async fn test_create_requires_token() {
        let req = json_request(
            "POST",
            "/api/pages",
            None,
            &json!({"brand": "physiotherapy", "slug": "team", "title": "Team"}),
        );
        let (status, _) = send(router(), req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_then_list_by_brand() {
        let app = router();
        let auth = bearer();
        let req = json_request(
            "POST",
            "/api/pages",
            Some(&auth),
            &json!({"brand": "physio-konzept", "slug": "kurse", "title": "Kurse"}),
        );
        let (status, bytes) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::CREATED);
        let page: Page = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(page.brand, Brand::PhysioKonzept);

        let (_, bytes) = send(app.clone(), get_request("/api/pages?brand=physio-konzept", Some(&auth))).await;
        let list: PageListResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(list.total, 1);

        let (_, bytes) = send(app, get_request("/api/pages?brand=physiotherapy", Some(&auth))).await;
        let list: PageListResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(list.total, 0);
    }

    #[tokio::test]
    async fn test_invalid_slug_is_bad_request() {
        let auth = bearer();
        let req = json_request(
            "POST",
            "/api/pages",
            Some(&auth),
            &json!({"brand": "physiotherapy", "slug": "Über uns", "title": "Über uns"}),
        );
        let (status, _) = send(router(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_page_is_not_found() {
        let auth = bearer();
        let uri = format!("/api/pages/{}", Uuid::new_v4());
        let (status, _) = send(router(), get_request(&uri, Some(&auth))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_brand_filter_is_rejected() {
        let auth = bearer();
        let (status, _) = send(router(), get_request("/api/pages?brand=wellness", Some(&auth))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
