use axum::{extract::Path, Json};
use serde::Serialize;

use crate::error::CmsResult;
use crate::theme::{Brand, ThemeTokens};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeResponse {
    pub brand: Brand,
    pub display_name: &'static str,
    pub tokens: ThemeTokens,
}

/// GET /api/theme/{brand}
pub async fn get_theme(Path(brand): Path<String>) -> CmsResult<Json<ThemeResponse>> {
    let brand: Brand = brand.parse()?;
    Ok(Json(ThemeResponse {
        brand,
        display_name: brand.display_name(),
        tokens: ThemeTokens::preset(brand),
    }))
}
