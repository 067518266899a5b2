/**
 * Block Routes
 * Schema catalog, block list load/save, edit batches and editor preview
 */
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::blocks::registry::{self, BlockTypeInfo};
use crate::blocks::{Block, StoredBlock};
use crate::document::{BlockDocument, EditOp};
use crate::error::CmsResult;
use crate::page::Page;
use crate::render::RenderedBlocks;
use crate::routes::auth::BearerAuth;
use crate::state::AppState;
use crate::store::DroppedRow;
use crate::theme::RenderContext;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    pub reason: String,
}

impl From<DroppedRow> for DroppedBlock {
    fn from(row: DroppedRow) -> Self {
        Self {
            id: row.id,
            block_type: row.block_type,
            reason: row.reason,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBlocksResponse {
    pub page: Page,
    pub blocks: Vec<Block>,
    /// Stored rows that could not be loaded; they disappear on the next save.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<DroppedBlock>,
}

#[derive(Debug, Deserialize)]
pub struct SaveBlocksRequest {
    pub blocks: Vec<StoredBlock>,
}

#[derive(Debug, Deserialize)]
pub struct EditBatchRequest {
    pub ops: Vec<EditOp>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBatchResponse {
    pub blocks: Vec<Block>,
    /// Ids of blocks created by `insert` ops, in op order.
    pub inserted: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewRequest {
    /// Unsaved block list; the stored list is rendered when absent.
    #[serde(default)]
    pub blocks: Option<Vec<StoredBlock>>,
    /// Token overrides layered over the brand preset.
    #[serde(default)]
    pub theme: Option<BTreeMap<String, String>>,
}

/// GET /api/blocks/schema
pub async fn schema() -> Json<&'static [BlockTypeInfo]> {
    Json(registry::catalog())
}

/// GET /api/pages/{id}/blocks
pub async fn get_blocks(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(page_id): Path<Uuid>,
) -> CmsResult<Json<PageBlocksResponse>> {
    auth.require()?;
    let page = state.documents.page(page_id).await?;
    let loaded = state.documents.load(page_id).await?;
    Ok(Json(PageBlocksResponse {
        page,
        blocks: loaded.blocks,
        dropped: loaded.dropped.into_iter().map(Into::into).collect(),
    }))
}

/// PUT /api/pages/{id}/blocks - replace the whole list.
pub async fn save_blocks(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(page_id): Path<Uuid>,
    Json(payload): Json<SaveBlocksRequest>,
) -> CmsResult<Json<Vec<Block>>> {
    auth.require()?;
    let blocks = payload
        .blocks
        .into_iter()
        .map(Block::from_stored)
        .collect::<CmsResult<Vec<_>>>()?;
    let doc = BlockDocument::from_blocks(page_id, blocks)?;
    state.documents.save_document(&auth, &doc).await?;
    Ok(Json(doc.into_blocks()))
}

/// POST /api/pages/{id}/blocks/edits - apply a batch of edits to the stored
/// list and save. A failing op aborts the batch and nothing is written.
pub async fn apply_edits(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(page_id): Path<Uuid>,
    Json(payload): Json<EditBatchRequest>,
) -> CmsResult<Json<EditBatchResponse>> {
    auth.require()?;
    state.documents.page(page_id).await?;
    let mut doc = state.documents.load_document(page_id).await?;
    let inserted = doc.apply_all(payload.ops)?;
    state.documents.save_document(&auth, &doc).await?;
    Ok(Json(EditBatchResponse {
        blocks: doc.into_blocks(),
        inserted,
    }))
}

/// POST /api/pages/{id}/preview - edit-mode render with hooks.
pub async fn preview(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(page_id): Path<Uuid>,
    Json(payload): Json<PreviewRequest>,
) -> CmsResult<Json<RenderedBlocks>> {
    auth.require()?;
    let page = state.documents.page(page_id).await?;

    let mut ctx = RenderContext::editor(page.brand);
    if let Some(overrides) = payload.theme {
        let mut theme = ctx.theme.clone();
        for (name, value) in &overrides {
            theme.set(name, value)?;
        }
        ctx = ctx.with_theme(theme);
    }

    let rendered = match payload.blocks {
        Some(rows) => state.renderer.render_stored(&rows, &ctx),
        None => {
            let loaded = state.documents.load(page_id).await?;
            state.renderer.render(&loaded.blocks, &ctx)
        }
    };
    Ok(Json(rendered))
}
