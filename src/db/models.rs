//! Database models - rows of the `pages` and `page_blocks` tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::blocks::StoredBlock;
use crate::error::CmsError;
use crate::page::Page;

/// Page row; `brand` and `status` are stored as their wire tags.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PageRow {
    pub id: Uuid,
    pub brand: String,
    pub slug: String,
    pub status: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PageRow> for Page {
    type Error = CmsError;

    fn try_from(row: PageRow) -> Result<Self, Self::Error> {
        Ok(Page {
            id: row.id,
            brand: row.brand.parse()?,
            slug: row.slug,
            status: row.status.parse()?,
            title: row.title,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Block row. `seq` is the insertion counter that breaks `sort` ties.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct BlockRow {
    pub id: String,
    pub page_id: Uuid,
    pub block_type: String,
    pub sort: i32,
    pub props: serde_json::Value,
    pub seq: i64,
}

impl From<BlockRow> for StoredBlock {
    fn from(row: BlockRow) -> Self {
        StoredBlock {
            id: row.id,
            block_type: row.block_type,
            props: row.props,
            sort: row.sort,
        }
    }
}
