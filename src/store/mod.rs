//! Block document store adapter.
//!
//! `ContentStore` is the backing-store seam (PostgreSQL in production, an
//! in-memory map when no database is configured). `DocumentStore` sits on
//! top of it and owns the load/save rules: validation of loaded rows,
//! authorization of writes and full-list replacement.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::blocks::{Block, StoredBlock};
use crate::db::models::BlockRow;
use crate::document::BlockDocument;
use crate::error::{CmsError, CmsResult};
use crate::page::{NewPage, Page, PageUpdate};
use crate::theme::Brand;

pub use memory::MemoryContentStore;
pub use postgres::PgContentStore;

/// Authenticated editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub email: String,
}

/// Answers who is making the current request.
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Option<CurrentUser>;
}

impl AuthProvider for Option<CurrentUser> {
    fn current_user(&self) -> Option<CurrentUser> {
        self.clone()
    }
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Short backend name for health output.
    fn backend(&self) -> &'static str;

    /// All block rows of a page, in no particular order.
    async fn fetch_block_rows(&self, page_id: Uuid) -> CmsResult<Vec<BlockRow>>;

    /// Replace every block row of a page in one atomic step.
    async fn replace_block_rows(&self, page_id: Uuid, blocks: Vec<StoredBlock>) -> CmsResult<()>;

    async fn find_page(&self, brand: Brand, slug: &str) -> CmsResult<Option<Page>>;

    async fn get_page(&self, id: Uuid) -> CmsResult<Option<Page>>;

    async fn list_pages(&self, brand: Option<Brand>) -> CmsResult<Vec<Page>>;

    /// Fails with `Conflict` when (brand, slug) is taken.
    async fn insert_page(&self, page: NewPage) -> CmsResult<Page>;

    async fn update_page(&self, id: Uuid, update: PageUpdate) -> CmsResult<Page>;

    /// Deletes the page and its blocks.
    async fn delete_page(&self, id: Uuid) -> CmsResult<()>;

    async fn health_check(&self) -> CmsResult<Duration>;
}

/// Row rejected while loading a page.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRow {
    pub id: String,
    pub block_type: String,
    pub reason: String,
}

/// Result of `DocumentStore::load`.
#[derive(Debug, Clone, Default)]
pub struct LoadedBlocks {
    pub blocks: Vec<Block>,
    pub dropped: Vec<DroppedRow>,
}

impl LoadedBlocks {
    pub fn into_document(self, page_id: Uuid) -> CmsResult<BlockDocument> {
        BlockDocument::from_blocks(page_id, self.blocks)
    }
}

fn require_user(auth: &dyn AuthProvider) -> CmsResult<CurrentUser> {
    auth.current_user().ok_or(CmsError::Unauthorized)
}

#[derive(Clone)]
pub struct DocumentStore {
    store: Arc<dyn ContentStore>,
}

impl DocumentStore {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn health_check(&self) -> CmsResult<Duration> {
        self.store.health_check().await
    }

    /// Load a page's blocks in render order. Rows with an unknown type,
    /// invalid props, a missing id or a repeated id are dropped and logged.
    pub async fn load(&self, page_id: Uuid) -> CmsResult<LoadedBlocks> {
        let mut rows = self.store.fetch_block_rows(page_id).await?;
        // Stable: equal sorts keep insertion order.
        rows.sort_by_key(|row| (row.sort, row.seq));

        let mut loaded = LoadedBlocks::default();
        let mut seen = HashSet::with_capacity(rows.len());
        for row in rows {
            let id = row.id.clone();
            let block_type = row.block_type.clone();
            // Only blocks coming from the admin client get fresh ids.
            if id.trim().is_empty() {
                tracing::warn!(%page_id, block_type = %block_type, seq = row.seq, "dropping block without id");
                loaded.dropped.push(DroppedRow {
                    id,
                    block_type,
                    reason: "missing block id".to_string(),
                });
                continue;
            }
            if seen.contains(&id) {
                tracing::warn!(%page_id, block_id = %id, "dropping block with repeated id");
                loaded.dropped.push(DroppedRow {
                    id,
                    block_type,
                    reason: "duplicate block id".to_string(),
                });
                continue;
            }
            match Block::from_stored(row.into()) {
                Ok(block) => {
                    seen.insert(block.id().to_string());
                    loaded.blocks.push(block);
                }
                Err(e) => {
                    tracing::warn!(
                        %page_id,
                        block_id = %id,
                        block_type = %block_type,
                        error = %e,
                        "dropping invalid block"
                    );
                    loaded.dropped.push(DroppedRow {
                        id,
                        block_type,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(loaded)
    }

    pub async fn load_document(&self, page_id: Uuid) -> CmsResult<BlockDocument> {
        self.load(page_id).await?.into_document(page_id)
    }

    /// Replace a page's persisted blocks with `blocks`, in the given order.
    /// Last write wins.
    pub async fn save<'b, I>(&self, auth: &dyn AuthProvider, page_id: Uuid, blocks: I) -> CmsResult<()>
    where
        I: IntoIterator<Item = &'b Block>,
    {
        let user = require_user(auth)?;

        let mut seen = HashSet::new();
        let mut rows = Vec::new();
        for (i, block) in blocks.into_iter().enumerate() {
            if !seen.insert(block.id()) {
                return Err(CmsError::DuplicateBlockId(block.id().to_string()));
            }
            let mut row = block.to_stored();
            row.sort = i as i32;
            rows.push(row);
        }

        let count = rows.len();
        self.store.replace_block_rows(page_id, rows).await?;
        tracing::info!(%page_id, blocks = count, user = %user.email, "page blocks saved");
        Ok(())
    }

    pub async fn save_document(&self, auth: &dyn AuthProvider, doc: &BlockDocument) -> CmsResult<()> {
        self.save(auth, doc.page_id(), doc.to_ordered_list()).await
    }

    /// Page for public rendering; drafts are invisible.
    pub async fn published_page(&self, brand: Brand, slug: &str) -> CmsResult<Option<Page>> {
        Ok(self
            .store
            .find_page(brand, slug)
            .await?
            .filter(Page::is_published))
    }

    pub async fn page(&self, id: Uuid) -> CmsResult<Page> {
        self.store
            .get_page(id)
            .await?
            .ok_or_else(|| CmsError::PageNotFound(id.to_string()))
    }

    pub async fn list_pages(&self, brand: Option<Brand>) -> CmsResult<Vec<Page>> {
        self.store.list_pages(brand).await
    }

    pub async fn create_page(&self, auth: &dyn AuthProvider, page: NewPage) -> CmsResult<Page> {
        let user = require_user(auth)?;
        page.validate()?;
        let page = self.store.insert_page(page).await?;
        tracing::info!(page_id = %page.id, brand = %page.brand, slug = %page.slug, user = %user.email, "page created");
        Ok(page)
    }

    pub async fn update_page(
        &self,
        auth: &dyn AuthProvider,
        id: Uuid,
        update: PageUpdate,
    ) -> CmsResult<Page> {
        let user = require_user(auth)?;
        update.validate()?;
        let page = self.store.update_page(id, update).await?;
        tracing::info!(page_id = %id, user = %user.email, "page updated");
        Ok(page)
    }

    pub async fn delete_page(&self, auth: &dyn AuthProvider, id: Uuid) -> CmsResult<()> {
        let user = require_user(auth)?;
        self.store.delete_page(id).await?;
        tracing::info!(page_id = %id, user = %user.email, "page deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockType;
    use crate::page::PageStatus;
    use serde_json::json;

    fn editor() -> Option<CurrentUser> {
        Some(CurrentUser {
            email: "praxis@example.de".to_string(),
        })
    }

    async fn store_with_page() -> (DocumentStore, Arc<MemoryContentStore>, Page) {
        let memory = Arc::new(MemoryContentStore::new());
        let store = DocumentStore::new(memory.clone());
        let page = store
            .create_page(
                &editor(),
                NewPage {
                    brand: Brand::Physiotherapy,
                    slug: "start".to_string(),
                    title: "Start".to_string(),
                    status: PageStatus::Published,
                },
            )
            .await
            .unwrap();
        (store, memory, page)
    }

    #[tokio::test]
    async fn test_load_orders_by_sort_then_insertion() {
        let (store, memory, page) = store_with_page().await;
        memory
            .seed_rows(
                page.id,
                vec![
                    StoredBlock {
                        id: "late".into(),
                        block_type: "text".into(),
                        props: json!({"content": "b"}),
                        sort: 1,
                    },
                    StoredBlock {
                        id: "first".into(),
                        block_type: "text".into(),
                        props: json!({"content": "a"}),
                        sort: 1,
                    },
                    StoredBlock {
                        id: "top".into(),
                        block_type: "hero".into(),
                        props: json!({"headline": "Willkommen"}),
                        sort: 0,
                    },
                ],
            )
            .await;

        let loaded = store.load(page.id).await.unwrap();
        let ids: Vec<&str> = loaded.blocks.iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec!["top", "late", "first"]);
    }

    #[tokio::test]
    async fn test_load_drops_repeated_ids() {
        let (store, memory, page) = store_with_page().await;
        let row = StoredBlock {
            id: "same".into(),
            block_type: "text".into(),
            props: json!({"content": "x"}),
            sort: 0,
        };
        memory.seed_rows(page.id, vec![row.clone(), row]).await;

        let loaded = store.load(page.id).await.unwrap();
        assert_eq!(loaded.blocks.len(), 1);
        assert_eq!(loaded.dropped.len(), 1);
        assert!(loaded.into_document(page.id).is_ok());
    }

    #[tokio::test]
    async fn test_load_drops_rows_without_id() {
        let (store, memory, page) = store_with_page().await;
        memory
            .seed_rows(
                page.id,
                vec![
                    StoredBlock {
                        id: String::new(),
                        block_type: "text".into(),
                        props: json!({"content": "ohne id"}),
                        sort: 0,
                    },
                    StoredBlock {
                        id: "kept".into(),
                        block_type: "text".into(),
                        props: json!({"content": "mit id"}),
                        sort: 1,
                    },
                ],
            )
            .await;

        let first = store.load(page.id).await.unwrap();
        let second = store.load(page.id).await.unwrap();
        let ids: Vec<&str> = first.blocks.iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec!["kept"]);
        assert_eq!(first.blocks, second.blocks);
        assert_eq!(first.dropped.len(), 1);
        assert_eq!(first.dropped[0].reason, "missing block id");
    }

    #[tokio::test]
    async fn test_save_rejects_duplicate_ids() {
        let (store, _, page) = store_with_page().await;
        let block = Block::new(BlockType::Text);
        let err = store
            .save(&editor(), page.id, [&block, &block])
            .await
            .unwrap_err();
        assert!(matches!(err, CmsError::DuplicateBlockId(_)));
    }

    #[tokio::test]
    async fn test_drafts_are_not_published() {
        let (store, _, page) = store_with_page().await;
        store
            .update_page(
                &editor(),
                page.id,
                PageUpdate {
                    status: Some(PageStatus::Draft),
                    ..PageUpdate::default()
                },
            )
            .await
            .unwrap();
        let found = store
            .published_page(Brand::Physiotherapy, "start")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_page_writes_require_user() {
        let (store, _, page) = store_with_page().await;
        let err = store.delete_page(&None::<CurrentUser>, page.id).await.unwrap_err();
        assert!(matches!(err, CmsError::Unauthorized));
        assert!(store.page(page.id).await.is_ok());
    }
}
