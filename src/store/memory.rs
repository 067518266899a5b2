//! In-process content store, used when no database is configured and in tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ContentStore;
use crate::blocks::StoredBlock;
use crate::db::models::BlockRow;
use crate::error::{CmsError, CmsResult};
use crate::page::{NewPage, Page, PageUpdate};
use crate::theme::Brand;

#[derive(Default)]
struct Inner {
    pages: HashMap<Uuid, Page>,
    blocks: HashMap<Uuid, Vec<BlockRow>>,
    seq: i64,
}

impl Inner {
    fn rows_for(&mut self, page_id: Uuid, blocks: Vec<StoredBlock>) -> Vec<BlockRow> {
        blocks
            .into_iter()
            .map(|block| {
                self.seq += 1;
                BlockRow {
                    id: block.id,
                    page_id,
                    block_type: block.block_type,
                    sort: block.sort,
                    props: block.props,
                    seq: self.seq,
                }
            })
            .collect()
    }

    fn slug_taken(&self, brand: Brand, slug: &str, except: Option<Uuid>) -> bool {
        self.pages
            .values()
            .any(|p| p.brand == brand && p.slug == slug && Some(p.id) != except)
    }
}

#[derive(Default)]
pub struct MemoryContentStore {
    inner: RwLock<Inner>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw rows to a page without validation, as an older writer or
    /// a manual database edit might have left them.
    pub async fn seed_rows(&self, page_id: Uuid, rows: Vec<StoredBlock>) {
        let mut inner = self.inner.write().await;
        let rows = inner.rows_for(page_id, rows);
        inner.blocks.entry(page_id).or_default().extend(rows);
    }

    pub async fn block_count(&self, page_id: Uuid) -> usize {
        self.inner
            .read()
            .await
            .blocks
            .get(&page_id)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn fetch_block_rows(&self, page_id: Uuid) -> CmsResult<Vec<BlockRow>> {
        let inner = self.inner.read().await;
        Ok(inner.blocks.get(&page_id).cloned().unwrap_or_default())
    }

    async fn replace_block_rows(&self, page_id: Uuid, blocks: Vec<StoredBlock>) -> CmsResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.pages.contains_key(&page_id) {
            return Err(CmsError::PageNotFound(page_id.to_string()));
        }
        let rows = inner.rows_for(page_id, blocks);
        inner.blocks.insert(page_id, rows);
        if let Some(page) = inner.pages.get_mut(&page_id) {
            page.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn find_page(&self, brand: Brand, slug: &str) -> CmsResult<Option<Page>> {
        let inner = self.inner.read().await;
        Ok(inner
            .pages
            .values()
            .find(|p| p.brand == brand && p.slug == slug)
            .cloned())
    }

    async fn get_page(&self, id: Uuid) -> CmsResult<Option<Page>> {
        Ok(self.inner.read().await.pages.get(&id).cloned())
    }

    async fn list_pages(&self, brand: Option<Brand>) -> CmsResult<Vec<Page>> {
        let inner = self.inner.read().await;
        let mut pages: Vec<Page> = inner
            .pages
            .values()
            .filter(|p| brand.map_or(true, |b| p.brand == b))
            .cloned()
            .collect();
        pages.sort_by(|a, b| (a.brand.as_str(), &a.slug).cmp(&(b.brand.as_str(), &b.slug)));
        Ok(pages)
    }

    async fn insert_page(&self, page: NewPage) -> CmsResult<Page> {
        let mut inner = self.inner.write().await;
        if inner.slug_taken(page.brand, &page.slug, None) {
            return Err(CmsError::Conflict(format!(
                "slug '{}' already exists for {}",
                page.slug, page.brand
            )));
        }
        let now = Utc::now();
        let page = Page {
            id: Uuid::new_v4(),
            brand: page.brand,
            slug: page.slug,
            status: page.status,
            title: page.title,
            created_at: now,
            updated_at: now,
        };
        inner.pages.insert(page.id, page.clone());
        Ok(page)
    }

    async fn update_page(&self, id: Uuid, update: PageUpdate) -> CmsResult<Page> {
        let mut inner = self.inner.write().await;
        let brand = inner
            .pages
            .get(&id)
            .map(|p| p.brand)
            .ok_or_else(|| CmsError::PageNotFound(id.to_string()))?;
        if let Some(slug) = &update.slug {
            if inner.slug_taken(brand, slug, Some(id)) {
                return Err(CmsError::Conflict(format!(
                    "slug '{}' already exists for {}",
                    slug, brand
                )));
            }
        }

        let page = inner
            .pages
            .get_mut(&id)
            .ok_or_else(|| CmsError::PageNotFound(id.to_string()))?;
        if let Some(slug) = update.slug {
            page.slug = slug;
        }
        if let Some(title) = update.title {
            page.title = title;
        }
        if let Some(status) = update.status {
            page.status = status;
        }
        page.updated_at = Utc::now();
        Ok(page.clone())
    }

    async fn delete_page(&self, id: Uuid) -> CmsResult<()> {
        let mut inner = self.inner.write().await;
        if inner.pages.remove(&id).is_none() {
            return Err(CmsError::PageNotFound(id.to_string()));
        }
        inner.blocks.remove(&id);
        Ok(())
    }

    async fn health_check(&self) -> CmsResult<Duration> {
        let start = Instant::now();
        let _ = self.inner.read().await;
        Ok(start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageStatus;
    use serde_json::json;

    fn new_page(slug: &str) -> NewPage {
        NewPage {
            brand: Brand::PhysioKonzept,
            slug: slug.to_string(),
            title: "Kurse".to_string(),
            status: PageStatus::Draft,
        }
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts_per_brand() {
        let store = MemoryContentStore::new();
        store.insert_page(new_page("kurse")).await.unwrap();
        let err = store.insert_page(new_page("kurse")).await.unwrap_err();
        assert!(matches!(err, CmsError::Conflict(_)));

        let other_brand = NewPage {
            brand: Brand::Physiotherapy,
            ..new_page("kurse")
        };
        assert!(store.insert_page(other_brand).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_cascades_blocks() {
        let store = MemoryContentStore::new();
        let page = store.insert_page(new_page("kurse")).await.unwrap();
        store
            .replace_block_rows(
                page.id,
                vec![StoredBlock {
                    id: "b1".into(),
                    block_type: "text".into(),
                    props: json!({"content": "x"}),
                    sort: 0,
                }],
            )
            .await
            .unwrap();
        assert_eq!(store.block_count(page.id).await, 1);

        store.delete_page(page.id).await.unwrap();
        assert_eq!(store.block_count(page.id).await, 0);
    }

    #[tokio::test]
    async fn test_replace_requires_existing_page() {
        let store = MemoryContentStore::new();
        let err = store
            .replace_block_rows(Uuid::new_v4(), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CmsError::PageNotFound(_)));
    }
}
