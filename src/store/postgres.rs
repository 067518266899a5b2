//! PostgreSQL content store (sqlx).

use async_trait::async_trait;
use sqlx::PgPool;
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::ContentStore;
use crate::blocks::StoredBlock;
use crate::db::models::{BlockRow, PageRow};
use crate::error::{CmsError, CmsResult};
use crate::page::{NewPage, Page, PageUpdate};
use crate::theme::Brand;

const PAGE_COLUMNS: &str = "id, brand, slug, status, title, created_at, updated_at";

#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Unique violations on (brand, slug) become `Conflict`.
fn map_page_write_error(e: sqlx::Error, slug: &str) -> CmsError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            CmsError::Conflict(format!("slug '{}' already exists for this brand", slug))
        }
        _ => CmsError::from(e),
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn fetch_block_rows(&self, page_id: Uuid) -> CmsResult<Vec<BlockRow>> {
        let rows = sqlx::query_as::<_, BlockRow>(
            "SELECT id, page_id, block_type, sort, props, seq FROM page_blocks WHERE page_id = $1",
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn replace_block_rows(&self, page_id: Uuid, blocks: Vec<StoredBlock>) -> CmsResult<()> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent saves of the same page.
        let locked: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM pages WHERE id = $1 FOR UPDATE")
                .bind(page_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(CmsError::PageNotFound(page_id.to_string()));
        }

        sqlx::query("DELETE FROM page_blocks WHERE page_id = $1")
            .bind(page_id)
            .execute(&mut *tx)
            .await?;

        for block in blocks {
            sqlx::query(
                "INSERT INTO page_blocks (id, page_id, block_type, sort, props) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&block.id)
            .bind(page_id)
            .bind(&block.block_type)
            .bind(block.sort)
            .bind(&block.props)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE pages SET updated_at = now() WHERE id = $1")
            .bind(page_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_page(&self, brand: Brand, slug: &str) -> CmsResult<Option<Page>> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {} FROM pages WHERE brand = $1 AND slug = $2",
            PAGE_COLUMNS
        ))
        .bind(brand.as_str())
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Page::try_from).transpose()
    }

    async fn get_page(&self, id: Uuid) -> CmsResult<Option<Page>> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {} FROM pages WHERE id = $1",
            PAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Page::try_from).transpose()
    }

    async fn list_pages(&self, brand: Option<Brand>) -> CmsResult<Vec<Page>> {
        let rows = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {} FROM pages WHERE ($1::TEXT IS NULL OR brand = $1) ORDER BY brand, slug",
            PAGE_COLUMNS
        ))
        .bind(brand.map(|b| b.as_str()))
        .fetch_all(&self.pool)
        .await?;

        // A row with an unknown brand or status is skipped rather than
        // failing the whole listing.
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                Page::try_from(row)
                    .map_err(|e| tracing::warn!(page_id = %id, error = %e, "skipping page row"))
                    .ok()
            })
            .collect())
    }

    async fn insert_page(&self, page: NewPage) -> CmsResult<Page> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "INSERT INTO pages (brand, slug, status, title) VALUES ($1, $2, $3, $4) RETURNING {}",
            PAGE_COLUMNS
        ))
        .bind(page.brand.as_str())
        .bind(&page.slug)
        .bind(page.status.as_str())
        .bind(&page.title)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_page_write_error(e, &page.slug))?;
        Page::try_from(row)
    }

    async fn update_page(&self, id: Uuid, update: PageUpdate) -> CmsResult<Page> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            r#"
            UPDATE pages SET
                slug = COALESCE($2, slug),
                title = COALESCE($3, title),
                status = COALESCE($4, status),
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            PAGE_COLUMNS
        ))
        .bind(id)
        .bind(update.slug.as_deref())
        .bind(update.title.as_deref())
        .bind(update.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_page_write_error(e, update.slug.as_deref().unwrap_or_default()))?
        .ok_or_else(|| CmsError::PageNotFound(id.to_string()))?;
        Page::try_from(row)
    }

    async fn delete_page(&self, id: Uuid) -> CmsResult<()> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CmsError::PageNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn health_check(&self) -> CmsResult<Duration> {
        let start = Instant::now();
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(start.elapsed())
    }
}
