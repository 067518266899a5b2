//! Pages: the owners of block lists, addressed publicly by (brand, slug).

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CmsError;
use crate::theme::Brand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
        }
    }
}

impl FromStr for PageStatus {
    type Err = CmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PageStatus::Draft),
            "published" => Ok(PageStatus::Published),
            other => Err(CmsError::InvalidInput(format!("unknown page status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: Uuid,
    pub brand: Brand,
    pub slug: String,
    pub status: PageStatus,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    pub fn is_published(&self) -> bool {
        self.status == PageStatus::Published
    }
}

/// Request body for page creation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPage {
    pub brand: Brand,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub status: PageStatus,
}

/// Partial page update; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUpdate {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub status: Option<PageStatus>,
}

lazy_static! {
    /// Lowercase letters, numbers and single hyphens.
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}

impl NewPage {
    pub fn validate(&self) -> Result<(), CmsError> {
        if self.title.trim().is_empty() {
            return Err(CmsError::InvalidInput("title is required".to_string()));
        }
        if !is_valid_slug(&self.slug) {
            return Err(CmsError::InvalidInput(
                "slug must contain only lowercase letters, numbers, and hyphens".to_string(),
            ));
        }
        Ok(())
    }
}

impl PageUpdate {
    pub fn validate(&self) -> Result<(), CmsError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(CmsError::InvalidInput("title must not be empty".to_string()));
            }
        }
        if let Some(slug) = &self.slug {
            if !is_valid_slug(slug) {
                return Err(CmsError::InvalidInput(
                    "slug must contain only lowercase letters, numbers, and hyphens".to_string(),
                ));
            }
        }
        Ok(())
    }
}
