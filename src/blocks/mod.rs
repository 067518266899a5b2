//! Content blocks: the closed set of block types and their typed props.

pub mod path;
pub mod props;
pub mod registry;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::error::{CmsError, CmsResult};
use props::{
    CardProps, ContactFormProps, FeatureGridProps, HeroProps, ImageTextProps, TextProps,
};

/// Every block type the CMS knows. Tags are kebab-case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    Hero,
    Text,
    FeatureGrid,
    Card,
    ImageText,
    ContactForm,
}

impl BlockType {
    pub const ALL: [BlockType; 6] = [
        BlockType::Hero,
        BlockType::Text,
        BlockType::FeatureGrid,
        BlockType::Card,
        BlockType::ImageText,
        BlockType::ContactForm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Hero => "hero",
            BlockType::Text => "text",
            BlockType::FeatureGrid => "feature-grid",
            BlockType::Card => "card",
            BlockType::ImageText => "image-text",
            BlockType::ContactForm => "contact-form",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = CmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CmsError::UnknownBlockType(s.to_string()))
    }
}

/// Typed props, one variant per block type.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockProps {
    Hero(HeroProps),
    Text(TextProps),
    FeatureGrid(FeatureGridProps),
    Card(CardProps),
    ImageText(ImageTextProps),
    ContactForm(ContactFormProps),
}

impl BlockProps {
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockProps::Hero(_) => BlockType::Hero,
            BlockProps::Text(_) => BlockType::Text,
            BlockProps::FeatureGrid(_) => BlockType::FeatureGrid,
            BlockProps::Card(_) => BlockType::Card,
            BlockProps::ImageText(_) => BlockType::ImageText,
            BlockProps::ContactForm(_) => BlockType::ContactForm,
        }
    }

    /// JSON form of the props, as persisted in the `props` column.
    pub fn to_value(&self) -> Value {
        let value = match self {
            BlockProps::Hero(p) => serde_json::to_value(p),
            BlockProps::Text(p) => serde_json::to_value(p),
            BlockProps::FeatureGrid(p) => serde_json::to_value(p),
            BlockProps::Card(p) => serde_json::to_value(p),
            BlockProps::ImageText(p) => serde_json::to_value(p),
            BlockProps::ContactForm(p) => serde_json::to_value(p),
        };
        // Plain structs with string keys always serialize.
        value.unwrap_or_default()
    }

    /// Deserialize without structural validation; see `registry::build_props`.
    pub fn from_value(block_type: BlockType, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match block_type {
            BlockType::Hero => BlockProps::Hero(serde_json::from_value(value)?),
            BlockType::Text => BlockProps::Text(serde_json::from_value(value)?),
            BlockType::FeatureGrid => BlockProps::FeatureGrid(serde_json::from_value(value)?),
            BlockType::Card => BlockProps::Card(serde_json::from_value(value)?),
            BlockType::ImageText => BlockProps::ImageText(serde_json::from_value(value)?),
            BlockType::ContactForm => BlockProps::ContactForm(serde_json::from_value(value)?),
        })
    }
}

/// Untyped block as it travels over the wire and into the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBlock {
    /// Empty for blocks the admin client has not persisted yet.
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub props: Value,
    #[serde(default)]
    pub sort: i32,
}

/// One validated content block of a page.
///
/// `props` is the typed view used for rendering. `raw` is the props object
/// exactly as it was stored or last written, including keys the typed view
/// does not know, and is what gets persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredBlock", into = "StoredBlock")]
pub struct Block {
    id: String,
    props: BlockProps,
    raw: Value,
    sort: i32,
}

impl Block {
    /// New block with a fresh id and registry defaults.
    pub fn new(block_type: BlockType) -> Self {
        let props = registry::defaults(block_type);
        Self {
            id: Uuid::new_v4().to_string(),
            raw: props.to_value(),
            props,
            sort: 0,
        }
    }

    /// Validate an untyped block. An empty id is replaced by a fresh one.
    pub fn from_stored(stored: StoredBlock) -> CmsResult<Self> {
        let block_type = registry::lookup(&stored.block_type)?;
        let props = registry::build_props(block_type, stored.props.clone())?;
        let id = if stored.id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            stored.id
        };
        Ok(Self {
            id,
            props,
            raw: stored.props,
            sort: stored.sort,
        })
    }

    pub fn to_stored(&self) -> StoredBlock {
        StoredBlock {
            id: self.id.clone(),
            block_type: self.block_type().as_str().to_string(),
            props: self.raw.clone(),
            sort: self.sort,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn block_type(&self) -> BlockType {
        self.props.block_type()
    }

    pub fn props(&self) -> &BlockProps {
        &self.props
    }

    /// Props as persisted, unknown keys included.
    pub fn props_value(&self) -> &Value {
        &self.raw
    }

    pub fn sort(&self) -> i32 {
        self.sort
    }

    pub(crate) fn set_sort(&mut self, sort: i32) {
        self.sort = sort;
    }

    /// `raw` must be the value `props` was built from.
    pub(crate) fn set_props(&mut self, props: BlockProps, raw: Value) {
        self.props = props;
        self.raw = raw;
    }
}

impl TryFrom<StoredBlock> for Block {
    type Error = CmsError;

    fn try_from(stored: StoredBlock) -> Result<Self, Self::Error> {
        Block::from_stored(stored)
    }
}

impl From<Block> for StoredBlock {
    fn from(block: Block) -> Self {
        block.to_stored()
    }
}
