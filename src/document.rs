//! In-memory block document of one page, edited between load and save.
//!
//! Vector position is the render order. `sort` is renumbered densely after
//! every structural change so iteration always yields `sort == index`.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

use crate::blocks::path::PropPath;
use crate::blocks::{registry, Block};
use crate::error::{CmsError, CmsResult};

#[derive(Debug, Clone, PartialEq)]
pub struct BlockDocument {
    page_id: Uuid,
    blocks: Vec<Block>,
}

impl BlockDocument {
    pub fn new(page_id: Uuid) -> Self {
        Self {
            page_id,
            blocks: Vec::new(),
        }
    }

    /// Wrap an already ordered block list. Fails on duplicate ids.
    pub fn from_blocks(page_id: Uuid, blocks: Vec<Block>) -> CmsResult<Self> {
        let mut seen = HashSet::with_capacity(blocks.len());
        for block in &blocks {
            if !seen.insert(block.id()) {
                return Err(CmsError::DuplicateBlockId(block.id().to_string()));
            }
        }
        let mut doc = Self { page_id, blocks };
        doc.renumber();
        Ok(doc)
    }

    pub fn page_id(&self) -> Uuid {
        self.page_id
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id() == id)
    }

    fn require_position(&self, id: &str) -> CmsResult<usize> {
        self.position(id)
            .ok_or_else(|| CmsError::NotFound(id.to_string()))
    }

    fn renumber(&mut self) {
        for (i, block) in self.blocks.iter_mut().enumerate() {
            block.set_sort(i as i32);
        }
    }

    /// Create a block of `block_type` with registry defaults at `index`
    /// (clamped to the list length) and return its id.
    pub fn insert(&mut self, index: usize, block_type: &str) -> CmsResult<String> {
        let block_type = registry::lookup(block_type)?;
        let mut block = Block::new(block_type);
        while self.get(block.id()).is_some() {
            block = Block::new(block_type);
        }
        let id = block.id().to_string();
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block);
        self.renumber();
        Ok(id)
    }

    pub fn remove(&mut self, id: &str) -> CmsResult<Block> {
        let position = self.require_position(id)?;
        let removed = self.blocks.remove(position);
        self.renumber();
        Ok(removed)
    }

    /// Re-home a block at `to_index` (clamped); others keep relative order.
    pub fn move_to(&mut self, id: &str, to_index: usize) -> CmsResult<()> {
        let from = self.require_position(id)?;
        let to = to_index.min(self.blocks.len() - 1);
        if from == to {
            return Ok(());
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        self.renumber();
        Ok(())
    }

    /// Replace the value at `path` inside a block's props, keeping siblings.
    ///
    /// The path must resolve to one of the type's editable elements and the
    /// result must still satisfy the type's schema; otherwise the block is
    /// left untouched.
    pub fn patch(&mut self, id: &str, path: &str, value: Value) -> CmsResult<()> {
        let position = self.require_position(id)?;
        let block = &self.blocks[position];
        let block_type = block.block_type();

        let prop_path = PropPath::parse(path)
            .ok_or_else(|| CmsError::invalid_path(block_type.as_str(), path))?;
        registry::resolve_path(block_type, &prop_path)?;

        // Patch the stored form so keys outside the schema are kept.
        let mut tree = block.props_value().clone();
        prop_path
            .set(&mut tree, value)
            .map_err(|_| CmsError::invalid_path(block_type.as_str(), path))?;
        let props = registry::build_props(block_type, tree.clone())?;

        self.blocks[position].set_props(props, tree);
        Ok(())
    }

    /// Whole-props replace for a block, validated against its own type.
    pub fn replace_props(&mut self, id: &str, props: Value) -> CmsResult<()> {
        let position = self.require_position(id)?;
        let block_type = self.blocks[position].block_type();
        let typed = registry::build_props(block_type, props.clone())?;
        self.blocks[position].set_props(typed, props);
        Ok(())
    }

    /// Blocks in render order. Cloning the iterator restarts it.
    pub fn to_ordered_list(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Apply a batch of edits. On the first failure the document is restored
    /// to its state before the batch and the error is returned.
    pub fn apply_all(&mut self, ops: Vec<EditOp>) -> CmsResult<Vec<String>> {
        let snapshot = self.blocks.clone();
        let mut inserted = Vec::new();
        for op in ops {
            let result = match op {
                EditOp::Insert { index, block_type } => {
                    self.insert(index, &block_type).map(|id| inserted.push(id))
                }
                EditOp::Remove { id } => self.remove(&id).map(|_| ()),
                EditOp::Move { id, to_index } => self.move_to(&id, to_index),
                EditOp::Patch { id, path, value } => self.patch(&id, &path, value),
                EditOp::ReplaceProps { id, props } => self.replace_props(&id, props),
            };
            if let Err(e) = result {
                self.blocks = snapshot;
                return Err(e);
            }
        }
        Ok(inserted)
    }
}

/// One editor operation, as sent by the admin UI.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    Insert {
        index: usize,
        #[serde(rename = "type")]
        block_type: String,
    },
    Remove {
        id: String,
    },
    Move {
        id: String,
        #[serde(rename = "toIndex", alias = "to_index")]
        to_index: usize,
    },
    Patch {
        id: String,
        path: String,
        value: Value,
    },
    ReplaceProps {
        id: String,
        props: Value,
    },
}
