//! Block schema registry: props shape, defaults and editable elements per type.
//!
//! Everything here is static data; adding a block type means adding a
//! `BlockType` variant, its schema below and its arm in the renderer.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::path::PropPath;
use super::props::{
    CardProps, ContactFormProps, FeatureGridProps, HeroProps, ImageTextProps, TextProps,
};
use super::{BlockProps, BlockType};
use crate::error::{CmsError, CmsResult};

// ============================================================================
// Types
// ============================================================================

/// A user-editable sub-field of a block's props, shown in the admin inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EditableElementDef {
    pub id: &'static str,
    pub label: &'static str,
    pub group: &'static str,
    /// Dot-path pattern into props; `*` stands for a list index.
    pub path: &'static str,
    /// Element carries text whose typography the inspector may adjust.
    pub typography: bool,
}

const fn element(
    id: &'static str,
    label: &'static str,
    group: &'static str,
    path: &'static str,
    typography: bool,
) -> EditableElementDef {
    EditableElementDef {
        id,
        label,
        group,
        path,
        typography,
    }
}

/// One structural problem found in a block's props.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// HTML fragment, sanitized at render time.
    RichText,
    Link,
    /// Stored media reference.
    Media,
    Bool,
    Enum(&'static [&'static str]),
    Integer { min: i64, max: i64 },
    List(&'static [FieldSpec]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Must be present and non-null.
    Required,
    /// May be missing (a default applies) but must not be null.
    Defaulted,
    /// May be missing or null.
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

const fn required(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        presence: Presence::Required,
    }
}

const fn defaulted(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        presence: Presence::Defaulted,
    }
}

const fn optional(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        presence: Presence::Optional,
    }
}

#[derive(Debug)]
pub struct BlockSchema {
    pub block_type: BlockType,
    pub label: &'static str,
    pub fields: &'static [FieldSpec],
    pub editable: &'static [EditableElementDef],
}

// ============================================================================
// Schemas
// ============================================================================

const ALIGNMENTS: &[&str] = &["left", "center", "right"];
const TEXT_ALIGNMENTS: &[&str] = &["left", "center", "right", "justify"];
const CARD_VARIANTS: &[&str] = &["plain", "outlined", "elevated"];
const IMAGE_POSITIONS: &[&str] = &["left", "right"];

static HERO: BlockSchema = BlockSchema {
    block_type: BlockType::Hero,
    label: "Hero",
    fields: &[
        required("headline", FieldKind::Text),
        optional("subheadline", FieldKind::Text),
        optional("cta_label", FieldKind::Text),
        optional("cta_href", FieldKind::Link),
        optional("background_image", FieldKind::Media),
        defaulted("alignment", FieldKind::Enum(ALIGNMENTS)),
    ],
    editable: &[
        element("headline", "Headline", "content", "headline", true),
        element("subheadline", "Subheadline", "content", "subheadline", true),
        element("cta-label", "Button label", "action", "cta_label", true),
        element("cta-href", "Button link", "action", "cta_href", false),
        element("background", "Background image", "media", "background_image", false),
        element("alignment", "Alignment", "layout", "alignment", false),
    ],
};

static TEXT: BlockSchema = BlockSchema {
    block_type: BlockType::Text,
    label: "Text",
    fields: &[
        required("content", FieldKind::RichText),
        defaulted("alignment", FieldKind::Enum(TEXT_ALIGNMENTS)),
    ],
    editable: &[
        element("content", "Content", "content", "content", true),
        element("alignment", "Alignment", "layout", "alignment", false),
    ],
};

const FEATURE_ITEM_FIELDS: &[FieldSpec] = &[
    optional("icon", FieldKind::Text),
    required("title", FieldKind::Text),
    optional("description", FieldKind::Text),
];

static FEATURE_GRID: BlockSchema = BlockSchema {
    block_type: BlockType::FeatureGrid,
    label: "Feature grid",
    fields: &[
        optional("title", FieldKind::Text),
        defaulted("columns", FieldKind::Integer { min: 1, max: 4 }),
        defaulted("items", FieldKind::List(FEATURE_ITEM_FIELDS)),
    ],
    editable: &[
        element("title", "Title", "content", "title", true),
        element("columns", "Columns", "layout", "columns", false),
        element("items", "Items", "items", "items", false),
        element("item-icon", "Item icon", "items", "items.*.icon", false),
        element("item-title", "Item title", "items", "items.*.title", true),
        element("item-description", "Item description", "items", "items.*.description", true),
    ],
};

static CARD: BlockSchema = BlockSchema {
    block_type: BlockType::Card,
    label: "Card",
    fields: &[
        required("title", FieldKind::Text),
        optional("body", FieldKind::RichText),
        optional("image", FieldKind::Media),
        optional("link_label", FieldKind::Text),
        optional("link_href", FieldKind::Link),
        defaulted("variant", FieldKind::Enum(CARD_VARIANTS)),
    ],
    editable: &[
        element("title", "Title", "content", "title", true),
        element("body", "Body", "content", "body", true),
        element("image", "Image", "media", "image", false),
        element("link-label", "Link label", "action", "link_label", true),
        element("link-href", "Link target", "action", "link_href", false),
        element("variant", "Style", "layout", "variant", false),
    ],
};

static IMAGE_TEXT: BlockSchema = BlockSchema {
    block_type: BlockType::ImageText,
    label: "Image and text",
    fields: &[
        optional("image", FieldKind::Media),
        optional("image_alt", FieldKind::Text),
        optional("heading", FieldKind::Text),
        optional("body", FieldKind::RichText),
        defaulted("image_position", FieldKind::Enum(IMAGE_POSITIONS)),
    ],
    editable: &[
        element("image", "Image", "media", "image", false),
        element("image-alt", "Alt text", "media", "image_alt", false),
        element("heading", "Heading", "content", "heading", true),
        element("body", "Body", "content", "body", true),
        element("image-position", "Image position", "layout", "image_position", false),
    ],
};

static CONTACT_FORM: BlockSchema = BlockSchema {
    block_type: BlockType::ContactForm,
    label: "Contact form",
    fields: &[
        optional("title", FieldKind::Text),
        optional("intro", FieldKind::Text),
        required("submit_label", FieldKind::Text),
        defaulted("show_phone", FieldKind::Bool),
        optional("privacy_note", FieldKind::Text),
    ],
    editable: &[
        element("title", "Title", "content", "title", true),
        element("intro", "Introduction", "content", "intro", true),
        element("submit-label", "Button label", "action", "submit_label", true),
        element("show-phone", "Ask for phone number", "fields", "show_phone", false),
        element("privacy-note", "Privacy note", "content", "privacy_note", true),
    ],
};

pub fn schema(block_type: BlockType) -> &'static BlockSchema {
    match block_type {
        BlockType::Hero => &HERO,
        BlockType::Text => &TEXT,
        BlockType::FeatureGrid => &FEATURE_GRID,
        BlockType::Card => &CARD,
        BlockType::ImageText => &IMAGE_TEXT,
        BlockType::ContactForm => &CONTACT_FORM,
    }
}

// ============================================================================
// Lookups
// ============================================================================

/// Resolve a type tag, failing with `UnknownBlockType`.
pub fn lookup(tag: &str) -> CmsResult<BlockType> {
    tag.parse()
}

/// Default props for a new block of the given type.
pub fn defaults(block_type: BlockType) -> BlockProps {
    match block_type {
        BlockType::Hero => BlockProps::Hero(HeroProps::default()),
        BlockType::Text => BlockProps::Text(TextProps::default()),
        BlockType::FeatureGrid => BlockProps::FeatureGrid(FeatureGridProps::default()),
        BlockType::Card => BlockProps::Card(CardProps::default()),
        BlockType::ImageText => BlockProps::ImageText(ImageTextProps::default()),
        BlockType::ContactForm => BlockProps::ContactForm(ContactFormProps::default()),
    }
}

pub fn defaults_for(tag: &str) -> CmsResult<BlockProps> {
    lookup(tag).map(defaults)
}

pub fn editable_elements_for(block_type: BlockType) -> &'static [EditableElementDef] {
    schema(block_type).editable
}

/// Match a concrete path against the type's editable elements.
pub fn resolve_path(
    block_type: BlockType,
    path: &PropPath,
) -> CmsResult<&'static EditableElementDef> {
    editable_elements_for(block_type)
        .iter()
        .find(|def| path.matches_pattern(def.path))
        .ok_or_else(|| CmsError::invalid_path(block_type.as_str(), path.as_str()))
}

/// An element is a leaf when no other editable element of the type lives
/// beneath it. Only leaves receive click targets in edit mode.
pub fn is_leaf(block_type: BlockType, def: &EditableElementDef) -> bool {
    let prefix = format!("{}.", def.path);
    !editable_elements_for(block_type)
        .iter()
        .any(|other| other.path.starts_with(&prefix))
}

// ============================================================================
// Validation
// ============================================================================

/// Structural check of `props` against the schema for `tag`.
pub fn validate(tag: &str, props: &Value) -> CmsResult<()> {
    let block_type = lookup(tag)?;
    validate_props(block_type, props).map_err(CmsError::Validation)
}

pub fn validate_props(block_type: BlockType, props: &Value) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    validate_fields(schema(block_type).fields, props, "", &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn validate_fields(
    fields: &[FieldSpec],
    value: &Value,
    prefix: &str,
    errors: &mut Vec<ValidationError>,
) {
    let Some(obj) = value.as_object() else {
        errors.push(ValidationError::new(prefix, "must be an object"));
        return;
    };

    for field in fields {
        let path = join_path(prefix, field.name);
        match (obj.get(field.name), field.presence) {
            (None, Presence::Required) | (Some(Value::Null), Presence::Required) => {
                errors.push(ValidationError::new(path, "is required"));
            }
            (Some(Value::Null), Presence::Defaulted) => {
                errors.push(ValidationError::new(path, "must not be null"));
            }
            (None, _) | (Some(Value::Null), Presence::Optional) => {}
            (Some(v), _) => check_kind(field.kind, v, &path, errors),
        }
    }
}

fn check_kind(kind: FieldKind, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    match kind {
        FieldKind::Text | FieldKind::RichText | FieldKind::Link | FieldKind::Media => {
            if !value.is_string() {
                errors.push(ValidationError::new(path, "must be a string"));
            }
        }
        FieldKind::Bool => {
            if !value.is_boolean() {
                errors.push(ValidationError::new(path, "must be a boolean"));
            }
        }
        FieldKind::Enum(options) => match value.as_str() {
            Some(s) if options.contains(&s) => {}
            _ => errors.push(ValidationError::new(
                path,
                format!("must be one of: {}", options.join(", ")),
            )),
        },
        FieldKind::Integer { min, max } => match value.as_i64() {
            Some(n) if (min..=max).contains(&n) => {}
            _ => errors.push(ValidationError::new(
                path,
                format!("must be an integer between {} and {}", min, max),
            )),
        },
        FieldKind::List(item_fields) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    validate_fields(item_fields, item, &format!("{}.{}", path, i), errors);
                }
            }
            None => errors.push(ValidationError::new(path, "must be a list")),
        },
    }
}

/// Validate then convert untyped props into the typed variant.
pub fn build_props(block_type: BlockType, props: Value) -> CmsResult<BlockProps> {
    validate_props(block_type, &props).map_err(CmsError::Validation)?;
    BlockProps::from_value(block_type, props)
        .map_err(|e| CmsError::Validation(vec![ValidationError::new("", e.to_string())]))
}

// ============================================================================
// Catalog
// ============================================================================

/// Inspector-facing description of one block type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTypeInfo {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub label: &'static str,
    pub defaults: Value,
    pub editable_elements: Vec<EditableElementDef>,
}

static CATALOG: Lazy<Vec<BlockTypeInfo>> = Lazy::new(|| {
    BlockType::ALL
        .iter()
        .map(|&block_type| {
            let schema = schema(block_type);
            BlockTypeInfo {
                block_type,
                label: schema.label,
                defaults: defaults(block_type).to_value(),
                editable_elements: schema.editable.to_vec(),
            }
        })
        .collect()
});

pub fn catalog() -> &'static [BlockTypeInfo] {
    &CATALOG
}
