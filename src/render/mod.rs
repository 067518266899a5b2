//! Block renderer: ordered blocks + render context -> HTML.
//!
//! Rendering is a pure function of its inputs apart from the edit-hook
//! callback, which is invoked once per editable leaf element when the
//! context is in edit mode.

mod sections;
pub mod html;
pub mod media;

use chrono::Datelike;
use serde::Serialize;
use std::sync::Arc;

use crate::blocks::path::PropPath;
use crate::blocks::{registry, Block, BlockType, StoredBlock};
use crate::page::Page;
use crate::theme::{Brand, RenderContext};
use html::escape_html;
pub use media::{MediaResolver, PublicMediaResolver};

/// Click target reported to the editor for one editable element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditHook {
    pub block_id: String,
    /// Concrete dot-path into the block's props.
    pub element_path: String,
    /// Editable element definition id from the registry.
    pub element_id: String,
    /// DOM id of the element carrying the hook.
    pub anchor: String,
}

/// Rendered content area plus the edit hooks emitted while rendering it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderedBlocks {
    pub html: String,
    pub hooks: Vec<EditHook>,
}

pub struct Renderer {
    media: Arc<dyn MediaResolver>,
}

impl Renderer {
    pub fn new(media: Arc<dyn MediaResolver>) -> Self {
        Self { media }
    }

    /// Render blocks in the given order, reporting edit hooks to `on_hook`.
    pub fn render_with<'b, I>(
        &self,
        blocks: I,
        ctx: &RenderContext,
        on_hook: &mut dyn FnMut(EditHook),
    ) -> String
    where
        I: IntoIterator<Item = &'b Block>,
    {
        let mut out = format!(
            "<main class=\"cms-content brand-{}\" data-brand=\"{}\">",
            ctx.brand, ctx.brand
        );
        for block in blocks {
            let mut scope = BlockScope {
                block,
                ctx,
                media: self.media.as_ref(),
                on_hook: &mut *on_hook,
            };
            out.push_str(&sections::render_block(&mut scope));
        }
        out.push_str("</main>");
        out
    }

    pub fn render<'b, I>(&self, blocks: I, ctx: &RenderContext) -> RenderedBlocks
    where
        I: IntoIterator<Item = &'b Block>,
    {
        let mut hooks = Vec::new();
        let html = self.render_with(blocks, ctx, &mut |hook| hooks.push(hook));
        RenderedBlocks { html, hooks }
    }

    /// Render untrusted, untyped blocks. Rows with an unknown type or
    /// invalid props are skipped so one bad block cannot blank the page.
    pub fn render_stored(&self, stored: &[StoredBlock], ctx: &RenderContext) -> RenderedBlocks {
        let blocks: Vec<Block> = stored
            .iter()
            .cloned()
            .filter_map(|row| {
                let id = row.id.clone();
                Block::from_stored(row)
                    .map_err(|e| tracing::debug!(block_id = %id, error = %e, "skipping block"))
                    .ok()
            })
            .collect();
        self.render(&blocks, ctx)
    }

    /// Full HTML document: page chrome around the rendered content area.
    pub fn render_page<'b, I>(&self, page: &Page, blocks: I, ctx: &RenderContext) -> String
    where
        I: IntoIterator<Item = &'b Block>,
    {
        let content = self.render_with(blocks, ctx, &mut |_| {});
        document_shell(&page.title, ctx, &content)
    }

    /// Chrome-only page for 404/503 responses.
    pub fn render_status_page(&self, ctx: &RenderContext, title: &str, message: &str) -> String {
        let content = format!(
            "<main class=\"cms-content brand-{}\"><section class=\"cms-block cms-status\">\
             <div class=\"cms-container\"><h1>{}</h1><p>{}</p></div></section></main>",
            ctx.brand,
            escape_html(title),
            escape_html(message)
        );
        document_shell(title, ctx, &content)
    }
}

fn document_shell(title: &str, ctx: &RenderContext, content: &str) -> String {
    let brand_name = ctx.brand.display_name();
    format!(
        r#"<!DOCTYPE html>
<html lang="de">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | {brand_name}</title>
<style>:root {{ {tokens} }} body {{ margin: 0; background: var(--color-background); color: var(--color-text); font-family: var(--font-body); }}</style>
</head>
<body class="brand-{brand}">
<header class="site-header"><a class="site-brand" href="/{brand}">{brand_name}</a></header>
{content}
<footer class="site-footer">&copy; {year} {brand_name}</footer>
</body>
</html>"#,
        title = escape_html(title),
        brand_name = brand_name,
        tokens = ctx.theme.to_css_declarations(),
        brand = ctx.brand,
        content = content,
        year = chrono::Utc::now().year(),
    )
}

/// Rendering state for one block.
pub(crate) struct BlockScope<'a, 'h> {
    pub block: &'a Block,
    pub ctx: &'a RenderContext,
    pub media: &'a dyn MediaResolver,
    pub on_hook: &'a mut (dyn FnMut(EditHook) + 'h),
}

impl BlockScope<'_, '_> {
    pub fn block_type(&self) -> BlockType {
        self.block.block_type()
    }

    pub fn brand(&self) -> Brand {
        self.ctx.brand
    }

    /// Attributes for the block's outer element.
    pub fn block_attrs(&self) -> String {
        format!(
            " data-block-id=\"{}\" data-block-type=\"{}\"",
            escape_html(self.block.id()),
            self.block_type()
        )
    }

    /// Edit attributes for the element rendering `path`. Emits a hook only in
    /// edit mode and only for leaf elements, so click targets never nest.
    pub fn edit_attrs(&mut self, path: &str) -> String {
        if !self.ctx.editable {
            return String::new();
        }
        let block_type = self.block_type();
        let Some(prop_path) = PropPath::parse(path) else {
            return String::new();
        };
        let def = match registry::resolve_path(block_type, &prop_path) {
            Ok(def) if registry::is_leaf(block_type, def) => def,
            _ => return String::new(),
        };

        let anchor = anchor_for(self.block.id(), path);
        let attrs = format!(
            " id=\"{}\" data-cms-block=\"{}\" data-cms-path=\"{}\"",
            escape_html(&anchor),
            escape_html(self.block.id()),
            escape_html(path)
        );
        (self.on_hook)(EditHook {
            block_id: self.block.id().to_string(),
            element_path: path.to_string(),
            element_id: def.id.to_string(),
            anchor,
        });
        attrs
    }

    /// Empty stand-in for an unset optional field so the editor can still
    /// select it. Nothing is emitted outside edit mode.
    pub fn placeholder(&mut self, tag: &str, class: &str, path: &str) -> String {
        if !self.ctx.editable {
            return String::new();
        }
        let attrs = self.edit_attrs(path);
        format!(
            "<{} class=\"{} cms-placeholder\" data-cms-empty{}></{}>",
            tag, class, attrs, tag
        )
    }

    /// Hidden hook target for a setting that has no element of its own,
    /// such as an alignment, a link target or a toggle. Edit mode only.
    pub fn setting(&mut self, path: &str) -> String {
        if !self.ctx.editable {
            return String::new();
        }
        let attrs = self.edit_attrs(path);
        format!("<span class=\"cms-setting\" hidden{}></span>", attrs)
    }

    pub fn media_url(&self, reference: Option<&str>) -> Option<String> {
        reference.and_then(|r| self.media.resolve(r))
    }
}

/// DOM id of a hooked element. Block id bytes outside `[A-Za-z0-9-]` are
/// written as `_xx`, so `__` only ever appears as the separator and paths
/// (registry keys and indices) never contain `-` before the dots are mapped.
fn anchor_for(block_id: &str, path: &str) -> String {
    let mut anchor = String::from("cms-");
    for byte in block_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            anchor.push(char::from(byte));
        } else {
            anchor.push_str(&format!("_{:02x}", byte));
        }
    }
    anchor.push_str("__");
    anchor.push_str(&path.replace('.', "-"));
    anchor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BlockDocument;
    use serde_json::json;
    use uuid::Uuid;

    fn renderer() -> Renderer {
        Renderer::new(Arc::new(PublicMediaResolver::new("https://media.example.de")))
    }

    #[test]
    fn test_empty_list_renders_empty_content_area() {
        let ctx = RenderContext::public(Brand::Physiotherapy);
        let rendered = renderer().render(&[], &ctx);
        assert_eq!(
            rendered.html,
            "<main class=\"cms-content brand-physiotherapy\" data-brand=\"physiotherapy\"></main>"
        );
        assert!(rendered.hooks.is_empty());
    }

    #[test]
    fn test_blocks_render_in_given_order() {
        let mut doc = BlockDocument::new(Uuid::new_v4());
        doc.insert(0, "text").unwrap();
        doc.insert(0, "hero").unwrap();
        let ctx = RenderContext::public(Brand::Physiotherapy);
        let html = renderer().render(doc.to_ordered_list(), &ctx).html;
        let hero = html.find("cms-hero").unwrap();
        let text = html.find("cms-text").unwrap();
        assert!(hero < text);
    }

    #[test]
    fn test_public_mode_emits_no_hooks() {
        let mut doc = BlockDocument::new(Uuid::new_v4());
        doc.insert(0, "hero").unwrap();
        let ctx = RenderContext::public(Brand::PhysioKonzept);
        let rendered = renderer().render(doc.to_ordered_list(), &ctx);
        assert!(rendered.hooks.is_empty());
        assert!(!rendered.html.contains("data-cms-path"));
    }

    #[test]
    fn test_edit_mode_hooks_are_unique_leaves() {
        let mut doc = BlockDocument::new(Uuid::new_v4());
        doc.insert(0, "feature-grid").unwrap();
        let ctx = RenderContext::editor(Brand::Physiotherapy);
        let rendered = renderer().render(doc.to_ordered_list(), &ctx);

        let paths: Vec<&str> = rendered.hooks.iter().map(|h| h.element_path.as_str()).collect();
        assert!(paths.contains(&"title"));
        assert!(paths.contains(&"items.2.description"));
        assert!(!paths.contains(&"items"));

        let mut anchors: Vec<&str> = rendered.hooks.iter().map(|h| h.anchor.as_str()).collect();
        anchors.sort_unstable();
        anchors.dedup();
        assert_eq!(anchors.len(), rendered.hooks.len());
        for hook in &rendered.hooks {
            assert!(rendered.html.contains(&format!("id=\"{}\"", hook.anchor)));
        }
    }

    #[test]
    fn test_anchor_keeps_block_and_path_apart() {
        assert_eq!(anchor_for("blk", "content"), "cms-blk__content");
        assert_ne!(anchor_for("a-b", "c"), anchor_for("a", "b.c"));
        assert_ne!(anchor_for("a__b", "c"), anchor_for("a", "b__c"));
        assert_ne!(anchor_for("x.y", "title"), anchor_for("x-y", "title"));
        assert_eq!(anchor_for("a b", "title"), "cms-a_20b__title");
    }

    #[test]
    fn test_anchors_differ_for_colliding_block_ids() {
        let blocks = [
            Block::from_stored(StoredBlock {
                id: "a-items-0".into(),
                block_type: "card".into(),
                props: json!({"title": "Kurs"}),
                sort: 0,
            })
            .unwrap(),
            Block::from_stored(StoredBlock {
                id: "a".into(),
                block_type: "feature-grid".into(),
                props: json!({"items": [{"title": "Eins"}]}),
                sort: 1,
            })
            .unwrap(),
        ];
        let ctx = RenderContext::editor(Brand::Physiotherapy);
        let rendered = renderer().render(&blocks, &ctx);

        let mut anchors: Vec<&str> = rendered.hooks.iter().map(|h| h.anchor.as_str()).collect();
        let total = anchors.len();
        anchors.sort_unstable();
        anchors.dedup();
        assert_eq!(anchors.len(), total);
    }

    #[test]
    fn test_plain_text_is_escaped() {
        let mut doc = BlockDocument::new(Uuid::new_v4());
        let id = doc.insert(0, "hero").unwrap();
        doc.patch(&id, "headline", json!("<b>Rücken & Nacken</b>")).unwrap();
        let ctx = RenderContext::public(Brand::Physiotherapy);
        let html = renderer().render(doc.to_ordered_list(), &ctx).html;
        assert!(html.contains("&lt;b&gt;Rücken &amp; Nacken&lt;/b&gt;"));
    }

    #[test]
    fn test_render_stored_skips_bad_rows() {
        let rows = vec![
            StoredBlock {
                id: "a".into(),
                block_type: "text".into(),
                props: json!({"content": "<p>eins</p>"}),
                sort: 0,
            },
            StoredBlock {
                id: "b".into(),
                block_type: "nonexistent-block".into(),
                props: json!({}),
                sort: 1,
            },
            StoredBlock {
                id: "c".into(),
                block_type: "hero".into(),
                props: json!({"alignment": "left"}),
                sort: 2,
            },
        ];
        let ctx = RenderContext::public(Brand::Physiotherapy);
        let html = renderer().render_stored(&rows, &ctx).html;
        assert!(html.contains("eins"));
        assert!(!html.contains("data-block-id=\"b\""));
        assert!(!html.contains("data-block-id=\"c\""));
    }

    #[test]
    fn test_theme_tokens_drive_styling() {
        let mut doc = BlockDocument::new(Uuid::new_v4());
        doc.insert(0, "hero").unwrap();
        let physio = renderer()
            .render(doc.to_ordered_list(), &RenderContext::public(Brand::Physiotherapy))
            .html;
        let konzept = renderer()
            .render(doc.to_ordered_list(), &RenderContext::public(Brand::PhysioKonzept))
            .html;
        assert!(physio.contains("var(--hero-gradient)"));
        assert!(konzept.contains("var(--hero-overlay)"));
        assert!(!physio.contains("#0f766e"));
    }
}
