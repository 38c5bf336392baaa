//! Server-side HTML rendering of blocks and pages.
//!
//! Rendering never fails: invalid blocks and unknown types produce visible
//! placeholders, and a missing payload renders with its defaults.

mod html;
mod sections;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::carousel::Autoplay;
use super::{Block, BlockKind};
use crate::pages::Page;

pub const INVALID_BLOCK: &str = "Bloco inválido ou tipo não especificado";
pub const MISSING_VIDEO: &str = "ID do vídeo não especificado";

pub fn unsupported_message(tag: &str) -> String {
    format!("Bloco não suportado: {tag}")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Live,
    Editing,
}

/// A published page the menu links to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLink {
    pub id: String,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub site_id: String,
    pub page_id: Option<String>,
    pub mode: RenderMode,
    /// Published pages of the site, in creation order.
    pub site_pages: Vec<PageLink>,
    /// Active carousel position by block id.
    pub carousel_index: HashMap<String, usize>,
    pub maps_api_key: Option<String>,
}

impl RenderContext {
    pub fn new(site_id: impl Into<String>, mode: RenderMode) -> Self {
        Self {
            site_id: site_id.into(),
            mode,
            ..Self::default()
        }
    }

    pub fn with_pages(mut self, pages: Vec<PageLink>) -> Self {
        self.site_pages = pages;
        self
    }

    pub fn with_maps_key(mut self, key: Option<String>) -> Self {
        self.maps_api_key = key;
        self
    }

    pub fn carousel_position(&self, block_id: &str) -> usize {
        self.carousel_index.get(block_id).copied().unwrap_or(0)
    }

    pub fn is_editing(&self) -> bool {
        self.mode == RenderMode::Editing
    }
}

/// Slide count and effective autoplay of a carousel block in `mode`.
///
/// Slideshows do not autoplay while being edited; testimonials do.
pub fn carousel_of(kind: &BlockKind, mode: RenderMode) -> Option<(usize, Autoplay)> {
    match kind {
        BlockKind::Testimonials(t) => Some((
            t.items.len(),
            Autoplay::new(t.settings.autoplay, t.settings.interval),
        )),
        BlockKind::Slide(s) => {
            let enabled = s.settings.autoplay && mode == RenderMode::Live;
            Some((s.slides.len(), Autoplay::new(enabled, s.settings.interval)))
        }
        _ => None,
    }
}

/// HTML for one block, wrapped in an element carrying its id and type.
pub fn render_block(block: &Block, ctx: &RenderContext) -> String {
    let kind = block.kind();
    let tag = match &kind {
        BlockKind::Invalid => "invalid",
        BlockKind::Unsupported(_) => "unsupported",
        _ => block.type_tag().unwrap_or("invalid"),
    };
    let id = block.id_str();
    let body = match &kind {
        BlockKind::Hero(hero) => sections::hero(hero),
        BlockKind::Features(features) => sections::features(features),
        BlockKind::Testimonials(t) => sections::testimonials(t, id, ctx),
        BlockKind::Contact(contact) => sections::contact(contact, id, ctx),
        BlockKind::Slide(slide) => sections::slide(slide, id, ctx),
        BlockKind::Menu(menu) => sections::menu(menu, ctx),
        BlockKind::RichText(text) => sections::rich_text(text),
        BlockKind::Columns(columns) => sections::columns(columns),
        BlockKind::Footer(footer) => sections::footer(footer),
        BlockKind::YouTube(video) => sections::youtube(video),
        BlockKind::Divider(divider) => sections::divider(divider),
        BlockKind::Icons(icons) => sections::icons(icons),
        BlockKind::Buttons(buttons) => sections::buttons(buttons),
        BlockKind::GoogleMap(map) => sections::google_map(map, ctx),
        BlockKind::Unsupported(tag) => sections::notice(&unsupported_message(tag)),
        BlockKind::Invalid => sections::notice(INVALID_BLOCK),
    };
    format!(
        "<section class=\"cms-block cms-block--{}\" id=\"block-{}\" data-block-id=\"{}\">{}</section>",
        html::escape(tag),
        html::escape(id),
        html::escape(id),
        body
    )
}

pub fn render_blocks(blocks: &[Block], ctx: &RenderContext) -> String {
    blocks.iter().map(|block| render_block(block, ctx)).collect()
}

/// A complete HTML document for `page`, styled from its page settings.
pub fn render_page(page: &Page, ctx: &RenderContext) -> String {
    let settings = &page.settings;
    let background = &settings.background;
    let image = background
        .image
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .map(html::css_url)
        .unwrap_or_else(|| "none".to_string());
    let color = if background.color.trim().is_empty() {
        "#ffffff"
    } else {
        background.color.as_str()
    };
    let style = html::Style::new()
        .set("padding", settings.spacing.padding.shorthand())
        .set("margin", settings.spacing.margin.shorthand())
        .set("background-color", color)
        .set("background-image", image)
        .set("background-position", &background.position)
        .set("background-repeat", &background.repeat)
        .set("background-size", &background.size);

    let description = page.meta_description.as_deref().unwrap_or_default();
    format!(
        concat!(
            "<!DOCTYPE html><html lang=\"pt-BR\"><head><meta charset=\"utf-8\">",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
            "<title>{title}</title><meta name=\"description\" content=\"{description}\">",
            "</head><body><main class=\"cms-page cms-layout--{layout}\" data-page-id=\"{page_id}\"{style}>",
            "{blocks}</main></body></html>"
        ),
        title = html::escape(page.document_title()),
        description = html::escape(description),
        layout = html::escape(&settings.layout),
        page_id = page.id,
        style = style.attr(),
        blocks = render_blocks(&page.blocks, ctx),
    )
}

/// Document shown when a public page does not exist or is unpublished.
pub fn render_not_found() -> String {
    concat!(
        "<!DOCTYPE html><html lang=\"pt-BR\"><head><meta charset=\"utf-8\">",
        "<title>Página não encontrada</title></head><body>",
        "<div class=\"flex items-center justify-center min-h-screen\">",
        "<p class=\"text-red-600\">Página não encontrada</p></div></body></html>"
    )
    .to_string()
}

/// Document answering a contact form posted without scripting: the notice
/// and a link back to the page the visitor came from.
pub fn render_submission_result(message: &str, success: bool, back: Option<&str>) -> String {
    let color = if success { "text-green-600" } else { "text-red-600" };
    let back = back
        .filter(|url| !url.trim().is_empty())
        .map(|url| format!("<a href=\"{}\" class=\"underline\">Voltar</a>", html::url(url)))
        .unwrap_or_default();
    format!(
        concat!(
            "<!DOCTYPE html><html lang=\"pt-BR\"><head><meta charset=\"utf-8\">",
            "<title>{message}</title></head><body>",
            "<div class=\"flex flex-col items-center justify-center min-h-screen gap-4\">",
            "<p class=\"{color}\">{message}</p>{back}</div></body></html>"
        ),
        message = html::escape(message),
        color = color,
        back = back,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{BlockType, schema};
    use crate::pages::PageSettings;
    use chrono::Utc;
    use serde_json::json;
    use strum::IntoEnumIterator;
    use uuid::Uuid;

    fn live() -> RenderContext {
        RenderContext::new("site-1", RenderMode::Live)
    }

    #[test]
    fn test_every_type_renders_with_only_a_type() {
        for block_type in BlockType::iter() {
            let block = Block::from(json!({"id": "b", "type": block_type.to_string()}));
            let out = render_block(&block, &live());
            assert!(
                out.contains(&format!("cms-block--{block_type}")),
                "{block_type}: {out}"
            );
            assert!(!out.contains(INVALID_BLOCK));
        }
    }

    #[test]
    fn test_every_starter_block_renders() {
        for block_type in BlockType::iter() {
            let out = render_block(&Block::new(block_type), &live());
            assert!(out.starts_with("<section"), "{block_type}");
        }
    }

    #[test]
    fn test_invalid_and_unsupported_placeholders() {
        let invalid = render_block(&Block::from(json!({"id": "x"})), &live());
        assert!(invalid.contains(INVALID_BLOCK));

        let unsupported = render_block(&Block::from(json!({"id": "x", "type": "marquee"})), &live());
        assert!(unsupported.contains("Bloco não suportado: marquee"));
    }

    #[test]
    fn test_text_is_escaped() {
        let block = Block::from(json!({
            "type": "hero",
            "content": {"title": "<script>alert(1)</script>"}
        }));
        let out = render_block(&block, &live());
        assert!(!out.contains("<script>"));
        assert!(out.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_slide_autoplay_suppressed_while_editing() {
        let slide = Block::from(json!({
            "type": "slide",
            "settings": {"autoplay": true},
            "slides": [{"id": "1"}, {"id": "2"}]
        }));
        let kind = slide.kind();
        assert!(carousel_of(&kind, RenderMode::Live).unwrap().1.enabled);
        assert!(!carousel_of(&kind, RenderMode::Editing).unwrap().1.enabled);

        let testimonials = Block::from(json!({
            "type": "testimonials",
            "settings": {"autoplay": true},
            "items": [{}, {}]
        }));
        assert!(carousel_of(&testimonials.kind(), RenderMode::Editing).unwrap().1.enabled);
        assert!(carousel_of(&Block::new(BlockType::Hero).kind(), RenderMode::Live).is_none());
    }

    #[test]
    fn test_render_page_applies_settings_and_meta() {
        let mut settings = PageSettings::default();
        settings.background.color = "#123456".into();
        let page = Page {
            id: Uuid::new_v4(),
            site_id: Uuid::new_v4(),
            template_id: None,
            title: "Início".into(),
            slug: "inicio".into(),
            blocks: vec![Block::new(BlockType::Divider)],
            is_published: true,
            meta_title: Some("Bem-vindo".into()),
            meta_description: Some("Descrição & mais".into()),
            settings,
            author_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let out = render_page(&page, &live());
        assert!(out.contains("<title>Bem-vindo</title>"));
        assert!(out.contains("Descrição &amp; mais"));
        assert!(out.contains("background-color:#123456"));
        assert!(out.contains("padding:0 0 0 0"));
        assert!(out.contains("cms-block--divider"));
    }

    #[test]
    fn test_contact_starter_fields_render() {
        let block = Block::from(json!({
            "type": "contact",
            "fields": serde_json::to_value(schema::default_contact_fields()).unwrap()
        }));
        let out = render_block(&block, &live());
        assert!(out.contains("name=\"email\""));
        assert!(out.contains("<textarea"));
        assert!(out.contains("/api/sites/site-1/leads"));
        assert!(!out.contains("name=\"page_id\""));
    }

    #[test]
    fn test_contact_form_posts_its_block_context() {
        let mut ctx = live();
        ctx.page_id = Some("page-9".into());
        let block = Block::from(json!({"id": "form-1", "type": "contact"}));
        let out = render_block(&block, &ctx);
        assert!(out.contains("<input type=\"hidden\" name=\"page_id\" value=\"page-9\">"));
        assert!(out.contains("<input type=\"hidden\" name=\"block_id\" value=\"form-1\">"));
        assert!(out.contains("application/x-www-form-urlencoded"));
    }

    #[test]
    fn test_submission_result_escapes_and_links_back() {
        let out = render_submission_result("Erro <x>", false, Some("/sites/s/p/contato"));
        assert!(out.contains("Erro &lt;x&gt;"));
        assert!(out.contains("text-red-600"));
        assert!(out.contains("href=\"/sites/s/p/contato\""));
        assert!(!render_submission_result("ok", true, None).contains("<a "));
    }
}
