//! One renderer per block type.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use super::html::{self, apply_paint, escape, Style};
use super::{carousel_of, RenderContext, MISSING_VIDEO};
use crate::blocks::contact::{ERROR_MESSAGE, SUCCESS_MESSAGE};
use crate::blocks::icons::Icon;
use crate::blocks::schema::{
    Buttons, Columns, Contact, Divider, Features, Footer, GoogleMap, Hero, IconGrid, LinkButton,
    Menu, RichText, Slide, Testimonials, YouTube,
};
use crate::blocks::BlockKind;

pub(super) fn notice(message: &str) -> String {
    format!(
        "<div class=\"p-4 bg-red-50 text-red-600 rounded-lg\">{}</div>",
        escape(message)
    )
}

fn button_class(style: &str) -> &'static str {
    match style {
        "secondary" => "btn btn-secondary",
        "outline" => "btn btn-outline",
        _ => "btn btn-primary",
    }
}

fn link_button(button: &LinkButton) -> String {
    if button.text.trim().is_empty() {
        return String::new();
    }
    format!(
        "<a href=\"{}\" class=\"{}\">{}</a>",
        html::url(&button.url),
        button_class(&button.style),
        escape(&button.text)
    )
}

pub(super) fn hero(hero: &Hero) -> String {
    let bg = &hero.background;
    let style = Style::new()
        .set("height", &hero.settings.height)
        .set_if(bg.is_image(), "background-image", html::css_url(&bg.url))
        .set("background-position", &bg.position)
        .set("background-size", &bg.size)
        .set("position", "relative");
    let overlay = if hero.settings.overlay {
        let overlay_style = Style::new().set("background-color", &hero.settings.overlay_color);
        format!("<div class=\"absolute inset-0\"{}></div>", overlay_style.attr())
    } else {
        String::new()
    };
    let subtitle = if hero.content.subtitle.is_empty() {
        String::new()
    } else {
        format!(
            "<p class=\"text-xl mb-8\">{}</p>",
            escape(&hero.content.subtitle)
        )
    };
    format!(
        "<div class=\"relative flex items-center justify-center\"{style}>{overlay}\
         <div class=\"relative z-10 container mx-auto px-4 {align}\">\
         <h1 class=\"text-5xl font-bold mb-4\">{title}</h1>{subtitle}{button}</div></div>",
        style = style.attr(),
        align = html::text_align(&hero.settings.alignment),
        title = escape(&hero.content.title),
        button = link_button(&hero.content.button),
    )
}

pub(super) fn features(features: &Features) -> String {
    let columns = features.settings.columns.max(1);
    let style = Style::new()
        .set(
            "grid-template-columns",
            format!("repeat({columns}, minmax(0, 1fr))"),
        )
        .set("gap", &features.settings.gap);
    let items: String = features
        .items
        .iter()
        .map(|item| {
            format!(
                "<div class=\"text-center\">\
                 <div class=\"inline-flex items-center justify-center w-16 h-16 mb-4 rounded-full bg-blue-100\">{}</div>\
                 <h3 class=\"text-xl font-semibold mb-2\">{}</h3>\
                 <p class=\"text-gray-600\">{}</p></div>",
                html::icon(Icon::from_name(&item.icon), "w-8 h-8 text-blue-600"),
                escape(&item.title),
                escape(&item.description)
            )
        })
        .collect();
    format!(
        "<div class=\"py-16 px-4\"><div class=\"grid max-w-6xl mx-auto\"{}>{}</div></div>",
        style.attr(),
        items
    )
}

fn carousel_attrs(block_id: &str, kind: &BlockKind, ctx: &RenderContext) -> (usize, String) {
    let (len, autoplay) = carousel_of(kind, ctx.mode).unwrap_or((0, super::Autoplay::OFF));
    let active = ctx.carousel_position(block_id).min(len.saturating_sub(1));
    let attrs = format!(
        " data-carousel=\"{}\" data-autoplay=\"{}\" data-interval=\"{}\" data-active=\"{}\"",
        escape(block_id),
        autoplay.should_run(len),
        autoplay.interval.as_millis(),
        active
    );
    (active, attrs)
}

pub(super) fn testimonials(t: &Testimonials, block_id: &str, ctx: &RenderContext) -> String {
    let (active, attrs) = carousel_attrs(block_id, &BlockKind::Testimonials(t.clone()), ctx);
    let slides: String = t
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let visibility = if index == active {
                "opacity-100"
            } else {
                "opacity-0 absolute inset-0"
            };
            let photo = if item.image.is_empty() {
                String::new()
            } else {
                format!(
                    "<img src=\"{}\" alt=\"{}\" class=\"w-20 h-20 rounded-full mx-auto mb-4 object-cover\">",
                    html::url(&item.image),
                    escape(&item.name)
                )
            };
            let role: Vec<&str> = [item.role.as_str(), item.company.as_str()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect();
            format!(
                "<div class=\"transition-opacity duration-500 {visibility}\" data-index=\"{index}\">\
                 <div class=\"text-center\">{photo}\
                 <blockquote class=\"text-xl italic text-gray-900 mb-4\">&ldquo;{text}&rdquo;</blockquote>\
                 <div class=\"font-medium\"><cite class=\"text-gray-900 not-italic\">{name}</cite>\
                 <p class=\"text-gray-600\">{role}</p></div></div></div>",
                text = escape(&item.text),
                name = escape(&item.name),
                role = escape(&role.join(", ")),
            )
        })
        .collect();
    format!(
        "<div class=\"py-16 px-4 bg-gray-50\"{attrs}><div class=\"max-w-4xl mx-auto\">\
         <div class=\"relative\">{slides}</div>{dots}</div></div>",
        dots = dots(t.items.len(), active)
    )
}

fn dots(len: usize, active: usize) -> String {
    if len < 2 {
        return String::new();
    }
    let buttons: String = (0..len)
        .map(|index| {
            let color = if index == active { "bg-blue-600" } else { "bg-gray-300" };
            format!(
                "<button type=\"button\" class=\"w-3 h-3 rounded-full {color}\" data-go-to=\"{index}\"></button>"
            )
        })
        .collect();
    format!("<div class=\"flex justify-center mt-8 space-x-2\">{buttons}</div>")
}

pub(super) fn slide(slide: &Slide, block_id: &str, ctx: &RenderContext) -> String {
    let (active, attrs) = carousel_attrs(block_id, &BlockKind::Slide(slide.clone()), ctx);
    let settings = &slide.settings;
    let frames: String = slide
        .slides
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let visibility = if index == active { "opacity-100" } else { "opacity-0" };
            let style = Style::new()
                .set_if(
                    !item.image_url.is_empty(),
                    "background-image",
                    html::css_url(&item.image_url),
                )
                .set("background-size", "cover")
                .set("background-position", "center");
            let overlay = if settings.overlay {
                format!(
                    "<div class=\"absolute inset-0\"{}></div>",
                    Style::new().set("background-color", &settings.overlay_color).attr()
                )
            } else {
                String::new()
            };
            let subtitle = if item.subtitle.is_empty() {
                String::new()
            } else {
                format!("<p class=\"text-xl mb-8\">{}</p>", escape(&item.subtitle))
            };
            let button = if item.button_text.is_empty() || item.button_url.is_empty() {
                String::new()
            } else {
                format!(
                    "<a href=\"{}\" class=\"btn btn-primary\">{}</a>",
                    html::url(&item.button_url),
                    escape(&item.button_text)
                )
            };
            format!(
                "<div class=\"absolute inset-0 transition-opacity duration-500 {visibility}\" data-index=\"{index}\" data-slide-id=\"{id}\"{style}>\
                 {overlay}<div class=\"relative z-10 h-full flex items-center justify-center text-center text-white px-4\">\
                 <div><h2 class=\"text-4xl font-bold mb-4\">{title}</h2>{subtitle}{button}</div></div></div>",
                id = escape(&item.id),
                style = style.attr(),
                title = escape(&item.title),
            )
        })
        .collect();
    let controls = if slide.slides.len() > 1 {
        concat!(
            "<button type=\"button\" class=\"absolute left-4 top-1/2 z-20\" data-carousel-prev>",
            "<i data-lucide=\"chevron-left\"></i></button>",
            "<button type=\"button\" class=\"absolute right-4 top-1/2 z-20\" data-carousel-next>",
            "<i data-lucide=\"chevron-right\"></i></button>"
        )
    } else {
        ""
    };
    format!(
        "<div class=\"relative overflow-hidden\"{attrs}{style}>{frames}{controls}{dots}</div>",
        style = Style::new().set("height", &settings.height).attr(),
        dots = dots(slide.slides.len(), active)
    )
}

pub(super) fn contact(contact: &Contact, block_id: &str, ctx: &RenderContext) -> String {
    let inline = contact.settings.layout == "inline";
    let fields: String = contact
        .fields
        .iter()
        .filter(|field| !field.name.is_empty())
        .map(|field| {
            let input_id = format!("{}-{}", block_id, field.name);
            let required = if field.required { " required" } else { "" };
            let marker = if field.required {
                "<span class=\"text-red-500\"> *</span>"
            } else {
                ""
            };
            let control = if field.is_textarea() {
                format!(
                    "<textarea id=\"{id}\" name=\"{name}\" rows=\"4\" class=\"w-full px-3 py-2 border border-gray-300 rounded-md\"{required}></textarea>",
                    id = escape(&input_id),
                    name = escape(&field.name),
                )
            } else {
                format!(
                    "<input type=\"{kind}\" id=\"{id}\" name=\"{name}\" class=\"w-full px-3 py-2 border border-gray-300 rounded-md\"{required}>",
                    kind = field.input_type(),
                    id = escape(&input_id),
                    name = escape(&field.name),
                )
            };
            format!(
                "<div class=\"{wrap}\"><label for=\"{id}\" class=\"block text-sm font-medium text-gray-700 mb-1\">{label}{marker}</label>{control}</div>",
                wrap = if inline { "flex-1" } else { "mb-4" },
                id = escape(&input_id),
                label = escape(&field.label),
            )
        })
        .collect();
    let layout = if inline { "flex gap-4 items-end" } else { "space-y-4" };
    let disabled = if ctx.is_editing() { " disabled" } else { "" };
    let page = ctx
        .page_id
        .as_deref()
        .map(|id| format!(" data-page-id=\"{}\"", escape(id)))
        .unwrap_or_default();
    // posted back with the answers so the server can apply this block's fields
    let context = ctx
        .page_id
        .as_deref()
        .map(|id| {
            format!(
                "<input type=\"hidden\" name=\"page_id\" value=\"{}\">\
                 <input type=\"hidden\" name=\"block_id\" value=\"{}\">",
                escape(id),
                escape(block_id)
            )
        })
        .unwrap_or_default();
    format!(
        "<div class=\"py-16 px-4\"><form class=\"max-w-xl mx-auto {layout}\" method=\"post\" \
         action=\"/api/sites/{site}/leads\" enctype=\"application/x-www-form-urlencoded\" \
         data-block-id=\"{block}\"{page} \
         data-success-message=\"{success}\" data-error-message=\"{error}\">{context}{fields}\
         <button type=\"submit\" class=\"{button}\"{disabled}>{text}</button></form></div>",
        site = escape(&ctx.site_id),
        block = escape(block_id),
        success = escape(SUCCESS_MESSAGE),
        error = escape(ERROR_MESSAGE),
        button = button_class(&contact.settings.submit_button.style),
        text = escape(&contact.settings.submit_button.text),
    )
}

pub(super) fn menu(menu: &Menu, ctx: &RenderContext) -> String {
    let settings = &menu.settings;
    let side = settings.position == "left" || settings.position == "right";
    let mut classes = vec!["cms-menu".to_string(), format!("cms-menu--{}", escape(&settings.position))];
    let mut style = Style::new()
        .set("position", &settings.style)
        .set("top", "0")
        .set(if settings.position == "right" { "right" } else { "left" }, "0")
        .set("width", if side { "300px" } else { "100%" })
        .set("height", if side { "100vh" } else { "auto" })
        .set("z-index", "50");
    style = apply_paint(&mut classes, style, "bg", "background-color", &settings.background_color);
    style = apply_paint(&mut classes, style, "text", "color", &settings.text_color);
    let (hover_class, hover_style) = match html::paint("hover:text", &settings.hover_color) {
        Some(html::Paint::Class(class)) => (class, Style::new()),
        Some(html::Paint::Css(color)) => (
            "hover:text-[var(--hover-color)]".to_string(),
            Style::new().set("--hover-color", color),
        ),
        None => (String::new(), Style::new()),
    };

    let logo = if settings.logo.url.is_empty() {
        String::new()
    } else {
        format!(
            "<a href=\"/\"><img src=\"{}\" alt=\"Logo\" class=\"object-contain\"{}></a>",
            html::url(&settings.logo.url),
            Style::new().set("height", &settings.logo.height).attr()
        )
    };

    let own = menu.items.iter().map(|item| {
        (item.id.clone(), item.label.clone(), item.url.clone(), item.is_anchor)
    });
    let pages = ctx.site_pages.iter().map(|page| {
        (
            page.id.clone(),
            page.title.clone(),
            format!("/sites/{}/p/{}", ctx.site_id, page.slug),
            false,
        )
    });
    let links: String = own
        .chain(pages)
        .map(|(id, label, url, anchor)| {
            format!(
                "<a href=\"{}\" class=\"transition-colors {}\"{} data-item-id=\"{}\"{}>{}</a>",
                html::url(&url),
                hover_class,
                hover_style.attr(),
                escape(&id),
                if anchor { " data-anchor=\"true\"" } else { "" },
                escape(&label)
            )
        })
        .collect();

    format!(
        "<nav class=\"{classes}\"{style}><div class=\"container mx-auto px-4\">\
         <div class=\"flex items-center justify-between h-16\">{logo}\
         <div class=\"flex-1 {text_align}\"><div class=\"flex items-center space-x-8 {justify}\">{links}</div></div>\
         </div></div><button type=\"button\" class=\"lg:hidden\" data-menu-toggle><i data-lucide=\"menu\"></i></button></nav>",
        classes = classes.join(" "),
        style = style.attr(),
        text_align = html::text_align(&settings.alignment),
        justify = html::justify(&settings.alignment),
    )
}

pub(super) fn rich_text(text: &RichText) -> String {
    let style = Style::new()
        .set("max-width", &text.settings.max_width)
        .set("padding", &text.settings.padding)
        .set("text-align", &text.settings.alignment);
    let title = if text.content.title.is_empty() {
        String::new()
    } else {
        format!(
            "<h2 class=\"text-3xl font-bold text-gray-900 mb-4\">{}</h2>",
            escape(&text.content.title)
        )
    };
    let subtitle = if text.content.subtitle.is_empty() {
        String::new()
    } else {
        format!(
            "<h3 class=\"text-xl text-gray-600 mb-6\">{}</h3>",
            escape(&text.content.subtitle)
        )
    };
    format!(
        "<div class=\"w-full\"{}>{}{}<div class=\"prose prose-lg max-w-none\">{}</div></div>",
        style.attr(),
        title,
        subtitle,
        html::rich(&text.content.text)
    )
}

pub(super) fn columns(columns: &Columns) -> String {
    let settings = &columns.settings;
    let style = Style::new()
        .set("display", "grid")
        .set("gap", &settings.gap)
        .set("padding", &settings.padding)
        .set(
            "grid-template-columns",
            format!("repeat({}, 1fr)", settings.columns.max(1)),
        )
        .set("align-items", &settings.alignment);
    let items: String = columns
        .items
        .iter()
        .map(|item| {
            format!(
                "<div class=\"flex flex-col\"><h3 class=\"text-xl font-semibold text-gray-900 mb-4\">{}</h3><div class=\"prose\">{}</div></div>",
                escape(&item.title),
                escape(&item.content)
            )
        })
        .collect();
    format!(
        "<div class=\"w-full\"><div class=\"grid\"{}>{}</div></div>",
        style.attr(),
        items
    )
}

pub(super) fn footer(footer: &Footer) -> String {
    let settings = &footer.settings;
    let content = &footer.content;
    let mut classes = Vec::new();
    let mut style = Style::new().set("padding", &settings.padding);
    style = apply_paint(&mut classes, style, "bg", "background-color", &settings.background_color);
    style = apply_paint(&mut classes, style, "text", "color", &settings.text_color);

    let columns: String = content
        .columns
        .iter()
        .map(|column| {
            let entries: String = column
                .items
                .iter()
                .map(|entry| {
                    let icon = Icon::optional(&entry.icon)
                        .map(|icon| html::icon(icon, "w-4 h-4"))
                        .unwrap_or_default();
                    let label = if entry.label.is_empty() {
                        &entry.text
                    } else {
                        &entry.label
                    };
                    if entry.url.is_empty() {
                        format!(
                            "<li><span class=\"inline-flex items-center space-x-2 opacity-80\">{icon}<span>{}</span></span></li>",
                            escape(label)
                        )
                    } else {
                        format!(
                            "<li><a href=\"{}\" class=\"hover:opacity-80 transition-opacity inline-flex items-center space-x-2\">{icon}<span>{}</span></a></li>",
                            html::url(&entry.url),
                            escape(label)
                        )
                    }
                })
                .collect();
            format!(
                "<div><h3 class=\"text-lg font-semibold mb-4\">{}</h3><ul class=\"space-y-2\">{}</ul></div>",
                escape(&column.title),
                entries
            )
        })
        .collect();

    format!(
        "<footer class=\"{classes}\"{style}><div class=\"container mx-auto\">\
         <div class=\"grid grid-cols-1 md:grid-cols-{cols} gap-8\">\
         <div><div class=\"flex items-center space-x-2 mb-4\">{logo_icon}\
         <span class=\"text-xl font-bold\">{logo_text}</span></div>\
         <p class=\"text-sm opacity-80 mb-4\">{description}</p></div>{columns}</div>\
         <div class=\"border-t border-white/10 mt-12 pt-8 text-sm opacity-60 text-center\">{copyright}</div>\
         </div></footer>",
        classes = classes.join(" "),
        style = style.attr(),
        cols = settings.columns.max(1),
        logo_icon = html::icon(Icon::from_name(&content.logo.icon), "w-8 h-8"),
        logo_text = escape(&content.logo.text),
        description = escape(&content.description),
        copyright = escape(&content.copyright),
    )
}

pub(super) fn youtube(video: &YouTube) -> String {
    let settings = &video.settings;
    let content = &video.content;
    if content.video_id.trim().is_empty() {
        return notice(MISSING_VIDEO);
    }
    let video_id = utf8_percent_encode(content.video_id.trim(), NON_ALPHANUMERIC).to_string();
    let title = if content.title.is_empty() {
        "YouTube video"
    } else {
        content.title.as_str()
    };
    let heading = if content.title.is_empty() {
        String::new()
    } else {
        format!(
            "<h3 class=\"text-xl font-semibold text-gray-900 mb-4\">{}</h3>",
            escape(&content.title)
        )
    };
    let description = if content.description.is_empty() {
        String::new()
    } else {
        format!(
            "<p class=\"mt-4 text-gray-600\">{}</p>",
            escape(&content.description)
        )
    };
    format!(
        "<div class=\"w-full\"{outer}>{heading}<div class=\"relative\"{inner}>\
         <iframe class=\"absolute inset-0 w-full h-full\" \
         src=\"https://www.youtube.com/embed/{video_id}?controls={controls}&amp;autoplay={autoplay}\" \
         title=\"{title}\" allow=\"accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture\" \
         allowfullscreen></iframe></div>{description}</div>",
        outer = Style::new()
            .set("max-width", &settings.max_width)
            .set("margin", "0 auto")
            .attr(),
        inner = Style::new()
            .set("padding-top", format!("{}%", settings.padding_percent()))
            .attr(),
        controls = u8::from(settings.show_controls),
        autoplay = u8::from(settings.autoplay),
        title = escape(title),
    )
}

pub(super) fn divider(divider: &Divider) -> String {
    let settings = &divider.settings;
    let mut classes = Vec::new();
    let mut line = Style::new()
        .set("width", &settings.width)
        .set("height", &settings.height)
        .set("border-style", &settings.style);
    line = apply_paint(&mut classes, line, "bg", "background-color", &settings.color);
    let rule = format!("<div class=\"{}\"{}></div>", classes.join(" "), line.attr());

    let icon = if settings.show_icon {
        let mut icon_classes = vec!["mx-4".to_string()];
        let icon_style =
            apply_paint(&mut icon_classes, Style::new(), "text", "color", &settings.color);
        format!(
            "<div class=\"{}\"{}>{}</div>",
            icon_classes.join(" "),
            icon_style.attr(),
            html::sized_icon(Icon::from_name(&settings.icon), "", 24)
        )
    } else {
        String::new()
    };
    let body = if icon.is_empty() {
        rule
    } else {
        format!("{rule}{icon}{rule}")
    };
    format!(
        "<div class=\"flex items-center justify-center\"{}>{}</div>",
        Style::new().set("margin", &settings.margin).attr(),
        body
    )
}

pub(super) fn icons(grid: &IconGrid) -> String {
    let settings = &grid.settings;
    let horizontal = settings.layout != "vertical";
    let mut icon_classes = Vec::new();
    let icon_style = apply_paint(&mut icon_classes, Style::new(), "text", "color", &settings.color);
    let items: String = grid
        .items
        .iter()
        .map(|item| {
            format!(
                "<div class=\"flex {dir} items-center {space}\"><span{style}>{icon}</span>\
                 <span class=\"text-sm font-medium text-gray-700\">{label}</span></div>",
                dir = if horizontal { "flex-col" } else { "flex-row" },
                space = if horizontal { "space-y-2" } else { "space-x-2" },
                style = icon_style.attr(),
                icon = html::sized_icon(Icon::from_name(&item.icon), &icon_classes.join(" "), settings.size),
                label = escape(&item.label),
            )
        })
        .collect();
    format!(
        "<div class=\"flex {} {}\"{}>{}</div>",
        if horizontal { "flex-row" } else { "flex-col" },
        html::justify(&settings.alignment),
        Style::new().set("gap", &settings.spacing).attr(),
        items
    )
}

pub(super) fn buttons(buttons: &Buttons) -> String {
    let settings = &buttons.settings;
    let horizontal = settings.layout != "vertical";
    let items: String = buttons
        .items
        .iter()
        .map(|item| {
            let icon = Icon::optional(&item.icon);
            let left = match icon {
                Some(icon) if item.icon_position != "right" => html::icon(icon, "w-5 h-5 mr-2"),
                _ => String::new(),
            };
            let right = match icon {
                Some(icon) if item.icon_position == "right" => html::icon(icon, "w-5 h-5 ml-2"),
                _ => String::new(),
            };
            format!(
                "<a href=\"{}\" class=\"inline-flex items-center {}\">{}{}{}</a>",
                html::url(&item.url),
                button_class(&item.style),
                left,
                escape(&item.text),
                right
            )
        })
        .collect();
    format!(
        "<div class=\"flex {} {}\"{}>{}</div>",
        if horizontal { "flex-row" } else { "flex-col" },
        html::justify(&settings.alignment),
        Style::new().set("gap", &settings.spacing).attr(),
        items
    )
}

pub(super) fn google_map(map: &GoogleMap, ctx: &RenderContext) -> String {
    let settings = &map.settings;
    let query = if map.content.address.trim().is_empty() {
        format!("{},{}", map.content.lat, map.content.lng)
    } else {
        map.content.address.trim().to_string()
    };
    let key = ctx.maps_api_key.as_deref().unwrap_or_default();
    let src = format!(
        "https://www.google.com/maps/embed/v1/place?key={}&q={}&zoom={}",
        utf8_percent_encode(key, NON_ALPHANUMERIC),
        utf8_percent_encode(&query, NON_ALPHANUMERIC),
        settings.zoom
    );
    format!(
        "<div class=\"w-full\"><iframe width=\"100%\" height=\"{}\" style=\"border:0\" loading=\"lazy\" \
         src=\"{}\" data-controls=\"{}\"{}></iframe></div>",
        escape(&html::css(&settings.height)),
        escape(&src),
        settings.show_controls,
        if settings.allow_fullscreen { " allowfullscreen" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::render::{render_block, PageLink, RenderMode};
    use crate::blocks::Block;
    use serde_json::json;

    fn ctx() -> RenderContext {
        RenderContext::new("s1", RenderMode::Live)
    }

    #[test]
    fn test_menu_appends_published_pages() {
        let block = Block::from(json!({
            "type": "menu",
            "items": [{"id": "a", "label": "Sobre", "url": "#sobre", "isAnchor": true}]
        }));
        let ctx = ctx().with_pages(vec![PageLink {
            id: "p1".into(),
            title: "Contato".into(),
            slug: "contato".into(),
        }]);
        let out = render_block(&block, &ctx);
        let own = out.find("Sobre").unwrap();
        let page = out.find("/sites/s1/p/contato").unwrap();
        assert!(own < page);
        assert!(out.contains("data-anchor=\"true\""));
    }

    #[test]
    fn test_youtube_without_video_id() {
        let out = render_block(&Block::from(json!({"type": "youtube"})), &ctx());
        assert!(out.contains(MISSING_VIDEO));
        assert!(!out.contains("<iframe"));
    }

    #[test]
    fn test_youtube_embed() {
        let block = Block::from(json!({
            "type": "youtube",
            "settings": {"showControls": false, "aspectRatio": "4:3"},
            "content": {"videoId": "abc123"}
        }));
        let out = render_block(&block, &ctx());
        assert!(out.contains("youtube.com/embed/abc123?controls=0&amp;autoplay=0"));
        assert!(out.contains("padding-top:75%"));
    }

    #[test]
    fn test_richtext_is_sanitized_not_escaped() {
        let block = Block::from(json!({
            "type": "richtext",
            "content": {"text": "<p><strong>oi</strong></p><img src=x onerror=alert(1)>"}
        }));
        let out = render_block(&block, &ctx());
        assert!(out.contains("<strong>oi</strong>"));
        assert!(!out.contains("onerror"));
    }

    #[test]
    fn test_testimonials_active_index_from_context() {
        let block = Block::from(json!({
            "id": "t",
            "type": "testimonials",
            "settings": {"autoplay": true, "interval": 3000},
            "items": [{"name": "Ana"}, {"name": "Bia"}]
        }));
        let mut ctx = ctx();
        ctx.carousel_index.insert("t".into(), 1);
        let out = render_block(&block, &ctx);
        assert!(out.contains("data-active=\"1\""));
        assert!(out.contains("data-autoplay=\"true\""));
        assert!(out.contains("data-interval=\"3000\""));
        let bia = out.find("Bia").unwrap();
        let visible = out.find("opacity-100\" data-index=\"1\"").unwrap();
        assert!(visible < bia);
    }

    #[test]
    fn test_unknown_icon_falls_back() {
        let block = Block::from(json!({"type": "icons", "items": [{"icon": "Nope", "label": "x"}]}));
        assert!(render_block(&block, &ctx()).contains("data-lucide=\"help-circle\""));
    }

    #[test]
    fn test_button_icon_position() {
        let block = Block::from(json!({
            "type": "buttons",
            "items": [{"text": "Ir", "icon": "Rocket", "iconPosition": "right"}]
        }));
        let out = render_block(&block, &ctx());
        let text = out.find("Ir").unwrap();
        let icon = out.find("data-lucide=\"rocket\"").unwrap();
        assert!(text < icon);
    }

    #[test]
    fn test_map_query_is_encoded() {
        let block = Block::from(json!({"type": "googlemap", "content": {"address": "Av. Paulista, 1000"}}));
        let ctx = ctx().with_maps_key(Some("k".into()));
        let out = render_block(&block, &ctx);
        assert!(out.contains("q=Av%2E%20Paulista%2C%201000"));
        assert!(out.contains("key=k"));
    }
}
