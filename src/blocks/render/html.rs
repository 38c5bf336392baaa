//! Small HTML building helpers shared by the block renderers.

use crate::blocks::icons::Icon;

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Escaped URL for `href`/`src`; script-capable schemes become `#`.
pub(crate) fn url(raw: &str) -> String {
    if is_script_url(raw) {
        "#".to_string()
    } else {
        escape(raw.trim())
    }
}

fn is_script_url(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    ["javascript:", "vbscript:", "data:text"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
}

/// `url('...')` for background images. Not HTML-escaped: goes through
/// [`Style`], which escapes the whole attribute.
pub(crate) fn css_url(raw: &str) -> String {
    if is_script_url(raw) {
        return "none".to_string();
    }
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\'' | '(' | ')'))
        .collect();
    format!("url('{cleaned}')")
}

/// A CSS value with declaration-breaking characters removed.
pub(crate) fn css(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>' | '"' | '\\'))
        .collect()
}

/// Sanitized rich text HTML.
pub(crate) fn rich(html: &str) -> String {
    ammonia::clean(html)
}

/// Inline `style` attribute builder. Empty values are skipped.
#[derive(Debug, Default)]
pub(crate) struct Style {
    decls: Vec<(&'static str, String)>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, prop: &'static str, value: impl AsRef<str>) -> Self {
        let value = css(value.as_ref().trim());
        if !value.is_empty() {
            self.decls.push((prop, value));
        }
        self
    }

    pub fn set_if(self, cond: bool, prop: &'static str, value: impl AsRef<str>) -> Self {
        if cond {
            self.set(prop, value)
        } else {
            self
        }
    }

    /// ` style="..."`, or nothing when no declaration was set.
    pub fn attr(&self) -> String {
        if self.decls.is_empty() {
            return String::new();
        }
        let body: Vec<String> = self
            .decls
            .iter()
            .map(|(prop, value)| format!("{prop}:{value}"))
            .collect();
        format!(" style=\"{}\"", escape(&body.join(";")))
    }
}

/// Colors are either utility tokens (`gray-800`, `white`) or CSS colors
/// (`#1f2937`, `rgb(...)`).
pub(crate) enum Paint {
    Class(String),
    Css(String),
}

pub(crate) fn paint(prefix: &str, color: &str) -> Option<Paint> {
    let color = color.trim();
    if color.is_empty() {
        return None;
    }
    let is_css = color.starts_with('#')
        || color.starts_with("rgb")
        || color.starts_with("hsl")
        || color.starts_with("var(");
    if is_css {
        Some(Paint::Css(color.to_string()))
    } else {
        let token: String = color
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        Some(Paint::Class(format!("{prefix}-{token}")))
    }
}

/// Applies a color either as a class or as an inline declaration.
pub(crate) fn apply_paint(
    classes: &mut Vec<String>,
    style: Style,
    prefix: &str,
    prop: &'static str,
    color: &str,
) -> Style {
    match paint(prefix, color) {
        Some(Paint::Class(class)) => {
            classes.push(class);
            style
        }
        Some(Paint::Css(value)) => style.set(prop, value),
        None => style,
    }
}

pub(crate) fn icon(icon: Icon, class: &str) -> String {
    format!(
        "<i data-lucide=\"{}\" class=\"{}\"></i>",
        icon.kebab(),
        escape(class)
    )
}

pub(crate) fn sized_icon(icon: Icon, class: &str, size: u32) -> String {
    format!(
        "<i data-lucide=\"{}\" class=\"{}\" data-size=\"{size}\" style=\"width:{size}px;height:{size}px\"></i>",
        icon.kebab(),
        escape(class)
    )
}

pub(crate) fn justify(alignment: &str) -> &'static str {
    match alignment {
        "center" => "justify-center",
        "right" | "end" => "justify-end",
        _ => "justify-start",
    }
}

pub(crate) fn text_align(alignment: &str) -> &'static str {
    match alignment {
        "center" => "text-center",
        "right" => "text-right",
        _ => "text-left",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_url_blocks_scripts() {
        assert_eq!(url("javascript:alert(1)"), "#");
        assert_eq!(url("  JavaScript:alert(1)"), "#");
        assert_eq!(url("/sites/a/p/home?x=1&y=2"), "/sites/a/p/home?x=1&amp;y=2");
    }

    #[test]
    fn test_css_url() {
        assert_eq!(css_url("/img/a b.png"), "url('/img/a b.png')");
        assert_eq!(css_url("x');background:red('"), "url('x;background:red')");
        assert_eq!(css_url("javascript:alert(1)"), "none");
    }

    #[test]
    fn test_style_skips_empty_and_strips_breakers() {
        let style = Style::new()
            .set("height", "600px")
            .set("color", "")
            .set("background", "red;position:fixed");
        assert_eq!(style.attr(), " style=\"height:600px;background:redposition:fixed\"");
        assert_eq!(Style::new().attr(), "");
    }

    #[test]
    fn test_rich_strips_scripts() {
        let cleaned = rich("<p>ok</p><script>alert(1)</script>");
        assert!(cleaned.contains("<p>ok</p>"));
        assert!(!cleaned.contains("script"));
    }

    #[test]
    fn test_paint() {
        assert!(matches!(paint("bg", "gray-900"), Some(Paint::Class(c)) if c == "bg-gray-900"));
        assert!(matches!(paint("bg", "#fff"), Some(Paint::Css(c)) if c == "#fff"));
        assert!(paint("bg", " ").is_none());
    }
}
