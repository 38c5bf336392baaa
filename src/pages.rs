//! Site pages: the ordered block list plus publishing metadata and
//! page-level presentation settings.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::blocks::Block;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: Uuid,
    pub site_id: Uuid,
    pub template_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub blocks: Vec<Block>,
    pub is_published: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub settings: PageSettings,
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    /// Title for the document `<title>`: the meta title when set.
    pub fn document_title(&self) -> &str {
        self.meta_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.title)
    }
}

/// Fields accepted when creating a page.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPage {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub template_id: Option<Uuid>,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
}

/// Partial update of page metadata. Blocks are saved separately.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub is_published: Option<bool>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub settings: Option<PageSettings>,
}

impl Page {
    pub fn apply(&mut self, update: PageUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(slug) = update.slug {
            self.slug = slugify(&slug);
        }
        if let Some(published) = update.is_published {
            self.is_published = published;
        }
        if let Some(meta_title) = update.meta_title {
            self.meta_title = Some(meta_title);
        }
        if let Some(meta_description) = update.meta_description {
            self.meta_description = Some(meta_description);
        }
        if let Some(settings) = update.settings {
            self.settings = settings;
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    pub layout: String,
    pub spacing: Spacing,
    pub background: PageBackground,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            layout: "default".to_string(),
            spacing: Spacing::default(),
            background: PageBackground::default(),
        }
    }
}

impl PageSettings {
    /// Stored settings are loosely shaped; anything unreadable gives defaults.
    pub fn from_value(value: Value) -> Self {
        if value.is_null() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "page settings failed to decode, using defaults");
            Self::default()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spacing {
    pub padding: Sides,
    pub margin: Sides,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sides {
    pub top: String,
    pub right: String,
    pub bottom: String,
    pub left: String,
}

impl Default for Sides {
    fn default() -> Self {
        let zero = || "0".to_string();
        Self {
            top: zero(),
            right: zero(),
            bottom: zero(),
            left: zero(),
        }
    }
}

impl Sides {
    /// CSS shorthand, blank sides read as `0`.
    pub fn shorthand(&self) -> String {
        [&self.top, &self.right, &self.bottom, &self.left]
            .iter()
            .map(|side| if side.trim().is_empty() { "0" } else { side.trim() })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageBackground {
    #[serde(rename = "type")]
    pub kind: String,
    pub color: String,
    pub image: Option<String>,
    pub position: String,
    pub repeat: String,
    pub size: String,
}

impl Default for PageBackground {
    fn default() -> Self {
        Self {
            kind: "color".to_string(),
            color: "#ffffff".to_string(),
            image: None,
            position: "center".to_string(),
            repeat: "no-repeat".to_string(),
            size: "cover".to_string(),
        }
    }
}

lazy_static! {
    static ref SLUG_PATTERN: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

const FALLBACK_SLUG: &str = "pagina";

/// URL slug for a page title: transliterated to ASCII, lowercase words
/// joined by `-`.
pub fn slugify(title: &str) -> String {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Whether `slug` is already in the form [`slugify`] produces.
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_PATTERN.is_match(slug)
}
