//! Page blocks.
//!
//! A page is an ordered list of [`Block`]s. Each block is stored as a JSON
//! object (`id`, `type` and type-specific payload slots) so that it survives
//! round-trips through the store untouched, and is decoded on demand into a
//! [`BlockKind`], the closed sum type the renderer and editor match on.
//!
//! Decoding never fails: a missing or unknown `type` becomes
//! [`BlockKind::Invalid`] / [`BlockKind::Unsupported`], and missing or
//! ill-typed payload fields fall back to their per-type defaults.

pub mod carousel;
pub mod contact;
pub mod editor;
mod flex;
pub mod icons;
pub mod path;
pub mod render;
pub mod reorder;
pub mod schema;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use self::path::{FieldPath, PathError};
use self::schema::{
    Buttons, Columns, Contact, Divider, Features, Footer, GoogleMap, Hero, IconGrid, Menu,
    RichText, Slide, Testimonials, YouTube,
};

/// The closed set of block type tags.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BlockType {
    Hero,
    Features,
    Testimonials,
    Contact,
    Slide,
    Menu,
    RichText,
    Columns,
    Footer,
    YouTube,
    Divider,
    Icons,
    Buttons,
    GoogleMap,
}

/// Top-level payload slots a block may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Slot {
    Settings,
    Content,
    Background,
    Items,
    Fields,
    Slides,
}

impl Slot {
    pub fn is_list(self) -> bool {
        matches!(self, Slot::Items | Slot::Fields | Slot::Slides)
    }

    /// Empty value stored for this slot when a template leaves it out.
    pub fn empty_value(self) -> Value {
        if self.is_list() {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        }
    }
}

impl BlockType {
    /// Which payload slots are meaningful for this type.
    pub fn slots(self) -> &'static [Slot] {
        use Slot::*;
        match self {
            BlockType::Hero => &[Settings, Content, Background],
            BlockType::Features
            | BlockType::Testimonials
            | BlockType::Menu
            | BlockType::Columns
            | BlockType::Icons
            | BlockType::Buttons => &[Settings, Items],
            BlockType::Contact => &[Settings, Fields],
            BlockType::Slide => &[Settings, Slides],
            BlockType::RichText
            | BlockType::Footer
            | BlockType::YouTube
            | BlockType::GoogleMap => &[Settings, Content],
            BlockType::Divider => &[Settings],
        }
    }

    /// The top-level list slot, if the type has one.
    pub fn list_slot(self) -> Option<Slot> {
        self.slots().iter().copied().find(|slot| slot.is_list())
    }

    /// Human readable name shown in the block catalog.
    pub fn label(self) -> &'static str {
        match self {
            BlockType::Hero => "Hero",
            BlockType::Features => "Recursos",
            BlockType::Testimonials => "Depoimentos",
            BlockType::Contact => "Formulário de Contato",
            BlockType::Slide => "Slideshow",
            BlockType::Menu => "Menu",
            BlockType::RichText => "Texto",
            BlockType::Columns => "Colunas",
            BlockType::Footer => "Rodapé",
            BlockType::YouTube => "Vídeo do YouTube",
            BlockType::Divider => "Divisor",
            BlockType::Icons => "Ícones",
            BlockType::Buttons => "Botões",
            BlockType::GoogleMap => "Mapa",
        }
    }

    /// Autoplay-capable carousel types.
    pub fn is_carousel(self) -> bool {
        matches!(self, BlockType::Testimonials | BlockType::Slide)
    }
}

/// Opaque block identifier, stable for the block's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A stored block: a JSON object that always carries a string `id`.
///
/// Any JSON value converts into a `Block`; keys the engine does not know
/// about are preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct Block {
    doc: Map<String, Value>,
}

impl From<Value> for Block {
    fn from(value: Value) -> Self {
        let mut doc = match value {
            Value::Object(map) => map,
            other => {
                tracing::warn!(value = %other, "block is not a JSON object");
                Map::new()
            }
        };
        let id = match doc.get("id") {
            Some(Value::String(id)) if !id.is_empty() => None,
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => Some(BlockId::generate().0),
        };
        if let Some(id) = id {
            doc.insert("id".to_string(), Value::String(id));
        }
        Self { doc }
    }
}

impl From<Block> for Value {
    fn from(block: Block) -> Self {
        Value::Object(block.doc)
    }
}

impl Block {
    /// Fresh block of `block_type` carrying the registry default payload.
    pub fn new(block_type: BlockType) -> Self {
        let mut doc = Map::new();
        doc.insert("id".to_string(), Value::String(BlockId::generate().0));
        doc.insert("type".to_string(), Value::String(block_type.to_string()));
        doc.extend(schema::starter_payload(block_type));
        Self { doc }
    }

    pub fn id(&self) -> BlockId {
        BlockId(self.id_str().to_string())
    }

    pub fn id_str(&self) -> &str {
        self.doc.get("id").and_then(Value::as_str).unwrap_or_default()
    }

    /// The raw `type` tag, if present and a string.
    pub fn type_tag(&self) -> Option<&str> {
        self.doc
            .get("type")
            .and_then(Value::as_str)
            .filter(|tag| !tag.is_empty())
    }

    pub fn block_type(&self) -> Option<BlockType> {
        self.type_tag().and_then(|tag| BlockType::from_str(tag).ok())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.doc.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.doc
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.doc.clone())
    }

    /// Copy of this block with the value at `path` replaced.
    pub fn with_path(&self, path: &FieldPath, value: Value) -> Result<Block, PathError> {
        let mut root = Value::Object(self.doc.clone());
        path::set_path(&mut root, path, value)?;
        match root {
            Value::Object(doc) => Ok(Block { doc }),
            _ => Err(PathError::Empty),
        }
    }

    /// Decode into the typed view for rendering and editing.
    pub fn kind(&self) -> BlockKind {
        let Some(tag) = self.type_tag() else {
            return BlockKind::Invalid;
        };
        let Ok(block_type) = BlockType::from_str(tag) else {
            return BlockKind::Unsupported(tag.to_string());
        };
        let doc = &self.doc;
        match block_type {
            BlockType::Hero => BlockKind::Hero(Hero::decode(doc)),
            BlockType::Features => BlockKind::Features(Features::decode(doc)),
            BlockType::Testimonials => BlockKind::Testimonials(Testimonials::decode(doc)),
            BlockType::Contact => BlockKind::Contact(Contact::decode(doc)),
            BlockType::Slide => BlockKind::Slide(Slide::decode(doc)),
            BlockType::Menu => BlockKind::Menu(Menu::decode(doc)),
            BlockType::RichText => BlockKind::RichText(RichText::decode(doc)),
            BlockType::Columns => BlockKind::Columns(Columns::decode(doc)),
            BlockType::Footer => BlockKind::Footer(Footer::decode(doc)),
            BlockType::YouTube => BlockKind::YouTube(YouTube::decode(doc)),
            BlockType::Divider => BlockKind::Divider(Divider::decode(doc)),
            BlockType::Icons => BlockKind::Icons(IconGrid::decode(doc)),
            BlockType::Buttons => BlockKind::Buttons(Buttons::decode(doc)),
            BlockType::GoogleMap => BlockKind::GoogleMap(GoogleMap::decode(doc)),
        }
    }
}

/// Decoded block payload, one variant per [`BlockType`].
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Hero(Hero),
    Features(Features),
    Testimonials(Testimonials),
    Contact(Contact),
    Slide(Slide),
    Menu(Menu),
    RichText(RichText),
    Columns(Columns),
    Footer(Footer),
    YouTube(YouTube),
    Divider(Divider),
    Icons(IconGrid),
    Buttons(Buttons),
    GoogleMap(GoogleMap),
    /// `type` names a tag outside the known set.
    Unsupported(String),
    /// `type` is absent, empty or not a string.
    Invalid,
}

/// Catalog entry used to add blocks to a page.
///
/// `content` holds the `type` tag plus whatever payload slots the template
/// pre-fills, mirroring the `page_blocks` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub content: Value,
}

impl BlockTemplate {
    /// Built-in template for a block type, carrying the registry defaults.
    pub fn builtin(block_type: BlockType) -> Self {
        let mut content = Map::new();
        content.insert("type".to_string(), Value::String(block_type.to_string()));
        content.extend(schema::starter_payload(block_type));
        Self {
            id: format!("builtin-{}", block_type),
            name: block_type.label().to_string(),
            description: Some(schema::describe(block_type).to_string()),
            category: Some(schema::category(block_type).to_string()),
            content: Value::Object(content),
        }
    }

    pub fn type_tag(&self) -> Option<&str> {
        self.content.get("type").and_then(Value::as_str)
    }

    /// New block with a fresh id built from this template.
    ///
    /// For a known type only its meaningful slots are copied, absent ones
    /// are stored empty. An unknown tag is copied as-is and will render as
    /// an unsupported placeholder.
    pub fn instantiate(&self) -> Block {
        let mut doc = Map::new();
        doc.insert("id".to_string(), Value::String(BlockId::generate().0));
        let tag = self.type_tag().unwrap_or_default();
        doc.insert("type".to_string(), Value::String(tag.to_string()));

        let payload = self.content.as_object();
        let slot_value = |slot: Slot| {
            payload
                .and_then(|p| p.get(slot.as_ref()))
                .filter(|v| !v.is_null())
                .cloned()
        };

        match BlockType::from_str(tag) {
            Ok(block_type) => {
                for &slot in block_type.slots() {
                    let value = slot_value(slot).unwrap_or_else(|| slot.empty_value());
                    doc.insert(slot.to_string(), value);
                }
            }
            Err(_) => {
                for slot in [
                    Slot::Settings,
                    Slot::Content,
                    Slot::Background,
                    Slot::Items,
                    Slot::Fields,
                    Slot::Slides,
                ] {
                    if let Some(value) = slot_value(slot) {
                        doc.insert(slot.to_string(), value);
                    }
                }
            }
        }
        Block { doc }
    }
}

/// Decode a page's stored `blocks` column leniently.
pub fn blocks_from_value(value: Value) -> Vec<Block> {
    match value {
        Value::Array(items) => items.into_iter().map(Block::from).collect(),
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(value = %other, "page blocks are not a JSON array, treating as empty");
            Vec::new()
        }
    }
}
