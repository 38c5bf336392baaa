//! Per-type block payloads and the registry of defaults.
//!
//! Every field carries a default so a block with missing or partially
//! ill-typed data still decodes to something renderable.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::flex::{flex_bool, flex_f64, flex_string, flex_u32, flex_u64};
use super::path::FieldPath;
use super::{BlockId, BlockType};

type Doc = Map<String, Value>;

/// Decode one object slot. Fields that fail to decode fall back to their
/// own defaults; the rest of the slot is kept.
pub(crate) fn decode_slot<T: Serialize + DeserializeOwned + Default>(doc: &Doc, key: &str) -> T {
    match doc.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => decode_lenient(value, key),
    }
}

/// Decode a list slot item by item; a bad item becomes a default record so
/// indices stay aligned with the stored array.
pub(crate) fn decode_list<T: Serialize + DeserializeOwned + Default>(
    value: Option<&Value>,
    key: &str,
) -> Vec<T> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(|item| decode_lenient(item, key)).collect(),
        Some(other) => {
            tracing::warn!(slot = key, value = %other, "list slot is not an array");
            Vec::new()
        }
    }
}

fn decode_lenient<T: Serialize + DeserializeOwned + Default>(value: &Value, slot: &str) -> T {
    let err = match T::deserialize(value) {
        Ok(decoded) => return decoded,
        Err(err) => err,
    };
    tracing::warn!(slot, error = %err, "block data partly ill-typed, keeping the fields that decode");
    let Value::Object(input) = value else {
        return T::default();
    };
    let mut root = match serde_json::to_value(T::default()) {
        Ok(root @ Value::Object(_)) => root,
        _ => return T::default(),
    };
    salvage::<T>(&mut root, &mut Vec::new(), input);
    T::deserialize(&root).unwrap_or_default()
}

fn object_at<'a>(root: &'a mut Value, parents: &[String]) -> Option<&'a mut Doc> {
    let mut current = root.as_object_mut()?;
    for key in parents {
        current = current.get_mut(key)?.as_object_mut()?;
    }
    Some(current)
}

/// Overlay `input` onto the defaults in `root` one field at a time, keeping
/// each field only if the whole value still decodes. Nested objects are
/// salvaged the same way.
fn salvage<T: DeserializeOwned>(root: &mut Value, parents: &mut Vec<String>, input: &Doc) {
    for (key, value) in input {
        let Some(target) = object_at(root, parents) else {
            return;
        };
        let previous = target.insert(key.clone(), value.clone());
        if T::deserialize(&*root).is_ok() {
            continue;
        }
        let Some(target) = object_at(root, parents) else {
            return;
        };
        let nested = previous.as_ref().is_some_and(Value::is_object);
        match previous {
            Some(previous) => target.insert(key.clone(), previous),
            None => target.remove(key),
        };
        match value {
            Value::Object(fields) if nested => {
                parents.push(key.clone());
                salvage::<T>(root, parents, fields);
                parents.pop();
            }
            _ => {
                tracing::debug!(field = %key, "dropping ill-typed block field");
            }
        }
    }
}

fn s(v: &str) -> String {
    v.to_string()
}

// ---------------------------------------------------------------------------
// hero

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroSettings {
    #[serde(deserialize_with = "flex_string")]
    pub height: String,
    pub alignment: String,
    #[serde(deserialize_with = "flex_bool")]
    pub overlay: bool,
    pub overlay_color: String,
}

impl Default for HeroSettings {
    fn default() -> Self {
        Self {
            height: s("600px"),
            alignment: s("center"),
            overlay: false,
            overlay_color: s("rgba(0,0,0,0.5)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroBackground {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub position: String,
    pub size: String,
}

impl Default for HeroBackground {
    fn default() -> Self {
        Self {
            kind: s("color"),
            url: String::new(),
            position: s("center"),
            size: s("cover"),
        }
    }
}

impl HeroBackground {
    pub fn is_image(&self) -> bool {
        self.kind == "image" && !self.url.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkButton {
    pub text: String,
    pub url: String,
    pub style: String,
}

impl Default for LinkButton {
    fn default() -> Self {
        Self {
            text: String::new(),
            url: s("#"),
            style: s("primary"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroContent {
    pub title: String,
    pub subtitle: String,
    pub button: LinkButton,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hero {
    pub settings: HeroSettings,
    pub background: HeroBackground,
    pub content: HeroContent,
}

impl Hero {
    pub(crate) fn decode(doc: &Doc) -> Self {
        Self {
            settings: decode_slot(doc, "settings"),
            background: decode_slot(doc, "background"),
            content: decode_slot(doc, "content"),
        }
    }
}

// ---------------------------------------------------------------------------
// features

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesSettings {
    #[serde(deserialize_with = "flex_u32")]
    pub columns: u32,
    pub gap: String,
}

impl Default for FeaturesSettings {
    fn default() -> Self {
        Self {
            columns: 3,
            gap: s("2rem"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feature {
    pub icon: String,
    pub title: String,
    pub description: String,
}

impl Default for Feature {
    fn default() -> Self {
        Self {
            icon: s("Star"),
            title: String::new(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Features {
    pub settings: FeaturesSettings,
    pub items: Vec<Feature>,
}

impl Features {
    pub(crate) fn decode(doc: &Doc) -> Self {
        Self {
            settings: decode_slot(doc, "settings"),
            items: decode_list(doc.get("items"), "items"),
        }
    }
}

// ---------------------------------------------------------------------------
// carousels: testimonials and slide

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplaySettings {
    #[serde(deserialize_with = "flex_bool")]
    pub autoplay: bool,
    #[serde(deserialize_with = "flex_u64")]
    pub interval: u64,
}

impl Default for AutoplaySettings {
    fn default() -> Self {
        Self {
            autoplay: false,
            interval: 5000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Testimonial {
    pub name: String,
    pub role: String,
    pub company: String,
    pub image: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Testimonials {
    pub settings: AutoplaySettings,
    pub items: Vec<Testimonial>,
}

impl Testimonials {
    pub(crate) fn decode(doc: &Doc) -> Self {
        Self {
            settings: decode_slot(doc, "settings"),
            items: decode_list(doc.get("items"), "items"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SlideSettings {
    #[serde(deserialize_with = "flex_string")]
    pub height: String,
    #[serde(deserialize_with = "flex_bool")]
    pub autoplay: bool,
    #[serde(deserialize_with = "flex_u64")]
    pub interval: u64,
    #[serde(deserialize_with = "flex_bool")]
    pub overlay: bool,
    pub overlay_color: String,
}

impl Default for SlideSettings {
    fn default() -> Self {
        Self {
            height: s("500px"),
            autoplay: false,
            interval: 5000,
            overlay: false,
            overlay_color: s("rgba(0,0,0,0.3)"),
        }
    }
}

/// One slide record. Keys are snake_case as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideItem {
    #[serde(deserialize_with = "flex_string")]
    pub id: String,
    pub image_url: String,
    pub title: String,
    pub subtitle: String,
    pub button_text: String,
    pub button_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Slide {
    pub settings: SlideSettings,
    pub slides: Vec<SlideItem>,
}

impl Slide {
    pub(crate) fn decode(doc: &Doc) -> Self {
        Self {
            settings: decode_slot(doc, "settings"),
            slides: decode_list(doc.get("slides"), "slides"),
        }
    }
}

// ---------------------------------------------------------------------------
// contact

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitButton {
    pub text: String,
    pub style: String,
}

impl Default for SubmitButton {
    fn default() -> Self {
        Self {
            text: s("Enviar"),
            style: s("primary"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactSettings {
    pub layout: String,
    pub submit_button: SubmitButton,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            layout: s("stacked"),
            submit_button: SubmitButton::default(),
        }
    }
}

/// A contact form input. Shared with the site's lead settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactField {
    #[serde(rename = "type")]
    pub field_type: String,
    pub name: String,
    pub label: String,
    #[serde(deserialize_with = "flex_bool")]
    pub required: bool,
}

impl Default for ContactField {
    fn default() -> Self {
        Self {
            field_type: s("text"),
            name: String::new(),
            label: String::new(),
            required: false,
        }
    }
}

impl ContactField {
    pub fn new(field_type: &str, name: &str, label: &str, required: bool) -> Self {
        Self {
            field_type: s(field_type),
            name: s(name),
            label: s(label),
            required,
        }
    }

    pub fn is_textarea(&self) -> bool {
        self.field_type == "textarea"
    }

    /// HTML input type; unknown types render as plain text.
    pub fn input_type(&self) -> &'static str {
        match self.field_type.as_str() {
            "email" => "email",
            "tel" => "tel",
            "number" => "number",
            "url" => "url",
            _ => "text",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Contact {
    pub settings: ContactSettings,
    pub fields: Vec<ContactField>,
}

impl Contact {
    pub(crate) fn decode(doc: &Doc) -> Self {
        Self {
            settings: decode_slot(doc, "settings"),
            fields: decode_list(doc.get("fields"), "fields"),
        }
    }
}

/// Fields a new contact block or lead configuration starts with.
pub fn default_contact_fields() -> Vec<ContactField> {
    vec![
        ContactField::new("text", "name", "Nome", true),
        ContactField::new("email", "email", "E-mail", true),
        ContactField::new("textarea", "message", "Mensagem", true),
    ]
}

// ---------------------------------------------------------------------------
// menu

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuLogo {
    pub url: String,
    pub height: String,
}

impl Default for MenuLogo {
    fn default() -> Self {
        Self {
            url: String::new(),
            height: s("32px"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuSettings {
    pub position: String,
    pub style: String,
    pub alignment: String,
    pub background_color: String,
    pub text_color: String,
    pub hover_color: String,
    pub logo: MenuLogo,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            position: s("top"),
            style: s("fixed"),
            alignment: s("left"),
            background_color: s("white"),
            text_color: s("gray-800"),
            hover_color: s("blue-600"),
            logo: MenuLogo::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(deserialize_with = "flex_string")]
    pub id: String,
    pub label: String,
    pub url: String,
    #[serde(deserialize_with = "flex_bool")]
    pub is_anchor: bool,
}

impl Default for MenuItem {
    fn default() -> Self {
        Self {
            id: String::new(),
            label: String::new(),
            url: s("#"),
            is_anchor: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Menu {
    pub settings: MenuSettings,
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub(crate) fn decode(doc: &Doc) -> Self {
        Self {
            settings: decode_slot(doc, "settings"),
            items: decode_list(doc.get("items"), "items"),
        }
    }
}

// ---------------------------------------------------------------------------
// richtext

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RichTextSettings {
    pub max_width: String,
    pub alignment: String,
    pub padding: String,
}

impl Default for RichTextSettings {
    fn default() -> Self {
        Self {
            max_width: s("100%"),
            alignment: s("left"),
            padding: s("0"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RichTextContent {
    pub title: String,
    pub subtitle: String,
    /// HTML, sanitized when rendered.
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RichText {
    pub settings: RichTextSettings,
    pub content: RichTextContent,
}

impl RichText {
    pub(crate) fn decode(doc: &Doc) -> Self {
        Self {
            settings: decode_slot(doc, "settings"),
            content: decode_slot(doc, "content"),
        }
    }
}

// ---------------------------------------------------------------------------
// columns

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsSettings {
    #[serde(deserialize_with = "flex_u32")]
    pub columns: u32,
    pub gap: String,
    pub padding: String,
    pub alignment: String,
}

impl Default for ColumnsSettings {
    fn default() -> Self {
        Self {
            columns: 2,
            gap: s("2rem"),
            padding: s("2rem"),
            alignment: s("stretch"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnItem {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Columns {
    pub settings: ColumnsSettings,
    pub items: Vec<ColumnItem>,
}

impl Columns {
    pub(crate) fn decode(doc: &Doc) -> Self {
        Self {
            settings: decode_slot(doc, "settings"),
            items: decode_list(doc.get("items"), "items"),
        }
    }
}

// ---------------------------------------------------------------------------
// footer

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FooterSettings {
    pub background_color: String,
    pub text_color: String,
    pub padding: String,
    #[serde(deserialize_with = "flex_u32")]
    pub columns: u32,
}

impl Default for FooterSettings {
    fn default() -> Self {
        Self {
            background_color: s("gray-900"),
            text_color: s("white"),
            padding: s("4rem 2rem"),
            columns: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterLogo {
    pub icon: String,
    pub text: String,
}

impl Default for FooterLogo {
    fn default() -> Self {
        Self {
            icon: s("Activity"),
            text: String::new(),
        }
    }
}

/// A footer column entry: a link when `url` is set, plain text otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterEntry {
    pub label: String,
    pub url: String,
    pub icon: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FooterColumn {
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub items: Vec<FooterEntry>,
}

fn lenient_entries<'de, D: serde::Deserializer<'de>>(de: D) -> Result<Vec<FooterEntry>, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(decode_list(Some(&value), "items"))
}

fn lenient_columns<'de, D: serde::Deserializer<'de>>(de: D) -> Result<Vec<FooterColumn>, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(decode_list(Some(&value), "columns"))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterContent {
    pub logo: FooterLogo,
    pub description: String,
    pub copyright: String,
    #[serde(deserialize_with = "lenient_columns")]
    pub columns: Vec<FooterColumn>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Footer {
    pub settings: FooterSettings,
    pub content: FooterContent,
}

impl Footer {
    pub(crate) fn decode(doc: &Doc) -> Self {
        Self {
            settings: decode_slot(doc, "settings"),
            content: decode_slot(doc, "content"),
        }
    }
}

// ---------------------------------------------------------------------------
// youtube

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct YouTubeSettings {
    pub aspect_ratio: String,
    pub max_width: String,
    #[serde(deserialize_with = "flex_bool")]
    pub show_controls: bool,
    #[serde(deserialize_with = "flex_bool")]
    pub autoplay: bool,
}

impl Default for YouTubeSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: s("16:9"),
            max_width: s("800px"),
            show_controls: true,
            autoplay: false,
        }
    }
}

impl YouTubeSettings {
    /// Height over width as a percentage; malformed ratios use 16:9.
    pub fn padding_percent(&self) -> f64 {
        let parsed = self.aspect_ratio.split_once(':').and_then(|(w, h)| {
            let w: f64 = w.trim().parse().ok()?;
            let h: f64 = h.trim().parse().ok()?;
            (w > 0.0 && h > 0.0).then_some(h / w * 100.0)
        });
        parsed.unwrap_or(56.25)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct YouTubeContent {
    #[serde(deserialize_with = "flex_string")]
    pub video_id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YouTube {
    pub settings: YouTubeSettings,
    pub content: YouTubeContent,
}

impl YouTube {
    pub(crate) fn decode(doc: &Doc) -> Self {
        Self {
            settings: decode_slot(doc, "settings"),
            content: decode_slot(doc, "content"),
        }
    }
}

// ---------------------------------------------------------------------------
// divider

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DividerSettings {
    pub style: String,
    pub color: String,
    pub width: String,
    pub height: String,
    pub margin: String,
    #[serde(deserialize_with = "flex_bool")]
    pub show_icon: bool,
    pub icon: String,
}

impl Default for DividerSettings {
    fn default() -> Self {
        Self {
            style: s("solid"),
            color: s("gray-200"),
            width: s("100%"),
            height: s("1px"),
            margin: s("2rem"),
            show_icon: false,
            icon: s("Star"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Divider {
    pub settings: DividerSettings,
}

impl Divider {
    pub(crate) fn decode(doc: &Doc) -> Self {
        Self {
            settings: decode_slot(doc, "settings"),
        }
    }
}

// ---------------------------------------------------------------------------
// icons

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconGridSettings {
    #[serde(deserialize_with = "flex_u32")]
    pub size: u32,
    pub color: String,
    pub layout: String,
    pub spacing: String,
    pub alignment: String,
}

impl Default for IconGridSettings {
    fn default() -> Self {
        Self {
            size: 48,
            color: s("blue-600"),
            layout: s("horizontal"),
            spacing: s("2rem"),
            alignment: s("center"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconItem {
    pub icon: String,
    pub label: String,
}

impl Default for IconItem {
    fn default() -> Self {
        Self {
            icon: s("HelpCircle"),
            label: String::new(),
        }
    }
}

/// Payload of an `icons` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IconGrid {
    pub settings: IconGridSettings,
    pub items: Vec<IconItem>,
}

impl IconGrid {
    pub(crate) fn decode(doc: &Doc) -> Self {
        Self {
            settings: decode_slot(doc, "settings"),
            items: decode_list(doc.get("items"), "items"),
        }
    }
}

// ---------------------------------------------------------------------------
// buttons

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonsSettings {
    pub layout: String,
    pub spacing: String,
    pub alignment: String,
}

impl Default for ButtonsSettings {
    fn default() -> Self {
        Self {
            layout: s("horizontal"),
            spacing: s("1rem"),
            alignment: s("center"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ButtonItem {
    pub text: String,
    pub url: String,
    pub style: String,
    pub icon: String,
    pub icon_position: String,
}

impl Default for ButtonItem {
    fn default() -> Self {
        Self {
            text: String::new(),
            url: s("#"),
            style: s("primary"),
            icon: String::new(),
            icon_position: s("left"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Buttons {
    pub settings: ButtonsSettings,
    pub items: Vec<ButtonItem>,
}

impl Buttons {
    pub(crate) fn decode(doc: &Doc) -> Self {
        Self {
            settings: decode_slot(doc, "settings"),
            items: decode_list(doc.get("items"), "items"),
        }
    }
}

// ---------------------------------------------------------------------------
// googlemap

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoogleMapSettings {
    #[serde(deserialize_with = "flex_string")]
    pub height: String,
    #[serde(deserialize_with = "flex_u32")]
    pub zoom: u32,
    #[serde(deserialize_with = "flex_bool")]
    pub show_controls: bool,
    #[serde(deserialize_with = "flex_bool")]
    pub allow_fullscreen: bool,
}

impl Default for GoogleMapSettings {
    fn default() -> Self {
        Self {
            height: s("450px"),
            zoom: 15,
            show_controls: true,
            allow_fullscreen: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleMapContent {
    pub address: String,
    #[serde(deserialize_with = "flex_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "flex_f64")]
    pub lng: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GoogleMap {
    pub settings: GoogleMapSettings,
    pub content: GoogleMapContent,
}

impl GoogleMap {
    pub(crate) fn decode(doc: &Doc) -> Self {
        Self {
            settings: decode_slot(doc, "settings"),
            content: decode_slot(doc, "content"),
        }
    }
}

// ---------------------------------------------------------------------------
// registry

fn payload_map<T: Serialize>(payload: &T) -> Doc {
    match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Doc::new(),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize default payload");
            Doc::new()
        }
    }
}

/// Payload slots of a freshly added block.
pub fn starter_payload(block_type: BlockType) -> Doc {
    match block_type {
        BlockType::Hero => payload_map(&Hero {
            content: HeroContent {
                title: s("Título Principal"),
                subtitle: s("Subtítulo da seção"),
                button: LinkButton {
                    text: s("Saiba Mais"),
                    ..LinkButton::default()
                },
            },
            ..Hero::default()
        }),
        BlockType::Features => payload_map(&Features::default()),
        BlockType::Testimonials => payload_map(&Testimonials::default()),
        BlockType::Contact => payload_map(&Contact {
            settings: ContactSettings::default(),
            fields: default_contact_fields(),
        }),
        BlockType::Slide => payload_map(&Slide::default()),
        BlockType::Menu => payload_map(&Menu::default()),
        BlockType::RichText => payload_map(&RichText::default()),
        BlockType::Columns => payload_map(&Columns::default()),
        BlockType::Footer => payload_map(&Footer::default()),
        BlockType::YouTube => payload_map(&YouTube::default()),
        BlockType::Divider => payload_map(&Divider::default()),
        BlockType::Icons => payload_map(&IconGrid::default()),
        BlockType::Buttons => payload_map(&Buttons::default()),
        BlockType::GoogleMap => payload_map(&GoogleMap::default()),
    }
}

pub fn describe(block_type: BlockType) -> &'static str {
    match block_type {
        BlockType::Hero => "Seção de destaque com imagem de fundo, título e botão",
        BlockType::Features => "Grade de recursos com ícones",
        BlockType::Testimonials => "Depoimentos de clientes em carrossel",
        BlockType::Contact => "Formulário que gera leads",
        BlockType::Slide => "Carrossel de imagens",
        BlockType::Menu => "Menu de navegação com as páginas do site",
        BlockType::RichText => "Bloco de texto formatado",
        BlockType::Columns => "Conteúdo em colunas",
        BlockType::Footer => "Rodapé com logo e colunas de links",
        BlockType::YouTube => "Vídeo incorporado do YouTube",
        BlockType::Divider => "Linha divisória",
        BlockType::Icons => "Lista de ícones com rótulos",
        BlockType::Buttons => "Grupo de botões",
        BlockType::GoogleMap => "Mapa do Google incorporado",
    }
}

pub fn category(block_type: BlockType) -> &'static str {
    match block_type {
        BlockType::Hero | BlockType::Slide => "destaque",
        BlockType::Menu | BlockType::Footer => "navegação",
        BlockType::Contact => "formulários",
        BlockType::YouTube | BlockType::GoogleMap => "mídia",
        _ => "conteúdo",
    }
}

/// Default record appended to the list at `list`, given its current length.
///
/// Returns `None` when `list` is not an editable list of `block_type`.
pub fn new_record(block_type: BlockType, list: &FieldPath, len: usize) -> Option<Value> {
    let segments: Vec<&str> = list.segments().iter().map(String::as_str).collect();
    let record = match (block_type, segments.as_slice()) {
        (BlockType::Features, ["items"]) => json!({
            "icon": "Star",
            "title": "Novo Recurso",
            "description": "Descrição do recurso",
        }),
        (BlockType::Testimonials, ["items"]) => json!({
            "name": "Nome do Cliente",
            "role": "Cargo",
            "company": "Empresa",
            "image": "",
            "text": "Depoimento do cliente",
        }),
        (BlockType::Contact, ["fields"]) => json!({
            "type": "text",
            "name": format!("field_{}", len + 1),
            "label": "Novo Campo",
            "required": false,
        }),
        (BlockType::Slide, ["slides"]) => json!({
            "id": BlockId::generate().as_str(),
            "image_url": "",
            "title": "Novo Slide",
            "subtitle": "Descrição do slide",
            "button_text": "Saiba Mais",
            "button_url": "#",
        }),
        (BlockType::Menu, ["items"]) => json!({
            "id": BlockId::generate().as_str(),
            "label": "Novo Item",
            "url": "#",
            "isAnchor": true,
        }),
        (BlockType::Columns, ["items"]) => json!({
            "title": "Nova Coluna",
            "content": "Conteúdo da coluna",
        }),
        (BlockType::Icons, ["items"]) => json!({"icon": "Star", "label": "Novo Ícone"}),
        (BlockType::Buttons, ["items"]) => json!({
            "text": "Novo Botão",
            "url": "#",
            "style": "primary",
            "icon": "",
            "iconPosition": "left",
        }),
        (BlockType::Footer, ["content", "columns"]) => json!({"title": "Nova Coluna", "items": []}),
        (BlockType::Footer, ["content", "columns", column, "items"])
            if column.parse::<usize>().is_ok() =>
        {
            json!({"label": "Novo Link", "url": "#", "icon": "", "text": ""})
        }
        _ => return None,
    };
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{Block, BlockKind};
    use std::str::FromStr;

    #[test]
    fn test_hero_defaults_when_slots_missing() {
        let block = Block::from(json!({"id": "h", "type": "hero"}));
        let BlockKind::Hero(hero) = block.kind() else {
            panic!("expected hero");
        };
        assert_eq!(hero.settings.height, "600px");
        assert_eq!(hero.settings.alignment, "center");
        assert!(!hero.settings.overlay);
        assert_eq!(hero.background.kind, "color");
        assert_eq!(hero.content.button.url, "#");
        assert_eq!(hero.content.button.style, "primary");
    }

    #[test]
    fn test_bad_field_keeps_valid_siblings() {
        let block = Block::from(json!({
            "type": "hero",
            "settings": {"height": "400px", "alignment": "left", "overlay": "maybe"},
            "content": {"title": "Olá", "button": {"text": "Ir", "url": ["x"]}}
        }));
        let BlockKind::Hero(hero) = block.kind() else {
            panic!("expected hero");
        };
        assert_eq!(hero.settings.height, "400px");
        assert_eq!(hero.settings.alignment, "left");
        assert!(!hero.settings.overlay);
        assert_eq!(hero.content.title, "Olá");
        assert_eq!(hero.content.button.text, "Ir");
        assert_eq!(hero.content.button.url, "#");
    }

    #[test]
    fn test_partial_settings_keep_other_defaults() {
        let block = Block::from(json!({
            "type": "slide",
            "settings": {"autoplay": "true", "interval": "3000"}
        }));
        let BlockKind::Slide(slide) = block.kind() else {
            panic!("expected slide");
        };
        assert!(slide.settings.autoplay);
        assert_eq!(slide.settings.interval, 3000);
        assert_eq!(slide.settings.height, "500px");
        assert!(slide.slides.is_empty());
    }

    #[test]
    fn test_ill_typed_slot_falls_back() {
        let block = Block::from(json!({
            "type": "features",
            "settings": "wide",
            "items": [{"title": "A"}, 42, {"icon": "Zap", "title": "B"}]
        }));
        let BlockKind::Features(features) = block.kind() else {
            panic!("expected features");
        };
        assert_eq!(features.settings, FeaturesSettings::default());
        assert_eq!(features.items.len(), 3);
        assert_eq!(features.items[0].icon, "Star");
        assert_eq!(features.items[1], Feature::default());
        assert_eq!(features.items[2].title, "B");
    }

    #[test]
    fn test_footer_nested_columns_are_lenient() {
        let block = Block::from(json!({
            "type": "footer",
            "content": {"columns": [{"title": "Links", "items": [{"label": "Home", "url": "/"}, "x"]}]}
        }));
        let BlockKind::Footer(footer) = block.kind() else {
            panic!("expected footer");
        };
        assert_eq!(footer.content.logo.icon, "Activity");
        assert_eq!(footer.content.columns[0].items.len(), 2);
        assert_eq!(footer.content.columns[0].items[0].label, "Home");
    }

    #[test]
    fn test_youtube_aspect_ratio() {
        let mut settings = YouTubeSettings::default();
        assert!((settings.padding_percent() - 56.25).abs() < 1e-9);
        settings.aspect_ratio = s("4:3");
        assert!((settings.padding_percent() - 75.0).abs() < 1e-9);
        settings.aspect_ratio = s("wide");
        assert!((settings.padding_percent() - 56.25).abs() < 1e-9);
        settings.aspect_ratio = s("0:9");
        assert!((settings.padding_percent() - 56.25).abs() < 1e-9);
    }

    #[test]
    fn test_starter_contact_has_default_fields() {
        let payload = starter_payload(BlockType::Contact);
        let names: Vec<&str> = payload["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["name", "email", "message"]);
        assert_eq!(payload["settings"]["submitButton"]["text"], "Enviar");
    }

    #[test]
    fn test_new_record_defaults() {
        let items = FieldPath::from_str("items").unwrap();
        let feature = new_record(BlockType::Features, &items, 0).unwrap();
        assert_eq!(feature["title"], "Novo Recurso");

        let fields = FieldPath::from_str("fields").unwrap();
        let field = new_record(BlockType::Contact, &fields, 3).unwrap();
        assert_eq!(field["name"], "field_4");

        let slides = FieldPath::from_str("slides").unwrap();
        let a = new_record(BlockType::Slide, &slides, 0).unwrap();
        let b = new_record(BlockType::Slide, &slides, 1).unwrap();
        assert_ne!(a["id"], b["id"]);

        let links = FieldPath::from_str("content.columns.0.items").unwrap();
        assert!(new_record(BlockType::Footer, &links, 0).is_some());
        assert!(new_record(BlockType::Hero, &items, 0).is_none());
        assert!(new_record(BlockType::Features, &slides, 0).is_none());
    }
}
