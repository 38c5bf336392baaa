//! Editing surface for a single block.
//!
//! [`form`] describes the two tabs (content and settings) of a block as
//! plain data: labelled fields bound to dotted paths, and list editors whose
//! records can be appended, removed and dragged. Every change comes back as
//! an [`EditOp`], and [`apply`] turns it into a whole replacement block.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::icons::Icon;
use super::path::{get_path, FieldPath, PathError};
use super::reorder::move_item;
use super::schema::{
    self, Buttons, Columns, Contact, Divider, Features, Footer, FooterColumn, GoogleMap, Hero,
    IconGrid, Menu, RichText, Slide, Testimonials, YouTube,
};
use super::{Block, BlockKind, BlockType};

pub const UNSUPPORTED_EDITOR: &str = "Tipo de bloco não suportado";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Content,
    Settings,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Tab::Content => "Conteúdo",
            Tab::Settings => "Configurações",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Control {
    Text,
    Textarea,
    Number,
    Checkbox,
    Select { options: Vec<SelectOption> },
}

/// One input bound to a path inside the block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub path: String,
    pub label: String,
    pub control: Control,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRecord {
    pub index: usize,
    pub fields: Vec<FormField>,
    /// Lists nested inside the record (footer column links).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lists: Vec<ListEditor>,
}

/// An ordered list of records with append, remove and drag-to-reorder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEditor {
    pub path: String,
    pub label: String,
    pub add_label: String,
    pub records: Vec<ListRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub fields: Vec<FormField>,
    pub lists: Vec<ListEditor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorForm {
    pub block_id: String,
    pub block_type: BlockType,
    pub tab: Tab,
    pub sections: Vec<FormSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum EditorView {
    Form(EditorForm),
    Invalid { message: String },
}

/// Describe the editor for `block` on `tab`.
pub fn form(block: &Block, tab: Tab) -> EditorView {
    let sections = match block.kind() {
        BlockKind::Hero(hero) => hero_form(&hero, tab),
        BlockKind::Features(features) => features_form(&features, tab),
        BlockKind::Testimonials(t) => testimonials_form(&t, tab),
        BlockKind::Contact(contact) => contact_form(&contact, tab),
        BlockKind::Slide(slide) => slide_form(&slide, tab),
        BlockKind::Menu(menu) => menu_form(&menu, tab),
        BlockKind::RichText(text) => rich_text_form(&text, tab),
        BlockKind::Columns(columns) => columns_form(&columns, tab),
        BlockKind::Footer(footer) => footer_form(&footer, tab),
        BlockKind::YouTube(video) => youtube_form(&video, tab),
        BlockKind::Divider(divider) => divider_form(&divider, tab),
        BlockKind::Icons(icons) => icons_form(&icons, tab),
        BlockKind::Buttons(buttons) => buttons_form(&buttons, tab),
        BlockKind::GoogleMap(map) => google_map_form(&map, tab),
        BlockKind::Unsupported(tag) => {
            return EditorView::Invalid {
                message: format!("{UNSUPPORTED_EDITOR}: {tag}"),
            }
        }
        BlockKind::Invalid => {
            return EditorView::Invalid {
                message: super::render::INVALID_BLOCK.to_string(),
            }
        }
    };
    let Some(block_type) = block.block_type() else {
        return EditorView::Invalid {
            message: super::render::INVALID_BLOCK.to_string(),
        };
    };
    EditorView::Form(EditorForm {
        block_id: block.id_str().to_string(),
        block_type,
        tab,
        sections,
    })
}

// ---------------------------------------------------------------------------
// field builders

fn field(path: impl Into<String>, label: &str, control: Control, value: Value) -> FormField {
    FormField {
        path: path.into(),
        label: label.to_string(),
        control,
        value,
    }
}

fn text(path: impl Into<String>, label: &str, value: &str) -> FormField {
    field(path, label, Control::Text, Value::from(value))
}

fn textarea(path: impl Into<String>, label: &str, value: &str) -> FormField {
    field(path, label, Control::Textarea, Value::from(value))
}

fn number(path: impl Into<String>, label: &str, value: impl Into<Value>) -> FormField {
    field(path, label, Control::Number, value.into())
}

fn checkbox(path: impl Into<String>, label: &str, value: bool) -> FormField {
    field(path, label, Control::Checkbox, Value::Bool(value))
}

fn select(path: impl Into<String>, label: &str, value: &str, options: &[(&str, &str)]) -> FormField {
    let options = options
        .iter()
        .map(|(value, label)| SelectOption {
            value: value.to_string(),
            label: label.to_string(),
        })
        .collect();
    field(path, label, Control::Select { options }, Value::from(value))
}

fn icon_select(path: impl Into<String>, label: &str, value: &str) -> FormField {
    let options = Icon::names()
        .into_iter()
        .map(|name| SelectOption {
            value: name.to_string(),
            label: name.to_string(),
        })
        .collect();
    field(path, label, Control::Select { options }, Value::from(value))
}

const ALIGN: &[(&str, &str)] = &[("left", "Esquerda"), ("center", "Centro"), ("right", "Direita")];
const LAYOUT: &[(&str, &str)] = &[("horizontal", "Horizontal"), ("vertical", "Vertical")];
const BUTTON_STYLE: &[(&str, &str)] = &[
    ("primary", "Primário"),
    ("secondary", "Secundário"),
    ("outline", "Contorno"),
];

fn section(fields: Vec<FormField>) -> Vec<FormSection> {
    vec![FormSection {
        title: None,
        fields,
        lists: Vec::new(),
    }]
}

fn titled(title: &str, fields: Vec<FormField>) -> FormSection {
    FormSection {
        title: Some(title.to_string()),
        fields,
        lists: Vec::new(),
    }
}

fn list_section<T>(
    path: &str,
    label: &str,
    add_label: &str,
    items: &[T],
    record: impl Fn(&str, &T) -> Vec<FormField>,
) -> Vec<FormSection> {
    vec![FormSection {
        title: None,
        fields: Vec::new(),
        lists: vec![list(path, label, add_label, items, record)],
    }]
}

fn list<T>(
    path: &str,
    label: &str,
    add_label: &str,
    items: &[T],
    record: impl Fn(&str, &T) -> Vec<FormField>,
) -> ListEditor {
    ListEditor {
        path: path.to_string(),
        label: label.to_string(),
        add_label: add_label.to_string(),
        records: items
            .iter()
            .enumerate()
            .map(|(index, item)| ListRecord {
                index,
                fields: record(&format!("{path}.{index}"), item),
                lists: Vec::new(),
            })
            .collect(),
    }
}

fn at(prefix: &str, key: &str) -> String {
    format!("{prefix}.{key}")
}

// ---------------------------------------------------------------------------
// per-type editors

fn hero_form(hero: &Hero, tab: Tab) -> Vec<FormSection> {
    match tab {
        Tab::Content => section(vec![
            text("content.title", "Título", &hero.content.title),
            text("content.subtitle", "Subtítulo", &hero.content.subtitle),
            text("content.button.text", "Texto do Botão", &hero.content.button.text),
            text("content.button.url", "URL do Botão", &hero.content.button.url),
        ]),
        Tab::Settings => {
            let s = &hero.settings;
            let mut layout = vec![
                text("settings.height", "Altura", &s.height),
                select("settings.alignment", "Alinhamento", &s.alignment, ALIGN),
                checkbox("settings.overlay", "Usar overlay", s.overlay),
            ];
            if s.overlay {
                layout.push(text("settings.overlayColor", "Cor do Overlay", &s.overlay_color));
            }
            let bg = &hero.background;
            vec![
                titled("Layout", layout),
                titled(
                    "Fundo",
                    vec![
                        select(
                            "background.type",
                            "Tipo de Fundo",
                            &bg.kind,
                            &[("color", "Cor"), ("image", "Imagem")],
                        ),
                        text("background.url", "URL da Imagem", &bg.url),
                        select(
                            "background.position",
                            "Posição",
                            &bg.position,
                            &[("center", "Centro"), ("top", "Topo"), ("bottom", "Base")],
                        ),
                        select(
                            "background.size",
                            "Tamanho",
                            &bg.size,
                            &[("cover", "Cover"), ("contain", "Contain"), ("auto", "Auto")],
                        ),
                    ],
                ),
            ]
        }
    }
}

fn features_form(features: &Features, tab: Tab) -> Vec<FormSection> {
    match tab {
        Tab::Content => list_section(
            "items",
            "Recursos",
            "Adicionar Recurso",
            &features.items,
            |p, item| {
                vec![
                    icon_select(at(p, "icon"), "Ícone", &item.icon),
                    text(at(p, "title"), "Título", &item.title),
                    textarea(at(p, "description"), "Descrição", &item.description),
                ]
            },
        ),
        Tab::Settings => section(vec![
            select(
                "settings.columns",
                "Colunas",
                &features.settings.columns.to_string(),
                &[("2", "2 Colunas"), ("3", "3 Colunas"), ("4", "4 Colunas")],
            ),
            text("settings.gap", "Espaçamento", &features.settings.gap),
        ]),
    }
}

fn autoplay_fields(autoplay: bool, interval: u64) -> Vec<FormField> {
    let mut fields = vec![checkbox("settings.autoplay", "Reprodução automática", autoplay)];
    if autoplay {
        fields.push(number("settings.interval", "Intervalo (ms)", interval));
    }
    fields
}

fn testimonials_form(t: &Testimonials, tab: Tab) -> Vec<FormSection> {
    match tab {
        Tab::Content => list_section(
            "items",
            "Depoimentos",
            "Adicionar Depoimento",
            &t.items,
            |p, item| {
                vec![
                    text(at(p, "name"), "Nome", &item.name),
                    text(at(p, "role"), "Cargo", &item.role),
                    text(at(p, "company"), "Empresa", &item.company),
                    text(at(p, "image"), "URL da Foto", &item.image),
                    textarea(at(p, "text"), "Depoimento", &item.text),
                ]
            },
        ),
        Tab::Settings => section(autoplay_fields(t.settings.autoplay, t.settings.interval)),
    }
}

fn contact_form(contact: &Contact, tab: Tab) -> Vec<FormSection> {
    match tab {
        Tab::Content => list_section(
            "fields",
            "Campos do Formulário",
            "Adicionar Campo",
            &contact.fields,
            |p, f| {
                vec![
                    select(
                        at(p, "type"),
                        "Tipo",
                        &f.field_type,
                        &[
                            ("text", "Texto"),
                            ("email", "E-mail"),
                            ("tel", "Telefone"),
                            ("textarea", "Área de texto"),
                        ],
                    ),
                    text(at(p, "name"), "Nome do Campo", &f.name),
                    text(at(p, "label"), "Rótulo", &f.label),
                    checkbox(at(p, "required"), "Campo obrigatório", f.required),
                ]
            },
        ),
        Tab::Settings => {
            let s = &contact.settings;
            section(vec![
                select(
                    "settings.layout",
                    "Layout",
                    &s.layout,
                    &[("stacked", "Empilhado"), ("inline", "Em linha")],
                ),
                text("settings.submitButton.text", "Texto do Botão", &s.submit_button.text),
                select(
                    "settings.submitButton.style",
                    "Estilo do Botão",
                    &s.submit_button.style,
                    &BUTTON_STYLE[..2],
                ),
            ])
        }
    }
}

fn slide_form(slide: &Slide, tab: Tab) -> Vec<FormSection> {
    match tab {
        Tab::Content => list_section(
            "slides",
            "Slides",
            "Adicionar Slide",
            &slide.slides,
            |p, s| {
                vec![
                    text(at(p, "image_url"), "URL da Imagem", &s.image_url),
                    text(at(p, "title"), "Título", &s.title),
                    text(at(p, "subtitle"), "Subtítulo", &s.subtitle),
                    text(at(p, "button_text"), "Texto do Botão", &s.button_text),
                    text(at(p, "button_url"), "URL do Botão", &s.button_url),
                ]
            },
        ),
        Tab::Settings => {
            let s = &slide.settings;
            let mut fields = vec![text("settings.height", "Altura", &s.height)];
            fields.extend(autoplay_fields(s.autoplay, s.interval));
            fields.push(checkbox("settings.overlay", "Usar overlay", s.overlay));
            if s.overlay {
                fields.push(text("settings.overlayColor", "Cor do Overlay", &s.overlay_color));
            }
            section(fields)
        }
    }
}

fn menu_form(menu: &Menu, tab: Tab) -> Vec<FormSection> {
    match tab {
        Tab::Content => {
            let mut sections = list_section(
                "items",
                "Itens do Menu",
                "Adicionar Item",
                &menu.items,
                |p, item| {
                    vec![
                        text(at(p, "label"), "Texto", &item.label),
                        text(at(p, "url"), "URL", &item.url),
                        checkbox(at(p, "isAnchor"), "Link para âncora na página", item.is_anchor),
                    ]
                },
            );
            sections.push(titled(
                "Logo",
                vec![
                    text("settings.logo.url", "URL do Logo", &menu.settings.logo.url),
                    text("settings.logo.height", "Altura do Logo", &menu.settings.logo.height),
                ],
            ));
            sections
        }
        Tab::Settings => {
            let s = &menu.settings;
            section(vec![
                select(
                    "settings.position",
                    "Posição",
                    &s.position,
                    &[("top", "Topo"), ("left", "Esquerda"), ("right", "Direita")],
                ),
                select(
                    "settings.style",
                    "Estilo",
                    &s.style,
                    &[("fixed", "Fixo"), ("absolute", "Absoluto")],
                ),
                select("settings.alignment", "Alinhamento dos Links", &s.alignment, ALIGN),
                text("settings.backgroundColor", "Cor de Fundo", &s.background_color),
                text("settings.textColor", "Cor do Texto", &s.text_color),
                text("settings.hoverColor", "Cor do Hover", &s.hover_color),
            ])
        }
    }
}

fn rich_text_form(text_block: &RichText, tab: Tab) -> Vec<FormSection> {
    match tab {
        Tab::Content => section(vec![
            text("content.title", "Título", &text_block.content.title),
            text("content.subtitle", "Subtítulo", &text_block.content.subtitle),
            textarea("content.text", "Texto", &text_block.content.text),
        ]),
        Tab::Settings => section(vec![
            text("settings.maxWidth", "Largura Máxima", &text_block.settings.max_width),
            select(
                "settings.alignment",
                "Alinhamento",
                &text_block.settings.alignment,
                &[
                    ("left", "Esquerda"),
                    ("center", "Centro"),
                    ("right", "Direita"),
                    ("justify", "Justificado"),
                ],
            ),
            text("settings.padding", "Espaçamento Interno", &text_block.settings.padding),
        ]),
    }
}

fn columns_form(columns: &Columns, tab: Tab) -> Vec<FormSection> {
    match tab {
        Tab::Content => list_section(
            "items",
            "Colunas",
            "Adicionar Coluna",
            &columns.items,
            |p, item| {
                vec![
                    text(at(p, "title"), "Título", &item.title),
                    textarea(at(p, "content"), "Conteúdo", &item.content),
                ]
            },
        ),
        Tab::Settings => section(vec![
            number("settings.columns", "Número de Colunas", columns.settings.columns),
            text("settings.gap", "Espaçamento", &columns.settings.gap),
            text("settings.padding", "Espaçamento Interno", &columns.settings.padding),
            select(
                "settings.alignment",
                "Alinhamento Vertical",
                &columns.settings.alignment,
                &[
                    ("stretch", "Esticar"),
                    ("start", "Topo"),
                    ("center", "Centro"),
                    ("end", "Base"),
                ],
            ),
        ]),
    }
}

fn footer_column(path: &str, index: usize, column: &FooterColumn) -> ListRecord {
    let prefix = format!("{path}.{index}");
    ListRecord {
        index,
        fields: vec![text(at(&prefix, "title"), "Título da Coluna", &column.title)],
        lists: vec![list(
            &at(&prefix, "items"),
            "Links",
            "Adicionar Link",
            &column.items,
            |p, entry| {
                vec![
                    text(at(p, "label"), "Texto", &entry.label),
                    text(at(p, "url"), "URL", &entry.url),
                    icon_select(at(p, "icon"), "Ícone", &entry.icon),
                    text(at(p, "text"), "Texto Livre", &entry.text),
                ]
            },
        )],
    }
}

fn footer_form(footer: &Footer, tab: Tab) -> Vec<FormSection> {
    match tab {
        Tab::Content => {
            let c = &footer.content;
            let columns = ListEditor {
                path: "content.columns".to_string(),
                label: "Colunas".to_string(),
                add_label: "Adicionar Coluna".to_string(),
                records: c
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(i, column)| footer_column("content.columns", i, column))
                    .collect(),
            };
            vec![FormSection {
                title: None,
                fields: vec![
                    icon_select("content.logo.icon", "Ícone do Logo", &c.logo.icon),
                    text("content.logo.text", "Texto do Logo", &c.logo.text),
                    textarea("content.description", "Descrição", &c.description),
                    text("content.copyright", "Copyright", &c.copyright),
                ],
                lists: vec![columns],
            }]
        }
        Tab::Settings => section(vec![
            text("settings.backgroundColor", "Cor de Fundo", &footer.settings.background_color),
            text("settings.textColor", "Cor do Texto", &footer.settings.text_color),
            text("settings.padding", "Espaçamento Interno", &footer.settings.padding),
            number("settings.columns", "Número de Colunas", footer.settings.columns),
        ]),
    }
}

fn youtube_form(video: &YouTube, tab: Tab) -> Vec<FormSection> {
    match tab {
        Tab::Content => section(vec![
            text("content.videoId", "ID do Vídeo", &video.content.video_id),
            text("content.title", "Título", &video.content.title),
            textarea("content.description", "Descrição", &video.content.description),
        ]),
        Tab::Settings => section(vec![
            select(
                "settings.aspectRatio",
                "Proporção",
                &video.settings.aspect_ratio,
                &[("16:9", "16:9"), ("4:3", "4:3"), ("1:1", "1:1")],
            ),
            text("settings.maxWidth", "Largura Máxima", &video.settings.max_width),
            checkbox("settings.showControls", "Mostrar controles", video.settings.show_controls),
            checkbox("settings.autoplay", "Reprodução automática", video.settings.autoplay),
        ]),
    }
}

fn divider_form(divider: &Divider, tab: Tab) -> Vec<FormSection> {
    let s = &divider.settings;
    match tab {
        Tab::Content => {
            let mut fields = vec![checkbox("settings.showIcon", "Mostrar ícone", s.show_icon)];
            if s.show_icon {
                fields.push(icon_select("settings.icon", "Ícone", &s.icon));
            }
            section(fields)
        }
        Tab::Settings => section(vec![
            select(
                "settings.style",
                "Estilo",
                &s.style,
                &[("solid", "Sólido"), ("dashed", "Tracejado"), ("dotted", "Pontilhado")],
            ),
            text("settings.color", "Cor", &s.color),
            text("settings.width", "Largura", &s.width),
            text("settings.height", "Espessura", &s.height),
            text("settings.margin", "Margem", &s.margin),
        ]),
    }
}

fn icons_form(icons: &IconGrid, tab: Tab) -> Vec<FormSection> {
    match tab {
        Tab::Content => list_section("items", "Ícones", "Adicionar Ícone", &icons.items, |p, item| {
            vec![
                icon_select(at(p, "icon"), "Ícone", &item.icon),
                text(at(p, "label"), "Rótulo", &item.label),
            ]
        }),
        Tab::Settings => section(vec![
            number("settings.size", "Tamanho (px)", icons.settings.size),
            text("settings.color", "Cor", &icons.settings.color),
            select("settings.layout", "Layout", &icons.settings.layout, LAYOUT),
            text("settings.spacing", "Espaçamento", &icons.settings.spacing),
            select("settings.alignment", "Alinhamento", &icons.settings.alignment, ALIGN),
        ]),
    }
}

fn buttons_form(buttons: &Buttons, tab: Tab) -> Vec<FormSection> {
    match tab {
        Tab::Content => list_section(
            "items",
            "Botões",
            "Adicionar Botão",
            &buttons.items,
            |p, item| {
                vec![
                    text(at(p, "text"), "Texto", &item.text),
                    text(at(p, "url"), "URL", &item.url),
                    select(at(p, "style"), "Estilo", &item.style, BUTTON_STYLE),
                    icon_select(at(p, "icon"), "Ícone", &item.icon),
                    select(
                        at(p, "iconPosition"),
                        "Posição do Ícone",
                        &item.icon_position,
                        &[("left", "Esquerda"), ("right", "Direita")],
                    ),
                ]
            },
        ),
        Tab::Settings => section(vec![
            select("settings.layout", "Layout", &buttons.settings.layout, LAYOUT),
            text("settings.spacing", "Espaçamento", &buttons.settings.spacing),
            select("settings.alignment", "Alinhamento", &buttons.settings.alignment, ALIGN),
        ]),
    }
}

fn google_map_form(map: &GoogleMap, tab: Tab) -> Vec<FormSection> {
    match tab {
        Tab::Content => section(vec![
            text("content.address", "Endereço", &map.content.address),
            number("content.lat", "Latitude", map.content.lat),
            number("content.lng", "Longitude", map.content.lng),
        ]),
        Tab::Settings => section(vec![
            text("settings.height", "Altura", &map.settings.height),
            number("settings.zoom", "Zoom", map.settings.zoom),
            checkbox("settings.showControls", "Mostrar controles", map.settings.show_controls),
            checkbox(
                "settings.allowFullscreen",
                "Permitir tela cheia",
                map.settings.allow_fullscreen,
            ),
        ]),
    }
}

// ---------------------------------------------------------------------------
// edits

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    SetField { path: FieldPath, value: Value },
    AppendRecord { list: FieldPath },
    RemoveRecord { list: FieldPath, index: usize },
    MoveRecord { list: FieldPath, from: usize, to: usize },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("block has no valid type")]
    InvalidBlock,
    #[error("'{0}' is not a list")]
    NotAList(String),
    #[error("records cannot be added to '{0}'")]
    NotAppendable(String),
    #[error("record {index} of '{list}' does not exist ({len} records)")]
    NoSuchRecord {
        list: String,
        index: usize,
        len: usize,
    },
}

/// Apply `op` to a copy of `block` and return the replacement.
pub fn apply(block: &Block, op: &EditOp) -> Result<Block, EditError> {
    match op {
        EditOp::SetField { path, value } => Ok(block.with_path(path, value.clone())?),
        EditOp::AppendRecord { list } => {
            let block_type = block.block_type().ok_or(EditError::InvalidBlock)?;
            let mut records = list_at(block, list)?;
            let record = schema::new_record(block_type, list, records.len())
                .ok_or_else(|| EditError::NotAppendable(list.to_string()))?;
            records.push(record);
            Ok(block.with_path(list, Value::Array(records))?)
        }
        EditOp::RemoveRecord { list, index } => {
            let mut records = list_at(block, list)?;
            if *index >= records.len() {
                return Err(no_such_record(list, *index, records.len()));
            }
            records.remove(*index);
            Ok(block.with_path(list, Value::Array(records))?)
        }
        EditOp::MoveRecord { list, from, to } => {
            let mut records = list_at(block, list)?;
            let len = records.len();
            for index in [*from, *to] {
                if index >= len {
                    return Err(no_such_record(list, index, len));
                }
            }
            if !move_item(&mut records, *from, *to) {
                return Ok(block.clone());
            }
            Ok(block.with_path(list, Value::Array(records))?)
        }
    }
}

fn no_such_record(list: &FieldPath, index: usize, len: usize) -> EditError {
    EditError::NoSuchRecord {
        list: list.to_string(),
        index,
        len,
    }
}

/// Records currently stored at `list`; an absent list is empty.
fn list_at(block: &Block, list: &FieldPath) -> Result<Vec<Value>, EditError> {
    let root = block.to_value();
    match get_path(&root, list) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(_) => Err(EditError::NotAList(list.to_string())),
    }
}
