//! Database models - structs representing the CMS tables (used by sqlx/serde).

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::FromRow;
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::blocks::schema::{default_contact_fields, ContactField};
use crate::blocks::{blocks_from_value, BlockTemplate};
use crate::pages::{Page, PageSettings};

/// User model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Account-wide role. Only admins manage other accounts.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Editor,
    Viewer,
}

/// Account to insert; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: UserRole,
}

/// Profile update; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
}

/// Role of a user within one site.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SiteRole {
    Owner,
    #[default]
    Editor,
    Viewer,
}

/// A `site_users` row joined with the member's account.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SiteMember {
    pub site_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub email: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Site model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Site {
    pub id: Uuid,
    pub name: String,
    pub domain: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New site for insertion
#[derive(Debug, Clone, Deserialize)]
pub struct NewSite {
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Site update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteUpdate {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// Row shape of `site_pages`; blocks and settings arrive as raw JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct PageRow {
    pub id: Uuid,
    pub site_id: Uuid,
    pub template_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub blocks: Value,
    pub is_published: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub settings: Value,
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PageRow> for Page {
    fn from(row: PageRow) -> Self {
        Page {
            id: row.id,
            site_id: row.site_id,
            template_id: row.template_id,
            title: row.title,
            slug: row.slug,
            blocks: blocks_from_value(row.blocks),
            is_published: row.is_published,
            meta_title: row.meta_title,
            meta_description: row.meta_description,
            settings: PageSettings::from_value(row.settings),
            author_id: row.author_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Page template model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PageTemplate {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Row shape of `page_blocks` (the block catalog).
#[derive(Debug, Clone, FromRow)]
pub struct BlockTemplateRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub content: Value,
}

impl From<BlockTemplateRow> for BlockTemplate {
    fn from(row: BlockTemplateRow) -> Self {
        BlockTemplate {
            id: row.id.to_string(),
            name: row.name,
            description: row.description,
            category: row.category,
            content: row.content,
        }
    }
}

/// Per-site lead capture configuration.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LeadSettings {
    pub site_id: Uuid,
    pub is_enabled: bool,
    pub notification_email: Option<String>,
    pub success_message: String,
    pub form_title: String,
    pub button_text: String,
    pub fields: Json<Vec<ContactField>>,
    pub auto_response_enabled: bool,
    pub auto_response_subject: Option<String>,
    pub auto_response_body: Option<String>,
}

impl LeadSettings {
    pub fn defaults_for(site_id: Uuid) -> Self {
        Self {
            site_id,
            is_enabled: false,
            notification_email: None,
            success_message: "Obrigado pelo contato! Em breve retornaremos.".to_string(),
            form_title: "Entre em contato".to_string(),
            button_text: "Enviar".to_string(),
            fields: Json(vec![
                ContactField::new("text", "name", "Nome", true),
                ContactField::new("email", "email", "E-mail", true),
                ContactField::new("tel", "phone", "Telefone", false),
                ContactField::new("textarea", "message", "Mensagem", true),
            ]),
            auto_response_enabled: false,
            auto_response_subject: None,
            auto_response_body: None,
        }
    }
}

/// Body accepted when saving lead settings; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadSettingsUpdate {
    pub is_enabled: Option<bool>,
    pub notification_email: Option<String>,
    pub success_message: Option<String>,
    pub form_title: Option<String>,
    pub button_text: Option<String>,
    pub fields: Option<Vec<ContactField>>,
    pub auto_response_enabled: Option<bool>,
    pub auto_response_subject: Option<String>,
    pub auto_response_body: Option<String>,
}

impl LeadSettings {
    pub fn apply(&mut self, update: LeadSettingsUpdate) {
        if let Some(v) = update.is_enabled {
            self.is_enabled = v;
        }
        if let Some(v) = update.notification_email {
            self.notification_email = Some(v).filter(|e| !e.trim().is_empty());
        }
        if let Some(v) = update.success_message {
            self.success_message = v;
        }
        if let Some(v) = update.form_title {
            self.form_title = v;
        }
        if let Some(v) = update.button_text {
            self.button_text = v;
        }
        if let Some(v) = update.fields {
            self.fields = Json(if v.is_empty() { default_contact_fields() } else { v });
        }
        if let Some(v) = update.auto_response_enabled {
            self.auto_response_enabled = v;
        }
        if let Some(v) = update.auto_response_subject {
            self.auto_response_subject = Some(v);
        }
        if let Some(v) = update.auto_response_body {
            self.auto_response_body = Some(v);
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Converted,
    Archived,
}

/// Lead model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub site_id: Uuid,
    pub data: Map<String, Value>,
    pub source_url: Option<String>,
    pub status: LeadStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of `leads`; status is stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct LeadRow {
    pub id: Uuid,
    pub site_id: Uuid,
    pub data: Value,
    pub source_url: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LeadRow> for Lead {
    fn from(row: LeadRow) -> Self {
        let status = LeadStatus::from_str(&row.status).unwrap_or_else(|_| {
            tracing::warn!(lead_id = %row.id, status = %row.status, "unknown lead status");
            LeadStatus::New
        });
        let data = match row.data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Lead {
            id: row.id,
            site_id: row.site_id,
            data,
            source_url: row.source_url,
            status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// New lead for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLead {
    pub site_id: Uuid,
    pub data: Map<String, Value>,
    pub source_url: Option<String>,
}
