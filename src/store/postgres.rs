use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{page_slug, Store, StoreError, StoreResult};
use crate::blocks::render::PageLink;
use crate::blocks::{Block, BlockTemplate};
use crate::db::models::{
    BlockTemplateRow, Lead, LeadRow, LeadSettings, LeadStatus, NewLead, NewSite, NewUser, PageRow,
    PageTemplate, Site, SiteMember, SiteRole, SiteUpdate, User, UserUpdate,
};
use crate::pages::{NewPage, Page, PageSettings, PageUpdate};

const PAGE_COLUMNS: &str = "id, site_id, template_id, title, slug, blocks, is_published, \
     meta_title, meta_description, settings, author_id, created_at, updated_at";

const USER_COLUMNS: &str = "id, email, password_hash, full_name, role, created_at";

/// Joins a membership CTE named `m` with its account.
const MEMBER_SELECT: &str = "SELECT m.site_id, m.user_id, m.role, u.email, u.full_name, m.created_at \
     FROM m JOIN users u ON u.id = m.user_id";

const LEAD_COLUMNS: &str = "id, site_id, data, source_url, status, notes, created_at, updated_at";

const LEAD_SETTINGS_COLUMNS: &str = "site_id, is_enabled, notification_email, success_message, \
     form_title, button_text, fields, auto_response_enabled, auto_response_subject, \
     auto_response_body";

/// Postgres-backed store. Blocks and page settings live in JSONB columns.
#[derive(Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        self.pool.as_ref()
    }

    /// Create the admin account on first start. An existing account keeps
    /// its password.
    pub async fn ensure_admin(&self, email: &str, password_hash: &str) -> StoreResult<()> {
        let inserted = sqlx::query(
            "INSERT INTO users (email, password_hash, role) VALUES (lower($1), $2, 'admin') \
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(email.trim())
        .bind(password_hash)
        .execute(self.pool())
        .await?
        .rows_affected();
        if inserted > 0 {
            tracing::info!(email, "admin account created");
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::db::health_check(self.pool()).await?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, full_name, role, created_at \
             FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email.trim())
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(users)
    }

    async fn get_user(&self, user_id: Uuid) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_one(self.pool())
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, full_name, role) \
             VALUES (lower($1), $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(user.email.trim())
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role.as_ref())
        .fetch_one(self.pool())
        .await?;
        Ok(created)
    }

    async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
                full_name = CASE WHEN $2::text IS NULL THEN full_name ELSE NULLIF(trim($2), '') END, \
                role = COALESCE($3, role) \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&update.full_name)
        .bind(update.role.map(|r| r.to_string()))
        .fetch_one(self.pool())
        .await?;
        Ok(user)
    }

    async fn set_user_password(&self, user_id: Uuid, password_hash: &str) -> StoreResult<()> {
        let updated = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(self.pool())
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: Uuid) -> StoreResult<()> {
        // site_users rows cascade; owned sites keep existing with no owner
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.pool())
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_site_members(&self, site_id: Uuid) -> StoreResult<Vec<SiteMember>> {
        let members = sqlx::query_as::<_, SiteMember>(&format!(
            "WITH m AS (SELECT * FROM site_users WHERE site_id = $1) \
             {MEMBER_SELECT} ORDER BY m.created_at"
        ))
        .bind(site_id)
        .fetch_all(self.pool())
        .await?;
        Ok(members)
    }

    async fn add_site_member(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        role: SiteRole,
    ) -> StoreResult<SiteMember> {
        let member = sqlx::query_as::<_, SiteMember>(&format!(
            "WITH m AS (INSERT INTO site_users (site_id, user_id, role) \
             VALUES ($1, $2, $3) RETURNING *) {MEMBER_SELECT}"
        ))
        .bind(site_id)
        .bind(user_id)
        .bind(role.as_ref())
        .fetch_one(self.pool())
        .await?;
        Ok(member)
    }

    async fn update_site_member(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        role: SiteRole,
    ) -> StoreResult<SiteMember> {
        let member = sqlx::query_as::<_, SiteMember>(&format!(
            "WITH m AS (UPDATE site_users SET role = $3 \
             WHERE site_id = $1 AND user_id = $2 RETURNING *) {MEMBER_SELECT}"
        ))
        .bind(site_id)
        .bind(user_id)
        .bind(role.as_ref())
        .fetch_one(self.pool())
        .await?;
        Ok(member)
    }

    async fn remove_site_member(&self, site_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let deleted = sqlx::query("DELETE FROM site_users WHERE site_id = $1 AND user_id = $2")
            .bind(site_id)
            .bind(user_id)
            .execute(self.pool())
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_sites(&self) -> StoreResult<Vec<Site>> {
        let sites = sqlx::query_as::<_, Site>("SELECT * FROM sites ORDER BY created_at DESC")
            .fetch_all(self.pool())
            .await?;
        Ok(sites)
    }

    async fn get_site(&self, site_id: Uuid) -> StoreResult<Site> {
        let site = sqlx::query_as::<_, Site>("SELECT * FROM sites WHERE id = $1")
            .bind(site_id)
            .fetch_one(self.pool())
            .await?;
        Ok(site)
    }

    async fn create_site(&self, site: NewSite, owner: Uuid) -> StoreResult<Site> {
        let mut tx = self.pool().begin().await?;
        let created = sqlx::query_as::<_, Site>(
            "INSERT INTO sites (name, domain, description, owner_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&site.name)
        .bind(&site.domain)
        .bind(&site.description)
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query("INSERT INTO site_users (site_id, user_id, role) VALUES ($1, $2, 'owner')")
            .bind(created.id)
            .bind(owner)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn update_site(&self, site_id: Uuid, update: SiteUpdate) -> StoreResult<Site> {
        let site = sqlx::query_as::<_, Site>(
            "UPDATE sites SET \
                name = COALESCE($2, name), \
                domain = CASE WHEN $3::text IS NULL THEN domain ELSE NULLIF($3, '') END, \
                description = COALESCE($4, description), \
                status = COALESCE($5, status), \
                updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(site_id)
        .bind(&update.name)
        .bind(&update.domain)
        .bind(&update.description)
        .bind(&update.status)
        .fetch_one(self.pool())
        .await?;
        Ok(site)
    }

    async fn delete_site(&self, site_id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM sites WHERE id = $1")
            .bind(site_id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_pages(&self, site_id: Uuid) -> StoreResult<Vec<Page>> {
        let rows = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM site_pages WHERE site_id = $1 ORDER BY created_at ASC"
        ))
        .bind(site_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Page::from).collect())
    }

    async fn list_published_pages(&self, site_id: Uuid) -> StoreResult<Vec<PageLink>> {
        let rows = sqlx::query_as::<_, (Uuid, String, String)>(
            "SELECT id, title, slug FROM site_pages \
             WHERE site_id = $1 AND is_published = true ORDER BY created_at ASC",
        )
        .bind(site_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, title, slug)| PageLink {
                id: id.to_string(),
                title,
                slug,
            })
            .collect())
    }

    async fn get_page(&self, site_id: Uuid, page_id: Uuid) -> StoreResult<Page> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM site_pages WHERE id = $1 AND site_id = $2"
        ))
        .bind(page_id)
        .bind(site_id)
        .fetch_one(self.pool())
        .await?;
        Ok(row.into())
    }

    async fn get_published_page(&self, site_id: Uuid, slug: &str) -> StoreResult<Page> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM site_pages \
             WHERE site_id = $1 AND slug = $2 AND is_published = true"
        ))
        .bind(site_id)
        .bind(slug)
        .fetch_one(self.pool())
        .await?;
        Ok(row.into())
    }

    async fn create_page(
        &self,
        site_id: Uuid,
        page: NewPage,
        author: Option<Uuid>,
    ) -> StoreResult<Page> {
        let slug = page_slug(&page);
        let settings = serde_json::to_value(PageSettings::default())?;
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "INSERT INTO site_pages \
                (site_id, template_id, title, slug, blocks, meta_title, meta_description, settings, author_id) \
             VALUES ($1, $2, $3, $4, '[]'::jsonb, $5, $6, $7, $8) \
             RETURNING {PAGE_COLUMNS}"
        ))
        .bind(site_id)
        .bind(page.template_id)
        .bind(&page.title)
        .bind(&slug)
        .bind(&page.meta_title)
        .bind(&page.meta_description)
        .bind(settings)
        .bind(author)
        .fetch_one(self.pool())
        .await
        .map_err(|err| match StoreError::from(err) {
            StoreError::Database(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                StoreError::NotFound
            }
            other => other,
        })?;
        Ok(row.into())
    }

    async fn update_page(
        &self,
        site_id: Uuid,
        page_id: Uuid,
        update: PageUpdate,
    ) -> StoreResult<Page> {
        let mut page = self.get_page(site_id, page_id).await?;
        page.apply(update, Utc::now());
        let settings = serde_json::to_value(&page.settings)?;
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "UPDATE site_pages SET title = $3, slug = $4, is_published = $5, meta_title = $6, \
                meta_description = $7, settings = $8, updated_at = $9 \
             WHERE id = $1 AND site_id = $2 RETURNING {PAGE_COLUMNS}"
        ))
        .bind(page_id)
        .bind(site_id)
        .bind(&page.title)
        .bind(&page.slug)
        .bind(page.is_published)
        .bind(&page.meta_title)
        .bind(&page.meta_description)
        .bind(settings)
        .bind(page.updated_at)
        .fetch_one(self.pool())
        .await?;
        Ok(row.into())
    }

    async fn delete_page(&self, site_id: Uuid, page_id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM site_pages WHERE id = $1 AND site_id = $2")
            .bind(page_id)
            .bind(site_id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn save_page_blocks(
        &self,
        page_id: Uuid,
        blocks: &[Block],
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let blocks = serde_json::to_value(blocks)?;
        let result =
            sqlx::query("UPDATE site_pages SET blocks = $2, updated_at = $3 WHERE id = $1")
                .bind(page_id)
                .bind(blocks)
                .bind(updated_at)
                .execute(self.pool())
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_page_templates(&self) -> StoreResult<Vec<PageTemplate>> {
        let templates = sqlx::query_as::<_, PageTemplate>(
            "SELECT id, name, description, thumbnail_url FROM page_templates ORDER BY name",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(templates)
    }

    async fn list_block_templates(&self) -> StoreResult<Vec<BlockTemplate>> {
        let rows = sqlx::query_as::<_, BlockTemplateRow>(
            "SELECT id, name, description, category, content FROM page_blocks ORDER BY category, name",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(BlockTemplate::from).collect())
    }

    async fn get_lead_settings(&self, site_id: Uuid) -> StoreResult<Option<LeadSettings>> {
        let settings = sqlx::query_as::<_, LeadSettings>(&format!(
            "SELECT {LEAD_SETTINGS_COLUMNS} FROM lead_settings WHERE site_id = $1"
        ))
        .bind(site_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(settings)
    }

    async fn upsert_lead_settings(&self, settings: LeadSettings) -> StoreResult<LeadSettings> {
        let saved = sqlx::query_as::<_, LeadSettings>(&format!(
            "INSERT INTO lead_settings ({LEAD_SETTINGS_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (site_id) DO UPDATE SET \
                is_enabled = EXCLUDED.is_enabled, \
                notification_email = EXCLUDED.notification_email, \
                success_message = EXCLUDED.success_message, \
                form_title = EXCLUDED.form_title, \
                button_text = EXCLUDED.button_text, \
                fields = EXCLUDED.fields, \
                auto_response_enabled = EXCLUDED.auto_response_enabled, \
                auto_response_subject = EXCLUDED.auto_response_subject, \
                auto_response_body = EXCLUDED.auto_response_body, \
                updated_at = now() \
             RETURNING {LEAD_SETTINGS_COLUMNS}"
        ))
        .bind(settings.site_id)
        .bind(settings.is_enabled)
        .bind(&settings.notification_email)
        .bind(&settings.success_message)
        .bind(&settings.form_title)
        .bind(&settings.button_text)
        .bind(Json(&settings.fields.0))
        .bind(settings.auto_response_enabled)
        .bind(&settings.auto_response_subject)
        .bind(&settings.auto_response_body)
        .fetch_one(self.pool())
        .await?;
        Ok(saved)
    }

    async fn insert_lead(&self, lead: NewLead) -> StoreResult<Lead> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "INSERT INTO leads (site_id, data, source_url, status) \
             VALUES ($1, $2, $3, 'new') RETURNING {LEAD_COLUMNS}"
        ))
        .bind(lead.site_id)
        .bind(Value::Object(lead.data))
        .bind(&lead.source_url)
        .fetch_one(self.pool())
        .await?;
        Ok(row.into())
    }

    async fn list_leads(&self, site_id: Uuid) -> StoreResult<Vec<Lead>> {
        let rows = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE site_id = $1 ORDER BY created_at DESC"
        ))
        .bind(site_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Lead::from).collect())
    }

    async fn update_lead_status(
        &self,
        lead_id: Uuid,
        status: LeadStatus,
        notes: Option<String>,
    ) -> StoreResult<Lead> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "UPDATE leads SET status = $2, notes = COALESCE($3, notes), updated_at = now() \
             WHERE id = $1 RETURNING {LEAD_COLUMNS}"
        ))
        .bind(lead_id)
        .bind(status.as_ref())
        .bind(&notes)
        .fetch_one(self.pool())
        .await?;
        Ok(row.into())
    }
}
