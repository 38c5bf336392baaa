//! Structured data store behind the CMS.
//!
//! [`Store`] is the only seam between the engine/routes and persistence.
//! [`PgStore`] backs production on Postgres; [`MemoryStore`] backs tests and
//! database-less runs.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::blocks::render::PageLink;
use crate::blocks::{Block, BlockTemplate};
use crate::db::models::{
    Lead, LeadSettings, LeadStatus, NewLead, NewSite, NewUser, PageTemplate, Site, SiteMember,
    SiteRole, SiteUpdate, User, UserUpdate,
};
use crate::pages::{NewPage, Page, PageUpdate};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("store unavailable")]
    Unavailable,
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable
            }
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Short name for logs and health output.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> StoreResult<()>;

    // users
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Newest first.
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn get_user(&self, user_id: Uuid) -> StoreResult<User>;
    /// Conflict when the email is taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> StoreResult<User>;
    async fn set_user_password(&self, user_id: Uuid, password_hash: &str) -> StoreResult<()>;
    /// Removes the account and its site memberships.
    async fn delete_user(&self, user_id: Uuid) -> StoreResult<()>;

    // site membership
    async fn list_site_members(&self, site_id: Uuid) -> StoreResult<Vec<SiteMember>>;
    /// Conflict when the user is already a member.
    async fn add_site_member(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        role: SiteRole,
    ) -> StoreResult<SiteMember>;
    async fn update_site_member(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        role: SiteRole,
    ) -> StoreResult<SiteMember>;
    async fn remove_site_member(&self, site_id: Uuid, user_id: Uuid) -> StoreResult<()>;

    // sites
    async fn list_sites(&self) -> StoreResult<Vec<Site>>;
    async fn get_site(&self, site_id: Uuid) -> StoreResult<Site>;
    /// Creates the site and records `owner` as a member.
    async fn create_site(&self, site: NewSite, owner: Uuid) -> StoreResult<Site>;
    async fn update_site(&self, site_id: Uuid, update: SiteUpdate) -> StoreResult<Site>;
    async fn delete_site(&self, site_id: Uuid) -> StoreResult<()>;

    // pages
    async fn list_pages(&self, site_id: Uuid) -> StoreResult<Vec<Page>>;
    /// Published pages in creation order, for menus.
    async fn list_published_pages(&self, site_id: Uuid) -> StoreResult<Vec<PageLink>>;
    async fn get_page(&self, site_id: Uuid, page_id: Uuid) -> StoreResult<Page>;
    async fn get_published_page(&self, site_id: Uuid, slug: &str) -> StoreResult<Page>;
    async fn create_page(
        &self,
        site_id: Uuid,
        page: NewPage,
        author: Option<Uuid>,
    ) -> StoreResult<Page>;
    async fn update_page(
        &self,
        site_id: Uuid,
        page_id: Uuid,
        update: PageUpdate,
    ) -> StoreResult<Page>;
    async fn delete_page(&self, site_id: Uuid, page_id: Uuid) -> StoreResult<()>;
    /// Replace the page's whole block list in one write. Last write wins.
    async fn save_page_blocks(
        &self,
        page_id: Uuid,
        blocks: &[Block],
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    // catalogs
    async fn list_page_templates(&self) -> StoreResult<Vec<PageTemplate>>;
    async fn list_block_templates(&self) -> StoreResult<Vec<BlockTemplate>>;

    // leads
    async fn get_lead_settings(&self, site_id: Uuid) -> StoreResult<Option<LeadSettings>>;
    async fn upsert_lead_settings(&self, settings: LeadSettings) -> StoreResult<LeadSettings>;
    async fn insert_lead(&self, lead: NewLead) -> StoreResult<Lead>;
    async fn list_leads(&self, site_id: Uuid) -> StoreResult<Vec<Lead>>;
    async fn update_lead_status(
        &self,
        lead_id: Uuid,
        status: LeadStatus,
        notes: Option<String>,
    ) -> StoreResult<Lead>;
}

/// Slug for a new page: explicit slug if given, else derived from the title.
pub(crate) fn page_slug(page: &NewPage) -> String {
    let source = page
        .slug
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&page.title);
    crate::pages::slugify(source)
}
