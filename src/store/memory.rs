use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{page_slug, Store, StoreError, StoreResult};
use crate::blocks::render::PageLink;
use crate::blocks::{Block, BlockTemplate};
use crate::db::models::{
    Lead, LeadSettings, LeadStatus, NewLead, NewSite, NewUser, PageTemplate, Site, SiteMember,
    SiteRole, SiteUpdate, User, UserUpdate,
};
use crate::pages::{NewPage, Page, PageSettings, PageUpdate};

#[derive(Debug, Clone)]
struct Membership {
    site_id: Uuid,
    user_id: Uuid,
    role: SiteRole,
    created_at: DateTime<Utc>,
}

/// In-process store. Everything lives in tokio `RwLock`ed maps.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    sites: RwLock<HashMap<Uuid, Site>>,
    members: RwLock<Vec<Membership>>,
    pages: RwLock<HashMap<Uuid, Page>>,
    page_templates: RwLock<Vec<PageTemplate>>,
    block_templates: RwLock<Vec<BlockTemplate>>,
    lead_settings: RwLock<HashMap<Uuid, LeadSettings>>,
    leads: RwLock<Vec<Lead>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a single admin account.
    pub async fn with_admin(email: &str, password_hash: &str) -> Self {
        let store = Self::new();
        store.add_user(email, password_hash, "admin").await;
        store
    }

    pub async fn add_user(&self, email: &str, password_hash: &str, role: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_lowercase(),
            password_hash: password_hash.to_string(),
            full_name: None,
            role: role.to_string(),
            created_at: Utc::now(),
        };
        self.users.write().await.insert(user.id, user.clone());
        user
    }

    pub async fn add_block_template(&self, template: BlockTemplate) {
        self.block_templates.write().await.push(template);
    }

    pub async fn add_page_template(&self, template: PageTemplate) {
        self.page_templates.write().await.push(template);
    }

    /// Make every call fail with [`StoreError::Unavailable`] until reset.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    async fn member_view(&self, membership: &Membership) -> StoreResult<SiteMember> {
        let users = self.users.read().await;
        let user = users.get(&membership.user_id).ok_or(StoreError::NotFound)?;
        Ok(SiteMember {
            site_id: membership.site_id,
            user_id: membership.user_id,
            role: membership.role.to_string(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            created_at: membership.created_at,
        })
    }

    fn check(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.check()?;
        let email = email.trim().to_lowercase();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.check()?;
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn get_user(&self, user_id: Uuid) -> StoreResult<User> {
        self.check()?;
        self.users
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        self.check()?;
        let email = user.email.trim().to_lowercase();
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict(format!("email {email} already registered")));
        }
        let created = User {
            id: Uuid::new_v4(),
            email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            role: user.role.to_string(),
            created_at: Utc::now(),
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> StoreResult<User> {
        self.check()?;
        let mut users = self.users.write().await;
        let user = users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        if let Some(full_name) = update.full_name {
            user.full_name = Some(full_name).filter(|n| !n.trim().is_empty());
        }
        if let Some(role) = update.role {
            user.role = role.to_string();
        }
        Ok(user.clone())
    }

    async fn set_user_password(&self, user_id: Uuid, password_hash: &str) -> StoreResult<()> {
        self.check()?;
        let mut users = self.users.write().await;
        let user = users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn delete_user(&self, user_id: Uuid) -> StoreResult<()> {
        self.check()?;
        self.users
            .write()
            .await
            .remove(&user_id)
            .ok_or(StoreError::NotFound)?;
        self.members.write().await.retain(|m| m.user_id != user_id);
        for site in self.sites.write().await.values_mut() {
            if site.owner_id == Some(user_id) {
                site.owner_id = None;
            }
        }
        Ok(())
    }

    async fn list_site_members(&self, site_id: Uuid) -> StoreResult<Vec<SiteMember>> {
        self.check()?;
        let memberships: Vec<Membership> = self
            .members
            .read()
            .await
            .iter()
            .filter(|m| m.site_id == site_id)
            .cloned()
            .collect();
        let mut members = Vec::with_capacity(memberships.len());
        for membership in &memberships {
            members.push(self.member_view(membership).await?);
        }
        Ok(members)
    }

    async fn add_site_member(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        role: SiteRole,
    ) -> StoreResult<SiteMember> {
        self.check()?;
        if !self.sites.read().await.contains_key(&site_id)
            || !self.users.read().await.contains_key(&user_id)
        {
            return Err(StoreError::NotFound);
        }
        let membership = {
            let mut members = self.members.write().await;
            if members.iter().any(|m| m.site_id == site_id && m.user_id == user_id) {
                return Err(StoreError::Conflict("user is already a member".to_string()));
            }
            let membership = Membership {
                site_id,
                user_id,
                role,
                created_at: Utc::now(),
            };
            members.push(membership.clone());
            membership
        };
        self.member_view(&membership).await
    }

    async fn update_site_member(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        role: SiteRole,
    ) -> StoreResult<SiteMember> {
        self.check()?;
        let membership = {
            let mut members = self.members.write().await;
            let membership = members
                .iter_mut()
                .find(|m| m.site_id == site_id && m.user_id == user_id)
                .ok_or(StoreError::NotFound)?;
            membership.role = role;
            membership.clone()
        };
        self.member_view(&membership).await
    }

    async fn remove_site_member(&self, site_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        self.check()?;
        let mut members = self.members.write().await;
        let before = members.len();
        members.retain(|m| !(m.site_id == site_id && m.user_id == user_id));
        if members.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_sites(&self) -> StoreResult<Vec<Site>> {
        self.check()?;
        let mut sites: Vec<Site> = self.sites.read().await.values().cloned().collect();
        sites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sites)
    }

    async fn get_site(&self, site_id: Uuid) -> StoreResult<Site> {
        self.check()?;
        self.sites
            .read()
            .await
            .get(&site_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_site(&self, site: NewSite, owner: Uuid) -> StoreResult<Site> {
        self.check()?;
        let mut sites = self.sites.write().await;
        if let Some(domain) = site.domain.as_deref() {
            if sites.values().any(|s| s.domain.as_deref() == Some(domain)) {
                return Err(StoreError::Conflict(format!("domain {domain} already in use")));
            }
        }
        let now = Utc::now();
        let created = Site {
            id: Uuid::new_v4(),
            name: site.name,
            domain: site.domain,
            description: site.description,
            status: "active".to_string(),
            owner_id: Some(owner),
            created_at: now,
            updated_at: now,
        };
        sites.insert(created.id, created.clone());
        self.members.write().await.push(Membership {
            site_id: created.id,
            user_id: owner,
            role: SiteRole::Owner,
            created_at: now,
        });
        Ok(created)
    }

    async fn update_site(&self, site_id: Uuid, update: SiteUpdate) -> StoreResult<Site> {
        self.check()?;
        let mut sites = self.sites.write().await;
        let site = sites.get_mut(&site_id).ok_or(StoreError::NotFound)?;
        if let Some(name) = update.name {
            site.name = name;
        }
        if let Some(domain) = update.domain {
            site.domain = Some(domain).filter(|d| !d.is_empty());
        }
        if let Some(description) = update.description {
            site.description = Some(description);
        }
        if let Some(status) = update.status {
            site.status = status;
        }
        site.updated_at = Utc::now();
        Ok(site.clone())
    }

    async fn delete_site(&self, site_id: Uuid) -> StoreResult<()> {
        self.check()?;
        self.sites
            .write()
            .await
            .remove(&site_id)
            .ok_or(StoreError::NotFound)?;
        self.pages.write().await.retain(|_, p| p.site_id != site_id);
        self.members.write().await.retain(|m| m.site_id != site_id);
        self.lead_settings.write().await.remove(&site_id);
        self.leads.write().await.retain(|l| l.site_id != site_id);
        Ok(())
    }

    async fn list_pages(&self, site_id: Uuid) -> StoreResult<Vec<Page>> {
        self.check()?;
        let mut pages: Vec<Page> = self
            .pages
            .read()
            .await
            .values()
            .filter(|p| p.site_id == site_id)
            .cloned()
            .collect();
        pages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(pages)
    }

    async fn list_published_pages(&self, site_id: Uuid) -> StoreResult<Vec<PageLink>> {
        Ok(self
            .list_pages(site_id)
            .await?
            .into_iter()
            .filter(|p| p.is_published)
            .map(|p| PageLink {
                id: p.id.to_string(),
                title: p.title,
                slug: p.slug,
            })
            .collect())
    }

    async fn get_page(&self, site_id: Uuid, page_id: Uuid) -> StoreResult<Page> {
        self.check()?;
        self.pages
            .read()
            .await
            .get(&page_id)
            .filter(|p| p.site_id == site_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_published_page(&self, site_id: Uuid, slug: &str) -> StoreResult<Page> {
        self.check()?;
        self.pages
            .read()
            .await
            .values()
            .find(|p| p.site_id == site_id && p.slug == slug && p.is_published)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_page(
        &self,
        site_id: Uuid,
        page: NewPage,
        author: Option<Uuid>,
    ) -> StoreResult<Page> {
        self.check()?;
        if !self.sites.read().await.contains_key(&site_id) {
            return Err(StoreError::NotFound);
        }
        let slug = page_slug(&page);
        let mut pages = self.pages.write().await;
        if pages.values().any(|p| p.site_id == site_id && p.slug == slug) {
            return Err(StoreError::Conflict(format!("slug {slug} already in use")));
        }
        let now = Utc::now();
        let created = Page {
            id: Uuid::new_v4(),
            site_id,
            template_id: page.template_id,
            title: page.title,
            slug,
            blocks: Vec::new(),
            is_published: false,
            meta_title: page.meta_title,
            meta_description: page.meta_description,
            settings: PageSettings::default(),
            author_id: author,
            created_at: now,
            updated_at: now,
        };
        pages.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_page(
        &self,
        site_id: Uuid,
        page_id: Uuid,
        update: PageUpdate,
    ) -> StoreResult<Page> {
        self.check()?;
        let mut pages = self.pages.write().await;
        if let Some(slug) = update.slug.as_deref().map(crate::pages::slugify) {
            let taken = pages
                .values()
                .any(|p| p.site_id == site_id && p.id != page_id && p.slug == slug);
            if taken {
                return Err(StoreError::Conflict(format!("slug {slug} already in use")));
            }
        }
        let page = pages
            .get_mut(&page_id)
            .filter(|p| p.site_id == site_id)
            .ok_or(StoreError::NotFound)?;
        page.apply(update, Utc::now());
        Ok(page.clone())
    }

    async fn delete_page(&self, site_id: Uuid, page_id: Uuid) -> StoreResult<()> {
        self.check()?;
        let mut pages = self.pages.write().await;
        match pages.get(&page_id) {
            Some(p) if p.site_id == site_id => {
                pages.remove(&page_id);
                Ok(())
            }
            _ => Err(StoreError::NotFound),
        }
    }

    async fn save_page_blocks(
        &self,
        page_id: Uuid,
        blocks: &[Block],
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.check()?;
        let mut pages = self.pages.write().await;
        let page = pages.get_mut(&page_id).ok_or(StoreError::NotFound)?;
        page.blocks = blocks.to_vec();
        page.updated_at = updated_at;
        Ok(())
    }

    async fn list_page_templates(&self) -> StoreResult<Vec<PageTemplate>> {
        self.check()?;
        Ok(self.page_templates.read().await.clone())
    }

    async fn list_block_templates(&self) -> StoreResult<Vec<BlockTemplate>> {
        self.check()?;
        Ok(self.block_templates.read().await.clone())
    }

    async fn get_lead_settings(&self, site_id: Uuid) -> StoreResult<Option<LeadSettings>> {
        self.check()?;
        Ok(self.lead_settings.read().await.get(&site_id).cloned())
    }

    async fn upsert_lead_settings(&self, settings: LeadSettings) -> StoreResult<LeadSettings> {
        self.check()?;
        if !self.sites.read().await.contains_key(&settings.site_id) {
            return Err(StoreError::NotFound);
        }
        self.lead_settings
            .write()
            .await
            .insert(settings.site_id, settings.clone());
        Ok(settings)
    }

    async fn insert_lead(&self, lead: NewLead) -> StoreResult<Lead> {
        self.check()?;
        let now = Utc::now();
        let created = Lead {
            id: Uuid::new_v4(),
            site_id: lead.site_id,
            data: lead.data,
            source_url: lead.source_url,
            status: LeadStatus::New,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        self.leads.write().await.push(created.clone());
        Ok(created)
    }

    async fn list_leads(&self, site_id: Uuid) -> StoreResult<Vec<Lead>> {
        self.check()?;
        let mut leads: Vec<Lead> = self
            .leads
            .read()
            .await
            .iter()
            .filter(|l| l.site_id == site_id)
            .cloned()
            .collect();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }

    async fn update_lead_status(
        &self,
        lead_id: Uuid,
        status: LeadStatus,
        notes: Option<String>,
    ) -> StoreResult<Lead> {
        self.check()?;
        let mut leads = self.leads.write().await;
        let lead = leads
            .iter_mut()
            .find(|l| l.id == lead_id)
            .ok_or(StoreError::NotFound)?;
        lead.status = status;
        if notes.is_some() {
            lead.notes = notes;
        }
        lead.updated_at = Utc::now();
        Ok(lead.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockType;
    use serde_json::Map;

    async fn store_with_site() -> (MemoryStore, Uuid) {
        let store = MemoryStore::new();
        let owner = store.add_user("a@b.c", "hash", "admin").await;
        let site = store
            .create_site(
                NewSite {
                    name: "Loja".into(),
                    domain: None,
                    description: None,
                },
                owner.id,
            )
            .await
            .unwrap();
        (store, site.id)
    }

    fn new_page(title: &str) -> NewPage {
        NewPage {
            title: title.into(),
            slug: None,
            template_id: None,
            meta_title: None,
            meta_description: None,
        }
    }

    #[tokio::test]
    async fn test_create_page_slugifies_and_rejects_duplicates() {
        let (store, site) = store_with_site().await;
        let page = store.create_page(site, new_page("Sobre Nós"), None).await.unwrap();
        assert_eq!(page.slug, "sobre-nos");
        assert!(page.blocks.is_empty());
        assert!(!page.is_published);

        let err = store.create_page(site, new_page("Sobre nós"), None).await;
        assert!(matches!(err, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_save_blocks_last_write_wins() {
        let (store, site) = store_with_site().await;
        let page = store.create_page(site, new_page("Home"), None).await.unwrap();
        let first = vec![Block::new(BlockType::Hero)];
        let second = vec![Block::new(BlockType::Divider), Block::new(BlockType::Menu)];
        let t1 = Utc::now();
        store.save_page_blocks(page.id, &first, t1).await.unwrap();
        store.save_page_blocks(page.id, &second, t1).await.unwrap();
        let loaded = store.get_page(site, page.id).await.unwrap();
        assert_eq!(loaded.blocks, second);
        assert_eq!(loaded.updated_at, t1);
    }

    #[tokio::test]
    async fn test_published_lookup_and_menu_links() {
        let (store, site) = store_with_site().await;
        let home = store.create_page(site, new_page("Home"), None).await.unwrap();
        store.create_page(site, new_page("Rascunho"), None).await.unwrap();
        assert!(matches!(
            store.get_published_page(site, "home").await,
            Err(StoreError::NotFound)
        ));
        store
            .update_page(
                site,
                home.id,
                PageUpdate {
                    is_published: Some(true),
                    ..PageUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(store.get_published_page(site, "home").await.unwrap().id, home.id);
        let links = store.list_published_pages(site).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].slug, "home");
    }

    #[tokio::test]
    async fn test_lead_status_lifecycle() {
        let (store, site) = store_with_site().await;
        let lead = store
            .insert_lead(NewLead {
                site_id: site,
                data: Map::new(),
                source_url: None,
            })
            .await
            .unwrap();
        assert_eq!(lead.status, LeadStatus::New);
        let updated = store
            .update_lead_status(lead.id, LeadStatus::Contacted, Some("ligou".into()))
            .await
            .unwrap();
        assert_eq!(updated.status, LeadStatus::Contacted);
        assert_eq!(updated.notes.as_deref(), Some("ligou"));
    }

    #[tokio::test]
    async fn test_membership_lifecycle() {
        let (store, site) = store_with_site().await;
        let owners = store.list_site_members(site).await.unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].role, "owner");

        let bia = store
            .create_user(NewUser {
                email: "Bia@Example.com".into(),
                password_hash: "hash".into(),
                full_name: Some("Bia".into()),
                role: Default::default(),
            })
            .await
            .unwrap();
        assert_eq!(bia.email, "bia@example.com");
        assert_eq!(bia.role, "editor");

        let member = store.add_site_member(site, bia.id, SiteRole::Viewer).await.unwrap();
        assert_eq!(member.email, "bia@example.com");
        assert!(matches!(
            store.add_site_member(site, bia.id, SiteRole::Editor).await,
            Err(StoreError::Conflict(_))
        ));
        let member = store.update_site_member(site, bia.id, SiteRole::Editor).await.unwrap();
        assert_eq!(member.role, "editor");

        store.delete_user(bia.id).await.unwrap();
        assert_eq!(store.list_site_members(site).await.unwrap().len(), 1);
        assert!(matches!(
            store.remove_site_member(site, bia.id).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (store, _) = store_with_site().await;
        let err = store
            .create_user(NewUser {
                email: "A@B.C".into(),
                password_hash: "hash".into(),
                full_name: None,
                role: Default::default(),
            })
            .await;
        assert!(matches!(err, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_offline_store_fails_everything() {
        let (store, site) = store_with_site().await;
        store.set_offline(true);
        assert!(matches!(store.list_pages(site).await, Err(StoreError::Unavailable)));
        assert!(matches!(store.ping().await, Err(StoreError::Unavailable)));
        store.set_offline(false);
        assert!(store.ping().await.is_ok());
    }
}
