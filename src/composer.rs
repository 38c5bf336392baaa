//! Page composition: the draft block list of one page, the block selected for
//! editing, drag state, live carousels in the preview and explicit save.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blocks::carousel::CarouselPlayer;
use crate::blocks::editor::{self, EditError, EditOp, EditorView, Tab};
use crate::blocks::path::FieldPath;
use crate::blocks::render::{self, PageLink, RenderContext, RenderMode};
use crate::blocks::reorder::{move_item, DragState};
use crate::blocks::{Block, BlockId, BlockTemplate, BlockType};
use crate::notice::{self, Notice};
use crate::pages::Page;
use crate::store::{Store, StoreError};

pub const SAVE_SUCCESS: &str = "Página salva com sucesso!";
pub const SAVE_ERROR: &str = "Erro ao salvar página. Tente novamente.";
pub const LOAD_ERROR: &str = "Erro ao carregar página. Tente novamente.";

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("no block at index {0}")]
    NoSuchBlock(usize),
    #[error("no block with id '{0}'")]
    UnknownBlock(String),
    #[error("no block is selected")]
    NoSelection,
    #[error("nothing is being dragged")]
    NotDragging,
    #[error("a block keeps its id and type; replacement has {field} '{found}'")]
    IdentityChanged { field: &'static str, found: String },
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "to", rename_all = "snake_case")]
pub enum CarouselCommand {
    Next,
    Previous,
    Index { index: usize },
}

/// One user interaction on the composition surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ComposerAction {
    AddBlock { block_type: BlockType },
    AddTemplate { template: BlockTemplate },
    Remove { index: usize },
    Select { index: Option<usize> },
    Update { index: usize, block: Block },
    Edit { op: EditOp },
    SetTab { tab: Tab },
    DragStart { index: usize },
    DragOver { index: usize },
    DragEnd,
    ListDragStart { list: FieldPath, index: usize },
    ListDragOver { index: usize },
    ListDragEnd,
    Carousel { block_id: String, command: CarouselCommand },
    DismissNotice,
}

#[derive(Debug, Clone)]
struct ListDrag {
    block: BlockId,
    list: FieldPath,
    drag: DragState<usize>,
}

/// Serializable view of the composer for the admin UI.
#[derive(Debug, Clone, Serialize)]
pub struct ComposerSnapshot {
    pub page_id: Uuid,
    pub site_id: Uuid,
    pub title: String,
    pub blocks: Vec<Block>,
    pub selected: Option<usize>,
    pub tab: Tab,
    pub editor: Option<EditorView>,
    pub dragging: Option<String>,
    pub preview: String,
    pub notice: Option<Notice>,
    pub saving: bool,
    pub dirty: bool,
    pub updated_at: DateTime<Utc>,
}

pub struct PageComposer {
    page: Page,
    /// Selection follows the block, not its position.
    selected: Option<BlockId>,
    tab: Tab,
    block_drag: DragState<BlockId>,
    list_drag: Option<ListDrag>,
    players: HashMap<String, CarouselPlayer>,
    site_pages: Vec<PageLink>,
    maps_api_key: Option<String>,
    saving: bool,
    dirty: bool,
    notice: Option<Notice>,
}

impl PageComposer {
    pub fn new(page: Page) -> Self {
        let mut composer = Self {
            page,
            selected: None,
            tab: Tab::Content,
            block_drag: DragState::default(),
            list_drag: None,
            players: HashMap::new(),
            site_pages: Vec::new(),
            maps_api_key: None,
            saving: false,
            dirty: false,
            notice: None,
        };
        composer.sync_players();
        composer
    }

    /// Load a page with the site's published pages for menu previews.
    pub async fn load(
        store: &dyn Store,
        site_id: Uuid,
        page_id: Uuid,
    ) -> Result<Self, ComposeError> {
        let page = store.get_page(site_id, page_id).await.map_err(|err| {
            tracing::error!(%site_id, %page_id, error = %err, "failed to load page");
            err
        })?;
        let site_pages = store
            .list_published_pages(site_id)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(%site_id, error = %err, "could not load site pages for menu");
                Vec::new()
            });
        let mut composer = Self::new(page);
        composer.site_pages = site_pages;
        Ok(composer)
    }

    pub fn with_maps_key(mut self, key: Option<String>) -> Self {
        self.maps_api_key = key;
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn blocks(&self) -> &[Block] {
        &self.page.blocks
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn selected(&self) -> Option<usize> {
        let id = self.selected.as_ref()?;
        self.index_of(id.as_str())
    }

    pub fn selected_block(&self) -> Option<&Block> {
        self.selected().map(|i| &self.page.blocks[i])
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn player(&self, block_id: &str) -> Option<&CarouselPlayer> {
        self.players.get(block_id)
    }

    fn index_of(&self, block_id: &str) -> Option<usize> {
        self.page.blocks.iter().position(|b| b.id_str() == block_id)
    }

    fn check_index(&self, index: usize) -> Result<(), ComposeError> {
        if index < self.page.blocks.len() {
            Ok(())
        } else {
            Err(ComposeError::NoSuchBlock(index))
        }
    }

    fn touched(&mut self) {
        self.dirty = true;
        self.sync_players();
    }

    /// Append a block built from `template`; returns its index.
    pub fn add(&mut self, template: &BlockTemplate) -> usize {
        let block = template.instantiate();
        tracing::debug!(page_id = %self.page.id, block_id = %block.id(), template = %template.id, "block added");
        self.page.blocks.push(block);
        self.touched();
        self.page.blocks.len() - 1
    }

    pub fn add_type(&mut self, block_type: BlockType) -> usize {
        self.add(&BlockTemplate::builtin(block_type))
    }

    /// Remove the block at `index`. Removing the selected block clears the
    /// selection; other selections stay on their block.
    pub fn remove(&mut self, index: usize) -> Result<Block, ComposeError> {
        self.check_index(index)?;
        let removed = self.page.blocks.remove(index);
        if self.selected.as_ref() == Some(&removed.id()) {
            self.selected = None;
        }
        if self.list_drag.as_ref().is_some_and(|d| d.block == removed.id()) {
            self.list_drag = None;
        }
        self.touched();
        Ok(removed)
    }

    pub fn select(&mut self, index: Option<usize>) -> Result<(), ComposeError> {
        match index {
            Some(i) => {
                self.check_index(i)?;
                self.selected = Some(self.page.blocks[i].id());
            }
            None => self.selected = None,
        }
        Ok(())
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    /// Replace the block at `index` wholesale. The replacement must carry
    /// the same id and type as the block it replaces.
    pub fn update(&mut self, index: usize, block: Block) -> Result<(), ComposeError> {
        self.check_index(index)?;
        let current = &self.page.blocks[index];
        if block.id_str() != current.id_str() {
            return Err(ComposeError::IdentityChanged {
                field: "id",
                found: block.id_str().to_string(),
            });
        }
        if block.type_tag() != current.type_tag() {
            return Err(ComposeError::IdentityChanged {
                field: "type",
                found: block.type_tag().unwrap_or_default().to_string(),
            });
        }
        let was_selected = self.selected() == Some(index);
        self.page.blocks[index] = block;
        if was_selected {
            self.selected = Some(self.page.blocks[index].id());
        }
        self.touched();
        Ok(())
    }

    /// Apply an editor change to the selected block.
    pub fn apply_edit(&mut self, op: &EditOp) -> Result<&Block, ComposeError> {
        let index = self.selected().ok_or(ComposeError::NoSelection)?;
        let updated = editor::apply(&self.page.blocks[index], op)?;
        self.update(index, updated)?;
        Ok(&self.page.blocks[index])
    }

    pub fn editor(&self) -> Option<EditorView> {
        self.selected_block().map(|block| editor::form(block, self.tab))
    }

    // block drag, keyed by block id since positions shift mid-drag

    pub fn drag_start(&mut self, index: usize) -> Result<(), ComposeError> {
        self.check_index(index)?;
        self.block_drag.start(self.page.blocks[index].id());
        Ok(())
    }

    /// Move the dragged block to `target` right away.
    pub fn drag_over(&mut self, target: usize) -> Result<bool, ComposeError> {
        let id = self.block_drag.dragged().ok_or(ComposeError::NotDragging)?;
        let from = self
            .index_of(id.as_str())
            .ok_or_else(|| ComposeError::UnknownBlock(id.to_string()))?;
        if !move_item(&mut self.page.blocks, from, target) {
            return Ok(false);
        }
        self.dirty = true;
        Ok(true)
    }

    /// Always clears the drag, whether or not the drop landed.
    pub fn drag_end(&mut self) {
        self.block_drag.end();
    }

    // record drag inside one list of the selected block

    pub fn list_drag_start(&mut self, list: FieldPath, index: usize) -> Result<(), ComposeError> {
        let block = self.selected_block().ok_or(ComposeError::NoSelection)?;
        let mut drag = DragState::default();
        drag.start(index);
        self.list_drag = Some(ListDrag {
            block: block.id(),
            list,
            drag,
        });
        Ok(())
    }

    pub fn list_drag_over(&mut self, target: usize) -> Result<bool, ComposeError> {
        let (block_id, list, from) = {
            let state = self.list_drag.as_ref().ok_or(ComposeError::NotDragging)?;
            let from = *state.drag.dragged().ok_or(ComposeError::NotDragging)?;
            (state.block.clone(), state.list.clone(), from)
        };
        if from == target {
            return Ok(false);
        }
        let index = self
            .index_of(block_id.as_str())
            .ok_or_else(|| ComposeError::UnknownBlock(block_id.to_string()))?;
        let op = EditOp::MoveRecord {
            list,
            from,
            to: target,
        };
        let updated = editor::apply(&self.page.blocks[index], &op)?;
        self.update(index, updated)?;
        if let Some(state) = self.list_drag.as_mut() {
            state.drag.retarget(target);
        }
        Ok(true)
    }

    pub fn list_drag_end(&mut self) {
        self.list_drag = None;
    }

    pub fn carousel(&self, block_id: &str, command: CarouselCommand) -> Result<usize, ComposeError> {
        let player = self
            .players
            .get(block_id)
            .ok_or_else(|| ComposeError::UnknownBlock(block_id.to_string()))?;
        Ok(match command {
            CarouselCommand::Next => player.next(),
            CarouselCommand::Previous => player.previous(),
            CarouselCommand::Index { index } => {
                player.go_to(index);
                player.current()
            }
        })
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn dispatch(&mut self, action: ComposerAction) -> Result<(), ComposeError> {
        match action {
            ComposerAction::AddBlock { block_type } => {
                self.add_type(block_type);
            }
            ComposerAction::AddTemplate { template } => {
                self.add(&template);
            }
            ComposerAction::Remove { index } => {
                self.remove(index)?;
            }
            ComposerAction::Select { index } => self.select(index)?,
            ComposerAction::Update { index, block } => self.update(index, block)?,
            ComposerAction::Edit { op } => {
                self.apply_edit(&op)?;
            }
            ComposerAction::SetTab { tab } => self.set_tab(tab),
            ComposerAction::DragStart { index } => self.drag_start(index)?,
            ComposerAction::DragOver { index } => {
                self.drag_over(index)?;
            }
            ComposerAction::DragEnd => self.drag_end(),
            ComposerAction::ListDragStart { list, index } => self.list_drag_start(list, index)?,
            ComposerAction::ListDragOver { index } => {
                self.list_drag_over(index)?;
            }
            ComposerAction::ListDragEnd => self.list_drag_end(),
            ComposerAction::Carousel { block_id, command } => {
                self.carousel(&block_id, command)?;
            }
            ComposerAction::DismissNotice => self.dismiss_notice(),
        }
        Ok(())
    }

    /// Write the whole block list in one go. Last write wins.
    ///
    /// The draft is kept on failure so the save can be retried.
    pub async fn save(&mut self, store: &dyn Store, now: DateTime<Utc>) -> Result<(), ComposeError> {
        self.saving = true;
        self.notice = None;
        let result = store
            .save_page_blocks(self.page.id, &self.page.blocks, now)
            .await;
        self.saving = false;
        match result {
            Ok(()) => {
                tracing::info!(
                    page_id = %self.page.id,
                    blocks = self.page.blocks.len(),
                    "page blocks saved"
                );
                self.page.updated_at = now;
                self.dirty = false;
                self.notice = Some(Notice::success(SAVE_SUCCESS, now));
                Ok(())
            }
            Err(err) => {
                tracing::error!(page_id = %self.page.id, error = %err, "failed to save page blocks");
                self.notice = Some(Notice::error(SAVE_ERROR, now));
                Err(err.into())
            }
        }
    }

    pub fn render_context(&self) -> RenderContext {
        let mut ctx = RenderContext::new(self.page.site_id.to_string(), RenderMode::Editing)
            .with_pages(self.site_pages.clone())
            .with_maps_key(self.maps_api_key.clone());
        ctx.page_id = Some(self.page.id.to_string());
        ctx.carousel_index = self
            .players
            .iter()
            .map(|(id, player)| (id.clone(), player.current()))
            .collect();
        ctx
    }

    pub fn preview(&self) -> String {
        render::render_blocks(&self.page.blocks, &self.render_context())
    }

    pub fn snapshot(&mut self, now: DateTime<Utc>) -> ComposerSnapshot {
        notice::prune(&mut self.notice, now);
        ComposerSnapshot {
            page_id: self.page.id,
            site_id: self.page.site_id,
            title: self.page.title.clone(),
            blocks: self.page.blocks.clone(),
            selected: self.selected(),
            tab: self.tab,
            editor: self.editor(),
            dragging: self.block_drag.dragged().map(ToString::to_string),
            preview: self.preview(),
            notice: self.notice.clone(),
            saving: self.saving,
            dirty: self.dirty,
            updated_at: self.page.updated_at,
        }
    }

    /// Keep exactly one player per carousel block, reconfigured to its
    /// current settings.
    fn sync_players(&mut self) {
        let mut live = HashMap::with_capacity(self.players.len());
        for block in &self.page.blocks {
            let Some((len, autoplay)) = render::carousel_of(&block.kind(), RenderMode::Editing)
            else {
                continue;
            };
            let id = block.id_str().to_string();
            let player = match self.players.remove(&id) {
                Some(mut player) => {
                    player.reconfigure(len, autoplay);
                    player
                }
                None => CarouselPlayer::mount(len, autoplay),
            };
            live.insert(id, player);
        }
        // players left behind belong to removed blocks and stop on drop
        self.players = live;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NewSite;
    use crate::notice::NoticeKind;
    use crate::pages::NewPage;
    use crate::store::MemoryStore;
    use chrono::Duration;
    use serde_json::{json, Value};

    async fn page_in(store: &MemoryStore) -> Page {
        let owner = store.add_user("editor@example.com", "hash", "admin").await.id;
        let site = store
            .create_site(
                NewSite {
                    name: "Site".into(),
                    domain: None,
                    description: None,
                },
                owner,
            )
            .await
            .unwrap();
        store
            .create_page(
                site.id,
                NewPage {
                    title: "Início".into(),
                    slug: None,
                    template_id: None,
                    meta_title: None,
                    meta_description: None,
                },
                Some(owner),
            )
            .await
            .unwrap()
    }

    fn ids(composer: &PageComposer) -> Vec<String> {
        composer.blocks().iter().map(|b| b.id_str().to_string()).collect()
    }

    #[tokio::test]
    async fn test_add_slide_save_and_reload() {
        let store = MemoryStore::new();
        let page = page_in(&store).await;
        let mut composer = PageComposer::load(&store, page.site_id, page.id).await.unwrap();
        assert!(composer.blocks().is_empty());

        composer.add_type(BlockType::Slide);
        assert!(composer.is_dirty());
        let now = Utc::now();
        composer.save(&store, now).await.unwrap();
        assert!(!composer.is_dirty());
        assert_eq!(composer.notice().unwrap().message, SAVE_SUCCESS);

        let reloaded = PageComposer::load(&store, page.site_id, page.id).await.unwrap();
        assert_eq!(reloaded.blocks().len(), 1);
        let block = &reloaded.blocks()[0];
        assert_eq!(block.block_type(), Some(BlockType::Slide));
        assert_eq!(block.get("slides"), Some(&json!([])));
        assert_eq!(reloaded.page().updated_at, now);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_draft() {
        let store = MemoryStore::new();
        let page = page_in(&store).await;
        let mut composer = PageComposer::new(page.clone());
        composer.add_type(BlockType::Hero);

        store.set_offline(true);
        let err = composer.save(&store, Utc::now()).await.unwrap_err();
        assert!(matches!(err, ComposeError::Store(StoreError::Unavailable)));
        let notice = composer.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.retryable);
        assert!(composer.is_dirty());
        assert_eq!(composer.blocks().len(), 1);
        assert!(!composer.is_saving());

        store.set_offline(false);
        composer.save(&store, Utc::now()).await.unwrap();
        let stored = store.get_page(page.site_id, page.id).await.unwrap();
        assert_eq!(stored.blocks, composer.blocks());
    }

    #[tokio::test]
    async fn test_success_notice_expires() {
        let store = MemoryStore::new();
        let page = page_in(&store).await;
        let mut composer = PageComposer::new(page);
        let now = Utc::now();
        composer.save(&store, now).await.unwrap();
        assert!(composer.snapshot(now + Duration::seconds(1)).notice.is_some());
        assert!(composer.snapshot(now + Duration::seconds(4)).notice.is_none());
    }

    fn composer_with(types: &[BlockType]) -> PageComposer {
        let page = Page {
            id: Uuid::new_v4(),
            site_id: Uuid::new_v4(),
            template_id: None,
            title: "Teste".into(),
            slug: "teste".into(),
            blocks: Vec::new(),
            is_published: false,
            meta_title: None,
            meta_description: None,
            settings: Default::default(),
            author_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut composer = PageComposer::new(page);
        for &t in types {
            composer.add_type(t);
        }
        composer
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let mut c = composer_with(&[BlockType::Hero, BlockType::Features]);
        c.select(Some(1)).unwrap();
        c.remove(1).unwrap();
        assert_eq!(c.selected(), None);
        assert!(c.editor().is_none());
    }

    #[test]
    fn test_selection_follows_block_when_earlier_removed() {
        let mut c = composer_with(&[BlockType::Hero, BlockType::Features, BlockType::Divider]);
        c.select(Some(2)).unwrap();
        c.remove(0).unwrap();
        assert_eq!(c.selected(), Some(1));
        assert_eq!(c.selected_block().unwrap().block_type(), Some(BlockType::Divider));
    }

    #[test]
    fn test_out_of_range_index() {
        let mut c = composer_with(&[BlockType::Hero]);
        assert!(matches!(c.remove(3), Err(ComposeError::NoSuchBlock(3))));
        assert!(matches!(c.select(Some(1)), Err(ComposeError::NoSuchBlock(1))));
    }

    #[test]
    fn test_update_keeps_id_and_type() {
        let mut c = composer_with(&[BlockType::Hero]);
        let id = c.blocks()[0].id_str().to_string();

        let retyped = Block::from(json!({"id": id, "type": "divider"}));
        assert!(matches!(
            c.dispatch(ComposerAction::Update { index: 0, block: retyped }),
            Err(ComposeError::IdentityChanged { field: "type", .. })
        ));
        let renamed = Block::from(json!({"id": "other", "type": "hero"}));
        assert!(matches!(
            c.update(0, renamed),
            Err(ComposeError::IdentityChanged { field: "id", .. })
        ));
        assert_eq!(c.blocks()[0].type_tag(), Some("hero"));

        let edited = Block::from(json!({"id": id, "type": "hero", "content": {"title": "Novo"}}));
        c.update(0, edited).unwrap();
        assert_eq!(c.blocks()[0].get("content").unwrap()["title"], json!("Novo"));
    }

    #[test]
    fn test_block_drag_moves_immediately() {
        let mut c = composer_with(&[BlockType::Hero, BlockType::Features, BlockType::Footer]);
        let before = ids(&c);
        c.drag_start(0).unwrap();
        assert!(c.drag_over(1).unwrap());
        assert!(c.drag_over(2).unwrap());
        assert_eq!(ids(&c), [before[1].clone(), before[2].clone(), before[0].clone()]);
        c.drag_end();
        assert!(matches!(c.drag_over(0), Err(ComposeError::NotDragging)));
    }

    #[test]
    fn test_edit_selected_block() {
        let mut c = composer_with(&[BlockType::Hero]);
        assert!(matches!(
            c.apply_edit(&EditOp::SetField {
                path: "content.title".parse().unwrap(),
                value: json!("Olá")
            }),
            Err(ComposeError::NoSelection)
        ));
        c.select(Some(0)).unwrap();
        let block = c
            .apply_edit(&EditOp::SetField {
                path: "content.button.url".parse().unwrap(),
                value: json!("/contato"),
            })
            .unwrap();
        assert_eq!(block.get("content").unwrap()["button"]["url"], json!("/contato"));
        assert!(matches!(c.editor(), Some(EditorView::Form(_))));
    }

    #[test]
    fn test_list_drag_reorders_records() {
        let mut c = composer_with(&[BlockType::Features]);
        c.select(Some(0)).unwrap();
        for _ in 0..3 {
            c.apply_edit(&EditOp::AppendRecord {
                list: "items".parse().unwrap(),
            })
            .unwrap();
        }
        for (i, title) in ["A", "B", "C"].iter().enumerate() {
            c.apply_edit(&EditOp::SetField {
                path: format!("items.{i}.title").parse().unwrap(),
                value: json!(title),
            })
            .unwrap();
        }
        c.list_drag_start("items".parse().unwrap(), 2).unwrap();
        assert!(c.list_drag_over(1).unwrap());
        assert!(c.list_drag_over(0).unwrap());
        c.list_drag_end();

        let titles: Vec<Value> = c.blocks()[0].get("items").unwrap().as_array().unwrap()
            .iter()
            .map(|i| i["title"].clone())
            .collect();
        assert_eq!(titles, [json!("C"), json!("A"), json!("B")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_player_per_carousel() {
        let mut c = composer_with(&[BlockType::Testimonials, BlockType::Hero]);
        let id = c.blocks()[0].id_str().to_string();
        assert!(c.player(&id).is_some());
        assert_eq!(c.players.len(), 1);

        c.remove(0).unwrap();
        assert!(c.player(&id).is_none());
        assert!(c.players.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slide_autoplay_suppressed_in_editor() {
        let mut c = composer_with(&[BlockType::Slide]);
        c.select(Some(0)).unwrap();
        for _ in 0..2 {
            c.apply_edit(&EditOp::AppendRecord {
                list: "slides".parse().unwrap(),
            })
            .unwrap();
        }
        c.apply_edit(&EditOp::SetField {
            path: "settings.autoplay".parse().unwrap(),
            value: json!(true),
        })
        .unwrap();
        let id = c.blocks()[0].id_str().to_string();
        let player = c.player(&id).unwrap();
        assert_eq!(player.len(), 2);
        assert!(!player.is_running());
        assert_eq!(c.carousel(&id, CarouselCommand::Next).unwrap(), 1);
    }

    #[test]
    fn test_dispatch_actions() {
        let mut c = composer_with(&[]);
        let action: ComposerAction = serde_json::from_value(json!({
            "action": "add_block", "block_type": "richtext"
        }))
        .unwrap();
        c.dispatch(action).unwrap();
        c.dispatch(ComposerAction::Select { index: Some(0) }).unwrap();
        c.dispatch(ComposerAction::SetTab { tab: Tab::Settings }).unwrap();
        let snapshot = c.snapshot(Utc::now());
        assert_eq!(snapshot.selected, Some(0));
        assert_eq!(snapshot.tab, Tab::Settings);
        assert!(snapshot.preview.contains("cms-block--richtext"));
        assert!(snapshot.dirty);
    }
}
