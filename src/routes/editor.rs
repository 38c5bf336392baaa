/**
 * Page Editor Routes
 * Server-held composition sessions, one per (user, page)
 */
use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{Duration, Instant};
use uuid::Uuid;

use super::{AppState, SuccessResponse};
use crate::composer::{ComposerAction, ComposerSnapshot, PageComposer};
use crate::error::ApiError;
use crate::session::CurrentUser;

type SessionKey = (Uuid, Uuid);

/// Drafts untouched for this long are dropped along with their carousel timers.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

struct OpenSession {
    composer: Arc<Mutex<PageComposer>>,
    last_touched: Instant,
}

/// Open composers keyed by (user, page).
#[derive(Clone)]
pub struct EditorSessions {
    inner: Arc<RwLock<HashMap<SessionKey, OpenSession>>>,
    idle_timeout: Duration,
}

impl Default for EditorSessions {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT)
    }
}

impl EditorSessions {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            inner: Arc::default(),
            idle_timeout,
        }
    }

    fn prune(&self, sessions: &mut HashMap<SessionKey, OpenSession>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, s| now.duration_since(s.last_touched) < self.idle_timeout);
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::info!(expired, "idle editor sessions closed");
        }
    }

    /// The open session, refreshing its idle timer.
    pub async fn get(&self, user: Uuid, page: Uuid) -> Option<Arc<Mutex<PageComposer>>> {
        let now = Instant::now();
        let mut sessions = self.inner.write().await;
        self.prune(&mut sessions, now);
        let session = sessions.get_mut(&(user, page))?;
        session.last_touched = now;
        Some(session.composer.clone())
    }

    /// Replace any open session for the same page with a fresh one.
    pub async fn open(&self, user: Uuid, composer: PageComposer) -> Arc<Mutex<PageComposer>> {
        let now = Instant::now();
        let page = composer.page().id;
        let composer = Arc::new(Mutex::new(composer));
        let mut sessions = self.inner.write().await;
        self.prune(&mut sessions, now);
        sessions.insert(
            (user, page),
            OpenSession {
                composer: composer.clone(),
                last_touched: now,
            },
        );
        composer
    }

    pub async fn close(&self, user: Uuid, page: Uuid) -> bool {
        self.inner.write().await.remove(&(user, page)).is_some()
    }

    /// Close every session `user` has open. Returns how many were closed.
    pub async fn close_user(&self, user: Uuid) -> usize {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|(owner, _), _| *owner != user);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        let mut sessions = self.inner.write().await;
        self.prune(&mut sessions, Instant::now());
        sessions.len()
    }
}

async fn session_for(
    state: &AppState,
    user: &CurrentUser,
    site_id: Uuid,
    page_id: Uuid,
) -> Result<Arc<Mutex<PageComposer>>, ApiError> {
    let composer = state
        .editors
        .get(user.user_id, page_id)
        .await
        .ok_or_else(|| ApiError::NotFound("No editor session open for this page".to_string()))?;
    if composer.lock().await.page().site_id != site_id {
        return Err(ApiError::not_found("Page"));
    }
    Ok(composer)
}

/// POST /api/sites/{site_id}/pages/{page_id}/editor
/// Load the stored page into a new draft, discarding any previous one.
pub async fn open_editor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((site_id, page_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ComposerSnapshot>, ApiError> {
    let composer = PageComposer::load(state.store.as_ref(), site_id, page_id)
        .await?
        .with_maps_key(state.config.maps_api_key.clone());
    let composer = state.editors.open(user.user_id, composer).await;
    tracing::info!(user_id = %user.user_id, %page_id, "editor session opened");

    let snapshot = composer.lock().await.snapshot(Utc::now());
    Ok(Json(snapshot))
}

/// GET /api/sites/{site_id}/pages/{page_id}/editor
pub async fn get_editor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((site_id, page_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ComposerSnapshot>, ApiError> {
    let composer = session_for(&state, &user, site_id, page_id).await?;
    let snapshot = composer.lock().await.snapshot(Utc::now());
    Ok(Json(snapshot))
}

/// POST /api/sites/{site_id}/pages/{page_id}/editor/actions
pub async fn dispatch_action(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((site_id, page_id)): Path<(Uuid, Uuid)>,
    Json(action): Json<ComposerAction>,
) -> Result<Json<ComposerSnapshot>, ApiError> {
    let composer = session_for(&state, &user, site_id, page_id).await?;
    let mut composer = composer.lock().await;
    composer.dispatch(action).map_err(|err| {
        tracing::debug!(%page_id, error = %err, "editor action rejected");
        ApiError::from(err)
    })?;
    Ok(Json(composer.snapshot(Utc::now())))
}

/// POST /api/sites/{site_id}/pages/{page_id}/editor/save
/// On failure the draft stays open and the snapshot carries the error notice.
pub async fn save_editor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((site_id, page_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let composer = session_for(&state, &user, site_id, page_id).await?;
    let mut composer = composer.lock().await;
    let now = Utc::now();
    let status = match composer.save(state.store.as_ref(), now).await {
        Ok(()) => StatusCode::OK,
        Err(err) => ApiError::from(err).status(),
    };
    Ok((status, Json(composer.snapshot(now))))
}

/// DELETE /api/sites/{site_id}/pages/{page_id}/editor
pub async fn close_editor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((_site_id, page_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !state.editors.close(user.user_id, page_id).await {
        return Err(ApiError::NotFound(
            "No editor session open for this page".to_string(),
        ));
    }
    Ok(Json(SuccessResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::Page;
    use crate::routes::testing::{app, json, send, site_with_page};
    use crate::store::Store;
    use serde_json::json as j;

    fn draft() -> PageComposer {
        PageComposer::new(Page {
            id: Uuid::new_v4(),
            site_id: Uuid::new_v4(),
            template_id: None,
            title: "Rascunho".into(),
            slug: "rascunho".into(),
            blocks: Vec::new(),
            is_published: false,
            meta_title: None,
            meta_description: None,
            settings: Default::default(),
            author_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_expire() {
        let sessions = EditorSessions::new(Duration::from_secs(60));
        let user = Uuid::new_v4();
        let kept = sessions.open(user, draft()).await.lock().await.page().id;
        let idle = sessions.open(user, draft()).await.lock().await.page().id;
        assert_eq!(sessions.len().await, 2);

        tokio::time::advance(Duration::from_secs(40)).await;
        assert!(sessions.get(user, kept).await.is_some());

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(sessions.get(user, idle).await.is_none());
        assert!(sessions.get(user, kept).await.is_some());
        assert_eq!(sessions.len().await, 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(sessions.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_user_leaves_other_users() {
        let sessions = EditorSessions::default();
        let (ana, bia) = (Uuid::new_v4(), Uuid::new_v4());
        sessions.open(ana, draft()).await;
        sessions.open(ana, draft()).await;
        let page = sessions.open(bia, draft()).await.lock().await.page().id;

        assert_eq!(sessions.close_user(ana).await, 2);
        assert_eq!(sessions.len().await, 1);
        assert!(sessions.get(bia, page).await.is_some());
    }

    #[tokio::test]
    async fn test_editor_requires_auth() {
        let (app, _, _) = app().await;
        let uri = format!("/api/sites/{}/pages/{}/editor", uuid::Uuid::new_v4(), uuid::Uuid::new_v4());
        let (status, _) = send(&app, "POST", &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_editor_session_flow() {
        let (app, store, token) = app().await;
        let (site, page) = site_with_page(&store, "Início").await;
        let base = format!("/api/sites/{}/pages/{}/editor", site.id, page.id);

        let (status, _) = send(&app, "GET", &base, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, bytes) = send(&app, "POST", &base, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&bytes)["blocks"].as_array().unwrap().len(), 0);

        let actions = format!("{base}/actions");
        let (status, bytes) = send(
            &app,
            "POST",
            &actions,
            Some(&token),
            Some(j!({"action": "add_block", "block_type": "hero"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&bytes);
        assert_eq!(body["blocks"][0]["type"], "hero");
        assert_eq!(body["dirty"], true);

        let (status, _) = send(
            &app,
            "POST",
            &actions,
            Some(&token),
            Some(j!({"action": "remove", "index": 7})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, bytes) = send(&app, "POST", &format!("{base}/save"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&bytes);
        assert_eq!(body["dirty"], false);
        assert_eq!(body["notice"]["kind"], "success");

        let stored = store.get_page(site.id, page.id).await.unwrap();
        assert_eq!(stored.blocks.len(), 1);

        let (status, _) = send(&app, "DELETE", &base, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "DELETE", &base, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_cannot_change_block_type() {
        let (app, store, token) = app().await;
        let (site, page) = site_with_page(&store, "Início").await;
        let base = format!("/api/sites/{}/pages/{}/editor", site.id, page.id);
        send(&app, "POST", &base, Some(&token), None).await;

        let actions = format!("{base}/actions");
        let (_, bytes) = send(
            &app,
            "POST",
            &actions,
            Some(&token),
            Some(j!({"action": "add_block", "block_type": "hero"})),
        )
        .await;
        let id = json(&bytes)["blocks"][0]["id"].clone();

        let (status, _) = send(
            &app,
            "POST",
            &actions,
            Some(&token),
            Some(j!({"action": "update", "index": 0, "block": {"id": id, "type": "divider"}})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, bytes) = send(&app, "GET", &base, Some(&token), None).await;
        assert_eq!(json(&bytes)["blocks"][0]["type"], "hero");
    }

    #[tokio::test]
    async fn test_logout_closes_editor_sessions() {
        let (app, store, token) = app().await;
        let (site, page) = site_with_page(&store, "Início").await;
        let base = format!("/api/sites/{}/pages/{}/editor", site.id, page.id);
        let (status, _) = send(&app, "POST", &base, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, bytes) = send(&app, "GET", "/health/detailed", None, None).await;
        assert_eq!(json(&bytes)["editorSessions"], 1);

        send(&app, "POST", "/api/auth/logout", Some(&token), None).await;
        let (_, bytes) = send(&app, "GET", "/health/detailed", None, None).await;
        assert_eq!(json(&bytes)["editorSessions"], 0);
    }
}
