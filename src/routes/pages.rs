/**
 * Page Routes
 * Page metadata CRUD, whole-list block saves and editing previews
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{AppState, SuccessResponse};
use crate::blocks::render::{self, RenderContext, RenderMode};
use crate::blocks::Block;
use crate::error::ApiError;
use crate::pages::{NewPage, Page, PageUpdate};
use crate::session::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct SaveBlocksRequest {
    pub blocks: Vec<Block>,
}

/// GET /api/sites/{site_id}/pages
pub async fn list_pages(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(site_id): Path<Uuid>,
) -> Result<Json<Vec<Page>>, ApiError> {
    state
        .store
        .get_site(site_id)
        .await
        .map_err(|_| ApiError::not_found("Site"))?;
    Ok(Json(state.store.list_pages(site_id).await?))
}

/// POST /api/sites/{site_id}/pages
pub async fn create_page(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(site_id): Path<Uuid>,
    Json(payload): Json<NewPage>,
) -> Result<(StatusCode, Json<Page>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Page title is required".to_string()));
    }
    let page = state
        .store
        .create_page(site_id, payload, Some(user.user_id))
        .await?;
    tracing::info!(%site_id, page_id = %page.id, slug = %page.slug, "page created");
    Ok((StatusCode::CREATED, Json(page)))
}

/// GET /api/sites/{site_id}/pages/{page_id}
pub async fn get_page(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((site_id, page_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Page>, ApiError> {
    let page = state
        .store
        .get_page(site_id, page_id)
        .await
        .map_err(|_| ApiError::not_found("Page"))?;
    Ok(Json(page))
}

/// PATCH /api/sites/{site_id}/pages/{page_id}
pub async fn update_page(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((site_id, page_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<PageUpdate>,
) -> Result<Json<Page>, ApiError> {
    if payload.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::BadRequest("Page title cannot be empty".to_string()));
    }
    // nothing left after transliteration, e.g. only punctuation
    if payload.slug.as_deref().is_some_and(|s| slug::slugify(s).is_empty()) {
        return Err(ApiError::BadRequest("Invalid slug".to_string()));
    }
    Ok(Json(state.store.update_page(site_id, page_id, payload).await?))
}

/// DELETE /api/sites/{site_id}/pages/{page_id}
pub async fn delete_page(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((site_id, page_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.store.delete_page(site_id, page_id).await?;
    tracing::info!(%site_id, %page_id, "page deleted");
    Ok(Json(SuccessResponse { success: true }))
}

/// PUT /api/sites/{site_id}/pages/{page_id}/blocks
/// Replaces the whole block list. Last write wins.
pub async fn save_blocks(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((site_id, page_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SaveBlocksRequest>,
) -> Result<Json<Page>, ApiError> {
    let mut page = state.store.get_page(site_id, page_id).await?;
    let now = Utc::now();
    state
        .store
        .save_page_blocks(page_id, &payload.blocks, now)
        .await?;
    tracing::info!(%page_id, blocks = payload.blocks.len(), "page blocks saved");

    page.blocks = payload.blocks;
    page.updated_at = now;
    Ok(Json(page))
}

/// GET /api/sites/{site_id}/pages/{page_id}/preview
/// Editing-mode render: carousels do not autoplay.
pub async fn preview_page(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((site_id, page_id)): Path<(Uuid, Uuid)>,
) -> Result<Html<String>, ApiError> {
    let page = state.store.get_page(site_id, page_id).await?;
    let site_pages = state
        .store
        .list_published_pages(site_id)
        .await
        .unwrap_or_default();
    let mut ctx = RenderContext::new(site_id.to_string(), RenderMode::Editing)
        .with_pages(site_pages)
        .with_maps_key(state.config.maps_api_key.clone());
    ctx.page_id = Some(page.id.to_string());
    Ok(Html(render::render_page(&page, &ctx)))
}
