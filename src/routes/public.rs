/**
 * Public Page Routes
 * Published pages rendered to HTML for visitors
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use uuid::Uuid;

use super::AppState;
use crate::blocks::render::{self, RenderContext, RenderMode};
use crate::error::ApiError;
use crate::pages;
use crate::store::StoreError;

/// GET /sites/{site_id}/p/{slug}
/// Unknown and unpublished pages get the same not-found document.
pub async fn show_page(
    State(state): State<AppState>,
    Path((site_id, slug)): Path<(Uuid, String)>,
) -> Response {
    if !pages::is_valid_slug(&slug) {
        return (StatusCode::NOT_FOUND, Html(render::render_not_found())).into_response();
    }
    let page = match state.store.get_published_page(site_id, &slug).await {
        Ok(page) => page,
        Err(StoreError::NotFound) => {
            return (StatusCode::NOT_FOUND, Html(render::render_not_found())).into_response();
        }
        Err(err) => {
            tracing::error!(%site_id, %slug, error = %err, "failed to load public page");
            return ApiError::from(err).into_response();
        }
    };

    let site_pages = state
        .store
        .list_published_pages(site_id)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(%site_id, error = %err, "menu pages unavailable");
            Vec::new()
        });
    let mut ctx = RenderContext::new(site_id.to_string(), RenderMode::Live)
        .with_pages(site_pages)
        .with_maps_key(state.config.maps_api_key.clone());
    ctx.page_id = Some(page.id.to_string());

    Html(render::render_page(&page, &ctx)).into_response()
}

#[cfg(test)]
mod tests {
    use crate::blocks::Block;
    use crate::pages::PageUpdate;
    use crate::routes::testing::{app, send, site_with_page};
    use crate::store::Store;
    use axum::http::StatusCode;
    use chrono::Utc;
    use serde_json::json;

    fn text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_unpublished_page_is_not_found() {
        let (app, store, _) = app().await;
        let (site, page) = site_with_page(&store, "Início").await;
        let (status, bytes) = send(&app, "GET", &format!("/sites/{}/p/{}", site.id, page.slug), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(text(&bytes).contains("Página não encontrada"));
    }

    #[tokio::test]
    async fn test_published_page_renders_blocks_and_menu() {
        let (app, store, _) = app().await;
        let (site, page) = site_with_page(&store, "Início").await;
        store
            .save_page_blocks(
                page.id,
                &[
                    Block::from(json!({"id": "m1", "type": "menu", "settings": {}, "items": []})),
                    Block::from(json!({"id": "h1", "type": "hero", "content": {"title": "Sorrisos <felizes>"}})),
                ],
                Utc::now(),
            )
            .await
            .unwrap();
        store
            .update_page(
                site.id,
                page.id,
                PageUpdate {
                    is_published: Some(true),
                    ..PageUpdate::default()
                },
            )
            .await
            .unwrap();

        let (status, bytes) = send(&app, "GET", &format!("/sites/{}/p/inicio", site.id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        let html = text(&bytes);
        assert!(html.contains("Sorrisos &lt;felizes&gt;"));
        assert!(html.contains("data-block-id=\"m1\""));
        assert!(html.contains("Início"));
    }

    #[tokio::test]
    async fn test_malformed_slug_skips_store() {
        let (app, store, _) = app().await;
        let (site, _) = site_with_page(&store, "Início").await;
        store.set_offline(true);
        let (status, _) = send(&app, "GET", &format!("/sites/{}/p/In%C3%ADcio", site.id), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_store_outage_is_unavailable() {
        let (app, store, _) = app().await;
        let (site, _) = site_with_page(&store, "Início").await;
        store.set_offline(true);
        let (status, _) = send(&app, "GET", &format!("/sites/{}/p/inicio", site.id), None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
