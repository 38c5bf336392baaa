/**
 * Catalog Routes
 * Page templates, the block catalog and stateless block helpers
 * (render, editor form, single edit) for the admin UI
 */
use axum::{extract::State, response::Html, Json};
use serde::Deserialize;
use strum::IntoEnumIterator;

use super::AppState;
use crate::blocks::editor::{self, EditOp, EditorView, Tab};
use crate::blocks::render::{self, RenderContext, RenderMode};
use crate::blocks::{Block, BlockTemplate, BlockType};
use crate::db::models::PageTemplate;
use crate::error::ApiError;
use crate::session::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub block: Block,
    #[serde(default)]
    pub mode: RenderMode,
    #[serde(default)]
    pub site_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FormRequest {
    pub block: Block,
    #[serde(default)]
    pub tab: Tab,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub block: Block,
    pub op: EditOp,
}

/// GET /api/templates
pub async fn list_page_templates(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<PageTemplate>>, ApiError> {
    Ok(Json(state.store.list_page_templates().await?))
}

/// GET /api/blocks/catalog
/// Stored templates, or the built-in one per block type when none are stored.
pub async fn block_catalog(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Json<Vec<BlockTemplate>> {
    let stored = state.store.list_block_templates().await.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "block catalog unavailable, using built-in templates");
        Vec::new()
    });
    if !stored.is_empty() {
        return Json(stored);
    }
    Json(BlockType::iter().map(BlockTemplate::builtin).collect())
}

/// POST /api/blocks/render
pub async fn render_block(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<RenderRequest>,
) -> Html<String> {
    let ctx = RenderContext::new(payload.site_id.unwrap_or_default(), payload.mode)
        .with_maps_key(state.config.maps_api_key.clone());
    Html(render::render_block(&payload.block, &ctx))
}

/// POST /api/blocks/form
pub async fn block_form(_user: CurrentUser, Json(payload): Json<FormRequest>) -> Json<EditorView> {
    Json(editor::form(&payload.block, payload.tab))
}

/// POST /api/blocks/edit
pub async fn edit_block(
    _user: CurrentUser,
    Json(payload): Json<EditRequest>,
) -> Result<Json<Block>, ApiError> {
    Ok(Json(editor::apply(&payload.block, &payload.op)?))
}

#[cfg(test)]
mod tests {
    use crate::blocks::BlockTemplate;
    use crate::routes::testing::{app, json, send};
    use axum::http::StatusCode;
    use serde_json::json as j;

    #[tokio::test]
    async fn test_catalog_falls_back_to_builtins() {
        let (app, _, token) = app().await;
        let (status, bytes) = send(&app, "GET", "/api/blocks/catalog", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&bytes);
        assert_eq!(body.as_array().unwrap().len(), 14);
        assert_eq!(body[0]["content"]["type"], "hero");
    }

    #[tokio::test]
    async fn test_catalog_prefers_stored_templates() {
        let (app, store, token) = app().await;
        store
            .add_block_template(BlockTemplate {
                id: "t1".into(),
                name: "Hero escuro".into(),
                description: None,
                category: Some("layout".into()),
                content: j!({"type": "hero", "settings": {"textColor": "#fff"}}),
            })
            .await;
        let (_, bytes) = send(&app, "GET", "/api/blocks/catalog", Some(&token), None).await;
        let body = json(&bytes);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["name"], "Hero escuro");
    }

    #[tokio::test]
    async fn test_render_unknown_block_shows_placeholder() {
        let (app, _, token) = app().await;
        let (status, bytes) = send(
            &app,
            "POST",
            "/api/blocks/render",
            Some(&token),
            Some(j!({"block": {"id": "b1", "type": "pricing"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Bloco não suportado: pricing"));
    }

    #[tokio::test]
    async fn test_edit_sets_nested_field() {
        let (app, _, token) = app().await;
        let (status, bytes) = send(
            &app,
            "POST",
            "/api/blocks/edit",
            Some(&token),
            Some(j!({
                "block": {"id": "b1", "type": "hero", "content": {"title": "Antigo"}},
                "op": {"op": "set_field", "path": "content.title", "value": "Novo"}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&bytes)["content"]["title"], "Novo");

        let (status, _) = send(
            &app,
            "POST",
            "/api/blocks/edit",
            Some(&token),
            Some(j!({
                "block": {"id": "b1", "type": "hero"},
                "op": {"op": "set_field", "path": "type", "value": "menu"}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_form_for_unsupported_block() {
        let (app, _, token) = app().await;
        let (_, bytes) = send(
            &app,
            "POST",
            "/api/blocks/form",
            Some(&token),
            Some(j!({"block": {"id": "b1", "type": "pricing"}, "tab": "settings"})),
        )
        .await;
        assert_eq!(json(&bytes)["view"], "invalid");
    }
}
