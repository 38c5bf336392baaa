/**
 * Site Routes
 * CRUD for the sites an administrator manages
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{AppState, SuccessResponse};
use crate::db::models::{NewSite, Site, SiteUpdate};
use crate::error::ApiError;
use crate::session::CurrentUser;

const SITE_STATUSES: [&str; 3] = ["draft", "active", "archived"];

/// GET /api/sites
pub async fn list_sites(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Site>>, ApiError> {
    Ok(Json(state.store.list_sites().await?))
}

/// POST /api/sites
pub async fn create_site(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NewSite>,
) -> Result<(StatusCode, Json<Site>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Site name is required".to_string()));
    }
    let site = state.store.create_site(payload, user.user_id).await?;
    tracing::info!(site_id = %site.id, owner = %user.user_id, "site created");
    Ok((StatusCode::CREATED, Json(site)))
}

/// GET /api/sites/{site_id}
pub async fn get_site(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(site_id): Path<Uuid>,
) -> Result<Json<Site>, ApiError> {
    let site = state
        .store
        .get_site(site_id)
        .await
        .map_err(|_| ApiError::not_found("Site"))?;
    Ok(Json(site))
}

/// PATCH /api/sites/{site_id}
pub async fn update_site(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(site_id): Path<Uuid>,
    Json(payload): Json<SiteUpdate>,
) -> Result<Json<Site>, ApiError> {
    if payload.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::BadRequest("Site name cannot be empty".to_string()));
    }
    if let Some(status) = payload.status.as_deref() {
        if !SITE_STATUSES.contains(&status) {
            return Err(ApiError::BadRequest(format!("Unknown site status '{status}'")));
        }
    }
    Ok(Json(state.store.update_site(site_id, payload).await?))
}

/// DELETE /api/sites/{site_id}
pub async fn delete_site(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(site_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.store.delete_site(site_id).await?;
    tracing::info!(%site_id, "site deleted");
    Ok(Json(SuccessResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::{app, json, send};
    use axum::http::StatusCode;
    use serde_json::json as j;

    #[tokio::test]
    async fn test_sites_require_auth() {
        let (app, _, _) = app().await;
        let (status, _) = send(&app, "GET", "/api/sites", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_site_crud() {
        let (app, _, token) = app().await;
        let (status, bytes) = send(
            &app,
            "POST",
            "/api/sites",
            Some(&token),
            Some(j!({"name": "Padaria", "domain": "padaria.example"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = json(&bytes)["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "POST",
            "/api/sites",
            Some(&token),
            Some(j!({"name": "Outra", "domain": "padaria.example"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, bytes) = send(
            &app,
            "PATCH",
            &format!("/api/sites/{id}"),
            Some(&token),
            Some(j!({"status": "active"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&bytes)["status"], "active");

        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/api/sites/{id}"),
            Some(&token),
            Some(j!({"status": "sideways"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, bytes) = send(&app, "GET", "/api/sites", Some(&token), None).await;
        assert_eq!(json(&bytes).as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "DELETE", &format!("/api/sites/{id}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "GET", &format!("/api/sites/{id}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_site_requires_name() {
        let (app, _, token) = app().await;
        let (status, _) = send(&app, "POST", "/api/sites", Some(&token), Some(j!({"name": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
