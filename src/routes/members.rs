/**
 * Site Member Routes
 * Who can work on a site, and in which role
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{AppState, SuccessResponse};
use crate::db::models::{SiteMember, SiteRole};
use crate::error::ApiError;
use crate::session::CurrentUser;
use crate::store::StoreError;

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub email: String,
    #[serde(default)]
    pub role: SiteRole,
}

#[derive(Debug, Deserialize)]
pub struct MemberRoleRequest {
    pub role: SiteRole,
}

fn member_not_found(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound => ApiError::not_found("Member"),
        other => other.into(),
    }
}

/// GET /api/sites/{site_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(site_id): Path<Uuid>,
) -> Result<Json<Vec<SiteMember>>, ApiError> {
    state.store.get_site(site_id).await.map_err(|err| match err {
        StoreError::NotFound => ApiError::not_found("Site"),
        other => other.into(),
    })?;
    Ok(Json(state.store.list_site_members(site_id).await?))
}

/// POST /api/sites/{site_id}/members
/// Adds an existing account, looked up by email.
pub async fn add_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(site_id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<SiteMember>), ApiError> {
    let Some(account) = state.store.find_user_by_email(&payload.email).await? else {
        return Err(ApiError::NotFound(
            "User not found. Check the email address.".to_string(),
        ));
    };
    let member = state
        .store
        .add_site_member(site_id, account.id, payload.role)
        .await
        .map_err(|err| match err {
            StoreError::Conflict(_) => {
                ApiError::Conflict("User is already a member of this site".to_string())
            }
            StoreError::NotFound => ApiError::not_found("Site"),
            other => other.into(),
        })?;
    tracing::info!(%site_id, member = %account.id, role = %payload.role, by = %user.user_id, "site member added");
    Ok((StatusCode::CREATED, Json(member)))
}

/// PATCH /api/sites/{site_id}/members/{user_id}
pub async fn update_member(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((site_id, user_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<MemberRoleRequest>,
) -> Result<Json<SiteMember>, ApiError> {
    let member = state
        .store
        .update_site_member(site_id, user_id, payload.role)
        .await
        .map_err(member_not_found)?;
    tracing::info!(%site_id, %user_id, role = %payload.role, "site member role changed");
    Ok(Json(member))
}

/// DELETE /api/sites/{site_id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((site_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .store
        .remove_site_member(site_id, user_id)
        .await
        .map_err(member_not_found)?;
    tracing::info!(%site_id, %user_id, "site member removed");
    Ok(Json(SuccessResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use crate::db::models::{NewUser, UserRole};
    use crate::routes::testing::{app, json, send, site_with_page};
    use crate::store::Store;
    use axum::http::StatusCode;
    use serde_json::json as j;

    #[tokio::test]
    async fn test_member_add_change_remove() {
        let (app, store, token) = app().await;
        let (site, _) = site_with_page(&store, "Início").await;
        let bia = store
            .create_user(NewUser {
                email: "bia@example.com".into(),
                password_hash: "hash".into(),
                full_name: Some("Bia".into()),
                role: UserRole::Editor,
            })
            .await
            .unwrap();
        let uri = format!("/api/sites/{}/members", site.id);

        let (_, bytes) = send(&app, "GET", &uri, Some(&token), None).await;
        let members = json(&bytes);
        assert_eq!(members.as_array().unwrap().len(), 1);
        assert_eq!(members[0]["role"], "owner");

        let (status, bytes) = send(
            &app,
            "POST",
            &uri,
            Some(&token),
            Some(j!({"email": "bia@example.com", "role": "viewer"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json(&bytes)["full_name"], "Bia");

        let (status, _) = send(
            &app,
            "POST",
            &uri,
            Some(&token),
            Some(j!({"email": "bia@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let member_uri = format!("{uri}/{}", bia.id);
        let (status, bytes) = send(
            &app,
            "PATCH",
            &member_uri,
            Some(&token),
            Some(j!({"role": "editor"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&bytes)["role"], "editor");

        let (status, _) = send(&app, "DELETE", &member_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "DELETE", &member_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_email_and_bad_role() {
        let (app, store, token) = app().await;
        let (site, _) = site_with_page(&store, "Início").await;
        let uri = format!("/api/sites/{}/members", site.id);

        let (status, _) = send(
            &app,
            "POST",
            &uri,
            Some(&token),
            Some(j!({"email": "ninguem@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            "POST",
            &uri,
            Some(&token),
            Some(j!({"email": "admin@example.com", "role": "superuser"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
