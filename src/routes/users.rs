/**
 * User Routes
 * Account administration and the signed-in user's own profile
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{AppState, SuccessResponse};
use crate::db::models::{NewUser, User, UserRole, UserUpdate};
use crate::error::ApiError;
use crate::session::{hash_password, CurrentUser};
use crate::store::StoreError;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    #[serde(alias = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: String,
}

fn is_admin(user: &CurrentUser) -> bool {
    user.role == UserRole::Admin.as_ref()
}

fn require_admin(user: &CurrentUser, action: &str) -> Result<(), ApiError> {
    if is_admin(user) {
        Ok(())
    } else {
        tracing::warn!(user_id = %user.user_id, action, "admin action refused");
        Err(ApiError::Forbidden(format!("Only administrators can {action}")))
    }
}

fn check_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must have at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn user_not_found(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound => ApiError::not_found("User"),
        other => other.into(),
    }
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.store.list_users().await?))
}

/// POST /api/users (admin)
pub async fn create_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    require_admin(&user, "create users")?;
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }
    check_password(&payload.password)?;

    let password_hash = hash_password(&payload.password).await?;
    let created = state
        .store
        .create_user(NewUser {
            email: email.to_string(),
            password_hash,
            full_name: payload.full_name.filter(|n| !n.trim().is_empty()),
            role: payload.role,
        })
        .await
        .map_err(|err| match err {
            StoreError::Conflict(_) => ApiError::Conflict("Email is already registered".to_string()),
            other => other.into(),
        })?;
    tracing::info!(user_id = %created.id, role = %created.role, by = %user.user_id, "user created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let found = state.store.get_user(user_id).await.map_err(user_not_found)?;
    Ok(Json(found))
}

/// PATCH /api/users/{user_id}
/// Admins edit anyone; other users edit their own name but not their role.
pub async fn update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(mut payload): Json<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    if !is_admin(&user) {
        if user.user_id != user_id {
            return Err(ApiError::Forbidden(
                "You may only edit your own account".to_string(),
            ));
        }
        payload.role = None;
    }
    let updated = state
        .store
        .update_user(user_id, payload)
        .await
        .map_err(user_not_found)?;
    tracing::info!(%user_id, by = %user.user_id, "user updated");
    Ok(Json(updated))
}

/// PUT /api/users/{user_id}/password
/// Only the account holder changes a password.
pub async fn update_password(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<PasswordRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if user.user_id != user_id {
        return Err(ApiError::Forbidden(
            "Passwords can only be changed by their owner".to_string(),
        ));
    }
    check_password(&payload.new_password)?;
    let hash = hash_password(&payload.new_password).await?;
    state
        .store
        .set_user_password(user_id, &hash)
        .await
        .map_err(user_not_found)?;
    tracing::info!(%user_id, "password changed");
    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /api/users/{user_id} (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_admin(&user, "delete users")?;
    if user.user_id == user_id {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }
    let target = state.store.get_user(user_id).await.map_err(user_not_found)?;
    if target.role == UserRole::Admin.as_ref() {
        return Err(ApiError::Forbidden(
            "Administrators cannot be deleted".to_string(),
        ));
    }
    state.store.delete_user(user_id).await.map_err(user_not_found)?;
    state.editors.close_user(user_id).await;
    tracing::info!(%user_id, by = %user.user_id, "user deleted");
    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/profile
pub async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<User>, ApiError> {
    let profile = state.store.get_user(user.user_id).await.map_err(user_not_found)?;
    Ok(Json(profile))
}

/// PATCH /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<User>, ApiError> {
    let profile = state
        .store
        .update_user(
            user.user_id,
            UserUpdate {
                full_name: Some(payload.full_name),
                role: None,
            },
        )
        .await
        .map_err(user_not_found)?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::{app, json, send, ADMIN_EMAIL};
    use crate::store::Store;
    use axum::http::StatusCode;
    use serde_json::json as j;

    async fn login(app: &axum::Router, email: &str, password: &str) -> String {
        let (status, bytes) = send(
            app,
            "POST",
            "/api/auth/login",
            None,
            Some(j!({"email": email, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        json(&bytes)["accessToken"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_admin_creates_and_deletes_user() {
        let (app, store, token) = app().await;
        let (status, bytes) = send(
            &app,
            "POST",
            "/api/users",
            Some(&token),
            Some(j!({"email": "bia@example.com", "password": "segredo", "full_name": "Bia"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created = json(&bytes);
        assert_eq!(created["role"], "editor");
        assert!(created.get("password_hash").is_none());
        let id = created["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "POST",
            "/api/users",
            Some(&token),
            Some(j!({"email": "BIA@example.com", "password": "segredo"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, bytes) = send(&app, "GET", "/api/users", Some(&token), None).await;
        assert_eq!(json(&bytes).as_array().unwrap().len(), 2);

        let (status, _) = send(&app, "DELETE", &format!("/api/users/{id}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let (app, _, token) = app().await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/users",
            Some(&token),
            Some(j!({"email": "bia@example.com", "password": "123"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_editor_cannot_administer_accounts() {
        let (app, store, token) = app().await;
        send(
            &app,
            "POST",
            "/api/users",
            Some(&token),
            Some(j!({"email": "bia@example.com", "password": "segredo"})),
        )
        .await;
        let editor = login(&app, "bia@example.com", "segredo").await;
        let admin_id = store.find_user_by_email(ADMIN_EMAIL).await.unwrap().unwrap().id;

        let (status, _) = send(
            &app,
            "POST",
            "/api/users",
            Some(&editor),
            Some(j!({"email": "caio@example.com", "password": "segredo"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, "DELETE", &format!("/api/users/{admin_id}"), Some(&editor), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/api/users/{admin_id}"),
            Some(&editor),
            Some(j!({"full_name": "Hacker"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_editor_cannot_promote_self() {
        let (app, store, token) = app().await;
        send(
            &app,
            "POST",
            "/api/users",
            Some(&token),
            Some(j!({"email": "bia@example.com", "password": "segredo"})),
        )
        .await;
        let editor = login(&app, "bia@example.com", "segredo").await;
        let bia = store.find_user_by_email("bia@example.com").await.unwrap().unwrap();

        let (status, bytes) = send(
            &app,
            "PATCH",
            &format!("/api/users/{}", bia.id),
            Some(&editor),
            Some(j!({"full_name": "Beatriz", "role": "admin"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&bytes);
        assert_eq!(body["full_name"], "Beatriz");
        assert_eq!(body["role"], "editor");
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let (app, store, token) = app().await;
        let admin_id = store.find_user_by_email(ADMIN_EMAIL).await.unwrap().unwrap().id;
        let (status, _) = send(&app, "DELETE", &format!("/api/users/{admin_id}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_password_change_is_owner_only() {
        let (app, store, token) = app().await;
        send(
            &app,
            "POST",
            "/api/users",
            Some(&token),
            Some(j!({"email": "bia@example.com", "password": "segredo"})),
        )
        .await;
        let bia = store.find_user_by_email("bia@example.com").await.unwrap().unwrap();
        let admin_id = store.find_user_by_email(ADMIN_EMAIL).await.unwrap().unwrap().id;

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/users/{}/password", bia.id),
            Some(&token),
            Some(j!({"new_password": "outrasenha"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/users/{admin_id}/password"),
            Some(&token),
            Some(j!({"newPassword": "novasenha1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        login(&app, ADMIN_EMAIL, "novasenha1").await;
    }

    #[tokio::test]
    async fn test_profile_read_and_update() {
        let (app, _, token) = app().await;
        let (status, bytes) = send(&app, "GET", "/api/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&bytes)["email"], ADMIN_EMAIL);

        let (status, bytes) = send(
            &app,
            "PATCH",
            "/api/profile",
            Some(&token),
            Some(j!({"full_name": "Administradora"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&bytes)["full_name"], "Administradora");
        assert_eq!(json(&bytes)["role"], "admin");
    }
}
