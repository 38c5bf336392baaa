/**
 * Authentication Routes
 * JWT-based sign-in, session lookup and sign-out
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AppState, SuccessResponse};
use crate::error::ApiError;
use crate::session::{Authenticator, CurrentUser, Session};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub user: CurrentUser,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: Session,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }
    if !payload.email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email format".to_string()));
    }

    let issued = state
        .auth
        .sign_in(state.store.as_ref(), payload.email.trim(), &payload.password)
        .await?;

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            success: true,
            user: issued.user,
            access_token: issued.access_token,
            expires_at: issued.expires_at,
        }),
    ))
}

/// GET /api/auth/session
/// Never fails: an absent or bad token is an anonymous session.
pub async fn session(session: Session) -> impl IntoResponse {
    let expires_at = session.user().and_then(Authenticator::expiry);
    Json(SessionResponse {
        session,
        expires_at,
    })
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    state.auth.sign_out(&user).await;
    let closed = state.editors.close_user(user.user_id).await;
    if closed > 0 {
        tracing::info!(user_id = %user.user_id, closed, "editor sessions closed on logout");
    }
    Json(SuccessResponse { success: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{app, json, send, ADMIN_EMAIL, ADMIN_PASSWORD};
    use serde_json::json as j;

    #[tokio::test]
    async fn test_login_empty_email_returns_bad_request() {
        let (app, _, _) = app().await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(j!({"email": "", "password": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_invalid_email_format_returns_bad_request() {
        let (app, _, _) = app().await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(j!({"email": "no-at-sign", "password": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_wrong_credentials_returns_unauthorized() {
        let (app, _, _) = app().await;
        let (status, bytes) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(j!({"email": ADMIN_EMAIL, "password": "wrongpassword"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json(&bytes)["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_login_then_session_then_logout() {
        let (app, _, _) = app().await;
        let (status, bytes) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(j!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&bytes);
        let token = body["accessToken"].as_str().unwrap().to_string();
        assert_eq!(body["user"]["email"], ADMIN_EMAIL);

        let (_, bytes) = send(&app, "GET", "/api/auth/session", Some(&token), None).await;
        let body = json(&bytes);
        assert_eq!(body["state"], "authenticated");
        assert!(body["expiresAt"].is_string());

        let (status, _) = send(&app, "POST", "/api/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, bytes) = send(&app, "GET", "/api/auth/session", Some(&token), None).await;
        assert_eq!(json(&bytes)["state"], "anonymous");
        let (status, _) = send(&app, "POST", "/api/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_without_token_is_anonymous() {
        let (app, _, _) = app().await;
        let (status, bytes) = send(&app, "GET", "/api/auth/session", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&bytes)["state"], "anonymous");
    }
}
