//! Sessions: who is signed in, and the JWT access tokens that carry it.
//!
//! "Nobody signed in" is an ordinary [`Session::Anonymous`] value that
//! handlers match on. Admin handlers take [`CurrentUser`], which rejects
//! anonymous requests with 401.

use std::collections::HashMap;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::db::models::User;
use crate::error::ApiError;
use crate::routes::AppState;
use crate::store::{Store, StoreError};

/// Access token lifetime.
pub const ACCESS_TOKEN_MINUTES: i64 = 15;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("no authorization token provided")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("token has been revoked")]
    Revoked,
    #[error("malformed token subject")]
    BadSubject,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

/// The signed-in user, as read from a verified token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    #[serde(skip)]
    pub token_id: String,
    #[serde(skip)]
    pub expires_at: i64,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: claims.sub.parse().map_err(|_| AuthError::BadSubject)?,
            email: claims.email,
            role: claims.role,
            token_id: claims.jti,
            expires_at: claims.exp,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Session {
    Anonymous,
    Authenticated { user: CurrentUser },
}

impl Session {
    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { user } => Some(user),
        }
    }
}

/// Session transitions, for anyone who needs to react to sign-in/out.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn { user_id: Uuid },
    SignedOut { user_id: Uuid },
}

/// A freshly issued access token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: CurrentUser,
}

pub struct Authenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    /// Revoked token ids with their expiry, pruned once expired.
    revoked: RwLock<HashMap<String, i64>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Authenticator {
    pub fn new(secret: &str) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            revoked: RwLock::new(HashMap::new()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn issue(&self, user: &User) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(ACCESS_TOKEN_MINUTES);
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            jti: Uuid::new_v4().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };
        let access_token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(IssuedToken {
            access_token,
            expires_at: exp,
            user: CurrentUser::try_from(claims)?,
        })
    }

    pub async fn verify(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        if self.revoked.read().await.contains_key(&data.claims.jti) {
            return Err(AuthError::Revoked);
        }
        CurrentUser::try_from(data.claims)
    }

    /// Resolve the request's bearer token into a session. Bad tokens are
    /// treated as no session.
    pub async fn session(&self, token: Option<&str>) -> Session {
        let Some(token) = token else {
            return Session::Anonymous;
        };
        match self.verify(token).await {
            Ok(user) => Session::Authenticated { user },
            Err(err) => {
                tracing::debug!(error = %err, "token verification failed");
                Session::Anonymous
            }
        }
    }

    /// Check credentials against the store and issue a token.
    pub async fn sign_in(
        &self,
        store: &dyn Store,
        email: &str,
        password: &str,
    ) -> Result<IssuedToken, AuthError> {
        let Some(user) = store.find_user_by_email(email).await? else {
            tracing::warn!(email, "login attempt for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        // bcrypt is CPU-bound; keep it off the async workers
        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))?
            .unwrap_or(false);
        if !matches {
            tracing::warn!(email, "failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.issue(&user)?;
        tracing::info!(user_id = %user.id, "successful login");
        let _ = self.events.send(SessionEvent::SignedIn { user_id: user.id });
        Ok(issued)
    }

    /// Revoke the token until it would have expired anyway.
    pub async fn sign_out(&self, user: &CurrentUser) {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(user.token_id.clone(), user.expires_at);
        drop(revoked);
        tracing::info!(user_id = %user.user_id, "signed out");
        let _ = self.events.send(SessionEvent::SignedOut {
            user_id: user.user_id,
        });
    }

    pub fn expiry(user: &CurrentUser) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(user.expires_at, 0).single()
    }
}

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

/// Bcrypt hash for a new password, computed off the async workers.
pub async fn hash_password(password: &str) -> Result<String, AuthError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST))
        .await
        .map_err(|e| AuthError::Hash(e.to_string()))?
        .map_err(|e| AuthError::Hash(e.to_string()))
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for Session {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(state.auth.session(bearer_token(parts)).await)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        Ok(state.auth.verify(token).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    async fn store_with(email: &str, password: &str) -> MemoryStore {
        let hash = bcrypt::hash(password, 4).unwrap();
        MemoryStore::with_admin(email, &hash).await
    }

    #[tokio::test]
    async fn test_sign_in_issues_verifiable_token() {
        let store = store_with("admin@example.com", "segredo123").await;
        let auth = Authenticator::new("test-secret");
        let mut events = auth.subscribe();

        let issued = auth
            .sign_in(&store, "Admin@Example.com", "segredo123")
            .await
            .unwrap();
        let user = auth.verify(&issued.access_token).await.unwrap();
        assert_eq!(user.email, "admin@example.com");
        assert_eq!(user.role, "admin");
        assert!(matches!(events.recv().await.unwrap(), SessionEvent::SignedIn { .. }));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user() {
        let store = store_with("admin@example.com", "segredo123").await;
        let auth = Authenticator::new("test-secret");
        assert!(matches!(
            auth.sign_in(&store, "admin@example.com", "errada").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_in(&store, "ninguem@example.com", "segredo123").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let store = store_with("admin@example.com", "segredo123").await;
        let auth = Authenticator::new("test-secret");
        let issued = auth
            .sign_in(&store, "admin@example.com", "segredo123")
            .await
            .unwrap();
        let user = auth.verify(&issued.access_token).await.unwrap();
        auth.sign_out(&user).await;

        assert!(matches!(
            auth.verify(&issued.access_token).await,
            Err(AuthError::Revoked)
        ));
        assert_eq!(auth.session(Some(&issued.access_token)).await, Session::Anonymous);
    }

    #[tokio::test]
    async fn test_foreign_secret_is_rejected() {
        let store = store_with("admin@example.com", "segredo123").await;
        let issued = Authenticator::new("one")
            .sign_in(&store, "admin@example.com", "segredo123")
            .await
            .unwrap();
        let other = Authenticator::new("two");
        assert!(matches!(
            other.verify(&issued.access_token).await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_no_token_is_anonymous() {
        let auth = Authenticator::new("s");
        assert_eq!(auth.session(None).await, Session::Anonymous);
        assert!(auth.session(None).await.user().is_none());
    }
}
