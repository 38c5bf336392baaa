//! API error type. Every failure leaves the server as a short JSON message;
//! details go to the logs only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::blocks::contact::SubmitError;
use crate::blocks::editor::EditError;
use crate::composer::ComposeError;
use crate::routes::ErrorResponse;
use crate::session::AuthError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("service temporarily unavailable")]
    Unavailable,
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{what} not found"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
                message: None,
            }),
        )
            .into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::not_found("Resource"),
            StoreError::Conflict(detail) => {
                tracing::warn!(%detail, "store conflict");
                ApiError::Conflict("Resource already exists".to_string())
            }
            StoreError::Unavailable => {
                tracing::error!("store unavailable");
                ApiError::Unavailable
            }
            other => {
                tracing::error!(error = %other, "store error");
                ApiError::Internal
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized("Invalid credentials".into()),
            AuthError::MissingToken => ApiError::Unauthorized("Authorization required".into()),
            AuthError::InvalidToken(_) | AuthError::Revoked | AuthError::BadSubject => {
                ApiError::Unauthorized("Invalid or expired token".into())
            }
            AuthError::Store(err) => err.into(),
            AuthError::Hash(detail) => {
                tracing::error!(%detail, "password verification failed");
                ApiError::Internal
            }
        }
    }
}

impl From<EditError> for ApiError {
    fn from(err: EditError) -> Self {
        ApiError::Unprocessable(err.to_string())
    }
}

impl From<ComposeError> for ApiError {
    fn from(err: ComposeError) -> Self {
        match err {
            ComposeError::Store(err) => err.into(),
            ComposeError::Edit(err) => err.into(),
            ComposeError::NoSuchBlock(_) | ComposeError::UnknownBlock(_) => {
                ApiError::NotFound(err.to_string())
            }
            ComposeError::NoSelection | ComposeError::NotDragging => {
                ApiError::Conflict(err.to_string())
            }
            ComposeError::IdentityChanged { .. } => ApiError::Unprocessable(err.to_string()),
        }
    }
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::MissingField(_) => ApiError::BadRequest(err.user_message()),
            SubmitError::Store(StoreError::Unavailable) => ApiError::Unavailable,
            // the visitor only ever sees the generic message
            _ => ApiError::Unprocessable(err.user_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::contact::ERROR_MESSAGE;

    #[test]
    fn test_store_errors_map_to_status() {
        assert_eq!(ApiError::from(StoreError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(StoreError::Conflict("dup key".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StoreError::Unavailable).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_backend_details_stay_hidden() {
        let err = ApiError::from(StoreError::Conflict("duplicate key value violates".into()));
        assert!(!err.to_string().contains("duplicate"));
        let err = ApiError::from(SubmitError::NotConfigured);
        assert_eq!(err.to_string(), ERROR_MESSAGE);
    }

    #[test]
    fn test_auth_errors_are_unauthorized() {
        assert_eq!(ApiError::from(AuthError::Revoked).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::MissingToken).status(), StatusCode::UNAUTHORIZED);
    }
}
