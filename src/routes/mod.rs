/**
 * Routes Module
 * API route handlers and the state they share
 */
pub mod auth;
pub mod catalog;
pub mod editor;
pub mod health;
pub mod leads;
pub mod members;
pub mod pages;
pub mod public;
pub mod sites;
pub mod users;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::session::Authenticator;
use crate::store::Store;

/// Error body shared by every handler.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Success response (for delete)
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: Arc<Authenticator>,
    pub editors: editor::EditorSessions,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            store,
            auth: Arc::new(Authenticator::new(&config.jwt_secret)),
            editors: editor::EditorSessions::new(config.editor_idle_timeout),
            config: Arc::new(config),
        }
    }
}
