/**
 * Lead Routes
 * Per-site lead capture settings, the lead inbox, and the public
 * submission endpoint contact blocks post to
 */
use std::collections::HashMap;

use axum::{
    extract::{FromRequest, OriginalUri, Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::AppState;
use crate::blocks::contact::ContactForm;
use crate::blocks::render;
use crate::blocks::schema::ContactField;
use crate::blocks::BlockKind;
use crate::db::models::{Lead, LeadSettings, LeadSettingsUpdate, LeadStatus};
use crate::error::ApiError;
use crate::session::CurrentUser;
use crate::store::StoreError;

#[derive(Debug, Deserialize)]
pub struct LeadStatusRequest {
    pub status: LeadStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitLeadRequest {
    pub data: Map<String, Value>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub page_id: Option<Uuid>,
    #[serde(default)]
    pub block_id: Option<String>,
}

impl SubmitLeadRequest {
    /// Split a posted HTML form into the answers and the block context the
    /// renderer adds as hidden inputs.
    fn from_form(mut fields: HashMap<String, String>) -> Self {
        let page_id = fields.remove("page_id").and_then(|id| id.parse().ok());
        let block_id = fields.remove("block_id").filter(|id| !id.is_empty());
        let source_url = fields.remove("source_url");
        Self {
            data: fields
                .into_iter()
                .map(|(name, value)| (name, Value::String(value)))
                .collect(),
            source_url,
            page_id,
            block_id,
        }
    }
}

/// A lead submission from a script (JSON) or a plain HTML form post.
pub enum LeadSubmission {
    Json(SubmitLeadRequest),
    Form(SubmitLeadRequest),
}

impl<S: Send + Sync> FromRequest<S> for LeadSubmission {
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
        if is_form {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self::Form(SubmitLeadRequest::from_form(fields)))
        } else {
            let Json(payload) = Json::<SubmitLeadRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self::Json(payload))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitLeadResponse {
    pub success: bool,
    pub message: String,
    pub lead_id: Uuid,
}

async fn require_site(state: &AppState, site_id: Uuid) -> Result<(), ApiError> {
    state
        .store
        .get_site(site_id)
        .await
        .map(|_| ())
        .map_err(|err| match err {
            StoreError::NotFound => ApiError::not_found("Site"),
            other => other.into(),
        })
}

/// GET /api/sites/{site_id}/lead-settings
/// Creates the default configuration on first read.
pub async fn get_lead_settings(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(site_id): Path<Uuid>,
) -> Result<Json<LeadSettings>, ApiError> {
    require_site(&state, site_id).await?;
    if let Some(settings) = state.store.get_lead_settings(site_id).await? {
        return Ok(Json(settings));
    }
    let settings = state
        .store
        .upsert_lead_settings(LeadSettings::defaults_for(site_id))
        .await?;
    tracing::info!(%site_id, "default lead settings created");
    Ok(Json(settings))
}

/// PUT /api/sites/{site_id}/lead-settings
pub async fn update_lead_settings(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(site_id): Path<Uuid>,
    Json(payload): Json<LeadSettingsUpdate>,
) -> Result<Json<LeadSettings>, ApiError> {
    require_site(&state, site_id).await?;
    if payload
        .notification_email
        .as_deref()
        .is_some_and(|e| !e.trim().is_empty() && !e.contains('@'))
    {
        return Err(ApiError::BadRequest("Invalid notification email".to_string()));
    }
    let mut settings = state
        .store
        .get_lead_settings(site_id)
        .await?
        .unwrap_or_else(|| LeadSettings::defaults_for(site_id));
    settings.apply(payload);
    Ok(Json(state.store.upsert_lead_settings(settings).await?))
}

/// GET /api/sites/{site_id}/leads
pub async fn list_leads(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(site_id): Path<Uuid>,
) -> Result<Json<Vec<Lead>>, ApiError> {
    require_site(&state, site_id).await?;
    Ok(Json(state.store.list_leads(site_id).await?))
}

/// PATCH /api/leads/{lead_id}/status
pub async fn update_lead_status(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(lead_id): Path<Uuid>,
    Json(payload): Json<LeadStatusRequest>,
) -> Result<Json<Lead>, ApiError> {
    let lead = state
        .store
        .update_lead_status(lead_id, payload.status, payload.notes)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => ApiError::not_found("Lead"),
            other => other.into(),
        })?;
    tracing::info!(%lead_id, status = %lead.status, "lead status updated");
    Ok(Json(lead))
}

/// Fields of the contact block the visitor submitted from, when known.
async fn block_fields(
    state: &AppState,
    site_id: Uuid,
    page_id: Option<Uuid>,
    block_id: Option<&str>,
) -> Vec<ContactField> {
    let (Some(page_id), Some(block_id)) = (page_id, block_id) else {
        return Vec::new();
    };
    let Ok(page) = state.store.get_page(site_id, page_id).await else {
        return Vec::new();
    };
    page.blocks
        .iter()
        .find(|b| b.id_str() == block_id)
        .and_then(|b| match b.kind() {
            BlockKind::Contact(contact) => Some(contact.fields),
            _ => None,
        })
        .unwrap_or_default()
}

/// POST /api/sites/{site_id}/leads (public)
/// Scripts get JSON back; a plain form post gets a small HTML page.
pub async fn submit_lead(
    State(state): State<AppState>,
    Path(site_id): Path<Uuid>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    submission: LeadSubmission,
) -> Response {
    let (payload, is_form) = match submission {
        LeadSubmission::Json(payload) => (payload, false),
        LeadSubmission::Form(payload) => (payload, true),
    };
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let source_url = payload
        .source_url
        .clone()
        .filter(|u| !u.trim().is_empty())
        .or_else(|| referer.clone())
        .unwrap_or_else(|| uri.to_string());

    let fields = block_fields(&state, site_id, payload.page_id, payload.block_id.as_deref()).await;
    let mut form = ContactForm::new(site_id, fields);
    form.fill(&payload.data);

    let result = form.submit(state.store.as_ref(), &source_url, Utc::now()).await;
    let message = form
        .notice()
        .map(|n| n.message.clone())
        .unwrap_or_default();

    match (result, is_form) {
        (Ok(lead), false) => (
            StatusCode::CREATED,
            Json(SubmitLeadResponse {
                success: true,
                message,
                lead_id: lead.id,
            }),
        )
            .into_response(),
        (Err(err), false) => ApiError::from(err).into_response(),
        (Ok(_), true) => (
            StatusCode::CREATED,
            Html(render::render_submission_result(&message, true, referer.as_deref())),
        )
            .into_response(),
        (Err(err), true) => (
            ApiError::from(err).status(),
            Html(render::render_submission_result(&message, false, referer.as_deref())),
        )
            .into_response(),
    }
}
