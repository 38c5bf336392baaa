//! Submission side of the `contact` block: collects the visitor's answers and
//! turns them into a lead for the site.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::schema::ContactField;
use crate::db::models::{Lead, NewLead};
use crate::notice::Notice;
use crate::store::{Store, StoreError};

pub const SUCCESS_MESSAGE: &str = "Mensagem enviada com sucesso!";
pub const ERROR_MESSAGE: &str = "Erro ao enviar formulário. Tente novamente.";

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("site has no lead capture settings")]
    NotConfigured,
    #[error("required field '{0}' is empty")]
    MissingField(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SubmitError {
    /// Text shown to the visitor. Backend details never leave the server.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::MissingField(label) => format!("Preencha o campo obrigatório: {label}"),
            _ => ERROR_MESSAGE.to_string(),
        }
    }
}

/// Live state of one contact form on a page.
#[derive(Debug, Clone)]
pub struct ContactForm {
    site_id: Uuid,
    fields: Vec<ContactField>,
    values: Map<String, Value>,
    notice: Option<Notice>,
}

impl ContactForm {
    /// A form over `fields`. With no fields every submitted name is kept.
    pub fn new(site_id: Uuid, fields: Vec<ContactField>) -> Self {
        Self {
            site_id,
            fields: fields.into_iter().filter(|f| !f.name.is_empty()).collect(),
            values: Map::new(),
            notice: None,
        }
    }

    pub fn fields(&self) -> &[ContactField] {
        &self.fields
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Record the value typed into field `name`. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        if !self.fields.is_empty() && !self.fields.iter().any(|f| f.name == name) {
            tracing::debug!(field = name, "ignoring value for unknown contact field");
            return false;
        }
        self.values
            .insert(name.to_string(), Value::String(value.into()));
        true
    }

    /// Fill from a submitted JSON object; non-string scalars are stringified.
    pub fn fill(&mut self, data: &Map<String, Value>) {
        for (name, value) in data {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null => continue,
                Value::Bool(_) | Value::Number(_) => value.to_string(),
                _ => continue,
            };
            self.set(name, text);
        }
    }

    pub fn validate(&self) -> Result<(), SubmitError> {
        for field in self.fields.iter().filter(|f| f.required) {
            let filled = self
                .values
                .get(&field.name)
                .and_then(Value::as_str)
                .is_some_and(|v| !v.trim().is_empty());
            if !filled {
                let label = if field.label.is_empty() {
                    field.name.clone()
                } else {
                    field.label.clone()
                };
                return Err(SubmitError::MissingField(label));
            }
        }
        Ok(())
    }

    /// Store the answers as a new lead.
    ///
    /// Fails closed when the site has no lead settings row. The `is_enabled`
    /// flag only drives the admin screens and does not gate submissions.
    /// On success the answers are cleared; on failure they are kept so the
    /// visitor can retry.
    pub async fn submit(
        &mut self,
        store: &dyn Store,
        source_url: &str,
        now: DateTime<Utc>,
    ) -> Result<Lead, SubmitError> {
        match self.try_submit(store, source_url).await {
            Ok(lead) => {
                tracing::info!(site_id = %self.site_id, lead_id = %lead.id, "lead captured");
                self.values.clear();
                self.notice = Some(Notice::success(SUCCESS_MESSAGE, now));
                Ok(lead)
            }
            Err(err) => {
                tracing::warn!(site_id = %self.site_id, error = %err, "contact submission failed");
                self.notice = Some(Notice::error(err.user_message(), now));
                Err(err)
            }
        }
    }

    async fn try_submit(&self, store: &dyn Store, source_url: &str) -> Result<Lead, SubmitError> {
        self.validate()?;
        let settings = store
            .get_lead_settings(self.site_id)
            .await?
            .ok_or(SubmitError::NotConfigured)?;
        tracing::debug!(site_id = %settings.site_id, enabled = settings.is_enabled, "lead settings found");
        let lead = store
            .insert_lead(NewLead {
                site_id: self.site_id,
                data: self.values.clone(),
                source_url: Some(source_url.to_string()),
            })
            .await?;
        Ok(lead)
    }
}
