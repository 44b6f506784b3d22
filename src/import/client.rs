use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use super::question::{ImportPayload, Question};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] Box<ureq::Error>),

    #[error("Failed to read response body: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server returned an error: {status}{}", detail(.message))]
    ServerError {
        status: u16,
        message: Option<String>,
    },
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("no valid questions to import")]
    NothingToImport,

    #[error("bulk import failed: {0}")]
    Request(#[from] RequestError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
}

/// Client for the LMS bulk question import endpoint.
pub struct BulkImportClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl BulkImportClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self::with_timeout(base_url, token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, token: &str, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    pub fn endpoint(&self, exam_id: &str) -> String {
        format!("{}/exams/{}/questions/bulk", self.base_url, exam_id)
    }

    /// Sends one batch. Only valid questions belong here; the caller filters.
    pub fn import(&self, exam_id: &str, questions: &[&Question]) -> Result<ImportReport, ImportError> {
        if questions.is_empty() {
            return Err(ImportError::NothingToImport);
        }

        let url = self.endpoint(exam_id);
        let response = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Content-Type", "application/json")
            .send_json(ImportPayload { questions })
            .map_err(|e| match e {
                ureq::Error::Status(status, response) => {
                    let message = response.into_string().ok().and_then(|b| error_message(&b));
                    warn!(status, url = %url, "bulk import rejected");
                    RequestError::ServerError { status, message }
                }
                other => RequestError::Http(Box::new(other)),
            })?;

        let body = response.into_string().map_err(RequestError::Io)?;
        let imported = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("imported").and_then(Value::as_u64))
            .map_or(questions.len(), |n| n as usize);

        info!(exam_id, imported, "bulk import accepted");
        Ok(ImportReport { imported })
    }
}

fn detail(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(" ({m})")).unwrap_or_default()
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
