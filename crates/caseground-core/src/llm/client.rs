//! HTTP plumbing shared by the Ollama and Anthropic clients

use crate::error::{CasegroundError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chat message for completion requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Build an HTTP client for a streaming service.
///
/// Only the connect phase is bounded; a streamed generation may legitimately
/// run for minutes, so per-request timeouts are set where they apply.
pub(crate) fn build_http_client(connect_timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .build()
        .map_err(CasegroundError::Http)
}

/// Map a send failure to `ProviderUnavailable`
pub(crate) fn unreachable(service: &str, url: &str, err: reqwest::Error) -> CasegroundError {
    CasegroundError::ProviderUnavailable(format!("{} unreachable at {}: {}", service, url, err))
}

/// Turn a non-success response into an error carrying status and body
pub(crate) async fn check_status(
    service: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let reason = match status.as_u16() {
        401 | 403 => "authentication failed",
        429 => "rate limited",
        _ => "request failed",
    };
    Err(CasegroundError::ExternalError(format!(
        "{} {} (HTTP {}): {}",
        service,
        reason,
        status.as_u16(),
        body.trim()
    )))
}
