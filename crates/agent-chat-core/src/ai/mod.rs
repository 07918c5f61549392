pub mod claude;
pub mod ollama;
pub mod openai;

pub use claude::ClaudeClient;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;

use reqwest::StatusCode;

use crate::error::ServiceError;

/// Map a transport-level failure (no HTTP response) to a service error
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> ServiceError {
    if err.is_connect() || err.is_timeout() {
        ServiceError::Transient(format!("{} is unreachable: {}", provider, err))
    } else if err.is_decode() {
        ServiceError::Other(format!("{} sent an unreadable reply: {}", provider, err))
    } else {
        ServiceError::Other(format!("{} request failed: {}", provider, err))
    }
}

/// Map a non-success HTTP response to a service error
pub(crate) fn status_error(provider: &str, status: StatusCode, body: &str) -> ServiceError {
    let detail = api_error_message(body);

    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
        ServiceError::Transient(
            detail.unwrap_or_else(|| format!("{} is busy ({})", provider, status)),
        )
    } else if status.is_client_error() {
        ServiceError::Rejected(
            detail.unwrap_or_else(|| format!("{} rejected the request ({})", provider, status)),
        )
    } else {
        ServiceError::Other(format!("{} API error {}: {}", provider, status, body))
    }
}

/// Pull the human-readable message out of a provider error body.
///
/// Anthropic and OpenAI nest it as `{"error": {"message": ...}}`, Ollama
/// sends `{"error": "..."}`.
fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    let message = match error {
        serde_json::Value::String(message) => message.as_str(),
        other => other.get("message")?.as_str()?,
    };
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}
