use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{status_error, transport_error};
use crate::error::ServiceError;
use crate::service::ReplyService;
use crate::state::Message;

const PROVIDER: &str = "Claude";

#[derive(Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ClaudeMessage>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    api_key: String,
    model: String,
    system_prompt: Option<String>,
}

impl ClaudeClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt;
        self
    }
}

#[async_trait]
impl ReplyService for ClaudeClient {
    async fn generate_reply(&self, prior: Vec<Message>) -> Result<String, ServiceError> {
        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: 4096,
            system: self.system_prompt.clone(),
            messages: prior
                .into_iter()
                .map(|m| ClaudeMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content,
                })
                .collect(),
        };

        let response = self.client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(PROVIDER, status, &text));
        }

        let claude_response: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        Ok(claude_response.content.first()
            .map(|c| c.text.clone())
            .unwrap_or_default())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
