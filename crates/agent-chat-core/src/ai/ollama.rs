use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{status_error, transport_error};
use crate::error::ServiceError;
use crate::service::ReplyService;
use crate::state::Message;

const PROVIDER: &str = "Ollama";

#[derive(Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    system_prompt: Option<String>,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt;
        self
    }

    fn build_request(&self, prior: Vec<Message>) -> OllamaChatRequest {
        let system = self.system_prompt.iter().map(|prompt| OllamaMessage {
            role: "system".to_string(),
            content: prompt.clone(),
        });
        let messages = system
            .chain(prior.into_iter().map(|m| OllamaMessage {
                role: m.role.as_str().to_string(),
                content: m.content,
            }))
            .collect();

        OllamaChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
        }
    }
}

#[async_trait]
impl ReplyService for OllamaClient {
    async fn generate_reply(&self, prior: Vec<Message>) -> Result<String, ServiceError> {
        let url = format!("{}/api/chat", self.base_url);
        let request = self.build_request(prior);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(PROVIDER, status, &text));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        Ok(chat_response.message.content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
