use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::ai::{ClaudeClient, OllamaClient, OpenAIClient};
use crate::config::Config;
use crate::service::ReplyService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Ollama,
    Claude,
    OpenAI,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::Claude => "claude",
            Provider::OpenAI => "openai",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Some(Provider::Ollama),
            "claude" => Some(Provider::Claude),
            "openai" => Some(Provider::OpenAI),
            _ => None,
        }
    }

    pub fn all() -> Vec<Provider> {
        vec![Provider::Ollama, Provider::Claude, Provider::OpenAI]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Ollama => "Ollama (Local)",
            Provider::Claude => "Claude (Anthropic)",
            Provider::OpenAI => "ChatGPT (OpenAI)",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Ollama => "llama3.2:latest",
            Provider::Claude => "claude-sonnet-4-20250514",
            Provider::OpenAI => "gpt-4o-mini",
        }
    }

    /// Build the reply service for this provider.
    ///
    /// API keys come from the environment first, then the config file.
    pub fn connect(&self, config: &Config) -> Result<Arc<dyn ReplyService>> {
        let model = config
            .default_model
            .clone()
            .unwrap_or_else(|| self.default_model().to_string());
        let system_prompt = config.system_prompt.clone();

        let service: Arc<dyn ReplyService> = match self {
            Provider::Ollama => Arc::new(
                OllamaClient::new(config.ollama_url(), &model).with_system_prompt(system_prompt),
            ),
            Provider::Claude => {
                let key = std::env::var("ANTHROPIC_API_KEY").ok()
                    .or_else(|| config.claude_api_key.clone())
                    .ok_or_else(|| anyhow!("Claude API key not configured. Set ANTHROPIC_API_KEY or claude_api_key in the config file"))?;
                Arc::new(ClaudeClient::new(&key, &model).with_system_prompt(system_prompt))
            }
            Provider::OpenAI => {
                let key = std::env::var("OPENAI_API_KEY").ok()
                    .or_else(|| config.openai_api_key.clone())
                    .ok_or_else(|| anyhow!("OpenAI API key not configured. Set OPENAI_API_KEY or openai_api_key in the config file"))?;
                Arc::new(OpenAIClient::new(&key, &model).with_system_prompt(system_prompt))
            }
        };

        tracing::info!(provider = self.as_str(), model = %model, "reply service ready");
        Ok(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(Provider::from_str("Claude"), Some(Provider::Claude));
        assert_eq!(Provider::from_str("OPENAI"), Some(Provider::OpenAI));
        assert_eq!(Provider::from_str("gemini"), None);
        for provider in Provider::all() {
            assert_eq!(Provider::from_str(provider.as_str()), Some(provider));
        }
    }

    #[test]
    fn test_ollama_connect_uses_configured_model() {
        let config = Config {
            default_model: Some("gemma3:latest".to_string()),
            ..Config::new()
        };
        let service = Provider::Ollama.connect(&config).unwrap();
        assert_eq!(service.model(), "gemma3:latest");
    }

    #[test]
    fn test_ollama_connect_falls_back_to_provider_default() {
        let service = Provider::Ollama.connect(&Config::new()).unwrap();
        assert_eq!(service.model(), "llama3.2:latest");
    }
}
