//! HTTP oracle backed by a hosted language model
//!
//! Model-agnostic client for chat-completion style APIs. Supports both
//! Anthropic and OpenAI-compatible APIs (DeepSeek, etc), chosen from the
//! endpoint URL.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::config::LlmConfig;
use crate::core::error::{JutlandError, Result};
use crate::llm::oracle::{CallError, Oracle};

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            max_tokens: LlmConfig::default().max_tokens,
            api_format,
        }
    }

    /// Build a client from config, reading the key from the configured
    /// environment variable
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| JutlandError::Config(format!("{} not set", config.api_key_env)))?;

        let mut client = Self::new(api_key, config.api_url.clone(), config.model.clone());
        client.max_tokens = config.max_tokens;
        Ok(client)
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a completion request to the LLM
    pub async fn complete(&self, system: &str, user: &str) -> std::result::Result<String, CallError> {
        tracing::debug!(
            model = %self.model,
            system_len = system.len(),
            user_len = user.len(),
            "Sending oracle request"
        );
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAI => self.complete_openai(system, user).await,
        }
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> std::result::Result<String, CallError> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        let response = check_status(response).await?;

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        Ok(anthropic_text(completion))
    }

    async fn complete_openai(&self, system: &str, user: &str) -> std::result::Result<String, CallError> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        let response = check_status(response).await?;

        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        openai_text(completion)
    }
}

impl Oracle for LlmClient {
    async fn call(&self, system_prompt: &str, user_prompt: &str) -> std::result::Result<String, CallError> {
        self.complete(system_prompt, user_prompt).await
    }
}

async fn check_status(response: reqwest::Response) -> std::result::Result<reqwest::Response, CallError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CallError::Api {
        status: status.as_u16(),
        body,
    })
}

// Blank text is still a reply; the referee decides what an empty answer means.
fn anthropic_text(completion: AnthropicResponse) -> String {
    completion
        .content
        .into_iter()
        .filter_map(|c| c.text)
        .collect::<Vec<_>>()
        .join("")
}

fn openai_text(completion: OpenAIResponse) -> std::result::Result<String, CallError> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or(CallError::EmptyResponse)?;
    Ok(choice.message.content.unwrap_or_default())
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
