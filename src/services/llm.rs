//! LLM client for feedback enrichment
//!
//! Provides the `TextGenerator` capability the enricher depends on, plus an
//! HTTP implementation that speaks either the OpenAI chat completions API or
//! the Anthropic messages API.

use crate::error::{FeedbackError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::debug;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Which wire protocol the generator speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LlmProvider {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "anthropic")]
    Anthropic,
}

impl LlmProvider {
    /// Environment variable consulted when no key is configured
    pub fn api_key_env(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => OPENAI_BASE_URL,
            LlmProvider::Anthropic => ANTHROPIC_BASE_URL,
        }
    }
}

/// Configuration for LLM service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Wire protocol
    pub provider: LlmProvider,

    /// API key; falls back to the provider's environment variable
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Model identifier (default: gpt-4o-mini)
    pub model: String,

    /// Override for the API base URL (proxies, local gateways)
    pub base_url: Option<String>,

    /// Max tokens for responses
    pub max_tokens: usize,

    /// Temperature for sampling
    pub temperature: f32,

    /// Upper bound on a single generation call, in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let provider = LlmProvider::default();
        Self {
            provider,
            api_key: env::var(provider.api_key_env()).unwrap_or_default(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            max_tokens: 512,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    /// Fill an empty key from the provider's environment variable
    pub fn resolve_api_key(mut self) -> Self {
        if self.api_key.is_empty() {
            self.api_key = env::var(self.provider.api_key_env()).unwrap_or_default();
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// A single generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Optional system role text
    pub system: Option<String>,
    /// User prompt
    pub prompt: String,
}

impl Instruction {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Anything that can turn an instruction into free-form text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for one instruction
    async fn generate(&self, instruction: &Instruction) -> Result<String>;

    /// Model identifier sent with each request
    fn model(&self) -> &str;
}

/// HTTP-backed text generator
pub struct LlmService {
    config: LlmConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// OpenAI chat completions request format
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: usize,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Anthropic API message format
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: usize,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

/// Anthropic API response format
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    text: String,
}

impl LlmService {
    /// Create a new LLM service with custom config
    ///
    /// A missing API key is not an error here: every call will fail instead,
    /// which the enricher turns into unavailable fields.
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { config, client })
    }

    /// Create with default config
    pub fn with_default() -> Result<Self> {
        Self::new(LlmConfig::default())
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.config.provider.default_base_url());
        format!("{}/{}", base.trim_end_matches('/'), path)
    }

    async fn call_openai(&self, instruction: &Instruction) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &instruction.system {
            messages.push(Message {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(Message {
            role: "user".to_string(),
            content: instruction.prompt.clone(),
        });

        let request = ChatRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages,
        };

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(FeedbackError::LlmApi(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| FeedbackError::LlmApi(format!("Failed to parse response: {}", e)))?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| FeedbackError::LlmApi("Empty response from API".to_string()))
    }

    async fn call_anthropic(&self, instruction: &Instruction) -> Result<String> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: instruction.system.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: instruction.prompt.clone(),
            }],
        };

        let response = self
            .client
            .post(self.endpoint("messages"))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(FeedbackError::LlmApi(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        let api_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| FeedbackError::LlmApi(format!("Failed to parse response: {}", e)))?;

        api_response
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| FeedbackError::LlmApi("Empty response from API".to_string()))
    }
}

#[async_trait]
impl TextGenerator for LlmService {
    async fn generate(&self, instruction: &Instruction) -> Result<String> {
        if self.config.api_key.is_empty() {
            return Err(FeedbackError::LlmApi(format!(
                "API key not configured (set {})",
                self.config.provider.api_key_env()
            )));
        }

        debug!(provider = ?self.config.provider, model = %self.config.model, "Calling generation API");

        match self.config.provider {
            LlmProvider::OpenAi => self.call_openai(instruction).await,
            LlmProvider::Anthropic => self.call_anthropic(instruction).await,
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
