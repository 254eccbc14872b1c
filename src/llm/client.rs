use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Default local chat endpoint (Ollama)
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/chat";
/// Default local model
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
/// Default remote model
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// Something that can turn a transcript into a summary
#[allow(async_fn_in_trait)]
pub trait SummaryBackend {
    /// Short name for logging
    fn name(&self) -> &str;

    /// Send a system prompt and transcript, return the reply text
    async fn summarize(&self, system: &str, transcript: &str) -> Result<String>;
}

/// Which endpoint to send summaries to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Local Ollama chat API
    #[default]
    Ollama,
    /// Anthropic messages API (needs ANTHROPIC_API_KEY)
    Anthropic,
}

/// Configuration for the Ollama chat client
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Chat endpoint URL
    pub url: String,
    /// Model to use (e.g., "llama3.2")
    pub model: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Ollama chat client
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    fn build_request(&self, system: &str, user: &str) -> OllamaChatRequest {
        OllamaChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            stream: false,
        }
    }
}

impl SummaryBackend for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn summarize(&self, system: &str, transcript: &str) -> Result<String> {
        let request = self.build_request(system, transcript);

        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.config.url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama API error: {} - {}", status, body);
        }

        let response: OllamaChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama API response")?;

        Ok(response.message.content)
    }
}

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
    /// Per-request timeout
    pub timeout: Duration,
}

impl AnthropicConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY environment variable not set")?;
        Ok(Self::new(api_key, DEFAULT_ANTHROPIC_MODEL.to_string()))
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: 0.3,
            max_tokens: 1024,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    fn build_request(&self, system: &str, user: &str) -> AnthropicRequest {
        AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
        }
    }
}

impl SummaryBackend for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn summarize(&self, system: &str, transcript: &str) -> Result<String> {
        let request = self.build_request(system, transcript);

        let response = self
            .client
            .post(ANTHROPIC_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error: {} - {}", status, body);
        }

        let response: AnthropicResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        response.first_text().context("No text content in response")
    }
}

/// Backend chosen at runtime
pub enum LlmBackend {
    Ollama(OllamaClient),
    Anthropic(AnthropicClient),
}

impl SummaryBackend for LlmBackend {
    fn name(&self) -> &str {
        match self {
            LlmBackend::Ollama(client) => client.name(),
            LlmBackend::Anthropic(client) => client.name(),
        }
    }

    async fn summarize(&self, system: &str, transcript: &str) -> Result<String> {
        match self {
            LlmBackend::Ollama(client) => client.summarize(system, transcript).await,
            LlmBackend::Anthropic(client) => client.summarize(system, transcript).await,
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

impl AnthropicResponse {
    fn first_text(&self) -> Option<String> {
        self.content
            .iter()
            .find(|c| c.content_type == "text")
            .map(|c| c.text.clone())
    }
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}
