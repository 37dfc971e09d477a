use anyhow::{Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::retry::{RetryConfig, RetryPolicy};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Anything that turns a prompt into a completion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorProvider {
    OpenAi,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub provider: GeneratorProvider,
    #[serde(skip)]
    pub api_key: Option<SecretString>,
    /// Overrides the provider's default endpoint.
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: GeneratorProvider::OpenAi,
            api_key: None,
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 1500,
            request_timeout_secs: 60,
        }
    }
}

/// Build the configured backend behind the shared trait object.
pub fn build_generator(
    config: &GeneratorConfig,
    retry: &RetryConfig,
) -> Result<Arc<dyn TextGenerator>> {
    let generator: Arc<dyn TextGenerator> = match config.provider {
        GeneratorProvider::OpenAi => Arc::new(OpenAiClient::new(config, retry)?),
        GeneratorProvider::Ollama => Arc::new(OllamaClient::new(config, retry)?),
    };
    Ok(generator)
}

fn non_empty(completion: String) -> Option<String> {
    (!completion.trim().is_empty()).then_some(completion)
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("Failed to build HTTP client")
}

#[derive(Clone)]
pub struct OpenAiClient {
    url: String,
    api_key: SecretString,
    model: String,
    temperature: f32,
    max_tokens: u32,
    retry: RetryPolicy,
    /// `backend/model`, used as the retry log context.
    operation: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &GeneratorConfig, retry: &RetryConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("OpenAI generator requires an API key")?;

        Ok(Self {
            url: config
                .base_url
                .clone()
                .unwrap_or_else(|| OPENAI_API_URL.to_string()),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            retry: RetryPolicy::from(retry),
            operation: format!("openai/{}", config.model),
            client: http_client(config.request_timeout_secs)?,
        })
    }

    async fn send(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OpenAI")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI request failed: {} {}", status, body);
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .and_then(non_empty)
            .context("OpenAI response contained no completion")
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.retry.retry(&self.operation, || self.send(prompt)).await
    }
}

#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    retry: RetryPolicy,
    /// `backend/model`, used as the retry log context.
    operation: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(config: &GeneratorConfig, retry: &RetryConfig) -> Result<Self> {
        Ok(Self {
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            retry: RetryPolicy::from(retry),
            operation: format!("ollama/{}", config.model),
            client: http_client(config.request_timeout_secs)?,
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        if !response.status().is_success() {
            anyhow::bail!("Ollama request failed: {}", response.status());
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        non_empty(ollama_response.response).context("Ollama response contained no completion")
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.retry
            .retry(&self.operation, || self.generate(prompt))
            .await
    }
}
