use anyhow::{Context, Result, bail};
use extract::{GeneratorConfig, GeneratorProvider, RetryConfig};
use publish::QualtricsConfig;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use survey::PipelineConfig;

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub mode: OperationMode,
    pub generator: GeneratorConfig,
    pub pipeline: PipelineConfig,
    pub retry: RetryConfig,
    /// Present only when a Qualtrics token is configured.
    #[serde(skip)]
    pub hosting: Option<QualtricsConfig>,
    pub server_addr: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OperationMode {
    Fast,      // Short options, many units in flight, few retries
    Accurate,  // One unit at a time, patient timeouts
    Balanced,  // Default
}

impl FromStr for OperationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(OperationMode::Fast),
            "accurate" => Ok(OperationMode::Accurate),
            "balanced" => Ok(OperationMode::Balanced),
            other => bail!("Unknown OPERATION_MODE '{}' (expected fast, accurate or balanced)", other),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: OperationMode::Balanced,
            generator: GeneratorConfig::default(),
            pipeline: PipelineConfig::default(),
            retry: RetryConfig::default(),
            hosting: None,
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    pub fn fast_mode() -> Self {
        Self {
            mode: OperationMode::Fast,
            generator: GeneratorConfig {
                max_tokens: 500,
                request_timeout_secs: 30,
                ..GeneratorConfig::default()
            },
            pipeline: PipelineConfig {
                max_concurrent_units: 8,
                unit_timeout_secs: 60,
                ..PipelineConfig::concise()
            },
            retry: RetryConfig {
                max_retries: 1,
                initial_backoff_ms: 500,
                max_backoff_ms: 5000,
            },
            ..Self::default()
        }
    }

    pub fn accurate_mode() -> Self {
        Self {
            mode: OperationMode::Accurate,
            generator: GeneratorConfig {
                request_timeout_secs: 120,
                ..GeneratorConfig::default()
            },
            pipeline: PipelineConfig {
                unit_timeout_secs: 300,
                ..PipelineConfig::sequential()
            },
            retry: RetryConfig {
                max_retries: 5,
                initial_backoff_ms: 2000,
                max_backoff_ms: 20000,
            },
            ..Self::default()
        }
    }

    pub fn for_mode(mode: OperationMode) -> Self {
        match mode {
            OperationMode::Fast => Self::fast_mode(),
            OperationMode::Accurate => Self::accurate_mode(),
            OperationMode::Balanced => Self::default(),
        }
    }

    /// Load `.env` if present, then overlay the process environment on the defaults.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    /// `OPERATION_MODE` picks the base preset, other variables override it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = match get("OPERATION_MODE") {
            Some(mode) => Self::for_mode(mode.parse()?),
            None => Self::default(),
        };

        if let Some(provider) = get("GENERATOR_PROVIDER") {
            config.generator.provider = match provider.trim().to_lowercase().as_str() {
                "openai" => GeneratorProvider::OpenAi,
                "ollama" => GeneratorProvider::Ollama,
                other => bail!("Unknown GENERATOR_PROVIDER '{}' (expected openai or ollama)", other),
            };
        }

        match config.generator.provider {
            GeneratorProvider::OpenAi => {
                config.generator.api_key = get("OPENAI_API_KEY").map(SecretString::from);
                if let Some(model) = get("OPENAI_MODEL") {
                    config.generator.model = model;
                }
                config.generator.base_url = get("OPENAI_BASE_URL");
            }
            GeneratorProvider::Ollama => {
                config.generator.model =
                    get("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());
                config.generator.base_url =
                    Some(get("OLLAMA_BASE_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()));
            }
        }

        if let Some(v) = parse_var(&get, "GENERATOR_TEMPERATURE")? {
            config.generator.temperature = v;
        }
        if let Some(v) = parse_var(&get, "GENERATOR_MAX_TOKENS")? {
            config.generator.max_tokens = v;
        }
        if let Some(v) = parse_var(&get, "MAX_OPTION_WORDS")? {
            config.pipeline.max_option_words = v;
        }
        if let Some(v) = parse_var(&get, "MAX_CONCURRENT_UNITS")? {
            config.pipeline.max_concurrent_units = v;
        }
        if let Some(v) = parse_var(&get, "UNIT_TIMEOUT_SECS")? {
            config.pipeline.unit_timeout_secs = v;
        }

        if let Some(token) = get("QUALTRICS_API_TOKEN") {
            let mut hosting = QualtricsConfig::new(SecretString::from(token));
            if let Some(base_url) = get("QUALTRICS_BASE_URL") {
                hosting.base_url = base_url;
            }
            config.hosting = Some(hosting);
        }

        if let Some(addr) = get("SERVER_ADDR") {
            config.server_addr = addr;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.generator.provider == GeneratorProvider::OpenAi && self.generator.api_key.is_none() {
            bail!("OPENAI_API_KEY must be set when GENERATOR_PROVIDER is openai");
        }
        if self.pipeline.max_option_words == 0 {
            bail!("MAX_OPTION_WORDS must be at least 1");
        }
        if self.pipeline.unit_timeout_secs == 0 {
            bail!("UNIT_TIMEOUT_SECS must be at least 1");
        }
        Ok(())
    }

    pub fn hosting_enabled(&self) -> bool {
        self.hosting.is_some()
    }
}

fn parse_var<T, G>(get: &G, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {}: '{}'", key, raw))
        })
        .transpose()
}
