//! OpenRouter-backed [`TextGenerator`].
//!
//! Sends each prompt as a single user message to the OpenRouter chat
//! completions endpoint and returns `choices[0].message.content`. All
//! settings, including the API key, are resolved once into
//! [`OpenRouterSettings`] when the generator is built.

mod types;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, header};
use tracing::{debug, instrument, warn};
use url::Url;

use docqa_core::TextGenerator;
use docqa_shared::{DocQaError, OpenRouterConfig, Result};

use types::{ChatRequest, ChatResponseRaw};

/// User-Agent string for generation requests.
const USER_AGENT: &str = concat!("DocQA/", env!("CARGO_PKG_VERSION"));

/// Longest response body echoed back in error messages.
const MAX_ERROR_BODY_CHARS: usize = 500;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Everything needed to talk to OpenRouter.
#[derive(Clone)]
pub struct OpenRouterSettings {
    pub api_key: String,
    pub model: String,
    /// API root; `/chat/completions` is appended.
    pub base_url: Url,
    /// Sent as `HTTP-Referer`.
    pub site_url: Option<String>,
    /// Sent as `X-Title`.
    pub site_name: Option<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for OpenRouterSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url.as_str())
            .field("site_url", &self.site_url)
            .field("site_name", &self.site_name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenRouterSettings {
    /// Settings with the public endpoint and no attribution headers.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let defaults = OpenRouterConfig::default();
        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: parse_base_url(&defaults.base_url)?,
            site_url: None,
            site_name: None,
            timeout: Duration::from_secs(defaults.timeout_secs),
        })
    }

    /// Resolve settings from the `[openrouter]` config section, reading the
    /// API key from the configured env var.
    pub fn from_config(config: &OpenRouterConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                DocQaError::config(format!(
                    "OpenRouter API key not found. Set the {} environment variable.",
                    config.api_key_env
                ))
            })?;

        Ok(Self {
            api_key,
            model: config.model.clone(),
            base_url: parse_base_url(&config.base_url)?,
            site_url: non_empty(&config.site_url),
            site_name: non_empty(&config.site_name),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Point at a different API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_site(mut self, site_url: Option<String>, site_name: Option<String>) -> Self {
        self.site_url = site_url;
        self.site_name = site_name;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| DocQaError::config(format!("invalid OpenRouter base URL '{raw}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(DocQaError::config(format!(
            "invalid OpenRouter base URL '{raw}': not an http(s) URL"
        )));
    }
    Ok(url)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// [`TextGenerator`] that calls the OpenRouter chat completions API.
#[derive(Debug, Clone)]
pub struct OpenRouterGenerator {
    http_client: Client,
    settings: OpenRouterSettings,
}

impl OpenRouterGenerator {
    pub fn new(settings: OpenRouterSettings) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| DocQaError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    pub fn settings(&self) -> &OpenRouterSettings {
        &self.settings
    }
}

#[async_trait]
impl TextGenerator for OpenRouterGenerator {
    #[instrument(skip_all, fields(model = %self.settings.model, prompt_bytes = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let request = ChatRequest::user_prompt(&self.settings.model, prompt);

        let mut builder = self
            .http_client
            .post(self.settings.endpoint())
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.settings.api_key),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request);
        if let Some(site_url) = &self.settings.site_url {
            builder = builder.header("HTTP-Referer", site_url);
        }
        if let Some(site_name) = &self.settings.site_name {
            builder = builder.header("X-Title", site_name);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "OpenRouter request failed");
            DocQaError::Generator(format!("OpenRouter request failed: {e}"))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            DocQaError::Generator(format!("failed to read OpenRouter response body: {e}"))
        })?;

        if !status.is_success() {
            warn!(%status, "OpenRouter API error");
            return Err(DocQaError::Generator(format!(
                "OpenRouter API error (HTTP {status}): {}",
                clip(&body)
            )));
        }

        let raw: ChatResponseRaw = serde_json::from_str(&body).map_err(|e| {
            DocQaError::Generator(format!(
                "unexpected API response structure: {e} (got: {})",
                clip(&body)
            ))
        })?;
        let usage = raw.usage;

        let content = raw.into_content().ok_or_else(|| {
            DocQaError::Generator(format!(
                "unexpected API response structure: {}",
                clip(&body)
            ))
        })?;

        debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            tokens_in = usage.map(|u| u.prompt_tokens),
            tokens_out = usage.map(|u| u.completion_tokens),
            response_bytes = content.len(),
            "OpenRouter chat completion"
        );

        Ok(content)
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}

fn clip(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
