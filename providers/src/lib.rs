//! Upstream text-generation client.
//!
//! # Architecture
//!
//! - [`TextGenerator`] - the seam the divination engine talks to. One request in,
//!   one complete output back; no streaming.
//! - [`gemini`] - Google Gemini implementation (GenerateContent API)
//! - [`retry`] - backoff policy, disabled unless configured
//! - [`wire`] - typed GenerateContent response
//!
//! # Configuration
//!
//! [`ApiConfig`] bundles the optional API key, model, endpoint, timeout and retry
//! policy. It is passed into every call rather than held by the client, so each
//! call site decides what configuration it runs with.
//!
//! # Error Handling
//!
//! Every failure to obtain a usable response is an [`UpstreamError`]. Whether the
//! text inside a successful response has the right shape is the caller's concern.

pub mod gemini;
pub mod retry;
pub mod wire;

pub use gua_types;
pub use reqwest;

use gua_types::{ApiKey, ModelName};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub use retry::RetryConfig;

/// Canonical Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Total time allowed for one generateContent round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

fn base_client_builder(https_only: bool) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(concat!("gua/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .https_only(https_only)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
}

/// Build a client whose total request time is capped at `timeout`.
pub fn http_client_with_timeout(
    timeout: Duration,
    https_only: bool,
) -> Result<reqwest::Client, reqwest::Error> {
    base_client_builder(https_only).timeout(timeout).build()
}

pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

// ============================================================================
// Errors
// ============================================================================

/// The upstream call could not produce a usable response.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("HTTP client could not be built: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Request failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Invalid response body: {0}")]
    Decode(String),
    /// The service answered but refused or aborted generation.
    #[error("{0}")]
    Blocked(String),
}

impl UpstreamError {
    #[must_use]
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Per-call upstream configuration.
///
/// ```rust
/// use gua_providers::{ApiConfig, RetryConfig};
/// use gua_types::{ApiKey, ModelName};
/// use std::time::Duration;
///
/// let config = ApiConfig::new(ApiKey::new("test"), ModelName::analysis_default())
///     .with_timeout(Duration::from_secs(30))
///     .with_retry(RetryConfig::default().with_max_retries(1));
/// assert!(config.https_only());
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    api_key: Option<ApiKey>,
    model: ModelName,
    base_url: String,
    timeout: Duration,
    retry: RetryConfig,
    thinking_enabled: bool,
}

impl ApiConfig {
    /// A missing key is allowed; the request goes out unauthenticated and the
    /// service's rejection surfaces as [`UpstreamError::Api`].
    #[must_use]
    pub fn new(api_key: Option<ApiKey>, model: ModelName) -> Self {
        Self {
            api_key,
            model,
            base_url: GEMINI_API_BASE_URL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryConfig::default(),
            thinking_enabled: false,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: ModelName) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn with_thinking_enabled(mut self, enabled: bool) -> Self {
        self.thinking_enabled = enabled;
        self
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    #[must_use]
    pub fn model(&self) -> &ModelName {
        &self.model
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    #[must_use]
    pub const fn thinking_enabled(&self) -> bool {
        self.thinking_enabled
    }

    /// Plain-HTTP endpoints (local mocks, proxies) are only allowed when the
    /// configured base URL is itself `http://`.
    #[must_use]
    pub fn https_only(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// ============================================================================
// Generation Seam
// ============================================================================

/// A single prompt, optionally constrained to a JSON schema.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// OpenAPI-subset schema; when set, the model must answer with JSON.
    pub response_schema: Option<Value>,
}

impl GenerationRequest {
    #[must_use]
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response_schema: None,
        }
    }

    #[must_use]
    pub fn structured(prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            prompt: prompt.into(),
            response_schema: Some(schema),
        }
    }
}

/// Token accounting reported by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A completed generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOutput {
    /// Concatenated answer text; `None` when the body carried no text at all.
    pub text: Option<String>,
    pub usage: Option<Usage>,
}

pub type GenerateFut<'a> =
    Pin<Box<dyn Future<Output = Result<GenerationOutput, UpstreamError>> + Send + 'a>>;

/// An external text-generation capability.
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &'static str;
    fn generate<'a>(&'a self, config: &'a ApiConfig, request: GenerationRequest)
    -> GenerateFut<'a>;
}
