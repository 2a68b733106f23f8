//! Optional `~/.gua/config.toml` and per-call client settings.
//!
//! ```toml
//! [app]
//! analysis_model = "gemini-3-pro-preview"
//! follow_up_model = "gemini-3-flash-preview"
//!
//! [api_keys]
//! google = "${GEMINI_API_KEY}"
//!
//! [google]
//! base_url = "https://generativelanguage.googleapis.com/v1beta"
//! timeout_secs = 120
//! max_retries = 0
//! thinking_enabled = false
//! ```

use gua_providers::{ApiConfig, DEFAULT_REQUEST_TIMEOUT, GEMINI_API_BASE_URL, RetryConfig};
use gua_types::{ApiKey, GEMINI_API_KEY_ENV, LEGACY_API_KEY_ENV, ModelName, ModelNameKind};
use serde::Deserialize;
use std::{env, fs, path::Path, path::PathBuf, time::Duration};
use thiserror::Error;

#[derive(Debug, Default, Deserialize)]
pub struct GuaConfig {
    pub app: Option<AppConfig>,
    pub api_keys: Option<ApiKeys>,
    pub google: Option<GoogleConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Model for the structured reading.
    pub analysis_model: Option<String>,
    /// Model for free-text follow-ups.
    pub follow_up_model: Option<String>,
}

#[derive(Default, Deserialize)]
pub struct ApiKeys {
    pub google: Option<String>,
}

// Keys must never reach the log file.
impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let google = if self.google.is_some() {
            "[REDACTED]"
        } else {
            "None"
        };
        f.debug_struct("ApiKeys").field("google", &google).finish()
    }
}

/// Gemini endpoint and request policy.
#[derive(Debug, Default, Deserialize)]
pub struct GoogleConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Automatic retries on transient failures. Default: 0.
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub thinking_enabled: bool,
}

/// Replace `${VAR}` with the variable's value; unset variables become empty.
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + 2 + len];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &rest[start + 2 + len + 1..];
    }

    out.push_str(rest);
    out
}

impl GuaConfig {
    /// Load from the default path. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {:?}: {}", path, source);
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map(Some).map_err(|source| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, source);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    fn google_key(&self) -> Option<String> {
        self.api_keys
            .as_ref()
            .and_then(|keys| keys.google.as_deref())
            .map(expand_env_vars)
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".gua").join("config.toml"))
}

/// Pick the first non-blank key: config file, `GEMINI_API_KEY`, then `API_KEY`.
pub fn resolve_api_key(
    configured: Option<&ApiKey>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<ApiKey> {
    configured
        .cloned()
        .or_else(|| lookup(GEMINI_API_KEY_ENV).and_then(ApiKey::new))
        .or_else(|| lookup(LEGACY_API_KEY_ENV).and_then(ApiKey::new))
}

/// Settings every upstream call is built from.
///
/// Only the config-file key is held here. Environment keys are read each time
/// [`Self::analysis_config`] or [`Self::follow_up_config`] builds an
/// [`ApiConfig`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    configured_key: Option<ApiKey>,
    analysis_model: ModelName,
    follow_up_model: ModelName,
    base_url: String,
    timeout: Duration,
    retry: RetryConfig,
    thinking_enabled: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::resolve(None)
    }
}

impl ClientSettings {
    #[must_use]
    pub fn resolve(config: Option<&GuaConfig>) -> Self {
        let app = config.and_then(|c| c.app.as_ref());
        let google = config.and_then(|c| c.google.as_ref());

        let analysis_model = parse_model(
            app.and_then(|a| a.analysis_model.as_deref()),
            ModelName::analysis_default(),
        );
        let follow_up_model = parse_model(
            app.and_then(|a| a.follow_up_model.as_deref()),
            ModelName::follow_up_default(),
        );

        let base_url = google
            .and_then(|g| g.base_url.as_deref())
            .map(expand_env_vars)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| GEMINI_API_BASE_URL.to_string());

        let timeout = google
            .and_then(|g| g.timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let retry = RetryConfig::default()
            .with_max_retries(google.and_then(|g| g.max_retries).unwrap_or(0));

        Self {
            configured_key: config.and_then(GuaConfig::google_key).and_then(ApiKey::new),
            analysis_model,
            follow_up_model,
            base_url,
            timeout,
            retry,
            thinking_enabled: google.is_some_and(|g| g.thinking_enabled),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn analysis_model(&self) -> &ModelName {
        &self.analysis_model
    }

    #[must_use]
    pub fn follow_up_model(&self) -> &ModelName {
        &self.follow_up_model
    }

    #[must_use]
    pub fn analysis_config(&self) -> ApiConfig {
        self.api_config(self.analysis_model.clone())
    }

    #[must_use]
    pub fn follow_up_config(&self) -> ApiConfig {
        self.api_config(self.follow_up_model.clone())
    }

    fn api_config(&self, model: ModelName) -> ApiConfig {
        let key = resolve_api_key(self.configured_key.as_ref(), |name| env::var(name).ok());
        ApiConfig::new(key, model)
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout)
            .with_retry(self.retry.clone())
            .with_thinking_enabled(self.thinking_enabled)
    }
}

fn parse_model(raw: Option<&str>, default: ModelName) -> ModelName {
    let Some(raw) = raw else {
        return default;
    };
    match ModelName::parse(raw) {
        Ok(model) => {
            if model.kind() == ModelNameKind::Unverified {
                tracing::warn!(
                    "Configured model {model} is not one of {:?}; structured output may fail",
                    ModelName::available_models()
                );
            }
            model
        }
        Err(err) => {
            tracing::warn!("Ignoring configured model {raw:?}: {err}; using {default}");
            default
        }
    }
}
