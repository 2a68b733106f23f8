//! Divination failure taxonomy and user-facing classification.

use gua_providers::UpstreamError;
use gua_types::{GEMINI_API_KEY_ENV, HexagramError};
use thiserror::Error;

/// Every way a divination or follow-up can fail.
///
/// The first three are local input errors and never involve the network.
/// `EmptyQuestion` is also checked before any request is issued.
#[derive(Debug, Error)]
pub enum DivinationError {
    #[error("trigram id must be between 1 and 8 (got {0})")]
    InvalidTrigramId(u8),
    #[error("moving line must be between 1 and 6 (got {0})")]
    InvalidLineIndex(u8),
    #[error("no trigram has line pattern {0:?}")]
    UnknownTrigramPattern([u8; 3]),
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error("malformed analysis response: {0}")]
    MalformedAnalysisResponse(String),
    #[error("upstream service error: {0}")]
    UpstreamServiceError(#[from] UpstreamError),
}

impl From<HexagramError> for DivinationError {
    fn from(err: HexagramError) -> Self {
        match err {
            HexagramError::InvalidTrigramId(id) => Self::InvalidTrigramId(id),
            HexagramError::InvalidLineIndex(line) => Self::InvalidLineIndex(line),
            HexagramError::UnknownTrigramPattern(bits) => Self::UnknownTrigramPattern(bits),
        }
    }
}

impl DivinationError {
    /// Local validation failures that a retry with the same input cannot fix.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTrigramId(_) | Self::InvalidLineIndex(_) | Self::EmptyQuestion
        )
    }

    /// Whether the upstream rejection looks like a missing or bad credential.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        let Self::UpstreamServiceError(err) = self else {
            return false;
        };
        if err
            .status()
            .is_some_and(|status| matches!(status.as_u16(), 401 | 403))
        {
            return true;
        }
        match err {
            UpstreamError::Api { body, .. } => is_auth_error(body),
            UpstreamError::Blocked(message) => is_auth_error(message),
            _ => false,
        }
    }

    /// One-line remedy to print under the error, if there is an obvious one.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        if self.is_auth_failure() {
            let config = crate::config::config_path().map_or_else(
                || "~/.gua/config.toml".to_string(),
                |path| path.display().to_string(),
            );
            return Some(format!(
                "Set {GEMINI_API_KEY_ENV} or add [api_keys] google = \"...\" to {config}"
            ));
        }
        match self {
            Self::MalformedAnalysisResponse(_) => {
                Some("The model answered in an unexpected shape; ask again.".to_string())
            }
            Self::UpstreamServiceError(UpstreamError::Transport { .. }) => {
                Some("Check your network connection and try again.".to_string())
            }
            _ => None,
        }
    }
}

/// Heuristic match on the error text Gemini returns for credential problems.
#[must_use]
pub fn is_auth_error(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    let mentions_key = lower.contains("api key") || lower.contains("api_key");
    let auth_words = lower.contains("invalid")
        || lower.contains("not valid")
        || lower.contains("missing")
        || lower.contains("expired")
        || lower.contains("unauthenticated");

    lower.contains("api_key_invalid")
        || lower.contains("unregistered callers")
        || lower.contains("permission_denied")
        || (mentions_key && auth_words)
}
