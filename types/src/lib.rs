//! Core domain types for Gua.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies:
//! the trigram table, hexagram composition, the line-change transform, and the
//! records a completed reading is made of.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod divination;
mod hexagram;
mod sanitize;
mod trigram;

pub use divination::{Analysis, DivinationResult};
pub use hexagram::{Cast, Hexagram, MovingLine, apply_moving_line};
pub use sanitize::sanitize_terminal_text;
pub use trigram::{Line, Trigram, TrigramId};

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;

// ============================================================================
// Symbolic Errors
// ============================================================================

/// Failures of the pure hexagram computations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexagramError {
    #[error("trigram id must be between 1 and 8 (got {0})")]
    InvalidTrigramId(u8),
    #[error("moving line must be between 1 and 6 (got {0})")]
    InvalidLineIndex(u8),
    /// Unreachable while the trigram table stays a bijection.
    #[error("no trigram has line pattern {0:?}")]
    UnknownTrigramPattern([u8; 3]),
}

// ============================================================================
// NonEmpty String Types
// ============================================================================

/// A string guaranteed to be non-empty (after trimming).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, Error)]
#[error("text must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::ops::Deref for NonEmptyString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// ============================================================================
// Model Types
// ============================================================================

/// Environment variable consulted for the Gemini key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Fallback variable name kept for compatibility with older deployments.
pub const LEGACY_API_KEY_ENV: &str = "API_KEY";

/// Whether a model name is verified/known or user-supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ModelNameKind {
    Known,
    #[default]
    Unverified,
}

#[derive(Debug, Error)]
pub enum ModelParseError {
    #[error("model name cannot be empty")]
    Empty,
    #[error("Gemini model must start with gemini- (got {0})")]
    GeminiPrefix(String),
}

/// Gemini model name.
///
/// Unknown names are accepted but marked [`ModelNameKind::Unverified`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelName {
    #[serde(rename = "model")]
    name: Cow<'static, str>,
    #[serde(default)]
    kind: ModelNameKind,
}

impl ModelName {
    /// Model used for the structured reading.
    pub const ANALYSIS_DEFAULT: &'static str = "gemini-3-pro-preview";
    /// Lighter model used for free-text follow-ups.
    pub const FOLLOW_UP_DEFAULT: &'static str = "gemini-3-flash-preview";

    /// All models known to work with the structured schema.
    #[must_use]
    pub fn available_models() -> &'static [&'static str] {
        &[Self::ANALYSIS_DEFAULT, Self::FOLLOW_UP_DEFAULT]
    }

    pub fn parse(raw: &str) -> Result<Self, ModelParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ModelParseError::Empty);
        }

        if !trimmed.to_ascii_lowercase().starts_with("gemini-") {
            return Err(ModelParseError::GeminiPrefix(trimmed.to_string()));
        }

        if let Some(known) = Self::available_models()
            .iter()
            .find(|model| model.eq_ignore_ascii_case(trimmed))
        {
            return Ok(Self::known(*known));
        }

        Ok(Self {
            name: Cow::Owned(trimmed.to_string()),
            kind: ModelNameKind::Unverified,
        })
    }

    #[must_use]
    pub const fn known(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            kind: ModelNameKind::Known,
        }
    }

    #[must_use]
    pub const fn analysis_default() -> Self {
        Self::known(Self::ANALYSIS_DEFAULT)
    }

    #[must_use]
    pub const fn follow_up_default() -> Self {
        Self::known(Self::FOLLOW_UP_DEFAULT)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.name.as_ref()
    }

    #[must_use]
    pub const fn kind(&self) -> ModelNameKind {
        self.kind
    }
}

impl std::fmt::Display for ModelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.name.fmt(f)
    }
}

// ============================================================================
// API Key Types
// ============================================================================

/// Gemini API key.
///
/// Note: `Debug` is manually implemented to redact the key value, preventing accidental
/// credential disclosure in logs or error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}

impl ApiKey {
    /// Returns `None` for blank keys.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}
