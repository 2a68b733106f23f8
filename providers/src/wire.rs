//! Typed GenerateContent response.
//!
//! Only the fields the client reads are modelled; everything else is ignored.

use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub candidates: Option<Vec<Candidate>>,
    pub error: Option<ErrorInfo>,
    pub usage_metadata: Option<UsageMetadata>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Content {
    pub parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    pub text: Option<String>,
    /// Thinking summary rather than answer text.
    #[serde(default)]
    pub thought: bool,
}

/// Present when the prompt itself was rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorInfo {
    pub message: Option<String>,
    pub code: Option<i32>,
}

impl ErrorInfo {
    #[must_use]
    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or("Unknown error")
    }
}

/// Known Gemini finish reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Language,
    Blocklist,
    ProhibitedContent,
    Spii,
    Other,
    Unknown,
}

impl FinishReason {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "STOP" => Self::Stop,
            "MAX_TOKENS" => Self::MaxTokens,
            "SAFETY" => Self::Safety,
            "RECITATION" => Self::Recitation,
            "LANGUAGE" => Self::Language,
            "BLOCKLIST" => Self::Blocklist,
            "PROHIBITED_CONTENT" => Self::ProhibitedContent,
            "SPII" => Self::Spii,
            "OTHER" => Self::Other,
            _ => Self::Unknown,
        }
    }

    /// Error message if generation was aborted, `None` otherwise.
    #[must_use]
    pub fn error_message(self) -> Option<&'static str> {
        match self {
            Self::Stop | Self::MaxTokens | Self::Unknown => None,
            Self::Safety => Some("Content filtered by safety settings"),
            Self::Recitation => Some("Response blocked: recitation"),
            Self::Language => Some("Unsupported language"),
            Self::Blocklist => Some("Content contains blocked terms"),
            Self::ProhibitedContent => Some("Prohibited content detected"),
            Self::Spii => Some("Sensitive PII detected"),
            Self::Other => Some("Generation stopped: unknown reason"),
        }
    }
}
