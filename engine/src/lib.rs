//! Divination orchestration for Gua.
//!
//! The pure symbolic work lives in `gua-types`; this crate adds the two
//! upstream round trips (the structured analysis and free-text follow-ups)
//! and the configuration that shapes them.
//!
//! Nothing here holds process-wide state. Every call takes the
//! [`TextGenerator`] and the [`ApiConfig`] it should run with.

mod analysis;
mod config;
mod errors;
mod follow_up;

#[cfg(test)]
mod test_support;

pub use analysis::{
    analysis_schema, build_analysis_prompt, divine, parse_analysis, request_analysis,
};
pub use config::{
    AppConfig, ClientSettings, ConfigError, GoogleConfig, GuaConfig, config_path,
    expand_env_vars, resolve_api_key,
};
pub use errors::{DivinationError, is_auth_error};
pub use follow_up::{FOLLOW_UP_FALLBACK, ask_follow_up, build_follow_up_prompt};

pub use gua_providers::{
    self, ApiConfig, GenerationOutput, GenerationRequest, TextGenerator, UpstreamError,
    gemini::GeminiClient,
};
pub use gua_types::{
    Analysis, ApiKey, Cast, DivinationResult, Hexagram, HexagramError, Line, ModelName,
    MovingLine, NonEmptyString, Trigram, TrigramId, apply_moving_line, sanitize_terminal_text,
};
