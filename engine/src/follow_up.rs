//! Free-text follow-up questions about a completed reading.

use gua_providers::{ApiConfig, GenerationRequest, TextGenerator};
use gua_types::DivinationResult;

use crate::DivinationError;

/// Returned when the model answers with no text.
pub const FOLLOW_UP_FALLBACK: &str = "解析遇阻，请诚心再问。";

#[must_use]
pub fn build_follow_up_prompt(prior: &DivinationResult, question: &str) -> String {
    format!(
        "你是易学名家高岛吞象。先前你已为【{hexagram}】动第【{line}】爻作过解析，\
         现在问卜者就这一结果继续追问。\n\
         \n\
         原问：{original_question}\n\
         先前断语：{advice}\n\
         \n\
         追问：{question}\n\
         请紧扣此卦与先前断语，给出有针对性的回答。",
        hexagram = prior.original().name(),
        line = prior.moving_line(),
        original_question = prior.question(),
        advice = prior.analysis().overall_advice,
    )
}

/// Ask a follow-up question against an immutable prior reading.
///
/// An empty or absent answer is not an error; it yields [`FOLLOW_UP_FALLBACK`].
pub async fn ask_follow_up<G>(
    generator: &G,
    config: &ApiConfig,
    prior: &DivinationResult,
    question: &str,
) -> Result<String, DivinationError>
where
    G: TextGenerator + ?Sized,
{
    let request = GenerationRequest::text(build_follow_up_prompt(prior, question.trim()));
    tracing::debug!(
        generator = generator.name(),
        hexagram = prior.original().name(),
        "Requesting follow-up"
    );

    let output = generator.generate(config, request).await?;
    match output.text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => {
            tracing::warn!("Follow-up response was empty; using fallback");
            Ok(FOLLOW_UP_FALLBACK.to_string())
        }
    }
}
