//! Structured hexagram analysis.
//!
//! One request per reading: the prompt names the question, both hexagrams,
//! the two trigrams of the original with their natures, and the moving line.
//! The model is constrained to [`analysis_schema`] and its answer is parsed
//! into [`Analysis`] or rejected whole.

use gua_providers::{ApiConfig, GenerationRequest, TextGenerator};
use gua_types::{Analysis, Cast, DivinationResult, NonEmptyString};
use serde_json::{Value, json};

use crate::DivinationError;

/// Response schema in the OpenAPI subset Gemini accepts.
#[must_use]
pub fn analysis_schema() -> Value {
    let text = |description: &str| json!({ "type": "STRING", "description": description });

    json!({
        "type": "OBJECT",
        "properties": {
            "upperTrigramDetail": text("上卦所示外势、对方与未来趋势的解析"),
            "lowerTrigramDetail": text("下卦所示内因、自身与根基的解析"),
            "imagery": text("上下卦相合的大象、卦德与卦名由来"),
            "judgement": text("结合所问之事的彖辞精解与局势转折"),
            "lineInterpretation": text("动爻爻辞及其如何转化为变卦"),
            "overallAdvice": text("明确的吉凶断语、行动策略与时机"),
            "followUps": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "值得继续追问的方向"
            }
        },
        "required": Analysis::FIELDS,
    })
}

/// Render the analysis prompt for a cast.
#[must_use]
pub fn build_analysis_prompt(question: &str, cast: &Cast) -> String {
    let original = &cast.original;
    let upper = original.upper();
    let lower = original.lower();
    let line = cast.moving_line;
    let changed = cast.changed.name();

    format!(
        "你是易学名家高岛吞象，请依《高岛易断》的体例，为下面这一卦作详尽而务实的解析。\n\
         \n\
         问卜之事：{question}\n\
         本卦：{original_name}\n\
         上卦（外卦）：{upper_name}（{upper_nature}）\n\
         下卦（内卦）：{lower_name}（{lower_nature}）\n\
         动爻：第{line}爻\n\
         变卦：{changed}\n\
         \n\
         请依次给出：\n\
         1. 上卦详析：外势、对方、社会环境与未来走向。\n\
         2. 下卦详析：内因、自身、根基与当下心境，及其如何承载上卦。\n\
         3. 大象：上下卦相遇之象与卦德，卦名的由来。\n\
         4. 彖辞：紧扣所问之事，指出局势的转折所在。\n\
         5. 动爻：第{line}爻爻辞的要义，以及它如何使本卦转为{changed}。\n\
         6. 断语：明确的吉凶判断、具体的行动策略与时机，不作模棱两可之言。\n\
         7. 追问：三个值得问卜者继续思考的方向。\n\
         \n\
         以JSON格式作答。",
        original_name = original.name(),
        upper_name = upper.name,
        upper_nature = upper.nature,
        lower_name = lower.name,
        lower_nature = lower.nature,
    )
}

/// Parse model output into an [`Analysis`], rejecting any shape mismatch.
pub fn parse_analysis(text: &str) -> Result<Analysis, DivinationError> {
    serde_json::from_str(text.trim()).map_err(|err| {
        tracing::warn!(error = %err, "Analysis response did not match schema");
        DivinationError::MalformedAnalysisResponse(err.to_string())
    })
}

fn validate_question(question: &str) -> Result<NonEmptyString, DivinationError> {
    NonEmptyString::new(question.trim()).map_err(|_| DivinationError::EmptyQuestion)
}

/// `question` is embedded verbatim; callers validate it first.
async fn analyze<G>(
    generator: &G,
    config: &ApiConfig,
    question: &str,
    cast: &Cast,
) -> Result<Analysis, DivinationError>
where
    G: TextGenerator + ?Sized,
{
    let request =
        GenerationRequest::structured(build_analysis_prompt(question, cast), analysis_schema());

    tracing::debug!(
        generator = generator.name(),
        original = cast.original.name(),
        changed = cast.changed.name(),
        moving_line = cast.moving_line.get(),
        "Requesting analysis"
    );

    let output = generator.generate(config, request).await?;
    let Some(text) = output.text else {
        return Err(DivinationError::MalformedAnalysisResponse(
            "response carried no text".to_string(),
        ));
    };
    parse_analysis(&text)
}

/// Ask the upstream model to interpret `cast`.
///
/// A blank question fails with [`DivinationError::EmptyQuestion`] before the
/// generator is called.
pub async fn request_analysis<G>(
    generator: &G,
    config: &ApiConfig,
    question: &str,
    cast: &Cast,
) -> Result<Analysis, DivinationError>
where
    G: TextGenerator + ?Sized,
{
    validate_question(question)?;
    analyze(generator, config, question, cast).await
}

/// Derive the cast and interpret it in one step.
///
/// All input is validated before any upstream call. The prompt carries the
/// question as typed; the result stores it trimmed. The result is only built
/// once a complete analysis has been parsed.
pub async fn divine<G>(
    generator: &G,
    config: &ApiConfig,
    question: &str,
    upper: u8,
    lower: u8,
    line: u8,
) -> Result<DivinationResult, DivinationError>
where
    G: TextGenerator + ?Sized,
{
    let cast = Cast::new(upper, lower, line)?;
    let stored = validate_question(question)?;
    let analysis = analyze(generator, config, question, &cast).await?;
    Ok(DivinationResult::new(stored, cast, analysis))
}
