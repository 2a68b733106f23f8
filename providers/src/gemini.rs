//! Google Gemini GenerateContent client.
//!
//! Communicates with `{base_url}/models/{model}:generateContent` in a single
//! non-streaming round trip.
//!
//! # Structured output
//!
//! When the request carries a schema, `generationConfig` gets
//! `responseMimeType: "application/json"` and `responseSchema`, which makes the
//! model answer with a JSON document of that shape in its text part.
//!
//! # Casing
//!
//! The GenerateContent body mixes conventions: `contents` is lowercase and
//! `generationConfig` with its children is camelCase.

use crate::{
    ApiConfig, GenerateFut, GenerationOutput, GenerationRequest, TextGenerator, UpstreamError,
    Usage, http_client_with_timeout, read_capped_error_body,
    retry::{RetryOutcome, send_with_retry},
    wire,
};
use serde_json::{Value, json};

/// Stateless Gemini client; all settings arrive per call in [`ApiConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiClient;

impl TextGenerator for GeminiClient {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn generate<'a>(
        &'a self,
        config: &'a ApiConfig,
        request: GenerationRequest,
    ) -> GenerateFut<'a> {
        Box::pin(async move { generate_content(config, &request).await })
    }
}

/// Build the request body for the GenerateContent API.
fn build_request_body(request: &GenerationRequest, thinking_enabled: bool) -> Value {
    let mut gen_config = serde_json::Map::new();
    gen_config.insert("temperature".into(), json!(1.0));

    if let Some(schema) = &request.response_schema {
        gen_config.insert("responseMimeType".into(), json!("application/json"));
        gen_config.insert("responseSchema".into(), schema.clone());
    }

    if thinking_enabled {
        gen_config.insert(
            "thinkingConfig".into(),
            json!({
                "thinkingLevel": "high"
            }),
        );
    }

    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt }]
        }],
        "generationConfig": Value::Object(gen_config)
    })
}

/// Reduce a decoded response to its answer text, or the reason there is none.
fn parse_response(response: wire::Response) -> Result<GenerationOutput, UpstreamError> {
    if let Some(error) = response.error {
        tracing::warn!(code = ?error.code, "Gemini returned an error object");
        return Err(UpstreamError::Blocked(error.message_or_default().to_string()));
    }

    let usage = response.usage_metadata.map(|usage| Usage {
        input_tokens: usage.prompt_token_count,
        output_tokens: usage.candidates_token_count,
    });

    let Some(candidate) = response.candidates.and_then(|c| c.into_iter().next()) else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(UpstreamError::Blocked(format!("Prompt blocked: {reason}")));
        }
        return Ok(GenerationOutput { text: None, usage });
    };

    if let Some(message) = candidate
        .finish_reason
        .as_deref()
        .map(wire::FinishReason::parse)
        .and_then(wire::FinishReason::error_message)
    {
        return Err(UpstreamError::Blocked(message.to_string()));
    }

    let text = candidate
        .content
        .and_then(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text)
        .reduce(|mut acc, next| {
            acc.push_str(&next);
            acc
        });

    Ok(GenerationOutput { text, usage })
}

/// Send one GenerateContent request.
pub async fn generate_content(
    config: &ApiConfig,
    request: &GenerationRequest,
) -> Result<GenerationOutput, UpstreamError> {
    let client = http_client_with_timeout(config.timeout(), config.https_only())
        .map_err(UpstreamError::Client)?;
    let model = config.model().as_str();
    let url = format!("{}/models/{model}:generateContent", config.base_url());
    let body = build_request_body(request, config.thinking_enabled());

    if config.api_key().is_none() {
        tracing::warn!("No Gemini API key configured; sending unauthenticated request");
    }
    tracing::debug!(
        %model,
        structured = request.response_schema.is_some(),
        prompt_chars = request.prompt.chars().count(),
        "Sending Gemini request"
    );

    let outcome = send_with_retry(
        || {
            let builder = client
                .post(&url)
                .header("content-type", "application/json")
                .json(&body);
            match config.api_key() {
                Some(key) => builder.header("x-goog-api-key", key.expose_secret()),
                None => builder,
            }
        },
        config.retry(),
    )
    .await;

    let response = match outcome {
        RetryOutcome::Success(response) => response,
        RetryOutcome::HttpError(response) => {
            let status = response.status();
            let body = read_capped_error_body(response).await;
            tracing::warn!(%status, %model, "Gemini request rejected");
            return Err(UpstreamError::Api { status, body });
        }
        RetryOutcome::ConnectionError { attempts, source } => {
            tracing::warn!(error = %source, attempts, %model, "Gemini request failed");
            return Err(UpstreamError::Transport { attempts, source });
        }
    };

    let payload: wire::Response = response
        .json()
        .await
        .map_err(|e| UpstreamError::Decode(e.to_string()))?;
    let output = parse_response(payload)?;

    if let Some(usage) = output.usage {
        tracing::info!(
            %model,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Gemini generation complete"
        );
    }

    Ok(output)
}
