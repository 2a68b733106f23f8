//! Shared test utilities and fixtures
//!
//! Mock Gemini endpoints and canned readings.

#![allow(dead_code)]

use gua_engine::{ApiConfig, ApiKey, ModelName};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ANALYSIS_PATH: &str = "/models/gemini-3-pro-preview:generateContent";
pub const FOLLOW_UP_PATH: &str = "/models/gemini-3-flash-preview:generateContent";

/// Start a mock server that stands in for the Gemini API
pub async fn start_gemini_mock() -> MockServer {
    MockServer::start().await
}

pub fn analysis_config(server: &MockServer) -> ApiConfig {
    ApiConfig::new(ApiKey::new("test-key"), ModelName::analysis_default())
        .with_base_url(server.uri())
}

pub fn follow_up_config(server: &MockServer) -> ApiConfig {
    ApiConfig::new(ApiKey::new("test-key"), ModelName::follow_up_default())
        .with_base_url(server.uri())
}

/// A complete analysis payload as the model would emit it.
pub fn analysis_payload() -> Value {
    json!({
        "upperTrigramDetail": "乾居外卦，外势刚健，对方强盛。",
        "lowerTrigramDetail": "坤居内卦，自身柔顺，宜守不宜争。",
        "imagery": "天在上而地在下，二气不交，是为否。",
        "judgement": "否之匪人，不利君子贞，大往小来。",
        "lineInterpretation": "初六动，拔茅茹以其汇，贞吉亨；变为天雷无妄。",
        "overallAdvice": "当下闭塞，守正待时，秋后可图。",
        "followUps": ["何时可以转机？", "应当联合何人？", "此事宜守宜进？"]
    })
}

/// Wrap `text` in a GenerateContent response body.
pub fn candidate_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 300, "candidatesTokenCount": 900}
    })
}

/// Mount a structured analysis response
pub async fn mount_analysis(server: &MockServer, payload: &Value) {
    Mock::given(method("POST"))
        .and(path(ANALYSIS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(&payload.to_string())))
        .mount(server)
        .await;
}

/// Mount a free-text follow-up response
pub async fn mount_follow_up(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path(FOLLOW_UP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount an error status with a Gemini-style error body on any path
pub async fn mount_error(server: &MockServer, status: u16, message: &str) {
    let body = json!({"error": {"code": status, "message": message}});
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Prompt text of the `index`th request the server received.
pub async fn received_prompt(server: &MockServer, index: usize) -> String {
    let requests = server.received_requests().await.unwrap_or_default();
    let body: Value = requests[index].body_json().unwrap();
    body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}
