//! End-to-end readings against a mock Gemini endpoint

use gua_engine::{
    ApiConfig, DivinationError, GeminiClient, ModelName, UpstreamError, analysis_schema, divine,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{
    ANALYSIS_PATH, analysis_config, analysis_payload, candidate_body, mount_analysis, mount_error,
    received_prompt, start_gemini_mock,
};

#[tokio::test]
async fn reading_round_trip() {
    let server = start_gemini_mock().await;
    Mock::given(method("POST"))
        .and(path(ANALYSIS_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": analysis_schema()
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(candidate_body(&analysis_payload().to_string())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = divine(
        &GeminiClient,
        &analysis_config(&server),
        "今年换工作是否合适？",
        1,
        8,
        1,
    )
    .await
    .unwrap();

    assert_eq!(result.question(), "今年换工作是否合适？");
    assert_eq!(result.original().name(), "天地否");
    assert_eq!(result.changed().name(), "天雷无妄");
    assert_eq!(result.analysis().follow_ups.len(), 3);
    assert_eq!(result.analysis().overall_advice, "当下闭塞，守正待时，秋后可图。");

    let prompt = received_prompt(&server, 0).await;
    for needle in ["今年换工作是否合适？", "天地否", "天雷无妄", "乾", "坤", "第1爻"] {
        assert!(prompt.contains(needle), "prompt missing {needle}");
    }
}

#[tokio::test]
async fn reading_serializes_with_wire_field_names() {
    let server = start_gemini_mock().await;
    mount_analysis(&server, &analysis_payload()).await;

    let result = divine(&GeminiClient, &analysis_config(&server), "问", 3, 6, 6)
        .await
        .unwrap();
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["question"], "问");
    assert_eq!(value["movingLine"], 6);
    assert_eq!(value["analysis"], analysis_payload());
    assert_eq!(value["original"]["name"], "火水未济");
}

#[tokio::test]
async fn missing_follow_ups_is_malformed() {
    let server = start_gemini_mock().await;
    let mut payload = analysis_payload();
    payload.as_object_mut().unwrap().remove("followUps");
    mount_analysis(&server, &payload).await;

    let err = divine(&GeminiClient, &analysis_config(&server), "问", 1, 8, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, DivinationError::MalformedAnalysisResponse(_)));
}

#[tokio::test]
async fn null_field_is_malformed() {
    let server = start_gemini_mock().await;
    let mut payload = analysis_payload();
    payload["imagery"] = Value::Null;
    mount_analysis(&server, &payload).await;

    let err = divine(&GeminiClient, &analysis_config(&server), "问", 1, 8, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, DivinationError::MalformedAnalysisResponse(_)));
}

#[tokio::test]
async fn empty_follow_up_list_is_accepted() {
    let server = start_gemini_mock().await;
    let mut payload = analysis_payload();
    payload["followUps"] = json!([]);
    mount_analysis(&server, &payload).await;

    let result = divine(&GeminiClient, &analysis_config(&server), "问", 1, 8, 1)
        .await
        .unwrap();
    assert!(result.analysis().follow_ups.is_empty());
}

#[tokio::test]
async fn blank_question_makes_no_request() {
    let server = start_gemini_mock().await;
    mount_analysis(&server, &analysis_payload()).await;

    let err = divine(&GeminiClient, &analysis_config(&server), " \t ", 1, 8, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, DivinationError::EmptyQuestion));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn unauthenticated_request_surfaces_upstream_error() {
    let server = start_gemini_mock().await;
    mount_error(&server, 403, "Method doesn't allow unregistered callers").await;

    let config = ApiConfig::new(None, ModelName::analysis_default()).with_base_url(server.uri());
    let err = divine(&GeminiClient, &config, "问", 1, 8, 1)
        .await
        .unwrap_err();

    assert!(err.is_auth_failure());
    assert!(err.to_string().contains("unregistered callers"));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("x-goog-api-key"));
}

#[tokio::test]
async fn server_error_is_not_retried_by_default() {
    let server = start_gemini_mock().await;
    mount_error(&server, 503, "The model is overloaded.").await;

    let err = divine(&GeminiClient, &analysis_config(&server), "问", 1, 8, 1)
        .await
        .unwrap_err();

    match err {
        DivinationError::UpstreamServiceError(UpstreamError::Api { status, .. }) => {
            assert_eq!(status.as_u16(), 503);
        }
        other => panic!("expected upstream API error, got {other:?}"),
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn safety_block_surfaces_upstream_error() {
    let server = start_gemini_mock().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        })))
        .mount(&server)
        .await;

    let err = divine(&GeminiClient, &analysis_config(&server), "问", 1, 8, 1)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DivinationError::UpstreamServiceError(UpstreamError::Blocked(_))
    ));
}
