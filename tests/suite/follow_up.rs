//! Follow-up questions against a completed reading

use gua_engine::{DivinationError, FOLLOW_UP_FALLBACK, GeminiClient, ask_follow_up, divine};
use serde_json::json;

use crate::common::{
    analysis_config, analysis_payload, candidate_body, follow_up_config, mount_analysis,
    mount_error, mount_follow_up, received_prompt, start_gemini_mock,
};

#[tokio::test]
async fn follow_up_uses_prior_reading() {
    let server = start_gemini_mock().await;
    mount_analysis(&server, &analysis_payload()).await;
    mount_follow_up(&server, candidate_body("立秋之后，时机渐开。")).await;

    let prior = divine(&GeminiClient, &analysis_config(&server), "换工作？", 1, 8, 1)
        .await
        .unwrap();
    let answer = ask_follow_up(&GeminiClient, &follow_up_config(&server), &prior, "何时可以转机？")
        .await
        .unwrap();

    assert_eq!(answer, "立秋之后，时机渐开。");
    let prompt = received_prompt(&server, 1).await;
    for needle in ["天地否", "1", "换工作？", "当下闭塞，守正待时，秋后可图。", "何时可以转机？"] {
        assert!(prompt.contains(needle), "prompt missing {needle}");
    }
}

#[tokio::test]
async fn empty_follow_up_body_returns_fallback() {
    let server = start_gemini_mock().await;
    mount_analysis(&server, &analysis_payload()).await;
    mount_follow_up(&server, json!({"candidates": [{"content": {"parts": []}}]})).await;

    let prior = divine(&GeminiClient, &analysis_config(&server), "问", 1, 8, 1)
        .await
        .unwrap();
    let answer = ask_follow_up(&GeminiClient, &follow_up_config(&server), &prior, "再问")
        .await
        .unwrap();
    assert_eq!(answer, FOLLOW_UP_FALLBACK);
}

#[tokio::test]
async fn concurrent_follow_ups_share_the_reading() {
    let server = start_gemini_mock().await;
    mount_analysis(&server, &analysis_payload()).await;
    mount_follow_up(&server, candidate_body("答")).await;

    let prior = divine(&GeminiClient, &analysis_config(&server), "问", 1, 8, 1)
        .await
        .unwrap();
    let config = follow_up_config(&server);
    let (first, second) = tokio::join!(
        ask_follow_up(&GeminiClient, &config, &prior, "其一"),
        ask_follow_up(&GeminiClient, &config, &prior, "其二"),
    );
    assert_eq!(first.unwrap(), "答");
    assert_eq!(second.unwrap(), "答");
    assert_eq!(prior.original().name(), "天地否");
}

#[tokio::test]
async fn failed_follow_up_leaves_reading_usable() {
    let server = start_gemini_mock().await;
    mount_analysis(&server, &analysis_payload()).await;

    let prior = divine(&GeminiClient, &analysis_config(&server), "问", 1, 8, 1)
        .await
        .unwrap();

    server.reset().await;
    mount_error(&server, 500, "internal").await;

    let err = ask_follow_up(&GeminiClient, &follow_up_config(&server), &prior, "再问")
        .await
        .unwrap_err();
    assert!(matches!(err, DivinationError::UpstreamServiceError(_)));
    assert!(prior.report().contains("天雷无妄"));
}
