/*!
 * Integration tests for the vendor clients against local fake servers
 */

use axum::{
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use mindmosaic::analysis::{EmotionDetector, ResponseGenerator, RiskLevel, Sentiment};
use mindmosaic::app_config::{EmotionProviderConfig, GenerationProviderConfig};
use mindmosaic::errors::ProviderError;
use mindmosaic::providers::replicate::Replicate;
use mindmosaic::providers::together::Together;
use mindmosaic::providers::{EmotionClassifier, Provider, TextGenerator};

use crate::common::spawn_fake_vendor;

const SENTIMENT_VERSION: &str = "sentiment-v1";

fn has_token(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer test-token")
}

async fn fake_prediction(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if !has_token(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Invalid token" })));
    }

    let output = if body["version"] == SENTIMENT_VERSION {
        json!({ "score": -0.65 })
    } else {
        assert_eq!(body["input"]["return_probabilities"], json!(true));
        json!([
            { "label": "sadness", "score": 0.35 },
            { "label": "anxiety", "score": 0.82 },
        ])
    };

    (StatusCode::CREATED, Json(json!({ "id": "p1", "status": "succeeded", "output": output })))
}

fn replicate_config(endpoint: &str, token: &str) -> EmotionProviderConfig {
    EmotionProviderConfig {
        api_token: token.to_string(),
        endpoint: endpoint.to_string(),
        sentiment_model: format!("owner/sentiment:{}", SENTIMENT_VERSION),
        emotion_model: "owner/emotion:emotion-v1".to_string(),
        timeout_secs: 5,
    }
}

fn together_config(endpoint: &str) -> GenerationProviderConfig {
    GenerationProviderConfig {
        api_key: "test-token".to_string(),
        endpoint: format!("{}/v1", endpoint),
        ..Default::default()
    }
}

async fn replicate_server() -> String {
    spawn_fake_vendor(
        Router::new()
            .route("/v1/predictions", post(fake_prediction))
            .route("/v1/account", get(|| async { Json(json!({ "username": "mosaic" })) })),
    )
    .await
}

#[tokio::test]
async fn test_replicate_classify_shouldReturnModelOutputs() {
    let endpoint = replicate_server().await;
    let client = Replicate::new(&replicate_config(&endpoint, "test-token"));

    let sentiment = client.classify_sentiment("I can't focus on anything").await.unwrap();
    let emotions = client.classify_emotions("I can't focus on anything").await.unwrap();

    assert_eq!(sentiment["score"], json!(-0.65));
    assert_eq!(emotions.as_array().unwrap().len(), 2);
    assert!(client.test_connection().await.is_ok());
}

#[tokio::test]
async fn test_replicate_withWrongToken_shouldBeAuthenticationError() {
    let endpoint = replicate_server().await;
    let client = Replicate::new(&replicate_config(&endpoint, "wrong"));

    let result = client.classify_sentiment("hello there").await;

    assert!(matches!(result, Err(ProviderError::AuthenticationError(_))));
}

#[tokio::test]
async fn test_replicate_withFailedPrediction_shouldBeApiError() {
    let endpoint = spawn_fake_vendor(Router::new().route(
        "/v1/predictions",
        post(|| async { Json(json!({ "status": "failed", "error": "model crashed" })) }),
    ))
    .await;
    let client = Replicate::new(&replicate_config(&endpoint, "test-token"));

    let result = client.classify_emotions("hello there").await;

    assert!(matches!(result, Err(ProviderError::ApiError { .. })));
}

#[tokio::test]
async fn test_emotionDetector_withReplicate_shouldRankAndAssess() {
    let endpoint = replicate_server().await;
    let detector = EmotionDetector::new(Arc::new(Replicate::new(&replicate_config(&endpoint, "test-token"))));

    let analysis = detector.detect("Everything about this semester feels heavy").await;

    assert_eq!(analysis.primary_emotion, "anxiety");
    assert_eq!(analysis.emotions[0].intensity, 1.0);
    assert_eq!(analysis.sentiment, Sentiment::Negative);
    assert_eq!(analysis.emotional_state, "highly anxious");
    assert_ne!(analysis.risk_level, RiskLevel::Low);
}

#[tokio::test]
async fn test_emotionDetector_withUnreachableVendor_shouldUseKeywords() {
    // Nothing listens on the discard port
    let detector = EmotionDetector::new(Arc::new(Replicate::new(&replicate_config(
        "http://127.0.0.1:9",
        "test-token",
    ))));

    let analysis = detector.detect("I am so worried and anxious about exams").await;

    assert_eq!(analysis.primary_emotion, "anxiety");
}

#[tokio::test]
async fn test_together_generate_shouldSendChatRequest() {
    let endpoint = spawn_fake_vendor(Router::new().route(
        "/v1/chat/completions",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert!(has_token(&headers));
            assert_eq!(body["messages"][0]["role"], json!("system"));
            assert_eq!(body["messages"][1]["role"], json!("user"));
            Json(json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "It sounds like a lot right now.\n- Take a short walk\n2. Write down one small task" },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 120, "completion_tokens": 30 }
            }))
        }),
    ))
    .await;
    let client = Together::new(&together_config(&endpoint));

    let text = client.generate("system prompt", "user prompt").await.unwrap();
    assert!(text.starts_with("It sounds like"));

    let responder = ResponseGenerator::new(Arc::new(client));
    let reply = responder.respond("Deadlines keep piling up this week", &[]).await;

    assert_eq!(reply.response, "It sounds like a lot right now.");
    assert_eq!(reply.suggestions, vec!["Take a short walk", "Write down one small task"]);
}

#[tokio::test]
async fn test_together_withRateLimit_shouldFallBack() {
    let endpoint = spawn_fake_vendor(Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
    ))
    .await;
    let client = Together::new(&together_config(&endpoint));

    let error = client.generate("system", "user").await.unwrap_err();
    assert!(matches!(error, ProviderError::RateLimitExceeded(_)));

    let reply = ResponseGenerator::new(Arc::new(client))
        .respond("Deadlines keep piling up this week", &[])
        .await;
    assert_eq!(reply.confidence, 0.5);
}
