/*!
 * Route tests for the journal, session and feedback API
 */

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;

use mindmosaic::journal_service::{ANALYZE_FAILED, CONTENT_REQUIRED, FORM_CONTENT_TOO_SHORT, FORM_GENERIC_ERROR};
use mindmosaic::server::error::INVALID_BODY;

use crate::common::{body_json, get, offline_app, post_json, scripted_app, send};

const ENTRY: &str = "I feel anxious and worried about my exams next week";

#[tokio::test]
async fn test_analyze_withNewEntry_shouldReturnSessionHeader() {
    let (app, repo) = offline_app();

    let response = send(&app, post_json("/api/analyze", &json!({ "content": ENTRY }))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let session_id = response.headers()["x-session-id"].to_str().unwrap().to_string();
    assert!(session_id.starts_with("session_"));

    let body = body_json(response).await;
    assert_ne!(body["id"], json!("fallback"));
    assert_eq!(body["emotions"][0]["emotion"], json!("anxiety"));
    assert!(body.get("trends").is_none());
    assert!(body["suggestions"].as_array().unwrap().len() <= 5);

    let stored = repo.get_session_entries(&session_id).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_analyze_withFollowUp_shouldIncludeTrends() {
    let (app, _repo) = offline_app();
    let first = send(&app, post_json("/api/analyze", &json!({ "content": ENTRY }))).await;
    let session_id = first.headers()["x-session-id"].to_str().unwrap().to_string();

    let response = send(
        &app,
        post_json(
            "/api/analyze",
            &json!({ "content": "Talked to a friend and feel a bit happy now", "sessionId": session_id }),
        ),
    )
    .await;

    assert_eq!(response.headers()["x-session-id"], session_id.as_str());
    let body = body_json(response).await;
    assert_eq!(body["trends"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_analyze_withScriptedVendors_shouldMergeSuggestions() {
    let (app, _repo) = scripted_app("You are carrying a lot this week.\n- Break revision into short blocks");

    let response = send(&app, post_json("/api/analyze", &json!({ "content": ENTRY }))).await;
    let body = body_json(response).await;

    assert_eq!(body["aiResponse"], json!("You are carrying a lot this week."));
    assert_eq!(body["suggestions"][0], json!("Break revision into short blocks"));
    assert_eq!(body["sentiment"], json!("negative"));
    assert_eq!(body["riskLevel"], json!("medium"));
}

#[tokio::test]
async fn test_analyze_withBlankContent_shouldBeBadRequest() {
    let (app, _repo) = offline_app();

    let response = send(&app, post_json("/api/analyze", &json!({ "content": "   " }))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], json!("Journal content is required"));
}

#[tokio::test]
async fn test_analyze_withTooLongContent_shouldBeBadRequest() {
    let (app, _repo) = offline_app();

    let response = send(&app, post_json("/api/analyze", &json!({ "content": "a".repeat(5001) }))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_withMalformedBody_shouldAnswerWithFallback() {
    let (app, _repo) = offline_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ broken"))
        .unwrap();

    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!(ANALYZE_FAILED));
    assert_eq!(body["fallback"]["id"], json!("fallback"));
    assert_eq!(body["fallback"]["confidence"], json!(0.5));
}

#[tokio::test]
async fn test_analyze_withNonStringContent_shouldBeBadRequest() {
    let (app, repo) = offline_app();

    for content in [json!(123), json!(null), json!(["I feel anxious"]), json!({ "text": ENTRY })] {
        let response = send(&app, post_json("/api/analyze", &json!({ "content": content }))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], json!(CONTENT_REQUIRED));
    }
    assert!(repo.get_all_entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sessionData_shouldValidateQuery() {
    let (app, _repo) = offline_app();

    let missing = send(&app, get("/api/analyze?action=entries")).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(missing).await["error"], json!("Session ID is required"));

    let bad_action = send(&app, get("/api/analyze?sessionId=s1&action=delete")).await;
    assert_eq!(bad_action.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(bad_action).await["error"], json!("Invalid action specified"));
}

#[tokio::test]
async fn test_sessionData_withEntriesAndTrends_shouldReadSession() {
    let (app, _repo) = offline_app();
    let first = send(&app, post_json("/api/analyze", &json!({ "content": ENTRY }))).await;
    let session_id = first.headers()["x-session-id"].to_str().unwrap().to_string();

    let entries = body_json(send(&app, get(&format!("/api/analyze?sessionId={}&action=entries", session_id))).await).await;
    assert_eq!(entries["entries"].as_array().unwrap().len(), 1);

    let trends = body_json(send(&app, get(&format!("/api/analyze?sessionId={}&action=trends", session_id))).await).await;
    assert_eq!(trends["trends"], json!([]));
    assert_eq!(trends["message"], json!("More entries needed for trend analysis"));
}

#[tokio::test]
async fn test_journalForm_shouldValidateAndSubmit() {
    let (app, repo) = offline_app();

    let short = send(&app, post_json("/api/journal", &json!({ "content": "too short" }))).await;
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);
    let body = body_json(short).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!(FORM_CONTENT_TOO_SHORT));

    let response = send(&app, post_json("/api/journal", &json!({ "content": ENTRY }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["emotionAnalysis"]["primaryEmotion"], json!("anxiety"));

    let session_id = body["sessionId"].as_str().unwrap();
    let session = repo.get_session(session_id).await.unwrap().unwrap();
    assert_eq!(session.total_entries, 1);
}

#[tokio::test]
async fn test_journalForm_withMalformedBody_shouldReturnGenericError() {
    let (app, _repo) = offline_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/journal")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("content=hello"))
        .unwrap();

    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], json!(FORM_GENERIC_ERROR));
}

#[tokio::test]
async fn test_feedback_shouldValidateAndStore() {
    let (app, repo) = offline_app();

    let invalid = send(&app, post_json("/api/feedback", &json!({ "sessionId": "s1", "rating": 7, "helpful": true }))).await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(invalid).await["error"],
        json!("Rating must be a number between 1 and 5")
    );

    let response = send(
        &app,
        post_json(
            "/api/feedback",
            &json!({ "sessionId": "s1", "rating": 5, "helpful": true, "comments": "Felt understood" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], json!(true));

    let stored = repo.list_feedback().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].comments.as_deref(), Some("Felt understood"));
}

#[tokio::test]
async fn test_session_summaryAndEnd_shouldTrackLifecycle() {
    let (app, _repo) = offline_app();
    let first = send(&app, post_json("/api/analyze", &json!({ "content": ENTRY }))).await;
    let session_id = first.headers()["x-session-id"].to_str().unwrap().to_string();

    let summary = body_json(send(&app, get(&format!("/api/session?sessionId={}", session_id))).await).await;
    assert_eq!(summary["totalEntries"], json!(1));
    assert_eq!(summary["endTime"], json!(null));

    let ended = body_json(send(&app, post_json("/api/session/end", &json!({ "sessionId": session_id }))).await).await;
    assert_eq!(ended["ended"], json!(true));

    let again = body_json(send(&app, post_json("/api/session/end", &json!({ "sessionId": session_id }))).await).await;
    assert_eq!(again["ended"], json!(false));

    let unknown = send(&app, get("/api/session?sessionId=session_0_missing")).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_shouldReportOk() {
    let (app, _repo) = offline_app();

    let response = send(&app, get("/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], json!("ok"));
}

#[tokio::test]
async fn test_checkDraft_shouldReportCountersAndMessages() {
    let (app, repo) = offline_app();

    let body = body_json(send(&app, post_json("/api/journal/validate", &json!({ "content": "hi there" }))).await).await;

    assert_eq!(body["form"]["isValid"], json!(false));
    assert_eq!(body["counter"]["display"], json!("8/5000"));
    assert_eq!(body["counter"]["color"], json!("yellow"));
    assert!(body["messages"][0].as_str().unwrap().starts_with("⚠️"));
    assert_eq!(body["likelySpam"], json!(false));
    assert!(repo.get_all_entries().await.unwrap().is_empty());
}

fn post_raw(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_checkDraft_withMalformedBody_shouldReturnJsonError() {
    let (app, _repo) = offline_app();

    let response = send(&app, post_raw("/api/journal/validate", "content=hi")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], json!(INVALID_BODY));
}

#[tokio::test]
async fn test_endSession_withMalformedBody_shouldReturnJsonError() {
    let (app, _repo) = offline_app();

    let response = send(&app, post_raw("/api/session/end", "{ \"sessionId\": ")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], json!(INVALID_BODY));
}
