/*!
 * Route tests for the admin API
 */

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;

use mindmosaic::server::admin_routes::{INVALID_ACTION, INVALID_DAYS};
use mindmosaic::server::error::{INVALID_BODY, INVALID_QUERY};

use crate::common::{admin_token, body_json, body_text, get, get_with_token, offline_app, post_json, send};

const ENTRIES: [&str; 3] = [
    "I feel anxious and worried about my chemistry exam",
    "Had a good day, happy with how the project went",
    "Feeling sad and down since the weekend",
];

async fn seed(app: &axum::Router) {
    for content in ENTRIES {
        let response = send(app, post_json("/api/analyze", &json!({ "content": content }))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

fn post_json_with_token(uri: &str, token: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_raw(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_admin_withoutToken_shouldBeUnauthorized() {
    let (app, _repo) = offline_app();

    let response = send(&app, get("/api/admin?action=analytics")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], json!("Unauthorized"));

    let forged = send(&app, get_with_token("/api/admin?action=analytics", "not-a-token")).await;
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_withWrongPassword_shouldBeUnauthorized() {
    let (app, _repo) = offline_app();

    let response = send(
        &app,
        post_json("/api/admin/login", &json!({ "email": "admin@mindmosaic.app", "password": "guess" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_shouldRevokeToken() {
    let (app, _repo) = offline_app();
    let token = admin_token(&app).await;

    let response = send(&app, post_json_with_token("/api/admin/logout", &token, &json!({}))).await;
    assert_eq!(body_json(response).await["success"], json!(true));

    let after = send(&app, get_with_token("/api/admin?action=metrics", &token)).await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_withUnknownAction_shouldBeBadRequest() {
    let (app, _repo) = offline_app();
    let token = admin_token(&app).await;

    let response = send(&app, get_with_token("/api/admin?action=drop_tables", &token)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], json!("Invalid action"));
}

#[tokio::test]
async fn test_admin_analyticsAndMetrics_shouldAggregateEntries() {
    let (app, _repo) = offline_app();
    seed(&app).await;
    let token = admin_token(&app).await;

    let analytics = body_json(send(&app, get_with_token("/api/admin?action=analytics", &token)).await).await;
    assert_eq!(analytics["totalEntries"], json!(3));
    assert_eq!(analytics["emotionDistribution"]["anxiety"], json!(1));
    assert_eq!(analytics["sentimentTrends"].as_array().unwrap().len(), 1);

    let metrics = body_json(send(&app, get_with_token("/api/admin?action=metrics", &token)).await).await;
    assert_eq!(metrics["totalSessions"], json!(3));
    assert_eq!(metrics["activeUsers"], json!(3));

    let trends = body_json(send(&app, get_with_token("/api/admin?action=trends&days=7", &token)).await).await;
    assert_eq!(trends.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_entries_shouldApplyFilters() {
    let (app, _repo) = offline_app();
    seed(&app).await;
    let token = admin_token(&app).await;

    let all = body_json(send(&app, get_with_token("/api/admin?action=entries", &token)).await).await;
    assert_eq!(all["entries"].as_array().unwrap().len(), 3);

    let searched = body_json(
        send(&app, get_with_token("/api/admin?action=entries&search=CHEMISTRY&range=today", &token)).await,
    )
    .await;
    assert_eq!(searched["entries"].as_array().unwrap().len(), 1);

    let by_emotion = body_json(send(&app, get_with_token("/api/admin?action=entries&emotion=joy", &token)).await).await;
    assert_eq!(by_emotion["entries"].as_array().unwrap().len(), 1);

    let bad_range = send(&app, get_with_token("/api/admin?action=entries&range=decade", &token)).await;
    assert_eq!(bad_range.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_export_shouldReturnCsvAttachment() {
    let (app, _repo) = offline_app();
    seed(&app).await;
    let token = admin_token(&app).await;

    let response = send(&app, get_with_token("/api/admin?action=export&type=dataset", &token)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=mindmosaic-dataset.csv"
    );
    let csv = body_text(response).await;
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("emotions,sentiment,sentiment_score,risk_level,word_count,timestamp")
    );
    assert_eq!(lines.count(), 3);
}

#[tokio::test]
async fn test_admin_reportAndFeedback_shouldReturnFiles() {
    let (app, _repo) = offline_app();
    seed(&app).await;
    send(
        &app,
        post_json("/api/feedback", &json!({ "sessionId": "s1", "rating": 4, "helpful": true, "comments": "helpful and safe" })),
    )
    .await;
    let token = admin_token(&app).await;

    let report = send(&app, get_with_token("/api/admin?action=report", &token)).await;
    let disposition = report.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains("mindmosaic-admin-report-"));
    assert!(body_text(report).await.contains("Total Journal Entries: 3"));

    let feedback = send(&app, get_with_token("/api/admin?action=feedback", &token)).await;
    assert_eq!(feedback.status(), StatusCode::OK);
    assert!(!body_text(feedback).await.is_empty());

    let summary = body_json(send(&app, get_with_token("/api/admin?action=feedback_summary", &token)).await).await;
    assert_eq!(summary["totalFeedback"], json!(1));
    assert_eq!(summary["averageRating"], json!(4.0));
}

#[tokio::test]
async fn test_training_shouldRunActions() {
    let (app, _repo) = offline_app();
    let token = admin_token(&app).await;

    let empty = send(
        &app,
        post_json_with_token("/api/admin/training", &token, &json!({ "action": "analyze_dataset" })),
    )
    .await;
    assert_eq!(empty.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(empty).await["error"], json!("Internal server error"));

    seed(&app).await;
    let trained = send(
        &app,
        post_json_with_token("/api/admin/training", &token, &json!({ "action": "train_model" })),
    )
    .await;
    assert_eq!(trained.status(), StatusCode::OK);
    let body = body_json(trained).await;
    assert_eq!(body["datasetSize"], json!(3));

    let invalid = send(
        &app,
        post_json_with_token("/api/admin/training", &token, &json!({ "action": "deploy" })),
    )
    .await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_withMalformedBody_shouldReturnJsonError() {
    let (app, _repo) = offline_app();

    let response = send(&app, post_raw("/api/admin/login", None, "not json")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], json!(INVALID_BODY));
}

#[tokio::test]
async fn test_admin_withOutOfRangeDays_shouldBeBadRequest() {
    let (app, _repo) = offline_app();
    seed(&app).await;
    let token = admin_token(&app).await;

    for uri in [
        "/api/admin?action=trends&days=9223372036854775807",
        "/api/admin?action=trends&days=-3",
        "/api/admin?action=analytics&days=0",
        "/api/admin?action=export_analytics&days=5000",
    ] {
        let response = send(&app, get_with_token(uri, &token)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body_json(response).await["error"], json!(INVALID_DAYS));
    }

    let widest = send(&app, get_with_token("/api/admin?action=trends&days=3650", &token)).await;
    assert_eq!(widest.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_withNonNumericDays_shouldBeBadRequest() {
    let (app, _repo) = offline_app();
    let token = admin_token(&app).await;

    let response = send(&app, get_with_token("/api/admin?action=trends&days=week", &token)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], json!(INVALID_QUERY));

    let anonymous = send(&app, get("/api/admin?action=trends&days=week")).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_training_withoutToken_shouldBeUnauthorizedWhateverTheBody() {
    let (app, _repo) = offline_app();

    for body in ["{}", "{ broken", r#"{"action": "train_model"}"#] {
        let response = send(&app, post_raw("/api/admin/training", None, body)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", body);
        assert_eq!(body_json(response).await["error"], json!("Unauthorized"));
    }
}

#[tokio::test]
async fn test_training_withoutAction_shouldBeBadRequest() {
    let (app, _repo) = offline_app();
    let token = admin_token(&app).await;

    let missing = send(&app, post_raw("/api/admin/training", Some(&token), "{}")).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(missing).await["error"], json!(INVALID_ACTION));

    let not_text = send(&app, post_raw("/api/admin/training", Some(&token), r#"{"action": 7}"#)).await;
    assert_eq!(not_text.status(), StatusCode::BAD_REQUEST);

    let malformed = send(&app, post_raw("/api/admin/training", Some(&token), "{ broken")).await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(malformed).await["error"], json!(INVALID_BODY));
}
