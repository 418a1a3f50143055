/*!
 * Common test utilities for the mindmosaic test suite
 */

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

use mindmosaic::admin::{AdminAuth, AdminService};
use mindmosaic::analysis::{EmotionDetector, ResponseGenerator};
use mindmosaic::app_config::AdminConfig;
use mindmosaic::database::Repository;
use mindmosaic::journal_service::JournalService;
use mindmosaic::providers::mock::{MockClassifier, MockGenerator};
use mindmosaic::server::{build_router, AppState};

/// Serve `router` on an ephemeral local port, returning its base URL
pub async fn spawn_fake_vendor(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", address)
}

/// App over an in-memory database with offline analysis
pub fn offline_app() -> (Router, Repository) {
    app_with(EmotionDetector::keyword_only(), ResponseGenerator::offline())
}

/// App whose vendors answer with fixed outputs
pub fn scripted_app(reply: &str) -> (Router, Repository) {
    let classifier = MockClassifier::working(
        json!({ "score": -0.7 }),
        json!([{ "label": "anxiety", "score": 0.85 }, { "label": "sadness", "score": 0.4 }]),
    );
    app_with(
        EmotionDetector::new(Arc::new(classifier)),
        ResponseGenerator::new(Arc::new(MockGenerator::working(reply))),
    )
}

pub fn app_with(detector: EmotionDetector, responder: ResponseGenerator) -> (Router, Repository) {
    let repo = Repository::new_in_memory().unwrap();
    let admin = AdminService::new(repo.clone(), AdminAuth::new(&AdminConfig::default()))
        .with_training_delay(Duration::from_millis(1));
    let state = AppState::new(JournalService::new(repo.clone(), detector, responder), admin);
    (build_router(state, &[]), repo)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// Log in with the default administrator and return the bearer token
pub async fn admin_token(app: &Router) -> String {
    let config = AdminConfig::default();
    let response = send(
        app,
        post_json(
            "/api/admin/login",
            &json!({ "email": config.email, "password": config.password }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"].as_str().unwrap().to_string()
}
