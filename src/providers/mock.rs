/*!
 * Mock providers for testing.
 *
 * `MockClassifier` answers with scripted sentiment and emotion outputs and
 * `MockGenerator` with a scripted reply. Both share a `MockBehavior` that
 * decides whether a call succeeds, fails, stalls or comes back empty.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{EmotionClassifier, Provider, TextGenerator};

/// Behavior mode for the mock providers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with the scripted output
    Working,
    /// Fails every Nth call
    Intermittent { fail_every: usize },
    /// Always fails with an API error
    Failing,
    /// Succeeds with an empty output
    Empty,
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
}

impl MockBehavior {
    /// Run one call under this behavior; `Ok(false)` means answer empty
    async fn run(&self, count: usize) -> Result<bool, ProviderError> {
        match *self {
            MockBehavior::Working => Ok(true),
            MockBehavior::Intermittent { fail_every } if fail_every > 0 && count % fail_every == fail_every - 1 => {
                Err(ProviderError::ApiError {
                    message: format!("Simulated intermittent failure (request #{})", count + 1),
                    status_code: 503,
                })
            }
            MockBehavior::Intermittent { .. } => Ok(true),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),
            MockBehavior::Empty => Ok(false),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(true)
            }
        }
    }
}

/// Classifier with scripted outputs
#[derive(Debug, Clone)]
pub struct MockClassifier {
    behavior: MockBehavior,
    sentiment: Value,
    emotions: Value,
    /// Shared between clones
    request_count: Arc<AtomicUsize>,
}

impl MockClassifier {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            sentiment: json!({ "score": 0.0 }),
            emotions: json!([{ "label": "neutral", "score": 0.5 }]),
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Classifier that always succeeds with the given outputs
    pub fn working(sentiment: Value, emotions: Value) -> Self {
        Self {
            sentiment,
            emotions,
            ..Self::new(MockBehavior::Working)
        }
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Number of classification calls made so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    async fn answer(&self, output: &Value) -> Result<Value, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        if self.behavior.run(count).await? {
            Ok(output.clone())
        } else {
            Ok(Value::Null)
        }
    }
}

#[async_trait]
impl EmotionClassifier for MockClassifier {
    async fn classify_sentiment(&self, _text: &str) -> Result<Value, ProviderError> {
        self.answer(&self.sentiment).await
    }

    async fn classify_emotions(&self, _text: &str) -> Result<Value, ProviderError> {
        self.answer(&self.emotions).await
    }
}

/// Mock generation request
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Generator with a scripted reply that records the prompts it receives
#[derive(Debug, Clone)]
pub struct MockGenerator {
    behavior: MockBehavior,
    reply: String,
    request_count: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockGenerator {
    pub fn new(behavior: MockBehavior, reply: impl Into<String>) -> Self {
        Self {
            behavior,
            reply: reply.into(),
            request_count: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Generator that always answers `reply`
    pub fn working(reply: impl Into<String>) -> Self {
        Self::new(MockBehavior::Working, reply)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing, "")
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far, oldest first
    pub fn received(&self) -> Vec<MockRequest> {
        self.received.lock().clone()
    }
}

#[async_trait]
impl Provider for MockGenerator {
    type Request = MockRequest;
    type Response = String;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.received.lock().push(request);

        if self.behavior.run(count).await? {
            Ok(self.reply.clone())
        } else {
            Ok(String::new())
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
            _ => Ok(()),
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response.clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let response = self
            .complete(MockRequest {
                system_prompt: system_prompt.to_string(),
                user_prompt: user_prompt.to_string(),
            })
            .await?;
        Ok(Self::extract_text(&response))
    }
}
