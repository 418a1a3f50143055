/*!
 * Clients for the external AI services.
 *
 * - Replicate: hosted sentiment and emotion classification models
 * - Together: OpenAI-compatible chat completions for supportive replies
 * - Mock: scripted stand-ins used by tests
 */

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all vendor clients
///
/// This trait defines the raw request/response surface of a client,
/// independent of how the analysis layer consumes it.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// Source of raw sentiment and emotion classifications
#[async_trait]
pub trait EmotionClassifier: Send + Sync + Debug {
    /// Raw output of the sentiment model for `text`
    async fn classify_sentiment(&self, text: &str) -> Result<Value, ProviderError>;

    /// Raw output of the emotion model for `text`, usually an array of `{label, score}`
    async fn classify_emotions(&self, text: &str) -> Result<Value, ProviderError>;
}

/// Source of generated supportive text
#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError>;
}

pub mod mock;
pub mod replicate;
pub mod together;
