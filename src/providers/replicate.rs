use async_trait::async_trait;
use log::{debug, error};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::app_config::EmotionProviderConfig;
use crate::errors::ProviderError;
use crate::providers::{EmotionClassifier, Provider};

/// Replicate client running hosted classification models
#[derive(Debug)]
pub struct Replicate {
    /// HTTP client for API requests
    client: Client,
    /// API token for authentication
    api_token: String,
    /// Base URL of the API, without the version segment
    endpoint: String,
    /// `owner/name:version` of the sentiment model
    sentiment_model: String,
    /// `owner/name:version` of the emotion model
    emotion_model: String,
}

/// Prediction request
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest {
    /// Model version id
    pub version: String,
    /// Model specific input object
    pub input: Value,
}

impl PredictionRequest {
    /// Build a request for `model`, accepting either a bare version id or `owner/name:version`
    pub fn new(model: &str, input: Value) -> Self {
        let version = model.rsplit_once(':').map(|(_, v)| v).unwrap_or(model);
        Self {
            version: version.to_string(),
            input,
        }
    }
}

/// Prediction as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub id: Option<String>,
    /// starting, processing, succeeded, failed or canceled
    pub status: String,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl Replicate {
    /// Create a new client from its configuration section
    pub fn new(config: &EmotionProviderConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            api_token: config.api_token.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            sentiment_model: config.sentiment_model.clone(),
            emotion_model: config.emotion_model.clone(),
        }
    }

    /// Whether a token is configured
    pub fn is_configured(&self) -> bool {
        !self.api_token.trim().is_empty()
    }

    fn ensure_configured(&self) -> Result<(), ProviderError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured("Replicate API token is empty".to_string()))
        }
    }

    async fn error_from_response(response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to get error response text".to_string());
        error!("Replicate API error ({}): {}", status, error_text);
        ProviderError::from_status(status, error_text)
    }
}

#[async_trait]
impl Provider for Replicate {
    type Request = PredictionRequest;
    type Response = PredictionResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        self.ensure_configured()?;

        let api_url = format!("{}/v1/predictions", self.endpoint);
        debug!("Running Replicate prediction for version {}", request.version);

        let response = self
            .client
            .post(&api_url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_token))
            .header(header::CONTENT_TYPE, "application/json")
            .header("Prefer", "wait")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let prediction = response
            .json::<PredictionResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        match prediction.status.as_str() {
            "succeeded" => Ok(prediction),
            "failed" | "canceled" => {
                let message = prediction
                    .error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| format!("prediction {}", prediction.status));
                Err(ProviderError::ApiError {
                    status_code: 422,
                    message,
                })
            }
            other => Err(ProviderError::RequestFailed(format!(
                "Prediction {} did not finish in time (status: {})",
                prediction.id.as_deref().unwrap_or("unknown"),
                other
            ))),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.ensure_configured()?;

        let response = self
            .client
            .get(format!("{}/v1/account", self.endpoint))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_token))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        match &response.output {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => {
                items.iter().filter_map(Value::as_str).collect()
            }
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

#[async_trait]
impl EmotionClassifier for Replicate {
    async fn classify_sentiment(&self, text: &str) -> Result<Value, ProviderError> {
        let request = PredictionRequest::new(&self.sentiment_model, json!({ "text": text }));
        let prediction = self.complete(request).await?;
        Ok(prediction.output.unwrap_or(Value::Null))
    }

    async fn classify_emotions(&self, text: &str) -> Result<Value, ProviderError> {
        let request = PredictionRequest::new(
            &self.emotion_model,
            json!({ "text": text, "return_probabilities": true }),
        );
        let prediction = self.complete(request).await?;
        Ok(prediction.output.unwrap_or(Value::Null))
    }
}
