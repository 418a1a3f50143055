/*!
 * Supportive response generation.
 *
 * The text generator's free-form reply is split into a main message and
 * bullet suggestions, scored with a heuristic confidence and paired with
 * resources chosen from the entry's content.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::TextGenerator;

use super::prompts::{follow_up_prompt, support_prompt, SUPPORT_SYSTEM_PROMPT};

/// Bullet or numbered list marker at the start of a line
static LIST_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[•*-]|\d+\.)\s+").expect("Invalid list marker regex")
});

const BASE_CONFIDENCE: f64 = 0.7;
const MAX_CONFIDENCE: f64 = 0.95;
const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Minimum length of a line to count as the main message
const MIN_MAIN_LINE_CHARS: usize = 10;

const FALLBACK_RESPONSE: &str = "I'm here to listen and support you. While I'm experiencing some technical difficulties right now, please know that what you're feeling is valid and you're not alone. If you're in crisis, please reach out to your campus counseling center or call 988 for immediate support.";

const FALLBACK_SUGGESTIONS: [&str; 3] = [
    "Take slow, deep breaths",
    "Reach out to a trusted friend or family member",
    "Consider speaking with a counselor",
];

const FALLBACK_RESOURCES: [&str; 3] = [
    "Campus Counseling Center",
    "Crisis Text Line: Text HOME to 741741",
    "National Suicide Prevention Lifeline: 988",
];

/// Topic keywords and the resources they add
const TOPIC_RESOURCES: &[(&[&str], [&str; 2])] = &[
    (
        &["anxiety", "anxious"],
        ["Anxiety and Depression Association of America", "Headspace: Anxiety meditation"],
    ),
    (
        &["depress", "sad"],
        ["National Alliance on Mental Illness (NAMI)", "Mental Health America"],
    ),
    (
        &["stress", "overwhelm"],
        ["Stress management workshops", "Academic success center"],
    ),
    (
        &["sleep", "insomnia"],
        ["Sleep hygiene resources", "Campus wellness center"],
    ),
];

const CRISIS_KEYWORDS: &[&str] = &["suicide", "harm", "hopeless", "worthless"];

/// Supportive reply to one journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportResponse {
    pub response: String,
    pub confidence: f64,
    pub suggestions: Vec<String>,
    pub resources: Vec<String>,
}

impl SupportResponse {
    /// Static reply used when generation is unavailable
    pub fn fallback() -> Self {
        Self {
            response: FALLBACK_RESPONSE.to_string(),
            confidence: FALLBACK_CONFIDENCE,
            suggestions: FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            resources: FALLBACK_RESOURCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Main message and list items extracted from generated text
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub main_message: String,
    pub suggestions: Vec<String>,
}

/// Split generated text into its main message and list suggestions
pub fn parse_response(text: &str) -> ParsedResponse {
    let mut suggestions = Vec::new();
    let mut main_message: Option<&str> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(marker) = LIST_MARKER.find(line) {
            suggestions.push(line[marker.end()..].to_string());
        } else if main_message.is_none() && line.chars().count() > MIN_MAIN_LINE_CHARS {
            main_message = Some(line);
        }
    }

    ParsedResponse {
        main_message: main_message.unwrap_or(text).to_string(),
        suggestions,
    }
}

/// Heuristic confidence from entry detail and reply quality
pub fn calculate_confidence(content: &str, emotions: &[String], response: &str) -> f64 {
    let mut confidence = BASE_CONFIDENCE;
    let content_len = content.chars().count();

    if content_len > 100 {
        confidence += 0.1;
    }
    if content_len > 300 {
        confidence += 0.1;
    }
    if !emotions.is_empty() {
        confidence += 0.1;
    }
    if response.chars().count() > 200 {
        confidence += 0.05;
    }
    if response.contains("coping") || response.contains("strategy") {
        confidence += 0.05;
    }

    confidence.min(MAX_CONFIDENCE)
}

/// Support resources relevant to the entry, crisis lines first
pub fn generate_resources(content: &str) -> Vec<String> {
    let lower = content.to_lowercase();
    let mut resources = vec![
        "Campus Counseling Center".to_string(),
        "Student Health Services".to_string(),
    ];

    for (keywords, additions) in TOPIC_RESOURCES {
        if keywords.iter().any(|k| lower.contains(k)) {
            resources.extend(additions.iter().map(|s| s.to_string()));
        }
    }

    if CRISIS_KEYWORDS.iter().any(|k| lower.contains(k)) {
        resources.splice(
            0..0,
            [
                "National Suicide Prevention Lifeline: 988".to_string(),
                "Crisis Text Line: Text HOME to 741741".to_string(),
            ],
        );
    }

    resources
}

/// An earlier entry of the same session, used to frame a follow-up
#[derive(Debug, Clone)]
pub struct PreviousExchange {
    pub content: String,
    pub suggestions: Vec<String>,
}

/// Generates supportive replies through an optional text generator
#[derive(Clone)]
pub struct ResponseGenerator {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl ResponseGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    /// Generator that always answers with the fallback reply
    pub fn offline() -> Self {
        Self { generator: None }
    }

    /// Reply to an entry; never fails, answering with the fallback on error
    pub async fn respond(&self, content: &str, emotions: &[String]) -> SupportResponse {
        match self.try_respond(content, emotions).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Response generation failed, using fallback: {}", e);
                SupportResponse::fallback()
            }
        }
    }

    /// Reply to an entry that continues an earlier one in the same session
    pub async fn respond_follow_up(
        &self,
        previous: &PreviousExchange,
        content: &str,
        emotions: &[String],
    ) -> SupportResponse {
        let framed = follow_up_prompt(&previous.content, &previous.suggestions, content);
        self.respond(&framed, emotions).await
    }

    /// Reply to an entry, surfacing generator errors
    pub async fn try_respond(&self, content: &str, emotions: &[String]) -> Result<SupportResponse, ProviderError> {
        let Some(generator) = &self.generator else {
            return Err(ProviderError::NotConfigured("text generation".to_string()));
        };

        let prompt = support_prompt(content, emotions);
        let text = generator.generate(SUPPORT_SYSTEM_PROMPT, &prompt).await?;
        debug!("Generated response of {} chars", text.len());

        let parsed = parse_response(&text);

        Ok(SupportResponse {
            response: parsed.main_message,
            confidence: calculate_confidence(content, emotions, &text),
            suggestions: parsed.suggestions,
            resources: generate_resources(content),
        })
    }
}

impl fmt::Debug for ResponseGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseGenerator")
            .field("remote", &self.generator.is_some())
            .finish()
    }
}
