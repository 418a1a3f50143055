/*!
 * Emotion and sentiment analysis of journal entries.
 *
 * Raw classifier output is normalized into ranked `EmotionScore`s and a
 * `SentimentReading`, from which the emotional state, risk level and
 * recommendations are derived. Any classifier failure falls back to the
 * keyword heuristic in `analysis::fallback`.
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::providers::EmotionClassifier;

use super::fallback;

/// Maximum number of emotions kept from a classifier response
pub const MAX_EMOTIONS: usize = 5;

/// Score above which a sentiment counts as positive (and below its negation, negative)
const SENTIMENT_THRESHOLD: f64 = 0.1;

/// Phrases that put an entry at high risk regardless of classifier output
pub const HIGH_RISK_PHRASES: &[&str] = &[
    "suicide",
    "kill myself",
    "end it all",
    "not worth living",
    "hopeless",
    "worthless",
    "give up",
    "can't go on",
];

const MEDIUM_RISK_EMOTIONS: &[&str] = &["despair", "hopelessness", "severe_anxiety"];

/// Overall sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

impl std::str::FromStr for Sentiment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            _ => Err(anyhow::anyhow!("Invalid sentiment: {}", s)),
        }
    }
}

/// Risk assessment of a single entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(anyhow::anyhow!("Invalid risk level: {}", s)),
        }
    }
}

/// One detected emotion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub emotion: String,
    /// Classifier confidence in 0.0..=1.0
    pub confidence: f64,
    /// Banded strength derived from confidence
    pub intensity: f64,
}

impl EmotionScore {
    pub fn new(emotion: impl Into<String>, confidence: f64, intensity: f64) -> Self {
        Self {
            emotion: emotion.into(),
            confidence,
            intensity,
        }
    }

    pub fn neutral() -> Self {
        Self::new("neutral", 0.5, 0.5)
    }
}

/// Normalized sentiment model output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    pub label: Sentiment,
    /// Signed score, negative values are negative sentiment
    pub score: f64,
}

impl SentimentReading {
    pub fn new(label: Sentiment, score: f64) -> Self {
        Self { label, score }
    }

    pub fn neutral() -> Self {
        Self::new(Sentiment::Neutral, 0.0)
    }
}

/// Complete analysis of one journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionAnalysis {
    pub primary_emotion: String,
    pub emotions: Vec<EmotionScore>,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub emotional_state: String,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
}

impl EmotionAnalysis {
    /// Assemble an analysis from ranked emotions and a sentiment reading
    pub fn from_parts(text: &str, emotions: Vec<EmotionScore>, sentiment: SentimentReading) -> Self {
        let primary_emotion = emotions
            .first()
            .map(|e| e.emotion.clone())
            .unwrap_or_else(|| "neutral".to_string());

        Self {
            emotional_state: determine_emotional_state(&emotions, &sentiment),
            risk_level: assess_risk_level(text, &emotions, &sentiment),
            recommendations: recommendations_for(&primary_emotion),
            primary_emotion,
            emotions,
            sentiment: sentiment.label,
            sentiment_score: sentiment.score,
        }
    }

    /// Names of the detected emotions, strongest first
    pub fn emotion_names(&self) -> Vec<String> {
        self.emotions.iter().map(|e| e.emotion.clone()).collect()
    }
}

/// Map a classifier confidence onto the five intensity bands
pub fn calculate_intensity(confidence: f64) -> f64 {
    if confidence > 0.8 {
        1.0
    } else if confidence > 0.6 {
        0.8
    } else if confidence > 0.4 {
        0.6
    } else if confidence > 0.2 {
        0.4
    } else {
        0.2
    }
}

/// First non-zero numeric field among `keys`, or 0
fn first_number(item: &Value, keys: &[&str]) -> f64 {
    keys.iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_f64))
        .find(|v| *v != 0.0)
        .unwrap_or(0.0)
}

fn first_string(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Sort emotions by confidence, strongest first; ties keep their order
pub fn rank_emotions(emotions: &mut [EmotionScore]) {
    emotions.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(Ordering::Equal));
}

/// Normalize emotion classifier output into the top emotions
pub fn process_emotion_output(output: &Value) -> Vec<EmotionScore> {
    let Some(items) = output.as_array() else {
        return vec![EmotionScore::neutral()];
    };

    let mut emotions: Vec<EmotionScore> = items
        .iter()
        .map(|item| {
            let confidence = first_number(item, &["score", "confidence"]);
            EmotionScore {
                emotion: first_string(item, &["label", "emotion"]).unwrap_or_else(|| "unknown".to_string()),
                confidence,
                intensity: calculate_intensity(confidence),
            }
        })
        .collect();

    rank_emotions(&mut emotions);
    emotions.truncate(MAX_EMOTIONS);
    emotions
}

/// Normalize sentiment model output into a label and signed score
pub fn process_sentiment_output(output: &Value) -> SentimentReading {
    if output.is_null() {
        return SentimentReading::neutral();
    }
    // Only keyed objects carry a score; bare numbers and lists read as 0
    let score = first_number(output, &["score", "sentiment_score"]);

    let label = if score > SENTIMENT_THRESHOLD {
        Sentiment::Positive
    } else if score < -SENTIMENT_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };

    SentimentReading::new(label, score)
}

/// Describe the overall emotional state in a short phrase
pub fn determine_emotional_state(emotions: &[EmotionScore], sentiment: &SentimentReading) -> String {
    let primary = emotions.first().map(|e| e.emotion.as_str()).unwrap_or("neutral");
    let intensity = emotions.first().map(|e| e.intensity).unwrap_or(0.5);

    let state = match primary {
        "anxiety" | "fear" | "worry" if intensity > 0.7 => Some("highly anxious"),
        "sadness" | "depression" | "hopelessness" if intensity > 0.7 => Some("significantly sad"),
        "anger" | "frustration" | "irritation" if intensity > 0.7 => Some("quite frustrated"),
        "joy" | "happiness" | "excitement" if intensity > 0.6 => Some("feeling positive"),
        _ => None,
    };

    if let Some(state) = state {
        return state.to_string();
    }

    match sentiment.label {
        Sentiment::Positive if sentiment.score > 0.3 => "generally positive".to_string(),
        Sentiment::Negative if sentiment.score < -0.3 => "struggling emotionally".to_string(),
        _ => "emotionally balanced".to_string(),
    }
}

/// Whether the text contains any of the high risk phrases
pub fn contains_high_risk_phrase(text: &str) -> bool {
    let lower = text.to_lowercase();
    HIGH_RISK_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Assess the risk level of an entry
pub fn assess_risk_level(text: &str, emotions: &[EmotionScore], sentiment: &SentimentReading) -> RiskLevel {
    if contains_high_risk_phrase(text) {
        return RiskLevel::High;
    }

    let intense_negative = emotions
        .iter()
        .any(|e| MEDIUM_RISK_EMOTIONS.contains(&e.emotion.as_str()) && e.intensity > 0.8);
    if intense_negative || sentiment.score < -0.6 {
        return RiskLevel::Medium;
    }

    let overwhelming = emotions.iter().filter(|e| e.intensity > 0.8).count();
    if overwhelming >= 2 {
        return RiskLevel::Medium;
    }

    RiskLevel::Low
}

/// Canned coping recommendations for the primary emotion
pub fn recommendations_for(primary_emotion: &str) -> Vec<String> {
    let items: [&str; 3] = match primary_emotion {
        "anxiety" | "fear" => [
            "Try deep breathing exercises: 4 counts in, 4 counts hold, 4 counts out",
            "Practice grounding: name 5 things you see, 4 you hear, 3 you touch",
            "Consider speaking with a counselor about anxiety management",
        ],
        "sadness" | "depression" => [
            "Reach out to a trusted friend or family member",
            "Engage in gentle physical activity like walking",
            "Consider professional support if these feelings persist",
        ],
        "anger" | "frustration" => [
            "Take a few minutes to cool down before responding",
            "Try physical exercise to release tension",
            "Practice expressing feelings constructively",
        ],
        "stress" | "overwhelm" => [
            "Break large tasks into smaller, manageable steps",
            "Prioritize self-care and adequate sleep",
            "Use campus resources like tutoring or counseling",
        ],
        _ => [
            "Continue journaling to track your emotional patterns",
            "Maintain healthy routines for sleep and exercise",
            "Stay connected with supportive people in your life",
        ],
    };

    items.iter().map(|s| s.to_string()).collect()
}

/// Emotion detector backed by an optional remote classifier
#[derive(Clone)]
pub struct EmotionDetector {
    classifier: Option<Arc<dyn EmotionClassifier>>,
}

impl EmotionDetector {
    pub fn new(classifier: Arc<dyn EmotionClassifier>) -> Self {
        Self {
            classifier: Some(classifier),
        }
    }

    /// Detector that always uses the keyword heuristic
    pub fn keyword_only() -> Self {
        Self { classifier: None }
    }

    /// Analyze `text`; never fails, falling back to keyword analysis
    pub async fn detect(&self, text: &str) -> EmotionAnalysis {
        let Some(classifier) = &self.classifier else {
            debug!("No emotion classifier configured, using keyword analysis");
            return fallback::keyword_analysis(text);
        };

        let outputs = tokio::try_join!(
            classifier.classify_sentiment(text),
            classifier.classify_emotions(text)
        );

        match outputs {
            Ok((sentiment_output, emotion_output)) => {
                let emotions = process_emotion_output(&emotion_output);
                let sentiment = process_sentiment_output(&sentiment_output);
                EmotionAnalysis::from_parts(text, emotions, sentiment)
            }
            Err(e) => {
                warn!("Emotion detection failed, using keyword analysis: {}", e);
                fallback::keyword_analysis(text)
            }
        }
    }
}

impl fmt::Debug for EmotionDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmotionDetector")
            .field("remote", &self.classifier.is_some())
            .finish()
    }
}
