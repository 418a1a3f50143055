/*!
 * Keyword-based emotion analysis used when no classifier is reachable.
 */

use super::emotion::{
    assess_risk_level, determine_emotional_state, rank_emotions, recommendations_for, EmotionAnalysis,
    EmotionScore, Sentiment, SentimentReading,
};

/// Keywords per emotion, in tie-breaking order
const EMOTION_KEYWORDS: &[(&str, &[&str])] = &[
    ("anxiety", &["anxious", "worried", "nervous", "panic", "stress"]),
    ("sadness", &["sad", "depressed", "down", "blue", "unhappy"]),
    ("anger", &["angry", "mad", "frustrated", "annoyed", "irritated"]),
    ("joy", &["happy", "excited", "good", "great", "wonderful"]),
    ("fear", &["scared", "afraid", "terrified", "fearful"]),
];

const KEYWORD_SENTIMENT_SCORE: f64 = 0.3;

/// Emotions whose keywords appear in `text`, strongest first
pub fn match_emotions(text: &str) -> Vec<EmotionScore> {
    let lower = text.to_lowercase();

    let mut detected: Vec<EmotionScore> = EMOTION_KEYWORDS
        .iter()
        .filter_map(|(emotion, keywords)| {
            let matches = keywords.iter().filter(|k| lower.contains(*k)).count();
            (matches > 0).then(|| {
                let n = matches as f64;
                EmotionScore::new(*emotion, (n * 0.3).min(0.9), (n * 0.4).min(1.0))
            })
        })
        .collect();

    if detected.is_empty() {
        detected.push(EmotionScore::neutral());
    }

    rank_emotions(&mut detected);
    detected
}

/// Coarse sentiment from a handful of marker words
pub fn keyword_sentiment(text: &str) -> SentimentReading {
    let lower = text.to_lowercase();

    if lower.contains("good") || lower.contains("happy") {
        SentimentReading::new(Sentiment::Positive, KEYWORD_SENTIMENT_SCORE)
    } else if lower.contains("bad") || lower.contains("sad") {
        SentimentReading::new(Sentiment::Negative, -KEYWORD_SENTIMENT_SCORE)
    } else {
        SentimentReading::neutral()
    }
}

/// Full analysis from keyword matching alone
pub fn keyword_analysis(text: &str) -> EmotionAnalysis {
    let emotions = match_emotions(text);
    let sentiment = keyword_sentiment(text);

    // derived fields only see the label, never the canned score
    let unscored = SentimentReading::new(sentiment.label, 0.0);
    let primary_emotion = emotions[0].emotion.clone();

    EmotionAnalysis {
        emotional_state: determine_emotional_state(&emotions, &unscored),
        risk_level: assess_risk_level(text, &emotions, &unscored),
        recommendations: recommendations_for(&primary_emotion),
        primary_emotion,
        emotions,
        sentiment: sentiment.label,
        sentiment_score: sentiment.score,
    }
}
