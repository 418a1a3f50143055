/*!
 * Emotional trends across the entries of a session.
 */

use serde::{Deserialize, Serialize};

use super::emotion::RiskLevel;

/// Number of most recent entries considered for insights
const RECENT_WINDOW: usize = 7;

/// Minimum number of entries before insights are produced
const MIN_ENTRIES_FOR_INSIGHTS: usize = 3;

/// Minimum number of entries before patterns are produced
const MIN_ENTRIES_FOR_PATTERNS: usize = 5;

/// One point of a session's emotional trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionTrend {
    /// Calendar day, `YYYY-MM-DD`
    pub date: String,
    pub emotions: Vec<String>,
    pub sentiment: f64,
    pub risk_level: RiskLevel,
}

/// Trends plus the insights and patterns derived from them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrendReport {
    pub trends: Vec<EmotionTrend>,
    pub insights: Vec<String>,
    pub patterns: Vec<String>,
}

/// Build a report over trends ordered oldest first
pub fn analyze_trends(trends: Vec<EmotionTrend>) -> TrendReport {
    let insights = generate_trend_insights(&trends);
    let patterns = identify_patterns(&trends);
    TrendReport {
        trends,
        insights,
        patterns,
    }
}

/// Human readable insights over the most recent entries
pub fn generate_trend_insights(trends: &[EmotionTrend]) -> Vec<String> {
    if trends.len() < MIN_ENTRIES_FOR_INSIGHTS {
        return vec!["More entries needed to identify meaningful trends".to_string()];
    }

    let recent = &trends[trends.len().saturating_sub(RECENT_WINDOW)..];
    let mut insights = Vec::new();

    let average = recent.iter().map(|t| t.sentiment).sum::<f64>() / recent.len() as f64;
    if average > 0.2 {
        insights.push("Your overall mood has been trending positive recently".to_string());
    } else if average < -0.2 {
        insights.push("You've been experiencing more challenging emotions lately".to_string());
    }

    if recent.iter().any(|t| t.risk_level == RiskLevel::High) {
        insights.push(
            "Some recent entries indicate significant distress - consider reaching out for support".to_string(),
        );
    }

    if let Some((emotion, count)) = most_frequent_emotion(recent) {
        if count as f64 > recent.len() as f64 * 0.4 {
            insights.push(format!("{} has been a recurring theme in your recent entries", emotion));
        }
    }

    insights
}

/// Most frequent emotion; ties go to the one seen first
fn most_frequent_emotion(trends: &[EmotionTrend]) -> Option<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();

    for emotion in trends.iter().flat_map(|t| t.emotions.iter()) {
        match counts.iter_mut().find(|(name, _)| name == emotion) {
            Some((_, count)) => *count += 1,
            None => counts.push((emotion.clone(), 1)),
        }
    }

    counts.into_iter().fold(None, |best, candidate| match best {
        Some(ref b) if b.1 >= candidate.1 => best,
        _ => Some(candidate),
    })
}

/// Longer-horizon patterns; placeholder until more signals are stored
pub fn identify_patterns(trends: &[EmotionTrend]) -> Vec<String> {
    if trends.len() < MIN_ENTRIES_FOR_PATTERNS {
        return Vec::new();
    }
    vec!["Pattern analysis requires more data points".to_string()]
}
