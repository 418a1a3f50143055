/*!
 * Aggregates over user feedback.
 */

use serde::Serialize;
use std::collections::BTreeMap;

use crate::database::models::FeedbackRecord;

/// Words looked for in feedback comments
pub const FEEDBACK_THEMES: [&str; 15] = [
    "helpful",
    "accurate",
    "supportive",
    "understanding",
    "caring",
    "confusing",
    "unclear",
    "unhelpful",
    "generic",
    "repetitive",
    "privacy",
    "safe",
    "comfortable",
    "trust",
    "professional",
];

const MAX_THEMES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeCount {
    pub theme: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackAnalysis {
    pub total_feedback: usize,
    pub average_rating: f64,
    pub helpful_percentage: f64,
    /// Most mentioned themes, most frequent first
    pub common_themes: Vec<ThemeCount>,
    /// Submissions per star rating; empty when there is no feedback
    pub rating_distribution: BTreeMap<u8, usize>,
}

pub fn analyze_feedback(feedback: &[FeedbackRecord]) -> FeedbackAnalysis {
    if feedback.is_empty() {
        return FeedbackAnalysis::default();
    }

    let total = feedback.len();
    let average_rating = feedback.iter().map(|f| f64::from(f.rating)).sum::<f64>() / total as f64;
    let helpful = feedback.iter().filter(|f| f.helpful).count();

    let rating_distribution = (1..=5u8)
        .map(|rating| (rating, feedback.iter().filter(|f| f.rating == rating).count()))
        .collect();

    let comments: Vec<String> = feedback
        .iter()
        .filter_map(|f| f.comments.as_deref())
        .map(str::to_lowercase)
        .collect();

    FeedbackAnalysis {
        total_feedback: total,
        average_rating,
        helpful_percentage: helpful as f64 / total as f64 * 100.0,
        common_themes: extract_common_themes(&comments),
        rating_distribution,
    }
}

/// Count comments mentioning each theme; a comment counts once per theme
///
/// Substring matching, so "unhelpful" also counts towards "helpful".
pub fn extract_common_themes(comments: &[String]) -> Vec<ThemeCount> {
    let mut counts: Vec<ThemeCount> = FEEDBACK_THEMES
        .iter()
        .map(|theme| ThemeCount {
            theme: theme.to_string(),
            count: comments.iter().filter(|c| c.contains(theme)).count(),
        })
        .filter(|t| t.count > 0)
        .collect();

    // stable: ties keep theme list order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(MAX_THEMES);
    counts
}
