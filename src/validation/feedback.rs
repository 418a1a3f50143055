/*!
 * Feedback submission validation.
 *
 * Submissions arrive as loosely typed JSON, so `rating` and `helpful` are
 * kept as raw values until validated.
 */

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::database::models::FeedbackRecord;
use crate::errors::ValidationError;

/// Feedback as submitted by the client
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSubmission {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub entry_id: Option<String>,
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub helpful: Option<Value>,
    #[serde(default)]
    pub supportive: Option<bool>,
    #[serde(default)]
    pub accurate: Option<bool>,
    #[serde(default)]
    pub emotional_support: Option<String>,
}

/// Check a submission and turn it into a storable record
///
/// Checks run in order and stop at the first failure.
pub fn validate_feedback(submission: FeedbackSubmission) -> Result<FeedbackRecord, ValidationError> {
    let session_id = submission
        .session_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ValidationError::new("Session ID is required"))?;

    let rating = submission
        .rating
        .as_ref()
        .and_then(Value::as_u64)
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| ValidationError::new("Rating must be a number between 1 and 5"))?;

    let helpful = submission
        .helpful
        .as_ref()
        .and_then(Value::as_bool)
        .ok_or_else(|| ValidationError::new("Helpful field must be a boolean"))?;

    Ok(FeedbackRecord {
        id: uuid::Uuid::new_v4().to_string(),
        session_id,
        entry_id: submission.entry_id.filter(|id| !id.is_empty()),
        rating: rating as u8,
        comments: submission.comments.filter(|c| !c.trim().is_empty()),
        helpful,
        supportive: submission.supportive.unwrap_or(false),
        accurate: submission.accurate.unwrap_or(false),
        emotional_support: submission
            .emotional_support
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "neutral".to_string()),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(body: Value) -> FeedbackSubmission {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_validateFeedback_withMinimalBody_shouldApplyDefaults() {
        let record = validate_feedback(submission(json!({
            "sessionId": "session_1",
            "rating": 5,
            "helpful": true
        })))
        .unwrap();

        assert_eq!(record.session_id, "session_1");
        assert_eq!(record.rating, 5);
        assert!(!record.supportive);
        assert_eq!(record.emotional_support, "neutral");
        assert_eq!(record.comments, None);
    }

    #[test]
    fn test_validateFeedback_withoutSession_shouldFirstReportSession() {
        let error = validate_feedback(submission(json!({ "rating": 9 }))).unwrap_err();
        assert_eq!(error.messages, vec!["Session ID is required"]);
    }

    #[test]
    fn test_validateFeedback_withBadRating_shouldReject() {
        for rating in [json!(0), json!(6), json!("4"), json!(3.5), Value::Null] {
            let error = validate_feedback(submission(json!({
                "sessionId": "s",
                "rating": rating,
                "helpful": false
            })))
            .unwrap_err();
            assert_eq!(error.to_string(), "Rating must be a number between 1 and 5");
        }
    }

    #[test]
    fn test_validateFeedback_withStringHelpful_shouldReject() {
        let error = validate_feedback(submission(json!({
            "sessionId": "s",
            "rating": 3,
            "helpful": "yes"
        })))
        .unwrap_err();
        assert_eq!(error.to_string(), "Helpful field must be a boolean");
    }
}
