/*!
 * Tests for entry and feedback validation through the public API
 */

use serde_json::json;

use mindmosaic::admin::export::{entries_csv, escape_csv_field};
use mindmosaic::admin::ExportType;
use mindmosaic::validation::journal::{is_likely_spam, sanitize_content};
use mindmosaic::validation::{validate_feedback, validate_journal_content, FeedbackSubmission, MAX_CHARS};

#[test]
fn test_validateJournalContent_withBoundaryLengths_shouldApplyLimits() {
    let at_limit = "word ".repeat(MAX_CHARS / 5);
    assert!(validate_journal_content(&at_limit).is_valid);

    let over_limit = format!("{}x", "a ".repeat(MAX_CHARS / 2));
    let result = validate_journal_content(&over_limit);
    assert!(!result.is_valid);
    assert!(result.errors[0].contains("5000"));
}

#[test]
fn test_validateJournalContent_withShortEntry_shouldWarnAboutDetail() {
    let result = validate_journal_content("Long day at the library today.");
    assert!(result.is_valid);
    assert_eq!(result.warnings, vec!["Consider writing a bit more for better AI analysis"]);
}

#[test]
fn test_sanitizeContent_thenValidate_shouldCountCollapsedText() {
    let content = sanitize_content("   too \n\n  short   ");
    assert_eq!(content, "too short");
    assert!(!validate_journal_content(&content).is_valid);
}

#[test]
fn test_isLikelySpam_withMashing_shouldFlag() {
    assert!(is_likely_spam("aaaaaaaaaaaaaaaa"));
    assert!(!is_likely_spam("I have been sleeping badly before the finals week."));
}

#[test]
fn test_validateFeedback_withFullSubmission_shouldKeepFlags() {
    let submission: FeedbackSubmission = serde_json::from_value(json!({
        "sessionId": "session_1_abc",
        "entryId": "",
        "rating": 2,
        "helpful": false,
        "supportive": true,
        "accurate": true,
        "emotionalSupport": "better",
        "comments": "  "
    }))
    .unwrap();

    let record = validate_feedback(submission).unwrap();

    assert_eq!(record.rating, 2);
    assert!(!record.helpful);
    assert!(record.supportive && record.accurate);
    assert_eq!(record.emotional_support, "better");
    assert_eq!(record.entry_id, None);
    assert_eq!(record.comments, None);
}

#[test]
fn test_escapeCsvField_shouldQuoteOnlyWhenNeeded() {
    assert_eq!(escape_csv_field("plain"), "plain");
    assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
    assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
}

#[test]
fn test_entriesCsv_withNoEntries_shouldBeEmpty() {
    assert_eq!(entries_csv(&[], ExportType::Dataset), "");
}
