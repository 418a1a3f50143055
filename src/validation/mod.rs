/*!
 * Input validation for user submissions.
 *
 * - `journal`: entry length, word count, spam and crisis-language checks
 * - `feedback`: feedback submission checks
 */

pub mod feedback;
pub mod journal;

// Re-export main types
pub use feedback::{validate_feedback, FeedbackSubmission};
pub use journal::{validate_journal_content, ContentValidation, MAX_CHARS, MIN_CHARS};
