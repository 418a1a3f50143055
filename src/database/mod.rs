/*!
 * Database module for persistent storage of journal data.
 *
 * This module provides SQLite-based persistence for:
 * - Journal entries with their analysis results
 * - Anonymous sessions and user feedback
 * - Daily analytics metrics
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use models::{DateRange, MAX_RANGE_DAYS, FeedbackRecord, JournalEntryRecord, NewJournalEntry, SessionRecord};
pub use repository::Repository;
