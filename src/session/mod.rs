/*!
 * Session management module for anonymous journaling sessions.
 *
 * A session groups the entries a user writes in one visit. Sessions carry
 * no identity; the id is random and only lives in the client.
 */

pub mod manager;
pub mod models;

// Re-export main types
pub use manager::{generate_session_id, SessionManager};
pub use models::SessionSummary;
