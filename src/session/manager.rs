/*!
 * Session manager for anonymous journaling sessions.
 *
 * This module handles:
 * - Generating session identifiers
 * - Recording session starts (best effort)
 * - Ending sessions and summarizing them
 */

use anyhow::Result;
use chrono::Utc;
use log::{debug, warn};
use rand::Rng;

use crate::database::models::SessionRecord;
use crate::database::repository::Repository;

use super::models::SessionSummary;

const SESSION_SUFFIX_LEN: usize = 9;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// New session id, `session_<unix millis>_<9 base36 chars>`
pub fn generate_session_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SESSION_SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();

    format!("session_{}_{}", Utc::now().timestamp_millis(), suffix)
}

/// Session manager for handling session lifecycle
#[derive(Debug, Clone)]
pub struct SessionManager {
    /// Repository for database operations
    repo: Repository,
}

impl SessionManager {
    /// Create a new session manager with the given repository
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Get the underlying repository
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Record that `session_id` started with `total_entries` entries
    ///
    /// Storage failures are logged and swallowed.
    pub async fn start(&self, session_id: &str, total_entries: i64) {
        let record = SessionRecord::new(session_id, total_entries);

        match self.repo.create_session(&record).await {
            Ok(()) => debug!("Session {} recorded", session_id),
            Err(e) => warn!("Failed to create session {}: {}", session_id, e),
        }
    }

    /// Mark the session ended; false when unknown or already ended
    pub async fn end(&self, session_id: &str) -> Result<bool> {
        let ended = self.repo.end_session(session_id).await?;
        if ended {
            debug!("Session {} ended", session_id);
        }
        Ok(ended)
    }

    /// Summary of a session and its entries, if the session is known
    pub async fn summary(&self, session_id: &str) -> Result<Option<SessionSummary>> {
        let Some(session) = self.repo.get_session(session_id).await? else {
            return Ok(None);
        };
        let entries = self.repo.get_session_entries(session_id).await?;

        Ok(Some(SessionSummary::from_parts(&session, &entries)))
    }
}
