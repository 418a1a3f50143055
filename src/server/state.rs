/*!
 * Shared state of the HTTP handlers.
 */

use anyhow::{Context, Result};
use log::{info, warn};
use std::sync::Arc;

use crate::admin::{AdminAuth, AdminService};
use crate::analysis::{EmotionDetector, ResponseGenerator};
use crate::app_config::Config;
use crate::database::{DatabaseConnection, Repository};
use crate::journal_service::JournalService;
use crate::providers::replicate::Replicate;
use crate::providers::together::Together;

#[derive(Debug, Clone)]
pub struct AppState {
    pub journal: JournalService,
    pub admin: AdminService,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(journal: JournalService, admin: AdminService) -> Self {
        Self { journal, admin }
    }

    /// Open storage and build vendor clients from the configuration
    ///
    /// A vendor without credentials is replaced by its offline fallback.
    pub fn from_config(config: &Config) -> Result<Self> {
        let connection =
            DatabaseConnection::open(config.database.explicit_path()).context("Failed to open database")?;
        info!("Using database at {}", connection.path().display());
        let repo = Repository::new(connection);

        Ok(Self::new(
            JournalService::new(repo.clone(), build_detector(config), build_responder(config)),
            AdminService::new(repo, AdminAuth::new(&config.admin)),
        ))
    }
}

pub fn build_detector(config: &Config) -> EmotionDetector {
    let replicate = Replicate::new(&config.emotion);
    if replicate.is_configured() {
        EmotionDetector::new(Arc::new(replicate))
    } else {
        warn!("Emotion detection running on keywords only");
        EmotionDetector::keyword_only()
    }
}

pub fn build_responder(config: &Config) -> ResponseGenerator {
    let together = Together::new(&config.generation);
    if together.is_configured() {
        ResponseGenerator::new(Arc::new(together))
    } else {
        warn!("Response generation running offline");
        ResponseGenerator::offline()
    }
}
