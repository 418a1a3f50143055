/*!
 * Administrator operations over the stored data.
 */

use anyhow::Result;
use chrono::Utc;
use log::{debug, info};
use serde::Serialize;
use std::time::Duration;

use crate::database::models::{AnalyticsData, AnonymizedEntry, CleanupReport, DailyTrend, DateRange, JournalEntryRecord, SystemMetrics};
use crate::database::repository::Repository;

use super::auth::AdminAuth;
use super::export::{self, ExportFile, ExportType};
use super::feedback::{analyze_feedback, FeedbackAnalysis};
use super::filter::EntryFilter;
use super::training::{self, ModelMetrics, TrainingAction, TrainingResults, TRAINING_DELAY};

/// Output of a training action
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TrainingOutput {
    Results(Box<TrainingResults>),
    Metrics(ModelMetrics),
}

/// Admin service over the repository, guarded by `AdminAuth` at the edge
#[derive(Debug, Clone)]
pub struct AdminService {
    repo: Repository,
    auth: AdminAuth,
    training_delay: Duration,
}

impl AdminService {
    pub fn new(repo: Repository, auth: AdminAuth) -> Self {
        Self {
            repo,
            auth,
            training_delay: TRAINING_DELAY,
        }
    }

    /// Override the simulated training time
    pub fn with_training_delay(mut self, delay: Duration) -> Self {
        self.training_delay = delay;
        self
    }

    pub fn auth(&self) -> &AdminAuth {
        &self.auth
    }

    pub async fn analytics(&self, range: Option<DateRange>) -> Result<AnalyticsData> {
        self.repo.get_analytics_data(range).await
    }

    pub async fn trends(&self, days: i64) -> Result<Vec<DailyTrend>> {
        self.repo.get_emotion_trends(None, days).await
    }

    /// Stored entries passing `filter`, newest first
    pub async fn entries(&self, filter: &EntryFilter) -> Result<Vec<JournalEntryRecord>> {
        let entries = self.repo.get_all_entries().await?;
        let total = entries.len();
        let kept = filter.apply(entries, Utc::now());
        debug!("Admin entry list: {} of {} entries", kept.len(), total);
        Ok(kept)
    }

    pub async fn metrics(&self) -> Result<SystemMetrics> {
        self.repo.get_system_metrics().await
    }

    pub async fn export_entries(&self, export_type: ExportType) -> Result<ExportFile> {
        let entries = self.repo.get_all_entries().await?;
        info!("Exporting {} entries as {}", entries.len(), export_type.as_str());
        Ok(export::export_entries(&entries, export_type))
    }

    pub async fn export_analytics(&self, range: Option<DateRange>) -> Result<ExportFile> {
        let analytics = self.repo.get_analytics_data(range).await?;
        Ok(export::export_analytics_csv(&analytics, range, Utc::now()))
    }

    pub async fn feedback_analysis(&self) -> Result<FeedbackAnalysis> {
        let feedback = self.repo.list_feedback().await?;
        Ok(analyze_feedback(&feedback))
    }

    pub async fn export_feedback(&self) -> Result<ExportFile> {
        let analysis = self.feedback_analysis().await?;
        Ok(export::export_feedback_csv(&analysis, Utc::now()))
    }

    pub async fn report(&self) -> Result<ExportFile> {
        let (analytics, feedback) = tokio::try_join!(self.analytics(None), self.feedback_analysis())?;
        Ok(export::generate_admin_report(&analytics, &feedback, Utc::now()))
    }

    /// Entries in `range` without their text
    pub async fn anonymized_entries(&self, range: DateRange) -> Result<Vec<AnonymizedEntry>> {
        self.repo.export_anonymized_data(range).await
    }

    pub async fn cleanup(&self, retention_days: u32) -> Result<CleanupReport> {
        let report = self.repo.cleanup_old_data(retention_days).await?;
        info!(
            "Retention cleanup ({} days) removed {} rows",
            retention_days,
            report.total()
        );
        Ok(report)
    }

    pub async fn run_training(&self, action: TrainingAction) -> Result<TrainingOutput> {
        match action {
            TrainingAction::AnalyzeDataset => {
                let entries = self.repo.get_all_entries().await?;
                Ok(TrainingOutput::Results(Box::new(training::analyze_dataset(&entries)?)))
            }
            TrainingAction::TrainModel => {
                let entries = self.repo.get_all_entries().await?;
                let results = training::train_model(&entries, self.training_delay).await?;
                Ok(TrainingOutput::Results(Box::new(results)))
            }
            TrainingAction::EvaluateModel => Ok(TrainingOutput::Metrics(training::evaluate_model())),
        }
    }
}
