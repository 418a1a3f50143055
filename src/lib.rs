/*!
 * # MindMosaic
 *
 * Backend of an anonymous journaling service for university students.
 *
 * ## Features
 *
 * - Emotion and sentiment detection through a hosted prediction API, with a
 *   keyword heuristic when the vendor is unavailable
 * - Supportive replies from an OpenAI-compatible chat API, split into a main
 *   message and suggestions
 * - Risk assessment and crisis resources
 * - Anonymous sessions, entries and feedback stored in SQLite
 * - Admin analytics, CSV exports, a text report and simulated model training
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management
 * - `providers`: Vendor clients (`replicate`, `together`) and test doubles
 * - `analysis`: Emotion detection, keyword fallback, trends and replies
 * - `validation`: Journal text and feedback validation
 * - `database`: SQLite connection, schema and repository
 * - `session`: Anonymous session ids and summaries
 * - `journal_service`: Submission and analysis flows
 * - `admin`: Authentication, filters, exports, feedback and training
 * - `server`: axum routes
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod admin;
pub mod analysis;
pub mod app_config;
pub mod database;
pub mod errors;
pub mod journal_service;
pub mod providers;
pub mod server;
pub mod session;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use database::Repository;
pub use errors::{AdminError, AppError, ProviderError, ValidationError};
pub use journal_service::JournalService;
pub use server::{build_router, AppState};
