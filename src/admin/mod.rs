/*!
 * Administrator surface.
 *
 * - `auth`: login and bearer token verification
 * - `filter`: search, emotion and date filters for the entry list
 * - `export`: CSV exports and the plain-text report
 * - `feedback`: feedback aggregates and comment themes
 * - `training`: dataset statistics and simulated training
 * - `service`: the operations behind the admin routes
 */

pub mod auth;
pub mod export;
pub mod feedback;
pub mod filter;
pub mod service;
pub mod training;

// Re-export main types
pub use auth::{AdminAuth, AdminToken};
pub use export::{ExportFile, ExportType};
pub use filter::{DateRangeFilter, EntryFilter};
pub use service::{AdminService, TrainingOutput};
pub use training::TrainingAction;
