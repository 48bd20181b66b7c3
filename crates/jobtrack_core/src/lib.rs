//! Core of a local job-application tracker.
//! This crate is the single source of truth for record invariants: id
//! uniqueness, immutable creation stamps and consistency between the stored
//! collection and the statistics derived from it.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod query;
pub mod service;
pub mod stats;
pub mod storage;
pub mod store;
pub mod tracker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, TrackerConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::application::{
    Application, ApplicationId, ApplicationPatch, ApplicationStatus, ApplicationValidationError,
    NewApplication,
};
pub use notify::{ChangeChannel, ExternalChangeWatcher, Subscription};
pub use query::{deadline_is_soon, sort_by_deadline, ApplicationQuery, StatusFilter};
pub use service::application_service::{ApplicationService, ServiceError, ServiceResult};
pub use stats::{aggregate, distribution, ChartSlice, DashboardSummary, StatusCounts};
pub use storage::{MemorySlotStorage, SlotStorage, SqliteSlotStorage, StorageError, StorageResult};
pub use store::application_store::{ApplicationStore, SlotApplicationStore, DEFAULT_STORAGE_KEY};
pub use tracker::{Tracker, TrackerError, TrackerResult, TrackerService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
