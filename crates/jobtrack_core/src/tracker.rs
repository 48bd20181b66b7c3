//! Composition root for embedding the tracker.
//!
//! # Responsibility
//! - Turn a `TrackerConfig` into a ready service: logging, SQLite medium,
//!   slot store, change channel.
//! - Give views one handle for CRUD, statistics and change subscription.
//!
//! # Invariants
//! - `open` validates configuration before touching the file system.
//! - All views of one `Tracker` share one `ChangeChannel`.

use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, TrackerConfig};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::logging::{init_logging, LoggingError};
use crate::notify::{ChangeChannel, Subscription};
use crate::service::application_service::ApplicationService;
use crate::storage::{SqliteSlotStorage, StorageError};
use crate::store::application_store::SlotApplicationStore;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service type used by `Tracker`.
pub type TrackerService = ApplicationService<SlotApplicationStore<SqliteSlotStorage>>;

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Failure while opening a tracker.
#[derive(Debug)]
pub enum TrackerError {
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
    Storage(StorageError),
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TrackerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ConfigError> for TrackerError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for TrackerError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for TrackerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<StorageError> for TrackerError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Opened tracker: one store, one CRUD service, one change channel.
pub struct Tracker {
    service: TrackerService,
}

impl Tracker {
    /// Opens a tracker stamping records with the system clock.
    ///
    /// # Errors
    /// - `Config` for invalid configuration.
    /// - `Logging` when file logging was requested and cannot start.
    /// - `Db` / `Storage` when the database cannot be opened or is unusable.
    pub fn open(config: &TrackerConfig) -> TrackerResult<Self> {
        Self::open_with_clock(config, Box::new(SystemClock))
    }

    /// Opens a tracker with an explicit clock.
    pub fn open_with_clock(config: &TrackerConfig, clock: Box<dyn Clock>) -> TrackerResult<Self> {
        config.validate()?;
        if let Some(log_dir) = &config.log_dir {
            init_logging(&config.log_level, log_dir)?;
        }

        let conn = match &config.db_path {
            Some(path) => open_db(path)?,
            None => open_db_in_memory()?,
        };
        let storage = SqliteSlotStorage::try_new(conn)?;
        let store = SlotApplicationStore::with_key(storage, config.storage_key.as_str())?;
        let service = ApplicationService::with_clock(store, ChangeChannel::new(), clock);

        info!(
            "event=tracker_open module=tracker status=ok mode={} key={} version={}",
            if config.db_path.is_some() { "file" } else { "memory" },
            config.storage_key,
            crate::core_version()
        );
        Ok(Self { service })
    }

    /// CRUD, statistics and external-change polling.
    pub fn service(&self) -> &TrackerService {
        &self.service
    }

    pub fn channel(&self) -> &ChangeChannel {
        self.service.channel()
    }

    /// Subscribes a view to collection changes. See `ChangeChannel::subscribe`.
    pub fn subscribe<F>(&self, key: impl Into<String>, listener: F) -> Subscription
    where
        F: Fn() + 'static,
    {
        self.service.channel().subscribe(key, listener)
    }
}
