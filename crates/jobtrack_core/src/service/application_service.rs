//! Application CRUD use-case service.
//!
//! # Responsibility
//! - Provide list/get/add/update/delete over the persisted collection.
//! - Assign ids and timestamps.
//! - Publish one change notification per successful mutation.
//!
//! # Invariants
//! - Every operation is a whole-collection read-modify-write through
//!   `ApplicationStore`; no partial updates.
//! - Generated ids never collide with an id already in the collection.
//! - Notifications fire only after `save` succeeded, exactly once.
//! - Mutations start from `ApplicationStore::try_load`; an unreadable medium
//!   aborts the mutation instead of saving over records it could not see.
//! - Not-found updates and deletes write nothing and notify no one.

use crate::clock::{Clock, SystemClock};
use crate::model::application::{Application, ApplicationId, ApplicationPatch, NewApplication};
use crate::notify::{ChangeChannel, ExternalChangeWatcher};
use crate::stats::{aggregate, DashboardSummary, StatusCounts};
use crate::store::application_store::ApplicationStore;
use chrono::{DateTime, SubsecRound, Utc};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Use-case level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The collection could not be read; nothing was written.
    LoadFailed {
        operation: &'static str,
        /// Another context held the medium; retrying later may succeed.
        busy: bool,
    },
    /// The store rejected the write; the previous collection is still persisted.
    PersistFailed { operation: &'static str },
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadFailed { operation, busy } => {
                write!(f, "failed to read applications during {operation}")?;
                if *busy {
                    write!(f, " (storage busy)")?;
                }
                Ok(())
            }
            Self::PersistFailed { operation } => {
                write!(f, "failed to persist applications during {operation}")
            }
        }
    }
}

impl Error for ServiceError {}

/// CRUD engine over one `ApplicationStore`.
pub struct ApplicationService<S: ApplicationStore> {
    store: S,
    channel: ChangeChannel,
    watcher: ExternalChangeWatcher,
    clock: Box<dyn Clock>,
}

impl<S: ApplicationStore> ApplicationService<S> {
    /// Creates a service stamping records with the system clock.
    pub fn new(store: S, channel: ChangeChannel) -> Self {
        Self::with_clock(store, channel, Box::new(SystemClock))
    }

    /// Creates a service with an explicit clock.
    ///
    /// The store's current revision is taken as already seen, so only writes
    /// made after construction count as external changes.
    pub fn with_clock(store: S, channel: ChangeChannel, clock: Box<dyn Clock>) -> Self {
        let watcher = ExternalChangeWatcher::new(channel.clone(), store.revision());
        Self {
            store,
            channel,
            watcher,
            clock,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Channel this service publishes mutations on.
    pub fn channel(&self) -> &ChangeChannel {
        &self.channel
    }

    /// Returns the collection as persisted, in insertion order.
    pub fn list(&self) -> Vec<Application> {
        self.store.load()
    }

    /// Finds one application by id.
    pub fn get(&self, id: &ApplicationId) -> Option<Application> {
        self.store
            .load()
            .into_iter()
            .find(|application| &application.id == id)
    }

    /// Appends a new application and returns the stored record.
    ///
    /// # Errors
    /// - `ServiceError::LoadFailed` when the collection cannot be read.
    /// - `ServiceError::PersistFailed` when the store rejects the write.
    pub fn add(&self, input: NewApplication) -> ServiceResult<Application> {
        let mut applications = self.load_for("add")?;
        let id = unique_id(&applications);
        let application = Application::create(id, input, self.now());
        applications.push(application.clone());

        self.persist("add", &applications)?;
        info!(
            "event=application_add module=service status=ok id={} count={}",
            application.id,
            applications.len()
        );
        Ok(application)
    }

    /// Merges `patch` into the application with `id`.
    ///
    /// Returns `Ok(None)` when no application has that id; nothing is written.
    ///
    /// # Errors
    /// - `ServiceError::LoadFailed` when the collection cannot be read.
    /// - `ServiceError::PersistFailed` when the store rejects the write.
    pub fn update(
        &self,
        id: &ApplicationId,
        patch: &ApplicationPatch,
    ) -> ServiceResult<Option<Application>> {
        let mut applications = self.load_for("update")?;
        let now = self.now();
        let Some(record) = applications
            .iter_mut()
            .find(|application| &application.id == id)
        else {
            info!("event=application_update module=service status=not_found id={id}");
            return Ok(None);
        };

        record.apply_patch(patch, now);
        let updated = record.clone();

        self.persist("update", &applications)?;
        info!("event=application_update module=service status=ok id={id}");
        Ok(Some(updated))
    }

    /// Removes the application with `id` and returns the remaining collection.
    ///
    /// Deleting a missing id is a no-op: nothing is written and no
    /// notification is published.
    ///
    /// # Errors
    /// - `ServiceError::LoadFailed` when the collection cannot be read.
    /// - `ServiceError::PersistFailed` when the store rejects the write.
    pub fn delete(&self, id: &ApplicationId) -> ServiceResult<Vec<Application>> {
        let mut applications = self.load_for("delete")?;
        let before = applications.len();
        applications.retain(|application| &application.id != id);

        if applications.len() == before {
            info!("event=application_delete module=service status=noop id={id}");
            return Ok(applications);
        }

        self.persist("delete", &applications)?;
        info!(
            "event=application_delete module=service status=ok id={} count={}",
            id,
            applications.len()
        );
        Ok(applications)
    }

    /// Per-status counts over the current collection.
    pub fn statistics(&self) -> StatusCounts {
        aggregate(&self.list())
    }

    /// Dashboard read model over the current collection.
    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::from_applications(&self.list())
    }

    /// Publishes a notification if another context wrote the collection since
    /// this service last looked.
    pub fn poll_external_changes(&self) -> bool {
        self.watcher.observe(self.store.revision())
    }

    fn load_for(&self, operation: &'static str) -> ServiceResult<Vec<Application>> {
        self.store.try_load().map_err(|err| {
            error!(
                "event=application_{operation} module=service status=error error_code=load_failed busy={}",
                err.is_busy()
            );
            ServiceError::LoadFailed {
                operation,
                busy: err.is_busy(),
            }
        })
    }

    fn persist(&self, operation: &'static str, applications: &[Application]) -> ServiceResult<()> {
        if !self.store.save(applications) {
            error!(
                "event=application_{operation} module=service status=error error_code=persist_failed count={}",
                applications.len()
            );
            return Err(ServiceError::PersistFailed { operation });
        }

        self.watcher.acknowledge(self.store.revision());
        self.channel.publish();
        Ok(())
    }

    // Persisted timestamps carry milliseconds; truncate so returned records
    // compare equal to what a later load yields.
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }
}

fn unique_id(existing: &[Application]) -> ApplicationId {
    loop {
        let candidate = ApplicationId::generate();
        if !existing.iter().any(|application| application.id == candidate) {
            return candidate;
        }
    }
}
