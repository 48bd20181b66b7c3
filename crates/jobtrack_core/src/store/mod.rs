//! Persistence store for the application collection.
//!
//! # Responsibility
//! - Define the whole-collection load/save contract used by the service layer.
//! - Keep serialization and medium access out of use-case code.
//!
//! # Invariants
//! - `load` never fails; unreadable or malformed data degrades to an empty
//!   collection and is logged.
//! - `save` replaces the persisted collection as one unit and reports failure
//!   as `false`, always with an error log entry.

pub mod application_store;
