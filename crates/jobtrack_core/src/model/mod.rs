//! Domain model for tracked job applications.
//!
//! # Responsibility
//! - Define the canonical application record and its status vocabulary.
//! - Define typed inputs for creating and patching records.
//!
//! # Invariants
//! - Every record is identified by an `ApplicationId` that is never reused.
//! - `created_at` is assigned once and never rewritten.
//! - Status iteration always follows `ApplicationStatus::ALL` order.

pub mod application;
pub mod timestamp;
