//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep view layers decoupled from serialization and storage details.

pub mod application_service;
