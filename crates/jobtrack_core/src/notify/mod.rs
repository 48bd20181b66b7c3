//! Change notification for collection observers.
//!
//! # Responsibility
//! - Broadcast payload-free "collection changed" signals to subscribed views.
//! - Detect writes made by other execution contexts to the same slot.
//!
//! # Invariants
//! - One listener per key; re-subscribing a key replaces, never duplicates.
//! - Listeners run against a snapshot of the listener set, so they may
//!   re-query state or (un)subscribe from inside a callback.
//! - A dropped `Subscription` only removes the registration it created.
//! - Single-threaded: channels and listeners stay on the creating thread.

mod channel;
mod watcher;

pub use channel::{ChangeChannel, Subscription};
pub use watcher::ExternalChangeWatcher;
