//! Detection of slot writes made by other execution contexts.

use super::ChangeChannel;
use log::info;
use std::cell::Cell;

/// Tracks the last slot revision this context has accounted for.
///
/// Local writes are `acknowledge`d so they are not reported twice; any other
/// revision seen by `observe` is treated as a foreign write and published on
/// the channel exactly like a local mutation.
#[derive(Debug)]
pub struct ExternalChangeWatcher {
    channel: ChangeChannel,
    last_seen: Cell<Option<u64>>,
}

impl ExternalChangeWatcher {
    /// Creates a watcher that treats `baseline` as already seen.
    pub fn new(channel: ChangeChannel, baseline: Option<u64>) -> Self {
        Self {
            channel,
            last_seen: Cell::new(baseline),
        }
    }

    /// Records a revision produced by this context.
    pub fn acknowledge(&self, revision: Option<u64>) {
        self.last_seen.set(revision);
    }

    /// Compares `revision` with the last one seen and publishes on change.
    ///
    /// Returns whether a foreign change was detected.
    pub fn observe(&self, revision: Option<u64>) -> bool {
        let previous = self.last_seen.replace(revision);
        if previous == revision {
            return false;
        }

        info!(
            "event=external_change module=notify status=ok previous_revision={} revision={}",
            format_revision(previous),
            format_revision(revision)
        );
        self.channel.publish();
        true
    }

    pub fn last_seen(&self) -> Option<u64> {
        self.last_seen.get()
    }
}

fn format_revision(revision: Option<u64>) -> String {
    revision.map_or_else(|| "none".to_string(), |value| value.to_string())
}
