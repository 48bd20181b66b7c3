//! Keyed observer registry with RAII subscriptions.

use log::debug;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};

type Listener = Rc<dyn Fn()>;

struct Registration {
    generation: u64,
    listener: Listener,
}

#[derive(Default)]
struct ChannelState {
    listeners: BTreeMap<String, Registration>,
    next_generation: u64,
}

/// Cloneable handle to one notification channel.
///
/// Clones publish to and subscribe on the same listener set. Listeners get
/// no payload; they are expected to re-read whatever state they display.
/// The channel is confined to the thread that created it.
#[derive(Clone, Default)]
pub struct ChangeChannel {
    state: Rc<RefCell<ChannelState>>,
}

impl ChangeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` under `key`, replacing any listener with that key.
    ///
    /// The listener stays registered until the returned guard is dropped,
    /// `Subscription::unsubscribe` is called, or `ChangeChannel::unsubscribe`
    /// removes the key.
    pub fn subscribe<F>(&self, key: impl Into<String>, listener: F) -> Subscription
    where
        F: Fn() + 'static,
    {
        let key = key.into();
        let mut state = self.state.borrow_mut();
        state.next_generation += 1;
        let generation = state.next_generation;
        let replaced = state
            .listeners
            .insert(
                key.clone(),
                Registration {
                    generation,
                    listener: Rc::new(listener),
                },
            )
            .is_some();
        let listeners = state.listeners.len();
        drop(state);

        debug!(
            "event=channel_subscribe module=notify status=ok key={} replaced={} listeners={}",
            key, replaced, listeners
        );

        Subscription {
            state: Rc::downgrade(&self.state),
            key,
            generation,
            attached: true,
        }
    }

    /// Removes the listener registered under `key`.
    ///
    /// Returns whether a listener was removed; repeated calls are no-ops.
    pub fn unsubscribe(&self, key: &str) -> bool {
        let removed = self.state.borrow_mut().listeners.remove(key).is_some();
        if removed {
            debug!("event=channel_unsubscribe module=notify status=ok key={key}");
        }
        removed
    }

    /// Calls every registered listener once and returns how many were called.
    pub fn publish(&self) -> usize {
        let listeners = self
            .state
            .borrow()
            .listeners
            .values()
            .map(|registration| Rc::clone(&registration.listener))
            .collect::<Vec<_>>();

        for listener in &listeners {
            listener();
        }

        debug!(
            "event=channel_publish module=notify status=ok notified={}",
            listeners.len()
        );
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn is_subscribed(&self, key: &str) -> bool {
        self.state.borrow().listeners.contains_key(key)
    }
}

impl Debug for ChangeChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeChannel")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Guard for one listener registration.
///
/// Dropping the guard unsubscribes, unless the key has since been taken over
/// by a newer registration.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    state: Weak<RefCell<ChannelState>>,
    key: String,
    generation: u64,
    attached: bool,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Unsubscribes now. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {}

    /// Keeps the listener registered for the lifetime of the channel.
    pub fn detach(mut self) {
        self.attached = false;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.attached {
            return;
        }
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let mut state = state.borrow_mut();
        let owns_key = state
            .listeners
            .get(&self.key)
            .is_some_and(|registration| registration.generation == self.generation);
        if owns_key {
            state.listeners.remove(&self.key);
        }
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("generation", &self.generation)
            .finish()
    }
}
