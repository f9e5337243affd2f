//! Callback registries.
//!
//! This module provides subscription IDs and a manager for the callback lists
//! kept by notifier nodes (read/write notifications) and by containers
//! (item-level change events).

use alloc::rc::Rc;
use alloc::vec::Vec;

/// Unique identifier for a subscription within one manager.
pub type SubscriptionId = u64;

/// Manages an ordered list of callbacks.
///
/// `F` is the unsized callback type, e.g. `dyn Fn(&Notification<'_>)`.
/// Callbacks are stored behind `Rc` so that a notification pass can work on a
/// snapshot while callbacks subscribe or unsubscribe.
pub struct SubscriptionManager<F: ?Sized> {
    /// Active subscriptions, in registration order
    subscriptions: Vec<(SubscriptionId, Rc<F>)>,
    /// Next subscription ID to assign
    next_id: SubscriptionId,
}

impl<F: ?Sized> Default for SubscriptionManager<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> SubscriptionManager<F> {
    /// Creates a new subscription manager.
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 1,
        }
    }

    /// Registers a callback.
    ///
    /// Returns the subscription ID that can be used to unsubscribe.
    pub fn subscribe(&mut self, callback: Rc<F>) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscriptions.push((id, callback));
        id
    }

    /// Unsubscribes by ID.
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|(sub_id, _)| *sub_id != id);
        self.subscriptions.len() != before
    }

    /// Returns a snapshot of the registered callbacks, in registration order.
    pub fn callbacks(&self) -> Vec<Rc<F>> {
        self.subscriptions
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect()
    }

    /// Returns the number of active subscriptions.
    #[inline]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns true if there are no subscriptions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}
