//! Reactive store: owns the state root, the subscription trie and the
//! tracker fed by the root's notifications.

use crate::binding::{BindMode, BindingId, Canceller, DependencyBinding};
use crate::config::StoreConfig;
use crate::observable::Observable;
use crate::recorder::Tracker;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;
use hashbrown::{HashMap, HashSet};
use sprig_core::{Error, Path, PathTrie, Result};
use tracing::{debug, trace};

type BindingSet<S> = HashMap<BindingId, Rc<DependencyBinding<S>>>;

pub(crate) struct StoreInner<S: 'static> {
    pub(crate) config: StoreConfig,
    pub(crate) state: RefCell<S>,
    pub(crate) tracker: Rc<Tracker>,
    subscriptions: RefCell<PathTrie<BindingSet<S>>>,
    next_binding_id: Cell<BindingId>,
}

impl<S: 'static> StoreInner<S> {
    pub(crate) fn subscribe(&self, path: &Path, binding: &Rc<DependencyBinding<S>>) {
        self.subscriptions
            .borrow_mut()
            .touch(path)
            .insert(binding.id, Rc::clone(binding));
    }

    pub(crate) fn unsubscribe(&self, path: &Path, id: BindingId) {
        let mut subscriptions = self.subscriptions.borrow_mut();
        let Some(set) = subscriptions.get_mut(path) else {
            return;
        };
        set.remove(&id);
        if set.is_empty() && self.config.prune_subscriptions {
            subscriptions.remove(path);
        }
    }
}

/// Store for one observable state tree.
///
/// Listeners bound with [`bind`](Self::bind) run once immediately; the paths
/// they read are recorded, and every later [`update`](Self::update) that
/// writes one of those paths (or an ancestor or descendant of one) runs them
/// again, once per update.
///
/// # Example
///
/// ```rust
/// use sprig_reactive::{BindMode, NotifierNode, Observable, ReactiveStore};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// #[derive(Default, Observable)]
/// struct Counter {
///     #[reactive(notifier)]
///     node: NotifierNode,
///     count: i32,
/// }
///
/// let store = ReactiveStore::new(Counter::default());
/// let seen = Rc::new(Cell::new(0));
/// let seen_clone = seen.clone();
/// store
///     .bind(BindMode::Dynamic, move |state: &Counter| seen_clone.set(*state.count()))
///     .unwrap();
///
/// store.update(|state| state.set_count(3)).unwrap();
/// assert_eq!(seen.get(), 3);
/// ```
pub struct ReactiveStore<S: Observable> {
    inner: Rc<StoreInner<S>>,
}

impl<S: Observable> ReactiveStore<S> {
    /// Creates a store with the default configuration.
    pub fn new(state: S) -> Self {
        Self::with_config(state, StoreConfig::default())
    }

    /// Creates a store with the given configuration.
    ///
    /// Links the nested observables of `state` and starts listening to the
    /// notifications reaching its root.
    pub fn with_config(state: S, config: StoreConfig) -> Self {
        state.link_children();
        let tracker = Rc::new(Tracker::default());
        let feed = Rc::clone(&tracker);
        state.notifier().observe(move |notification| feed.record(notification));
        debug!(store = %config.name, "store created");
        Self {
            inner: Rc::new(StoreInner {
                config,
                state: RefCell::new(state),
                tracker,
                subscriptions: RefCell::new(PathTrie::new()),
                next_binding_id: Cell::new(0),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Binds `listener` to the state and runs it once.
    ///
    /// Fails with [`Error::BindDuringUpdate`] when called from inside an
    /// update mutator.
    pub fn bind(&self, mode: BindMode, listener: impl Fn(&S) + 'static) -> Result<Canceller<S>> {
        let id = self.inner.next_binding_id.get();
        self.inner.next_binding_id.set(id + 1);
        let binding = Rc::new(DependencyBinding::new(
            id,
            mode,
            Box::new(listener),
            Rc::downgrade(&self.inner),
        ));
        debug!(store = %self.inner.config.name, binding = id, ?mode, "bind");
        binding.invoke()?;
        Ok(Canceller::new(binding))
    }

    /// Binds `listener` with the configured default mode.
    pub fn watch(&self, listener: impl Fn(&S) + 'static) -> Result<Canceller<S>> {
        self.bind(self.inner.config.default_mode, listener)
    }

    /// Runs `mutator` on the state, then runs every binding depending on a
    /// written path, in creation order.
    ///
    /// Fails with [`Error::ReentrantUpdate`] when called while a binding is
    /// recording or while the state is borrowed.
    ///
    /// If `mutator` panics, the writes it made before panicking stay pending
    /// and their readers run at the end of the next update.
    pub fn update<R>(&self, mutator: impl FnOnce(&mut S) -> R) -> Result<R> {
        let inner = &self.inner;
        if inner.tracker.is_recording() {
            return Err(Error::reentrant_update());
        }
        let result = {
            let mut state = inner
                .state
                .try_borrow_mut()
                .map_err(|_| Error::reentrant_update())?;
            mutator(&mut *state)
        };

        let dirty = inner.tracker.take_dirty();
        if dirty.is_empty() {
            trace!(store = %inner.config.name, "update wrote nothing");
            return Ok(result);
        }

        let triggered: BTreeMap<BindingId, Rc<DependencyBinding<S>>> = {
            let subscriptions = inner.subscriptions.borrow();
            dirty
                .search(&*subscriptions)
                .into_iter()
                .flat_map(|set| set.iter().map(|(id, binding)| (*id, Rc::clone(binding))))
                .collect()
        };
        debug!(
            store = %inner.config.name,
            dirty = dirty.leaves().len(),
            triggered = triggered.len(),
            "update"
        );

        for binding in triggered.values() {
            binding.invoke()?;
        }
        Ok(result)
    }

    /// Runs `f` with shared access to the state.
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> Result<R> {
        let state = self
            .inner
            .state
            .try_borrow()
            .map_err(|_| Error::reentrant_update())?;
        Ok(f(&*state))
    }

    /// Drops every subscription without cancelling the bindings.
    ///
    /// The bindings never run again; cancelling them afterwards does nothing.
    pub fn clear_bindings(&self) {
        let cleared = self.binding_count();
        *self.inner.subscriptions.borrow_mut() = PathTrie::new();
        debug!(store = %self.inner.config.name, cleared, "bindings cleared");
    }

    /// Returns the number of bindings subscribed exactly at `path`.
    pub fn subscriber_count(&self, path: &Path) -> usize {
        self.inner
            .subscriptions
            .borrow()
            .get(path)
            .map_or(0, HashMap::len)
    }

    /// Returns the number of bindings subscribed to at least one path.
    pub fn binding_count(&self) -> usize {
        let subscriptions = self.inner.subscriptions.borrow();
        subscriptions
            .values()
            .into_iter()
            .flat_map(|set| set.keys().copied())
            .collect::<HashSet<BindingId>>()
            .len()
    }
}

impl<S: Observable> Clone for ReactiveStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Observable> fmt::Debug for ReactiveStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveStore")
            .field("name", &self.inner.config.name)
            .field("bindings", &self.binding_count())
            .finish()
    }
}
