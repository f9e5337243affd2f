//! Listener bindings and their recorded dependencies.

use crate::recorder::RecordingGuard;
use crate::store::StoreInner;
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use sprig_core::{Error, Path, PathTrie, Result};
use tracing::{debug, trace};

/// Identifier of a binding, unique within its store and increasing in
/// creation order.
pub type BindingId = u64;

/// How a binding maintains its dependencies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BindMode {
    /// Record dependencies on the first invocation only.
    Static,
    /// Re-record dependencies on every invocation.
    #[default]
    Dynamic,
}

pub(crate) type Listener<S> = Box<dyn Fn(&S)>;

/// A listener together with the paths it read during its last recorded
/// invocation.
pub(crate) struct DependencyBinding<S: 'static> {
    pub(crate) id: BindingId,
    mode: BindMode,
    listener: Listener<S>,
    store: Weak<StoreInner<S>>,
    dependencies: RefCell<Option<PathTrie<()>>>,
    cancelled: Cell<bool>,
}

impl<S: 'static> DependencyBinding<S> {
    pub(crate) fn new(id: BindingId, mode: BindMode, listener: Listener<S>, store: Weak<StoreInner<S>>) -> Self {
        Self {
            id,
            mode,
            listener,
            store,
            dependencies: RefCell::new(None),
            cancelled: Cell::new(false),
        }
    }

    /// Runs the listener against the current state and, unless the binding is
    /// static and already initialized, re-subscribes it to exactly the paths
    /// it read.
    ///
    /// Does nothing once cancelled or after the store was dropped.
    pub(crate) fn invoke(self: &Rc<Self>) -> Result<()> {
        if self.cancelled.get() {
            return Ok(());
        }
        let Some(store) = self.store.upgrade() else {
            return Ok(());
        };
        let state = store
            .state
            .try_borrow()
            .map_err(|_| Error::bind_during_update())?;

        if self.mode == BindMode::Static && self.dependencies.borrow().is_some() {
            trace!(store = %store.config.name, binding = self.id, "invoking static binding");
            (self.listener)(&*state);
            return Ok(());
        }

        trace!(store = %store.config.name, binding = self.id, "recording binding");
        let previous = self.dependencies.borrow_mut().take().unwrap_or_default();
        let guard = RecordingGuard::begin(&store.tracker, &self.dependencies);
        (self.listener)(&*state);
        let recorded = guard.finish();
        drop(state);

        if self.cancelled.get() {
            // Cancelled by its own listener: cancel() saw no dependencies.
            for path in previous.leaves() {
                store.unsubscribe(&path, self.id);
            }
            return Ok(());
        }

        let diff = recorded.diff(&previous);
        for path in &diff.added {
            store.subscribe(path, self);
        }
        for path in &diff.removed {
            store.unsubscribe(path, self.id);
        }
        if !diff.is_empty() {
            trace!(
                store = %store.config.name,
                binding = self.id,
                added = diff.added.len(),
                removed = diff.removed.len(),
                "dependencies changed"
            );
        }
        *self.dependencies.borrow_mut() = Some(recorded);
        Ok(())
    }

    /// Unsubscribes from every recorded path and marks the binding defunct.
    pub(crate) fn cancel(&self) {
        if self.cancelled.replace(true) {
            return;
        }
        let dependencies = self.dependencies.borrow_mut().take();
        let Some(store) = self.store.upgrade() else {
            return;
        };
        if let Some(dependencies) = dependencies {
            for path in dependencies.leaves() {
                store.unsubscribe(&path, self.id);
            }
        }
        debug!(store = %store.config.name, binding = self.id, "binding cancelled");
    }

    fn dependency_paths(&self) -> Vec<Path> {
        self.dependencies
            .borrow()
            .as_ref()
            .map(PathTrie::leaves)
            .unwrap_or_default()
    }
}

/// Handle returned by `ReactiveStore::bind`.
///
/// Dropping the handle does not cancel the binding.
pub struct Canceller<S: 'static> {
    binding: Rc<DependencyBinding<S>>,
}

impl<S: 'static> Canceller<S> {
    pub(crate) fn new(binding: Rc<DependencyBinding<S>>) -> Self {
        Self { binding }
    }

    /// Removes the binding from every path it depends on. Idempotent.
    pub fn cancel(&self) {
        self.binding.cancel();
    }

    /// Returns true once `cancel` was called.
    pub fn is_cancelled(&self) -> bool {
        self.binding.cancelled.get()
    }

    /// Returns the leaf paths the binding currently depends on.
    pub fn dependencies(&self) -> Vec<Path> {
        self.binding.dependency_paths()
    }

    /// Returns the binding's identifier.
    pub fn id(&self) -> BindingId {
        self.binding.id
    }

    /// Returns the mode the binding was created with.
    pub fn mode(&self) -> BindMode {
        self.binding.mode
    }
}

impl<S: 'static> Clone for Canceller<S> {
    fn clone(&self) -> Self {
        Self {
            binding: Rc::clone(&self.binding),
        }
    }
}

impl<S: 'static> fmt::Debug for Canceller<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canceller")
            .field("id", &self.binding.id)
            .field("mode", &self.binding.mode)
            .field("cancelled", &self.binding.cancelled.get())
            .finish()
    }
}
