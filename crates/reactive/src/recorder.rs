//! Read recording and write batching.
//!
//! A `Tracker` is fed by the root observable's notifications. Reads are
//! recorded into the trie of the binding currently running, if any; writes
//! are recorded into the dirty trie until the enclosing update collects them.

use crate::notifier::Notification;
use core::cell::RefCell;
use sprig_core::PathTrie;

/// Recording slot and dirty trie of one store.
#[derive(Default)]
pub(crate) struct Tracker {
    recording: RefCell<Option<PathTrie<()>>>,
    dirty: RefCell<PathTrie<()>>,
}

impl Tracker {
    /// Handles a notification that reached the state root.
    pub(crate) fn record(&self, notification: &Notification<'_>) {
        match notification {
            Notification::Read { path } => {
                if let Some(trie) = self.recording.borrow_mut().as_mut() {
                    trie.touch(path);
                }
            }
            Notification::Write { path, .. } => {
                self.dirty.borrow_mut().touch(path);
            }
        }
    }

    /// Returns true while a binding is recording its reads.
    pub(crate) fn is_recording(&self) -> bool {
        self.recording.borrow().is_some()
    }

    /// Takes the paths written since the last call.
    pub(crate) fn take_dirty(&self) -> PathTrie<()> {
        core::mem::take(&mut *self.dirty.borrow_mut())
    }
}

/// Marks a binding as the current recorder for its lifetime.
///
/// The previous occupant of the slot is restored when the guard finishes, so a
/// binding created from inside a listener does not steal the outer binding's
/// reads. If the listener unwinds, the reads made so far are stored into
/// `dependencies` and the slot is restored.
pub(crate) struct RecordingGuard<'a> {
    tracker: &'a Tracker,
    outer: Option<PathTrie<()>>,
    dependencies: &'a RefCell<Option<PathTrie<()>>>,
    finished: bool,
}

impl<'a> RecordingGuard<'a> {
    pub(crate) fn begin(tracker: &'a Tracker, dependencies: &'a RefCell<Option<PathTrie<()>>>) -> Self {
        let outer = tracker.recording.replace(Some(PathTrie::new()));
        Self {
            tracker,
            outer,
            dependencies,
            finished: false,
        }
    }

    /// Stops recording and returns the recorded reads.
    pub(crate) fn finish(mut self) -> PathTrie<()> {
        self.finished = true;
        self.tracker
            .recording
            .replace(self.outer.take())
            .unwrap_or_default()
    }
}

impl Drop for RecordingGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let partial = self.tracker.recording.replace(self.outer.take());
        *self.dependencies.borrow_mut() = partial;
    }
}
