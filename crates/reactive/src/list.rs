//! Observable list.
//!
//! `ReactiveList` takes part in dependency tracking as a whole: every read
//! accessor reports a read of [`CONTENTS_SEGMENT`] and every structural
//! mutation reports exactly one write of it. Item-level changes are published
//! separately through [`ReactiveList::on_change`] for consumers that want to
//! apply them incrementally.

use crate::notifier::NotifierNode;
use crate::observable::Observable;
use crate::subscription::{SubscriptionId, SubscriptionManager};
use crate::CONTENTS_SEGMENT;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

/// An item-level change to a `ReactiveList`.
#[derive(Debug)]
pub enum ListChange<'a, T> {
    /// The item at `index` was replaced.
    Set { index: usize, new: &'a T, old: &'a T },
    /// `items` were inserted starting at `index`.
    Insert { index: usize, items: &'a [T] },
    /// `items` were removed starting at `index`.
    Remove { index: usize, items: &'a [T] },
    /// A predicate removed `removed` items.
    Retain { removed: usize },
    /// Every item was removed.
    Clear { items: &'a [T] },
}

type ListListener<T> = dyn Fn(&ListChange<'_, T>);

/// A `Vec`-backed list tracked as a single property.
pub struct ReactiveList<T: 'static> {
    items: Vec<T>,
    node: NotifierNode,
    listeners: SubscriptionManager<ListListener<T>>,
}

impl<T: 'static> Default for ReactiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> From<Vec<T>> for ReactiveList<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items,
            node: NotifierNode::new(),
            listeners: SubscriptionManager::new(),
        }
    }
}

impl<T: 'static> ReactiveList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    /// Registers a listener for item-level changes.
    pub fn on_change(&mut self, listener: impl Fn(&ListChange<'_, T>) + 'static) -> SubscriptionId {
        let listener: Rc<ListListener<T>> = Rc::new(listener);
        self.listeners.subscribe(listener)
    }

    /// Removes an item-level listener.
    pub fn remove_change_listener(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn track(&self) {
        self.node.notify_read_property(CONTENTS_SEGMENT);
    }

    fn publish(&self, change: ListChange<'_, T>) {
        for listener in self.listeners.callbacks() {
            listener(&change);
        }
    }

    fn touched(&self) {
        self.node.notify_write_property(CONTENTS_SEGMENT, &self.items, &());
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.track();
        self.items.len()
    }

    /// Returns true if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.track();
        self.items.is_empty()
    }

    /// Returns the item at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.track();
        self.items.get(index)
    }

    /// Returns the items as a slice.
    pub fn as_slice(&self) -> &[T] {
        self.track();
        &self.items
    }

    /// Iterates over the items.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Returns true if the list contains `item`.
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.as_slice().contains(item)
    }

    /// Returns the index of the first item equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.as_slice().iter().position(|candidate| candidate == item)
    }

    /// Copies the items into a `Vec`.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.as_slice().to_vec()
    }

    /// Appends an item.
    pub fn push(&mut self, item: T) {
        let index = self.items.len();
        self.items.push(item);
        self.publish(ListChange::Insert {
            index,
            items: &self.items[index..],
        });
        self.touched();
    }

    /// Appends every item of `items` as one change. Appending nothing is not a
    /// change.
    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        let index = self.items.len();
        self.items.extend(items);
        if self.items.len() == index {
            return;
        }
        self.publish(ListChange::Insert {
            index,
            items: &self.items[index..],
        });
        self.touched();
    }

    /// Inserts an item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, item: T) {
        self.items.insert(index, item);
        self.publish(ListChange::Insert {
            index,
            items: &self.items[index..=index],
        });
        self.touched();
    }

    /// Inserts every item of `items` at `index` as one change.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_many(&mut self, index: usize, items: impl IntoIterator<Item = T>) {
        let before = self.items.len();
        self.items.splice(index..index, items);
        let inserted = self.items.len() - before;
        if inserted == 0 {
            return;
        }
        self.publish(ListChange::Insert {
            index,
            items: &self.items[index..index + inserted],
        });
        self.touched();
    }

    /// Replaces the item at `index`, returning the old one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn set(&mut self, index: usize, item: T) -> T {
        let old = core::mem::replace(&mut self.items[index], item);
        self.publish(ListChange::Set {
            index,
            new: &self.items[index],
            old: &old,
        });
        self.touched();
        old
    }

    /// Removes and returns the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        let item = self.items.remove(index);
        self.publish(ListChange::Remove {
            index,
            items: core::slice::from_ref(&item),
        });
        self.touched();
        item
    }

    /// Removes the first item equal to `item`. Returns false, without
    /// reporting a change, if there is none.
    pub fn remove_item(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        match self.items.iter().position(|candidate| candidate == item) {
            Some(index) => {
                self.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the items in `range`.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn remove_range(&mut self, range: Range<usize>) -> Vec<T> {
        let index = range.start;
        let removed: Vec<T> = self.items.drain(range).collect();
        if removed.is_empty() {
            return removed;
        }
        self.publish(ListChange::Remove {
            index,
            items: &removed,
        });
        self.touched();
        removed
    }

    /// Keeps only the items matching `keep`. Returns how many were removed.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(keep);
        let removed = before - self.items.len();
        if removed > 0 {
            self.publish(ListChange::Retain { removed });
            self.touched();
        }
        removed
    }

    /// Removes every item. Clearing an empty list is not a change.
    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let items = core::mem::take(&mut self.items);
        self.publish(ListChange::Clear { items: &items });
        self.touched();
    }
}

impl<T: 'static> Observable for ReactiveList<T> {
    fn notifier(&self) -> &NotifierNode {
        &self.node
    }
}

impl<'a, T: 'static> IntoIterator for &'a ReactiveList<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for ReactiveList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}
