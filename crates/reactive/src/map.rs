//! Observable map.
//!
//! Like `ReactiveList`, a `ReactiveMap` is tracked as a whole through
//! [`CONTENTS_SEGMENT`]; per-key changes go to [`ReactiveMap::on_change`]
//! listeners only.

use crate::notifier::NotifierNode;
use crate::observable::Observable;
use crate::subscription::{SubscriptionId, SubscriptionManager};
use crate::CONTENTS_SEGMENT;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::Hash;
use hashbrown::HashMap;

/// An entry-level change to a `ReactiveMap`.
#[derive(Debug)]
pub enum MapChange<'a, K, V> {
    /// `key` now maps to `new`; `old` is the value it replaced, if any.
    Set { key: &'a K, new: &'a V, old: Option<&'a V> },
    /// These entries were removed.
    Remove { entries: &'a [(K, V)] },
}

type MapListener<K, V> = dyn Fn(&MapChange<'_, K, V>);

/// A hash map tracked as a single property.
pub struct ReactiveMap<K: 'static, V: 'static> {
    entries: HashMap<K, V>,
    node: NotifierNode,
    listeners: SubscriptionManager<MapListener<K, V>>,
}

impl<K: 'static, V: 'static> Default for ReactiveMap<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            node: NotifierNode::new(),
            listeners: SubscriptionManager::new(),
        }
    }
}

impl<K, V> ReactiveMap<K, V>
where
    K: Eq + Hash + 'static,
    V: 'static,
{
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for entry-level changes.
    pub fn on_change(&mut self, listener: impl Fn(&MapChange<'_, K, V>) + 'static) -> SubscriptionId {
        let listener: Rc<MapListener<K, V>> = Rc::new(listener);
        self.listeners.subscribe(listener)
    }

    /// Removes an entry-level listener.
    pub fn remove_change_listener(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn track(&self) {
        self.node.notify_read_property(CONTENTS_SEGMENT);
    }

    fn publish(&self, change: MapChange<'_, K, V>) {
        for listener in self.listeners.callbacks() {
            listener(&change);
        }
    }

    fn touched(&self) {
        self.node.notify_write_property(CONTENTS_SEGMENT, &self.entries, &());
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.track();
        self.entries.len()
    }

    /// Returns true if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.track();
        self.entries.is_empty()
    }

    /// Returns the value for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.track();
        self.entries.get(key)
    }

    /// Returns true if the map has an entry for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.track();
        self.entries.contains_key(key)
    }

    /// Iterates over the entries in arbitrary order.
    pub fn iter(&self) -> hashbrown::hash_map::Iter<'_, K, V> {
        self.track();
        self.entries.iter()
    }

    /// Iterates over the keys in arbitrary order.
    pub fn keys(&self) -> hashbrown::hash_map::Keys<'_, K, V> {
        self.track();
        self.entries.keys()
    }

    /// Iterates over the values in arbitrary order.
    pub fn values(&self) -> hashbrown::hash_map::Values<'_, K, V> {
        self.track();
        self.entries.values()
    }

    /// Sets `key` to `value`, returning the previous value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        K: Clone,
    {
        let old = self.entries.insert(key.clone(), value);
        if let Some(new) = self.entries.get(&key) {
            self.publish(MapChange::Set {
                key: &key,
                new,
                old: old.as_ref(),
            });
        }
        self.touched();
        old
    }

    /// Removes the entry for `key`, returning its value. Removing a missing
    /// key is not a change.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.remove_entry(key)?;
        let entries = [entry];
        self.publish(MapChange::Remove { entries: &entries });
        self.touched();
        let [(_, value)] = entries;
        Some(value)
    }

    /// Removes every entry. Clearing an empty map is not a change.
    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let entries: Vec<(K, V)> = self.entries.drain().collect();
        self.publish(MapChange::Remove { entries: &entries });
        self.touched();
    }
}

impl<K: 'static, V: 'static> Observable for ReactiveMap<K, V> {
    fn notifier(&self) -> &NotifierNode {
        &self.node
    }
}

impl<K, V> FromIterator<(K, V)> for ReactiveMap<K, V>
where
    K: Eq + Hash + 'static,
    V: 'static,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl<K: fmt::Debug + 'static, V: fmt::Debug + 'static> fmt::Debug for ReactiveMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use core::cell::RefCell;

    fn count_writes<K: 'static, V: 'static>(map: &ReactiveMap<K, V>) -> Rc<RefCell<usize>> {
        let writes = Rc::new(RefCell::new(0));
        let writes_clone = writes.clone();
        map.node.observe(move |n| {
            if n.is_write() {
                *writes_clone.borrow_mut() += 1;
            }
        });
        writes
    }

    #[test]
    fn test_insert_and_replace() {
        let mut map: ReactiveMap<String, i32> = ReactiveMap::new();
        let writes = count_writes(&map);

        assert_eq!(map.insert("dub".to_string(), 2), None);
        assert_eq!(map.insert("dub".to_string(), 3), Some(2));
        assert_eq!(map.get("dub"), Some(&3));
        assert_eq!(*RefCell::borrow(&writes), 2);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut map: ReactiveMap<String, i32> =
            [("a".to_string(), 1), ("b".to_string(), 2)].into_iter().collect();
        let writes = count_writes(&map);

        assert_eq!(map.remove("missing"), None);
        assert_eq!(*RefCell::borrow(&writes), 0);

        assert_eq!(map.remove("a"), Some(1));
        assert!(!map.contains_key("a"));
        map.clear();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(*RefCell::borrow(&writes), 2);
    }

    #[test]
    fn test_entry_events() {
        let mut map: ReactiveMap<&'static str, i32> = ReactiveMap::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = log.clone();
        map.on_change(move |change| {
            let entry = match change {
                MapChange::Set { key, new, old } => alloc::format!("set {} {:?}->{}", key, old, new),
                MapChange::Remove { entries } => alloc::format!("remove {}", entries.len()),
            };
            log_clone.borrow_mut().push(entry);
        });

        map.insert("x", 1);
        map.insert("x", 2);
        map.remove("x");
        map.insert("y", 1);
        map.insert("z", 1);
        map.clear();

        assert_eq!(
            *RefCell::borrow(&log),
            vec![
                "set x None->1",
                "set x Some(1)->2",
                "remove 1",
                "set y None->1",
                "set z None->1",
                "remove 2",
            ]
        );
    }

    #[test]
    fn test_reads_are_tracked() {
        let map: ReactiveMap<&'static str, i32> = [("a", 1)].into_iter().collect();
        let reads = Rc::new(RefCell::new(0));
        let reads_clone = reads.clone();
        map.node.observe(move |n| {
            if !n.is_write() {
                *reads_clone.borrow_mut() += 1;
            }
        });

        let _ = map.len();
        let _ = map.keys().count();
        let _ = map.values().sum::<i32>();
        let _ = map.iter().count();
        assert_eq!(*RefCell::borrow(&reads), 4);
    }
}
