//! Path-keyed trie.
//!
//! `PathTrie` stores optional values at property paths. The reactive store
//! keeps three kinds of them:
//!
//! - a subscription trie (path -> bindings depending on it),
//! - one dependency trie per binding (paths read by its last invocation),
//! - a dirty trie (paths written during the current update).
//!
//! A node may hold a value and have children at the same time: a listener can
//! depend on a property and on its sub-properties.
//!
//! # Leaves
//!
//! A leaf path is any path reaching a node with no children, whether or not
//! that node holds a value. The root of an empty trie is not a leaf. Reading
//! `corge` and then `corge.waldo` records a single leaf, `corge.waldo`.

use crate::path::Path;
use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;

/// A trie keyed by path segments.
#[derive(Clone, Debug)]
pub struct PathTrie<V> {
    children: HashMap<String, PathTrie<V>>,
    value: Option<V>,
}

/// Result of comparing the leaf paths of two tries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrieDiff {
    /// Leaf paths present only in the receiver.
    pub added: Vec<Path>,
    /// Leaf paths present only in the other trie.
    pub removed: Vec<Path>,
}

impl TrieDiff {
    /// Returns true if both tries have the same leaf paths.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl<V> Default for PathTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PathTrie<V> {
    /// Creates an empty trie.
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            value: None,
        }
    }

    /// Returns true if the trie holds no nodes and no root value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }

    /// Returns the value stored at the root, if any.
    #[inline]
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Removes every node and value.
    pub fn clear(&mut self) {
        self.children.clear();
        self.value = None;
    }

    /// Descends to `path`, creating missing nodes, and returns the value
    /// there, creating a default one if absent.
    pub fn touch(&mut self, path: &Path) -> &mut V
    where
        V: Default,
    {
        let mut node = self;
        for segment in path {
            node = node.children.entry_ref(segment).or_insert_with(PathTrie::new);
        }
        node.value.get_or_insert_with(V::default)
    }

    /// Returns the value stored exactly at `path`.
    pub fn get(&self, path: &Path) -> Option<&V> {
        self.node(path).and_then(|node| node.value.as_ref())
    }

    /// Returns a mutable reference to the value stored exactly at `path`.
    pub fn get_mut(&mut self, path: &Path) -> Option<&mut V> {
        let mut node = self;
        for segment in path {
            node = node.children.get_mut(segment)?;
        }
        node.value.as_mut()
    }

    /// Returns true if a node exists at `path`, with or without a value.
    pub fn contains_node(&self, path: &Path) -> bool {
        self.node(path).is_some()
    }

    fn node(&self, path: &Path) -> Option<&PathTrie<V>> {
        let mut node = self;
        for segment in path {
            node = node.children.get(segment)?;
        }
        Some(node)
    }

    /// Takes the value at `path` and prunes nodes along the path that are
    /// left without a value and without children.
    pub fn remove(&mut self, path: &Path) -> Option<V> {
        self.remove_segments(path.segments())
    }

    fn remove_segments(&mut self, segments: &[String]) -> Option<V> {
        let Some((head, rest)) = segments.split_first() else {
            return self.value.take();
        };
        let child = self.children.get_mut(head.as_str())?;
        let removed = child.remove_segments(rest);
        if child.is_empty() {
            self.children.remove(head.as_str());
        }
        removed
    }

    /// Returns every leaf path.
    pub fn leaves(&self) -> Vec<Path> {
        let mut leaves = Vec::new();
        if !self.children.is_empty() {
            self.collect_leaves(&mut Vec::new(), &mut leaves);
        }
        leaves
    }

    fn collect_leaves(&self, prefix: &mut Vec<String>, out: &mut Vec<Path>) {
        if self.children.is_empty() {
            out.push(Path::from(prefix.clone()));
            return;
        }
        for (name, child) in &self.children {
            prefix.push(name.clone());
            child.collect_leaves(prefix, out);
            prefix.pop();
        }
    }

    /// Returns every value in the trie, the root's first.
    pub fn values(&self) -> Vec<&V> {
        let mut values = Vec::new();
        self.collect_values(&mut values);
        values
    }

    fn collect_values<'a>(&'a self, out: &mut Vec<&'a V>) {
        if let Some(value) = &self.value {
            out.push(value);
        }
        for child in self.children.values() {
            child.collect_values(out);
        }
    }

    /// Compares the leaf paths of this trie against `other`.
    ///
    /// `added` holds the leaves only this trie has, `removed` the leaves only
    /// `other` has. A node that is a leaf on one side and has children on the
    /// other counts as a different leaf set on each side.
    pub fn diff<U>(&self, other: &PathTrie<U>) -> TrieDiff {
        let mut diff = TrieDiff::default();
        self.diff_children(other, &mut Vec::new(), &mut diff);
        diff
    }

    fn diff_children<U>(&self, other: &PathTrie<U>, prefix: &mut Vec<String>, diff: &mut TrieDiff) {
        for (name, child) in &self.children {
            prefix.push(name.clone());
            match other.children.get(name.as_str()) {
                Some(other_child) => child.diff_node(other_child, prefix, diff),
                None => child.collect_leaves(prefix, &mut diff.added),
            }
            prefix.pop();
        }
        for (name, other_child) in &other.children {
            if !self.children.contains_key(name.as_str()) {
                prefix.push(name.clone());
                other_child.collect_leaves(prefix, &mut diff.removed);
                prefix.pop();
            }
        }
    }

    fn diff_node<U>(&self, other: &PathTrie<U>, prefix: &mut Vec<String>, diff: &mut TrieDiff) {
        match (self.children.is_empty(), other.children.is_empty()) {
            (true, true) => {}
            (true, false) => {
                diff.added.push(Path::from(prefix.clone()));
                other.collect_leaves(prefix, &mut diff.removed);
            }
            (false, true) => {
                self.collect_leaves(prefix, &mut diff.added);
                diff.removed.push(Path::from(prefix.clone()));
            }
            (false, false) => self.diff_children(other, prefix, diff),
        }
    }

    /// Matches this trie of written paths against a trie of subscriptions and
    /// returns every subscription value that must be notified.
    ///
    /// Walking both tries in lock-step:
    /// - a node that was written itself means the property was replaced as a
    ///   whole, so every value in the subscription subtree matches, even when
    ///   deeper writes were recorded below it in the same batch;
    /// - a node with no children is treated the same way;
    /// - otherwise only something below was written: a value subscribed
    ///   exactly at this node matches, and the walk continues into shared
    ///   children.
    ///
    /// Sibling subscriptions of the written paths never match. An empty trie
    /// records no writes and matches nothing.
    pub fn search<'a, U>(&self, subscriptions: &'a PathTrie<U>) -> Vec<&'a U> {
        let mut found = Vec::new();
        if !self.is_empty() {
            self.search_into(subscriptions, &mut found);
        }
        found
    }

    fn search_into<'a, U>(&self, subscriptions: &'a PathTrie<U>, found: &mut Vec<&'a U>) {
        if self.value.is_some() || self.children.is_empty() {
            subscriptions.collect_values(found);
            return;
        }
        if let Some(value) = &subscriptions.value {
            found.push(value);
        }
        for (name, child) in &self.children {
            if let Some(subscribed) = subscriptions.children.get(name.as_str()) {
                child.search_into(subscribed, found);
            }
        }
    }
}
