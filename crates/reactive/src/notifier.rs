//! Containment tree of observable objects.
//!
//! Every observable object owns one `NotifierNode`. A nested observable links
//! its node to the node of the object holding it, under the property name, so
//! the nodes form a parent-pointer tree mirroring containment. Read and write
//! notifications raised on a node are delivered to its own observers and then
//! bubbled to the parent with the attachment name prepended, so an observer on
//! the root sees the full path from the state root.

use crate::subscription::{SubscriptionId, SubscriptionManager};
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::any::Any;
use core::cell::RefCell;
use core::fmt;
use sprig_core::{Error, Path, Result};

/// Identifier of an observer registered on a `NotifierNode`.
pub type ObserverId = SubscriptionId;

/// A read or write of a property, as seen from the node it was delivered to.
#[derive(Clone, Copy)]
pub enum Notification<'a> {
    /// A tracked getter ran.
    Read { path: &'a Path },
    /// A tracked setter stored a different value.
    Write {
        path: &'a Path,
        new: &'a (dyn Any + 'static),
        old: &'a (dyn Any + 'static),
    },
}

impl<'a> Notification<'a> {
    /// Path of the property relative to the receiving node.
    pub fn path(&self) -> &'a Path {
        match *self {
            Notification::Read { path } | Notification::Write { path, .. } => path,
        }
    }

    /// Returns true for write notifications.
    pub fn is_write(&self) -> bool {
        matches!(self, Notification::Write { .. })
    }
}

impl fmt::Debug for Notification<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Read { path } => f.debug_struct("Read").field("path", path).finish(),
            Notification::Write { path, .. } => f.debug_struct("Write").field("path", path).finish(),
        }
    }
}

type Observer = dyn Fn(&Notification<'_>);

struct ParentLink {
    node: Weak<NodeInner>,
    name: String,
}

#[derive(Default)]
struct NodeInner {
    parent: RefCell<Option<ParentLink>>,
    observers: RefCell<SubscriptionManager<Observer>>,
}

impl NodeInner {
    fn parent(&self) -> Option<(Rc<NodeInner>, String)> {
        let parent = self.parent.borrow();
        let link = parent.as_ref()?;
        Some((link.node.upgrade()?, link.name.clone()))
    }

    fn deliver(&self, notification: &Notification<'_>) {
        let observers = {
            let observers = self.observers.borrow();
            if observers.is_empty() {
                return;
            }
            observers.callbacks()
        };
        for observer in observers {
            observer(notification);
        }
    }

    fn bubble_read(&self, path: &Path) {
        self.deliver(&Notification::Read { path });
        if let Some((parent, name)) = self.parent() {
            parent.bubble_read(&path.prepend(name));
        }
    }

    fn bubble_write(&self, path: &Path, new: &(dyn Any + 'static), old: &(dyn Any + 'static)) {
        self.deliver(&Notification::Write { path, new, old });
        if let Some((parent, name)) = self.parent() {
            parent.bubble_write(&path.prepend(name), new, old);
        }
    }
}

/// Per-object node of the containment tree.
///
/// Nodes are not `Clone`: each one belongs to exactly one observable object.
/// The parent is held weakly, so dropping a container stops bubbling from the
/// objects it used to hold.
#[derive(Default)]
pub struct NotifierNode {
    inner: Rc<NodeInner>,
}

impl NotifierNode {
    /// Creates a detached node with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Links this node under `parent` as property `name`, replacing any
    /// previous parent.
    ///
    /// Fails without changing anything if `parent` is this node or one of its
    /// descendants.
    pub fn attach_to(&self, parent: &NotifierNode, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let mut current = Some(Rc::clone(&parent.inner));
        while let Some(node) = current {
            if Rc::ptr_eq(&node, &self.inner) {
                return Err(Error::cycle(name));
            }
            current = node.parent().map(|(parent, _)| parent);
        }
        *self.inner.parent.borrow_mut() = Some(ParentLink {
            node: Rc::downgrade(&parent.inner),
            name,
        });
        Ok(())
    }

    /// Clears the parent link.
    pub fn detach(&self) {
        self.inner.parent.borrow_mut().take();
    }

    /// Returns true if the node has a live parent.
    pub fn is_attached(&self) -> bool {
        self.inner.parent().is_some()
    }

    /// Returns the name this node is attached under.
    pub fn name(&self) -> Option<String> {
        self.inner.parent().map(|(_, name)| name)
    }

    /// Returns true if `other` is this node or one of its ancestors.
    pub fn is_within(&self, other: &NotifierNode) -> bool {
        let mut current = Some(Rc::clone(&self.inner));
        while let Some(node) = current {
            if Rc::ptr_eq(&node, &other.inner) {
                return true;
            }
            current = node.parent().map(|(parent, _)| parent);
        }
        false
    }

    /// Returns the path from the outermost ancestor down to this node.
    pub fn path_from_root(&self) -> Path {
        let mut names = alloc::vec::Vec::new();
        let mut current = self.inner.parent();
        while let Some((parent, name)) = current {
            names.push(name);
            current = parent.parent();
        }
        names.reverse();
        Path::from(names)
    }

    /// Registers an observer for every notification reaching this node.
    pub fn observe(&self, observer: impl Fn(&Notification<'_>) + 'static) -> ObserverId {
        let observer: Rc<Observer> = Rc::new(observer);
        self.inner.observers.borrow_mut().subscribe(observer)
    }

    /// Removes an observer. Returns true if it was registered.
    pub fn unobserve(&self, id: ObserverId) -> bool {
        self.inner.observers.borrow_mut().unsubscribe(id)
    }

    /// Returns the number of observers registered on this node.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    /// Reports a read of `path`, relative to this node.
    pub fn notify_read(&self, path: &Path) {
        self.inner.bubble_read(path);
    }

    /// Reports a write of `path`, relative to this node.
    pub fn notify_write(&self, path: &Path, new: &(dyn Any + 'static), old: &(dyn Any + 'static)) {
        self.inner.bubble_write(path, new, old);
    }

    /// Reports a read of the property `name` of this node's object.
    pub fn notify_read_property(&self, name: &str) {
        self.notify_read(&Path::from([name]));
    }

    /// Reports a write of the property `name` of this node's object.
    pub fn notify_write_property(&self, name: &str, new: &(dyn Any + 'static), old: &(dyn Any + 'static)) {
        self.notify_write(&Path::from([name]), new, old);
    }
}

impl fmt::Debug for NotifierNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifierNode")
            .field("name", &self.name())
            .field("observers", &self.observer_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    fn record(node: &NotifierNode) -> Rc<RefCell<Vec<(bool, String)>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = log.clone();
        node.observe(move |n| log_clone.borrow_mut().push((n.is_write(), n.path().to_string())));
        log
    }

    #[test]
    fn test_read_bubbles_with_prefix() {
        let root = NotifierNode::new();
        let corge = NotifierNode::new();
        corge.attach_to(&root, "corge").unwrap();

        let root_log = record(&root);
        let corge_log = record(&corge);

        corge.notify_read_property("waldo");

        assert_eq!(*corge_log.borrow(), vec![(false, "waldo".to_string())]);
        assert_eq!(*root_log.borrow(), vec![(false, "corge.waldo".to_string())]);
    }

    #[test]
    fn test_write_carries_values() {
        let root = NotifierNode::new();
        let seen = Rc::new(RefCell::new(None));
        let seen_clone = seen.clone();
        root.observe(move |n| {
            if let Notification::Write { new, old, .. } = n {
                let new = new.downcast_ref::<i32>().copied();
                let old = old.downcast_ref::<i32>().copied();
                *seen_clone.borrow_mut() = Some((new, old));
            }
        });

        root.notify_write_property("baz", &1i32, &0i32);
        assert_eq!(*seen.borrow(), Some((Some(1), Some(0))));
    }

    #[test]
    fn test_detach_stops_bubbling() {
        let root = NotifierNode::new();
        let child = NotifierNode::new();
        child.attach_to(&root, "child").unwrap();
        let log = record(&root);

        child.detach();
        child.notify_write_property("x", &(), &());

        assert!(log.borrow().is_empty());
        assert!(!child.is_attached());
    }

    #[test]
    fn test_reparent() {
        let a = NotifierNode::new();
        let b = NotifierNode::new();
        let child = NotifierNode::new();
        child.attach_to(&a, "first").unwrap();
        child.attach_to(&b, "second").unwrap();

        let a_log = record(&a);
        let b_log = record(&b);
        child.notify_read_property("x");

        assert!(a_log.borrow().is_empty());
        assert_eq!(*b_log.borrow(), vec![(false, "second.x".to_string())]);
        assert_eq!(child.name().as_deref(), Some("second"));
    }

    #[test]
    fn test_attach_rejects_cycle() {
        let a = NotifierNode::new();
        let b = NotifierNode::new();
        b.attach_to(&a, "b").unwrap();

        assert_eq!(a.attach_to(&b, "a"), Err(Error::cycle("a")));
        assert_eq!(a.attach_to(&a, "self"), Err(Error::cycle("self")));
        assert!(!a.is_attached());
    }

    #[test]
    fn test_dropped_parent_is_not_attached() {
        let child = NotifierNode::new();
        {
            let parent = NotifierNode::new();
            child.attach_to(&parent, "child").unwrap();
            assert!(child.is_attached());
        }
        assert!(!child.is_attached());
        child.notify_read_property("x");
    }

    #[test]
    fn test_path_from_root() {
        let root = NotifierNode::new();
        let mid = NotifierNode::new();
        let leaf = NotifierNode::new();
        mid.attach_to(&root, "a").unwrap();
        leaf.attach_to(&mid, "b").unwrap();

        assert_eq!(leaf.path_from_root(), Path::from(["a", "b"]));
        assert!(leaf.is_within(&root));
        assert!(!root.is_within(&leaf));
    }

    #[test]
    fn test_unobserve() {
        let node = NotifierNode::new();
        let log = Rc::new(RefCell::new(0));
        let log_clone = log.clone();
        let id = node.observe(move |_| *log_clone.borrow_mut() += 1);

        node.notify_read_property("x");
        assert!(node.unobserve(id));
        node.notify_read_property("x");

        assert_eq!(*log.borrow(), 1);
        assert_eq!(node.observer_count(), 0);
    }
}
