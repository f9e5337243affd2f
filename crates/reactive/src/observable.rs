//! Observable objects and instrumented accessors.
//!
//! An observable object owns a `NotifierNode` and routes every tracked
//! property access through it: getters report a read of `[name]`, setters
//! store the value and report a write of `[name]` when it actually changed.
//! Properties holding another observable also maintain the containment tree,
//! so reads and writes inside the nested object bubble up with full paths.
//!
//! `#[derive(Observable)]` generates these accessors. The helpers below are
//! what the generated code calls, and can be used directly to write the
//! accessor pairs by hand:
//!
//! ```rust
//! use sprig_reactive::{observable, NotifierNode, Observable};
//!
//! #[derive(Default)]
//! struct Corge {
//!     node: NotifierNode,
//!     waldo: String,
//! }
//!
//! impl Corge {
//!     fn waldo(&self) -> &String {
//!         observable::read(&self.node, "waldo", &self.waldo)
//!     }
//!
//!     fn set_waldo(&mut self, value: String) -> bool {
//!         observable::write_value(&self.node, "waldo", &mut self.waldo, value)
//!     }
//! }
//!
//! impl Observable for Corge {
//!     fn notifier(&self) -> &NotifierNode {
//!         &self.node
//!     }
//! }
//!
//! let mut corge = Corge::default();
//! assert!(corge.set_waldo("hello".into()));
//! assert!(!corge.set_waldo("hello".into()));
//! assert_eq!(corge.waldo(), "hello");
//! ```

use crate::notifier::NotifierNode;
use core::mem;
use tracing::warn;

/// An object whose tracked properties report reads and writes to its node.
pub trait Observable: 'static {
    /// Returns the node this object reports through.
    fn notifier(&self) -> &NotifierNode;

    /// Attaches the nodes of nested observable properties under this object's
    /// node, recursively.
    ///
    /// Called by the store on its root and by nested setters on the value
    /// they store, so default-constructed graphs are linked before use.
    fn link_children(&self) {}
}

/// Reports a read of property `name` and returns the value.
#[inline]
pub fn read<'a, T>(node: &NotifierNode, name: &str, value: &'a T) -> &'a T {
    node.notify_read_property(name);
    value
}

/// Reports a read of property `name` and returns the value mutably.
///
/// Used to reach into a nested observable for in-place writes; replacing the
/// nested value through the returned reference bypasses the containment tree.
#[inline]
pub fn read_mut<'a, T>(node: &NotifierNode, name: &str, value: &'a mut T) -> &'a mut T {
    node.notify_read_property(name);
    value
}

/// Stores `value` into `slot` and reports the write, unless it equals the
/// current value.
///
/// Returns true if a write was reported.
pub fn write_value<T>(node: &NotifierNode, name: &str, slot: &mut T, value: T) -> bool
where
    T: PartialEq + 'static,
{
    if *slot == value {
        return false;
    }
    let old = mem::replace(slot, value);
    node.notify_write_property(name, &*slot, &old);
    true
}

/// Replaces a nested observable: detaches the old value's node, stores the
/// new value, links it under `node` as `name`, then reports the write.
///
/// A different object is always a change, so this always reports and returns
/// true.
pub fn write_nested<T: Observable>(node: &NotifierNode, name: &str, slot: &mut T, value: T) -> bool {
    slot.notifier().detach();
    let old = mem::replace(slot, value);
    link_child(node, name, slot);
    node.notify_write_property(name, &*slot, &old);
    true
}

/// Optional variant of [`write_nested`]. Writing `None` over `None` is a
/// no-op and returns false.
pub fn write_nested_option<T: Observable>(
    node: &NotifierNode,
    name: &str,
    slot: &mut Option<T>,
    value: Option<T>,
) -> bool {
    if slot.is_none() && value.is_none() {
        return false;
    }
    if let Some(old) = slot {
        old.notifier().detach();
    }
    let old = mem::replace(slot, value);
    link_child_option(node, name, slot);
    node.notify_write_property(name, &*slot, &old);
    true
}

/// Links `child` (and its own nested properties) under `node` as `name`.
pub fn link_child<T: Observable>(node: &NotifierNode, name: &str, child: &T) {
    child.link_children();
    if let Err(err) = child.notifier().attach_to(node, name) {
        warn!(%err, property = name, "nested observable left detached");
    }
}

/// Optional variant of [`link_child`].
pub fn link_child_option<T: Observable>(node: &NotifierNode, name: &str, child: &Option<T>) {
    if let Some(child) = child {
        link_child(node, name, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::Notification;
    use alloc::rc::Rc;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    #[derive(Default)]
    struct Leaf {
        node: NotifierNode,
        x: i32,
    }

    impl Leaf {
        fn with_x(x: i32) -> Self {
            Self { x, ..Self::default() }
        }

        fn set_x(&mut self, value: i32) -> bool {
            write_value(&self.node, "x", &mut self.x, value)
        }
    }

    impl Observable for Leaf {
        fn notifier(&self) -> &NotifierNode {
            &self.node
        }
    }

    #[derive(Default)]
    struct Holder {
        node: NotifierNode,
        leaf: Leaf,
        maybe: Option<Leaf>,
    }

    impl Observable for Holder {
        fn notifier(&self) -> &NotifierNode {
            &self.node
        }

        fn link_children(&self) {
            link_child(&self.node, "leaf", &self.leaf);
            link_child_option(&self.node, "maybe", &self.maybe);
        }
    }

    fn record_writes(node: &NotifierNode) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = log.clone();
        node.observe(move |n| {
            if n.is_write() {
                log_clone.borrow_mut().push(n.path().to_string());
            }
        });
        log
    }

    #[test]
    fn test_write_value_skips_equal() {
        let mut leaf = Leaf::default();
        let log = record_writes(&leaf.node);

        assert!(!leaf.set_x(0));
        assert!(leaf.set_x(5));
        assert!(!leaf.set_x(5));

        assert_eq!(*log.borrow(), vec!["x".to_string()]);
    }

    #[test]
    fn test_link_children_bubbles() {
        let mut holder = Holder::default();
        holder.link_children();
        let log = record_writes(&holder.node);

        holder.leaf.set_x(3);
        assert_eq!(*log.borrow(), vec!["leaf.x".to_string()]);
    }

    #[test]
    fn test_write_nested_reparents() {
        let mut holder = Holder::default();
        holder.link_children();
        let log = record_writes(&holder.node);

        assert!(write_nested(&holder.node, "leaf", &mut holder.leaf, Leaf::with_x(9)));
        assert_eq!(holder.leaf.node.name().as_deref(), Some("leaf"));

        holder.leaf.set_x(10);
        assert_eq!(*log.borrow(), vec!["leaf".to_string(), "leaf.x".to_string()]);
    }

    #[test]
    fn test_write_nested_then_inner_write() {
        let mut outer = Holder::default();
        outer.link_children();
        let log = record_writes(&outer.node);

        let mut replacement = Leaf::default();
        replacement.x = 1;
        write_nested(&outer.node, "leaf", &mut outer.leaf, replacement);
        outer.leaf.set_x(2);

        assert_eq!(log.borrow().last().map(String::as_str), Some("leaf.x"));
    }

    #[test]
    fn test_write_nested_option() {
        let mut holder = Holder::default();
        holder.link_children();
        let log = record_writes(&holder.node);

        assert!(!write_nested_option(&holder.node, "maybe", &mut holder.maybe, None));
        assert!(write_nested_option(&holder.node, "maybe", &mut holder.maybe, Some(Leaf::default())));
        if let Some(leaf) = holder.maybe.as_mut() {
            leaf.set_x(1);
        }
        assert!(write_nested_option(&holder.node, "maybe", &mut holder.maybe, None));

        assert_eq!(
            *log.borrow(),
            vec!["maybe".to_string(), "maybe.x".to_string(), "maybe".to_string()]
        );
    }

    #[test]
    fn test_write_passes_old_and_new() {
        let mut leaf = Leaf::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        leaf.node.observe(move |n| {
            if let Notification::Write { new, old, .. } = n {
                seen_clone.borrow_mut().push((
                    *new.downcast_ref::<i32>().unwrap(),
                    *old.downcast_ref::<i32>().unwrap(),
                ));
            }
        });

        leaf.set_x(4);
        leaf.set_x(7);
        assert_eq!(*seen.borrow(), vec![(4, 0), (7, 4)]);
    }
}
