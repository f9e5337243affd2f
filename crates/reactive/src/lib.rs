//! Sprig Reactive - Fine-grained reactive state store.
//!
//! This crate tracks which parts of a state tree a listener reads and re-runs
//! the listener only when one of those parts is written.
//!
//! # Core Concepts
//!
//! - `NotifierNode`: Per-object node bubbling reads and writes up the
//!   containment tree with full property paths
//! - `Observable`: Capability of objects whose accessors report to a node,
//!   usually generated with `#[derive(Observable)]`
//! - `ReactiveList` / `ReactiveMap`: Containers tracked as a whole
//! - `ReactiveStore`: Owns the state root, records listener reads and batches
//!   writes per `update`
//!
//! # Example
//!
//! ```rust
//! use sprig_reactive::{BindMode, NotifierNode, Observable, ReactiveStore};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[derive(Default, Observable)]
//! struct Corge {
//!     #[reactive(notifier)]
//!     node: NotifierNode,
//!     waldo: String,
//! }
//!
//! #[derive(Default, Observable)]
//! struct Foo {
//!     #[reactive(notifier)]
//!     node: NotifierNode,
//!     bar: String,
//!     #[reactive(nested)]
//!     corge: Corge,
//! }
//!
//! let store = ReactiveStore::new(Foo::default());
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let log_clone = log.clone();
//!
//! // Runs now, and again whenever `corge.waldo` (or `corge` itself) changes
//! let canceller = store
//!     .bind(BindMode::Dynamic, move |foo: &Foo| {
//!         log_clone.borrow_mut().push(foo.corge().waldo().clone());
//!     })
//!     .unwrap();
//!
//! store.update(|foo| foo.corge_mut().set_waldo("fred".into())).unwrap();
//! store.update(|foo| foo.set_bar("unrelated".into())).unwrap();
//! canceller.cancel();
//! store.update(|foo| foo.corge_mut().set_waldo("plugh".into())).unwrap();
//!
//! assert_eq!(*log.borrow(), vec!["", "fred"]);
//! ```

#![no_std]

extern crate alloc;
extern crate self as sprig_reactive;

mod binding;
mod config;
mod list;
mod map;
mod notifier;
pub mod observable;
mod recorder;
mod store;
mod subscription;

pub use binding::{BindMode, BindingId, Canceller};
pub use config::StoreConfig;
pub use list::{ListChange, ReactiveList};
pub use map::{MapChange, ReactiveMap};
pub use notifier::{Notification, NotifierNode, ObserverId};
pub use observable::Observable;
pub use store::ReactiveStore;
pub use subscription::{SubscriptionId, SubscriptionManager};

// Re-export commonly used types from dependencies
pub use sprig_core::{Error, Path, PathTrie, Result, TrieDiff};
pub use sprig_derive::Observable;

/// Path segment under which containers report reads and writes of their
/// contents as a whole.
pub const CONTENTS_SEGMENT: &str = "[items]";
