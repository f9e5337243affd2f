//! Sprig Core - Path tries and shared types for the Sprig reactive state engine.
//!
//! This crate provides the data structures behind fine-grained dependency
//! tracking:
//!
//! - `Path`: An ordered list of property names from the state root
//! - `PathTrie<V>`: A segment-keyed trie with `touch`, `diff` and `search`
//! - `TrieDiff`: Leaf paths added and removed between two tries
//! - `Error`: Error types for store operations
//!
//! # Example
//!
//! ```rust
//! use sprig_core::{Path, PathTrie};
//!
//! // Paths read by a listener
//! let mut reads: PathTrie<()> = PathTrie::new();
//! reads.touch(&Path::parse("corge.waldo"));
//!
//! // Subscriptions keyed by those paths
//! let mut subscriptions: PathTrie<Vec<&str>> = PathTrie::new();
//! for path in reads.leaves() {
//!     subscriptions.touch(&path).push("listener");
//! }
//!
//! // Replacing `corge` as a whole reaches the listener reading below it
//! let mut dirty: PathTrie<()> = PathTrie::new();
//! dirty.touch(&Path::parse("corge"));
//! assert_eq!(dirty.search(&subscriptions), vec![&vec!["listener"]]);
//! ```

#![no_std]

extern crate alloc;

mod error;
mod path;
pub mod trie;

pub use error::{Error, Result};
pub use path::Path;
pub use trie::{PathTrie, TrieDiff};
