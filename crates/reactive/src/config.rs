//! Store configuration.

use crate::binding::BindMode;
use alloc::string::String;

/// Configuration for a `ReactiveStore`.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Label attached to every log event of the store (default: "store")
    pub name: String,
    /// Remove subscription nodes whose binding set becomes empty (default: true)
    pub prune_subscriptions: bool,
    /// Mode used by `ReactiveStore::watch` (default: `BindMode::Dynamic`)
    pub default_mode: BindMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: String::from("store"),
            prune_subscriptions: true,
            default_mode: BindMode::Dynamic,
        }
    }
}

impl StoreConfig {
    /// Creates a default configuration with the given store name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
