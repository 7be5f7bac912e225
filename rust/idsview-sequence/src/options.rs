//! Read options controlling how structure arrays are materialized.

use serde::{Deserialize, Serialize};

/// When the elements of a structure array are read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// All elements are read when the array is opened.
    #[default]
    Eager,
    /// Elements are read on demand.
    Lazy,
}

/// Which operations of a lazy structure array may trigger loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LazyPolicy {
    /// Only single-element access loads; slicing is rejected.
    IndexOnly,
    /// Slicing resolves the selection first and loads the missing elements
    /// of the selection in one bulk call.
    #[default]
    RangeAware,
}

/// Options for reading structure arrays.
///
/// Deserializes from a partial document, e.g. `{"mode": "lazy"}`; absent
/// fields take their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    pub mode: LoadMode,
    pub lazy_policy: LazyPolicy,
    /// Keep loaded elements in the array's slot table for reuse.
    pub cache_loaded: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            mode: LoadMode::Eager,
            lazy_policy: LazyPolicy::RangeAware,
            cache_loaded: true,
        }
    }
}

impl ReadOptions {
    pub fn new() -> ReadOptions {
        ReadOptions::default()
    }

    /// Shorthand for lazy mode with the default policy.
    pub fn lazy() -> ReadOptions {
        ReadOptions::default().mode(LoadMode::Lazy)
    }

    pub fn mode(mut self, mode: LoadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn lazy_policy(mut self, lazy_policy: LazyPolicy) -> Self {
        self.lazy_policy = lazy_policy;
        self
    }

    pub fn cache_loaded(mut self, cache_loaded: bool) -> Self {
        self.cache_loaded = cache_loaded;
        self
    }

    pub fn is_lazy(&self) -> bool {
        self.mode == LoadMode::Lazy
    }
}
