//! Interfaces to the data store a session reads from.

use idsview_common::Result;
use idsview_format::path::NodePath;

use crate::record::Record;

/// Outcome of reading a single element through a [`NodeAccessor`].
#[derive(Debug, Clone)]
pub enum NodeRead {
    /// The element is materialized.
    Loaded(Record),
    /// The element exists but must be fetched with a [`BulkLoader`].
    Unloaded,
}

/// Element-level access to the structure arrays of a dataset.
///
/// Paths passed to the accessor address a structure array, e.g. `profiles_1d`
/// or `profiles_1d[2]/ion`.
pub trait NodeAccessor: Send + Sync + 'static {
    /// Returns the number of elements of the structure array at `path`.
    ///
    /// The count is fixed for the lifetime of a session and must be
    /// available without loading any element.
    fn element_count(&self, path: &NodePath) -> Result<usize>;

    /// Reads element `index` of the structure array at `path`.
    ///
    /// An accessor may return [`NodeRead::Unloaded`] for elements that are
    /// expensive to materialize one at a time; the caller then fetches them
    /// through a [`BulkLoader`].
    fn read(&self, path: &NodePath, index: usize) -> Result<NodeRead>;
}

/// Batch loading of structure array elements.
pub trait BulkLoader: Send + Sync + 'static {
    /// Loads the elements at `indices` of the structure array at `path`.
    ///
    /// # Returns
    ///
    /// The records in the order of `indices`, one per requested index.
    /// Callers treat a result of any other length as malformed data.
    ///
    /// # Errors
    ///
    /// Store failures are reported as errors and are not retried by the
    /// caller.
    fn read_many(&self, path: &NodePath, indices: &[usize]) -> Result<Vec<Record>>;
}
