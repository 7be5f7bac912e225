//! Structure arrays: fixed-length, integer-indexed sequences of records.

use std::{fmt, sync::Arc};

use ahash::AHashMap;
use idsview_common::{Result, error::Error, try_or_ret_some_err, verify_arg, verify_data};
use idsview_format::{path::NodePath, schema::StructTypeRef};
use idsview_ranges::{Selection, SliceSpec, normalize_index};
use log::{debug, trace};

use crate::{
    options::{LazyPolicy, ReadOptions},
    record::Record,
    slots::{Slot, SlotTable},
    source::BulkLoader,
};

/// A structure array: an ordered sequence of records of one struct type.
///
/// The number of elements is fixed at creation. An eager array holds all of
/// its records from the start. A lazy array starts with every slot unloaded
/// and fetches records through its [`BulkLoader`] when they are accessed;
/// with `cache_loaded` set, fetched records stay in the slot table and are
/// never loaded again.
///
/// `StructArray` uses an `Arc` internally, so cloning it is cheap and clones
/// share the slot table.
#[derive(Clone)]
pub struct StructArray(Arc<ArrayContext>);

struct ArrayContext {
    element_type: StructTypeRef,
    path: NodePath,
    slots: SlotTable,
    /// Present for lazy arrays only.
    loader: Option<Arc<dyn BulkLoader>>,
    lazy_policy: LazyPolicy,
    cache_loaded: bool,
}

impl StructArray {
    /// Creates an array holding `records`.
    pub fn eager(element_type: StructTypeRef, path: NodePath, records: Vec<Record>) -> StructArray {
        StructArray(Arc::new(ArrayContext {
            element_type,
            path,
            slots: SlotTable::loaded(records),
            loader: None,
            lazy_policy: LazyPolicy::default(),
            cache_loaded: true,
        }))
    }

    /// Creates an array of `len` unloaded elements that loads through `loader`.
    ///
    /// The lazy policy and caching behavior come from `options`; its load mode
    /// is ignored.
    pub fn lazy(
        element_type: StructTypeRef,
        path: NodePath,
        len: usize,
        loader: Arc<dyn BulkLoader>,
        options: &ReadOptions,
    ) -> StructArray {
        StructArray(Arc::new(ArrayContext {
            element_type,
            path,
            slots: SlotTable::unloaded(len),
            loader: Some(loader),
            lazy_policy: options.lazy_policy,
            cache_loaded: options.cache_loaded,
        }))
    }

    pub fn element_type(&self) -> &StructTypeRef {
        &self.0.element_type
    }

    /// The node path of the array, e.g. `profiles_1d[2]/ion`.
    pub fn path(&self) -> &NodePath {
        &self.0.path
    }

    /// The number of elements. Never loads.
    pub fn len(&self) -> usize {
        self.0.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_lazy(&self) -> bool {
        self.0.loader.is_some()
    }

    pub fn lazy_policy(&self) -> LazyPolicy {
        self.0.lazy_policy
    }

    /// The number of elements currently held in the slot table.
    pub fn loaded_count(&self) -> usize {
        self.0.slots.loaded_count()
    }

    /// A copy of the current slot states.
    pub fn slots(&self) -> Vec<Slot> {
        self.0.slots.snapshot()
    }

    /// Returns the element at `index`; negative values count from the end.
    ///
    /// # Errors
    ///
    /// Fails with `IndexOutOfRange` when `index` lies outside `[-len, len - 1]`,
    /// or with the loader's error when the element cannot be loaded.
    pub fn get(&self, index: isize) -> Result<Record> {
        let pos = normalize_index(index, self.len())
            .ok_or_else(|| Error::index_out_of_range(self.path().to_string(), index, self.len()))?;
        self.fetch(pos)
    }

    /// Returns the element at position `pos < len()`.
    pub fn fetch(&self, pos: usize) -> Result<Record> {
        let mut records = self.fetch_many(&[pos])?;
        records
            .pop()
            .ok_or_else(|| Error::inconsistent(self.path().to_string(), pos, "no record fetched"))
    }

    /// Returns the elements at `positions`, in order, loading every missing one
    /// in a single bulk call.
    ///
    /// Positions may repeat; each missing position is requested once.
    pub fn fetch_many(&self, positions: &[usize]) -> Result<Vec<Record>> {
        verify_arg!(positions, positions.iter().all(|&pos| pos < self.len()));

        let missing = self.0.slots.missing(positions);
        let fresh = if missing.is_empty() {
            AHashMap::new()
        } else {
            self.load(&missing)?
        };

        positions
            .iter()
            .map(|&pos| {
                self.0
                    .slots
                    .get(pos)
                    .or_else(|| fresh.get(&pos).cloned())
                    .ok_or_else(|| {
                        Error::inconsistent(
                            self.path().to_string(),
                            pos,
                            "element is neither loaded nor returned by the loader",
                        )
                    })
            })
            .collect()
    }

    /// Resolves `spec` against the array and returns the selection with the
    /// selected records.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a zero step.
    /// - `Unsupported` for a lazy array with the index-only policy.
    pub fn select(&self, spec: &SliceSpec) -> Result<(Selection, Vec<Record>)> {
        let range = spec
            .resolve(self.len())
            .ok_or_else(|| Error::invalid_arg("step", "slice step cannot be zero"))?;
        if self.is_lazy() && self.lazy_policy() == LazyPolicy::IndexOnly {
            return Err(Error::unsupported(
                format!("slice {}{spec}", self.path()),
                "the array is lazily loaded with the index-only policy",
            ));
        }
        let selection = Selection::from_range(&range);
        trace!("{}{spec} selects {} elements", self.path(), selection.len());
        let records = self.fetch_many(selection.as_slice())?;
        Ok((selection, records))
    }

    /// Iterates over the elements in index order, loading each on demand.
    pub fn iter(&self) -> StructArrayIter {
        StructArrayIter {
            array: self.clone(),
            next: 0,
        }
    }

    pub fn ptr_eq(&self, other: &StructArray) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn load(&self, indices: &[usize]) -> Result<AHashMap<usize, Record>> {
        let loader = self.0.loader.as_ref().ok_or_else(|| {
            Error::inconsistent(
                self.path().to_string(),
                indices[0],
                "unloaded slot in an eager array",
            )
        })?;

        debug!(
            "loading {} elements of {} ({:?})",
            indices.len(),
            self.path(),
            Selection::from_indices(indices.iter().copied()).runs()
        );
        let records = loader.read_many(self.path(), indices).map_err(|e| {
            Error::backend(format!("loading {} elements of {}", indices.len(), self.path()), e)
        })?;
        verify_data!(records, records.len() == indices.len());

        if self.0.cache_loaded {
            self.0.slots.fill(indices, &records);
        }
        Ok(indices.iter().copied().zip(records).collect())
    }
}

impl PartialEq for StructArray {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.path() == other.path()
                && self.element_type().name() == other.element_type().name()
                && self.slots() == other.slots())
    }
}

impl fmt::Debug for StructArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructArray")
            .field("path", &self.path().to_string())
            .field("element_type", &self.element_type().name())
            .field("len", &self.len())
            .field("lazy", &self.is_lazy())
            .finish_non_exhaustive()
    }
}

impl<'a> IntoIterator for &'a StructArray {
    type Item = Result<Record>;
    type IntoIter = StructArrayIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the elements of a [`StructArray`].
pub struct StructArrayIter {
    array: StructArray,
    next: usize,
}

impl Iterator for StructArrayIter {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.array.len() {
            return None;
        }
        let record = try_or_ret_some_err!(self.array.fetch(self.next));
        self.next += 1;
        Some(Ok(record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.array.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}
