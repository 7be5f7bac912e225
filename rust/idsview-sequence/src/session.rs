//! Sessions: the collaborators and read options used to open structure arrays.

use std::sync::Arc;

use idsview_common::{Result, error::Error};
use idsview_format::{path::NodePath, schema::StructTypeRef};
use log::debug;

use crate::{
    memo::Memo,
    options::{LoadMode, ReadOptions},
    record::Record,
    source::{BulkLoader, NodeAccessor, NodeRead},
    struct_array::StructArray,
};

/// Options for opening a [`Session`].
pub struct SessionOptions {
    accessor: Arc<dyn NodeAccessor>,
    loader: Arc<dyn BulkLoader>,
    read_options: ReadOptions,
}

impl SessionOptions {
    /// Creates session options reading through `accessor` and `loader`, with
    /// default read options.
    pub fn new(accessor: Arc<dyn NodeAccessor>, loader: Arc<dyn BulkLoader>) -> SessionOptions {
        SessionOptions {
            accessor,
            loader,
            read_options: ReadOptions::default(),
        }
    }

    pub fn read_options(mut self, read_options: ReadOptions) -> Self {
        self.read_options = read_options;
        self
    }

    pub fn open(self) -> Session {
        Session(Arc::new(SessionContext {
            accessor: self.accessor,
            loader: self.loader,
            read_options: self.read_options,
            arrays: Memo::new(),
        }))
    }
}

/// A reading session over one dataset.
///
/// Root structure arrays opened through the session are memoized by path:
/// opening the same path twice returns arrays sharing one slot table, so an
/// element is loaded at most once per session.
///
/// `Session` uses an `Arc` internally, so cloning it is cheap.
#[derive(Clone)]
pub struct Session(Arc<SessionContext>);

struct SessionContext {
    accessor: Arc<dyn NodeAccessor>,
    loader: Arc<dyn BulkLoader>,
    read_options: ReadOptions,
    arrays: Memo<NodePath, StructArray>,
}

impl Session {
    pub fn read_options(&self) -> &ReadOptions {
        &self.0.read_options
    }

    /// Opens the structure array at `path` with elements of `element_type`.
    ///
    /// In eager mode every element is read through the node accessor when the
    /// array is first opened; elements the accessor leaves unloaded are
    /// fetched with one bulk load. In lazy mode only the element count is read.
    pub fn open_array(&self, path: &NodePath, element_type: StructTypeRef) -> Result<StructArray> {
        if let Some(array) = self.0.arrays.get(path) {
            return Ok(array);
        }

        let len = self.0.accessor.element_count(path)?;
        debug!("opening {path} ({len} elements, {:?})", self.0.read_options.mode);
        let array = match self.0.read_options.mode {
            LoadMode::Lazy => StructArray::lazy(
                element_type,
                path.clone(),
                len,
                self.0.loader.clone(),
                &self.0.read_options,
            ),
            LoadMode::Eager => {
                let records = self.read_all(path, len)?;
                StructArray::eager(element_type, path.clone(), records)
            }
        };
        Ok(self.0.arrays.get_or_put(path.clone(), array))
    }

    /// Parses `path` (e.g. `profiles_1d`) and opens the array there.
    pub fn open_array_at(&self, path: &str, element_type: StructTypeRef) -> Result<StructArray> {
        self.open_array(&path.parse()?, element_type)
    }

    /// The number of distinct arrays opened so far.
    pub fn open_count(&self) -> usize {
        self.0.arrays.len()
    }

    fn read_all(&self, path: &NodePath, len: usize) -> Result<Vec<Record>> {
        let mut records = Vec::with_capacity(len);
        let mut pending = Vec::new();
        for index in 0..len {
            match self.0.accessor.read(path, index)? {
                NodeRead::Loaded(record) => records.push(Some(record)),
                NodeRead::Unloaded => {
                    records.push(None);
                    pending.push(index);
                }
            }
        }

        if !pending.is_empty() {
            debug!("bulk loading {} placeholders of {path}", pending.len());
            let loaded = self.0.loader.read_many(path, &pending).map_err(|e| {
                Error::backend(format!("loading {} placeholders of {path}", pending.len()), e)
            })?;
            if loaded.len() != pending.len() {
                return Err(Error::invalid_format(
                    path.to_string(),
                    format!(
                        "loader returned {} records for {} indices",
                        loaded.len(),
                        pending.len()
                    ),
                ));
            }
            for (index, record) in pending.into_iter().zip(loaded) {
                records[index] = Some(record);
            }
        }

        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                record.ok_or_else(|| {
                    Error::inconsistent(path.to_string(), index, "element was not read")
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("read_options", &self.0.read_options)
            .field("open_arrays", &self.open_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use idsview_common::error::ErrorKind;

    use super::*;
    use crate::{
        memory::MemoryStore,
        options::LazyPolicy,
        source::{BulkLoader, NodeAccessor},
        test_util::{profile_type, profiles},
    };

    fn session(store: Arc<MemoryStore>, read_options: ReadOptions) -> Session {
        let accessor: Arc<dyn NodeAccessor> = store.clone();
        let loader: Arc<dyn BulkLoader> = store;
        SessionOptions::new(accessor, loader)
            .read_options(read_options)
            .open()
    }

    fn store(placeholder_reads: bool) -> Arc<MemoryStore> {
        MemoryStore::builder()
            .array("profiles_1d", profile_type(), profiles(&[1, 2, 3, 4]))
            .placeholder_reads(placeholder_reads)
            .build()
    }

    #[test]
    fn test_eager_open_reads_every_element() {
        let store = store(false);
        let session = session(store.clone(), ReadOptions::default());
        let array = session.open_array_at("profiles_1d", profile_type()).unwrap();
        assert!(!array.is_lazy());
        assert_eq!(array.len(), 4);
        assert_eq!(array.loaded_count(), 4);
        assert_eq!(store.bulk_calls(), 0);
    }

    #[test]
    fn test_eager_open_batches_placeholders() {
        let store = store(true);
        let session = session(store.clone(), ReadOptions::default());
        let array = session
            .open_array(&NodePath::new("profiles_1d"), profile_type())
            .unwrap();
        assert_eq!(array.loaded_count(), 4);
        assert_eq!(store.bulk_calls(), 1);
        assert_eq!(
            array.get(3).unwrap().path().to_string(),
            "profiles_1d[3]"
        );
    }

    #[test]
    fn test_lazy_open_reads_nothing() {
        let store = store(false);
        let options = ReadOptions::lazy().lazy_policy(LazyPolicy::IndexOnly);
        let session = session(store.clone(), options.clone());
        assert_eq!(session.read_options(), &options);
        let array = session.open_array_at("profiles_1d", profile_type()).unwrap();
        assert!(array.is_lazy());
        assert_eq!(array.lazy_policy(), LazyPolicy::IndexOnly);
        assert_eq!(array.loaded_count(), 0);
        assert_eq!(store.bulk_calls(), 0);
    }

    #[test]
    fn test_open_is_memoized() {
        let session = session(store(false), ReadOptions::lazy());
        let a = session.open_array_at("profiles_1d", profile_type()).unwrap();
        a.get(2).unwrap();
        let b = session.open_array_at("profiles_1d", profile_type()).unwrap();
        assert!(a.ptr_eq(&b));
        assert_eq!(b.loaded_count(), 1);
        assert_eq!(session.open_count(), 1);
    }

    #[test]
    fn test_open_unknown_path() {
        let session = session(store(false), ReadOptions::default());
        let err = session.open_array_at("wall", profile_type()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
        assert!(session.open_array_at("a[", profile_type()).is_err());
        assert_eq!(session.open_count(), 0);
    }
}
