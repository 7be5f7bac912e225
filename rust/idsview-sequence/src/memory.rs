//! An in-memory data store implementing both collaborator interfaces.

use std::sync::{
    Arc, Weak,
    atomic::{AtomicUsize, Ordering},
};

use ahash::AHashMap;
use idsview_common::{Result, error::Error};
use idsview_format::{path::NodePath, schema::StructTypeRef};
use log::trace;

use crate::{
    options::ReadOptions,
    record::{FieldValue, Record},
    source::{BulkLoader, NodeAccessor, NodeRead},
    struct_array::StructArray,
};

/// A data store over in-memory record trees.
///
/// Root structure arrays are registered by name; nested arrays are addressed
/// by node path, e.g. `profiles_1d[2]/ion` or `description_2d[0]/limiter/unit`.
///
/// Two options shape what readers see:
/// - with `placeholder_reads`, [`NodeAccessor::read`] reports every element
///   as unloaded, so eager sessions go through the bulk loader;
/// - with `lazy_children`, every structure array nested in a returned record
///   is handed out as a lazy array loading back through this store.
pub struct MemoryStore {
    arrays: AHashMap<Arc<str>, StructArray>,
    placeholder_reads: bool,
    lazy_children: Option<ReadOptions>,
    bulk_calls: AtomicUsize,
    this: Weak<MemoryStore>,
}

impl MemoryStore {
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder::default()
    }

    /// The number of `read_many` calls served so far.
    pub fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::Relaxed)
    }

    fn resolve(&self, path: &NodePath) -> Result<StructArray> {
        let not_an_array =
            || Error::invalid_arg("path", format!("{path} does not address a structure array"));

        let (first, rest) = path.segments().split_first().ok_or_else(not_an_array)?;
        let root = self.arrays.get(&first.name).ok_or_else(not_an_array)?;
        let mut node = match first.index {
            Some(index) => FieldValue::Struct(fetch_checked(root, index)?),
            None => FieldValue::Array(root.clone()),
        };

        for segment in rest {
            let record = match &node {
                FieldValue::Struct(record) => record.clone(),
                _ => return Err(not_an_array()),
            };
            node = match (record.get(&segment.name), segment.index) {
                (Some(FieldValue::Array(array)), Some(index)) => {
                    FieldValue::Struct(fetch_checked(array, index)?)
                }
                (Some(FieldValue::Array(array)), None) => FieldValue::Array(array.clone()),
                (Some(FieldValue::Struct(nested)), None) => FieldValue::Struct(nested.clone()),
                _ => return Err(not_an_array()),
            };
        }

        match node {
            FieldValue::Array(array) => Ok(array),
            _ => Err(not_an_array()),
        }
    }

    fn hand_out(&self, record: Record, path: NodePath) -> Result<Record> {
        let Some(options) = &self.lazy_children else {
            return Ok(record);
        };
        let loader: Arc<dyn BulkLoader> = self
            .this
            .upgrade()
            .ok_or_else(|| Error::invalid_operation("read from a dropped memory store"))?;
        Ok(make_children_lazy(&record, &path, &loader, options))
    }
}

fn fetch_checked(array: &StructArray, index: usize) -> Result<Record> {
    if index >= array.len() {
        return Err(Error::index_out_of_range(
            array.path().to_string(),
            index as isize,
            array.len(),
        ));
    }
    array.fetch(index)
}

/// Rebuilds `record` with each nested structure array replaced by a lazy
/// array of the same length, recursing into `structure` fields.
fn make_children_lazy(
    record: &Record,
    path: &NodePath,
    loader: &Arc<dyn BulkLoader>,
    options: &ReadOptions,
) -> Record {
    let values = record
        .iter()
        .map(|(field, value)| match value {
            FieldValue::Array(array) => FieldValue::Array(StructArray::lazy(
                array.element_type().clone(),
                path.child(field.name()),
                array.len(),
                loader.clone(),
                options,
            )),
            FieldValue::Struct(nested) => FieldValue::Struct(make_children_lazy(
                nested,
                &path.child(field.name()),
                loader,
                options,
            )),
            FieldValue::Value(_) => value.clone(),
        })
        .collect();
    Record::from_parts(record.schema().clone(), record.path().clone(), values)
}

impl NodeAccessor for MemoryStore {
    fn element_count(&self, path: &NodePath) -> Result<usize> {
        Ok(self.resolve(path)?.len())
    }

    fn read(&self, path: &NodePath, index: usize) -> Result<NodeRead> {
        let array = self.resolve(path)?;
        if self.placeholder_reads {
            if index >= array.len() {
                return Err(Error::index_out_of_range(
                    path.to_string(),
                    index as isize,
                    array.len(),
                ));
            }
            return Ok(NodeRead::Unloaded);
        }
        let record = fetch_checked(&array, index)?;
        Ok(NodeRead::Loaded(self.hand_out(record, path.element(index))?))
    }
}

impl BulkLoader for MemoryStore {
    fn read_many(&self, path: &NodePath, indices: &[usize]) -> Result<Vec<Record>> {
        self.bulk_calls.fetch_add(1, Ordering::Relaxed);
        trace!("memory store: {} elements of {path}", indices.len());
        let array = self.resolve(path)?;
        indices
            .iter()
            .map(|&index| {
                let record = fetch_checked(&array, index)?;
                self.hand_out(record, path.element(index))
            })
            .collect()
    }
}

#[derive(Default)]
pub struct MemoryStoreBuilder {
    arrays: AHashMap<Arc<str>, StructArray>,
    placeholder_reads: bool,
    lazy_children: Option<ReadOptions>,
}

impl MemoryStoreBuilder {
    /// Registers a root structure array named `name`.
    pub fn array(mut self, name: &str, element_type: StructTypeRef, records: Vec<Record>) -> Self {
        let array = StructArray::eager(element_type, NodePath::new(name), records);
        self.arrays.insert(Arc::from(name), array);
        self
    }

    pub fn placeholder_reads(mut self, placeholder_reads: bool) -> Self {
        self.placeholder_reads = placeholder_reads;
        self
    }

    /// Hands out nested structure arrays as lazy arrays with `options`.
    pub fn lazy_children(mut self, options: ReadOptions) -> Self {
        self.lazy_children = Some(options);
        self
    }

    pub fn build(self) -> Arc<MemoryStore> {
        Arc::new_cyclic(|this| MemoryStore {
            arrays: self.arrays,
            placeholder_reads: self.placeholder_reads,
            lazy_children: self.lazy_children,
            bulk_calls: AtomicUsize::new(0),
            this: this.clone(),
        })
    }
}
