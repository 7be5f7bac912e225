//! Flattening views into leaf lists and dense arrays.

use std::sync::Arc;

use idsview_common::{Result, error::Error};
use idsview_format::value::{NdArray, Value};
use log::debug;

use crate::{cell::Cell, shape::element_count, view::SliceView};

/// Per-field dense arrays extracted from a view of records.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArrays {
    shape: Vec<usize>,
    fields: Vec<(Arc<str>, NdArray<f64>)>,
}

impl FieldArrays {
    /// The shape of the view the fields were extracted from. Every field
    /// array starts with these dimensions.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&NdArray<f64>> {
        self.fields
            .iter()
            .find(|(field, _)| field.as_ref() == name)
            .map(|(_, array)| array)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NdArray<f64>)> {
        self.fields.iter().map(|(name, array)| (name.as_ref(), array))
    }
}

/// The dense form of a view.
#[derive(Debug, Clone, PartialEq)]
pub enum DenseArray {
    /// A view of numeric values, as one array.
    Values(NdArray<f64>),
    /// A view of records: one array per numeric leaf field.
    Fields(FieldArrays),
}

impl DenseArray {
    pub fn as_values(&self) -> Option<&NdArray<f64>> {
        match self {
            DenseArray::Values(array) => Some(array),
            DenseArray::Fields(_) => None,
        }
    }

    pub fn as_fields(&self) -> Option<&FieldArrays> {
        match self {
            DenseArray::Fields(fields) => Some(fields),
            DenseArray::Values(_) => None,
        }
    }

    pub fn into_values(self) -> Option<NdArray<f64>> {
        match self {
            DenseArray::Values(array) => Some(array),
            DenseArray::Fields(_) => None,
        }
    }
}

impl SliceView {
    /// All leaf cells, depth-first.
    pub fn leaves(&self) -> Vec<Cell> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<Cell>) {
        if self.depth() == 0 {
            out.extend(self.cells().iter().cloned());
            return;
        }
        for inner in self.cells().iter().filter_map(Cell::as_view) {
            inner.collect_leaves(out);
        }
    }

    /// All leaf values, depth-first.
    ///
    /// # Errors
    ///
    /// `KindMismatch` if the leaves are records.
    pub fn values(&self) -> Result<Vec<Value>> {
        self.leaves()
            .into_iter()
            .map(|leaf| match leaf {
                Cell::Value(value) => Ok(value),
                other => {
                    let (path, field) = self.split_label();
                    Err(Error::kind_mismatch(
                        path,
                        field,
                        format!("expected values, found a {}", other.kind_name()),
                    ))
                }
            })
            .collect()
    }

    /// Converts the view into a dense array of the view's shape.
    ///
    /// A view of numeric values becomes one array; integers are widened to
    /// `f64`. A view of records becomes one array per numeric leaf field of
    /// the element type.
    ///
    /// # Errors
    ///
    /// - `IrregularShape` if any dimension of the shape is irregular.
    /// - `KindMismatch` for non-numeric values.
    /// - Navigation errors for record fields.
    pub fn to_array(&self) -> Result<DenseArray> {
        let shape = self.shape();
        if let Some((level, lengths)) = shape.first_irregular() {
            return Err(Error::irregular_shape(self.label(), level, lengths.to_vec()));
        }
        let dims = shape.exact().unwrap_or_default();
        debug!("densifying {} as {shape}", self.label());

        let Some(element_type) = self.element_type() else {
            return self.dense_values(dims).map(DenseArray::Values);
        };

        let fields = if self.leaf_count() == 0 {
            element_type
                .numeric_fields()
                .map(|f| Ok((f.name().clone(), NdArray::new(dims.clone(), Vec::new())?)))
                .collect::<Result<Vec<_>>>()?
        } else {
            element_type
                .numeric_fields()
                .map(|f| {
                    let values = self.field(f.name())?;
                    let dims = values.shape().exact().unwrap_or_default();
                    Ok((f.name().clone(), values.dense_values(dims)?))
                })
                .collect::<Result<Vec<_>>>()?
        };
        Ok(DenseArray::Fields(FieldArrays {
            shape: dims,
            fields,
        }))
    }

    fn dense_values(&self, dims: Vec<usize>) -> Result<NdArray<f64>> {
        let shape = self.shape();
        if let Some((level, lengths)) = shape.first_irregular() {
            return Err(Error::irregular_shape(self.label(), level, lengths.to_vec()));
        }
        let per_leaf = dims[self.depth() + 1..].iter().product::<usize>();
        let leaves = self.leaves();
        let mut data = Vec::with_capacity(leaves.len() * per_leaf);
        for (pos, leaf) in leaves.iter().enumerate() {
            let Some(value) = leaf.as_value() else {
                return Err(self.malformed(pos, leaf));
            };
            if !value.append_f64(&mut data) {
                let (path, field) = self.split_label();
                return Err(Error::kind_mismatch(
                    path,
                    field,
                    format!("{} values cannot be densified", value.data_type()),
                ));
            }
            if data.len() != (pos + 1) * per_leaf {
                return Err(Error::inconsistent(
                    self.label(),
                    pos,
                    format!("{} elements, expected {per_leaf}", element_count(value)),
                ));
            }
        }
        NdArray::new(dims, data)
    }

    /// Splits `a[:].b.c` into `("a[:].b", "c")` for error reporting.
    fn split_label(&self) -> (&str, &str) {
        self.label().rsplit_once('.').unwrap_or((self.label(), ""))
    }
}
