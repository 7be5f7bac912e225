//! Slice views over structure arrays.
//!
//! A [`SliceView`] selects elements of a structure array with Python-style
//! `[start:stop:step]` semantics and navigates fields across all of them at
//! once. Navigating into a nested structure array applies subsequent indexing
//! and slicing *array-wise*, to every nested array:
//!
//! ```text
//! profiles_1d[:]                  (106)        records
//! profiles_1d[:].ion              (106, ~3)    one ion view per profile
//! profiles_1d[:].ion[0]           (106)        first ion of each profile
//! profiles_1d[:].ion[0].z_ion     (106)        values
//! ```
//!
//! Views are immutable and cheap to clone. Only navigation into a lazily
//! loaded structure array reads from the data store.
//!
//! # Key Types
//!
//! - [`SliceView`] - A possibly nested view of records or values
//! - [`Cell`] - One element of a view
//! - [`Shape`] - The logical shape of a view, with irregular dimensions
//! - [`DenseArray`] - A view densified into `f64` arrays

pub mod cell;
pub mod extract;
pub mod navigate;
pub mod shape;
pub mod view;

#[cfg(test)]
mod tests;

pub use cell::Cell;
pub use extract::{DenseArray, FieldArrays};
pub use navigate::expand_array_field;
pub use shape::{Dim, Shape, resolve_shape};
pub use view::{SliceView, StructArraySlice};
