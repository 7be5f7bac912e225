//! Index arithmetic for slicing fixed-length sequences.
//!
//! This crate provides the range semantics shared by structure arrays and slice
//! views:
//!
//! - **Slice specifications**: optional `start`, `stop` and `step` bounds with
//!   exclusive stop, negative indices counted from the end and clamping of
//!   out-of-bounds values
//! - **Strided ranges**: a specification resolved against a concrete length
//! - **Selections**: ordered, cheaply-cloneable lists of source indices that
//!   compose (a selection of a selection is again a selection)
//!
//! # Key Types
//!
//! - [`SliceSpec`] - An unresolved `[start:stop:step]` specification
//! - [`StridedRange`] - A specification resolved against a length
//! - [`Selection`] - The ordered source indices a view was built from

pub mod selection;
pub mod slice_spec;

pub use selection::Selection;
pub use slice_spec::{SliceSpec, StridedRange, normalize_index};
