//! Structured records and structure arrays of IDS datasets.
//!
//! A dataset is a tree of [`record::Record`]s. Fields of a record hold leaf
//! values, nested records, or [`struct_array::StructArray`]s: fixed-length,
//! integer-indexed sequences of records of one struct type.
//!
//! # Loading
//!
//! Structure arrays are read from a data store through two interfaces
//! defined in [`source`]:
//!
//! - [`source::NodeAccessor`] reads single elements and element counts;
//! - [`source::BulkLoader`] reads a set of elements in one call.
//!
//! An eager array holds all of its records from the start. A lazy array keeps
//! a slot table in which each element is either loaded or unloaded and fills
//! it on demand, according to its [`options::LazyPolicy`]:
//!
//! - *index-only*: only single-element access loads, slicing is rejected;
//! - *range-aware*: slicing resolves the selection first and loads exactly
//!   the missing selected elements with one bulk call.
//!
//! A [`session::Session`] bundles the collaborators with
//! [`options::ReadOptions`] and memoizes the arrays it opens.
//! [`memory::MemoryStore`] implements both interfaces over in-memory data.

pub mod memo;
pub mod memory;
pub mod options;
pub mod record;
pub mod session;
pub mod slots;
pub mod source;
pub mod struct_array;

#[cfg(test)]
mod test_util;

pub use options::{LazyPolicy, LoadMode, ReadOptions};
pub use record::{FieldValue, Record, RecordBuilder};
pub use session::{Session, SessionOptions};
pub use slots::Slot;
pub use source::{BulkLoader, NodeAccessor, NodeRead};
pub use struct_array::StructArray;
