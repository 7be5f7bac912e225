//! Node types, struct schemas, leaf values and node paths of IDS datasets.
//!
//! This crate holds the static description of the data the other crates
//! navigate:
//!
//! - [`data_type`]: data dictionary type strings (`FLT_1D`, `struct_array`, ...)
//! - [`schema`]: struct types, their field lists and field kinds
//! - [`value`]: scalar and n-dimensional leaf values with their defaults
//! - [`path`]: storage addresses such as `profiles_1d[2]/ion`

pub mod data_type;
pub mod path;
pub mod schema;
pub mod value;
