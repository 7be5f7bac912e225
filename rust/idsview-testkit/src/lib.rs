//! Test utilities for the idsview crates.
//!
//! This crate provides:
//! - Data generation: struct types and records modeled after the
//!   `core_profiles` and `wall` datasets
//! - A recording bulk loader that logs every load request
//! - A fixture wiring a memory store, the recording loader and a session
//!
//! # Usage
//!
//! This crate is intended for the test suites of the workspace only.

pub mod data_gen;
pub mod spy;

pub use data_gen::{Dataset, ProfilesGen, UnitsGen};
pub use spy::{LoadCall, RecordingLoader};
