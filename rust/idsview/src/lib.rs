//! # idsview: sliceable views over IDS structure arrays
//!
//! An IDS (Interface Data Structure) is a typed tree of structures and
//! structure arrays holding scientific measurement data. This crate exposes
//! such trees through composable, shape-aware views that load array elements
//! on demand.
//!
//! ## Module Organization
//!
//! * [`common`] - Error type and `Result` alias shared across components
//! * [`format`] - Data types, struct types, leaf values and node paths
//! * [`sequence`] - Records, structure arrays, read options and sessions
//! * [`slice`] - Slice views, navigation, shapes and dense extraction
//!
//! ### Support Modules
//!
//! * [`support::ranges`] - `[start:stop:step]` arithmetic and selections
//!
//! ## Getting Started
//!
//! A [`sequence::Session`] is opened over a [`sequence::NodeAccessor`] and a
//! [`sequence::BulkLoader`] supplied by the storage backend. Root structure
//! arrays opened through it are sliced into views:
//!
//! ```no_run
//! use idsview::prelude::*;
//!
//! fn ion_charges(session: &Session, profile_type: StructTypeRef) -> Result<DenseArray> {
//!     let profiles = session.open_array_at("profiles_1d", profile_type)?;
//!     profiles.slice(SliceSpec::full().with_step(2))?
//!         .navigate("ion[0]/z_ion")?
//!         .to_array()
//! }
//! ```

pub use idsview_common as common;
pub use idsview_format as format;
pub use idsview_sequence as sequence;
pub use idsview_slice as slice;

pub mod support {
    pub use idsview_ranges as ranges;
}

/// The types needed to open, slice and navigate a dataset.
pub mod prelude {
    pub use idsview_common::{
        Result,
        error::{Error, ErrorCategory, ErrorKind},
    };
    pub use idsview_format::{
        path::NodePath,
        schema::{StructType, StructTypeRef},
        value::{NdArray, Value},
    };
    pub use idsview_ranges::SliceSpec;
    pub use idsview_sequence::{
        BulkLoader, LazyPolicy, LoadMode, NodeAccessor, NodeRead, ReadOptions, Record, Session,
        SessionOptions, StructArray,
    };
    pub use idsview_slice::{Cell, DenseArray, Shape, SliceView, StructArraySlice};
}

#[cfg(test)]
mod tests {
    use idsview_testkit::{Dataset, ProfilesGen};

    use super::prelude::*;

    #[test]
    fn test_prelude_round_trip() -> anyhow::Result<()> {
        let options: ReadOptions = ReadOptions::lazy();
        let dataset = Dataset::profiles(&ProfilesGen::new(6), options)?;
        let profiles: StructArray = dataset.open_profiles()?;
        let z_ion = profiles
            .slice(SliceSpec::full().with_step(2))?
            .navigate("ion[0]/z_ion")?;
        assert_eq!(z_ion.shape().to_string(), "(3)");
        let dense = z_ion.to_array()?;
        assert_eq!(
            dense.as_values().map(|a| a.as_slice().to_vec()),
            Some(vec![0.0, 20.0, 40.0])
        );
        assert_eq!(dataset.loader.loaded_indices(), vec![0, 2, 4]);
        Ok(())
    }
}
