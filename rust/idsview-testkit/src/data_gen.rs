//! Data generation utilities for testing.
//!
//! This module provides struct types and synthetic records shaped after two
//! datasets:
//!
//! - `core_profiles`: a `profiles_1d` structure array whose elements hold a
//!   time, a radial grid, electron profiles and a nested `ion` array, each ion
//!   holding an `element` array;
//! - `wall`: a `units` structure array whose elements hold an `element` array.

use std::sync::{Arc, LazyLock};

use idsview_format::{
    data_type::DataType,
    path::NodePath,
    schema::{StructType, StructTypeRef},
};
use idsview_sequence::{
    ReadOptions, Record, Session, SessionOptions, StructArray,
    memory::{MemoryStore, MemoryStoreBuilder},
};

use crate::spy::RecordingLoader;

static ION_ELEMENT: LazyLock<StructTypeRef> = LazyLock::new(|| {
    StructType::builder("ion_element")
        .leaf("z_n", DataType::Flt, 0)
        .leaf("a", DataType::Flt, 0)
        .leaf("atoms_n", DataType::Int, 0)
        .build()
});

static ION: LazyLock<StructTypeRef> = LazyLock::new(|| {
    StructType::builder("ion")
        .leaf("label", DataType::Str, 0)
        .leaf("z_ion", DataType::Flt, 0)
        .leaf("neutral_index", DataType::Int, 0)
        .struct_array("element", ION_ELEMENT.clone())
        .build()
});

static GRID: LazyLock<StructTypeRef> = LazyLock::new(|| {
    StructType::builder("grid")
        .leaf("rho_tor_norm", DataType::Flt, 1)
        .leaf("psi", DataType::Flt, 1)
        .build()
});

static ELECTRONS: LazyLock<StructTypeRef> = LazyLock::new(|| {
    StructType::builder("electrons")
        .leaf("temperature", DataType::Flt, 1)
        .leaf("density", DataType::Flt, 1)
        .build()
});

static PROFILE: LazyLock<StructTypeRef> = LazyLock::new(|| {
    StructType::builder("profiles_1d")
        .leaf("time", DataType::Flt, 0)
        .structure("grid", GRID.clone())
        .structure("electrons", ELECTRONS.clone())
        .struct_array("ion", ION.clone())
        .build()
});

static UNIT_ELEMENT: LazyLock<StructTypeRef> = LazyLock::new(|| {
    StructType::builder("unit_element")
        .leaf("name", DataType::Str, 0)
        .leaf("r", DataType::Flt, 0)
        .build()
});

static UNIT: LazyLock<StructTypeRef> = LazyLock::new(|| {
    StructType::builder("unit")
        .leaf("name", DataType::Str, 0)
        .struct_array("element", UNIT_ELEMENT.clone())
        .build()
});

/// Element type of `profiles_1d`.
pub fn profile_type() -> StructTypeRef {
    PROFILE.clone()
}

pub fn ion_type() -> StructTypeRef {
    ION.clone()
}

pub fn ion_element_type() -> StructTypeRef {
    ION_ELEMENT.clone()
}

pub fn grid_type() -> StructTypeRef {
    GRID.clone()
}

/// Element type of the wall `units` array.
pub fn unit_type() -> StructTypeRef {
    UNIT.clone()
}

/// Generator of `profiles_1d` records.
///
/// Profile `p` has `time = 0.1 * p`, a grid of evenly spaced `rho_tor_norm`
/// values on `[0, 1]`, and ions labelled `ion_{p}_{i}` with
/// `z_ion = 10 * p + i`. Every ion holds the same number of elements, element
/// `e` having `z_n = e + 1`.
#[derive(Debug, Clone)]
pub struct ProfilesGen {
    ion_counts: Vec<usize>,
    grid_points: Vec<usize>,
    elements_per_ion: usize,
}

impl ProfilesGen {
    /// `profile_count` profiles with 2 ions of 2 elements each and 3 grid
    /// points.
    pub fn new(profile_count: usize) -> ProfilesGen {
        ProfilesGen {
            ion_counts: vec![2; profile_count],
            grid_points: vec![3; profile_count],
            elements_per_ion: 2,
        }
    }

    /// One profile per entry, with that many ions, keeping the grid size of
    /// the first profile.
    pub fn ion_counts(mut self, ion_counts: &[usize]) -> Self {
        let grid = self.grid_points.first().copied().unwrap_or(3);
        self.ion_counts = ion_counts.to_vec();
        self.grid_points = vec![grid; ion_counts.len()];
        self
    }

    pub fn uniform_grid(mut self, points: usize) -> Self {
        self.grid_points = vec![points; self.ion_counts.len()];
        self
    }

    /// Per-profile grid sizes; must have one entry per profile.
    pub fn grid_points(mut self, grid_points: &[usize]) -> Self {
        self.grid_points = grid_points.to_vec();
        self
    }

    pub fn elements_per_ion(mut self, elements_per_ion: usize) -> Self {
        self.elements_per_ion = elements_per_ion;
        self
    }

    pub fn profile_count(&self) -> usize {
        self.ion_counts.len()
    }

    pub fn generate(&self) -> anyhow::Result<Vec<Record>> {
        anyhow::ensure!(
            self.grid_points.len() == self.ion_counts.len(),
            "{} grid sizes for {} profiles",
            self.grid_points.len(),
            self.ion_counts.len()
        );
        let root = NodePath::new("profiles_1d");
        (0..self.profile_count())
            .map(|p| self.generate_profile(root.element(p), p))
            .collect()
    }

    /// A memory store holding the generated records under `profiles_1d`.
    pub fn store(&self) -> anyhow::Result<MemoryStoreBuilder> {
        Ok(MemoryStore::builder().array("profiles_1d", profile_type(), self.generate()?))
    }

    fn generate_profile(&self, path: NodePath, p: usize) -> anyhow::Result<Record> {
        let rho = linspace(self.grid_points[p]);
        let scale = (p + 1) as f64;

        let grid = Record::builder(grid_type(), path.child("grid"))
            .set("rho_tor_norm", rho.clone())?
            .set("psi", rho.iter().map(|r| r * scale).collect::<Vec<_>>())?
            .build();
        let electrons = Record::builder(ELECTRONS.clone(), path.child("electrons"))
            .set(
                "temperature",
                rho.iter()
                    .map(|r| 1000.0 * scale * (1.0 - r))
                    .collect::<Vec<_>>(),
            )?
            .set("density", vec![1.0e19 * scale; rho.len()])?
            .build();
        let ions = (0..self.ion_counts[p])
            .map(|i| self.generate_ion(path.child("ion").element(i), p, i))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Record::builder(profile_type(), path)
            .set("time", 0.1 * p as f64)?
            .set_struct("grid", grid)?
            .set_struct("electrons", electrons)?
            .set_records("ion", ions)?
            .build())
    }

    fn generate_ion(&self, path: NodePath, p: usize, i: usize) -> anyhow::Result<Record> {
        let elements = (0..self.elements_per_ion)
            .map(|e| -> anyhow::Result<Record> {
                Ok(
                    Record::builder(ion_element_type(), path.child("element").element(e))
                        .set("z_n", (e + 1) as f64)?
                        .set("a", 2.0 * (e + 1) as f64)?
                        .set("atoms_n", (e + 1) as i64)?
                        .build(),
                )
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Record::builder(ion_type(), path)
            .set("label", format!("ion_{p}_{i}"))?
            .set("z_ion", (10 * p + i) as f64)?
            .set("neutral_index", i as i64)?
            .set_records("element", elements)?
            .build())
    }
}

/// Generator of wall `units` records: unit `u` is named `unit-{u}` and holds
/// elements named `element-{u}-{e}`.
#[derive(Debug, Clone)]
pub struct UnitsGen {
    element_counts: Vec<usize>,
}

impl UnitsGen {
    pub fn new(element_counts: &[usize]) -> UnitsGen {
        UnitsGen {
            element_counts: element_counts.to_vec(),
        }
    }

    pub fn generate(&self) -> anyhow::Result<Vec<Record>> {
        let root = NodePath::new("units");
        self.element_counts
            .iter()
            .enumerate()
            .map(|(u, &count)| -> anyhow::Result<Record> {
                let path = root.element(u);
                let elements = (0..count)
                    .map(|e| -> anyhow::Result<Record> {
                        Ok(
                            Record::builder(UNIT_ELEMENT.clone(), path.child("element").element(e))
                                .set("name", format!("element-{u}-{e}"))?
                                .set("r", u as f64 + e as f64 / 10.0)?
                                .build(),
                        )
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Ok(Record::builder(unit_type(), path)
                    .set("name", format!("unit-{u}"))?
                    .set_records("element", elements)?
                    .build())
            })
            .collect()
    }

    pub fn store(&self) -> anyhow::Result<MemoryStoreBuilder> {
        Ok(MemoryStore::builder().array("units", unit_type(), self.generate()?))
    }
}

/// A memory store wired into a session through a [`RecordingLoader`].
pub struct Dataset {
    pub store: Arc<MemoryStore>,
    pub loader: Arc<RecordingLoader>,
    pub session: Session,
}

impl Dataset {
    pub fn new(store: Arc<MemoryStore>, read_options: ReadOptions) -> Dataset {
        let loader = RecordingLoader::new(store.clone());
        let session = SessionOptions::new(store.clone(), loader.clone())
            .read_options(read_options)
            .open();
        Dataset {
            store,
            loader,
            session,
        }
    }

    /// `profiles_1d` records from `generator`, read with `read_options`.
    pub fn profiles(generator: &ProfilesGen, read_options: ReadOptions) -> anyhow::Result<Dataset> {
        Ok(Dataset::new(generator.store()?.build(), read_options))
    }

    pub fn open_profiles(&self) -> anyhow::Result<StructArray> {
        Ok(self.session.open_array_at("profiles_1d", profile_type())?)
    }

    pub fn open_units(&self) -> anyhow::Result<StructArray> {
        Ok(self.session.open_array_at("units", unit_type())?)
    }
}

fn linspace(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n).map(|k| k as f64 / (n - 1) as f64).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_profiles() {
        let records = ProfilesGen::new(3).ion_counts(&[1, 2, 3]).generate().unwrap();
        assert_eq!(records.len(), 3);
        let ion = records[2].get("ion").unwrap().as_array().unwrap();
        assert_eq!(ion.len(), 3);
        let last = ion.get(-1).unwrap();
        assert_eq!(last.value("label").unwrap().as_str(), Some("ion_2_2"));
        assert_eq!(last.path().to_string(), "profiles_1d[2]/ion[2]");
        let grid = records[0].get("grid").unwrap().as_record().unwrap();
        assert_eq!(grid.value("rho_tor_norm").unwrap().shape(), &[3]);
    }

    #[test]
    fn test_grid_size_mismatch() {
        assert!(ProfilesGen::new(2).grid_points(&[3]).generate().is_err());
    }

    #[test]
    fn test_generate_units() {
        let units = UnitsGen::new(&[2, 0]).generate().unwrap();
        assert_eq!(units[1].value("name").unwrap().as_str(), Some("unit-1"));
        assert!(units[1].get("element").unwrap().as_array().unwrap().is_empty());
    }

    #[test]
    fn test_dataset_records_loads() {
        let dataset = Dataset::profiles(&ProfilesGen::new(4), ReadOptions::lazy()).unwrap();
        let profiles = dataset.open_profiles().unwrap();
        profiles.get(1).unwrap();
        assert_eq!(dataset.loader.loaded_indices(), vec![1]);
        assert_eq!(dataset.loader.calls()[0].path, "profiles_1d");
    }
}
