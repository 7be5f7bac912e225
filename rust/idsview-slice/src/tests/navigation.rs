//! Array-wise navigation through `profiles_1d[:].ion` and wall units.

use idsview_common::error::{ErrorCategory, ErrorKind};
use idsview_format::value::Value;
use idsview_ranges::SliceSpec;
use idsview_sequence::ReadOptions;
use idsview_testkit::{Dataset, ProfilesGen, UnitsGen};

use crate::{cell::Cell, view::StructArraySlice};

fn labels(values: Vec<Value>) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| v.as_str())
        .map(str::to_string)
        .collect()
}

fn ion_labels(cell: &Cell) -> Vec<String> {
    let view = cell.as_view().expect("nested view");
    view.iter()
        .map(|c| {
            let record = c.as_record().expect("ion record");
            record.value("label").and_then(|v| v.as_str()).unwrap_or_default().to_string()
        })
        .collect()
}

#[test]
fn test_labels_are_depth_first() -> anyhow::Result<()> {
    let generator = ProfilesGen::new(3).ion_counts(&[1, 2, 3]);
    let profiles = Dataset::profiles(&generator, ReadOptions::default())?.open_profiles()?;
    let label = profiles.view()?.field("ion")?.field("label")?;
    assert_eq!(label.depth(), 1);
    assert_eq!(label.len(), 3);
    assert_eq!(label.leaf_count(), 6);
    assert_eq!(
        labels(label.values()?),
        vec!["ion_0_0", "ion_1_0", "ion_1_1", "ion_2_0", "ion_2_1", "ion_2_2"]
    );
    assert_eq!(label.label(), "profiles_1d[:].ion[:].label");
    Ok(())
}

#[test]
fn test_index_applies_to_every_nested_array() -> anyhow::Result<()> {
    let generator = ProfilesGen::new(3).ion_counts(&[1, 2, 3]);
    let profiles = Dataset::profiles(&generator, ReadOptions::default())?.open_profiles()?;
    let ion = profiles.view()?.field("ion")?;

    let first = ion.get(0)?;
    let first = first.as_view().expect("view");
    assert_eq!(first.depth(), 0);
    assert_eq!(first.len(), 3);
    assert_eq!(
        labels(first.field("label")?.values()?),
        vec!["ion_0_0", "ion_1_0", "ion_2_0"]
    );

    let last = ion.get(-1)?;
    assert_eq!(ion_labels(&last), vec!["ion_0_0", "ion_1_1", "ion_2_2"]);
    assert_eq!(last.as_view().map(|v| v.label()), Some("profiles_1d[:].ion[:][-1]"));
    Ok(())
}

#[test]
fn test_slice_applies_to_every_nested_array() -> anyhow::Result<()> {
    let generator = ProfilesGen::new(3).ion_counts(&[1, 2, 3]);
    let profiles = Dataset::profiles(&generator, ReadOptions::default())?.open_profiles()?;
    let ion = profiles.view()?.field("ion")?;

    let head = ion.slice(..2)?;
    assert_eq!(head.depth(), 1);
    assert_eq!(head.len(), 3);
    let lengths = head.iter().filter_map(Cell::as_view).map(|v| v.len()).collect::<Vec<_>>();
    assert_eq!(lengths, vec![1, 2, 2]);

    let even = ion.slice(SliceSpec::full().with_step(2))?;
    assert_eq!(
        labels(even.field("label")?.values()?),
        vec!["ion_0_0", "ion_1_0", "ion_2_0", "ion_2_2"]
    );
    Ok(())
}

#[test]
fn test_index_error_names_the_short_array() -> anyhow::Result<()> {
    let generator = ProfilesGen::new(3).ion_counts(&[3, 1, 3]);
    let profiles = Dataset::profiles(&generator, ReadOptions::default())?.open_profiles()?;
    let ion = profiles.view()?.field("ion")?;

    assert_eq!(ion_labels(&ion.get(0)?).len(), 3);
    let err = ion.get(2).unwrap_err();
    match err.kind() {
        ErrorKind::IndexOutOfRange { path, index, len } => {
            assert_eq!(path, "profiles_1d[1]/ion[:]");
            assert_eq!(*index, 2);
            assert_eq!(*len, 1);
        }
        other => panic!("unexpected error {other:?}"),
    }
    Ok(())
}

#[test]
fn test_outer_and_inner_slices_compose() -> anyhow::Result<()> {
    let generator = ProfilesGen::new(10).ion_counts(&[3; 10]);
    let profiles = Dataset::profiles(&generator, ReadOptions::default())?.open_profiles()?;
    let view = profiles
        .slice(SliceSpec::full().with_step(2))?
        .field("ion")?
        .slice(..2)?;
    assert_eq!(view.shape().to_string(), "(5, 2)");
    assert_eq!(view.selection().as_slice(), &[0, 2, 4, 6, 8]);

    let z_ion = view.field("z_ion")?.to_array()?;
    let z_ion = z_ion.as_values().expect("values");
    assert_eq!(z_ion.shape(), &[5, 2]);
    assert_eq!(z_ion.get(&[3, 1]), Some(&61.0));
    Ok(())
}

#[test]
fn test_structure_fields_keep_the_nesting() -> anyhow::Result<()> {
    let generator = ProfilesGen::new(5).uniform_grid(3);
    let profiles = Dataset::profiles(&generator, ReadOptions::default())?.open_profiles()?;
    let grid = profiles.view()?.field("grid")?;
    assert_eq!(grid.depth(), 0);
    assert_eq!(grid.element_type().map(|t| t.name().to_string()), Some("grid".into()));

    let rho = grid.field("rho_tor_norm")?;
    assert_eq!(rho.shape().to_string(), "(5, 3)");
    let dense = rho.to_array()?;
    let dense = dense.as_values().expect("values");
    assert_eq!(dense.shape(), &[5, 3]);
    assert_eq!(dense.get(&[4, 2]), Some(&1.0));
    assert_eq!(dense.get(&[4, 1]), Some(&0.5));
    Ok(())
}

#[test]
fn test_navigate_paths() -> anyhow::Result<()> {
    let generator = ProfilesGen::new(3).ion_counts(&[1, 2, 3]);
    let profiles = Dataset::profiles(&generator, ReadOptions::default())?.open_profiles()?;
    let view = profiles.view()?;

    let chained = view.field("ion")?.field("element")?.field("z_n")?;
    assert_eq!(view.navigate("ion/element/z_n")?, chained);
    assert_eq!(view.navigate("ion.element.z_n")?, chained);

    let first = view.navigate("ion[0].label")?;
    assert_eq!(first.depth(), 0);
    assert_eq!(labels(first.values()?), vec!["ion_0_0", "ion_1_0", "ion_2_0"]);

    let err = view.navigate("ion/charge").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Attribute);
    Ok(())
}

#[test]
fn test_flatten() -> anyhow::Result<()> {
    let generator = ProfilesGen::new(3).ion_counts(&[1, 2, 3]);
    let profiles = Dataset::profiles(&generator, ReadOptions::default())?.open_profiles()?;
    let ion = profiles.view()?.field("ion")?;
    let flat = ion.flatten();
    assert_eq!(flat.depth(), 0);
    assert_eq!(flat.len(), 6);
    let fourth = flat.get(3)?;
    let label = fourth.as_record().and_then(|r| r.value("label")).and_then(|v| v.as_str());
    assert_eq!(label, Some("ion_2_0"));
    Ok(())
}

#[test]
fn test_wall_units_with_empty_element_arrays() -> anyhow::Result<()> {
    let store = UnitsGen::new(&[2, 0, 3]).store()?.build();
    let units = Dataset::new(store, ReadOptions::default()).open_units()?;
    let element = units.view()?.field("element")?;
    assert_eq!(element.shape().to_string(), "(3, ~2)");
    assert_eq!(element.leaf_count(), 5);

    let names = element.field("name")?;
    assert_eq!(
        labels(names.values()?),
        vec!["element-0-0", "element-0-1", "element-2-0", "element-2-1", "element-2-2"]
    );

    let err = element.get(0).unwrap_err();
    match err.kind() {
        ErrorKind::IndexOutOfRange { path, len, .. } => {
            assert_eq!(path, "units[1]/element[:]");
            assert_eq!(*len, 0);
        }
        other => panic!("unexpected error {other:?}"),
    }

    // units without elements can be sliced away
    let r = units.slice(SliceSpec::full().with_step(2))?.navigate("element[0]/r")?;
    assert_eq!(r.to_array()?.as_values().map(|a| a.as_slice().to_vec()), Some(vec![0.0, 2.0]));
    Ok(())
}

#[test]
fn test_expand_array_field() -> anyhow::Result<()> {
    let generator = ProfilesGen::new(2).ion_counts(&[1, 2]);
    let profiles = Dataset::profiles(&generator, ReadOptions::default())?.open_profiles()?;
    let view = profiles.view()?;

    let expanded = crate::expand_array_field(&view, "ion")?;
    assert_eq!(expanded, view.field("ion")?);
    assert_eq!(expanded, view.field("ion")?.slice(..)?);

    for name in ["time", "grid"] {
        let err = view.expand_array_field(name).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type, "{name}");
    }
    Ok(())
}
