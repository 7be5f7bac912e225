//! Field navigation across every element of a view.

use idsview_common::{Result, error::Error};
use idsview_format::{
    path::NodePath,
    schema::{FieldKind, StructTypeRef},
};
use idsview_ranges::SliceSpec;
use idsview_sequence::FieldValue;
use itertools::Itertools;
use log::trace;

use crate::{cell::Cell, view::SliceView};

/// The kind of field reached on the elements of a view.
enum Reached {
    Value,
    Struct(Option<StructTypeRef>),
    Array(Option<StructTypeRef>),
}

impl SliceView {
    /// Accesses field `name` on every leaf element of the view.
    ///
    /// - A leaf field yields a view of values.
    /// - A `structure` field yields a view of the nested records.
    /// - A `struct_array` field yields a view one level deeper, holding a
    ///   full view of the nested array of every element. Lazy nested arrays
    ///   load their elements here.
    ///
    /// The nesting of the source view is kept: on `profiles_1d[:].ion`,
    /// `field("label")` yields one label view per profile.
    ///
    /// # Errors
    ///
    /// - `EmptyView` if the view has no elements.
    /// - `KindMismatch` on a view of values, or if the elements disagree on
    ///   the kind of the field.
    /// - `MissingAttribute` listing the leaf positions lacking the field.
    pub fn field(&self, name: &str) -> Result<SliceView> {
        if self.is_empty() {
            return Err(Error::empty_view(self.label(), name));
        }
        let Some(element_type) = self.element_type() else {
            return Err(Error::kind_mismatch(
                self.label(),
                name,
                "a view of leaf values has no fields",
            ));
        };

        let leaves = self.leaves();
        let mut found = Vec::with_capacity(leaves.len());
        let mut missing = Vec::new();
        for (pos, leaf) in leaves.iter().enumerate() {
            let Some(record) = leaf.as_record() else {
                return Err(Error::inconsistent(
                    self.label(),
                    pos,
                    format!("{} leaf in a view of records", leaf.kind_name()),
                ));
            };
            match record.get(name) {
                Some(value) => found.push(value),
                None => missing.push(pos),
            }
        }
        if !missing.is_empty() {
            return Err(Error::missing_attribute(
                self.label(),
                name,
                missing,
                leaves.len(),
            ));
        }

        let kinds = found.iter().map(|v| v.kind_name()).unique().collect::<Vec<_>>();
        if kinds.len() > 1 {
            return Err(Error::kind_mismatch(
                self.label(),
                name,
                format!("elements hold mixed kinds: {}", kinds.join(", ")),
            ));
        }

        let declared = element_type.field(name).map(|f| f.kind());
        let reached = match (found.first(), declared) {
            (Some(FieldValue::Value(_)), _) => Reached::Value,
            (Some(FieldValue::Struct(record)), _) => {
                Reached::Struct(Some(record.schema().clone()))
            }
            (Some(FieldValue::Array(array)), _) => {
                Reached::Array(Some(array.element_type().clone()))
            }
            (None, Some(FieldKind::Leaf { .. })) => Reached::Value,
            (None, Some(FieldKind::Struct(t))) => Reached::Struct(Some(t.clone())),
            (None, Some(FieldKind::StructArray(t))) => Reached::Array(Some(t.clone())),
            (None, None) => {
                return Err(Error::missing_attribute(self.label(), name, vec![], 0));
            }
        };

        let label = format!("{}.{name}", self.label());
        trace!("{label}: {} of {} leaves", found.len(), leaves.len());
        let (cells, element_type, depth_delta) = match reached {
            Reached::Value => {
                let cells = found
                    .iter()
                    .filter_map(|v| v.as_value())
                    .map(|v| Cell::Value(v.clone()))
                    .collect::<Vec<_>>();
                (cells, None, 0)
            }
            Reached::Struct(struct_type) => {
                let cells = found
                    .iter()
                    .filter_map(|v| v.as_record())
                    .map(|r| Cell::Record(r.clone()))
                    .collect::<Vec<_>>();
                (cells, struct_type, 0)
            }
            Reached::Array(struct_type) => {
                let cells = found
                    .iter()
                    .filter_map(|v| v.as_array())
                    .map(|array| SliceView::from_array(array, SliceSpec::full()).map(Cell::View))
                    .collect::<Result<Vec<_>>>()?;
                (cells, struct_type, 1)
            }
        };

        let label = if depth_delta > 0 { format!("{label}[:]") } else { label };
        let mut cells = cells.into_iter();
        let view = self.rebuild(&label, &mut cells, depth_delta, &element_type)?;
        if cells.next().is_some() {
            return Err(Error::inconsistent(&label, leaves.len(), "leaf count changed"));
        }
        Ok(view)
    }

    /// Follows a `/`- or `.`-separated field path, e.g. `ion/element/z_n`.
    ///
    /// A segment may carry an index, `ion[0]/label`, applied array-wise to
    /// the view reached by that segment.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a malformed path; otherwise the errors of
    /// [`SliceView::field`] and [`SliceView::get`].
    pub fn navigate(&self, path: &str) -> Result<SliceView> {
        let path = path.replace('.', "/").parse::<NodePath>()?;
        if path.is_root() {
            return Err(Error::invalid_arg("path", "empty field path"));
        }
        let mut view = self.clone();
        for segment in path.segments() {
            view = view.field(&segment.name)?;
            if let Some(index) = segment.index {
                view = match view.get(index as isize)? {
                    Cell::View(inner) => inner,
                    _ => {
                        return Err(Error::invalid_arg(
                            "path",
                            format!("'{}' is not a structure array", segment.name),
                        ));
                    }
                };
            }
        }
        Ok(view)
    }

    /// Like [`SliceView::field`], for `struct_array` fields only.
    pub fn expand_array_field(&self, name: &str) -> Result<SliceView> {
        expand_array_field(self, name)
    }

    /// Rebuilds the nesting of `self` around new leaf cells.
    fn rebuild(
        &self,
        label: &str,
        leaves: &mut impl Iterator<Item = Cell>,
        depth_delta: usize,
        element_type: &Option<StructTypeRef>,
    ) -> Result<SliceView> {
        let cells = if self.depth() == 0 {
            (0..self.len())
                .map(|pos| {
                    leaves
                        .next()
                        .ok_or_else(|| Error::inconsistent(label, pos, "leaf missing"))
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            self.cells()
                .iter()
                .enumerate()
                .map(|(pos, cell)| match cell {
                    Cell::View(inner) => Ok(Cell::View(inner.rebuild(
                        label,
                        leaves,
                        depth_delta,
                        element_type,
                    )?)),
                    other => Err(self.malformed(pos, other)),
                })
                .collect::<Result<Vec<_>>>()?
        };
        Ok(SliceView::from_parts(
            label.to_string(),
            self.selection().clone(),
            cells,
            self.depth() + depth_delta,
            element_type.clone(),
        ))
    }
}

/// Re-slices the `struct_array` field `name` of every element of `view`
/// with the full range, yielding a view one level deeper.
///
/// `view.field("ion")` on a `struct_array` field is this expansion.
///
/// # Errors
///
/// `KindMismatch` if `name` is not a `struct_array` field; otherwise the
/// errors of [`SliceView::field`].
pub fn expand_array_field(view: &SliceView, name: &str) -> Result<SliceView> {
    let declared = view
        .element_type()
        .and_then(|t| t.field(name))
        .map(|f| f.kind());
    if let Some(kind) = declared
        && !matches!(kind, FieldKind::StructArray(_))
    {
        return Err(Error::kind_mismatch(
            view.label(),
            name,
            format!("{kind} is not a structure array"),
        ));
    }
    let expanded = view.field(name)?;
    if expanded.depth() != view.depth() + 1 {
        return Err(Error::kind_mismatch(
            view.label(),
            name,
            "elements do not hold structure arrays",
        ));
    }
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use idsview_common::error::{ErrorCategory, ErrorKind};
    use idsview_format::{data_type::DataType, schema::StructType};
    use idsview_sequence::{Record, StructArray};

    use super::*;
    use crate::view::StructArraySlice;

    fn mixed_array() -> StructArray {
        let with_x = StructType::builder("item")
            .leaf("x", DataType::Flt, 0)
            .leaf("name", DataType::Str, 0)
            .build();
        let without_x = StructType::builder("item")
            .leaf("name", DataType::Str, 0)
            .build();
        let path = NodePath::new("items");
        let records = (0..5)
            .map(|i| {
                let schema = if i == 3 { without_x.clone() } else { with_x.clone() };
                let builder = Record::builder(schema, path.element(i))
                    .set("name", format!("item-{i}"))
                    .unwrap();
                if i == 3 {
                    builder.build()
                } else {
                    builder.set("x", i as f64).unwrap().build()
                }
            })
            .collect();
        StructArray::eager(with_x, path, records)
    }

    #[test]
    fn test_missing_field_names_positions() {
        let view = mixed_array().view().unwrap();
        let err = view.field("x").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Attribute);
        match err.kind() {
            ErrorKind::MissingAttribute { missing, total, .. } => {
                assert_eq!(missing, &vec![3]);
                assert_eq!(*total, 5);
            }
            other => panic!("unexpected error {other:?}"),
        }

        // excluding the element without `x` succeeds
        let x = mixed_array().slice(..3).unwrap().field("x").unwrap();
        assert_eq!(x.len(), 3);
        assert_eq!(x.label(), "items[:3].x");

        let x = view.slice(..3).unwrap().field("x").unwrap();
        assert_eq!(x.label(), "items[:][:3].x");
    }

    #[test]
    fn test_mixed_field_kinds() {
        let nested = StructType::builder("p")
            .struct_array("ion", StructType::builder("ion").leaf("label", DataType::Str, 0).build())
            .build();
        let scalar = StructType::builder("p").leaf("ion", DataType::Flt, 0).build();
        let path = NodePath::new("p");
        let records = vec![
            Record::builder(nested.clone(), path.element(0))
                .set_records("ion", vec![])
                .unwrap()
                .build(),
            Record::builder(scalar, path.element(1))
                .set("ion", 1.5)
                .unwrap()
                .build(),
        ];
        let view = StructArray::eager(nested, path, records).view().unwrap();

        let err = view.field("ion").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type);
        assert!(matches!(err.kind(), ErrorKind::KindMismatch { .. }));
        assert!(err.to_string().contains("struct_array, value"), "{err}");

        // each element alone is fine
        assert_eq!(view.slice(..1).unwrap().field("ion").unwrap().depth(), 1);
        assert_eq!(view.slice(1..).unwrap().field("ion").unwrap().depth(), 0);
    }

    #[test]
    fn test_value_view_has_no_fields() {
        let names = mixed_array().view().unwrap().field("name").unwrap();
        assert!(names.element_type().is_none());
        assert_eq!(
            names.get(1).unwrap().as_value().unwrap().as_str(),
            Some("item-1")
        );
        let err = names.field("x").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type);
    }

    #[test]
    fn test_empty_view_navigation() {
        let view = mixed_array().slice(5..).unwrap();
        let err = view.field("name").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::EmptyView { .. }));
        assert_eq!(err.category(), ErrorCategory::Index);
    }

    #[test]
    fn test_navigate_rejects_bad_paths() {
        let view = mixed_array().view().unwrap();
        assert!(view.navigate("").is_err());
        assert!(view.navigate("name[").is_err());
        let err = view.navigate("name[0]").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
    }
}
