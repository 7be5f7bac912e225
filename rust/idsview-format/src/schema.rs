//! Struct types: the static field-name to field-kind mapping every record
//! carries.
//!
//! A [`StructType`] describes one node type of the data dictionary (e.g. the
//! element type of `profiles_1d`). Its fields are held in a [`FieldList`],
//! which resolves names linearly for small types and through a lazily built
//! hash map for larger ones.

use std::{
    fmt,
    sync::{Arc, LazyLock, OnceLock},
};

use ahash::AHashMap;
use idsview_common::Result;
use itertools::Itertools;

use crate::data_type::DataType;

pub type StructTypeRef = Arc<StructType>;

/// The kind of a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A scalar (`ndim == 0`) or an n-dimensional array of a basic type.
    Leaf { data_type: DataType, ndim: usize },
    /// A nested record.
    Struct(StructTypeRef),
    /// A sequence of nested records.
    StructArray(StructTypeRef),
}

impl FieldKind {
    /// Creates a leaf kind from a data dictionary type string such as `FLT_1D`.
    ///
    /// `structure` and `struct_array` carry an element type and cannot be
    /// created from a type string alone.
    pub fn parse_leaf(type_str: &str) -> Result<FieldKind> {
        let (data_type, ndim) = DataType::parse(type_str)?;
        if !data_type.is_leaf() {
            return Err(idsview_common::error::Error::invalid_arg(
                "type",
                format!("{type_str} requires an element type"),
            ));
        }
        Ok(FieldKind::Leaf { data_type, ndim })
    }

    pub fn data_type(&self) -> DataType {
        match self {
            FieldKind::Leaf { data_type, .. } => *data_type,
            FieldKind::Struct(_) => DataType::Structure,
            FieldKind::StructArray(_) => DataType::StructArray,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, FieldKind::Leaf { .. })
    }

    /// Returns `true` for `INT_nD` and `FLT_nD` leaves.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Leaf { data_type, .. } if data_type.is_numeric())
    }

    /// The element type of a `structure` or `struct_array` field.
    pub fn struct_type(&self) -> Option<&StructTypeRef> {
        match self {
            FieldKind::Leaf { .. } => None,
            FieldKind::Struct(t) | FieldKind::StructArray(t) => Some(t),
        }
    }
}

/// Renders the data dictionary spelling: `FLT_1D`, `structure`, `struct_array`.
impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Leaf { data_type, ndim } => write!(f, "{data_type}_{ndim}D"),
            FieldKind::Struct(_) => f.write_str("structure"),
            FieldKind::StructArray(_) => f.write_str("struct_array"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    name: Arc<str>,
    kind: FieldKind,
}

impl FieldDef {
    pub fn new(name: impl Into<Arc<str>>, kind: FieldKind) -> FieldDef {
        FieldDef {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }
}

/// Ordered field definitions of a struct type with name lookup.
#[derive(Debug, Clone)]
pub struct FieldList {
    list: Arc<[FieldDef]>,
    /// Built lazily, and only for types with more than a handful of fields.
    lookup: Option<Arc<OnceLock<StrToIndexMap>>>,
}

type StrToIndexMap = AHashMap<Arc<str>, usize>;

impl FieldList {
    pub fn new(list: Arc<[FieldDef]>) -> FieldList {
        FieldList {
            list,
            lookup: Some(Arc::new(OnceLock::new())),
        }
    }

    pub fn empty() -> FieldList {
        static EMPTY: LazyLock<FieldList> = LazyLock::new(|| FieldList {
            list: Arc::from([]),
            lookup: None,
        });
        EMPTY.clone()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FieldDef> {
        self.list.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDef> {
        self.list.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_index(name).is_some()
    }

    pub fn find(&self, name: &str) -> Option<&FieldDef> {
        self.find_index(name).map(|i| &self.list[i])
    }

    pub fn find_index(&self, name: &str) -> Option<usize> {
        if let Some(lookup) = self.build_lookup() {
            lookup.get(name).cloned()
        } else {
            self.list
                .iter()
                .position(|field| field.name().as_ref() == name)
        }
    }

    pub fn as_slice(&self) -> &[FieldDef] {
        self.list.as_ref()
    }

    fn build_lookup(&self) -> Option<&StrToIndexMap> {
        if self.list.len() <= 4 {
            return None;
        }
        let lookup = self.lookup.as_ref()?.get_or_init(|| {
            self.list
                .iter()
                .enumerate()
                .map(|(i, field)| (field.name().clone(), i))
                .collect()
        });
        Some(lookup)
    }
}

impl PartialEq for FieldList {
    fn eq(&self, other: &Self) -> bool {
        self.list == other.list
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a FieldDef;
    type IntoIter = std::slice::Iter<'a, FieldDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A named record type with an ordered list of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    name: Arc<str>,
    fields: FieldList,
}

impl StructType {
    pub fn builder(name: impl Into<Arc<str>>) -> StructTypeBuilder {
        StructTypeBuilder::new(name)
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn fields(&self) -> &FieldList {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.find(name)
    }

    /// Leaf fields of kind `INT_nD` or `FLT_nD`, in declaration order.
    pub fn numeric_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.kind().is_numeric())
    }
}

/// Renders `name{field: KIND, ...}`, recursing into nested types.
impl fmt::Display for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields.iter().format_with(", ", |field, f| {
            match field.kind() {
                FieldKind::Leaf { .. } => f(&format_args!("{}: {}", field.name(), field.kind())),
                FieldKind::Struct(t) => f(&format_args!("{}: {t}", field.name())),
                FieldKind::StructArray(t) => f(&format_args!("{}: [{t}]", field.name())),
            }
        });
        write!(f, "{}{{{fields}}}", self.name)
    }
}

/// Incrementally assembles a [`StructType`].
///
/// # Panics
///
/// Adding two fields with the same name panics.
pub struct StructTypeBuilder {
    name: Arc<str>,
    fields: Vec<FieldDef>,
    field_map: AHashMap<Arc<str>, usize>,
}

impl StructTypeBuilder {
    pub fn new(name: impl Into<Arc<str>>) -> StructTypeBuilder {
        StructTypeBuilder {
            name: name.into(),
            fields: Vec::new(),
            field_map: AHashMap::new(),
        }
    }

    pub fn field(mut self, name: &str, kind: FieldKind) -> StructTypeBuilder {
        self.add_field(FieldDef::new(name, kind));
        self
    }

    /// # Panics
    ///
    /// Panics if `data_type` is `Structure` or `StructArray`.
    pub fn leaf(self, name: &str, data_type: DataType, ndim: usize) -> StructTypeBuilder {
        assert!(data_type.is_leaf(), "{data_type} is not a leaf type");
        self.field(name, FieldKind::Leaf { data_type, ndim })
    }

    /// Adds a leaf field declared with a data dictionary type string.
    pub fn typed(self, name: &str, type_str: &str) -> Result<StructTypeBuilder> {
        let kind = FieldKind::parse_leaf(type_str)?;
        Ok(self.field(name, kind))
    }

    pub fn structure(self, name: &str, struct_type: StructTypeRef) -> StructTypeBuilder {
        self.field(name, FieldKind::Struct(struct_type))
    }

    pub fn struct_array(self, name: &str, element_type: StructTypeRef) -> StructTypeBuilder {
        self.field(name, FieldKind::StructArray(element_type))
    }

    pub fn add_field(&mut self, field: FieldDef) {
        assert!(
            !self.field_map.contains_key(field.name()),
            "duplicate field {} in {}",
            field.name(),
            self.name
        );
        self.field_map.insert(field.name().clone(), self.fields.len());
        self.fields.push(field);
    }

    pub fn build(self) -> StructTypeRef {
        Arc::new(StructType {
            name: self.name,
            fields: FieldList::new(self.fields.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ion_type() -> StructTypeRef {
        StructType::builder("ion")
            .typed("label", "STR_0D")
            .unwrap()
            .typed("z_ion", "FLT_0D")
            .unwrap()
            .build()
    }

    #[test]
    fn test_builder_and_lookup() {
        let profile = StructType::builder("profiles_1d")
            .leaf("time", DataType::Flt, 0)
            .struct_array("ion", ion_type())
            .build();
        assert_eq!(profile.fields().len(), 2);
        assert!(profile.field("time").unwrap().kind().is_numeric());
        assert_eq!(
            profile.field("ion").unwrap().kind().data_type(),
            DataType::StructArray
        );
        assert!(profile.field("x").is_none());
    }

    #[test]
    fn test_lookup_map_for_wide_types() {
        let mut builder = StructType::builder("wide");
        for i in 0..10 {
            builder.add_field(FieldDef::new(
                format!("f{i}").as_str(),
                FieldKind::parse_leaf("INT_0D").unwrap(),
            ));
        }
        let wide = builder.build();
        assert_eq!(wide.fields().find_index("f7"), Some(7));
        assert_eq!(wide.fields().find_index("f0"), Some(0));
        assert!(!wide.fields().contains("f10"));
    }

    #[test]
    #[should_panic(expected = "duplicate field")]
    fn test_duplicate_field_panics() {
        StructType::builder("t")
            .leaf("a", DataType::Int, 0)
            .leaf("a", DataType::Flt, 0);
    }

    #[test]
    fn test_parse_leaf_rejects_composites() {
        assert!(FieldKind::parse_leaf("struct_array").is_err());
        assert!(FieldKind::parse_leaf("structure").is_err());
        assert_eq!(
            FieldKind::parse_leaf("flt_1d_type").unwrap().to_string(),
            "FLT_1D"
        );
    }

    #[test]
    fn test_numeric_fields_and_display() {
        let t = StructType::builder("grid")
            .leaf("rho_tor_norm", DataType::Flt, 1)
            .leaf("name", DataType::Str, 0)
            .leaf("index", DataType::Int, 0)
            .struct_array("ion", ion_type())
            .build();
        let numeric = t
            .numeric_fields()
            .map(|f| f.name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(numeric, vec!["rho_tor_norm", "index"]);
        assert_eq!(
            t.to_string(),
            "grid{rho_tor_norm: FLT_1D, name: STR_0D, index: INT_0D, \
             ion: [ion{label: STR_0D, z_ion: FLT_0D}]}"
        );
    }
}
