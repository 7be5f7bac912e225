//! Structured records: immutable field maps typed by a [`StructType`].

use std::{fmt, sync::Arc};

use idsview_common::{Result, error::Error};
use idsview_format::{
    path::NodePath,
    schema::{FieldDef, FieldKind, StructTypeRef},
    value::{EMPTY_FLOAT, Value},
};

use crate::struct_array::StructArray;

/// The content of one record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Value(Value),
    Struct(Record),
    Array(StructArray),
}

impl FieldValue {
    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Value(_) => "value",
            FieldValue::Struct(_) => "structure",
            FieldValue::Array(_) => "struct_array",
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Struct(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&StructArray> {
        match self {
            FieldValue::Array(array) => Some(array),
            _ => None,
        }
    }
}

/// A structured record: one element of a structure array, or a nested
/// `structure` field.
///
/// The record carries its struct type and the node path it was read from.
/// It is immutable; cloning is cheap.
#[derive(Clone)]
pub struct Record(Arc<RecordInner>);

struct RecordInner {
    schema: StructTypeRef,
    path: NodePath,
    /// One value per field of `schema`, in declaration order.
    values: Vec<FieldValue>,
}

impl Record {
    pub fn builder(schema: StructTypeRef, path: NodePath) -> RecordBuilder {
        RecordBuilder::new(schema, path)
    }

    /// A record with every field set to its default.
    pub fn empty(schema: StructTypeRef, path: NodePath) -> Record {
        RecordBuilder::new(schema, path).build()
    }

    pub(crate) fn from_parts(
        schema: StructTypeRef,
        path: NodePath,
        values: Vec<FieldValue>,
    ) -> Record {
        debug_assert_eq!(schema.fields().len(), values.len());
        Record(Arc::new(RecordInner {
            schema,
            path,
            values,
        }))
    }

    pub fn schema(&self) -> &StructTypeRef {
        &self.0.schema
    }

    pub fn path(&self) -> &NodePath {
        &self.0.path
    }

    /// Returns the field named `name`, or `None` if the record's type does not
    /// declare it.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        let index = self.0.schema.fields().find_index(name)?;
        self.0.values.get(index)
    }

    /// Like [`Record::get`], failing with an attribute error for undeclared
    /// fields.
    pub fn field(&self, name: &str) -> Result<&FieldValue> {
        self.get(name)
            .ok_or_else(|| Error::missing_attribute(self.path().to_string(), name, vec![0], 1))
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name)?.as_value()
    }

    /// Returns `true` if the field holds something other than its default: a
    /// non-default leaf, a nested record with any such leaf, or a non-empty
    /// structure array.
    pub fn has_value(&self, name: &str) -> bool {
        match self.get(name) {
            Some(FieldValue::Value(value)) => value.has_value(),
            Some(FieldValue::Struct(record)) => record
                .schema()
                .fields()
                .iter()
                .any(|f| record.has_value(f.name())),
            Some(FieldValue::Array(array)) => !array.is_empty(),
            None => false,
        }
    }

    /// Iterates over the fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldDef, &FieldValue)> {
        self.0.schema.fields().iter().zip(self.0.values.iter())
    }

    pub fn ptr_eq(&self, other: &Record) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.schema().name() == other.schema().name()
                && self.path() == other.path()
                && self.0.values == other.0.values)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("type", &self.schema().name())
            .field("path", &self.path().to_string())
            .finish_non_exhaustive()
    }
}

/// Assembles a [`Record`], checking each value against the declared field.
///
/// Fields left unset take their defaults: the empty value of a leaf, an
/// all-default record for a `structure` field, an empty structure array for
/// a `struct_array` field.
pub struct RecordBuilder {
    schema: StructTypeRef,
    path: NodePath,
    values: Vec<Option<FieldValue>>,
}

impl RecordBuilder {
    pub fn new(schema: StructTypeRef, path: NodePath) -> RecordBuilder {
        let values = vec![None; schema.fields().len()];
        RecordBuilder {
            schema,
            path,
            values,
        }
    }

    /// Sets a leaf field. The value must match the declared data type and
    /// dimensionality.
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Result<RecordBuilder> {
        let value = value.into();
        let (index, field) = self.find(name)?;
        match field.kind() {
            FieldKind::Leaf { data_type, ndim }
                if *data_type == value.data_type() && *ndim == value.ndim() => {}
            kind => {
                return Err(Error::invalid_arg(
                    name,
                    format!(
                        "{}_{}D value does not fit a {kind} field",
                        value.data_type(),
                        value.ndim()
                    ),
                ));
            }
        }
        self.values[index] = Some(FieldValue::Value(value));
        Ok(self)
    }

    /// Sets a `structure` field.
    pub fn set_struct(mut self, name: &str, record: Record) -> Result<RecordBuilder> {
        let (index, field) = self.find(name)?;
        match field.kind() {
            FieldKind::Struct(t) if t.name() == record.schema().name() => {}
            kind => {
                return Err(Error::invalid_arg(
                    name,
                    format!(
                        "a {} record does not fit a {kind} field",
                        record.schema().name()
                    ),
                ));
            }
        }
        self.values[index] = Some(FieldValue::Struct(record));
        Ok(self)
    }

    /// Sets a `struct_array` field.
    pub fn set_array(mut self, name: &str, array: StructArray) -> Result<RecordBuilder> {
        let (index, field) = self.find(name)?;
        match field.kind() {
            FieldKind::StructArray(t) if t.name() == array.element_type().name() => {}
            kind => {
                return Err(Error::invalid_arg(
                    name,
                    format!(
                        "an array of {} does not fit a {kind} field",
                        array.element_type().name()
                    ),
                ));
            }
        }
        self.values[index] = Some(FieldValue::Array(array));
        Ok(self)
    }

    /// Sets a `struct_array` field to an eager array of `records`.
    pub fn set_records(self, name: &str, records: Vec<Record>) -> Result<RecordBuilder> {
        let (_, field) = self.find(name)?;
        let element_type = match field.kind() {
            FieldKind::StructArray(t) => t.clone(),
            kind => {
                return Err(Error::invalid_arg(
                    name,
                    format!("records do not fit a {kind} field"),
                ));
            }
        };
        let array = StructArray::eager(element_type, self.path.child(name), records);
        self.set_array(name, array)
    }

    pub fn build(self) -> Record {
        let values = self
            .schema
            .fields()
            .iter()
            .zip(self.values)
            .map(|(field, value)| value.unwrap_or_else(|| default_value(field, &self.path)))
            .collect();
        Record::from_parts(self.schema, self.path, values)
    }

    fn find(&self, name: &str) -> Result<(usize, FieldDef)> {
        let index = self.schema.fields().find_index(name).ok_or_else(|| {
            Error::invalid_arg(
                name,
                format!("{} has no field {name}", self.schema.name()),
            )
        })?;
        Ok((index, self.schema.fields().as_slice()[index].clone()))
    }
}

fn default_value(field: &FieldDef, parent: &NodePath) -> FieldValue {
    match field.kind() {
        FieldKind::Leaf { data_type, ndim } => FieldValue::Value(
            Value::default_for(*data_type, *ndim).unwrap_or(Value::Flt(EMPTY_FLOAT)),
        ),
        FieldKind::Struct(t) => {
            FieldValue::Struct(Record::empty(t.clone(), parent.child(field.name())))
        }
        FieldKind::StructArray(t) => FieldValue::Array(StructArray::eager(
            t.clone(),
            parent.child(field.name()),
            Vec::new(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use idsview_common::error::ErrorKind;
    use idsview_format::{
        data_type::DataType,
        schema::StructType,
        value::EMPTY_INT,
    };

    use super::*;

    fn ion_type() -> StructTypeRef {
        StructType::builder("ion")
            .leaf("label", DataType::Str, 0)
            .leaf("z_ion", DataType::Flt, 0)
            .leaf("neutral_index", DataType::Int, 0)
            .build()
    }

    fn profile_type() -> StructTypeRef {
        let grid = StructType::builder("grid")
            .leaf("rho_tor_norm", DataType::Flt, 1)
            .build();
        StructType::builder("profiles_1d")
            .leaf("time", DataType::Flt, 0)
            .structure("grid", grid)
            .struct_array("ion", ion_type())
            .build()
    }

    #[test]
    fn test_defaults() {
        let record = Record::empty(ion_type(), NodePath::new("ion").element(0));
        assert_eq!(record.value("label").unwrap().as_str(), Some(""));
        assert_eq!(record.value("z_ion"), Some(&Value::Flt(EMPTY_FLOAT)));
        assert_eq!(record.value("neutral_index"), Some(&Value::Int(EMPTY_INT)));
        assert!(!record.has_value("z_ion"));
        assert!(!record.has_value("missing"));
    }

    #[test]
    fn test_nested_defaults() {
        let path = NodePath::new("profiles_1d").element(3);
        let record = Record::empty(profile_type(), path);
        let grid = record.get("grid").unwrap().as_record().unwrap();
        assert_eq!(grid.path().to_string(), "profiles_1d[3]/grid");
        assert_eq!(grid.value("rho_tor_norm").unwrap().shape(), &[0]);
        let ion = record.get("ion").unwrap().as_array().unwrap();
        assert!(ion.is_empty());
        assert_eq!(ion.path().to_string(), "profiles_1d[3]/ion");
        assert!(!record.has_value("grid"));
        assert!(!record.has_value("ion"));
    }

    #[test]
    fn test_set_checks_kind() {
        let builder = Record::builder(ion_type(), NodePath::new("ion").element(0));
        let err = builder.set("z_ion", "one").err().unwrap();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));

        let builder = Record::builder(ion_type(), NodePath::new("ion").element(0));
        assert!(builder.set("z_ion", vec![1.0, 2.0]).is_err());

        let builder = Record::builder(ion_type(), NodePath::new("ion").element(0));
        assert!(builder.set("charge", 1.0).is_err());

        let builder = Record::builder(profile_type(), NodePath::new("profiles_1d").element(0));
        let ion = Record::empty(ion_type(), NodePath::new("ion").element(0));
        assert!(builder.set_struct("grid", ion).is_err());
    }

    #[test]
    fn test_build_and_navigate() {
        let path = NodePath::new("profiles_1d").element(0);
        let ions = (0..2)
            .map(|i| {
                Record::builder(ion_type(), path.child("ion").element(i))
                    .set("label", format!("ion_{i}"))
                    .unwrap()
                    .build()
            })
            .collect::<Vec<_>>();
        let record = Record::builder(profile_type(), path)
            .set("time", 0.5)
            .unwrap()
            .set_records("ion", ions)
            .unwrap()
            .build();

        assert!(record.has_value("time"));
        assert!(record.has_value("ion"));
        let ion = record.field("ion").unwrap().as_array().unwrap();
        assert_eq!(ion.len(), 2);
        assert_eq!(
            ion.get(-1).unwrap().value("label").unwrap().as_str(),
            Some("ion_1")
        );
        let err = record.field("x").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MissingAttribute { .. }));
        let names = record.iter().map(|(f, _)| f.name().to_string()).collect::<Vec<_>>();
        assert_eq!(names, vec!["time", "grid", "ion"]);
    }

    #[test]
    fn test_equality() {
        let a = Record::empty(ion_type(), NodePath::new("ion").element(0));
        let b = Record::empty(ion_type(), NodePath::new("ion").element(0));
        let c = Record::empty(ion_type(), NodePath::new("ion").element(1));
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
