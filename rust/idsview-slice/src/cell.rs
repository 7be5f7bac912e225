//! Cells: the elements of a slice view.

use idsview_format::value::Value;
use idsview_sequence::Record;

use crate::view::SliceView;

/// One element of a [`SliceView`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// An element of a structure array, or a nested `structure` record.
    Record(Record),
    /// A leaf value reached by navigating to a leaf field.
    Value(Value),
    /// A nested view, one per element of the enclosing level.
    View(SliceView),
}

impl Cell {
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Cell::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Cell::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_view(&self) -> Option<&SliceView> {
        match self {
            Cell::View(view) => Some(view),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Cell::Record(_) => "record",
            Cell::Value(_) => "value",
            Cell::View(_) => "view",
        }
    }
}

impl From<Record> for Cell {
    fn from(record: Record) -> Self {
        Cell::Record(record)
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        Cell::Value(value)
    }
}

impl From<SliceView> for Cell {
    fn from(view: SliceView) -> Self {
        Cell::View(view)
    }
}
