//! Data dictionary node types.

use std::fmt;

use idsview_common::{Result, error::Error};

/// The maximum dimensionality of a leaf node in the data dictionary.
pub const MAX_NDIM: usize = 6;

/// Basic type of a data dictionary node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// A nested record (`structure`).
    Structure,
    /// An array of nested records (`struct_array`).
    StructArray,
    Str,
    Int,
    Flt,
    Cpx,
}

impl DataType {
    /// Parses a data dictionary type string into a data type and its
    /// dimensionality.
    ///
    /// Accepts the current spelling (`FLT_1D`, `STR_0D`, `structure`,
    /// `struct_array`) as well as the legacy one (`flt_type`, `flt_1d_type`,
    /// `int_type`, ...). A `struct_array` is one-dimensional.
    pub fn parse(type_str: &str) -> Result<(DataType, usize)> {
        match type_str {
            "structure" => return Ok((DataType::Structure, 0)),
            "struct_array" => return Ok((DataType::StructArray, 1)),
            _ => (),
        }

        let upper = type_str.to_ascii_uppercase();
        let mut parts = upper.split('_');
        let data_type = match parts.next() {
            Some("STR") => DataType::Str,
            Some("INT") => DataType::Int,
            Some("FLT") => DataType::Flt,
            Some("CPX") => DataType::Cpx,
            _ => return Err(Error::invalid_arg("type", format!("unknown data type {type_str:?}"))),
        };

        let ndim = match parts.next() {
            Some("TYPE") => 0,
            Some(dims) => parse_dims(dims).ok_or_else(|| {
                Error::invalid_arg("type", format!("invalid dimensionality in {type_str:?}"))
            })?,
            None => {
                return Err(Error::invalid_arg(
                    "type",
                    format!("missing dimensionality in {type_str:?}"),
                ));
            }
        };

        match parts.collect::<Vec<_>>().as_slice() {
            [] | ["TYPE"] => Ok((data_type, ndim)),
            _ => Err(Error::invalid_arg(
                "type",
                format!("unexpected suffix in {type_str:?}"),
            )),
        }
    }

    /// Returns `true` for the types a record may hold as a leaf value.
    pub fn is_leaf(&self) -> bool {
        !matches!(self, DataType::Structure | DataType::StructArray)
    }

    /// Returns `true` for types that densify into a numeric array.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int | DataType::Flt)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Structure => "structure",
            DataType::StructArray => "struct_array",
            DataType::Str => "STR",
            DataType::Int => "INT",
            DataType::Flt => "FLT",
            DataType::Cpx => "CPX",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_dims(s: &str) -> Option<usize> {
    let digits = s.strip_suffix('D')?;
    let ndim = digits.parse::<usize>().ok()?;
    (ndim <= MAX_NDIM).then_some(ndim)
}
