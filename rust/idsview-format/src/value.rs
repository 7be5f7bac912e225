//! Leaf values held by records: scalars and n-dimensional arrays.

use std::{fmt, sync::Arc};

use idsview_common::{Result, verify_arg};
use itertools::Itertools;

use crate::data_type::DataType;

/// Default ("empty") value of an integer leaf.
pub const EMPTY_INT: i64 = -999_999_999;

/// Default ("empty") value of a floating point leaf.
pub const EMPTY_FLOAT: f64 = -9.0e40;

/// Default ("empty") value of a complex leaf.
pub const EMPTY_COMPLEX: Complex = Complex {
    re: EMPTY_FLOAT,
    im: EMPTY_FLOAT,
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Complex {
        Complex { re, im }
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:+}i", self.re, self.im)
    }
}

/// A dense n-dimensional array stored in row-major order.
///
/// Cloning is cheap: the shape and the data are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray<T> {
    shape: Arc<[usize]>,
    data: Arc<[T]>,
}

impl<T> NdArray<T> {
    /// Creates an array of the given shape.
    ///
    /// Fails if the number of elements in `data` is not the product of the
    /// dimensions.
    pub fn new(shape: Vec<usize>, data: Vec<T>) -> Result<NdArray<T>> {
        verify_arg!(shape, !shape.is_empty());
        verify_arg!(data, data.len() == shape.iter().product::<usize>());
        Ok(NdArray {
            shape: shape.into(),
            data: data.into(),
        })
    }

    /// Creates a one-dimensional array.
    pub fn from_vec(data: Vec<T>) -> NdArray<T> {
        NdArray {
            shape: Arc::from([data.len()]),
            data: data.into(),
        }
    }

    /// Creates an empty array with `ndim` zero-length dimensions.
    pub fn empty(ndim: usize) -> NdArray<T> {
        NdArray {
            shape: vec![0; ndim.max(1)].into(),
            data: Arc::from([]),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Returns the element at a multi-dimensional position, or `None` if the
    /// position has the wrong rank or lies outside the array.
    pub fn get(&self, pos: &[usize]) -> Option<&T> {
        if pos.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;
        for (&i, &dim) in pos.iter().zip(self.shape.iter()) {
            if i >= dim {
                return None;
            }
            offset = offset * dim + i;
        }
        self.data.get(offset)
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> NdArray<U> {
        NdArray {
            shape: self.shape.clone(),
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T: fmt::Display> fmt::Display for NdArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_SHOWN: usize = 6;
        write!(f, "[{}", self.data.iter().take(MAX_SHOWN).join(", "))?;
        if self.data.len() > MAX_SHOWN {
            write!(f, ", ...")?;
        }
        write!(f, "]")?;
        if self.shape.len() > 1 {
            write!(f, " ({})", self.shape.iter().join("x"))?;
        }
        Ok(())
    }
}

/// A leaf value: a scalar or an n-dimensional array of one basic type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(Arc<str>),
    Int(i64),
    Flt(f64),
    Cpx(Complex),
    StrArray(NdArray<Arc<str>>),
    IntArray(NdArray<i64>),
    FltArray(NdArray<f64>),
    CpxArray(NdArray<Complex>),
}

impl Value {
    /// The default value of a leaf with the given type and dimensionality.
    ///
    /// Returns `None` for `structure` and `struct_array`, which are not leaves.
    pub fn default_for(data_type: DataType, ndim: usize) -> Option<Value> {
        let value = match (data_type, ndim) {
            (DataType::Str, 0) => Value::Str(Arc::from("")),
            (DataType::Int, 0) => Value::Int(EMPTY_INT),
            (DataType::Flt, 0) => Value::Flt(EMPTY_FLOAT),
            (DataType::Cpx, 0) => Value::Cpx(EMPTY_COMPLEX),
            (DataType::Str, n) => Value::StrArray(NdArray::empty(n)),
            (DataType::Int, n) => Value::IntArray(NdArray::empty(n)),
            (DataType::Flt, n) => Value::FltArray(NdArray::empty(n)),
            (DataType::Cpx, n) => Value::CpxArray(NdArray::empty(n)),
            (DataType::Structure | DataType::StructArray, _) => return None,
        };
        Some(value)
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Str(_) | Value::StrArray(_) => DataType::Str,
            Value::Int(_) | Value::IntArray(_) => DataType::Int,
            Value::Flt(_) | Value::FltArray(_) => DataType::Flt,
            Value::Cpx(_) | Value::CpxArray(_) => DataType::Cpx,
        }
    }

    /// Dimensions of the value; empty for scalars.
    pub fn shape(&self) -> &[usize] {
        match self {
            Value::Str(_) | Value::Int(_) | Value::Flt(_) | Value::Cpx(_) => &[],
            Value::StrArray(a) => a.shape(),
            Value::IntArray(a) => a.shape(),
            Value::FltArray(a) => a.shape(),
            Value::CpxArray(a) => a.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn is_numeric(&self) -> bool {
        self.data_type().is_numeric()
    }

    /// Returns `true` if the value differs from the default of its type:
    /// a scalar other than the "empty" constant, or a non-empty array.
    pub fn has_value(&self) -> bool {
        match self {
            Value::Str(s) => !s.is_empty(),
            Value::Int(i) => *i != EMPTY_INT,
            Value::Flt(f) => *f != EMPTY_FLOAT,
            Value::Cpx(c) => *c != EMPTY_COMPLEX,
            Value::StrArray(a) => !a.is_empty(),
            Value::IntArray(a) => !a.is_empty(),
            Value::FltArray(a) => !a.is_empty(),
            Value::CpxArray(a) => !a.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns a numeric scalar widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Flt(f) => Some(*f),
            _ => None,
        }
    }

    /// Appends the numeric content of the value to `out` in row-major order,
    /// widening integers to `f64`.
    ///
    /// Returns `false` (leaving `out` untouched) for non-numeric values.
    pub fn append_f64(&self, out: &mut Vec<f64>) -> bool {
        match self {
            Value::Int(i) => out.push(*i as f64),
            Value::Flt(f) => out.push(*f),
            Value::IntArray(a) => out.extend(a.iter().map(|&i| i as f64)),
            Value::FltArray(a) => out.extend_from_slice(a.as_slice()),
            _ => return false,
        }
        true
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Flt(x) => write!(f, "{x}"),
            Value::Cpx(c) => write!(f, "{c}"),
            Value::StrArray(a) => write!(f, "{}", a.map(|s| format!("{s:?}"))),
            Value::IntArray(a) => write!(f, "{a}"),
            Value::FltArray(a) => write!(f, "{a}"),
            Value::CpxArray(a) => write!(f, "{a}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Flt(f)
    }
}

impl From<Complex> for Value {
    fn from(c: Complex) -> Self {
        Value::Cpx(c)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::FltArray(NdArray::from_vec(v))
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::IntArray(NdArray::from_vec(v))
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::StrArray(NdArray::from_vec(v.into_iter().map(Arc::from).collect()))
    }
}

impl From<NdArray<f64>> for Value {
    fn from(a: NdArray<f64>) -> Self {
        Value::FltArray(a)
    }
}

impl From<NdArray<i64>> for Value {
    fn from(a: NdArray<i64>) -> Self {
        Value::IntArray(a)
    }
}

impl From<NdArray<Complex>> for Value {
    fn from(a: NdArray<Complex>) -> Self {
        Value::CpxArray(a)
    }
}
