//! Logical shapes of slice views.

use std::fmt;

use idsview_format::value::Value;
use itertools::Itertools;
use serde::Serialize;

use crate::{cell::Cell, view::SliceView};

/// One dimension of a [`Shape`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dim {
    /// All siblings at this level have the same length.
    Exact(usize),
    /// Sibling lengths differ. `representative` is the length of the first
    /// sibling; `lengths` lists them all.
    Irregular {
        representative: usize,
        lengths: Vec<usize>,
    },
}

impl Dim {
    fn from_lengths(lengths: Vec<usize>) -> Dim {
        if lengths.iter().all_equal() {
            Dim::Exact(lengths.first().copied().unwrap_or(0))
        } else {
            Dim::irregular(lengths)
        }
    }

    fn irregular(lengths: Vec<usize>) -> Dim {
        Dim::Irregular {
            representative: lengths.first().copied().unwrap_or(0),
            lengths,
        }
    }

    /// The exact length, or the representative one.
    pub fn len(&self) -> usize {
        match self {
            Dim::Exact(n) => *n,
            Dim::Irregular { representative, .. } => *representative,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Dim::Exact(_))
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Exact(n) => write!(f, "{n}"),
            Dim::Irregular { representative, .. } => write!(f, "~{representative}"),
        }
    }
}

/// The logical shape of a view: one dimension per nesting level, followed
/// by the dimensions of uniformly shaped leaf arrays.
///
/// Renders as a tuple, `(106, ~3)`, with `~` marking irregular dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Shape(Vec<Dim>);

impl Shape {
    pub fn dims(&self) -> &[Dim] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    pub fn is_regular(&self) -> bool {
        self.0.iter().all(Dim::is_exact)
    }

    /// The first irregular dimension and its sibling lengths.
    pub fn first_irregular(&self) -> Option<(usize, &[usize])> {
        self.0.iter().enumerate().find_map(|(level, dim)| match dim {
            Dim::Irregular { lengths, .. } => Some((level, lengths.as_slice())),
            Dim::Exact(_) => None,
        })
    }

    /// The dimensions, if all are exact.
    pub fn exact(&self) -> Option<Vec<usize>> {
        self.0
            .iter()
            .map(|dim| match dim {
                Dim::Exact(n) => Some(*n),
                Dim::Irregular { .. } => None,
            })
            .collect()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().join(", "))
    }
}

/// Computes the shape of `view` without loading anything.
///
/// The first dimension is the number of top-level cells. Every array-wise
/// nesting level adds the lengths of its sibling views. When all leaves are
/// values of the same dimensionality `d >= 1`, `d` trailing dimensions
/// describe them; leaves of differing dimensionality add one irregular
/// dimension of element counts, even when the counts agree.
pub fn resolve_shape(view: &SliceView) -> Shape {
    let mut dims = vec![Dim::Exact(view.len())];

    let mut frontier = vec![view];
    for _ in 0..view.depth() {
        let next = frontier
            .iter()
            .flat_map(|v| v.cells())
            .filter_map(Cell::as_view)
            .collect::<Vec<_>>();
        dims.push(Dim::from_lengths(next.iter().map(|v| v.len()).collect()));
        frontier = next;
    }

    let leaves = view.leaves();
    let values = leaves.iter().filter_map(Cell::as_value).collect::<Vec<_>>();
    if values.is_empty() || values.len() != leaves.len() {
        return Shape(dims);
    }

    if values.iter().map(|v| v.ndim()).all_equal() {
        for axis in 0..values[0].ndim() {
            dims.push(Dim::from_lengths(
                values.iter().map(|v| v.shape()[axis]).collect(),
            ));
        }
    } else {
        dims.push(Dim::irregular(
            values.iter().map(|v| element_count(v)).collect(),
        ));
    }
    Shape(dims)
}

/// The number of elements of a value; 1 for scalars.
pub(crate) fn element_count(value: &Value) -> usize {
    value.shape().iter().product()
}

impl SliceView {
    /// The logical shape of the view. See [`resolve_shape`].
    pub fn shape(&self) -> Shape {
        resolve_shape(self)
    }
}
