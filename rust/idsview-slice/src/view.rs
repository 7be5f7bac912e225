//! Slice views over structure arrays.

use std::{fmt, sync::Arc};

use idsview_common::{Result, error::Error};
use idsview_format::schema::StructTypeRef;
use idsview_ranges::{Selection, SliceSpec, normalize_index};
use idsview_sequence::StructArray;
use log::trace;

use crate::cell::Cell;

/// A composable, possibly multi-level view over selected elements.
///
/// A view is an ordered sequence of [`Cell`]s. At depth 0 the cells are
/// records or values; at depth `d > 0` every cell is itself a view of depth
/// `d - 1`, one per element of the enclosing level (produced by array-wise
/// navigation such as `profiles_1d[:].ion`).
///
/// Views are immutable. Indexing, slicing and navigation return new views
/// sharing the cells of the source; they never read from the data store
/// except to load the elements of structure arrays reached by navigation.
#[derive(Clone)]
pub struct SliceView {
    /// How the view was reached, e.g. `profiles_1d[:].ion[0]`.
    label: Arc<str>,
    /// Source indices of the top-level cells; `selection.len() == cells.len()`.
    selection: Selection,
    cells: Arc<[Cell]>,
    depth: usize,
    /// Struct type of the record cells. `None` for views of leaf values.
    element_type: Option<StructTypeRef>,
}

impl SliceView {
    /// Slices `array` with `spec`.
    ///
    /// Lazy arrays load the missing selected elements with one bulk call.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a zero step.
    /// - `Unsupported` for a lazy array with the index-only policy.
    /// - Loader errors.
    pub fn from_array(array: &StructArray, spec: impl Into<SliceSpec>) -> Result<SliceView> {
        let spec = spec.into();
        let (selection, records) = array.select(&spec)?;
        Ok(SliceView {
            label: format!("{}{spec}", array.path()).into(),
            selection,
            cells: records.into_iter().map(Cell::Record).collect(),
            depth: 0,
            element_type: Some(array.element_type().clone()),
        })
    }

    pub(crate) fn from_parts(
        label: String,
        selection: Selection,
        cells: Vec<Cell>,
        depth: usize,
        element_type: Option<StructTypeRef>,
    ) -> SliceView {
        debug_assert_eq!(selection.len(), cells.len());
        SliceView {
            label: label.into(),
            selection,
            cells: cells.into(),
            depth,
            element_type,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The number of array-wise nesting levels.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn element_type(&self) -> Option<&StructTypeRef> {
        self.element_type.as_ref()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The number of top-level cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The number of leaf cells across all nesting levels.
    pub fn leaf_count(&self) -> usize {
        if self.depth == 0 {
            return self.len();
        }
        self.cells
            .iter()
            .filter_map(Cell::as_view)
            .map(SliceView::leaf_count)
            .sum()
    }

    /// Iterates over the top-level cells in selection order.
    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    /// Returns cell `index`; negative values count from the end.
    ///
    /// On a nested view the index applies to the innermost level of every
    /// nested view and the result is a view one level shallower: on
    /// `profiles_1d[:].ion`, `get(0)` selects the first ion of every profile.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` naming the (innermost) level that is too short.
    pub fn get(&self, index: isize) -> Result<Cell> {
        if self.depth == 0 {
            let pos = normalize_index(index, self.len()).ok_or_else(|| {
                Error::index_out_of_range(self.label.to_string(), index, self.len())
            })?;
            return Ok(self.cells[pos].clone());
        }
        Ok(Cell::View(self.get_innermost(index)?))
    }

    fn get_innermost(&self, index: isize) -> Result<SliceView> {
        let cells = self
            .cells
            .iter()
            .enumerate()
            .map(|(pos, cell)| match cell {
                Cell::View(inner) if inner.depth == 0 => inner.get(index),
                Cell::View(inner) => Ok(Cell::View(inner.get_innermost(index)?)),
                other => Err(self.malformed(pos, other)),
            })
            .collect::<Result<Vec<_>>>()?;
        trace!("{}[{index}] applied array-wise to {} cells", self.label, cells.len());
        Ok(SliceView::from_parts(
            format!("{}[{index}]", self.label),
            self.selection.clone(),
            cells,
            self.depth - 1,
            self.element_type.clone(),
        ))
    }

    /// Slices the view.
    ///
    /// At depth 0 this composes `spec` with the view's selection. On a nested
    /// view the slice applies to the innermost level of every nested view and
    /// the depth is kept.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a zero step.
    pub fn slice(&self, spec: impl Into<SliceSpec>) -> Result<SliceView> {
        let spec = spec.into();
        let label = format!("{}{spec}", self.label);

        if self.depth == 0 {
            let range = spec.resolve(self.len()).ok_or_else(zero_step)?;
            let cells = range.iter().map(|pos| self.cells[pos].clone()).collect();
            return Ok(SliceView::from_parts(
                label,
                self.selection.pick(&range),
                cells,
                0,
                self.element_type.clone(),
            ));
        }

        if spec.step == Some(0) {
            return Err(zero_step());
        }
        let cells = self
            .cells
            .iter()
            .enumerate()
            .map(|(pos, cell)| match cell {
                Cell::View(inner) => Ok(Cell::View(inner.slice(spec)?)),
                other => Err(self.malformed(pos, other)),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SliceView::from_parts(
            label,
            self.selection.clone(),
            cells,
            self.depth,
            self.element_type.clone(),
        ))
    }

    /// A depth-0 view over the leaf cells, depth-first.
    pub fn flatten(&self) -> SliceView {
        let leaves = self.leaves();
        SliceView::from_parts(
            self.label.to_string(),
            Selection::all(leaves.len()),
            leaves,
            0,
            self.element_type.clone(),
        )
    }

    pub(crate) fn malformed(&self, pos: usize, cell: &Cell) -> Error {
        Error::inconsistent(
            self.label.to_string(),
            pos,
            format!("unexpected {} cell at depth {}", cell.kind_name(), self.depth),
        )
    }
}

fn zero_step() -> Error {
    Error::invalid_arg("step", "slice step cannot be zero")
}

/// Views compare equal when they hold equal cells from the same source
/// positions, whatever their labels.
impl PartialEq for SliceView {
    fn eq(&self, other: &Self) -> bool {
        self.depth == other.depth
            && self.selection == other.selection
            && self.cells == other.cells
    }
}

impl fmt::Display for SliceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.len();
        let noun = if n == 1 { "item" } else { "items" };
        write!(f, "SliceView({} with {n} {noun})", self.label)
    }
}

impl fmt::Debug for SliceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceView")
            .field("label", &self.label)
            .field("depth", &self.depth)
            .field("len", &self.len())
            .field("element_type", &self.element_type.as_ref().map(|t| t.name()))
            .finish_non_exhaustive()
    }
}

impl<'a> IntoIterator for &'a SliceView {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Slicing of structure arrays into views.
pub trait StructArraySlice {
    /// Returns a depth-0 view over the elements selected by `spec`.
    fn slice(&self, spec: impl Into<SliceSpec>) -> Result<SliceView>;

    /// Returns a view over all elements, `[:]`.
    fn view(&self) -> Result<SliceView> {
        self.slice(SliceSpec::full())
    }
}

impl StructArraySlice for StructArray {
    fn slice(&self, spec: impl Into<SliceSpec>) -> Result<SliceView> {
        SliceView::from_array(self, spec)
    }
}
