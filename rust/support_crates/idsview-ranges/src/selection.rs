//! Ordered lists of source indices.

use std::{ops::Range, sync::Arc};

use crate::slice_spec::StridedRange;

/// The ordered list of source indices a view was built from.
///
/// A `Selection` is immutable and cheap to clone. Selecting from a selection
/// ([`Selection::pick`]) produces another selection over the same source
/// positions, which is how slices of slices compose without going back to
/// the source.
///
/// Indices may appear in any order (a negative step produces a descending
/// selection) and are not required to be unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selection(Arc<[usize]>);

impl Selection {
    /// Selects every position of a sequence of length `len`, in order.
    pub fn all(len: usize) -> Selection {
        Selection((0..len).collect())
    }

    pub fn empty() -> Selection {
        Selection(Arc::from([]))
    }

    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Selection {
        Selection(indices.into_iter().collect())
    }

    /// Resolves a strided range directly into a selection over the source.
    pub fn from_range(range: &StridedRange) -> Selection {
        Selection(range.iter().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the source index at position `pos` of this selection.
    pub fn get(&self, pos: usize) -> Option<usize> {
        self.0.get(pos).copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, usize>> {
        self.0.iter().copied()
    }

    /// Composes a range resolved against `self.len()` with this selection.
    ///
    /// The result holds `self[range[0]], self[range[1]], ...`, i.e. source
    /// indices rather than positions within `self`.
    ///
    /// # Panics
    ///
    /// Panics if `range` was resolved against a length greater than `self.len()`.
    pub fn pick(&self, range: &StridedRange) -> Selection {
        Selection(range.iter().map(|pos| self.0[pos]).collect())
    }

    /// Returns `true` if the selection is `0, 1, ..., len - 1`.
    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &index)| i == index)
    }

    /// Groups the selection into maximal runs of consecutive ascending indices.
    ///
    /// `[2, 3, 4, 9, 5]` yields `[2..5, 9..10, 5..6]`. Used to describe load
    /// requests compactly.
    pub fn runs(&self) -> Vec<Range<usize>> {
        let mut runs: Vec<Range<usize>> = Vec::new();
        for &index in self.0.iter() {
            match runs.last_mut() {
                Some(last) if last.end == index => last.end += 1,
                _ => runs.push(index..index + 1),
            }
        }
        runs
    }
}

impl FromIterator<usize> for Selection {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Selection::from_indices(iter)
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = usize;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
