//! Slice specifications with standard `start:stop:step` semantics.

use std::fmt;

/// An unresolved slice specification: `[start:stop:step]`.
///
/// Each bound is optional. Resolution against a sequence length follows the
/// usual slicing rules:
/// - `stop` is exclusive;
/// - negative `start`/`stop` are counted from the end of the sequence;
/// - out-of-bounds values are clamped rather than rejected;
/// - a negative `step` walks the sequence backwards, with the default bounds
///   swapped accordingly;
/// - a zero `step` cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SliceSpec {
    pub start: Option<isize>,
    pub stop: Option<isize>,
    pub step: Option<isize>,
}

impl SliceSpec {
    pub fn new(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> SliceSpec {
        SliceSpec { start, stop, step }
    }

    /// The full range, `[:]`.
    pub fn full() -> SliceSpec {
        SliceSpec::default()
    }

    /// `[start:stop]`.
    pub fn range(start: isize, stop: isize) -> SliceSpec {
        SliceSpec::new(Some(start), Some(stop), None)
    }

    /// `[start:]`.
    pub fn from_start(start: isize) -> SliceSpec {
        SliceSpec::new(Some(start), None, None)
    }

    /// `[:stop]`.
    pub fn until(stop: isize) -> SliceSpec {
        SliceSpec::new(None, Some(stop), None)
    }

    /// Returns a copy of this specification with the given step.
    pub fn with_step(mut self, step: isize) -> SliceSpec {
        self.step = Some(step);
        self
    }

    /// Returns `true` if all bounds are absent, i.e. the spec is `[:]`.
    pub fn is_full(&self) -> bool {
        self.start.is_none() && self.stop.is_none() && matches!(self.step, None | Some(1))
    }

    /// Resolves this specification against a sequence of length `len`.
    ///
    /// Returns `None` if the step is zero.
    pub fn resolve(&self, len: usize) -> Option<StridedRange> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return None;
        }
        let len = len as isize;
        let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };

        let clamp = |bound: isize| {
            if bound < 0 {
                (bound + len).max(lower)
            } else {
                bound.min(upper)
            }
        };

        let start = match self.start {
            Some(start) => clamp(start),
            None if step > 0 => lower,
            None => upper,
        };
        let stop = match self.stop {
            Some(stop) => clamp(stop),
            None if step > 0 => upper,
            None => lower,
        };

        let span = if step > 0 { stop - start } else { start - stop };
        let count = if span > 0 {
            (span as usize - 1) / step.unsigned_abs() + 1
        } else {
            0
        };

        Some(StridedRange {
            start,
            step,
            len: count,
        })
    }
}

/// Formats the specification the way it would be written in an index
/// expression, e.g. `[5:8]`, `[::2]`, `[-3:]` or `[:]`.
impl fmt::Display for SliceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: Option<isize>| b.map(|b| b.to_string()).unwrap_or_default();
        match self.step {
            Some(step) => write!(f, "[{}:{}:{}]", bound(self.start), bound(self.stop), step),
            None => write!(f, "[{}:{}]", bound(self.start), bound(self.stop)),
        }
    }
}

impl From<std::ops::RangeFull> for SliceSpec {
    fn from(_: std::ops::RangeFull) -> Self {
        SliceSpec::full()
    }
}

impl From<std::ops::Range<isize>> for SliceSpec {
    fn from(r: std::ops::Range<isize>) -> Self {
        SliceSpec::range(r.start, r.end)
    }
}

impl From<std::ops::RangeFrom<isize>> for SliceSpec {
    fn from(r: std::ops::RangeFrom<isize>) -> Self {
        SliceSpec::from_start(r.start)
    }
}

impl From<std::ops::RangeTo<isize>> for SliceSpec {
    fn from(r: std::ops::RangeTo<isize>) -> Self {
        SliceSpec::until(r.end)
    }
}

/// A slice specification resolved against a concrete length.
///
/// All positions yielded by a `StridedRange` are valid indices into the
/// sequence it was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StridedRange {
    start: isize,
    step: isize,
    len: usize,
}

impl StridedRange {
    /// The number of positions in the range.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn step(&self) -> isize {
        self.step
    }

    /// Returns the `i`-th position of the range, or `None` if `i >= len()`.
    pub fn get(&self, i: usize) -> Option<usize> {
        (i < self.len).then(|| (self.start + i as isize * self.step) as usize)
    }

    pub fn iter(&self) -> StridedRangeIter {
        StridedRangeIter {
            range: *self,
            next: 0,
        }
    }
}

impl IntoIterator for StridedRange {
    type Item = usize;
    type IntoIter = StridedRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct StridedRangeIter {
    range: StridedRange,
    next: usize,
}

impl Iterator for StridedRangeIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let pos = self.range.get(self.next)?;
        self.next += 1;
        Some(pos)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.range.len - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for StridedRangeIter {}

/// Maps a possibly negative index onto `[0, len)`.
///
/// `-1` designates the last element. Returns `None` when `index` lies outside
/// `[-len, len - 1]`.
pub fn normalize_index(index: isize, len: usize) -> Option<usize> {
    let len = len as isize;
    let index = if index < 0 { index + len } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(spec: SliceSpec, len: usize) -> Vec<usize> {
        spec.resolve(len).unwrap().iter().collect()
    }

    #[test]
    fn test_basic_ranges() {
        assert_eq!(positions(SliceSpec::range(3, 7), 10), vec![3, 4, 5, 6]);
        assert_eq!(positions(SliceSpec::full(), 4), vec![0, 1, 2, 3]);
        assert_eq!(
            positions(SliceSpec::full().with_step(2), 10),
            vec![0, 2, 4, 6, 8]
        );
        assert_eq!(positions(SliceSpec::from_start(-5), 10), vec![5, 6, 7, 8, 9]);
        assert_eq!(positions(SliceSpec::until(-8), 10), vec![0, 1]);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(positions(SliceSpec::range(0, 100), 10).len(), 10);
        assert!(positions(SliceSpec::range(10, 20), 10).is_empty());
        assert_eq!(positions(SliceSpec::range(-100, 2), 10), vec![0, 1]);
        assert!(positions(SliceSpec::range(7, 3), 10).is_empty());
    }

    #[test]
    fn test_negative_step() {
        assert_eq!(
            positions(SliceSpec::full().with_step(-1), 5),
            vec![4, 3, 2, 1, 0]
        );
        assert_eq!(
            positions(SliceSpec::new(Some(8), Some(2), Some(-3)), 10),
            vec![8, 5]
        );
        assert_eq!(
            positions(SliceSpec::new(Some(-1), Some(-100), Some(-4)), 10),
            vec![9, 5, 1]
        );
        assert!(positions(SliceSpec::range(2, 8).with_step(-1), 10).is_empty());
    }

    #[test]
    fn test_extreme_steps() {
        assert_eq!(positions(SliceSpec::full().with_step(isize::MIN), 3), vec![2]);
        assert_eq!(positions(SliceSpec::full().with_step(isize::MAX), 3), vec![0]);
        assert_eq!(
            positions(SliceSpec::new(Some(isize::MIN), Some(isize::MAX), Some(isize::MAX)), 3),
            vec![0]
        );
        assert!(positions(SliceSpec::full().with_step(isize::MIN), 0).is_empty());
    }

    #[test]
    fn test_empty_sequence() {
        assert!(positions(SliceSpec::full(), 0).is_empty());
        assert!(positions(SliceSpec::full().with_step(-1), 0).is_empty());
        assert!(positions(SliceSpec::from_start(-3), 0).is_empty());
    }

    #[test]
    fn test_zero_step() {
        assert!(SliceSpec::full().with_step(0).resolve(10).is_none());
    }

    #[test]
    fn test_len_matches_iteration() {
        for len in 0..12usize {
            for start in -14..14isize {
                for stop in -14..14isize {
                    for step in [-3isize, -2, -1, 1, 2, 5] {
                        let spec = SliceSpec::new(Some(start), Some(stop), Some(step));
                        let range = spec.resolve(len).unwrap();
                        let all = range.iter().collect::<Vec<_>>();
                        assert_eq!(all.len(), range.len(), "{spec} over {len}");
                        assert!(all.iter().all(|&p| p < len), "{spec} over {len}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(SliceSpec::range(5, 8).to_string(), "[5:8]");
        assert_eq!(SliceSpec::full().to_string(), "[:]");
        assert_eq!(SliceSpec::full().with_step(2).to_string(), "[::2]");
        assert_eq!(SliceSpec::from_start(-3).to_string(), "[-3:]");
        assert_eq!(
            SliceSpec::new(Some(1), Some(9), Some(-2)).to_string(),
            "[1:9:-2]"
        );
    }

    #[test]
    fn test_from_std_ranges() {
        assert_eq!(SliceSpec::from(..), SliceSpec::full());
        assert_eq!(SliceSpec::from(2..4), SliceSpec::range(2, 4));
        assert_eq!(SliceSpec::from(-3..), SliceSpec::from_start(-3));
        assert_eq!(SliceSpec::from(..2), SliceSpec::until(2));
        assert!(SliceSpec::from(..).is_full());
        assert!(!SliceSpec::from(..2).is_full());
    }

    #[test]
    fn test_normalize_index() {
        assert_eq!(normalize_index(0, 3), Some(0));
        assert_eq!(normalize_index(-1, 3), Some(2));
        assert_eq!(normalize_index(-3, 3), Some(0));
        assert_eq!(normalize_index(3, 3), None);
        assert_eq!(normalize_index(-4, 3), None);
        assert_eq!(normalize_index(0, 0), None);
    }
}
