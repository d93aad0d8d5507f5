//! Iteration domain of the data-parallel kernels.

// External dependencies
use core::ops::Range;

/// The logical index domain `[start, end)` of a kernel launch.
///
/// Stateless and cheap to copy; backends regenerate iterators from it for
/// every kernel call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    /// First index (inclusive).
    pub start: usize,
    /// One past the last index.
    pub end: usize,
}

impl IndexRange {
    /// Domain `[0, n)`.
    pub fn new(n: usize) -> Self {
        Self { start: 0, end: n }
    }

    /// Number of indices.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the domain holds no index.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterator over every index in order.
    #[inline]
    pub fn iter(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Split into consecutive sub-ranges of at most `block_size` indices.
    pub fn blocks(&self, block_size: usize) -> impl Iterator<Item = IndexRange> + use<> {
        let step = block_size.max(1);
        let end = self.end;
        (self.start..end).step_by(step).map(move |start| IndexRange {
            start,
            end: (start + step).min(end),
        })
    }

    /// Number of blocks of `block_size` needed to cover the domain.
    pub fn block_count(&self, block_size: usize) -> usize {
        self.len().div_ceil(block_size.max(1))
    }
}

impl IntoIterator for IndexRange {
    type Item = usize;
    type IntoIter = Range<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
