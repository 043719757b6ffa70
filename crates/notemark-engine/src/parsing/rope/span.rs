/// A byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

/// Maps byte offsets in a block's joined content back to the source text.
///
/// Block content is assembled from line remainders with container prefixes
/// stripped, so a local offset is only meaningful together with the line it
/// came from. Each segment records where a line starts locally and where it
/// starts in the source.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    segments: Vec<(usize, usize)>,
}

impl SourceMap {
    /// A map for content copied verbatim from `base` onwards.
    pub fn contiguous(base: usize) -> Self {
        Self {
            segments: vec![(0, base)],
        }
    }

    /// Records that local offset `local` corresponds to source offset `absolute`.
    /// Segments must be pushed in increasing local order.
    pub fn push(&mut self, local: usize, absolute: usize) {
        self.segments.push((local, absolute));
    }

    /// Translates a local offset to a source offset.
    pub fn absolute(&self, local: usize) -> usize {
        let idx = self.segments.partition_point(|(l, _)| *l <= local);
        match idx.checked_sub(1).and_then(|i| self.segments.get(i)) {
            Some((l, a)) => a + (local - l),
            None => local,
        }
    }
}
