use std::ops::Range;

///
/// Slicer
///
/// Incrementally carves an inclusive `[start, end]` window out of a stream
/// of chunks whose sizes are only known on arrival. Feed each chunk length
/// through [`add`](Self::add), then [`chunk_range`](Self::chunk_range) names
/// the half-open sub-range of that chunk to keep; the running
/// [`total`](Self::total) is the authoritative item count once the stream
/// is exhausted. Work stays proportional to chunks touched, never to the
/// total item count.
///

#[derive(Clone, Copy, Debug)]
pub struct Slicer {
    start: usize,
    end: usize,
    processed: usize,
    total: usize,
}

impl Slicer {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            processed: 0,
            total: 0,
        }
    }

    /// Record the arrival of the next chunk.
    pub const fn add(&mut self, chunk: usize) {
        self.processed = self.total;
        self.total += chunk;
    }

    /// The sub-range of the most recent chunk that falls inside the window.
    /// Empty when the chunk lies entirely before or after the window.
    #[must_use]
    pub fn chunk_range(&self) -> Range<usize> {
        let end = self.chunk_end();
        self.chunk_start().min(end)..end
    }

    /// Items seen so far; the true total once the stream is exhausted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Whether the window is fully delivered. A caller that does not need
    /// the final total may stop pulling chunks once this reports true.
    #[must_use]
    pub const fn satisfied(&self) -> bool {
        self.total > self.end
    }

    const fn chunk_start(&self) -> usize {
        // Window not reached yet.
        if self.total < self.start {
            return 0;
        }

        let chunk = self.total - self.processed;
        let past_start = self.total - self.start;
        // The window opens somewhere inside this chunk.
        if past_start < chunk {
            return chunk - past_start;
        }

        0
    }

    const fn chunk_end(&self) -> usize {
        if self.total < self.start {
            return 0;
        }

        let chunk = self.total - self.processed;
        let bound = self.end.saturating_add(1);
        // The window extends past everything seen so far.
        if self.total <= bound {
            return chunk;
        }
        let past_end = self.total - bound;
        // The window closes somewhere inside this chunk.
        if past_end < chunk {
            return chunk - past_end;
        }

        // An earlier chunk already satisfied the window.
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn window_covering_everything_keeps_whole_chunks() {
        let mut slicer = Slicer::new(0, 99);
        for _ in 0..10 {
            slicer.add(10);
            assert_eq!(slicer.chunk_range(), 0..10);
        }
    }

    #[test]
    fn single_item_window_lands_in_one_chunk() {
        let mut slicer = Slicer::new(54, 54);
        for i in 0..10 {
            slicer.add(10);
            if i == 5 {
                assert_eq!(slicer.chunk_range(), 4..5);
            } else {
                assert!(slicer.chunk_range().is_empty(), "chunk {i} must be empty");
            }
        }
    }

    #[test]
    fn window_at_the_front_spans_two_chunks() {
        let mut slicer = Slicer::new(0, 11);
        for i in 0..10 {
            slicer.add(10);
            match i {
                0 => assert_eq!(slicer.chunk_range(), 0..10),
                1 => assert_eq!(slicer.chunk_range(), 0..2),
                _ => assert!(slicer.chunk_range().is_empty()),
            }
        }
    }

    #[test]
    fn window_in_the_middle_opens_and_closes_mid_chunk() {
        let mut slicer = Slicer::new(47, 73);
        for i in 0..10 {
            slicer.add(10);
            match i {
                4 => assert_eq!(slicer.chunk_range(), 7..10),
                5 | 6 => assert_eq!(slicer.chunk_range(), 0..10),
                7 => assert_eq!(slicer.chunk_range(), 0..4),
                _ => assert!(slicer.chunk_range().is_empty()),
            }
        }
    }

    #[test]
    fn window_at_the_back_reaches_the_final_chunk() {
        let mut slicer = Slicer::new(88, 99);
        for i in 0..10 {
            slicer.add(10);
            match i {
                8 => assert_eq!(slicer.chunk_range(), 8..10),
                9 => assert_eq!(slicer.chunk_range(), 0..10),
                _ => assert!(slicer.chunk_range().is_empty()),
            }
        }
    }

    #[test]
    fn total_counts_every_chunk_even_after_satisfaction() {
        let mut slicer = Slicer::new(4, 5);
        for _ in 0..10 {
            slicer.add(10);
        }
        assert_eq!(slicer.total(), 100);
    }

    #[test]
    fn satisfied_flags_the_moment_the_window_is_delivered() {
        let mut slicer = Slicer::new(4, 5);
        slicer.add(4);
        assert!(!slicer.satisfied());
        slicer.add(2);
        assert!(slicer.satisfied());
    }

    proptest! {
        /// Any partition of `total` items into positive chunks must
        /// reconstruct exactly `items[start..=min(end, total - 1)]`, and the
        /// final count must equal `total`.
        #[test]
        fn reconstructs_the_window_from_any_chunking(
            chunks in proptest::collection::vec(1usize..40, 1..30),
            start in 0usize..200,
            len in 0usize..200,
        ) {
            let end = start + len;
            let total: usize = chunks.iter().sum();
            let items: Vec<usize> = (0..total).collect();

            let mut slicer = Slicer::new(start, end);
            let mut kept = Vec::new();
            let mut offset = 0;
            for &chunk in &chunks {
                slicer.add(chunk);
                let range = slicer.chunk_range();
                kept.extend_from_slice(&items[offset + range.start..offset + range.end]);
                offset += chunk;
            }

            let expected: Vec<usize> = items
                .iter()
                .copied()
                .skip(start)
                .take(end - start + 1)
                .collect();
            prop_assert_eq!(kept, expected);
            prop_assert_eq!(slicer.total(), total);
        }
    }
}
