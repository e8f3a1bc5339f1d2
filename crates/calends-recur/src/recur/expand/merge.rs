//! K-way merge of ascending occurrence streams.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use chrono::NaiveDateTime;

use crate::recur::core::{MatchMode, Occurrence};

pub(super) type Stream<'a> = Box<dyn Iterator<Item = Occurrence> + Send + 'a>;

/// Head of one source stream.
///
/// Uses reversed ordering so `BinaryHeap` (a max-heap) behaves as a min-heap.
/// Ties go to the lower source index.
#[derive(Debug)]
struct Head {
    key: NaiveDateTime,
    source: usize,
    occurrence: Occurrence,
}

impl PartialEq for Head {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Head {}

impl Ord for Head {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.source.cmp(&self.source))
    }
}

impl PartialOrd for Head {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Merges streams that are each ascending under `mode` into one ascending stream.
///
/// Duplicates are kept; only one occurrence per source is buffered.
pub(super) struct Merged<'a> {
    mode: MatchMode,
    sources: Vec<Stream<'a>>,
    heap: BinaryHeap<Head>,
}

impl<'a> Merged<'a> {
    pub(super) fn new(mode: MatchMode, sources: Vec<Stream<'a>>) -> Self {
        let mut merged = Self {
            mode,
            heap: BinaryHeap::with_capacity(sources.len()),
            sources,
        };
        for source in 0..merged.sources.len() {
            merged.refill(source);
        }
        merged
    }

    fn refill(&mut self, source: usize) {
        if let Some(occurrence) = self.sources.get_mut(source).and_then(Iterator::next) {
            self.heap.push(Head {
                key: occurrence.key(self.mode),
                source,
                occurrence,
            });
        }
    }

    /// Key of the next occurrence without consuming it.
    pub(super) fn peek_key(&self) -> Option<NaiveDateTime> {
        self.heap.peek().map(|head| head.key)
    }
}

impl Iterator for Merged<'_> {
    type Item = (NaiveDateTime, Occurrence);

    fn next(&mut self) -> Option<Self::Item> {
        let head = self.heap.pop()?;
        self.refill(head.source);
        Some((head.key, head.occurrence))
    }
}
