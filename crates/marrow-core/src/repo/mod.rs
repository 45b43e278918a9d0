//! The repository core: per-entity CRUD + list contracts and the
//! key-value-backed implementation composing the adapter, the composite
//! key scheme, the range slicer, and the sort/path index maintainers.

mod class;
mod document;
mod form;
mod template;

pub use class::ClassRepository;
pub use document::DocumentRepository;
pub use form::FormRepository;
pub use template::TemplateRepository;

use crate::{
    error::Error,
    id::{IdProvider, UlidProvider},
    model::{RangeQuery, RangeResult},
    slicer::Slicer,
    store::KeyValueBackend,
};
use time::OffsetDateTime;

///
/// Repository
///
/// The full contract an application programs against. Alternate backings
/// (relational, remote) implement the same per-entity traits.
///

pub trait Repository:
    ClassRepository + DocumentRepository + FormRepository + TemplateRepository
{
}

impl<T> Repository for T where
    T: ClassRepository + DocumentRepository + FormRepository + TemplateRepository
{
}

///
/// KvRepository
///
/// All entity repositories over one key-value backend. Id generation is an
/// injected dependency so tests and alternate deployments control id shape
/// and ordering.
///

#[derive(Debug)]
pub struct KvRepository<B, I = UlidProvider> {
    backend: B,
    ids: I,
}

impl<B, I> KvRepository<B, I>
where
    B: KeyValueBackend,
    I: IdProvider,
{
    pub const fn new(backend: B, ids: I) -> Self {
        Self { backend, ids }
    }

    /// Direct access to the backing store, mostly for tests and tooling.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub(crate) fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    /// Mint an id for a freshly created entity; the caller must not have
    /// supplied one.
    pub(crate) fn mint_id(
        &self,
        entity: &'static str,
        current: &str,
        at: OffsetDateTime,
    ) -> Result<String, Error> {
        if !current.is_empty() {
            return Err(Error::validation(format!("{entity} already has an id")));
        }
        Ok(self.ids.generate_at(at))
    }
}

/// Run an already collected, already sorted result list through the slicer
/// so one-shot listings report windows identically to chunked scans.
pub(crate) fn slice_window<T>(items: Vec<T>, range: RangeQuery) -> (Vec<T>, usize) {
    let total = items.len();
    let mut slicer = Slicer::new(range.start, range.end);
    slicer.add(total);
    let window = slicer.chunk_range();

    let kept = items
        .into_iter()
        .skip(window.start)
        .take(window.len())
        .collect();
    (kept, total)
}

/// Realize the reported window. An empty table is a valid empty result; a
/// start at or past a non-zero total is out of range, and the error still
/// carries the total.
pub(crate) fn finish_range(
    range: RangeQuery,
    total: usize,
    returned: usize,
) -> Result<RangeResult, Error> {
    if total == 0 {
        return Ok(RangeResult::default());
    }
    if range.start >= total {
        return Err(Error::BadRange {
            start: range.start,
            size: total,
        });
    }
    Ok(RangeResult {
        start: range.start,
        end: range.start + returned.saturating_sub(1),
        size: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_totals_are_not_range_errors() {
        let result = finish_range(RangeQuery::default(), 0, 0).expect("empty ok");
        assert!(result.is_zero());
    }

    #[test]
    fn start_past_total_is_bad_range_with_the_total() {
        let err = finish_range(RangeQuery::new(10, 19), 7, 0).unwrap_err();
        assert!(matches!(err, Error::BadRange { start: 10, size: 7 }));
    }

    #[test]
    fn window_end_reflects_what_was_returned() {
        let result = finish_range(RangeQuery::new(5, 14), 8, 3).expect("ok");
        assert_eq!(result.start, 5);
        assert_eq!(result.end, 7);
        assert_eq!(result.size, 8);
    }

    #[test]
    fn slice_window_clamps_to_the_collection() {
        let (kept, total) = slice_window((0..10).collect(), RangeQuery::new(7, 99));
        assert_eq!(kept, vec![7, 8, 9]);
        assert_eq!(total, 10);
    }
}
