use crate::store::{Item, StoreError};

///
/// ScanDirection
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ScanDirection {
    #[default]
    Ascending,
    Descending,
}

///
/// ScanRequest
///
/// Selects the whole table or the items whose partition key starts with a
/// prefix. Chunks arrive in composite-key order for the scanned range;
/// `Descending` reverses that order. Prefix matching is the only narrowing
/// the backing store offers; anything finer is the caller's job.
///

#[derive(Clone, Debug, Default)]
pub struct ScanRequest {
    pub partition_prefix: Option<String>,
    pub direction: ScanDirection,
}

impl ScanRequest {
    /// Scan the entire table.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            partition_prefix: None,
            direction: ScanDirection::Ascending,
        }
    }

    /// Scan items whose partition key starts with `prefix`.
    #[must_use]
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            partition_prefix: Some(prefix.into()),
            direction: ScanDirection::Ascending,
        }
    }

    #[must_use]
    pub const fn direction(mut self, direction: ScanDirection) -> Self {
        self.direction = direction;
        self
    }
}

/// Lazy sequence of scan chunks; each chunk's size is known only on
/// arrival.
pub type ScanPages<'a> = Box<dyn Iterator<Item = Result<Vec<Item>, StoreError>> + 'a>;

///
/// KeyValueBackend
///
/// The full backing-store contract: point operations by composite key plus
/// the paginated scan. No conditional writes exist: `put` and `update` are
/// last-writer-wins, which is why path uniqueness upstream is best-effort.
///

pub trait KeyValueBackend {
    /// Point lookup. Key absence is `StoreError::NotFound`, distinct from
    /// any transport failure.
    fn get(&self, pk: &str, sk: &str) -> Result<Item, StoreError>;

    /// Unconditional overwrite. The item must carry its own `PK`/`SK`
    /// attributes.
    fn put(&self, item: Item) -> Result<(), StoreError>;

    /// Point delete; deleting an absent key is not an error.
    fn delete(&self, pk: &str, sk: &str) -> Result<(), StoreError>;

    /// Merge the given attributes into the item, creating it when absent.
    fn update(&self, pk: &str, sk: &str, fields: Item) -> Result<(), StoreError>;

    /// Chunked scan; see [`ScanRequest`].
    fn scan(&self, request: ScanRequest) -> ScanPages<'_>;
}
