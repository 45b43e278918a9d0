use crate::store::StoreError;
use thiserror::Error as ThisError;

///
/// Error
///
/// Repository-level taxonomy. The adapter and index layers return typed
/// errors; the repositories classify them and pass them upward unchanged.
/// Nothing in this crate retries.
///

#[derive(Debug, ThisError)]
pub enum Error {
    /// A point lookup missed.
    #[error("{entity} does not exist: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The requested window starts at or past the total item count. The
    /// total still travels with the error so callers can report
    /// `x-y/total` style feedback.
    #[error("range start {start} is past the last item ({size} total)")]
    BadRange { start: usize, size: usize },

    /// A range/sort/filter query encoding could not be parsed.
    #[error("invalid filter: {0}")]
    BadFilter(String),

    /// The target path is already owned by a different, live document.
    #[error("path already in use: {path} (document {owner})")]
    Conflict { path: String, owner: String },

    /// Entity construction or precondition failure (id supplied on create,
    /// missing class id, duplicate field names).
    #[error("{0}")]
    Validation(String),

    /// Opaque backing-store failure, wrapped with the operation that hit it.
    #[error("{op}: {source}")]
    Storage {
        op: &'static str,
        #[source]
        source: StoreError,
    },
}

impl Error {
    /// Classify a point-lookup failure: key absence becomes `NotFound` for
    /// the entity at hand, anything else stays a storage failure.
    pub(crate) fn lookup(entity: &'static str, id: impl Into<String>, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound {
                entity,
                id: id.into(),
            },
            source => Self::Storage { op: "get", source },
        }
    }

    pub(crate) fn storage(op: &'static str) -> impl Fn(StoreError) -> Self {
        move |source| Self::Storage { op, source }
    }

    pub(crate) fn bad_filter(message: impl Into<String>) -> Self {
        Self::BadFilter(message.into())
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
