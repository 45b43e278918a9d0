use marrow_core::{error::Error as CoreError, store::StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
///
/// Public error type with a stable kind taxonomy. Core errors map onto it
/// without losing their message; callers branch on the kind and map it to
/// transport codes (`BadRange` → a range-not-satisfiable style response,
/// `Conflict` → a conflict response, and so on).
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The true item total attached to an out-of-range request, for
    /// `x-y/total` style feedback.
    #[must_use]
    pub const fn range_size(&self) -> Option<usize> {
        match self.kind {
            ErrorKind::BadRange { size } => Some(size),
            _ => None,
        }
    }
}

impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        let kind = match &err {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::BadRange { size, .. } => ErrorKind::BadRange { size: *size },
            CoreError::BadFilter(_) => ErrorKind::BadFilter,
            CoreError::Conflict { .. } => ErrorKind::Conflict,
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::Storage { .. } => ErrorKind::Storage,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        let kind = if err.is_not_found() {
            ErrorKind::NotFound
        } else {
            ErrorKind::Storage
        };
        Self::new(kind, err.to_string())
    }
}

///
/// ErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// A point lookup missed.
    NotFound,

    /// The requested window starts at or past the item total.
    BadRange { size: usize },

    /// A range/sort/filter encoding could not be parsed.
    BadFilter,

    /// The path is owned by a different, live document.
    Conflict,

    /// Entity construction or precondition failure.
    Validation,

    /// Opaque backing-store failure; the caller cannot remediate this.
    Storage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_range_keeps_the_total() {
        let err = Error::from(CoreError::BadRange { start: 10, size: 7 });
        assert_eq!(err.kind, ErrorKind::BadRange { size: 7 });
        assert_eq!(err.range_size(), Some(7));
    }

    #[test]
    fn conflict_maps_with_its_message() {
        let err = Error::from(CoreError::Conflict {
            path: "/home".to_string(),
            owner: "d1".to_string(),
        });
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(err.message.contains("/home"));
    }
}
