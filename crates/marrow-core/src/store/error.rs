use thiserror::Error as ThisError;

///
/// StoreError
///
/// Adapter-level failures. Key absence is its own condition so callers can
/// tell "no such item" apart from transport or codec trouble.
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("item does not exist: {pk} / {sk}")]
    NotFound { pk: String, sk: String },

    #[error("item is missing its {0} attribute")]
    MissingKey(&'static str),

    #[error("item encode/decode failed: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("backing store failure: {0}")]
    Backend(String),
}

impl StoreError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
