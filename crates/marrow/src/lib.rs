//! Marrow: a queryable content store over a plain key-value backing.
//!
//! Typed classes describe fields; documents carry per-class values with
//! optional unique paths and full version history; forms and templates
//! round out the content model. The backing store needs nothing beyond
//! point get/put/delete/update and a paginated scan; ordering, filtering,
//! and bounded pagination are emulated by the core.
//!
//! ```
//! use marrow::prelude::*;
//!
//! let repo = marrow::memory();
//!
//! let mut class = Class {
//!     name: "Blog".to_string(),
//!     ..Class::default()
//! };
//! repo.create_class(&mut class)?;
//!
//! let mut doc = Document {
//!     class_id: class.id.clone(),
//!     ..Document::default()
//! };
//! repo.create_document(&mut doc)?;
//! assert_eq!(repo.get_document(&doc.id)?.version, 1);
//! # Ok::<(), marrow::Error>(())
//! ```

mod error;

pub use error::{Error, ErrorKind};

pub use marrow_core::{config, id, model, repo, slicer, store};

/// The core error type repository methods return; `?` converts it into the
/// public [`Error`].
pub use marrow_core::error::Error as CoreError;

use marrow_core::{id::UlidProvider, repo::KvRepository, store::MemoryBackend};

/// A repository over the in-tree memory backing.
pub type MemoryRepository = KvRepository<MemoryBackend, UlidProvider>;

/// Open a fresh, empty, memory-backed repository.
#[must_use]
pub fn memory() -> MemoryRepository {
    KvRepository::new(MemoryBackend::new(), UlidProvider)
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::error::{Error, ErrorKind};
    pub use marrow_core::prelude::*;
}
