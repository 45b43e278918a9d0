//! Denormalized secondary structures: ordering records for sortable fields
//! and the unique path mapping. Both are maintained eagerly on every
//! document write and exist only while the owning document exists.

pub(crate) mod path;
pub(crate) mod sort;
