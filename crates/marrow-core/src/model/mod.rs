//! The content model: classes with field descriptors, documents with open
//! value maps, forms, templates, plus the range/sort/filter vocabulary the
//! boundary layer feeds into the repositories.

mod class;
mod document;
mod filter;
mod form;
mod range;
mod template;

pub use class::{Class, Field};
pub use document::Document;
pub use filter::{
    ClassFilter, DocumentFilter, FilterParam, FormFilter, SortDirection, SortOrder,
    TemplateFilter, TemplateSort,
};
pub use form::Form;
pub use range::{RangeQuery, RangeResult};
pub use template::Template;
