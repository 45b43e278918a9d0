//! Composite key scheme: pure functions from entity kind + id (+ version)
//! to the (partition key, sort key) pair the backing store addresses by.
//! Versioned sort keys are zero-padded so lexicographic order equals
//! version order, with version 0 reserved for the mutable "current" record.

use serde_json::Value;
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

pub(crate) const CLASS_PREFIX: &str = "class#";
pub(crate) const DOCUMENT_PREFIX: &str = "doc#";
pub(crate) const FORM_PREFIX: &str = "form#";
pub(crate) const PATH_PREFIX: &str = "path#";
pub(crate) const SORT_PREFIX: &str = "sort#";
pub(crate) const TEMPLATE_PREFIX: &str = "template#";

/// The reserved version of the mutable "current" record; frozen snapshots
/// count up from 1.
pub const CURRENT_VERSION: u32 = 0;

/// Normalized sort values are capped at this many characters in the key.
pub const SORT_VALUE_LEN: usize = 64;

#[must_use]
pub fn class_key(id: &str) -> (String, String) {
    (format!("{CLASS_PREFIX}{id}"), "class".to_string())
}

#[must_use]
pub fn document_key(id: &str, version: u32) -> (String, String) {
    (
        format!("{DOCUMENT_PREFIX}{id}"),
        format!("{DOCUMENT_PREFIX}v{version:06}"),
    )
}

#[must_use]
pub fn form_key(id: &str) -> (String, String) {
    (format!("{FORM_PREFIX}{id}"), "form".to_string())
}

#[must_use]
pub fn path_key(path: &str) -> (String, String) {
    (format!("{PATH_PREFIX}{path}"), "path".to_string())
}

#[must_use]
pub fn template_key(id: &str, version: u32) -> (String, String) {
    (
        format!("{TEMPLATE_PREFIX}{id}"),
        format!("{TEMPLATE_PREFIX}v{version:06}"),
    )
}

/// Partition key shared by every sort record for (class, field).
#[must_use]
pub fn sort_partition(class_id: &str, field: &str) -> String {
    format!("{SORT_PREFIX}{class_id}#{field}")
}

/// Full composite key of one sort record. The document id suffix makes the
/// sort key unique and breaks value ties in ascending id order.
#[must_use]
pub fn sort_key(class_id: &str, field: &str, document_id: &str, value: &Value) -> (String, String) {
    let mut normalized = normalize_sort_value(value);
    if let Some((cut, _)) = normalized.char_indices().nth(SORT_VALUE_LEN) {
        normalized.truncate(cut);
    }
    (
        sort_partition(class_id, field),
        format!("{normalized}#{document_id}"),
    )
}

/// Render a field value as a lexicographically sortable string. Strings
/// that parse as RFC 3339 timestamps are re-rendered in UTC so offset
/// variants of the same instant collate together; everything else uses its
/// natural display form.
#[must_use]
pub fn normalize_sort_value(value: &Value) -> String {
    match value {
        Value::String(text) => OffsetDateTime::parse(text, &Rfc3339).map_or_else(
            |_| text.clone(),
            |stamp| {
                stamp
                    .to_offset(UtcOffset::UTC)
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| text.clone())
            },
        ),
        other => other.to_string(),
    }
}
