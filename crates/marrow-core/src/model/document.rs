use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

///
/// Document
///
/// A content item belonging to exactly one class. The `values` map is open:
/// keys are field names from the owning class, values arbitrary JSON. A
/// non-empty `path` is globally unique across documents. The version
/// counter starts at 1 on create and increases on every update; version 0
/// is the storage layer's reserved "current" sentinel and never appears
/// here.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Document {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub class_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub version: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated: OffsetDateTime,
    #[serde(default)]
    pub values: Map<String, Value>,
}

impl Document {
    /// The path as a comparable string; absent and empty are equivalent.
    #[must_use]
    pub fn path_str(&self) -> &str {
        self.path.as_deref().unwrap_or_default()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self {
            id: String::new(),
            class_id: String::new(),
            parent_id: None,
            template_id: None,
            path: None,
            version: 0,
            created: OffsetDateTime::UNIX_EPOCH,
            updated: OffsetDateTime::UNIX_EPOCH,
            values: Map::new(),
        }
    }
}
