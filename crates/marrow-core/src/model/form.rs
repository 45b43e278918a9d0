use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

///
/// Form
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Form {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated: OffsetDateTime,
    /// Open schema payload rendered by the admin surface.
    #[serde(default)]
    pub schema: Value,
}

impl Default for Form {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            created: OffsetDateTime::UNIX_EPOCH,
            updated: OffsetDateTime::UNIX_EPOCH,
            schema: Value::Null,
        }
    }
}
