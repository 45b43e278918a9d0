use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

///
/// Template
///
/// Render template with full version history: every update appends a frozen
/// snapshot carrying its own body, and the current record always mirrors
/// the newest version.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Template {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated: OffsetDateTime,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            version: 0,
            body: String::new(),
            created: OffsetDateTime::UNIX_EPOCH,
            updated: OffsetDateTime::UNIX_EPOCH,
        }
    }
}
