use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::OffsetDateTime;

///
/// Field
///
/// One field descriptor inside a class. The type tag is free-form (the
/// admin surface decides what to render); the hints are optional and only
/// meaningful for certain tags.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Field {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub sort: bool,
    #[serde(default)]
    pub column: u32,
    #[serde(default)]
    pub min: String,
    #[serde(default)]
    pub max: String,
    #[serde(default)]
    pub step: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub options: String,
    #[serde(default)]
    pub class_id: String,
    #[serde(default)]
    pub field: String,
}

///
/// Class
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Class {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated: OffsetDateTime,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Class {
    /// Names of the fields flagged sortable, in declaration order.
    #[must_use]
    pub fn sort_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.sort)
            .map(|field| field.name.as_str())
            .collect()
    }

    /// Field names must be unique within the class.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(Error::validation("field name must not be empty"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(Error::validation(format!(
                    "duplicate field name: {}",
                    field.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for Class {
    fn default() -> Self {
        Self {
            id: String::new(),
            parent_id: None,
            name: String::new(),
            created: OffsetDateTime::UNIX_EPOCH,
            updated: OffsetDateTime::UNIX_EPOCH,
            fields: Vec::new(),
        }
    }
}
