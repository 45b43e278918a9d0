use crate::{error::Error, model::range::RangeQuery};
use serde_json::Value;
use std::collections::BTreeMap;

///
/// SortDirection
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Accepts `ASC`/`DESC` in any case; anything else (including empty)
    /// means ascending, matching the boundary layer's leniency.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("desc") {
            Self::Descending
        } else {
            Self::Ascending
        }
    }

    #[must_use]
    pub const fn is_descending(self) -> bool {
        matches!(self, Self::Descending)
    }
}

///
/// SortOrder
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

impl SortOrder {
    #[must_use]
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    #[must_use]
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Parse the boundary `sort` parameter: a JSON 2-element array
    /// `[field, "ASC"|"DESC"]`. A `values.` prefix on the field name is
    /// stripped; the admin surface uses it to address document values.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let values: Vec<String> = serde_json::from_str(raw)
            .map_err(|err| Error::bad_filter(format!("invalid sort: {err}")))?;
        if values.len() != 2 {
            return Err(Error::bad_filter(format!(
                "expect exactly 2 sort elements; got {}",
                values.len()
            )));
        }

        let field = values[0]
            .strip_prefix("values.")
            .unwrap_or(&values[0])
            .to_string();
        Ok(Self {
            field,
            direction: SortDirection::parse(&values[1]),
        })
    }
}

///
/// FilterParam
///
/// The boundary `filter` parameter: a JSON object that is either a bulk id
/// selection `{"id": [...]}` or a set of field equality predicates.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FilterParam {
    pub ids: Vec<String>,
    pub fields: BTreeMap<String, String>,
}

impl FilterParam {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let object: BTreeMap<String, Value> = serde_json::from_str(raw)
            .map_err(|err| Error::bad_filter(format!("invalid filter: {err}")))?;

        let mut param = Self::default();
        for (key, value) in object {
            if key == "id" {
                param.ids = serde_json::from_value(value)
                    .map_err(|err| Error::bad_filter(format!("invalid id list: {err}")))?;
            } else {
                let Value::String(value) = value else {
                    return Err(Error::bad_filter(format!(
                        "filter field {key} must be a string"
                    )));
                };
                param.fields.insert(key, value);
            }
        }
        Ok(param)
    }
}

///
/// Entity filters
///

#[derive(Clone, Debug, Default)]
pub struct ClassFilter {
    pub range: RangeQuery,
}

#[derive(Clone, Debug, Default)]
pub struct DocumentFilter {
    pub class_id: Option<String>,
    pub parent_id: Option<String>,
    /// Non-empty selects bulk fetch and bypasses sorting and slicing.
    pub ids: Vec<String>,
    pub sort: Option<SortOrder>,
    pub range: RangeQuery,
}

impl DocumentFilter {
    /// Fold a parsed boundary filter parameter in: ids select bulk fetch,
    /// `parent_id` narrows, anything else is ignored here.
    pub fn apply_param(&mut self, param: FilterParam) {
        self.ids = param.ids;
        if let Some(parent_id) = param.fields.get("parent_id") {
            self.parent_id = Some(parent_id.clone());
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FormFilter {
    pub range: RangeQuery,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TemplateSort {
    #[default]
    Name,
    Created,
}

#[derive(Clone, Debug, Default)]
pub struct TemplateFilter {
    pub sort: TemplateSort,
    pub reverse: bool,
    pub range: RangeQuery,
}
