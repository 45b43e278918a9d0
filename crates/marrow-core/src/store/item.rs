use crate::store::StoreError;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// One stored item: a JSON attribute map carrying its own `PK`/`SK`
/// attributes alongside the record payload.
pub type Item = Map<String, Value>;

/// Attribute holding the partition key.
pub const PARTITION_KEY: &str = "PK";

/// Attribute holding the sort key.
pub const SORT_KEY: &str = "SK";

/// Pull the composite key out of an item.
pub fn item_keys(item: &Item) -> Result<(&str, &str), StoreError> {
    let pk = item
        .get(PARTITION_KEY)
        .and_then(Value::as_str)
        .ok_or(StoreError::MissingKey(PARTITION_KEY))?;
    let sk = item
        .get(SORT_KEY)
        .and_then(Value::as_str)
        .ok_or(StoreError::MissingKey(SORT_KEY))?;
    Ok((pk, sk))
}

/// Serialize a record struct into an attribute map.
pub fn to_item<T: Serialize>(record: &T) -> Result<Item, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::Backend(
            "record did not serialize to an object".to_string(),
        )),
    }
}

/// Deserialize an attribute map into a record struct.
pub fn from_item<T: DeserializeOwned>(item: Item) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(item))?)
}

/// A string attribute, or the empty string if absent or non-string.
#[must_use]
pub fn str_attr<'a>(item: &'a Item, name: &str) -> &'a str {
    item.get(name).and_then(Value::as_str).unwrap_or_default()
}
