use crate::{
    config::StoreConfig,
    store::{
        Item, KeyValueBackend, PARTITION_KEY, SORT_KEY, ScanDirection, ScanPages, ScanRequest,
        StoreError, item::item_keys,
    },
};
use derive_more::{Deref, DerefMut};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

///
/// Table
///

#[derive(Debug, Default, Deref, DerefMut)]
struct Table(BTreeMap<(String, String), Item>);

///
/// MemoryBackend
///
/// Reference backing store: a locked ordered map keyed by (pk, sk), with a
/// chunked scan that emulates the paginated behavior of a remote table.
/// Distinct entity ids may be touched from multiple threads; every call is
/// stateless.
///

#[derive(Debug)]
pub struct MemoryBackend {
    table: RwLock<Table>,
    page_size: usize,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    #[must_use]
    pub fn with_config(config: &StoreConfig) -> Self {
        Self {
            table: RwLock::new(Table::default()),
            page_size: config.page_size.max(1),
        }
    }

    /// Number of live items, all kinds included.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Table> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, pk: &str, sk: &str) -> Result<Item, StoreError> {
        self.read()
            .get(&(pk.to_string(), sk.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                pk: pk.to_string(),
                sk: sk.to_string(),
            })
    }

    fn put(&self, item: Item) -> Result<(), StoreError> {
        let (pk, sk) = item_keys(&item)?;
        let key = (pk.to_string(), sk.to_string());
        self.write().insert(key, item);
        Ok(())
    }

    fn delete(&self, pk: &str, sk: &str) -> Result<(), StoreError> {
        self.write().remove(&(pk.to_string(), sk.to_string()));
        Ok(())
    }

    fn update(&self, pk: &str, sk: &str, fields: Item) -> Result<(), StoreError> {
        let mut table = self.write();
        let entry = table
            .entry((pk.to_string(), sk.to_string()))
            .or_insert_with(Item::new);
        for (name, value) in fields {
            entry.insert(name, value);
        }
        entry.insert(PARTITION_KEY.to_string(), Value::String(pk.to_string()));
        entry.insert(SORT_KEY.to_string(), Value::String(sk.to_string()));
        Ok(())
    }

    fn scan(&self, request: ScanRequest) -> ScanPages<'_> {
        let table = self.read();
        let mut items: Vec<Item> = table
            .iter()
            .filter(|((pk, _), _)| {
                request
                    .partition_prefix
                    .as_ref()
                    .is_none_or(|prefix| pk.starts_with(prefix.as_str()))
            })
            .map(|(_, item)| item.clone())
            .collect();
        drop(table);

        if request.direction == ScanDirection::Descending {
            items.reverse();
        }

        let page_size = self.page_size;
        let mut offset = 0;
        Box::new(std::iter::from_fn(move || {
            if offset >= items.len() {
                return None;
            }
            let upper = (offset + page_size).min(items.len());
            let page = items[offset..upper].to_vec();
            offset = upper;
            Some(Ok(page))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(pk: &str, sk: &str, extra: &[(&str, Value)]) -> Item {
        let mut item = Item::new();
        item.insert(PARTITION_KEY.to_string(), json!(pk));
        item.insert(SORT_KEY.to_string(), json!(sk));
        for (name, value) in extra {
            item.insert((*name).to_string(), value.clone());
        }
        item
    }

    #[test]
    fn get_distinguishes_absence_from_presence() {
        let backend = MemoryBackend::new();
        backend
            .put(item("doc#1", "doc#v000000", &[]))
            .expect("put");

        assert!(backend.get("doc#1", "doc#v000000").is_ok());
        let err = backend.get("doc#1", "doc#v000001").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn put_requires_the_composite_key_attributes() {
        let backend = MemoryBackend::new();
        let err = backend.put(Item::new()).unwrap_err();
        assert!(matches!(err, StoreError::MissingKey(_)));
    }

    #[test]
    fn delete_is_idempotent() {
        let backend = MemoryBackend::new();
        backend.put(item("a", "b", &[])).expect("put");
        backend.delete("a", "b").expect("delete");
        backend.delete("a", "b").expect("repeat delete");
        assert!(backend.is_empty());
    }

    #[test]
    fn update_merges_fields_and_creates_when_absent() {
        let backend = MemoryBackend::new();
        backend
            .put(item("a", "b", &[("Name", json!("old")), ("Keep", json!(1))]))
            .expect("put");

        let mut patch = Item::new();
        patch.insert("Name".to_string(), json!("new"));
        backend.update("a", "b", patch).expect("update");

        let stored = backend.get("a", "b").expect("get");
        assert_eq!(stored.get("Name"), Some(&json!("new")));
        assert_eq!(stored.get("Keep"), Some(&json!(1)));

        backend.update("c", "d", Item::new()).expect("upsert");
        let created = backend.get("c", "d").expect("created");
        assert_eq!(created.get(PARTITION_KEY), Some(&json!("c")));
    }

    #[test]
    fn scan_chunks_by_page_size_in_key_order() {
        let backend = MemoryBackend::with_config(&StoreConfig { page_size: 3 });
        for i in 0..8 {
            backend
                .put(item(&format!("k#{i}"), "s", &[]))
                .expect("put");
        }

        let sizes: Vec<usize> = backend
            .scan(ScanRequest::full())
            .map(|page| page.expect("page").len())
            .collect();
        assert_eq!(sizes, vec![3, 3, 2]);
    }

    #[test]
    fn prefix_scan_narrows_and_descending_reverses() {
        let backend = MemoryBackend::with_config(&StoreConfig { page_size: 10 });
        backend.put(item("sort#c#f", "a#1", &[])).expect("put");
        backend.put(item("sort#c#f", "b#2", &[])).expect("put");
        backend.put(item("doc#1", "doc#v000000", &[])).expect("put");

        let ascending: Vec<String> = backend
            .scan(ScanRequest::prefix("sort#"))
            .flat_map(|page| page.expect("page"))
            .map(|item| item.get(SORT_KEY).and_then(Value::as_str).unwrap_or("").to_string())
            .collect();
        assert_eq!(ascending, vec!["a#1", "b#2"]);

        let descending: Vec<String> = backend
            .scan(ScanRequest::prefix("sort#").direction(ScanDirection::Descending))
            .flat_map(|page| page.expect("page"))
            .map(|item| item.get(SORT_KEY).and_then(Value::as_str).unwrap_or("").to_string())
            .collect();
        assert_eq!(descending, vec!["b#2", "a#1"]);
    }
}
