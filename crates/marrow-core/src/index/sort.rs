use crate::{
    error::Error,
    model::{Class, Document},
    store::{
        KeyValueBackend, ScanRequest,
        item::{item_keys, str_attr, to_item},
        key::{SORT_PREFIX, sort_key},
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing::debug;

///
/// SortRecord
///
/// One denormalized ordering record: keyed by (class, field, normalized
/// value, document id), carrying the whole document so list queries need
/// no second fetch.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SortRecord {
    #[serde(rename = "PK")]
    pk: String,
    #[serde(rename = "SK")]
    sk: String,
    document_id: String,
    class_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template_id: Option<String>,
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated: OffsetDateTime,
    data: Map<String, Value>,
}

impl SortRecord {
    fn new(class_id: &str, field: &str, document: &Document, value: &Value) -> Self {
        let (pk, sk) = sort_key(class_id, field, &document.id, value);
        Self {
            pk,
            sk,
            document_id: document.id.clone(),
            class_id: document.class_id.clone(),
            parent_id: document.parent_id.clone(),
            template_id: document.template_id.clone(),
            version: document.version,
            path: document.path.clone(),
            created: document.created,
            updated: document.updated,
            data: document.values.clone(),
        }
    }

    pub(crate) fn into_document(self) -> Document {
        Document {
            id: self.document_id,
            class_id: self.class_id,
            parent_id: self.parent_id,
            template_id: self.template_id,
            path: self.path,
            version: self.version,
            created: self.created,
            updated: self.updated,
            values: self.data,
        }
    }
}

/// Full replace of a document's ordering records: drop whatever exists for
/// the id, then write one record per sortable field with a present value.
/// Correctness over write efficiency; diffing old against new values is an
/// open question tracked in DESIGN.md.
pub(crate) fn refresh<B: KeyValueBackend>(
    backend: &B,
    class: &Class,
    document: &Document,
) -> Result<(), Error> {
    remove_for_document(backend, &document.id)?;

    let mut written = 0usize;
    for field in class.sort_fields() {
        let Some(value) = document.values.get(field) else {
            continue;
        };
        let record = SortRecord::new(&class.id, field, document, value);
        let item = to_item(&record).map_err(Error::storage("encode sort record"))?;
        backend.put(item).map_err(Error::storage("put sort record"))?;
        written += 1;
    }

    debug!(
        document = %document.id,
        class = %class.id,
        records = written,
        "sort index refreshed"
    );
    Ok(())
}

/// Drop every ordering record owned by the document id. Queried by id, not
/// by class/field, so a change to the class's sortable set still clears
/// stale records.
pub(crate) fn remove_for_document<B: KeyValueBackend>(
    backend: &B,
    document_id: &str,
) -> Result<(), Error> {
    let mut doomed = Vec::new();
    for page in backend.scan(ScanRequest::prefix(SORT_PREFIX)) {
        let page = page.map_err(Error::storage("scan sort records"))?;
        for item in page {
            if str_attr(&item, "DocumentId") != document_id {
                continue;
            }
            let (pk, sk) = item_keys(&item).map_err(Error::storage("read sort record key"))?;
            doomed.push((pk.to_string(), sk.to_string()));
        }
    }

    for (pk, sk) in doomed {
        backend
            .delete(&pk, &sk)
            .map_err(Error::storage("delete sort record"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::Field,
        store::{MemoryBackend, item::str_attr},
    };
    use serde_json::json;

    fn blog_class() -> Class {
        Class {
            id: "blog".to_string(),
            name: "Blog".to_string(),
            fields: vec![
                Field {
                    name: "published".to_string(),
                    sort: true,
                    ..Field::default()
                },
                Field {
                    name: "excerpt".to_string(),
                    ..Field::default()
                },
            ],
            ..Class::default()
        }
    }

    fn document(id: &str, published: &str) -> Document {
        let mut doc = Document {
            id: id.to_string(),
            class_id: "blog".to_string(),
            version: 1,
            ..Document::default()
        };
        doc.values.insert("published".to_string(), json!(published));
        doc.values
            .insert("excerpt".to_string(), json!("not sortable"));
        doc
    }

    fn sort_items(backend: &MemoryBackend) -> Vec<crate::store::Item> {
        backend
            .scan(ScanRequest::prefix(SORT_PREFIX))
            .flat_map(|page| page.expect("page"))
            .collect()
    }

    #[test]
    fn refresh_writes_one_record_per_sortable_field() {
        let backend = MemoryBackend::new();
        let class = blog_class();
        let doc = document("d1", "2022-08-03T12:00:00Z");

        refresh(&backend, &class, &doc).expect("refresh");

        let items = sort_items(&backend);
        assert_eq!(items.len(), 1, "only the sortable field gets a record");
        assert_eq!(str_attr(&items[0], "DocumentId"), "d1");
        assert_eq!(str_attr(&items[0], "PK"), "sort#blog#published");
    }

    #[test]
    fn refresh_replaces_stale_records() {
        let backend = MemoryBackend::new();
        let class = blog_class();
        let doc = document("d1", "2022-08-03T12:00:00Z");
        refresh(&backend, &class, &doc).expect("first refresh");

        let updated = document("d1", "2023-01-01T00:00:00Z");
        refresh(&backend, &class, &updated).expect("second refresh");

        let items = sort_items(&backend);
        assert_eq!(items.len(), 1);
        assert!(
            str_attr(&items[0], "SK").starts_with("2023-01-01"),
            "old value's record must be gone"
        );
    }

    #[test]
    fn missing_values_produce_no_record() {
        let backend = MemoryBackend::new();
        let class = blog_class();
        let mut doc = document("d1", "2022-08-03T12:00:00Z");
        doc.values.remove("published");

        refresh(&backend, &class, &doc).expect("refresh");
        assert!(sort_items(&backend).is_empty());
    }

    #[test]
    fn removal_only_touches_the_given_document() {
        let backend = MemoryBackend::new();
        let class = blog_class();
        refresh(&backend, &class, &document("d1", "2022-01-01T00:00:00Z")).expect("d1");
        refresh(&backend, &class, &document("d2", "2022-02-01T00:00:00Z")).expect("d2");

        remove_for_document(&backend, "d1").expect("remove");

        let items = sort_items(&backend);
        assert_eq!(items.len(), 1);
        assert_eq!(str_attr(&items[0], "DocumentId"), "d2");
    }
}
