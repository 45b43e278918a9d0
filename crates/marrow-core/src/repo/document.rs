use crate::{
    error::Error,
    id::IdProvider,
    index::{path, sort},
    model::{Document, DocumentFilter, RangeResult, SortOrder},
    repo::{ClassRepository, KvRepository, finish_range, slice_window},
    slicer::Slicer,
    store::{
        Item, KeyValueBackend, PARTITION_KEY, SORT_KEY, ScanDirection, ScanRequest,
        item::{from_item, str_attr, to_item},
        key::{CURRENT_VERSION, DOCUMENT_PREFIX, document_key, normalize_sort_value, sort_partition},
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing::debug;

const ENTITY: &str = "document";

///
/// DocumentRecord
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DocumentRecord {
    #[serde(rename = "PK")]
    pk: String,
    #[serde(rename = "SK")]
    sk: String,
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

impl DocumentRecord {
    /// Build the record addressed at `sk_version`; the payload's version
    /// counter is always the document's own.
    fn new(document: &Document, sk_version: u32) -> Self {
        let (pk, sk) = document_key(&document.id, sk_version);
        Self {
            pk,
            sk,
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

    fn id(&self) -> &str {
        &self.pk[DOCUMENT_PREFIX.len()..]
    }

    fn into_document(self) -> Document {
        Document {
            id: self.pk[DOCUMENT_PREFIX.len()..].to_string(),
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

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DocumentPatch<'a> {
    class_id: &'a str,
    parent_id: Option<&'a str>,
    template_id: Option<&'a str>,
    version: u32,
    path: Option<&'a str>,
    #[serde(with = "time::serde::rfc3339")]
    updated: OffsetDateTime,
    data: &'a Map<String, Value>,
}

///
/// DocumentRepository
///

pub trait DocumentRepository {
    /// Persist a new document: assigns id and timestamps, writes the
    /// current record plus the version-1 snapshot, claims the path, and
    /// builds the sort records.
    fn create_document(&self, document: &mut Document) -> Result<(), Error>;

    /// The current version.
    fn get_document(&self, id: &str) -> Result<Document, Error>;

    /// Resolve a path to its owning document.
    fn get_document_by_path(&self, path: &str) -> Result<Document, Error>;

    /// Rewrite an existing document: bumps the version, appends a frozen
    /// snapshot, refreshes the current record and every derived record.
    fn update_document(&self, document: &mut Document) -> Result<(), Error>;

    /// Remove the current record, all snapshots, the path record, and the
    /// sort records.
    fn delete_document(&self, id: &str) -> Result<(), Error>;

    fn list_documents(
        &self,
        filter: &DocumentFilter,
    ) -> Result<(Vec<Document>, RangeResult), Error>;
}

impl<B, I> DocumentRepository for KvRepository<B, I>
where
    B: KeyValueBackend,
    I: IdProvider,
{
    fn create_document(&self, document: &mut Document) -> Result<(), Error> {
        if document.class_id.is_empty() {
            return Err(Error::validation("document requires a class id"));
        }
        let class = self
            .get_class(&document.class_id)
            .map_err(|err| match err {
                Error::NotFound { .. } => Error::validation(format!(
                    "could not retrieve class ({})",
                    document.class_id
                )),
                other => other,
            })?;

        let now = Self::now();
        document.id = self.mint_id(ENTITY, &document.id, now)?;
        document.created = now;
        document.updated = now;
        document.version = 1;

        // Conflicts surface before any record lands; the claim below
        // re-checks at write time.
        path::ensure_available(&self.backend, document)?;

        for version in [CURRENT_VERSION, 1] {
            let record = DocumentRecord::new(document, version);
            let item = to_item(&record).map_err(Error::storage("encode document"))?;
            self.backend
                .put(item)
                .map_err(Error::storage("put document"))?;
        }

        path::insert(&self.backend, document)?;
        sort::refresh(&self.backend, &class, document)?;

        debug!(document = %document.id, class = %document.class_id, "document created");
        Ok(())
    }

    fn get_document(&self, id: &str) -> Result<Document, Error> {
        let (pk, sk) = document_key(id, CURRENT_VERSION);
        let item = self
            .backend
            .get(&pk, &sk)
            .map_err(|err| Error::lookup(ENTITY, id, err))?;
        let record: DocumentRecord = from_item(item).map_err(Error::storage("decode document"))?;
        Ok(record.into_document())
    }

    fn get_document_by_path(&self, path: &str) -> Result<Document, Error> {
        path::get(&self.backend, path)
    }

    fn update_document(&self, document: &mut Document) -> Result<(), Error> {
        if document.id.is_empty() {
            return Err(Error::validation("document has no id"));
        }

        let (pk, sk) = document_key(&document.id, CURRENT_VERSION);
        let item = self
            .backend
            .get(&pk, &sk)
            .map_err(|err| Error::lookup(ENTITY, &document.id, err))?;
        let current: DocumentRecord =
            from_item(item).map_err(Error::storage("decode document"))?;
        let old_path = current.path.clone().unwrap_or_default();

        // Check for a path conflict before touching anything.
        if old_path != document.path_str() {
            path::ensure_available(&self.backend, document)?;
        }

        document.version = current.version + 1;
        document.created = current.created;
        document.updated = Self::now();

        // Frozen snapshot of the new version, then the current record.
        let snapshot = DocumentRecord::new(document, document.version);
        let item = to_item(&snapshot).map_err(Error::storage("encode document"))?;
        self.backend
            .put(item)
            .map_err(Error::storage("put document version"))?;

        let patch = DocumentPatch {
            class_id: &document.class_id,
            parent_id: document.parent_id.as_deref(),
            template_id: document.template_id.as_deref(),
            version: document.version,
            path: document.path.as_deref(),
            updated: document.updated,
            data: &document.values,
        };
        let fields = to_item(&patch).map_err(Error::storage("encode document patch"))?;
        self.backend
            .update(&pk, &sk, fields)
            .map_err(Error::storage("update document"))?;

        let class = self.get_class(&document.class_id)?;
        sort::refresh(&self.backend, &class, document)?;

        if old_path != document.path_str() {
            path::remove(&self.backend, &old_path)?;
            path::insert(&self.backend, document)?;
        }

        debug!(document = %document.id, version = document.version, "document updated");
        Ok(())
    }

    fn delete_document(&self, id: &str) -> Result<(), Error> {
        let (pk, sk) = document_key(id, CURRENT_VERSION);
        let item = self
            .backend
            .get(&pk, &sk)
            .map_err(|err| Error::lookup(ENTITY, id, err))?;
        let current: DocumentRecord =
            from_item(item).map_err(Error::storage("decode document"))?;

        for version in 0..=current.version {
            let (pk, sk) = document_key(id, version);
            self.backend
                .delete(&pk, &sk)
                .map_err(Error::storage("delete document version"))?;
        }

        path::remove(&self.backend, current.path.as_deref().unwrap_or_default())?;
        sort::remove_for_document(&self.backend, id)?;

        debug!(document = %id, versions = current.version, "document deleted");
        Ok(())
    }

    fn list_documents(
        &self,
        filter: &DocumentFilter,
    ) -> Result<(Vec<Document>, RangeResult), Error> {
        // Bulk fetch bypasses sorting and slicing entirely.
        if !filter.ids.is_empty() {
            return self.documents_by_ids(&filter.ids);
        }

        // A sortable field on a known class reads the sort index, already
        // in key order. Anything else falls back to the scan.
        if let (Some(class_id), Some(order)) = (
            filter.class_id.as_deref(),
            filter.sort.as_ref().filter(|order| !order.field.is_empty()),
        ) {
            let class = self.get_class(class_id)?;
            if class.sort_fields().contains(&order.field.as_str()) {
                return self.list_documents_indexed(filter, class_id, order);
            }
        }

        self.list_documents_scan(filter)
    }
}

impl<B, I> KvRepository<B, I>
where
    B: KeyValueBackend,
    I: IdProvider,
{
    fn documents_by_ids(&self, ids: &[String]) -> Result<(Vec<Document>, RangeResult), Error> {
        let mut documents = Vec::with_capacity(ids.len());
        for id in ids {
            documents.push(self.get_document(id)?);
        }
        let range = RangeResult {
            start: 0,
            end: documents.len().saturating_sub(1),
            size: documents.len(),
        };
        Ok((documents, range))
    }

    fn list_documents_indexed(
        &self,
        filter: &DocumentFilter,
        class_id: &str,
        order: &SortOrder,
    ) -> Result<(Vec<Document>, RangeResult), Error> {
        let partition = sort_partition(class_id, &order.field);
        let direction = if order.direction.is_descending() {
            ScanDirection::Descending
        } else {
            ScanDirection::Ascending
        };

        let mut slicer = Slicer::new(filter.range.start, filter.range.end);
        let mut documents = Vec::with_capacity(filter.range.slice_len());

        let request = ScanRequest::prefix(partition.clone()).direction(direction);
        for page in self.backend.scan(request) {
            let page = page.map_err(Error::storage("scan sort index"))?;

            // Narrow before feeding the slicer so the reported total only
            // counts matching items.
            let matching: Vec<Item> = page
                .into_iter()
                .filter(|item| {
                    str_attr(item, PARTITION_KEY) == partition
                        && filter
                            .parent_id
                            .as_deref()
                            .is_none_or(|parent| str_attr(item, "ParentId") == parent)
                })
                .collect();

            slicer.add(matching.len());
            let window = slicer.chunk_range();
            for item in matching.into_iter().skip(window.start).take(window.len()) {
                let record: sort::SortRecord =
                    from_item(item).map_err(Error::storage("decode sort record"))?;
                documents.push(record.into_document());
            }
        }

        let range = finish_range(filter.range, slicer.total(), documents.len())?;
        Ok((documents, range))
    }

    fn list_documents_scan(
        &self,
        filter: &DocumentFilter,
    ) -> Result<(Vec<Document>, RangeResult), Error> {
        let (_, current_sk) = document_key("", CURRENT_VERSION);

        let mut records: Vec<DocumentRecord> = Vec::new();
        for page in self.backend.scan(ScanRequest::prefix(DOCUMENT_PREFIX)) {
            let page = page.map_err(Error::storage("scan documents"))?;
            for item in page {
                if str_attr(&item, SORT_KEY) != current_sk {
                    continue;
                }
                if let Some(class_id) = filter.class_id.as_deref() {
                    if str_attr(&item, "ClassId") != class_id {
                        continue;
                    }
                }
                if let Some(parent_id) = filter.parent_id.as_deref() {
                    if str_attr(&item, "ParentId") != parent_id {
                        continue;
                    }
                }
                records.push(from_item(item).map_err(Error::storage("decode document"))?);
            }
        }

        let order = filter.sort.as_ref().filter(|order| !order.field.is_empty());
        let mut reverse = order.is_some_and(|order| order.direction.is_descending());
        match order.map(|order| order.field.as_str()) {
            // No explicit sort lists newest first.
            None => {
                records.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.pk.cmp(&b.pk)));
                reverse = true;
            }
            Some("created") => {
                records.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.pk.cmp(&b.pk)));
            }
            Some("updated") => {
                records.sort_by(|a, b| a.updated.cmp(&b.updated).then_with(|| a.pk.cmp(&b.pk)));
            }
            Some(field) => {
                // Non-indexed field: order by the normalized value, ties by
                // ascending id. Missing values sort first as the empty
                // string.
                records.sort_by_cached_key(|record| {
                    let key = record
                        .data
                        .get(field)
                        .map(normalize_sort_value)
                        .unwrap_or_default();
                    (key, record.id().to_string())
                });
            }
        }
        if reverse {
            records.reverse();
        }

        let (kept, total) = slice_window(records, filter.range);
        let documents: Vec<Document> = kept
            .into_iter()
            .map(DocumentRecord::into_document)
            .collect();
        let range = finish_range(filter.range, total, documents.len())?;
        Ok((documents, range))
    }
}
