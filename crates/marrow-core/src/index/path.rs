use crate::{
    error::Error,
    model::Document,
    store::{
        KeyValueBackend, StoreError,
        item::{from_item, str_attr, to_item},
        key::{PATH_PREFIX, path_key},
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing::debug;

///
/// PathRecord
///
/// The unique mapping from a human path to its owning document, carrying
/// the denormalized document so path lookups need no second fetch.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PathRecord {
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
    #[serde(with = "time::serde::rfc3339")]
    created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated: OffsetDateTime,
    data: Map<String, Value>,
}

impl PathRecord {
    fn from_document(document: &Document) -> Self {
        let (pk, sk) = path_key(document.path_str());
        Self {
            pk,
            sk,
            document_id: document.id.clone(),
            class_id: document.class_id.clone(),
            parent_id: document.parent_id.clone(),
            template_id: document.template_id.clone(),
            version: document.version,
            created: document.created,
            updated: document.updated,
            data: document.values.clone(),
        }
    }

    fn into_document(self) -> Document {
        let path = self.pk[PATH_PREFIX.len()..].to_string();
        Document {
            id: self.document_id,
            class_id: self.class_id,
            parent_id: self.parent_id,
            template_id: self.template_id,
            path: Some(path),
            version: self.version,
            created: self.created,
            updated: self.updated,
            values: self.data,
        }
    }
}

/// Resolve a path to its denormalized document.
pub(crate) fn get<B: KeyValueBackend>(backend: &B, path: &str) -> Result<Document, Error> {
    let (pk, sk) = path_key(path);
    let item = backend
        .get(&pk, &sk)
        .map_err(|err| Error::lookup("path", path, err))?;
    let record: PathRecord = from_item(item).map_err(Error::storage("decode path record"))?;
    Ok(record.into_document())
}

/// The id of the document currently owning the path, if any.
pub(crate) fn owner<B: KeyValueBackend>(backend: &B, path: &str) -> Result<Option<String>, Error> {
    let (pk, sk) = path_key(path);
    match backend.get(&pk, &sk) {
        Ok(item) => Ok(Some(str_attr(&item, "DocumentId").to_string())),
        Err(StoreError::NotFound { .. }) => Ok(None),
        Err(source) => Err(Error::Storage {
            op: "get path record",
            source,
        }),
    }
}

/// Fail unless the document could claim its path right now. Runs ahead of
/// multi-record writes; [`insert`] re-checks at write time.
pub(crate) fn ensure_available<B: KeyValueBackend>(
    backend: &B,
    document: &Document,
) -> Result<(), Error> {
    let path = document.path_str();
    if path.is_empty() {
        return Ok(());
    }
    match owner(backend, path)? {
        Some(owner) if owner != document.id => Err(Error::Conflict {
            path: path.to_string(),
            owner,
        }),
        _ => Ok(()),
    }
}

/// Claim the document's path. Empty paths are legal (child documents) and
/// write nothing. Claiming a path owned by a different document is a
/// conflict; re-claiming one's own path overwrites the record. Without a
/// conditional put in the backing contract this check races concurrent
/// writers (see DESIGN.md).
pub(crate) fn insert<B: KeyValueBackend>(backend: &B, document: &Document) -> Result<(), Error> {
    let path = document.path_str();
    if path.is_empty() {
        return Ok(());
    }

    ensure_available(backend, document)?;

    let item =
        to_item(&PathRecord::from_document(document)).map_err(Error::storage("encode path record"))?;
    backend.put(item).map_err(Error::storage("put path record"))?;
    debug!(document = %document.id, path, "path claimed");
    Ok(())
}

/// Release a path; empty paths and absent records are no-ops.
pub(crate) fn remove<B: KeyValueBackend>(backend: &B, path: &str) -> Result<(), Error> {
    if path.is_empty() {
        return Ok(());
    }
    let (pk, sk) = path_key(path);
    backend
        .delete(&pk, &sk)
        .map_err(Error::storage("delete path record"))
}
