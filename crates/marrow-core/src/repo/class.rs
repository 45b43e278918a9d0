use crate::{
    error::Error,
    id::IdProvider,
    model::{Class, ClassFilter, Field, RangeResult},
    repo::{KvRepository, finish_range, slice_window},
    store::{
        KeyValueBackend, ScanRequest,
        item::{from_item, to_item},
        key::{CLASS_PREFIX, class_key},
    },
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

const ENTITY: &str = "class";

///
/// ClassRecord
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ClassRecord {
    #[serde(rename = "PK")]
    pk: String,
    #[serde(rename = "SK")]
    sk: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    name: String,
    #[serde(with = "time::serde::rfc3339")]
    created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated: OffsetDateTime,
    data: Vec<Field>,
}

impl ClassRecord {
    fn from_class(class: &Class) -> Self {
        let (pk, sk) = class_key(&class.id);
        Self {
            pk,
            sk,
            parent_id: class.parent_id.clone(),
            name: class.name.clone(),
            created: class.created,
            updated: class.updated,
            data: class.fields.clone(),
        }
    }

    fn into_class(self) -> Class {
        Class {
            id: self.pk[CLASS_PREFIX.len()..].to_string(),
            parent_id: self.parent_id,
            name: self.name,
            created: self.created,
            updated: self.updated,
            fields: self.data,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ClassPatch<'a> {
    parent_id: Option<&'a str>,
    name: &'a str,
    data: &'a [Field],
    #[serde(with = "time::serde::rfc3339")]
    updated: OffsetDateTime,
}

///
/// ClassRepository
///

pub trait ClassRepository {
    /// Persist a new class, assigning its id and timestamps.
    fn create_class(&self, class: &mut Class) -> Result<(), Error>;

    fn get_class(&self, id: &str) -> Result<Class, Error>;

    /// Rewrite an existing class in place; bumps `updated`.
    fn update_class(&self, class: &mut Class) -> Result<(), Error>;

    fn delete_class(&self, id: &str) -> Result<(), Error>;

    /// All classes ordered by name, windowed by the filter range.
    fn list_classes(&self, filter: &ClassFilter) -> Result<(Vec<Class>, RangeResult), Error>;
}

impl<B, I> ClassRepository for KvRepository<B, I>
where
    B: KeyValueBackend,
    I: IdProvider,
{
    fn create_class(&self, class: &mut Class) -> Result<(), Error> {
        class.validate()?;

        let now = Self::now();
        class.id = self.mint_id(ENTITY, &class.id, now)?;
        class.created = now;
        class.updated = now;

        let item = to_item(&ClassRecord::from_class(class)).map_err(Error::storage("encode class"))?;
        self.backend.put(item).map_err(Error::storage("put class"))?;
        debug!(class = %class.id, "class created");
        Ok(())
    }

    fn get_class(&self, id: &str) -> Result<Class, Error> {
        let (pk, sk) = class_key(id);
        let item = self
            .backend
            .get(&pk, &sk)
            .map_err(|err| Error::lookup(ENTITY, id, err))?;
        let record: ClassRecord = from_item(item).map_err(Error::storage("decode class"))?;
        Ok(record.into_class())
    }

    fn update_class(&self, class: &mut Class) -> Result<(), Error> {
        if class.id.is_empty() {
            return Err(Error::validation("class has no id"));
        }
        class.validate()?;

        // Update is not an upsert: the record must already exist.
        self.get_class(&class.id)?;
        class.updated = Self::now();

        let patch = ClassPatch {
            parent_id: class.parent_id.as_deref(),
            name: &class.name,
            data: &class.fields,
            updated: class.updated,
        };
        let (pk, sk) = class_key(&class.id);
        let fields = to_item(&patch).map_err(Error::storage("encode class patch"))?;
        self.backend
            .update(&pk, &sk, fields)
            .map_err(Error::storage("update class"))?;
        debug!(class = %class.id, "class updated");
        Ok(())
    }

    fn delete_class(&self, id: &str) -> Result<(), Error> {
        let (pk, sk) = class_key(id);
        self.backend
            .delete(&pk, &sk)
            .map_err(Error::storage("delete class"))?;
        debug!(class = %id, "class deleted");
        Ok(())
    }

    fn list_classes(&self, filter: &ClassFilter) -> Result<(Vec<Class>, RangeResult), Error> {
        let mut classes = Vec::new();
        for page in self.backend.scan(ScanRequest::prefix(CLASS_PREFIX)) {
            let page = page.map_err(Error::storage("scan classes"))?;
            for item in page {
                let record: ClassRecord = from_item(item).map_err(Error::storage("decode class"))?;
                classes.push(record.into_class());
            }
        }

        classes.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        let (kept, total) = slice_window(classes, filter.range);
        let range = finish_range(filter.range, total, kept.len())?;
        Ok((kept, range))
    }
}
