use crate::{
    error::Error,
    id::IdProvider,
    model::{Form, FormFilter, RangeResult},
    repo::{KvRepository, finish_range, slice_window},
    store::{
        KeyValueBackend, ScanRequest,
        item::{from_item, to_item},
        key::{FORM_PREFIX, form_key},
    },
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::debug;

const ENTITY: &str = "form";

///
/// FormRecord
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
struct FormRecord {
    #[serde(rename = "PK")]
    pk: String,
    #[serde(rename = "SK")]
    sk: String,
    name: String,
    #[serde(with = "time::serde::rfc3339")]
    created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated: OffsetDateTime,
    #[serde(default)]
    data: Value,
}

impl FormRecord {
    fn from_form(form: &Form) -> Self {
        let (pk, sk) = form_key(&form.id);
        Self {
            pk,
            sk,
            name: form.name.clone(),
            created: form.created,
            updated: form.updated,
            data: form.schema.clone(),
        }
    }

    fn into_form(self) -> Form {
        Form {
            id: self.pk[FORM_PREFIX.len()..].to_string(),
            name: self.name,
            created: self.created,
            updated: self.updated,
            schema: self.data,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct FormPatch<'a> {
    name: &'a str,
    #[serde(with = "time::serde::rfc3339")]
    updated: OffsetDateTime,
    data: &'a Value,
}

///
/// FormRepository
///

pub trait FormRepository {
    fn create_form(&self, form: &mut Form) -> Result<(), Error>;
    fn get_form(&self, id: &str) -> Result<Form, Error>;
    fn update_form(&self, form: &mut Form) -> Result<(), Error>;
    fn delete_form(&self, id: &str) -> Result<(), Error>;

    /// All forms ordered by name, windowed by the filter range.
    fn list_forms(&self, filter: &FormFilter) -> Result<(Vec<Form>, RangeResult), Error>;
}

impl<B, I> FormRepository for KvRepository<B, I>
where
    B: KeyValueBackend,
    I: IdProvider,
{
    fn create_form(&self, form: &mut Form) -> Result<(), Error> {
        let now = Self::now();
        form.id = self.mint_id(ENTITY, &form.id, now)?;
        form.created = now;
        form.updated = now;

        let item = to_item(&FormRecord::from_form(form)).map_err(Error::storage("encode form"))?;
        self.backend.put(item).map_err(Error::storage("put form"))?;
        debug!(form = %form.id, "form created");
        Ok(())
    }

    fn get_form(&self, id: &str) -> Result<Form, Error> {
        let (pk, sk) = form_key(id);
        let item = self
            .backend
            .get(&pk, &sk)
            .map_err(|err| Error::lookup(ENTITY, id, err))?;
        let record: FormRecord = from_item(item).map_err(Error::storage("decode form"))?;
        Ok(record.into_form())
    }

    fn update_form(&self, form: &mut Form) -> Result<(), Error> {
        if form.id.is_empty() {
            return Err(Error::validation("form has no id"));
        }
        self.get_form(&form.id)?;
        form.updated = Self::now();

        let patch = FormPatch {
            name: &form.name,
            updated: form.updated,
            data: &form.schema,
        };
        let (pk, sk) = form_key(&form.id);
        let fields = to_item(&patch).map_err(Error::storage("encode form patch"))?;
        self.backend
            .update(&pk, &sk, fields)
            .map_err(Error::storage("update form"))?;
        debug!(form = %form.id, "form updated");
        Ok(())
    }

    fn delete_form(&self, id: &str) -> Result<(), Error> {
        let (pk, sk) = form_key(id);
        self.backend
            .delete(&pk, &sk)
            .map_err(Error::storage("delete form"))?;
        debug!(form = %id, "form deleted");
        Ok(())
    }

    fn list_forms(&self, filter: &FormFilter) -> Result<(Vec<Form>, RangeResult), Error> {
        let mut forms = Vec::new();
        for page in self.backend.scan(ScanRequest::prefix(FORM_PREFIX)) {
            let page = page.map_err(Error::storage("scan forms"))?;
            for item in page {
                let record: FormRecord = from_item(item).map_err(Error::storage("decode form"))?;
                forms.push(record.into_form());
            }
        }

        forms.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        let (kept, total) = slice_window(forms, filter.range);
        let range = finish_range(filter.range, total, kept.len())?;
        Ok((kept, range))
    }
}
