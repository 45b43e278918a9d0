use crate::{
    error::Error,
    id::IdProvider,
    model::{RangeResult, Template, TemplateFilter, TemplateSort},
    repo::{KvRepository, finish_range, slice_window},
    store::{
        KeyValueBackend, SORT_KEY, ScanRequest,
        item::{from_item, str_attr, to_item},
        key::{CURRENT_VERSION, TEMPLATE_PREFIX, template_key},
    },
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

const ENTITY: &str = "template";

///
/// TemplateRecord
///
/// Each version record carries its own body; the current record (version
/// sentinel) always mirrors the newest version.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TemplateRecord {
    #[serde(rename = "PK")]
    pk: String,
    #[serde(rename = "SK")]
    sk: String,
    name: String,
    version: u32,
    #[serde(default)]
    body: String,
    #[serde(with = "time::serde::rfc3339")]
    created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated: OffsetDateTime,
}

impl TemplateRecord {
    fn new(template: &Template, sk_version: u32) -> Self {
        let (pk, sk) = template_key(&template.id, sk_version);
        Self {
            pk,
            sk,
            name: template.name.clone(),
            version: template.version,
            body: template.body.clone(),
            created: template.created,
            updated: template.updated,
        }
    }

    fn into_template(self) -> Template {
        Template {
            id: self.pk[TEMPLATE_PREFIX.len()..].to_string(),
            name: self.name,
            version: self.version,
            body: self.body,
            created: self.created,
            updated: self.updated,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TemplatePatch<'a> {
    name: &'a str,
    version: u32,
    body: &'a str,
    #[serde(with = "time::serde::rfc3339")]
    updated: OffsetDateTime,
}

///
/// TemplateRepository
///

pub trait TemplateRepository {
    /// Persist a new template as version 1 plus the current record.
    fn create_template(&self, template: &mut Template) -> Result<(), Error>;

    /// The current (newest) version.
    fn get_template(&self, id: &str) -> Result<Template, Error>;

    /// Append a frozen snapshot with the next version and refresh the
    /// current record.
    fn update_template(&self, template: &mut Template) -> Result<(), Error>;

    /// Remove the current record and every historical version.
    fn delete_template(&self, id: &str) -> Result<(), Error>;

    fn list_templates(
        &self,
        filter: &TemplateFilter,
    ) -> Result<(Vec<Template>, RangeResult), Error>;
}

impl<B, I> TemplateRepository for KvRepository<B, I>
where
    B: KeyValueBackend,
    I: IdProvider,
{
    fn create_template(&self, template: &mut Template) -> Result<(), Error> {
        let now = Self::now();
        template.id = self.mint_id(ENTITY, &template.id, now)?;
        template.created = now;
        template.updated = now;
        template.version = 1;

        for version in [CURRENT_VERSION, 1] {
            let record = TemplateRecord::new(template, version);
            let item = to_item(&record).map_err(Error::storage("encode template"))?;
            self.backend
                .put(item)
                .map_err(Error::storage("put template"))?;
        }
        debug!(template = %template.id, "template created");
        Ok(())
    }

    fn get_template(&self, id: &str) -> Result<Template, Error> {
        let (pk, sk) = template_key(id, CURRENT_VERSION);
        let item = self
            .backend
            .get(&pk, &sk)
            .map_err(|err| Error::lookup(ENTITY, id, err))?;
        let record: TemplateRecord = from_item(item).map_err(Error::storage("decode template"))?;
        Ok(record.into_template())
    }

    fn update_template(&self, template: &mut Template) -> Result<(), Error> {
        if template.id.is_empty() {
            return Err(Error::validation("template has no id"));
        }

        let current = self.get_template(&template.id)?;
        template.version = current.version + 1;
        template.created = current.created;
        template.updated = Self::now();

        // Frozen snapshot first, then the current record follows it.
        let snapshot = TemplateRecord::new(template, template.version);
        let item = to_item(&snapshot).map_err(Error::storage("encode template"))?;
        self.backend
            .put(item)
            .map_err(Error::storage("put template version"))?;

        let patch = TemplatePatch {
            name: &template.name,
            version: template.version,
            body: &template.body,
            updated: template.updated,
        };
        let (pk, sk) = template_key(&template.id, CURRENT_VERSION);
        let fields = to_item(&patch).map_err(Error::storage("encode template patch"))?;
        self.backend
            .update(&pk, &sk, fields)
            .map_err(Error::storage("update template"))?;
        debug!(template = %template.id, version = template.version, "template updated");
        Ok(())
    }

    fn delete_template(&self, id: &str) -> Result<(), Error> {
        let current = self.get_template(id)?;
        for version in 0..=current.version {
            let (pk, sk) = template_key(id, version);
            self.backend
                .delete(&pk, &sk)
                .map_err(Error::storage("delete template version"))?;
        }
        debug!(template = %id, versions = current.version, "template deleted");
        Ok(())
    }

    fn list_templates(
        &self,
        filter: &TemplateFilter,
    ) -> Result<(Vec<Template>, RangeResult), Error> {
        let (_, current_sk) = template_key("", CURRENT_VERSION);

        let mut templates = Vec::new();
        for page in self.backend.scan(ScanRequest::prefix(TEMPLATE_PREFIX)) {
            let page = page.map_err(Error::storage("scan templates"))?;
            for item in page {
                // Only current records; version snapshots stay out of lists.
                if str_attr(&item, SORT_KEY) != current_sk {
                    continue;
                }
                let record: TemplateRecord =
                    from_item(item).map_err(Error::storage("decode template"))?;
                templates.push(record.into_template());
            }
        }

        match filter.sort {
            TemplateSort::Name => {
                templates.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
            }
            TemplateSort::Created => {
                templates.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
            }
        }
        if filter.reverse {
            templates.reverse();
        }

        let (kept, total) = slice_window(templates, filter.range);
        let range = finish_range(filter.range, total, kept.len())?;
        Ok((kept, range))
    }
}
