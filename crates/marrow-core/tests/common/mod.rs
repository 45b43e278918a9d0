//! Shared harness: a memory-backed repository with deterministic ids and
//! the conference-site fixture set (pages, blogs, news, an event with
//! sessions and speakers) exercised by the integration tests.

use marrow_core::{
    config::StoreConfig,
    error::Error,
    id::IdProvider,
    model::{Class, Document, Field},
    repo::{ClassRepository, DocumentRepository, KvRepository},
    store::MemoryBackend,
};
use serde_json::{Value, json};
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU32, Ordering},
};

///
/// SeqIds
///
/// Deterministic id provider: ids count up in creation order, so value
/// ties in sort tests break in a known order.
///

#[derive(Debug, Default)]
pub struct SeqIds {
    next: AtomicU32,
}

impl IdProvider for SeqIds {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("fx-{n:04}")
    }

    fn is_valid(&self, id: &str) -> bool {
        id.starts_with("fx-")
    }
}

pub type TestRepository = KvRepository<MemoryBackend, SeqIds>;

/// A repository whose scans page in small chunks, so list windows cross
/// chunk boundaries.
pub fn repository() -> TestRepository {
    KvRepository::new(
        MemoryBackend::with_config(&StoreConfig { page_size: 3 }),
        SeqIds::default(),
    )
}

fn field(name: &str, sort: bool) -> Field {
    Field {
        name: name.to_string(),
        sort,
        ..Field::default()
    }
}

fn class(name: &str, fields: Vec<Field>) -> Class {
    Class {
        name: name.to_string(),
        fields,
        ..Class::default()
    }
}

///
/// Fixture
///

pub struct Fixture {
    pub repo: TestRepository,
    /// Fixture key ("blog", "session", ...) to assigned class id.
    pub classes: BTreeMap<&'static str, String>,
    /// Fixture key ("blog-1", "speaker-3", ...) to assigned document id.
    pub docs: BTreeMap<&'static str, String>,
}

impl Fixture {
    pub fn class_id(&self, key: &str) -> &str {
        &self.classes[key]
    }

    pub fn doc_id(&self, key: &str) -> &str {
        &self.docs[key]
    }

    pub fn create_document(
        &mut self,
        key: &'static str,
        class: &str,
        parent: Option<&str>,
        path: Option<&str>,
        values: &[(&str, Value)],
    ) -> Result<(), Error> {
        let mut doc = Document {
            class_id: self.classes[class].clone(),
            parent_id: parent.map(|p| self.docs[p].clone()),
            path: path.map(str::to_string),
            ..Document::default()
        };
        for (name, value) in values {
            doc.values.insert((*name).to_string(), value.clone());
        }
        self.repo.create_document(&mut doc)?;
        self.docs.insert(key, doc.id);
        Ok(())
    }
}

/// Stand up the full fixture set.
pub fn seed() -> Fixture {
    let mut fixture = Fixture {
        repo: repository(),
        classes: BTreeMap::new(),
        docs: BTreeMap::new(),
    };

    let classes: Vec<(&'static str, Class)> = vec![
        ("page", class("Page", vec![field("content", false)])),
        (
            "blog",
            class(
                "Blog",
                vec![
                    field("published", true),
                    field("excerpt", false),
                    field("author", false),
                ],
            ),
        ),
        (
            "news",
            class(
                "News",
                vec![
                    field("published", true),
                    field("excerpt", false),
                    field("author", false),
                ],
            ),
        ),
        (
            "event",
            class(
                "Event",
                vec![
                    field("start", true),
                    field("end", false),
                    field("date_display", false),
                ],
            ),
        ),
        (
            "session",
            class(
                "Session",
                vec![
                    field("title", false),
                    field("start", true),
                    field("end", false),
                    field("location", false),
                ],
            ),
        ),
        (
            "speaker",
            class(
                "Speaker",
                vec![
                    field("first_name", false),
                    field("last_name", false),
                    field("sort_name", true),
                ],
            ),
        ),
    ];

    for (key, mut class) in classes {
        fixture
            .repo
            .create_class(&mut class)
            .expect("create fixture class");
        fixture.classes.insert(key, class.id);
    }

    let documents: Vec<(
        &'static str,
        &'static str,
        Option<&'static str>,
        Option<&'static str>,
        Vec<(&'static str, Value)>,
    )> = vec![
        (
            "page-1",
            "page",
            None,
            Some("/"),
            vec![("content", json!("Homepage content goes here"))],
        ),
        (
            "blog-1",
            "blog",
            None,
            Some("/blogs/blog-1"),
            vec![
                ("published", json!("2022-08-03T12:33:20Z")),
                ("excerpt", json!("Blog excerpt")),
                ("author", json!("author-1")),
            ],
        ),
        (
            "blog-2",
            "blog",
            None,
            Some("/blogs/blog-2"),
            vec![
                ("published", json!("2022-08-03T18:06:40Z")),
                ("excerpt", json!("Blog excerpt")),
                ("author", json!("author-3")),
            ],
        ),
        (
            "blog-3",
            "blog",
            None,
            Some("/blogs/blog-3"),
            vec![
                ("published", json!("2022-08-03T23:40:00Z")),
                ("excerpt", json!("Blog excerpt")),
                ("author", json!("author-2")),
            ],
        ),
        (
            "news-1",
            "news",
            None,
            Some("/news/news-1"),
            vec![
                ("published", json!("2022-08-03T15:20:00Z")),
                ("excerpt", json!("News excerpt")),
            ],
        ),
        (
            "news-2",
            "news",
            None,
            Some("/news/news-2"),
            vec![
                ("published", json!("2022-08-03T21:13:20Z")),
                ("excerpt", json!("News excerpt")),
            ],
        ),
        (
            "event-1",
            "event",
            None,
            None,
            vec![
                ("start", json!("2022-08-04T08:00:00Z")),
                ("end", json!("2022-08-04T09:00:00Z")),
                ("date_display", json!("Hopefully in the Future")),
            ],
        ),
        (
            "session-1",
            "session",
            Some("event-1"),
            None,
            vec![
                ("title", json!("First Session")),
                ("start", json!("09:30")),
                ("end", json!("09:45")),
                ("location", json!("Hall B")),
            ],
        ),
        (
            "session-2",
            "session",
            Some("event-1"),
            None,
            vec![
                ("title", json!("Second Session")),
                ("start", json!("09:45")),
                ("end", json!("10:00")),
                ("location", json!("Hall B")),
            ],
        ),
        (
            "session-3",
            "session",
            Some("event-1"),
            None,
            vec![
                ("title", json!("Third Session")),
                ("start", json!("10:00")),
                ("end", json!("10:30")),
                ("location", json!("Hall B")),
            ],
        ),
        (
            "speaker-1",
            "speaker",
            Some("session-1"),
            None,
            vec![
                ("first_name", json!("Felicity")),
                ("last_name", json!("Grantham")),
                ("sort_name", json!("Grantham, Felicity")),
            ],
        ),
        (
            "speaker-2",
            "speaker",
            Some("session-2"),
            None,
            vec![
                ("first_name", json!("Sibby")),
                ("last_name", json!("Begg")),
                ("sort_name", json!("Begg, Sibby")),
            ],
        ),
        (
            "speaker-3",
            "speaker",
            Some("session-2"),
            None,
            vec![
                ("first_name", json!("Gordon")),
                ("last_name", json!("Pont")),
                ("sort_name", json!("Pont, Gordon")),
            ],
        ),
        (
            "speaker-4",
            "speaker",
            Some("session-1"),
            None,
            vec![
                ("first_name", json!("Alon")),
                ("last_name", json!("Keohane")),
                ("sort_name", json!("Keohane, Alon")),
            ],
        ),
        (
            "speaker-5",
            "speaker",
            Some("session-3"),
            None,
            vec![
                ("first_name", json!("Darlene")),
                ("last_name", json!("Blackmore")),
                ("sort_name", json!("Blackmore, Darlene")),
            ],
        ),
    ];

    for (key, class, parent, path, values) in documents {
        fixture
            .create_document(key, class, parent, path, &values)
            .expect("create fixture document");
    }

    fixture
}
