use chrono::{DateTime, Utc};
use scribe_core::{
    CollisionPolicy, ComposeOptions, DecomposeOptions, Document, DocumentStore, MemoryStore,
    Metadata, NamingPolicy, PackOptions, compose, decompose, export_document, import_document,
    pack, pack_parallel,
};
use serde_json::json;

fn at(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

#[test]
fn header_contains_dates_title_and_block_sequences() {
    let mut metadata =
        Metadata::new("A", at("2024-03-01T10:00:00Z")).with_field("tags", json!(["x"]));
    metadata.modified = at("2024-03-02T11:30:00Z");

    let text = compose(&metadata, "hello", ComposeOptions::default());

    assert!(text.starts_with("---\n"), "{text}");
    assert!(text.contains("date: 2024-03-01T10:00:00Z\n"), "{text}");
    assert!(text.contains("updated: 2024-03-02T11:30:00Z\n"), "{text}");
    assert!(text.contains("title: A\n"), "{text}");
    assert!(text.contains("tags:\n  - x\n"), "{text}");
    assert!(text.ends_with("---\n\nhello"), "{text}");
}

#[test]
fn separators_collapse_names_onto_one_entry() {
    let now = at("2024-01-01T00:00:00Z");
    let documents = [
        Document::new(Metadata::new("A/B", now), "first"),
        Document::new(Metadata::new("A-B", now), "second"),
    ];

    let archive = pack(&documents, &PackOptions::default()).expect("overwrite never fails");

    assert_eq!(archive.names().collect::<Vec<_>>(), ["A-B.md"]);
    let content = String::from_utf8(archive.get("A-B.md").expect("entry").to_vec())
        .expect("utf-8");
    assert!(content.ends_with("second"), "{content}");
    assert_eq!(archive.collisions(), ["A-B.md"]);
}

#[test]
fn import_pack_and_read_back() {
    let now = at("2024-06-01T08:00:00Z");
    let mut store = MemoryStore::new();
    let sources = [
        "---\ntitle: Hello World\ndate: 2024-01-01 09:30\ntags:\n  - intro\n---\n\nFirst post.",
        "---\ntitle: Second\\Post\n---\n\n# Second\\Post\n\nNo header here.",
        "---\ntitle: Spoilers\nslug: custom-slug\n---\n\n!!ending!!",
    ];
    let ids: Vec<_> = sources
        .iter()
        .map(|text| import_document(&mut store, text, None, Some("blog"), now).expect("import"))
        .collect();

    let documents: Vec<Document> = ids
        .iter()
        .map(|id| store.fetch(*id).expect("stored"))
        .collect();
    assert_eq!(documents[0].metadata.created, at("2024-01-01T09:30:00Z"));
    assert_eq!(documents[1].metadata.title, "Second\\Post");
    assert_eq!(documents[1].body, "# Second\\Post\n\nNo header here.");
    assert_eq!(documents[2].metadata.category(), Some("blog"));

    let options = PackOptions {
        naming: NamingPolicy::BySlug,
        collisions: CollisionPolicy::Reject,
        ..PackOptions::default()
    };
    let archive = pack_parallel(&documents, &options).expect("slugs are distinct");
    assert_eq!(
        archive.names().collect::<Vec<_>>(),
        ["hello-world.md", "second-post.md", "custom-slug.md"]
    );

    for (entry, original) in archive.entries().iter().zip(&documents) {
        let text = std::str::from_utf8(&entry.content).expect("utf-8");
        let restored =
            decompose(text, None, DecomposeOptions::default(), now).expect("header parses");
        assert_eq!(restored.metadata, original.metadata, "{text}");
        assert_eq!(restored.body, original.body);
    }
}

#[test]
fn export_matches_compose() {
    let now = at("2024-06-01T08:00:00Z");
    let mut store = MemoryStore::new();
    let id = import_document(&mut store, "---\ntitle: T\n---\n\nBody", None, None, now)
        .expect("import");

    let exported = export_document(&store, id, ComposeOptions::default()).expect("export");
    let stored = store.fetch(id).expect("stored");
    assert_eq!(
        exported,
        compose(&stored.metadata, &stored.body, ComposeOptions::default())
    );
    assert!(exported.contains("title: T\n"));
}
