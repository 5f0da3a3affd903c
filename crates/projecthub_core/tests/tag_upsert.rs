use projecthub_core::db::{open_db, open_db_in_memory};
use projecthub_core::{
    normalize_tag_id, SqliteTagRepository, Tag, TagRepository, TagRole, TagService,
    TagServiceError,
};
use std::thread;

fn tag(id: &str, display: &str, role: TagRole) -> Tag {
    Tag {
        id: id.to_string(),
        display: display.to_string(),
        role,
    }
}

#[test]
fn upsert_creates_once_and_returns_existing_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();

    let first = repo
        .upsert_tag(&tag("rust", "Rust", TagRole::Category))
        .unwrap();
    assert!(first.created);
    assert_eq!(first.record.display, "Rust");
    assert!(!first.record.is_category);
    assert_eq!(first.record.usage_count, 0);

    conn.execute("UPDATE tags SET usage_count = 7 WHERE id = 'rust';", [])
        .unwrap();
    let second = repo
        .upsert_tag(&tag("rust", "Rust language", TagRole::Custom))
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.record.display, "Rust");
    assert_eq!(second.record.usage_count, 7);
    assert_eq!(repo.list_tags().unwrap().len(), 1);
}

#[test]
fn service_normalizes_ids_in_input_order() {
    let conn = open_db_in_memory().unwrap();
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let normalized = service
        .normalize_and_upsert(&[
            tag("Zero Waste", "Zero waste", TagRole::Category),
            tag("ALPHA", "Alpha", TagRole::Custom),
            tag("zero waste", "Dup", TagRole::Relational),
        ])
        .unwrap();

    let ids: Vec<&str> = normalized.iter().map(|tag| tag.id.as_str()).collect();
    assert_eq!(ids, vec!["zero-waste", "alpha"]);
    assert_eq!(normalized[0].role, TagRole::Category);

    let stored: Vec<String> = service
        .repo()
        .list_tags()
        .unwrap()
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(stored, vec!["alpha".to_string(), "zero-waste".to_string()]);
}

#[test]
fn service_rejects_ids_that_normalize_to_empty() {
    let conn = open_db_in_memory().unwrap();
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let err = service
        .normalize_and_upsert(&[tag("   ", "Blank", TagRole::Custom)])
        .unwrap_err();
    assert!(matches!(err, TagServiceError::EmptyTagId(_)));
}

#[test]
fn normalize_matches_documented_examples() {
    assert_eq!(normalize_tag_id("Machine Learning"), "machine-learning");
    assert_eq!(normalize_tag_id("  C# / .NET  "), "c-----net");
    assert_eq!(normalize_tag_id(&"x".repeat(40)).len(), 35);
}

#[test]
fn concurrent_upserts_of_same_tag_create_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tags.db");
    drop(open_db(&path).unwrap());

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let path = path.clone();
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let repo = SqliteTagRepository::try_new(&conn).unwrap();
                let mut created = 0;
                for _ in 0..25 {
                    let outcome = repo
                        .upsert_tag(&tag("shared", &format!("Shared {worker}"), TagRole::Custom))
                        .unwrap();
                    if outcome.created {
                        created += 1;
                    }
                }
                created
            })
        })
        .collect();

    let total_created: i32 = workers
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .sum();
    assert_eq!(total_created, 1);

    let conn = open_db(&path).unwrap();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();
    assert_eq!(repo.list_tags().unwrap().len(), 1);
}
