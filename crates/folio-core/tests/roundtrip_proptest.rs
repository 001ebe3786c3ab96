//! Property tests for the transformation engine and the relational store

use folio_core::transform::{serialize, Rule};
use folio_core::{Archive, ArchiveConfig, ContentType, Database, Document, LocalFsal};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from),
    ]
}

/// Strings only: TEXT columns store integers as text
fn text() -> impl Strategy<Value = Value> {
    "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from)
}

fn playlist_entry() -> impl Strategy<Value = Value> {
    ("[a-z]{1,8}\\.mp3", text()).prop_map(|(file, title)| json!({"path": "p", "file": file, "title": title}))
}

proptest! {
    #[test]
    fn prop_serialize_never_mutates_input(
        title in scalar(),
        size in scalar(),
        replaces in "[a-f0-9]{8}",
    ) {
        let input = json!({
            "path": "p",
            "replaces": replaces,
            "content": {"title": title, "video": {"size": size}}
        });
        let input = input.as_object().unwrap().clone();
        let before = input.clone();
        let out = serialize(&input, &folio_core::default_rules());

        prop_assert_eq!(&input, &before);
        prop_assert!(out.get("replaces").is_none());
        prop_assert!(out.get("content").is_none());
        prop_assert_eq!(&out["video"]["resolution"], &size);
    }

    #[test]
    fn prop_ignore_then_rename_keeps_value(value in scalar()) {
        let input = json!({"a": value.clone()}).as_object().unwrap().clone();
        let out = serialize(&input, &[Rule::ignore("b"), Rule::rename("a", "b")]);
        prop_assert_eq!(Value::Object(out), json!({"b": value}));
    }

    #[test]
    fn prop_store_roundtrip(
        title in "[a-zA-Z ]{1,20}",
        views in 0i64..1_000_000,
        description in "[a-z ]{0,20}",
        entries in proptest::collection::btree_map("[a-z]{1,8}", text(), 1..5),
    ) {
        let playlist: Vec<Value> = entries
            .into_iter()
            .map(|(file, title)| json!({"path": "p", "file": format!("{}.mp3", file), "title": title}))
            .collect();
        let original: Document = json!({
            "path": "p",
            "title": title,
            "views": views,
            "content_type": ContentType::Audio.bit(),
            "tags": "{}",
            "disabled": 0,
            "keep_formatting": 0,
            "audio": {"path": "p", "description": description, "playlist": playlist}
        })
        .as_object()
        .unwrap()
        .clone();

        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let archive = Archive::new(&db, Arc::new(LocalFsal::new(".")), ArchiveConfig::default());
        archive.add_meta_to_db(&original).unwrap();

        let loaded = archive.get_single("p").unwrap().unwrap();
        prop_assert_eq!(loaded.document(), &original);
    }

    #[test]
    fn prop_playlist_entries_keep_order(entries in proptest::collection::vec(playlist_entry(), 1..6)) {
        let mut seen = std::collections::HashSet::new();
        let entries: Vec<Value> = entries
            .into_iter()
            .filter(|e| seen.insert(e["file"].as_str().unwrap().to_string()))
            .collect();

        let doc = json!({"path": "p", "audio": {"playlist": entries.clone()}});
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let archive = Archive::new(&db, Arc::new(LocalFsal::new(".")), ArchiveConfig::default());
        archive.add_meta_to_db(doc.as_object().unwrap()).unwrap();

        let loaded = archive.get_single("p").unwrap().unwrap();
        prop_assert_eq!(&loaded.child("audio").unwrap()["playlist"], &Value::Array(entries));
    }
}
