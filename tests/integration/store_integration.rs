//! Integration tests for the Generation Record Store

use super::test_utils::*;
use quill::store::{GenerationStatus, RecordStore, SledRecordStore};
use quill::types::InputItem;
use std::sync::Arc;
use tempfile::TempDir;

/// Outcomes written by one process are what the next one resumes from.
#[tokio::test]
async fn test_outcomes_survive_reopening_the_store() {
    let temp_dir = TempDir::new().unwrap();
    let completions = ScriptedCompletions::new();
    completions.fail_body_for("needs retry");

    {
        let store = Arc::new(SledRecordStore::new(temp_dir.path()).unwrap());
        build_generator(
            completions.clone(),
            KeyedImages::empty(),
            category_map(&[]),
            store,
            2,
        )
        .generate_all(vec![
            InputItem::new("finished", "c"),
            InputItem::new("needs retry", "c"),
        ])
        .await
        .unwrap();
    }

    let reopened = SledRecordStore::new(temp_dir.path()).unwrap();
    assert_eq!(reopened.len(), 2);
    assert_eq!(
        reopened.get("finished").unwrap().unwrap().status,
        GenerationStatus::Succeeded
    );
    assert_eq!(
        reopened.list_pending_or_failed().unwrap(),
        vec![InputItem::new("needs retry", "c")]
    );
}

/// Every stored record satisfies the status/field invariants.
#[tokio::test]
async fn test_stored_records_satisfy_invariants() {
    let completions = ScriptedCompletions::new();
    completions.fail_body_for("bad-1");
    let store = temp_store();

    build_generator(
        completions,
        KeyedImages::empty(),
        category_map(&[]),
        store.clone(),
        3,
    )
    .generate_all(
        ["ok-1", "bad-1", "ok-2", "ok-3"]
            .iter()
            .map(|k| InputItem::new(*k, "c"))
            .collect(),
    )
    .await
    .unwrap();

    let records = store.get_all().unwrap();
    assert_eq!(records.len(), 4);
    for record in &records {
        assert!(
            record.check_invariants().is_ok(),
            "{} violates invariants",
            record.keyword
        );
    }
}
