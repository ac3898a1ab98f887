//! Resuming work: regeneration of failed and interrupted items

use super::test_utils::*;
use quill::error::{ApiError, StorageError};
use quill::store::{GenerationRecord, GenerationStatus, RecordStore};
use quill::types::{ImageAsset, InputItem};
use std::sync::Arc;

#[tokio::test]
async fn test_regeneration_only_touches_unfinished_items() {
    let completions = ScriptedCompletions::new();
    completions.fail_body_for("flaky keyword");
    let images = KeyedImages::with("gardening", ImageAsset::new("https://img/1", "alice"));
    let store = temp_store();
    let categories = category_map(&[("garden", "gardening")]);

    let first = build_generator(
        completions.clone(),
        images.clone(),
        categories.clone(),
        store.clone(),
        4,
    )
    .generate_all(vec![
        InputItem::new("stable keyword", "garden"),
        InputItem::new("flaky keyword", "garden"),
    ])
    .await
    .unwrap();
    assert_eq!((first.succeeded, first.failed), (1, 1));

    let stable_before = store.get("stable keyword").unwrap().unwrap();
    let stable_calls = completions.calls_mentioning("stable keyword");
    let image_calls = images.queries.lock().len();

    completions.heal();
    let second = build_generator(
        completions.clone(),
        images.clone(),
        categories,
        store.clone(),
        4,
    )
    .regenerate_failed()
    .await
    .unwrap();

    assert_eq!((second.succeeded, second.failed, second.skipped), (1, 0, 0));
    assert_eq!(store.get("stable keyword").unwrap().unwrap(), stable_before);
    assert_eq!(completions.calls_mentioning("stable keyword"), stable_calls);
    assert_eq!(images.queries.lock().len(), image_calls + 1);

    let healed = store.get("flaky keyword").unwrap().unwrap();
    assert_eq!(healed.status, GenerationStatus::Succeeded);
    assert!(healed.last_error.is_none());
    assert_eq!(healed.image_url, "https://img/1");
}

#[tokio::test]
async fn test_regeneration_with_nothing_to_do_makes_no_calls() {
    let completions = ScriptedCompletions::new();
    let images = KeyedImages::empty();
    let store = temp_store();
    let generator = build_generator(
        completions.clone(),
        images.clone(),
        category_map(&[]),
        store.clone(),
        4,
    );

    generator
        .generate_all(vec![InputItem::new("done", "c")])
        .await
        .unwrap();
    let calls = completions.calls();

    let summary = generator.regenerate_failed().await.unwrap();
    assert_eq!(summary.total(), 0);
    assert_eq!(completions.calls(), calls);
    assert_eq!(images.queries.lock().len(), 1);
}

#[tokio::test]
async fn test_interrupted_batch_leaves_pending_records_to_resume() {
    let store = temp_store();
    // What a crash right after registration leaves behind.
    store
        .register_pending(&[InputItem::new("never attempted", "c")])
        .unwrap();
    assert_eq!(
        store.get("never attempted").unwrap().unwrap().status,
        GenerationStatus::Pending
    );

    let summary = build_generator(
        ScriptedCompletions::new(),
        KeyedImages::empty(),
        category_map(&[]),
        store.clone(),
        4,
    )
    .regenerate_failed()
    .await
    .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert!(store.get("never attempted").unwrap().unwrap().is_succeeded());
}

/// Store whose writes always fail.
struct ReadOnlyStore;

impl RecordStore for ReadOnlyStore {
    fn get(&self, _keyword: &str) -> Result<Option<GenerationRecord>, StorageError> {
        Ok(None)
    }

    fn upsert(&self, _record: &GenerationRecord) -> Result<(), StorageError> {
        Err(StorageError::Database("read-only".to_string()))
    }

    fn register_pending(&self, items: &[InputItem]) -> Result<usize, StorageError> {
        Ok(items.len())
    }

    fn list_pending_or_failed(&self) -> Result<Vec<InputItem>, StorageError> {
        Ok(Vec::new())
    }

    fn get_all(&self) -> Result<Vec<GenerationRecord>, StorageError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_storage_failure_aborts_the_batch() {
    let generator = build_generator(
        ScriptedCompletions::new(),
        KeyedImages::empty(),
        category_map(&[]),
        Arc::new(ReadOnlyStore),
        2,
    );

    let err = generator
        .generate_all(vec![InputItem::new("a", "c"), InputItem::new("b", "c")])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::StorageError(StorageError::Database(_))));
}
