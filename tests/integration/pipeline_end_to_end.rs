//! End-to-end pipeline: input item -> store -> CSV artifacts

use super::test_utils::*;
use quill::artifacts::ArtifactWriter;
use quill::store::{GenerationStatus, RecordStore};
use quill::types::{ImageAsset, InputItem};
use tempfile::TempDir;

#[tokio::test]
async fn test_single_keyword_produces_complete_record_and_artifact() {
    let completions = ScriptedCompletions::new();
    let images = KeyedImages::with("gardening", ImageAsset::new("https://img/1", "alice"));
    let store = temp_store();
    let generator = build_generator(
        completions.clone(),
        images.clone(),
        category_map(&[("garden", "gardening")]),
        store.clone(),
        4,
    );

    let summary = generator
        .generate_all(vec![InputItem::new("composting at home", "garden")])
        .await
        .unwrap();
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 0);

    let record = store.get("composting at home").unwrap().unwrap();
    assert_eq!(record.status, GenerationStatus::Succeeded);
    assert_eq!(record.title, "composting at home");
    assert_eq!(record.meta_title, META_TITLE);
    assert_eq!(record.meta_desc, META_DESC);
    assert_eq!(record.raw_content, BODY);
    assert_eq!(record.cleaned_content, "## Intro\nTexto **clave**.");
    assert!(record.rendered_content.contains("<h2>Intro</h2>"));
    assert!(record.rendered_content.contains("<strong>clave</strong>"));
    assert_eq!(record.image_url, "https://img/1");
    assert_eq!(record.image_attribution, "alice");
    assert!(record.check_invariants().is_ok());
    assert_eq!(*images.queries.lock(), vec!["gardening".to_string()]);
    assert_eq!(completions.calls(), 3);

    let out = TempDir::new().unwrap();
    let report = ArtifactWriter::new(out.path())
        .write_all(&store.get_all().unwrap())
        .unwrap();
    assert_eq!(report.rows, 1);

    let mut reader = csv::Reader::from_path(&report.aggregate_path).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "composting at home");
    assert_eq!(&rows[0][2], "garden");
    assert_eq!(&rows[0][3], META_TITLE);
    assert_eq!(&rows[0][8], "https://img/1");
    assert_eq!(&rows[0][9], "alice");

    assert!(out
        .path()
        .join("keywords")
        .join("composting_at_home_generated.csv")
        .exists());
}

#[tokio::test]
async fn test_missing_image_still_succeeds() {
    let store = temp_store();
    let generator = build_generator(
        ScriptedCompletions::new(),
        KeyedImages::empty(),
        category_map(&[]),
        store.clone(),
        4,
    );

    generator
        .generate_all(vec![InputItem::new("urban beekeeping", "bees")])
        .await
        .unwrap();

    let record = store.get("urban beekeeping").unwrap().unwrap();
    assert_eq!(record.status, GenerationStatus::Succeeded);
    assert_eq!(record.image_url, "");
    assert_eq!(record.image_attribution, "");
}

#[tokio::test]
async fn test_failed_item_does_not_affect_siblings() {
    let completions = ScriptedCompletions::new();
    completions.fail_body_for("broken keyword");
    let store = temp_store();
    let generator = build_generator(
        completions.clone(),
        KeyedImages::empty(),
        category_map(&[]),
        store.clone(),
        2,
    );

    let summary = generator
        .generate_all(vec![
            InputItem::new("healthy keyword", "c"),
            InputItem::new("broken keyword", "c"),
            InputItem::new("another keyword", "c"),
        ])
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].keyword, "broken keyword");

    let failed = store.get("broken keyword").unwrap().unwrap();
    assert_eq!(failed.status, GenerationStatus::Failed);
    // meta fields were generated but must not be kept
    assert_eq!(failed.meta_title, "");
    assert_eq!(failed.meta_desc, "");
    assert_eq!(failed.raw_content, "");
    assert_eq!(failed.image_url, "");
    let error = failed.last_error.unwrap();
    assert!(error.starts_with("body: completion retries exhausted after 5 attempts"));
    assert!(error.contains("upstream unavailable"));
}
