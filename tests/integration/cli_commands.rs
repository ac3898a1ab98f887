//! `generate` and `regenerate` driven through the CLI run context over HTTP

use super::test_utils::*;
use quill::cli::{Commands, RunContext};
use quill::config::QuillConfig;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const COMPLETION: &str = r##"{"choices":[{"text":"# Heading\nBody text<end>"}]}"##;

fn context(workspace: &Path, endpoint: String) -> RunContext {
    let mut config = QuillConfig::default();
    config.provider.api_key = Some("sk-test".to_string());
    config.provider.endpoint = Some(endpoint);
    config.images.enabled = false;
    config.generation.retry_delay_ms = 0;
    RunContext::with_config(workspace.to_path_buf(), config)
}

/// Completion endpoint that fails every prompt mentioning `failing`.
fn completion_server(failing: Option<&'static str>) -> (String, Arc<parking_lot::Mutex<Vec<String>>>) {
    spawn_stub_server(Arc::new(move |request: &str| match failing {
        Some(keyword) if request.contains(keyword) => {
            ("500 Internal Server Error", r#"{"error":"overloaded"}"#.to_string())
        }
        _ => ("200 OK", COMPLETION.to_string()),
    }))
}

fn run_json(context: &RunContext, command: &Commands) -> serde_json::Value {
    let out = context.execute(command).unwrap();
    serde_json::from_str(&out).unwrap()
}

#[test]
fn test_generate_then_regenerate_through_run_context() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path();
    fs::write(
        workspace.join("keywords.csv"),
        "keyword,category\nstable keyword,garden\nflaky keyword,garden\n",
    )
    .unwrap();

    let (flaky_url, _) = completion_server(Some("flaky keyword"));
    let generated = run_json(
        &context(workspace, flaky_url),
        &Commands::Generate {
            keywords: None,
            categories: None,
            force: false,
            no_export: false,
            format: "json".to_string(),
        },
    );
    assert_eq!(generated["summary"]["succeeded"], 1);
    assert_eq!(generated["summary"]["failed"], 1);
    assert_eq!(generated["summary"]["failures"][0]["keyword"], "flaky keyword");
    assert_eq!(generated["export"]["rows"], 1);
    assert!(workspace.join("generated").join("generated.csv").exists());

    let (healthy_url, requests) = completion_server(None);
    let regenerated = run_json(
        &context(workspace, healthy_url),
        &Commands::Regenerate {
            categories: None,
            no_export: false,
            format: "json".to_string(),
        },
    );
    assert_eq!(regenerated["summary"]["succeeded"], 1);
    assert_eq!(regenerated["summary"]["failed"], 0);
    assert_eq!(regenerated["summary"]["skipped"], 0);
    assert_eq!(regenerated["export"]["rows"], 2);

    let requests = requests.lock();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.contains("flaky keyword")));
    assert!(requests.iter().all(|r| !r.contains("stable keyword")));
}

#[test]
fn test_generate_without_export_leaves_no_artifacts() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path();
    fs::write(workspace.join("keywords.csv"), "keyword,category\nsolo,c\n").unwrap();

    let (url, _) = completion_server(None);
    let out = context(workspace, url)
        .execute(&Commands::Generate {
            keywords: None,
            categories: None,
            force: false,
            no_export: true,
            format: "text".to_string(),
        })
        .unwrap();

    assert!(out.contains("Succeeded: 1"));
    assert!(!workspace.join("generated").exists());
}
