//! Configuration loading through the CLI run context

use quill::cli::{Commands, RunContext};
use quill::store::{RecordStore, SledRecordStore};
use quill::types::InputItem;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Points the global config lookup at an empty directory for the test's duration.
struct IsolatedConfigHome {
    previous: Option<String>,
}

impl IsolatedConfigHome {
    fn new(dir: &Path) -> Self {
        let previous = std::env::var("XDG_CONFIG_HOME").ok();
        std::env::set_var("XDG_CONFIG_HOME", dir);
        Self { previous }
    }
}

impl Drop for IsolatedConfigHome {
    fn drop(&mut self) {
        match &self.previous {
            Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }
}

#[test]
fn test_workspace_config_moves_the_store() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp = TempDir::new().unwrap();
    let _home = IsolatedConfigHome::new(&temp.path().join("xdg"));
    let workspace = temp.path().join("workspace");
    fs::create_dir_all(workspace.join("config")).unwrap();
    fs::write(
        workspace.join("config").join("config.toml"),
        "[storage]\nstore_path = \"state/records\"\n",
    )
    .unwrap();

    {
        let store = SledRecordStore::new(workspace.join("state").join("records")).unwrap();
        store
            .register_pending(&[InputItem::new("queued", "c")])
            .unwrap();
    }

    let context = RunContext::new(workspace.clone(), None).unwrap();
    assert_eq!(
        context.config().storage.store_path,
        Path::new("state/records")
    );

    let out = context
        .execute(&Commands::Status {
            format: "json".to_string(),
            failed: false,
        })
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["pending"], 1);
    assert_eq!(value["records"][0]["keyword"], "queued");
}

#[test]
fn test_explicit_config_file_is_used() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp = TempDir::new().unwrap();
    let _home = IsolatedConfigHome::new(&temp.path().join("xdg"));
    let config_file = temp.path().join("custom.toml");
    fs::write(
        &config_file,
        "[generation]\nmax_concurrent = 7\n\n[images]\nenabled = false\n",
    )
    .unwrap();

    let context = RunContext::new(temp.path().to_path_buf(), Some(config_file)).unwrap();
    assert_eq!(context.config().generation.max_concurrent, 7);
    assert!(!context.config().images.enabled);
}

#[test]
fn test_invalid_config_file_is_an_error() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp = TempDir::new().unwrap();
    let config_file = temp.path().join("broken.toml");
    fs::write(&config_file, "[generation]\nmax_concurrent = \"many\"\n").unwrap();

    assert!(RunContext::new(temp.path().to_path_buf(), Some(config_file)).is_err());
}
