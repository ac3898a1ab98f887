//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::artifacts::{ArtifactReport, ArtifactWriter};
use crate::assets::{AssetResolver, ImageSearch, NoImageSearch, UnsplashClient};
use crate::cli::command_name;
use crate::cli::parse::{Commands, ConfigCommands};
use crate::cli::presentation::{
    format_batch_output, format_export_output, format_status_output, StatusReport,
};
use crate::completion::CompletionClient;
use crate::config::{ConfigLoader, QuillConfig};
use crate::error::ApiError;
use crate::generator::{ArticleGenerator, BatchSummary, GenerationConfig};
use crate::inputs;
use crate::prompts::PromptSpec;
use crate::store::{RecordStore, SledRecordStore};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Runtime context for CLI execution: workspace and effective configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: QuillConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self::with_config(workspace_root, config))
    }

    /// Create run context from an already loaded configuration.
    pub fn with_config(workspace_root: PathBuf, config: QuillConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn config(&self) -> &QuillConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let name = command_name(command);
        let started = Instant::now();
        let result = self.execute_inner(command);
        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(command = %name, duration_ms, "Command finished"),
            Err(e) => warn!(command = %name, duration_ms, error = %e, "Command failed"),
        }
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Generate {
                keywords,
                categories,
                force,
                no_export,
                format,
            } => {
                self.config.ensure_valid()?;
                let keywords_path = keywords
                    .clone()
                    .unwrap_or_else(|| self.resolve(&self.config.inputs.keywords));
                let items = inputs::load_keywords(&keywords_path)?;

                let store = self.open_store()?;
                let generator = self.build_generator(categories.as_deref(), *force, store.clone())?;
                let summary = block_on(generator.generate_all(items))?;
                self.finish_batch(&summary, store.as_ref(), *no_export, format)
            }
            Commands::Regenerate {
                categories,
                no_export,
                format,
            } => {
                self.config.ensure_valid()?;
                let store = self.open_store()?;
                let generator = self.build_generator(categories.as_deref(), false, store.clone())?;
                let summary = block_on(generator.regenerate_failed())?;
                self.finish_batch(&summary, store.as_ref(), *no_export, format)
            }
            Commands::Export { output } => {
                let store = self.open_store()?;
                let output_dir = output
                    .clone()
                    .unwrap_or_else(|| self.resolve(&self.config.output.dir));
                let report = ArtifactWriter::new(output_dir).write_all(&store.get_all()?)?;
                format_export_output(&report, "text")
            }
            Commands::Status { format, failed } => {
                let store = self.open_store()?;
                let report = StatusReport::from_records(&store.get_all()?, *failed);
                format_status_output(&report, format)
            }
            Commands::Config { command } => match command {
                ConfigCommands::Show => self.show_config(),
            },
        }
    }

    fn finish_batch(
        &self,
        summary: &BatchSummary,
        store: &dyn RecordStore,
        no_export: bool,
        format: &str,
    ) -> Result<String, ApiError> {
        let report: Option<ArtifactReport> = if no_export {
            None
        } else {
            let writer = ArtifactWriter::new(self.resolve(&self.config.output.dir));
            Some(writer.write_all(&store.get_all()?)?)
        };
        format_batch_output(summary, report.as_ref(), format)
    }

    fn show_config(&self) -> Result<String, ApiError> {
        let mut out = self.config.to_masked_toml()?;
        if let Err(errors) = self.config.validate() {
            out.push('\n');
            for error in errors {
                out.push_str(&format!("# warning: {}\n", error));
            }
        }
        Ok(out)
    }

    fn build_generator(
        &self,
        categories: Option<&Path>,
        force: bool,
        store: Arc<SledRecordStore>,
    ) -> Result<ArticleGenerator, ApiError> {
        let provider = self.config.provider.create_client()?;
        let completions = CompletionClient::new(provider);

        let images_enabled = self.config.images.enabled;
        let assets = if images_enabled {
            let search: Arc<dyn ImageSearch> =
                Arc::new(UnsplashClient::from_config(&self.config.images)?);
            AssetResolver::new(search, self.load_category_map(categories)?)
        } else {
            AssetResolver::new(Arc::new(NoImageSearch), HashMap::new())
        };

        let mut generation = GenerationConfig::from_settings(
            &self.config.generation,
            PromptSpec::default(),
            images_enabled,
        );
        generation.force = force;

        Ok(ArticleGenerator::new(completions, assets, store, generation))
    }

    /// An explicit `--categories` file must exist; the configured default may be absent.
    fn load_category_map(
        &self,
        categories: Option<&Path>,
    ) -> Result<HashMap<String, String>, ApiError> {
        if let Some(path) = categories {
            return inputs::load_category_map(path);
        }
        let path = self.resolve(&self.config.inputs.categories);
        if path.exists() {
            inputs::load_category_map(&path)
        } else {
            warn!(path = %path.display(), "No category map, searching images by category name");
            Ok(HashMap::new())
        }
    }

    fn open_store(&self) -> Result<Arc<SledRecordStore>, ApiError> {
        let store_path = self.resolve(&self.config.storage.store_path);
        std::fs::create_dir_all(&store_path)
            .map_err(|e| ApiError::StorageError(crate::error::StorageError::IoError(e)))?;
        Ok(Arc::new(SledRecordStore::new(&store_path)?))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        QuillConfig::resolve(&self.workspace_root, path)
    }
}

/// Drive an async operation to completion on a fresh multi-threaded runtime.
fn block_on<T, F>(future: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| ApiError::RuntimeError(format!("Failed to create runtime: {}", e)))?;
    runtime.block_on(future)
}
