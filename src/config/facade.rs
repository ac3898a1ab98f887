//! Config loading entry point.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::QuillConfig;
use config::{ConfigError, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Sources, lowest to highest precedence:
    /// 1. built-in defaults
    /// 2. global file (`<user config dir>/quill/config.toml`)
    /// 3. `config/config.toml` then `config/{QUILL_ENV}.toml` under the workspace
    /// 4. `QUILL_*` environment variables
    /// 5. credential variables (`OPENAI_API_KEY`, `OPENAI_ORGANIZATION`, `IMAGE_SEARCH_API_KEY`)
    pub fn load(workspace_root: &Path) -> Result<QuillConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let mut config: QuillConfig = builder.build()?.try_deserialize()?;
        environment::apply_credentials(&mut config);
        debug!(workspace = %workspace_root.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load configuration from one explicit file, plus credential variables.
    pub fn load_from_file(path: &Path) -> Result<QuillConfig, ConfigError> {
        let mut config: QuillConfig = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        environment::apply_credentials(&mut config);
        Ok(config)
    }

    /// Path of the global configuration file, if the platform has one.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
