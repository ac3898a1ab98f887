//! Environment sources.
//!
//! `QUILL_<SECTION>__<KEY>` variables override file settings, e.g.
//! `QUILL_GENERATION__MAX_CONCURRENT=8`. Credentials use their conventional
//! names and are applied last, after deserialization.

use crate::config::QuillConfig;
use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const OPENAI_ORGANIZATION_VAR: &str = "OPENAI_ORGANIZATION";
pub const IMAGE_SEARCH_API_KEY_VAR: &str = "IMAGE_SEARCH_API_KEY";

/// Add the `QUILL_*` override source.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("QUILL")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}

/// Fill credentials from their environment variables. Empty values are ignored.
pub fn apply_credentials(config: &mut QuillConfig) {
    if let Some(key) = non_empty_var(OPENAI_API_KEY_VAR) {
        config.provider.api_key = Some(key);
    }
    if let Some(organization) = non_empty_var(OPENAI_ORGANIZATION_VAR) {
        config.provider.organization = Some(organization);
    }
    if let Some(key) = non_empty_var(IMAGE_SEARCH_API_KEY_VAR) {
        config.images.api_key = Some(key);
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
