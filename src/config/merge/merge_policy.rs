//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources override earlier ones key by key; tables are merged, scalars
//! and arrays are replaced. Every leaf of a nested table gets a default here, so
//! a source may override a single key such as `generation.body.max_tokens`.

use crate::generator::GenerationSettings;
use crate::provider::CompletionOptions;
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let generation = GenerationSettings::default();
    let mut builder = Config::builder()
        .set_default("storage.store_path", ".quill/store")?
        .set_default("inputs.keywords", "keywords.csv")?
        .set_default("inputs.categories", "categories.csv")?
        .set_default("output.dir", "generated")?
        .set_default("generation.max_concurrent", generation.max_concurrent as i64)?
        .set_default("generation.retry_delay_ms", generation.retry_delay_ms as i64)?
        .set_default("images.enabled", true)?;

    for (field, options) in [
        ("meta_title", &generation.meta_title),
        ("meta_description", &generation.meta_description),
        ("body", &generation.body),
    ] {
        builder = completion_defaults(builder, field, options)?;
    }
    Ok(builder)
}

fn completion_defaults(
    builder: ConfigBuilder<DefaultState>,
    field: &str,
    options: &CompletionOptions,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let key = |name: &str| format!("generation.{}.{}", field, name);
    builder
        .set_default(key("max_tokens"), i64::from(options.max_tokens))?
        .set_default(key("temperature"), f64::from(options.temperature))?
        .set_default(key("presence_penalty"), f64::from(options.presence_penalty))
}
