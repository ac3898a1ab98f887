//! Article Generator
//!
//! Orchestrates generation for a batch of items. Each item runs its title
//! pipeline locally, then fetches meta-title, meta-description, body and image
//! concurrently. At most `max_concurrent` items are in their network phase at
//! any time; the rest wait on a fair semaphore.
//!
//! Outcomes are written to the [`RecordStore`] per item as soon as they are
//! known. A failed sub-generation fails the whole item and nothing it produced
//! is kept. Only storage failures abort a batch.

pub mod postprocess;

pub use postprocess::TitleEchoPolicy;

use crate::assets::AssetResolver;
use crate::completion::CompletionClient;
use crate::error::{ApiError, GenerationError};
use crate::prompts::PromptSpec;
use crate::provider::CompletionOptions;
use crate::store::{GeneratedArticle, GenerationRecord, RecordStore};
use crate::types::{ImageAsset, InputItem};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Completion-backed article fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArticleField {
    MetaTitle,
    MetaDescription,
    Body,
}

impl ArticleField {
    pub fn as_str(self) -> &'static str {
        match self {
            ArticleField::MetaTitle => "meta_title",
            ArticleField::MetaDescription => "meta_desc",
            ArticleField::Body => "body",
        }
    }
}

impl fmt::Display for ArticleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sub-generation failure tagged with the field it was producing.
#[derive(Debug, Clone, Error)]
#[error("{field}: {source}")]
pub struct FieldError {
    pub field: ArticleField,
    #[source]
    pub source: GenerationError,
}

/// Tuning constants for generation (the `[generation]` config section)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Maximum items in their network phase at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Delay before retrying a failed completion call (milliseconds)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_meta_title_options")]
    pub meta_title: CompletionOptions,

    #[serde(default = "default_meta_description_options")]
    pub meta_description: CompletionOptions,

    #[serde(default = "default_body_options")]
    pub body: CompletionOptions,

    /// What to do with the first line of generated bodies
    #[serde(default)]
    pub title_echo: TitleEchoPolicy,
}

fn default_max_concurrent() -> usize {
    4
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_meta_title_options() -> CompletionOptions {
    CompletionOptions {
        max_tokens: 45,
        ..CompletionOptions::default()
    }
}

fn default_meta_description_options() -> CompletionOptions {
    CompletionOptions {
        max_tokens: 130,
        ..CompletionOptions::default()
    }
}

fn default_body_options() -> CompletionOptions {
    CompletionOptions {
        max_tokens: 3711,
        temperature: 0.5,
        presence_penalty: 0.5,
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            retry_delay_ms: default_retry_delay_ms(),
            meta_title: default_meta_title_options(),
            meta_description: default_meta_description_options(),
            body: default_body_options(),
            title_echo: TitleEchoPolicy::default(),
        }
    }
}

impl GenerationSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent == 0 {
            return Err("max_concurrent must be at least 1".to_string());
        }
        for (name, options) in [
            ("meta_title", &self.meta_title),
            ("meta_description", &self.meta_description),
            ("body", &self.body),
        ] {
            if options.max_tokens == 0 {
                return Err(format!("{}.max_tokens must be at least 1", name));
            }
            if !(0.0..=2.0).contains(&options.temperature) {
                return Err(format!("{}.temperature must be within 0.0-2.0", name));
            }
            if !(-2.0..=2.0).contains(&options.presence_penalty) {
                return Err(format!("{}.presence_penalty must be within -2.0-2.0", name));
            }
        }
        Ok(())
    }
}

/// Everything the generator needs to know about how to generate
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub prompts: PromptSpec,
    pub meta_title: CompletionOptions,
    pub meta_description: CompletionOptions,
    pub body: CompletionOptions,
    pub generate_images: bool,
    pub max_concurrent: usize,
    pub retry_delay: Duration,
    pub title_echo: TitleEchoPolicy,
    /// Regenerate items that already succeeded
    pub force: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::from_settings(&GenerationSettings::default(), PromptSpec::default(), true)
    }
}

impl GenerationConfig {
    pub fn from_settings(
        settings: &GenerationSettings,
        prompts: PromptSpec,
        generate_images: bool,
    ) -> Self {
        Self {
            prompts,
            meta_title: settings.meta_title,
            meta_description: settings.meta_description,
            body: settings.body,
            generate_images,
            max_concurrent: settings.max_concurrent.max(1),
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
            title_echo: settings.title_echo,
            force: false,
        }
    }

    fn options_for(&self, field: ArticleField) -> &CompletionOptions {
        match field {
            ArticleField::MetaTitle => &self.meta_title,
            ArticleField::MetaDescription => &self.meta_description,
            ArticleField::Body => &self.body,
        }
    }

    fn prompt_for(&self, field: ArticleField, item: &InputItem) -> String {
        match field {
            ArticleField::MetaTitle => (self.prompts.meta_title)(item),
            ArticleField::MetaDescription => (self.prompts.meta_description)(item),
            ArticleField::Body => (self.prompts.body)(item),
        }
    }
}

/// One failed item in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub keyword: String,
    pub error: String,
}

/// Outcome counts for a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Items left alone because they had already succeeded
    pub skipped: usize,
    pub failures: Vec<ItemFailure>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }

    fn record(&mut self, record: &GenerationRecord) {
        if record.is_succeeded() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
            self.failures.push(ItemFailure {
                keyword: record.keyword.clone(),
                error: record.last_error.clone().unwrap_or_default(),
            });
        }
    }
}

/// Bounded-concurrency article generator backed by a record store.
pub struct ArticleGenerator {
    completions: CompletionClient,
    assets: AssetResolver,
    store: Arc<dyn RecordStore>,
    config: GenerationConfig,
    gate: Arc<Semaphore>,
}

impl ArticleGenerator {
    pub fn new(
        completions: CompletionClient,
        assets: AssetResolver,
        store: Arc<dyn RecordStore>,
        config: GenerationConfig,
    ) -> Self {
        let completions = completions.with_retry_delay(config.retry_delay);
        let gate = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        Self {
            completions,
            assets,
            store,
            config,
            gate,
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Generate every item, skipping those that already succeeded unless
    /// `force` is set. All items are registered as pending first, so an
    /// interrupted batch can be finished with [`Self::regenerate_failed`].
    pub async fn generate_all(&self, items: Vec<InputItem>) -> Result<BatchSummary, ApiError> {
        let items = dedupe_by_keyword(items);
        let registered = self.store.register_pending(&items)?;
        info!(
            items = items.len(),
            newly_registered = registered,
            max_concurrent = self.config.max_concurrent,
            force = self.config.force,
            "Starting generation batch"
        );
        self.run_batch(items, self.config.force).await
    }

    /// Generate only the items the store does not list as succeeded.
    pub async fn regenerate_failed(&self) -> Result<BatchSummary, ApiError> {
        let items = self.store.list_pending_or_failed()?;
        info!(
            items = items.len(),
            max_concurrent = self.config.max_concurrent,
            "Starting regeneration of pending and failed items"
        );
        self.run_batch(items, false).await
    }

    async fn run_batch(
        &self,
        items: Vec<InputItem>,
        force: bool,
    ) -> Result<BatchSummary, ApiError> {
        let started = Instant::now();
        let mut summary = BatchSummary::default();
        let mut futures = FuturesUnordered::new();

        for item in items {
            if !force {
                if let Some(existing) = self.store.get(&item.keyword)? {
                    if existing.is_succeeded() {
                        debug!(keyword = %item.keyword, "Already generated, skipping");
                        summary.skipped += 1;
                        continue;
                    }
                }
            }

            let gate = Arc::clone(&self.gate);
            futures.push(async move {
                let _permit = gate
                    .acquire_owned()
                    .await
                    .map_err(|_| ApiError::RuntimeError("Admission gate closed".to_string()))?;
                self.generate_one(&item).await
            });
        }

        while let Some(outcome) = futures.next().await {
            // A storage failure drops the remaining futures; their records
            // keep whatever status they had before this batch.
            let record = outcome?;
            summary.record(&record);
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            duration_ms = started.elapsed().as_millis() as u64,
            "Generation batch finished"
        );
        Ok(summary)
    }

    /// Generate one item and persist the outcome.
    ///
    /// Generation failures are recorded on the returned record; only storage
    /// errors are returned as `Err`.
    pub async fn generate_one(&self, item: &InputItem) -> Result<GenerationRecord, ApiError> {
        let started = Instant::now();
        let title = (self.config.prompts.title)(item);
        debug!(keyword = %item.keyword, "Generating article");

        // The title is computed locally, so an empty one fails before any call.
        let record = if title.trim().is_empty() {
            GenerationRecord::failed(item, title, format!("title: {}", GenerationError::EmptyTitle))
        } else {
            let completions = futures::future::try_join3(
                self.complete_field(ArticleField::MetaTitle, item),
                self.complete_field(ArticleField::MetaDescription, item),
                self.complete_field(ArticleField::Body, item),
            );
            let (texts, image) = tokio::join!(completions, self.resolve_image(item));

            match texts {
                Ok((meta_title, meta_desc, raw_content)) => {
                    self.assemble(item, title, meta_title, meta_desc, raw_content, image)
                }
                Err(err) => GenerationRecord::failed(item, title, err.to_string()),
            }
        };

        self.store.upsert(&record)?;

        let duration_ms = started.elapsed().as_millis() as u64;
        match &record.last_error {
            None => info!(keyword = %item.keyword, duration_ms, "Article generated"),
            Some(error) => warn!(
                keyword = %item.keyword,
                duration_ms,
                error = %error,
                "Article generation failed"
            ),
        }
        Ok(record)
    }

    fn assemble(
        &self,
        item: &InputItem,
        title: String,
        meta_title: String,
        meta_desc: String,
        raw_content: String,
        image: ImageAsset,
    ) -> GenerationRecord {
        let cleaned_content =
            postprocess::clean_body(&raw_content, self.config.title_echo, &title);
        if cleaned_content.is_empty() {
            return GenerationRecord::failed(
                item,
                title,
                FieldError {
                    field: ArticleField::Body,
                    source: GenerationError::EmptyOutput,
                }
                .to_string(),
            );
        }
        let rendered_content = postprocess::render_html(&cleaned_content);

        GenerationRecord::succeeded(
            item,
            GeneratedArticle {
                title,
                meta_title,
                meta_desc,
                raw_content,
                cleaned_content,
                rendered_content,
                image,
            },
        )
    }

    async fn complete_field(
        &self,
        field: ArticleField,
        item: &InputItem,
    ) -> Result<String, FieldError> {
        let prompt = self.config.prompt_for(field, item);
        let text = self
            .completions
            .generate(&prompt, self.config.options_for(field))
            .await
            .map_err(|source| FieldError { field, source })?;
        if text.is_empty() {
            return Err(FieldError {
                field,
                source: GenerationError::EmptyOutput,
            });
        }
        Ok(text)
    }

    async fn resolve_image(&self, item: &InputItem) -> ImageAsset {
        if !self.config.generate_images {
            return ImageAsset::none();
        }
        self.assets.resolve(&item.category).await
    }
}

/// Keep the first occurrence of each keyword.
fn dedupe_by_keyword(items: Vec<InputItem>) -> Vec<InputItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let fresh = seen.insert(item.keyword.clone());
            if !fresh {
                warn!(keyword = %item.keyword, "Duplicate keyword in input, ignoring");
            }
            fresh
        })
        .collect()
}
