//! Generation Record Store
//!
//! Durable bookkeeping for the pipeline: one [`GenerationRecord`] per keyword,
//! holding the outcome of the latest attempt. Regeneration runs are driven from
//! here, so the store must outlive the process.

pub mod persistence;

pub use persistence::SledRecordStore;

use crate::error::StorageError;
use crate::types::{ImageAsset, InputItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Pending,
    Succeeded,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationStatus::Pending => "pending",
            GenerationStatus::Succeeded => "succeeded",
            GenerationStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated article content, only ever persisted as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArticle {
    pub title: String,
    pub meta_title: String,
    pub meta_desc: String,
    pub raw_content: String,
    pub cleaned_content: String,
    pub rendered_content: String,
    pub image: ImageAsset,
}

/// GenerationRecord: persisted outcome of the latest attempt for one keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub keyword: String,
    pub category: String,
    pub status: GenerationStatus,
    pub title: String,
    pub meta_title: String,
    pub meta_desc: String,
    /// Body exactly as returned by the provider
    pub raw_content: String,
    /// Body after post-processing (markdown)
    pub cleaned_content: String,
    /// HTML rendering of `cleaned_content`
    pub rendered_content: String,
    pub image_url: String,
    pub image_attribution: String,
    pub last_error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl GenerationRecord {
    /// A registered item that has not been attempted yet.
    pub fn pending(item: &InputItem) -> Self {
        Self::blank(item, GenerationStatus::Pending, None)
    }

    /// A finished item; every field comes from the same attempt.
    pub fn succeeded(item: &InputItem, article: GeneratedArticle) -> Self {
        Self {
            keyword: item.keyword.clone(),
            category: item.category.clone(),
            status: GenerationStatus::Succeeded,
            title: article.title,
            meta_title: article.meta_title,
            meta_desc: article.meta_desc,
            raw_content: article.raw_content,
            cleaned_content: article.cleaned_content,
            rendered_content: article.rendered_content,
            image_url: article.image.url,
            image_attribution: article.image.attribution,
            last_error: None,
            updated_at: Utc::now(),
        }
    }

    /// A failed attempt. Only the locally derived title survives; partial
    /// provider output is discarded.
    pub fn failed(item: &InputItem, title: String, error: impl Into<String>) -> Self {
        let mut record = Self::blank(item, GenerationStatus::Failed, Some(error.into()));
        record.title = title;
        record
    }

    fn blank(item: &InputItem, status: GenerationStatus, last_error: Option<String>) -> Self {
        Self {
            keyword: item.keyword.clone(),
            category: item.category.clone(),
            status,
            title: String::new(),
            meta_title: String::new(),
            meta_desc: String::new(),
            raw_content: String::new(),
            cleaned_content: String::new(),
            rendered_content: String::new(),
            image_url: String::new(),
            image_attribution: String::new(),
            last_error,
            updated_at: Utc::now(),
        }
    }

    pub fn input_item(&self) -> InputItem {
        InputItem::new(self.keyword.clone(), self.category.clone())
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == GenerationStatus::Succeeded
    }

    /// Check the status/field invariants of a record.
    pub fn check_invariants(&self) -> Result<(), String> {
        match self.status {
            GenerationStatus::Succeeded => {
                let fields = [
                    ("title", &self.title),
                    ("meta_title", &self.meta_title),
                    ("meta_desc", &self.meta_desc),
                    ("raw_content", &self.raw_content),
                    ("cleaned_content", &self.cleaned_content),
                    ("rendered_content", &self.rendered_content),
                ];
                if let Some((name, _)) = fields.iter().find(|(_, value)| value.is_empty()) {
                    return Err(format!("succeeded record has empty {}", name));
                }
                if self.last_error.is_some() {
                    return Err("succeeded record carries an error".to_string());
                }
                Ok(())
            }
            GenerationStatus::Failed if self.last_error.is_none() => {
                Err("failed record has no error".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Record store interface
pub trait RecordStore: Send + Sync {
    fn get(&self, keyword: &str) -> Result<Option<GenerationRecord>, StorageError>;

    /// Replace or insert by keyword.
    fn upsert(&self, record: &GenerationRecord) -> Result<(), StorageError>;

    /// Insert a pending record for every keyword not yet stored; existing
    /// records are left untouched. Returns how many were added.
    fn register_pending(&self, items: &[InputItem]) -> Result<usize, StorageError>;

    /// Items whose stored status is not `succeeded`, in storage order.
    fn list_pending_or_failed(&self) -> Result<Vec<InputItem>, StorageError>;

    fn get_all(&self) -> Result<Vec<GenerationRecord>, StorageError>;
}
