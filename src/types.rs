//! Core value types shared across the pipeline.

use serde::{Deserialize, Serialize};

/// One unit of work: a keyword to write about and the category it belongs to.
///
/// `keyword` is the identity key for the whole pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputItem {
    pub keyword: String,
    pub category: String,
}

impl InputItem {
    pub fn new(keyword: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            category: category.into(),
        }
    }
}

/// A resolved illustrative image. Empty `url` means no image is available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub url: String,
    pub attribution: String,
}

impl ImageAsset {
    pub fn new(url: impl Into<String>, attribution: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            attribution: attribution.into(),
        }
    }

    /// The "no image" sentinel.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.url.is_empty()
    }
}
