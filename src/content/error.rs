//! Content access errors

use thiserror::Error;

/// Errors raised while reading a content category
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Unknown content category: {category}")]
    NotFound { category: String },

    #[error("No entry '{slug}' in category {category}")]
    EntryNotFound { category: String, slug: String },

    #[error("Malformed content in {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContentError {
    pub(crate) fn not_found(category: &str) -> Self {
        Self::NotFound {
            category: category.to_string(),
        }
    }

    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error means "nothing to show" rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::EntryNotFound { .. })
    }
}
