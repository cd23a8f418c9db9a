// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for bucketsort

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bucketsort operations
pub type Result<T> = std::result::Result<T, SortError>;

/// bucketsort error types
#[derive(Error, Debug)]
pub enum SortError {
    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Image {id} already assigned to bucket '{bucket}'")]
    AlreadyAssigned { id: String, bucket: String },

    #[error("Image {id} path differs from original path ({current:?} != {original:?})")]
    PathMismatch {
        id: String,
        original: PathBuf,
        current: PathBuf,
    },

    #[error("Unknown bucket: {0}")]
    UnknownBucket(String),

    #[error("Error creating directory {path:?}: {source}")]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error moving file {from:?} to {to:?}: {source}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog lock poisoned")]
    LockPoisoned,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl SortError {
    /// Whether repeating the same operation later could succeed.
    ///
    /// Only filesystem failures qualify; the rest describe a stale or invalid
    /// request and will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SortError::MoveFailed { .. } | SortError::DirectoryCreateFailed { .. }
        )
    }
}
