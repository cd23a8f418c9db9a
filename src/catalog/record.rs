// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Image record and its identifier

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier assigned once at discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(Uuid);

impl ImageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ImageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// One discovered image and where it currently lives
///
/// `bucket` is `None` exactly when `current_path == original_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,
    pub original_path: PathBuf,
    pub current_path: PathBuf,
    pub bucket: Option<String>,
}

impl ImageRecord {
    /// Fresh, unassigned record for a file found at `path`
    pub fn discovered(path: PathBuf) -> Self {
        Self {
            id: ImageId::new(),
            current_path: path.clone(),
            original_path: path,
            bucket: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.bucket.is_some()
    }

    /// Whether the logical state agrees with the physical location
    pub fn is_consistent(&self) -> bool {
        self.bucket.is_none() == (self.current_path == self.original_path)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.original_path.file_name().and_then(|n| n.to_str())
    }
}

impl fmt::Display for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id: {}, path original: {}, path current: {}, bucket: {}",
            self.id,
            self.original_path.display(),
            self.current_path.display(),
            self.bucket.as_deref().unwrap_or("")
        )
    }
}
