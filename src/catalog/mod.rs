// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Image catalog: discovery and the per-image record

pub mod record;
pub mod scan;

use chrono::{DateTime, Utc};

pub use record::{ImageId, ImageRecord};
pub use scan::{absolutize, build_catalog, file_extension, is_image_file, IMAGE_EXTENSIONS};

/// Ordered result of one discovery pass
#[derive(Debug, Clone)]
pub struct Catalog {
    pub records: Vec<ImageRecord>,
    pub scanned_at: DateTime<Utc>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
