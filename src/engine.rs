// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Assignment engine and query surface over the shared catalog
//!
//! Records live in an arena addressed through an id index that never changes
//! after construction. Every mutation runs under one catalog lock, and the
//! filesystem move always happens before the in-memory commit, so a failed
//! operation leaves the record exactly as it was.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::buckets::{BucketGroups, BucketRegistry};
use crate::catalog::{absolutize, Catalog, ImageId, ImageRecord};
use crate::{Result, SortError};

/// Progress counters for the UI
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SortStats {
    pub total: usize,
    pub assigned: usize,
    pub unassigned: usize,
    pub per_bucket: Vec<BucketCount>,
    pub scanned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BucketCount {
    pub name: String,
    pub count: usize,
}

/// Owns the catalog for the lifetime of the process
pub struct Sorter {
    records: Mutex<Vec<ImageRecord>>,
    index: HashMap<ImageId, usize>,
    registry: BucketRegistry,
    output_root: PathBuf,
    scanned_at: DateTime<Utc>,
}

impl Sorter {
    /// Take ownership of a catalog. A relative `output_root` is resolved
    /// against the current directory once, here.
    pub fn new(
        catalog: Catalog,
        registry: BucketRegistry,
        output_root: impl AsRef<Path>,
    ) -> Result<Self> {
        let output_root = absolutize(output_root.as_ref())?;
        let index = catalog
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id, i))
            .collect();

        Ok(Self {
            records: Mutex::new(catalog.records),
            index,
            registry,
            output_root,
            scanned_at: catalog.scanned_at,
        })
    }

    pub fn registry(&self) -> &BucketRegistry {
        &self.registry
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Create the directory of every registered bucket
    pub fn prepare_output(&self) -> Result<()> {
        for bucket in self.registry.iter() {
            let dir = self.output_root.join(&bucket.name);
            ensure_dir(&dir)?;
            debug!("Bucket directory ready: {:?}", dir);
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<ImageRecord>>> {
        self.records.lock().map_err(|_| SortError::LockPoisoned)
    }

    fn slot(&self, id: &ImageId) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| SortError::NotFound(id.to_string()))
    }

    // === Query surface ===

    /// Look up a record by id
    pub fn find_by_id(&self, id: &ImageId) -> Result<Option<ImageRecord>> {
        let Some(&slot) = self.index.get(id) else {
            return Ok(None);
        };
        Ok(Some(self.lock()?[slot].clone()))
    }

    /// Like `find_by_id`, but absence is a `NotFound` error
    pub fn get(&self, id: &ImageId) -> Result<ImageRecord> {
        self.find_by_id(id)?
            .ok_or_else(|| SortError::NotFound(id.to_string()))
    }

    /// First record in discovery order that has no bucket yet
    pub fn first_unassigned(&self) -> Result<Option<ImageRecord>> {
        let records = self.lock()?;
        Ok(records.iter().find(|r| !r.is_assigned()).cloned())
    }

    pub fn list_buckets(&self) -> BucketGroups {
        self.registry.grouped()
    }

    /// Snapshot of every record in catalog order
    pub fn records(&self) -> Result<Vec<ImageRecord>> {
        Ok(self.lock()?.clone())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn stats(&self) -> Result<SortStats> {
        let records = self.lock()?;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for bucket in records.iter().filter_map(|r| r.bucket.as_deref()) {
            *counts.entry(bucket).or_default() += 1;
        }
        let assigned: usize = counts.values().sum();

        Ok(SortStats {
            total: records.len(),
            assigned,
            unassigned: records.len() - assigned,
            per_bucket: self
                .registry
                .iter()
                .map(|b| BucketCount {
                    name: b.name.clone(),
                    count: counts.get(b.name.as_str()).copied().unwrap_or(0),
                })
                .collect(),
            scanned_at: self.scanned_at,
        })
    }

    // === Assignment engine ===

    /// Move an unassigned image into `<output_root>/<bucket>/` and record it
    pub fn assign(&self, id: &ImageId, bucket: &str) -> Result<ImageRecord> {
        let slot = self.slot(id)?;
        if !self.registry.is_valid_bucket(bucket) {
            return Err(SortError::UnknownBucket(bucket.to_string()));
        }

        let mut records = self.lock()?;
        let record = &mut records[slot];

        if let Some(current) = &record.bucket {
            return Err(SortError::AlreadyAssigned {
                id: id.to_string(),
                bucket: current.clone(),
            });
        }
        if record.current_path != record.original_path {
            return Err(SortError::PathMismatch {
                id: id.to_string(),
                original: record.original_path.clone(),
                current: record.current_path.clone(),
            });
        }

        info!("Assigning image to '{}': {}", bucket, record);

        let dir = self.output_root.join(bucket);
        ensure_dir(&dir)?;

        let file_name = record.current_path.file_name().ok_or_else(|| SortError::MoveFailed {
            from: record.current_path.clone(),
            to: dir.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        })?;
        let destination = dir.join(file_name);
        // input and output trees overlap: the file already sits where the
        // bucket would put it, and renaming it onto itself records nothing
        if destination == record.current_path {
            warn!("Image already inside bucket directory: {:?}", destination);
            return Err(SortError::MoveFailed {
                from: record.current_path.clone(),
                to: destination,
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "image is already at its destination",
                ),
            });
        }

        move_file(&record.current_path, &destination)?;

        record.bucket = Some(bucket.to_string());
        record.current_path = destination;
        info!("Image after: {}", record);

        Ok(record.clone())
    }

    /// Move an image back to where it was discovered and clear its bucket.
    ///
    /// Undoing an unassigned record renames the file onto itself and succeeds
    /// as long as the file is still there.
    pub fn undo(&self, id: &ImageId) -> Result<ImageRecord> {
        let slot = self.slot(id)?;

        let mut records = self.lock()?;
        let record = &mut records[slot];

        if !record.is_assigned() {
            debug!("Undo on unassigned image {}", id);
        }
        info!("Reverting image: {}", record);

        move_file(&record.current_path, &record.original_path)?;

        record.bucket = None;
        record.current_path = record.original_path.clone();
        info!("Image after: {}", record);

        Ok(record.clone())
    }
}

/// Create a directory and any missing parents; existing directories are fine
fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| {
        warn!("Error creating directory {:?}: {}", path, source);
        SortError::DirectoryCreateFailed {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Rename `from` to `to`, refusing to replace a different existing file
fn move_file(from: &Path, to: &Path) -> Result<()> {
    let failed = |source: io::Error| {
        warn!("Error moving {:?} to {:?}: {}", from, to, source);
        SortError::MoveFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }
    };

    if from != to && to.symlink_metadata().is_ok() {
        return Err(failed(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination already exists",
        )));
    }

    info!("Renaming \"{}\" to \"{}\"", from.display(), to.display());
    fs::rename(from, to).map_err(failed)
}
