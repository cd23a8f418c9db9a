// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Bucket registry: the closed set of destination labels

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path};

use crate::{Result, SortError};

/// Which side of the UI a bucket is shown on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Right,
}

/// A named destination folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub position: Position,
}

/// Bucket names partitioned by position, in configuration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketGroups {
    pub left: Vec<String>,
    pub right: Vec<String>,
}

/// Registry of all configured buckets. Immutable once built.
#[derive(Debug, Clone)]
pub struct BucketRegistry {
    buckets: Vec<Bucket>,
}

impl BucketRegistry {
    /// Build the registry from the left and right name lists
    pub fn new<L, R>(left: L, right: R) -> Result<Self>
    where
        L: IntoIterator,
        L::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let buckets: Vec<Bucket> = left
            .into_iter()
            .map(|name| Bucket { name: name.into(), position: Position::Left })
            .chain(right.into_iter().map(|name| Bucket {
                name: name.into(),
                position: Position::Right,
            }))
            .collect();

        if buckets.len() < 2 {
            return Err(SortError::Config(format!(
                "at least two buckets are required, got {}",
                buckets.len()
            )));
        }

        let mut seen = HashSet::new();
        for bucket in &buckets {
            validate_name(&bucket.name)?;
            if !seen.insert(bucket.name.as_str()) {
                return Err(SortError::Config(format!(
                    "bucket '{}' is configured more than once",
                    bucket.name
                )));
            }
        }

        Ok(Self { buckets })
    }

    /// Check whether a name belongs to the registry
    pub fn is_valid_bucket(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Look up a bucket by name
    pub fn get(&self, name: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.name == name)
    }

    /// All buckets in configuration order (left group first)
    pub fn iter(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter()
    }

    /// Number of registered buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Always false: construction rejects fewer than two buckets
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Names grouped by position, for display
    pub fn grouped(&self) -> BucketGroups {
        let mut groups = BucketGroups::default();
        for bucket in &self.buckets {
            match bucket.position {
                Position::Left => groups.left.push(bucket.name.clone()),
                Position::Right => groups.right.push(bucket.name.clone()),
            }
        }
        groups
    }
}

/// Bucket names become directory names under the output root, so each must
/// be exactly one normal path component.
fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SortError::Config("bucket name must not be empty".to_string()));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(SortError::Config(format!(
            "bucket name '{}' must not contain path separators",
            name
        )));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(SortError::Config(format!(
            "bucket name '{}' is not a valid directory name",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_keeps_order() {
        let registry = BucketRegistry::new(["a", "b"], ["c"]).unwrap();
        let groups = registry.grouped();
        assert_eq!(groups.left, vec!["a", "b"]);
        assert_eq!(groups.right, vec!["c"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_one_side_may_be_empty() {
        let registry = BucketRegistry::new(Vec::<String>::new(), ["x", "y"]).unwrap();
        assert!(registry.grouped().left.is_empty());
        assert_eq!(registry.get("y").map(|b| b.position), Some(Position::Right));
    }

    #[test]
    fn test_requires_two_buckets() {
        let err = BucketRegistry::new(["only"], Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, SortError::Config(_)));
    }

    #[test]
    fn test_rejects_duplicates_across_sides() {
        assert!(BucketRegistry::new(["keep"], ["keep"]).is_err());
        assert!(BucketRegistry::new(["keep", "keep"], ["toss"]).is_err());
    }

    #[test]
    fn test_rejects_path_like_names() {
        for bad in ["", " ", "..", ".", "a/b", "a\\b", "/abs"] {
            assert!(
                BucketRegistry::new([bad], ["ok"]).is_err(),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_is_valid_bucket() {
        let registry = BucketRegistry::new(["keep"], ["toss"]).unwrap();
        assert!(registry.is_valid_bucket("keep"));
        assert!(registry.is_valid_bucket("toss"));
        assert!(!registry.is_valid_bucket("Keep"));
        assert!(!registry.is_valid_bucket(""));
    }

    #[test]
    fn test_position_serializes_lowercase() {
        let json = serde_json::to_string(&Position::Left).unwrap();
        assert_eq!(json, "\"left\"");
    }
}
