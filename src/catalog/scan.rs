// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Catalog builder: one recursive pass over the input roots

use chrono::Utc;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{Catalog, ImageRecord};

/// Extensions recognised as images. Matched case-sensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "apng", "svg", "webp"];

/// Text after the last dot of the file name. Unlike `Path::extension`, a
/// dotfile such as `.png` has the extension `png`.
pub fn file_extension(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Check a path against the image extension allow-list
pub fn is_image_file(path: &Path) -> bool {
    file_extension(path)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Walk every root and collect one record per image file, in discovery order.
///
/// Best effort: a root that cannot be resolved or walked is logged and
/// skipped. A file reachable from several roots is recorded once.
pub fn build_catalog<P: AsRef<Path>>(roots: &[P]) -> Catalog {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut records = Vec::new();

    for root in roots {
        let root = root.as_ref();
        let root = match absolutize(root) {
            Ok(p) => p,
            Err(e) => {
                warn!("Getting absolute path failed for root: {:?}, err = {}", root, e);
                continue;
            }
        };

        let before = records.len();
        for path in image_paths(&root) {
            if seen.insert(path.clone()) {
                records.push(ImageRecord::discovered(path));
            } else {
                debug!("Already catalogued: {:?}", path);
            }
        }
        info!("Discovered {} images under {:?}", records.len() - before, root);
    }

    Catalog {
        records,
        scanned_at: Utc::now(),
    }
}

/// Regular image files under `root`, sorted by name at each level
fn image_paths(root: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Walk failed under {:?}: {}", root, e);
                continue;
            }
        };

        if entry.file_type().is_file() && is_image_file(entry.path()) {
            paths.push(entry.into_path());
        }
    }

    paths
}

/// Resolve a relative path against the current directory
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"img").unwrap();
    }

    #[test]
    fn test_extension_filter_is_case_sensitive() {
        assert!(is_image_file(Path::new("/a/b.png")));
        assert!(is_image_file(Path::new("/a/b.apng")));
        assert!(is_image_file(Path::new("/a/b.svg")));
        assert!(!is_image_file(Path::new("/a/b.PNG")));
        assert!(!is_image_file(Path::new("/a/b.gif")));
        assert!(!is_image_file(Path::new("/a/png")));
    }

    #[test]
    fn test_dotfile_extension_counts() {
        assert_eq!(file_extension(Path::new("/a/.png")), Some("png"));
        assert_eq!(file_extension(Path::new("/a/b.tar.webp")), Some("webp"));
        assert_eq!(file_extension(Path::new("/a/noext")), None);
        assert!(is_image_file(Path::new("/a/.png")));
        assert!(!is_image_file(Path::new("/a/.png.bak")));

        let dir = TempDir::new().unwrap();
        touch(&dir.path().join(".png"));
        let catalog = build_catalog(&[dir.path()]);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_discovers_nested_images_in_order() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("b.jpg"));
        touch(&dir.path().join("a.png"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("sub/c.webp"));

        let catalog = build_catalog(&[dir.path()]);
        let names: Vec<_> = catalog
            .records
            .iter()
            .map(|r| r.file_name().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["a.png", "b.jpg", "c.webp"]);
        for record in &catalog.records {
            assert!(record.original_path.is_absolute());
            assert_eq!(record.original_path, record.current_path);
            assert!(record.bucket.is_none());
        }
    }

    #[test]
    fn test_overlapping_roots_do_not_duplicate() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("sub/deep/x.png"));
        touch(&dir.path().join("y.png"));

        let catalog = build_catalog(&[dir.path().to_path_buf(), dir.path().join("sub")]);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_missing_root_is_skipped() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("ok.png"));

        let catalog = build_catalog(&[dir.path().join("missing"), dir.path().to_path_buf()]);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_rescan_finds_same_paths() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("one.png"));
        touch(&dir.path().join("two/three.svg"));

        let first = build_catalog(&[dir.path()]);
        let second = build_catalog(&[dir.path()]);

        let paths = |c: &Catalog| -> HashSet<PathBuf> {
            c.records.iter().map(|r| r.original_path.clone()).collect()
        };
        assert_eq!(paths(&first), paths(&second));
        assert_ne!(first.records[0].id, second.records[0].id);
    }
}
