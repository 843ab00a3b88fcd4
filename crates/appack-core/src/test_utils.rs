//! Test utilities for reading packed archives back.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use flate2::read::GzDecoder;
use std::fs;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One entry read back from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedEntry {
    /// Entry name as stored.
    pub name: String,
    /// File content, or the link target for symlinks.
    pub content: Vec<u8>,
    /// Whether the entry is a symlink.
    pub is_symlink: bool,
}

/// Reads every entry of a `.tar.gz` file, in archive order.
#[must_use]
pub fn read_tar_gz(path: &Path) -> Vec<ArchivedEntry> {
    let mut archive = tar::Archive::new(GzDecoder::new(File::open(path).unwrap()));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            let is_symlink = entry.header().entry_type() == tar::EntryType::Symlink;
            let content = if is_symlink {
                let target = entry.link_name().unwrap().unwrap();
                target.to_string_lossy().into_owned().into_bytes()
            } else {
                let mut content = Vec::new();
                entry.read_to_end(&mut content).unwrap();
                content
            };
            ArchivedEntry {
                name,
                content,
                is_symlink,
            }
        })
        .collect()
}

/// Reads every entry of a `.zip` file, in central-directory order.
#[must_use]
pub fn read_zip(path: &Path) -> Vec<ArchivedEntry> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            ArchivedEntry {
                name: entry.name().to_string(),
                content,
                is_symlink: entry.is_symlink(),
            }
        })
        .collect()
}

/// Entry names of a `.tar.gz` file, in archive order.
#[must_use]
pub fn tar_gz_entry_names(path: &Path) -> Vec<String> {
    read_tar_gz(path).into_iter().map(|e| e.name).collect()
}

/// Entry names of a `.zip` file, in archive order.
#[must_use]
pub fn zip_entry_names(path: &Path) -> Vec<String> {
    read_zip(path).into_iter().map(|e| e.name).collect()
}

/// Creates files under `root` from `(relative path, content)` pairs.
///
/// # Examples
///
/// ```
/// use appack_core::test_utils::write_tree;
///
/// let temp = tempfile::TempDir::new().unwrap();
/// write_tree(temp.path(), &[("conf/app.conf", "x"), ("README.md", "y")]);
/// assert!(temp.path().join("conf/app.conf").is_file());
/// ```
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}
