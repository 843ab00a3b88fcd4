//! Error conversion utilities for CLI.
//!
//! Converts appack-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use appack_core::PackError;
use std::path::Path;

/// Converts `PackError` to a user-friendly anyhow error naming the archive.
pub fn convert_pack_error(err: PackError, output: &Path) -> anyhow::Error {
    match err {
        PackError::InvalidPattern { pattern, source } => {
            anyhow!(
                "Invalid exclusion pattern `{pattern}`: {source}\n\
                 HINT: --exclude-regex takes a regular expression matched against base names."
            )
        }
        PackError::InvalidCompressionLevel { level } => {
            anyhow!(
                "Invalid compression level {level}\n\
                 HINT: Use a level between 1 (fastest) and 9 (smallest)."
            )
        }
        PackError::InvalidConfiguration { reason } => {
            anyhow!("Invalid pack request: {reason}")
        }
        PackError::RootNotFound { path } => {
            anyhow!(
                "Directory not found: '{}'\n\
                 HINT: Check the --app-path and --root values.",
                path.display()
            )
        }
        PackError::RootNotDirectory { path } => {
            anyhow!(
                "Not a directory: '{}'\n\
                 HINT: Pass single files with --with instead of --root.",
                path.display()
            )
        }
        PackError::RootUnreadable { path, source } => {
            anyhow!(
                "Cannot read directory '{}': {source}\n\
                 HINT: Check the permissions of the --app-path and --root directories.",
                path.display()
            )
        }
        PackError::Output { path, source } => {
            anyhow!(
                "Cannot create output archive '{}': {source}\n\
                 HINT: Check that the --output directory is writable.",
                path.display()
            )
        }
        PackError::Traversal { path, source } => {
            anyhow!(
                "Cannot read '{}' while packing '{}': {source}",
                path.display(),
                output.display()
            )
        }
        PackError::SymlinkLoop { path, ancestor } => {
            anyhow!(
                "Symlink loop at '{}' (points back to '{}')\n\
                 HINT: Drop --follow-symlinks to record links instead of following them.",
                path.display(),
                ancestor.display()
            )
        }
        PackError::Write { name, source } => {
            anyhow!(
                "Failed to write '{name}' into '{}': {source}\n\
                 HINT: Check free space and permissions of the output directory.",
                output.display()
            )
        }
        PackError::Io(io_err) => {
            anyhow!("I/O error while writing '{}': {io_err}", output.display())
        }
    }
}

/// Converts the error of a packing result, naming the archive being written.
pub fn add_archive_context<T>(
    result: Result<T, PackError>,
    output: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_pack_error(e, output))
}
