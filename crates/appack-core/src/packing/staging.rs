//! Scratch root for prebuilt artifacts.
//!
//! Artifacts such as a compiled binary are copied into a temporary directory
//! that is packed as the first root, so they take precedence over files of
//! the same name in the application tree. The directory is removed when the
//! [`StagingDir`] is closed or dropped, whatever the outcome of packing.

use crate::PackError;
use crate::Result;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

/// Temporary directory removed on drop.
///
/// # Examples
///
/// ```no_run
/// use appack_core::Packer;
/// use appack_core::StagingDir;
///
/// let staging = StagingDir::new()?;
/// staging.stage_file("target/release/shop")?;
///
/// let report = Packer::new()
///     .output("dist/shop.tar.gz")
///     .add_root(staging.path())
///     .add_root("/srv/shop")
///     .pack()?;
///
/// staging.close()?;
/// # Ok::<(), appack_core::PackError>(())
/// ```
#[derive(Debug)]
pub struct StagingDir {
    dir: Option<TempDir>,
}

impl StagingDir {
    /// Creates an empty staging directory under the system temp directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("appack-").tempdir()?;
        tracing::debug!(path = %dir.path().display(), "created staging directory");
        Ok(Self { dir: Some(dir) })
    }

    /// Path of the staging directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.as_ref().map_or_else(|| Path::new(""), TempDir::path)
    }

    /// Copies the regular file `source` into the staging root, keeping its
    /// file name and permissions. Returns the staged path.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidConfiguration`] if `source` is not a
    /// regular file or a file with the same name is already staged, and
    /// [`PackError::Traversal`] if copying fails.
    pub fn stage_file(&self, source: impl AsRef<Path>) -> Result<PathBuf> {
        let source = source.as_ref();
        let metadata = fs::metadata(source).map_err(|e| PackError::traversal(source, e))?;
        if !metadata.is_file() {
            return Err(PackError::InvalidConfiguration {
                reason: format!("cannot stage {}: not a regular file", source.display()),
            });
        }

        let file_name = source
            .file_name()
            .ok_or_else(|| PackError::InvalidConfiguration {
                reason: format!("cannot stage {}: no file name", source.display()),
            })?;
        let staged = self.path().join(file_name);
        if staged.exists() {
            return Err(PackError::InvalidConfiguration {
                reason: format!(
                    "cannot stage {}: {} is already staged",
                    source.display(),
                    file_name.to_string_lossy()
                ),
            });
        }

        fs::copy(source, &staged).map_err(|e| PackError::traversal(source, e))?;
        tracing::debug!(source = %source.display(), "staged artifact");
        Ok(staged)
    }

    /// Removes the staging directory now, reporting failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    pub fn close(mut self) -> Result<()> {
        match self.dir.take() {
            Some(dir) => dir.close().map_err(PackError::from),
            None => Ok(()),
        }
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove staging directory");
            }
        }
    }
}
