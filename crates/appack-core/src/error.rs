//! Error types for packing operations.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PackError`.
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors that can occur while packing an application.
///
/// Variants fall into three groups:
///
/// - configuration errors, reported before the output file is created
/// - traversal errors, raised while walking a root
/// - write errors, raised while appending entries to the archive
///
/// Duplicate entries across roots, dangling symlinks while following links,
/// and pruned subtrees are not errors and never surface here.
#[derive(Error, Debug)]
pub enum PackError {
    /// I/O operation on the output archive failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An exclusion regular expression failed to compile.
    #[error("invalid exclusion pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The pattern source as supplied by the caller.
        pattern: String,
        /// The underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// Compression level outside the 1-9 range.
    #[error("invalid compression level {level}, expected 1-9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },

    /// The packing request itself is incomplete or inconsistent.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the problem.
        reason: String,
    },

    /// A root directory does not exist or cannot be accessed.
    #[error("root not found: {path}")]
    RootNotFound {
        /// The missing root.
        path: PathBuf,
    },

    /// A root exists but cannot be inspected or listed.
    #[error("cannot read root {path}: {source}")]
    RootUnreadable {
        /// The offending root.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A root path exists but is not a directory.
    #[error("root is not a directory: {path}")]
    RootNotDirectory {
        /// The offending root.
        path: PathBuf,
    },

    /// Reading a directory, file metadata or symlink failed mid-walk.
    #[error("cannot read {path}: {source}")]
    Traversal {
        /// The path being processed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Following symlinks led back to an ancestor directory.
    #[error("symlink loop at {path} (points back to {ancestor})")]
    SymlinkLoop {
        /// The path where the loop was detected.
        path: PathBuf,
        /// The ancestor directory the link resolves to.
        ancestor: PathBuf,
    },

    /// The output archive could not be created.
    #[error("cannot create output archive {path}: {source}")]
    Output {
        /// The output path as supplied by the caller.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing an entry into the archive failed.
    #[error("failed to write archive entry {name}: {source}")]
    Write {
        /// Logical name of the entry.
        name: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl PackError {
    /// Wraps an I/O error raised while reading `path` during the walk.
    pub(crate) fn traversal(path: &Path, source: std::io::Error) -> Self {
        Self::Traversal {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Wraps an I/O error raised while creating the output archive.
    pub(crate) fn output(path: &Path, source: std::io::Error) -> Self {
        Self::Output {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Wraps an I/O error raised while writing entry `name`.
    pub(crate) fn write(name: &str, source: std::io::Error) -> Self {
        Self::Write {
            name: name.to_string(),
            source,
        }
    }

    /// Returns `true` if this error was raised before any archive writing.
    ///
    /// # Examples
    ///
    /// ```
    /// use appack_core::PackError;
    /// use std::path::PathBuf;
    ///
    /// let err = PackError::RootNotFound {
    ///     path: PathBuf::from("/missing"),
    /// };
    /// assert!(err.is_configuration_error());
    ///
    /// let err = PackError::Io(std::io::Error::other("disk full"));
    /// assert!(!err.is_configuration_error());
    /// ```
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPattern { .. }
                | Self::InvalidCompressionLevel { .. }
                | Self::InvalidConfiguration { .. }
                | Self::RootNotFound { .. }
                | Self::RootUnreadable { .. }
                | Self::RootNotDirectory { .. }
        )
    }

    /// Returns the filesystem path this error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::RootNotFound { path }
            | Self::RootNotDirectory { path }
            | Self::RootUnreadable { path, .. }
            | Self::Output { path, .. }
            | Self::Traversal { path, .. }
            | Self::SymlinkLoop { path, .. } => Some(path),
            _ => None,
        }
    }
}
