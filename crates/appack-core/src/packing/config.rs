//! Configuration for packing operations.

use crate::PackError;
use crate::Result;
use crate::format::ArchiveFormat;
use crate::packing::filters::ExclusionPolicy;

/// How the walker treats symbolic links.
///
/// Derived from [`PackConfig::follow_symlinks`] and
/// [`PackConfig::skip_symlinks`]. Skipping wins when both are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymlinkPolicy {
    /// Record the link itself (name and target) without reading the target.
    #[default]
    Record,
    /// Resolve the link and archive what it points to.
    Follow,
    /// Leave links out of the archive entirely.
    Skip,
}

/// Configuration for packing an application directory.
///
/// # Examples
///
/// ```
/// use appack_core::ArchiveFormat;
/// use appack_core::PackConfig;
///
/// let config = PackConfig::default()
///     .with_format(ArchiveFormat::Zip)
///     .with_exclude_patterns(vec![r"\.log$".to_string()])
///     .with_follow_symlinks(true);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PackConfig {
    /// Logical-name prefixes to leave out.
    ///
    /// Default: `["."]` (hidden top-level entries).
    pub exclude_prefixes: Vec<String>,

    /// Logical-name suffixes to leave out.
    ///
    /// Default: `[".go", ".DS_Store", ".tmp"]`.
    pub exclude_suffixes: Vec<String>,

    /// Regular expressions matched against base names.
    ///
    /// Default: empty.
    pub exclude_patterns: Vec<String>,

    /// Archive the targets of symlinks instead of the links.
    ///
    /// Default: `false`.
    pub follow_symlinks: bool,

    /// Leave symlinks out of the archive. Takes precedence over
    /// `follow_symlinks`.
    ///
    /// Default: `false`.
    pub skip_symlinks: bool,

    /// Output format.
    ///
    /// Default: [`ArchiveFormat::TarGz`].
    pub format: ArchiveFormat,

    /// Compression level (1-9). `None` uses the backend default.
    ///
    /// Default: `Some(6)`.
    pub compression_level: Option<u8>,

    /// Store source permissions, ownership and mtime in entry headers.
    ///
    /// When disabled, tar headers use fixed deterministic values and zip
    /// entries use the library defaults.
    ///
    /// Default: `true`.
    pub preserve_permissions: bool,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            exclude_prefixes: vec![".".to_string()],
            exclude_suffixes: vec![
                ".go".to_string(),
                ".DS_Store".to_string(),
                ".tmp".to_string(),
            ],
            exclude_patterns: Vec::new(),
            follow_symlinks: false,
            skip_symlinks: false,
            format: ArchiveFormat::TarGz,
            compression_level: Some(6),
            preserve_permissions: true,
        }
    }
}

impl PackConfig {
    /// Creates a new `PackConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the excluded prefixes.
    #[must_use]
    pub fn with_exclude_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.exclude_prefixes = prefixes;
        self
    }

    /// Sets the excluded suffixes.
    #[must_use]
    pub fn with_exclude_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.exclude_suffixes = suffixes;
        self
    }

    /// Sets the base-name regular expressions.
    #[must_use]
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    /// Sets whether to follow symlinks.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Sets whether to skip symlinks.
    #[must_use]
    pub fn with_skip_symlinks(mut self, skip: bool) -> Self {
        self.skip_symlinks = skip;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: ArchiveFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the compression level.
    ///
    /// The value is checked by [`validate`](Self::validate), not here.
    #[must_use]
    pub fn with_compression_level(mut self, level: Option<u8>) -> Self {
        self.compression_level = level;
        self
    }

    /// Sets whether to preserve permissions.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    /// Effective symlink handling.
    #[must_use]
    pub const fn symlink_policy(&self) -> SymlinkPolicy {
        if self.skip_symlinks {
            SymlinkPolicy::Skip
        } else if self.follow_symlinks {
            SymlinkPolicy::Follow
        } else {
            SymlinkPolicy::Record
        }
    }

    /// Compiles the exclusion rules.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidPattern`] if a regular expression does not
    /// compile.
    pub fn exclusion_policy(&self) -> Result<ExclusionPolicy> {
        ExclusionPolicy::new(
            self.exclude_prefixes.as_slice(),
            self.exclude_suffixes.as_slice(),
            self.exclude_patterns.as_slice(),
        )
    }

    /// Validates the configuration and returns the compiled exclusion rules.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Compression level is set but not in range 1-9
    /// - An exclusion pattern is not a valid regular expression
    pub fn validate(&self) -> Result<ExclusionPolicy> {
        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(PackError::InvalidCompressionLevel { level });
        }
        self.exclusion_policy()
    }
}
