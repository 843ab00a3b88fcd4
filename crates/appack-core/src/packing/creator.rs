//! Builder for packing with a fluent API.

use std::path::Path;
use std::path::PathBuf;

use crate::error::PackError;
use crate::error::Result;
use crate::format::ArchiveFormat;
use crate::packing::config::PackConfig;
use crate::report::PackObserver;
use crate::report::PackReport;

/// Builder for packing an application with a fluent API.
///
/// # Examples
///
/// ```no_run
/// use appack_core::ArchiveFormat;
/// use appack_core::Packer;
///
/// let report = Packer::new()
///     .output("dist/shop.zip")
///     .add_root("/srv/shop")
///     .format(ArchiveFormat::Zip)
///     .exclude_suffix(".log")
///     .exclude_regex(r"^\.env")
///     .pack()?;
///
/// println!("Packed {} entries", report.total_entries());
/// # Ok::<(), appack_core::PackError>(())
/// ```
#[derive(Debug, Default)]
pub struct Packer {
    output_path: Option<PathBuf>,
    roots: Vec<PathBuf>,
    config: PackConfig,
}

impl Packer {
    /// Creates a new `Packer` with default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use appack_core::Packer;
    ///
    /// let packer = Packer::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output archive path.
    #[must_use]
    pub fn output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Appends a root directory. Earlier roots win on name clashes.
    #[must_use]
    pub fn add_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.roots.push(path.as_ref().to_path_buf());
        self
    }

    /// Appends several root directories, in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use appack_core::Packer;
    ///
    /// let packer = Packer::new().roots(&["/tmp/build", "/srv/shop"]);
    /// ```
    #[must_use]
    pub fn roots<P: AsRef<Path>>(mut self, paths: &[P]) -> Self {
        self.roots
            .extend(paths.iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    /// Replaces the full configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use appack_core::PackConfig;
    /// use appack_core::Packer;
    ///
    /// let config = PackConfig::default().with_skip_symlinks(true);
    /// let packer = Packer::new().config(config);
    /// ```
    #[must_use]
    pub fn config(mut self, config: PackConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the archive format.
    #[must_use]
    pub fn format(mut self, format: ArchiveFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Adds an excluded logical-name prefix.
    #[must_use]
    pub fn exclude_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.exclude_prefixes.push(prefix.into());
        self
    }

    /// Adds an excluded logical-name suffix.
    #[must_use]
    pub fn exclude_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.config.exclude_suffixes.push(suffix.into());
        self
    }

    /// Adds a regular expression matched against base names.
    #[must_use]
    pub fn exclude_regex<S: Into<String>>(mut self, pattern: S) -> Self {
        self.config.exclude_patterns.push(pattern.into());
        self
    }

    /// Sets whether to follow symlinks.
    #[must_use]
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.follow_symlinks = follow;
        self
    }

    /// Sets whether to skip symlinks.
    #[must_use]
    pub fn skip_symlinks(mut self, skip: bool) -> Self {
        self.config.skip_symlinks = skip;
        self
    }

    /// Sets the compression level (1-9).
    #[must_use]
    pub fn compression_level(mut self, level: u8) -> Self {
        self.config.compression_level = Some(level);
        self
    }

    /// Sets whether to preserve permissions.
    #[must_use]
    pub fn preserve_permissions(mut self, preserve: bool) -> Self {
        self.config.preserve_permissions = preserve;
        self
    }

    /// Packs the configured roots.
    ///
    /// # Errors
    ///
    /// Returns an error if no output path or no root is set, or if
    /// [`crate::pack`] fails.
    pub fn pack(self) -> Result<PackReport> {
        let output = self.output_path()?;
        crate::api::pack(output, &self.roots, &self.config)
    }

    /// Packs the configured roots with progress notifications.
    ///
    /// # Errors
    ///
    /// Same as [`pack`](Self::pack).
    pub fn pack_with_observer(self, observer: &mut dyn PackObserver) -> Result<PackReport> {
        let output = self.output_path()?;
        crate::api::pack_with_observer(output, &self.roots, &self.config, observer)
    }

    fn output_path(&self) -> Result<&Path> {
        self.output_path
            .as_deref()
            .ok_or_else(|| PackError::InvalidConfiguration {
                reason: "output path not set".to_string(),
            })
    }
}
