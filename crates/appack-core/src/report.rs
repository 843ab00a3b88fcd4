//! Packing operation reporting.

use std::fmt;
use std::time::Duration;

/// Kind of entry written into the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file with content.
    File,
    /// Symbolic link recorded as a link (target only, no content).
    Symlink,
}

/// Why the walker left a node out of the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Matched a prefix, suffix or name rule.
    Excluded,
    /// An earlier root already supplied this logical name.
    Duplicate,
    /// Symlink ignored because symlinks are skipped.
    Symlink,
    /// Symlink target does not exist while following links.
    DanglingSymlink,
    /// Directory holds nothing that would be archived.
    EmptyDirectory,
    /// The node is the archive being written.
    OutputArchive,
    /// Socket, FIFO or device node.
    Unsupported,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Excluded => "excluded",
            Self::Duplicate => "duplicate",
            Self::Symlink => "symlink",
            Self::DanglingSymlink => "dangling symlink",
            Self::EmptyDirectory => "empty directory",
            Self::OutputArchive => "output archive",
            Self::Unsupported => "special file",
        };
        f.write_str(s)
    }
}

/// Report of a packing operation.
///
/// # Examples
///
/// ```
/// use appack_core::PackReport;
///
/// let mut report = PackReport::default();
/// report.bytes_written = 1000;
/// report.bytes_compressed = 250;
///
/// assert_eq!(report.compression_ratio(), 4.0);
/// assert_eq!(report.compression_percentage(), 75.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PackReport {
    /// Number of regular files added.
    pub files_added: usize,

    /// Number of symlinks recorded as links.
    pub symlinks_added: usize,

    /// Entries skipped because an earlier root supplied the same name.
    pub duplicates_skipped: usize,

    /// Paths left out by exclusion rules.
    pub entries_excluded: usize,

    /// Symlinks ignored (skip mode, or dangling while following).
    pub symlinks_skipped: usize,

    /// Directories pruned because nothing inside would be archived.
    pub directories_pruned: usize,

    /// Total content bytes read from source files (uncompressed).
    pub bytes_written: u64,

    /// Size of the finished archive on disk.
    pub bytes_compressed: u64,

    /// Duration of the packing operation.
    pub duration: Duration,

    /// Logical names of archived entries, in write order.
    pub entries: Vec<String>,
}

impl PackReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an archived entry.
    pub(crate) fn record_entry(&mut self, name: &str, kind: EntryKind, bytes: u64) {
        match kind {
            EntryKind::File => self.files_added += 1,
            EntryKind::Symlink => self.symlinks_added += 1,
        }
        self.bytes_written += bytes;
        self.entries.push(name.to_string());
    }

    /// Records a skipped node.
    pub(crate) fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Excluded => self.entries_excluded += 1,
            SkipReason::Duplicate => self.duplicates_skipped += 1,
            SkipReason::Symlink | SkipReason::DanglingSymlink => self.symlinks_skipped += 1,
            SkipReason::EmptyDirectory => self.directories_pruned += 1,
            SkipReason::OutputArchive | SkipReason::Unsupported => {}
        }
    }

    /// Total number of entries in the archive.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.files_added + self.symlinks_added
    }

    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if either side is zero.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.bytes_compressed as f64
    }

    /// Returns the share of space saved by compression, in percent.
    ///
    /// Archive framing can make small archives larger than their input, in
    /// which case this returns 0.0.
    #[must_use]
    pub fn compression_percentage(&self) -> f64 {
        if self.bytes_written == 0 {
            return 0.0;
        }
        let saved = self.bytes_written.saturating_sub(self.bytes_compressed);
        (saved as f64 / self.bytes_written as f64) * 100.0
    }
}

/// Receives notifications while an archive is being packed.
///
/// Notifications are informational and arrive in walk order. The trait
/// requires `Send` so observers can be moved into worker threads by callers.
///
/// # Examples
///
/// ```
/// use appack_core::EntryKind;
/// use appack_core::PackObserver;
/// use appack_core::SkipReason;
///
/// struct Verbose;
///
/// impl PackObserver for Verbose {
///     fn on_entry_archived(&mut self, name: &str, _kind: EntryKind) {
///         println!("compressed {name}");
///     }
///
///     fn on_entry_skipped(&mut self, _name: &str, _reason: SkipReason) {}
///
///     fn on_complete(&mut self) {}
/// }
/// ```
pub trait PackObserver: Send {
    /// Called after an entry has been written to the archive.
    fn on_entry_archived(&mut self, name: &str, kind: EntryKind);

    /// Called when a node is left out of the archive.
    fn on_entry_skipped(&mut self, name: &str, reason: SkipReason);

    /// Called once after the archive has been finalized.
    fn on_complete(&mut self);
}

/// Observer that ignores every notification.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl PackObserver for NoopObserver {
    fn on_entry_archived(&mut self, _name: &str, _kind: EntryKind) {}

    fn on_entry_skipped(&mut self, _name: &str, _reason: SkipReason) {}

    fn on_complete(&mut self) {}
}
