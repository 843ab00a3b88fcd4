//! Deterministic directory traversal.
//!
//! The walker visits one root depth-first in pre-order, children sorted by
//! file name. Every node gets a [`Visit`] decision; directories that are
//! excluded or hold nothing archivable are not descended. Nodes that would
//! become archive entries (regular files, and symlinks that are recorded
//! rather than followed) are handed to the caller as [`WalkEvent::Entry`].

use crate::PackError;
use crate::Result;
use crate::packing::config::SymlinkPolicy;
use crate::packing::filters::ExclusionPolicy;
use crate::packing::filters::logical_name;
use crate::report::SkipReason;
use same_file::Handle;
use std::fs;
use std::fs::File;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use walkdir::DirEntry;
use walkdir::WalkDir;

/// Decision taken for a visited node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep going; descend if the node is a directory.
    Continue,
    /// Do not descend into this directory.
    SkipSubtree,
}

/// Something the walker reports to its caller.
#[derive(Debug)]
pub enum WalkEvent<'a> {
    /// A node to archive.
    Entry {
        /// Root-relative, `/`-separated name.
        logical_name: &'a str,
        /// Filesystem path of the node (the link path for symlinks).
        path: &'a Path,
        /// Metadata of the node, or of the link target when following.
        metadata: &'a Metadata,
    },
    /// A node left out of the archive.
    Skipped {
        /// Root-relative, `/`-separated name.
        logical_name: &'a str,
        /// Why it was left out.
        reason: SkipReason,
    },
}

/// Identity of the archive being written.
///
/// Nodes are compared with the open output file by device and inode, so
/// the archive is recognized under any path that reaches it: through `..`
/// components, a symlinked root, or a followed link.
#[derive(Debug)]
pub struct OutputIdentity {
    handle: Handle,
}

impl OutputIdentity {
    /// Captures the identity of an open file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file descriptor cannot be duplicated or its
    /// metadata cannot be read.
    pub fn from_file(file: &File) -> io::Result<Self> {
        Ok(Self {
            handle: Handle::from_file(file.try_clone()?)?,
        })
    }

    /// Returns `true` if the node at `path`, described by `metadata`, is
    /// the output file. Only regular files can match.
    #[must_use]
    pub fn matches(&self, path: &Path, metadata: &Metadata) -> bool {
        if !metadata.is_file() {
            return false;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;

            let _ = path;
            metadata.dev() == self.handle.dev() && metadata.ino() == self.handle.ino()
        }

        #[cfg(not(unix))]
        {
            Handle::from_path(path).is_ok_and(|handle| handle == self.handle)
        }
    }
}

/// Walks roots according to an exclusion policy and symlink handling.
///
/// # Examples
///
/// ```no_run
/// use appack_core::PackConfig;
/// use appack_core::packing::walker::WalkEvent;
/// use appack_core::packing::walker::Walker;
/// use std::path::Path;
///
/// let config = PackConfig::default();
/// let policy = config.validate()?;
/// let walker = Walker::new(&policy, config.symlink_policy());
///
/// walker.walk(Path::new("/srv/shop"), |event| {
///     if let WalkEvent::Entry { logical_name, .. } = event {
///         println!("{logical_name}");
///     }
///     Ok(())
/// })?;
/// # Ok::<(), appack_core::PackError>(())
/// ```
#[derive(Debug)]
pub struct Walker<'a> {
    policy: &'a ExclusionPolicy,
    symlinks: SymlinkPolicy,
    output: Option<&'a OutputIdentity>,
}

impl<'a> Walker<'a> {
    /// Creates a walker.
    #[must_use]
    pub fn new(policy: &'a ExclusionPolicy, symlinks: SymlinkPolicy) -> Self {
        Self {
            policy,
            symlinks,
            output: None,
        }
    }

    /// Skips the file identified by `output`, wherever it is reached.
    ///
    /// Used to keep the archive being written out of itself when it lives
    /// inside one of the roots.
    #[must_use]
    pub fn ignoring(mut self, output: &'a OutputIdentity) -> Self {
        self.output = Some(output);
        self
    }

    /// Walks `root`, passing every entry and skip to `sink`.
    ///
    /// # Errors
    ///
    /// Returns the first traversal error, symlink loop, or error returned by
    /// `sink`. Dangling symlinks while following are reported as skips, not
    /// errors.
    pub fn walk<F>(&self, root: &Path, mut sink: F) -> Result<()>
    where
        F: FnMut(WalkEvent<'_>) -> Result<()>,
    {
        let mut entries = WalkDir::new(root)
            .follow_links(self.symlinks == SymlinkPolicy::Follow)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    self.walk_error(root, err, &mut sink)?;
                    continue;
                }
            };

            if self.visit(root, &entry, &mut sink)? == Visit::SkipSubtree
                && entry.file_type().is_dir()
            {
                entries.skip_current_dir();
            }
        }

        Ok(())
    }

    fn visit<F>(&self, root: &Path, entry: &DirEntry, sink: &mut F) -> Result<Visit>
    where
        F: FnMut(WalkEvent<'_>) -> Result<()>,
    {
        if entry.depth() == 0 {
            return Ok(Visit::Continue);
        }

        let path = entry.path();
        let name = logical_name(root, path).ok_or_else(|| {
            PackError::traversal(path, io::Error::other("path escapes the walked root"))
        })?;
        let is_dir = entry.file_type().is_dir();

        if entry.path_is_symlink() && self.symlinks == SymlinkPolicy::Skip {
            return skip(sink, &name, SkipReason::Symlink, is_dir);
        }

        if self.policy.rejects(&name) {
            return skip(sink, &name, SkipReason::Excluded, is_dir);
        }

        if is_dir {
            let empty = self
                .policy
                .is_empty_dir_ignoring(path, &name, self.symlinks, self.output)
                .map_err(|e| PackError::traversal(path, e))?;
            if empty {
                return skip(sink, &name, SkipReason::EmptyDirectory, true);
            }
            return Ok(Visit::Continue);
        }

        let file_type = entry.file_type();
        if !file_type.is_file() && !file_type.is_symlink() {
            return skip(sink, &name, SkipReason::Unsupported, false);
        }

        let metadata = entry
            .metadata()
            .map_err(|e| PackError::traversal(path, e.into()))?;
        if self.output.is_some_and(|output| output.matches(path, &metadata)) {
            return skip(sink, &name, SkipReason::OutputArchive, false);
        }

        sink(WalkEvent::Entry {
            logical_name: &name,
            path,
            metadata: &metadata,
        })?;

        Ok(Visit::Continue)
    }

    fn walk_error<F>(&self, root: &Path, err: walkdir::Error, sink: &mut F) -> Result<()>
    where
        F: FnMut(WalkEvent<'_>) -> Result<()>,
    {
        let path = err.path().unwrap_or(root).to_path_buf();

        if let Some(ancestor) = err.loop_ancestor() {
            return Err(PackError::SymlinkLoop {
                path,
                ancestor: ancestor.to_path_buf(),
            });
        }

        let not_found = err
            .io_error()
            .is_some_and(|e| e.kind() == io::ErrorKind::NotFound);
        if not_found && self.symlinks == SymlinkPolicy::Follow && is_symlink(&path) {
            let name = logical_name(root, &path).unwrap_or_default();
            tracing::debug!(path = %path.display(), "ignoring dangling symlink");
            sink(WalkEvent::Skipped {
                logical_name: &name,
                reason: SkipReason::DanglingSymlink,
            })?;
            return Ok(());
        }

        Err(PackError::traversal(&path, err.into()))
    }
}

fn skip<F>(sink: &mut F, name: &str, reason: SkipReason, is_dir: bool) -> Result<Visit>
where
    F: FnMut(WalkEvent<'_>) -> Result<()>,
{
    sink(WalkEvent::Skipped {
        logical_name: name,
        reason,
    })?;

    Ok(if is_dir {
        Visit::SkipSubtree
    } else {
        Visit::Continue
    })
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
}
