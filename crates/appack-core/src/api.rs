//! High-level public API for packing.

use crate::NoopObserver;
use crate::PackError;
use crate::PackObserver;
use crate::PackReport;
use crate::Result;
use crate::packing::backend::open_backend;
use crate::packing::config::PackConfig;
use crate::packing::walker::OutputIdentity;
use crate::packing::walker::WalkEvent;
use crate::packing::walker::Walker;
use crate::report::EntryKind;
use crate::report::SkipReason;
use std::fs;
use std::fs::File;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

/// Packs one or more root directories into a single archive.
///
/// Roots are walked in order. When two roots contain the same logical name,
/// the entry from the earlier root is kept. The archive format comes from
/// `config.format`; the output file is created (or truncated) only after the
/// configuration and every root have been validated.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid (compression level, regex)
/// - A root does not exist or is not a directory
/// - The output file cannot be created
/// - Reading the tree or writing the archive fails
///
/// On traversal or write errors the partially written archive is left on
/// disk.
///
/// # Examples
///
/// ```no_run
/// use appack_core::PackConfig;
/// use appack_core::pack;
///
/// let config = PackConfig::default();
/// let report = pack("dist/shop.tar.gz", &["/srv/shop"], &config)?;
/// println!("Packed {} files", report.files_added);
/// # Ok::<(), appack_core::PackError>(())
/// ```
pub fn pack<P: AsRef<Path>, Q: AsRef<Path>>(
    output: P,
    roots: &[Q],
    config: &PackConfig,
) -> Result<PackReport> {
    let mut observer = NoopObserver;
    pack_with_observer(output, roots, config, &mut observer)
}

/// Packs roots into an archive, notifying `observer` of every entry.
///
/// # Errors
///
/// Same as [`pack`].
pub fn pack_with_observer<P: AsRef<Path>, Q: AsRef<Path>>(
    output: P,
    roots: &[Q],
    config: &PackConfig,
    observer: &mut dyn PackObserver,
) -> Result<PackReport> {
    let start = Instant::now();
    let policy = config.validate()?;

    if roots.is_empty() {
        return Err(PackError::InvalidConfiguration {
            reason: "no root directories to pack".to_string(),
        });
    }
    let roots = roots
        .iter()
        .map(|root| validate_root(root.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    let output = output.as_ref();

    tracing::info!(
        prefixes = ?policy.prefixes(),
        suffixes = ?policy.suffixes(),
        patterns = ?policy.pattern_sources().collect::<Vec<_>>(),
        "exclusion rules"
    );

    let file = File::create(output).map_err(|e| PackError::output(output, e))?;
    let identity = OutputIdentity::from_file(&file).map_err(|e| PackError::output(output, e))?;
    let mut backend = open_backend(file, config);
    let walker = Walker::new(&policy, config.symlink_policy()).ignoring(&identity);
    let mut report = PackReport::new();

    for root in &roots {
        tracing::debug!(root = %root.display(), "walking root");
        walker.walk(root, |event| {
            match event {
                WalkEvent::Entry {
                    logical_name,
                    path,
                    metadata,
                } => {
                    let kind = if metadata.file_type().is_symlink() {
                        EntryKind::Symlink
                    } else {
                        EntryKind::File
                    };
                    if backend.compress(logical_name, path, metadata)? {
                        let bytes = match kind {
                            EntryKind::File => metadata.len(),
                            EntryKind::Symlink => 0,
                        };
                        tracing::debug!(name = logical_name, "compressed");
                        report.record_entry(logical_name, kind, bytes);
                        observer.on_entry_archived(logical_name, kind);
                    } else {
                        skipped(&mut report, observer, logical_name, SkipReason::Duplicate);
                    }
                }
                WalkEvent::Skipped {
                    logical_name,
                    reason,
                } => skipped(&mut report, observer, logical_name, reason),
            }
            Ok(())
        })?;
    }

    let format = backend.format();
    report.bytes_compressed = backend.finish()?;
    report.duration = start.elapsed();
    observer.on_complete();

    tracing::info!(
        output = %output.display(),
        %format,
        entries = report.total_entries(),
        bytes = report.bytes_compressed,
        "archive written"
    );

    Ok(report)
}

fn skipped(
    report: &mut PackReport,
    observer: &mut dyn PackObserver,
    logical_name: &str,
    reason: SkipReason,
) {
    tracing::debug!(name = logical_name, %reason, "skipped");
    report.record_skip(reason);
    observer.on_entry_skipped(logical_name, reason);
}

/// Checks that `root` is a listable directory and makes it absolute.
fn validate_root(root: &Path) -> Result<PathBuf> {
    let unreadable = |source| PackError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(root).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            PackError::RootNotFound {
                path: root.to_path_buf(),
            }
        } else {
            unreadable(e)
        }
    })?;
    if !metadata.is_dir() {
        return Err(PackError::RootNotDirectory {
            path: root.to_path_buf(),
        });
    }
    fs::read_dir(root).map_err(unreadable)?;

    std::path::absolute(root).map_err(unreadable)
}
