//! Archive backend abstraction.
//!
//! A backend owns the output handle for one packing operation. The walker
//! hands it entries one at a time; the backend writes each entry immediately
//! and never revisits it.

use crate::Result;
use crate::format::ArchiveFormat;
use crate::packing::config::PackConfig;
use crate::packing::tar::TarGzBackend;
use crate::packing::zip::ZipBackend;
use std::collections::HashSet;
use std::fs::File;
use std::fs::Metadata;
use std::path::Path;

/// Container writer for one archive format.
pub trait ArchiveBackend {
    /// Format this backend produces.
    fn format(&self) -> ArchiveFormat;

    /// Writes one entry under `name`.
    ///
    /// `metadata` describes the node as the walker saw it: when it reports a
    /// symlink, the link itself is recorded with the target read from
    /// `path`; otherwise the content of `path` is streamed in.
    ///
    /// Returns `Ok(false)` without writing anything when an entry with the
    /// same name was already written during this operation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PackError::Traversal`] if the source cannot be read
    /// and [`crate::PackError::Write`] if the archive cannot be written.
    fn compress(&mut self, name: &str, path: &Path, metadata: &Metadata) -> Result<bool>;

    /// Finalizes the container and returns the archive size in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if trailing archive structures cannot be written.
    fn finish(self: Box<Self>) -> Result<u64>;
}

/// Opens the backend matching `config.format` over an already created file.
#[must_use]
pub fn open_backend(file: File, config: &PackConfig) -> Box<dyn ArchiveBackend> {
    match config.format {
        ArchiveFormat::TarGz => Box::new(TarGzBackend::new(file, config)),
        ArchiveFormat::Zip => Box::new(ZipBackend::new(file, config)),
    }
}

/// Logical names already written during one packing operation.
#[derive(Debug, Default)]
pub struct WrittenNames {
    names: HashSet<String>,
}

impl WrittenNames {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `name`. Returns `false` if it was claimed before.
    pub fn claim(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            return false;
        }
        self.names.insert(name.to_string())
    }

    /// Number of claimed names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if nothing was claimed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
