//! Gzip-compressed tar backend.
//!
//! The gzip stream is sync-flushed after every entry.

use crate::PackError;
use crate::Result;
use crate::format::ArchiveFormat;
use crate::packing::backend::ArchiveBackend;
use crate::packing::backend::WrittenNames;
use crate::packing::config::PackConfig;
use flate2::write::GzEncoder;
use std::fs;
use std::fs::File;
use std::fs::Metadata;
use std::io::Write;
use std::path::Path;
use tar::Builder;
use tar::EntryType;
use tar::Header;
use tar::HeaderMode;

/// Writes entries into a `.tar.gz` stream.
///
/// Headers are GNU format. With `preserve_permissions` they carry the source
/// mode, ownership and mtime; otherwise they use the tar crate's
/// deterministic values.
pub struct TarGzBackend {
    builder: Builder<GzEncoder<CountingWriter<File>>>,
    written: WrittenNames,
    mode: HeaderMode,
}

impl TarGzBackend {
    /// Wraps `file` in a gzip encoder and tar builder.
    #[must_use]
    pub fn new(file: File, config: &PackConfig) -> Self {
        let level = compression_level_to_flate2(config.compression_level);
        let encoder = GzEncoder::new(CountingWriter::new(file), level);
        let mode = if config.preserve_permissions {
            HeaderMode::Complete
        } else {
            HeaderMode::Deterministic
        };

        Self {
            builder: Builder::new(encoder),
            written: WrittenNames::new(),
            mode,
        }
    }

    fn append_symlink(&mut self, name: &str, path: &Path, metadata: &Metadata) -> Result<()> {
        let target = fs::read_link(path).map_err(|e| PackError::traversal(path, e))?;

        let mut header = Header::new_gnu();
        header.set_metadata_in_mode(metadata, self.mode);
        header.set_entry_type(EntryType::Symlink);
        header.set_size(0);

        self.builder
            .append_link(&mut header, name, &target)
            .map_err(|e| PackError::write(name, e))
    }

    fn append_file(&mut self, name: &str, path: &Path, metadata: &Metadata) -> Result<()> {
        let mut file = File::open(path).map_err(|e| PackError::traversal(path, e))?;

        let mut header = Header::new_gnu();
        header.set_metadata_in_mode(metadata, self.mode);
        header.set_entry_type(EntryType::Regular);
        header.set_size(metadata.len());

        self.builder
            .append_data(&mut header, name, &mut file)
            .map_err(|e| PackError::write(name, e))
    }
}

impl ArchiveBackend for TarGzBackend {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::TarGz
    }

    fn compress(&mut self, name: &str, path: &Path, metadata: &Metadata) -> Result<bool> {
        if !self.written.claim(name) {
            return Ok(false);
        }

        if metadata.file_type().is_symlink() {
            self.append_symlink(name, path, metadata)?;
        } else {
            self.append_file(name, path, metadata)?;
        }

        // Partial archives stay readable up to the last complete entry.
        self.builder
            .get_mut()
            .flush()
            .map_err(|e| PackError::write(name, e))?;

        Ok(true)
    }

    fn finish(self: Box<Self>) -> Result<u64> {
        let encoder = self.builder.into_inner()?;
        let mut counting_writer = encoder.finish()?;
        counting_writer.flush()?;
        Ok(counting_writer.total_bytes())
    }
}

/// Counts bytes passing through to the underlying writer.
struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    fn total_bytes(&self) -> u64 {
        self.bytes_written
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let bytes = self.inner.write(buf)?;
        self.bytes_written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Converts compression level (1-9) to flate2 compression level.
fn compression_level_to_flate2(level: Option<u8>) -> flate2::Compression {
    match level {
        None | Some(6) => flate2::Compression::default(),
        Some(n) => flate2::Compression::new(u32::from(n.clamp(1, 9))),
    }
}
