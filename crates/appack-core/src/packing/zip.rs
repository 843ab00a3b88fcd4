//! ZIP backend.

use crate::PackError;
use crate::Result;
use crate::format::ArchiveFormat;
use crate::packing::backend::ArchiveBackend;
use crate::packing::backend::WrittenNames;
use crate::packing::config::PackConfig;
use jiff::Timestamp;
use jiff::tz::TimeZone;
use std::fs;
use std::fs::File;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Entries at or above this size need ZIP64 extra fields.
const LARGE_FILE_THRESHOLD: u64 = u32::MAX as u64;

/// Writes entries into a deflated `.zip` file.
pub struct ZipBackend {
    zip: ZipWriter<File>,
    written: WrittenNames,
    options: SimpleFileOptions,
    preserve_permissions: bool,
}

impl ZipBackend {
    /// Starts a ZIP archive in `file`.
    #[must_use]
    pub fn new(file: File, config: &PackConfig) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(config.compression_level.map(i64::from));

        Self {
            zip: ZipWriter::new(file),
            written: WrittenNames::new(),
            options,
            preserve_permissions: config.preserve_permissions,
        }
    }

    fn entry_options(&self, metadata: &Metadata) -> SimpleFileOptions {
        if !self.preserve_permissions {
            return self.options;
        }

        let mut options = self.options;
        if let Some(modified) = zip_datetime(metadata) {
            options = options.last_modified_time(modified);
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            options = options.unix_permissions(metadata.permissions().mode());
        }
        options
    }
}

impl ArchiveBackend for ZipBackend {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn compress(&mut self, name: &str, path: &Path, metadata: &Metadata) -> Result<bool> {
        if !self.written.claim(name) {
            return Ok(false);
        }

        let options = self.entry_options(metadata);

        if metadata.file_type().is_symlink() {
            let target = fs::read_link(path).map_err(|e| PackError::traversal(path, e))?;
            self.zip
                .add_symlink(name, target.to_string_lossy(), options)
                .map_err(|e| PackError::write(name, io::Error::other(e)))?;
            return Ok(true);
        }

        let mut file = File::open(path).map_err(|e| PackError::traversal(path, e))?;
        let options = options.large_file(metadata.len() >= LARGE_FILE_THRESHOLD);

        self.zip
            .start_file(name, options)
            .map_err(|e| PackError::write(name, io::Error::other(e)))?;
        io::copy(&mut file, &mut self.zip).map_err(|e| PackError::write(name, e))?;

        Ok(true)
    }

    fn finish(self: Box<Self>) -> Result<u64> {
        let file = self
            .zip
            .finish()
            .map_err(|e| io::Error::other(format!("failed to finish ZIP archive: {e}")))?;
        Ok(file.metadata()?.len())
    }
}

/// Converts a modification time to a ZIP timestamp in UTC.
///
/// Returns `None` for times the DOS date format cannot hold (before 1980 or
/// after 2107), leaving the library default in place.
fn zip_datetime(metadata: &Metadata) -> Option<zip::DateTime> {
    let modified = metadata.modified().ok()?;
    let civil = Timestamp::try_from(modified)
        .ok()?
        .to_zoned(TimeZone::UTC)
        .datetime();

    zip::DateTime::from_date_and_time(
        u16::try_from(civil.year()).ok()?,
        u8::try_from(civil.month()).ok()?,
        u8::try_from(civil.day()).ok()?,
        u8::try_from(civil.hour()).ok()?,
        u8::try_from(civil.minute()).ok()?,
        u8::try_from(civil.second()).ok()?,
    )
    .ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    #[test]
    fn test_compress_regular_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("app.conf");
        fs::write(&source, "appname = shop").unwrap();
        let output = temp.path().join("out.zip");

        let mut backend = Box::new(ZipBackend::new(
            File::create(&output).unwrap(),
            &PackConfig::default(),
        ));
        let meta = fs::metadata(&source).unwrap();
        assert!(backend.compress("conf/app.conf", &source, &meta).unwrap());
        let size = backend.finish().unwrap();
        assert_eq!(size, fs::metadata(&output).unwrap().len());

        let mut archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_name("conf/app.conf").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "appname = shop");
    }

    #[test]
    fn test_compress_duplicate_is_noop() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("README.md");
        fs::write(&source, "readme").unwrap();
        let output = temp.path().join("out.zip");

        let mut backend = Box::new(ZipBackend::new(
            File::create(&output).unwrap(),
            &PackConfig::default(),
        ));
        let meta = fs::metadata(&source).unwrap();
        assert!(backend.compress("README.md", &source, &meta).unwrap());
        assert!(!backend.compress("README.md", &source, &meta).unwrap());
        backend.finish().unwrap();

        let archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_compress_symlink_and_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let binary = temp.path().join("shop");
        fs::write(&binary, "ELF").unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();
        let link = temp.path().join("latest");
        std::os::unix::fs::symlink("shop", &link).unwrap();
        let output = temp.path().join("out.zip");

        let mut backend = Box::new(ZipBackend::new(
            File::create(&output).unwrap(),
            &PackConfig::default(),
        ));
        let meta = fs::metadata(&binary).unwrap();
        backend.compress("shop", &binary, &meta).unwrap();
        let meta = fs::symlink_metadata(&link).unwrap();
        backend.compress("latest", &link, &meta).unwrap();
        backend.finish().unwrap();

        let mut archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let mode = archive.by_name("shop").unwrap().unix_mode().unwrap();
        assert_eq!(mode & 0o777, 0o755);

        let mut entry = archive.by_name("latest").unwrap();
        assert!(entry.is_symlink());
        let mut target = String::new();
        entry.read_to_string(&mut target).unwrap();
        assert_eq!(target, "shop");
    }

    #[test]
    fn test_zip_datetime_uses_mtime() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("file");
        fs::write(&source, "x").unwrap();

        let meta = fs::metadata(&source).unwrap();
        let converted = zip_datetime(&meta).unwrap();
        assert!(converted.year() >= 2020);
    }
}
