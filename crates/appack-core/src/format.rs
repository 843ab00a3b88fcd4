//! Archive format selection.

use std::fmt;
use std::str::FromStr;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveFormat {
    /// Gzip-compressed tar archive.
    #[default]
    TarGz,
    /// ZIP archive.
    Zip,
}

impl ArchiveFormat {
    /// Selects a format by its user-facing name.
    ///
    /// Only `zip` (case-insensitive) selects the ZIP backend. Every other
    /// value, including empty or unknown names, falls back to tar.gz.
    ///
    /// # Examples
    ///
    /// ```
    /// use appack_core::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::from_name("zip"), ArchiveFormat::Zip);
    /// assert_eq!(ArchiveFormat::from_name("tar.gz"), ArchiveFormat::TarGz);
    /// assert_eq!(ArchiveFormat::from_name("rar"), ArchiveFormat::TarGz);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("zip") {
            Self::Zip
        } else {
            Self::TarGz
        }
    }

    /// File extension used for the output archive, without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }

    /// Builds the output file name for an application directory name.
    ///
    /// # Examples
    ///
    /// ```
    /// use appack_core::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::TarGz.file_name("shop"), "shop.tar.gz");
    /// assert_eq!(ArchiveFormat::Zip.file_name("shop"), "shop.zip");
    /// ```
    #[must_use]
    pub fn file_name(self, app_name: &str) -> String {
        format!("{app_name}.{}", self.extension())
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ArchiveFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}
