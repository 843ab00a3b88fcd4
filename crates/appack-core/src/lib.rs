//! Deterministic application packaging.
//!
//! `appack-core` packs one or more directory trees into a single `.tar.gz`
//! or `.zip` archive. Entries are written in sorted, depth-first order;
//! paths are filtered by prefix, suffix and base-name regex rules; empty
//! directories are pruned; symlinks are recorded, followed or skipped.
//!
//! # Examples
//!
//! ```no_run
//! use appack_core::PackConfig;
//! use appack_core::pack;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PackConfig::default();
//! let report = pack("dist/shop.tar.gz", &["/srv/shop"], &config)?;
//! println!("Packed {} files", report.files_added);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod error;
pub mod format;
pub mod packing;
pub mod report;

#[doc(hidden)]
pub mod test_utils;

pub use api::pack;
pub use api::pack_with_observer;
pub use error::PackError;
pub use error::Result;
pub use format::ArchiveFormat;
pub use packing::ExclusionPolicy;
pub use packing::PackConfig;
pub use packing::Packer;
pub use packing::StagingDir;
pub use report::EntryKind;
pub use report::NoopObserver;
pub use report::PackObserver;
pub use report::PackReport;
pub use report::SkipReason;
