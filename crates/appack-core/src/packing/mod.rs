//! Packing module.
//!
//! Walks application roots, applies exclusion rules and streams surviving
//! entries into a tar.gz or zip backend.

pub mod backend;
pub mod filters;
pub mod walker;

pub mod config;
pub mod creator;
pub mod staging;
pub mod tar;
pub mod zip;

pub use backend::ArchiveBackend;
pub use config::PackConfig;
pub use config::SymlinkPolicy;
pub use creator::Packer;
pub use filters::ExclusionPolicy;
pub use staging::StagingDir;
pub use walker::Visit;
pub use walker::WalkEvent;
pub use walker::Walker;
