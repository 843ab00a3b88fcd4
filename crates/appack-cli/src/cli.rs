//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "appack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print every archived entry and raise the log level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack an application directory into a deployable archive
    Pack(PackArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct PackArgs {
    /// Application directory to pack
    #[arg(short = 'p', long, value_name = "DIR", default_value = ".")]
    pub app_path: PathBuf,

    /// Directory the archive is written to (created if missing)
    #[arg(short = 'o', long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Archive format: tar.gz or zip (anything else means tar.gz)
    #[arg(short = 'f', long, value_name = "FMT", default_value = "tar.gz")]
    pub format: String,

    /// Colon-separated path prefixes to exclude
    #[arg(long, visible_alias = "exp", value_name = "LIST", default_value = ".")]
    pub exclude_prefix: String,

    /// Colon-separated path suffixes to exclude
    #[arg(
        long,
        visible_alias = "exs",
        value_name = "LIST",
        default_value = ".go:.DS_Store:.tmp"
    )]
    pub exclude_suffix: String,

    /// Regular expression matched against base names (can be repeated)
    #[arg(long, visible_alias = "exr", value_name = "REGEX")]
    pub exclude_regex: Vec<String>,

    /// Archive what symbolic links point to instead of the links
    #[arg(long, visible_alias = "fs")]
    pub follow_symlinks: bool,

    /// Leave symbolic links out of the archive
    #[arg(long, visible_alias = "ss")]
    pub skip_symlinks: bool,

    /// Compression level (1-9)
    #[arg(
        short = 'l',
        long,
        default_value = "6",
        value_parser = clap::value_parser!(u8).range(1..=9)
    )]
    pub compression_level: u8,

    /// Prebuilt file to place at the archive root ahead of the app (can be repeated)
    #[arg(long = "with", value_name = "FILE")]
    pub with_files: Vec<PathBuf>,

    /// Extra directory packed after the app (can be repeated)
    #[arg(long = "root", value_name = "DIR")]
    pub extra_roots: Vec<PathBuf>,
}

/// Splits a colon-separated list, dropping empty items.
pub fn split_list(list: &str) -> Vec<String> {
    list.split(':')
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
