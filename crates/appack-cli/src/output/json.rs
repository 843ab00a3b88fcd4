//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use appack_core::PackReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

#[derive(Serialize)]
struct PackOutput {
    output_path: String,
    files_added: usize,
    symlinks_added: usize,
    duplicates_skipped: usize,
    entries_excluded: usize,
    symlinks_skipped: usize,
    directories_pruned: usize,
    bytes_written: u64,
    bytes_compressed: u64,
    compression_ratio: f64,
    compression_percentage: f64,
    duration_ms: u128,
    entries: Vec<String>,
}

impl PackOutput {
    fn new(output_path: &Path, report: &PackReport) -> Self {
        Self {
            output_path: output_path.display().to_string(),
            files_added: report.files_added,
            symlinks_added: report.symlinks_added,
            duplicates_skipped: report.duplicates_skipped,
            entries_excluded: report.entries_excluded,
            symlinks_skipped: report.symlinks_skipped,
            directories_pruned: report.directories_pruned,
            bytes_written: report.bytes_written,
            bytes_compressed: report.bytes_compressed,
            compression_ratio: report.compression_ratio(),
            compression_percentage: report.compression_percentage(),
            duration_ms: report.duration.as_millis(),
            entries: report.entries.clone(),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_pack_result(&self, output_path: &Path, report: &PackReport) -> Result<()> {
        let output = JsonOutput::success("pack", PackOutput::new(output_path, report));
        Self::output(&output)
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::error("pack", format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
