//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use appack_core::PackReport;
use console::Term;
use console::style;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    /// Lines describing what was left out; counters at zero are omitted.
    fn skip_lines(report: &PackReport) -> Vec<String> {
        [
            ("Excluded:", report.entries_excluded),
            ("Duplicates:", report.duplicates_skipped),
            ("Links skipped:", report.symlinks_skipped),
            ("Dirs pruned:", report.directories_pruned),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(label, count)| format!("  {label:<17} {count}"))
        .collect()
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_pack_result(&self, output_path: &Path, report: &PackReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            self.line(&format!(
                "{} Packed {}",
                style("✓").green().bold(),
                output_path.display()
            ));
        } else {
            self.line(&format!("Packed {}", output_path.display()));
        }

        self.line(&format!("  Files:            {}", report.files_added));
        if report.symlinks_added > 0 {
            self.line(&format!("  Symlinks:         {}", report.symlinks_added));
        }
        self.line(&format!(
            "  Total size:       {}",
            Self::format_size(report.bytes_written)
        ));
        self.line(&format!(
            "  Archive size:     {}",
            Self::format_size(report.bytes_compressed)
        ));

        if self.verbose {
            for line in Self::skip_lines(report) {
                self.line(&line);
            }
            self.line(&format!("  Duration:         {:?}", report.duration));
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            self.line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            self.line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            self.line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            self.line(&format!("WARNING: {message}"));
        }
    }
}
