//! Live feedback while a pack runs.

use appack_core::EntryKind;
use appack_core::PackObserver;
use appack_core::SkipReason;
use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::time::Duration;

/// How the pack command reports entries while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// One `compressed <name>` line per archived entry.
    Entries,
    /// A spinner counting archived entries.
    Spinner,
    /// Nothing until the final result.
    Silent,
}

impl Feedback {
    /// Picks the feedback mode from the global flags and the terminal.
    pub fn select(verbose: bool, quiet: bool, json: bool) -> Self {
        Self::for_terminal(verbose, quiet, json, Term::stdout().is_term())
    }

    fn for_terminal(verbose: bool, quiet: bool, json: bool, is_term: bool) -> Self {
        if json || quiet {
            Self::Silent
        } else if verbose {
            Self::Entries
        } else if is_term {
            Self::Spinner
        } else {
            Self::Silent
        }
    }
}

/// Prints every archived entry to stdout.
pub struct EntryPrinter {
    term: Term,
}

impl EntryPrinter {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for EntryPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl PackObserver for EntryPrinter {
    fn on_entry_archived(&mut self, name: &str, _kind: EntryKind) {
        let _ = self.term.write_line(&format!("compressed {name}"));
    }

    fn on_entry_skipped(&mut self, _name: &str, _reason: SkipReason) {}

    fn on_complete(&mut self) {}
}

/// Spinner showing how many entries have been archived.
///
/// Cleared on completion and on drop, so an error message is never
/// printed over a half-drawn line.
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    #[must_use]
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} {pos} entries ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl PackObserver for CliProgress {
    fn on_entry_archived(&mut self, name: &str, _kind: EntryKind) {
        self.bar.inc(1);
        self.bar.set_message(format!("Packing {name}"));
    }

    fn on_entry_skipped(&mut self, _name: &str, _reason: SkipReason) {}

    fn on_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}
