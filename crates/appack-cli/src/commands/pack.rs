//! Pack command implementation.

use crate::cli::PackArgs;
use crate::cli::split_list;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use crate::progress::EntryPrinter;
use crate::progress::Feedback;
use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use appack_core::ArchiveFormat;
use appack_core::NoopObserver;
use appack_core::PackConfig;
use appack_core::PackObserver;
use appack_core::PackReport;
use appack_core::StagingDir;
use appack_core::pack_with_observer;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

pub fn execute(args: &PackArgs, formatter: &dyn OutputFormatter, feedback: Feedback) -> Result<()> {
    let format = ArchiveFormat::from_name(&args.format);
    let app_name = app_name(&args.app_path)?;

    fs::create_dir_all(&args.output).with_context(|| {
        format!(
            "Failed to create output directory '{}'",
            args.output.display()
        )
    })?;
    let output = args.output.join(format.file_name(&app_name));

    let config = PackConfig::default()
        .with_format(format)
        .with_exclude_prefixes(split_list(&args.exclude_prefix))
        .with_exclude_suffixes(split_list(&args.exclude_suffix))
        .with_exclude_patterns(args.exclude_regex.clone())
        .with_follow_symlinks(args.follow_symlinks)
        .with_skip_symlinks(args.skip_symlinks)
        .with_compression_level(Some(args.compression_level));

    tracing::debug!(
        app = %args.app_path.display(),
        output = %output.display(),
        staged = args.with_files.len(),
        extra_roots = args.extra_roots.len(),
        "packing application"
    );
    let staging = stage_artifacts(&args.with_files, &output)?;

    let mut roots: Vec<PathBuf> = Vec::with_capacity(args.extra_roots.len() + 2);
    if let Some(staging) = &staging {
        roots.push(staging.path().to_path_buf());
    }
    roots.push(args.app_path.clone());
    roots.extend(args.extra_roots.iter().cloned());

    let result = match feedback {
        Feedback::Entries => run(&output, &roots, &config, &mut EntryPrinter::new()),
        Feedback::Spinner => run(&output, &roots, &config, &mut CliProgress::new("Packing")),
        Feedback::Silent => run(&output, &roots, &config, &mut NoopObserver),
    };

    if let Some(staging) = staging
        && let Err(e) = staging.close()
    {
        formatter.format_warning(&format!("failed to remove staging directory: {e}"));
    }

    let report = result?;
    formatter.format_pack_result(&output, &report)
}

fn run(
    output: &Path,
    roots: &[PathBuf],
    config: &PackConfig,
    observer: &mut dyn PackObserver,
) -> Result<PackReport> {
    add_archive_context(pack_with_observer(output, roots, config, observer), output)
}

/// Copies `--with` files into a fresh staging root, or returns `None` when
/// there is nothing to stage.
fn stage_artifacts(files: &[PathBuf], output: &Path) -> Result<Option<StagingDir>> {
    if files.is_empty() {
        return Ok(None);
    }

    let staging = add_archive_context(StagingDir::new(), output)?;
    for file in files {
        add_archive_context(staging.stage_file(file), output)?;
    }
    Ok(Some(staging))
}

/// Name of the application directory, used as the archive stem.
fn app_name(app_path: &Path) -> Result<String> {
    let resolved = fs::canonicalize(app_path).or_else(|_| std::path::absolute(app_path))?;
    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            anyhow!(
                "Cannot derive an archive name from '{}'\n\
                 HINT: Pack a named application directory, not the filesystem root.",
                app_path.display()
            )
        })
}
