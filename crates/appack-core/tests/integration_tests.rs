//! Integration tests for appack-core.
//!
//! These tests pack real directory trees and read the archives back.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::field_reassign_with_default
)]

use appack_core::ArchiveFormat;
use appack_core::EntryKind;
use appack_core::PackConfig;
use appack_core::PackError;
use appack_core::PackObserver;
use appack_core::Packer;
use appack_core::SkipReason;
use appack_core::StagingDir;
use appack_core::pack;
use appack_core::pack_with_observer;
use appack_core::test_utils::read_tar_gz;
use appack_core::test_utils::read_zip;
use appack_core::test_utils::tar_gz_entry_names;
use appack_core::test_utils::write_tree;
use appack_core::test_utils::zip_entry_names;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn entry_names(output: &Path, format: ArchiveFormat) -> Vec<String> {
    match format {
        ArchiveFormat::TarGz => tar_gz_entry_names(output),
        ArchiveFormat::Zip => zip_entry_names(output),
    }
}

fn app_config(format: ArchiveFormat) -> PackConfig {
    PackConfig::default()
        .with_exclude_prefixes(vec![".".to_string()])
        .with_exclude_suffixes(vec![".go".to_string()])
        .with_format(format)
}

#[test]
fn test_scenario_readme_only() {
    for format in [ArchiveFormat::TarGz, ArchiveFormat::Zip] {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("app");
        write_tree(
            &app,
            &[
                ("main.go", "package main"),
                ("README.md", "# app"),
                (".git/config", "[core]"),
            ],
        );
        let output = temp.path().join(format.file_name("app"));

        let report = pack(&output, &[&app], &app_config(format)).unwrap();

        assert_eq!(entry_names(&output, format), vec!["README.md"]);
        assert_eq!(report.files_added, 1);
        assert_eq!(report.entries, vec!["README.md"]);
    }
}

#[test]
fn test_scenario_build_root_first() {
    for format in [ArchiveFormat::TarGz, ArchiveFormat::Zip] {
        let temp = TempDir::new().unwrap();
        let build = temp.path().join("build");
        let app = temp.path().join("app");
        write_tree(&build, &[("app", "compiled")]);
        write_tree(
            &app,
            &[("README.md", "# app"), ("app.go", "package main")],
        );
        let output = temp.path().join(format.file_name("app"));

        pack(&output, &[&build, &app], &app_config(format)).unwrap();

        let mut names = entry_names(&output, format);
        names.sort();
        assert_eq!(names, vec!["README.md", "app"]);
    }
}

#[test]
fn test_determinism_same_order_across_runs() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("app");
    write_tree(
        &app,
        &[
            ("views/index.tpl", "i"),
            ("static/js/app.js", "j"),
            ("static/css/site.css", "c"),
            ("conf/app.conf", "a"),
            ("README.md", "r"),
            ("Zeta", "z"),
        ],
    );

    for format in [ArchiveFormat::TarGz, ArchiveFormat::Zip] {
        let first = temp.path().join(format!("first.{}", format.extension()));
        let second = temp.path().join(format!("second.{}", format.extension()));
        let config = PackConfig::default().with_format(format);

        pack(&first, &[&app], &config).unwrap();
        pack(&second, &[&app], &config).unwrap();

        let names = entry_names(&first, format);
        assert_eq!(names, entry_names(&second, format));
        assert_eq!(
            names,
            vec![
                "README.md",
                "Zeta",
                "conf/app.conf",
                "static/css/site.css",
                "static/js/app.js",
                "views/index.tpl",
            ]
        );
    }
}

#[test]
fn test_exclusion_applies_in_every_root() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("first");
    let second = temp.path().join("second");
    write_tree(&first, &[("a.log", "x"), ("keep.txt", "k")]);
    write_tree(
        &second,
        &[("nested/b.log", "y"), ("tmp/cache", "c"), ("other.txt", "o")],
    );
    let output = temp.path().join("out.tar.gz");

    let config = PackConfig::default()
        .with_exclude_prefixes(vec!["tmp/".to_string()])
        .with_exclude_suffixes(vec![])
        .with_exclude_patterns(vec![r"\.log$".to_string()]);
    let report = pack(&output, &[&first, &second], &config).unwrap();

    assert_eq!(
        tar_gz_entry_names(&output),
        vec!["keep.txt", "other.txt"]
    );
    // `nested` and `tmp` hold only excluded files and are never descended.
    assert_eq!(report.entries_excluded, 1);
    assert_eq!(report.directories_pruned, 2);
}

#[test]
fn test_regex_matches_base_name_not_path() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("app");
    write_tree(
        &app,
        &[("secret/public.txt", "p"), ("conf/secret", "s")],
    );
    let output = temp.path().join("out.tar.gz");

    let config = PackConfig::default().with_exclude_patterns(vec!["^secret$".to_string()]);
    pack(&output, &[&app], &config).unwrap();

    // `secret/` is excluded by name; `conf/` holds only an excluded file.
    assert!(tar_gz_entry_names(&output).is_empty());
}

#[test]
fn test_deduplication_first_root_wins() {
    for format in [ArchiveFormat::TarGz, ArchiveFormat::Zip] {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        write_tree(&a, &[("x/y.txt", "from a")]);
        write_tree(&b, &[("x/y.txt", "from b"), ("x/z.txt", "only b")]);
        let output = temp.path().join(format.file_name("dedup"));

        let config = PackConfig::default().with_format(format);
        let report = pack(&output, &[&a, &b], &config).unwrap();

        let entries = match format {
            ArchiveFormat::TarGz => read_tar_gz(&output),
            ArchiveFormat::Zip => read_zip(&output),
        };
        let y: Vec<_> = entries.iter().filter(|e| e.name == "x/y.txt").collect();
        assert_eq!(y.len(), 1);
        assert_eq!(y[0].content, b"from a");
        assert!(entries.iter().any(|e| e.name == "x/z.txt"));
        assert_eq!(report.duplicates_skipped, 1);
    }
}

#[test]
fn test_empty_directory_pruning() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("app");
    write_tree(
        &app,
        &[
            ("controllers/default.go", "package controllers"),
            ("models/user.go", "package models"),
            ("README.md", "r"),
        ],
    );
    fs::create_dir_all(app.join("empty/deeper")).unwrap();
    let output = temp.path().join("out.tar.gz");

    let report = pack(&output, &[&app], &PackConfig::default()).unwrap();

    assert_eq!(tar_gz_entry_names(&output), vec!["README.md"]);
    assert_eq!(report.directories_pruned, 3);
}

#[test]
fn test_self_exclusion_output_inside_root() {
    for format in [ArchiveFormat::TarGz, ArchiveFormat::Zip] {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("app");
        write_tree(&app, &[("README.md", "r"), ("zz.txt", "z")]);
        let output = app.join(format.file_name("app"));

        pack(&output, &[&app], &PackConfig::default().with_format(format)).unwrap();

        let names = entry_names(&output, format);
        assert!(!names.contains(&format.file_name("app")));
        assert_eq!(names, vec!["README.md", "zz.txt"]);
    }
}

#[test]
fn test_self_exclusion_with_relative_paths() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("app");
    write_tree(&app, &[("index.html", "i")]);
    let output = app.join("./app.tar.gz");

    pack(&output, &[app.join(".")], &PackConfig::default()).unwrap();

    assert_eq!(tar_gz_entry_names(&app.join("app.tar.gz")), vec!["index.html"]);
}

#[test]
fn test_self_exclusion_through_parent_components() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("shop");
    write_tree(&app, &[("README.md", "r")]);
    fs::create_dir(app.join("sub")).unwrap();
    let output = app.join("sub/../shop.tar.gz");

    pack(&output, &[&app], &PackConfig::default()).unwrap();

    assert_eq!(tar_gz_entry_names(&app.join("shop.tar.gz")), vec!["README.md"]);
}

#[test]
fn test_directory_holding_only_output_is_pruned() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("app");
    write_tree(&app, &[("README.md", "r")]);
    fs::create_dir(app.join("dist")).unwrap();
    let output = app.join("dist/app.tar.gz");

    let report = pack(&output, &[&app], &PackConfig::default()).unwrap();

    assert_eq!(tar_gz_entry_names(&output), vec!["README.md"]);
    assert_eq!(report.directories_pruned, 1);
}

#[test]
fn test_invalid_regex_fails_before_output_created() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("app");
    write_tree(&app, &[("README.md", "r")]);
    let output = temp.path().join("out.tar.gz");

    let config = PackConfig::default().with_exclude_patterns(vec!["(".to_string()]);
    let err = pack(&output, &[&app], &config).unwrap_err();

    assert!(matches!(err, PackError::InvalidPattern { .. }));
    assert!(err.is_configuration_error());
    assert!(!output.exists());
}

#[test]
fn test_missing_root_fails_before_output_created() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("app");
    write_tree(&app, &[("README.md", "r")]);
    let missing = temp.path().join("missing");
    let output = temp.path().join("out.zip");

    let config = PackConfig::default().with_format(ArchiveFormat::Zip);
    let err = pack(&output, &[&app, &missing], &config).unwrap_err();

    match err {
        PackError::RootNotFound { path } => assert_eq!(path, missing),
        other => panic!("expected RootNotFound, got {other:?}"),
    }
    assert!(!output.exists());
}

#[cfg(unix)]
#[test]
fn test_unreadable_root_fails_before_output_created() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let app = temp.path().join("app");
    write_tree(&app, &[("README.md", "r")]);
    let output = temp.path().join("out.tar.gz");
    fs::set_permissions(&app, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can list the directory anyway.
    if fs::read_dir(&app).is_ok() {
        fs::set_permissions(&app, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let err = pack(&output, &[&app], &PackConfig::default()).unwrap_err();
    fs::set_permissions(&app, fs::Permissions::from_mode(0o755)).unwrap();

    match &err {
        PackError::RootUnreadable { path, .. } => assert_eq!(path, &app),
        other => panic!("expected RootUnreadable, got {other:?}"),
    }
    assert!(err.is_configuration_error());
    assert!(!output.exists());
}

#[test]
fn test_existing_output_is_overwritten() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("app");
    write_tree(&app, &[("README.md", "r")]);
    let output = temp.path().join("app.tar.gz");
    fs::write(&output, "not an archive").unwrap();

    pack(&output, &[&app], &PackConfig::default()).unwrap();

    assert_eq!(tar_gz_entry_names(&output), vec!["README.md"]);
}

#[test]
fn test_content_roundtrip_zip() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("app");
    let big = "0123456789abcdef".repeat(8 * 1024);
    write_tree(&app, &[("data/big.txt", &big), ("small.txt", "s")]);
    let output = temp.path().join("app.zip");

    let config = PackConfig::default()
        .with_format(ArchiveFormat::Zip)
        .with_compression_level(Some(9));
    let report = pack(&output, &[&app], &config).unwrap();

    let entries = read_zip(&output);
    assert_eq!(entries[0].name, "data/big.txt");
    assert_eq!(entries[0].content, big.as_bytes());
    assert!(report.bytes_compressed < report.bytes_written);
    assert!(report.compression_ratio() > 1.0);
}

#[cfg(unix)]
mod symlinks {
    use super::*;
    use std::os::unix::fs::symlink;

    fn linked_app(temp: &TempDir) -> std::path::PathBuf {
        let shared = temp.path().join("shared");
        write_tree(&shared, &[("logo.png", "png"), ("fonts/a.woff", "woff")]);
        let app = temp.path().join("app");
        write_tree(&app, &[("README.md", "r")]);
        symlink(&shared, app.join("assets")).unwrap();
        symlink(shared.join("logo.png"), app.join("logo.png")).unwrap();
        app
    }

    #[test]
    fn test_skip_symlinks_never_emitted() {
        let temp = TempDir::new().unwrap();
        let app = linked_app(&temp);
        let output = temp.path().join("out.tar.gz");

        let config = PackConfig::default()
            .with_skip_symlinks(true)
            .with_follow_symlinks(true);
        let report = pack(&output, &[&app], &config).unwrap();

        assert_eq!(tar_gz_entry_names(&output), vec!["README.md"]);
        assert_eq!(report.symlinks_skipped, 2);
    }

    #[test]
    fn test_follow_symlinks_traverses_directories() {
        let temp = TempDir::new().unwrap();
        let app = linked_app(&temp);
        let output = temp.path().join("out.tar.gz");

        let config = PackConfig::default().with_follow_symlinks(true);
        pack(&output, &[&app], &config).unwrap();

        let entries = read_tar_gz(&output);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["README.md", "assets/fonts/a.woff", "assets/logo.png", "logo.png"]
        );
        assert!(entries.iter().all(|e| !e.is_symlink));
        assert_eq!(entries[3].content, b"png");
    }

    #[test]
    fn test_symlinks_recorded_as_links_by_default() {
        for format in [ArchiveFormat::TarGz, ArchiveFormat::Zip] {
            let temp = TempDir::new().unwrap();
            let app = linked_app(&temp);
            let output = temp.path().join(format.file_name("out"));

            let config = PackConfig::default().with_format(format);
            let report = pack(&output, &[&app], &config).unwrap();

            let entries = match format {
                ArchiveFormat::TarGz => read_tar_gz(&output),
                ArchiveFormat::Zip => read_zip(&output),
            };
            let logo = entries.iter().find(|e| e.name == "logo.png").unwrap();
            assert!(logo.is_symlink);
            assert_eq!(
                logo.content,
                temp.path().join("shared/logo.png").to_string_lossy().as_bytes()
            );
            assert!(entries.iter().any(|e| e.name == "assets" && e.is_symlink));
            assert_eq!(report.symlinks_added, 2);
        }
    }

    #[test]
    fn test_dangling_symlink_ignored_when_following() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("app");
        write_tree(&app, &[("README.md", "r")]);
        symlink(temp.path().join("gone"), app.join("broken")).unwrap();
        let output = temp.path().join("out.tar.gz");

        let config = PackConfig::default().with_follow_symlinks(true);
        let report = pack(&output, &[&app], &config).unwrap();

        assert_eq!(tar_gz_entry_names(&output), vec!["README.md"]);
        assert_eq!(report.symlinks_skipped, 1);
    }

    #[test]
    fn test_link_excluded_by_own_name() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("app");
        write_tree(&app, &[("README.md", "r"), ("config.yml", "c")]);
        symlink(app.join("config.yml"), app.join("config.tmp")).unwrap();
        symlink(app.join("README.md"), app.join("docs")).unwrap();
        let output = temp.path().join("out.tar.gz");

        let config = PackConfig::default().with_follow_symlinks(true);
        pack(&output, &[&app], &config).unwrap();

        // `config.tmp` is excluded by its suffix although its target is not.
        assert_eq!(
            tar_gz_entry_names(&output),
            vec!["README.md", "config.yml", "docs"]
        );
    }

    #[test]
    fn test_link_kept_when_only_target_excluded() {
        for follow in [false, true] {
            let temp = TempDir::new().unwrap();
            let app = temp.path().join("app");
            write_tree(&app, &[("README.md", "r"), ("main.go", "package main")]);
            symlink(app.join("main.go"), app.join("entry")).unwrap();
            let output = temp.path().join("out.tar.gz");

            let config = PackConfig::default().with_follow_symlinks(follow);
            pack(&output, &[&app], &config).unwrap();

            // `main.go` is excluded by its suffix; the link's own name is not.
            let entries = read_tar_gz(&output);
            let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
            assert_eq!(names, vec!["README.md", "entry"], "follow = {follow}");
            assert_eq!(entries[1].is_symlink, !follow);
            if follow {
                assert_eq!(entries[1].content, b"package main");
            }
        }
    }

    #[test]
    fn test_self_exclusion_through_symlinked_root() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("shop");
        write_tree(&app, &[("README.md", "r")]);
        let alias = temp.path().join("alias");
        symlink(&app, &alias).unwrap();
        let output = alias.join("shop.tar.gz");

        pack(&output, &[&app], &PackConfig::default()).unwrap();

        assert_eq!(tar_gz_entry_names(&output), vec!["README.md"]);
    }

    #[test]
    fn test_followed_link_to_output_not_archived() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("app");
        write_tree(&app, &[("README.md", "r")]);
        let output = app.join("app.tar.gz");
        symlink(&output, app.join("latest")).unwrap();

        let config = PackConfig::default().with_follow_symlinks(true);
        pack(&output, &[&app], &config).unwrap();

        assert_eq!(tar_gz_entry_names(&output), vec!["README.md"]);
    }

    #[test]
    fn test_symlink_loop_reports_path() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("app");
        write_tree(&app, &[("dir/file.txt", "f")]);
        symlink(app.join("dir"), app.join("dir/self")).unwrap();
        let output = temp.path().join("out.tar.gz");

        let config = PackConfig::default().with_follow_symlinks(true);
        let err = pack(&output, &[&app], &config).unwrap_err();

        assert!(matches!(err, PackError::SymlinkLoop { .. }));
        assert_eq!(err.path(), Some(app.join("dir/self").as_path()));
    }
}

#[derive(Default)]
struct Recorder {
    archived: Vec<(String, EntryKind)>,
    skipped: Vec<(String, SkipReason)>,
    completed: bool,
}

impl PackObserver for Recorder {
    fn on_entry_archived(&mut self, name: &str, kind: EntryKind) {
        self.archived.push((name.to_string(), kind));
    }

    fn on_entry_skipped(&mut self, name: &str, reason: SkipReason) {
        self.skipped.push((name.to_string(), reason));
    }

    fn on_complete(&mut self) {
        self.completed = true;
    }
}

#[test]
fn test_observer_sees_every_decision() {
    let temp = TempDir::new().unwrap();
    let build = temp.path().join("build");
    let app = temp.path().join("app");
    write_tree(&build, &[("shop", "bin")]);
    write_tree(
        &app,
        &[("shop", "old"), ("main.go", "m"), ("views/index.tpl", "v")],
    );
    fs::create_dir_all(app.join("logs")).unwrap();
    let output = temp.path().join("shop.tar.gz");

    let mut recorder = Recorder::default();
    let report = pack_with_observer(
        &output,
        &[&build, &app],
        &PackConfig::default(),
        &mut recorder,
    )
    .unwrap();

    assert!(recorder.completed);
    assert_eq!(
        recorder.archived,
        vec![
            ("shop".to_string(), EntryKind::File),
            ("views/index.tpl".to_string(), EntryKind::File),
        ]
    );
    assert_eq!(
        recorder.skipped,
        vec![
            ("logs".to_string(), SkipReason::EmptyDirectory),
            ("main.go".to_string(), SkipReason::Excluded),
            ("shop".to_string(), SkipReason::Duplicate),
        ]
    );
    assert_eq!(report.total_entries(), 2);
}

#[test]
fn test_staging_dir_packed_first_and_removed() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("shop");
    write_tree(&app, &[("shop", "stale"), ("README.md", "r")]);
    let binary = temp.path().join("target/shop");
    write_tree(temp.path(), &[("target/shop", "fresh")]);
    let output = temp.path().join("shop.tar.gz");

    let staging = StagingDir::new().unwrap();
    let staging_path = staging.path().to_path_buf();
    staging.stage_file(&binary).unwrap();

    let report = Packer::new()
        .output(&output)
        .add_root(staging.path())
        .add_root(&app)
        .pack()
        .unwrap();
    staging.close().unwrap();

    assert!(!staging_path.exists());
    let entries = read_tar_gz(&output);
    assert_eq!(entries[0].name, "shop");
    assert_eq!(entries[0].content, b"fresh");
    assert_eq!(report.duplicates_skipped, 1);
}

#[test]
fn test_staging_dir_removed_after_failure() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out.tar.gz");

    let staging_path = {
        let staging = StagingDir::new().unwrap();
        let path = staging.path().to_path_buf();
        let result = Packer::new()
            .output(&output)
            .add_root(staging.path())
            .add_root(temp.path().join("missing"))
            .pack();
        assert!(result.is_err());
        path
    };

    assert!(!staging_path.exists());
}
