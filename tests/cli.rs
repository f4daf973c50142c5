//! Front door behavior over temporary workspaces.
//!
//! These tests drive the same library functions the `tugsort` binary calls:
//! config discovery, file collection, parallel sorting, write/check and the
//! JSON report.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tugsort::cli::{self, Overrides};
use tugsort::config::{Config, CONFIG_FILE_NAME};
use tugsort::error::{OutputErrorCode, TugSortError};
use tugsort::output::{emit_response, ErrorResponse, FileStatus};

const UNSORTED: &str = "import b from 'b';\nimport fs from 'fs';\nimport a from './a';\n";
const SORTED: &str = "import fs from 'fs';\nimport b from 'b';\n\nimport a from './a';\n";

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

fn read(dir: &TempDir, name: &str) -> String {
    fs::read_to_string(dir.path().join(name)).unwrap()
}

fn root(dir: &TempDir) -> Vec<PathBuf> {
    vec![dir.path().to_path_buf()]
}

fn relative(dir: &Path, path: &str) -> String {
    Path::new(path)
        .strip_prefix(dir)
        .unwrap()
        .to_string_lossy()
        .replace('\\', "/")
}

// ============================================================================
// Write mode
// ============================================================================

#[test]
fn test_write_rewrites_only_changed_files() {
    let dir = workspace(&[
        ("src/app.ts", UNSORTED),
        ("src/done.js", SORTED),
        ("src/notes.txt", UNSORTED),
    ]);
    let config = Config::default();
    let files = cli::collect_files(&root(&dir), &config.tugsort).unwrap();
    assert_eq!(files.len(), 2);

    let results = cli::sort_files(&files, &config.tugsort);
    assert_eq!(cli::write_changes(&results).unwrap(), 1);
    assert_eq!(read(&dir, "src/app.ts"), SORTED);
    assert_eq!(read(&dir, "src/done.js"), SORTED);
    assert_eq!(read(&dir, "src/notes.txt"), UNSORTED);
}

#[test]
fn test_failed_file_is_left_untouched() {
    let broken = "import b from 'b';\nimport { a from 'a';\n";
    let dir = workspace(&[("bad.ts", broken), ("good.ts", UNSORTED)]);
    let config = Config::default();
    let files = cli::collect_files(&root(&dir), &config.tugsort).unwrap();
    let mut results = cli::sort_files(&files, &config.tugsort);

    let err = cli::take_first_error(&mut results).unwrap();
    assert_eq!(err.error_code(), OutputErrorCode::ParseError);
    assert_eq!(read(&dir, "bad.ts"), broken);
}

// ============================================================================
// Check mode
// ============================================================================

#[test]
fn test_check_lists_files_that_would_change() {
    let dir = workspace(&[("a.ts", UNSORTED), ("b.ts", SORTED), ("c.mjs", UNSORTED)]);
    let config = Config::default();
    let files = cli::collect_files(&root(&dir), &config.tugsort).unwrap();
    let results = cli::sort_files(&files, &config.tugsort);

    let err = cli::check(&results).unwrap_err();
    assert_eq!(err.error_code().code(), 5);
    match err {
        TugSortError::CheckFailed { files } => {
            let names: Vec<_> = files.iter().map(|f| relative(dir.path(), f)).collect();
            assert_eq!(names, vec!["a.ts", "c.mjs"]);
        }
        other => panic!("expected CheckFailed, got {other:?}"),
    }

    // Nothing is written by a check.
    assert_eq!(read(&dir, "a.ts"), UNSORTED);
}

#[test]
fn test_check_passes_on_sorted_tree() {
    let dir = workspace(&[("a.ts", SORTED), ("nested/b.tsx", SORTED)]);
    let config = Config::default();
    let files = cli::collect_files(&root(&dir), &config.tugsort).unwrap();
    assert!(cli::check(&cli::sort_files(&files, &config.tugsort)).is_ok());
}

// ============================================================================
// JSON report
// ============================================================================

#[test]
fn test_json_report_statuses() {
    let dir = workspace(&[
        ("changed.ts", UNSORTED),
        ("same.ts", SORTED),
        ("opted_out.ts", "// tugsort-ignore-file\nimport b from 'b';\nimport a from 'a';\n"),
        ("broken.ts", "import {a from 'a';\n"),
    ]);
    let config = Config::default();
    let files = cli::collect_files(&root(&dir), &config.tugsort).unwrap();
    let results = cli::sort_files(&files, &config.tugsort);
    let response = cli::report(&results, false);

    assert_eq!(response.status, "error");
    assert_eq!(response.summary.files_checked, 4);
    assert_eq!(response.summary.files_changed, 1);
    assert_eq!(response.summary.files_failed, 1);

    let status_of = |name: &str| {
        response
            .files
            .iter()
            .find(|file| relative(dir.path(), &file.path) == name)
            .map(|file| file.status)
            .unwrap()
    };
    assert_eq!(status_of("changed.ts"), FileStatus::Changed);
    assert_eq!(status_of("same.ts"), FileStatus::Unchanged);
    assert_eq!(status_of("opted_out.ts"), FileStatus::Skipped);
    assert_eq!(status_of("broken.ts"), FileStatus::Error);

    let mut out = Vec::new();
    emit_response(&response, &mut out).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["schema_version"], "1");
    assert_eq!(json["applied"], false);
    let broken = json["files"]
        .as_array()
        .unwrap()
        .iter()
        .find(|file| file["status"] == "error")
        .unwrap();
    assert_eq!(broken["error"]["code"], 6);
    assert_eq!(broken["error"]["location"]["line"], 1);
}

#[test]
fn test_error_response_for_unmatched_group() {
    let dir = workspace(&[
        (
            CONFIG_FILE_NAME,
            "[tugsort]\nimport_order = [\"<THIRD_PARTY_MODULES>\", \"<TYPES>^[.]\"]\n",
        ),
        ("a.ts", "import type { FC } from 'react';\n"),
    ]);
    let config = Config::discover(None, dir.path()).unwrap();
    let mut results = cli::sort_files(&[dir.path().join("a.ts")], &config.tugsort);
    let err = cli::take_first_error(&mut results).unwrap();

    let mut out = Vec::new();
    emit_response(&ErrorResponse::from_error(&err), &mut out).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 3);
    assert_eq!(json["error"]["details"]["module"], "react");
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_changes_grouping() {
    let dir = workspace(&[
        (
            CONFIG_FILE_NAME,
            "[tugsort]\nimport_order = [\"^@app/\", \"\", \"<THIRD_PARTY_MODULES>\"]\n",
        ),
        ("a.ts", "import z from 'z';\nimport x from '@app/x';\n"),
    ]);
    let config = Config::discover(None, dir.path()).unwrap();
    let results = cli::sort_files(&[dir.path().join("a.ts")], &config.tugsort);
    cli::write_changes(&results).unwrap();
    assert_eq!(
        read(&dir, "a.ts"),
        "import x from '@app/x';\n\nimport z from 'z';\n"
    );
}

#[test]
fn test_overrides_take_precedence_over_file() {
    let dir = workspace(&[(
        CONFIG_FILE_NAME,
        "[tugsort]\nmerge_duplicates = true\nimport_order = [\"^[.]\"]\n",
    )]);
    let mut config = Config::discover(None, dir.path()).unwrap();
    Overrides {
        import_order: Some(vec!["<THIRD_PARTY_MODULES>".to_string()]),
        no_merge: true,
        ..Default::default()
    }
    .apply(&mut config.tugsort);
    assert_eq!(config.tugsort.import_order, vec!["<THIRD_PARTY_MODULES>"]);
    assert!(!config.tugsort.merge_duplicates);
}

#[test]
fn test_invalid_config_maps_to_invalid_arguments() {
    let dir = workspace(&[(CONFIG_FILE_NAME, "[tugsort]\nextensions = 3\n")]);
    let err: TugSortError = Config::discover(None, dir.path()).unwrap_err().into();
    assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
    assert!(err.file().is_some_and(|file| file.ends_with(CONFIG_FILE_NAME)));
}

#[test]
fn test_invalid_pattern_surfaces_per_file() {
    let dir = workspace(&[
        (CONFIG_FILE_NAME, "[tugsort]\nimport_order = [\"(\"]\n"),
        ("a.ts", UNSORTED),
    ]);
    let config = Config::discover(None, dir.path()).unwrap();
    let mut results = cli::sort_files(&[dir.path().join("a.ts")], &config.tugsort);
    let err = cli::take_first_error(&mut results).unwrap();
    assert!(matches!(err, TugSortError::InvalidConfig { .. }));
}

// ============================================================================
// Diff output
// ============================================================================

#[test]
fn test_diff_shows_moved_lines() {
    let dir = workspace(&[("a.ts", UNSORTED)]);
    let results = cli::sort_files(&[dir.path().join("a.ts")], &Config::default().tugsort);
    let diff = results[0].diff();
    assert!(diff.starts_with("--- a/"));
    assert!(diff.contains("@@ -1,3 +1,4 @@"));
    assert!(diff.contains("-import b from 'b';"));
    assert!(diff.contains("+\n"));
}
