//! Which changed files the compliance pass looks at.

use std::path::Path;

use crate::config::GatekeeperConfig;
use crate::effects::{FileChange, FileStatus};

/// The changed files of a PR, split for the compliance pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualifiedFiles {
    /// Source files to analyze.
    pub sources: Vec<FileChange>,
    /// Whether any companion test file is among the changes.
    pub has_test_file: bool,
}

/// Splits a PR's changed files into analyzable sources and the test-file flag.
///
/// A file is analyzed when it is added or modified, has the configured source
/// extension, is outside the ignored directories, and is neither a companion
/// test nor a dunder module such as `__init__.py`.
pub fn qualify_files(config: &GatekeeperConfig, files: &[FileChange]) -> QualifiedFiles {
    let mut qualified = QualifiedFiles::default();

    for file in files {
        if file.status == FileStatus::Removed || !has_extension(&file.filename, config) {
            continue;
        }
        if is_companion_test(&file.filename) {
            qualified.has_test_file = true;
            continue;
        }
        if !matches!(file.status, FileStatus::Added | FileStatus::Modified)
            || GatekeeperConfig::is_under_any(&file.filename, &config.ignored_dirs)
            || is_dunder_module(&file.filename)
        {
            continue;
        }
        qualified.sources.push(file.clone());
    }

    qualified
}

/// Changed files without any extension, outside the allow-listed directories.
pub fn extensionless_files(config: &GatekeeperConfig, files: &[FileChange]) -> Vec<String> {
    files
        .iter()
        .filter(|file| file.status != FileStatus::Removed)
        .filter(|file| Path::new(&file.filename).extension().is_none())
        .filter(|file| {
            !GatekeeperConfig::is_under_any(&file.filename, &config.extensionless_allowed_dirs)
        })
        .map(|file| file.filename.clone())
        .collect()
}

/// `test_<name>.py` or `<name>_test.py`.
pub fn is_companion_test(filename: &str) -> bool {
    let path = Path::new(filename);
    let base = path.file_name().and_then(|s| s.to_str()).unwrap_or_default();
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    base.starts_with("test_") || stem.ends_with("_test")
}

fn has_extension(filename: &str, config: &GatekeeperConfig) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == config.source_extension)
}

fn is_dunder_module(filename: &str) -> bool {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.starts_with("__") && stem.ends_with("__"))
}
