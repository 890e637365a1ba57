//! Discovery of command packages under a source tree.
//!
//! This backs the auxiliary `gorun-list` binary only; the launch path never
//! consults it. Directories named `testdata` and directories whose name
//! starts with `.` or `_` are skipped, matching the toolchain's own
//! conventions for ignored trees.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// Enumerate directories under `root` that hold a command package
/// (non-test `.go` files declaring `package main`), in traversal order.
pub fn command_dirs(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped(e))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .filter(|p| is_command_dir(p))
        .collect()
}

fn is_skipped(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if name == "testdata" || name.starts_with('_') {
        return true;
    }
    name.starts_with('.') && name != "." && name != ".."
}

/// Whether a directory contains a command package: at least one non-test
/// Go file whose package clause is `main`.
fn is_command_dir(dir: &Path) -> bool {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return false,
    };
    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".go") || name.ends_with("_test.go") || name.starts_with('_') {
            continue;
        }
        let Ok(source) = fs::read_to_string(entry.path()) else {
            continue;
        };
        match package_clause(&source) {
            Some("main") => return true,
            Some(_) => return false,
            None => continue,
        }
    }
    false
}

/// Extract the package name from a Go source file, ignoring leading
/// comments.
fn package_clause(source: &str) -> Option<&str> {
    let mut in_block_comment = false;
    for line in source.lines() {
        let line = line.trim();
        if in_block_comment {
            if let Some(rest) = line.split_once("*/").map(|(_, rest)| rest.trim()) {
                in_block_comment = false;
                if let Some(name) = parse_package_line(rest) {
                    return Some(name);
                }
            }
            continue;
        }
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line.starts_with("/*") {
            match line.split_once("*/") {
                Some((_, rest)) => {
                    let rest = rest.trim();
                    if !rest.is_empty() {
                        return parse_package_line(rest);
                    }
                }
                None => in_block_comment = true,
            }
            continue;
        }
        return parse_package_line(line);
    }
    None
}

fn parse_package_line(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("package")?;
    let rest = rest.strip_prefix(char::is_whitespace)?.trim();
    let end = rest
        .find(|c: char| !c.is_alphanumeric() && c != '_')
        .unwrap_or(rest.len());
    let name = &rest[..end];
    (!name.is_empty()).then_some(name)
}
