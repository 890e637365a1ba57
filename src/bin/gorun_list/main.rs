//! gorun-list - enumerate command packages for completion and help.
//!
//! Given a partial package spec, prints one spec per line for every command
//! package found under the relevant root: the named directory for local
//! specs, otherwise the configured source roots.

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gorun::util::config::gopath;
use gorun::walk::command_dirs;

/// List buildable command packages matching a spec prefix.
#[derive(Parser)]
#[command(name = "gorun-list", version, about)]
struct Cli {
    /// Partial package spec to complete (e.g. `./cmd/` or `example.com/`)
    prefix: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("GORUN_LOG"))
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Complete against the directory portion of the prefix: everything up
    // to the last slash.
    let prefix = cli.prefix.unwrap_or_default();
    let dir_part = match prefix.rfind('/') {
        Some(i) => &prefix[..i],
        None => "",
    };

    if is_local_import(dir_part) {
        print_commands(Path::new(dir_part), Path::new(dir_part), dir_part);
        return;
    }

    for src_dir in source_roots() {
        let walk_root = src_dir.join(dir_part);
        print_commands(&walk_root, &src_dir, "");
    }
}

fn is_local_import(spec: &str) -> bool {
    spec == "." || spec == ".." || spec.starts_with("./") || spec.starts_with("../")
}

/// Ordered source roots symbolic specs are resolved against.
fn source_roots() -> Vec<PathBuf> {
    vec![gopath().join("src")]
}

fn print_commands(walk_root: &Path, src_dir: &Path, prefix: &str) {
    for dir in command_dirs(walk_root) {
        let rel = pathdiff::diff_paths(&dir, src_dir).unwrap_or_else(|| dir.clone());
        let rel = rel.to_string_lossy();
        let spec = if rel == "." || rel.is_empty() {
            prefix.to_string()
        } else if prefix.is_empty() {
            rel.into_owned()
        } else if prefix.ends_with('/') {
            format!("{prefix}{rel}")
        } else {
            format!("{prefix}/{rel}")
        };
        println!("{spec}");
    }
}
