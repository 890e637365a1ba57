//! Splitting the raw invocation into builder flags, a package spec, and
//! program arguments.
//!
//! Two policies exist because the tool historically supported both. The
//! default is [`SplitPolicy::Separator`]: everything before a literal `--`
//! goes to `go build`, the token after it is the package spec, and the rest
//! belongs to the launched program. Without a `--`, the spec defaults to `.`
//! and all tokens are treated as builder flags.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How the raw argument vector is partitioned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitPolicy {
    /// A literal `--` separates builder flags from the package spec.
    #[default]
    Separator,
    /// The first token not starting with `-` is the package spec; `--`
    /// still acts as an explicit separator when it comes first.
    Heuristic,
}

impl std::str::FromStr for SplitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "separator" => Ok(SplitPolicy::Separator),
            "heuristic" => Ok(SplitPolicy::Heuristic),
            other => Err(format!(
                "unknown split policy `{other}` (expected `separator` or `heuristic`)"
            )),
        }
    }
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitPolicy::Separator => write!(f, "separator"),
            SplitPolicy::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// The partitioned invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInvocation {
    /// Flags forwarded verbatim to the build command.
    pub builder_flags: Vec<String>,
    /// The package to build and launch. Defaults to `"."`.
    pub package_spec: String,
    /// Arguments forwarded to the launched program.
    pub program_args: Vec<String>,
}

/// Split `args` (excluding the program name) according to `policy`.
///
/// A trailing `--` with nothing after it is a usage error under either
/// policy.
pub fn split(args: &[String], policy: SplitPolicy) -> Result<ParsedInvocation, Error> {
    match policy {
        SplitPolicy::Separator => split_separator(args),
        SplitPolicy::Heuristic => split_heuristic(args),
    }
}

fn split_at_separator(args: &[String], i: usize) -> Result<ParsedInvocation, Error> {
    if i + 1 >= args.len() {
        return Err(Error::usage(
            "expected a command package spec after `--`",
        ));
    }
    Ok(ParsedInvocation {
        builder_flags: args[..i].to_vec(),
        package_spec: args[i + 1].clone(),
        program_args: args[i + 2..].to_vec(),
    })
}

fn split_separator(args: &[String]) -> Result<ParsedInvocation, Error> {
    match args.iter().position(|a| a == "--") {
        Some(i) => split_at_separator(args, i),
        // No separator: build the current directory, everything is a flag.
        None => Ok(ParsedInvocation {
            builder_flags: args.to_vec(),
            package_spec: ".".to_string(),
            program_args: Vec::new(),
        }),
    }
}

fn split_heuristic(args: &[String]) -> Result<ParsedInvocation, Error> {
    for (i, arg) in args.iter().enumerate() {
        if arg == "--" {
            return split_at_separator(args, i);
        }
        if !arg.starts_with('-') {
            return Ok(ParsedInvocation {
                builder_flags: args[..i].to_vec(),
                package_spec: arg.clone(),
                program_args: args[i + 1..].to_vec(),
            });
        }
    }
    Ok(ParsedInvocation {
        builder_flags: args.to_vec(),
        package_spec: ".".to_string(),
        program_args: Vec::new(),
    })
}

/// Rewrite an absolute package spec relative to `cwd`.
///
/// The toolchain resolves relative specs against package roots, not the
/// filesystem root, so a spec like `/home/me/proj` must become `./proj`
/// (or similar) before it is handed over. Relative specs pass through
/// untouched.
pub fn normalize_package_spec(spec: &str, cwd: &Path) -> String {
    let path = Path::new(spec);
    if !path.is_absolute() {
        return spec.to_string();
    }
    match pathdiff::diff_paths(path, cwd) {
        Some(rel) => {
            let rel = rel.to_string_lossy().into_owned();
            // Only a `./` or `../` lead marks the result as a local path; a
            // bare `.config/tool` would be read as an import path.
            if rel == "." || rel == ".." || rel.starts_with("./") || rel.starts_with("../") {
                rel
            } else {
                format!("./{rel}")
            }
        }
        None => spec.to_string(),
    }
}
