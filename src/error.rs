//! Error taxonomy for a single launch attempt.
//!
//! Every failure surfaces at the top of `main` as one of these variants;
//! there is no recovery anywhere in the pipeline. Each variant maps to the
//! process exit code the user observes.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Exit code for internal and toolchain failures.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for malformed invocations and other user errors.
pub const EXIT_USAGE: i32 = 2;

/// Failure to turn a package spec into a buildable command package.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No directory or importable package matched the spec.
    #[error("cannot find package `{spec}`")]
    NotFound { spec: String },

    /// The directory exists but contains no compilable Go source.
    #[error("`{spec}` contains no buildable Go source")]
    NoBuildableUnits { spec: String },

    /// The package resolved to a library, not a command.
    #[error("package `{import_path}` is not a command (not package main)")]
    NotExecutable { import_path: String },

    /// The spec matched more than one package.
    #[error("`{spec}` matched {count} packages, expected exactly one")]
    Ambiguous { spec: String, count: usize },

    /// `go list` failed in a way we could not classify.
    #[error("listing `{spec}`: {message}")]
    Toolchain { spec: String, message: String },
}

impl ResolveError {
    /// Whether the failure stems from user input rather than the environment.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            ResolveError::NotExecutable { .. } | ResolveError::Ambiguous { .. }
        )
    }
}

/// Top-level error for one orchestration run.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed command line; nothing was spawned.
    #[error("{message}")]
    Usage { message: String },

    /// Package resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The external build command exited non-zero. Its own diagnostics have
    /// already streamed to the terminal.
    #[error("`{command}` failed ({status})")]
    Build { command: String, status: ExitStatus },

    /// Filesystem failure creating or copying the staged artifact.
    #[error("staging artifact: {source:#}")]
    Stage {
        #[source]
        source: anyhow::Error,
    },

    /// The final process replacement failed.
    #[error(
        "cannot exec `{}` [argv={argv:?}, environ={environ:?}]: {source}",
        .path.display()
    )]
    Exec {
        path: PathBuf,
        argv: Vec<String>,
        environ: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    /// Anything else: working-directory lookup, toolchain discovery, spawn
    /// failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Error::Usage {
            message: message.into(),
        }
    }

    /// The process exit code this error terminates with.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage { .. } => EXIT_USAGE,
            Error::Resolve(e) if e.is_usage() => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}
