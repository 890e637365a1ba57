//! gorun - build a Go command package and exec into it.
//!
//! This crate provides the library behind the `gorun` binary: it splits the
//! invocation into builder flags, a package spec, and program arguments,
//! resolves the spec to a command package, builds it with the external `go`
//! toolchain into a staging directory, and finally replaces the current
//! process image with the freshly built executable.

pub mod args;
pub mod envfilter;
pub mod error;
pub mod invoke;
pub mod launch;
pub mod resolve;
pub mod stage;
pub mod util;
pub mod walk;

pub use args::{ParsedInvocation, SplitPolicy};
pub use envfilter::EnvMap;
pub use error::{Error, ResolveError};
pub use launch::{ExecPlan, Replaced};
pub use resolve::ResolvedPackage;
pub use stage::{StageStrategy, StagedArtifact};
pub use util::config::Config;
