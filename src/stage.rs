//! Artifact staging: where built executables land and which file the
//! launcher execs.
//!
//! The staging directory is shared by every invocation, with no locking.
//! Under [`StageStrategy::CopyAside`] (the default) each run execs a
//! private, process-id-suffixed copy of the stable artifact, so a
//! concurrent rebuild of the same package can never mutate the file another
//! running instance was launched from. [`StageStrategy::Direct`] execs the
//! stable path itself and is best-effort under concurrency.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::util::fs::{copy_executable, ensure_binary_dir};

/// How the built executable is handed to the launcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStrategy {
    /// Exec a process-private copy of the stable artifact.
    #[default]
    CopyAside,
    /// Exec the stable artifact in place. A concurrent rebuild of the same
    /// package races the loader; opt in only when that is acceptable.
    Direct,
}

impl std::str::FromStr for StageStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "copy-aside" => Ok(StageStrategy::CopyAside),
            "direct" => Ok(StageStrategy::Direct),
            other => Err(format!(
                "unknown stage strategy `{other}` (expected `copy-aside` or `direct`)"
            )),
        }
    }
}

impl fmt::Display for StageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageStrategy::CopyAside => write!(f, "copy-aside"),
            StageStrategy::Direct => write!(f, "direct"),
        }
    }
}

/// A staged executable, ready to exec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedArtifact {
    /// The file the launcher execs.
    pub final_path: PathBuf,
    /// The package-named file the build wrote (also the content cache for
    /// copy-aside).
    pub stable_name: String,
}

/// The stable artifact name for a command: its name plus the platform's
/// executable suffix.
pub fn stable_name(command_name: &str) -> String {
    format!("{command_name}{}", std::env::consts::EXE_SUFFIX)
}

/// Create the staging directory (and parents) if absent.
pub fn prepare(staging_dir: &Path) -> Result<(), Error> {
    ensure_binary_dir(staging_dir).map_err(|source| Error::Stage { source })
}

/// Produce the artifact to exec after a successful build of
/// `command_name` into `staging_dir`.
pub fn stage(
    staging_dir: &Path,
    command_name: &str,
    strategy: StageStrategy,
) -> Result<StagedArtifact, Error> {
    let stable_name = stable_name(command_name);
    let stable_path = staging_dir.join(&stable_name);
    if !stable_path.is_file() {
        return Err(Error::Stage {
            source: anyhow::anyhow!(
                "build did not produce {}",
                stable_path.display()
            ),
        });
    }

    let final_path = match strategy {
        StageStrategy::Direct => stable_path,
        StageStrategy::CopyAside => {
            let private_name = format!(
                "{command_name}.{}{}",
                std::process::id(),
                std::env::consts::EXE_SUFFIX
            );
            let private_path = staging_dir.join(private_name);
            copy_executable(&stable_path, &private_path)
                .with_context(|| format!("staging {}", stable_path.display()))
                .map_err(|source| Error::Stage { source })?;
            private_path
        }
    };

    tracing::debug!(path = %final_path.display(), %strategy, "staged artifact");
    Ok(StagedArtifact {
        final_path,
        stable_name,
    })
}
