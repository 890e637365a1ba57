//! Package resolution: turning a package spec into a buildable command
//! package.
//!
//! Resolution shells out to `go list -json` so the toolchain's own rules
//! apply to both local directory specs (`.`, `./cmd/app`) and symbolic
//! import paths searched against the configured source roots. Resolution is
//! a pure read; it never mutates the filesystem.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, ResolveError};
use crate::util::process::ProcessBuilder;

/// A package spec resolved to a concrete command package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    /// Absolute source directory of the package.
    pub source_dir: PathBuf,
    /// Canonical import path.
    pub import_path: String,
    /// Whether the package is a command (`package main`). Always true for
    /// values returned by [`resolve`].
    pub is_command: bool,
}

impl ResolvedPackage {
    /// The name the built executable will carry: the last element of the
    /// import path, falling back to the source directory's basename.
    pub fn command_name(&self) -> String {
        let base = self.import_path.rsplit('/').next().unwrap_or("");
        if !base.is_empty() && base != "." {
            return base.to_string();
        }
        self.source_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "a.out".to_string())
    }
}

/// One object from the `go list -json` output stream.
#[derive(Debug, Deserialize)]
struct ListedPackage {
    #[serde(default, rename = "Dir")]
    dir: PathBuf,
    #[serde(default, rename = "ImportPath")]
    import_path: String,
    #[serde(default, rename = "Name")]
    name: String,
}

/// Resolve `spec` from `cwd` using the toolchain at `go`.
pub fn resolve(go: &Path, spec: &str, cwd: &Path) -> Result<ResolvedPackage, Error> {
    // Local directory specs can be rejected without spawning the toolchain.
    if is_local_spec(spec) && !cwd.join(spec).is_dir() {
        return Err(ResolveError::NotFound {
            spec: spec.to_string(),
        }
        .into());
    }

    let cmd = ProcessBuilder::new(go)
        .args(["list", "-json", "--"])
        .arg(spec)
        .cwd(cwd);
    tracing::debug!(command = %cmd.display_command(), "resolving package");
    let output = cmd.output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(classify_list_failure(spec, &stderr).into());
    }

    parse_list_output(spec, &output.stdout).map_err(Error::from)
}

/// Whether a spec is syntactically a filesystem path rather than an import
/// path.
fn is_local_spec(spec: &str) -> bool {
    spec == "."
        || spec == ".."
        || spec.starts_with("./")
        || spec.starts_with("../")
        || Path::new(spec).is_absolute()
}

/// Map a `go list` failure onto the resolution taxonomy based on its stderr.
fn classify_list_failure(spec: &str, stderr: &str) -> ResolveError {
    if stderr.contains("no Go files") || stderr.contains("no buildable Go source") {
        return ResolveError::NoBuildableUnits {
            spec: spec.to_string(),
        };
    }
    if stderr.contains("cannot find package")
        || stderr.contains("directory not found")
        || stderr.contains("no such file or directory")
        || stderr.contains("is not in")
    {
        return ResolveError::NotFound {
            spec: spec.to_string(),
        };
    }
    ResolveError::Toolchain {
        spec: spec.to_string(),
        message: stderr.trim().to_string(),
    }
}

/// Parse the JSON object stream `go list -json` writes, one object per
/// matched package.
fn parse_list_output(spec: &str, stdout: &[u8]) -> Result<ResolvedPackage, ResolveError> {
    let mut packages = Vec::new();
    for item in serde_json::Deserializer::from_slice(stdout).into_iter::<ListedPackage>() {
        match item {
            Ok(pkg) => packages.push(pkg),
            Err(e) => {
                return Err(ResolveError::Toolchain {
                    spec: spec.to_string(),
                    message: format!("unreadable package listing: {e}"),
                })
            }
        }
    }

    if packages.is_empty() {
        return Err(ResolveError::NotFound {
            spec: spec.to_string(),
        });
    }
    if packages.len() > 1 {
        return Err(ResolveError::Ambiguous {
            spec: spec.to_string(),
            count: packages.len(),
        });
    }

    let pkg = packages.remove(0);
    if pkg.name != "main" {
        return Err(ResolveError::NotExecutable {
            import_path: if pkg.import_path.is_empty() {
                spec.to_string()
            } else {
                pkg.import_path
            },
        });
    }

    let resolved = ResolvedPackage {
        source_dir: pkg.dir,
        import_path: pkg.import_path,
        is_command: true,
    };
    tracing::debug!(?resolved, "resolved package");
    Ok(resolved)
}
