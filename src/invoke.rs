//! Invoking the external build toolchain.
//!
//! The build subprocess's output goes to the controlling terminal when one
//! is available, opened independently of our own stdio so that redirecting
//! the orchestrator does not swallow build diagnostics. Without a terminal
//! both streams fall back to our stderr; stdout stays reserved for the
//! launched program.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::process::Stdio;

use anyhow::Context;

use crate::envfilter::EnvMap;
use crate::error::Error;
use crate::util::process::ProcessBuilder;

/// Run `go build` for `spec`, writing the executable into `staging_dir`.
///
/// The output flag carries a trailing path separator so the toolchain
/// always treats the destination as a directory, even when it does not
/// exist yet.
pub fn build(
    go: &Path,
    builder_flags: &[String],
    spec: &str,
    staging_dir: &Path,
    env: &EnvMap,
    use_tty: bool,
) -> Result<(), Error> {
    let mut out_dir = staging_dir.as_os_str().to_os_string();
    out_dir.push(std::path::MAIN_SEPARATOR_STR);

    let cmd = ProcessBuilder::new(go)
        .arg("build")
        .args(builder_flags)
        .arg("-o")
        .arg(&out_dir)
        .arg(spec)
        .env_map(env.clone());
    tracing::debug!(command = %cmd.display_command(), "building package");

    let (stdout, stderr) = terminal_sinks(use_tty).context("preparing build output streams")?;
    let status = cmd.status_with(stdout, stderr)?;
    if !status.success() {
        return Err(Error::Build {
            command: cmd.display_command(),
            status,
        });
    }
    Ok(())
}

/// Fetch `spec`'s sources before building (optional policy, off by
/// default). The fetch environment pins the install directory to a sentinel
/// so nothing gets installed.
pub fn prefetch(go: &Path, spec: &str, env: &EnvMap) -> Result<(), Error> {
    let cmd = ProcessBuilder::new(go)
        .args(["get", "-d", "--"])
        .arg(spec)
        .env_map(env.clone());
    tracing::debug!(command = %cmd.display_command(), "fetching package");

    let (stdout, stderr) = terminal_sinks(false).context("preparing fetch output streams")?;
    let status = cmd.status_with(stdout, stderr)?;
    if !status.success() {
        return Err(Error::Build {
            command: cmd.display_command(),
            status,
        });
    }
    Ok(())
}

/// Output sinks for a toolchain subprocess: the controlling terminal when
/// requested and available, otherwise a duplicate of our stderr.
fn terminal_sinks(use_tty: bool) -> io::Result<(Stdio, Stdio)> {
    #[cfg(unix)]
    if use_tty {
        if let Ok(tty) = OpenOptions::new().write(true).open("/dev/tty") {
            let second = tty.try_clone()?;
            return Ok((Stdio::from(tty), Stdio::from(second)));
        }
    }
    #[cfg(not(unix))]
    let _ = use_tty;

    let first = stderr_file()?;
    let second = first.try_clone()?;
    Ok((Stdio::from(first), Stdio::from(second)))
}

#[cfg(unix)]
fn stderr_file() -> io::Result<File> {
    use std::os::fd::AsFd;
    Ok(File::from(io::stderr().as_fd().try_clone_to_owned()?))
}

#[cfg(windows)]
fn stderr_file() -> io::Result<File> {
    use std::os::windows::io::AsHandle;
    Ok(File::from(io::stderr().as_handle().try_clone_to_owned()?))
}
