//! Environment derivation for the build subprocess and the final exec.
//!
//! All transforms here are pure functions over an explicit map; the ambient
//! process environment is captured once in `main` and never mutated in
//! place.

use std::collections::BTreeMap;
use std::path::Path;

/// Environment mapping. Ordered so diagnostics render deterministically.
pub type EnvMap = BTreeMap<String, String>;

/// Runtime-debug variable stripped from toolchain subprocesses so its noise
/// does not end up in build diagnostics.
pub const DEBUG_NOISE_VAR: &str = "GODEBUG";

/// The toolchain's install-directory variable.
pub const INSTALL_DIR_VAR: &str = "GOBIN";

/// Sentinel install directory meaning "do not install anywhere useful",
/// used for the prefetch step where only sources should be touched.
pub const NO_INSTALL_SENTINEL: &str = "/dev/null";

/// Capture the current process environment.
pub fn ambient() -> EnvMap {
    std::env::vars().collect()
}

/// Environment for the build subprocess: ambient minus debug noise, with
/// the install directory pinned to the staging directory regardless of what
/// the ambient environment says.
pub fn build_environment(ambient: &EnvMap, staging_dir: &Path) -> EnvMap {
    let mut env = ambient.clone();
    env.remove(DEBUG_NOISE_VAR);
    env.insert(
        INSTALL_DIR_VAR.to_string(),
        staging_dir.to_string_lossy().into_owned(),
    );
    env
}

/// Environment for the optional prefetch step: ambient minus debug noise,
/// with the install directory pinned to a do-not-install sentinel.
pub fn fetch_environment(ambient: &EnvMap) -> EnvMap {
    let mut env = ambient.clone();
    env.remove(DEBUG_NOISE_VAR);
    env.insert(
        INSTALL_DIR_VAR.to_string(),
        NO_INSTALL_SENTINEL.to_string(),
    );
    env
}

/// Environment for the final exec: the ambient environment verbatim. The
/// launched program must observe exactly what the orchestrator received.
pub fn exec_environment(ambient: &EnvMap) -> EnvMap {
    ambient.clone()
}
