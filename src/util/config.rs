//! Configuration for gorun.
//!
//! Settings come from a global config file, `~/.config/gorun/config.toml`
//! (platform-appropriate location via `directories`), overridden by
//! environment variables:
//!
//! - `GORUN_SPLIT` — `separator` or `heuristic`
//! - `GORUN_STAGE` — `copy-aside` or `direct`
//! - `GORUN_STAGE_DIR` — staging directory override
//! - `GORUN_GO` — toolchain command (name or path)
//! - `GORUN_TTY` — `0`/`false` to disable routing build output to the tty
//! - `GORUN_PREFETCH` — `1`/`true` to run the fetch step before building
//!
//! A malformed config file or override is warned about and ignored; the
//! launcher never fails because of configuration.

use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use crate::args::SplitPolicy;
use crate::stage::StageStrategy;

/// gorun configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Argument splitting policy.
    pub split_policy: SplitPolicy,

    /// Artifact staging strategy.
    pub stage_strategy: StageStrategy,

    /// Staging directory override. Defaults to `$GOPATH/gorun`.
    pub stage_dir: Option<PathBuf>,

    /// Build toolchain command.
    pub go_command: String,

    /// Route build output to the controlling terminal when available.
    pub build_tty: bool,

    /// Fetch the package before building it.
    pub prefetch: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            split_policy: SplitPolicy::default(),
            stage_strategy: StageStrategy::default(),
            stage_dir: None,
            go_command: "go".to_string(),
            build_tty: true,
            prefetch: false,
        }
    }
}

impl Config {
    /// Load the global configuration, apply environment overrides.
    pub fn load() -> Self {
        let config = match config_path() {
            Some(path) => Self::load_or_default(&path),
            None => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Load configuration from a file, falling back to defaults if the file
    /// doesn't exist or doesn't parse.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("failed to read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Apply `GORUN_*` environment overrides on top of this configuration.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var("GORUN_SPLIT") {
            match value.parse() {
                Ok(policy) => self.split_policy = policy,
                Err(e) => tracing::warn!("ignoring GORUN_SPLIT: {}", e),
            }
        }
        if let Ok(value) = std::env::var("GORUN_STAGE") {
            match value.parse() {
                Ok(strategy) => self.stage_strategy = strategy,
                Err(e) => tracing::warn!("ignoring GORUN_STAGE: {}", e),
            }
        }
        if let Ok(value) = std::env::var("GORUN_STAGE_DIR") {
            if !value.is_empty() {
                self.stage_dir = Some(PathBuf::from(value));
            }
        }
        if let Ok(value) = std::env::var("GORUN_GO") {
            if !value.is_empty() {
                self.go_command = value;
            }
        }
        if let Ok(value) = std::env::var("GORUN_TTY") {
            self.build_tty = parse_bool(&value);
        }
        if let Ok(value) = std::env::var("GORUN_PREFETCH") {
            self.prefetch = parse_bool(&value);
        }
        self
    }

    /// The staging directory for built executables.
    pub fn stage_dir(&self) -> PathBuf {
        self.stage_dir
            .clone()
            .unwrap_or_else(|| gopath().join("gorun"))
    }
}

fn parse_bool(value: &str) -> bool {
    !matches!(value, "" | "0" | "false" | "no" | "off")
}

/// Path of the global config file, if a config directory can be determined.
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "gorun").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// The Go workspace root: `$GOPATH`, or `$HOME/go` when unset (the
/// toolchain's own default).
pub fn gopath() -> PathBuf {
    if let Ok(gopath) = std::env::var("GOPATH") {
        if !gopath.is_empty() {
            // GOPATH may be a list; the first entry is where binaries go.
            let first = gopath
                .split(path_list_separator())
                .next()
                .unwrap_or(&gopath);
            return PathBuf::from(first);
        }
    }
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join("go"),
        None => PathBuf::from("go"),
    }
}

fn path_list_separator() -> char {
    if cfg!(windows) {
        ';'
    } else {
        ':'
    }
}
