//! The terminal step: replacing the current process image with the staged
//! executable.

use std::path::PathBuf;
use std::process::Command;

use crate::envfilter::EnvMap;
use crate::error::Error;
use crate::stage::StagedArtifact;

/// Everything the final exec needs. Consumed exactly once.
#[derive(Debug, Clone)]
pub struct ExecPlan {
    /// The staged executable.
    pub executable: PathBuf,
    /// Full argument vector; `argv[0]` is the executable path.
    pub argv: Vec<String>,
    /// Environment for the launched program.
    pub environ: EnvMap,
}

impl ExecPlan {
    /// Assemble the plan for a staged artifact.
    pub fn new(artifact: &StagedArtifact, program_args: &[String], environ: EnvMap) -> Self {
        let executable = artifact.final_path.clone();
        let mut argv = Vec::with_capacity(program_args.len() + 1);
        argv.push(executable.to_string_lossy().into_owned());
        argv.extend(program_args.iter().cloned());
        ExecPlan {
            executable,
            argv,
            environ,
        }
    }
}

/// Witness that the process image was replaced. Never constructed: on
/// success control does not return, so this type is uninhabited and the
/// only observable result of [`launch`] is its error.
#[derive(Debug)]
pub enum Replaced {}

/// Replace the current process image according to `plan`.
///
/// A single line naming the command goes to stderr first, so a program that
/// prints nothing at startup does not look like a hung build. On platforms
/// without process replacement this falls back to spawn-and-wait and exits
/// with the child's code.
pub fn launch(plan: ExecPlan, command_name: &str) -> Result<Replaced, Error> {
    eprintln!("gorun: starting {command_name}");
    tracing::debug!(executable = %plan.executable.display(), argv = ?plan.argv, "replacing process image");

    let mut cmd = Command::new(&plan.executable);
    cmd.args(&plan.argv[1..]).env_clear().envs(&plan.environ);

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.arg0(&plan.argv[0]);
        // Returns only on failure.
        let source = cmd.exec();
        Err(exec_error(plan, source))
    }

    #[cfg(not(unix))]
    {
        match cmd.status() {
            Ok(status) => std::process::exit(status.code().unwrap_or(1)),
            Err(source) => Err(exec_error(plan, source)),
        }
    }
}

fn exec_error(plan: ExecPlan, source: std::io::Error) -> Error {
    let environ = plan
        .environ
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    Error::Exec {
        path: plan.executable,
        argv: plan.argv,
        environ,
        source,
    }
}
