//! gorun - build a Go command package and replace this process with it.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use gorun::error::Error;
use gorun::launch::Replaced;
use gorun::util::process::find_executable;
use gorun::{args, envfilter, invoke, launch, resolve, stage, Config, ExecPlan};

const USAGE: &str = "\
gorun is an alternative to `go run`: it builds a command package into a
staging directory and execs the result in place.

Usage:
  gorun [go build flags] [--] <package spec> [program arguments]
  gorun -h | --help
";

fn main() {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();

    if raw_args.len() == 1 && (raw_args[0] == "-h" || raw_args[0] == "--help") {
        eprint!("{USAGE}");
        return;
    }

    // Logging is opt-in via GORUN_LOG; user-facing diagnostics always go
    // through the error path below, never through the logger.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("GORUN_LOG"))
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match run(raw_args) {
        Ok(replaced) => match replaced {},
        Err(e) => {
            eprintln!("gorun: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

fn run(raw_args: Vec<String>) -> Result<Replaced, Error> {
    let config = Config::load();

    let parsed = args::split(&raw_args, config.split_policy)?;
    tracing::debug!(?parsed, "parsed invocation");

    let cwd = std::env::current_dir().context("determining working directory")?;
    let spec = args::normalize_package_spec(&parsed.package_spec, &cwd);

    let go = find_executable(&config.go_command).ok_or_else(|| {
        anyhow::anyhow!("build command `{}` not found in PATH", config.go_command)
    })?;

    let ambient = envfilter::ambient();

    // Fetch before resolving, so a remote spec can be resolved at all.
    if config.prefetch {
        invoke::prefetch(&go, &spec, &envfilter::fetch_environment(&ambient))?;
    }

    let resolved = resolve::resolve(&go, &spec, &cwd)?;

    let staging_dir = config.stage_dir();
    stage::prepare(&staging_dir)?;

    let build_env = envfilter::build_environment(&ambient, &staging_dir);
    invoke::build(
        &go,
        &parsed.builder_flags,
        &spec,
        &staging_dir,
        &build_env,
        config.build_tty,
    )?;

    let command_name = resolved.command_name();
    let artifact = stage::stage(&staging_dir, &command_name, config.stage_strategy)?;

    let plan = ExecPlan::new(
        &artifact,
        &parsed.program_args,
        envfilter::exec_environment(&ambient),
    );
    launch::launch(plan, &command_name)
}
