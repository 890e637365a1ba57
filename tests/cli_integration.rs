//! CLI integration tests for gorun.
//!
//! These run the full pipeline against a fake `go` toolchain script so no
//! real Go installation is required: `list -json` is answered from a
//! per-project `golist.json` fixture and `build` installs a prewritten
//! shell script into the output directory. Everything here depends on
//! shell scripts and process replacement, hence Unix only.
#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const FAKE_GO: &str = r#"#!/bin/sh
set -e
cmd="$1"; shift
for last; do :; done
case "$cmd" in
  list)
    spec="$last"
    if [ -f "$spec/golist.json" ]; then
      cat "$spec/golist.json"
    else
      echo "go: cannot find package $spec" >&2
      exit 1
    fi
    ;;
  build)
    if [ -n "$GODEBUG" ]; then
      echo "fake-go: GODEBUG leaked into build environment" >&2
      exit 1
    fi
    if [ -z "$GOBIN" ]; then
      echo "fake-go: GOBIN not pinned" >&2
      exit 1
    fi
    out=""
    prev=""
    for a in "$@"; do
      if [ "$prev" = "-o" ]; then out="$a"; fi
      prev="$a"
    done
    spec="$last"
    printf '%s\n' "$@" > "$spec/.build-args"
    if [ -f "$spec/build-fails" ]; then
      echo "fake-go: compile error in $spec" >&2
      exit 1
    fi
    mkdir -p "$out"
    name="$(cat "$spec/program-name")"
    cp "$spec/program" "$out/$name"
    chmod 755 "$out/$name"
    ;;
  get)
    spec="$last"
    if [ -f "$spec/golist.json.fetched" ]; then
      cp "$spec/golist.json.fetched" "$spec/golist.json"
    fi
    ;;
  *)
    echo "fake-go: unknown subcommand $cmd" >&2
    exit 1
    ;;
esac
"#;

/// One temp tree holding the fake toolchain, a staging directory, and test
/// projects.
struct Sandbox {
    tmp: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let fake_go = tmp.path().join("fake-go");
        write_executable(&fake_go, FAKE_GO);
        Sandbox { tmp }
    }

    fn stage_dir(&self) -> PathBuf {
        self.tmp.path().join("stage")
    }

    /// Create a project directory whose fake build installs `program` under
    /// the command name taken from the import path.
    fn project(&self, dir_name: &str, import_path: &str, pkg_name: &str, program: &str) -> PathBuf {
        let dir = self.tmp.path().join(dir_name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("golist.json"),
            format!(
                r#"{{"Dir":"{}","ImportPath":"{import_path}","Name":"{pkg_name}"}}"#,
                dir.display()
            ),
        )
        .unwrap();
        let command_name = import_path.rsplit('/').next().unwrap();
        fs::write(dir.join("program-name"), command_name).unwrap();
        write_executable(&dir.join("program"), program);
        dir
    }

    /// A gorun command wired to the fake toolchain and a private staging
    /// directory, isolated from any real user configuration.
    fn gorun(&self) -> Command {
        let mut cmd = Command::cargo_bin("gorun").unwrap();
        cmd.env("GORUN_GO", self.tmp.path().join("fake-go"))
            .env("GORUN_STAGE_DIR", self.stage_dir())
            .env("GORUN_TTY", "0")
            .env("HOME", self.tmp.path())
            .env("XDG_CONFIG_HOME", self.tmp.path().join("xdg"))
            .env_remove("GORUN_SPLIT")
            .env_remove("GORUN_STAGE")
            .env_remove("GORUN_PREFETCH")
            .env_remove("GODEBUG");
        cmd
    }
}

fn write_executable(path: &Path, contents: &str) {
    use std::os::unix::fs::PermissionsExt;
    fs::write(path, contents).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

// ============================================================================
// end-to-end launch
// ============================================================================

#[test]
fn test_builds_and_execs_hello() {
    let sb = Sandbox::new();
    let proj = sb.project("hello", "example.com/hello", "main", "#!/bin/sh\necho hello\nexit 0\n");

    sb.gorun()
        .args(["--", "."])
        .current_dir(&proj)
        .assert()
        .success()
        .stdout("hello\n")
        .stderr(predicate::str::contains("starting hello"));
}

#[test]
fn test_no_separator_defaults_to_current_directory() {
    let sb = Sandbox::new();
    let proj = sb.project("hello", "example.com/hello", "main", "#!/bin/sh\necho hello\n");

    sb.gorun()
        .current_dir(&proj)
        .assert()
        .success()
        .stdout("hello\n");
}

#[test]
fn test_program_args_are_forwarded_verbatim() {
    let sb = Sandbox::new();
    let proj = sb.project("echoargs", "example.com/echoargs", "main", "#!/bin/sh\necho \"$@\"\n");

    sb.gorun()
        .args(["-x", "--", ".", "--flag", "value"])
        .current_dir(&proj)
        .assert()
        .success()
        .stdout("--flag value\n");

    // The builder flag went to the build command, not the program.
    let build_args = fs::read_to_string(proj.join(".build-args")).unwrap();
    assert!(build_args.lines().any(|l| l == "-x"));
}

#[test]
fn test_argv0_is_the_staged_executable() {
    let sb = Sandbox::new();
    let proj = sb.project("whoami", "example.com/whoami", "main", "#!/bin/sh\necho \"$0\"\n");

    let assert = sb.gorun().args(["--", "."]).current_dir(&proj).assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    // Copy-aside execs the pid-suffixed private copy in the staging dir.
    assert!(stdout.contains("stage/whoami."), "unexpected argv[0]: {stdout}");
}

#[test]
fn test_exit_code_is_passed_through() {
    let sb = Sandbox::new();
    let proj = sb.project("fails", "example.com/fails", "main", "#!/bin/sh\nexit 7\n");

    sb.gorun()
        .args(["--", "."])
        .current_dir(&proj)
        .assert()
        .code(7);
}

#[test]
fn test_program_sees_ambient_environment() {
    let sb = Sandbox::new();
    let proj = sb.project("env", "example.com/env", "main", "#!/bin/sh\necho \"$MARKER:$GODEBUG\"\n");

    // GODEBUG is stripped from the build (the fake toolchain fails if it
    // leaks) but must reach the launched program untouched.
    sb.gorun()
        .args(["--", "."])
        .current_dir(&proj)
        .env("MARKER", "42")
        .env("GODEBUG", "gctrace=1")
        .assert()
        .success()
        .stdout("42:gctrace=1\n");
}

// ============================================================================
// staging strategies
// ============================================================================

#[test]
fn test_copy_aside_leaves_stable_and_private_artifacts() {
    let sb = Sandbox::new();
    let proj = sb.project("hello", "example.com/hello", "main", "#!/bin/sh\necho hello\n");

    sb.gorun().args(["--", "."]).current_dir(&proj).assert().success();

    let stage = sb.stage_dir();
    assert!(stage.join("hello").is_file());
    let private: Vec<_> = fs::read_dir(&stage)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("hello."))
        .collect();
    assert_eq!(private.len(), 1, "expected exactly one pid-suffixed copy");
}

#[test]
fn test_direct_strategy_execs_stable_path() {
    let sb = Sandbox::new();
    let proj = sb.project("hello", "example.com/hello", "main", "#!/bin/sh\necho hello\n");

    sb.gorun()
        .args(["--", "."])
        .current_dir(&proj)
        .env("GORUN_STAGE", "direct")
        .assert()
        .success()
        .stdout("hello\n");

    let entries: Vec<_> = fs::read_dir(sb.stage_dir())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["hello".to_string()]);
}

// ============================================================================
// failure modes
// ============================================================================

#[test]
fn test_compile_error_exits_1_and_stages_nothing() {
    let sb = Sandbox::new();
    let proj = sb.project("broken", "example.com/broken", "main", "#!/bin/sh\necho never\n");
    fs::write(proj.join("build-fails"), "").unwrap();

    sb.gorun()
        .args(["--", "."])
        .current_dir(&proj)
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("compile error"));

    // The staging directory was prepared but no artifact appeared.
    let entries: Vec<_> = fs::read_dir(sb.stage_dir())
        .unwrap()
        .filter_map(Result::ok)
        .collect();
    assert!(entries.is_empty());
}

#[test]
fn test_library_package_is_a_usage_error_before_any_build() {
    let sb = Sandbox::new();
    let proj = sb.project("lib", "example.com/lib", "lib", "#!/bin/sh\necho never\n");

    sb.gorun()
        .args(["--", "."])
        .current_dir(&proj)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a command"));

    // Resolution failed before staging or building anything.
    assert!(!sb.stage_dir().exists());
    assert!(!proj.join(".build-args").exists());
}

#[test]
fn test_missing_package_exits_1() {
    let sb = Sandbox::new();
    fs::create_dir_all(sb.tmp.path().join("empty")).unwrap();

    sb.gorun()
        .args(["--", "./missing"])
        .current_dir(sb.tmp.path().join("empty"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot find package"));
}

#[test]
fn test_ambiguous_listing_is_a_usage_error() {
    let sb = Sandbox::new();
    let proj = sb.project("multi", "example.com/multi", "main", "#!/bin/sh\necho never\n");
    fs::write(
        proj.join("golist.json"),
        r#"{"Dir":"/a","ImportPath":"example.com/a","Name":"main"}
{"Dir":"/b","ImportPath":"example.com/b","Name":"main"}"#,
    )
    .unwrap();

    sb.gorun()
        .args(["--", "."])
        .current_dir(&proj)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("matched 2 packages"));
}

// ============================================================================
// usage surface
// ============================================================================

#[test]
fn test_help_prints_usage_to_stderr() {
    let sb = Sandbox::new();
    sb.gorun()
        .arg("--help")
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_trailing_separator_is_a_usage_error() {
    let sb = Sandbox::new();
    sb.gorun()
        .args(["-x", "--"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected a command package spec"));
}

#[test]
fn test_prefetch_runs_before_resolution() {
    let sb = Sandbox::new();
    let proj = sb.project("fetched", "example.com/fetched", "main", "#!/bin/sh\necho fetched\n");
    // The listing only exists after the fetch step has run.
    fs::rename(proj.join("golist.json"), proj.join("golist.json.fetched")).unwrap();

    sb.gorun()
        .args(["--", "."])
        .current_dir(&proj)
        .env("GORUN_PREFETCH", "1")
        .assert()
        .success()
        .stdout("fetched\n");
}

#[test]
fn test_heuristic_policy_takes_first_non_flag_token() {
    let sb = Sandbox::new();
    let proj = sb.project("echoargs", "example.com/echoargs", "main", "#!/bin/sh\necho \"$@\"\n");

    sb.gorun()
        .args([".", "-v", "serve"])
        .current_dir(&proj)
        .env("GORUN_SPLIT", "heuristic")
        .assert()
        .success()
        .stdout("-v serve\n");
}

// ============================================================================
// gorun-list
// ============================================================================

#[test]
fn test_list_prints_local_command_packages() {
    let sb = Sandbox::new();
    let root = sb.tmp.path().join("tree");
    fs::create_dir_all(root.join("cmd/app")).unwrap();
    fs::create_dir_all(root.join("lib")).unwrap();
    fs::write(root.join("cmd/app/main.go"), "package main\n").unwrap();
    fs::write(root.join("lib/lib.go"), "package lib\n").unwrap();

    Command::cargo_bin("gorun-list")
        .unwrap()
        .arg("./tree/")
        .current_dir(sb.tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("cmd/app"))
        .stdout(predicate::str::contains("lib").not());
}
