//! Resolution and execution of external programs.

use crate::ExitCode;
use crate::env::Environment;
use anyhow::{Context, Result};
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Candidate directories for program resolution, checked in order.
pub(crate) const SEARCH_DIRS: [&str; 2] = ["/bin", "/usr/bin"];

/// True for regular files with at least one execute permission bit set.
fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Searches `dirs` in order for an executable regular file named `name`;
/// the first match wins.
pub(crate) fn resolve_in<'a, I>(dirs: I, name: &str) -> Option<PathBuf>
where
    I: IntoIterator<Item = &'a Path>,
{
    dirs.into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// Resolves a program name against the fixed candidate directories.
pub(crate) fn resolve(name: &str) -> Option<PathBuf> {
    resolve_in(SEARCH_DIRS.iter().map(Path::new), name)
}

/// Resolves `argv[0]` and runs it to completion as a single child process,
/// blocking until that one child terminates.
///
/// When the program cannot be resolved, a diagnostic goes to the error
/// stream and the call returns exit code 127 without creating any process.
/// A spawn failure (resource exhaustion) is an error for the caller to
/// report; the command is abandoned without executing.
pub(crate) fn run(env: &Environment, argv: &[String]) -> Result<ExitCode> {
    let (name, args) = argv.split_first().context("empty command")?;

    let Some(program) = resolve(name) else {
        eprintln!("msh: command not found: {name}");
        return Ok(127);
    };

    let status = Command::new(&program)
        .arg0(name)
        .args(args)
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&env.current_dir)
        .spawn()
        .with_context(|| format!("failed to spawn {}", program.display()))?
        .wait()
        .with_context(|| format!("failed to wait for {}", program.display()))?;

    Ok(exit_code(status))
}

/// Maps a wait status to a shell-style exit code.
pub(crate) fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(code) => code,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> ExitCode {
    -1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{lock_current_dir, make_unique_temp_dir};
    use std::fs;
    use std::fs::File;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolve_finds_sh_in_a_system_directory() {
        let found = resolve("sh").expect("expected to find sh in /bin or /usr/bin");
        assert!(found.ends_with("sh"));
        assert!(
            SEARCH_DIRS.iter().any(|dir| found.starts_with(dir)),
            "unexpected resolution {:?}",
            found
        );
    }

    #[test]
    fn resolve_misses_unknown_names() {
        assert!(resolve("definitely_not_a_real_program_msh").is_none());
    }

    #[test]
    fn resolve_in_requires_the_execute_bit() {
        let temp = make_unique_temp_dir("resolve_exec").expect("temp dir");
        let candidate = temp.join("tool");
        File::create(&candidate).expect("create candidate");

        assert_eq!(resolve_in([temp.as_path()], "tool"), None);

        fs::set_permissions(&candidate, fs::Permissions::from_mode(0o755)).expect("chmod");
        assert_eq!(resolve_in([temp.as_path()], "tool"), Some(candidate));

        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn resolve_in_first_match_wins() {
        let first = make_unique_temp_dir("resolve_first").expect("temp dir");
        let second = make_unique_temp_dir("resolve_second").expect("temp dir");
        for dir in [&first, &second] {
            let candidate = dir.join("tool");
            File::create(&candidate).expect("create candidate");
            fs::set_permissions(&candidate, fs::Permissions::from_mode(0o755)).expect("chmod");
        }

        let found = resolve_in([first.as_path(), second.as_path()], "tool");
        assert_eq!(found, Some(first.join("tool")));

        let _ = fs::remove_dir_all(&first);
        let _ = fs::remove_dir_all(&second);
    }

    #[test]
    fn resolve_in_ignores_directories() {
        let temp = make_unique_temp_dir("resolve_dir").expect("temp dir");
        fs::create_dir(temp.join("tool")).expect("create dir candidate");
        assert_eq!(resolve_in([temp.as_path()], "tool"), None);
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn run_reports_the_child_exit_code() {
        let _lock = lock_current_dir();
        let env = Environment::new();
        assert_eq!(run(&env, &args(&["true"])).unwrap(), 0);
        assert_eq!(run(&env, &args(&["false"])).unwrap(), 1);
    }

    #[test]
    fn run_returns_127_without_spawning_for_unknown_programs() {
        let _lock = lock_current_dir();
        let env = Environment::new();
        let code = run(&env, &args(&["definitely_not_a_real_program_msh"])).unwrap();
        assert_eq!(code, 127);
    }
}
