//! Commands executed inside the interpreter's own process.
//!
//! The only builtin is `cd`: changing the working directory of a child
//! process would be lost when it exits, so it has to run in-process.

use crate::ExitCode;
use crate::env::Environment;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env as stdenv;
use std::fs;
use std::path::PathBuf;

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided (or the target is `~`), changes to the
/// directory named by the HOME environment variable.
pub(crate) struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub(crate) target: Option<String>,
}

impl Cd {
    pub(crate) fn execute(self, env: &mut Environment) -> Result<ExitCode> {
        let target = match self.target.as_deref() {
            Some(t) if !t.is_empty() && t != "~" => PathBuf::from(t),
            _ => PathBuf::from(
                env.get_var("HOME")
                    .context("cd: no target and HOME not set")?,
            ),
        };

        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: can't canonicalize {}", new_dir.display()))?;

        stdenv::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(0)
    }
}

/// Runs `argv` as a builtin if its name matches one.
///
/// Returns `None` when `argv[0]` is not a builtin, so the caller falls
/// through to external execution. `Some(Err(..))` is a builtin that was
/// recognized but failed; the command counts as handled either way and must
/// never also be executed externally.
pub(crate) fn try_builtin(env: &mut Environment, argv: &[String]) -> Option<Result<ExitCode>> {
    let (name, rest) = argv.split_first()?;
    match name.as_str() {
        "cd" => {
            let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
            Some(match Cd::from_args(&[name.as_str()], &rest) {
                Ok(cd) => cd.execute(env),
                Err(EarlyExit { output, status }) => {
                    // argh routes both --help and usage errors here.
                    println!("{output}");
                    Ok(if status.is_err() { 1 } else { 0 })
                }
            })
        }
        _ => None,
    }
}
