//! Execution of `a | b | c` pipelines.
//!
//! Each stage runs as its own child process. Stage `i` reads what stage
//! `i - 1` writes through an OS pipe; the first stage inherits the
//! interpreter's standard input and the last its standard output. Pipe
//! handles are owned values moved into the spawn calls, so every end is
//! closed by drop on every path, including failed stages. The parent only
//! shepherds descriptor lifetime and never touches pipeline data itself.

use crate::ExitCode;
use crate::alias::AliasTable;
use crate::env::Environment;
use crate::external;
use crate::lexer;
use anyhow::Result;
use std::io::{self, Write};
use std::os::unix::process::CommandExt;
use std::process::{Child, ChildStdout, Command, Stdio};

/// A pipeline slot: either a live child or a stage that never produced one.
enum Slot {
    Spawned(Child),
    Failed(ExitCode),
}

/// Runs a pipeline line, wiring the final stage to the interpreter's own
/// standard output. Returns one exit code per stage, in order, after every
/// spawned child has been waited for.
pub(crate) fn run(env: &Environment, aliases: &AliasTable, line: &str) -> Result<Vec<ExitCode>> {
    run_inner(env, aliases, line, None)
}

/// Runs a pipeline line with the final stage's standard output drained into
/// `sink` instead of the interpreter's own.
///
/// The output is read to end-of-stream before any child is waited on, so a
/// full pipe can never deadlock the wait. This is the observation seam used
/// by the tests.
pub(crate) fn run_with_output(
    env: &Environment,
    aliases: &AliasTable,
    line: &str,
    sink: &mut dyn Write,
) -> Result<Vec<ExitCode>> {
    run_inner(env, aliases, line, Some(sink))
}

fn run_inner(
    env: &Environment,
    aliases: &AliasTable,
    line: &str,
    mut sink: Option<&mut dyn Write>,
) -> Result<Vec<ExitCode>> {
    let stages = lexer::split_stages(line);
    let mut argvs = Vec::with_capacity(stages.len());
    for stage in &stages {
        let mut argv = lexer::tokenize(stage);
        aliases.expand(&mut argv);
        argvs.push(argv);
    }

    let last = argvs.len().saturating_sub(1);
    let mut slots: Vec<Slot> = Vec::with_capacity(argvs.len());
    let mut prev: Option<ChildStdout> = None;
    let mut spawn_err: Option<anyhow::Error> = None;

    for (i, argv) in argvs.iter().enumerate() {
        // The previous stage's read end either feeds this stage or is
        // dropped at the end of this iteration, so an upstream writer
        // always observes a closed pipe.
        let stdin = match prev.take() {
            Some(read_end) => Stdio::from(read_end),
            None if i == 0 => Stdio::inherit(),
            None => Stdio::null(),
        };

        let Some((name, args)) = argv.split_first() else {
            // only reachable through an alias with an empty body
            eprintln!("msh: empty command in pipeline");
            slots.push(Slot::Failed(127));
            continue;
        };
        let Some(program) = external::resolve(name) else {
            eprintln!("msh: command not found: {name}");
            slots.push(Slot::Failed(127));
            continue;
        };

        let mut command = Command::new(&program);
        command
            .arg0(name)
            .args(args)
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .stdin(stdin);
        if i < last || sink.is_some() {
            command.stdout(Stdio::piped());
        } else {
            command.stdout(Stdio::inherit());
        }

        match command.spawn() {
            Ok(mut child) => {
                if i < last {
                    prev = child.stdout.take();
                }
                slots.push(Slot::Spawned(child));
            }
            Err(e) => {
                // abandon the remaining spawns; children already running
                // are still waited for below
                spawn_err = Some(
                    anyhow::Error::new(e)
                        .context(format!("failed to spawn {}", program.display())),
                );
                slots.push(Slot::Failed(126));
                break;
            }
        }
    }
    drop(prev);

    if let Some(sink) = sink.as_deref_mut() {
        if let Some(Slot::Spawned(child)) = slots.last_mut() {
            if let Some(mut out) = child.stdout.take() {
                if let Err(e) = io::copy(&mut out, sink) {
                    eprintln!("msh: failed to drain pipeline output: {e}");
                }
            }
        }
    }

    let mut codes = Vec::with_capacity(slots.len());
    for slot in &mut slots {
        match slot {
            Slot::Spawned(child) => match child.wait() {
                Ok(status) => codes.push(external::exit_code(status)),
                Err(e) => {
                    eprintln!("msh: failed to wait for pipeline stage: {e}");
                    codes.push(-1);
                }
            },
            Slot::Failed(code) => codes.push(*code),
        }
    }

    match spawn_err {
        Some(e) => Err(e),
        None => Ok(codes),
    }
}
