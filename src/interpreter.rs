use crate::ExitCode;
use crate::alias::AliasTable;
use crate::builtin;
use crate::env::Environment;
use crate::external;
use crate::lexer;
use crate::pipeline;
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;

const PROMPT: &str = "msh> ";

/// The command interpreter.
///
/// Owns the [`Environment`] and the alias table and processes one input
/// line at a time through [`Interpreter::dispatch`]. The surrounding loop
/// (interactive or not) decides when to stop feeding it lines; nothing in
/// here ever terminates the process.
///
/// Example
/// ```
/// use msh::Interpreter;
/// let mut sh = Interpreter::new();
/// sh.dispatch("alias ll='ls -l'");
/// ```
pub struct Interpreter {
    env: Environment,
    aliases: AliasTable,
}

impl Interpreter {
    /// Create an interpreter with a snapshot of the current process
    /// environment and an empty alias table.
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            aliases: AliasTable::new(),
        }
    }

    /// Handle a single input line.
    ///
    /// Routing order: a line starting with the `alias ` keyword defines an
    /// alias; a line containing `|` runs as a pipeline; anything else is
    /// tokenized, alias-expanded, offered to the builtin dispatcher and
    /// finally executed as an external command. Empty lines are no-ops.
    /// Every failure is reported to the error stream and the interpreter
    /// keeps going.
    pub fn dispatch(&mut self, line: &str) {
        if let Some(definition) = line.strip_prefix("alias ") {
            if let Err(e) = self.aliases.define(definition) {
                eprintln!("msh: {e}");
            }
            return;
        }

        if line.contains('|') {
            if let Err(e) = pipeline::run(&self.env, &self.aliases, line) {
                eprintln!("msh: {e}");
            }
            return;
        }

        let mut argv = lexer::tokenize(line);
        self.aliases.expand(&mut argv);
        if argv.is_empty() {
            return;
        }

        if let Some(result) = builtin::try_builtin(&mut self.env, &argv) {
            if let Err(e) = result {
                eprintln!("msh: {e}");
            }
            return;
        }

        if let Err(e) = external::run(&self.env, &argv) {
            eprintln!("msh: {e}");
        }
    }

    /// Run a pipeline line with the final stage's output captured into
    /// `sink`, returning one exit code per stage.
    ///
    /// The regular [`Interpreter::dispatch`] path wires the final stage to
    /// the interpreter's own standard output; this seam exists for
    /// embedders and tests that want to observe the bytes instead.
    pub fn run_pipeline_captured(
        &self,
        line: &str,
        sink: &mut dyn Write,
    ) -> Result<Vec<ExitCode>> {
        pipeline::run_with_output(&self.env, &self.aliases, line, sink)
    }

    /// Interactive read-eval-print loop.
    ///
    /// Reads one line at a time with a fixed prompt, records history, and
    /// hands every line to [`Interpreter::dispatch`]. Stops on end-of-input,
    /// interrupt, or the literal `quit` line; the dispatch core itself
    /// never makes that call.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;
        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    if line == "quit" {
                        break;
                    }
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str())?;
                    self.dispatch(&line);
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("msh: readline error: {err:?}");
                    break;
                }
            }
        }
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
