use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Mutable, explicitly-passed view of the process environment.
///
/// The environment contains:
/// - `vars`: a map of environment variables made visible to executed
///   commands.
/// - `current_dir`: the working directory for command execution, kept in
///   sync with the real process directory by the `cd` builtin.
///
/// There is exactly one instance, owned by the interpreter and handed by
/// reference to whatever needs it; nothing in this crate keeps hidden
/// global state.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// This copies variables from `std::env::vars()` and initializes
    /// `current_dir` from `std::env::current_dir()`.
    pub fn new() -> Self {
        let mut vars = HashMap::new();
        for (k, v) in stdenv::vars() {
            vars.insert(k, v);
        }
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { vars, current_dir }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to
    /// `std::env::var` for keys set after the snapshot was taken.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env as stdenv;

    #[test]
    fn set_and_get_var() {
        let mut env = Environment {
            vars: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap(),
        };

        // initially absent
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");

        assert_eq!(env.get_var("KEY"), Some("VALUE".to_string()));
    }

    #[test]
    fn reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
    }
}
