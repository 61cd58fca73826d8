//! User-defined command aliases.

use anyhow::{Result, anyhow, bail};
use regex::Regex;
use std::sync::LazyLock;

use crate::lexer;

/// Maximum number of aliases the table will hold.
pub(crate) const MAX_ALIASES: usize = 20;

/// Shape of an alias definition: `name='literal command text'`.
///
/// The name must be non-empty and contain neither `=` nor whitespace; the
/// body must be wrapped in exactly one outermost pair of single quotes.
/// The unquoted form is rejected rather than stored, since it is ambiguous
/// for multi-word bodies.
static DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^=\s]+)='(.*)'$").unwrap());

/// One stored alias: a name and the literal replacement text.
#[derive(Debug, Clone)]
struct Alias {
    name: String,
    command: String,
}

/// Ordered, bounded table of aliases, owned by the interpreter.
///
/// Names are unique within the table; redefining a name overwrites its body
/// in place and leaves the positions of other entries unchanged. A
/// definition past [`MAX_ALIASES`] is rejected without touching existing
/// entries. Entries live for the whole run and are never deleted.
#[derive(Debug, Default)]
pub(crate) struct AliasTable {
    entries: Vec<Alias>,
}

impl AliasTable {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parses and stores one definition, given the text after the `alias `
    /// keyword. A malformed definition or a full table is an error, and
    /// neither mutates the table.
    pub(crate) fn define(&mut self, definition: &str) -> Result<()> {
        let caps = DEFINITION
            .captures(definition)
            .ok_or_else(|| anyhow!("alias: expected name='command', got `{definition}`"))?;
        let name = &caps[1];
        let command = &caps[2];

        if let Some(existing) = self.entries.iter_mut().find(|a| a.name == name) {
            existing.command = command.to_owned();
            return Ok(());
        }
        if self.entries.len() >= MAX_ALIASES {
            bail!("alias: table full ({MAX_ALIASES} entries), ignoring `{name}`");
        }
        self.entries.push(Alias {
            name: name.to_owned(),
            command: command.to_owned(),
        });
        Ok(())
    }

    /// Stored replacement text for `name`, quotes already stripped.
    pub(crate) fn lookup(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.command.as_str())
    }

    /// If `argv[0]` names a stored alias, re-tokenize its body and replace
    /// the whole vector with it.
    ///
    /// Arguments typed after the alias invocation are dropped, not
    /// appended: the body fully replaces the invocation. The same policy
    /// applies on the single-command and pipeline paths.
    pub(crate) fn expand(&self, argv: &mut Vec<String>) {
        let Some(first) = argv.first() else { return };
        if let Some(command) = self.lookup(first) {
            *argv = lexer::tokenize(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn define_strips_quotes() {
        let mut table = AliasTable::new();
        table.define("ll='ls -l'").unwrap();
        assert_eq!(table.lookup("ll"), Some("ls -l"));
    }

    #[test]
    fn redefinition_overwrites_in_place() {
        let mut table = AliasTable::new();
        table.define("first='a'").unwrap();
        table.define("second='b'").unwrap();
        table.define("first='c'").unwrap();

        assert_eq!(table.entries.len(), 2);
        assert_eq!(table.entries[0].name, "first");
        assert_eq!(table.entries[0].command, "c");
        assert_eq!(table.entries[1].name, "second");
        assert_eq!(table.entries[1].command, "b");
    }

    #[test]
    fn table_is_bounded() {
        let mut table = AliasTable::new();
        for i in 0..MAX_ALIASES {
            table.define(&format!("a{i}='cmd{i}'")).unwrap();
        }
        assert!(table.define("overflow='x'").is_err());
        assert_eq!(table.entries.len(), MAX_ALIASES);
        assert_eq!(table.lookup("overflow"), None);

        // redefinition still works at capacity
        table.define("a0='changed'").unwrap();
        assert_eq!(table.lookup("a0"), Some("changed"));
        assert_eq!(table.entries.len(), MAX_ALIASES);
    }

    #[test]
    fn malformed_definitions_are_rejected() {
        let mut table = AliasTable::new();
        // missing quote wrapper
        assert!(table.define("ll=ls -l").is_err());
        // missing '='
        assert!(table.define("ll").is_err());
        // empty name
        assert!(table.define("='ls'").is_err());
        // whitespace in name
        assert!(table.define("l l='ls'").is_err());
        assert!(table.entries.is_empty());
    }

    #[test]
    fn body_keeps_inner_quote_characters() {
        let mut table = AliasTable::new();
        table.define("say='echo it''s'").unwrap();
        assert_eq!(table.lookup("say"), Some("echo it''s"));
    }

    #[test]
    fn expand_replaces_the_whole_vector() {
        let mut table = AliasTable::new();
        table.define("ll='ls -l'").unwrap();

        let mut args = argv(&["ll"]);
        table.expand(&mut args);
        assert_eq!(args, argv(&["ls", "-l"]));

        // extra invocation arguments are dropped, not appended
        let mut args = argv(&["ll", "-a"]);
        table.expand(&mut args);
        assert_eq!(args, argv(&["ls", "-l"]));
    }

    #[test]
    fn expand_leaves_unknown_commands_alone() {
        let table = AliasTable::new();
        let mut args = argv(&["ls", "-l"]);
        table.expand(&mut args);
        assert_eq!(args, argv(&["ls", "-l"]));

        let mut empty: Vec<String> = Vec::new();
        table.expand(&mut empty);
        assert!(empty.is_empty());
    }
}
