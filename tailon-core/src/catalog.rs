// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Command catalog — typed view over the operator-configured tools.
//!
//! Grounded in `sven-tools/src/registry.rs`'s `ToolRegistry`: a name-keyed
//! lookup table built once at startup and consulted read-only thereafter.
//! Unlike the registry, a `CommandSpec` carries no executable logic itself —
//! it is pure data, expanded into an argv by [`crate::argv`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One configured tool template: `[commands.<name>]` in the TOML config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandSpec {
    /// Name of another `CommandSpec` whose stdout feeds this command's
    /// stdin, or empty when this command reads directly from upstream data.
    #[serde(default)]
    pub stdin: String,
    /// Ordered argv template; entries may be placeholder tokens expanded by
    /// [`crate::argv::expand`].
    pub action: Vec<String>,
    /// Default script shown in the UI for this command, e.g. `.*` for grep.
    #[serde(default)]
    pub default: String,
}

/// Loaded once from configuration; immutable for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    commands: HashMap<String, CommandSpec>,
    /// Operator-configured allow-list of command names exposed to the UI.
    /// The supervisor never consults this itself — only the catalog lookup
    /// matters for what can actually run.
    allowed: Vec<String>,
}

impl Catalog {
    pub fn new(commands: HashMap<String, CommandSpec>, allowed: Vec<String>) -> Self {
        Self { commands, allowed }
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    pub fn default_script(&self, name: &str) -> String {
        self.commands
            .get(name)
            .map(|c| c.default.clone())
            .unwrap_or_default()
    }

    /// Names the operator has chosen to surface in the UI. Used only for
    /// advertising to the frontend; the supervisor validates every incoming
    /// command name against `lookup`, not against this list.
    pub fn names_allowed_by_operator(&self) -> &[String] {
        &self.allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        let mut commands = HashMap::new();
        commands.insert(
            "tail".to_string(),
            CommandSpec {
                stdin: String::new(),
                action: vec![
                    "tail".into(),
                    "-n".into(),
                    "$lines".into(),
                    "-F".into(),
                    "$path".into(),
                ],
                default: String::new(),
            },
        );
        commands.insert(
            "grep".to_string(),
            CommandSpec {
                stdin: "tail".to_string(),
                action: vec![
                    "grep".into(),
                    "--text".into(),
                    "--line-buffered".into(),
                    "--color=never".into(),
                    "-e".into(),
                    "$script".into(),
                ],
                default: ".*".into(),
            },
        );
        Catalog::new(commands, vec!["tail".into(), "grep".into()])
    }

    #[test]
    fn lookup_returns_configured_spec() {
        let catalog = sample();
        let grep = catalog.lookup("grep").unwrap();
        assert_eq!(grep.stdin, "tail");
        assert_eq!(grep.default, ".*");
    }

    #[test]
    fn lookup_missing_command_is_none() {
        let catalog = sample();
        assert!(catalog.lookup("rm").is_none());
    }

    #[test]
    fn names_allowed_by_operator_does_not_gate_lookup() {
        let catalog = Catalog::new(HashMap::new(), vec!["tail".into()]);
        assert!(catalog.lookup("tail").is_none());
        assert_eq!(catalog.names_allowed_by_operator(), &["tail".to_string()]);
    }
}
