// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Typed configuration — TOML file merged with CLI flag overrides.
//!
//! Adapted from `sven-node/src/config.rs`'s typed-defaults/serde pattern,
//! simplified to a single optional file (no layered search-path merge: the
//! spec calls for one `--config` file, not the node's multi-path YAML
//! lookup) and built-in defaults matching
//! `examples/original_source/main.go`'s `defaultTomlConfig` exactly, so a
//! config-free run behaves like the original.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tailon_core::{CommandSpec, FileSpec};

/// Top-level configuration, deserialized from TOML and then overlaid with
/// CLI flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title: String,
    #[serde(rename = "relative-root")]
    pub relative_root: String,
    #[serde(rename = "listen-addr")]
    pub listen_addr: Vec<String>,
    #[serde(rename = "allow-download")]
    pub allow_download: bool,
    #[serde(rename = "allow-commands")]
    pub allow_commands: Vec<String>,
    pub commands: HashMap<String, CommandSpec>,
    /// Never populated from TOML; filled in from CLI positional arguments
    /// after loading.
    #[serde(skip)]
    pub filespecs: Vec<FileSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "tailon".to_string(),
            relative_root: String::new(),
            listen_addr: vec!["0.0.0.0:8080".to_string()],
            allow_download: false,
            allow_commands: vec![
                "tail".to_string(),
                "grep".to_string(),
                "sed".to_string(),
                "awk".to_string(),
            ],
            commands: default_commands(),
            filespecs: Vec::new(),
        }
    }
}

/// The built-in tail/grep/sed/awk catalog, ported from
/// `examples/original_source/main.go`'s `defaultTomlConfig`.
fn default_commands() -> HashMap<String, CommandSpec> {
    let mut commands = HashMap::new();

    commands.insert(
        "tail".to_string(),
        CommandSpec {
            stdin: String::new(),
            action: vec_of(&["tail", "-n", "$lines", "-F", "$path"]),
            default: String::new(),
        },
    );
    commands.insert(
        "grep".to_string(),
        CommandSpec {
            stdin: "tail".to_string(),
            action: vec_of(&[
                "grep",
                "--text",
                "--line-buffered",
                "--color=never",
                "-e",
                "$script",
            ]),
            default: ".*".to_string(),
        },
    );
    commands.insert(
        "sed".to_string(),
        CommandSpec {
            stdin: "tail".to_string(),
            action: vec_of(&["sed", "-u", "-e", "$script"]),
            default: "s/.*/&/".to_string(),
        },
    );
    commands.insert(
        "awk".to_string(),
        CommandSpec {
            stdin: "tail".to_string(),
            action: vec_of(&["awk", "--sandbox", "$script"]),
            default: "{print $0; fflush()}".to_string(),
        },
    );

    commands
}

fn vec_of(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

/// Load configuration: built-in defaults, optionally overridden by a TOML
/// file, then overlaid with CLI flags. Matches the precedence described in
/// the external-interfaces contract (file narrows/extends defaults, CLI
/// flags win last).
pub fn load(
    config_path: Option<&Path>,
    bind: &[String],
    relative_root: &str,
    allow_download: bool,
    filespecs: Vec<FileSpec>,
) -> anyhow::Result<Config> {
    let mut config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("reading config {}: {e}", path.display()))?;
            toml::from_str(&text)
                .map_err(|e| anyhow::anyhow!("parsing config {}: {e}", path.display()))?
        }
        None => Config::default(),
    };

    if !bind.is_empty() {
        config.listen_addr = bind.to_vec();
    }
    if !relative_root.is_empty() {
        config.relative_root = relative_root.to_string();
    }
    config.allow_download = config.allow_download || allow_download;
    config.filespecs = filespecs;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_original_catalog() {
        let config = Config::default();
        let grep = config.commands.get("grep").unwrap();
        assert_eq!(grep.stdin, "tail");
        assert_eq!(grep.default, ".*");
        assert_eq!(config.listen_addr, vec!["0.0.0.0:8080".to_string()]);
    }

    #[test]
    fn toml_file_overrides_title_and_keeps_default_commands() {
        let toml_text = r#"
            title = "my-logs"
            listen-addr = ["127.0.0.1:9000"]
        "#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tailon.toml");
        std::fs::write(&path, toml_text).unwrap();

        let config = load(Some(&path), &[], "", false, Vec::new()).unwrap();
        assert_eq!(config.title, "my-logs");
        assert_eq!(config.listen_addr, vec!["127.0.0.1:9000".to_string()]);
        assert!(config.commands.contains_key("tail"));
    }

    #[test]
    fn cli_bind_flag_overrides_config_file() {
        let config = load(None, &["127.0.0.1:1".to_string()], "", false, Vec::new()).unwrap();
        assert_eq!(config.listen_addr, vec!["127.0.0.1:1".to_string()]);
    }
}
