// SPDX-License-Identifier: MIT OR Apache-2.0
//! Unix-standard flag parsing: positionals, `--key value`, `--key=value`,
//! and a closed set of boolean flags that never consume the next token
//! (§4.6, §6.3).

use std::collections::BTreeMap;

/// Boolean flags that never consume a following token, regardless of
/// position (global or per-command).
const BOOLEAN_FLAGS: &[&str] = &[
    "json",
    "https",
    "no-https",
    "no-color",
    "help",
    "version",
    "verbose",
    "quiet",
    "activate",
    "no-activate",
    "stateful",
    "mermaid",
    "include-search-supplement",
    "include-xref-edges",
    "include-elem-provider-edges",
];

fn looks_like_flag(token: &str) -> bool {
    token.starts_with('-') && token.len() > 1 && !token[1..2].chars().next().unwrap_or(' ').is_ascii_digit()
}

/// The result of tokenizing one argv slice: positional arguments in
/// order, and a flat map of flag name (without leading dashes) to value
/// (`"true"` for bare booleans).
#[derive(Debug, Clone, Default)]
pub struct Args {
    pub positionals: Vec<String>,
    pub flags: BTreeMap<String, String>,
}

impl Args {
    pub fn parse(tokens: &[String]) -> Self {
        let mut positionals = Vec::new();
        let mut flags = BTreeMap::new();
        let mut i = 0;
        while i < tokens.len() {
            let tok = tokens[i].as_str();
            if let Some(rest) = tok.strip_prefix("--") {
                if let Some((key, value)) = rest.split_once('=') {
                    flags.insert(key.to_string(), value.to_string());
                    i += 1;
                    continue;
                }
                if BOOLEAN_FLAGS.contains(&rest) {
                    flags.insert(rest.to_string(), "true".to_string());
                    i += 1;
                    continue;
                }
                if i + 1 < tokens.len() && !looks_like_flag(&tokens[i + 1]) {
                    flags.insert(rest.to_string(), tokens[i + 1].clone());
                    i += 2;
                } else {
                    flags.insert(rest.to_string(), "true".to_string());
                    i += 1;
                }
                continue;
            }
            match tok {
                "-h" => {
                    flags.insert("help".to_string(), "true".to_string());
                    i += 1;
                }
                "-v" => {
                    flags.insert("verbose".to_string(), "true".to_string());
                    i += 1;
                }
                "-q" => {
                    flags.insert("quiet".to_string(), "true".to_string());
                    i += 1;
                }
                _ => {
                    positionals.push(tok.to_string());
                    i += 1;
                }
            }
        }
        Args { positionals, flags }
    }

    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }

    pub fn flag_bool(&self, name: &str) -> bool {
        matches!(self.flag(name), Some("true"))
    }

    pub fn flag_u32(&self, name: &str) -> Option<u32> {
        self.flag(name).and_then(|v| v.parse().ok())
    }

    pub fn flag_u16(&self, name: &str) -> Option<u16> {
        self.flag(name).and_then(|v| v.parse().ok())
    }

    pub fn flag_u64(&self, name: &str) -> Option<u64> {
        self.flag(name).and_then(|v| v.parse().ok())
    }

    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positionals.get(index).map(String::as_str)
    }
}
