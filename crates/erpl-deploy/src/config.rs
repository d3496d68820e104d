// SPDX-License-Identifier: MIT OR Apache-2.0
//! Deploy configuration: YAML loading, CLI-flag overrides, and
//! validation (§4.7).

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating deploy configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    #[error("failed to parse config: {reason}")]
    ParseError { reason: String },

    #[error("config validation failed: {reasons:?}")]
    ValidationError { reasons: Vec<String> },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConnection {
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub https: bool,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_env: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRepo {
    pub name: String,
    pub url: String,
    pub package: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default = "default_activate")]
    pub activate: bool,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

fn default_activate() -> bool {
    true
}

/// The raw on-disk shape, mirroring the YAML fields verbatim (§4.7).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    pub connection: RawConnection,
    #[serde(default)]
    pub repos: Vec<RawRepo>,
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default)]
    pub json_output: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub quiet: bool,
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// CLI-flag overrides; `None` means "not explicitly provided" (§4.7:
/// explicit CLI flags override YAML, not defaults).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub https: Option<bool>,
    pub client: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub json_output: Option<bool>,
    pub verbose: Option<bool>,
    pub quiet: Option<bool>,
    pub timeout: Option<u64>,
    /// Single-repo CLI mode: when set, synthesizes one `RepoConfig`
    /// named `cli-repo`, ignoring `repos` from YAML.
    pub single_repo_url: Option<String>,
    pub single_repo_package: Option<String>,
    pub single_repo_branch: Option<String>,
    pub single_repo_activate: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub https: bool,
    pub client: String,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoConfig {
    pub name: String,
    pub url: String,
    pub package: String,
    pub branch: Option<String>,
    pub activate: bool,
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub connection: ConnectionConfig,
    pub repos: Vec<RepoConfig>,
    pub log_file: Option<String>,
    pub json_output: bool,
    pub verbose: bool,
    pub quiet: bool,
    pub timeout: u64,
}

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Parse a YAML deploy config file.
pub fn load_yaml(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;
    serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError { reason: e.to_string() })
}

/// Apply CLI overrides and validate the result, producing a ready-to-run
/// [`AppConfig`] (§4.7).
pub fn resolve(raw: RawConfig, overrides: &CliOverrides) -> Result<AppConfig, ConfigError> {
    let host = overrides.host.clone().unwrap_or(raw.connection.host);
    let port = overrides.port.unwrap_or(raw.connection.port);
    let https = overrides.https.unwrap_or(raw.connection.https);
    let client = overrides.client.clone().unwrap_or(raw.connection.client);
    let user = overrides.user.clone().unwrap_or(raw.connection.user);
    let raw_password = overrides.password.clone().unwrap_or(raw.connection.password);
    let password_env = raw.connection.password_env.clone();
    let json_output = overrides.json_output.unwrap_or(raw.json_output);
    let verbose = overrides.verbose.unwrap_or(raw.verbose);
    let quiet = overrides.quiet.unwrap_or(raw.quiet);
    let timeout = overrides.timeout.or(raw.timeout).unwrap_or(DEFAULT_TIMEOUT_SECS);

    let repos: Vec<RawRepo> = if let Some(url) = &overrides.single_repo_url {
        vec![RawRepo {
            name: "cli-repo".to_string(),
            url: url.clone(),
            package: overrides.single_repo_package.clone().unwrap_or_default(),
            branch: overrides.single_repo_branch.clone(),
            activate: overrides.single_repo_activate.unwrap_or(true),
            depends_on: Vec::new(),
        }]
    } else {
        raw.repos
    };

    let mut reasons = Vec::new();
    if host.trim().is_empty() {
        reasons.push("connection.host must not be empty".to_string());
    }
    if port == 0 {
        reasons.push("connection.port must be non-zero".to_string());
    }
    if client.trim().is_empty() {
        reasons.push("connection.client must not be empty".to_string());
    }
    if user.trim().is_empty() {
        reasons.push("connection.user must not be empty".to_string());
    }
    if raw_password.is_empty() && password_env.is_none() {
        reasons.push("connection.password or connection.password_env must be set".to_string());
    }
    if repos.is_empty() {
        reasons.push("at least one repo must be configured".to_string());
    }
    if timeout == 0 {
        reasons.push("timeout must be positive".to_string());
    }
    if verbose && quiet {
        reasons.push("verbose and quiet are mutually exclusive".to_string());
    }
    if !reasons.is_empty() {
        return Err(ConfigError::ValidationError { reasons });
    }

    let password = if raw_password.is_empty() {
        let name = password_env.expect("validated above");
        env::var(&name).map_err(|_| ConfigError::ValidationError { reasons: vec![format!("environment variable {name} is not set")] })?
    } else {
        raw_password
    };

    let repos: Vec<RepoConfig> = repos
        .into_iter()
        .map(|r| RepoConfig { name: r.name, url: r.url, package: r.package, branch: r.branch, activate: r.activate, depends_on: r.depends_on })
        .collect();

    Ok(AppConfig {
        connection: ConnectionConfig { host, port, https, client, user, password },
        repos,
        log_file: raw.log_file,
        json_output,
        verbose,
        quiet,
        timeout,
    })
}
