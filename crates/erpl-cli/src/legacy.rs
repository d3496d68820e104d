// SPDX-License-Identifier: MIT OR Apache-2.0
//! Legacy deploy orchestrator subcommands: `deploy | status | pull | activate`
//! (§4.6 dispatch step 6, §4.7). Reached only when the first token is not
//! `login`, `logout`, `mcp`, or a new-style group name.

use std::path::PathBuf;

use erpl_deploy::{AdtDeployBackend, CliOverrides, RawConfig, StepOutcome, load_yaml, resolve, run_deploy, sort_repos_by_dependency};
use erpl_error::{Error, ErrorKind};
use erpl_session::{AdtSession, SessionConfig};
use erpl_types::SapClient;
use serde_json::{Value, json};

use crate::args::Args;

pub const LEGACY_SUBCOMMANDS: &[&str] = &["deploy", "status", "pull", "activate"];

fn overrides_from_args(args: &Args) -> CliOverrides {
    CliOverrides {
        host: args.flag("host").map(str::to_string),
        port: args.flag_u16("port"),
        https: if args.flag_bool("https") {
            Some(true)
        } else if args.flag_bool("no-https") {
            Some(false)
        } else {
            None
        },
        client: args.flag("client").map(str::to_string),
        user: args.flag("user").map(str::to_string),
        password: args.flag("password").map(str::to_string),
        json_output: if args.flag_bool("json") { Some(true) } else { None },
        verbose: if args.flag_bool("verbose") { Some(true) } else { None },
        quiet: if args.flag_bool("quiet") { Some(true) } else { None },
        timeout: args.flag_u64("timeout"),
        single_repo_url: args.flag("url").map(str::to_string),
        single_repo_package: args.flag("package").map(str::to_string),
        single_repo_branch: args.flag("branch").map(str::to_string),
        single_repo_activate: if args.flag_bool("activate") {
            Some(true)
        } else if args.flag_bool("no-activate") {
            Some(false)
        } else {
            None
        },
    }
}

fn config_error(e: erpl_deploy::ConfigError) -> Error {
    Error::new("LoadConfig", "", e.to_string(), ErrorKind::Internal)
}

/// Run one legacy subcommand, returning the JSON-serializable result that
/// the caller formats identically to new-style group output.
pub async fn dispatch(subcommand: &str, args: &Args) -> Result<Value, Error> {
    let config_path = PathBuf::from(args.flag("config").unwrap_or("deploy.yaml"));
    let raw: RawConfig = if config_path.exists() {
        load_yaml(&config_path).map_err(config_error)?
    } else {
        RawConfig::default()
    };
    let overrides = overrides_from_args(args);
    let app_config = resolve(raw, &overrides).map_err(config_error)?;
    let sorted = sort_repos_by_dependency(app_config.repos.clone())
        .map_err(|e| Error::new("SortRepos", "", e.to_string(), ErrorKind::Internal))?;

    let sap_client = SapClient::parse(&app_config.connection.client).map_err(|e| Error::new("BuildSession", "", e.to_string(), ErrorKind::Connection))?;
    let session_config = SessionConfig::new(app_config.connection.host.clone(), app_config.connection.port, app_config.connection.https, sap_client)
        .with_credentials(app_config.connection.user.clone(), app_config.connection.password.clone());
    let session = AdtSession::new(session_config)?;
    let backend = AdtDeployBackend::new(&session, app_config.timeout);

    match subcommand {
        "deploy" => {
            let mut config = app_config;
            config.repos = sorted;
            let result = run_deploy(&backend, &config).await?;
            Ok(json!({
                "success": result.success,
                "summary": result.summary,
                "total_elapsed_ms": result.total_elapsed_ms,
                "repos": result.repos.iter().map(repo_result_json).collect::<Vec<_>>(),
            }))
        }
        "status" => {
            backend.discover().await?;
            let mut repos = Vec::new();
            for repo in &sorted {
                let key = backend.find_existing_repo(&repo.url).await?;
                repos.push(json!({ "name": repo.name, "url": repo.url, "linked": key.is_some(), "key": key }));
            }
            Ok(json!({ "repos": repos }))
        }
        "pull" => {
            backend.discover().await?;
            let mut repos = Vec::new();
            for repo in &sorted {
                let outcome = match backend.find_existing_repo(&repo.url).await? {
                    Some(key) => backend.pull_repo(&key).await?,
                    None => StepOutcome::Failed("repo is not cloned yet".to_string()),
                };
                repos.push(json!({ "name": repo.name, "outcome": outcome_json(&outcome) }));
            }
            Ok(json!({ "repos": repos }))
        }
        "activate" => {
            backend.discover().await?;
            let mut repos = Vec::new();
            for repo in &sorted {
                let outcome = backend.activate_repo(&repo.package).await?;
                repos.push(json!({ "name": repo.name, "outcome": outcome_json(&outcome) }));
            }
            Ok(json!({ "repos": repos }))
        }
        other => Err(Error::new("ParseArgs", "", format!("unknown deploy subcommand: {other}"), ErrorKind::Internal)),
    }
}

fn outcome_json(outcome: &StepOutcome) -> Value {
    match outcome {
        StepOutcome::Completed => json!({ "status": "completed" }),
        StepOutcome::Skipped(reason) => json!({ "status": "skipped", "reason": reason }),
        StepOutcome::Failed(reason) => json!({ "status": "failed", "reason": reason }),
    }
}

fn repo_result_json(repo: &erpl_deploy::RepoResult) -> Value {
    json!({
        "name": repo.name,
        "success": repo.success,
        "elapsed_ms": repo.elapsed_ms,
        "steps": repo.steps.iter().map(|s| json!({ "step": s.step, "outcome": outcome_json(&s.outcome), "elapsed_ms": s.elapsed_ms })).collect::<Vec<_>>(),
    })
}
