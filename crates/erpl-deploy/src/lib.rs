// SPDX-License-Identifier: MIT OR Apache-2.0
//! Deploy configuration, dependency ordering, and orchestration for
//! pushing BW/ABAP repos through Package -> Clone -> Pull -> Activate.

pub mod backend;
pub mod config;
pub mod orchestrator;
pub mod toposort;

pub use backend::AdtDeployBackend;
pub use config::{AppConfig, CliOverrides, ConfigError, ConnectionConfig, RawConfig, RepoConfig, load_yaml, resolve};
pub use orchestrator::{DeployBackend, DeployResult, RepoResult, StepOutcome, StepResult, run_deploy};
pub use toposort::{SortError, sort_repos_by_dependency};
