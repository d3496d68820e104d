// SPDX-License-Identifier: MIT OR Apache-2.0
//! Deploy orchestrator: Package -> Clone -> Pull -> Activate per repo,
//! after one discovery call (§4.7).

use std::time::Instant;

use async_trait::async_trait;
use erpl_error::Error;

use crate::config::{AppConfig, RepoConfig};

/// Outcome of one orchestration step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Skipped(String),
    Failed(String),
}

/// One named step result within a repo's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub step: String,
    pub outcome: StepOutcome,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoResult {
    pub name: String,
    pub steps: Vec<StepResult>,
    pub success: bool,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployResult {
    pub repos: Vec<RepoResult>,
    pub success: bool,
    pub summary: String,
    pub total_elapsed_ms: u128,
}

/// The backend operations the orchestrator drives; a real implementation
/// wraps `AdtSession`/`erpl-lock`/`erpl-xml`, tests inject a fake (§9
/// mocking seam).
#[async_trait]
pub trait DeployBackend {
    async fn discover(&self) -> Result<(), Error>;
    async fn ensure_package(&self, package: &str) -> Result<StepOutcome, Error>;
    /// Returns the linked repo key when `url` is already registered.
    async fn find_existing_repo(&self, url: &str) -> Result<Option<String>, Error>;
    /// Clones the repo and returns its assigned key.
    async fn clone_repo(&self, repo: &RepoConfig) -> Result<String, Error>;
    async fn pull_repo(&self, key: &str) -> Result<StepOutcome, Error>;
    async fn activate_repo(&self, package: &str) -> Result<StepOutcome, Error>;
}

async fn run_repo(backend: &dyn DeployBackend, repo: &RepoConfig) -> RepoResult {
    let repo_start = Instant::now();
    let mut steps = Vec::new();
    let mut success = true;

    macro_rules! record_step {
        ($name:expr, $outcome:expr, $start:expr) => {{
            let outcome = $outcome;
            let failed = matches!(outcome, StepOutcome::Failed(_));
            steps.push(StepResult { step: $name.to_string(), outcome, elapsed_ms: $start.elapsed().as_millis() });
            failed
        }};
    }

    let step_start = Instant::now();
    let package_outcome = match backend.ensure_package(&repo.package).await {
        Ok(outcome) => outcome,
        Err(e) => StepOutcome::Failed(e.to_string()),
    };
    if record_step!("package", package_outcome, step_start) {
        success = false;
        return RepoResult { name: repo.name.clone(), steps, success, elapsed_ms: repo_start.elapsed().as_millis() };
    }

    let step_start = Instant::now();
    let existing = match backend.find_existing_repo(&repo.url).await {
        Ok(existing) => existing,
        Err(e) => {
            record_step!("clone", StepOutcome::Failed(e.to_string()), step_start);
            return RepoResult { name: repo.name.clone(), steps, success: false, elapsed_ms: repo_start.elapsed().as_millis() };
        }
    };

    let key = match existing {
        Some(key) => {
            record_step!("clone", StepOutcome::Skipped(format!("already linked, key:{key}")), step_start);
            key
        }
        None => match backend.clone_repo(repo).await {
            Ok(key) => {
                record_step!("clone", StepOutcome::Completed, step_start);
                key
            }
            Err(e) => {
                record_step!("clone", StepOutcome::Failed(e.to_string()), step_start);
                return RepoResult { name: repo.name.clone(), steps, success: false, elapsed_ms: repo_start.elapsed().as_millis() };
            }
        },
    };

    let step_start = Instant::now();
    let pull_outcome = match backend.pull_repo(&key).await {
        Ok(outcome) => outcome,
        Err(e) => StepOutcome::Failed(e.to_string()),
    };
    if record_step!("pull", pull_outcome, step_start) {
        success = false;
        return RepoResult { name: repo.name.clone(), steps, success, elapsed_ms: repo_start.elapsed().as_millis() };
    }

    let step_start = Instant::now();
    let activate_outcome = if !repo.activate {
        StepOutcome::Skipped("activate=false".to_string())
    } else {
        match backend.activate_repo(&repo.package).await {
            Ok(outcome) => outcome,
            Err(e) => StepOutcome::Failed(e.to_string()),
        }
    };
    if record_step!("activate", activate_outcome, step_start) {
        success = false;
    }

    RepoResult { name: repo.name.clone(), steps, success, elapsed_ms: repo_start.elapsed().as_millis() }
}

/// Run the full deploy: one discovery call, then Package -> Clone ->
/// Pull -> Activate for every repo in `config.repos`, in the order
/// given (callers pass an already-dependency-sorted list, §4.7).
pub async fn run_deploy(backend: &dyn DeployBackend, config: &AppConfig) -> Result<DeployResult, Error> {
    let start = Instant::now();
    backend.discover().await?;

    let mut repo_results = Vec::with_capacity(config.repos.len());
    for repo in &config.repos {
        repo_results.push(run_repo(backend, repo).await);
    }

    let succeeded = repo_results.iter().filter(|r| r.success).count();
    let failed = repo_results.len() - succeeded;
    let success = failed == 0;
    let summary = format!("{succeeded} succeeded, {failed} failed");

    Ok(DeployResult { repos: repo_results, success, summary, total_elapsed_ms: start.elapsed().as_millis() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionConfig, RepoConfig};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeBackend {
        existing_repos: Mutex<HashMap<String, String>>,
        fail_pull: bool,
    }

    #[async_trait]
    impl DeployBackend for FakeBackend {
        async fn discover(&self) -> Result<(), Error> {
            Ok(())
        }
        async fn ensure_package(&self, _package: &str) -> Result<StepOutcome, Error> {
            Ok(StepOutcome::Completed)
        }
        async fn find_existing_repo(&self, url: &str) -> Result<Option<String>, Error> {
            Ok(self.existing_repos.lock().unwrap().get(url).cloned())
        }
        async fn clone_repo(&self, repo: &RepoConfig) -> Result<String, Error> {
            Ok(format!("KEY_{}", repo.name))
        }
        async fn pull_repo(&self, _key: &str) -> Result<StepOutcome, Error> {
            if self.fail_pull {
                Ok(StepOutcome::Failed("pull failed".to_string()))
            } else {
                Ok(StepOutcome::Completed)
            }
        }
        async fn activate_repo(&self, _package: &str) -> Result<StepOutcome, Error> {
            Ok(StepOutcome::Completed)
        }
    }

    fn sample_config(activate: bool) -> AppConfig {
        AppConfig {
            connection: ConnectionConfig {
                host: "sap.example.com".into(),
                port: 44300,
                https: true,
                client: "100".into(),
                user: "DEV".into(),
                password: "secret".into(),
            },
            repos: vec![RepoConfig {
                name: "test-repo".into(),
                url: "https://github.com/org/repo.git".into(),
                package: "ZTEST".into(),
                branch: None,
                activate,
                depends_on: vec![],
            }],
            log_file: None,
            json_output: false,
            verbose: false,
            quiet: false,
            timeout: 120,
        }
    }

    #[tokio::test]
    async fn deploy_idempotent_clone_skips_when_already_linked() {
        let mut existing = HashMap::new();
        existing.insert("https://github.com/org/repo.git".to_string(), "KEY1".to_string());
        let backend = FakeBackend { existing_repos: Mutex::new(existing), fail_pull: false };

        let result = run_deploy(&backend, &sample_config(true)).await.unwrap();
        assert_eq!(result.summary, "1 succeeded, 0 failed");
        assert!(result.success);

        let repo = &result.repos[0];
        assert_eq!(repo.steps[0].step, "package");
        assert_eq!(repo.steps[0].outcome, StepOutcome::Completed);
        assert_eq!(repo.steps[1].step, "clone");
        assert_eq!(repo.steps[1].outcome, StepOutcome::Skipped("already linked, key:KEY1".to_string()));
        assert_eq!(repo.steps[2].outcome, StepOutcome::Completed);
    }

    #[tokio::test]
    async fn pull_failure_stops_repo_and_skips_activate() {
        let backend = FakeBackend { existing_repos: Mutex::new(HashMap::new()), fail_pull: true };
        let result = run_deploy(&backend, &sample_config(true)).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.summary, "0 succeeded, 1 failed");
        let repo = &result.repos[0];
        assert_eq!(repo.steps.len(), 3);
        assert!(matches!(repo.steps[2].outcome, StepOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn activate_false_is_skipped() {
        let backend = FakeBackend { existing_repos: Mutex::new(HashMap::new()), fail_pull: false };
        let result = run_deploy(&backend, &sample_config(false)).await.unwrap();
        let repo = &result.repos[0];
        assert_eq!(repo.steps[3].outcome, StepOutcome::Skipped("activate=false".to_string()));
    }
}
