// SPDX-License-Identifier: MIT OR Apache-2.0
//! The real [`DeployBackend`] implementation, wrapping an [`AdtSession`]
//! over the abapGit repository endpoints and the activation endpoint
//! (§4.7, §6.1).

use std::time::Duration;

use async_trait::async_trait;
use erpl_error::{Error, ErrorKind};
use erpl_session::AdtSession;
use erpl_types::CiHeaders;
use erpl_xml::activation::{build_activation_xml, parse_activation_result};
use erpl_xml::inactive::parse_inactive_objects;
use erpl_xml::package::build_package_create_xml;
use erpl_xml::repo::{build_clone_xml, parse_repo_list};

use crate::config::RepoConfig;
use crate::orchestrator::{DeployBackend, StepOutcome};

const REPOS_PATH: &str = "/sap/bc/adt/abapgit/repos";

/// Drives the abapGit and activation endpoints for one session. `poll_timeout`
/// bounds every 202+Location poll this backend issues (§4.3).
pub struct AdtDeployBackend<'a> {
    session: &'a AdtSession,
    poll_timeout: Duration,
}

impl<'a> AdtDeployBackend<'a> {
    pub fn new(session: &'a AdtSession, poll_timeout_secs: u64) -> Self {
        Self { session, poll_timeout: Duration::from_secs(poll_timeout_secs) }
    }

    fn location_of(response: &erpl_types::HttpResponse, operation: &str, endpoint: &str) -> Result<String, Error> {
        response
            .headers
            .get("Location")
            .map(str::to_string)
            .ok_or_else(|| Error::new(operation, endpoint, "202 response missing Location header", ErrorKind::Internal))
    }
}

#[async_trait]
impl<'a> DeployBackend for AdtDeployBackend<'a> {
    async fn discover(&self) -> Result<(), Error> {
        self.session.fetch_csrf_token().await
    }

    async fn ensure_package(&self, package: &str) -> Result<StepOutcome, Error> {
        let check_path = format!("/sap/bc/adt/packages/{}", package.to_lowercase());
        let response = self.session.get(&check_path, &CiHeaders::new()).await?;
        if response.is_success() {
            return Ok(StepOutcome::Skipped(format!("package {package} already exists")));
        }
        if response.status_code != 404 {
            return Err(Error::from_http_status("EnsurePackage", check_path, response.status_code, response.body, ErrorKind::PackageError));
        }

        let body = build_package_create_xml(package, package, None);
        let response = self.session.post("/sap/bc/adt/packages", Some(&body), Some("application/vnd.sap.adt.core+xml"), &CiHeaders::new()).await?;
        if !response.is_success() {
            return Err(Error::from_http_status("EnsurePackage", "/sap/bc/adt/packages", response.status_code, response.body, ErrorKind::PackageError));
        }
        Ok(StepOutcome::Completed)
    }

    async fn find_existing_repo(&self, url: &str) -> Result<Option<String>, Error> {
        let response = self.session.get(REPOS_PATH, &CiHeaders::new()).await?;
        if !response.is_success() {
            return Err(Error::from_http_status("ListRepos", REPOS_PATH, response.status_code, response.body, ErrorKind::CloneError));
        }
        let repos = parse_repo_list(&response.body)?;
        Ok(repos.into_iter().find(|r| r.url == url).map(|r| r.key))
    }

    async fn clone_repo(&self, repo: &RepoConfig) -> Result<String, Error> {
        let branch = repo.branch.as_deref().unwrap_or("refs/heads/main");
        let body = build_clone_xml(&repo.package, &repo.url, branch, None);
        let response = self
            .session
            .post(REPOS_PATH, Some(&body), Some("application/vnd.sap.adt.abapgit.repository.v2+xml"), &CiHeaders::new())
            .await?;
        if response.status_code != 202 {
            return Err(Error::from_http_status("CloneRepo", REPOS_PATH, response.status_code, response.body, ErrorKind::CloneError));
        }
        let location = Self::location_of(&response, "CloneRepo", REPOS_PATH)?;
        let poll = self.session.poll_until_complete(&location, self.poll_timeout).await?;
        let body = match poll {
            erpl_session::PollResult::Completed(body) => body,
            erpl_session::PollResult::Failed(body) => {
                return Err(Error::new("CloneRepo", REPOS_PATH, body, ErrorKind::CloneError));
            }
        };
        let repos = parse_repo_list(&body).unwrap_or_default();
        if let Some(found) = repos.iter().find(|r| r.url == repo.url) {
            return Ok(found.key.clone());
        }
        if let Some(only) = repos.first() {
            tracing::warn!(requested_url = %repo.url, returned_url = %only.url, "clone response's repo url does not match the requested url");
            return Ok(only.key.clone());
        }
        Err(Error::new("CloneRepo", REPOS_PATH, "clone response contained no repository entry", ErrorKind::CloneError))
    }

    async fn pull_repo(&self, key: &str) -> Result<StepOutcome, Error> {
        let path = format!("{REPOS_PATH}/{key}/pull");
        let response = self.session.post(&path, None, None, &CiHeaders::new()).await?;
        if response.status_code != 202 {
            return Err(Error::from_http_status("PullRepo", path, response.status_code, response.body, ErrorKind::PullError));
        }
        let location = Self::location_of(&response, "PullRepo", &path)?;
        match self.session.poll_until_complete(&location, self.poll_timeout).await? {
            erpl_session::PollResult::Completed(_) => Ok(StepOutcome::Completed),
            erpl_session::PollResult::Failed(body) => Err(Error::new("PullRepo", path, body, ErrorKind::PullError)),
        }
    }

    async fn activate_repo(&self, package: &str) -> Result<StepOutcome, Error> {
        let inactive_path = format!("/sap/bc/adt/activation/inactiveobjects?package={package}");
        let response = self.session.get(&inactive_path, &CiHeaders::new()).await?;
        if !response.is_success() {
            return Err(Error::from_http_status("Activate", inactive_path, response.status_code, response.body, ErrorKind::ActivationError));
        }
        let objects = parse_inactive_objects(&response.body)?;
        if objects.is_empty() {
            return Ok(StepOutcome::Skipped("no inactive objects remain".to_string()));
        }
        let body = build_activation_xml(&objects);
        let response = self
            .session
            .post("/sap/bc/adt/activation?method=activate", Some(&body), Some("application/vnd.sap.adt.core+xml"), &CiHeaders::new())
            .await?;
        if response.status_code != 202 {
            return Err(Error::from_http_status("Activate", "/sap/bc/adt/activation", response.status_code, response.body, ErrorKind::ActivationError));
        }
        let location = Self::location_of(&response, "Activate", "/sap/bc/adt/activation")?;
        let body = match self.session.poll_until_complete(&location, self.poll_timeout).await? {
            erpl_session::PollResult::Completed(body) => body,
            erpl_session::PollResult::Failed(body) => {
                return Err(Error::new("Activate", "/sap/bc/adt/activation", body, ErrorKind::ActivationError));
            }
        };
        let result = parse_activation_result(&body)?;
        if result.failed > 0 {
            return Err(Error::new(
                "Activate",
                "/sap/bc/adt/activation",
                format!("{} of {} objects failed activation", result.failed, result.total),
                ErrorKind::ActivationError,
            ));
        }
        Ok(StepOutcome::Completed)
    }
}
