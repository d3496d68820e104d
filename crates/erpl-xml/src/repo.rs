// SPDX-License-Identifier: MIT OR Apache-2.0
//! abapGit repository list parsing and repo clone/pull request builders (§4.2).

use erpl_error::{Error, ErrorKind};

use crate::generic::harvest_fields;
use crate::tree::parse_xml_tree;

/// Repository activation/link status, normalized from the single-letter
/// `abapgitrepo:status` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStatus {
    /// Status code `A`.
    Active,
    /// Status code `E`.
    Error,
    /// Any other code (`I`, `C`, or unrecognized).
    Inactive,
}

impl RepoStatus {
    /// Map a single-letter SAP status code.
    pub fn from_code(code: &str) -> Self {
        match code {
            "A" => RepoStatus::Active,
            "E" => RepoStatus::Error,
            _ => RepoStatus::Inactive,
        }
    }
}

/// A single abapGit repository entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    /// Opaque repository key assigned by the server.
    pub key: String,
    /// The linked repository URL.
    pub url: String,
    /// Linked ABAP package.
    pub package: String,
    /// Linked branch name, if reported.
    pub branch: Option<String>,
    /// Normalized status.
    pub status: RepoStatus,
}

/// Parse the abapGit repository list response into typed entries.
pub fn parse_repo_list(xml: &str) -> Result<Vec<RepoInfo>, Error> {
    let tree = parse_xml_tree(xml)
        .map_err(|e| e.into_error("ListRepos", "/sap/bc/adt/abapgit/repos", ErrorKind::Internal))?;

    let mut out = Vec::new();
    let mut repo_elements = Vec::new();
    tree.find_all_descendants("repository", &mut repo_elements);
    if repo_elements.is_empty() {
        // Some servers emit `entry` (Atom) wrappers instead.
        tree.find_all_descendants("entry", &mut repo_elements);
    }

    for repo_el in repo_elements {
        let fields = harvest_fields(repo_el);
        let key = fields.get("key").cloned().unwrap_or_default();
        if key.is_empty() {
            continue;
        }
        let status_code = fields.get("status").cloned().unwrap_or_default();
        out.push(RepoInfo {
            key,
            url: fields.get("url").cloned().unwrap_or_default(),
            package: fields.get("package").cloned().unwrap_or_default(),
            branch: fields.get("branch_name").or_else(|| fields.get("branchName")).cloned(),
            status: RepoStatus::from_code(&status_code),
        });
    }
    Ok(out)
}

/// Build the request body XML for `POST /sap/bc/adt/abapgit/repos` (clone).
pub fn build_clone_xml(package: &str, url: &str, branch: &str, transport: Option<&str>) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<abapgitrepo:repository xmlns:abapgitrepo="http://www.sap.com/adt/abapgit/repositories">
  <abapgitrepo:package>{package}</abapgitrepo:package>
  <abapgitrepo:url>{url}</abapgitrepo:url>
  <abapgitrepo:branchName>{branch}</abapgitrepo:branchName>
  <abapgitrepo:transportRequest>{transport}</abapgitrepo:transportRequest>
  <abapgitrepo:remoteUser/>
  <abapgitrepo:remotePassword/>
</abapgitrepo:repository>"#,
        package = escape(package),
        url = escape(url),
        branch = escape(branch),
        transport = transport.map(escape).unwrap_or_default(),
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
