// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dependency ordering of repos via Kahn's algorithm with stable
//! tie-breaking (§4.7).

use std::collections::{BTreeMap, VecDeque};

use crate::config::RepoConfig;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SortError {
    #[error("duplicate repo name: {0}")]
    DuplicateName(String),
    #[error("repo {repo} depends on unknown repo {target}")]
    UnknownDependency { repo: String, target: String },
    #[error("dependency cycle among repos: {0:?}")]
    Cycle(Vec<String>),
}

/// Topologically sort `repos` by `depends_on`, breaking ties by original
/// input order (Kahn's algorithm). Idempotent: sorting an already-sorted
/// list returns it unchanged (§8).
pub fn sort_repos_by_dependency(repos: Vec<RepoConfig>) -> Result<Vec<RepoConfig>, SortError> {
    let mut index_by_name: BTreeMap<String, usize> = BTreeMap::new();
    for (i, repo) in repos.iter().enumerate() {
        if index_by_name.insert(repo.name.clone(), i).is_some() {
            return Err(SortError::DuplicateName(repo.name.clone()));
        }
    }

    for repo in &repos {
        for dep in &repo.depends_on {
            if !index_by_name.contains_key(dep) {
                return Err(SortError::UnknownDependency { repo: repo.name.clone(), target: dep.clone() });
            }
        }
    }

    let n = repos.len();
    let mut in_degree = vec![0usize; n];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, repo) in repos.iter().enumerate() {
        for dep in &repo.depends_on {
            let dep_idx = index_by_name[dep];
            dependents[dep_idx].push(i);
            in_degree[i] += 1;
        }
    }

    // Stable tie-breaking: always pick the lowest original index among
    // ready nodes.
    let mut ready: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut ordered_indices = Vec::with_capacity(n);

    while !ready.is_empty() {
        let mut ready_vec: Vec<usize> = ready.drain(..).collect();
        ready_vec.sort_unstable();
        for idx in ready_vec {
            ordered_indices.push(idx);
            for &dependent in &dependents[idx] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push_back(dependent);
                }
            }
        }
    }

    if ordered_indices.len() != n {
        let participants: Vec<String> = (0..n)
            .filter(|i| !ordered_indices.contains(i))
            .map(|i| repos[i].name.clone())
            .collect();
        return Err(SortError::Cycle(participants));
    }

    let mut by_index: Vec<Option<RepoConfig>> = repos.into_iter().map(Some).collect();
    Ok(ordered_indices.into_iter().map(|i| by_index[i].take().unwrap()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, depends_on: &[&str]) -> RepoConfig {
        RepoConfig {
            name: name.to_string(),
            url: format!("https://example.com/{name}.git"),
            package: "Z".to_string(),
            branch: None,
            activate: true,
            depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn orders_dependencies_before_dependents() {
        let repos = vec![repo("c", &["a", "b"]), repo("a", &[]), repo("b", &["a"])];
        let sorted = sort_repos_by_dependency(repos).unwrap();
        let names: Vec<&str> = sorted.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn idempotent_on_already_sorted_input() {
        let repos = vec![repo("a", &[]), repo("b", &["a"]), repo("c", &["a", "b"])];
        let once = sort_repos_by_dependency(repos).unwrap();
        let twice = sort_repos_by_dependency(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn duplicate_names_error() {
        let repos = vec![repo("a", &[]), repo("a", &[])];
        assert_eq!(sort_repos_by_dependency(repos).unwrap_err(), SortError::DuplicateName("a".to_string()));
    }

    #[test]
    fn unknown_dependency_target_errors() {
        let repos = vec![repo("a", &["ghost"])];
        let err = sort_repos_by_dependency(repos).unwrap_err();
        assert_eq!(err, SortError::UnknownDependency { repo: "a".to_string(), target: "ghost".to_string() });
    }

    #[test]
    fn cycle_is_detected_and_lists_participants() {
        let repos = vec![repo("a", &["b"]), repo("b", &["a"])];
        let err = sort_repos_by_dependency(repos).unwrap_err();
        match err {
            SortError::Cycle(mut names) => {
                names.sort();
                assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
            }
            _ => panic!("expected cycle error"),
        }
    }
}
