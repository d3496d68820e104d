// SPDX-License-Identifier: MIT OR Apache-2.0
//! Package node listing and recursive tree walks over
//! `POST .../repository/nodestructure` (§6.1, §6.2 `adt_list_package`,
//! `adt_package_tree`, `adt_package_exists`).

use std::collections::{BTreeSet, VecDeque};

use erpl_error::{Error, ErrorKind};
use erpl_session::AdtSession;
use erpl_types::CiHeaders;
use erpl_xml::bw::misc::build_query_string;
use serde_json::json;

const NODE_TAG_CANDIDATES: &[&str] = &["node", "SEU_ADT_REPOSITORY_OBJ_NODE", "OBJECT"];

struct PackageNode {
    object_type: String,
    object_name: String,
    uri: String,
}

fn parse_package_nodes(xml: &str, endpoint: &str) -> Result<Vec<PackageNode>, Error> {
    let tree = erpl_xml::parse_xml_tree(xml).map_err(|e| e.into_error("ListPackage", endpoint, ErrorKind::Internal))?;
    let mut elements = Vec::new();
    for tag in NODE_TAG_CANDIDATES {
        tree.find_all_descendants(tag, &mut elements);
        if !elements.is_empty() {
            break;
        }
    }
    let mut out = Vec::new();
    for el in elements {
        let fields = erpl_xml::harvest_fields(el);
        let object_type = fields.get("OBJECT_TYPE").or_else(|| fields.get("objectType")).cloned().unwrap_or_default();
        let object_name = fields.get("OBJECT_NAME").or_else(|| fields.get("objectName")).cloned().unwrap_or_default();
        if object_name.is_empty() {
            continue;
        }
        let uri = fields.get("OBJECT_URI").or_else(|| fields.get("uri")).cloned().unwrap_or_default();
        out.push(PackageNode { object_type, object_name, uri });
    }
    Ok(out)
}

async fn fetch_package_nodes(session: &AdtSession, package_name: &str) -> Result<Vec<PackageNode>, Error> {
    let qs = build_query_string(&[("parent_type", "DEVC/K"), ("parent_name", package_name), ("withShortDescriptions", "true")]);
    let path = format!("/sap/bc/adt/repository/nodestructure?{qs}");
    let response = session.post(&path, None, None, &CiHeaders::new()).await?;
    if !response.is_success() {
        return Err(Error::from_http_status("ListPackage", path, response.status_code, response.body, ErrorKind::PackageError));
    }
    parse_package_nodes(&response.body, &path)
}

/// `POST .../nodestructure` for one package, flattened to a JSON list (§6.2 `adt_list_package`).
pub async fn list_package(session: &AdtSession, package_name: &str) -> Result<serde_json::Value, Error> {
    let nodes = fetch_package_nodes(session, package_name).await?;
    Ok(json!({
        "package_name": package_name,
        "objects": nodes.iter().map(|n| json!({
            "object_type": n.object_type,
            "name": n.object_name,
            "uri": n.uri,
        })).collect::<Vec<_>>(),
    }))
}

/// True iff the package's own nodestructure call succeeds (a 404/PackageError means it does not exist).
pub async fn package_exists(session: &AdtSession, package_name: &str) -> Result<serde_json::Value, Error> {
    let exists = match fetch_package_nodes(session, package_name).await {
        Ok(_) => true,
        Err(e) if e.kind == ErrorKind::NotFound || e.kind == ErrorKind::PackageError => false,
        Err(e) => return Err(e),
    };
    Ok(json!({ "package_name": package_name, "exists": exists }))
}

/// BFS over sub-packages (`DEVC/K` children) from `root_package`, collecting
/// every object found down to `max_depth`, optionally restricted to one
/// `type_filter` (§6.2 `adt_package_tree`).
pub async fn package_tree(
    session: &AdtSession,
    root_package: &str,
    type_filter: Option<&str>,
    max_depth: Option<u32>,
) -> Result<serde_json::Value, Error> {
    let max_depth = max_depth.unwrap_or(5);
    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut frontier: VecDeque<(String, u32)> = VecDeque::new();
    frontier.push_back((root_package.to_string(), 0));
    visited.insert(root_package.to_string());

    let mut objects = Vec::new();
    while let Some((package, depth)) = frontier.pop_front() {
        let nodes = fetch_package_nodes(session, &package).await?;
        for node in nodes {
            if node.object_type == "DEVC/K" {
                if depth < max_depth && visited.insert(node.object_name.clone()) {
                    frontier.push_back((node.object_name.clone(), depth + 1));
                }
                continue;
            }
            if let Some(filter) = type_filter {
                if node.object_type != filter {
                    continue;
                }
            }
            objects.push(json!({
                "object_type": node.object_type,
                "name": node.object_name,
                "uri": node.uri,
                "package": package,
            }));
        }
    }

    Ok(json!({
        "root_package": root_package,
        "max_depth": max_depth,
        "objects": objects,
    }))
}
