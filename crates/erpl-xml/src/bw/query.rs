// SPDX-License-Identifier: MIT OR Apache-2.0
//! BW query component parsing: a query's InfoProvider and the dimensional
//! refs (characteristics, key figures, variables) it draws on (§4.2).

use std::collections::BTreeSet;

use erpl_error::{Error, ErrorKind};

use super::ObjectRefLite;
use crate::generic::harvest_fields;
use crate::tree::{parse_xml_tree, XmlElement};

/// A single dimensional component of a query (a characteristic, key
/// figure, structure, or variable).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryComponent {
    /// Component kind: `characteristic`, `keyfigure`, `structure`, or
    /// `variable`; taken from the element's own local name.
    pub kind: String,
    /// Position-derived role: `rows`, `columns`, `free` (from
    /// `mainComponent`), `filter` (from `selections`), `member` (from
    /// `defaultHint`), `subcomponent` (from `subComponents`), or
    /// `component` as a fallback when found outside any of those.
    pub role: String,
    /// Technical name (`iobjnm` / `name`).
    pub name: String,
    /// Description text, when present.
    pub description: Option<String>,
    /// Referenced InfoObject type, when present (e.g. for a variable's
    /// underlying characteristic).
    pub reference: Option<String>,
}

/// A parsed BW query detail document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDetail {
    /// The query's technical name.
    pub name: String,
    /// The InfoProvider the query is built on.
    pub info_provider: ObjectRefLite,
    /// All dimensional components found in the document, in document
    /// order, deduplicated by `(kind, role, name)`.
    pub components: Vec<QueryComponent>,
}

const COMPONENT_KINDS: &[&str] = &["characteristic", "keyfigure", "structure", "variable"];

/// The role a container element assigns to everything nested beneath it,
/// per §4.2: `mainComponent → (rows | columns | free)`, `selections`
/// (filter refs), `defaultHint` (member hints), `subComponents` (typed
/// refs).
fn role_for_container(name: &str) -> Option<&'static str> {
    match name {
        "rows" => Some("rows"),
        "columns" => Some("columns"),
        "free" => Some("free"),
        "selections" => Some("filter"),
        "defaultHint" => Some("member"),
        "subComponents" => Some("subcomponent"),
        _ => None,
    }
}

fn collect_components(
    el: &XmlElement,
    role: Option<&'static str>,
    seen: &mut BTreeSet<(String, String, String)>,
    out: &mut Vec<QueryComponent>,
) {
    let inherited_role = role_for_container(el.name.as_str()).or(role);

    if COMPONENT_KINDS.contains(&el.name.as_str()) {
        let fields = harvest_fields(el);
        let kind = el.name.clone();
        let name = fields.get("iobjnm").or_else(|| fields.get("name")).cloned().unwrap_or_default();
        let role = inherited_role.unwrap_or("component").to_string();
        if seen.insert((kind.clone(), role.clone(), name.clone())) {
            out.push(QueryComponent {
                kind,
                role,
                name,
                description: fields.get("description").cloned().filter(|s| !s.is_empty()),
                reference: fields.get("reference").cloned().filter(|s| !s.is_empty()),
            });
        }
    }
    for child in &el.children {
        collect_components(child, inherited_role, seen, out);
    }
}

/// Parse a BW query detail document into its InfoProvider ref and
/// dimensional components.
pub fn parse_query_detail(xml: &str, endpoint: &str) -> Result<QueryDetail, Error> {
    let tree =
        parse_xml_tree(xml).map_err(|e| e.into_error("GetQuery", endpoint, ErrorKind::Internal))?;

    let fields = harvest_fields(&tree);
    let name = fields.get("name").cloned().unwrap_or_default();

    let info_provider = tree
        .find_descendant("infoProvider")
        .map(|el| {
            let ip_fields = harvest_fields(el);
            ObjectRefLite {
                object_type: ip_fields.get("type").cloned().unwrap_or_default(),
                name: ip_fields.get("name").cloned().unwrap_or_default(),
                uri: ip_fields.get("uri").cloned().filter(|s| !s.is_empty()),
            }
        })
        .unwrap_or_default();

    let mut components = Vec::new();
    let mut seen = BTreeSet::new();
    collect_components(&tree, None, &mut seen, &mut components);

    Ok(QueryDetail { name, info_provider, components })
}
