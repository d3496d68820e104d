// SPDX-License-Identifier: MIT OR Apache-2.0
//! BW repository-node parsing: Atom feeds returned by
//! `GET /sap/bw/modeling/repo/infoproviderstructure/...` and BW search (§4.2).

use erpl_error::{Error, ErrorKind};

use crate::generic::harvest_fields;
use crate::tree::parse_xml_tree;

/// A single BW repository node (an infoarea child, a search hit, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BwNode {
    /// Node URI — from `id`, falling back to `link rel="self" href`.
    pub uri: Option<String>,
    /// Title text, used as a human description.
    pub description: String,
    /// `objectName` property.
    pub object_name: String,
    /// `objectType` property (e.g. `AREA`, `ADSO`, `CUBE`, `ELEM`, ...).
    pub object_type: String,
    /// `objectSubtype` property, when present.
    pub object_subtype: Option<String>,
    /// `objectVersion` property, when present.
    pub object_version: Option<String>,
    /// `objectStatus` property, when present.
    pub object_status: Option<String>,
    /// `objectDesc` property, when present (distinct from the Atom title).
    pub object_desc: Option<String>,
}

impl BwNode {
    /// True for the two container types a traversal recurses into (§4.5).
    pub fn is_container(&self) -> bool {
        matches!(self.object_type.as_str(), "AREA" | "semanticalFolder")
    }
}

/// Parse a BW nodes Atom feed (`feed -> entry`) into typed [`BwNode`]s.
pub fn parse_bw_nodes(xml: &str, endpoint: &str) -> Result<Vec<BwNode>, Error> {
    let tree = parse_xml_tree(xml)
        .map_err(|e| e.into_error("GetNodes", endpoint, ErrorKind::Internal))?;

    let mut entries = Vec::new();
    tree.find_all_descendants("entry", &mut entries);

    let mut out = Vec::new();
    for entry in entries {
        let title = entry
            .child("title")
            .map(|t| t.text_trimmed().to_string())
            .unwrap_or_default();

        let id_uri = entry.child("id").map(|t| t.text_trimmed().to_string());
        let self_href = entry
            .children_named("link")
            .find(|l| l.attr("rel") == Some("self"))
            .and_then(|l| l.attr("href"))
            .map(str::to_string);
        let uri = id_uri.filter(|s| !s.is_empty()).or(self_href);

        let fields = harvest_fields(entry);
        out.push(BwNode {
            uri,
            description: title,
            object_name: fields.get("objectName").cloned().unwrap_or_default(),
            object_type: fields.get("objectType").cloned().unwrap_or_default(),
            object_subtype: fields.get("objectSubtype").cloned().filter(|s| !s.is_empty()),
            object_version: fields.get("objectVersion").cloned().filter(|s| !s.is_empty()),
            object_status: fields.get("objectStatus").cloned().filter(|s| !s.is_empty()),
            object_desc: fields.get("objectDesc").cloned().filter(|s| !s.is_empty()),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_uri_title_and_properties() {
        let xml = r#"
        <feed xmlns="http://www.w3.org/2005/Atom" xmlns:bw="urn:bw">
          <entry>
            <id>/sap/bw/modeling/repo/infoproviderstructure/ADSO/ZFOO</id>
            <title>Foo ADSO</title>
            <link rel="self" href="/sap/bw/modeling/adso/ZFOO/active"/>
            <content>
              <properties bw:objectName="ZFOO" objectType="ADSO" objectStatus="active"/>
            </content>
          </entry>
        </feed>"#;
        let nodes = parse_bw_nodes(xml, "/x").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].object_name, "ZFOO");
        assert_eq!(nodes[0].object_type, "ADSO");
        assert_eq!(nodes[0].description, "Foo ADSO");
        assert_eq!(nodes[0].uri.as_deref(), Some("/sap/bw/modeling/repo/infoproviderstructure/ADSO/ZFOO"));
    }

    #[test]
    fn falls_back_to_self_link_when_id_missing() {
        let xml = r#"
        <feed>
          <entry>
            <title>Area</title>
            <link rel="self" href="/sap/bw/modeling/area/ZAREA"/>
            <properties objectName="ZAREA" objectType="AREA"/>
          </entry>
        </feed>"#;
        let nodes = parse_bw_nodes(xml, "/x").unwrap();
        assert_eq!(nodes[0].uri.as_deref(), Some("/sap/bw/modeling/area/ZAREA"));
        assert!(nodes[0].is_container());
    }
}
