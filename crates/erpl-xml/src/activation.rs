// SPDX-License-Identifier: MIT OR Apache-2.0
//! Activation result parsing and the `adtcore:objectReferences` request
//! builder (§4.2).

use erpl_error::{Error, ErrorKind};

use crate::generic::harvest_fields;
use crate::tree::parse_xml_tree;

/// A single object reference used both to request activation and to report
/// remaining inactive objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectReference {
    /// ADT object type (`CATEGORY/SUBCATEGORY`).
    pub object_type: String,
    /// Object name.
    pub name: String,
    /// Object URI.
    pub uri: String,
}

/// Outcome of an activation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationResult {
    /// Number of objects successfully activated.
    pub activated: usize,
    /// Number of objects that failed activation.
    pub failed: usize,
    /// Total objects considered (`activated + failed`, §8 invariant).
    pub total: usize,
    /// Object references still inactive after this run, if the response
    /// reports them.
    pub remaining_inactive: Vec<ObjectReference>,
}

/// Parse an activation result body. Counts `E`/`A` severity messages as
/// failures (§9 open question: this heuristic may misreport if SAP changes
/// severity semantics, isolated here so that only this function need change).
pub fn parse_activation_result(xml: &str) -> Result<ActivationResult, Error> {
    let tree = parse_xml_tree(xml)
        .map_err(|e| e.into_error("Activate", "/sap/bc/adt/activation", ErrorKind::Internal))?;

    let mut messages = Vec::new();
    tree.find_all_descendants("msg", &mut messages);
    if messages.is_empty() {
        tree.find_all_descendants("message", &mut messages);
    }

    let mut message_failed = 0usize;
    for msg in &messages {
        let fields = harvest_fields(msg);
        let severity = fields
            .get("type")
            .or_else(|| fields.get("severity"))
            .cloned()
            .unwrap_or_default();
        if severity == "E" || severity == "A" {
            message_failed += 1;
        }
    }
    let activated = messages.len() - message_failed;

    let mut remaining_inactive = Vec::new();
    let mut refs = Vec::new();
    tree.find_all_descendants("ref", &mut refs);
    for r in &refs {
        let fields = harvest_fields(r);
        remaining_inactive.push(ObjectReference {
            object_type: fields.get("type").cloned().unwrap_or_default(),
            name: fields.get("name").cloned().unwrap_or_default(),
            uri: fields.get("uri").cloned().unwrap_or_default(),
        });
    }
    let failed = message_failed + remaining_inactive.len();
    let total = activated + failed;

    Ok(ActivationResult {
        activated,
        failed,
        total,
        remaining_inactive,
    })
}

/// Build the `adtcore:objectReferences` XML body for an activation request.
pub fn build_activation_xml(objects: &[ObjectReference]) -> String {
    let mut body = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<adtcore:objectReferences xmlns:adtcore=\"http://www.sap.com/adt/core\">\n",
    );
    for obj in objects {
        body.push_str(&format!(
            "  <adtcore:objectReference adtcore:uri=\"{}\" adtcore:type=\"{}\" adtcore:name=\"{}\"/>\n",
            escape(&obj.uri),
            escape(&obj.object_type),
            escape(&obj.name),
        ));
    }
    body.push_str("</adtcore:objectReferences>");
    body
}

/// Parse an `adtcore:objectReferences` document back into object refs
/// (used by the round-trip property in §8).
pub fn parse_object_references(xml: &str) -> Result<Vec<ObjectReference>, Error> {
    let tree = parse_xml_tree(xml)
        .map_err(|e| e.into_error("ParseObjectReferences", "", ErrorKind::Internal))?;
    let mut elements = Vec::new();
    tree.find_all_descendants("objectReference", &mut elements);
    Ok(elements
        .into_iter()
        .map(|el| {
            let fields = harvest_fields(el);
            ObjectReference {
                object_type: fields.get("type").cloned().unwrap_or_default(),
                name: fields.get("name").cloned().unwrap_or_default(),
                uri: fields.get("uri").cloned().unwrap_or_default(),
            }
        })
        .collect())
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activated_plus_failed_equals_total() {
        let xml = r#"
        <messages>
          <msg type="S" shorttext="ok"/>
          <msg type="E" shorttext="bad"/>
          <msg type="A" shorttext="abort"/>
        </messages>"#;
        let result = parse_activation_result(xml).unwrap();
        assert_eq!(result.activated + result.failed, result.total);
        assert_eq!(result.activated, 1);
        assert_eq!(result.failed, 2);
    }

    #[test]
    fn build_activation_xml_roundtrips_modulo_namespace() {
        let objs = vec![ObjectReference {
            object_type: "CLAS/OC".into(),
            name: "ZCL_TEST".into(),
            uri: "/sap/bc/adt/oo/classes/zcl_test".into(),
        }];
        let xml = build_activation_xml(&objs);
        let parsed = parse_object_references(&xml).unwrap();
        assert_eq!(parsed, objs);
    }
}
