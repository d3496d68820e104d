// SPDX-License-Identifier: MIT OR Apache-2.0
//! BW activation result parsing (§4.2, §9). `POST
//! /sap/bw/modeling/activation?mode=(validate|activate&simu=…)` responds
//! with a message list; success is everything-but-error, matching the
//! same severity heuristic as the plain ADT activation parser.

use erpl_error::{Error, ErrorKind};

use super::ObjectRefLite;
use crate::generic::harvest_fields;
use crate::tree::parse_xml_tree;

/// One message emitted by a BW activation/validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BwActivationMessage {
    pub severity: String,
    pub text: String,
    pub object: Option<ObjectRefLite>,
}

/// Result of a BW validate/activate call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BwActivationResult {
    pub success: bool,
    pub messages: Vec<BwActivationMessage>,
}

fn count_messages(messages: &[BwActivationMessage]) -> bool {
    messages.iter().any(|m| m.severity == "E")
}

/// Parse a BW activation/validation response body.
///
/// A message with `severity="E"` anywhere in the document marks the
/// whole run as failed (§9 open question: the server's own
/// success/failure signal isn't otherwise exposed, so this mirrors the
/// plain-ADT activation severity heuristic).
pub fn parse_bw_activation_result(xml: &str, endpoint: &str) -> Result<BwActivationResult, Error> {
    let tree = parse_xml_tree(xml)
        .map_err(|e| e.into_error("BwActivate", endpoint, ErrorKind::ActivationError))?;

    let mut message_els = Vec::new();
    tree.find_all_descendants("message", &mut message_els);
    if message_els.is_empty() {
        tree.find_all_descendants("msg", &mut message_els);
    }

    let messages: Vec<BwActivationMessage> = message_els
        .into_iter()
        .map(|el| {
            let fields = harvest_fields(el);
            let object = el.child("object").map(|obj_el| {
                let obj_fields = harvest_fields(obj_el);
                ObjectRefLite {
                    object_type: obj_fields.get("type").cloned().unwrap_or_default(),
                    name: obj_fields.get("name").cloned().unwrap_or_default(),
                    uri: obj_fields.get("uri").cloned().filter(|s| !s.is_empty()),
                }
            });
            BwActivationMessage {
                severity: fields.get("severity").cloned().unwrap_or_default(),
                text: fields.get("text").cloned().unwrap_or_default(),
                object,
            }
        })
        .collect();

    let success = !count_messages(&messages);
    Ok(BwActivationResult { success, messages })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_severity_marks_run_failed() {
        let xml = r#"
        <activationResult>
          <messages>
            <message severity="W" text="ignored"/>
            <message severity="E" text="broken rule">
              <object type="TRFN" name="ZTRFN" uri="/x/trfn"/>
            </message>
          </messages>
        </activationResult>"#;
        let result = parse_bw_activation_result(xml, "/x").unwrap();
        assert!(!result.success);
        assert_eq!(result.messages.len(), 2);
        assert_eq!(result.messages[1].object.as_ref().unwrap().name, "ZTRFN");
    }

    #[test]
    fn no_error_messages_means_success() {
        let xml = r#"<activationResult><messages><message severity="W" text="ok"/></messages></activationResult>"#;
        let result = parse_bw_activation_result(xml, "/x").unwrap();
        assert!(result.success);
    }
}
