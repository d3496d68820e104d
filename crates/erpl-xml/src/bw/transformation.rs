// SPDX-License-Identifier: MIT OR Apache-2.0
//! BW transformation (TRFN) parsing: source/target object refs and
//! recursive field-mapping rule extraction (§4.2).

use erpl_error::{Error, ErrorKind};

use super::ObjectRefLite;
use crate::generic::harvest_fields;
use crate::tree::{parse_xml_tree, XmlElement};

/// A single transformation rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrfnRule {
    /// Rule type (e.g. `MOVE`, `FORMULA`, `CONSTANT`, `ROUTINE`).
    pub rule_type: String,
    /// Formula text, when `rule_type` is formula-based.
    pub formula: Option<String>,
    /// Constant value, when `rule_type` is constant-based.
    pub constant: Option<String>,
    /// Source field names feeding this rule (may be empty).
    pub source_fields: Vec<String>,
    /// Target field names produced by this rule (may be empty).
    pub target_fields: Vec<String>,
}

/// Parsed transformation detail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrfnDetail {
    /// Source object of the transformation.
    pub source: ObjectRefLite,
    /// Target object of the transformation.
    pub target: ObjectRefLite,
    /// All extracted field-mapping rules.
    pub rules: Vec<TrfnRule>,
}

fn parse_ref(el: &XmlElement) -> ObjectRefLite {
    let fields = harvest_fields(el);
    ObjectRefLite {
        object_type: fields.get("type").cloned().unwrap_or_default(),
        name: fields.get("name").cloned().unwrap_or_default(),
        uri: fields.get("uri").cloned().filter(|s| !s.is_empty()),
    }
}

fn field_names(el: &XmlElement, wrapper: &str, leaf: &str) -> Vec<String> {
    let Some(container) = el.child(wrapper) else {
        return Vec::new();
    };
    let direct: Vec<String> = container
        .children_named(leaf)
        .map(|f| f.text_trimmed().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if !direct.is_empty() {
        return direct;
    }
    // Singleton shape: the wrapper itself carries one field name as text.
    let text = container.text_trimmed();
    if !text.is_empty() {
        vec![text.to_string()]
    } else {
        Vec::new()
    }
}

fn parse_rule(el: &XmlElement) -> TrfnRule {
    let fields = harvest_fields(el);
    TrfnRule {
        rule_type: fields.get("ruleType").cloned().unwrap_or_default(),
        formula: fields.get("formula").cloned().filter(|s| !s.is_empty()),
        constant: fields.get("constant").cloned().filter(|s| !s.is_empty()),
        source_fields: field_names(el, "sourceFields", "field"),
        target_fields: field_names(el, "targetFields", "field"),
    }
}

fn collect_rules(el: &XmlElement, out: &mut Vec<TrfnRule>) {
    if let Some(rules_el) = el.child("rules") {
        for child in &rules_el.children {
            match child.name.as_str() {
                "rule" => out.push(parse_rule(child)),
                "group" => {
                    for rule in child.children_named("rule") {
                        out.push(parse_rule(rule));
                    }
                }
                _ => {}
            }
        }
    }
}

/// Parse a BW transformation (TRFN) detail document.
pub fn parse_transformation(xml: &str, endpoint: &str) -> Result<TrfnDetail, Error> {
    let tree = parse_xml_tree(xml)
        .map_err(|e| e.into_error("GetTransformation", endpoint, ErrorKind::Internal))?;

    let source = tree
        .find_descendant("source")
        .map(parse_ref)
        .unwrap_or_default();
    let target = tree
        .find_descendant("target")
        .map(parse_ref)
        .unwrap_or_default();

    let mut rules = Vec::new();
    collect_rules(&tree, &mut rules);

    Ok(TrfnDetail { source, target, rules })
}

/// A single derived field-to-field edge, as yielded by [`rule_edges`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdge {
    /// Source field name, when the edge originates from a source field
    /// (absent for a target-only derivation).
    pub from_field: Option<String>,
    /// Target field name.
    pub to_field: String,
    /// `"field_mapping"` for a Cartesian source->target pair, or
    /// `"field_derivation"` for a target-only rule.
    pub edge_type: &'static str,
}

/// Expand a rule's source/target field lists into edges: a full Cartesian
/// product when both lists are non-empty (`field_mapping`), a
/// target-only `field_derivation` edge per target field when there is no
/// source, and nothing when both lists are empty (§4.2).
pub fn rule_edges(rule: &TrfnRule) -> Vec<FieldEdge> {
    if !rule.source_fields.is_empty() && !rule.target_fields.is_empty() {
        let mut out = Vec::with_capacity(rule.source_fields.len() * rule.target_fields.len());
        for s in &rule.source_fields {
            for t in &rule.target_fields {
                out.push(FieldEdge {
                    from_field: Some(s.clone()),
                    to_field: t.clone(),
                    edge_type: "field_mapping",
                });
            }
        }
        out
    } else if rule.source_fields.is_empty() && !rule.target_fields.is_empty() {
        rule.target_fields
            .iter()
            .map(|t| FieldEdge {
                from_field: None,
                to_field: t.clone(),
                edge_type: "field_derivation",
            })
            .collect()
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recurses_into_groups_and_flat_rules() {
        let xml = r#"
        <transformation>
          <source type="RSDS" name="ZSRC" uri="/x/src"/>
          <target type="ADSO" name="ZTGT" uri="/x/tgt"/>
          <rules>
            <rule ruleType="MOVE">
              <sourceFields><field>CUSTOMER</field></sourceFields>
              <targetFields><field>CUST_ID</field></targetFields>
            </rule>
            <group>
              <rule ruleType="CONSTANT" constant="X">
                <targetFields><field>FLAG</field></targetFields>
              </rule>
            </group>
          </rules>
        </transformation>"#;
        let detail = parse_transformation(xml, "/x").unwrap();
        assert_eq!(detail.source.name, "ZSRC");
        assert_eq!(detail.target.name, "ZTGT");
        assert_eq!(detail.rules.len(), 2);
        assert_eq!(detail.rules[1].constant.as_deref(), Some("X"));
    }

    #[test]
    fn cartesian_product_for_multi_field_rule() {
        let rule = TrfnRule {
            rule_type: "MOVE".into(),
            source_fields: vec!["A".into(), "B".into()],
            target_fields: vec!["X".into(), "Y".into()],
            ..Default::default()
        };
        let edges = rule_edges(&rule);
        assert_eq!(edges.len(), 4);
        assert!(edges.iter().all(|e| e.edge_type == "field_mapping"));
    }

    #[test]
    fn target_only_rule_yields_derivation_edges() {
        let rule = TrfnRule {
            target_fields: vec!["FLAG".into()],
            ..Default::default()
        };
        let edges = rule_edges(&rule);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].edge_type, "field_derivation");
        assert!(edges[0].from_field.is_none());
    }

    #[test]
    fn empty_pair_yields_no_edges() {
        let rule = TrfnRule::default();
        assert!(rule_edges(&rule).is_empty());
    }
}
