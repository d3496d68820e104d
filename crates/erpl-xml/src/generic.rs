// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared multi-shape-family value extraction (§4.2 rule set), used both by
//! the named parsers in this crate and by the thin §4.8 "subsidiary parser"
//! wrappers.

use std::collections::BTreeMap;

use crate::tree::XmlElement;

/// Harvest every attribute found anywhere in a parsed tree into a flat
/// `name -> value` map, implementing shape families 1-4 of §4.2 in one
/// pass: flat root attributes, Atom `properties` attributes, OData child
/// elements (collapsed to name->text), and SAP "connect" sibling
/// attributes are all just "an attribute (or a leaf element) somewhere in
/// the tree" once namespace prefixes are stripped.
///
/// Later occurrences do not overwrite earlier ones, so the first shape
/// family that yields a given field wins, honoring the "attempt each shape
/// until one yields data" rule.
pub fn harvest_fields(root: &XmlElement) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    harvest_into(root, &mut out);
    out
}

fn harvest_into(el: &XmlElement, out: &mut BTreeMap<String, String>) {
    for (k, v) in &el.attrs {
        out.entry(k.clone()).or_insert_with(|| v.clone());
    }
    // OData property form: <prop>value</prop> children with no attributes
    // and no children of their own collapse to name -> text.
    if el.children.is_empty() && !el.text_trimmed().is_empty() {
        // handled by the parent when iterating children below
    }
    for child in &el.children {
        if child.children.is_empty() && !child.text_trimmed().is_empty() {
            out.entry(child.name.clone())
                .or_insert_with(|| child.text_trimmed().to_string());
        }
        harvest_into(child, out);
    }
}

/// A generic detail record used by the §4.8 "subsidiary parsers": every
/// field SAP returned, flattened and namespace-agnostic, plus the record's
/// logical type name for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailRecord {
    /// Logical record type, e.g. `"rsds"`, `"systeminfo"`.
    pub record_type: String,
    /// Flattened field map.
    pub fields: BTreeMap<String, String>,
}

impl DetailRecord {
    /// Build a detail record of the given logical type from a parsed tree.
    pub fn from_tree(record_type: &str, root: &XmlElement) -> Self {
        Self {
            record_type: record_type.to_string(),
            fields: harvest_fields(root),
        }
    }

    /// Convenience field accessor.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_xml_tree;

    #[test]
    fn harvests_flat_and_odata_and_connect_shapes() {
        let xml = r#"
            <root flatAttr="1">
              <properties>
                <objectName>ZFOO</objectName>
              </properties>
              <connect host="srv01" port="3300"/>
            </root>"#;
        let tree = parse_xml_tree(xml).unwrap();
        let fields = harvest_fields(&tree);
        assert_eq!(fields.get("flatAttr").map(String::as_str), Some("1"));
        assert_eq!(fields.get("objectName").map(String::as_str), Some("ZFOO"));
        assert_eq!(fields.get("host").map(String::as_str), Some("srv01"));
        assert_eq!(fields.get("port").map(String::as_str), Some("3300"));
    }
}
