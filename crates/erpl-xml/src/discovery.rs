// SPDX-License-Identifier: MIT OR Apache-2.0
//! Discovery document parsing (§4.2): `app:workspace -> app:collection`
//! entries, reduced to capability flags.

use erpl_error::{Error, ErrorKind};

use crate::tree::{parse_xml_tree, XmlElement};

/// A single discovered collection entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// The `href` attribute (relative or absolute path).
    pub href: String,
    /// The `title` attribute or child, if present.
    pub title: Option<String>,
}

/// Capability flags and raw collections inferred from a discovery document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// All collection entries found, in document order.
    pub collections: Vec<Collection>,
    /// True iff any collection href contains `/abapgit/repos`.
    pub abapgit_present: bool,
    /// True iff any collection href contains `/packages`.
    pub packages_present: bool,
    /// True iff any collection href equals `/sap/bc/adt/activation`.
    pub activation_present: bool,
}

/// Parse a discovery document (`GET /sap/bc/adt/discovery` body).
pub fn parse_discovery(xml: &str) -> Result<Discovery, Error> {
    let tree = parse_xml_tree(xml)
        .map_err(|e| e.into_error("Discovery", "/sap/bc/adt/discovery", ErrorKind::Internal))?;

    let mut collections = Vec::new();
    collect_collections(&tree, &mut collections);

    let mut out = Discovery {
        abapgit_present: collections.iter().any(|c| c.href.contains("/abapgit/repos")),
        packages_present: collections.iter().any(|c| c.href.contains("/packages")),
        activation_present: collections
            .iter()
            .any(|c| c.href == "/sap/bc/adt/activation"),
        collections,
    };
    // Keep deterministic field init order readable above; nothing else to adjust.
    out.collections.sort_by(|a, b| a.href.cmp(&b.href));
    Ok(out)
}

fn collect_collections(el: &XmlElement, out: &mut Vec<Collection>) {
    if el.name == "collection" {
        if let Some(href) = el.attr("href") {
            let title = el.child("title").map(|t| t.text_trimmed().to_string());
            out.push(Collection {
                href: href.to_string(),
                title,
            });
        }
    }
    for child in &el.children {
        collect_collections(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_capability_flags() {
        let xml = r#"
        <app:service xmlns:app="http://www.w3.org/2007/app">
          <app:workspace>
            <app:collection href="/sap/bc/adt/repository/informationsystem"><app:title>Search</app:title></app:collection>
            <app:collection href="/sap/bc/adt/abapgit/repos"><app:title>abapGit</app:title></app:collection>
            <app:collection href="/sap/bc/adt/packages"><app:title>Packages</app:title></app:collection>
            <app:collection href="/sap/bc/adt/activation"><app:title>Activation</app:title></app:collection>
          </app:workspace>
        </app:service>"#;
        let d = parse_discovery(xml).unwrap();
        assert!(d.abapgit_present);
        assert!(d.packages_present);
        assert!(d.activation_present);
        assert_eq!(d.collections.len(), 4);
    }
}
