// SPDX-License-Identifier: MIT OR Apache-2.0
//! Inactive-objects list parsing: `ioc:entry -> ioc:object -> ioc:ref` (§4.2).

use erpl_error::{Error, ErrorKind};

use crate::activation::ObjectReference;
use crate::generic::harvest_fields;
use crate::tree::parse_xml_tree;

/// Parse the inactive-objects response into a flat list of object references.
pub fn parse_inactive_objects(xml: &str) -> Result<Vec<ObjectReference>, Error> {
    let tree = parse_xml_tree(xml).map_err(|e| {
        e.into_error(
            "ListInactiveObjects",
            "/sap/bc/adt/activation/inactiveobjects",
            ErrorKind::Internal,
        )
    })?;

    let mut entries = Vec::new();
    tree.find_all_descendants("entry", &mut entries);

    let mut out = Vec::new();
    for entry in entries {
        let Some(object) = entry.child("object") else {
            continue;
        };
        let Some(r) = object.child("ref") else { continue };
        let fields = harvest_fields(r);
        out.push(ObjectReference {
            object_type: fields.get("type").cloned().unwrap_or_default(),
            name: fields.get("name").cloned().unwrap_or_default(),
            uri: fields.get("uri").cloned().unwrap_or_default(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_entry_object_ref_structure() {
        let xml = r#"
        <ioc:inactiveObjects xmlns:ioc="http://www.sap.com/abapxml/inactiveCtsObjects">
          <ioc:entry>
            <ioc:object>
              <ioc:ref ioc:uri="/sap/bc/adt/oo/classes/zcl_test" ioc:type="CLAS/OC" ioc:name="ZCL_TEST"/>
            </ioc:object>
          </ioc:entry>
        </ioc:inactiveObjects>"#;
        let refs = parse_inactive_objects(xml).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "ZCL_TEST");
    }
}
