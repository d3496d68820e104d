// SPDX-License-Identifier: MIT OR Apache-2.0
//! OpenMetadata-style catalog JSON export of an infoarea graph.

use serde_json::{json, Value};

use crate::export::{ExportedObject, ObjectDetail};
use crate::model::Graph;

fn detail_json(detail: &Option<ObjectDetail>) -> Value {
    match detail {
        None => Value::Null,
        Some(ObjectDetail::Adso(record)) => json!({ "kind": "adso", "fields": record.fields }),
        Some(ObjectDetail::Rsds { source_system, record }) => {
            json!({ "kind": "rsds", "sourceSystem": source_system, "fields": record.fields })
        }
        Some(ObjectDetail::Dataflow(detail)) => json!({
            "kind": "dataflow",
            "source": { "type": detail.source.object_type, "name": detail.source.name },
            "target": { "type": detail.target.object_type, "name": detail.target.name },
            "ruleCount": detail.rules.len(),
        }),
    }
}

/// Render an infoarea export as an OpenMetadata-flavored catalog
/// document: one entity per object, one lineage edge per graph edge.
pub fn render_catalog(infoarea: &str, objects: &[ExportedObject], graph: &Graph) -> Value {
    let entities: Vec<Value> = objects
        .iter()
        .map(|o| {
            json!({
                "name": o.name,
                "entityType": o.object_type,
                "description": o.description,
                "fullyQualifiedName": format!("bw.{infoarea}.{}.{}", o.object_type.to_ascii_lowercase(), o.name),
                "source": o.uri,
                "detail": detail_json(&o.detail),
            })
        })
        .collect();

    let lineage_edges: Vec<Value> = graph
        .edges
        .iter()
        .map(|e| {
            json!({
                "fromEntity": e.from,
                "toEntity": e.to,
                "edgeType": e.edge_type,
                "role": e.role,
            })
        })
        .collect();

    json!({
        "infoarea": infoarea,
        "entities": entities,
        "lineageEdges": lineage_edges,
        "warnings": graph.warnings,
        "provenance": graph.provenance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_entities_and_lineage_edges() {
        let objects = vec![ExportedObject {
            object_type: "ADSO".into(),
            name: "ZADSO".into(),
            description: "desc".into(),
            uri: Some("/x/adso".into()),
            detail: None,
        }];
        let mut graph = Graph::default();
        graph.upsert_node(crate::model::Node::new("N_ADSO_ZADSO", "ADSO", "ZADSO"));
        let catalog = render_catalog("ZAREA", &objects, &graph);
        assert_eq!(catalog["infoarea"], "ZAREA");
        assert_eq!(catalog["entities"][0]["fullyQualifiedName"], "bw.ZAREA.adso.ZADSO");
        assert!(catalog["entities"][0]["detail"].is_null());
    }

    #[test]
    fn renders_rsds_detail_with_source_system() {
        let mut fields = std::collections::BTreeMap::new();
        fields.insert("extractor".to_string(), "0CUSTOMER_ATTR".to_string());
        let objects = vec![ExportedObject {
            object_type: "RSDS".into(),
            name: "0CUSTOMER".into(),
            description: "desc".into(),
            uri: Some("/sap/bw/modeling/rsds/PRODSYS/0CUSTOMER".into()),
            detail: Some(ObjectDetail::Rsds {
                source_system: "PRODSYS".to_string(),
                record: erpl_xml::DetailRecord { record_type: "rsds_detail".to_string(), fields },
            }),
        }];
        let graph = Graph::default();
        let catalog = render_catalog("ZAREA", &objects, &graph);
        assert_eq!(catalog["entities"][0]["detail"]["kind"], "rsds");
        assert_eq!(catalog["entities"][0]["detail"]["sourceSystem"], "PRODSYS");
        assert_eq!(catalog["entities"][0]["detail"]["fields"]["extractor"], "0CUSTOMER_ATTR");
    }
}
