// SPDX-License-Identifier: MIT OR Apache-2.0
//! Mermaid rendering for an infoarea export graph (§4.5).

use std::fmt::Write as _;

use crate::export::ExportedObject;
use crate::model::Graph;

/// Types suppressed as standalone nodes — considered infrastructure
/// unless they carry an edge (ELEM without edges).
const INFRASTRUCTURE_TYPES: &[&str] = &["DTPA", "TRFN", "IOBJ"];

fn label(name: &str, description: &str) -> String {
    let truncated: String = description.chars().take(40).collect();
    format!("{name}<br/>{}", truncated.replace('"', "#quot;"))
}

fn node_id(object_type: &str, name: &str) -> String {
    crate::model::component_node_id(object_type, name)
}

fn role_abbr(role: &str) -> &'static str {
    match role.to_ascii_lowercase().as_str() {
        "characteristic" | "dimension" => "dim",
        "filter" => "filter",
        "variable" => "var",
        "keyfigure" => "kf",
        _ => "ref",
    }
}

/// Render an infoarea export as a `graph LR` Mermaid diagram (§4.5).
pub fn render_infoarea_mermaid(infoarea: &str, objects: &[ExportedObject], graph: &Graph, iobj_edges: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "%%{{init: {{'curve': 'basis'}}}}%%");
    let _ = writeln!(out, "graph LR");

    let sources: Vec<&ExportedObject> = objects.iter().filter(|o| o.object_type == "RSDS").collect();
    let staging: Vec<&ExportedObject> = objects.iter().filter(|o| matches!(o.object_type.as_str(), "ADSO" | "DSO")).collect();
    let cubes: Vec<&ExportedObject> = objects.iter().filter(|o| matches!(o.object_type.as_str(), "CUBE" | "HCPR")).collect();
    let multiproviders: Vec<&ExportedObject> = objects.iter().filter(|o| matches!(o.object_type.as_str(), "MPRO" | "VRRC")).collect();
    let elem_has_edges = |name: &str| {
        let id = node_id("ELEM", name);
        graph.edges.iter().any(|e| e.from == id || e.to == id)
    };
    let queries: Vec<&ExportedObject> = objects
        .iter()
        .filter(|o| o.object_type == "QUERY" || (o.object_type == "ELEM" && elem_has_edges(&o.name)))
        .collect();
    let infoobjects: Vec<&ExportedObject> = objects.iter().filter(|o| o.object_type == "IOBJ").collect();

    write_subgraph(&mut out, "Sources (RSDS)", &sources);
    write_subgraph(&mut out, &format!("Staging[{infoarea}] (ADSO/DSO)"), &staging);
    write_subgraph(&mut out, "InfoCubes (CUBE/HCPR)", &cubes);
    write_subgraph(&mut out, "MultiProviders (MPRO/VRRC)", &multiproviders);
    write_subgraph(&mut out, "Queries (QUERY/ELEM-with-edges)", &queries);
    if !infoobjects.is_empty() {
        write_subgraph(&mut out, "InfoObjects", &infoobjects);
    }

    let has_dataflow_edges = !graph.edges.is_empty();
    if has_dataflow_edges {
        for edge in &graph.edges {
            if iobj_edges && matches!(edge.edge_type.as_str(), "component_ref") {
                if let Some(role) = &edge.role {
                    let _ = writeln!(out, "  {} -->|{}| {}", edge.from, role_abbr(role), edge.to);
                    continue;
                }
            }
            let _ = writeln!(out, "  {} --> {}", edge.from, edge.to);
        }
    } else {
        // Fall back to DTP objects as labeled edges when no dataflow
        // edges are present (§4.5).
        for dtp in objects.iter().filter(|o| o.object_type == "DTPA") {
            let _ = writeln!(out, "  %% {} (DTP)", dtp.name);
        }
    }

    out
}

fn write_subgraph(out: &mut String, title: &str, items: &[&ExportedObject]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "  subgraph \"{title}\"");
    for item in items {
        if INFRASTRUCTURE_TYPES.contains(&item.object_type.as_str()) {
            continue;
        }
        let id = node_id(&item.object_type, &item.name);
        let _ = writeln!(out, "    {id}[\"{}\"]", label(&item.name, &item.description));
    }
    let _ = writeln!(out, "  end");
}
