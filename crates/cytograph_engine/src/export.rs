//! Cytoscape elements export: `{"nodes": [..], "edges": [..]}`.

use crate::index::GraphStore;
use crate::types::{GraphReadStore, Value};

pub fn to_cytoscape_json<S: GraphReadStore + ?Sized>(store: &S) -> serde_json::Value {
    let nodes: Vec<serde_json::Value> = store
        .scan_nodes()
        .iter()
        .map(|n| Value::Map(n.to_element()).to_json())
        .collect();
    let edges: Vec<serde_json::Value> = store
        .scan_edges()
        .iter()
        .map(|e| Value::Map(e.to_element()).to_json())
        .collect();
    serde_json::json!({ "nodes": nodes, "edges": edges })
}

impl GraphStore {
    pub fn to_json(&self) -> serde_json::Value {
        to_cytoscape_json(self)
    }
}
