//! Import from a Cytoscape elements document: `{"nodes": [..], "edges": [..]}`.
//!
//! Also accepts the full Cytoscape export shape, where the lists sit under
//! `"elements"`.

use super::ImportReport;
use crate::index::GraphStore;
use crate::options::EdgeOptions;
use crate::types::{Attributes, Edge, GraphError, GraphResult, Node, Value};
use std::path::Path;
use tracing::debug;

impl GraphStore {
    pub fn add_graph_from_json(&mut self, doc: &serde_json::Value, options: EdgeOptions) -> GraphResult<ImportReport> {
        let root = match doc.get("elements") {
            Some(elements) if elements.is_object() => elements,
            _ => doc,
        };
        if !root.is_object() {
            return Err(GraphError::MalformedInput("graph document must be a JSON object".into()));
        }

        let nodes = match root.get("nodes") {
            Some(list) => element_list(list, "nodes")?
                .into_iter()
                .map(|el| Node::from_attributes(el, None))
                .collect::<GraphResult<Vec<Node>>>()?,
            None => return Err(GraphError::MalformedInput("graph document has no `nodes`".into())),
        };
        let edges = match root.get("edges") {
            Some(list) => element_list(list, "edges")?
                .into_iter()
                .map(Edge::from_attributes)
                .collect::<GraphResult<Vec<Edge>>>()?,
            None => Vec::new(),
        };

        let before = self.node_count();
        self.add_nodes(nodes);
        let edges_added = self.add_edges(edges, options);
        let report = ImportReport::measure(before, self.node_count(), edges_added);
        debug!(?report, "json graph imported");
        Ok(report)
    }

    pub fn add_graph_from_json_str(&mut self, text: &str, options: EdgeOptions) -> GraphResult<ImportReport> {
        let doc: serde_json::Value =
            serde_json::from_str(text).map_err(|e| GraphError::Serialization(e.to_string()))?;
        self.add_graph_from_json(&doc, options)
    }

    pub fn add_graph_from_json_file<P: AsRef<Path>>(&mut self, path: P, options: EdgeOptions) -> GraphResult<ImportReport> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GraphError::Io(format!("read({}): {e}", path.display())))?;
        self.add_graph_from_json_str(&text, options)
    }
}

fn element_list(list: &serde_json::Value, key: &str) -> GraphResult<Vec<Attributes>> {
    let items = list
        .as_array()
        .ok_or_else(|| GraphError::MalformedInput(format!("`{key}` must be an array")))?;
    items
        .iter()
        .map(|item| match Value::from(item.clone()) {
            Value::Map(el) => Ok(el),
            other => Err(GraphError::MalformedInput(format!(
                "`{key}` entries must be objects, got {}",
                other.kind()
            ))),
        })
        .collect()
}
