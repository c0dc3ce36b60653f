//! Import from a labelled property subgraph (the Neo4j node/relationship shape).

use super::ImportReport;
use crate::index::GraphStore;
use crate::options::EdgeOptions;
use crate::types::{Attributes, Edge, ElementId, GraphResult, Node, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabeledNode {
    pub identity: i64,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Attributes,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub start: i64,
    pub end: i64,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub properties: Attributes,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledSubgraph {
    #[serde(default)]
    pub nodes: Vec<LabeledNode>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl LabeledSubgraph {
    /// Labels ordered from least to most frequent; ties keep first-seen order.
    /// The rarest label of a node is the most distinctive one.
    pub fn label_priority(&self) -> Vec<String> {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for node in &self.nodes {
            for label in &node.labels {
                *counts.entry(label.as_str()).or_insert(0) += 1;
            }
        }
        let mut labels: Vec<(&str, usize)> = counts.into_iter().collect();
        labels.sort_by_key(|(_, count)| *count);
        labels.into_iter().map(|(label, _)| label.to_string()).collect()
    }
}

impl GraphStore {
    /// Imports a labelled subgraph. Relationships are always directed and may be parallel.
    ///
    /// Node data gets the properties, a `tooltip` (labels, then one `key:value`
    /// line per property) unless one is present, `id` = identity and `label` =
    /// the node's highest-priority label. Relationship data gets the properties
    /// and `name` = relationship type unless present.
    pub fn add_graph_from_labeled(&mut self, graph: &LabeledSubgraph) -> GraphResult<ImportReport> {
        let priority = graph.label_priority();

        let nodes = graph
            .nodes
            .iter()
            .map(|node| {
                let mut attrs = node.properties.clone();
                if !attrs.contains_key("tooltip") {
                    attrs.insert("tooltip".to_string(), Value::from(tooltip(&node.labels, &node.properties)));
                }
                attrs.insert("id".to_string(), Value::Int(node.identity));
                let label = node
                    .labels
                    .iter()
                    .filter_map(|l| priority.iter().position(|p| p == l))
                    .min()
                    .map(|i| priority[i].clone());
                if let Some(label) = label {
                    attrs.insert("label".to_string(), Value::from(label));
                }
                Node::from_attributes(attrs, None)
            })
            .collect::<GraphResult<Vec<Node>>>()?;

        let edges = graph
            .relationships
            .iter()
            .map(|rel| {
                let mut element = Attributes::new();
                element.insert("source".to_string(), Value::from(ElementId::Int(rel.start)));
                element.insert("target".to_string(), Value::from(ElementId::Int(rel.end)));
                element.extend(rel.properties.clone());
                if !element.contains_key("name") {
                    element.insert("name".to_string(), Value::from(rel.rel_type.as_str()));
                }
                Edge::from_attributes(element)
            })
            .collect::<GraphResult<Vec<Edge>>>()?;

        let before = self.node_count();
        self.add_nodes(nodes);
        let edges_added = self.add_edges(edges, EdgeOptions::new(true, true));
        let report = ImportReport::measure(before, self.node_count(), edges_added);
        debug!(?report, labels = priority.len(), "labeled subgraph imported");
        Ok(report)
    }
}

fn tooltip(labels: &[String], properties: &Attributes) -> String {
    let lines: Vec<String> = properties.iter().map(|(k, v)| format!("{k}:{v}")).collect();
    format!("{}\n{}", labels.join(","), lines.join("\n"))
}
