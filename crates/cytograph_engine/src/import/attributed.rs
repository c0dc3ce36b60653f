//! Import from a generic attributed graph (networkx-style node and edge lists).

use super::ImportReport;
use crate::index::GraphStore;
use crate::options::ImportOptions;
use crate::types::{AttributedGraph, Attributes, Edge, GraphResult, Node, NodeToken, Value};
use tracing::debug;

impl GraphStore {
    /// Imports nodes then edges from `graph`.
    ///
    /// Raw node tokens become fresh nodes whose attributes are split into element
    /// fields and `data`; without an explicit `id` the token's text is used.
    /// Record tokens are reused as is. Edge options not set in `options` follow
    /// `graph.is_directed()` / `graph.is_multigraph()`.
    pub fn add_graph_from_attributed<G>(&mut self, graph: &G, options: ImportOptions) -> GraphResult<ImportReport>
    where
        G: AttributedGraph + ?Sized,
    {
        let edge_options = options.resolve(graph.is_directed(), graph.is_multigraph());

        let nodes = graph
            .nodes()
            .into_iter()
            .map(|(token, attrs)| match token {
                NodeToken::Record(node) => Ok(node),
                raw => Node::from_attributes(attrs, Some(raw.endpoint_id())),
            })
            .collect::<GraphResult<Vec<Node>>>()?;

        let edges = graph
            .edges()
            .into_iter()
            .map(|(source, target, attrs)| {
                let mut element = Attributes::new();
                element.insert("source".to_string(), Value::from(source.endpoint_id()));
                element.insert("target".to_string(), Value::from(target.endpoint_id()));
                element.extend(attrs);
                Edge::from_attributes(element)
            })
            .collect::<GraphResult<Vec<Edge>>>()?;

        let before = self.node_count();
        self.add_nodes(nodes);
        let edges_added = self.add_edges(edges, edge_options);
        let report = ImportReport::measure(before, self.node_count(), edges_added);
        debug!(?report, ?edge_options, "attributed graph imported");
        Ok(report)
    }
}

/// Minimal in-memory [`AttributedGraph`].
///
/// Nodes keep first-seen order; re-adding a node merges its attributes. Edges are
/// kept exactly as added, duplicate handling is left to the store.
#[derive(Clone, Debug, Default)]
pub struct SimpleGraph {
    directed: bool,
    multigraph: bool,
    nodes: Vec<(NodeToken, Attributes)>,
    edges: Vec<(NodeToken, NodeToken, Attributes)>,
}

impl SimpleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directed() -> Self {
        Self { directed: true, ..Self::default() }
    }

    pub fn multigraph() -> Self {
        Self { multigraph: true, ..Self::default() }
    }

    pub fn multi_directed() -> Self {
        Self { directed: true, multigraph: true, ..Self::default() }
    }

    pub fn add_node(&mut self, token: impl Into<Value>, attrs: Attributes) -> &mut Self {
        self.upsert(NodeToken::Raw(token.into()), attrs);
        self
    }

    /// Adds a prebuilt node record, reused verbatim on import.
    pub fn add_record(&mut self, node: Node) -> &mut Self {
        self.upsert(NodeToken::Record(node), Attributes::new());
        self
    }

    pub fn add_edge(&mut self, source: NodeToken, target: NodeToken, attrs: Attributes) -> &mut Self {
        self.upsert(source.clone(), Attributes::new());
        self.upsert(target.clone(), Attributes::new());
        self.edges.push((source, target, attrs));
        self
    }

    /// Shorthand for an edge between two raw tokens.
    pub fn add_raw_edge(&mut self, source: impl Into<Value>, target: impl Into<Value>, attrs: Attributes) -> &mut Self {
        self.add_edge(NodeToken::Raw(source.into()), NodeToken::Raw(target.into()), attrs)
    }

    fn upsert(&mut self, token: NodeToken, attrs: Attributes) {
        match self.nodes.iter_mut().find(|(t, _)| *t == token) {
            Some((_, existing)) => existing.extend(attrs),
            None => self.nodes.push((token, attrs)),
        }
    }
}

impl AttributedGraph for SimpleGraph {
    fn is_directed(&self) -> bool {
        self.directed
    }

    fn is_multigraph(&self) -> bool {
        self.multigraph
    }

    fn nodes(&self) -> Vec<(NodeToken, Attributes)> {
        self.nodes.clone()
    }

    fn edges(&self) -> Vec<(NodeToken, NodeToken, Attributes)> {
        self.edges.clone()
    }
}
