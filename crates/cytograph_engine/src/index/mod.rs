//! In-memory graph store: ordered node and edge lists plus the adjacency index
//! that backs duplicate detection and cascading removal.

mod adjacency;

pub use adjacency::{AdjacencyIndex, Neighbors};

use crate::event::{GraphEvent, ListenerId, Listeners};
use crate::options::EdgeOptions;
use crate::types::{
    Attributes, Classes, Edge, ElementId, GraphError, GraphReadStore, GraphResult, Node, Value,
    CLASS_DIRECTED, CLASS_MULTIPLE_EDGES,
};
use tracing::{debug, trace, warn};

/// Graph store with adjacency tracking.
///
/// Invariants kept by every operation:
/// - no two stored nodes share an id, and every stored node has an adjacency entry;
/// - a non-multiple edge `(s, t)` holds slot `s -> t` at exactly 1, a multiple edge
///   counts towards it;
/// - an undirected edge mirrors its slot into `t -> s`, a directed one does not;
/// - removing a node removes every edge touching it.
///
/// The store is single-threaded; callers serialize access.
#[derive(Debug, Default)]
pub struct GraphStore {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) adjacency: AdjacencyIndex,
    listeners: Listeners,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------
    // Reads
    // -----------------------

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn adjacency(&self) -> &AdjacencyIndex {
        &self.adjacency
    }

    pub fn node(&self, id: &ElementId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn contains_node(&self, id: &ElementId) -> bool {
        self.adjacency.contains_node(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Edges that `remove_edge_by_id(source, target)` would remove.
    pub fn edges_between(&self, source: &ElementId, target: &ElementId) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.connects(source, target)).collect()
    }

    // -----------------------
    // Listeners
    // -----------------------

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GraphEvent) + Send + 'static,
    {
        self.listeners.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // -----------------------
    // Nodes
    // -----------------------

    /// Adds `node` unless a node with the same id is already stored.
    pub fn add_node(&mut self, node: Node) -> bool {
        self.add_nodes([node]) == 1
    }

    /// Adds the nodes whose ids are neither stored nor seen earlier in the batch.
    /// Returns how many were accepted.
    pub fn add_nodes<I>(&mut self, nodes: I) -> usize
    where
        I: IntoIterator<Item = Node>,
    {
        let mut accepted = Vec::new();
        for node in nodes {
            if self.adjacency.register(node.id().clone()) {
                accepted.push(node);
            } else {
                trace!(id = %node.id(), "node already present, skipped");
            }
        }
        if accepted.is_empty() {
            return 0;
        }
        let ids: Vec<ElementId> = accepted.iter().map(|n| n.id().clone()).collect();
        let count = ids.len();
        debug!(count, "nodes added");
        self.nodes.extend(accepted);
        self.listeners.emit(GraphEvent::NodesAdded(ids));
        count
    }

    /// Removes a node equal to `node` together with every edge touching it.
    pub fn remove_node(&mut self, node: &Node) -> GraphResult<()> {
        let pos = self
            .nodes
            .iter()
            .position(|n| n == node)
            .ok_or_else(|| GraphError::NodeNotFound(node.id().clone()))?;
        self.remove_node_at(pos)
    }

    /// Removes the node with the given id. If the id occurs more than once the
    /// last occurrence is removed.
    pub fn remove_node_by_id(&mut self, id: &ElementId) -> GraphResult<()> {
        let pos = self
            .nodes
            .iter()
            .rposition(|n| n.id() == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
        self.remove_node_at(pos)
    }

    fn remove_node_at(&mut self, pos: usize) -> GraphResult<()> {
        let id = self.nodes[pos].id().clone();
        let mut removed_edges = 0;

        let outbound: Vec<ElementId> = self
            .adjacency
            .neighbors(&id)
            .map(|n| n.keys().cloned().collect())
            .unwrap_or_default();
        for target in outbound {
            if self.adjacency.contains(&id, &target) {
                removed_edges += self.detach_or_repair(&id, &target);
            }
        }
        for source in self.adjacency.inbound(&id) {
            if self.adjacency.contains(&source, &id) {
                removed_edges += self.detach_or_repair(&source, &id);
            }
        }

        self.adjacency.unregister(&id);
        self.nodes.remove(pos);
        debug!(%id, removed_edges, "node removed");

        if removed_edges > 0 {
            self.listeners.emit(GraphEvent::EdgesRemoved { count: removed_edges });
        }
        self.listeners.emit(GraphEvent::NodesRemoved(vec![id]));
        Ok(())
    }

    /// Adjacency slot without a backing edge: drop it so the index agrees with the edge list.
    fn detach_or_repair(&mut self, source: &ElementId, target: &ElementId) -> usize {
        let removed = self.detach_edges_between(source, target);
        if removed == 0 {
            warn!(%source, %target, "adjacency slot without a matching edge, dropping it");
            self.adjacency.drop_slot(source, target);
        }
        removed
    }

    /// Drops every node, edge and adjacency entry. Safe to call on an empty store.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.adjacency.clear();
        debug!("graph cleared");
        self.listeners.emit(GraphEvent::Cleared);
    }

    // -----------------------
    // Node updates
    // -----------------------

    /// Sets a `data` entry of a stored node. Stored ids are immutable.
    pub fn update_node_data(
        &mut self,
        id: &ElementId,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> GraphResult<Option<Value>> {
        let key = key.into();
        if key == "id" {
            return Err(GraphError::MalformedInput(format!(
                "id of stored node {id} cannot be changed"
            )));
        }
        let previous = self.node_mut(id)?.set_data(key, value)?;
        self.listeners.emit(GraphEvent::NodeChanged(id.clone()));
        Ok(previous)
    }

    pub fn set_node_position(&mut self, id: &ElementId, position: Attributes) -> GraphResult<()> {
        self.node_mut(id)?.position = position;
        self.listeners.emit(GraphEvent::NodeChanged(id.clone()));
        Ok(())
    }

    pub fn set_node_classes(&mut self, id: &ElementId, classes: impl Into<Classes>) -> GraphResult<()> {
        self.node_mut(id)?.classes = classes.into();
        self.listeners.emit(GraphEvent::NodeChanged(id.clone()));
        Ok(())
    }

    fn node_mut(&mut self, id: &ElementId) -> GraphResult<&mut Node> {
        self.nodes
            .iter_mut()
            .find(|n| n.id() == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))
    }

    // -----------------------
    // Edges
    // -----------------------

    pub fn add_edge(&mut self, edge: Edge, options: EdgeOptions) -> bool {
        self.add_edges([edge], options) == 1
    }

    /// Adds edges in order, skipping duplicates and creating missing endpoint
    /// nodes. Returns how many edges were accepted.
    ///
    /// Without `multiple_edges` an edge is a duplicate when slot `source -> target`
    /// exists, or, for an undirected insert, when `target -> source` exists.
    pub fn add_edges<I>(&mut self, edges: I, options: EdgeOptions) -> usize
    where
        I: IntoIterator<Item = Edge>,
    {
        let mut implied: Vec<Node> = Vec::new();
        let mut accepted: Vec<Edge> = Vec::new();

        for mut edge in edges {
            if options.directed {
                edge.classes.insert(CLASS_DIRECTED);
            }
            if options.multiple_edges {
                edge.classes.insert(CLASS_MULTIPLE_EDGES);
            }
            let source = edge.source().clone();
            let target = edge.target().clone();

            let duplicate = !options.multiple_edges
                && (self.adjacency.contains(&source, &target)
                    || (!options.directed && self.adjacency.contains(&target, &source)));
            if duplicate {
                trace!(%source, %target, "edge already present, skipped");
                continue;
            }

            for endpoint in [&source, &target] {
                if self.adjacency.register(endpoint.clone()) {
                    implied.push(Node::new(endpoint.clone()));
                }
            }

            self.adjacency.record(&source, &target, options.multiple_edges);
            if !edge.is_directed() && source != target {
                self.adjacency.record(&target, &source, options.multiple_edges);
            }
            accepted.push(edge);
        }

        let count = accepted.len();
        if !implied.is_empty() {
            let ids: Vec<ElementId> = implied.iter().map(|n| n.id().clone()).collect();
            debug!(count = ids.len(), "endpoint nodes created");
            self.nodes.extend(implied);
            self.listeners.emit(GraphEvent::NodesAdded(ids));
        }
        if count > 0 {
            debug!(count, directed = options.directed, multiple = options.multiple_edges, "edges added");
            self.edges.extend(accepted);
            self.listeners.emit(GraphEvent::EdgesAdded { count });
        }
        count
    }

    /// Removes the first stored edge equal to `edge`. Failing an exact match, the
    /// `directed` / `multiple_edges` tags added on insert are ignored.
    pub fn remove_edge(&mut self, edge: &Edge) -> GraphResult<()> {
        let pos = self
            .edges
            .iter()
            .position(|e| e == edge)
            .or_else(|| self.edges.iter().position(|e| e.same_record(edge)))
            .ok_or_else(|| GraphError::EdgeNotFound {
                from: edge.source().clone(),
                to: edge.target().clone(),
            })?;
        let removed = self.edges.remove(pos);
        self.release_edge(&removed);
        debug!(source = %removed.source(), target = %removed.target(), "edge removed");
        self.listeners.emit(GraphEvent::EdgesRemoved { count: 1 });
        Ok(())
    }

    /// Removes every edge `source -> target`, plus every undirected edge
    /// `target -> source`. Returns how many edges were removed.
    pub fn remove_edge_by_id(&mut self, source: &ElementId, target: &ElementId) -> GraphResult<usize> {
        let removed = self.detach_edges_between(source, target);
        if removed == 0 {
            return Err(GraphError::EdgeNotFound {
                from: source.clone(),
                to: target.clone(),
            });
        }
        self.listeners.emit(GraphEvent::EdgesRemoved { count: removed });
        Ok(removed)
    }

    fn detach_edges_between(&mut self, source: &ElementId, target: &ElementId) -> usize {
        let (matched, kept): (Vec<Edge>, Vec<Edge>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|e| e.connects(source, target));
        self.edges = kept;
        for edge in &matched {
            self.release_edge(edge);
        }
        if !matched.is_empty() {
            debug!(%source, %target, count = matched.len(), "edges removed");
        }
        matched.len()
    }

    fn release_edge(&mut self, edge: &Edge) {
        let (source, target) = (edge.source(), edge.target());
        if !self.adjacency.release(source, target) {
            warn!(%source, %target, "no adjacency slot for removed edge");
        }
        if !edge.is_directed() && source != target && !self.adjacency.release(target, source) {
            warn!(source = %target, target = %source, "no mirrored adjacency slot for removed edge");
        }
    }
}

impl GraphReadStore for GraphStore {
    fn scan_nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn scan_edges(&self) -> &[Edge] {
        &self.edges
    }
}
