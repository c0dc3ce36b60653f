//! Import adapters. Each adapter builds every record first and only then goes
//! through `add_nodes` / `add_edges`, so malformed input leaves the store untouched.

pub mod attributed;
pub mod json;
pub mod labeled;
pub mod tabular;

pub use attributed::SimpleGraph;
pub use labeled::{LabeledNode, LabeledSubgraph, Relationship};
pub use tabular::{Row, TabularImport};

/// What an import actually added (duplicates are skipped, not counted).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub nodes_added: usize,
    pub edges_added: usize,
}

impl ImportReport {
    /// Counts explicit nodes plus the endpoint nodes implied by the edges.
    pub(crate) fn measure(nodes_before: usize, nodes_after: usize, edges_added: usize) -> Self {
        Self {
            nodes_added: nodes_after.saturating_sub(nodes_before),
            edges_added,
        }
    }
}
