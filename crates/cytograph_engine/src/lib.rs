//! cytograph engine
//! In-memory graph store with adjacency-tracked, deduplicated edge insertion,
//! plus the adapters that load graphs from external shapes and export the
//! Cytoscape elements document.

pub mod types;
pub mod options;
pub mod event;
pub mod index;
pub mod import;
pub mod export;

pub use event::{GraphEvent, ListenerId};
pub use export::to_cytoscape_json;
pub use import::{
    ImportReport,
    LabeledNode,
    LabeledSubgraph,
    Relationship,
    Row,
    SimpleGraph,
    TabularImport,
};
pub use index::{AdjacencyIndex, GraphStore, Neighbors};
pub use options::{EdgeOptions, ImportOptions};
pub use types::{
    Attributes,
    Classes,
    Edge,
    ElementId,
    GraphError,
    GraphResult,
    Node,
    NodeToken,
    Value,
};
