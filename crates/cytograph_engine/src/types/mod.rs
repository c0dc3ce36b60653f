// Re-export shared domain types from cytograph_core to keep stable paths
pub use cytograph_core::{
    Attributes,
    AttributedGraph,
    Classes,
    Edge,
    ElementId,
    GraphError,
    GraphReadStore,
    GraphResult,
    Node,
    NodeToken,
    Value,
    CLASS_DIRECTED,
    CLASS_MULTIPLE_EDGES,
};
