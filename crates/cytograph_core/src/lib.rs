//! Domain types shared by the cytograph crates: element ids, attribute values,
//! node/edge records, the error type, and the ports implemented by stores and
//! import sources.

mod element;
mod value;

pub use element::{Classes, Edge, Node, CLASS_DIRECTED, CLASS_MULTIPLE_EDGES};
pub use value::{Attributes, Value};

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

// -----------------------
// Identifiers
// -----------------------

/// Node identifier: an integer or a string. `0` and `"0"` are different ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementId {
    Int(i64),
    Str(String),
}

impl From<i64> for ElementId {
    fn from(i: i64) -> Self {
        ElementId::Int(i)
    }
}

impl From<i32> for ElementId {
    fn from(i: i32) -> Self {
        ElementId::Int(i64::from(i))
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        ElementId::Str(s.to_string())
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        ElementId::Str(s)
    }
}

impl From<&String> for ElementId {
    fn from(s: &String) -> Self {
        ElementId::Str(s.clone())
    }
}

impl TryFrom<&Value> for ElementId {
    type Error = GraphError;
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(i) => Ok(ElementId::Int(*i)),
            Value::String(s) => Ok(ElementId::Str(s.clone())),
            other => Err(GraphError::MalformedInput(format!(
                "element id must be an int or a string, got {}",
                other.kind()
            ))),
        }
    }
}

impl From<&ElementId> for Value {
    fn from(id: &ElementId) -> Self {
        match id {
            ElementId::Int(i) => Value::Int(*i),
            ElementId::Str(s) => Value::String(s.clone()),
        }
    }
}

impl From<ElementId> for Value {
    fn from(id: ElementId) -> Self {
        match id {
            ElementId::Int(i) => Value::Int(i),
            ElementId::Str(s) => Value::String(s),
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Int(i) => write!(f, "{i}"),
            ElementId::Str(s) => f.write_str(s),
        }
    }
}

// -----------------------
// Errors
// -----------------------

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("node {0} is not present in the graph")]
    NodeNotFound(ElementId),
    #[error("edge between {from} and {to} is not present in the graph")]
    EdgeNotFound { from: ElementId, to: ElementId },
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("io: {0}")]
    Io(String),
    #[error("serialization: {0}")]
    Serialization(String),
}

impl GraphError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::NodeNotFound(_) | GraphError::EdgeNotFound { .. })
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

// -----------------------
// Ports
// -----------------------

/// Read-only view over a graph store.
pub trait GraphReadStore {
    /// Nodes in insertion order.
    fn scan_nodes(&self) -> &[Node];
    /// Edges in insertion order.
    fn scan_edges(&self) -> &[Edge];
}

/// A node as handed over by an external graph: either a raw token to be turned
/// into a fresh record, or a record to be reused as is.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeToken {
    Raw(Value),
    Record(Node),
}

impl NodeToken {
    /// Id this token resolves to. Raw tokens use their Python `str()` text, so a
    /// networkx grid node `(0, 1)` becomes `"(0, 1)"` and `True` stays `"True"`.
    pub fn endpoint_id(&self) -> ElementId {
        match self {
            NodeToken::Record(node) => node.id().clone(),
            NodeToken::Raw(Value::String(s)) => ElementId::Str(s.clone()),
            NodeToken::Raw(value) => ElementId::Str(python_repr(value)),
        }
    }
}

fn python_repr(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format!("{f:?}"),
        Value::String(s) if s.contains('\'') && !s.contains('"') => format!("\"{s}\""),
        Value::String(s) => format!("'{}'", s.replace('\'', "\\'")),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(python_repr).collect();
            match parts.as_slice() {
                [single] => format!("({single},)"),
                _ => format!("({})", parts.join(", ")),
            }
        }
        Value::Map(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("'{k}': {}", python_repr(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
    }
}

/// An external attributed graph (nodes as `(token, attributes)`, edges as
/// `(source, target, attributes)`), e.g. an adapter over a networkx export.
pub trait AttributedGraph {
    fn is_directed(&self) -> bool;
    fn is_multigraph(&self) -> bool;
    fn nodes(&self) -> Vec<(NodeToken, Attributes)>;
    fn edges(&self) -> Vec<(NodeToken, NodeToken, Attributes)>;
}
