//! Import from tabular rows grouped by one or more columns (dataframe style).
//!
//! Each distinct group becomes a parent node `parent-{i}`; each row becomes a
//! child node pointing at its parent, named by a tooltip built from the
//! requested attribute columns.

use super::ImportReport;
use crate::index::GraphStore;
use crate::options::EdgeOptions;
use crate::types::{Attributes, Edge, ElementId, GraphError, GraphResult, Node, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::convert::TryFrom;
use tracing::debug;

/// One table row: its index (the child node id) and its column values.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub index: ElementId,
    pub values: Attributes,
}

impl Row {
    pub fn new(index: impl Into<ElementId>, values: Attributes) -> Self {
        Self { index: index.into(), values }
    }

    fn column(&self, name: &str) -> GraphResult<&Value> {
        self.values.get(name).ok_or_else(|| {
            GraphError::MalformedInput(format!("row {} has no column `{name}`", self.index))
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularImport {
    /// Columns whose values form the group key.
    pub group_by: Vec<String>,
    /// Columns listed, in order, in each child's tooltip.
    pub attributes: Vec<String>,
    /// `(source column, target column)`: one edge per row between those values.
    pub edge_columns: Option<(String, String)>,
    pub options: EdgeOptions,
}

impl GraphStore {
    pub fn add_graph_from_rows(&mut self, rows: &[Row], table: &TabularImport) -> GraphResult<ImportReport> {
        if table.group_by.is_empty() {
            return Err(GraphError::MalformedInput("tabular import needs at least one group column".into()));
        }

        let row_keys = rows
            .iter()
            .map(|row| {
                table.group_by
                    .iter()
                    .map(|col| row.column(col).cloned())
                    .collect::<GraphResult<Vec<Value>>>()
                    .map(GroupKey)
            })
            .collect::<GraphResult<Vec<GroupKey>>>()?;

        let mut groups = row_keys.clone();
        groups.sort();
        groups.dedup();

        let mut nodes: Vec<Node> = Vec::with_capacity(groups.len() + rows.len());
        for (i, key) in groups.iter().enumerate() {
            let mut parent = Node::new(parent_id(i));
            parent.set_data("name", Value::Array(key.0.clone()))?;
            nodes.push(parent);
        }

        let mut edges = Vec::new();
        for (row, key) in rows.iter().zip(&row_keys) {
            // groups holds every row key
            let group = groups.binary_search(key).unwrap_or_else(|i| i);
            let mut tooltip = String::new();
            for attr in &table.attributes {
                tooltip.push_str(&format!("{attr}: {}\n", row.column(attr)?));
            }
            let mut child = Node::new(row.index.clone());
            child.set_data("parent", parent_id(group))?;
            child.set_data("name", tooltip)?;
            nodes.push(child);

            if let Some((source_col, target_col)) = &table.edge_columns {
                let source = ElementId::try_from(row.column(source_col)?)?;
                let target = ElementId::try_from(row.column(target_col)?)?;
                edges.push(Edge::new(source, target));
            }
        }

        let before = self.node_count();
        self.add_nodes(nodes);
        let edges_added = self.add_edges(edges, table.options);
        let report = ImportReport::measure(before, self.node_count(), edges_added);
        debug!(?report, groups = groups.len(), "tabular rows imported");
        Ok(report)
    }
}

fn parent_id(group: usize) -> String {
    format!("parent-{group}")
}

/// Group key ordered the way a dataframe sorts its groups: booleans, then
/// numbers by value, then strings, with nulls last.
#[derive(Clone, Debug)]
struct GroupKey(Vec<Value>);

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_seq(&self.0, &other.0)
    }
}

fn compare_seq(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = compare_values(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            as_f64(a).total_cmp(&as_f64(b))
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => compare_seq(x, y),
        _ => match kind_rank(a).cmp(&kind_rank(b)) {
            Ordering::Equal => a.to_string().cmp(&b.to_string()),
            ord => ord,
        },
    }
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        _ => f64::NAN,
    }
}

fn kind_rank(v: &Value) -> u8 {
    match v {
        Value::Bool(_) => 0,
        Value::Int(_) | Value::Float(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Map(_) => 4,
        Value::Null => 5,
    }
}
