//! Behaviour knobs for edge insertion and graph imports.

use serde::{Deserialize, Serialize};

/// How a batch of edges is inserted.
///
/// `directed` tags every edge with `directed` and records adjacency one way only;
/// `multiple_edges` tags every edge with `multiple_edges` and counts parallel edges
/// instead of rejecting them as duplicates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeOptions {
    pub directed: bool,
    pub multiple_edges: bool,
}

impl EdgeOptions {
    pub fn new(directed: bool, multiple_edges: bool) -> Self {
        Self { directed, multiple_edges }
    }
}

/// Edge options for importing an external graph. `None` defers to what the
/// source graph says about itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub directed: Option<bool>,
    pub multiple_edges: Option<bool>,
}

impl ImportOptions {
    pub fn resolve(&self, is_directed: bool, is_multigraph: bool) -> EdgeOptions {
        EdgeOptions {
            directed: self.directed.unwrap_or(is_directed),
            multiple_edges: self.multiple_edges.unwrap_or(is_multigraph),
        }
    }
}

impl From<EdgeOptions> for ImportOptions {
    fn from(opts: EdgeOptions) -> Self {
        Self {
            directed: Some(opts.directed),
            multiple_edges: Some(opts.multiple_edges),
        }
    }
}
