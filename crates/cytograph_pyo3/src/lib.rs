//! cytograph Python SDK - pyo3 bindings over `GraphStore`

use pyo3::exceptions::{PyOSError, PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{IntoPyDict, PyBool, PyDict, PyFloat, PyList, PyLong, PyString, PyTuple};
use std::sync::{Arc, Mutex, MutexGuard};

use ::cytograph_engine as engine;
use engine::types::AttributedGraph;
use engine::{
    Attributes, Edge, EdgeOptions, ElementId, GraphError, GraphStore, ImportOptions, ImportReport,
    LabeledSubgraph, Node, NodeToken, Row, TabularImport, Value,
};

fn to_py_err(err: GraphError) -> PyErr {
    match err {
        GraphError::Io(_) => PyOSError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

// -----------------------
// Python <-> Value
// -----------------------

/// Python object to a graph attribute value. Tuples and lists both become arrays;
/// numpy scalars are accepted through `__index__` / `__float__`.
fn py_to_value(obj: &PyAny) -> PyResult<Value> {
    if obj.is_none() {
        return Ok(Value::Null);
    }
    if let Ok(b) = obj.downcast::<PyBool>() {
        return Ok(Value::Bool(b.is_true()));
    }
    if let Ok(i) = obj.downcast::<PyLong>() {
        return i.extract::<i64>().map(Value::Int);
    }
    if let Ok(f) = obj.downcast::<PyFloat>() {
        return Ok(Value::Float(f.value()));
    }
    if let Ok(s) = obj.downcast::<PyString>() {
        return Ok(Value::String(s.to_str()?.to_owned()));
    }
    if let Ok(dict) = obj.downcast::<PyDict>() {
        return dict_to_attributes(dict).map(Value::Map);
    }
    if let Ok(tuple) = obj.downcast::<PyTuple>() {
        return tuple.iter().map(py_to_value).collect::<PyResult<_>>().map(Value::Array);
    }
    if let Ok(list) = obj.downcast::<PyList>() {
        return list.iter().map(py_to_value).collect::<PyResult<_>>().map(Value::Array);
    }
    if let Ok(i) = obj.extract::<i64>() {
        return Ok(Value::Int(i));
    }
    if let Ok(f) = obj.extract::<f64>() {
        return Ok(Value::Float(f));
    }
    Err(PyTypeError::new_err(format!(
        "cannot store a {} in a graph element",
        obj.get_type().name()?
    )))
}

fn dict_to_attributes(dict: &PyDict) -> PyResult<Attributes> {
    let mut attrs = Attributes::with_capacity(dict.len());
    for (k, v) in dict.iter() {
        let key = match k.downcast::<PyString>() {
            Ok(s) => s.to_str()?.to_owned(),
            Err(_) => k.str()?.to_str()?.to_owned(),
        };
        attrs.insert(key, py_to_value(v)?);
    }
    Ok(attrs)
}

fn value_to_py(py: Python, value: &Value) -> PyResult<PyObject> {
    Ok(match value {
        Value::Null => py.None(),
        Value::Bool(b) => b.into_py(py),
        Value::Int(i) => i.into_py(py),
        Value::Float(f) => f.into_py(py),
        Value::String(s) => s.into_py(py),
        Value::Array(items) => {
            let items = items.iter().map(|v| value_to_py(py, v)).collect::<PyResult<Vec<_>>>()?;
            PyList::new(py, items).into()
        }
        Value::Map(map) => attributes_to_py(py, map)?,
    })
}

fn attributes_to_py(py: Python, attrs: &Attributes) -> PyResult<PyObject> {
    let dict = PyDict::new(py);
    for (k, v) in attrs {
        dict.set_item(k, value_to_py(py, v)?)?;
    }
    Ok(dict.into())
}

fn py_to_element(obj: &PyAny) -> PyResult<Attributes> {
    match py_to_value(obj)? {
        Value::Map(map) => Ok(map),
        other => Err(PyTypeError::new_err(format!("expected an element dict, got {}", other.kind()))),
    }
}

/// Accepts a single element dict or a list of them.
fn py_to_elements(obj: &PyAny) -> PyResult<Vec<Attributes>> {
    match obj.downcast::<PyList>() {
        Ok(list) => list.iter().map(py_to_element).collect(),
        Err(_) => Ok(vec![py_to_element(obj)?]),
    }
}

fn py_to_id(obj: &PyAny) -> PyResult<ElementId> {
    ElementId::try_from(&py_to_value(obj)?).map_err(to_py_err)
}

fn report_to_py(py: Python, report: ImportReport) -> PyObject {
    [("nodes_added", report.nodes_added), ("edges_added", report.edges_added)]
        .into_py_dict(py)
        .into()
}

// -----------------------
// networkx adapter
// -----------------------

/// Snapshot of a networkx-like graph: `is_directed()`, `is_multigraph()`,
/// `nodes(data=True)` and `edges(data=True)`.
struct PyGraphSnapshot {
    directed: bool,
    multigraph: bool,
    nodes: Vec<(NodeToken, Attributes)>,
    edges: Vec<(NodeToken, NodeToken, Attributes)>,
}

impl PyGraphSnapshot {
    fn read(py: Python, g: &PyAny) -> PyResult<Self> {
        let with_data = [("data", true)].into_py_dict(py);
        let token = |obj: &PyAny| py_to_value(obj).map(NodeToken::Raw);
        let data = |obj: &PyAny| match obj.downcast::<PyDict>() {
            Ok(dict) => dict_to_attributes(dict),
            Err(_) => Ok(Attributes::new()),
        };

        let mut nodes = Vec::new();
        for item in g.call_method("nodes", (), Some(with_data))?.iter()? {
            let (node, attrs): (&PyAny, &PyAny) = item?.extract()?;
            nodes.push((token(node)?, data(attrs)?));
        }
        let mut edges = Vec::new();
        for item in g.call_method("edges", (), Some(with_data))?.iter()? {
            let (source, target, attrs): (&PyAny, &PyAny, &PyAny) = item?.extract()?;
            edges.push((token(source)?, token(target)?, data(attrs)?));
        }

        Ok(Self {
            directed: g.call_method0("is_directed")?.is_true()?,
            multigraph: g.call_method0("is_multigraph")?.is_true()?,
            nodes,
            edges,
        })
    }
}

impl AttributedGraph for PyGraphSnapshot {
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

/// Rows from a pandas DataFrame (`iterrows()`) or any iterable of `(index, dict)`.
fn read_rows(rows: &PyAny) -> PyResult<Vec<Row>> {
    let (iter, from_frame) = if rows.hasattr("iterrows")? {
        (rows.call_method0("iterrows")?.iter()?, true)
    } else {
        (rows.iter()?, false)
    };
    let mut out = Vec::new();
    for item in iter {
        let (index, values): (&PyAny, &PyAny) = item?.extract()?;
        let values = if from_frame { values.call_method0("to_dict")? } else { values };
        let values = match values.downcast::<PyDict>() {
            Ok(dict) => dict_to_attributes(dict)?,
            Err(_) => return Err(PyTypeError::new_err("row values must be a dict")),
        };
        out.push(Row::new(py_to_id(index)?, values));
    }
    Ok(out)
}

// -----------------------
// Graph
// -----------------------

/// Graph model mirroring cytoscape.js elements
#[pyclass]
struct Graph {
    inner: Arc<Mutex<GraphStore>>,
}

impl Graph {
    fn store(&self) -> PyResult<MutexGuard<'_, GraphStore>> {
        self.inner
            .lock()
            .map_err(|_| PyRuntimeError::new_err("graph store lock poisoned"))
    }
}

#[pymethods]
impl Graph {
    #[new]
    fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(GraphStore::new())) }
    }

    /// Returns false when a node with the same id is already present.
    fn add_node(&self, node: &PyAny) -> PyResult<bool> {
        let node = Node::from_attributes(py_to_element(node)?, None).map_err(to_py_err)?;
        Ok(self.store()?.add_node(node))
    }

    /// Adds one element dict or a list of them; returns how many were new.
    fn add_nodes(&self, nodes: &PyAny) -> PyResult<usize> {
        let nodes = py_to_elements(nodes)?
            .into_iter()
            .map(|el| Node::from_attributes(el, None))
            .collect::<Result<Vec<_>, _>>()
            .map_err(to_py_err)?;
        Ok(self.store()?.add_nodes(nodes))
    }

    fn remove_node(&self, node: &PyAny) -> PyResult<()> {
        let node = Node::from_attributes(py_to_element(node)?, None).map_err(to_py_err)?;
        self.store()?.remove_node(&node).map_err(to_py_err)
    }

    fn remove_node_by_id(&self, node_id: &PyAny) -> PyResult<()> {
        let id = py_to_id(node_id)?;
        self.store()?.remove_node_by_id(&id).map_err(to_py_err)
    }

    #[pyo3(signature = (edge, directed=false, multiple_edges=false))]
    fn add_edge(&self, edge: &PyAny, directed: bool, multiple_edges: bool) -> PyResult<bool> {
        let edge = Edge::from_attributes(py_to_element(edge)?).map_err(to_py_err)?;
        Ok(self.store()?.add_edge(edge, EdgeOptions::new(directed, multiple_edges)))
    }

    #[pyo3(signature = (edges, directed=false, multiple_edges=false))]
    fn add_edges(&self, edges: &PyAny, directed: bool, multiple_edges: bool) -> PyResult<usize> {
        let edges = py_to_elements(edges)?
            .into_iter()
            .map(Edge::from_attributes)
            .collect::<Result<Vec<_>, _>>()
            .map_err(to_py_err)?;
        Ok(self.store()?.add_edges(edges, EdgeOptions::new(directed, multiple_edges)))
    }

    fn remove_edge(&self, edge: &PyAny) -> PyResult<()> {
        let edge = Edge::from_attributes(py_to_element(edge)?).map_err(to_py_err)?;
        self.store()?.remove_edge(&edge).map_err(to_py_err)
    }

    /// Returns how many edges were removed.
    fn remove_edge_by_id(&self, source: &PyAny, target: &PyAny) -> PyResult<usize> {
        let (source, target) = (py_to_id(source)?, py_to_id(target)?);
        self.store()?.remove_edge_by_id(&source, &target).map_err(to_py_err)
    }

    fn clear(&self) -> PyResult<()> {
        self.store()?.clear();
        Ok(())
    }

    /// Imports a networkx graph. `None` options follow the graph's own kind.
    #[pyo3(signature = (g, directed=None, multiple_edges=None))]
    fn add_graph_from_networkx(
        &self,
        g: &PyAny,
        directed: Option<bool>,
        multiple_edges: Option<bool>,
        py: Python,
    ) -> PyResult<PyObject> {
        let snapshot = PyGraphSnapshot::read(py, g)?;
        let report = self
            .store()?
            .add_graph_from_attributed(&snapshot, ImportOptions { directed, multiple_edges })
            .map_err(to_py_err)?;
        Ok(report_to_py(py, report))
    }

    #[pyo3(signature = (doc, directed=false, multiple_edges=false))]
    fn add_graph_from_json(&self, doc: &PyAny, directed: bool, multiple_edges: bool, py: Python) -> PyResult<PyObject> {
        let doc = py_to_value(doc)?.to_json();
        let report = self
            .store()?
            .add_graph_from_json(&doc, EdgeOptions::new(directed, multiple_edges))
            .map_err(to_py_err)?;
        Ok(report_to_py(py, report))
    }

    #[pyo3(signature = (path, directed=false, multiple_edges=false))]
    fn add_graph_from_json_file(&self, path: String, directed: bool, multiple_edges: bool, py: Python) -> PyResult<PyObject> {
        let report = self
            .store()?
            .add_graph_from_json_file(path, EdgeOptions::new(directed, multiple_edges))
            .map_err(to_py_err)?;
        Ok(report_to_py(py, report))
    }

    /// Imports a DataFrame (or `(index, dict)` pairs), one parent node per group.
    #[allow(clippy::too_many_arguments)]
    #[pyo3(signature = (rows, groupby_cols, attribute_list=None, edge_columns=None, directed=false, multiple_edges=false))]
    fn add_graph_from_df(
        &self,
        rows: &PyAny,
        groupby_cols: Vec<String>,
        attribute_list: Option<Vec<String>>,
        edge_columns: Option<(String, String)>,
        directed: bool,
        multiple_edges: bool,
        py: Python,
    ) -> PyResult<PyObject> {
        let rows = read_rows(rows)?;
        let table = TabularImport {
            group_by: groupby_cols,
            attributes: attribute_list.unwrap_or_default(),
            edge_columns,
            options: EdgeOptions::new(directed, multiple_edges),
        };
        let report = self.store()?.add_graph_from_rows(&rows, &table).map_err(to_py_err)?;
        Ok(report_to_py(py, report))
    }

    /// Imports `{"nodes": [{identity, labels, properties}], "relationships": [{start, end, type, properties}]}`.
    fn add_graph_from_neo4j(&self, subgraph: &PyAny, py: Python) -> PyResult<PyObject> {
        let subgraph: LabeledSubgraph = serde_json::from_value(py_to_value(subgraph)?.to_json())
            .map_err(|e| PyValueError::new_err(format!("invalid neo4j subgraph: {e}")))?;
        let report = self.store()?.add_graph_from_labeled(&subgraph).map_err(to_py_err)?;
        Ok(report_to_py(py, report))
    }

    /// Node elements in insertion order.
    fn nodes(&self, py: Python) -> PyResult<Vec<PyObject>> {
        self.store()?
            .nodes()
            .iter()
            .map(|n| attributes_to_py(py, &n.to_element()))
            .collect()
    }

    /// Edge elements in insertion order.
    fn edges(&self, py: Python) -> PyResult<Vec<PyObject>> {
        self.store()?
            .edges()
            .iter()
            .map(|e| attributes_to_py(py, &e.to_element()))
            .collect()
    }

    /// `{"nodes": [...], "edges": [...]}` in cytoscape element shape.
    fn to_json(&self, py: Python) -> PyResult<PyObject> {
        let doc = Value::from(self.store()?.to_json());
        value_to_py(py, &doc)
    }

    /// `{source_id: {target_id: count}}`
    fn adjacency(&self, py: Python) -> PyResult<PyObject> {
        let store = self.store()?;
        let outer = PyDict::new(py);
        for (source, neighbors) in store.adjacency().iter() {
            let inner = PyDict::new(py);
            for (target, count) in neighbors {
                inner.set_item(value_to_py(py, &Value::from(target))?, count)?;
            }
            outer.set_item(value_to_py(py, &Value::from(source))?, inner)?;
        }
        Ok(outer.into())
    }

    fn node_count(&self) -> PyResult<usize> {
        Ok(self.store()?.node_count())
    }

    fn edge_count(&self) -> PyResult<usize> {
        Ok(self.store()?.edge_count())
    }

    fn __len__(&self) -> PyResult<usize> {
        self.node_count()
    }
}

/// Module Python cytograph (native bindings)
#[pymodule]
fn cytograph(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<Graph>()?;
    Ok(())
}
