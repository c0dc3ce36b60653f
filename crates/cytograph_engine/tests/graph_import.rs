//! Import adapters (Cytoscape JSON, attributed graphs, tabular rows, labelled
//! subgraphs) and the Cytoscape export.

use cytograph_engine::{
    Attributes, Edge, EdgeOptions, ElementId, GraphError, GraphStore, ImportOptions, ImportReport,
    LabeledNode, LabeledSubgraph, Node, NodeToken, Relationship, Row, SimpleGraph, TabularImport,
    Value,
};
use serde_json::json;
use std::io::Write;

fn attrs(doc: serde_json::Value) -> Attributes {
    match Value::from(doc) {
        Value::Map(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn id(s: &str) -> ElementId {
    ElementId::from(s)
}

fn edge_pairs(graph: &GraphStore) -> Vec<(String, String)> {
    graph
        .edges()
        .iter()
        .map(|e| (e.source().to_string(), e.target().to_string()))
        .collect()
}

fn triangle_doc() -> serde_json::Value {
    json!({
        "nodes": [
            {"data": {"id": "0"}},
            {"data": {"id": "1"}},
            {"data": {"id": "2"}}
        ],
        "edges": [
            {"data": {"source": "0", "target": "1", "weight": "1"}},
            {"data": {"source": "0", "target": "1", "weight": "2"}},
            {"data": {"source": "1", "target": "0"}},
            {"data": {"source": "1", "target": "2"}},
            {"data": {"source": "2", "target": "0"}}
        ]
    })
}

// =============================================================================
// Cytoscape JSON
// =============================================================================

#[test]
fn json_import_applies_edge_options() {
    let mut graph = GraphStore::new();
    let report = graph.add_graph_from_json(&triangle_doc(), EdgeOptions::default()).unwrap();
    assert_eq!(report, ImportReport { nodes_added: 3, edges_added: 3 });
    assert_eq!(graph.edges()[0].get("weight"), Some(&Value::from("1")));

    let mut directed = GraphStore::new();
    let report = directed.add_graph_from_json(&triangle_doc(), EdgeOptions::new(true, false)).unwrap();
    assert_eq!(report.edges_added, 4);

    let mut multi = GraphStore::new();
    let report = multi.add_graph_from_json(&triangle_doc(), EdgeOptions::new(false, true)).unwrap();
    assert_eq!(report.edges_added, 5);
    assert_eq!(multi.adjacency().count(&id("0"), &id("1")), 3);
}

#[test]
fn json_import_reads_element_fields() {
    let doc = json!({
        "nodes": [
            {
                "data": {"id": "a", "label": "Alpha"},
                "classes": "hub core",
                "position": {"x": 10, "y": 20.5},
                "selected": true,
                "grabbable": false
            },
            {"data": {"id": 7}}
        ],
        "edges": [
            {"data": {"source": "a", "target": 7}, "classes": ["heavy"]}
        ]
    });
    let mut graph = GraphStore::new();
    graph.add_graph_from_json(&doc, EdgeOptions::default()).unwrap();

    let a = graph.node(&id("a")).unwrap();
    assert_eq!(a.get("label"), Some(&Value::from("Alpha")));
    assert!(a.classes.contains("hub") && a.classes.contains("core"));
    assert_eq!(a.position.get("y"), Some(&Value::Float(20.5)));
    assert!(a.selected);
    assert!(!a.grabbable);

    assert!(graph.contains_node(&ElementId::Int(7)));
    assert!(!graph.contains_node(&id("7")));
    assert_eq!(graph.edges()[0].target(), &ElementId::Int(7));
    assert_eq!(graph.edges()[0].classes.as_str(), "heavy");
}

#[test]
fn json_import_accepts_elements_wrapper_and_missing_edges() {
    let doc = json!({"elements": {"nodes": [{"data": {"id": "x"}}]}});
    let mut graph = GraphStore::new();
    let report = graph.add_graph_from_json(&doc, EdgeOptions::default()).unwrap();
    assert_eq!(report, ImportReport { nodes_added: 1, edges_added: 0 });
}

#[test]
fn json_import_rejects_malformed_documents() {
    let mut graph = GraphStore::new();
    let cases = [
        json!({"edges": []}),
        json!({"nodes": {"id": "a"}}),
        json!({"nodes": ["a"]}),
        json!({"nodes": [{"data": {"label": "no id"}}]}),
        json!({"nodes": [], "edges": [{"data": {"source": "a"}}]}),
        json!([1, 2, 3]),
    ];
    for doc in cases {
        let err = graph.add_graph_from_json(&doc, EdgeOptions::default()).unwrap_err();
        assert!(matches!(err, GraphError::MalformedInput(_)), "{doc}: {err}");
    }
    assert!(graph.is_empty());
}

#[test]
fn json_import_is_all_or_nothing() {
    let doc = json!({
        "nodes": [{"data": {"id": "a"}}, {"data": {"id": "b"}, "locked": "yes"}],
        "edges": []
    });
    let mut graph = GraphStore::new();
    assert!(graph.add_graph_from_json(&doc, EdgeOptions::default()).is_err());
    assert!(graph.is_empty());
}

#[test]
fn json_str_reports_parse_errors() {
    let mut graph = GraphStore::new();
    let err = graph.add_graph_from_json_str("{not json", EdgeOptions::default()).unwrap_err();
    assert!(matches!(err, GraphError::Serialization(_)));
}

#[test]
fn json_file_import() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", triangle_doc()).unwrap();

    let mut graph = GraphStore::new();
    let report = graph
        .add_graph_from_json_file(file.path(), EdgeOptions::new(true, false))
        .unwrap();
    assert_eq!(report, ImportReport { nodes_added: 3, edges_added: 4 });
}

#[test]
fn json_file_missing_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut graph = GraphStore::new();
    let err = graph
        .add_graph_from_json_file(dir.path().join("absent.json"), EdgeOptions::default())
        .unwrap_err();
    assert!(matches!(err, GraphError::Io(_)));
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn export_shape() {
    let mut graph = GraphStore::new();
    graph.add_node(Node::new("a").with_classes("hub"));
    graph.add_edge(Edge::new("a", "b"), EdgeOptions::new(true, false));

    assert_eq!(
        graph.to_json(),
        json!({
            "nodes": [
                {"data": {"id": "a"}, "classes": "hub"},
                {"data": {"id": "b"}}
            ],
            "edges": [
                {"data": {"source": "a", "target": "b"}, "classes": "directed"}
            ]
        })
    );
}

#[test]
fn export_then_import_reproduces_the_store() {
    let options = EdgeOptions::new(true, true);
    let mut original = GraphStore::new();
    let mut position = Attributes::new();
    position.insert("x".into(), Value::Float(1.5));
    position.insert("y".into(), Value::Int(-3));
    original.add_node(Node::new("a").with_classes("hub").with_position(position));
    original.add_node(Node::new(5));
    original.add_edges(
        vec![
            Edge::new("a", 5).with_data("weight", 2).unwrap(),
            Edge::new("a", 5),
            Edge::new(5, "a"),
            Edge::new("c", "c"),
        ],
        options,
    );
    original.update_node_data(&id("a"), "tags", vec![Value::from("x"), Value::Null]).unwrap();

    let mut copy = GraphStore::new();
    copy.add_graph_from_json(&original.to_json(), options).unwrap();

    assert_eq!(copy.nodes(), original.nodes());
    assert_eq!(copy.edges(), original.edges());
    assert_eq!(copy.adjacency(), original.adjacency());
}

// =============================================================================
// Attributed graphs
// =============================================================================

#[test]
fn attributed_import_splits_fields_from_data() {
    let mut source = SimpleGraph::new();
    source.add_node("a", attrs(json!({"color": "red", "classes": "hub"})));
    source.add_raw_edge("a", "b", attrs(json!({"weight": 2})));

    let mut graph = GraphStore::new();
    let report = graph.add_graph_from_attributed(&source, ImportOptions::default()).unwrap();
    assert_eq!(report, ImportReport { nodes_added: 2, edges_added: 1 });

    let a = graph.node(&id("a")).unwrap();
    assert_eq!(a.get("color"), Some(&Value::from("red")));
    assert!(a.get("classes").is_none());
    assert!(a.classes.contains("hub"));
    assert_eq!(graph.edges()[0].get("weight"), Some(&Value::Int(2)));
    assert!(graph.edges()[0].classes.is_empty());
}

#[test]
fn attributed_import_follows_graph_kind_unless_overridden() {
    let mut source = SimpleGraph::multi_directed();
    source.add_raw_edge("a", "b", Attributes::new());
    source.add_raw_edge("a", "b", Attributes::new());
    source.add_raw_edge("b", "a", Attributes::new());

    let mut inferred = GraphStore::new();
    inferred.add_graph_from_attributed(&source, ImportOptions::default()).unwrap();
    assert_eq!(inferred.edge_count(), 3);
    assert_eq!(inferred.edges()[0].classes.as_str(), "directed multiple_edges");
    assert_eq!(inferred.adjacency().count(&id("a"), &id("b")), 2);

    let mut simple = GraphStore::new();
    let forced = ImportOptions { directed: Some(false), multiple_edges: Some(false) };
    simple.add_graph_from_attributed(&source, forced).unwrap();
    assert_eq!(edge_pairs(&simple), vec![("a".to_string(), "b".to_string())]);
}

#[test]
fn attributed_import_reuses_records() {
    let record = Node::new("r").with_classes("custom");
    let mut source = SimpleGraph::directed();
    source.add_record(record.clone());
    source.add_edge(NodeToken::Record(record.clone()), NodeToken::Raw(Value::from("s")), Attributes::new());

    let mut graph = GraphStore::new();
    graph.add_graph_from_attributed(&source, ImportOptions::default()).unwrap();

    assert_eq!(graph.nodes()[0], record);
    assert_eq!(edge_pairs(&graph), vec![("r".to_string(), "s".to_string())]);
}

#[test]
fn attributed_import_ids_from_tokens() {
    let mut source = SimpleGraph::new();
    source.add_node(7, Attributes::new());
    source.add_node("tok", attrs(json!({"id": 42})));

    let mut graph = GraphStore::new();
    graph.add_graph_from_attributed(&source, ImportOptions::default()).unwrap();

    let ids: Vec<&ElementId> = graph.nodes().iter().map(|n| n.id()).collect();
    assert_eq!(ids, vec![&id("7"), &ElementId::Int(42)]);
}

#[test]
fn attributed_import_names_tuple_tokens_like_python() {
    let cell = |r: i64, c: i64| Value::Array(vec![Value::Int(r), Value::Int(c)]);
    let mut source = SimpleGraph::new();
    source.add_raw_edge(cell(0, 0), cell(0, 1), Attributes::new());
    source.add_raw_edge(cell(0, 0), cell(1, 0), Attributes::new());
    source.add_node(true, Attributes::new());

    let mut graph = GraphStore::new();
    graph.add_graph_from_attributed(&source, ImportOptions::default()).unwrap();

    let ids: Vec<String> = graph.nodes().iter().map(|n| n.id().to_string()).collect();
    assert_eq!(ids, vec!["(0, 0)", "(0, 1)", "(1, 0)", "True"]);
    assert_eq!(
        edge_pairs(&graph),
        vec![
            ("(0, 0)".to_string(), "(0, 1)".to_string()),
            ("(0, 0)".to_string(), "(1, 0)".to_string()),
        ]
    );
    assert_eq!(graph.node_count(), graph.adjacency().len());
}

#[test]
fn simple_graph_merges_repeated_nodes() {
    let mut source = SimpleGraph::new();
    source.add_node("a", attrs(json!({"x": 1})));
    source.add_raw_edge("b", "a", Attributes::new());
    source.add_node("a", attrs(json!({"y": 2})));

    let mut graph = GraphStore::new();
    graph.add_graph_from_attributed(&source, ImportOptions::default()).unwrap();

    let ids: Vec<String> = graph.nodes().iter().map(|n| n.id().to_string()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    let a = graph.node(&id("a")).unwrap();
    assert_eq!(a.get("x"), Some(&Value::Int(1)));
    assert_eq!(a.get("y"), Some(&Value::Int(2)));
}

#[test]
fn attributed_import_rejects_bad_fields() {
    let mut source = SimpleGraph::new();
    source.add_node("a", Attributes::new());
    source.add_node("b", attrs(json!({"selected": "yes"})));

    let mut graph = GraphStore::new();
    let err = graph.add_graph_from_attributed(&source, ImportOptions::default()).unwrap_err();
    assert!(matches!(err, GraphError::MalformedInput(_)));
    assert!(graph.is_empty());
}

// =============================================================================
// Tabular rows
// =============================================================================

fn team_rows() -> Vec<Row> {
    vec![
        Row::new(0, attrs(json!({"team": "b", "score": 1, "next": 1}))),
        Row::new(1, attrs(json!({"team": "a", "score": 2, "next": 2}))),
        Row::new(2, attrs(json!({"team": "b", "score": 3, "next": 0}))),
    ]
}

#[test]
fn tabular_import_builds_parents_and_children() {
    let table = TabularImport {
        group_by: vec!["team".into()],
        attributes: vec!["team".into(), "score".into()],
        ..TabularImport::default()
    };
    let mut graph = GraphStore::new();
    let report = graph.add_graph_from_rows(&team_rows(), &table).unwrap();
    assert_eq!(report, ImportReport { nodes_added: 5, edges_added: 0 });

    let ids: Vec<String> = graph.nodes().iter().map(|n| n.id().to_string()).collect();
    assert_eq!(ids, vec!["parent-0", "parent-1", "0", "1", "2"]);

    let parent = graph.node(&id("parent-1")).unwrap();
    assert_eq!(parent.get("name"), Some(&Value::Array(vec![Value::from("b")])));

    let child = graph.node(&ElementId::Int(0)).unwrap();
    assert_eq!(child.get("parent"), Some(&Value::from("parent-1")));
    assert_eq!(child.get("name"), Some(&Value::from("team: b\nscore: 1\n")));
}

#[test]
fn tabular_import_groups_on_several_columns() {
    let rows = vec![
        Row::new("r1", attrs(json!({"team": "a", "year": 2020}))),
        Row::new("r2", attrs(json!({"team": "a", "year": 2019}))),
        Row::new("r3", attrs(json!({"team": "a", "year": 2020}))),
    ];
    let table = TabularImport {
        group_by: vec!["team".into(), "year".into()],
        ..TabularImport::default()
    };
    let mut graph = GraphStore::new();
    graph.add_graph_from_rows(&rows, &table).unwrap();

    let parent = graph.node(&id("parent-0")).unwrap();
    assert_eq!(parent.get("name"), Some(&Value::Array(vec![Value::from("a"), Value::Int(2019)])));
    assert_eq!(graph.node(&id("r3")).unwrap().get("parent"), Some(&Value::from("parent-1")));
    assert_eq!(graph.node(&id("r1")).unwrap().get("name"), Some(&Value::from("")));
}

#[test]
fn tabular_import_with_edge_columns() {
    let table = TabularImport {
        group_by: vec!["team".into()],
        edge_columns: Some(("index".into(), "next".into())),
        options: EdgeOptions::new(true, false),
        ..TabularImport::default()
    };
    let rows: Vec<Row> = team_rows()
        .into_iter()
        .map(|mut row| {
            row.values.insert("index".into(), Value::from(&row.index));
            row
        })
        .collect();

    let mut graph = GraphStore::new();
    let report = graph.add_graph_from_rows(&rows, &table).unwrap();
    assert_eq!(report, ImportReport { nodes_added: 5, edges_added: 3 });
    assert_eq!(
        edge_pairs(&graph),
        vec![
            ("0".to_string(), "1".to_string()),
            ("1".to_string(), "2".to_string()),
            ("2".to_string(), "0".to_string()),
        ]
    );
}

#[test]
fn tabular_import_rejects_missing_columns() {
    let mut graph = GraphStore::new();
    let no_groups = TabularImport::default();
    assert!(graph.add_graph_from_rows(&team_rows(), &no_groups).is_err());

    let unknown = TabularImport {
        group_by: vec!["team".into()],
        attributes: vec!["missing".into()],
        ..TabularImport::default()
    };
    let err = graph.add_graph_from_rows(&team_rows(), &unknown).unwrap_err();
    assert_eq!(err.to_string(), "malformed input: row 0 has no column `missing`");
    assert!(graph.is_empty());
}

// =============================================================================
// Labelled subgraphs
// =============================================================================

fn movie_subgraph() -> LabeledSubgraph {
    serde_json::from_value(json!({
        "nodes": [
            {"identity": 1, "labels": ["Person", "Actor"], "properties": {"name": "Keanu"}},
            {"identity": 2, "labels": ["Person", "Director"], "properties": {"name": "Lana"}},
            {"identity": 3, "labels": ["Movie"], "properties": {"title": "The Matrix"}},
            {"identity": 4}
        ],
        "relationships": [
            {"start": 1, "end": 3, "type": "ACTED_IN"},
            {"start": 2, "end": 3, "type": "DIRECTED", "properties": {"year": 1999}}
        ]
    }))
    .unwrap()
}

#[test]
fn labeled_subgraph_deserializes() {
    let graph = movie_subgraph();
    assert_eq!(graph.nodes.len(), 4);
    assert!(graph.nodes[3].labels.is_empty());
    assert_eq!(
        graph.relationships[0],
        Relationship {
            start: 1,
            end: 3,
            rel_type: "ACTED_IN".into(),
            properties: Attributes::new(),
        }
    );
}

#[test]
fn labeled_import_sets_id_label_and_tooltip() {
    let mut graph = GraphStore::new();
    let report = graph.add_graph_from_labeled(&movie_subgraph()).unwrap();
    assert_eq!(report, ImportReport { nodes_added: 4, edges_added: 2 });

    let keanu = graph.node(&ElementId::Int(1)).unwrap();
    assert_eq!(keanu.get("label"), Some(&Value::from("Actor")));
    assert_eq!(keanu.get("tooltip"), Some(&Value::from("Person,Actor\nname:Keanu")));
    assert_eq!(keanu.get("name"), Some(&Value::from("Keanu")));

    assert_eq!(graph.node(&ElementId::Int(3)).unwrap().get("label"), Some(&Value::from("Movie")));
    assert!(graph.node(&ElementId::Int(4)).unwrap().get("label").is_none());

    let directed = &graph.edges()[1];
    assert_eq!(directed.get("name"), Some(&Value::from("DIRECTED")));
    assert_eq!(directed.get("year"), Some(&Value::Int(1999)));
    assert_eq!(directed.classes.as_str(), "directed multiple_edges");
}

#[test]
fn labeled_import_keeps_existing_tooltip_and_name() {
    let subgraph = LabeledSubgraph {
        nodes: vec![LabeledNode {
            identity: 9,
            labels: vec!["Thing".into()],
            properties: attrs(json!({"tooltip": "custom"})),
        }],
        relationships: vec![Relationship {
            start: 9,
            end: 9,
            rel_type: "SELF".into(),
            properties: attrs(json!({"name": "loop"})),
        }],
    };
    let mut graph = GraphStore::new();
    graph.add_graph_from_labeled(&subgraph).unwrap();

    assert_eq!(graph.nodes()[0].get("tooltip"), Some(&Value::from("custom")));
    assert_eq!(graph.edges()[0].get("name"), Some(&Value::from("loop")));
}

#[test]
fn labeled_import_twice_adds_parallel_relationships_only() {
    let mut graph = GraphStore::new();
    graph.add_graph_from_labeled(&movie_subgraph()).unwrap();
    let report = graph.add_graph_from_labeled(&movie_subgraph()).unwrap();

    assert_eq!(report, ImportReport { nodes_added: 0, edges_added: 2 });
    assert_eq!(graph.adjacency().count(&ElementId::Int(1), &ElementId::Int(3)), 2);
    assert!(!graph.adjacency().contains(&ElementId::Int(3), &ElementId::Int(1)));
}
