//! Node and edge records in the cytoscape.js element shape.

use crate::{Attributes, ElementId, GraphError, GraphResult, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Edge tag: adjacency is recorded in the source -> target direction only.
pub const CLASS_DIRECTED: &str = "directed";
/// Edge tag: parallel edges between the same endpoints are counted.
pub const CLASS_MULTIPLE_EDGES: &str = "multiple_edges";

// -----------------------
// Classes
// -----------------------

/// Space-separated tag string. Membership is token based.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Classes(String);

impl Classes {
    pub fn new(tags: &str) -> Self {
        Self(tags.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.iter().any(|t| t == tag)
    }

    /// Appends `tag` unless already present. Returns whether it was added.
    pub fn insert(&mut self, tag: &str) -> bool {
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        if !self.0.is_empty() {
            self.0.push(' ');
        }
        self.0.push_str(tag);
        true
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        if !self.contains(tag) {
            return false;
        }
        self.0 = self.iter().filter(|t| *t != tag).collect::<Vec<_>>().join(" ");
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Classes {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Classes {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<Classes> for String {
    fn from(c: Classes) -> Self {
        c.0
    }
}

impl fmt::Display for Classes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// -----------------------
// Node
// -----------------------

/// A graph node. `data["id"]` always mirrors [`Node::id`].
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    id: ElementId,
    data: Attributes,
    pub classes: Classes,
    pub position: Attributes,
    pub selected: bool,
    pub selectable: bool,
    pub locked: bool,
    pub grabbable: bool,
    pub pannable: bool,
    pub removed: bool,
}

impl Node {
    pub fn new(id: impl Into<ElementId>) -> Self {
        let id = id.into();
        let mut data = Attributes::new();
        data.insert("id".to_string(), Value::from(&id));
        Self {
            id,
            data,
            classes: Classes::default(),
            position: Attributes::new(),
            selected: false,
            selectable: false,
            locked: false,
            grabbable: true,
            pannable: false,
            removed: false,
        }
    }

    /// Build a node from its `data` bag, which must carry a valid `id`.
    pub fn from_data(data: Attributes) -> GraphResult<Self> {
        let id = match data.get("id") {
            Some(v) => ElementId::try_from(v)?,
            None => return Err(GraphError::MalformedInput("node data has no `id`".into())),
        };
        let mut node = Node::new(id);
        node.data = data;
        Ok(node)
    }

    /// Build a node from a cytoscape element object (`{"data": .., "classes": .., "position": ..}`).
    /// Keys that are not element fields fold into `data`. `fallback_id` is used when
    /// neither `data` nor the loose keys provide an `id`.
    pub fn from_attributes(attrs: Attributes, fallback_id: Option<ElementId>) -> GraphResult<Self> {
        let (mut data, fields) = split_attributes(attrs, NODE_FIELDS)?;
        if !data.contains_key("id") {
            if let Some(id) = fallback_id {
                data.insert("id".to_string(), Value::from(&id));
            }
        }
        let mut node = Node::from_data(data)?;
        for (key, value) in fields {
            node.apply_field(&key, value)?;
        }
        Ok(node)
    }

    pub fn with_classes(mut self, classes: impl Into<Classes>) -> Self {
        self.classes = classes.into();
        self
    }

    pub fn with_position(mut self, position: Attributes) -> Self {
        self.position = position;
        self
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn data(&self) -> &Attributes {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Set a `data` entry, returning the previous value. Setting `id` re-validates it.
    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<Value>) -> GraphResult<Option<Value>> {
        let key = key.into();
        let value = value.into();
        if key == "id" {
            self.id = ElementId::try_from(&value)?;
        }
        Ok(self.data.insert(key, value))
    }

    pub fn remove_data(&mut self, key: &str) -> GraphResult<Option<Value>> {
        if key == "id" {
            return Err(GraphError::MalformedInput("node `id` cannot be removed".into()));
        }
        Ok(self.data.shift_remove(key))
    }

    /// Cytoscape element object. Flags are emitted only when they differ from their defaults.
    pub fn to_element(&self) -> Attributes {
        let mut el = Attributes::new();
        el.insert("data".to_string(), Value::Map(self.data.clone()));
        if !self.position.is_empty() {
            el.insert("position".to_string(), Value::Map(self.position.clone()));
        }
        if !self.classes.is_empty() {
            el.insert("classes".to_string(), Value::from(self.classes.as_str()));
        }
        let flags = [
            ("selected", self.selected, false),
            ("selectable", self.selectable, false),
            ("locked", self.locked, false),
            ("grabbable", self.grabbable, true),
            ("pannable", self.pannable, false),
            ("removed", self.removed, false),
        ];
        for (name, value, default) in flags {
            if value != default {
                el.insert(name.to_string(), Value::Bool(value));
            }
        }
        el
    }

    fn apply_field(&mut self, key: &str, value: Value) -> GraphResult<()> {
        match key {
            "classes" => self.classes = expect_classes(key, value)?,
            "position" => self.position = expect_map(key, value)?,
            "selected" => self.selected = expect_bool(key, &value)?,
            "selectable" => self.selectable = expect_bool(key, &value)?,
            "locked" => self.locked = expect_bool(key, &value)?,
            "grabbable" => self.grabbable = expect_bool(key, &value)?,
            "pannable" => self.pannable = expect_bool(key, &value)?,
            "removed" => self.removed = expect_bool(key, &value)?,
            _ => {
                self.set_data(key, value)?;
            }
        }
        Ok(())
    }
}

// -----------------------
// Edge
// -----------------------

/// A graph edge. `data["source"]` and `data["target"]` always mirror the endpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    source: ElementId,
    target: ElementId,
    data: Attributes,
    pub classes: Classes,
    pub selected: bool,
    pub selectable: bool,
    pub pannable: bool,
    pub removed: bool,
}

impl Edge {
    pub fn new(source: impl Into<ElementId>, target: impl Into<ElementId>) -> Self {
        let source = source.into();
        let target = target.into();
        let mut data = Attributes::new();
        data.insert("source".to_string(), Value::from(&source));
        data.insert("target".to_string(), Value::from(&target));
        Self {
            source,
            target,
            data,
            classes: Classes::default(),
            selected: false,
            selectable: false,
            pannable: true,
            removed: false,
        }
    }

    /// Build an edge from its `data` bag, which must carry valid `source` and `target`.
    pub fn from_data(data: Attributes) -> GraphResult<Self> {
        let endpoint = |key: &str| match data.get(key) {
            Some(v) => ElementId::try_from(v),
            None => Err(GraphError::MalformedInput(format!("edge data has no `{key}`"))),
        };
        let mut edge = Edge::new(endpoint("source")?, endpoint("target")?);
        edge.data = data;
        Ok(edge)
    }

    /// Build an edge from a cytoscape element object. Keys that are not element
    /// fields fold into `data`.
    pub fn from_attributes(attrs: Attributes) -> GraphResult<Self> {
        let (data, fields) = split_attributes(attrs, EDGE_FIELDS)?;
        let mut edge = Edge::from_data(data)?;
        for (key, value) in fields {
            edge.apply_field(&key, value)?;
        }
        Ok(edge)
    }

    pub fn with_classes(mut self, classes: impl Into<Classes>) -> Self {
        self.classes = classes.into();
        self
    }

    /// Adds a `data` entry in builder style. Endpoint keys are re-validated.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> GraphResult<Self> {
        self.set_data(key, value)?;
        Ok(self)
    }

    pub fn source(&self) -> &ElementId {
        &self.source
    }

    pub fn target(&self) -> &ElementId {
        &self.target
    }

    pub fn data(&self) -> &Attributes {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<Value>) -> GraphResult<Option<Value>> {
        let key = key.into();
        let value = value.into();
        match key.as_str() {
            "source" => self.source = ElementId::try_from(&value)?,
            "target" => self.target = ElementId::try_from(&value)?,
            _ => {}
        }
        Ok(self.data.insert(key, value))
    }

    pub fn remove_data(&mut self, key: &str) -> GraphResult<Option<Value>> {
        if key == "source" || key == "target" {
            return Err(GraphError::MalformedInput(format!("edge `{key}` cannot be removed")));
        }
        Ok(self.data.shift_remove(key))
    }

    pub fn is_directed(&self) -> bool {
        self.classes.contains(CLASS_DIRECTED)
    }

    /// Equality that ignores the `directed` and `multiple_edges` tags, so the value
    /// handed to `add_edges` still matches the copy the store tagged.
    pub fn same_record(&self, other: &Edge) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.data == other.data
            && self.selected == other.selected
            && self.selectable == other.selectable
            && self.pannable == other.pannable
            && self.removed == other.removed
            && self.untagged_classes() == other.untagged_classes()
    }

    fn untagged_classes(&self) -> Classes {
        let mut classes = self.classes.clone();
        classes.remove(CLASS_DIRECTED);
        classes.remove(CLASS_MULTIPLE_EDGES);
        classes
    }

    /// True when the edge runs `source -> target`, or `target -> source` for an undirected edge.
    pub fn connects(&self, source: &ElementId, target: &ElementId) -> bool {
        (self.source == *source && self.target == *target)
            || (!self.is_directed() && self.source == *target && self.target == *source)
    }

    pub fn to_element(&self) -> Attributes {
        let mut el = Attributes::new();
        el.insert("data".to_string(), Value::Map(self.data.clone()));
        if !self.classes.is_empty() {
            el.insert("classes".to_string(), Value::from(self.classes.as_str()));
        }
        let flags = [
            ("selected", self.selected, false),
            ("selectable", self.selectable, false),
            ("pannable", self.pannable, true),
            ("removed", self.removed, false),
        ];
        for (name, value, default) in flags {
            if value != default {
                el.insert(name.to_string(), Value::Bool(value));
            }
        }
        el
    }

    fn apply_field(&mut self, key: &str, value: Value) -> GraphResult<()> {
        match key {
            "classes" => self.classes = expect_classes(key, value)?,
            "selected" => self.selected = expect_bool(key, &value)?,
            "selectable" => self.selectable = expect_bool(key, &value)?,
            "pannable" => self.pannable = expect_bool(key, &value)?,
            "removed" => self.removed = expect_bool(key, &value)?,
            _ => {
                self.set_data(key, value)?;
            }
        }
        Ok(())
    }
}

// -----------------------
// Attribute splitting
// -----------------------

const NODE_FIELDS: &[&str] = &[
    "classes", "position", "selected", "selectable", "locked", "grabbable", "pannable", "removed",
];
const EDGE_FIELDS: &[&str] = &["classes", "selected", "selectable", "pannable", "removed"];

type FieldList = Vec<(String, Value)>;

/// Separates element fields from data entries. A nested `data` object is merged into the
/// data bag; loose keys are folded in after it.
fn split_attributes(attrs: Attributes, fields: &[&str]) -> GraphResult<(Attributes, FieldList)> {
    let mut data = Attributes::new();
    let mut loose = Attributes::new();
    let mut structural = Vec::new();
    for (key, value) in attrs {
        if key == "data" {
            data.extend(expect_map("data", value)?);
        } else if fields.contains(&key.as_str()) {
            structural.push((key, value));
        } else {
            loose.insert(key, value);
        }
    }
    data.extend(loose);
    Ok((data, structural))
}

fn expect_bool(key: &str, value: &Value) -> GraphResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| GraphError::MalformedInput(format!("`{key}` must be a bool, got {}", value.kind())))
}

fn expect_map(key: &str, value: Value) -> GraphResult<Attributes> {
    match value {
        Value::Map(m) => Ok(m),
        Value::Null => Ok(Attributes::new()),
        other => Err(GraphError::MalformedInput(format!("`{key}` must be a map, got {}", other.kind()))),
    }
}

fn expect_classes(key: &str, value: Value) -> GraphResult<Classes> {
    match value {
        Value::String(s) => Ok(Classes::new(&s)),
        Value::Array(tags) => {
            let mut classes = Classes::default();
            for tag in tags {
                match tag {
                    Value::String(t) => {
                        for part in t.split_whitespace() {
                            classes.insert(part);
                        }
                    }
                    other => {
                        return Err(GraphError::MalformedInput(format!(
                            "`{key}` entries must be strings, got {}",
                            other.kind()
                        )))
                    }
                }
            }
            Ok(classes)
        }
        Value::Null => Ok(Classes::default()),
        other => Err(GraphError::MalformedInput(format!("`{key}` must be a string, got {}", other.kind()))),
    }
}
