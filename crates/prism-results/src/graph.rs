//! Property-graph projection of query results, ready for a graph renderer.
//!
//! Walks the flattened result values, keeps every node and relationship
//! (paths are opened up into their segments), and drops everything else.
//! Each element id appears at most once; the first occurrence wins.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::color::{Color, ColorPalette};
use crate::value::{RawNode, RawRelationship, TypedValue};

/// Discriminates the two element shapes in serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Relationship,
}

/// A renderable node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    /// Element id of the source node.
    pub id: String,
    /// First declared property, as text. Falls back to the node type.
    pub caption: String,
    /// Shared by every node of the same type.
    pub color: Color,
    /// Decoded properties, declaration order preserved.
    pub properties: Map<String, Value>,
    pub kind: ElementKind,
    /// Primary type (first label).
    #[serde(rename = "type")]
    pub node_type: String,
    pub selected: bool,
}

/// A renderable relationship.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphRelationship {
    pub id: String,
    /// Start node element id.
    pub from: String,
    /// End node element id.
    pub to: String,
    /// The relationship type.
    pub caption: String,
    pub properties: Map<String, Value>,
    pub kind: ElementKind,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub selected: bool,
}

/// Nodes and relationships in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphProjection {
    pub nodes: Vec<GraphNode>,
    pub relationships: Vec<GraphRelationship>,
}

impl GraphProjection {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn relationship(&self, id: &str) -> Option<&GraphRelationship> {
        self.relationships.iter().find(|r| r.id == id)
    }
}

impl GraphNode {
    pub fn from_raw(node: &RawNode, palette: &mut ColorPalette) -> Self {
        let node_type = node.primary_type().to_string();
        Self {
            id: node.element_id.clone(),
            caption: node_caption(node),
            color: palette.color_for(&node_type),
            properties: node.properties.to_json_map(),
            kind: ElementKind::Node,
            node_type,
            selected: false,
        }
    }
}

impl From<&RawRelationship> for GraphRelationship {
    fn from(rel: &RawRelationship) -> Self {
        Self {
            id: rel.element_id.clone(),
            from: rel.start_element_id.clone(),
            to: rel.end_element_id.clone(),
            caption: rel.rel_type.clone(),
            properties: rel.properties.to_json_map(),
            kind: ElementKind::Relationship,
            rel_type: rel.rel_type.clone(),
            selected: false,
        }
    }
}

/// Project `rows` into a graph, with a palette local to this call.
pub fn project_graph(rows: &[TypedValue]) -> GraphProjection {
    project_graph_with_palette(rows, &mut ColorPalette::new())
}

/// Project `rows` into a graph, drawing type colors from `palette`.
///
/// Passing the same palette to several projections keeps its cache warm
/// across calls.
pub fn project_graph_with_palette(
    rows: &[TypedValue],
    palette: &mut ColorPalette,
) -> GraphProjection {
    let mut projection = GraphProjection::default();
    let mut seen_nodes = HashSet::new();
    let mut seen_relationships = HashSet::new();

    for value in rows.iter().flat_map(path_segments) {
        match value {
            TypedValue::Node(node) => {
                if seen_nodes.insert(node.element_id.as_str()) {
                    projection.nodes.push(GraphNode::from_raw(node, palette));
                }
            }
            TypedValue::Relationship(rel) => {
                if seen_relationships.insert(rel.element_id.as_str()) {
                    projection.relationships.push(GraphRelationship::from(rel));
                }
            }
            // Scalars and collections only feed the table.
            _ => {}
        }
    }

    tracing::debug!(
        nodes = projection.nodes.len(),
        relationships = projection.relationships.len(),
        types = palette.len(),
        "Graph projection built"
    );
    projection
}

/// A path's segments, or the value itself. Opens one level only.
fn path_segments(value: &TypedValue) -> &[TypedValue] {
    match value {
        TypedValue::Path(segments) => segments,
        other => std::slice::from_ref(other),
    }
}

fn node_caption(node: &RawNode) -> String {
    match node.properties.first() {
        Some((_, value)) => caption_text(&value.to_plain_json()),
        None if !node.primary_type().is_empty() => node.primary_type().to_string(),
        None => node.element_id.clone(),
    }
}

/// Strings verbatim, arrays comma-joined, anything else as JSON text.
fn caption_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(caption_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn typed(value: Value) -> TypedValue {
        serde_json::from_value(value).unwrap()
    }

    fn person(id: &str, name: &str) -> Value {
        json!({
            "$type": "Node",
            "_value": {
                "_element_id": id,
                "_labels": ["Person"],
                "_properties": {"name": {"$type": "String", "_value": name}}
            }
        })
    }

    fn knows(id: &str, from: &str, to: &str) -> Value {
        json!({
            "$type": "Relationship",
            "_value": {
                "_element_id": id,
                "_start_node_element_id": from,
                "_end_node_element_id": to,
                "_type": "KNOWS",
                "_properties": {"since": {"$type": "Integer", "_value": 2020}}
            }
        })
    }

    #[test]
    fn test_single_node() {
        let graph = project_graph(&[typed(person("1", "Alice"))]);
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.relationships.is_empty());

        let node = &graph.nodes[0];
        assert_eq!(node.id, "1");
        assert_eq!(node.caption, "Alice");
        assert_eq!(node.node_type, "Person");
        assert_eq!(node.kind, ElementKind::Node);
        assert_eq!(Value::Object(node.properties.clone()), json!({"name": "Alice"}));
        assert_eq!(node.color, Color::for_label("Person"));
        assert!(!node.selected);
    }

    #[test]
    fn test_relationship() {
        let graph = project_graph(&[typed(knows("r1", "1", "2"))]);
        let rel = graph.relationship("r1").unwrap();
        assert_eq!(rel.from, "1");
        assert_eq!(rel.to, "2");
        assert_eq!(rel.caption, "KNOWS");
        assert_eq!(rel.rel_type, "KNOWS");
        assert_eq!(rel.kind, ElementKind::Relationship);
        assert_eq!(rel.properties["since"], json!(2020));
    }

    #[test]
    fn test_duplicate_element_ids_collapse() {
        let rows = [
            typed(person("1", "Alice")),
            typed(knows("r1", "1", "2")),
            typed(person("2", "Bob")),
            typed(person("1", "Alice")),
            typed(knows("r1", "1", "2")),
        ];
        let graph = project_graph(&rows);
        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(graph.relationships.len(), 1);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let graph = project_graph(&[typed(person("1", "Alice")), typed(person("1", "Alicia"))]);
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].caption, "Alice");
    }

    #[test]
    fn test_paths_are_flattened() {
        let path = json!({
            "$type": "Path",
            "_value": [person("1", "Alice"), knows("r1", "1", "2"), person("2", "Bob")]
        });
        let graph = project_graph(&[typed(path), typed(person("2", "Bob"))]);
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.relationships.len(), 1);
        assert_eq!(graph.node("2").unwrap().caption, "Bob");
    }

    #[test]
    fn test_scalars_are_ignored() {
        let rows = [
            typed(json!({"$type": "Integer", "_value": 7})),
            typed(json!({"$type": "List", "_value": [person("1", "Alice")]})),
        ];
        assert!(project_graph(&rows).is_empty());
    }

    #[test]
    fn test_list_properties_are_unwrapped() {
        let node = json!({
            "$type": "Node",
            "_value": {
                "_element_id": "7",
                "_labels": ["AS"],
                "_properties": {
                    "asn": {"$type": "Integer", "_value": 2497},
                    "tags": {"$type": "List", "_value": [{"_value": 1}, {"_value": 2}]}
                }
            }
        });
        let graph = project_graph(&[typed(node)]);
        assert_eq!(graph.nodes[0].properties["tags"], json!([1, 2]));
        assert_eq!(graph.nodes[0].caption, "2497");
    }

    #[test]
    fn test_caption_from_list_property() {
        let node = json!({
            "$type": "Node",
            "_value": {
                "_element_id": "9",
                "_labels": ["Tag"],
                "_properties": {
                    "names": {"$type": "List", "_value": [
                        {"$type": "String", "_value": "a"},
                        {"$type": "String", "_value": "b"}
                    ]}
                }
            }
        });
        assert_eq!(project_graph(&[typed(node)]).nodes[0].caption, "a,b");
    }

    #[test]
    fn test_caption_falls_back_without_properties() {
        let labeled = json!({
            "$type": "Node",
            "_value": {"_element_id": "3", "_labels": ["Country"], "_properties": {}}
        });
        let unlabeled = json!({
            "$type": "Node",
            "_value": {"_element_id": "4", "_labels": [], "_properties": {}}
        });
        let graph = project_graph(&[typed(labeled), typed(unlabeled)]);
        assert_eq!(graph.nodes[0].caption, "Country");
        assert_eq!(graph.nodes[1].caption, "4");
        assert_eq!(graph.nodes[1].node_type, "");
    }

    #[test]
    fn test_nodes_of_one_type_share_a_color() {
        let graph = project_graph(&[typed(person("1", "Alice")), typed(person("2", "Bob"))]);
        assert_eq!(graph.nodes[0].color, graph.nodes[1].color);
    }

    #[test]
    fn test_shared_palette_accumulates() {
        let mut palette = ColorPalette::new();
        project_graph_with_palette(&[typed(person("1", "Alice"))], &mut palette);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.get("Person"), Some(&Color::for_label("Person")));
    }

    #[test]
    fn test_serialized_shape() {
        let graph = project_graph(&[typed(person("1", "Alice")), typed(knows("r1", "1", "2"))]);
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["nodes"][0]["kind"], "node");
        assert_eq!(json["nodes"][0]["type"], "Person");
        assert_eq!(json["nodes"][0]["selected"], false);
        assert_eq!(json["relationships"][0]["kind"], "relationship");
        assert_eq!(json["relationships"][0]["from"], "1");
        assert_eq!(json["relationships"][0]["type"], "KNOWS");
    }
}
