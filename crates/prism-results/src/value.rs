//! Typed values as returned by the Neo4j HTTP Query API.
//!
//! Every value on the wire is an object of the form
//! `{"$type": "<Type>", "_value": <payload>}`. Primitives carry their raw
//! scalar as the payload; composites (lists, maps, nodes, relationships,
//! paths) carry nested typed values.
//!
//! Parsing produces a closed [`TypedValue`] enum. Type names Prism does not
//! know (or a missing `$type`) are kept as [`TypedValue::Unrecognized`] with
//! their raw payload, so decoding never rejects a response because the server
//! grew a new type.

use std::fmt;

use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::DecodeError;

static NULL: Value = Value::Null;

/// A value in the Query API's typed JSON encoding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "WireValue")]
pub enum TypedValue {
    Null,
    Boolean(Value),
    Integer(Value),
    Float(Value),
    String(Value),
    List(Vec<TypedValue>),
    Map(Properties),
    Node(RawNode),
    Relationship(RawRelationship),
    /// Alternating node / relationship segments of a walk.
    Path(Vec<TypedValue>),
    /// Temporal, spatial and binary values, all string-encoded on the wire.
    Encoded(EncodedKind, Value),
    Unrecognized {
        type_name: Option<String>,
        raw: Value,
    },
}

/// String-encoded value types. Prism never parses these; the text is shown as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodedKind {
    Date,
    Time,
    LocalTime,
    DateTime,
    OffsetDateTime,
    ZonedDateTime,
    LocalDateTime,
    Duration,
    Point,
    Base64,
}

impl EncodedKind {
    pub fn from_type_name(name: &str) -> Option<Self> {
        let kind = match name {
            "Date" => Self::Date,
            "Time" => Self::Time,
            "LocalTime" => Self::LocalTime,
            "DateTime" => Self::DateTime,
            "OffsetDateTime" => Self::OffsetDateTime,
            "ZonedDateTime" => Self::ZonedDateTime,
            "LocalDateTime" => Self::LocalDateTime,
            "Duration" => Self::Duration,
            "Point" => Self::Point,
            "Base64" => Self::Base64,
            _ => return None,
        };
        Some(kind)
    }

    pub fn type_name(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Time => "Time",
            Self::LocalTime => "LocalTime",
            Self::DateTime => "DateTime",
            Self::OffsetDateTime => "OffsetDateTime",
            Self::ZonedDateTime => "ZonedDateTime",
            Self::LocalDateTime => "LocalDateTime",
            Self::Duration => "Duration",
            Self::Point => "Point",
            Self::Base64 => "Base64",
        }
    }
}

/// A node as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawNode {
    #[serde(rename = "_element_id")]
    pub element_id: String,

    /// The first label is the node's primary type.
    #[serde(rename = "_labels", default)]
    pub labels: Vec<String>,

    #[serde(rename = "_properties", default)]
    pub properties: Properties,
}

impl RawNode {
    /// First label, or `""` for an unlabeled node.
    pub fn primary_type(&self) -> &str {
        self.labels.first().map(String::as_str).unwrap_or("")
    }
}

/// A relationship as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRelationship {
    #[serde(rename = "_element_id")]
    pub element_id: String,

    #[serde(rename = "_start_node_element_id")]
    pub start_element_id: String,

    #[serde(rename = "_end_node_element_id")]
    pub end_element_id: String,

    #[serde(rename = "_type")]
    pub rel_type: String,

    #[serde(rename = "_properties", default)]
    pub properties: Properties,
}

/// Property map that keeps the order properties were declared in.
///
/// Order matters: a node's caption is taken from its first property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Vec<(String, TypedValue)>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first declared property.
    pub fn first(&self) -> Option<(&str, &TypedValue)> {
        self.0.first().map(|(name, value)| (name.as_str(), value))
    }

    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Fully decoded properties, in declaration order.
    pub fn to_json_map(&self) -> serde_json::Map<String, Value> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.to_plain_json()))
            .collect()
    }
}

impl FromIterator<(String, TypedValue)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, TypedValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PropertiesVisitor;

        impl<'de> Visitor<'de> for PropertiesVisitor {
            type Value = Properties;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of property names to typed values")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, TypedValue>()? {
                    entries.push((name, value));
                }
                Ok(Properties(entries))
            }
        }

        deserializer.deserialize_map(PropertiesVisitor)
    }
}

/// One level of decoding: scalars resolve to their raw payload, composites to
/// their structure. Node and relationship properties stay typed until a
/// projection asks for them.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<'a> {
    Scalar(&'a Value),
    List(Vec<Decoded<'a>>),
    Map(Vec<(&'a str, Decoded<'a>)>),
    Node(&'a RawNode),
    Relationship(&'a RawRelationship),
    Path(&'a [TypedValue]),
}

impl Decoded<'_> {
    pub fn is_scalar(&self) -> bool {
        matches!(self, Decoded::Scalar(_))
    }

    /// Plain JSON with all type tags removed.
    ///
    /// Nodes and relationships become their property object; a path becomes
    /// an array holding one property object per segment.
    pub fn to_json(&self) -> Value {
        match self {
            Decoded::Scalar(raw) => (*raw).clone(),
            Decoded::List(items) => Value::Array(items.iter().map(Decoded::to_json).collect()),
            Decoded::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_json()))
                    .collect(),
            ),
            Decoded::Node(node) => Value::Object(node.properties.to_json_map()),
            Decoded::Relationship(rel) => Value::Object(rel.properties.to_json_map()),
            Decoded::Path(segments) => {
                Value::Array(segments.iter().map(TypedValue::to_plain_json).collect())
            }
        }
    }
}

impl TypedValue {
    /// The `$type` this value was tagged with on the wire.
    pub fn type_name(&self) -> &str {
        match self {
            TypedValue::Null => "Null",
            TypedValue::Boolean(_) => "Boolean",
            TypedValue::Integer(_) => "Integer",
            TypedValue::Float(_) => "Float",
            TypedValue::String(_) => "String",
            TypedValue::List(_) => "List",
            TypedValue::Map(_) => "Map",
            TypedValue::Node(_) => "Node",
            TypedValue::Relationship(_) => "Relationship",
            TypedValue::Path(_) => "Path",
            TypedValue::Encoded(kind, _) => kind.type_name(),
            TypedValue::Unrecognized { type_name, .. } => type_name.as_deref().unwrap_or(""),
        }
    }

    pub fn decode(&self) -> Decoded<'_> {
        match self {
            TypedValue::Null => Decoded::Scalar(&NULL),
            TypedValue::Boolean(raw)
            | TypedValue::Integer(raw)
            | TypedValue::Float(raw)
            | TypedValue::String(raw)
            | TypedValue::Encoded(_, raw)
            | TypedValue::Unrecognized { raw, .. } => Decoded::Scalar(raw),
            TypedValue::List(items) => Decoded::List(items.iter().map(TypedValue::decode).collect()),
            TypedValue::Map(entries) => Decoded::Map(
                entries
                    .iter()
                    .map(|(name, value)| (name, value.decode()))
                    .collect(),
            ),
            TypedValue::Node(node) => Decoded::Node(node),
            TypedValue::Relationship(rel) => Decoded::Relationship(rel),
            TypedValue::Path(segments) => Decoded::Path(segments),
        }
    }

    pub fn to_plain_json(&self) -> Value {
        self.decode().to_json()
    }
}

/// The envelope every typed value arrives in.
#[derive(Debug, Deserialize)]
struct WireValue {
    #[serde(rename = "$type", default)]
    type_name: Option<String>,

    #[serde(rename = "_value", default)]
    value: Value,
}

impl TryFrom<WireValue> for TypedValue {
    type Error = DecodeError;

    fn try_from(wire: WireValue) -> Result<Self, Self::Error> {
        let WireValue { type_name, value } = wire;
        let Some(name) = type_name else {
            return Ok(TypedValue::Unrecognized {
                type_name: None,
                raw: value,
            });
        };

        if let Some(kind) = EncodedKind::from_type_name(&name) {
            return Ok(TypedValue::Encoded(kind, value));
        }

        let typed = match name.as_str() {
            "Null" => TypedValue::Null,
            "Boolean" => TypedValue::Boolean(value),
            "Integer" => TypedValue::Integer(value),
            "Float" => TypedValue::Float(value),
            "String" => TypedValue::String(value),
            "List" => TypedValue::List(payload(&name, value)?),
            "Map" => TypedValue::Map(payload(&name, value)?),
            "Node" => TypedValue::Node(payload(&name, value)?),
            "Relationship" => TypedValue::Relationship(payload(&name, value)?),
            "Path" => TypedValue::Path(payload(&name, value)?),
            _ => {
                tracing::trace!(type_name = %name, "Passing through unrecognized value type");
                TypedValue::Unrecognized {
                    type_name: Some(name.clone()),
                    raw: value,
                }
            }
        };
        Ok(typed)
    }
}

fn payload<T: DeserializeOwned>(type_name: &str, value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|source| DecodeError::Payload {
        type_name: type_name.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn typed(value: Value) -> TypedValue {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_primitives_keep_raw_payload() {
        let v = typed(json!({"$type": "Integer", "_value": "42"}));
        assert_eq!(v, TypedValue::Integer(json!("42")));
        assert_eq!(v.decode(), Decoded::Scalar(&json!("42")));

        let v = typed(json!({"$type": "Boolean", "_value": true}));
        assert_eq!(v.to_plain_json(), json!(true));

        let v = typed(json!({"$type": "Null", "_value": null}));
        assert_eq!(v, TypedValue::Null);
        assert_eq!(v.to_plain_json(), Value::Null);
    }

    #[test]
    fn test_list_decodes_each_element() {
        let v = typed(json!({
            "$type": "List",
            "_value": [
                {"$type": "Integer", "_value": 1},
                {"$type": "String", "_value": "two"}
            ]
        }));
        let Decoded::List(items) = v.decode() else {
            panic!("expected a list");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], Decoded::Scalar(&json!("two")));
        assert_eq!(v.to_plain_json(), json!([1, "two"]));
    }

    #[test]
    fn test_untagged_elements_pass_through() {
        let v = typed(json!({"$type": "List", "_value": [{"_value": 1}, {"_value": 2}]}));
        assert_eq!(v.to_plain_json(), json!([1, 2]));
    }

    #[test]
    fn test_unrecognized_type_passes_through() {
        let v = typed(json!({"$type": "Vector", "_value": [0.5, 0.25]}));
        assert_eq!(v.type_name(), "Vector");
        assert_eq!(v.to_plain_json(), json!([0.5, 0.25]));
    }

    #[test]
    fn test_encoded_types_are_classified() {
        let v = typed(json!({"$type": "DateTime", "_value": "2024-01-01T00:00:00Z"}));
        assert_eq!(
            v,
            TypedValue::Encoded(EncodedKind::DateTime, json!("2024-01-01T00:00:00Z"))
        );
        assert_eq!(v.type_name(), "DateTime");
    }

    #[test]
    fn test_node_properties_keep_declaration_order() {
        let v = typed(json!({
            "$type": "Node",
            "_value": {
                "_element_id": "4:abc:1",
                "_labels": ["AS", "Resource"],
                "_properties": {
                    "zeta": {"$type": "Integer", "_value": 1},
                    "alpha": {"$type": "Integer", "_value": 2}
                }
            }
        }));
        let TypedValue::Node(node) = &v else {
            panic!("expected a node");
        };
        assert_eq!(node.primary_type(), "AS");
        assert_eq!(node.properties.first().map(|(name, _)| name), Some("zeta"));
        let names: Vec<_> = node.properties.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }

    #[test]
    fn test_relationship_wire_keys() {
        let v = typed(json!({
            "$type": "Relationship",
            "_value": {
                "_element_id": "5:abc:9",
                "_start_node_element_id": "1",
                "_end_node_element_id": "2",
                "_type": "KNOWS",
                "_properties": {}
            }
        }));
        let TypedValue::Relationship(rel) = v else {
            panic!("expected a relationship");
        };
        assert_eq!(rel.start_element_id, "1");
        assert_eq!(rel.end_element_id, "2");
        assert_eq!(rel.rel_type, "KNOWS");
        assert!(rel.properties.is_empty());
    }

    #[test]
    fn test_map_decodes_to_object() {
        let v = typed(json!({
            "$type": "Map",
            "_value": {
                "b": {"$type": "String", "_value": "x"},
                "a": {"$type": "List", "_value": [{"$type": "Integer", "_value": 3}]}
            }
        }));
        assert_eq!(v.to_plain_json().to_string(), r#"{"b":"x","a":[3]}"#);
    }

    #[test]
    fn test_path_plain_json_is_segment_properties() {
        let v = typed(json!({
            "$type": "Path",
            "_value": [
                {"$type": "Node", "_value": {
                    "_element_id": "1", "_labels": ["Person"],
                    "_properties": {"name": {"$type": "String", "_value": "Alice"}}
                }},
                {"$type": "Relationship", "_value": {
                    "_element_id": "r1", "_start_node_element_id": "1",
                    "_end_node_element_id": "2", "_type": "KNOWS", "_properties": {}
                }},
                {"$type": "Node", "_value": {
                    "_element_id": "2", "_labels": ["Person"],
                    "_properties": {"name": {"$type": "String", "_value": "Bob"}}
                }}
            ]
        }));
        assert_eq!(
            v.to_plain_json(),
            json!([{"name": "Alice"}, {}, {"name": "Bob"}])
        );
    }

    #[test]
    fn test_malformed_node_payload_is_rejected() {
        let err = serde_json::from_value::<TypedValue>(json!({
            "$type": "Node",
            "_value": {"_labels": ["Person"]}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("Node"));
    }

    #[test]
    fn test_list_payload_must_be_array() {
        let result = serde_json::from_value::<TypedValue>(json!({"$type": "List", "_value": 3}));
        assert!(result.is_err());
    }
}
