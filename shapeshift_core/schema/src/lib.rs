//! Navigable view over a JSON Schema document.
//!
//! [`Schema::build_schema`] flattens a document into [`SchemaNode`]s addressed
//! by schema pointers. The root is `""`, object members are `<parent>/<name>`
//! (with `~` and `/` escaped as in JSON pointers) and array items are
//! `<array>/{i}`.

pub mod error;
pub mod node;

pub use error::SchemaError;
pub use node::{NodeType, SchemaNode};

use serde_json::{Map, Value};
use std::collections::HashMap;

/// Pointer segment used for the item node of an array.
pub const ARRAY_ITEM_SEGMENT: &str = "{i}";

#[derive(Debug, Clone)]
pub struct Schema {
    document: Value,
    nodes: Vec<SchemaNode>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Parses and flattens a raw schema document.
    pub fn build_schema(document: &Value) -> Result<Schema, SchemaError> {
        let mut nodes = Vec::new();
        walk(document, String::new(), &mut nodes)?;
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.pointer().to_string(), i))
            .collect();
        Ok(Schema {
            document: document.clone(),
            nodes,
            index,
        })
    }

    pub fn parse(raw: &str) -> Result<Schema, SchemaError> {
        let document: Value = serde_json::from_str(raw)?;
        Schema::build_schema(&document)
    }

    pub fn at(&self, pointer: &str) -> Option<&SchemaNode> {
        self.index.get(pointer).map(|&i| &self.nodes[i])
    }

    pub fn root(&self) -> &SchemaNode {
        &self.nodes[0]
    }

    /// Every node in document pre-order, root first.
    pub fn nodes(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.iter()
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Pre-order position of `pointer`, if the schema has such a node.
    pub fn position(&self, pointer: &str) -> Option<usize> {
        self.index.get(pointer).copied()
    }

    /// Array nodes whose items contain `pointer`, outermost first. A node
    /// under `<array>/{i}` only has a value while that array is iterated.
    pub fn enclosing_arrays(&self, pointer: &str) -> Vec<&SchemaNode> {
        let item = format!("/{ARRAY_ITEM_SEGMENT}");
        pointer
            .match_indices(item.as_str())
            .filter(|(at, _)| {
                let rest = &pointer[at + item.len()..];
                rest.is_empty() || rest.starts_with('/')
            })
            .filter_map(|(at, _)| self.at(&pointer[..at]))
            .filter(|node| node.node_type() == NodeType::Array)
            .collect()
    }
}

fn escape_segment(name: &str) -> String {
    name.replace('~', "~0").replace('/', "~1")
}

fn walk(value: &Value, pointer: String, out: &mut Vec<SchemaNode>) -> Result<(), SchemaError> {
    let obj: &Map<String, Value> = value
        .as_object()
        .ok_or_else(|| SchemaError::unsupported(&pointer, "schema must be a JSON object"))?;

    if obj.contains_key("$ref") {
        return Err(SchemaError::unsupported(&pointer, "'$ref' is not supported"));
    }

    let node_type = match obj.get("type") {
        Some(Value::String(t)) => t
            .parse::<NodeType>()
            .map_err(|reason| SchemaError::unsupported(&pointer, reason))?,
        Some(_) => {
            return Err(SchemaError::unsupported(
                &pointer,
                "'type' must be a single string",
            ))
        }
        None => return Err(SchemaError::unsupported(&pointer, "missing 'type'")),
    };

    out.push(SchemaNode::new(pointer.clone(), node_type));

    match node_type {
        NodeType::Object => {
            if let Some(properties) = obj.get("properties") {
                let properties = properties.as_object().ok_or_else(|| {
                    SchemaError::unsupported(&pointer, "'properties' must be an object")
                })?;
                for (name, child) in properties {
                    walk(child, format!("{pointer}/{}", escape_segment(name)), out)?;
                }
            }
        }
        NodeType::Array => {
            let items = obj
                .get("items")
                .ok_or_else(|| SchemaError::unsupported(&pointer, "array without 'items'"))?;
            walk(items, format!("{pointer}/{ARRAY_ITEM_SEGMENT}"), out)?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use matches::assert_matches;
    use serde_json::json;

    fn person() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "integer" },
                "tags": { "type": "array", "items": { "type": "string" } },
                "address": {
                    "type": "object",
                    "properties": { "zip": { "type": "number" } }
                }
            }
        })
    }

    #[test]
    fn nodes_follow_document_order() {
        let schema = Schema::build_schema(&person()).unwrap();
        let pointers: Vec<_> = schema.nodes().map(|n| n.pointer().to_string()).collect();
        assert_eq!(
            pointers,
            vec!["", "/name", "/age", "/tags", "/tags/{i}", "/address", "/address/zip"]
        );
        assert!(schema.root().is_root());
    }

    #[test]
    fn at_resolves_pointers() {
        let schema = Schema::build_schema(&person()).unwrap();
        assert_eq!(schema.at("/age").unwrap().node_type(), NodeType::Integer);
        assert_eq!(
            schema.at("/tags/{i}").unwrap().node_type(),
            NodeType::String
        );
        assert!(schema.at("/missing").is_none());
    }

    #[test]
    fn enclosing_arrays_list_outermost_first() {
        let schema = Schema::build_schema(&json!({
            "type": "object",
            "properties": {
                "rows": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "cells": { "type": "array", "items": { "type": "string" } }
                        }
                    }
                }
            }
        }))
        .unwrap();
        let arrays: Vec<_> = schema
            .enclosing_arrays("/rows/{i}/cells/{i}")
            .iter()
            .map(|n| n.pointer())
            .collect();
        assert_eq!(arrays, vec!["/rows", "/rows/{i}/cells"]);
        assert!(schema.enclosing_arrays("/rows").is_empty());
        assert!(schema.position("/rows/{i}").unwrap() > schema.position("/rows").unwrap());
    }

    #[test]
    fn member_names_are_escaped() {
        let schema = Schema::build_schema(&json!({
            "type": "object",
            "properties": { "a/b": { "type": "boolean" }, "c~d": { "type": "null" } }
        }))
        .unwrap();
        assert!(schema.at("/a~1b").is_some());
        assert!(schema.at("/c~0d").is_some());
    }

    #[test]
    fn unsupported_documents_are_rejected() {
        for doc in [
            json!({ "properties": {} }),
            json!({ "type": "date" }),
            json!({ "type": ["string", "null"] }),
            json!({ "type": "array" }),
            json!({ "$ref": "#/definitions/x", "type": "object" }),
            json!("string"),
        ] {
            let err = Schema::build_schema(&doc).unwrap_err();
            assert_matches!(err, SchemaError::Unsupported { .. });
        }
    }

    #[test]
    fn parse_reports_malformed_json() {
        let err = Schema::parse("{ not json").unwrap_err();
        assert_matches!(err, SchemaError::InvalidDocument { .. });
    }

    #[test]
    fn node_type_round_trips_through_str() {
        for t in NodeType::ALL {
            assert_eq!(t.as_str().parse::<NodeType>().unwrap(), t);
        }
        assert!(!NodeType::Object.is_bindable());
        assert!(NodeType::String.is_bindable());
    }
}
