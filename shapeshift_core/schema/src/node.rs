use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared type of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl NodeType {
    pub const ALL: [NodeType; 7] = [
        NodeType::Array,
        NodeType::Boolean,
        NodeType::Integer,
        NodeType::Null,
        NodeType::Number,
        NodeType::Object,
        NodeType::String,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Array => "array",
            NodeType::Boolean => "boolean",
            NodeType::Integer => "integer",
            NodeType::Null => "null",
            NodeType::Number => "number",
            NodeType::Object => "object",
            NodeType::String => "string",
        }
    }

    /// Object and null nodes are walked structurally and never take a binding.
    pub fn is_bindable(&self) -> bool {
        !matches!(self, NodeType::Object | NodeType::Null)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown node type '{s}'"))
    }
}

/// A node of a parsed schema, addressed by its schema pointer.
///
/// Ordering is by pointer first so sets of nodes list in pointer order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaNode {
    pointer: String,
    #[serde(rename = "type")]
    node_type: NodeType,
}

impl SchemaNode {
    pub fn new(pointer: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            pointer: pointer.into(),
            node_type,
        }
    }

    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn is_root(&self) -> bool {
        self.pointer.is_empty()
    }
}
