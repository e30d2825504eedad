use crate::kind::BindingKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind tag plus kind-specific payload of a binding, as exchanged with clients.
///
/// Serialized with the kind as an internal `kind` tag, e.g.
/// `{"kind": "integerConstant", "constant": 42}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BindingSpec {
    ArrayConstant {
        nb_iterations: u32,
    },
    ArrayNode {
        source_node: String,
    },
    BooleanConstant {
        constant: bool,
    },
    BooleanNode {
        source_node: String,
    },
    IntegerConstant {
        constant: i64,
    },
    IntegerNode {
        source_node: String,
    },
    NumberConstant {
        constant: f64,
    },
    NumberNode {
        source_node: String,
    },
    StringConstant {
        constant: String,
    },
    StringNode {
        source_node: String,
    },
    StringTemplate {
        template: String,
        #[serde(default)]
        parameters: BTreeMap<String, BindingSpec>,
    },
}

impl BindingSpec {
    pub fn kind(&self) -> BindingKind {
        match self {
            BindingSpec::ArrayConstant { .. } => BindingKind::ArrayConstant,
            BindingSpec::ArrayNode { .. } => BindingKind::ArrayNode,
            BindingSpec::BooleanConstant { .. } => BindingKind::BooleanConstant,
            BindingSpec::BooleanNode { .. } => BindingKind::BooleanNode,
            BindingSpec::IntegerConstant { .. } => BindingKind::IntegerConstant,
            BindingSpec::IntegerNode { .. } => BindingKind::IntegerNode,
            BindingSpec::NumberConstant { .. } => BindingKind::NumberConstant,
            BindingSpec::NumberNode { .. } => BindingKind::NumberNode,
            BindingSpec::StringConstant { .. } => BindingKind::StringConstant,
            BindingSpec::StringNode { .. } => BindingKind::StringNode,
            BindingSpec::StringTemplate { .. } => BindingKind::StringTemplate,
        }
    }

    /// Source pointer of a node-mapped binding.
    pub fn source_node(&self) -> Option<&str> {
        match self {
            BindingSpec::ArrayNode { source_node }
            | BindingSpec::BooleanNode { source_node }
            | BindingSpec::IntegerNode { source_node }
            | BindingSpec::NumberNode { source_node }
            | BindingSpec::StringNode { source_node } => Some(source_node),
            _ => None,
        }
    }
}

/// A persisted binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub id: i64,
    pub owner_id: i64,
    pub target_node: String,
    pub last_modification_date: DateTime<Utc>,
    #[serde(flatten)]
    pub spec: BindingSpec,
}

impl Binding {
    pub fn kind(&self) -> BindingKind {
        self.spec.kind()
    }
}

/// Request body for creating a binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBinding {
    pub target_node: String,
    #[serde(flatten)]
    pub spec: BindingSpec,
}

/// Request body for replacing a binding. `target_node` may be omitted; when
/// present it has to name the node the binding is already attached to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_node: Option<String>,
    #[serde(flatten)]
    pub spec: BindingSpec,
}
