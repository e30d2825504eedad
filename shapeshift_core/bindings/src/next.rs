use crate::kind::BindingKind;
use crate::legal::legal_kinds;
use crate::transformation::Transformation;
use schema::{NodeType, SchemaNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What to bind next: the first unbound target node and what may be attached
/// to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextToBind {
    pub target_node: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub legal_binding_types: BTreeSet<BindingKind>,
    /// Ordered by source pointer.
    pub legal_source_nodes: Vec<SchemaNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextToBindResolution {
    pub next_to_bind: Option<NextToBind>,
    pub remaining_bindings: usize,
}

/// Peeks the first node of `to_bind()` and drains the rest only to count it.
/// The sequence is consumed once and its order is kept.
pub fn resolve_next_to_bind<T>(transformation: &T) -> NextToBindResolution
where
    T: Transformation + ?Sized,
{
    let mut unbound = transformation.to_bind();
    let Some(node) = unbound.next() else {
        return NextToBindResolution {
            next_to_bind: None,
            remaining_bindings: 0,
        };
    };

    let next = NextToBind {
        target_node: node.pointer().to_string(),
        node_type: node.node_type(),
        legal_binding_types: legal_kinds(node.node_type()),
        legal_source_nodes: transformation.legal_nodes_for(node).into_iter().collect(),
    };

    NextToBindResolution {
        next_to_bind: Some(next),
        remaining_bindings: 1 + unbound.count(),
    }
}
