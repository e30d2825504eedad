use crate::kind::BindingKind;
use schema::SchemaNode;
use std::collections::BTreeMap;

/// A binding validated against a transformation, with source pointers resolved
/// to their schema nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutableBinding {
    ArrayConstant(u32),
    ArrayNode(SchemaNode),
    BooleanConstant(bool),
    BooleanNode(SchemaNode),
    IntegerConstant(i64),
    IntegerNode(SchemaNode),
    NumberConstant(f64),
    NumberNode(SchemaNode),
    StringConstant(String),
    StringNode(SchemaNode),
    StringTemplate {
        template: String,
        parameters: BTreeMap<String, ExecutableBinding>,
    },
}

impl ExecutableBinding {
    pub fn kind(&self) -> BindingKind {
        match self {
            ExecutableBinding::ArrayConstant(_) => BindingKind::ArrayConstant,
            ExecutableBinding::ArrayNode(_) => BindingKind::ArrayNode,
            ExecutableBinding::BooleanConstant(_) => BindingKind::BooleanConstant,
            ExecutableBinding::BooleanNode(_) => BindingKind::BooleanNode,
            ExecutableBinding::IntegerConstant(_) => BindingKind::IntegerConstant,
            ExecutableBinding::IntegerNode(_) => BindingKind::IntegerNode,
            ExecutableBinding::NumberConstant(_) => BindingKind::NumberConstant,
            ExecutableBinding::NumberNode(_) => BindingKind::NumberNode,
            ExecutableBinding::StringConstant(_) => BindingKind::StringConstant,
            ExecutableBinding::StringNode(_) => BindingKind::StringNode,
            ExecutableBinding::StringTemplate { .. } => BindingKind::StringTemplate,
        }
    }

    pub fn source(&self) -> Option<&SchemaNode> {
        match self {
            ExecutableBinding::ArrayNode(node)
            | ExecutableBinding::BooleanNode(node)
            | ExecutableBinding::IntegerNode(node)
            | ExecutableBinding::NumberNode(node)
            | ExecutableBinding::StringNode(node) => Some(node),
            _ => None,
        }
    }

    /// Source nodes read by this binding, including those of nested template
    /// parameters.
    pub fn sources(&self) -> Vec<&SchemaNode> {
        match self {
            ExecutableBinding::StringTemplate { parameters, .. } => {
                parameters.values().flat_map(|nested| nested.sources()).collect()
            }
            other => other.source().into_iter().collect(),
        }
    }
}
