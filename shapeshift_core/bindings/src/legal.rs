use crate::kind::BindingKind;
use schema::NodeType;
use std::collections::BTreeSet;

/// Binding kinds that may be attached to a target node of type `target`.
///
/// Integers are legal numbers and any scalar can be stringified. Object and
/// null nodes never take a binding.
pub fn legal_kinds(target: NodeType) -> BTreeSet<BindingKind> {
    use BindingKind::*;

    let kinds: &[BindingKind] = match target {
        NodeType::Array => &[ArrayConstant, ArrayNode],
        NodeType::Boolean => &[BooleanConstant, BooleanNode],
        NodeType::Integer => &[IntegerConstant, IntegerNode],
        NodeType::Number => &[IntegerConstant, IntegerNode, NumberConstant, NumberNode],
        NodeType::String => &[
            BooleanConstant,
            BooleanNode,
            IntegerConstant,
            IntegerNode,
            NumberConstant,
            NumberNode,
            StringConstant,
            StringNode,
            StringTemplate,
        ],
        NodeType::Object | NodeType::Null => &[],
    };
    kinds.iter().copied().collect()
}

/// Source node types a node-mapped kind can read from. Empty for kinds that do
/// not read a source node.
pub fn accepted_source_types(kind: BindingKind) -> &'static [NodeType] {
    match kind {
        BindingKind::ArrayNode => &[NodeType::Array],
        BindingKind::BooleanNode => &[NodeType::Boolean],
        BindingKind::IntegerNode => &[NodeType::Integer],
        BindingKind::NumberNode => &[NodeType::Integer, NodeType::Number],
        BindingKind::StringNode => &[NodeType::String],
        _ => &[],
    }
}

/// Source node types that can feed a target node of type `target` through
/// any node-mapped kind legal there.
pub fn legal_source_types(target: NodeType) -> BTreeSet<NodeType> {
    legal_kinds(target)
        .into_iter()
        .flat_map(|kind| accepted_source_types(kind).iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use BindingKind::*;

    fn set(kinds: &[BindingKind]) -> BTreeSet<BindingKind> {
        kinds.iter().copied().collect()
    }

    #[test]
    fn matrix_matches_table() {
        assert_eq!(legal_kinds(NodeType::Array), set(&[ArrayConstant, ArrayNode]));
        assert_eq!(
            legal_kinds(NodeType::Boolean),
            set(&[BooleanConstant, BooleanNode])
        );
        assert_eq!(
            legal_kinds(NodeType::Integer),
            set(&[IntegerConstant, IntegerNode])
        );
        assert_eq!(
            legal_kinds(NodeType::Number),
            set(&[IntegerConstant, IntegerNode, NumberConstant, NumberNode])
        );
        let string = legal_kinds(NodeType::String);
        assert_eq!(string.len(), 9);
        assert!(!string.contains(&ArrayConstant));
        assert!(!string.contains(&ArrayNode));
        assert!(legal_kinds(NodeType::Object).is_empty());
        assert!(legal_kinds(NodeType::Null).is_empty());
    }

    #[test]
    fn matrix_iterates_lexicographically() {
        let names: Vec<_> = legal_kinds(NodeType::Number)
            .into_iter()
            .map(|k| k.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["integerConstant", "integerNode", "numberConstant", "numberNode"]
        );
    }

    #[test]
    fn source_types_follow_node_kinds() {
        assert_eq!(
            legal_source_types(NodeType::Number),
            [NodeType::Integer, NodeType::Number].into_iter().collect()
        );
        assert_eq!(
            legal_source_types(NodeType::String),
            [
                NodeType::Boolean,
                NodeType::Integer,
                NodeType::Number,
                NodeType::String
            ]
            .into_iter()
            .collect()
        );
        assert!(legal_source_types(NodeType::Object).is_empty());
        assert!(accepted_source_types(StringTemplate).is_empty());
    }
}
