use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminator of a binding variant.
///
/// The string forms are the vocabulary exchanged with clients and written to
/// storage. Variants are declared in lexicographic order of those strings so
/// the derived `Ord` matches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BindingKind {
    ArrayConstant,
    ArrayNode,
    BooleanConstant,
    BooleanNode,
    IntegerConstant,
    IntegerNode,
    NumberConstant,
    NumberNode,
    StringConstant,
    StringNode,
    StringTemplate,
}

impl BindingKind {
    pub const ALL: [BindingKind; 11] = [
        BindingKind::ArrayConstant,
        BindingKind::ArrayNode,
        BindingKind::BooleanConstant,
        BindingKind::BooleanNode,
        BindingKind::IntegerConstant,
        BindingKind::IntegerNode,
        BindingKind::NumberConstant,
        BindingKind::NumberNode,
        BindingKind::StringConstant,
        BindingKind::StringNode,
        BindingKind::StringTemplate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BindingKind::ArrayConstant => "arrayConstant",
            BindingKind::ArrayNode => "arrayNode",
            BindingKind::BooleanConstant => "booleanConstant",
            BindingKind::BooleanNode => "booleanNode",
            BindingKind::IntegerConstant => "integerConstant",
            BindingKind::IntegerNode => "integerNode",
            BindingKind::NumberConstant => "numberConstant",
            BindingKind::NumberNode => "numberNode",
            BindingKind::StringConstant => "stringConstant",
            BindingKind::StringNode => "stringNode",
            BindingKind::StringTemplate => "stringTemplate",
        }
    }

    /// Kinds that copy their value from a source node.
    pub fn is_node_mapped(&self) -> bool {
        matches!(
            self,
            BindingKind::ArrayNode
                | BindingKind::BooleanNode
                | BindingKind::IntegerNode
                | BindingKind::NumberNode
                | BindingKind::StringNode
        )
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BindingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BindingKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown binding kind '{s}'"))
    }
}
