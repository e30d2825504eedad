use bindings::{Binding, NextToBindResolution};
use catalog::Owner;
use serde::{Deserialize, Serialize};

/// An owner together with its bindings and what remains to be bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerView {
    #[serde(flatten)]
    pub owner: Owner,
    pub bindings: Vec<Binding>,
    #[serde(flatten)]
    pub resolution: NextToBindResolution,
}

impl OwnerView {
    pub fn remaining_bindings(&self) -> usize {
        self.resolution.remaining_bindings
    }
}
