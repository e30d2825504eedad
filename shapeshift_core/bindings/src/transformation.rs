use crate::builder::build;
use crate::error::BindingError;
use crate::executable::ExecutableBinding;
use crate::legal::{legal_kinds, legal_source_types};
use crate::model::Binding;
use schema::{Schema, SchemaNode};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Owns a source and a target schema together with the bindings attached to
/// target nodes so far.
pub trait Transformation {
    fn source(&self) -> &Schema;

    fn target(&self) -> &Schema;

    /// Attaches `binding` to `node`, replacing any previous binding there.
    fn bind(&mut self, node: &SchemaNode, binding: ExecutableBinding) -> Result<(), BindingError>;

    /// Target nodes still waiting for a binding, in a deterministic
    /// depth-first order of the target schema.
    fn to_bind(&self) -> Box<dyn Iterator<Item = &SchemaNode> + '_>;

    /// Source nodes that may feed a node-mapped binding on `node`.
    fn legal_nodes_for(&self, node: &SchemaNode) -> BTreeSet<SchemaNode>;
}

#[derive(Debug, Clone)]
pub struct SchemaTransformation {
    source: Schema,
    target: Schema,
    bindings: BTreeMap<String, ExecutableBinding>,
}

impl SchemaTransformation {
    pub fn new(source: Schema, target: Schema) -> Self {
        Self {
            source,
            target,
            bindings: BTreeMap::new(),
        }
    }

    /// Rebuilds a transformation from persisted bindings. A binding that no
    /// longer validates against the schemas is logged and left unbound.
    pub fn with_bindings<'a>(
        source: Schema,
        target: Schema,
        bindings: impl IntoIterator<Item = &'a Binding>,
    ) -> Self {
        let mut transformation = Self::new(source, target);
        // Target pre-order: an array is bound before its items.
        let mut ordered: Vec<&Binding> = bindings.into_iter().collect();
        ordered.sort_by_key(|binding| {
            transformation
                .target
                .position(&binding.target_node)
                .unwrap_or(usize::MAX)
        });
        for binding in ordered {
            if let Err(err) = transformation.restore(binding) {
                warn!(
                    binding_id = binding.id,
                    target_node = %binding.target_node,
                    "Skipping persisted binding: {}",
                    err.reason()
                );
            }
        }
        transformation
    }

    fn restore(&mut self, binding: &Binding) -> Result<(), BindingError> {
        let node = self
            .target
            .at(&binding.target_node)
            .cloned()
            .ok_or_else(|| BindingError::unknown_target_node(&binding.target_node))?;
        let executable = build(&binding.spec, &*self)?;
        self.bind(&node, executable)
    }

    pub fn binding_for(&self, pointer: &str) -> Option<&ExecutableBinding> {
        self.bindings.get(pointer)
    }

    pub fn bound_count(&self) -> usize {
        self.bindings.len()
    }
}

impl Transformation for SchemaTransformation {
    fn source(&self) -> &Schema {
        &self.source
    }

    fn target(&self) -> &Schema {
        &self.target
    }

    fn bind(&mut self, node: &SchemaNode, binding: ExecutableBinding) -> Result<(), BindingError> {
        if self.target.at(node.pointer()) != Some(node) {
            return Err(BindingError::unknown_target_node(node.pointer()));
        }

        let kind = binding.kind();
        if !legal_kinds(node.node_type()).contains(&kind) {
            return Err(BindingError::illegal(format!(
                "Binding of kind '{kind}' is not legal for node '{}' of type '{}'",
                node.pointer(),
                node.node_type()
            )));
        }

        if let Some(source) = binding.source() {
            if !self.legal_nodes_for(node).contains(source) {
                return Err(BindingError::illegal(format!(
                    "Source node '{}' cannot feed node '{}'",
                    source.pointer(),
                    node.pointer()
                )));
            }
        }

        let iterated = self.iterated_sources(node.pointer());
        if let Some(source) = binding
            .sources()
            .into_iter()
            .find(|source| !self.in_scope(source, &iterated))
        {
            return Err(BindingError::illegal(format!(
                "Source node '{}' is only available while iterating its array, \
                 which is not mapped around node '{}'",
                source.pointer(),
                node.pointer()
            )));
        }

        self.bindings.insert(node.pointer().to_string(), binding);
        Ok(())
    }

    fn to_bind(&self) -> Box<dyn Iterator<Item = &SchemaNode> + '_> {
        Box::new(self.target.nodes().filter(|node| {
            node.node_type().is_bindable() && !self.bindings.contains_key(node.pointer())
        }))
    }

    fn legal_nodes_for(&self, node: &SchemaNode) -> BTreeSet<SchemaNode> {
        let types = legal_source_types(node.node_type());
        let iterated = self.iterated_sources(node.pointer());
        self.source
            .nodes()
            .filter(|candidate| types.contains(&candidate.node_type()))
            .filter(|candidate| self.in_scope(candidate, &iterated))
            .cloned()
            .collect()
    }
}

impl SchemaTransformation {
    /// Source arrays iterated around the target node at `pointer`: the sources
    /// of the `arrayNode` bindings on its enclosing target arrays.
    fn iterated_sources(&self, pointer: &str) -> BTreeSet<&str> {
        self.target
            .enclosing_arrays(pointer)
            .into_iter()
            .filter_map(|array| match self.bindings.get(array.pointer()) {
                Some(ExecutableBinding::ArrayNode(source)) => Some(source.pointer()),
                _ => None,
            })
            .collect()
    }

    /// A source node inside array items is readable only when each of its
    /// enclosing source arrays is iterated.
    fn in_scope(&self, source: &SchemaNode, iterated: &BTreeSet<&str>) -> bool {
        self.source
            .enclosing_arrays(source.pointer())
            .iter()
            .all(|array| iterated.contains(array.pointer()))
    }
}
