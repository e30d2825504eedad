use crate::error::BindingError;
use crate::executable::ExecutableBinding;
use crate::legal::accepted_source_types;
use crate::model::BindingSpec;
use crate::transformation::Transformation;
use minijinja::Environment;
use schema::SchemaNode;
use std::collections::BTreeMap;

/// Turns a binding payload into an [`ExecutableBinding`] in the context of
/// `transformation`.
///
/// Node-mapped kinds must reference an existing source node whose type the
/// kind can read. Template parameters are built depth-first and the first
/// failure is returned as is. Nothing is attached to the transformation.
pub fn build<T>(spec: &BindingSpec, transformation: &T) -> Result<ExecutableBinding, BindingError>
where
    T: Transformation + ?Sized,
{
    let executable = match spec {
        BindingSpec::ArrayConstant { nb_iterations } => {
            ExecutableBinding::ArrayConstant(*nb_iterations)
        }
        BindingSpec::BooleanConstant { constant } => ExecutableBinding::BooleanConstant(*constant),
        BindingSpec::IntegerConstant { constant } => ExecutableBinding::IntegerConstant(*constant),
        BindingSpec::NumberConstant { constant } => ExecutableBinding::NumberConstant(*constant),
        BindingSpec::StringConstant { constant } => {
            ExecutableBinding::StringConstant(constant.clone())
        }
        BindingSpec::ArrayNode { source_node } => {
            ExecutableBinding::ArrayNode(resolve_source(spec, source_node, transformation)?)
        }
        BindingSpec::BooleanNode { source_node } => {
            ExecutableBinding::BooleanNode(resolve_source(spec, source_node, transformation)?)
        }
        BindingSpec::IntegerNode { source_node } => {
            ExecutableBinding::IntegerNode(resolve_source(spec, source_node, transformation)?)
        }
        BindingSpec::NumberNode { source_node } => {
            ExecutableBinding::NumberNode(resolve_source(spec, source_node, transformation)?)
        }
        BindingSpec::StringNode { source_node } => {
            ExecutableBinding::StringNode(resolve_source(spec, source_node, transformation)?)
        }
        BindingSpec::StringTemplate {
            template,
            parameters,
        } => {
            check_template(template)?;
            let mut built = BTreeMap::new();
            for (name, nested) in parameters {
                built.insert(name.clone(), build(nested, transformation)?);
            }
            ExecutableBinding::StringTemplate {
                template: template.clone(),
                parameters: built,
            }
        }
    };
    Ok(executable)
}

fn resolve_source<T>(
    spec: &BindingSpec,
    pointer: &str,
    transformation: &T,
) -> Result<SchemaNode, BindingError>
where
    T: Transformation + ?Sized,
{
    let kind = spec.kind();
    let node = transformation.source().at(pointer).ok_or_else(|| {
        BindingError::illegal(format!(
            "Source node '{pointer}' does not exist in source schema"
        ))
    })?;
    if !accepted_source_types(kind).contains(&node.node_type()) {
        return Err(BindingError::illegal(format!(
            "Source node '{pointer}' of type '{}' cannot be read by a '{kind}' binding",
            node.node_type()
        )));
    }
    Ok(node.clone())
}

fn check_template(template: &str) -> Result<(), BindingError> {
    let env = Environment::new();
    env.template_from_str(template)
        .map(|_| ())
        .map_err(|err| BindingError::illegal(format!("Invalid template: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformation::SchemaTransformation;
    use matches::assert_matches;
    use schema::{NodeType, Schema};
    use serde_json::json;

    fn transformation() -> SchemaTransformation {
        let source = Schema::build_schema(&json!({
            "type": "object",
            "properties": {
                "fullName": { "type": "string" },
                "years": { "type": "integer" },
                "items": { "type": "array", "items": { "type": "number" } }
            }
        }))
        .unwrap();
        let target = Schema::build_schema(&json!({
            "type": "object",
            "properties": { "name": { "type": "string" } }
        }))
        .unwrap();
        SchemaTransformation::new(source, target)
    }

    fn string_node(pointer: &str) -> BindingSpec {
        BindingSpec::StringNode {
            source_node: pointer.into(),
        }
    }

    #[test]
    fn constants_wrap_their_literal() {
        let t = transformation();
        assert_eq!(
            build(&BindingSpec::NumberConstant { constant: 1.5 }, &t).unwrap(),
            ExecutableBinding::NumberConstant(1.5)
        );
        assert_eq!(
            build(&BindingSpec::ArrayConstant { nb_iterations: 0 }, &t).unwrap(),
            ExecutableBinding::ArrayConstant(0)
        );
    }

    #[test]
    fn node_kinds_resolve_source_nodes() {
        let t = transformation();
        assert_eq!(
            build(&string_node("/fullName"), &t).unwrap(),
            ExecutableBinding::StringNode(SchemaNode::new("/fullName", NodeType::String))
        );
        let number = BindingSpec::NumberNode {
            source_node: "/years".into(),
        };
        assert_eq!(build(&number, &t).unwrap().kind().as_str(), "numberNode");
    }

    #[test]
    fn missing_source_node_is_illegal() {
        let t = transformation();
        let err = build(&string_node("/missing"), &t).unwrap_err();
        assert_matches!(err, BindingError::IllegalBinding { .. });
        assert_eq!(
            err.reason(),
            "Source node '/missing' does not exist in source schema"
        );
    }

    #[test]
    fn incompatible_source_type_is_illegal() {
        let t = transformation();
        let err = build(&string_node("/years"), &t).unwrap_err();
        assert_matches!(err, BindingError::IllegalBinding { .. });

        let array = BindingSpec::ArrayNode {
            source_node: "/items/{i}".into(),
        };
        assert!(build(&array, &t).is_err());
    }

    #[test]
    fn template_builds_nested_parameters() {
        let t = transformation();
        let spec = BindingSpec::StringTemplate {
            template: "{{ who }} ({{ inner }})".into(),
            parameters: BTreeMap::from([
                ("who".to_string(), string_node("/fullName")),
                (
                    "inner".to_string(),
                    BindingSpec::StringTemplate {
                        template: "{{ n }}".into(),
                        parameters: BTreeMap::from([(
                            "n".to_string(),
                            BindingSpec::IntegerNode {
                                source_node: "/years".into(),
                            },
                        )]),
                    },
                ),
            ]),
        };

        let ExecutableBinding::StringTemplate { parameters, .. } = build(&spec, &t).unwrap() else {
            panic!("expected a template binding");
        };
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters["inner"].kind().as_str(), "stringTemplate");
    }

    #[test]
    fn nested_failure_keeps_its_reason() {
        let t = transformation();
        let spec = BindingSpec::StringTemplate {
            template: "{{ a }}".into(),
            parameters: BTreeMap::from([(
                "a".to_string(),
                BindingSpec::StringTemplate {
                    template: "{{ b }}".into(),
                    parameters: BTreeMap::from([("b".to_string(), string_node("/missing"))]),
                },
            )]),
        };
        let nested = build(&string_node("/missing"), &t).unwrap_err();
        let err = build(&spec, &t).unwrap_err();
        assert_eq!(err.reason(), nested.reason());
    }

    #[test]
    fn malformed_template_is_illegal() {
        let t = transformation();
        let spec = BindingSpec::StringTemplate {
            template: "{{ unclosed ".into(),
            parameters: BTreeMap::new(),
        };
        let err = build(&spec, &t).unwrap_err();
        assert_matches!(err, BindingError::IllegalBinding { .. });
        assert!(err.reason().starts_with("Invalid template"));
    }
}
