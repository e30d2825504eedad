//! Single-table layout of a binding: the kind discriminator plus one nullable
//! column per payload field. Only the columns owned by the kind are set.

use crate::error::CatalogError;
use bindings::{Binding, BindingKind, BindingSpec};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Discriminator and payload columns of a binding row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadColumns {
    pub kind: String,
    pub source_node: Option<String>,
    pub array_constant: Option<i64>,
    pub boolean_constant: Option<bool>,
    pub integer_constant: Option<i64>,
    pub number_constant: Option<f64>,
    pub string_constant: Option<String>,
    pub template: Option<String>,
    /// JSON object of parameter name to nested binding payload.
    pub parameters: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingRow {
    pub id: i64,
    pub owner_id: i64,
    pub target_node: String,
    pub last_modification_date: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: PayloadColumns,
}

impl PayloadColumns {
    /// Columns for `spec`. Every column the kind does not own is `None`.
    pub fn encode(spec: &BindingSpec) -> Result<Self, CatalogError> {
        let mut columns = PayloadColumns {
            kind: spec.kind().as_str().to_string(),
            ..PayloadColumns::default()
        };
        match spec {
            BindingSpec::ArrayConstant { nb_iterations } => {
                columns.array_constant = Some(i64::from(*nb_iterations));
            }
            BindingSpec::BooleanConstant { constant } => {
                columns.boolean_constant = Some(*constant);
            }
            BindingSpec::IntegerConstant { constant } => {
                columns.integer_constant = Some(*constant);
            }
            BindingSpec::NumberConstant { constant } => {
                columns.number_constant = Some(*constant);
            }
            BindingSpec::StringConstant { constant } => {
                columns.string_constant = Some(constant.clone());
            }
            BindingSpec::ArrayNode { source_node }
            | BindingSpec::BooleanNode { source_node }
            | BindingSpec::IntegerNode { source_node }
            | BindingSpec::NumberNode { source_node }
            | BindingSpec::StringNode { source_node } => {
                columns.source_node = Some(source_node.clone());
            }
            BindingSpec::StringTemplate {
                template,
                parameters,
            } => {
                columns.template = Some(template.clone());
                columns.parameters = Some(serde_json::to_string(parameters)?);
            }
        }
        Ok(columns)
    }

    /// Rebuilds the payload by dispatching on the discriminator. Unknown
    /// discriminators and missing owned columns are decode failures.
    pub fn decode(&self) -> Result<BindingSpec, CatalogError> {
        let kind: BindingKind = self
            .kind
            .parse()
            .map_err(|reason: String| CatalogError::decode(reason))?;

        let spec = match kind {
            BindingKind::ArrayConstant => {
                let raw = required(kind, "array_constant", self.array_constant)?;
                let nb_iterations = u32::try_from(raw).map_err(|_| {
                    CatalogError::decode(format!("array_constant {raw} is out of range"))
                })?;
                BindingSpec::ArrayConstant { nb_iterations }
            }
            BindingKind::BooleanConstant => BindingSpec::BooleanConstant {
                constant: required(kind, "boolean_constant", self.boolean_constant)?,
            },
            BindingKind::IntegerConstant => BindingSpec::IntegerConstant {
                constant: required(kind, "integer_constant", self.integer_constant)?,
            },
            BindingKind::NumberConstant => BindingSpec::NumberConstant {
                constant: required(kind, "number_constant", self.number_constant)?,
            },
            BindingKind::StringConstant => BindingSpec::StringConstant {
                constant: required(kind, "string_constant", self.string_constant.clone())?,
            },
            BindingKind::ArrayNode => BindingSpec::ArrayNode {
                source_node: self.source_node(kind)?,
            },
            BindingKind::BooleanNode => BindingSpec::BooleanNode {
                source_node: self.source_node(kind)?,
            },
            BindingKind::IntegerNode => BindingSpec::IntegerNode {
                source_node: self.source_node(kind)?,
            },
            BindingKind::NumberNode => BindingSpec::NumberNode {
                source_node: self.source_node(kind)?,
            },
            BindingKind::StringNode => BindingSpec::StringNode {
                source_node: self.source_node(kind)?,
            },
            BindingKind::StringTemplate => {
                let template = required(kind, "template", self.template.clone())?;
                let parameters: BTreeMap<String, BindingSpec> = match &self.parameters {
                    Some(raw) => serde_json::from_str(raw).map_err(|err| {
                        CatalogError::decode(format!("unreadable template parameters: {err}"))
                    })?,
                    None => BTreeMap::new(),
                };
                BindingSpec::StringTemplate {
                    template,
                    parameters,
                }
            }
        };
        Ok(spec)
    }

    fn source_node(&self, kind: BindingKind) -> Result<String, CatalogError> {
        required(kind, "source_node", self.source_node.clone())
    }
}

fn required<T>(kind: BindingKind, column: &str, value: Option<T>) -> Result<T, CatalogError> {
    value.ok_or_else(|| CatalogError::decode(format!("'{kind}' row without a {column} value")))
}

impl BindingRow {
    pub fn decode(&self) -> Result<Binding, CatalogError> {
        Ok(Binding {
            id: self.id,
            owner_id: self.owner_id,
            target_node: self.target_node.clone(),
            last_modification_date: self.last_modification_date,
            spec: self.payload.decode()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matches::assert_matches;

    fn row(payload: PayloadColumns) -> BindingRow {
        BindingRow {
            id: 1,
            owner_id: 2,
            target_node: "/name".into(),
            last_modification_date: Utc::now(),
            payload,
        }
    }

    fn every_kind() -> Vec<BindingSpec> {
        let node = |p: &str| p.to_string();
        let leaves = vec![
            BindingSpec::ArrayConstant { nb_iterations: 4 },
            BindingSpec::ArrayNode {
                source_node: node("/list"),
            },
            BindingSpec::BooleanConstant { constant: false },
            BindingSpec::BooleanNode {
                source_node: node("/flag"),
            },
            BindingSpec::IntegerConstant { constant: -12 },
            BindingSpec::IntegerNode {
                source_node: node("/count"),
            },
            BindingSpec::NumberConstant { constant: 2.25 },
            BindingSpec::NumberNode {
                source_node: node("/ratio"),
            },
            BindingSpec::StringConstant {
                constant: "x".into(),
            },
            BindingSpec::StringNode {
                source_node: node("/fullName"),
            },
        ];
        let nested = BindingSpec::StringTemplate {
            template: "{{ inner }}".into(),
            parameters: BTreeMap::from([(
                "inner".to_string(),
                BindingSpec::StringConstant {
                    constant: "deep".into(),
                },
            )]),
        };
        let mut parameters: BTreeMap<String, BindingSpec> = leaves
            .iter()
            .enumerate()
            .map(|(i, spec)| (format!("p{i}"), spec.clone()))
            .collect();
        parameters.insert("nested".into(), nested);

        let mut all = leaves;
        all.push(BindingSpec::StringTemplate {
            template: "{{ p0 }} {{ nested }}".into(),
            parameters,
        });
        all
    }

    #[test]
    fn every_kind_survives_the_row() {
        for spec in every_kind() {
            let binding = row(PayloadColumns::encode(&spec).unwrap()).decode().unwrap();
            assert_eq!(binding.spec, spec);
            assert_eq!(binding.target_node, "/name");
        }
    }

    #[test]
    fn only_owned_columns_are_set() {
        let columns = PayloadColumns::encode(&BindingSpec::StringNode {
            source_node: "/fullName".into(),
        })
        .unwrap();
        assert_eq!(
            columns,
            PayloadColumns {
                kind: "stringNode".into(),
                source_node: Some("/fullName".into()),
                ..PayloadColumns::default()
            }
        );

        let columns =
            PayloadColumns::encode(&BindingSpec::NumberConstant { constant: 1.0 }).unwrap();
        assert_eq!(columns.number_constant, Some(1.0));
        assert_eq!(columns.source_node, None);
        assert_eq!(columns.template, None);
        assert_eq!(columns.parameters, None);
    }

    #[test]
    fn unknown_discriminator_is_a_decode_error() {
        let err = row(PayloadColumns {
            kind: "stringHandlebars".into(),
            template: Some("{{ a }}".into()),
            ..PayloadColumns::default()
        })
        .decode()
        .unwrap_err();
        assert_matches!(err, CatalogError::Decode { .. });
    }

    #[test]
    fn missing_owned_column_is_a_decode_error() {
        let err = row(PayloadColumns {
            kind: "integerConstant".into(),
            string_constant: Some("42".into()),
            ..PayloadColumns::default()
        })
        .decode()
        .unwrap_err();
        assert_matches!(err, CatalogError::Decode { .. });
    }

    #[test]
    fn negative_iterations_are_rejected() {
        let err = row(PayloadColumns {
            kind: "arrayConstant".into(),
            array_constant: Some(-1),
            ..PayloadColumns::default()
        })
        .decode()
        .unwrap_err();
        assert_matches!(err, CatalogError::Decode { .. });
    }
}
