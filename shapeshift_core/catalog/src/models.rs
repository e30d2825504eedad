use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A registered JSON Schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRecord {
    pub id: i64,
    pub creation_date: DateTime<Utc>,
    pub document: Value,
}

/// A transformation owning a set of bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: i64,
    pub creation_date: DateTime<Utc>,
    pub source_schema_id: i64,
    pub target_schema_id: i64,
    /// Number of target nodes needing a binding when the owner was created.
    pub total_bindings: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOwner {
    pub source_schema_id: i64,
    pub target_schema_id: i64,
    pub total_bindings: u32,
}
