use crate::error::CatalogError;
use crate::models::{NewOwner, Owner, SchemaRecord};
use async_trait::async_trait;
use bindings::{Binding, BindingSpec, NewBinding};
use serde_json::Value;

#[async_trait]
pub trait SchemaStore: Send + Sync + 'static {
    async fn insert_schema(&self, document: &Value) -> Result<i64, CatalogError>;
    async fn find_all_schemas(&self) -> Result<Vec<SchemaRecord>, CatalogError>;
    async fn find_schema(&self, id: i64) -> Result<Option<SchemaRecord>, CatalogError>;
    /// Fails with `InUse` while an owner references the schema.
    async fn update_schema(&self, id: i64, document: &Value) -> Result<(), CatalogError>;
    /// Fails with `InUse` while an owner references the schema.
    async fn delete_schema(&self, id: i64) -> Result<(), CatalogError>;
}

#[async_trait]
pub trait OwnerStore: Send + Sync + 'static {
    async fn insert_owner(&self, owner: &NewOwner) -> Result<i64, CatalogError>;
    async fn find_all_owners(&self) -> Result<Vec<Owner>, CatalogError>;
    async fn find_owner(&self, id: i64) -> Result<Option<Owner>, CatalogError>;
    async fn find_owners_by_schema(&self, schema_id: i64) -> Result<Vec<Owner>, CatalogError>;
    /// Removes the owner and every binding it owns.
    async fn delete_owner(&self, id: i64) -> Result<(), CatalogError>;
}

/// Binding persistence, every operation scoped to one owner.
#[async_trait]
pub trait BindingStore: Send + Sync + 'static {
    async fn count_by_target_node(
        &self,
        owner_id: i64,
        target_node: &str,
    ) -> Result<u64, CatalogError>;

    /// Persists one row. Fails with `Duplicate` when the owner already has a
    /// binding on the same target node, checked atomically with the write.
    async fn insert_binding(&self, owner_id: i64, binding: &NewBinding)
        -> Result<i64, CatalogError>;

    /// All bindings of the owner, in no particular order.
    async fn find_all_bindings(&self, owner_id: i64) -> Result<Vec<Binding>, CatalogError>;

    async fn find_binding(&self, owner_id: i64, id: i64) -> Result<Option<Binding>, CatalogError>;

    /// Replaces the kind and every payload column, clearing those the new kind
    /// does not own.
    async fn update_binding(
        &self,
        owner_id: i64,
        id: i64,
        spec: &BindingSpec,
    ) -> Result<(), CatalogError>;

    async fn delete_binding(&self, owner_id: i64, id: i64) -> Result<(), CatalogError>;
}

/// Everything the service layer needs from a storage backend.
pub trait Catalog: SchemaStore + OwnerStore + BindingStore {}

impl<T> Catalog for T where T: SchemaStore + OwnerStore + BindingStore {}
