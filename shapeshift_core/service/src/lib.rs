//! Schema, owner and binding operations on top of a [`Catalog`].
//!
//! Every call is an independent unit of work: the transformation needed to
//! validate a binding is rebuilt from persisted state on each request.

pub mod error;
pub mod view;

pub use error::{ErrorResponse, ServiceError};
pub use view::OwnerView;

use bindings::{
    build, resolve_next_to_bind, Binding, BindingSpec, BindingUpdate, NewBinding,
    NextToBindResolution, SchemaTransformation, Transformation,
};
use catalog::{Catalog, NewOwner, Owner, SchemaRecord};
use schema::Schema;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Clone)]
pub struct BindingService {
    catalog: Arc<dyn Catalog>,
}

impl BindingService {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    /* ---------- schemas ---------- */

    pub async fn create_schema(&self, document: Value) -> ServiceResult<SchemaRecord> {
        Schema::build_schema(&document)?;
        let id = self.catalog.insert_schema(&document).await?;
        info!(schema_id = id, "Created schema");
        self.get_schema(id).await
    }

    pub async fn list_schemas(&self) -> ServiceResult<Vec<SchemaRecord>> {
        Ok(self.catalog.find_all_schemas().await?)
    }

    pub async fn get_schema(&self, id: i64) -> ServiceResult<SchemaRecord> {
        self.catalog
            .find_schema(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Schema {id} not found")))
    }

    /// Replaces a schema document. Refused while a transformation uses it.
    pub async fn update_schema(&self, id: i64, document: Value) -> ServiceResult<SchemaRecord> {
        Schema::build_schema(&document)?;
        self.catalog.update_schema(id, &document).await?;
        info!(schema_id = id, "Updated schema");
        self.get_schema(id).await
    }

    pub async fn delete_schema(&self, id: i64) -> ServiceResult<()> {
        self.catalog.delete_schema(id).await?;
        info!(schema_id = id, "Deleted schema");
        Ok(())
    }

    /* ---------- owners ---------- */

    /// Creates a transformation between two registered schemas. Its
    /// `totalBindings` is the number of target nodes needing a binding now.
    pub async fn create_owner(
        &self,
        source_schema_id: i64,
        target_schema_id: i64,
    ) -> ServiceResult<OwnerView> {
        let source = self.load_schema(source_schema_id).await?;
        let target = self.load_schema(target_schema_id).await?;
        let total = SchemaTransformation::new(source, target).to_bind().count();

        let id = self
            .catalog
            .insert_owner(&NewOwner {
                source_schema_id,
                target_schema_id,
                total_bindings: total_bindings(total)?,
            })
            .await?;
        info!(owner_id = id, total_bindings = total, "Created transformation");
        self.get_owner(id).await
    }

    pub async fn list_owners(&self) -> ServiceResult<Vec<OwnerView>> {
        let mut views = Vec::new();
        for owner in self.catalog.find_all_owners().await? {
            views.push(self.owner_view(owner).await?);
        }
        Ok(views)
    }

    pub async fn get_owner(&self, id: i64) -> ServiceResult<OwnerView> {
        let owner = self.require_owner(id).await?;
        self.owner_view(owner).await
    }

    pub async fn delete_owner(&self, id: i64) -> ServiceResult<()> {
        self.catalog.delete_owner(id).await?;
        info!(owner_id = id, "Deleted transformation and its bindings");
        Ok(())
    }

    /// Next node to bind and how many remain, for the owner's current state.
    pub async fn next_to_bind(&self, owner_id: i64) -> ServiceResult<NextToBindResolution> {
        let owner = self.require_owner(owner_id).await?;
        let bindings = self.catalog.find_all_bindings(owner_id).await?;
        let transformation = self.transformation_for(&owner, &bindings).await?;
        Ok(resolve_next_to_bind(&transformation))
    }

    /* ---------- bindings ---------- */

    pub async fn create_binding(&self, owner_id: i64, dto: NewBinding) -> ServiceResult<Binding> {
        let owner = self.require_owner(owner_id).await?;

        if self
            .catalog
            .count_by_target_node(owner_id, &dto.target_node)
            .await?
            > 0
        {
            let err = ServiceError::conflict(format!(
                "A binding for '{}' already exists",
                dto.target_node
            ));
            return Err(rejected(owner_id, &dto.target_node, err));
        }

        let bindings = self.catalog.find_all_bindings(owner_id).await?;
        let mut transformation = self.transformation_for(&owner, &bindings).await?;
        validate(&mut transformation, &dto.target_node, &dto.spec, "add")
            .map_err(|err| rejected(owner_id, &dto.target_node, err))?;

        let id = self
            .catalog
            .insert_binding(owner_id, &dto)
            .await
            .map_err(|err| match ServiceError::from(err) {
                err @ ServiceError::Conflict { .. } => rejected(owner_id, &dto.target_node, err),
                other => other,
            })?;
        info!(
            owner_id,
            binding_id = id,
            target_node = %dto.target_node,
            kind = %dto.spec.kind(),
            "Created binding"
        );
        self.get_binding(owner_id, id).await
    }

    pub async fn list_bindings(&self, owner_id: i64) -> ServiceResult<Vec<Binding>> {
        self.require_owner(owner_id).await?;
        let bindings = self.catalog.find_all_bindings(owner_id).await?;
        debug!(owner_id, count = bindings.len(), "Listed bindings");
        Ok(bindings)
    }

    pub async fn get_binding(&self, owner_id: i64, id: i64) -> ServiceResult<Binding> {
        self.require_owner(owner_id).await?;
        self.catalog
            .find_binding(owner_id, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Binding {id} not found")))
    }

    /// Replaces the kind and payload of a binding. The target node cannot
    /// change.
    pub async fn update_binding(
        &self,
        owner_id: i64,
        id: i64,
        dto: BindingUpdate,
    ) -> ServiceResult<Binding> {
        let owner = self.require_owner(owner_id).await?;
        let current = self.get_binding(owner_id, id).await?;

        if let Some(target_node) = &dto.target_node {
            if *target_node != current.target_node {
                let err = ServiceError::immutable_field(format!(
                    "Expected a binding for node '{}'",
                    current.target_node
                ));
                return Err(rejected(owner_id, target_node, err));
            }
        }

        let bindings = self.catalog.find_all_bindings(owner_id).await?;
        let mut transformation = self.transformation_for(&owner, &bindings).await?;
        validate(
            &mut transformation,
            &current.target_node,
            &dto.spec,
            "update",
        )
        .map_err(|err| rejected(owner_id, &current.target_node, err))?;

        self.catalog.update_binding(owner_id, id, &dto.spec).await?;
        info!(
            owner_id,
            binding_id = id,
            kind = %dto.spec.kind(),
            "Updated binding"
        );
        self.get_binding(owner_id, id).await
    }

    pub async fn delete_binding(&self, owner_id: i64, id: i64) -> ServiceResult<()> {
        self.require_owner(owner_id).await?;
        self.catalog.delete_binding(owner_id, id).await?;
        info!(owner_id, binding_id = id, "Deleted binding");
        Ok(())
    }

    /* ---------- helpers ---------- */

    async fn require_owner(&self, id: i64) -> ServiceResult<Owner> {
        self.catalog
            .find_owner(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Transformation {id} not found")))
    }

    async fn load_schema(&self, id: i64) -> ServiceResult<Schema> {
        let record = self.get_schema(id).await?;
        Ok(Schema::build_schema(&record.document)?)
    }

    async fn transformation_for(
        &self,
        owner: &Owner,
        bindings: &[Binding],
    ) -> ServiceResult<SchemaTransformation> {
        let source = self.load_schema(owner.source_schema_id).await?;
        let target = self.load_schema(owner.target_schema_id).await?;
        Ok(logging::timeit!("rebuild transformation", {
            SchemaTransformation::with_bindings(source, target, bindings)
        }))
    }

    async fn owner_view(&self, owner: Owner) -> ServiceResult<OwnerView> {
        let bindings = self.catalog.find_all_bindings(owner.id).await?;
        let transformation = self.transformation_for(&owner, &bindings).await?;
        let resolution = resolve_next_to_bind(&transformation);
        debug!(
            owner_id = owner.id,
            remaining = resolution.remaining_bindings,
            "Resolved transformation"
        );
        Ok(OwnerView {
            owner,
            bindings,
            resolution,
        })
    }
}

fn total_bindings(count: usize) -> ServiceResult<u32> {
    u32::try_from(count).map_err(|err| {
        ServiceError::internal(format!("{count} target nodes exceed the binding limit"), err)
    })
}

fn rejected(owner_id: i64, target_node: &str, err: ServiceError) -> ServiceError {
    warn!(
        owner_id,
        target_node = %target_node,
        reason = %err.context().message(),
        "Rejected binding"
    );
    err
}

/// Checks that `spec` can be attached to `target_node` of `transformation`.
fn validate(
    transformation: &mut SchemaTransformation,
    target_node: &str,
    spec: &BindingSpec,
    action: &str,
) -> ServiceResult<()> {
    let node = transformation
        .target()
        .at(target_node)
        .cloned()
        .ok_or_else(|| {
            ServiceError::illegal_binding(format!(
                "Could not find node '{target_node}' in target schema"
            ))
        })?;

    let executable = build(spec, &*transformation).map_err(|err| {
        ServiceError::illegal_binding(format!(
            "Cannot {action} binding, reason: {}",
            err.reason()
        ))
    })?;
    transformation.bind(&node, executable).map_err(|err| {
        ServiceError::illegal_binding(format!(
            "Cannot {action} binding, reason: {}",
            err.reason()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use matches::assert_matches;

    #[test]
    fn total_bindings_fits_u32() {
        assert_eq!(total_bindings(5).unwrap(), 5);
        assert_eq!(total_bindings(u32::MAX as usize).unwrap(), u32::MAX);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn total_bindings_overflow_is_internal() {
        let err = total_bindings(u32::MAX as usize + 1).unwrap_err();
        assert_matches!(err, ServiceError::Internal { source: Some(_), .. });
        assert_eq!(err.status(), 500);
    }
}
