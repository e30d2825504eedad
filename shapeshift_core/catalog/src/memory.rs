use crate::error::CatalogError;
use crate::models::{NewOwner, Owner, SchemaRecord};
use crate::row::{BindingRow, PayloadColumns};
use crate::store::{BindingStore, OwnerStore, SchemaStore};
use async_trait::async_trait;
use bindings::{Binding, BindingSpec, NewBinding};
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// internal flat state (easy to serde)
#[derive(Default, Serialize, Deserialize)]
struct State {
    last_schema_id: i64,
    last_owner_id: i64,
    last_binding_id: i64,
    schemas: BTreeMap<i64, SchemaRecord>,
    owners: BTreeMap<i64, Owner>,
    bindings: BTreeMap<i64, BindingRow>,
}

impl State {
    fn schema_in_use(&self, id: i64) -> bool {
        self.owners
            .values()
            .any(|o| o.source_schema_id == id || o.target_schema_id == id)
    }

    fn owned_row(&mut self, owner_id: i64, id: i64) -> Result<&mut BindingRow, CatalogError> {
        self.bindings
            .get_mut(&id)
            .filter(|row| row.owner_id == owner_id)
            .ok_or_else(|| {
                CatalogError::not_found(format!("Binding {id} not found for owner {owner_id}"))
            })
    }
}

/// In-process catalog. Bindings are kept in their single-table row form so
/// the memory and Postgres backends share one codec.
#[derive(Clone)]
pub struct MemoryCatalog {
    inner: Arc<RwLock<State>>,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(State::default())),
        }
    }

    /* ---------- optional durability ---------- */
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = match std::fs::read_to_string(path.as_ref()) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => "{}".into(),
            Err(err) => return Err(err.into()),
        };
        let state: State = serde_json::from_str(&json)?;
        Ok(Self {
            inner: Arc::new(RwLock::new(state)),
        })
    }

    pub fn flush_to(&self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&*self.inner.read())?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(tmp, path)?;
        Ok(())
    }
}

#[async_trait]
impl SchemaStore for MemoryCatalog {
    async fn insert_schema(&self, document: &Value) -> Result<i64, CatalogError> {
        let mut g = self.inner.write();
        g.last_schema_id += 1;
        let id = g.last_schema_id;
        g.schemas.insert(
            id,
            SchemaRecord {
                id,
                creation_date: Utc::now(),
                document: document.clone(),
            },
        );
        Ok(id)
    }

    async fn find_all_schemas(&self) -> Result<Vec<SchemaRecord>, CatalogError> {
        Ok(self.inner.read().schemas.values().cloned().collect())
    }

    async fn find_schema(&self, id: i64) -> Result<Option<SchemaRecord>, CatalogError> {
        Ok(self.inner.read().schemas.get(&id).cloned())
    }

    async fn update_schema(&self, id: i64, document: &Value) -> Result<(), CatalogError> {
        let mut g = self.inner.write();
        if g.schema_in_use(id) {
            return Err(CatalogError::in_use(format!(
                "Schema {id} is used by a transformation"
            )));
        }
        let record = g
            .schemas
            .get_mut(&id)
            .ok_or_else(|| CatalogError::not_found(format!("Schema {id} not found")))?;
        record.document = document.clone();
        Ok(())
    }

    async fn delete_schema(&self, id: i64) -> Result<(), CatalogError> {
        let mut g = self.inner.write();
        if g.schema_in_use(id) {
            return Err(CatalogError::in_use(format!(
                "Schema {id} is used by a transformation"
            )));
        }
        g.schemas
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CatalogError::not_found(format!("Schema {id} not found")))
    }
}

#[async_trait]
impl OwnerStore for MemoryCatalog {
    async fn insert_owner(&self, owner: &NewOwner) -> Result<i64, CatalogError> {
        let mut g = self.inner.write();
        for schema_id in [owner.source_schema_id, owner.target_schema_id] {
            if !g.schemas.contains_key(&schema_id) {
                return Err(CatalogError::not_found(format!(
                    "Schema {schema_id} not found"
                )));
            }
        }
        g.last_owner_id += 1;
        let id = g.last_owner_id;
        g.owners.insert(
            id,
            Owner {
                id,
                creation_date: Utc::now(),
                source_schema_id: owner.source_schema_id,
                target_schema_id: owner.target_schema_id,
                total_bindings: owner.total_bindings,
            },
        );
        Ok(id)
    }

    async fn find_all_owners(&self) -> Result<Vec<Owner>, CatalogError> {
        Ok(self.inner.read().owners.values().cloned().collect())
    }

    async fn find_owner(&self, id: i64) -> Result<Option<Owner>, CatalogError> {
        Ok(self.inner.read().owners.get(&id).cloned())
    }

    async fn find_owners_by_schema(&self, schema_id: i64) -> Result<Vec<Owner>, CatalogError> {
        Ok(self
            .inner
            .read()
            .owners
            .values()
            .filter(|o| o.source_schema_id == schema_id || o.target_schema_id == schema_id)
            .cloned()
            .collect())
    }

    async fn delete_owner(&self, id: i64) -> Result<(), CatalogError> {
        let mut g = self.inner.write();
        g.owners
            .remove(&id)
            .ok_or_else(|| CatalogError::not_found(format!("Transformation {id} not found")))?;
        let before = g.bindings.len();
        g.bindings.retain(|_, row| row.owner_id != id);
        debug!(owner_id = id, removed = before - g.bindings.len(), "Cascaded bindings");
        Ok(())
    }
}

#[async_trait]
impl BindingStore for MemoryCatalog {
    async fn count_by_target_node(
        &self,
        owner_id: i64,
        target_node: &str,
    ) -> Result<u64, CatalogError> {
        let count = self
            .inner
            .read()
            .bindings
            .values()
            .filter(|row| row.owner_id == owner_id && row.target_node == target_node)
            .count();
        Ok(count as u64)
    }

    async fn insert_binding(
        &self,
        owner_id: i64,
        binding: &NewBinding,
    ) -> Result<i64, CatalogError> {
        let payload = PayloadColumns::encode(&binding.spec)?;
        let mut g = self.inner.write();
        if !g.owners.contains_key(&owner_id) {
            return Err(CatalogError::not_found(format!(
                "Transformation {owner_id} not found"
            )));
        }
        if g
            .bindings
            .values()
            .any(|row| row.owner_id == owner_id && row.target_node == binding.target_node)
        {
            return Err(CatalogError::duplicate_binding(&binding.target_node));
        }
        g.last_binding_id += 1;
        let id = g.last_binding_id;
        g.bindings.insert(
            id,
            BindingRow {
                id,
                owner_id,
                target_node: binding.target_node.clone(),
                last_modification_date: Utc::now(),
                payload,
            },
        );
        Ok(id)
    }

    async fn find_all_bindings(&self, owner_id: i64) -> Result<Vec<Binding>, CatalogError> {
        self.inner
            .read()
            .bindings
            .values()
            .filter(|row| row.owner_id == owner_id)
            .map(BindingRow::decode)
            .collect()
    }

    async fn find_binding(&self, owner_id: i64, id: i64) -> Result<Option<Binding>, CatalogError> {
        self.inner
            .read()
            .bindings
            .get(&id)
            .filter(|row| row.owner_id == owner_id)
            .map(BindingRow::decode)
            .transpose()
    }

    async fn update_binding(
        &self,
        owner_id: i64,
        id: i64,
        spec: &BindingSpec,
    ) -> Result<(), CatalogError> {
        let payload = PayloadColumns::encode(spec)?;
        let mut g = self.inner.write();
        let row = g.owned_row(owner_id, id)?;
        row.payload = payload;
        row.last_modification_date = Utc::now();
        Ok(())
    }

    async fn delete_binding(&self, owner_id: i64, id: i64) -> Result<(), CatalogError> {
        let mut g = self.inner.write();
        g.owned_row(owner_id, id)?;
        g.bindings.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matches::assert_matches;
    use serde_json::json;

    async fn catalog_with_owner() -> (MemoryCatalog, i64) {
        let catalog = MemoryCatalog::new();
        let schema = catalog
            .insert_schema(&json!({ "type": "object" }))
            .await
            .unwrap();
        let owner = catalog
            .insert_owner(&NewOwner {
                source_schema_id: schema,
                target_schema_id: schema,
                total_bindings: 0,
            })
            .await
            .unwrap();
        (catalog, owner)
    }

    fn new_binding(target_node: &str, spec: BindingSpec) -> NewBinding {
        NewBinding {
            target_node: target_node.into(),
            spec,
        }
    }

    #[tokio::test]
    async fn duplicate_target_node_is_rejected() {
        let (catalog, owner) = catalog_with_owner().await;
        let first = new_binding("/age", BindingSpec::IntegerConstant { constant: 1 });
        catalog.insert_binding(owner, &first).await.unwrap();

        let err = catalog
            .insert_binding(
                owner,
                &new_binding("/age", BindingSpec::IntegerConstant { constant: 2 }),
            )
            .await
            .unwrap_err();
        assert_matches!(err, CatalogError::Duplicate { .. });
        assert_eq!(catalog.count_by_target_node(owner, "/age").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn bindings_are_scoped_to_their_owner() {
        let (catalog, owner) = catalog_with_owner().await;
        let id = catalog
            .insert_binding(
                owner,
                &new_binding("/a", BindingSpec::BooleanConstant { constant: true }),
            )
            .await
            .unwrap();

        assert!(catalog.find_binding(owner + 1, id).await.unwrap().is_none());
        let err = catalog.delete_binding(owner + 1, id).await.unwrap_err();
        assert_matches!(err, CatalogError::NotFound { .. });
        assert!(catalog.find_binding(owner, id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_clears_previous_kind_columns() {
        let (catalog, owner) = catalog_with_owner().await;
        let id = catalog
            .insert_binding(
                owner,
                &new_binding(
                    "/name",
                    BindingSpec::StringConstant {
                        constant: "x".into(),
                    },
                ),
            )
            .await
            .unwrap();

        let spec = BindingSpec::StringNode {
            source_node: "/fullName".into(),
        };
        catalog.update_binding(owner, id, &spec).await.unwrap();

        let g = catalog.inner.read();
        let row = &g.bindings[&id];
        assert_eq!(row.payload.kind, "stringNode");
        assert_eq!(row.payload.string_constant, None);
        assert_eq!(row.payload.source_node.as_deref(), Some("/fullName"));
    }

    #[tokio::test]
    async fn deleting_owner_cascades() {
        let (catalog, owner) = catalog_with_owner().await;
        catalog
            .insert_binding(
                owner,
                &new_binding("/a", BindingSpec::IntegerConstant { constant: 1 }),
            )
            .await
            .unwrap();
        catalog.delete_owner(owner).await.unwrap();
        assert!(catalog.find_all_bindings(owner).await.unwrap().is_empty());
        assert!(catalog.find_owner(owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn referenced_schema_cannot_change() {
        let (catalog, owner) = catalog_with_owner().await;
        let schema = catalog.find_owner(owner).await.unwrap().unwrap().source_schema_id;

        let err = catalog.delete_schema(schema).await.unwrap_err();
        assert_matches!(err, CatalogError::InUse { .. });
        let err = catalog
            .update_schema(schema, &json!({ "type": "string" }))
            .await
            .unwrap_err();
        assert_matches!(err, CatalogError::InUse { .. });

        catalog.delete_owner(owner).await.unwrap();
        catalog.delete_schema(schema).await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_row_aborts_listing() {
        let (catalog, owner) = catalog_with_owner().await;
        catalog
            .insert_binding(
                owner,
                &new_binding("/a", BindingSpec::IntegerConstant { constant: 1 }),
            )
            .await
            .unwrap();
        catalog
            .inner
            .write()
            .bindings
            .values_mut()
            .for_each(|row| row.payload.kind = "mystery".into());

        let err = catalog.find_all_bindings(owner).await.unwrap_err();
        assert_matches!(err, CatalogError::Decode { .. });
    }

    #[tokio::test]
    async fn state_survives_flush_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("catalog.json");
        let (catalog, owner) = catalog_with_owner().await;
        let id = catalog
            .insert_binding(
                owner,
                &new_binding("/n", BindingSpec::NumberConstant { constant: 0.5 }),
            )
            .await
            .unwrap();
        catalog.flush_to(&path).unwrap();

        let reloaded = MemoryCatalog::load_from(&path).unwrap();
        let binding = reloaded.find_binding(owner, id).await.unwrap().unwrap();
        assert_eq!(binding.spec, BindingSpec::NumberConstant { constant: 0.5 });

        let next = reloaded
            .insert_binding(
                owner,
                &new_binding("/m", BindingSpec::BooleanConstant { constant: false }),
            )
            .await
            .unwrap();
        assert_eq!(next, id + 1);
    }

    #[test]
    fn load_from_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = MemoryCatalog::load_from(dir.path().join("absent.json")).unwrap();
        assert!(catalog.inner.read().schemas.is_empty());
    }
}
