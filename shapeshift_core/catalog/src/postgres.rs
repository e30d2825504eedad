use crate::error::CatalogError;
use crate::models::{NewOwner, Owner, SchemaRecord};
use crate::row::{BindingRow, PayloadColumns};
use crate::store::{BindingStore, OwnerStore, SchemaStore};
use async_trait::async_trait;
use bindings::{Binding, BindingSpec, NewBinding};
use chrono::Utc;
use serde_json::Value;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{error, info};

pub const DROP_TABLES: &str = "\
DROP TABLE IF EXISTS bindings;
DROP TABLE IF EXISTS owners;
DROP TABLE IF EXISTS schemas;";

pub const CREATE_TABLES: &str = "\
CREATE TABLE IF NOT EXISTS schemas (
    id BIGSERIAL PRIMARY KEY,
    creation_date TIMESTAMPTZ NOT NULL,
    document TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS owners (
    id BIGSERIAL PRIMARY KEY,
    creation_date TIMESTAMPTZ NOT NULL,
    source_schema_id BIGINT NOT NULL REFERENCES schemas (id) ON DELETE RESTRICT,
    target_schema_id BIGINT NOT NULL REFERENCES schemas (id) ON DELETE RESTRICT,
    total_bindings BIGINT NOT NULL
);
CREATE TABLE IF NOT EXISTS bindings (
    id BIGSERIAL PRIMARY KEY,
    last_modification_date TIMESTAMPTZ NOT NULL,
    owner_id BIGINT NOT NULL REFERENCES owners (id) ON DELETE CASCADE,
    kind VARCHAR(32) NOT NULL,
    target_node VARCHAR(256) NOT NULL,
    source_node VARCHAR(256),
    array_constant BIGINT,
    boolean_constant BOOLEAN,
    integer_constant BIGINT,
    number_constant DOUBLE PRECISION,
    string_constant VARCHAR(512),
    template TEXT,
    parameters TEXT,
    CONSTRAINT bindings_owner_target_node UNIQUE (owner_id, target_node)
);";

macro_rules! binding_columns {
    () => {
        "id, owner_id, target_node, last_modification_date, kind, source_node, \
         array_constant, boolean_constant, integer_constant, number_constant, \
         string_constant, template, parameters"
    };
}

macro_rules! owner_columns {
    () => {
        "id, creation_date, source_schema_id, target_schema_id, total_bindings"
    };
}

const SELECT_OWNERS: &str = concat!("SELECT ", owner_columns!(), " FROM owners ORDER BY id");
const SELECT_OWNER: &str = concat!("SELECT ", owner_columns!(), " FROM owners WHERE id = $1");
const SELECT_OWNERS_BY_SCHEMA: &str = concat!(
    "SELECT ",
    owner_columns!(),
    " FROM owners WHERE source_schema_id = $1 OR target_schema_id = $1 ORDER BY id"
);
const SELECT_BINDINGS: &str =
    concat!("SELECT ", binding_columns!(), " FROM bindings WHERE owner_id = $1");
const SELECT_BINDING: &str = concat!(
    "SELECT ",
    binding_columns!(),
    " FROM bindings WHERE owner_id = $1 AND id = $2"
);

/// Postgres backed catalog. Every operation opens its own connection and
/// drops it when done.
#[derive(Debug, Clone)]
pub struct PostgresCatalog {
    conn_string: String,
}

impl PostgresCatalog {
    pub fn new(conn_string: impl Into<String>) -> Self {
        Self {
            conn_string: conn_string.into(),
        }
    }

    /// Connects and spawns the connection driver in the background.
    async fn connect(&self) -> Result<Client, CatalogError> {
        let (client, connection) = tokio_postgres::connect(&self.conn_string, NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("postgres connection closed with error: {e}");
            }
        });
        Ok(client)
    }

    /// Creates the tables, dropping existing ones first when `drop` is set.
    pub async fn init_schema(&self, drop: bool) -> Result<(), CatalogError> {
        let client = self.connect().await?;
        if drop {
            client.batch_execute(DROP_TABLES).await?;
            info!("Dropped catalog tables");
        }
        client.batch_execute(CREATE_TABLES).await?;
        info!("Catalog tables ready");
        Ok(())
    }
}

fn is_violation(err: &tokio_postgres::Error, state: &SqlState) -> bool {
    err.code() == Some(state)
}

fn count_to_u32(value: i64, column: &str) -> Result<u32, CatalogError> {
    u32::try_from(value).map_err(|_| CatalogError::decode(format!("{column} {value} out of range")))
}

fn schema_from_row(row: &Row) -> Result<SchemaRecord, CatalogError> {
    let raw: String = row.try_get("document")?;
    let document = serde_json::from_str(&raw)
        .map_err(|err| CatalogError::decode(format!("unreadable schema document: {err}")))?;
    Ok(SchemaRecord {
        id: row.try_get("id")?,
        creation_date: row.try_get("creation_date")?,
        document,
    })
}

fn owner_from_row(row: &Row) -> Result<Owner, CatalogError> {
    Ok(Owner {
        id: row.try_get("id")?,
        creation_date: row.try_get("creation_date")?,
        source_schema_id: row.try_get("source_schema_id")?,
        target_schema_id: row.try_get("target_schema_id")?,
        total_bindings: count_to_u32(row.try_get("total_bindings")?, "total_bindings")?,
    })
}

fn binding_from_row(row: &Row) -> Result<Binding, CatalogError> {
    BindingRow {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        target_node: row.try_get("target_node")?,
        last_modification_date: row.try_get("last_modification_date")?,
        payload: PayloadColumns {
            kind: row.try_get("kind")?,
            source_node: row.try_get("source_node")?,
            array_constant: row.try_get("array_constant")?,
            boolean_constant: row.try_get("boolean_constant")?,
            integer_constant: row.try_get("integer_constant")?,
            number_constant: row.try_get("number_constant")?,
            string_constant: row.try_get("string_constant")?,
            template: row.try_get("template")?,
            parameters: row.try_get("parameters")?,
        },
    }
    .decode()
}

#[async_trait]
impl SchemaStore for PostgresCatalog {
    async fn insert_schema(&self, document: &Value) -> Result<i64, CatalogError> {
        let client = self.connect().await?;
        let raw = serde_json::to_string(document)?;
        let row = client
            .query_one(
                "INSERT INTO schemas (creation_date, document) VALUES ($1, $2) RETURNING id",
                &[&Utc::now(), &raw],
            )
            .await?;
        Ok(row.try_get("id")?)
    }

    async fn find_all_schemas(&self) -> Result<Vec<SchemaRecord>, CatalogError> {
        let client = self.connect().await?;
        let rows = client
            .query(
                "SELECT id, creation_date, document FROM schemas ORDER BY id",
                &[],
            )
            .await?;
        rows.iter().map(schema_from_row).collect()
    }

    async fn find_schema(&self, id: i64) -> Result<Option<SchemaRecord>, CatalogError> {
        let client = self.connect().await?;
        let row = client
            .query_opt(
                "SELECT id, creation_date, document FROM schemas WHERE id = $1",
                &[&id],
            )
            .await?;
        row.as_ref().map(schema_from_row).transpose()
    }

    async fn update_schema(&self, id: i64, document: &Value) -> Result<(), CatalogError> {
        if !self.find_owners_by_schema(id).await?.is_empty() {
            return Err(CatalogError::in_use(format!(
                "Schema {id} is used by a transformation"
            )));
        }
        let client = self.connect().await?;
        let raw = serde_json::to_string(document)?;
        let updated = client
            .execute(
                "UPDATE schemas SET document = $2 WHERE id = $1",
                &[&id, &raw],
            )
            .await?;
        if updated == 0 {
            return Err(CatalogError::not_found(format!("Schema {id} not found")));
        }
        Ok(())
    }

    async fn delete_schema(&self, id: i64) -> Result<(), CatalogError> {
        let client = self.connect().await?;
        let deleted = client
            .execute("DELETE FROM schemas WHERE id = $1", &[&id])
            .await
            .map_err(|err| {
                if is_violation(&err, &SqlState::FOREIGN_KEY_VIOLATION) {
                    CatalogError::in_use(format!("Schema {id} is used by a transformation"))
                } else {
                    err.into()
                }
            })?;
        if deleted == 0 {
            return Err(CatalogError::not_found(format!("Schema {id} not found")));
        }
        Ok(())
    }
}

#[async_trait]
impl OwnerStore for PostgresCatalog {
    async fn insert_owner(&self, owner: &NewOwner) -> Result<i64, CatalogError> {
        let client = self.connect().await?;
        let row = client
            .query_one(
                "INSERT INTO owners \
                 (creation_date, source_schema_id, target_schema_id, total_bindings) \
                 VALUES ($1, $2, $3, $4) RETURNING id",
                &[
                    &Utc::now(),
                    &owner.source_schema_id,
                    &owner.target_schema_id,
                    &i64::from(owner.total_bindings),
                ],
            )
            .await
            .map_err(|err| {
                if is_violation(&err, &SqlState::FOREIGN_KEY_VIOLATION) {
                    CatalogError::not_found(format!(
                        "Schema {} or {} not found",
                        owner.source_schema_id, owner.target_schema_id
                    ))
                } else {
                    err.into()
                }
            })?;
        Ok(row.try_get("id")?)
    }

    async fn find_all_owners(&self) -> Result<Vec<Owner>, CatalogError> {
        let client = self.connect().await?;
        let rows = client.query(SELECT_OWNERS, &[]).await?;
        rows.iter().map(owner_from_row).collect()
    }

    async fn find_owner(&self, id: i64) -> Result<Option<Owner>, CatalogError> {
        let client = self.connect().await?;
        let row = client.query_opt(SELECT_OWNER, &[&id]).await?;
        row.as_ref().map(owner_from_row).transpose()
    }

    async fn find_owners_by_schema(&self, schema_id: i64) -> Result<Vec<Owner>, CatalogError> {
        let client = self.connect().await?;
        let rows = client.query(SELECT_OWNERS_BY_SCHEMA, &[&schema_id]).await?;
        rows.iter().map(owner_from_row).collect()
    }

    async fn delete_owner(&self, id: i64) -> Result<(), CatalogError> {
        let client = self.connect().await?;
        let deleted = client
            .execute("DELETE FROM owners WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(CatalogError::not_found(format!("Transformation {id} not found")));
        }
        Ok(())
    }
}

#[async_trait]
impl BindingStore for PostgresCatalog {
    async fn count_by_target_node(
        &self,
        owner_id: i64,
        target_node: &str,
    ) -> Result<u64, CatalogError> {
        let client = self.connect().await?;
        let row = client
            .query_one(
                "SELECT COUNT(*) AS n FROM bindings WHERE owner_id = $1 AND target_node = $2",
                &[&owner_id, &target_node],
            )
            .await?;
        let count: i64 = row.try_get("n")?;
        Ok(count.max(0) as u64)
    }

    async fn insert_binding(
        &self,
        owner_id: i64,
        binding: &NewBinding,
    ) -> Result<i64, CatalogError> {
        let p = PayloadColumns::encode(&binding.spec)?;
        let client = self.connect().await?;
        let row = client
            .query_one(
                "INSERT INTO bindings (last_modification_date, owner_id, kind, target_node, \
                 source_node, array_constant, boolean_constant, integer_constant, \
                 number_constant, string_constant, template, parameters) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING id",
                &[
                    &Utc::now(),
                    &owner_id,
                    &p.kind,
                    &binding.target_node,
                    &p.source_node,
                    &p.array_constant,
                    &p.boolean_constant,
                    &p.integer_constant,
                    &p.number_constant,
                    &p.string_constant,
                    &p.template,
                    &p.parameters,
                ],
            )
            .await
            .map_err(|err| {
                if is_violation(&err, &SqlState::UNIQUE_VIOLATION) {
                    CatalogError::duplicate_binding(&binding.target_node)
                } else if is_violation(&err, &SqlState::FOREIGN_KEY_VIOLATION) {
                    CatalogError::not_found(format!("Transformation {owner_id} not found"))
                } else {
                    err.into()
                }
            })?;
        Ok(row.try_get("id")?)
    }

    async fn find_all_bindings(&self, owner_id: i64) -> Result<Vec<Binding>, CatalogError> {
        let client = self.connect().await?;
        let rows = client.query(SELECT_BINDINGS, &[&owner_id]).await?;
        rows.iter().map(binding_from_row).collect()
    }

    async fn find_binding(&self, owner_id: i64, id: i64) -> Result<Option<Binding>, CatalogError> {
        let client = self.connect().await?;
        let row = client.query_opt(SELECT_BINDING, &[&owner_id, &id]).await?;
        row.as_ref().map(binding_from_row).transpose()
    }

    async fn update_binding(
        &self,
        owner_id: i64,
        id: i64,
        spec: &BindingSpec,
    ) -> Result<(), CatalogError> {
        let p = PayloadColumns::encode(spec)?;
        let client = self.connect().await?;
        let updated = client
            .execute(
                "UPDATE bindings SET last_modification_date = $3, kind = $4, source_node = $5, \
                 array_constant = $6, boolean_constant = $7, integer_constant = $8, \
                 number_constant = $9, string_constant = $10, template = $11, parameters = $12 \
                 WHERE owner_id = $1 AND id = $2",
                &[
                    &owner_id,
                    &id,
                    &Utc::now(),
                    &p.kind,
                    &p.source_node,
                    &p.array_constant,
                    &p.boolean_constant,
                    &p.integer_constant,
                    &p.number_constant,
                    &p.string_constant,
                    &p.template,
                    &p.parameters,
                ],
            )
            .await?;
        if updated == 0 {
            return Err(CatalogError::not_found(format!(
                "Binding {id} not found for owner {owner_id}"
            )));
        }
        Ok(())
    }

    async fn delete_binding(&self, owner_id: i64, id: i64) -> Result<(), CatalogError> {
        let client = self.connect().await?;
        let deleted = client
            .execute(
                "DELETE FROM bindings WHERE owner_id = $1 AND id = $2",
                &[&owner_id, &id],
            )
            .await?;
        if deleted == 0 {
            return Err(CatalogError::not_found(format!(
                "Binding {id} not found for owner {owner_id}"
            )));
        }
        Ok(())
    }
}
