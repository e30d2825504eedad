use serde_json::{json, Value};
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use uuid::Uuid;

pub const PG_DB: &str = "postgres";
pub const PG_USER: &str = "postgres";
pub const PG_PASSWORD: &str = "postgres";
pub const PG_HOST: &str = "127.0.0.1";

pub struct PgTestContainer {
    pub container: ContainerAsync<GenericImage>,
    pub port: u16,
    pub db_name: &'static str,
    pub user: &'static str,
    pub password: &'static str,
    pub host: &'static str,
}

impl PgTestContainer {
    pub fn conn_string(&self) -> String {
        format!(
            "host={} user={} password={} dbname={} port={}",
            self.host, self.user, self.password, self.db_name, self.port
        )
    }
}

/// Starts a throwaway `postgres:16` container. Needs a reachable Docker daemon.
pub async fn setup_postgres() -> Result<PgTestContainer, Box<dyn std::error::Error>> {
    let name = format!("shapeshift-postgres-{}", Uuid::new_v4());
    let postgres = GenericImage::new("postgres", "16")
        .with_wait_for(WaitFor::message_on_stdout(
            "database system is ready to accept connections",
        ))
        .with_container_name(&name)
        .with_env_var("POSTGRES_DB", PG_DB)
        .with_env_var("POSTGRES_USER", PG_USER)
        .with_env_var("POSTGRES_PASSWORD", PG_PASSWORD)
        .with_mapped_port(0, 5432u16.tcp())
        .start()
        .await?;

    let port = postgres.get_host_port_ipv4(5432).await?;

    Ok(PgTestContainer {
        container: postgres,
        port,
        db_name: PG_DB,
        user: PG_USER,
        password: PG_PASSWORD,
        host: PG_HOST,
    })
}

/// Source side of the person fixture.
pub fn person_source_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "fullName": { "type": "string" },
            "years": { "type": "integer" },
            "height": { "type": "number" },
            "active": { "type": "boolean" },
            "nicknames": { "type": "array", "items": { "type": "string" } }
        }
    })
}

/// Target side of the person fixture: `/name`, `/age`, `/tags`, `/tags/{i}`
/// and `/address/zip` need bindings, in that order.
pub fn person_target_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "age": { "type": "integer" },
            "tags": { "type": "array", "items": { "type": "string" } },
            "address": {
                "type": "object",
                "properties": {
                    "zip": { "type": "string" },
                    "unused": { "type": "null" }
                }
            }
        }
    })
}
