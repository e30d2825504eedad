pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod row;
pub mod store;

pub use error::CatalogError;
pub use memory::MemoryCatalog;
pub use models::{NewOwner, Owner, SchemaRecord};
pub use postgres::PostgresCatalog;
pub use store::{BindingStore, Catalog, OwnerStore, SchemaStore};
