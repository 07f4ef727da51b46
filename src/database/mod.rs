pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::{MemoryStore, StoreWrite};
pub use models::{Nas, NasStatus, Tenant, TenantStatus};
pub use postgres::PgStore;
pub use store::{NasStore, StoreError, StoreResult, TenantStore};
