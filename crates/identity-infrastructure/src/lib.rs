//! # Identity Infrastructure
//! 
//! Storage adapters for the identity ports: PostgreSQL through sqlx, and a
//! process-local store for tests and demos.

pub mod database;
pub mod memory;

pub use database::{create_pool, PgTenantLicenceRepository, PgTenantRepository, PgUserRepository};
pub use memory::InMemoryIdentityStore;
