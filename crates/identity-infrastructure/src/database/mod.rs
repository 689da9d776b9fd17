//! Database module (PostgreSQL adapters)

pub mod connection;
mod error;
pub mod postgres;

pub use connection::create_pool;
pub use postgres::{PgTenantLicenceRepository, PgTenantRepository, PgUserRepository};
