//! Repository traits (ports)
//!
//! Lookups never return soft-deleted records. Every method that mutates a
//! counter (`used_seats`, `failed_login_attempts`) must do so atomically in
//! the store; services never read-modify-write those fields themselves.

pub mod user_repository;
pub mod tenant_repository;
pub mod tenant_licence_repository;

pub use user_repository::UserRepository;
pub use tenant_repository::TenantRepository;
pub use tenant_licence_repository::TenantLicenceRepository;

#[cfg(test)]
pub use user_repository::MockUserRepository;
#[cfg(test)]
pub use tenant_repository::MockTenantRepository;
#[cfg(test)]
pub use tenant_licence_repository::MockTenantLicenceRepository;
