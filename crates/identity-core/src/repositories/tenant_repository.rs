//! Tenant repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Tenant, TenantLicence, User};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError>;

    /// Active tenant whose email address ends in `@{domain}`.
    async fn find_by_email_domain(&self, domain: &str) -> Result<Option<Tenant>, DomainError>;

    async fn list(&self) -> Result<Vec<Tenant>, DomainError>;

    /// Persists a tenant, its licence and its first user as one unit: either
    /// all three rows exist afterwards or none do.
    ///
    /// Fails `TenantAlreadyExists` when an active tenant already owns the
    /// email domain and `UserAlreadyExists` when the admin email is taken.
    async fn create_with_licence(
        &self,
        tenant: &Tenant,
        licence: &TenantLicence,
        admin: &User,
    ) -> Result<(), DomainError>;

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, DomainError>;

    /// Soft-deletes the tenant and every one of its users at `deleted_at`.
    /// Fails `TenantNotFound` if the tenant is missing or already deleted.
    async fn delete(&self, id: &Uuid, deleted_at: DateTime<Utc>) -> Result<(), DomainError>;
}
