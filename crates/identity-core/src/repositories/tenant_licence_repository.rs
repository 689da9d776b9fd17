//! Tenant licence repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::TenantLicence;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantLicenceRepository: Send + Sync {
    async fn find_by_tenant_id(&self, tenant_id: &Uuid) -> Result<Option<TenantLicence>, DomainError>;

    async fn find_by_key(&self, licence_key: &str) -> Result<Option<TenantLicence>, DomainError>;

    async fn list(&self) -> Result<Vec<TenantLicence>, DomainError>;

    /// Increments `used_seats` only if `used_seats < licenced_seats` and the
    /// licence has not expired at `as_of`, in one atomic step. `None` when
    /// nothing was updated (missing, full or expired).
    async fn try_allocate_seat(
        &self,
        tenant_id: &Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<Option<TenantLicence>, DomainError>;

    /// Atomic decrement floored at zero. `None` when no licence exists.
    async fn release_seat(
        &self,
        tenant_id: &Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<Option<TenantLicence>, DomainError>;

    /// Sets capacity and expiry only if `licenced_seats >= used_seats` at the
    /// moment of the write. `None` when nothing was updated.
    async fn update_terms(
        &self,
        tenant_id: &Uuid,
        licenced_seats: i32,
        expiry_date: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<TenantLicence>, DomainError>;
}
