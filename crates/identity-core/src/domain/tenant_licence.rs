// ============================================================================
// Identity Core - Tenant Licence Entity
// File: crates/identity-core/src/domain/tenant_licence.rs
// ============================================================================

use chrono::{DateTime, Utc};
use identity_shared::{new_id, EntityId};
use serde::{Deserialize, Serialize};

/// Seat and expiry grant of a tenant. One per tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantLicence {
    pub id: EntityId,
    pub tenant_id: EntityId,
    /// Globally unique, never rewritten after creation.
    pub licence_key: String,
    pub licenced_seats: i32,
    pub used_seats: i32,
    /// `None` means the licence never expires.
    pub expiry_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantLicence {
    /// Licence for a new tenant, with the first seat held by its admin.
    pub fn starter(
        tenant_id: EntityId,
        licence_key: String,
        licenced_seats: i32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            tenant_id,
            licence_key,
            licenced_seats,
            used_seats: 1,
            expiry_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn available_seats(&self) -> i32 {
        (self.licenced_seats - self.used_seats).max(0)
    }
}
