// ============================================================================
// Identity Core - Tenant Entity
// File: crates/identity-core/src/domain/tenant.rs
// Description: Root aggregate of a licensing and user namespace
// ============================================================================

use chrono::{DateTime, Utc};
use identity_shared::{new_id, utils::email_domain, EntityId};
use serde::{Deserialize, Serialize};

/// Tenant (organization) entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: EntityId,
    pub name: String,
    /// Its domain is the tenant's ownership key.
    pub email: String,
    pub phone: String,
    pub address: String,
    pub is_active: bool,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Tenant {
    pub fn new(
        name: &str,
        email: &str,
        phone: &str,
        address: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            phone: phone.trim().to_string(),
            address: address.trim().to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn email_domain(&self) -> Option<String> {
        email_domain(&self.email)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
