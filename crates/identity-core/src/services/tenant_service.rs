//! Maintenance of already provisioned tenants

use std::sync::Arc;

use chrono::{DateTime, Utc};
use identity_shared::utils::email_domain;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Tenant, TenantUpdate};
use crate::error::DomainError;
use crate::repositories::TenantRepository;

#[derive(Clone)]
pub struct TenantService {
    tenant_repo: Arc<dyn TenantRepository>,
}

impl TenantService {
    pub fn new(tenant_repo: Arc<dyn TenantRepository>) -> Self {
        Self { tenant_repo }
    }

    pub async fn get_tenant(&self, tenant_id: &Uuid) -> Result<Tenant, DomainError> {
        self.tenant_repo
            .find_by_id(tenant_id)
            .await?
            .ok_or(DomainError::TenantNotFound)
    }

    pub async fn list_tenants(&self) -> Result<Vec<Tenant>, DomainError> {
        self.tenant_repo.list().await
    }

    /// Changing the contact email may move the tenant to another domain;
    /// that domain must not belong to a different active tenant.
    pub async fn update_tenant(
        &self,
        tenant_id: &Uuid,
        update: &TenantUpdate,
        as_of: DateTime<Utc>,
    ) -> Result<Tenant, DomainError> {
        update.validate()?;

        let mut tenant = self.get_tenant(tenant_id).await?;

        let email = update.email.trim().to_lowercase();
        let domain = email_domain(&email)
            .ok_or_else(|| DomainError::Validation(format!("email has no domain: {}", email)))?;

        if let Some(owner) = self.tenant_repo.find_by_email_domain(&domain).await? {
            if owner.id != tenant.id {
                warn!("Tenant {} cannot take domain {} owned by {}", tenant.id, domain, owner.id);
                return Err(DomainError::TenantAlreadyExists(domain));
            }
        }

        tenant.name = update.name.trim().to_string();
        tenant.email = email;
        tenant.phone = update.phone.trim().to_string();
        tenant.address = update.address.trim().to_string();
        tenant.updated_at = as_of;

        let saved = self.tenant_repo.update(&tenant).await?;
        info!("Tenant {} updated", saved.id);
        Ok(saved)
    }

    /// Soft-deletes the tenant together with its users.
    pub async fn delete_tenant(&self, tenant_id: &Uuid, as_of: DateTime<Utc>) -> Result<(), DomainError> {
        self.tenant_repo.delete(tenant_id, as_of).await?;
        info!("Tenant {} deleted", tenant_id);
        Ok(())
    }
}
