// ============================================================================
// Identity Core - Tenant Provisioner
// File: crates/identity-core/src/services/tenant_provisioner.rs
// ============================================================================
//! Creates a tenant, its starter licence and its first administrator as one
//! unit of work.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use identity_security::{CredentialHasher, TokenGenerator};
use identity_shared::config::PolicySettings;
use identity_shared::utils::{email_domain, mask_email};
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Tenant, TenantLicence, TenantRegistration, User, UserRole};
use crate::error::DomainError;
use crate::repositories::TenantRepository;

/// Result of a successful tenant registration
#[derive(Debug, Clone)]
pub struct ProvisionedTenant {
    pub tenant_id: Uuid,
    pub admin_user_id: Uuid,
    pub licence_key: String,
}

#[derive(Clone)]
pub struct TenantProvisioner {
    tenant_repo: Arc<dyn TenantRepository>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenGenerator>,
    default_licenced_seats: i32,
}

impl TenantProvisioner {
    pub fn new(
        tenant_repo: Arc<dyn TenantRepository>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenGenerator>,
        policy: &PolicySettings,
    ) -> Self {
        // The admin holds a seat from the start.
        let default_licenced_seats = policy.default_licenced_seats.max(1);
        Self {
            tenant_repo,
            hasher,
            tokens,
            default_licenced_seats,
        }
    }

    /// Register a new tenant with its administrator.
    ///
    /// The password is hashed before anything is written, and the three
    /// records go to the store in a single atomic call, so a failure at any
    /// step leaves no tenant, licence or user behind.
    pub async fn register_tenant(
        &self,
        registration: &TenantRegistration,
        as_of: DateTime<Utc>,
    ) -> Result<ProvisionedTenant, DomainError> {
        info!("Tenant registration attempt for: {}", mask_email(&registration.email));

        registration.validate()?;

        // 1. Domain ownership
        let domain = email_domain(&registration.email)
            .ok_or_else(|| DomainError::Validation("Tenant email has no domain".to_string()))?;

        if self.tenant_repo.find_by_email_domain(&domain).await?.is_some() {
            warn!("Tenant registration failed: domain already registered: {}", domain);
            return Err(DomainError::TenantAlreadyExists(domain));
        }

        // 2. Admin credential
        let password_hash = self.hasher.hash(&registration.user.password).map_err(|e| {
            error!("Failed to hash admin password: {}", e);
            DomainError::HashingFailure(e.to_string())
        })?;

        // 3. Records
        let tenant = Tenant::new(
            &registration.name,
            &registration.email,
            &registration.phone,
            &registration.address,
            as_of,
        );
        let licence = TenantLicence::starter(
            tenant.id,
            self.tokens.generate(),
            self.default_licenced_seats,
            as_of,
        );
        let admin = User::new(
            tenant.id,
            &registration.user.first_name,
            &registration.user.last_name,
            &registration.user.email,
            password_hash,
            UserRole::TenantAdmin,
            as_of,
        );

        // 4. Persist as one unit
        self.tenant_repo
            .create_with_licence(&tenant, &licence, &admin)
            .await
            .map_err(|e| {
                if e.is_environmental() {
                    error!("Failed to provision tenant {}: {}", domain, e);
                } else {
                    warn!("Tenant provisioning rejected for {}: {}", domain, e);
                }
                e
            })?;

        info!(
            "Tenant {} provisioned for domain {} with {} seats",
            tenant.id, domain, licence.licenced_seats
        );

        Ok(ProvisionedTenant {
            tenant_id: tenant.id,
            admin_user_id: admin.id,
            licence_key: licence.licence_key,
        })
    }
}
