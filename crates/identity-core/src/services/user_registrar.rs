// ============================================================================
// Identity Core - User Registrar
// File: crates/identity-core/src/services/user_registrar.rs
// ============================================================================
//! Adds and removes ordinary users under a tenant, keeping the licence seat
//! count in step with the persisted users.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use identity_security::CredentialHasher;
use identity_shared::config::{PolicySettings, UserUniqueness};
use identity_shared::utils::{email_domain, mask_email};
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{User, UserRegistration, UserRole};
use crate::error::DomainError;
use crate::repositories::{TenantRepository, UserRepository};
use crate::services::licence_ledger::LicenceLedger;
use crate::services::user_service::UserInfo;

#[derive(Clone)]
pub struct UserRegistrar {
    tenant_repo: Arc<dyn TenantRepository>,
    user_repo: Arc<dyn UserRepository>,
    ledger: LicenceLedger,
    hasher: Arc<dyn CredentialHasher>,
    uniqueness: UserUniqueness,
}

impl UserRegistrar {
    pub fn new(
        tenant_repo: Arc<dyn TenantRepository>,
        user_repo: Arc<dyn UserRepository>,
        ledger: LicenceLedger,
        hasher: Arc<dyn CredentialHasher>,
        policy: &PolicySettings,
    ) -> Self {
        Self {
            tenant_repo,
            user_repo,
            ledger,
            hasher,
            uniqueness: policy.user_uniqueness,
        }
    }

    /// Register a `tenant_user` under `tenant_id`, consuming one seat.
    ///
    /// If anything fails after the seat was taken, the seat is handed back
    /// before the error is returned.
    pub async fn register_user(
        &self,
        tenant_id: &Uuid,
        registration: &UserRegistration,
        as_of: DateTime<Utc>,
    ) -> Result<UserInfo, DomainError> {
        info!(
            "User registration attempt for {} under tenant {}",
            mask_email(&registration.email),
            tenant_id
        );

        registration.validate()?;

        // 1. Uniqueness
        self.ensure_unique(&registration.email).await?;

        // 2. Tenant must be live
        if self.tenant_repo.find_by_id(tenant_id).await?.is_none() {
            warn!("User registration failed: tenant {} not found", tenant_id);
            return Err(DomainError::TenantNotFound);
        }

        // 3. Seat
        let licence = self.ledger.allocate_seat(tenant_id, as_of).await?;

        // 4. Credential
        let password_hash = match self.hasher.hash(&registration.password) {
            Ok(hash) => hash,
            Err(e) => {
                error!("Failed to hash password: {}", e);
                self.compensate_seat(tenant_id, as_of).await;
                return Err(DomainError::HashingFailure(e.to_string()));
            }
        };

        // 5. Persist
        let user = User::new(
            *tenant_id,
            &registration.first_name,
            &registration.last_name,
            &registration.email,
            password_hash,
            UserRole::TenantUser,
            as_of,
        );

        let created = match self.user_repo.create(&user).await {
            Ok(created) => created,
            Err(e) => {
                warn!("User creation failed under tenant {}: {}", tenant_id, e);
                self.compensate_seat(tenant_id, as_of).await;
                return Err(e);
            }
        };

        info!(
            "User {} registered under tenant {} ({}/{} seats)",
            created.id, tenant_id, licence.used_seats, licence.licenced_seats
        );
        Ok(UserInfo::from(&created))
    }

    /// Soft-delete a user and free its seat.
    ///
    /// The delete is made durable before the seat is released. A second call
    /// for the same user fails `UserNotFound`.
    pub async fn delete_user(
        &self,
        tenant_id: &Uuid,
        user_id: &Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        // 1. Load
        let user = self
            .user_repo
            .find_by_id(tenant_id, user_id)
            .await?
            .ok_or_else(|| {
                warn!("User deletion failed: user {} not found in tenant {}", user_id, tenant_id);
                DomainError::UserNotFound
            })?;

        // Fail before writing anything if there is nothing to release into.
        self.ledger.licence_for_tenant(tenant_id).await?;

        // 2. Soft delete
        let deleted = User {
            is_active: false,
            updated_at: as_of,
            deleted_at: Some(as_of),
            ..user
        };
        self.user_repo.delete(&deleted).await?;

        // 3. Free the seat
        if let Err(e) = self.ledger.release_seat(tenant_id, as_of).await {
            error!(
                "User {} deleted but seat of tenant {} not released: {}",
                user_id, tenant_id, e
            );
            return Err(e);
        }

        info!("User {} deleted from tenant {}", user_id, tenant_id);
        Ok(())
    }

    async fn ensure_unique(&self, email: &str) -> Result<(), DomainError> {
        let existing = match self.uniqueness {
            UserUniqueness::EmailDomain => {
                let domain = email_domain(email)
                    .ok_or_else(|| DomainError::Validation("User email has no domain".to_string()))?;
                self.user_repo.find_by_email_domain(&domain).await?
            }
            UserUniqueness::EmailAddress => self.user_repo.find_by_email(email.trim()).await?,
        };

        if existing.is_some() {
            warn!("User registration failed: user already exists for {}", mask_email(email));
            return Err(DomainError::UserAlreadyExists(email.trim().to_lowercase()));
        }
        Ok(())
    }

    async fn compensate_seat(&self, tenant_id: &Uuid, as_of: DateTime<Utc>) {
        if let Err(e) = self.ledger.release_seat(tenant_id, as_of).await {
            error!("Failed to release seat of tenant {} after aborted registration: {}", tenant_id, e);
        }
    }
}
