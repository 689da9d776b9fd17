// ============================================================================
// Identity Core - Credential Verifier
// File: crates/identity-core/src/services/credential_verifier.rs
// ============================================================================
//! Login verification with failed-attempt lockout.
//!
//! Ends at a verified identity; issuing tokens or sessions is the caller's
//! business.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use identity_security::CredentialHasher;
use identity_shared::config::PolicySettings;
use identity_shared::utils::mask_email;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{LoginRequest, UserRole};
use crate::error::DomainError;
use crate::repositories::{TenantRepository, UserRepository};

/// Result of successful login
#[derive(Debug, Clone, PartialEq)]
pub struct LoginResult {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

#[derive(Clone)]
pub struct CredentialVerifier {
    user_repo: Arc<dyn UserRepository>,
    tenant_repo: Arc<dyn TenantRepository>,
    hasher: Arc<dyn CredentialHasher>,
    max_failed_login_attempts: i32,
}

impl CredentialVerifier {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        tenant_repo: Arc<dyn TenantRepository>,
        hasher: Arc<dyn CredentialHasher>,
        policy: &PolicySettings,
    ) -> Self {
        Self {
            user_repo,
            tenant_repo,
            hasher,
            max_failed_login_attempts: policy.max_failed_login_attempts.max(1),
        }
    }

    /// Login with email and password
    pub async fn login(
        &self,
        request: &LoginRequest,
        client_ip: IpAddr,
        as_of: DateTime<Utc>,
    ) -> Result<LoginResult, DomainError> {
        let masked = mask_email(&request.email);
        info!("Login attempt for email: {}", masked);

        // 1. Find user by email
        let user = self
            .user_repo
            .find_by_email(request.email.trim())
            .await?
            .ok_or_else(|| {
                warn!("Login failed: email not found: {}", masked);
                DomainError::UserNotFound
            })?;

        // 2. Check if user can login
        if !user.is_active {
            warn!("Login failed: user {} is not active", user.id);
            return Err(DomainError::UserNotActive);
        }

        // Fast path only; the store re-checks the counter on every write.
        if user.failed_login_attempts >= self.max_failed_login_attempts {
            warn!("Login refused: account {} is locked", user.id);
            return Err(DomainError::AccountLocked);
        }

        // 3. Verify password
        if !self.hasher.verify(&user.password_hash, &request.password) {
            let attempts = self
                .user_repo
                .record_login_failure(&user.id, as_of, self.max_failed_login_attempts)
                .await
                .map_err(|e| {
                    if matches!(e, DomainError::AccountLocked) {
                        warn!("Login refused: account {} locked concurrently", user.id);
                    }
                    e
                })?;
            if attempts >= self.max_failed_login_attempts {
                warn!(
                    "Login failed: invalid password for {}, account locked after {} attempts",
                    masked, attempts
                );
            } else {
                warn!("Login failed: invalid password for {} ({} attempts)", masked, attempts);
            }
            return Err(DomainError::InvalidCredentials);
        }

        // 4. Owning tenant
        let tenant = self
            .tenant_repo
            .find_by_id(&user.tenant_id)
            .await?
            .ok_or_else(|| {
                error!("User {} references missing tenant {}", user.id, user.tenant_id);
                DomainError::TenantNotFound
            })?;

        // 5. Update last login
        self.user_repo
            .record_login_success(
                &user.id,
                as_of,
                &client_ip.to_string(),
                self.max_failed_login_attempts,
            )
            .await
            .map_err(|e| {
                if e.is_environmental() {
                    error!("Failed to update last login: {}", e);
                } else {
                    warn!("Login refused for {}: {}", masked, e);
                }
                e
            })?;

        info!("Login successful for: {}", masked);

        Ok(LoginResult {
            tenant_id: tenant.id,
            user_id: user.id,
            email: user.email,
            role: user.role,
        })
    }

    /// Clears the failed-attempt counter of a locked account.
    pub async fn unlock_account(
        &self,
        tenant_id: &Uuid,
        user_id: &Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let user = self
            .user_repo
            .find_by_id(tenant_id, user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        self.user_repo.reset_failed_logins(&user.id, as_of).await?;
        info!("Account {} unlocked", user.id);
        Ok(())
    }
}
