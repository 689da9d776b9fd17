// ============================================================================
// Identity Infrastructure - In-Memory Identity Store
// File: crates/identity-infrastructure/src/memory.rs
// ============================================================================
//! Process-local implementation of all three identity ports.
//!
//! Every operation runs under one `parking_lot::Mutex`, so each call is a
//! single critical section and behaves like the guarded statements of the
//! PostgreSQL adapters. The lock is never held across an `.await`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use identity_shared::utils::email_domain;
use parking_lot::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use identity_core::domain::{Tenant, TenantLicence, User};
use identity_core::error::DomainError;
use identity_core::repositories::{TenantLicenceRepository, TenantRepository, UserRepository};

#[derive(Default)]
struct StoreState {
    tenants: HashMap<Uuid, Tenant>,
    /// Keyed by tenant id.
    licences: HashMap<Uuid, TenantLicence>,
    users: HashMap<Uuid, User>,
}

impl StoreState {
    fn live_tenant_for_domain(&self, domain: &str) -> Option<&Tenant> {
        self.tenants.values().find(|t| {
            !t.is_deleted() && t.email_domain().is_some_and(|d| d.eq_ignore_ascii_case(domain))
        })
    }

    fn live_user_with_email(&self, email: &str) -> Option<&User> {
        self.users
            .values()
            .find(|u| !u.is_deleted() && u.email.eq_ignore_ascii_case(email))
    }

    fn live_user_mut(&mut self, user_id: &Uuid) -> Result<&mut User, DomainError> {
        self.users
            .get_mut(user_id)
            .filter(|u| !u.is_deleted())
            .ok_or(DomainError::UserNotFound)
    }
}

#[derive(Default)]
pub struct InMemoryIdentityStore {
    state: Mutex<StoreState>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tenants, deleted ones included.
    pub fn tenant_count(&self) -> usize {
        self.state.lock().tenants.len()
    }

    /// Number of stored users, deleted ones included.
    pub fn user_count(&self) -> usize {
        self.state.lock().users.len()
    }

    pub fn licence_count(&self) -> usize {
        self.state.lock().licences.len()
    }

    /// Overwrites a licence's expiry directly, bypassing the ledger.
    pub fn set_licence_expiry(&self, tenant_id: &Uuid, expiry_date: Option<DateTime<Utc>>) -> bool {
        match self.state.lock().licences.get_mut(tenant_id) {
            Some(licence) => {
                licence.expiry_date = expiry_date;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl TenantRepository for InMemoryIdentityStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError> {
        let state = self.state.lock();
        Ok(state.tenants.get(id).filter(|t| !t.is_deleted()).cloned())
    }

    async fn find_by_email_domain(&self, domain: &str) -> Result<Option<Tenant>, DomainError> {
        Ok(self.state.lock().live_tenant_for_domain(domain).cloned())
    }

    async fn list(&self) -> Result<Vec<Tenant>, DomainError> {
        let state = self.state.lock();
        let mut tenants: Vec<Tenant> = state
            .tenants
            .values()
            .filter(|t| !t.is_deleted())
            .cloned()
            .collect();
        tenants.sort_by_key(|t| t.created_at);
        Ok(tenants)
    }

    async fn create_with_licence(
        &self,
        tenant: &Tenant,
        licence: &TenantLicence,
        admin: &User,
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock();

        let domain = tenant.email_domain().unwrap_or_default();
        if state.live_tenant_for_domain(&domain).is_some() {
            return Err(DomainError::TenantAlreadyExists(domain));
        }
        if state.live_user_with_email(&admin.email).is_some() {
            return Err(DomainError::UserAlreadyExists(admin.email.clone()));
        }
        if state.licences.values().any(|l| l.licence_key == licence.licence_key) {
            return Err(DomainError::PersistenceFailure(
                "duplicate licence key".to_string(),
            ));
        }

        state.tenants.insert(tenant.id, tenant.clone());
        state.licences.insert(tenant.id, licence.clone());
        state.users.insert(admin.id, admin.clone());

        info!("Tenant created in memory: {}", tenant.id);
        Ok(())
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let mut state = self.state.lock();

        if let Some(domain) = tenant.email_domain() {
            if let Some(owner) = state.live_tenant_for_domain(&domain) {
                if owner.id != tenant.id {
                    return Err(DomainError::TenantAlreadyExists(domain));
                }
            }
        }

        let stored = state
            .tenants
            .get_mut(&tenant.id)
            .filter(|t| !t.is_deleted())
            .ok_or(DomainError::TenantNotFound)?;

        stored.name = tenant.name.clone();
        stored.email = tenant.email.clone();
        stored.phone = tenant.phone.clone();
        stored.address = tenant.address.clone();
        stored.is_active = tenant.is_active;
        stored.updated_at = tenant.updated_at;
        Ok(stored.clone())
    }

    async fn delete(&self, id: &Uuid, deleted_at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut state = self.state.lock();

        let tenant = state
            .tenants
            .get_mut(id)
            .filter(|t| !t.is_deleted())
            .ok_or(DomainError::TenantNotFound)?;
        tenant.deleted_at = Some(deleted_at);
        tenant.updated_at = deleted_at;
        tenant.is_active = false;

        for user in state
            .users
            .values_mut()
            .filter(|u| u.tenant_id == *id && !u.is_deleted())
        {
            user.deleted_at = Some(deleted_at);
            user.updated_at = deleted_at;
            user.is_active = false;
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryIdentityStore {
    async fn find_by_id(&self, tenant_id: &Uuid, user_id: &Uuid) -> Result<Option<User>, DomainError> {
        let state = self.state.lock();
        Ok(state
            .users
            .get(user_id)
            .filter(|u| u.tenant_id == *tenant_id && !u.is_deleted())
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.state.lock().live_user_with_email(email).cloned())
    }

    async fn find_by_email_domain(&self, domain: &str) -> Result<Option<User>, DomainError> {
        let state = self.state.lock();
        Ok(state
            .users
            .values()
            .filter(|u| !u.is_deleted())
            .filter(|u| email_domain(&u.email).is_some_and(|d| d.eq_ignore_ascii_case(domain)))
            .min_by_key(|u| u.created_at)
            .cloned())
    }

    async fn list_by_tenant(&self, tenant_id: &Uuid) -> Result<Vec<User>, DomainError> {
        let state = self.state.lock();
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| u.tenant_id == *tenant_id && !u.is_deleted())
            .cloned()
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        let mut state = self.state.lock();
        if state.live_user_with_email(&user.email).is_some() {
            return Err(DomainError::UserAlreadyExists(user.email.clone()));
        }
        state.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut state = self.state.lock();
        let stored = state.live_user_mut(&user.id)?;
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.updated_at = user.updated_at;
        Ok(stored.clone())
    }

    async fn delete(&self, user: &User) -> Result<(), DomainError> {
        let mut state = self.state.lock();
        let stored = state.live_user_mut(&user.id)?;
        let deleted_at = user.deleted_at.unwrap_or(user.updated_at);
        stored.deleted_at = Some(deleted_at);
        stored.updated_at = deleted_at;
        stored.is_active = false;
        Ok(())
    }

    async fn record_login_success(
        &self,
        user_id: &Uuid,
        at: DateTime<Utc>,
        ip: &str,
        max_failed_attempts: i32,
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock();
        let stored = state.live_user_mut(user_id)?;
        if stored.failed_login_attempts >= max_failed_attempts {
            return Err(DomainError::AccountLocked);
        }
        stored.last_login_at = Some(at);
        stored.last_login_ip = Some(ip.to_string());
        stored.failed_login_attempts = 0;
        stored.updated_at = at;
        Ok(())
    }

    async fn record_login_failure(
        &self,
        user_id: &Uuid,
        at: DateTime<Utc>,
        max_failed_attempts: i32,
    ) -> Result<i32, DomainError> {
        let mut state = self.state.lock();
        let stored = state.live_user_mut(user_id)?;
        if stored.failed_login_attempts >= max_failed_attempts {
            return Err(DomainError::AccountLocked);
        }
        stored.failed_login_attempts += 1;
        stored.updated_at = at;
        Ok(stored.failed_login_attempts)
    }

    async fn reset_failed_logins(&self, user_id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut state = self.state.lock();
        let stored = state.live_user_mut(user_id)?;
        stored.failed_login_attempts = 0;
        stored.updated_at = at;
        Ok(())
    }
}

#[async_trait]
impl TenantLicenceRepository for InMemoryIdentityStore {
    async fn find_by_tenant_id(&self, tenant_id: &Uuid) -> Result<Option<TenantLicence>, DomainError> {
        Ok(self.state.lock().licences.get(tenant_id).cloned())
    }

    async fn find_by_key(&self, licence_key: &str) -> Result<Option<TenantLicence>, DomainError> {
        let state = self.state.lock();
        Ok(state
            .licences
            .values()
            .find(|l| l.licence_key == licence_key)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<TenantLicence>, DomainError> {
        let state = self.state.lock();
        let mut licences: Vec<TenantLicence> = state.licences.values().cloned().collect();
        licences.sort_by_key(|l| l.created_at);
        Ok(licences)
    }

    async fn try_allocate_seat(
        &self,
        tenant_id: &Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<Option<TenantLicence>, DomainError> {
        let mut state = self.state.lock();
        let Some(licence) = state.licences.get_mut(tenant_id) else {
            return Ok(None);
        };

        let expired = licence.expiry_date.is_some_and(|expiry| expiry < as_of);
        if expired || licence.used_seats >= licence.licenced_seats {
            debug!("Seat not allocated for tenant {}", tenant_id);
            return Ok(None);
        }

        licence.used_seats += 1;
        licence.updated_at = as_of;
        Ok(Some(licence.clone()))
    }

    async fn release_seat(
        &self,
        tenant_id: &Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<Option<TenantLicence>, DomainError> {
        let mut state = self.state.lock();
        Ok(state.licences.get_mut(tenant_id).map(|licence| {
            licence.used_seats = (licence.used_seats - 1).max(0);
            licence.updated_at = as_of;
            licence.clone()
        }))
    }

    async fn update_terms(
        &self,
        tenant_id: &Uuid,
        licenced_seats: i32,
        expiry_date: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<TenantLicence>, DomainError> {
        let mut state = self.state.lock();
        Ok(state
            .licences
            .get_mut(tenant_id)
            .filter(|l| l.used_seats <= licenced_seats)
            .map(|licence| {
                licence.licenced_seats = licenced_seats;
                licence.expiry_date = expiry_date;
                licence.updated_at = updated_at;
                licence.clone()
            }))
    }
}
