//! Wiring shared by the integration tests: every service over one
//! in-memory store, with a cheap Argon2 configuration.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use identity_core::domain::{AdminRegistration, LoginRequest, TenantLicence, TenantRegistration, User, UserRegistration};
use identity_core::repositories::{TenantLicenceRepository, UserRepository};
use identity_core::services::{
    CredentialVerifier, LicenceLedger, ProvisionedTenant, TenantProvisioner, TenantService,
    UserRegistrar, UserService,
};
use identity_infrastructure::InMemoryIdentityStore;
use identity_security::{PasswordService, UuidTokenGenerator};
use identity_shared::config::{PolicySettings, SecuritySettings};
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "SecurePass123!";

pub fn fast_hasher() -> Arc<PasswordService> {
    let settings = SecuritySettings {
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        argon2_parallelism: 1,
    };
    Arc::new(PasswordService::new(&settings).expect("valid argon2 params"))
}

#[derive(Clone)]
pub struct Harness {
    pub store: Arc<InMemoryIdentityStore>,
    pub provisioner: TenantProvisioner,
    pub registrar: UserRegistrar,
    pub verifier: CredentialVerifier,
    pub ledger: LicenceLedger,
    pub tenants: TenantService,
    pub users: UserService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_policy(PolicySettings::default())
    }

    pub fn with_policy(policy: PolicySettings) -> Self {
        let store = Arc::new(InMemoryIdentityStore::new());
        let hasher = fast_hasher();
        let ledger = LicenceLedger::new(store.clone());

        Self {
            provisioner: TenantProvisioner::new(
                store.clone(),
                hasher.clone(),
                Arc::new(UuidTokenGenerator),
                &policy,
            ),
            registrar: UserRegistrar::new(
                store.clone(),
                store.clone(),
                ledger.clone(),
                hasher.clone(),
                &policy,
            ),
            verifier: CredentialVerifier::new(store.clone(), store.clone(), hasher, &policy),
            tenants: TenantService::new(store.clone()),
            users: UserService::new(store.clone()),
            ledger,
            store,
        }
    }

    pub async fn provision_example_corp(&self) -> ProvisionedTenant {
        self.provisioner
            .register_tenant(&example_corp(), Utc::now())
            .await
            .expect("Example Corp provisions")
    }

    pub async fn licence(&self, tenant_id: &Uuid) -> TenantLicence {
        TenantLicenceRepository::find_by_tenant_id(self.store.as_ref(), tenant_id)
            .await
            .unwrap()
            .expect("licence exists")
    }

    pub async fn stored_user(&self, tenant_id: &Uuid, user_id: &Uuid) -> Option<User> {
        UserRepository::find_by_id(self.store.as_ref(), tenant_id, user_id)
            .await
            .unwrap()
    }
}

pub fn tenant_registration(name: &str, domain: &str, admin_email: &str) -> TenantRegistration {
    TenantRegistration {
        name: name.into(),
        email: format!("contact@{domain}"),
        phone: "+1234567890".into(),
        address: "123 Main St".into(),
        user: AdminRegistration {
            first_name: "Admin".into(),
            last_name: "User".into(),
            email: admin_email.into(),
            password: ADMIN_PASSWORD.into(),
        },
    }
}

pub fn example_corp() -> TenantRegistration {
    tenant_registration("Example Corp", "example.com", ADMIN_EMAIL)
}

/// A user whose email domain is unique to `n`.
pub fn user_number(n: usize) -> UserRegistration {
    UserRegistration {
        first_name: format!("User{n}"),
        last_name: "Test".into(),
        email: format!("user{n}@member{n}.test"),
        password: "UserPass123!".into(),
    }
}

pub fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.into(),
        password: password.into(),
    }
}
