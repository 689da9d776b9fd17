//! Domain services (business logic)

pub mod licence_ledger;
pub mod tenant_provisioner;
pub mod user_registrar;
pub mod credential_verifier;
pub mod user_service;
pub mod tenant_service;

pub use licence_ledger::LicenceLedger;
pub use tenant_provisioner::{ProvisionedTenant, TenantProvisioner};
pub use user_registrar::UserRegistrar;
pub use credential_verifier::{CredentialVerifier, LoginResult};
pub use user_service::{UserInfo, UserService};
pub use tenant_service::TenantService;
