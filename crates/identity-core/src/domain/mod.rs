//! # Identity Core - Domain Module
//! 
//! Plain data records of the identity service and the commands that create
//! or change them.

pub mod tenant;
pub mod tenant_licence;
pub mod user;
pub mod registration;

pub use tenant::Tenant;
pub use tenant_licence::TenantLicence;
pub use user::{User, UserRole};
pub use registration::{
    AdminRegistration, LicenceTermsUpdate, LoginRequest, TenantRegistration, TenantUpdate,
    UserProfileUpdate, UserRegistration,
};
