// ============================================================================
// Identity Core - Registration and Update Commands
// File: crates/identity-core/src/domain/registration.rs
// ============================================================================

use chrono::{DateTime, Utc};
use identity_shared::constants::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use serde::Deserialize;
use validator::{Validate, ValidationError};

fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::new("password_too_short"));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::new("password_too_long"));
    }
    Ok(())
}

/// First administrator of a new tenant.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdminRegistration {
    #[validate(length(max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TenantRegistration {
    #[validate(length(min = 1, max = 200, message = "Tenant name must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[validate(nested)]
    pub user: AdminRegistration,
}

/// An ordinary user added under an existing tenant.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserRegistration {
    #[validate(length(max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TenantUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserProfileUpdate {
    #[validate(length(max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub last_name: String,
}

/// New capacity and expiry for an existing licence. The key is immutable.
#[derive(Debug, Clone, Deserialize)]
pub struct LicenceTermsUpdate {
    pub licenced_seats: i32,
    pub expiry_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(email: &str, password: &str) -> AdminRegistration {
        AdminRegistration {
            first_name: "Admin".into(),
            last_name: "User".into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_valid_tenant_registration() {
        let reg = TenantRegistration {
            name: "Example Corp".into(),
            email: "contact@example.com".into(),
            phone: "+1234567890".into(),
            address: "123 Main St".into(),
            user: admin("admin@example.com", "SecurePass123!"),
        };
        assert!(reg.validate().is_ok());
    }

    #[test]
    fn test_nested_admin_is_validated() {
        let reg = TenantRegistration {
            name: "Example Corp".into(),
            email: "contact@example.com".into(),
            phone: String::new(),
            address: String::new(),
            user: admin("not-an-email", "short"),
        };
        assert!(reg.validate().is_err());
    }

    #[test]
    fn test_password_length_bounds() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_LENGTH + 1)).is_err());
    }
}
