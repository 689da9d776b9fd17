//! Domain errors

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Tenant not found")]
    TenantNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Tenant licence not found")]
    LicenceNotFound,

    #[error("Tenant already exists for domain: {0}")]
    TenantAlreadyExists(String),

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("Tenant licence exceeded: all {licenced_seats} seats in use")]
    LicenceExceeded { licenced_seats: i32 },

    #[error("Tenant licence expired at {0}")]
    LicenceExpired(DateTime<Utc>),

    #[error("Cannot licence {requested} seats while {used} are in use")]
    LicenceSeatsBelowUsage { requested: i32, used: i32 },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account locked after too many failed login attempts")]
    AccountLocked,

    #[error("User not active")]
    UserNotActive,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Password hash error: {0}")]
    HashingFailure(String),

    #[error("Persistence error: {0}")]
    PersistenceFailure(String),
}

impl DomainError {
    /// True for faults of the environment (database, RNG) rather than
    /// routine business outcomes.
    pub fn is_environmental(&self) -> bool {
        matches!(
            self,
            DomainError::HashingFailure(_) | DomainError::PersistenceFailure(_)
        )
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::Validation(errors.to_string())
    }
}

impl From<identity_security::PasswordError> for DomainError {
    fn from(err: identity_security::PasswordError) -> Self {
        DomainError::HashingFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environmental_kinds() {
        assert!(DomainError::PersistenceFailure("db down".into()).is_environmental());
        assert!(DomainError::HashingFailure("rng".into()).is_environmental());
        assert!(!DomainError::LicenceExceeded { licenced_seats: 5 }.is_environmental());
        assert!(!DomainError::AccountLocked.is_environmental());
        assert!(!DomainError::TenantAlreadyExists("example.com".into()).is_environmental());
    }
}
