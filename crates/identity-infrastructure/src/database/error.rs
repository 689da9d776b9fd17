//! sqlx error translation

use identity_core::error::DomainError;
use tracing::error;

pub(crate) const TENANT_EMAIL_DOMAIN_KEY: &str = "tenants_email_domain_key";
pub(crate) const USER_EMAIL_KEY: &str = "users_email_key";

pub(crate) fn persistence(context: &str, err: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, err);
    DomainError::PersistenceFailure(err.to_string())
}

/// Name of the violated unique constraint, if that is what failed.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Some(db_err.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}
