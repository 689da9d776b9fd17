//! User repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::User;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, tenant_id: &Uuid, user_id: &Uuid) -> Result<Option<User>, DomainError>;

    /// Case-insensitive exact match.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    async fn find_by_email_domain(&self, domain: &str) -> Result<Option<User>, DomainError>;

    async fn list_by_tenant(&self, tenant_id: &Uuid) -> Result<Vec<User>, DomainError>;

    /// Fails `UserAlreadyExists` on a duplicate email.
    async fn create(&self, user: &User) -> Result<User, DomainError>;

    /// Writes profile fields and `updated_at`. Fails `UserNotFound` for a
    /// missing or deleted user.
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Persists `user.deleted_at` and `user.is_active = false`, only if the
    /// stored row is not already deleted; otherwise `UserNotFound`.
    async fn delete(&self, user: &User) -> Result<(), DomainError>;

    /// Stamps the login and clears the failure counter, only while the
    /// counter is below `max_failed_attempts`. Fails `AccountLocked` when the
    /// account reached the threshold, `UserNotFound` when it is gone.
    async fn record_login_success(
        &self,
        user_id: &Uuid,
        at: DateTime<Utc>,
        ip: &str,
        max_failed_attempts: i32,
    ) -> Result<(), DomainError>;

    /// Increments the failure counter, only while it is below
    /// `max_failed_attempts`, and returns its new value. Fails
    /// `AccountLocked` when the threshold was already reached.
    async fn record_login_failure(
        &self,
        user_id: &Uuid,
        at: DateTime<Utc>,
        max_failed_attempts: i32,
    ) -> Result<i32, DomainError>;

    async fn reset_failed_logins(&self, user_id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError>;
}
