//! Read and profile operations on a tenant's users

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{User, UserProfileUpdate, UserRole};
use crate::error::DomainError;
use crate::repositories::UserRepository;

/// User view without credentials or tokens
#[derive(Debug, Clone, PartialEq)]
pub struct UserInfo {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Display name, falls back to the email when both names are empty.
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            tenant_id: user.tenant_id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            email: user.email.clone(),
            role: user.role,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    pub async fn get_user(&self, tenant_id: &Uuid, user_id: &Uuid) -> Result<UserInfo, DomainError> {
        self.user_repo
            .find_by_id(tenant_id, user_id)
            .await?
            .map(|u| UserInfo::from(&u))
            .ok_or(DomainError::UserNotFound)
    }

    pub async fn list_users(&self, tenant_id: &Uuid) -> Result<Vec<UserInfo>, DomainError> {
        let users = self.user_repo.list_by_tenant(tenant_id).await?;
        Ok(users.iter().map(UserInfo::from).collect())
    }

    /// Renames a user. Email and role are not editable here: both feed
    /// uniqueness and licensing rules owned by the registrar.
    pub async fn update_profile(
        &self,
        tenant_id: &Uuid,
        user_id: &Uuid,
        update: &UserProfileUpdate,
        as_of: DateTime<Utc>,
    ) -> Result<UserInfo, DomainError> {
        update.validate()?;

        let mut user = self
            .user_repo
            .find_by_id(tenant_id, user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        user.first_name = update.first_name.trim().to_string();
        user.last_name = update.last_name.trim().to_string();
        user.updated_at = as_of;

        let saved = self.user_repo.update(&user).await?;
        info!("Profile updated for user {}", saved.id);
        Ok(UserInfo::from(&saved))
    }
}
