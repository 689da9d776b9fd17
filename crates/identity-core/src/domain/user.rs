//! User domain entity

use chrono::{DateTime, Utc};
use identity_shared::constants::{ROLE_ADMIN, ROLE_SUPER_ADMIN, ROLE_TENANT_ADMIN, ROLE_TENANT_USER};
use identity_shared::{new_id, EntityId};
use serde::{Deserialize, Serialize};

/// User role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    TenantAdmin,
    TenantUser,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => ROLE_SUPER_ADMIN,
            UserRole::Admin => ROLE_ADMIN,
            UserRole::TenantAdmin => ROLE_TENANT_ADMIN,
            UserRole::TenantUser => ROLE_TENANT_USER,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            ROLE_SUPER_ADMIN => Some(UserRole::SuperAdmin),
            ROLE_ADMIN => Some(UserRole::Admin),
            ROLE_TENANT_ADMIN => Some(UserRole::TenantAdmin),
            ROLE_TENANT_USER => Some(UserRole::TenantUser),
            _ => None,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::TenantUser
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub tenant_id: EntityId,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,

    pub is_active: bool,
    pub failed_login_attempts: i32,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,

    pub is_email_verified: bool,
    #[serde(skip_serializing)]
    pub email_verification_token: Option<String>,
    pub email_verification_token_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,
    pub reset_password_token_expires_at: Option<DateTime<Utc>>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Fresh active user with zeroed login and verification state.
    pub fn new(
        tenant_id: EntityId,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: String,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            tenant_id,
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: email.trim().to_lowercase(),
            password_hash,
            role,
            is_active: true,
            failed_login_attempts: 0,
            last_login_at: None,
            last_login_ip: None,
            is_email_verified: false,
            email_verification_token: None,
            email_verification_token_expires_at: None,
            reset_password_token: None,
            reset_password_token_expires_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => self.email.clone(),
        }
    }
}
