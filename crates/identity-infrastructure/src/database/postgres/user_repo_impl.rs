// ============================================================================
// Identity Infrastructure - PostgreSQL User Repository
// File: crates/identity-infrastructure/src/database/postgres/user_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use identity_core::domain::{User, UserRole};
use identity_core::error::DomainError;
use identity_core::repositories::UserRepository;

use crate::database::error::{persistence, unique_violation, USER_EMAIL_KEY};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explains a guarded login write that matched no row: the user is gone,
    /// or the failure counter is at the lock threshold.
    async fn guard_miss(&self, user_id: &Uuid) -> DomainError {
        let live: Result<Option<Uuid>, sqlx::Error> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 AND deleted_at IS NULL")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await;

        match live {
            Ok(Some(_)) => DomainError::AccountLocked,
            Ok(None) => DomainError::UserNotFound,
            Err(e) => persistence("checking login guard", e),
        }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct UserRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub failed_login_attempts: i32,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
    pub is_email_verified: bool,
    pub email_verification_token: Option<String>,
    pub email_verification_token_expires_at: Option<DateTime<Utc>>,
    pub reset_password_token: Option<String>,
    pub reset_password_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            tenant_id: row.tenant_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            role: UserRole::from_str(&row.role).unwrap_or_else(|| {
                warn!("User {} has unknown role {:?}, treating as tenant_user", row.id, row.role);
                UserRole::default()
            }),
            is_active: row.is_active,
            failed_login_attempts: row.failed_login_attempts,
            last_login_at: row.last_login_at,
            last_login_ip: row.last_login_ip,
            is_email_verified: row.is_email_verified,
            email_verification_token: row.email_verification_token,
            email_verification_token_expires_at: row.email_verification_token_expires_at,
            reset_password_token: row.reset_password_token,
            reset_password_token_expires_at: row.reset_password_token_expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

const USER_COLUMNS: &str = r#"
    id, tenant_id, first_name, last_name, email, password_hash, role,
    is_active, failed_login_attempts, last_login_at, last_login_ip,
    is_email_verified, email_verification_token, email_verification_token_expires_at,
    reset_password_token, reset_password_token_expires_at,
    created_at, updated_at, deleted_at
"#;

/// Inserts on whatever connection it is given, so provisioning can run it
/// inside its transaction.
pub(super) async fn insert_user(conn: &mut PgConnection, user: &User) -> Result<User, DomainError> {
    let sql = format!(
        r#"
        INSERT INTO users ({USER_COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
        RETURNING {USER_COLUMNS}
        "#
    );

    let row: UserRow = sqlx::query_as(&sql)
        .bind(user.id)
        .bind(user.tenant_id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.failed_login_attempts)
        .bind(user.last_login_at)
        .bind(&user.last_login_ip)
        .bind(user.is_email_verified)
        .bind(&user.email_verification_token)
        .bind(user.email_verification_token_expires_at)
        .bind(&user.reset_password_token)
        .bind(user.reset_password_token_expires_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.deleted_at)
        .fetch_one(conn)
        .await
        .map_err(|e| match unique_violation(&e).as_deref() {
            Some(USER_EMAIL_KEY) => {
                warn!("User email already registered");
                DomainError::UserAlreadyExists(user.email.clone())
            }
            _ => persistence("creating user", e),
        })?;

    Ok(row.into())
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, tenant_id: &Uuid, user_id: &Uuid) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL"
        );
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| persistence("finding user by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1) AND deleted_at IS NULL"
        );
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| persistence("finding user by email", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_email_domain(&self, domain: &str) -> Result<Option<User>, DomainError> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE LOWER(SPLIT_PART(email, '@', 2)) = LOWER($1) AND deleted_at IS NULL
            ORDER BY created_at
            LIMIT 1
            "#
        );
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(domain)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| persistence("finding user by domain", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_by_tenant(&self, tenant_id: &Uuid) -> Result<Vec<User>, DomainError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE tenant_id = $1 AND deleted_at IS NULL ORDER BY created_at"
        );
        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| persistence("listing users", e))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        info!("Creating user {} in tenant {}", user.id, user.tenant_id);

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| persistence("acquiring connection", e))?;
        let created = insert_user(&mut *conn, user).await?;

        info!("User created successfully: {}", created.id);
        Ok(created)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let sql = format!(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, updated_at = $4
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {USER_COLUMNS}
            "#
        );
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| persistence("updating user", e))?;

        row.map(User::from).ok_or(DomainError::UserNotFound)
    }

    async fn delete(&self, user: &User) -> Result<(), DomainError> {
        let deleted_at = user.deleted_at.unwrap_or(user.updated_at);
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = $2, updated_at = $2, is_active = false
            WHERE id = $1 AND deleted_at IS NULL
            "#
        )
        .bind(user.id)
        .bind(deleted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| persistence("deleting user", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound);
        }
        Ok(())
    }

    async fn record_login_success(
        &self,
        user_id: &Uuid,
        at: DateTime<Utc>,
        ip: &str,
        max_failed_attempts: i32,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = $2, last_login_ip = $3, failed_login_attempts = 0, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL AND failed_login_attempts < $4
            "#
        )
        .bind(user_id)
        .bind(at)
        .bind(ip)
        .bind(max_failed_attempts)
        .execute(&self.pool)
        .await
        .map_err(|e| persistence("recording login", e))?;

        if result.rows_affected() == 0 {
            return Err(self.guard_miss(user_id).await);
        }
        Ok(())
    }

    async fn record_login_failure(
        &self,
        user_id: &Uuid,
        at: DateTime<Utc>,
        max_failed_attempts: i32,
    ) -> Result<i32, DomainError> {
        let attempts: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET failed_login_attempts = failed_login_attempts + 1, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL AND failed_login_attempts < $3
            RETURNING failed_login_attempts
            "#
        )
        .bind(user_id)
        .bind(at)
        .bind(max_failed_attempts)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| persistence("recording failed login", e))?;

        match attempts {
            Some(attempts) => Ok(attempts),
            None => Err(self.guard_miss(user_id).await),
        }
    }

    async fn reset_failed_logins(&self, user_id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET failed_login_attempts = 0, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#
        )
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| persistence("resetting failed logins", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound);
        }
        Ok(())
    }
}
