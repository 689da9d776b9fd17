// ============================================================================
// Identity Infrastructure - PostgreSQL Tenant Repository
// File: crates/identity-infrastructure/src/database/postgres/tenant_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use identity_core::domain::{Tenant, TenantLicence, User};
use identity_core::error::DomainError;
use identity_core::repositories::TenantRepository;

use super::user_repo_impl::insert_user;
use crate::database::error::{persistence, unique_violation, TENANT_EMAIL_DOMAIN_KEY};

pub struct PgTenantRepository {
    pool: PgPool,
}

impl PgTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct TenantRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Tenant {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

fn domain_taken(tenant: &Tenant, err: sqlx::Error) -> DomainError {
    match unique_violation(&err).as_deref() {
        Some(TENANT_EMAIL_DOMAIN_KEY) => {
            let domain = tenant.email_domain().unwrap_or_default();
            warn!("Tenant domain already registered: {}", domain);
            DomainError::TenantAlreadyExists(domain)
        }
        _ => persistence("writing tenant", err),
    }
}

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, phone, address, is_active,
                   created_at, updated_at, deleted_at
            FROM tenants
            WHERE id = $1 AND deleted_at IS NULL
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| persistence("finding tenant by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_email_domain(&self, domain: &str) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, phone, address, is_active,
                   created_at, updated_at, deleted_at
            FROM tenants
            WHERE LOWER(SPLIT_PART(email, '@', 2)) = LOWER($1) AND deleted_at IS NULL
            "#
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| persistence("finding tenant by domain", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self) -> Result<Vec<Tenant>, DomainError> {
        let rows: Vec<TenantRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, phone, address, is_active,
                   created_at, updated_at, deleted_at
            FROM tenants
            WHERE deleted_at IS NULL
            ORDER BY created_at
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| persistence("listing tenants", e))?;

        Ok(rows.into_iter().map(Tenant::from).collect())
    }

    async fn create_with_licence(
        &self,
        tenant: &Tenant,
        licence: &TenantLicence,
        admin: &User,
    ) -> Result<(), DomainError> {
        info!("Creating tenant: {}", tenant.name);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| persistence("opening provisioning transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO tenants (
                id, name, email, phone, address, is_active,
                created_at, updated_at, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.email)
        .bind(&tenant.phone)
        .bind(&tenant.address)
        .bind(tenant.is_active)
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .bind(tenant.deleted_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| domain_taken(tenant, e))?;

        sqlx::query(
            r#"
            INSERT INTO tenant_licences (
                id, tenant_id, licence_key, licenced_seats, used_seats,
                expiry_date, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#
        )
        .bind(licence.id)
        .bind(licence.tenant_id)
        .bind(&licence.licence_key)
        .bind(licence.licenced_seats)
        .bind(licence.used_seats)
        .bind(licence.expiry_date)
        .bind(licence.created_at)
        .bind(licence.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| persistence("creating tenant licence", e))?;

        insert_user(&mut *tx, admin).await?;

        tx.commit()
            .await
            .map_err(|e| persistence("committing provisioning transaction", e))?;

        info!("Tenant created successfully: {}", tenant.id);
        Ok(())
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            UPDATE tenants
            SET
                name = $2,
                email = $3,
                phone = $4,
                address = $5,
                is_active = $6,
                updated_at = $7
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, email, phone, address, is_active,
                      created_at, updated_at, deleted_at
            "#
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.email)
        .bind(&tenant.phone)
        .bind(&tenant.address)
        .bind(tenant.is_active)
        .bind(tenant.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| domain_taken(tenant, e))?;

        row.map(Tenant::from).ok_or(DomainError::TenantNotFound)
    }

    async fn delete(&self, id: &Uuid, deleted_at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| persistence("opening tenant delete transaction", e))?;

        let result = sqlx::query(
            r#"
            UPDATE tenants
            SET deleted_at = $2, updated_at = $2, is_active = false
            WHERE id = $1 AND deleted_at IS NULL
            "#
        )
        .bind(id)
        .bind(deleted_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| persistence("deleting tenant", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::TenantNotFound);
        }

        let users = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = $2, updated_at = $2, is_active = false
            WHERE tenant_id = $1 AND deleted_at IS NULL
            "#
        )
        .bind(id)
        .bind(deleted_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| persistence("deleting tenant users", e))?;

        tx.commit()
            .await
            .map_err(|e| persistence("committing tenant delete", e))?;

        info!("Tenant {} deleted with {} users", id, users.rows_affected());
        Ok(())
    }
}
