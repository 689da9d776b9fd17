// ============================================================================
// Identity Infrastructure - PostgreSQL Tenant Licence Repository
// File: crates/identity-infrastructure/src/database/postgres/licence_repo_impl.rs
// ============================================================================
//! Seat counters are only ever moved by single guarded `UPDATE` statements.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use identity_core::domain::TenantLicence;
use identity_core::error::DomainError;
use identity_core::repositories::TenantLicenceRepository;

use crate::database::error::persistence;

pub struct PgTenantLicenceRepository {
    pool: PgPool,
}

impl PgTenantLicenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TenantLicenceRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub licence_key: String,
    pub licenced_seats: i32,
    pub used_seats: i32,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TenantLicenceRow> for TenantLicence {
    fn from(row: TenantLicenceRow) -> Self {
        TenantLicence {
            id: row.id,
            tenant_id: row.tenant_id,
            licence_key: row.licence_key,
            licenced_seats: row.licenced_seats,
            used_seats: row.used_seats,
            expiry_date: row.expiry_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl TenantLicenceRepository for PgTenantLicenceRepository {
    async fn find_by_tenant_id(&self, tenant_id: &Uuid) -> Result<Option<TenantLicence>, DomainError> {
        let row: Option<TenantLicenceRow> = sqlx::query_as(
            r#"
            SELECT id, tenant_id, licence_key, licenced_seats, used_seats,
                   expiry_date, created_at, updated_at
            FROM tenant_licences
            WHERE tenant_id = $1
            "#
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| persistence("finding licence by tenant", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_key(&self, licence_key: &str) -> Result<Option<TenantLicence>, DomainError> {
        let row: Option<TenantLicenceRow> = sqlx::query_as(
            r#"
            SELECT id, tenant_id, licence_key, licenced_seats, used_seats,
                   expiry_date, created_at, updated_at
            FROM tenant_licences
            WHERE licence_key = $1
            "#
        )
        .bind(licence_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| persistence("finding licence by key", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self) -> Result<Vec<TenantLicence>, DomainError> {
        let rows: Vec<TenantLicenceRow> = sqlx::query_as(
            r#"
            SELECT id, tenant_id, licence_key, licenced_seats, used_seats,
                   expiry_date, created_at, updated_at
            FROM tenant_licences
            ORDER BY created_at
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| persistence("listing licences", e))?;

        Ok(rows.into_iter().map(TenantLicence::from).collect())
    }

    async fn try_allocate_seat(
        &self,
        tenant_id: &Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<Option<TenantLicence>, DomainError> {
        let row: Option<TenantLicenceRow> = sqlx::query_as(
            r#"
            UPDATE tenant_licences
            SET used_seats = used_seats + 1, updated_at = $2
            WHERE tenant_id = $1
              AND used_seats < licenced_seats
              AND (expiry_date IS NULL OR expiry_date >= $2)
            RETURNING id, tenant_id, licence_key, licenced_seats, used_seats,
                      expiry_date, created_at, updated_at
            "#
        )
        .bind(tenant_id)
        .bind(as_of)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| persistence("allocating seat", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn release_seat(
        &self,
        tenant_id: &Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<Option<TenantLicence>, DomainError> {
        let row: Option<TenantLicenceRow> = sqlx::query_as(
            r#"
            UPDATE tenant_licences
            SET used_seats = GREATEST(used_seats - 1, 0), updated_at = $2
            WHERE tenant_id = $1
            RETURNING id, tenant_id, licence_key, licenced_seats, used_seats,
                      expiry_date, created_at, updated_at
            "#
        )
        .bind(tenant_id)
        .bind(as_of)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| persistence("releasing seat", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn update_terms(
        &self,
        tenant_id: &Uuid,
        licenced_seats: i32,
        expiry_date: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<TenantLicence>, DomainError> {
        let row: Option<TenantLicenceRow> = sqlx::query_as(
            r#"
            UPDATE tenant_licences
            SET licenced_seats = $2, expiry_date = $3, updated_at = $4
            WHERE tenant_id = $1 AND used_seats <= $2
            RETURNING id, tenant_id, licence_key, licenced_seats, used_seats,
                      expiry_date, created_at, updated_at
            "#
        )
        .bind(tenant_id)
        .bind(licenced_seats)
        .bind(expiry_date)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| persistence("updating licence terms", e))?;

        Ok(row.map(|r| r.into()))
    }
}
