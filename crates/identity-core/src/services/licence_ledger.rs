// ============================================================================
// Identity Core - Licence Ledger
// File: crates/identity-core/src/services/licence_ledger.rs
// ============================================================================
//! Seat accounting for tenant licences.
//!
//! The ledger classifies failures; the store performs the guarded
//! increment/decrement, so `0 <= used_seats <= licenced_seats` holds even
//! when many registrations race for the last seat.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{LicenceTermsUpdate, TenantLicence};
use crate::error::DomainError;
use crate::repositories::TenantLicenceRepository;

#[derive(Clone)]
pub struct LicenceLedger {
    licence_repo: Arc<dyn TenantLicenceRepository>,
}

impl LicenceLedger {
    pub fn new(licence_repo: Arc<dyn TenantLicenceRepository>) -> Self {
        Self { licence_repo }
    }

    pub fn is_expired(licence: &TenantLicence, as_of: DateTime<Utc>) -> bool {
        licence.expiry_date.is_some_and(|expiry| expiry < as_of)
    }

    /// Takes one seat of the tenant's licence.
    pub async fn allocate_seat(
        &self,
        tenant_id: &Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<TenantLicence, DomainError> {
        let licence = self.load(tenant_id).await?;
        Self::check_allocatable(&licence, as_of)?;

        match self.licence_repo.try_allocate_seat(tenant_id, as_of).await? {
            Some(updated) => {
                debug!(
                    "Seat allocated for tenant {}: {}/{} ({} free)",
                    tenant_id,
                    updated.used_seats,
                    updated.licenced_seats,
                    updated.available_seats()
                );
                Ok(updated)
            }
            None => {
                // Lost a race between the read above and the guarded write.
                // Classify against fresh state; no retry.
                let current = self.load(tenant_id).await?;
                Self::check_allocatable(&current, as_of)?;
                warn!("Seat allocation for tenant {} lost a concurrent race", tenant_id);
                Err(DomainError::LicenceExceeded {
                    licenced_seats: current.licenced_seats,
                })
            }
        }
    }

    /// Gives one seat back. Never takes `used_seats` below zero.
    pub async fn release_seat(
        &self,
        tenant_id: &Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<TenantLicence, DomainError> {
        let updated = self
            .licence_repo
            .release_seat(tenant_id, as_of)
            .await?
            .ok_or_else(|| {
                warn!("Seat release failed: no licence for tenant {}", tenant_id);
                DomainError::LicenceNotFound
            })?;

        debug!(
            "Seat released for tenant {}: {}/{} ({} free)",
            tenant_id,
            updated.used_seats,
            updated.licenced_seats,
            updated.available_seats()
        );
        Ok(updated)
    }

    pub async fn licence_for_tenant(&self, tenant_id: &Uuid) -> Result<TenantLicence, DomainError> {
        self.load(tenant_id).await
    }

    pub async fn licence_by_key(&self, licence_key: &str) -> Result<TenantLicence, DomainError> {
        self.licence_repo
            .find_by_key(licence_key)
            .await?
            .ok_or(DomainError::LicenceNotFound)
    }

    pub async fn list_licences(&self) -> Result<Vec<TenantLicence>, DomainError> {
        self.licence_repo.list().await
    }

    /// Changes capacity and expiry. Capacity can never drop below the seats
    /// already in use.
    pub async fn update_terms(
        &self,
        tenant_id: &Uuid,
        terms: &LicenceTermsUpdate,
        as_of: DateTime<Utc>,
    ) -> Result<TenantLicence, DomainError> {
        if terms.licenced_seats < 1 {
            return Err(DomainError::Validation(
                "Licenced seats must be at least 1".to_string(),
            ));
        }

        let current = self.load(tenant_id).await?;
        if terms.licenced_seats < current.used_seats {
            return Err(DomainError::LicenceSeatsBelowUsage {
                requested: terms.licenced_seats,
                used: current.used_seats,
            });
        }

        let updated = self
            .licence_repo
            .update_terms(tenant_id, terms.licenced_seats, terms.expiry_date, as_of)
            .await?;

        match updated {
            Some(licence) => {
                info!(
                    "Licence terms updated for tenant {}: {} seats, expiry {:?}",
                    tenant_id, licence.licenced_seats, licence.expiry_date
                );
                Ok(licence)
            }
            None => {
                let current = self.load(tenant_id).await?;
                Err(DomainError::LicenceSeatsBelowUsage {
                    requested: terms.licenced_seats,
                    used: current.used_seats,
                })
            }
        }
    }

    async fn load(&self, tenant_id: &Uuid) -> Result<TenantLicence, DomainError> {
        self.licence_repo
            .find_by_tenant_id(tenant_id)
            .await?
            .ok_or_else(|| {
                warn!("No licence found for tenant {}", tenant_id);
                DomainError::LicenceNotFound
            })
    }

    // Expiry wins over capacity.
    fn check_allocatable(licence: &TenantLicence, as_of: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(expiry) = licence.expiry_date {
            if expiry < as_of {
                warn!("Licence {} of tenant {} expired at {}", licence.id, licence.tenant_id, expiry);
                return Err(DomainError::LicenceExpired(expiry));
            }
        }
        if licence.used_seats >= licence.licenced_seats {
            warn!(
                "Licence of tenant {} exhausted: {}/{}",
                licence.tenant_id, licence.used_seats, licence.licenced_seats
            );
            return Err(DomainError::LicenceExceeded {
                licenced_seats: licence.licenced_seats,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockTenantLicenceRepository;
    use chrono::Duration;

    fn licence(used: i32, seats: i32, expiry: Option<DateTime<Utc>>) -> TenantLicence {
        let mut licence = TenantLicence::starter(Uuid::new_v4(), "key".into(), seats, Utc::now());
        licence.used_seats = used;
        licence.expiry_date = expiry;
        licence
    }

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        assert!(!LicenceLedger::is_expired(&licence(1, 5, None), now));
        assert!(!LicenceLedger::is_expired(&licence(1, 5, Some(now + Duration::days(1))), now));
        assert!(!LicenceLedger::is_expired(&licence(1, 5, Some(now)), now));
        assert!(LicenceLedger::is_expired(&licence(1, 5, Some(now - Duration::seconds(1))), now));
    }

    #[tokio::test]
    async fn test_allocate_missing_licence() {
        let mut repo = MockTenantLicenceRepository::new();
        repo.expect_find_by_tenant_id().returning(|_| Ok(None));
        repo.expect_try_allocate_seat().never();

        let ledger = LicenceLedger::new(Arc::new(repo));
        let result = ledger.allocate_seat(&Uuid::new_v4(), Utc::now()).await;
        assert!(matches!(result, Err(DomainError::LicenceNotFound)));
    }

    #[tokio::test]
    async fn test_expired_wins_over_exhausted() {
        let now = Utc::now();
        let expired_and_full = licence(5, 5, Some(now - Duration::days(1)));
        let mut repo = MockTenantLicenceRepository::new();
        repo.expect_find_by_tenant_id()
            .returning(move |_| Ok(Some(expired_and_full.clone())));
        repo.expect_try_allocate_seat().never();

        let ledger = LicenceLedger::new(Arc::new(repo));
        let result = ledger.allocate_seat(&Uuid::new_v4(), now).await;
        assert!(matches!(result, Err(DomainError::LicenceExpired(_))));
    }

    #[tokio::test]
    async fn test_lost_race_reports_exceeded() {
        // First read sees a free seat, the guarded write misses, the re-read
        // sees the licence full.
        let mut repo = MockTenantLicenceRepository::new();
        let mut reads = 0;
        repo.expect_find_by_tenant_id().times(2).returning(move |_| {
            reads += 1;
            Ok(Some(if reads == 1 { licence(4, 5, None) } else { licence(5, 5, None) }))
        });
        repo.expect_try_allocate_seat().times(1).returning(|_, _| Ok(None));

        let ledger = LicenceLedger::new(Arc::new(repo));
        let result = ledger.allocate_seat(&Uuid::new_v4(), Utc::now()).await;
        assert!(matches!(result, Err(DomainError::LicenceExceeded { licenced_seats: 5 })));
    }

    #[tokio::test]
    async fn test_release_missing_licence() {
        let mut repo = MockTenantLicenceRepository::new();
        repo.expect_release_seat().returning(|_, _| Ok(None));

        let ledger = LicenceLedger::new(Arc::new(repo));
        let result = ledger.release_seat(&Uuid::new_v4(), Utc::now()).await;
        assert!(matches!(result, Err(DomainError::LicenceNotFound)));
    }

    #[tokio::test]
    async fn test_update_terms_refuses_below_usage() {
        let mut repo = MockTenantLicenceRepository::new();
        repo.expect_find_by_tenant_id().returning(|_| Ok(Some(licence(4, 5, None))));
        repo.expect_update_terms().never();

        let ledger = LicenceLedger::new(Arc::new(repo));
        let terms = LicenceTermsUpdate { licenced_seats: 3, expiry_date: None };
        let result = ledger.update_terms(&Uuid::new_v4(), &terms, Utc::now()).await;
        assert!(matches!(
            result,
            Err(DomainError::LicenceSeatsBelowUsage { requested: 3, used: 4 })
        ));
    }
}
