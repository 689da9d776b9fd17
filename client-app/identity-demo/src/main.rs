use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::{error, info};

use identity_core::domain::{AdminRegistration, LoginRequest, TenantRegistration};
use identity_core::repositories::{TenantLicenceRepository, TenantRepository, UserRepository};
use identity_core::services::{CredentialVerifier, LicenceLedger, TenantProvisioner};
use identity_infrastructure::{
    create_pool, InMemoryIdentityStore, PgTenantLicenceRepository, PgTenantRepository,
    PgUserRepository,
};
use identity_security::{PasswordService, UuidTokenGenerator};
use identity_shared::config::AppConfig;

struct Repositories {
    tenants: Arc<dyn TenantRepository>,
    users: Arc<dyn UserRepository>,
    licences: Arc<dyn TenantLicenceRepository>,
}

async fn repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
    if config.database.url.is_empty() {
        info!("No database configured, using the in-memory store");
        let store = Arc::new(InMemoryIdentityStore::new());
        return Ok(Repositories {
            tenants: store.clone(),
            users: store.clone(),
            licences: store,
        });
    }

    info!("Connecting to database...");
    let pool = create_pool(&config.database)
        .await
        .context("connecting to PostgreSQL")?;
    Ok(Repositories {
        tenants: Arc::new(PgTenantRepository::new(pool.clone())),
        users: Arc::new(PgUserRepository::new(pool.clone())),
        licences: Arc::new(PgTenantLicenceRepository::new(pool)),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("loading configuration")?;

    // Initialize telemetry
    let _log_guard = identity_shared::telemetry::init_telemetry(&config.log)?;

    info!("{} starting ({})", config.app.name, config.app.env);

    let repos = repositories(&config).await?;
    let hasher = Arc::new(PasswordService::new(&config.security)?);

    let provisioner = TenantProvisioner::new(
        repos.tenants.clone(),
        hasher.clone(),
        Arc::new(UuidTokenGenerator),
        &config.policy,
    );
    let verifier = CredentialVerifier::new(
        repos.users.clone(),
        repos.tenants.clone(),
        hasher,
        &config.policy,
    );
    let ledger = LicenceLedger::new(repos.licences.clone());

    let registration = TenantRegistration {
        name: "Example Corp".into(),
        email: "contact@example.com".into(),
        phone: "+1234567890".into(),
        address: "123 Main St".into(),
        user: AdminRegistration {
            first_name: "Admin".into(),
            last_name: "User".into(),
            email: "admin@example.com".into(),
            password: "SecurePass123!".into(),
        },
    };

    let provisioned = match provisioner.register_tenant(&registration, Utc::now()).await {
        Ok(p) => p,
        Err(e) => {
            error!("Provisioning failed: {}", e);
            return Err(e.into());
        }
    };

    let licence = ledger.licence_for_tenant(&provisioned.tenant_id).await?;
    info!(
        "Tenant {} holds licence {} ({} of {} seats used)",
        provisioned.tenant_id, licence.licence_key, licence.used_seats, licence.licenced_seats
    );

    let login = LoginRequest {
        email: registration.user.email.clone(),
        password: registration.user.password.clone(),
    };
    let client_ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
    let result = verifier.login(&login, client_ip, Utc::now()).await?;
    info!(
        "Logged in user {} of tenant {} as {}",
        result.user_id, result.tenant_id, result.role
    );

    Ok(())
}
