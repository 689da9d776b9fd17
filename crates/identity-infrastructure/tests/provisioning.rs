mod common;

use chrono::Utc;
use common::{example_corp, tenant_registration, Harness, ADMIN_EMAIL};
use identity_core::domain::{TenantUpdate, UserRole};
use identity_core::error::DomainError;
use uuid::Uuid;

#[tokio::test]
async fn test_provisioning_creates_tenant_licence_and_admin() {
    let h = Harness::new();
    let provisioned = h.provision_example_corp().await;

    let tenant = h.tenants.get_tenant(&provisioned.tenant_id).await.unwrap();
    assert_eq!(tenant.name, "Example Corp");
    assert!(tenant.is_active);

    let licence = h.licence(&provisioned.tenant_id).await;
    assert_eq!(licence.licenced_seats, 5);
    assert_eq!(licence.used_seats, 1);
    assert_eq!(licence.licence_key, provisioned.licence_key);
    assert!(Uuid::parse_str(&licence.licence_key).is_ok());

    let admin = h
        .stored_user(&provisioned.tenant_id, &provisioned.admin_user_id)
        .await
        .unwrap();
    assert_eq!(admin.email, ADMIN_EMAIL);
    assert_eq!(admin.role, UserRole::TenantAdmin);
    assert!(admin.password_hash.starts_with("$argon2id$"));

    let by_key = h.ledger.licence_by_key(&provisioned.licence_key).await.unwrap();
    assert_eq!(by_key.tenant_id, provisioned.tenant_id);
}

#[tokio::test]
async fn test_shared_domain_rejected_without_partial_rows() {
    let h = Harness::new();
    h.provision_example_corp().await;

    let rival = tenant_registration("Rival Inc", "EXAMPLE.com", "boss@rival.test");
    let result = h.provisioner.register_tenant(&rival, Utc::now()).await;

    assert!(matches!(result, Err(DomainError::TenantAlreadyExists(d)) if d == "example.com"));
    assert_eq!(h.store.tenant_count(), 1);
    assert_eq!(h.store.licence_count(), 1);
    assert_eq!(h.store.user_count(), 1);
}

#[tokio::test]
async fn test_taken_admin_email_rolls_back_whole_tenant() {
    let h = Harness::new();
    h.provision_example_corp().await;

    let other = tenant_registration("Other Corp", "other.test", ADMIN_EMAIL);
    let result = h.provisioner.register_tenant(&other, Utc::now()).await;

    assert!(matches!(result, Err(DomainError::UserAlreadyExists(_))));
    assert_eq!(h.store.tenant_count(), 1);
    assert_eq!(h.store.licence_count(), 1);
    assert_eq!(h.store.user_count(), 1);
}

#[tokio::test]
async fn test_invalid_registration_writes_nothing() {
    let h = Harness::new();
    let mut registration = example_corp();
    registration.user.password = "short".into();

    let result = h.provisioner.register_tenant(&registration, Utc::now()).await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert_eq!(h.store.tenant_count(), 0);
}

#[tokio::test]
async fn test_deleted_tenant_frees_domain_and_users() {
    let h = Harness::new();
    let first = h.provision_example_corp().await;

    h.tenants.delete_tenant(&first.tenant_id, Utc::now()).await.unwrap();

    assert!(matches!(
        h.tenants.get_tenant(&first.tenant_id).await,
        Err(DomainError::TenantNotFound)
    ));
    assert!(h.users.list_users(&first.tenant_id).await.unwrap().is_empty());

    let again = h.provision_example_corp().await;
    assert_ne!(again.tenant_id, first.tenant_id);
    assert_eq!(h.tenants.list_tenants().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_cannot_steal_another_domain() {
    let h = Harness::new();
    let example = h.provision_example_corp().await;
    h.provisioner
        .register_tenant(
            &tenant_registration("Other Corp", "other.test", "admin@other.test"),
            Utc::now(),
        )
        .await
        .unwrap();

    let update = TenantUpdate {
        name: "Example Corp".into(),
        email: "hello@other.test".into(),
        phone: String::new(),
        address: String::new(),
    };
    let result = h.tenants.update_tenant(&example.tenant_id, &update, Utc::now()).await;

    assert!(matches!(result, Err(DomainError::TenantAlreadyExists(_))));
    let tenant = h.tenants.get_tenant(&example.tenant_id).await.unwrap();
    assert_eq!(tenant.email, "contact@example.com");
}
