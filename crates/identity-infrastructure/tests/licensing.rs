mod common;

use chrono::{Duration, Utc};
use common::{user_number, Harness};
use identity_core::domain::{LicenceTermsUpdate, UserRegistration};
use identity_core::error::DomainError;
use identity_shared::config::{PolicySettings, UserUniqueness};

#[tokio::test]
async fn test_registration_takes_a_seat() {
    let h = Harness::new();
    let tenant = h.provision_example_corp().await;

    let user = h
        .registrar
        .register_user(&tenant.tenant_id, &user_number(1), Utc::now())
        .await
        .unwrap();

    assert_eq!(user.tenant_id, tenant.tenant_id);
    assert_eq!(h.licence(&tenant.tenant_id).await.used_seats, 2);
    assert_eq!(h.users.list_users(&tenant.tenant_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_exhausted_licence_rejects_and_keeps_count() {
    let h = Harness::new();
    let tenant = h.provision_example_corp().await;

    for n in 1..=4 {
        h.registrar
            .register_user(&tenant.tenant_id, &user_number(n), Utc::now())
            .await
            .unwrap();
    }

    let result = h
        .registrar
        .register_user(&tenant.tenant_id, &user_number(5), Utc::now())
        .await;

    assert!(matches!(
        result,
        Err(DomainError::LicenceExceeded { licenced_seats: 5 })
    ));
    assert_eq!(h.licence(&tenant.tenant_id).await.used_seats, 5);
    assert_eq!(h.store.user_count(), 5);
}

#[tokio::test]
async fn test_expired_licence_rejects_registration() {
    let h = Harness::new();
    let tenant = h.provision_example_corp().await;
    let yesterday = Utc::now() - Duration::days(1);
    assert!(h.store.set_licence_expiry(&tenant.tenant_id, Some(yesterday)));

    let result = h
        .registrar
        .register_user(&tenant.tenant_id, &user_number(1), Utc::now())
        .await;

    assert!(matches!(result, Err(DomainError::LicenceExpired(at)) if at == yesterday));
    assert_eq!(h.licence(&tenant.tenant_id).await.used_seats, 1);
}

#[tokio::test]
async fn test_expiry_is_reported_before_exhaustion() {
    let h = Harness::new();
    let tenant = h.provision_example_corp().await;
    for n in 1..=4 {
        h.registrar
            .register_user(&tenant.tenant_id, &user_number(n), Utc::now())
            .await
            .unwrap();
    }
    h.store
        .set_licence_expiry(&tenant.tenant_id, Some(Utc::now() - Duration::minutes(5)));

    let result = h
        .registrar
        .register_user(&tenant.tenant_id, &user_number(5), Utc::now())
        .await;
    assert!(matches!(result, Err(DomainError::LicenceExpired(_))));
}

#[tokio::test]
async fn test_licence_valid_until_expiry_instant() {
    let h = Harness::new();
    let tenant = h.provision_example_corp().await;
    let expiry = Utc::now() + Duration::hours(1);
    h.store.set_licence_expiry(&tenant.tenant_id, Some(expiry));

    h.registrar
        .register_user(&tenant.tenant_id, &user_number(1), expiry)
        .await
        .unwrap();
    let late = h
        .registrar
        .register_user(&tenant.tenant_id, &user_number(2), expiry + Duration::seconds(1))
        .await;
    assert!(matches!(late, Err(DomainError::LicenceExpired(_))));
}

#[tokio::test]
async fn test_delete_frees_a_seat_for_the_next_user() {
    let h = Harness::new();
    let tenant = h.provision_example_corp().await;
    let mut ids = Vec::new();
    for n in 1..=4 {
        let user = h
            .registrar
            .register_user(&tenant.tenant_id, &user_number(n), Utc::now())
            .await
            .unwrap();
        ids.push(user.id);
    }

    h.registrar
        .delete_user(&tenant.tenant_id, &ids[0], Utc::now())
        .await
        .unwrap();
    assert_eq!(h.licence(&tenant.tenant_id).await.used_seats, 4);

    h.registrar
        .register_user(&tenant.tenant_id, &user_number(5), Utc::now())
        .await
        .unwrap();
    assert_eq!(h.licence(&tenant.tenant_id).await.used_seats, 5);
}

#[tokio::test]
async fn test_second_delete_is_not_found_and_releases_nothing() {
    let h = Harness::new();
    let tenant = h.provision_example_corp().await;
    let user = h
        .registrar
        .register_user(&tenant.tenant_id, &user_number(1), Utc::now())
        .await
        .unwrap();

    h.registrar
        .delete_user(&tenant.tenant_id, &user.id, Utc::now())
        .await
        .unwrap();
    let again = h
        .registrar
        .delete_user(&tenant.tenant_id, &user.id, Utc::now())
        .await;

    assert!(matches!(again, Err(DomainError::UserNotFound)));
    assert_eq!(h.licence(&tenant.tenant_id).await.used_seats, 1);
    assert!(h.stored_user(&tenant.tenant_id, &user.id).await.is_none());
}

#[tokio::test]
async fn test_same_domain_user_rejected_before_taking_seat() {
    let h = Harness::new();
    let tenant = h.provision_example_corp().await;
    let colleague = UserRegistration {
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        email: "jane@Example.com".into(),
        password: "UserPass123!".into(),
    };

    let result = h
        .registrar
        .register_user(&tenant.tenant_id, &colleague, Utc::now())
        .await;

    assert!(matches!(result, Err(DomainError::UserAlreadyExists(_))));
    assert_eq!(h.licence(&tenant.tenant_id).await.used_seats, 1);
}

#[tokio::test]
async fn test_address_uniqueness_allows_colleagues() {
    let h = Harness::with_policy(PolicySettings {
        user_uniqueness: UserUniqueness::EmailAddress,
        ..PolicySettings::default()
    });
    let tenant = h.provision_example_corp().await;
    let colleague = UserRegistration {
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        email: "jane@example.com".into(),
        password: "UserPass123!".into(),
    };

    h.registrar
        .register_user(&tenant.tenant_id, &colleague, Utc::now())
        .await
        .unwrap();
    let duplicate = h
        .registrar
        .register_user(&tenant.tenant_id, &colleague, Utc::now())
        .await;

    assert!(matches!(duplicate, Err(DomainError::UserAlreadyExists(_))));
    assert_eq!(h.licence(&tenant.tenant_id).await.used_seats, 2);
}

#[tokio::test]
async fn test_terms_update_respects_usage() {
    let h = Harness::new();
    let tenant = h.provision_example_corp().await;
    for n in 1..=2 {
        h.registrar
            .register_user(&tenant.tenant_id, &user_number(n), Utc::now())
            .await
            .unwrap();
    }

    let too_small = LicenceTermsUpdate {
        licenced_seats: 2,
        expiry_date: None,
    };
    let result = h
        .ledger
        .update_terms(&tenant.tenant_id, &too_small, Utc::now())
        .await;
    assert!(matches!(
        result,
        Err(DomainError::LicenceSeatsBelowUsage { requested: 2, used: 3 })
    ));

    let grown = LicenceTermsUpdate {
        licenced_seats: 10,
        expiry_date: Some(Utc::now() + Duration::days(30)),
    };
    let licence = h
        .ledger
        .update_terms(&tenant.tenant_id, &grown, Utc::now())
        .await
        .unwrap();
    assert_eq!(licence.licenced_seats, 10);
    assert_eq!(licence.used_seats, 3);
}

#[tokio::test]
async fn test_registration_under_unknown_tenant() {
    let h = Harness::new();
    let result = h
        .registrar
        .register_user(&uuid::Uuid::new_v4(), &user_number(1), Utc::now())
        .await;
    assert!(matches!(result, Err(DomainError::TenantNotFound)));
}

#[tokio::test]
async fn test_list_licences_covers_every_tenant() {
    let h = Harness::new();
    let example = h.provision_example_corp().await;
    let other = h
        .provisioner
        .register_tenant(
            &common::tenant_registration("Other Corp", "other.test", "admin@other.test"),
            Utc::now(),
        )
        .await
        .unwrap();

    let licences = h.ledger.list_licences().await.unwrap();

    assert_eq!(licences.len(), 2);
    assert!(licences.iter().any(|l| l.tenant_id == example.tenant_id));
    assert!(licences.iter().any(|l| l.tenant_id == other.tenant_id));
    assert!(licences.iter().all(|l| l.used_seats == 1));
}
