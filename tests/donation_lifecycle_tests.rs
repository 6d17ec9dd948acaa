//! Donation request lifecycle and permission rules

mod common;

use bloodlink::prelude::*;
use common::{draft, session};

async fn service_with_request() -> (InMemoryDonationRequestService, DonationRequest) {
    let service = InMemoryDonationRequestService::new();
    let owner = session("Owner", Role::Donor);
    let created = service
        .create(&owner, draft("Rahim", "A+", "Dhaka", "2024-03-10"))
        .await
        .expect("create should succeed");
    (service, created)
}

fn code(err: BloodlinkError) -> &'static str {
    err.error_code()
}

#[tokio::test]
async fn test_create_sets_pending_and_requester() {
    let (service, created) = service_with_request().await;
    assert_eq!(created.status, DonationStatus::Pending);
    assert_eq!(created.requester_email, "owner@example.com");
    assert_eq!(created.requester_name, "Owner");
    assert_eq!(service.get(&created.id).await.unwrap(), created);
    assert_eq!(service.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_create_requires_active_signed_in_user() {
    let service = InMemoryDonationRequestService::new();
    let err = service
        .create(&Session::SignedOut, draft("Rahim", "A+", "Dhaka", "2024-03-10"))
        .await
        .unwrap_err();
    assert_eq!(code(err), "UNAUTHENTICATED");

    let blocked = Session::signed_in(
        SessionUser::new("Blocked", "blocked@example.com", Role::Donor)
            .with_status(DonorStatus::Blocked),
    );
    let err = service
        .create(&blocked, draft("Rahim", "A+", "Dhaka", "2024-03-10"))
        .await
        .unwrap_err();
    assert!(err.is_forbidden());
}

#[tokio::test]
async fn test_create_revalidates_draft() {
    let service = InMemoryDonationRequestService::new();
    let mut bad = draft("Rahim", "A+", "Dhaka", "2024-03-10");
    bad.upazila = "   ".to_string();
    let err = service
        .create(&session("Owner", Role::Donor), bad)
        .await
        .unwrap_err();
    assert_eq!(code(err), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_unknown_is_not_found() {
    let service = InMemoryDonationRequestService::new();
    let err = service.get(&Uuid::new_v4()).await.unwrap_err();
    assert_eq!(code(err), "NOT_FOUND");
}

#[tokio::test]
async fn test_owner_edits_only_while_pending() {
    let (service, created) = service_with_request().await;
    let owner = session("Owner", Role::Donor);

    let updated = service
        .update(&owner, &created.id, draft("Rahim Uddin", "B+", "Dhaka", "2024-03-11"))
        .await
        .unwrap();
    assert_eq!(updated.recipient_name, "Rahim Uddin");
    assert_eq!(updated.blood_group, BloodGroup::BPositive);
    assert_eq!(updated.requester_email, created.requester_email);

    service
        .confirm_donation(&session("Donor", Role::Donor), &created.id)
        .await
        .unwrap();
    let err = service
        .update(&owner, &created.id, draft("Again", "B+", "Dhaka", "2024-03-11"))
        .await
        .unwrap_err();
    assert_eq!(code(err), "INVALID_STATE");
}

#[tokio::test]
async fn test_other_donor_cannot_edit_but_admin_can() {
    let (service, created) = service_with_request().await;

    let err = service
        .update(
            &session("Stranger", Role::Donor),
            &created.id,
            draft("Hijack", "O+", "Dhaka", "2024-03-10"),
        )
        .await
        .unwrap_err();
    assert!(err.is_forbidden());

    let err = service
        .update(
            &session("Helper", Role::Volunteer),
            &created.id,
            draft("Hijack", "O+", "Dhaka", "2024-03-10"),
        )
        .await
        .unwrap_err();
    assert!(err.is_forbidden());

    let updated = service
        .update(
            &session("Boss", Role::Admin),
            &created.id,
            draft("Fixed", "O+", "Dhaka", "2024-03-10"),
        )
        .await
        .unwrap();
    assert_eq!(updated.recipient_name, "Fixed");
}

#[tokio::test]
async fn test_confirm_donation_records_donor() {
    let (service, created) = service_with_request().await;

    let err = service
        .confirm_donation(&session("Owner", Role::Donor), &created.id)
        .await
        .unwrap_err();
    assert!(err.is_forbidden());

    let confirmed = service
        .confirm_donation(&session("Donor", Role::Donor), &created.id)
        .await
        .unwrap();
    assert_eq!(confirmed.status, DonationStatus::Inprogress);
    let donor = confirmed.donor.expect("donor should be recorded");
    assert_eq!(donor.email, "donor@example.com");

    let err = service
        .confirm_donation(&session("Late", Role::Donor), &created.id)
        .await
        .unwrap_err();
    assert_eq!(code(err), "INVALID_STATE");
}

#[tokio::test]
async fn test_owner_closes_in_progress_request() {
    let (service, created) = service_with_request().await;
    let owner = session("Owner", Role::Donor);

    let err = service
        .set_status(&owner, &created.id, DonationStatus::Inprogress)
        .await
        .unwrap_err();
    assert!(err.is_forbidden());

    service
        .confirm_donation(&session("Donor", Role::Donor), &created.id)
        .await
        .unwrap();
    let done = service
        .set_status(&owner, &created.id, DonationStatus::Done)
        .await
        .unwrap();
    assert_eq!(done.status, DonationStatus::Done);

    let err = service
        .set_status(&owner, &created.id, DonationStatus::Canceled)
        .await
        .unwrap_err();
    assert_eq!(code(err), "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_volunteer_moves_any_request_but_not_backwards() {
    let (service, created) = service_with_request().await;
    let volunteer = session("Helper", Role::Volunteer);

    let started = service
        .set_status(&volunteer, &created.id, DonationStatus::Inprogress)
        .await
        .unwrap();
    assert_eq!(started.status, DonationStatus::Inprogress);

    let err = service
        .set_status(&volunteer, &created.id, DonationStatus::Pending)
        .await
        .unwrap_err();
    assert_eq!(code(err), "INVALID_TRANSITION");

    let canceled = service
        .set_status(&volunteer, &created.id, DonationStatus::Canceled)
        .await
        .unwrap();
    assert_eq!(canceled.status, DonationStatus::Canceled);
}

#[tokio::test]
async fn test_stranger_cannot_change_status() {
    let (service, created) = service_with_request().await;
    let err = service
        .set_status(&session("Stranger", Role::Donor), &created.id, DonationStatus::Canceled)
        .await
        .unwrap_err();
    assert!(err.is_forbidden());
}

#[tokio::test]
async fn test_delete_only_pending() {
    let (service, created) = service_with_request().await;
    let owner = session("Owner", Role::Donor);

    let err = service
        .delete(&session("Helper", Role::Volunteer), &created.id)
        .await
        .unwrap_err();
    assert!(err.is_forbidden());

    service.delete(&owner, &created.id).await.unwrap();
    assert_eq!(service.count().await.unwrap(), 0);

    let (service, created) = service_with_request().await;
    service
        .confirm_donation(&session("Donor", Role::Donor), &created.id)
        .await
        .unwrap();
    let err = service
        .delete(&session("Boss", Role::Admin), &created.id)
        .await
        .unwrap_err();
    assert_eq!(code(err), "INVALID_STATE");
}

#[tokio::test]
async fn test_listing_scopes() {
    let service = InMemoryDonationRequestService::new();
    let owner = session("Owner", Role::Donor);
    let other = session("Other", Role::Donor);

    let first = service
        .create(&owner, draft("First", "A+", "Dhaka", "2024-03-01"))
        .await
        .unwrap();
    service
        .create(&owner, draft("Second", "B+", "Dhaka", "2024-03-02"))
        .await
        .unwrap();
    service
        .create(&other, draft("Theirs", "O+", "Sylhet", "2024-03-03"))
        .await
        .unwrap();
    service.confirm_donation(&other, &first.id).await.unwrap();

    let own = service
        .list_for_requester(&owner, &ListQuery::new())
        .await
        .unwrap();
    assert_eq!(own.total, 2);

    let pending = service.list_pending(&ListQuery::new()).await.unwrap();
    let names: Vec<&str> = pending.items.iter().map(|r| r.recipient_name.as_str()).collect();
    assert_eq!(names, vec!["Second", "Theirs"]);

    let err = service.list_all(&owner, &ListQuery::new()).await.unwrap_err();
    assert!(err.is_forbidden());

    let all = service
        .list_all(
            &session("Helper", Role::Volunteer),
            &ListQuery::new().filter("status", "inprogress"),
        )
        .await
        .unwrap();
    assert_eq!(all.total, 1);
    assert_eq!(all.items[0].id, first.id);

    let recent = service.recent_for_requester(&owner, 3).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].recipient_name, "Second");
}

#[tokio::test]
async fn test_dashboard_recent_requests_follow_configured_limit() {
    let service = InMemoryDonationRequestService::new();
    let owner = session("Owner", Role::Donor);
    for name in ["First", "Second", "Third", "Fourth"] {
        service
            .create(&owner, draft(name, "A+", "Dhaka", "2024-03-10"))
            .await
            .unwrap();
    }

    let config = AppConfig {
        recent_requests_limit: 2,
        ..AppConfig::default()
    };
    let recent = config.recent_requests(&owner, &service).await.unwrap();
    let names: Vec<&str> = recent.iter().map(|r| r.recipient_name.as_str()).collect();
    assert_eq!(names, vec!["Fourth", "Third"]);

    let err = config
        .recent_requests(&Session::SignedOut, &service)
        .await
        .unwrap_err();
    assert_eq!(code(err), "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_catalog_rejects_upazila_outside_district() {
    let catalog = LocationCatalog::from_json_str(
        r#"[{"id":"1","name":"Dhaka"},{"id":"2","name":"Sylhet"}]"#,
        r#"[{"id":"10","name":"Savar","district_id":"1"},{"id":"20","name":"Beanibazar","district_id":"2"}]"#,
    )
    .unwrap();
    let service = InMemoryDonationRequestService::new().with_locations(catalog);
    let owner = session("Owner", Role::Donor);

    let created = service
        .create(&owner, draft("Rahim", "A+", "Dhaka", "2024-03-10"))
        .await
        .unwrap();

    let err = service
        .create(&owner, draft("Rahim", "A+", "Sylhet", "2024-03-10"))
        .await
        .unwrap_err();
    match err {
        BloodlinkError::Validation(e) => assert_eq!(e.fields(), vec!["upazila"]),
        other => panic!("expected validation error, got {:?}", other),
    }

    let err = service
        .update(&owner, &created.id, draft("Rahim", "A+", "Narnia", "2024-03-10"))
        .await
        .unwrap_err();
    assert_eq!(code(err), "VALIDATION_ERROR");
}
