//! Donor directory, user administration, funding ledger and dashboard totals

mod common;

use bloodlink::prelude::*;
use common::{donor, session};

fn directory() -> InMemoryDonorDirectory {
    let mut blocked = donor("Blocked", BloodGroup::APositive, "Dhaka", "Savar");
    blocked.status = DonorStatus::Blocked;
    InMemoryDonorDirectory::with_donors(vec![
        donor("Rafiq", BloodGroup::APositive, "Dhaka", "Savar"),
        donor("Rahima", BloodGroup::APositive, "Dhaka", "Dhamrai"),
        donor("Karim", BloodGroup::BPositive, "Dhaka", "Savar"),
        blocked,
    ])
}

#[tokio::test]
async fn test_search_returns_only_active_matches() {
    let criteria = DonorSearch {
        blood_group: "A+".to_string(),
        district: "Dhaka".to_string(),
        upazila: "Savar".to_string(),
    };
    let page = directory().search(&criteria, 1, 12).await.unwrap();
    let names: Vec<&str> = page.items.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Rafiq"]);
}

#[tokio::test]
async fn test_search_with_partial_criteria() {
    let criteria = DonorSearch {
        district: "Dhaka".to_string(),
        ..DonorSearch::default()
    };
    let page = directory().search(&criteria, 1, 2).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 2);
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let dir = directory();
    let err = dir
        .register(donor("Rafiq", BloodGroup::OPositive, "Sylhet", "Beanibazar"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    let added = dir
        .register(donor("Nadia", BloodGroup::ONegative, "Sylhet", "Beanibazar"))
        .await
        .unwrap();
    let found = dir.find_by_email("NADIA@example.com").await.unwrap();
    assert_eq!(found, Some(added));
}

#[tokio::test]
async fn test_admin_blocks_and_promotes() {
    let dir = directory();
    let admin = session("Boss", Role::Admin);
    let karim = dir.find_by_email("karim@example.com").await.unwrap().unwrap();

    let blocked = dir
        .set_status(&admin, &karim.id, DonorStatus::Blocked)
        .await
        .unwrap();
    assert_eq!(blocked.status, DonorStatus::Blocked);

    let promoted = dir.set_role(&admin, &karim.id, Role::Volunteer).await.unwrap();
    assert_eq!(promoted.role, Role::Volunteer);

    let users = dir
        .list(&admin, &ListQuery::new().filter("status", "blocked"))
        .await
        .unwrap();
    assert_eq!(users.total, 2);

    let err = dir
        .set_role(&session("Helper", Role::Volunteer), &karim.id, Role::Admin)
        .await
        .unwrap_err();
    assert!(err.is_forbidden());
}

#[tokio::test]
async fn test_admin_cannot_modify_own_account() {
    let mut me = donor("Boss", BloodGroup::OPositive, "Dhaka", "Savar");
    me.role = Role::Admin;
    let dir = InMemoryDonorDirectory::with_donors(vec![me.clone()]);
    let err = dir
        .set_status(&session("Boss", Role::Admin), &me.id, DonorStatus::Blocked)
        .await
        .unwrap_err();
    assert!(err.is_forbidden());
}

#[tokio::test]
async fn test_funding_ledger() {
    let ledger = InMemoryFundingLedger::new();
    let donor_session = session("Rafiq", Role::Donor);

    ledger.record(&donor_session, 50_000, "pi_1").await.unwrap();
    ledger.record(&donor_session, 25_000, "pi_2").await.unwrap();
    assert_eq!(ledger.total_cents().await.unwrap(), 75_000);

    let err = ledger.record(&donor_session, 0, "pi_3").await.unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
    let err = ledger.record(&donor_session, 100, "pi_1").await.unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
    let err = ledger.record(&Session::SignedOut, 100, "pi_4").await.unwrap_err();
    assert_eq!(err.error_code(), "UNAUTHENTICATED");

    let err = ledger.list(&donor_session, 1, 10).await.unwrap_err();
    assert!(err.is_forbidden());

    let page = ledger
        .list(&session("Helper", Role::Volunteer), 1, 10)
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].payment_id, "pi_2");
}

#[tokio::test]
async fn test_funding_total_never_overflows() {
    let ledger = InMemoryFundingLedger::new();
    let admin = session("Boss", Role::Admin);
    let half = u64::MAX / 2 + 1;

    ledger.record(&admin, half, "pi_big_1").await.unwrap();
    let err = ledger.record(&admin, half, "pi_big_2").await.unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    assert_eq!(ledger.total_cents().await.unwrap(), half);
    let page = ledger.list(&admin, 1, 10).await.unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let donors = directory();
    let requests = InMemoryDonationRequestService::new();
    let funding = InMemoryFundingLedger::new();

    requests
        .create(
            &session("Rafiq", Role::Donor),
            common::draft("Rahim", "A+", "Dhaka", "2024-03-10"),
        )
        .await
        .unwrap();
    funding
        .record(&session("Rafiq", Role::Donor), 1_000, "pi_1")
        .await
        .unwrap();

    let stats = DashboardStats::collect(
        &session("Boss", Role::Admin),
        &donors,
        &requests,
        &funding,
    )
    .await
    .unwrap();
    assert_eq!(
        stats,
        DashboardStats {
            total_donors: 4,
            total_requests: 1,
            total_funding_cents: 1_000,
        }
    );

    let err = DashboardStats::collect(&session("Rafiq", Role::Donor), &donors, &requests, &funding)
        .await
        .unwrap_err();
    assert!(err.is_forbidden());
}
