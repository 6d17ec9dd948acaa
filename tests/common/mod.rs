//! Shared fixtures for integration tests

#![allow(dead_code)]

use bloodlink::prelude::*;
use serde_json::json;

pub fn session(name: &str, role: Role) -> Session {
    Session::signed_in(SessionUser::new(
        name,
        format!("{}@example.com", name.to_lowercase()),
        role,
    ))
}

pub fn draft(recipient: &str, blood_group: &str, district: &str, date: &str) -> DonationRequestDraft {
    DonationRequestDraft::from_payload(json!({
        "recipient_name": recipient,
        "district": district,
        "upazila": "Savar",
        "hospital_name": "Enam Medical",
        "full_address": "Road 1",
        "blood_group": blood_group,
        "donation_date": date,
        "donation_time": "10:30",
        "message": "Needed for surgery"
    }))
    .expect("fixture draft should be valid")
}

pub fn request(recipient: &str, blood_group: BloodGroup, district: &str, date: &str) -> DonationRequest {
    DonationRequest {
        id: Uuid::new_v4(),
        recipient_name: recipient.to_string(),
        district: district.to_string(),
        upazila: "Savar".to_string(),
        hospital_name: String::new(),
        full_address: String::new(),
        blood_group,
        donation_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("fixture date"),
        donation_time: "10:30".to_string(),
        status: DonationStatus::Pending,
        requester_name: "Owner".to_string(),
        requester_email: "owner@example.com".to_string(),
        message: String::new(),
        requested_at: Utc::now(),
        donor: None,
    }
}

pub fn donor(name: &str, blood_group: BloodGroup, district: &str, upazila: &str) -> Donor {
    Donor {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        avatar: String::new(),
        blood_group,
        district: district.to_string(),
        upazila: upazila.to_string(),
        status: DonorStatus::Active,
        role: Role::Donor,
    }
}
