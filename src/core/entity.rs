//! Domain records: donation requests, donors and fundings

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::core::auth::Role;

/// ABO/Rh blood group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        BloodGroup::ALL
            .into_iter()
            .find(|g| g.as_str() == normalized)
            .ok_or_else(|| format!("unknown blood group: {}", s))
    }
}

/// Lifecycle status of a donation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    Inprogress,
    Done,
    Canceled,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Inprogress => "inprogress",
            DonationStatus::Done => "done",
            DonationStatus::Canceled => "canceled",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`
    ///
    /// Pending may start or be canceled; an in-progress donation ends as done
    /// or canceled. Done and canceled are terminal.
    pub fn can_transition_to(&self, next: DonationStatus) -> bool {
        use DonationStatus::*;
        matches!(
            (self, next),
            (Pending, Inprogress) | (Pending, Canceled) | (Inprogress, Done) | (Inprogress, Canceled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DonationStatus::Done | DonationStatus::Canceled)
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(DonationStatus::Pending),
            "inprogress" | "in-progress" | "in_progress" => Ok(DonationStatus::Inprogress),
            "done" => Ok(DonationStatus::Done),
            "canceled" | "cancelled" => Ok(DonationStatus::Canceled),
            other => Err(format!("unknown donation status: {}", other)),
        }
    }
}

/// Account status of a donor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonorStatus {
    Active,
    Blocked,
}

impl DonorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonorStatus::Active => "active",
            DonorStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for DonorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The person who committed to fulfil a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorInfo {
    pub name: String,
    pub email: String,
}

/// A patient's need for blood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
    pub id: Uuid,
    pub recipient_name: String,
    pub district: String,
    pub upazila: String,
    #[serde(default)]
    pub hospital_name: String,
    #[serde(default)]
    pub full_address: String,
    pub blood_group: BloodGroup,
    pub donation_date: NaiveDate,
    pub donation_time: String,
    pub status: DonationStatus,
    #[serde(default)]
    pub requester_name: String,
    pub requester_email: String,
    #[serde(default)]
    pub message: String,
    pub requested_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor: Option<DonorInfo>,
}

impl DonationRequest {
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.requester_email.eq_ignore_ascii_case(email)
    }
}

/// A registered user discoverable as a blood donor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar: String,
    pub blood_group: BloodGroup,
    pub district: String,
    pub upazila: String,
    pub status: DonorStatus,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Donor
}

impl Donor {
    pub fn is_active(&self) -> bool {
        self.status == DonorStatus::Active
    }
}

/// A confirmed contribution to the platform's fund
///
/// Amounts are stored in the smallest currency unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Funding {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub amount_cents: u64,
    pub payment_id: String,
    pub funded_at: DateTime<Utc>,
}
