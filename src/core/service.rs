//! Service traits for requests, donors and funding
//!
//! Every mutating operation takes the caller's [`Session`] and enforces the
//! permission and lifecycle rules itself, so implementations backed by memory
//! or by a remote API behave identically.

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::auth::{Role, Session};
use crate::core::entity::{DonationRequest, DonationStatus, Donor, DonorStatus, Funding};
use crate::core::error::Result;
use crate::core::query::{ListQuery, Page};
use crate::core::validation::DonationRequestDraft;

/// Service trait for managing donation requests
#[async_trait]
pub trait DonationRequestService: Send + Sync {
    /// Create a pending request owned by the signed-in user
    async fn create(&self, session: &Session, draft: DonationRequestDraft)
    -> Result<DonationRequest>;

    /// Get a request by ID
    async fn get(&self, id: &Uuid) -> Result<DonationRequest>;

    /// Query every request (requires `ViewAllRequests`)
    async fn list_all(&self, session: &Session, query: &ListQuery) -> Result<Page<DonationRequest>>;

    /// Query the signed-in user's own requests
    async fn list_for_requester(
        &self,
        session: &Session,
        query: &ListQuery,
    ) -> Result<Page<DonationRequest>>;

    /// Query pending requests, visible without signing in
    async fn list_pending(&self, query: &ListQuery) -> Result<Page<DonationRequest>>;

    /// Replace the editable fields of a pending request
    async fn update(
        &self,
        session: &Session,
        id: &Uuid,
        draft: DonationRequestDraft,
    ) -> Result<DonationRequest>;

    /// Move a request to another lifecycle status
    async fn set_status(
        &self,
        session: &Session,
        id: &Uuid,
        status: DonationStatus,
    ) -> Result<DonationRequest>;

    /// Commit the signed-in user as donor, moving the request to in progress
    async fn confirm_donation(&self, session: &Session, id: &Uuid) -> Result<DonationRequest>;

    /// Delete a pending request
    async fn delete(&self, session: &Session, id: &Uuid) -> Result<()>;

    /// The signed-in user's latest requests, most recently created first
    async fn recent_for_requester(
        &self,
        session: &Session,
        limit: usize,
    ) -> Result<Vec<DonationRequest>>;

    /// Number of stored requests
    async fn count(&self) -> Result<usize>;
}

/// Criteria of the public donor search
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DonorSearch {
    pub blood_group: String,
    pub district: String,
    pub upazila: String,
}

impl DonorSearch {
    /// Engine inputs for this search, restricted to active donors
    pub fn to_query(&self, page: usize, page_size: usize) -> ListQuery {
        ListQuery::new()
            .filter("blood_group", self.blood_group.clone())
            .filter("district", self.district.clone())
            .filter("upazila", self.upazila.clone())
            .filter("status", DonorStatus::Active.as_str())
            .page(page)
            .page_size(page_size)
    }
}

/// Service trait for the donor directory and user administration
#[async_trait]
pub trait DonorDirectory: Send + Sync {
    /// Add a newly registered donor
    async fn register(&self, donor: Donor) -> Result<Donor>;

    /// Look a donor up by email
    async fn find_by_email(&self, email: &str) -> Result<Option<Donor>>;

    /// Public search over active donors
    async fn search(&self, criteria: &DonorSearch, page: usize, page_size: usize)
    -> Result<Page<Donor>>;

    /// Query every user (requires `ManageUsers`)
    async fn list(&self, session: &Session, query: &ListQuery) -> Result<Page<Donor>>;

    /// Block or unblock a user
    async fn set_status(&self, session: &Session, id: &Uuid, status: DonorStatus)
    -> Result<Donor>;

    /// Change a user's role
    async fn set_role(&self, session: &Session, id: &Uuid, role: Role) -> Result<Donor>;

    /// Number of registered donors
    async fn count(&self) -> Result<usize>;
}

/// Service trait for the funding ledger
#[async_trait]
pub trait FundingLedger: Send + Sync {
    /// Record a contribution confirmed by the payment provider
    async fn record(&self, session: &Session, amount_cents: u64, payment_id: &str)
    -> Result<Funding>;

    /// Contributions, newest first (requires `ViewFunding`)
    async fn list(&self, session: &Session, page: usize, page_size: usize) -> Result<Page<Funding>>;

    /// Sum of all contributions in the smallest currency unit
    async fn total_cents(&self) -> Result<u64>;
}
