//! In-memory implementations of the service traits for testing and development

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::core::auth::{Capability, Role, Session, SessionUser};
use crate::core::dashboard::recent_requests;
use crate::core::entity::{DonationRequest, DonationStatus, Donor, DonorInfo, DonorStatus, Funding};
use crate::core::error::{BloodlinkError, RequestError, Result, StorageError, ValidationError};
use crate::core::location::LocationCatalog;
use crate::core::query::{ListQuery, Page, query_list};
use crate::core::service::{DonationRequestService, DonorDirectory, DonorSearch, FundingLedger};
use crate::core::validation::{DonationRequestDraft, ValidatableForm};

/// Insertion-ordered map shared behind a lock
type Table<T> = Arc<RwLock<IndexMap<Uuid, T>>>;

fn read<'a, T>(table: &'a Table<T>, store: &str) -> Result<RwLockReadGuard<'a, IndexMap<Uuid, T>>> {
    table.read().map_err(|_| {
        StorageError::LockPoisoned {
            store: store.to_string(),
        }
        .into()
    })
}

fn write<'a, T>(
    table: &'a Table<T>,
    store: &str,
) -> Result<RwLockWriteGuard<'a, IndexMap<Uuid, T>>> {
    table.write().map_err(|_| {
        StorageError::LockPoisoned {
            store: store.to_string(),
        }
        .into()
    })
}

fn not_found(resource: &str, id: &Uuid) -> BloodlinkError {
    RequestError::NotFound {
        resource: resource.to_string(),
        id: *id,
    }
    .into()
}

fn forbidden(user: &SessionUser, action: &str) -> BloodlinkError {
    tracing::warn!(email = %user.email, action, "permission denied");
    RequestError::Forbidden {
        action: action.to_string(),
    }
    .into()
}

// =============================================================================
// Donation requests
// =============================================================================

const REQUESTS: &str = "donation_requests";

/// In-memory donation request service
///
/// Requests are kept in creation order, which is the order list queries see
/// when no sort key is given. With a location catalog attached, drafts whose
/// upazila is outside their district are refused.
#[derive(Clone, Default)]
pub struct InMemoryDonationRequestService {
    requests: Table<DonationRequest>,
    locations: Arc<LocationCatalog>,
}

impl InMemoryDonationRequestService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records, bypassing authorization
    pub fn with_requests(requests: impl IntoIterator<Item = DonationRequest>) -> Self {
        let table = requests.into_iter().map(|r| (r.id, r)).collect();
        Self {
            requests: Arc::new(RwLock::new(table)),
            locations: Arc::default(),
        }
    }

    /// Check request locations against `catalog`
    pub fn with_locations(mut self, catalog: LocationCatalog) -> Self {
        self.locations = Arc::new(catalog);
        self
    }

    fn snapshot(&self) -> Result<Vec<DonationRequest>> {
        Ok(read(&self.requests, REQUESTS)?.values().cloned().collect())
    }
}

fn can_manage(session: &Session, user: &SessionUser, request: &DonationRequest, any: Capability) -> bool {
    (request.is_owned_by(&user.email) && session.can(Capability::ManageOwnRequests))
        || session.can(any)
}

#[async_trait]
impl DonationRequestService for InMemoryDonationRequestService {
    async fn create(
        &self,
        session: &Session,
        draft: DonationRequestDraft,
    ) -> Result<DonationRequest> {
        let user = session.require(Capability::CreateRequest, "create donation request")?;
        let draft = draft.validated()?;
        draft.check_location(&self.locations)?;

        let request = DonationRequest {
            id: Uuid::new_v4(),
            recipient_name: draft.recipient_name,
            district: draft.district,
            upazila: draft.upazila,
            hospital_name: draft.hospital_name,
            full_address: draft.full_address,
            blood_group: draft.blood_group,
            donation_date: draft.donation_date,
            donation_time: draft.donation_time,
            status: DonationStatus::Pending,
            requester_name: user.name.clone(),
            requester_email: user.email.clone(),
            message: draft.message,
            requested_at: Utc::now(),
            donor: None,
        };

        write(&self.requests, REQUESTS)?.insert(request.id, request.clone());
        tracing::info!(id = %request.id, requester = %request.requester_email, "donation request created");

        Ok(request)
    }

    async fn get(&self, id: &Uuid) -> Result<DonationRequest> {
        read(&self.requests, REQUESTS)?
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("donation request", id))
    }

    async fn list_all(&self, session: &Session, query: &ListQuery) -> Result<Page<DonationRequest>> {
        session.require(Capability::ViewAllRequests, "view all donation requests")?;
        Ok(query_list(&self.snapshot()?, query))
    }

    async fn list_for_requester(
        &self,
        session: &Session,
        query: &ListQuery,
    ) -> Result<Page<DonationRequest>> {
        let user = session.require_user()?;
        let own: Vec<DonationRequest> = self
            .snapshot()?
            .into_iter()
            .filter(|r| r.is_owned_by(&user.email))
            .collect();
        Ok(query_list(&own, query))
    }

    async fn list_pending(&self, query: &ListQuery) -> Result<Page<DonationRequest>> {
        let pending: Vec<DonationRequest> = self
            .snapshot()?
            .into_iter()
            .filter(|r| r.status == DonationStatus::Pending)
            .collect();
        Ok(query_list(&pending, query))
    }

    async fn update(
        &self,
        session: &Session,
        id: &Uuid,
        draft: DonationRequestDraft,
    ) -> Result<DonationRequest> {
        let user = session.require_user()?;
        let draft = draft.validated()?;
        draft.check_location(&self.locations)?;

        let mut requests = write(&self.requests, REQUESTS)?;
        let request = requests.get_mut(id).ok_or_else(|| not_found("donation request", id))?;

        if !can_manage(session, user, request, Capability::EditAnyRequest) {
            return Err(forbidden(user, "edit donation request"));
        }
        if request.status != DonationStatus::Pending {
            return Err(RequestError::InvalidState {
                action: "edit".to_string(),
                status: request.status,
            }
            .into());
        }

        request.recipient_name = draft.recipient_name;
        request.district = draft.district;
        request.upazila = draft.upazila;
        request.hospital_name = draft.hospital_name;
        request.full_address = draft.full_address;
        request.blood_group = draft.blood_group;
        request.donation_date = draft.donation_date;
        request.donation_time = draft.donation_time;
        request.message = draft.message;

        tracing::info!(%id, editor = %user.email, "donation request updated");
        Ok(request.clone())
    }

    async fn set_status(
        &self,
        session: &Session,
        id: &Uuid,
        status: DonationStatus,
    ) -> Result<DonationRequest> {
        let user = session.require_user()?;

        let mut requests = write(&self.requests, REQUESTS)?;
        let request = requests.get_mut(id).ok_or_else(|| not_found("donation request", id))?;

        let from = request.status;
        if !from.can_transition_to(status) {
            return Err(RequestError::InvalidTransition {
                id: *id,
                from,
                to: status,
            }
            .into());
        }

        // Owners may only close a donation that is already under way.
        let owner_may_close = from == DonationStatus::Inprogress
            && request.is_owned_by(&user.email)
            && session.can(Capability::ManageOwnRequests);
        if !(session.can(Capability::UpdateAnyRequestStatus) || owner_may_close) {
            return Err(forbidden(user, "change donation request status"));
        }

        request.status = status;
        tracing::info!(%id, %from, to = %status, by = %user.email, "donation request status changed");
        Ok(request.clone())
    }

    async fn confirm_donation(&self, session: &Session, id: &Uuid) -> Result<DonationRequest> {
        let user = session.require(Capability::Donate, "donate")?;

        let mut requests = write(&self.requests, REQUESTS)?;
        let request = requests.get_mut(id).ok_or_else(|| not_found("donation request", id))?;

        if request.is_owned_by(&user.email) {
            return Err(forbidden(user, "donate to own request"));
        }
        if request.status != DonationStatus::Pending {
            return Err(RequestError::InvalidState {
                action: "donate to".to_string(),
                status: request.status,
            }
            .into());
        }

        request.status = DonationStatus::Inprogress;
        request.donor = Some(DonorInfo {
            name: user.name.clone(),
            email: user.email.clone(),
        });
        tracing::info!(%id, donor = %user.email, "donation confirmed");
        Ok(request.clone())
    }

    async fn delete(&self, session: &Session, id: &Uuid) -> Result<()> {
        let user = session.require_user()?;

        let mut requests = write(&self.requests, REQUESTS)?;
        let request = requests.get(id).ok_or_else(|| not_found("donation request", id))?;

        if !can_manage(session, user, request, Capability::DeleteAnyRequest) {
            return Err(forbidden(user, "delete donation request"));
        }
        if request.status != DonationStatus::Pending {
            return Err(RequestError::InvalidState {
                action: "delete".to_string(),
                status: request.status,
            }
            .into());
        }

        requests.shift_remove(id);
        tracing::info!(%id, by = %user.email, "donation request deleted");
        Ok(())
    }

    async fn recent_for_requester(
        &self,
        session: &Session,
        limit: usize,
    ) -> Result<Vec<DonationRequest>> {
        let user = session.require_user()?;
        let requests = read(&self.requests, REQUESTS)?;
        Ok(recent_requests(requests.values(), &user.email, limit))
    }

    async fn count(&self) -> Result<usize> {
        Ok(read(&self.requests, REQUESTS)?.len())
    }
}

// =============================================================================
// Donors
// =============================================================================

const DONORS: &str = "donors";

/// In-memory donor directory
#[derive(Clone, Default)]
pub struct InMemoryDonorDirectory {
    donors: Table<Donor>,
}

impl InMemoryDonorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the directory with existing records
    pub fn with_donors(donors: impl IntoIterator<Item = Donor>) -> Self {
        let table = donors.into_iter().map(|d| (d.id, d)).collect();
        Self {
            donors: Arc::new(RwLock::new(table)),
        }
    }

    fn snapshot(&self) -> Result<Vec<Donor>> {
        Ok(read(&self.donors, DONORS)?.values().cloned().collect())
    }

    fn administer(
        &self,
        session: &Session,
        id: &Uuid,
        action: &str,
        apply: impl FnOnce(&mut Donor),
    ) -> Result<Donor> {
        let admin = session.require(Capability::ManageUsers, action)?;

        let mut donors = write(&self.donors, DONORS)?;
        let donor = donors.get_mut(id).ok_or_else(|| not_found("donor", id))?;

        if donor.email.eq_ignore_ascii_case(&admin.email) {
            return Err(forbidden(admin, &format!("{} on own account", action)));
        }

        apply(&mut *donor);
        tracing::info!(%id, by = %admin.email, action, "user updated");
        Ok(donor.clone())
    }
}

#[async_trait]
impl DonorDirectory for InMemoryDonorDirectory {
    async fn register(&self, donor: Donor) -> Result<Donor> {
        let mut donors = write(&self.donors, DONORS)?;
        if donors
            .values()
            .any(|d| d.email.eq_ignore_ascii_case(&donor.email))
        {
            return Err(ValidationError::FieldError {
                field: "email".to_string(),
                message: format!("'{}' is already registered", donor.email),
            }
            .into());
        }
        donors.insert(donor.id, donor.clone());
        tracing::info!(id = %donor.id, email = %donor.email, "donor registered");
        Ok(donor)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Donor>> {
        Ok(read(&self.donors, DONORS)?
            .values()
            .find(|d| d.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn search(
        &self,
        criteria: &DonorSearch,
        page: usize,
        page_size: usize,
    ) -> Result<Page<Donor>> {
        Ok(query_list(&self.snapshot()?, &criteria.to_query(page, page_size)))
    }

    async fn list(&self, session: &Session, query: &ListQuery) -> Result<Page<Donor>> {
        session.require(Capability::ManageUsers, "list users")?;
        Ok(query_list(&self.snapshot()?, query))
    }

    async fn set_status(&self, session: &Session, id: &Uuid, status: DonorStatus) -> Result<Donor> {
        self.administer(session, id, "change user status", |d| d.status = status)
    }

    async fn set_role(&self, session: &Session, id: &Uuid, role: Role) -> Result<Donor> {
        self.administer(session, id, "change user role", |d| d.role = role)
    }

    async fn count(&self) -> Result<usize> {
        Ok(read(&self.donors, DONORS)?
            .values()
            .filter(|d| d.role == Role::Donor)
            .count())
    }
}

// =============================================================================
// Funding
// =============================================================================

const FUNDINGS: &str = "fundings";

fn checked_total<'a>(fundings: impl IntoIterator<Item = &'a Funding>) -> Option<u64> {
    fundings
        .into_iter()
        .try_fold(0u64, |acc, f| acc.checked_add(f.amount_cents))
}

/// In-memory funding ledger
#[derive(Clone, Default)]
pub struct InMemoryFundingLedger {
    fundings: Table<Funding>,
}

impl InMemoryFundingLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FundingLedger for InMemoryFundingLedger {
    async fn record(&self, session: &Session, amount_cents: u64, payment_id: &str) -> Result<Funding> {
        let user = session.require(Capability::Fund, "fund")?;

        if amount_cents == 0 {
            return Err(ValidationError::FieldError {
                field: "amount_cents".to_string(),
                message: "amount must be positive".to_string(),
            }
            .into());
        }
        if payment_id.trim().is_empty() {
            return Err(ValidationError::FieldError {
                field: "payment_id".to_string(),
                message: "payment confirmation is required".to_string(),
            }
            .into());
        }

        let mut fundings = write(&self.fundings, FUNDINGS)?;
        if fundings.values().any(|f| f.payment_id == payment_id) {
            return Err(ValidationError::FieldError {
                field: "payment_id".to_string(),
                message: format!("payment '{}' was already recorded", payment_id),
            }
            .into());
        }
        if checked_total(fundings.values())
            .and_then(|total| total.checked_add(amount_cents))
            .is_none()
        {
            return Err(ValidationError::FieldError {
                field: "amount_cents".to_string(),
                message: "amount exceeds the ledger capacity".to_string(),
            }
            .into());
        }

        let funding = Funding {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            amount_cents,
            payment_id: payment_id.to_string(),
            funded_at: Utc::now(),
        };
        fundings.insert(funding.id, funding.clone());
        tracing::info!(id = %funding.id, amount_cents, by = %user.email, "funding recorded");

        Ok(funding)
    }

    async fn list(&self, session: &Session, page: usize, page_size: usize) -> Result<Page<Funding>> {
        session.require(Capability::ViewFunding, "view funding")?;

        let mut all: Vec<Funding> = read(&self.fundings, FUNDINGS)?.values().cloned().collect();
        all.reverse();
        all.sort_by(|a, b| b.funded_at.cmp(&a.funded_at));

        Ok(query_list(
            &all,
            &ListQuery::new().page(page).page_size(page_size),
        ))
    }

    async fn total_cents(&self) -> Result<u64> {
        checked_total(read(&self.fundings, FUNDINGS)?.values())
            .ok_or_else(|| BloodlinkError::Internal("funding total overflows u64".to_string()))
    }
}
