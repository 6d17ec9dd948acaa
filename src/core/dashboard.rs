//! Dashboard figures for donors and staff

use serde::Serialize;

use crate::core::auth::{Capability, Session};
use crate::core::entity::DonationRequest;
use crate::core::error::Result;
use crate::core::service::{DonationRequestService, DonorDirectory, FundingLedger};

/// Totals shown on the admin and volunteer dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_donors: usize,
    pub total_requests: usize,
    pub total_funding_cents: u64,
}

impl DashboardStats {
    /// Gather the totals (requires `ViewStatistics`)
    pub async fn collect(
        session: &Session,
        donors: &dyn DonorDirectory,
        requests: &dyn DonationRequestService,
        funding: &dyn FundingLedger,
    ) -> Result<Self> {
        session.require(Capability::ViewStatistics, "view statistics")?;

        Ok(Self {
            total_donors: donors.count().await?,
            total_requests: requests.count().await?,
            total_funding_cents: funding.total_cents().await?,
        })
    }
}

/// Requests created by `email`, most recently created first
pub fn recent_requests<'a>(
    requests: impl IntoIterator<Item = &'a DonationRequest>,
    email: &str,
    limit: usize,
) -> Vec<DonationRequest> {
    let mut owned: Vec<&DonationRequest> = requests
        .into_iter()
        .filter(|r| r.is_owned_by(email))
        .collect();
    // Ties on the timestamp go to the later record.
    owned.reverse();
    owned.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
    owned.into_iter().take(limit).cloned().collect()
}
