//! # Bloodlink
//!
//! Domain logic for a blood-donation coordination platform, independent of
//! any rendering layer.
//!
//! ## Features
//!
//! - **List queries**: case-insensitive search, equality filters, sort keys and
//!   1-based pagination over in-memory records
//! - **Cascading locations**: district → upazila selection with an explicit
//!   loading state
//! - **Explicit sessions**: typed roles expanded into capabilities, passed by
//!   value instead of held globally
//! - **Request lifecycle**: pending → in progress → done/canceled, with owner
//!   and staff permissions enforced by the services
//! - **Form validation**: reusable validators and filters over JSON payloads
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bloodlink::prelude::*;
//!
//! let mut state = QueryState::default();
//! state.set_blood_group("A+");
//! state.set_sort_key(SortKey::Newest);
//!
//! let page = state.apply(&requests);
//! println!("{} of {} pages", page.page, page.total_pages);
//!
//! let options = catalog.upazila_options("Dhaka");
//! if options.is_loading() {
//!     println!("loading upazilas…");
//! }
//! ```

#[cfg(feature = "rest-client")]
pub mod client;
pub mod config;
pub mod core;
pub mod storage;
pub mod telemetry;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Domain ===
    pub use crate::core::{
        auth::{AuthPolicy, Capability, Role, Session, SessionUser},
        dashboard::{DashboardStats, recent_requests},
        entity::{
            BloodGroup, DonationRequest, DonationStatus, Donor, DonorInfo, DonorStatus, Funding,
        },
        error::{BloodlinkError, RequestError, ValidationError},
        location::{
            District, LocationCatalog, LocationSelection, Upazila, UpazilaOptions,
            reconcile_upazila, select_upazilas,
        },
        query::{ListQuery, Page, QueryState, SortKey, query_list},
        service::{DonationRequestService, DonorDirectory, DonorSearch, FundingLedger},
        store::Queryable,
        validation::{DonationRequestDraft, RegistrationDraft, ValidatableForm},
    };

    // === Storage ===
    pub use crate::storage::{
        InMemoryDonationRequestService, InMemoryDonorDirectory, InMemoryFundingLedger,
    };

    // === Config ===
    pub use crate::config::AppConfig;

    // === REST source ===
    #[cfg(feature = "rest-client")]
    pub use crate::client::RestRecordSource;

    // === External dependencies ===
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use uuid::Uuid;
}
