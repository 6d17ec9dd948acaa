//! Core module containing the domain types, queries and service traits

pub mod auth;
pub mod dashboard;
pub mod entity;
pub mod error;
pub mod location;
pub mod query;
pub mod service;
pub mod store;
pub mod validation;

pub use auth::{AuthPolicy, Capability, Role, Session, SessionUser};
pub use entity::{BloodGroup, DonationRequest, DonationStatus, Donor, DonorStatus, Funding};
pub use error::{BloodlinkError, Result};
pub use location::{District, LocationCatalog, LocationSelection, Upazila, select_upazilas};
pub use query::{ListQuery, Page, QueryState, SortKey, query_list};
pub use service::{DonationRequestService, DonorDirectory, DonorSearch, FundingLedger};
pub use store::Queryable;
