//! Validation and filtering of submitted forms
//!
//! Forms arrive as JSON payloads. Filters normalize them, validators check
//! them, and only then are they decoded into typed drafts.

pub mod config;
pub mod filters;
pub mod forms;
pub mod validators;

pub use config::FormValidationConfig;
pub use forms::{DonationRequestDraft, RegistrationDraft, ValidatableForm};
