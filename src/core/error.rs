//! Typed error handling for bloodlink
//!
//! Query and location-selection functions are total and never return errors.
//! Everything that can be refused (configuration loading, form validation,
//! authorization, lifecycle mutations) reports a [`BloodlinkError`] so that
//! callers can match on the precise cause instead of a generic `anyhow::Error`.
//!
//! # Error Categories
//!
//! - [`RequestError`]: authorization and lifecycle rejections
//! - [`ValidationError`]: form input that failed validation
//! - [`ConfigError`]: configuration parsing and validation
//! - [`StorageError`]: failures of the backing store
//!
//! # Example
//!
//! ```rust,ignore
//! match service.delete(&session, &id).await {
//!     Ok(()) => {}
//!     Err(BloodlinkError::Request(RequestError::InvalidState { .. })) => {
//!         println!("only pending requests can be deleted");
//!     }
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::core::entity::DonationStatus;

/// Result alias used by the fallible parts of the crate
pub type Result<T> = std::result::Result<T, BloodlinkError>;

/// The main error type for bloodlink
#[derive(Debug)]
pub enum BloodlinkError {
    /// Authorization or lifecycle rejection
    Request(RequestError),

    /// Invalid user input
    Validation(ValidationError),

    /// Configuration errors
    Config(ConfigError),

    /// Backing store errors
    Storage(StorageError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for BloodlinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BloodlinkError::Request(e) => write!(f, "{}", e),
            BloodlinkError::Validation(e) => write!(f, "{}", e),
            BloodlinkError::Config(e) => write!(f, "{}", e),
            BloodlinkError::Storage(e) => write!(f, "{}", e),
            BloodlinkError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for BloodlinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BloodlinkError::Request(e) => Some(e),
            BloodlinkError::Validation(e) => Some(e),
            BloodlinkError::Config(e) => Some(e),
            BloodlinkError::Storage(e) => Some(e),
            BloodlinkError::Internal(_) => None,
        }
    }
}

/// Error payload handed to the rendering layer
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl BloodlinkError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            BloodlinkError::Request(e) => e.error_code(),
            BloodlinkError::Validation(_) => "VALIDATION_ERROR",
            BloodlinkError::Config(_) => "CONFIG_ERROR",
            BloodlinkError::Storage(_) => "STORAGE_ERROR",
            BloodlinkError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            BloodlinkError::Request(RequestError::NotFound { resource, id }) => {
                Some(serde_json::json!({
                    "resource": resource,
                    "id": id.to_string()
                }))
            }
            BloodlinkError::Request(RequestError::InvalidTransition { from, to, .. }) => {
                Some(serde_json::json!({ "from": from, "to": to }))
            }
            BloodlinkError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }

    /// Whether the error was caused by the caller lacking permission
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            BloodlinkError::Request(RequestError::Forbidden { .. })
                | BloodlinkError::Request(RequestError::Unauthenticated)
        )
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Authorization and lifecycle rejections
#[derive(Debug)]
pub enum RequestError {
    /// No signed-in user
    Unauthenticated,

    /// The session lacks the permission for the action
    Forbidden { action: String },

    /// Resource does not exist
    NotFound { resource: String, id: Uuid },

    /// Action is not allowed in the record's current status
    InvalidState {
        action: String,
        status: DonationStatus,
    },

    /// Status change outside the allowed lifecycle
    InvalidTransition {
        id: Uuid,
        from: DonationStatus,
        to: DonationStatus,
    },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Unauthenticated => write!(f, "Sign-in required"),
            RequestError::Forbidden { action } => {
                write!(f, "Not allowed to {}", action)
            }
            RequestError::NotFound { resource, id } => {
                write!(f, "{} with id '{}' not found", resource, id)
            }
            RequestError::InvalidState { action, status } => {
                write!(f, "Cannot {} a request that is {}", action, status)
            }
            RequestError::InvalidTransition { id, from, to } => {
                write!(
                    f,
                    "Request '{}' cannot move from {} to {}",
                    id, from, to
                )
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Unauthenticated => "UNAUTHENTICATED",
            RequestError::Forbidden { .. } => "FORBIDDEN",
            RequestError::NotFound { .. } => "NOT_FOUND",
            RequestError::InvalidState { .. } => "INVALID_STATE",
            RequestError::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }
}

impl From<RequestError> for BloodlinkError {
    fn from(err: RequestError) -> Self {
        BloodlinkError::Request(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Single field validation error
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),
}

/// A single field validation error
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    /// Names of the fields that failed
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ValidationError::FieldError { field, .. } => vec![field.as_str()],
            ValidationError::FieldErrors(errors) => {
                errors.iter().map(|e| e.field.as_str()).collect()
            }
        }
    }
}

impl From<ValidationError> for BloodlinkError {
    fn from(err: ValidationError) -> Self {
        BloodlinkError::Validation(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for BloodlinkError {
    fn from(err: ConfigError) -> Self {
        BloodlinkError::Config(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to the backing store
#[derive(Debug)]
pub enum StorageError {
    /// A lock guarding in-memory data was poisoned
    LockPoisoned { store: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::LockPoisoned { store } => {
                write!(f, "Lock on store '{}' is poisoned", store)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for BloodlinkError {
    fn from(err: StorageError) -> Self {
        BloodlinkError::Storage(err)
    }
}
