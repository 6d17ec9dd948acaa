//! Forms submitted by users: donation requests and donor registration

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::config::FormValidationConfig;
use super::{filters, validators};
use crate::core::auth::Role;
use crate::core::entity::{BloodGroup, Donor, DonorStatus};
use crate::core::error::{BloodlinkError, FieldValidationError, Result, ValidationError};
use crate::core::location::LocationCatalog;

/// Forms that carry their own validation rules
pub trait ValidatableForm: Sized + for<'de> Deserialize<'de> + Serialize {
    /// Rules applied to a raw payload of this form
    fn validation_config() -> FormValidationConfig;

    /// Filter and validate a raw payload, then decode it
    fn from_payload(payload: Value) -> Result<Self> {
        let cleaned = Self::validation_config()
            .validate_and_filter(payload)
            .map_err(ValidationError::FieldErrors)?;
        serde_json::from_value(cleaned).map_err(|e| {
            BloodlinkError::Validation(ValidationError::FieldError {
                field: "_payload".to_string(),
                message: e.to_string(),
            })
        })
    }

    /// Re-run the rules over an already decoded form
    fn validated(self) -> Result<Self> {
        let payload = serde_json::to_value(&self)
            .map_err(|e| BloodlinkError::Internal(e.to_string()))?;
        Self::from_payload(payload)
    }
}

fn blood_groups() -> Vec<String> {
    BloodGroup::ALL.iter().map(|g| g.to_string()).collect()
}

/// Fields a user fills in to create or edit a donation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRequestDraft {
    pub recipient_name: String,
    pub district: String,
    pub upazila: String,
    #[serde(default)]
    pub hospital_name: String,
    #[serde(default)]
    pub full_address: String,
    pub blood_group: BloodGroup,
    pub donation_date: chrono::NaiveDate,
    pub donation_time: String,
    #[serde(default)]
    pub message: String,
}

impl DonationRequestDraft {
    /// Check that the upazila belongs to the chosen district
    ///
    /// Passes while the catalog is still loading.
    pub fn check_location(&self, catalog: &LocationCatalog) -> Result<()> {
        if catalog.is_loading() {
            return Ok(());
        }
        if !catalog.districts().iter().any(|d| d.name == self.district) {
            return Err(ValidationError::FieldError {
                field: "district".to_string(),
                message: format!("unknown district '{}'", self.district),
            }
            .into());
        }
        let options = catalog.upazila_options(&self.district);
        if !options.options().iter().any(|u| u.name == self.upazila) {
            return Err(ValidationError::FieldError {
                field: "upazila".to_string(),
                message: format!("'{}' is not in district '{}'", self.upazila, self.district),
            }
            .into());
        }
        Ok(())
    }
}

impl ValidatableForm for DonationRequestDraft {
    fn validation_config() -> FormValidationConfig {
        let mut config = FormValidationConfig::new("donation_request");
        config
            .add_filter("recipient_name", filters::trim())
            .add_filter("recipient_name", filters::collapse_whitespace())
            .add_filter("district", filters::trim())
            .add_filter("upazila", filters::trim())
            .add_filter("hospital_name", filters::trim())
            .add_filter("full_address", filters::trim())
            .add_filter("blood_group", filters::trim())
            .add_filter("blood_group", filters::uppercase())
            .add_filter("donation_time", filters::trim())
            .add_filter("message", filters::trim());
        config
            .add_validator("recipient_name", validators::required())
            .add_validator("recipient_name", validators::string_length(2, 80))
            .add_validator("district", validators::required())
            .add_validator("upazila", validators::required())
            .add_validator("hospital_name", validators::optional())
            .add_validator("full_address", validators::string_length(0, 200))
            .add_validator("blood_group", validators::required())
            .add_validator("blood_group", validators::in_list(blood_groups()))
            .add_validator("donation_date", validators::required())
            .add_validator("donation_date", validators::date_format("%Y-%m-%d"))
            .add_validator("donation_time", validators::required())
            .add_validator("donation_time", validators::time_format("%H:%M"))
            .add_validator("message", validators::string_length(0, 500));
        config
    }
}

/// Fields a new donor submits at sign-up
///
/// The identity provider owns the credentials; the password is checked here
/// only so the form can refuse a mismatch before contacting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationDraft {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: String,
    pub blood_group: BloodGroup,
    pub district: String,
    pub upazila: String,
    pub password: String,
    pub confirm_password: String,
}

impl ValidatableForm for RegistrationDraft {
    fn validation_config() -> FormValidationConfig {
        let mut config = FormValidationConfig::new("registration");
        config
            .add_filter("name", filters::trim())
            .add_filter("email", filters::trim())
            .add_filter("email", filters::lowercase())
            .add_filter("avatar", filters::trim())
            .add_filter("blood_group", filters::trim())
            .add_filter("blood_group", filters::uppercase())
            .add_filter("district", filters::trim())
            .add_filter("upazila", filters::trim());
        config
            .add_validator("name", validators::required())
            .add_validator("name", validators::string_length(2, 80))
            .add_validator("email", validators::required())
            .add_validator("email", validators::email())
            .add_validator("blood_group", validators::required())
            .add_validator("blood_group", validators::in_list(blood_groups()))
            .add_validator("district", validators::required())
            .add_validator("upazila", validators::required())
            .add_validator("password", validators::required())
            .add_validator("password", validators::string_length(6, 128));
        config
    }

    fn from_payload(payload: Value) -> Result<Self> {
        let cleaned = Self::validation_config()
            .validate_and_filter(payload)
            .map_err(ValidationError::FieldErrors)?;
        let draft: RegistrationDraft = serde_json::from_value(cleaned).map_err(|e| {
            BloodlinkError::Validation(ValidationError::FieldError {
                field: "_payload".to_string(),
                message: e.to_string(),
            })
        })?;
        if draft.password != draft.confirm_password {
            return Err(ValidationError::FieldErrors(vec![FieldValidationError {
                field: "confirm_password".to_string(),
                message: "passwords do not match".to_string(),
            }])
            .into());
        }
        Ok(draft)
    }
}

impl RegistrationDraft {
    /// The donor record created for this registration
    pub fn into_donor(self) -> Donor {
        Donor {
            id: Uuid::new_v4(),
            name: self.name,
            email: self.email,
            avatar: self.avatar,
            blood_group: self.blood_group,
            district: self.district,
            upazila: self.upazila,
            status: DonorStatus::Active,
            role: Role::Donor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request_payload() -> Value {
        json!({
            "recipient_name": "  Rahim   Uddin ",
            "district": "Dhaka",
            "upazila": " Savar ",
            "hospital_name": "Enam Medical",
            "blood_group": "ab+",
            "donation_date": "2024-03-10",
            "donation_time": "10:30",
            "message": "Surgery"
        })
    }

    #[test]
    fn test_request_draft_is_filtered() {
        let draft = DonationRequestDraft::from_payload(request_payload()).unwrap();
        assert_eq!(draft.recipient_name, "Rahim Uddin");
        assert_eq!(draft.upazila, "Savar");
        assert_eq!(draft.blood_group, BloodGroup::AbPositive);
        assert_eq!(draft.full_address, "");
    }

    #[test]
    fn test_request_draft_reports_all_missing_fields() {
        let err = DonationRequestDraft::from_payload(json!({
            "recipient_name": "",
            "blood_group": "Z+",
            "donation_date": "10/03/2024",
            "donation_time": "10:30"
        }))
        .unwrap_err();
        match err {
            BloodlinkError::Validation(v) => {
                let fields = v.fields();
                assert!(fields.contains(&"recipient_name"));
                assert!(fields.contains(&"district"));
                assert!(fields.contains(&"upazila"));
                assert!(fields.contains(&"blood_group"));
                assert!(fields.contains(&"donation_date"));
                assert!(!fields.contains(&"donation_time"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validated_rechecks_constructed_draft() {
        let mut draft = DonationRequestDraft::from_payload(request_payload()).unwrap();
        draft.donation_time = "late".to_string();
        assert!(draft.validated().is_err());
    }

    #[test]
    fn test_registration_password_mismatch() {
        let err = RegistrationDraft::from_payload(json!({
            "name": "Karim",
            "email": "Karim@Example.com",
            "blood_group": "O-",
            "district": "Sylhet",
            "upazila": "Beanibazar",
            "password": "secret1",
            "confirm_password": "secret2"
        }))
        .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("confirm_password"));
    }

    #[test]
    fn test_registration_into_donor() {
        let donor = RegistrationDraft::from_payload(json!({
            "name": " Karim ",
            "email": "Karim@Example.com",
            "blood_group": "o-",
            "district": "Sylhet",
            "upazila": "Beanibazar",
            "password": "secret1",
            "confirm_password": "secret1"
        }))
        .unwrap()
        .into_donor();
        assert_eq!(donor.name, "Karim");
        assert_eq!(donor.email, "karim@example.com");
        assert_eq!(donor.blood_group, BloodGroup::ONegative);
        assert_eq!(donor.role, Role::Donor);
        assert!(donor.is_active());
    }
}
