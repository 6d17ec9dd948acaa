//! Configuration loading and management

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::auth::Session;
use crate::core::entity::DonationRequest;
use crate::core::error::{ConfigError, Result};
use crate::core::location::LocationCatalog;
use crate::core::query::{DEFAULT_PAGE_SIZE, QueryState};
use crate::core::service::DonationRequestService;
use crate::telemetry;

/// Application configuration
///
/// # Example
/// ```yaml
/// page_size: 12
/// recent_requests_limit: 3
/// api_base_url: https://api.example.org
/// districts_path: data/districts.json
/// upazilas_path: data/upazilas.json
/// log_filter: bloodlink=debug
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Items per page in every list view
    pub page_size: usize,

    /// Requests shown on a donor's dashboard
    pub recent_requests_limit: usize,

    /// Base URL of the REST backend
    pub api_base_url: Option<String>,

    /// Static JSON array of districts
    pub districts_path: String,

    /// Static JSON array of upazilas
    pub upazilas_path: String,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            recent_requests_limit: 3,
            api_base_url: None,
            districts_path: "data/districts.json".to_string(),
            upazilas_path: "data/upazilas.json".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path, e),
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make list views unusable
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            }
            .into());
        }
        if let Some(url) = &self.api_base_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url".to_string(),
                value: url.clone(),
                message: "must be an http(s) URL".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Fresh list-view state using the configured page size
    pub fn query_state(&self) -> QueryState {
        QueryState::with_page_size(self.page_size)
    }

    /// Install the tracing subscriber with `log_filter` as the fallback filter
    pub fn init_tracing(&self) {
        telemetry::init_tracing(&self.log_filter);
    }

    /// The signed-in user's latest requests, as many as the dashboard shows
    pub async fn recent_requests(
        &self,
        session: &Session,
        requests: &dyn DonationRequestService,
    ) -> Result<Vec<DonationRequest>> {
        requests
            .recent_for_requester(session, self.recent_requests_limit)
            .await
    }

    /// Read the district and upazila reference files
    pub fn load_locations(&self) -> anyhow::Result<LocationCatalog> {
        let catalog = LocationCatalog::from_json_files(&self.districts_path, &self.upazilas_path)
            .with_context(|| {
                format!(
                    "loading locations from {} and {}",
                    self.districts_path, self.upazilas_path
                )
            })?;
        catalog.validate().context("checking location data")?;
        Ok(catalog)
    }
}
