//! REST record source
//!
//! Fetches the record arrays the list views operate on. A failed fetch is
//! logged and reported as an empty list, so that views show "no results" with
//! a single page instead of an error.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::AppConfig;
use crate::core::entity::{DonationRequest, Donor};
use crate::core::location::{District, LocationCatalog, Upazila};

/// HTTP client for the backend's collection endpoints
#[derive(Debug, Clone)]
pub struct RestRecordSource {
    client: Client,
    base_url: String,
}

impl RestRecordSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build a source for the configured backend, if one is set
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        config.api_base_url.as_deref().map(Self::new)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a JSON array, propagating any failure
    pub async fn try_fetch<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = self.url(path);
        let records = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?
            .error_for_status()
            .with_context(|| format!("GET {}", url))?
            .json::<Vec<T>>()
            .await
            .with_context(|| format!("decoding response of {}", url))?;
        tracing::debug!(%url, count = records.len(), "records fetched");
        Ok(records)
    }

    /// GET a JSON array, turning any failure into an empty list
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Vec<T> {
        match self.try_fetch(path).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), path, "fetch failed, using empty list");
                Vec::new()
            }
        }
    }

    pub async fn donation_requests(&self) -> Vec<DonationRequest> {
        self.fetch("donation-requests").await
    }

    pub async fn donors(&self) -> Vec<Donor> {
        self.fetch("donors").await
    }

    /// Fetch both location arrays
    ///
    /// The catalog stays `Loading` unless both arrays arrive.
    pub async fn locations(&self) -> LocationCatalog {
        let districts = self.try_fetch::<District>("districts").await;
        let upazilas = self.try_fetch::<Upazila>("upazilas").await;
        match (districts, upazilas) {
            (Ok(districts), Ok(upazilas)) => LocationCatalog::new(districts, upazilas),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %format!("{:#}", e), "location data unavailable");
                LocationCatalog::Loading
            }
        }
    }
}
