//! Cascading district → upazila selection
//!
//! Districts and upazilas are immutable reference data loaded once. An upazila
//! belongs to exactly one district through `district_id`; while a district is
//! selected, only its upazilas are offered.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// First-level administrative division
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    pub id: String,
    pub name: String,
}

/// Second-level administrative division
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upazila {
    pub id: String,
    pub name: String,
    #[serde(rename = "district_id", alias = "districtId")]
    pub district_id: String,
}

/// Upazilas of the district named `selected_district`
///
/// The first district with that name wins. An empty or unknown name yields
/// no upazilas, as does reference data that has not been loaded yet.
pub fn select_upazilas<'a>(
    districts: &[District],
    upazilas: &'a [Upazila],
    selected_district: &str,
) -> Vec<&'a Upazila> {
    if selected_district.is_empty() {
        return Vec::new();
    }

    let Some(district) = districts.iter().find(|d| d.name == selected_district) else {
        return Vec::new();
    };

    upazilas
        .iter()
        .filter(|u| u.district_id == district.id)
        .collect()
}

/// Keep `current` only if it is still one of `options`
pub fn reconcile_upazila(current: Option<&str>, options: &[&Upazila]) -> Option<String> {
    current
        .filter(|name| options.iter().any(|u| u.name == *name))
        .map(str::to_string)
}

/// Failure to read location reference data
#[derive(Debug, Error)]
pub enum LocationDataError {
    #[error("invalid location data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read location data from '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("upazila '{upazila}' references unknown district '{district_id}'")]
    UnknownDistrict { upazila: String, district_id: String },
}

/// What the upazila picker should show
#[derive(Debug, Clone, PartialEq)]
pub enum UpazilaOptions<'a> {
    /// Reference data has not arrived yet
    Loading,
    /// Options for the selected district (possibly none)
    Ready(Vec<&'a Upazila>),
}

impl<'a> UpazilaOptions<'a> {
    pub fn is_loading(&self) -> bool {
        matches!(self, UpazilaOptions::Loading)
    }

    /// The options, treating loading as empty
    pub fn options(&self) -> &[&'a Upazila] {
        match self {
            UpazilaOptions::Loading => &[],
            UpazilaOptions::Ready(options) => options,
        }
    }
}

/// Location reference data with an explicit loading state
#[derive(Debug, Clone, Default)]
pub enum LocationCatalog {
    #[default]
    Loading,
    Ready {
        districts: Vec<District>,
        upazilas: Vec<Upazila>,
    },
}

impl LocationCatalog {
    pub fn new(districts: Vec<District>, upazilas: Vec<Upazila>) -> Self {
        LocationCatalog::Ready {
            districts,
            upazilas,
        }
    }

    /// Parse the two static JSON arrays
    pub fn from_json_str(districts: &str, upazilas: &str) -> Result<Self, LocationDataError> {
        let districts: Vec<District> = serde_json::from_str(districts)?;
        let upazilas: Vec<Upazila> = serde_json::from_str(upazilas)?;
        Ok(Self::new(districts, upazilas))
    }

    /// Read the two static JSON files
    pub fn from_json_files(
        districts_path: &str,
        upazilas_path: &str,
    ) -> Result<Self, LocationDataError> {
        let read = |path: &str| {
            std::fs::read_to_string(path).map_err(|source| LocationDataError::Io {
                path: path.to_string(),
                source,
            })
        };
        let catalog = Self::from_json_str(&read(districts_path)?, &read(upazilas_path)?)?;
        tracing::info!(
            districts = catalog.districts().len(),
            upazilas = catalog.upazilas().len(),
            "location data loaded"
        );
        Ok(catalog)
    }

    /// Check that every upazila points at a known district
    pub fn validate(&self) -> Result<(), LocationDataError> {
        for upazila in self.upazilas() {
            if !self.districts().iter().any(|d| d.id == upazila.district_id) {
                return Err(LocationDataError::UnknownDistrict {
                    upazila: upazila.name.clone(),
                    district_id: upazila.district_id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LocationCatalog::Loading)
    }

    pub fn districts(&self) -> &[District] {
        match self {
            LocationCatalog::Loading => &[],
            LocationCatalog::Ready { districts, .. } => districts,
        }
    }

    pub fn upazilas(&self) -> &[Upazila] {
        match self {
            LocationCatalog::Loading => &[],
            LocationCatalog::Ready { upazilas, .. } => upazilas,
        }
    }

    /// Upazila choices for `district`, distinguishing "still loading" from "none"
    pub fn upazila_options(&self, district: &str) -> UpazilaOptions<'_> {
        match self {
            LocationCatalog::Loading => UpazilaOptions::Loading,
            LocationCatalog::Ready {
                districts,
                upazilas,
            } => UpazilaOptions::Ready(select_upazilas(districts, upazilas, district)),
        }
    }
}

/// The district/upazila pair chosen in a form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSelection {
    pub district: Option<String>,
    pub upazila: Option<String>,
}

impl LocationSelection {
    /// Start from an existing record, as edit forms do
    pub fn preset(district: impl Into<String>, upazila: impl Into<String>) -> Self {
        Self {
            district: Some(district.into()),
            upazila: Some(upazila.into()),
        }
    }

    /// Change the district, clearing the upazila unless it is still offered
    ///
    /// While the catalog is loading the previous upazila is kept, so that an
    /// edit form does not lose its preset value before the data arrives.
    pub fn select_district(&mut self, catalog: &LocationCatalog, district: &str) {
        self.district = (!district.is_empty()).then(|| district.to_string());

        match catalog.upazila_options(district) {
            UpazilaOptions::Loading => {}
            UpazilaOptions::Ready(options) => {
                self.upazila = reconcile_upazila(self.upazila.as_deref(), &options);
            }
        }
    }

    /// Choose an upazila; refused if the selected district does not offer it
    pub fn select_upazila(&mut self, catalog: &LocationCatalog, upazila: &str) -> bool {
        let district = self.district.as_deref().unwrap_or_default();
        let offered = catalog
            .upazila_options(district)
            .options()
            .iter()
            .any(|u| u.name == upazila);
        if offered {
            self.upazila = Some(upazila.to_string());
        }
        offered
    }

    pub fn is_complete(&self) -> bool {
        self.district.is_some() && self.upazila.is_some()
    }
}
