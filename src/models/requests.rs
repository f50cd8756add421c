use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::models::domain::{normalize_dietary, Budget, SearchQuery, DEFAULT_RADIUS_M};

/// Body of `POST /api/search/restaurants`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[validate(custom(function = "validate_not_blank"))]
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub budget: Option<Budget>,
    #[serde(default)]
    pub dietary: Vec<String>,
    #[validate(range(min = 0.0, max = 5.0), custom(function = "validate_finite"))]
    #[serde(default, alias = "rating")]
    pub min_rating: f64,
    #[validate(range(min = 1, max = 50000))]
    #[serde(default = "default_radius")]
    pub radius: u32,
}

impl SearchRequest {
    pub fn into_query(self) -> SearchQuery {
        SearchQuery {
            location: self.location.trim().to_string(),
            budget: self.budget,
            dietary: normalize_dietary(self.dietary),
            min_rating: self.min_rating,
            radius_m: self.radius,
        }
    }
}

/// Query string of `GET /api/restaurants`
///
/// `dietary` is a comma separated tag list.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListRestaurantsRequest {
    #[validate(custom(function = "validate_not_blank"))]
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub budget: Option<Budget>,
    #[serde(default)]
    pub dietary: Option<String>,
    #[validate(range(min = 0.0, max = 5.0), custom(function = "validate_finite"))]
    #[serde(default)]
    pub rating: f64,
    #[validate(range(min = 1, max = 50000))]
    #[serde(default = "default_radius")]
    pub radius: u32,
    #[serde(default)]
    pub page: u32,
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl ListRestaurantsRequest {
    pub fn to_query(&self) -> SearchQuery {
        let dietary = self
            .dietary
            .as_deref()
            .map(|d| normalize_dietary(d.split(',')))
            .unwrap_or_default();

        SearchQuery {
            location: self.location.trim().to_string(),
            budget: self.budget,
            dietary,
            min_rating: self.rating,
            radius_m: self.radius,
        }
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("location is required".into());
        return Err(err);
    }
    Ok(())
}

/// NaN slips through range checks since every comparison with it is false
fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        let mut err = ValidationError::new("finite");
        err.message = Some("rating must be a number between 0 and 5".into());
        return Err(err);
    }
    Ok(())
}

fn default_radius() -> u32 {
    DEFAULT_RADIUS_M
}

fn default_limit() -> u32 {
    20
}
