//! Contracts for the external collaborators the search pipeline calls.
//!
//! All providers are async and backend-agnostic; `GooglePlacesClient`
//! implements geocoding, discovery and details over HTTP.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Candidate, DetailRecord, DietaryInfo, DiscoveryFilters, EnrichedCandidate, ResolvedLocation};

/// Errors that can occur when calling an upstream provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Resolves free-text locations to coordinates
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    async fn resolve(&self, location: &str) -> Result<ResolvedLocation, ProviderError>;
}

/// Finds venues near a point
#[async_trait]
pub trait DiscoveryProvider: Send + Sync {
    async fn find_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: u32,
        filters: &DiscoveryFilters,
    ) -> Result<Vec<Candidate>, ProviderError>;
}

/// Fetches the detail record of a single venue
#[async_trait]
pub trait DetailsProvider: Send + Sync {
    async fn fetch_details(&self, place_id: &str) -> Result<DetailRecord, ProviderError>;
}

/// Supplies menu and allergen declarations for a venue
#[async_trait]
pub trait DietaryInfoProvider: Send + Sync {
    async fn fetch_dietary_info(&self, venue: &EnrichedCandidate) -> Result<DietaryInfo, ProviderError>;
}
