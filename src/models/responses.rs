use serde::{Deserialize, Serialize};
use crate::models::domain::{DetailRecord, RankedCandidate, ResolvedLocation};
use crate::services::cache::CacheStats;

/// Result of a restaurant search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub location: ResolvedLocation,
    pub restaurants: Vec<RankedCandidate>,
    pub total_results: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub cached: bool,
}

impl SearchResponse {
    /// Copy of a stored result, flagged as served from cache
    pub fn as_cached(&self) -> Self {
        Self {
            cached: true,
            ..self.clone()
        }
    }
}

/// One page of a search result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(flatten)]
    pub response: SearchResponse,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

impl SearchPage {
    /// Slice the ranked list; `total_results` keeps the full count
    pub fn paginate(mut response: SearchResponse, page: u32, limit: u32) -> Self {
        let start = (page as usize).saturating_mul(limit as usize);
        let end = start.saturating_add(limit as usize);
        let has_more = end < response.restaurants.len();

        response.restaurants = response
            .restaurants
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();

        Self {
            response,
            page,
            limit,
            has_more,
        }
    }
}

/// Venue details passthrough
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDetailsResponse {
    pub place_id: String,
    #[serde(flatten)]
    pub details: DetailRecord,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub cache: CacheStats,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
