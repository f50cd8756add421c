// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    normalize_dietary, AssessedCandidate, BoundingBox, Budget, Candidate, DetailRecord,
    DietaryAssessment, DietaryInfo, DietarySet, DiscoveryFilters, EnrichedCandidate, MenuItem,
    RankedCandidate, RankingPreferences, ResolvedLocation, SearchQuery, ValidatedCandidate,
    ValidationResult, DEFAULT_RADIUS_M,
};
pub use requests::{ListRestaurantsRequest, SearchRequest};
pub use responses::{ErrorResponse, HealthResponse, RestaurantDetailsResponse, SearchPage, SearchResponse};
