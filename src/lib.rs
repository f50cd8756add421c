//! Dine Algo - Restaurant discovery service
//!
//! Geocodes a location, discovers nearby venues, enriches them concurrently,
//! scores dietary compatibility, removes duplicates, validates and ranks the
//! result. Results are cached per normalized query.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{deduplicate, rank, validate, DietaryClassifier, DietaryScorer, KeywordClassifier};
pub use models::{Budget, Candidate, RankedCandidate, SearchQuery, SearchRequest, SearchResponse};
pub use services::{ResultCache, SearchError, SearchService};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let query = SearchQuery::new("Austin").with_budget(Budget::Mid);
        assert_eq!(query.budget.map(|b| b.allowed_tiers()), Some(&[2u8, 3][..]));
    }
}
