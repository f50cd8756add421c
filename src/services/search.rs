use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::core::{calculate_bounding_box, deduplicate, haversine_distance_m, rank, validate, DietaryScorer};
use crate::models::{
    Candidate, DetailRecord, DiscoveryFilters, EnrichedCandidate, RankingPreferences, ResolvedLocation,
    SearchQuery, SearchResponse,
};
use crate::services::cache::{cache_key, ResultCache, DEFAULT_TTL};
use crate::services::providers::{
    DetailsProvider, DietaryInfoProvider, DiscoveryProvider, GeocodeProvider, ProviderError,
};

/// Default cap on discovered candidates sent to enrichment
pub const DEFAULT_MAX_CANDIDATES: usize = 20;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Geocode,
    Discover,
    Enrich,
    Score,
    Dedup,
    Validate,
    Rank,
    CacheStore,
    Respond,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Geocode => "geocode",
            Stage::Discover => "discover",
            Stage::Enrich => "enrich",
            Stage::Score => "score",
            Stage::Dedup => "dedup",
            Stage::Validate => "validate",
            Stage::Rank => "rank",
            Stage::CacheStore => "cache-store",
            Stage::Respond => "respond",
        };
        f.write_str(name)
    }
}

/// Errors returned to callers of [`SearchService`]
///
/// Cloneable so that one failed cache population can be handed to every
/// request waiting on the same key.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Search failed during {stage}: {source}")]
    Upstream {
        stage: Stage,
        #[source]
        source: Arc<ProviderError>,
    },
}

impl SearchError {
    fn upstream(stage: Stage, err: ProviderError) -> Self {
        tracing::error!("Upstream {} call failed: {}", stage, err);
        SearchError::Upstream {
            stage,
            source: Arc::new(err),
        }
    }

    /// Whether the upstream reported the requested resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SearchError::Upstream { source, .. } if matches!(**source, ProviderError::NotFound(_))
        )
    }
}

/// Tunables of the search pipeline
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub max_candidates: usize,
    pub cache_ttl: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_candidates: DEFAULT_MAX_CANDIDATES,
            cache_ttl: DEFAULT_TTL,
        }
    }
}

/// Runs a search end to end
///
/// # Pipeline Stages
/// 1. Geocode the location (fatal on failure)
/// 2. Discover nearby venues (fatal on failure), capped to the top N
/// 3. Enrich each venue concurrently; failures leave it degraded
/// 4. Dietary scoring
/// 5. Dedup
/// 6. Validation
/// 7. Ranking
/// 8. Cache store
pub struct SearchService {
    geocoder: Arc<dyn GeocodeProvider>,
    discovery: Arc<dyn DiscoveryProvider>,
    details: Arc<dyn DetailsProvider>,
    dietary_info: Option<Arc<dyn DietaryInfoProvider>>,
    scorer: DietaryScorer,
    cache: ResultCache<Arc<SearchResponse>>,
    options: SearchOptions,
}

impl SearchService {
    pub fn new(
        geocoder: Arc<dyn GeocodeProvider>,
        discovery: Arc<dyn DiscoveryProvider>,
        details: Arc<dyn DetailsProvider>,
        cache: ResultCache<Arc<SearchResponse>>,
    ) -> Self {
        let options = SearchOptions {
            cache_ttl: cache.default_ttl(),
            ..SearchOptions::default()
        };

        Self {
            geocoder,
            discovery,
            details,
            dietary_info: None,
            scorer: DietaryScorer::default(),
            cache,
            options,
        }
    }

    pub fn with_dietary_info(mut self, provider: Arc<dyn DietaryInfoProvider>) -> Self {
        self.dietary_info = Some(provider);
        self
    }

    pub fn with_scorer(mut self, scorer: DietaryScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn cache(&self) -> &ResultCache<Arc<SearchResponse>> {
        &self.cache
    }

    /// Search for restaurants, serving from cache when possible
    ///
    /// Concurrent identical queries share one pipeline run. Failures are
    /// never cached.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError> {
        if query.location.trim().is_empty() {
            return Err(SearchError::InvalidQuery("location is required".to_string()));
        }
        if !(0.0..=5.0).contains(&query.min_rating) {
            return Err(SearchError::InvalidQuery(format!(
                "minRating must be between 0 and 5, got {}",
                query.min_rating
            )));
        }

        let key = cache_key(query);
        let span = tracing::info_span!("search", request_id = %uuid::Uuid::new_v4());

        async move {
            if let Some(hit) = self.cache.get(&key).await {
                tracing::info!("Serving cached results for {}", key);
                return Ok(hit.as_cached());
            }

            let (payload, computed) = self
                .cache
                .get_or_try_insert_with(&key, self.options.cache_ttl, async {
                    self.run_pipeline(query).await.map(Arc::new)
                })
                .await
                .map_err(|e| (*e).clone())?;

            if computed {
                tracing::debug!("Stage {}: stored {}", Stage::CacheStore, key);
                tracing::info!(
                    "Returning {} restaurants for {}",
                    payload.total_results,
                    query.location
                );
                Ok((*payload).clone())
            } else {
                tracing::info!("Joined in-flight search for {}", key);
                Ok(payload.as_cached())
            }
        }
        .instrument(span)
        .await
    }

    /// Execute every stage without touching the cache
    pub async fn run_pipeline(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError> {
        let location = self.geocode(query).await?;
        let discovered = self.discover(&location, query).await?;

        let capped = cap_candidates(discovered, self.options.max_candidates);
        let enriched = self.enrich(&location, capped).await;

        let assessed = self.scorer.assess_all(enriched, &query.dietary);
        tracing::debug!("Stage {}: {} candidates", Stage::Score, assessed.len());

        let unique = deduplicate(assessed);
        tracing::debug!("Stage {}: {} candidates", Stage::Dedup, unique.len());

        let valid = validate(unique);
        tracing::debug!("Stage {}: {} candidates", Stage::Validate, valid.len());

        let ranked = rank(valid, &RankingPreferences::from(query));
        tracing::debug!("Stage {}: {} candidates", Stage::Rank, ranked.len());

        Ok(SearchResponse {
            location,
            total_results: ranked.len(),
            restaurants: ranked,
            timestamp: Utc::now(),
            cached: false,
        })
    }

    /// Resolve the query location; falls back to a radius box for bounds
    pub async fn geocode(&self, query: &SearchQuery) -> Result<ResolvedLocation, SearchError> {
        let mut location = self
            .geocoder
            .resolve(&query.location)
            .await
            .map_err(|e| SearchError::upstream(Stage::Geocode, e))?;

        if location.bounds.is_none() {
            location.bounds = Some(calculate_bounding_box(
                location.latitude,
                location.longitude,
                f64::from(query.radius_m),
            ));
        }

        tracing::debug!(
            "Stage {}: {} -> ({}, {})",
            Stage::Geocode,
            query.location,
            location.latitude,
            location.longitude
        );
        Ok(location)
    }

    pub async fn discover(
        &self,
        location: &ResolvedLocation,
        query: &SearchQuery,
    ) -> Result<Vec<Candidate>, SearchError> {
        let filters = DiscoveryFilters {
            budget: query.budget,
            min_rating: query.min_rating,
        };

        let candidates = self
            .discovery
            .find_nearby(location.latitude, location.longitude, query.radius_m, &filters)
            .await
            .map_err(|e| SearchError::upstream(Stage::Discover, e))?;

        tracing::debug!("Stage {}: {} candidates", Stage::Discover, candidates.len());
        Ok(candidates)
    }

    /// Fetch details for every candidate concurrently
    ///
    /// Output order matches input order. A failed or crashed fetch leaves
    /// that candidate as discovered; siblings are unaffected.
    pub async fn enrich(&self, origin: &ResolvedLocation, candidates: Vec<Candidate>) -> Vec<EnrichedCandidate> {
        let mut slots: Vec<EnrichedCandidate> = candidates
            .iter()
            .cloned()
            .map(EnrichedCandidate::degraded)
            .collect();

        let mut join_set = JoinSet::new();
        for (idx, candidate) in candidates.into_iter().enumerate() {
            let details = Arc::clone(&self.details);
            let dietary_info = self.dietary_info.clone();
            join_set.spawn(
                async move { (idx, enrich_one(details, dietary_info, candidate).await) }.in_current_span(),
            );
        }

        let mut degraded = 0;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, Some(enriched))) => slots[idx] = enriched,
                Ok((_, None)) => degraded += 1,
                Err(e) => {
                    degraded += 1;
                    tracing::warn!("Enrichment task failed, keeping candidate as discovered: {}", e);
                }
            }
        }

        for venue in &mut slots {
            venue.distance_m = venue
                .candidate
                .coordinates()
                .map(|(lat, lon)| haversine_distance_m(origin.latitude, origin.longitude, lat, lon));
        }

        tracing::debug!(
            "Stage {}: {} candidates ({} degraded)",
            Stage::Enrich,
            slots.len(),
            degraded
        );
        slots
    }

    /// Raw detail record of one venue
    pub async fn details(&self, place_id: &str) -> Result<DetailRecord, SearchError> {
        self.details
            .fetch_details(place_id)
            .await
            .map_err(|e| SearchError::upstream(Stage::Enrich, e))
    }
}

/// Keep the first `max` discovered candidates
pub fn cap_candidates(mut candidates: Vec<Candidate>, max: usize) -> Vec<Candidate> {
    if candidates.len() > max {
        tracing::debug!("Capping {} discovered candidates to {}", candidates.len(), max);
        candidates.truncate(max);
    }
    candidates
}

/// Enrich one candidate; `None` when the detail fetch failed
async fn enrich_one(
    details: Arc<dyn DetailsProvider>,
    dietary_info: Option<Arc<dyn DietaryInfoProvider>>,
    candidate: Candidate,
) -> Option<EnrichedCandidate> {
    let record = match details.fetch_details(&candidate.id).await {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Failed to fetch details for {}: {}", candidate.display_name(), e);
            return None;
        }
    };

    let mut enriched = EnrichedCandidate::with_details(candidate, record);

    if let Some(provider) = dietary_info {
        match provider.fetch_dietary_info(&enriched).await {
            Ok(info) => enriched.merge_dietary_info(info),
            Err(e) => tracing::warn!("Failed to fetch dietary info for {}: {}", enriched.id(), e),
        }
    }

    Some(enriched)
}
