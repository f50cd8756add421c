//! In-memory providers (testing and benchmarks)
//!
//! Provides `StaticGeocoder`, `StaticDiscovery`, `StaticDetails` and
//! `StaticDietaryInfo` that satisfy the provider contracts without network
//! access. Each one counts the calls it receives.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::models::{Candidate, DetailRecord, DietaryInfo, DiscoveryFilters, EnrichedCandidate, ResolvedLocation};
use crate::services::providers::{
    DetailsProvider, DietaryInfoProvider, DiscoveryProvider, GeocodeProvider, ProviderError,
};

// ---------------------------------------------------------------------------
// StaticGeocoder
// ---------------------------------------------------------------------------

/// Resolves every location to the same point, or always fails
#[derive(Debug, Default)]
pub struct StaticGeocoder {
    location: Option<ResolvedLocation>,
    calls: AtomicUsize,
}

impl StaticGeocoder {
    pub fn new(location: ResolvedLocation) -> Self {
        Self {
            location: Some(location),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn at(name: &str, latitude: f64, longitude: f64) -> Self {
        Self::new(ResolvedLocation {
            name: name.to_string(),
            latitude,
            longitude,
            bounds: None,
        })
    }

    /// A geocoder that reports every location as unknown
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeocodeProvider for StaticGeocoder {
    async fn resolve(&self, location: &str) -> Result<ResolvedLocation, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.location
            .clone()
            .ok_or_else(|| ProviderError::NotFound(format!("Location not found: {}", location)))
    }
}

// ---------------------------------------------------------------------------
// StaticDiscovery
// ---------------------------------------------------------------------------

/// Returns a fixed candidate list
#[derive(Debug, Default)]
pub struct StaticDiscovery {
    candidates: Vec<Candidate>,
    failure: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticDiscovery {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Sleep before answering, to widen race windows in tests
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscoveryProvider for StaticDiscovery {
    async fn find_nearby(
        &self,
        _latitude: f64,
        _longitude: f64,
        _radius_m: u32,
        _filters: &DiscoveryFilters,
    ) -> Result<Vec<Candidate>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(message) => Err(ProviderError::ApiError(message.clone())),
            None => Ok(self.candidates.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// StaticDetails
// ---------------------------------------------------------------------------

/// Serves detail records by place id
///
/// Ids marked failing return an error, ids marked panicking panic inside the
/// provider call. Unknown ids are reported as not found.
#[derive(Debug, Default)]
pub struct StaticDetails {
    records: HashMap<String, DetailRecord>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    calls: AtomicUsize,
}

impl StaticDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, place_id: &str, record: DetailRecord) -> Self {
        self.records.insert(place_id.to_string(), record);
        self
    }

    pub fn failing_for(mut self, place_id: &str) -> Self {
        self.failing.insert(place_id.to_string());
        self
    }

    pub fn panicking_for(mut self, place_id: &str) -> Self {
        self.panicking.insert(place_id.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DetailsProvider for StaticDetails {
    async fn fetch_details(&self, place_id: &str) -> Result<DetailRecord, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panicking.contains(place_id) {
            panic!("details provider crashed for {}", place_id);
        }
        if self.failing.contains(place_id) {
            return Err(ProviderError::ApiError(format!("details unavailable for {}", place_id)));
        }
        self.records
            .get(place_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("Place not found: {}", place_id)))
    }
}

// ---------------------------------------------------------------------------
// StaticDietaryInfo
// ---------------------------------------------------------------------------

/// Serves menu and allergen data by place id; unknown ids get empty info
#[derive(Debug, Default)]
pub struct StaticDietaryInfo {
    info: HashMap<String, DietaryInfo>,
}

impl StaticDietaryInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_info(mut self, place_id: &str, info: DietaryInfo) -> Self {
        self.info.insert(place_id.to_string(), info);
        self
    }
}

#[async_trait]
impl DietaryInfoProvider for StaticDietaryInfo {
    async fn fetch_dietary_info(&self, venue: &EnrichedCandidate) -> Result<DietaryInfo, ProviderError> {
        Ok(self.info.get(venue.id()).cloned().unwrap_or_default())
    }
}
