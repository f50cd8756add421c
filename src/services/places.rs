use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::models::{BoundingBox, Budget, Candidate, DetailRecord, DiscoveryFilters, ResolvedLocation};
use crate::services::providers::{DetailsProvider, DiscoveryProvider, GeocodeProvider, ProviderError};

const DETAIL_FIELDS: &str =
    "name,formatted_address,formatted_phone_number,website,opening_hours,rating,price_level,types";

/// Google Maps Platform client
///
/// Handles all communication with Google including:
/// - Geocoding free-text locations
/// - Nearby restaurant search
/// - Per-venue place details
pub struct GooglePlacesClient {
    base_url: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct Viewport {
    northeast: LatLng,
    southwest: LatLng,
}

impl From<Viewport> for BoundingBox {
    fn from(v: Viewport) -> Self {
        BoundingBox {
            min_lat: v.southwest.lat,
            max_lat: v.northeast.lat,
            min_lon: v.southwest.lng,
            max_lon: v.northeast.lng,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: LatLng,
    #[serde(default)]
    bounds: Option<Viewport>,
    #[serde(default)]
    viewport: Option<Viewport>,
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    place_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    vicinity: Option<String>,
    #[serde(default)]
    geometry: Option<PlaceGeometry>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    user_ratings_total: Option<u32>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    photos: Vec<Photo>,
    #[serde(default)]
    opening_hours: Option<OpeningHours>,
    #[serde(default)]
    price_level: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct PlaceGeometry {
    #[serde(default)]
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    photo_reference: String,
}

#[derive(Debug, Default, Deserialize)]
struct OpeningHours {
    #[serde(default)]
    open_now: Option<bool>,
    #[serde(default)]
    weekday_text: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    result: Option<PlaceDetails>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    formatted_phone_number: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    opening_hours: Option<OpeningHours>,
}

impl From<PlaceResult> for Candidate {
    fn from(place: PlaceResult) -> Self {
        let location = place.geometry.and_then(|g| g.location);
        Candidate {
            id: place.place_id,
            name: place.name,
            latitude: location.as_ref().map(|l| l.lat),
            longitude: location.as_ref().map(|l| l.lng),
            rating: place.rating,
            review_count: place.user_ratings_total.unwrap_or(0),
            price_tier: place.price_level,
            open_now: place.opening_hours.and_then(|h| h.open_now),
            vicinity: place.vicinity,
            types: place.types,
            photos: place.photos.into_iter().map(|p| p.photo_reference).collect(),
        }
    }
}

impl From<PlaceDetails> for DetailRecord {
    fn from(details: PlaceDetails) -> Self {
        DetailRecord {
            address: details.formatted_address,
            phone: details.formatted_phone_number,
            website: details.website,
            opening_hours: details.opening_hours.unwrap_or_default().weekday_text,
            menu_items: Vec::new(),
            allergen_info: Vec::new(),
        }
    }
}

/// Provider-side filtering of nearby results
///
/// Only venues with a known, non-zero price tier are checked against the
/// budget band; venues without a rating pass the minimum rating filter.
pub fn matches_discovery_filters(candidate: &Candidate, filters: &DiscoveryFilters) -> bool {
    if let (Some(budget), Some(tier)) = (filters.budget, candidate.price_tier.filter(|t| *t > 0)) {
        let in_band = match budget {
            Budget::Budget => tier <= 2,
            Budget::Mid => (2..=3).contains(&tier),
            Budget::Upscale => tier >= 3,
        };
        if !in_band {
            return false;
        }
    }

    if let Some(rating) = candidate.rating {
        if rating < filters.min_rating {
            return false;
        }
    }

    true
}

fn api_error(operation: &str, status: &str, message: Option<String>) -> ProviderError {
    ProviderError::ApiError(format!(
        "{} returned {}{}",
        operation,
        status,
        message.map(|m| format!(": {}", m)).unwrap_or_default()
    ))
}

impl GooglePlacesClient {
    /// Create a new Google Places client
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    async fn get_json<T>(&self, path: &str, query: &str) -> Result<T, ProviderError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!(
            "{}{}?{}&key={}",
            self.base_url,
            path,
            query,
            urlencoding::encode(&self.api_key)
        );

        tracing::debug!("Requesting {}?{}", path, query);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Request to {} failed: {} - {}", path, status, body);
            return Err(ProviderError::ApiError(format!("{} returned HTTP {}", path, status)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse {}: {}", path, e)))
    }
}

#[async_trait]
impl GeocodeProvider for GooglePlacesClient {
    async fn resolve(&self, location: &str) -> Result<ResolvedLocation, ProviderError> {
        let query = format!("address={}", urlencoding::encode(location));
        let response: GeocodeResponse = self.get_json("/maps/api/geocode/json", &query).await?;

        match response.status.as_str() {
            "OK" | "" => {}
            "ZERO_RESULTS" => return Err(ProviderError::NotFound(format!("Location not found: {}", location))),
            status => return Err(api_error("Geocoding", status, response.error_message)),
        }

        let first = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NotFound(format!("Location not found: {}", location)))?;

        let geometry = first.geometry;
        Ok(ResolvedLocation {
            name: first.formatted_address,
            latitude: geometry.location.lat,
            longitude: geometry.location.lng,
            bounds: geometry.bounds.or(geometry.viewport).map(BoundingBox::from),
        })
    }
}

#[async_trait]
impl DiscoveryProvider for GooglePlacesClient {
    async fn find_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: u32,
        filters: &DiscoveryFilters,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let query = format!(
            "location={},{}&radius={}&type=restaurant",
            latitude, longitude, radius_m
        );
        let response: NearbyResponse = self.get_json("/maps/api/place/nearbysearch/json", &query).await?;

        match response.status.as_str() {
            "OK" | "ZERO_RESULTS" | "" => {}
            status => return Err(api_error("Nearby search", status, response.error_message)),
        }

        let total = response.results.len();
        let candidates: Vec<Candidate> = response
            .results
            .into_iter()
            .map(Candidate::from)
            .filter(|c| matches_discovery_filters(c, filters))
            .collect();

        tracing::debug!("Nearby search returned {} venues ({} after filters)", total, candidates.len());

        Ok(candidates)
    }
}

#[async_trait]
impl DetailsProvider for GooglePlacesClient {
    async fn fetch_details(&self, place_id: &str) -> Result<DetailRecord, ProviderError> {
        let query = format!(
            "place_id={}&fields={}",
            urlencoding::encode(place_id),
            urlencoding::encode(DETAIL_FIELDS)
        );
        let response: DetailsResponse = self.get_json("/maps/api/place/details/json", &query).await?;

        match response.status.as_str() {
            "OK" | "" => {}
            "NOT_FOUND" | "ZERO_RESULTS" => {
                return Err(ProviderError::NotFound(format!("Place not found: {}", place_id)))
            }
            status => return Err(api_error("Place details", status, response.error_message)),
        }

        response
            .result
            .map(DetailRecord::from)
            .ok_or_else(|| ProviderError::InvalidResponse("Missing result object".into()))
    }
}
