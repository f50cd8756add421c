use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Normalized set of requested dietary restriction tags (lowercase, trimmed)
pub type DietarySet = BTreeSet<String>;

/// Default search radius in meters
pub const DEFAULT_RADIUS_M: u32 = 5000;

/// Requested price band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    Budget,
    Mid,
    Upscale,
}

impl Budget {
    /// Price tiers that count as an exact match for this band
    pub fn allowed_tiers(self) -> &'static [u8] {
        match self {
            Budget::Budget => &[1],
            Budget::Mid => &[2, 3],
            Budget::Upscale => &[4],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Budget::Budget => "budget",
            Budget::Mid => "mid",
            Budget::Upscale => "upscale",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "budget" => Some(Budget::Budget),
            "mid" => Some(Budget::Mid),
            "upscale" => Some(Budget::Upscale),
            _ => None,
        }
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw venue record as returned by nearby discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub price_tier: Option<u8>,
    #[serde(default)]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl Candidate {
    /// Both coordinates, if present and finite
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A single menu entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            name: name.into(),
            description: description.map(str::to_string),
            price: None,
        }
    }

    /// Lowercased name and description, the text keyword heuristics run over
    pub fn search_text(&self) -> String {
        format!(
            "{} {}",
            self.name,
            self.description.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}

/// Per-venue detail lookup result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRecord {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub opening_hours: Vec<String>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(default)]
    pub allergen_info: Vec<String>,
}

/// Menu and allergen declarations from a dietary information source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietaryInfo {
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(default)]
    pub allergen_info: Vec<String>,
}

/// Candidate with whatever detail data could be fetched for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Vec<String>,
    pub menu_items: Vec<MenuItem>,
    pub allergen_info: Vec<String>,
    pub distance_m: Option<f64>,
}

impl EnrichedCandidate {
    /// The candidate as discovered, with no detail fields merged in
    pub fn degraded(candidate: Candidate) -> Self {
        Self {
            address: candidate.vicinity.clone(),
            candidate,
            phone: None,
            website: None,
            opening_hours: Vec::new(),
            menu_items: Vec::new(),
            allergen_info: Vec::new(),
            distance_m: None,
        }
    }

    /// Merge a successful detail lookup over the discovery record
    pub fn with_details(candidate: Candidate, details: DetailRecord) -> Self {
        let mut enriched = Self::degraded(candidate);
        if details.address.is_some() {
            enriched.address = details.address;
        }
        enriched.phone = details.phone;
        enriched.website = details.website;
        enriched.opening_hours = details.opening_hours;
        enriched.menu_items = details.menu_items;
        enriched.allergen_info = details.allergen_info;
        enriched
    }

    /// Overlay menu and allergen data; empty fields leave existing data alone
    pub fn merge_dietary_info(&mut self, info: DietaryInfo) {
        if !info.menu_items.is_empty() {
            self.menu_items = info.menu_items;
        }
        if !info.allergen_info.is_empty() {
            self.allergen_info = info.allergen_info;
        }
    }

    pub fn id(&self) -> &str {
        &self.candidate.id
    }
}

/// Dietary compatibility of one venue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietaryAssessment {
    #[serde(rename = "dietaryScore")]
    pub score: u8,
    pub suitable_items: Vec<String>,
    #[serde(rename = "dietaryWarnings")]
    pub warnings: Vec<String>,
}

/// Enriched candidate after dietary scoring
#[derive(Debug, Clone, PartialEq)]
pub struct AssessedCandidate {
    pub venue: EnrichedCandidate,
    pub dietary: DietaryAssessment,
}

/// Outcome of structural validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Assessed candidate that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCandidate {
    pub venue: EnrichedCandidate,
    pub dietary: DietaryAssessment,
    pub validation: ValidationResult,
}

/// Final ranked result entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub venue: EnrichedCandidate,
    #[serde(flatten)]
    pub dietary: DietaryAssessment,
    pub validation: ValidationResult,
    pub relevance_score: u32,
    pub rank: u32,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Geocoded search location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub bounds: Option<BoundingBox>,
}

/// Normalized search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub location: String,
    pub budget: Option<Budget>,
    pub dietary: DietarySet,
    pub min_rating: f64,
    pub radius_m: u32,
}

impl SearchQuery {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            budget: None,
            dietary: DietarySet::new(),
            min_rating: 0.0,
            radius_m: DEFAULT_RADIUS_M,
        }
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_dietary<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dietary = normalize_dietary(tags);
        self
    }

    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = min_rating;
        self
    }

    pub fn with_radius(mut self, radius_m: u32) -> Self {
        self.radius_m = radius_m;
        self
    }
}

/// Lowercase, trim and drop empty tags
pub fn normalize_dietary<I, S>(tags: I) -> DietarySet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Provider-side discovery filters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiscoveryFilters {
    pub budget: Option<Budget>,
    pub min_rating: f64,
}

/// Preferences the ranking stage scores against
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RankingPreferences {
    pub budget: Option<Budget>,
    pub max_distance_m: Option<f64>,
}

impl From<&SearchQuery> for RankingPreferences {
    fn from(query: &SearchQuery) -> Self {
        Self {
            budget: query.budget,
            max_distance_m: Some(f64::from(query.radius_m)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Candidate {
        Candidate {
            id: "p1".to_string(),
            name: Some("Luigi's".to_string()),
            latitude: Some(40.7),
            longitude: Some(-74.0),
            rating: Some(4.2),
            review_count: 10,
            price_tier: Some(2),
            open_now: Some(true),
            vicinity: Some("1 Main St".to_string()),
            types: vec![],
            photos: vec![],
        }
    }

    #[test]
    fn test_budget_parse() {
        assert_eq!(Budget::parse(" Mid "), Some(Budget::Mid));
        assert_eq!(Budget::parse("cheap"), None);
    }

    #[test]
    fn test_degraded_keeps_vicinity_as_address() {
        let enriched = EnrichedCandidate::degraded(candidate());
        assert_eq!(enriched.address.as_deref(), Some("1 Main St"));
        assert!(enriched.website.is_none());
    }

    #[test]
    fn test_details_override_address() {
        let details = DetailRecord {
            address: Some("1 Main Street, New York".to_string()),
            website: Some("https://luigis.example".to_string()),
            ..DetailRecord::default()
        };
        let enriched = EnrichedCandidate::with_details(candidate(), details);
        assert_eq!(enriched.address.as_deref(), Some("1 Main Street, New York"));
        assert_eq!(enriched.website.as_deref(), Some("https://luigis.example"));
    }

    #[test]
    fn test_normalize_dietary() {
        let tags = normalize_dietary(["Vegan", " dairy ", "", "vegan"]);
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["dairy", "vegan"]);
    }

    #[test]
    fn test_coordinates_require_both() {
        let mut c = candidate();
        c.longitude = None;
        assert!(c.coordinates().is_none());
        c.longitude = Some(f64::NAN);
        assert!(c.coordinates().is_none());
    }
}
