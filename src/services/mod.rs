// Service exports
pub mod cache;
pub mod fakes;
pub mod places;
pub mod providers;
pub mod search;

pub use cache::{cache_key, spawn_cache_sweeper, CacheStats, ResultCache, DEFAULT_TTL};
pub use places::GooglePlacesClient;
pub use providers::{DetailsProvider, DietaryInfoProvider, DiscoveryProvider, GeocodeProvider, ProviderError};
pub use search::{SearchError, SearchOptions, SearchService, Stage};
