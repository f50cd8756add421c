// Core algorithm exports
pub mod dedup;
pub mod dietary;
pub mod distance;
pub mod ranking;
pub mod validation;

pub use dedup::{dedup_key, deduplicate, normalize_name};
pub use dietary::{analyze_menu, DietaryClassifier, DietaryScorer, KeywordClassifier, MenuAnalysis};
pub use distance::{calculate_bounding_box, haversine_distance_m};
pub use ranking::{rank, score_breakdown, ScoreBreakdown};
pub use validation::{validate, validate_candidate};
