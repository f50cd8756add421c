use crate::models::{Budget, RankedCandidate, RankingPreferences, ValidatedCandidate};

const RATING_WEIGHT: f64 = 30.0;
const DIETARY_WEIGHT: f64 = 30.0;
const BUDGET_WEIGHT: f64 = 20.0;
const REVIEWS_WEIGHT: f64 = 10.0;
const DISTANCE_WEIGHT: f64 = 10.0;

/// Review count at which the review volume factor saturates
const REVIEW_SATURATION: f64 = 100.0;

/// Per-factor breakdown of a relevance score
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub rating: f64,
    pub dietary: f64,
    pub budget: f64,
    pub reviews: f64,
    pub distance: f64,
}

impl ScoreBreakdown {
    /// Sum of all factors, rounded to the nearest integer
    pub fn total(&self) -> u32 {
        let sum = self.rating + self.dietary + self.budget + self.reviews + self.distance;
        sum.round().max(0.0) as u32
    }
}

/// Rating factor (0-30), zero when the venue has no rating
#[inline]
pub fn rating_score(rating: Option<f64>) -> f64 {
    match rating {
        Some(r) if r.is_finite() => (r.clamp(0.0, 5.0) / 5.0) * RATING_WEIGHT,
        _ => 0.0,
    }
}

/// Dietary factor (0-30)
#[inline]
pub fn dietary_score(score: u8) -> f64 {
    (f64::from(score.min(100)) / 100.0) * DIETARY_WEIGHT
}

/// 1.0 when the tier is inside the requested band, 0.5 otherwise
#[inline]
pub fn budget_match(price_tier: Option<u8>, budget: Budget) -> f64 {
    match price_tier {
        Some(tier) if budget.allowed_tiers().contains(&tier) => 1.0,
        _ => 0.5,
    }
}

/// Budget factor (0-20), zero when no budget was requested
#[inline]
pub fn budget_score(price_tier: Option<u8>, budget: Option<Budget>) -> f64 {
    budget.map_or(0.0, |b| budget_match(price_tier, b) * BUDGET_WEIGHT)
}

/// Review volume factor (0-10)
#[inline]
pub fn reviews_score(review_count: u32) -> f64 {
    (f64::from(review_count) / REVIEW_SATURATION).min(1.0) * REVIEWS_WEIGHT
}

/// Distance factor (0-10), only when both distance and radius are known
#[inline]
pub fn distance_score(distance_m: Option<f64>, max_distance_m: Option<f64>) -> f64 {
    match (distance_m, max_distance_m) {
        (Some(d), Some(max)) if max > 0.0 && d.is_finite() => {
            (1.0 - d / max).max(0.0) * DISTANCE_WEIGHT
        }
        _ => 0.0,
    }
}

/// Compute all five factors for one candidate
pub fn score_breakdown(candidate: &ValidatedCandidate, preferences: &RankingPreferences) -> ScoreBreakdown {
    let venue = &candidate.venue;
    ScoreBreakdown {
        rating: rating_score(venue.candidate.rating),
        dietary: dietary_score(candidate.dietary.score),
        budget: budget_score(venue.candidate.price_tier, preferences.budget),
        reviews: reviews_score(venue.candidate.review_count),
        distance: distance_score(venue.distance_m, preferences.max_distance_m),
    }
}

/// Score and order candidates, highest relevance first
///
/// The sort is stable: equal scores keep their input order, so ranking is
/// deterministic given the dedup and validation output. Ranks run 1..=N.
pub fn rank(candidates: Vec<ValidatedCandidate>, preferences: &RankingPreferences) -> Vec<RankedCandidate> {
    let mut scored: Vec<(u32, ValidatedCandidate)> = candidates
        .into_iter()
        .map(|c| (score_breakdown(&c, preferences).total(), c))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .enumerate()
        .map(|(idx, (relevance_score, c))| RankedCandidate {
            venue: c.venue,
            dietary: c.dietary,
            validation: c.validation,
            relevance_score,
            rank: idx as u32 + 1,
        })
        .collect()
}
