use crate::models::{AssessedCandidate, Candidate};
use std::collections::HashSet;

/// Coordinate quantization factor (4 decimal places, ~11 m)
const COORDINATE_SCALE: f64 = 10_000.0;

/// Anything that carries a discovery record can be deduplicated
pub trait HasCandidate {
    fn candidate(&self) -> &Candidate;
}

impl HasCandidate for Candidate {
    fn candidate(&self) -> &Candidate {
        self
    }
}

impl HasCandidate for AssessedCandidate {
    fn candidate(&self) -> &Candidate {
        &self.venue.candidate
    }
}

/// Lowercase, then keep only alphanumeric characters
///
/// Lowercasing first matters: some characters lowercase to a letter plus a
/// combining mark ('İ' -> "i\u{307}"), and the mark must be dropped too.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

#[inline]
fn quantize(coordinate: Option<f64>) -> String {
    match coordinate {
        Some(value) if value.is_finite() => ((value * COORDINATE_SCALE).round() as i64).to_string(),
        _ => "none".to_string(),
    }
}

/// Composite identity of a physical venue
pub fn dedup_key(candidate: &Candidate) -> String {
    format!(
        "{}_{}_{}",
        normalize_name(candidate.name.as_deref().unwrap_or_default()),
        quantize(candidate.latitude),
        quantize(candidate.longitude)
    )
}

/// Keep the first candidate seen under each dedup key, in input order
pub fn deduplicate<T: HasCandidate>(candidates: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(candidates.len());
    let before = candidates.len();

    let unique: Vec<T> = candidates
        .into_iter()
        .filter(|c| seen.insert(dedup_key(c.candidate())))
        .collect();

    if unique.len() < before {
        tracing::debug!("Dedup collapsed {} duplicate candidates", before - unique.len());
    }

    unique
}
