use crate::models::{AssessedCandidate, EnrichedCandidate, ValidatedCandidate, ValidationResult};

/// Check a venue for required fields and data quality
///
/// Missing name or coordinates are fatal. A missing or out-of-range rating
/// and a missing address only produce warnings.
pub fn validate_candidate(venue: &EnrichedCandidate) -> ValidationResult {
    let mut result = ValidationResult {
        is_valid: true,
        ..ValidationResult::default()
    };
    let candidate = &venue.candidate;

    if candidate.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
        result.is_valid = false;
        result.errors.push("Missing name".to_string());
    }

    if candidate.coordinates().is_none() {
        result.is_valid = false;
        result.errors.push("Missing location coordinates".to_string());
    }

    match candidate.rating {
        Some(rating) if (1.0..=5.0).contains(&rating) => {}
        _ => result.warnings.push("Invalid or missing rating".to_string()),
    }

    if venue.address.as_deref().map_or(true, |a| a.trim().is_empty()) {
        result.warnings.push("Missing address".to_string());
    }

    result
}

/// Drop invalid candidates and attach validation metadata to the rest
pub fn validate(candidates: Vec<AssessedCandidate>) -> Vec<ValidatedCandidate> {
    candidates
        .into_iter()
        .filter_map(|AssessedCandidate { venue, dietary }| {
            let validation = validate_candidate(&venue);
            if validation.is_valid {
                Some(ValidatedCandidate {
                    venue,
                    dietary,
                    validation,
                })
            } else {
                tracing::debug!(
                    "Excluding candidate {}: {}",
                    venue.id(),
                    validation.errors.join(", ")
                );
                None
            }
        })
        .collect()
}
