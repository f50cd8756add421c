use crate::models::{AssessedCandidate, DietaryAssessment, DietarySet, EnrichedCandidate, MenuItem};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Allergen tag -> substrings indicating its presence
const ALLERGEN_KEYWORDS: &[(&str, &[&str])] = &[
    ("peanuts", &["peanut", "pnut", "arachis oil"]),
    ("tree nuts", &["almond", "walnut", "cashew", "pistachio", "pecan", "hazelnut"]),
    ("dairy", &["milk", "cheese", "butter", "cream", "lactose"]),
    ("gluten", &["wheat", "barley", "rye", "gluten"]),
    ("soy", &["soy", "soybean", "edamame"]),
    ("shellfish", &["shrimp", "crab", "lobster", "oyster", "clam", "mussel"]),
    ("fish", &["salmon", "tuna", "cod", "anchovies"]),
    ("eggs", &["egg", "mayonnaise"]),
];

/// Diet category tag -> substrings indicating suitability
const DIETARY_KEYWORDS: &[(&str, &[&str])] = &[
    ("vegan", &["plant-based", "no animal products"]),
    ("vegetarian", &["no meat", "meatless"]),
    ("pescatarian", &["no meat", "fish allowed"]),
    ("keto", &["low carb", "high fat", "no sugar"]),
    ("paleo", &["no grain", "no dairy", "no processed"]),
];

const ALLERGEN_PENALTY: u8 = 40;
const NO_SUITABLE_ITEMS_PENALTY: u8 = 50;

/// Classifies menu text against dietary restrictions
///
/// The keyword heuristic is the default; a model-backed classifier can be
/// plugged into [`DietaryScorer::with_classifier`] without touching the
/// ranking or dedup stages.
pub trait DietaryClassifier: Send + Sync + fmt::Debug {
    /// Whether `tag` names an allergen this classifier knows about
    fn is_allergen(&self, tag: &str) -> bool;

    /// Whether a menu item is compatible with all requested restrictions
    fn is_item_suitable(&self, item: &MenuItem, restrictions: &DietarySet) -> bool;
}

/// Substring matching over fixed allergen and diet category tables
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    fn allergen_keywords(tag: &str) -> Option<&'static [&'static str]> {
        ALLERGEN_KEYWORDS
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, keywords)| *keywords)
    }

    fn dietary_keywords(tag: &str) -> Option<&'static [&'static str]> {
        DIETARY_KEYWORDS
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, keywords)| *keywords)
    }
}

impl DietaryClassifier for KeywordClassifier {
    fn is_allergen(&self, tag: &str) -> bool {
        Self::allergen_keywords(tag).is_some()
    }

    fn is_item_suitable(&self, item: &MenuItem, restrictions: &DietarySet) -> bool {
        let text = item.search_text();

        // Allergen hits take precedence over any diet category match
        let has_allergen = restrictions
            .iter()
            .filter_map(|tag| Self::allergen_keywords(tag))
            .any(|keywords| keywords.iter().any(|k| text.contains(k)));
        if has_allergen {
            return false;
        }

        let diet_match = restrictions
            .iter()
            .filter_map(|tag| Self::dietary_keywords(tag))
            .any(|keywords| keywords.iter().any(|k| text.contains(k)));
        if diet_match {
            return true;
        }

        // Permissive default: nothing matched either table
        true
    }
}

/// Allergens detected across a menu
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuAnalysis {
    pub detected_allergens: Vec<String>,
    pub risk_items: Vec<String>,
}

/// Rates candidates for compatibility with requested dietary restrictions
#[derive(Debug, Clone)]
pub struct DietaryScorer {
    classifier: Arc<dyn DietaryClassifier>,
}

impl DietaryScorer {
    pub fn new() -> Self {
        Self::with_classifier(Arc::new(KeywordClassifier))
    }

    pub fn with_classifier(classifier: Arc<dyn DietaryClassifier>) -> Self {
        Self { classifier }
    }

    pub fn is_item_suitable(&self, item: &MenuItem, restrictions: &DietarySet) -> bool {
        self.classifier.is_item_suitable(item, restrictions)
    }

    /// Score one candidate (0-100) against the requested restrictions
    ///
    /// Each declared allergen the user avoids costs 40 points; a menu with no
    /// suitable item costs 50 when anything was requested. Floored at 0.
    pub fn score_candidate(
        &self,
        candidate: &EnrichedCandidate,
        restrictions: &DietarySet,
    ) -> DietaryAssessment {
        let mut score: u8 = 100;
        let mut warnings = Vec::new();

        let suitable_items: Vec<String> = candidate
            .menu_items
            .iter()
            .filter(|item| self.is_item_suitable(item, restrictions))
            .map(|item| item.name.clone())
            .collect();

        let declared: Vec<String> = candidate
            .allergen_info
            .iter()
            .map(|a| a.to_lowercase())
            .collect();

        for tag in restrictions {
            if !self.classifier.is_allergen(tag) {
                continue;
            }
            if declared.iter().any(|d| d.contains(tag.as_str())) {
                score = score.saturating_sub(ALLERGEN_PENALTY);
                warnings.push(format!("Allergen warning: {} may be present", tag));
            }
        }

        if suitable_items.is_empty() && !restrictions.is_empty() {
            score = score.saturating_sub(NO_SUITABLE_ITEMS_PENALTY);
            warnings.push(
                "No known suitable items found - manual verification recommended".to_string(),
            );
        }

        DietaryAssessment {
            score,
            suitable_items,
            warnings,
        }
    }

    /// Attach an assessment to every candidate, preserving order
    pub fn assess_all(
        &self,
        candidates: Vec<EnrichedCandidate>,
        restrictions: &DietarySet,
    ) -> Vec<AssessedCandidate> {
        candidates
            .into_iter()
            .map(|venue| {
                let dietary = self.score_candidate(&venue, restrictions);
                AssessedCandidate { venue, dietary }
            })
            .collect()
    }
}

impl Default for DietaryScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan item descriptions for every allergen in the keyword table
pub fn analyze_menu(items: &[MenuItem]) -> MenuAnalysis {
    let mut analysis = MenuAnalysis::default();

    for item in items {
        let Some(description) = item.description.as_deref() else {
            continue;
        };
        let text = description.to_lowercase();

        for (allergen, keywords) in ALLERGEN_KEYWORDS {
            if keywords.iter().any(|k| text.contains(k)) {
                if !analysis.detected_allergens.iter().any(|a| a == allergen) {
                    analysis.detected_allergens.push(allergen.to_string());
                }
                if !analysis.risk_items.contains(&item.name) {
                    analysis.risk_items.push(item.name.clone());
                }
            }
        }
    }

    analysis
}
