// Unit tests for Dine Algo

use dine_algo::core::{
    dedup_key, deduplicate, haversine_distance_m, rank, validate, DietaryClassifier, DietaryScorer,
    KeywordClassifier,
};
use dine_algo::core::ranking::{budget_score, score_breakdown};
use dine_algo::models::{
    AssessedCandidate, Budget, Candidate, DietaryAssessment, DietarySet, EnrichedCandidate, MenuItem,
    RankingPreferences, ValidatedCandidate, ValidationResult, normalize_dietary,
};

fn candidate(id: &str, name: &str, lat: f64, lon: f64) -> Candidate {
    Candidate {
        id: id.to_string(),
        name: Some(name.to_string()),
        latitude: Some(lat),
        longitude: Some(lon),
        rating: Some(4.0),
        review_count: 40,
        price_tier: Some(2),
        open_now: None,
        vicinity: Some("Main St".to_string()),
        types: vec![],
        photos: vec![],
    }
}

fn validated(candidate: Candidate, score: u8) -> ValidatedCandidate {
    ValidatedCandidate {
        venue: EnrichedCandidate::degraded(candidate),
        dietary: DietaryAssessment {
            score,
            suitable_items: vec![],
            warnings: vec![],
        },
        validation: ValidationResult {
            is_valid: true,
            errors: vec![],
            warnings: vec![],
        },
    }
}

#[test]
fn test_haversine_one_degree_latitude() {
    let d = haversine_distance_m(0.0, 0.0, 1.0, 0.0);
    assert!((d - 111_195.0).abs() < 100.0);
}

#[test]
fn test_joes_pizza_collapses() {
    let a = candidate("a", "Joe's Pizza", 40.712_81, -74.006_01);
    let b = candidate("b", "joes pizza!!", 40.712_84, -74.006_03);
    assert_eq!(dedup_key(&a), dedup_key(&b));

    let unique = deduplicate(vec![a, b]);
    assert_eq!(unique.len(), 1);
    assert_eq!(unique[0].id, "a");
}

#[test]
fn test_dedup_idempotent_on_mixed_input() {
    let input = vec![
        candidate("1", "Alpha", 1.0, 1.0),
        candidate("2", "Beta", 1.0, 1.0),
        candidate("3", "ALPHA", 1.00001, 1.0),
        candidate("4", "Alpha", 2.0, 1.0),
    ];
    let once = deduplicate(input);
    let twice = deduplicate(once.clone());
    assert_eq!(once, twice);
    let ids: Vec<&str> = once.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "4"]);
}

#[test]
fn test_score_always_in_bounds() {
    let scorer = DietaryScorer::default();
    let tag_sets: Vec<DietarySet> = vec![
        DietarySet::new(),
        normalize_dietary(["vegan"]),
        normalize_dietary(["peanuts", "dairy", "gluten", "eggs", "soy"]),
    ];

    let mut venue = EnrichedCandidate::degraded(candidate("x", "X", 0.0, 0.0));
    venue.allergen_info = vec!["Peanuts".into(), "dairy".into(), "gluten".into(), "soy".into()];
    venue.menu_items = vec![MenuItem::new("Cheese toast", Some("butter and wheat bread"))];

    for tags in &tag_sets {
        let assessment = scorer.score_candidate(&venue, tags);
        assert!(assessment.score <= 100);
    }

    let all = scorer.score_candidate(&venue, &tag_sets[2]);
    assert_eq!(all.score, 0);
}

#[test]
fn test_keyword_classifier_permissive_default() {
    let classifier = KeywordClassifier;
    let item = MenuItem::new("House salad", None);
    assert!(classifier.is_item_suitable(&item, &normalize_dietary(["halal"])));
    assert!(classifier.is_allergen("shellfish"));
    assert!(!classifier.is_allergen("vegan"));
}

#[test]
fn test_budget_scenarios() {
    assert_eq!(budget_score(Some(2), Some(Budget::Mid)), 20.0);
    assert_eq!(budget_score(Some(1), Some(Budget::Upscale)), 10.0);
    assert_eq!(budget_score(Some(3), None), 0.0);
}

#[test]
fn test_relevance_reference_case() {
    let mut c = candidate("a", "A", 0.0, 0.0);
    c.rating = Some(4.5);
    c.review_count = 120;
    c.price_tier = Some(2);
    let v = validated(c, 100);

    let prefs = RankingPreferences {
        budget: Some(Budget::Mid),
        max_distance_m: None,
    };
    assert_eq!(score_breakdown(&v, &prefs).total(), 87);
}

#[test]
fn test_rank_is_dense_and_non_increasing() {
    let candidates: Vec<ValidatedCandidate> = (0..10)
        .map(|i| {
            let mut c = candidate(&i.to_string(), "V", 0.0, 0.0);
            c.rating = Some(f64::from(i % 5));
            c.review_count = i * 13;
            validated(c, (i * 10) as u8)
        })
        .collect();

    let ranked = rank(candidates, &RankingPreferences::default());
    let ranks: Vec<u32> = ranked.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, (1..=10).collect::<Vec<u32>>());
    assert!(ranked.windows(2).all(|w| w[0].relevance_score >= w[1].relevance_score));
}

#[test]
fn test_validate_excludes_unnamed_and_unlocated() {
    let scorer = DietaryScorer::default();
    let none = DietarySet::new();

    let mut nameless = candidate("n", "", 0.0, 0.0);
    nameless.name = None;
    let mut unlocated = candidate("u", "U", 0.0, 0.0);
    unlocated.longitude = None;
    let ok = candidate("ok", "Ok", 0.0, 0.0);

    let assessed: Vec<AssessedCandidate> = scorer.assess_all(
        vec![
            EnrichedCandidate::degraded(nameless),
            EnrichedCandidate::degraded(unlocated),
            EnrichedCandidate::degraded(ok),
        ],
        &none,
    );

    let valid = validate(assessed);
    assert_eq!(valid.len(), 1);
    assert_eq!(valid[0].venue.id(), "ok");
}
