// Integration tests for the search pipeline
//
// These run the full SearchService against the in-memory providers.

use std::sync::Arc;
use std::time::Duration;

use dine_algo::models::{Budget, Candidate, DetailRecord, DietaryInfo, MenuItem, SearchQuery};
use dine_algo::services::fakes::{StaticDetails, StaticDietaryInfo, StaticDiscovery, StaticGeocoder};
use dine_algo::services::{ResultCache, SearchError, SearchOptions, SearchService, Stage, DEFAULT_TTL};

fn venue(id: &str, name: &str, lat: f64, lon: f64, rating: f64, tier: u8) -> Candidate {
    Candidate {
        id: id.to_string(),
        name: Some(name.to_string()),
        latitude: Some(lat),
        longitude: Some(lon),
        rating: Some(rating),
        review_count: 150,
        price_tier: Some(tier),
        open_now: Some(true),
        vicinity: Some(format!("{} Street", name)),
        types: vec!["restaurant".to_string()],
        photos: vec![],
    }
}

fn austin() -> Arc<StaticGeocoder> {
    Arc::new(StaticGeocoder::at("Austin, TX, USA", 30.2672, -97.7431))
}

#[tokio::test]
async fn test_dietary_search_end_to_end() {
    let discovery = Arc::new(StaticDiscovery::new(vec![
        venue("green", "Green Leaf", 30.2675, -97.7430, 4.6, 2),
        venue("nutty", "Nutty Noodle", 30.2680, -97.7435, 4.8, 2),
        venue("steak", "Prime Cut", 30.2690, -97.7440, 4.7, 4),
    ]));
    let details = StaticDetails::new()
        .with_record("green", DetailRecord::default())
        .with_record("nutty", DetailRecord::default())
        .with_record("steak", DetailRecord::default());
    let info = StaticDietaryInfo::new()
        .with_info("green", DietaryInfo {
            menu_items: vec![MenuItem::new("Buddha bowl", Some("plant-based, no animal products"))],
            allergen_info: vec![],
        })
        .with_info("nutty", DietaryInfo {
            menu_items: vec![MenuItem::new("Satay noodles", Some("peanut sauce"))],
            allergen_info: vec!["Peanuts".to_string()],
        });

    let service = SearchService::new(austin(), discovery, Arc::new(details), ResultCache::new(100, DEFAULT_TTL))
        .with_dietary_info(Arc::new(info));

    let query = SearchQuery::new("Austin, TX")
        .with_budget(Budget::Mid)
        .with_dietary(["vegan", "peanuts"]);
    let response = service.search(&query).await.unwrap();

    assert_eq!(response.total_results, 3);
    assert_eq!(response.restaurants[0].venue.id(), "green");
    assert_eq!(response.restaurants[0].dietary.score, 100);
    assert_eq!(response.restaurants[0].dietary.suitable_items, vec!["Buddha bowl"]);

    let nutty = response.restaurants.iter().find(|r| r.venue.id() == "nutty").unwrap();
    assert_eq!(nutty.dietary.score, 10);
    assert!(nutty
        .dietary
        .warnings
        .iter()
        .any(|w| w == "Allergen warning: peanuts may be present"));

    let ranks: Vec<u32> = response.restaurants.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_enrichment_failures_degrade_without_failing_request() {
    let discovery = Arc::new(StaticDiscovery::new(vec![
        venue("ok", "Good Place", 30.26, -97.74, 4.0, 2),
        venue("err", "Flaky Place", 30.27, -97.74, 4.0, 2),
        venue("boom", "Crashy Place", 30.28, -97.74, 4.0, 2),
    ]));
    let details = Arc::new(
        StaticDetails::new()
            .with_record("ok", DetailRecord {
                address: Some("1 Good Rd".to_string()),
                ..DetailRecord::default()
            })
            .failing_for("err")
            .panicking_for("boom"),
    );

    let service = SearchService::new(austin(), discovery, details.clone(), ResultCache::new(100, DEFAULT_TTL));
    let response = service.search(&SearchQuery::new("Austin")).await.unwrap();

    assert_eq!(response.total_results, 3);
    assert_eq!(details.calls(), 3);

    let crashy = response.restaurants.iter().find(|r| r.venue.id() == "boom").unwrap();
    assert_eq!(crashy.venue.address.as_deref(), Some("Crashy Place Street"));
    let good = response.restaurants.iter().find(|r| r.venue.id() == "ok").unwrap();
    assert_eq!(good.venue.address.as_deref(), Some("1 Good Rd"));
}

#[tokio::test]
async fn test_candidates_capped_before_enrichment() {
    let venues = (0..30)
        .map(|i| venue(&format!("v{}", i), &format!("Venue {}", i), 30.0 + f64::from(i) * 0.01, -97.0, 4.0, 2))
        .collect();
    let details = Arc::new(StaticDetails::new());

    let service = SearchService::new(
        austin(),
        Arc::new(StaticDiscovery::new(venues)),
        details.clone(),
        ResultCache::new(100, DEFAULT_TTL),
    )
    .with_options(SearchOptions {
        max_candidates: 20,
        cache_ttl: DEFAULT_TTL,
    });

    let response = service.search(&SearchQuery::new("Austin")).await.unwrap();
    assert_eq!(response.total_results, 20);
    assert_eq!(details.calls(), 20);
}

#[tokio::test]
async fn test_repeated_query_served_from_cache() {
    let discovery = Arc::new(StaticDiscovery::new(vec![venue("a", "A", 30.26, -97.74, 4.0, 2)]));
    let service = SearchService::new(
        austin(),
        discovery.clone(),
        Arc::new(StaticDetails::new()),
        ResultCache::new(100, DEFAULT_TTL),
    );

    let first = service
        .search(&SearchQuery::new("Austin").with_dietary(["Vegan", "gluten"]))
        .await
        .unwrap();
    let second = service
        .search(&SearchQuery::new("  austin ").with_dietary(["gluten", "vegan"]))
        .await
        .unwrap();

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.restaurants, second.restaurants);
    assert_eq!(discovery.calls(), 1);
}

#[tokio::test]
async fn test_cache_expiry_triggers_fresh_run() {
    let discovery = Arc::new(StaticDiscovery::new(vec![venue("a", "A", 30.26, -97.74, 4.0, 2)]));
    let service = SearchService::new(
        austin(),
        discovery.clone(),
        Arc::new(StaticDetails::new()),
        ResultCache::new(100, Duration::from_millis(20)),
    );
    let query = SearchQuery::new("Austin");

    service.search(&query).await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    let again = service.search(&query).await.unwrap();

    assert!(!again.cached);
    assert_eq!(discovery.calls(), 2);
}

#[tokio::test]
async fn test_concurrent_identical_queries_run_once() {
    let discovery = Arc::new(
        StaticDiscovery::new(vec![venue("a", "A", 30.26, -97.74, 4.0, 2)]).with_delay(Duration::from_millis(50)),
    );
    let service = Arc::new(SearchService::new(
        austin(),
        discovery.clone(),
        Arc::new(StaticDetails::new()),
        ResultCache::new(100, DEFAULT_TTL),
    ));

    let mut handles = Vec::new();
    for _ in 0..6 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service.search(&SearchQuery::new("Austin")).await
        }));
    }

    let mut fresh = 0;
    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.total_results, 1);
        if !response.cached {
            fresh += 1;
        }
    }

    assert_eq!(fresh, 1);
    assert_eq!(discovery.calls(), 1);
}

#[tokio::test]
async fn test_upstream_failures_surface_with_stage() {
    let service = SearchService::new(
        Arc::new(StaticGeocoder::not_found()),
        Arc::new(StaticDiscovery::new(vec![])),
        Arc::new(StaticDetails::new()),
        ResultCache::new(100, DEFAULT_TTL),
    );
    match service.search(&SearchQuery::new("Nowhere")).await {
        Err(SearchError::Upstream { stage, .. }) => assert_eq!(stage, Stage::Geocode),
        other => panic!("expected geocode failure, got {:?}", other),
    }
    assert_eq!(service.cache().entry_count(), 0);
}

#[tokio::test]
async fn test_empty_discovery_yields_empty_response() {
    let service = SearchService::new(
        austin(),
        Arc::new(StaticDiscovery::new(vec![])),
        Arc::new(StaticDetails::new()),
        ResultCache::new(100, DEFAULT_TTL),
    );
    let response = service.search(&SearchQuery::new("Austin")).await.unwrap();
    assert_eq!(response.total_results, 0);
    assert!(response.restaurants.is_empty());
    assert_eq!(response.location.name, "Austin, TX, USA");
}

#[tokio::test]
async fn test_relevance_score_includes_distance_from_centre() {
    // beyond the 5 km radius, so the distance factor is 0
    let far_lat = 30.2672 + (6000.0_f64 / 6_371_000.0).to_degrees();

    let mut at_centre = venue("centre", "Centre Cafe", 30.2672, -97.7431, 4.5, 2);
    at_centre.review_count = 120;
    let mut far = venue("far", "Far Diner", far_lat, -97.7431, 4.5, 2);
    far.review_count = 120;

    let service = SearchService::new(
        austin(),
        Arc::new(StaticDiscovery::new(vec![far, at_centre])),
        Arc::new(StaticDetails::new()),
        ResultCache::new(100, DEFAULT_TTL),
    );

    let response = service
        .search(&SearchQuery::new("Austin").with_budget(Budget::Mid))
        .await
        .unwrap();

    // rating 27 + dietary 30 + budget 20 + reviews 10, plus up to 10 for distance
    let centre = &response.restaurants[0];
    assert_eq!(centre.venue.id(), "centre");
    assert_eq!(centre.venue.distance_m, Some(0.0));
    assert_eq!(centre.relevance_score, 97);

    let far = &response.restaurants[1];
    assert_eq!(far.venue.id(), "far");
    assert!(far.venue.distance_m.unwrap() > 5000.0);
    assert_eq!(far.relevance_score, 87);
}
