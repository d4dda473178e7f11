// Integration tests for the recommendation pipeline

use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use trip_matcher::core::compare_results;
use trip_matcher::models::{
    Continent, FilterSpec, RecommendTripsRequest, SearchPreferences, TripCandidate, TripStatus,
};
use trip_matcher::routes::{configure_routes, trips::AppState};
use trip_matcher::{sanitize_preferences, InMemoryTripStore, Recommender, StoreError, TripStore};

const DESERT_TYPE: i64 = 5;
const EXPEDITION_TYPE: i64 = 4;
const CULTURAL: i64 = 1;
const FOOD: i64 = 2;
const DESERT_THEME: i64 = 7;
const WILDLIFE: i64 = 6;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2026, 1, 10)
}

fn create_test_trip(id: i64, start: NaiveDate, duration_days: i64) -> TripCandidate {
    TripCandidate {
        id,
        title: format!("Trip {}", id),
        country_id: 81,
        country_name: "Japan".to_string(),
        continent: Continent::Asia,
        trip_type_id: 1,
        theme_ids: vec![CULTURAL],
        difficulty: 2,
        start_date: start,
        end_date: start + Duration::days(duration_days - 1),
        price: 4000.0,
        max_capacity: 12,
        spots_left: 4,
        status: TripStatus::Open,
        is_flexible_schedule: false,
    }
}

fn antarctica_trip(id: i64) -> TripCandidate {
    TripCandidate {
        country_id: 672,
        country_name: "Antarctica".to_string(),
        continent: Continent::Antarctica,
        trip_type_id: EXPEDITION_TYPE,
        theme_ids: vec![WILDLIFE],
        price: 6400.0,
        ..create_test_trip(id, date(2026, 11, 20) + Duration::days(id), 12)
    }
}

fn mixed_catalog() -> Vec<TripCandidate> {
    let mut trips: Vec<TripCandidate> = (1..=12)
        .map(|id| {
            let mut trip = create_test_trip(id, date(2026, 1, 12) + Duration::days(id * 9), 6 + id);
            trip.status = match id % 3 {
                0 => TripStatus::Guaranteed,
                1 => TripStatus::LastPlaces,
                _ => TripStatus::Open,
            };
            trip.theme_ids = if id % 2 == 0 { vec![CULTURAL, FOOD] } else { vec![FOOD] };
            trip.price = 2500.0 + (id as f64) * 300.0;
            trip
        })
        .collect();
    trips.push(antarctica_trip(20));
    trips.push(antarctica_trip(21));
    trips
}

fn recommender_for(trips: Vec<TripCandidate>) -> (Arc<InMemoryTripStore>, Recommender) {
    let store = Arc::new(InMemoryTripStore::new(trips));
    let recommender = Recommender::with_defaults(store.clone());
    (store, recommender)
}

fn preferences(value: Value) -> SearchPreferences {
    let request: RecommendTripsRequest = serde_json::from_value(value).unwrap();
    sanitize_preferences(&request)
}

struct FailingStore;

#[async_trait]
impl TripStore for FailingStore {
    async fn find_candidates(&self, _spec: &FilterSpec) -> Result<Vec<TripCandidate>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(false)
    }
}

#[tokio::test]
async fn test_asia_cultural_food_scenario() {
    let trip = TripCandidate {
        theme_ids: vec![CULTURAL],
        price: 7500.0,
        status: TripStatus::Guaranteed,
        ..create_test_trip(1, date(2026, 4, 10), 9)
    };
    let (_, recommender) = recommender_for(vec![trip]);

    let prefs = preferences(json!({
        "selected_continents": ["Asia"],
        "preferred_theme_ids": [CULTURAL, FOOD],
        "min_duration": 7,
        "max_duration": 10,
        "budget": 8000,
        "difficulty": 2,
    }));
    let rec = recommender.recommend_on(&prefs, today()).await.unwrap();

    assert_eq!(rec.primary_count, 1);
    assert_eq!(rec.results[0].score, 88.0);
    assert!(!rec.results[0].is_relaxed);
    assert!(!rec.show_refinement_message);
}

#[tokio::test]
async fn test_antarctica_desert_scenario() {
    let (store, recommender) = recommender_for(mixed_catalog());

    let prefs = preferences(json!({
        "selected_continents": ["Antarctica"],
        "preferred_type_id": DESERT_TYPE,
        "preferred_theme_ids": [DESERT_THEME],
        "budget": 5000,
        "min_duration": 7,
        "max_duration": 10,
        "difficulty": 1,
    }));
    let rec = recommender.recommend_on(&prefs, today()).await.unwrap();

    assert_eq!(store.query_count(), 2);
    assert_eq!(rec.total_candidates, 0);
    assert_eq!(rec.primary_count, 0);
    assert_eq!(rec.relaxed_count, 2);
    assert!(rec.has_relaxed_results);
    assert!(rec.show_refinement_message);
    for result in &rec.results {
        assert!(result.is_relaxed);
        assert_eq!(result.trip.continent, Continent::Antarctica);
        assert!(result.score <= 30.0, "relaxed score {}", result.score);
    }
}

#[tokio::test]
async fn test_empty_preferences_scenario() {
    let (store, recommender) = recommender_for(mixed_catalog());

    let rec = recommender
        .recommend_on(&SearchPreferences::default(), today())
        .await
        .unwrap();

    assert_eq!(store.query_count(), 1);
    assert_eq!(rec.results.len(), 10);
    assert_eq!(rec.relaxed_count, 0);
    assert_eq!(rec.total_candidates, 14);
    for result in &rec.results {
        let allowed = result
            .reasons
            .iter()
            .all(|r| r.starts_with("Guaranteed") || r.starts_with("Last places") || r.starts_with("Departs within"));
        assert!(allowed, "unexpected reasons {:?}", result.reasons);
        assert!(result.score >= 25.0);
    }
}

#[tokio::test]
async fn test_results_strictly_ordered() {
    let (_, recommender) = recommender_for(mixed_catalog());
    let prefs = preferences(json!({
        "preferred_theme_ids": [CULTURAL, FOOD],
        "budget": 4000,
    }));
    let rec = recommender.recommend_on(&prefs, today()).await.unwrap();

    assert!(!rec.results.is_empty());
    for pair in rec.results.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.score >= b.score);
        if a.score == b.score {
            assert!(a.trip.start_date <= b.trip.start_date);
        }
        assert_ne!(compare_results(a, b), std::cmp::Ordering::Greater);
    }
}

#[tokio::test]
async fn test_identical_requests_identical_results() {
    let (_, recommender) = recommender_for(mixed_catalog());
    let prefs = preferences(json!({
        "selected_continents": ["Asia"],
        "preferred_theme_ids": [FOOD],
        "difficulty": 3,
    }));

    let first = recommender.recommend_on(&prefs, today()).await.unwrap();
    let second = recommender.recommend_on(&prefs, today()).await.unwrap();
    assert_eq!(first.results, second.results);
}

#[tokio::test]
async fn test_duration_cutoff_per_tier() {
    let trips = vec![
        create_test_trip(1, date(2026, 3, 1), 10),
        // 8 days over the range: relaxed only
        create_test_trip(2, date(2026, 3, 2), 18),
        // 11 days over the range: never
        create_test_trip(3, date(2026, 3, 3), 21),
    ];
    let (_, recommender) = recommender_for(trips);
    let prefs = preferences(json!({ "min_duration": 7, "max_duration": 10 }));
    let rec = recommender.recommend_on(&prefs, today()).await.unwrap();

    let strict: Vec<i64> = rec.results.iter().filter(|r| !r.is_relaxed).map(|r| r.trip.id).collect();
    let relaxed: Vec<i64> = rec.results.iter().filter(|r| r.is_relaxed).map(|r| r.trip.id).collect();
    assert_eq!(strict, vec![1]);
    assert_eq!(relaxed, vec![2]);
}

#[tokio::test]
async fn test_no_matches_is_success() {
    let (_, recommender) = recommender_for(vec![]);
    let rec = recommender
        .recommend_on(&SearchPreferences::default(), today())
        .await
        .unwrap();
    let response = rec.into_response();

    assert!(response.success);
    assert_eq!(response.count, 0);
    assert!(response.data.is_empty());
    assert!(response.show_refinement_message);
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let recommender = Recommender::with_defaults(Arc::new(FailingStore));
    let result = recommender
        .recommend_on(&SearchPreferences::default(), today())
        .await;
    assert!(matches!(result, Err(StoreError::Unavailable(_))));
}

fn upcoming_catalog() -> Vec<TripCandidate> {
    let start = Utc::now().date_naive() + Duration::days(60);
    (1..=3)
        .map(|id| create_test_trip(id, start + Duration::days(id), 8))
        .collect()
}

#[actix_web::test]
async fn test_recommend_endpoint() {
    let (_, recommender) = recommender_for(upcoming_catalog());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(AppState { recommender }))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/trips/recommend")
        .set_json(json!({ "selected_continents": ["Asia"], "difficulty": "2" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 3);
    assert_eq!(body["primary_count"], 3);
    assert_eq!(body["relaxed_count"], 0);
    assert_eq!(body["has_relaxed_results"], false);
    assert_eq!(body["score_thresholds"], json!({ "HIGH": 70, "MID": 50 }));
    assert_eq!(body["data"][0]["match_score"], 45);
    assert_eq!(body["data"][0]["trip"]["id"], 1);
    assert_eq!(
        body["data"][0]["match_details"],
        json!(["Matches your fitness level (+15)", "On a continent you selected (+5)"])
    );
}

#[actix_web::test]
async fn test_recommend_endpoint_malformed_body() {
    let (_, recommender) = recommender_for(upcoming_catalog());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(AppState { recommender }))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/trips/recommend")
        .insert_header(("content-type", "application/json"))
        .set_payload("{definitely not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 3);
}

#[actix_web::test]
async fn test_recommend_endpoint_store_failure() {
    let recommender = Recommender::with_defaults(Arc::new(FailingStore));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(AppState { recommender }))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/trips/recommend")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 500);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("connection refused"));

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "degraded");
}
