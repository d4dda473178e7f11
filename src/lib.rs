//! Trip Matcher - two-tier trip recommendation service
//!
//! This library provides the matching and ranking engine behind trip
//! recommendations. A strict search pass is scored with an explainable point
//! system and widened into a penalized relaxed pass when it under-delivers.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{sanitize_preferences, Recommendation, Recommender};
pub use models::{
    MatchingRules, RecommendTripsRequest, RecommendTripsResponse, ScoredResult, ScoringWeights,
    SearchPreferences, TripCandidate,
};
pub use services::{InMemoryTripStore, PostgresTripStore, StoreError, TripStore};
