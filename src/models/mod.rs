// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Continent, DepartureWindow, FilterSpec, MatchStrength, MatchingRules, ScoreThresholds,
    ScoredResult, ScoringWeights, SearchPreferences, Tier, TierTolerance, TripCandidate,
    TripStatus,
};
pub use requests::RecommendTripsRequest;
pub use responses::{ErrorResponse, HealthResponse, RecommendTripsResponse, TripMatch};
