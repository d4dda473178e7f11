use serde::{Deserialize, Serialize};
use crate::models::domain::{ScoreThresholds, TripCandidate};

/// One recommended trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripMatch {
    pub match_score: u8,
    pub is_relaxed: bool,
    pub match_details: Vec<String>,
    pub trip: TripCandidate,
}

/// Response for the recommend endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendTripsResponse {
    pub success: bool,
    pub count: usize,
    pub primary_count: usize,
    pub relaxed_count: usize,
    pub total_candidates: usize,
    pub has_relaxed_results: bool,
    pub show_refinement_message: bool,
    pub score_thresholds: ScoreThresholds,
    pub data: Vec<TripMatch>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}
