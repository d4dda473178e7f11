use actix_web::{web, HttpResponse, Responder};
use tracing::Instrument;
use crate::core::{sanitize_preferences, Recommender};
use crate::models::{ErrorResponse, HealthResponse, RecommendTripsRequest};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub recommender: Recommender,
}

/// Configure all trip-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/trips/recommend", web::post().to(recommend_trips));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.recommender.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Recommend trips endpoint
///
/// POST /api/v1/trips/recommend
///
/// Request body (every field optional):
/// ```json
/// {
///   "selected_countries": [12],
///   "selected_continents": ["Asia"],
///   "preferred_type_id": 3,
///   "preferred_theme_ids": [1, 4],
///   "min_duration": 7,
///   "max_duration": 10,
///   "budget": 8000,
///   "difficulty": 2,
///   "year": 2026,
///   "month": 5
/// }
/// ```
///
/// Malformed fields, or a malformed body, count as "not specified".
async fn recommend_trips(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("recommend_trips", %request_id);

    async move {
        let request = RecommendTripsRequest::from_body(&body);
        let preferences = sanitize_preferences(&request);

        tracing::debug!("Sanitized preferences: {:?}", preferences);

        match state.recommender.recommend(&preferences).await {
            Ok(recommendation) => HttpResponse::Ok().json(recommendation.into_response()),
            Err(e) => {
                tracing::error!("Failed to query trip catalog: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    success: false,
                    error: "Failed to query trips".to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
    .instrument(span)
    .await
}
