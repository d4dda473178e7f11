use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use validator::Validate;
use crate::core::{
    assembler::{assemble_results, Recommendation},
    filters::build_filter_spec,
    relaxed::{expand_search, needs_relaxed_search},
    scoring::score_candidates,
};
use crate::models::{MatchingRules, ScoringWeights, SearchPreferences, Tier};
use crate::services::{StoreError, TripStore};

/// Main recommendation orchestrator - implements the two-tier search pipeline
///
/// # Pipeline Stages
/// 1. Strict candidate query
/// 2. Scoring (duration misfits dropped)
/// 3. Relaxed query and scoring, only when the strict tier under-delivers
/// 4. Ranking, truncation and summary
///
/// Holds no per-request state; clones share the store.
#[derive(Clone)]
pub struct Recommender {
    store: Arc<dyn TripStore>,
    weights: ScoringWeights,
    rules: MatchingRules,
}

impl Recommender {
    pub fn new(store: Arc<dyn TripStore>, weights: ScoringWeights, rules: MatchingRules) -> Self {
        Self {
            store,
            weights,
            rules,
        }
    }

    pub fn with_defaults(store: Arc<dyn TripStore>) -> Self {
        Self::new(store, ScoringWeights::default(), MatchingRules::default())
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn rules(&self) -> &MatchingRules {
        &self.rules
    }

    /// Recommend trips departing from today on
    pub async fn recommend(
        &self,
        preferences: &SearchPreferences,
    ) -> Result<Recommendation, StoreError> {
        self.recommend_on(preferences, Utc::now().date_naive()).await
    }

    /// Recommend trips as of `today`
    ///
    /// Only a store failure is an error; no matches is an empty recommendation.
    pub async fn recommend_on(
        &self,
        preferences: &SearchPreferences,
        today: NaiveDate,
    ) -> Result<Recommendation, StoreError> {
        if let Err(errors) = preferences.validate() {
            tracing::warn!("Sanitized preferences failed validation: {}", errors);
        }

        let spec = build_filter_spec(preferences, Tier::Strict, &self.rules, today);
        let candidates = self.store.find_candidates(&spec).await?;
        let candidate_count = candidates.len();

        let strict = score_candidates(
            candidates,
            preferences,
            Tier::Strict,
            &self.weights,
            &self.rules,
            today,
        );

        tracing::debug!(
            "Strict tier scored {} of {} candidates",
            strict.len(),
            candidate_count
        );

        let relaxed = if needs_relaxed_search(strict.len(), &self.rules) {
            tracing::info!(
                "Strict tier returned {} results (minimum {}), widening search",
                strict.len(),
                self.rules.min_primary_results
            );
            expand_search(
                self.store.as_ref(),
                preferences,
                &self.weights,
                &self.rules,
                today,
                &strict,
            )
            .await?
        } else {
            Vec::new()
        };

        let recommendation = assemble_results(strict, relaxed, &self.rules);

        tracing::info!(
            "Returning {} trips ({} primary, {} relaxed) from {} strict candidates",
            recommendation.results.len(),
            recommendation.primary_count,
            recommendation.relaxed_count,
            recommendation.total_candidates
        );

        Ok(recommendation)
    }

    pub async fn health_check(&self) -> Result<bool, StoreError> {
        self.store.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Continent, TripCandidate, TripStatus};
    use crate::services::InMemoryTripStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_trip(id: i64, trip_type_id: i64) -> TripCandidate {
        let start = date(2026, 3, 1) + chrono::Duration::days(id);
        TripCandidate {
            id,
            title: format!("Trip {}", id),
            country_id: 2,
            country_name: "Iceland".to_string(),
            continent: Continent::Europe,
            trip_type_id,
            theme_ids: vec![],
            difficulty: 2,
            start_date: start,
            end_date: start + chrono::Duration::days(7),
            price: 2500.0,
            max_capacity: 12,
            spots_left: 5,
            status: TripStatus::Open,
            is_flexible_schedule: false,
        }
    }

    #[tokio::test]
    async fn test_enough_strict_results_skip_relaxed() {
        let trips = (1..=8).map(|id| create_trip(id, 1)).collect();
        let store = Arc::new(InMemoryTripStore::new(trips));
        let recommender = Recommender::with_defaults(store.clone());

        let prefs = SearchPreferences {
            trip_type_id: Some(1),
            ..Default::default()
        };
        let rec = recommender.recommend_on(&prefs, date(2026, 1, 1)).await.unwrap();

        assert_eq!(rec.results.len(), 8);
        assert_eq!(rec.relaxed_count, 0);
        assert!(!rec.has_relaxed_results);
        assert_eq!(store.query_count(), 1);
    }

    #[tokio::test]
    async fn test_few_strict_results_trigger_relaxed() {
        let trips = (1..=8)
            .map(|id| create_trip(id, if id <= 2 { 1 } else { 2 }))
            .collect();
        let store = Arc::new(InMemoryTripStore::new(trips));
        let recommender = Recommender::with_defaults(store.clone());

        let prefs = SearchPreferences {
            trip_type_id: Some(1),
            ..Default::default()
        };
        let rec = recommender.recommend_on(&prefs, date(2026, 1, 1)).await.unwrap();

        assert_eq!(store.query_count(), 2);
        assert_eq!(rec.primary_count, 2);
        assert_eq!(rec.relaxed_count, 6);
        assert_eq!(rec.total_candidates, 2);
        // Strict results lead; relaxed ones carry the penalties
        assert!(!rec.results[0].is_relaxed);
        assert!(!rec.results[1].is_relaxed);
        assert!(rec.results[2..].iter().all(|r| r.is_relaxed && r.score == 0.0));
    }
}
