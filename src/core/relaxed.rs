use chrono::NaiveDate;
use crate::core::filters::build_filter_spec;
use crate::core::scoring::score_candidates;
use crate::models::{FilterSpec, MatchingRules, ScoredResult, ScoringWeights, SearchPreferences, Tier};
use crate::services::{StoreError, TripStore};

/// Whether the strict tier delivered too few results
pub fn needs_relaxed_search(strict_count: usize, rules: &MatchingRules) -> bool {
    strict_count < rules.min_primary_results
}

/// Widened filter for the fallback tier
///
/// Countries expand to their continents, the departure window grows by the
/// relaxed month window, difficulty and budget tolerances widen, and the
/// trip type is no longer enforced. Trips already returned by the strict
/// tier are excluded.
pub fn relaxed_filter_spec(
    preferences: &SearchPreferences,
    rules: &MatchingRules,
    today: NaiveDate,
    strict_results: &[ScoredResult],
) -> FilterSpec {
    let mut spec = build_filter_spec(preferences, Tier::Relaxed, rules, today);
    spec.exclude_ids = strict_results.iter().map(|r| r.trip.id).collect();
    spec
}

/// Run the relaxed tier: query with the widened filter and score every survivor
pub async fn expand_search(
    store: &dyn TripStore,
    preferences: &SearchPreferences,
    weights: &ScoringWeights,
    rules: &MatchingRules,
    today: NaiveDate,
    strict_results: &[ScoredResult],
) -> Result<Vec<ScoredResult>, StoreError> {
    let spec = relaxed_filter_spec(preferences, rules, today, strict_results);
    let candidates = store.find_candidates(&spec).await?;
    let candidate_count = candidates.len();

    let relaxed = score_candidates(candidates, preferences, Tier::Relaxed, weights, rules, today)
        .into_iter()
        // Never repeat a strict result
        .filter(|r| !spec.exclude_ids.contains(&r.trip.id))
        .collect::<Vec<_>>();

    tracing::debug!(
        "Relaxed tier scored {} of {} candidates",
        relaxed.len(),
        candidate_count
    );

    Ok(relaxed)
}
