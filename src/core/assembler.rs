use std::cmp::Ordering;
use crate::models::{
    MatchingRules, RecommendTripsResponse, ScoreThresholds, ScoredResult, TripMatch,
};

/// Ranked recommendations with their summary counts
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub results: Vec<ScoredResult>,
    pub primary_count: usize,
    pub relaxed_count: usize,
    /// Strict results before truncation
    pub total_candidates: usize,
    pub has_relaxed_results: bool,
    pub show_refinement_message: bool,
    pub thresholds: ScoreThresholds,
}

/// Order by score (descending), then departure date, then trip ID
pub fn compare_results(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.trip.start_date.cmp(&b.trip.start_date))
        .then_with(|| a.trip.id.cmp(&b.trip.id))
}

/// Merge both tiers, rank, truncate and compute the summary
pub fn assemble_results(
    strict: Vec<ScoredResult>,
    relaxed: Vec<ScoredResult>,
    rules: &MatchingRules,
) -> Recommendation {
    let total_candidates = strict.len();

    let top_strict_score = strict.iter().map(|r| r.score).max_by(f64::total_cmp);
    let show_refinement_message = match top_strict_score {
        Some(score) => score < f64::from(rules.thresholds.high),
        None => true,
    };

    let mut results: Vec<ScoredResult> = strict.into_iter().chain(relaxed).collect();
    results.sort_by(compare_results);
    results.truncate(rules.max_results);

    let relaxed_count = results.iter().filter(|r| r.is_relaxed).count();
    let primary_count = results.len() - relaxed_count;

    Recommendation {
        results,
        primary_count,
        relaxed_count,
        total_candidates,
        has_relaxed_results: relaxed_count > 0,
        show_refinement_message,
        thresholds: rules.thresholds,
    }
}

impl Recommendation {
    pub fn into_response(self) -> RecommendTripsResponse {
        let data: Vec<TripMatch> = self
            .results
            .into_iter()
            .map(|r| TripMatch {
                match_score: r.score.round().clamp(0.0, 100.0) as u8,
                is_relaxed: r.is_relaxed,
                match_details: r.reasons,
                trip: r.trip,
            })
            .collect();

        RecommendTripsResponse {
            success: true,
            count: data.len(),
            primary_count: self.primary_count,
            relaxed_count: self.relaxed_count,
            total_candidates: self.total_candidates,
            has_relaxed_results: self.has_relaxed_results,
            show_refinement_message: self.show_refinement_message,
            score_thresholds: self.thresholds,
            data,
        }
    }
}
