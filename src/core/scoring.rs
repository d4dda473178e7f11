use chrono::NaiveDate;
use crate::models::{
    MatchingRules, ScoredResult, ScoringWeights, SearchPreferences, Tier, TripCandidate,
    TripStatus,
};

/// Calculate a match score (0-100) for a trip with the reasons behind it
///
/// Every candidate starts from the base score (less the relaxed penalty on
/// the relaxed tier), then each signal is evaluated in a fixed order:
///
/// theme overlap, difficulty, duration, budget, status, departure,
/// geography, relaxed trip-type mismatch.
///
/// A signal only applies when the matching preference was given. The sum is
/// clamped to [0, 100] at the end, so strong trips may exceed 100 before
/// clamping.
///
/// Returns `None` when the trip length falls outside the tier's duration
/// tolerance; such a trip is dropped rather than scored.
pub fn calculate_match_score(
    trip: &TripCandidate,
    preferences: &SearchPreferences,
    tier: Tier,
    weights: &ScoringWeights,
    rules: &MatchingRules,
    today: NaiveDate,
) -> Option<(f64, Vec<String>)> {
    let mut card = ScoreCard::new(weights.base);

    if tier == Tier::Relaxed {
        card.add(-weights.relaxed_penalty, "Broadened search");
    }

    // Themes
    if !preferences.theme_ids.is_empty() {
        let shared = preferences
            .theme_ids
            .iter()
            .filter(|theme| trip.has_theme(**theme))
            .count();
        match shared {
            0 => card.add(-weights.theme_mismatch_penalty, "No matching interests"),
            1 => card.add(weights.theme_partial, "Partially matches your interests"),
            _ => card.add(weights.theme_full, "Matches your interests"),
        }
    }

    // Difficulty
    if preferences.difficulty == Some(trip.difficulty) {
        card.add(weights.difficulty_exact, "Matches your fitness level");
    }

    // Duration
    if preferences.has_duration() {
        if trip.is_flexible_schedule {
            card.add(weights.duration_ideal, "Flexible duration");
        } else {
            let gap = preferences.duration_gap(trip.duration_days()).unwrap_or(0);
            if gap == 0 {
                card.add(weights.duration_ideal, "Ideal duration");
            } else if gap <= rules.duration_good_slack_days {
                card.add(weights.duration_good, "Close to your preferred duration");
            } else if gap > rules.tolerance(tier).duration_tolerance_days {
                return None;
            }
        }
    }

    // Budget
    if let Some(budget) = preferences.budget {
        if trip.price <= budget {
            card.add(weights.budget_within, "Within your budget");
        } else if trip.price <= budget * 1.10 {
            card.add(weights.budget_within_10, "Up to 10% over budget");
        } else if trip.price <= budget * 1.20 {
            card.add(weights.budget_within_20, "Up to 20% over budget");
        }
    }

    // Status
    match trip.status {
        TripStatus::Guaranteed => card.add(weights.status_guaranteed, "Guaranteed departure"),
        TripStatus::LastPlaces => card.add(weights.status_last_places, "Last places available"),
        _ => {}
    }

    // Departure
    let days_until = trip.days_until_departure(today);
    if (0..=rules.departing_soon_days).contains(&days_until) {
        card.add(
            weights.departing_soon,
            &format!("Departs within {} days", rules.departing_soon_days),
        );
    }

    // Geography
    if preferences.country_ids.contains(&trip.country_id) {
        card.add(weights.country_match, "In a country you selected");
    } else if preferences.continents.contains(&trip.continent) {
        if trip.continent.is_standalone_destination() {
            card.add(weights.country_match, "Your selected destination");
        } else {
            card.add(weights.continent_match, "On a continent you selected");
        }
    }

    // Trip type is no longer a hard filter on the relaxed tier
    if tier == Tier::Relaxed {
        if let Some(type_id) = preferences.trip_type_id {
            if trip.trip_type_id != type_id {
                card.add(-weights.type_mismatch_penalty, "Different trip style");
            }
        }
    }

    Some(card.finish())
}

/// Score candidates on a tier, dropping those outside the duration tolerance
pub fn score_candidates(
    candidates: Vec<TripCandidate>,
    preferences: &SearchPreferences,
    tier: Tier,
    weights: &ScoringWeights,
    rules: &MatchingRules,
    today: NaiveDate,
) -> Vec<ScoredResult> {
    candidates
        .into_iter()
        .filter_map(|trip| {
            let (score, reasons) =
                calculate_match_score(&trip, preferences, tier, weights, rules, today)?;
            Some(ScoredResult {
                trip,
                score,
                reasons,
                is_relaxed: tier == Tier::Relaxed,
            })
        })
        .collect()
}

/// Running total plus the labelled contributions
struct ScoreCard {
    total: f64,
    reasons: Vec<String>,
}

impl ScoreCard {
    fn new(base: f64) -> Self {
        Self {
            total: base,
            reasons: Vec::new(),
        }
    }

    fn add(&mut self, points: f64, label: &str) {
        if points == 0.0 {
            return;
        }
        self.total += points;
        self.reasons.push(format!("{} ({})", label, format_points(points)));
    }

    fn finish(self) -> (f64, Vec<String>) {
        let score = if self.total.is_finite() {
            self.total.clamp(0.0, 100.0)
        } else {
            0.0
        };
        (score, self.reasons)
    }
}

fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{:+}", points as i64)
    } else {
        format!("{:+.1}", points)
    }
}
