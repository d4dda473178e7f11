use chrono::NaiveDate;
use crate::models::{
    Continent, DepartureWindow, FilterSpec, MatchingRules, SearchPreferences, Tier, TripCandidate,
    TripStatus,
};

/// Build the hard-constraint filter for one search tier.
///
/// Shared by both tiers; the tier only selects the tolerances from `rules`
/// and whether the trip type is enforced. Store-side exclusions are left
/// empty for the caller to fill in.
pub fn build_filter_spec(
    preferences: &SearchPreferences,
    tier: Tier,
    rules: &MatchingRules,
    today: NaiveDate,
) -> FilterSpec {
    let tolerance = rules.tolerance(tier);

    let (destinations, continents): (Vec<Continent>, Vec<Continent>) = preferences
        .continents
        .iter()
        .copied()
        .partition(|c| c.is_standalone_destination());

    let difficulty_range = preferences.difficulty.map(|level| {
        let slack = tolerance.difficulty_slack;
        (level.saturating_sub(slack).max(1), level.saturating_add(slack).min(5))
    });

    FilterSpec {
        tier,
        country_ids: preferences.country_ids.clone(),
        continents,
        destinations,
        expand_countries_to_continents: tier == Tier::Relaxed
            && !preferences.country_ids.is_empty(),
        trip_type_id: match tier {
            Tier::Strict => preferences.trip_type_id,
            Tier::Relaxed => None,
        },
        departure: departure_window(preferences.year, preferences.month, tolerance.month_window),
        difficulty_range,
        max_price: preferences
            .budget
            .map(|budget| budget * tolerance.budget_multiplier),
        exclude_ids: Vec::new(),
        today,
    }
}

/// Departure window for a year/month request widened by `widen_months` on each side
pub fn departure_window(year: Option<i32>, month: Option<u32>, widen_months: u32) -> DepartureWindow {
    let widen = widen_months as i32;

    let (first, last) = match (year, month) {
        (None, None) => return DepartureWindow::Any,
        (None, Some(month)) => {
            let month0 = month as i32 - 1;
            let months = (-widen..=widen)
                .map(|offset| (month0 + offset).rem_euclid(12) as u32 + 1)
                .collect();
            return DepartureWindow::Months(months);
        }
        (Some(year), Some(month)) => {
            let index = year * 12 + month as i32 - 1;
            (index - widen, index + widen)
        }
        (Some(year), None) => (year * 12 - widen, year * 12 + 11 + widen),
    };

    match (month_start(first), month_start(last + 1)) {
        (Some(from), Some(until)) => DepartureWindow::Range { from, until },
        _ => DepartureWindow::Any,
    }
}

/// First day of the month at `index` months since year 0
fn month_start(index: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
}

/// Check a trip against every hard constraint of a filter.
///
/// Mirrors the SQL emitted by the Postgres store. Country-to-continent
/// expansion must already be resolved into `spec.continents`.
#[inline]
pub fn matches_filter_spec(trip: &TripCandidate, spec: &FilterSpec) -> bool {
    if trip.status == TripStatus::Cancelled || spec.exclude_ids.contains(&trip.id) {
        return false;
    }

    // Flexible trips have no fixed departure or capacity
    if !trip.is_flexible_schedule {
        if trip.spots_left <= 0 {
            return false;
        }
        if trip.start_date < spec.today || !spec.departure.contains(trip.start_date) {
            return false;
        }
    }

    if !matches_geography(trip, spec) {
        return false;
    }

    if let Some(trip_type_id) = spec.trip_type_id {
        if trip.trip_type_id != trip_type_id {
            return false;
        }
    }

    if let Some((min, max)) = spec.difficulty_range {
        if trip.difficulty < min || trip.difficulty > max {
            return false;
        }
    }

    if let Some(max_price) = spec.max_price {
        if trip.price > max_price {
            return false;
        }
    }

    true
}

/// Union of country, continent and destination matches; no constraint when none is set
#[inline]
pub fn matches_geography(trip: &TripCandidate, spec: &FilterSpec) -> bool {
    if !spec.has_geography() {
        return true;
    }

    spec.country_ids.contains(&trip.country_id)
        || spec.continents.contains(&trip.continent)
        || spec.destinations.contains(&trip.continent)
}
