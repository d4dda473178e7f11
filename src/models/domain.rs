use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Geographic region a trip belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Continent {
    Africa,
    Asia,
    Europe,
    #[serde(rename = "North America")]
    NorthAmerica,
    #[serde(rename = "South America")]
    SouthAmerica,
    Oceania,
    Antarctica,
}

impl Continent {
    pub const ALL: [Continent; 7] = [
        Continent::Africa,
        Continent::Asia,
        Continent::Europe,
        Continent::NorthAmerica,
        Continent::SouthAmerica,
        Continent::Oceania,
        Continent::Antarctica,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::NorthAmerica => "North America",
            Continent::SouthAmerica => "South America",
            Continent::Oceania => "Oceania",
            Continent::Antarctica => "Antarctica",
        }
    }

    /// Look up a continent on the allow-list by display name.
    ///
    /// Case-insensitive; `_` and `-` are accepted in place of spaces.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .map(|c| if c == '_' || c == '-' { ' ' } else { c })
            .collect();

        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(&normalized))
    }

    /// Continents that are also booked as a destination in their own right.
    ///
    /// Selecting one of these matches its trips directly, like a country.
    pub fn is_standalone_destination(&self) -> bool {
        matches!(self, Continent::Antarctica)
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Booking status of a trip departure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    Open,
    Guaranteed,
    LastPlaces,
    Full,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Open => "OPEN",
            TripStatus::Guaranteed => "GUARANTEED",
            TripStatus::LastPlaces => "LAST_PLACES",
            TripStatus::Full => "FULL",
            TripStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Some(TripStatus::Open),
            "GUARANTEED" => Some(TripStatus::Guaranteed),
            "LAST_PLACES" => Some(TripStatus::LastPlaces),
            "FULL" => Some(TripStatus::Full),
            "CANCELLED" => Some(TripStatus::Cancelled),
            _ => None,
        }
    }
}

/// Search pass: narrow primary tolerances, or the widened fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Strict,
    Relaxed,
}

/// Sanitized trip search preferences
///
/// Every field is either within its declared domain or absent. Built once by
/// [`crate::core::validation::sanitize_preferences`]; nothing downstream looks
/// at the raw payload again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct SearchPreferences {
    #[validate(length(max = 100))]
    pub country_ids: Vec<i64>,
    #[validate(length(max = 7))]
    pub continents: Vec<Continent>,
    #[validate(range(min = 1))]
    pub trip_type_id: Option<i64>,
    #[validate(length(max = 3))]
    pub theme_ids: Vec<i64>,
    #[validate(range(min = 1, max = 365))]
    pub min_duration: Option<u32>,
    #[validate(range(min = 1, max = 365))]
    pub max_duration: Option<u32>,
    #[validate(range(exclusive_min = 0.0, max = 1_000_000.0))]
    pub budget: Option<f64>,
    #[validate(range(min = 1, max = 5))]
    pub difficulty: Option<u8>,
    #[validate(range(min = 2000, max = 2100))]
    pub year: Option<i32>,
    #[validate(range(min = 1, max = 12))]
    pub month: Option<u32>,
}

impl SearchPreferences {
    pub fn has_geography(&self) -> bool {
        !self.country_ids.is_empty() || !self.continents.is_empty()
    }

    pub fn has_duration(&self) -> bool {
        self.min_duration.is_some() || self.max_duration.is_some()
    }

    /// Days between a trip length and the requested duration range.
    ///
    /// `None` when no duration was requested, `Some(0)` inside the range.
    pub fn duration_gap(&self, days: i64) -> Option<i64> {
        if !self.has_duration() {
            return None;
        }

        let below = self
            .min_duration
            .map(|min| i64::from(min) - days)
            .unwrap_or(0);
        let above = self
            .max_duration
            .map(|max| days - i64::from(max))
            .unwrap_or(0);

        Some(below.max(above).max(0))
    }
}

/// Trip offering as read from the catalog store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripCandidate {
    pub id: i64,
    pub title: String,
    pub country_id: i64,
    pub country_name: String,
    pub continent: Continent,
    pub trip_type_id: i64,
    pub theme_ids: Vec<i64>,
    pub difficulty: u8,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: f64,
    pub max_capacity: i32,
    pub spots_left: i32,
    pub status: TripStatus,
    /// Private/on-request trips without a fixed schedule or capacity
    #[serde(default)]
    pub is_flexible_schedule: bool,
}

impl TripCandidate {
    /// Trip length in days, counting both the start and end day
    pub fn duration_days(&self) -> i64 {
        ((self.end_date - self.start_date).num_days() + 1).max(1)
    }

    pub fn days_until_departure(&self, today: NaiveDate) -> i64 {
        (self.start_date - today).num_days()
    }

    pub fn has_theme(&self, theme_id: i64) -> bool {
        self.theme_ids.contains(&theme_id)
    }
}

/// A trip together with its score and the reasons behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub trip: TripCandidate,
    pub score: f64,
    pub reasons: Vec<String>,
    pub is_relaxed: bool,
}

/// Departure date constraint of a filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepartureWindow {
    Any,
    /// Half-open: `from <= start_date < until`
    Range { from: NaiveDate, until: NaiveDate },
    /// Start month in the list, any year
    Months(Vec<u32>),
}

impl DepartureWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            DepartureWindow::Any => true,
            DepartureWindow::Range { from, until } => date >= *from && date < *until,
            DepartureWindow::Months(months) => months.contains(&date.month()),
        }
    }
}

/// Hard eligibility constraints for one store query
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub tier: Tier,
    pub country_ids: Vec<i64>,
    pub continents: Vec<Continent>,
    /// Continents matched directly as a destination, see [`Continent::is_standalone_destination`]
    pub destinations: Vec<Continent>,
    /// Also accept every trip on the continent of a requested country
    pub expand_countries_to_continents: bool,
    pub trip_type_id: Option<i64>,
    pub departure: DepartureWindow,
    pub difficulty_range: Option<(u8, u8)>,
    pub max_price: Option<f64>,
    pub exclude_ids: Vec<i64>,
    /// Trips departing before this date are excluded
    pub today: NaiveDate,
}

impl FilterSpec {
    pub fn has_geography(&self) -> bool {
        !self.country_ids.is_empty() || !self.continents.is_empty() || !self.destinations.is_empty()
    }
}

/// Point values of every scored signal
///
/// Immutable once loaded; handed to the scorer explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub base: f64,
    pub relaxed_penalty: f64,
    pub theme_full: f64,
    pub theme_partial: f64,
    pub theme_mismatch_penalty: f64,
    pub difficulty_exact: f64,
    pub duration_ideal: f64,
    pub duration_good: f64,
    pub budget_within: f64,
    pub budget_within_10: f64,
    pub budget_within_20: f64,
    pub status_guaranteed: f64,
    pub status_last_places: f64,
    pub departing_soon: f64,
    pub country_match: f64,
    pub continent_match: f64,
    pub type_mismatch_penalty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: 25.0,
            relaxed_penalty: 20.0,
            theme_full: 25.0,
            theme_partial: 12.0,
            theme_mismatch_penalty: 15.0,
            difficulty_exact: 15.0,
            duration_ideal: 12.0,
            duration_good: 8.0,
            budget_within: 12.0,
            budget_within_10: 8.0,
            budget_within_20: 5.0,
            status_guaranteed: 7.0,
            status_last_places: 15.0,
            departing_soon: 7.0,
            country_match: 15.0,
            continent_match: 5.0,
            type_mismatch_penalty: 10.0,
        }
    }
}

/// Filter tolerances applied on one tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierTolerance {
    /// Accepted distance from the requested difficulty level
    pub difficulty_slack: u8,
    /// Multiplier applied to the budget before filtering by price
    pub budget_multiplier: f64,
    /// Maximum days outside the requested duration range before a trip is dropped
    pub duration_tolerance_days: i64,
    /// Months added on each side of the requested departure window
    pub month_window: u32,
}

/// Score bands used to classify matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreThresholds {
    #[serde(rename = "HIGH")]
    pub high: u8,
    #[serde(rename = "MID")]
    pub mid: u8,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self { high: 70, mid: 50 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrength {
    Strong,
    Medium,
    Weak,
}

impl MatchStrength {
    pub fn classify(score: f64, thresholds: &ScoreThresholds) -> Self {
        if score >= f64::from(thresholds.high) {
            MatchStrength::Strong
        } else if score >= f64::from(thresholds.mid) {
            MatchStrength::Medium
        } else {
            MatchStrength::Weak
        }
    }
}

/// Tolerances, limits and thresholds of the two-tier search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchingRules {
    /// Below this many strict results the relaxed tier runs
    pub min_primary_results: usize,
    pub max_results: usize,
    pub strict: TierTolerance,
    pub relaxed: TierTolerance,
    /// Extra days outside the duration range still earning the "good" bonus
    pub duration_good_slack_days: i64,
    pub departing_soon_days: i64,
    pub thresholds: ScoreThresholds,
}

impl MatchingRules {
    pub fn tolerance(&self, tier: Tier) -> &TierTolerance {
        match tier {
            Tier::Strict => &self.strict,
            Tier::Relaxed => &self.relaxed,
        }
    }
}

impl Default for MatchingRules {
    fn default() -> Self {
        Self {
            min_primary_results: 6,
            max_results: 10,
            strict: TierTolerance {
                difficulty_slack: 1,
                budget_multiplier: 1.3,
                duration_tolerance_days: 7,
                month_window: 0,
            },
            relaxed: TierTolerance {
                difficulty_slack: 2,
                budget_multiplier: 1.5,
                duration_tolerance_days: 10,
                month_window: 2,
            },
            duration_good_slack_days: 4,
            departing_soon_days: 30,
            thresholds: ScoreThresholds::default(),
        }
    }
}
