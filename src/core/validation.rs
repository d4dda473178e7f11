use serde_json::Value;
use crate::models::{Continent, RecommendTripsRequest, SearchPreferences};

/// Longest accepted list of country IDs
pub const MAX_ID_LIST_LEN: usize = 100;
/// Longest accepted list of interest themes
pub const MAX_THEME_IDS: usize = 3;
/// Free text is cut to this many characters
pub const MAX_TEXT_LEN: usize = 100;

const MAX_ID: i64 = i32::MAX as i64;
const MIN_DURATION_DAYS: i64 = 1;
const MAX_DURATION_DAYS: i64 = 365;
const MAX_BUDGET: f64 = 1_000_000.0;
const MIN_DIFFICULTY: i64 = 1;
const MAX_DIFFICULTY: i64 = 5;
const MIN_YEAR: i64 = 2000;
const MAX_YEAR: i64 = 2100;

/// Convert a raw request into typed, bounded preferences.
///
/// Never fails: anything unparsable or out of range becomes "not specified".
pub fn sanitize_preferences(request: &RecommendTripsRequest) -> SearchPreferences {
    let mut min_duration =
        parse_int_in(request.min_duration.as_ref(), MIN_DURATION_DAYS, MAX_DURATION_DAYS)
            .map(|d| d as u32);
    let mut max_duration =
        parse_int_in(request.max_duration.as_ref(), MIN_DURATION_DAYS, MAX_DURATION_DAYS)
            .map(|d| d as u32);

    if let (Some(min), Some(max)) = (min_duration, max_duration) {
        if min > max {
            min_duration = Some(max);
            max_duration = Some(min);
        }
    }

    SearchPreferences {
        country_ids: parse_id_list(request.selected_countries.as_ref(), MAX_ID_LIST_LEN),
        continents: parse_continents(request.selected_continents.as_ref()),
        trip_type_id: parse_int_in(request.preferred_type_id.as_ref(), 1, MAX_ID),
        theme_ids: parse_id_list(request.preferred_theme_ids.as_ref(), MAX_THEME_IDS),
        min_duration,
        max_duration,
        budget: request
            .budget
            .as_ref()
            .and_then(parse_number)
            .filter(|b| *b > 0.0 && *b <= MAX_BUDGET),
        difficulty: parse_int_in(request.difficulty.as_ref(), MIN_DIFFICULTY, MAX_DIFFICULTY)
            .map(|d| d as u8),
        year: parse_int_in(request.year.as_ref(), MIN_YEAR, MAX_YEAR).map(|y| y as i32),
        month: parse_int_in(request.month.as_ref(), 1, 12).map(|m| m as u32),
    }
}

/// Strip markup and control characters, trim, and cut to [`MAX_TEXT_LEN`] characters
pub fn sanitize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len().min(MAX_TEXT_LEN * 4));
    let mut in_tag = false;

    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag || c.is_control() => {}
            _ => out.push(c),
        }
    }

    out.trim().chars().take(MAX_TEXT_LEN).collect()
}

/// Parse an integer from a JSON number or numeric string
pub fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let text = sanitize_text(s);
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

/// Parse a finite decimal from a JSON number or numeric string
pub fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => sanitize_text(s).parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= i64::MAX as f64 / 2.0 {
        Some(f as i64)
    } else {
        None
    }
}

fn parse_int_in(value: Option<&Value>, min: i64, max: i64) -> Option<i64> {
    value.and_then(parse_int).filter(|v| (min..=max).contains(v))
}

/// Items of a list-valued field; a scalar counts as a one-item list and a
/// string may carry comma-separated items.
fn list_items(value: Option<&Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|part| Value::String(part.to_string()))
            .collect(),
        Some(other) => vec![other.clone()],
    }
}

fn parse_id_list(value: Option<&Value>, max_len: usize) -> Vec<i64> {
    let mut ids = Vec::new();
    for id in list_items(value).iter().filter_map(parse_int) {
        if ids.len() == max_len {
            break;
        }
        if (1..=MAX_ID).contains(&id) && !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

fn parse_continents(value: Option<&Value>) -> Vec<Continent> {
    let mut continents = Vec::new();
    for item in list_items(value) {
        let Value::String(name) = item else { continue };
        match Continent::from_name(&sanitize_text(&name)) {
            Some(continent) if !continents.contains(&continent) => continents.push(continent),
            Some(_) => {}
            None => tracing::debug!("Dropping unknown continent: {:?}", name),
        }
    }
    continents
}
