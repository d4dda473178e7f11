use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw recommendation request
///
/// Every field is kept as untyped JSON so that any object deserializes;
/// [`crate::core::validation::sanitize_preferences`] does the typing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendTripsRequest {
    pub selected_countries: Option<Value>,
    pub selected_continents: Option<Value>,
    pub preferred_type_id: Option<Value>,
    pub preferred_theme_ids: Option<Value>,
    pub min_duration: Option<Value>,
    pub max_duration: Option<Value>,
    pub budget: Option<Value>,
    pub difficulty: Option<Value>,
    pub year: Option<Value>,
    pub month: Option<Value>,
}

impl RecommendTripsRequest {
    /// Parse a request body, falling back to an empty request for anything
    /// that is not a JSON object.
    pub fn from_body(body: &[u8]) -> Self {
        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Self::default();
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
            Ok(other) => {
                tracing::info!("Ignoring non-object recommendation body: {}", other);
                Self::default()
            }
            Err(e) => {
                tracing::info!("Ignoring malformed recommendation body: {}", e);
                Self::default()
            }
        }
    }
}
