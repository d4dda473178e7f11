use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use crate::core::filters::matches_filter_spec;
use crate::models::{Continent, FilterSpec, TripCandidate};
use crate::services::store::{StoreError, TripStore};

/// Trip catalog held in memory
///
/// Applies the same hard constraints as the Postgres store. Used for local
/// runs without a database, tests and benchmarks.
pub struct InMemoryTripStore {
    trips: Vec<TripCandidate>,
    country_continents: HashMap<i64, Continent>,
    queries: AtomicUsize,
}

impl InMemoryTripStore {
    pub fn new(trips: Vec<TripCandidate>) -> Self {
        let country_continents = trips
            .iter()
            .map(|trip| (trip.country_id, trip.continent))
            .collect();

        Self {
            trips,
            country_continents,
            queries: AtomicUsize::new(0),
        }
    }

    /// Load a catalog from a JSON array of trips
    pub fn from_json<R: Read>(reader: R) -> Result<Self, StoreError> {
        let trips: Vec<TripCandidate> = serde_json::from_reader(reader)?;
        Ok(Self::new(trips))
    }

    /// Load a catalog from a JSON file
    pub fn from_json_file(path: &str) -> Result<Self, StoreError> {
        let file = std::fs::File::open(path)?;
        let store = Self::from_json(std::io::BufReader::new(file))?;
        tracing::info!("Loaded {} trips from {}", store.len(), path);
        Ok(store)
    }

    /// Register a country that has no trips of its own
    pub fn with_country(mut self, country_id: i64, continent: Continent) -> Self {
        self.country_continents.insert(country_id, continent);
        self
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Number of candidate queries served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    /// Fold the continents of the requested countries into the continent list
    fn resolve_expansion(&self, spec: &FilterSpec) -> FilterSpec {
        let mut resolved = spec.clone();
        if resolved.expand_countries_to_continents {
            for country_id in &spec.country_ids {
                if let Some(continent) = self.country_continents.get(country_id) {
                    if !resolved.continents.contains(continent) {
                        resolved.continents.push(*continent);
                    }
                }
            }
            resolved.expand_countries_to_continents = false;
        }
        resolved
    }
}

#[async_trait]
impl TripStore for InMemoryTripStore {
    async fn find_candidates(&self, spec: &FilterSpec) -> Result<Vec<TripCandidate>, StoreError> {
        self.queries.fetch_add(1, Ordering::Relaxed);

        let spec = self.resolve_expansion(spec);
        let candidates: Vec<TripCandidate> = self
            .trips
            .iter()
            .filter(|trip| matches_filter_spec(trip, &spec))
            .cloned()
            .collect();

        tracing::debug!(
            "In-memory store matched {} of {} trips ({:?} tier)",
            candidates.len(),
            self.trips.len(),
            spec.tier
        );

        Ok(candidates)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
