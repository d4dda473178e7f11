use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;
use crate::models::{Continent, DepartureWindow, FilterSpec, TripCandidate, TripStatus};
use crate::services::store::{StoreError, TripStore};

const SELECT_TRIPS: &str = r#"
    SELECT
        t.id,
        t.title,
        t.country_id,
        c.name AS country_name,
        c.continent::text AS continent,
        t.trip_type_id,
        COALESCE(
            array_agg(tt.theme_id ORDER BY tt.theme_id) FILTER (WHERE tt.theme_id IS NOT NULL),
            '{}'
        ) AS theme_ids,
        t.difficulty::int2 AS difficulty,
        t.start_date,
        t.end_date,
        t.price::float8 AS price,
        t.max_capacity,
        t.spots_left,
        t.status::text AS status,
        ty.is_flexible_schedule
    FROM trips t
    JOIN countries c ON c.id = t.country_id
    JOIN trip_types ty ON ty.id = t.trip_type_id
    LEFT JOIN trip_themes tt ON tt.trip_id = t.id
"#;

/// PostgreSQL-backed trip catalog
///
/// Read-only: every filter tier becomes a single parameterised `SELECT`.
/// The schema itself is owned and migrated elsewhere.
pub struct PostgresTripStore {
    pool: PgPool,
}

impl PostgresTripStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL trip catalog");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            acquire_timeout_secs.unwrap_or(5),
            idle_timeout_secs.unwrap_or(600),
        )
        .await
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TripStore for PostgresTripStore {
    async fn find_candidates(&self, spec: &FilterSpec) -> Result<Vec<TripCandidate>, StoreError> {
        let mut query = build_candidate_query(spec);
        let rows = query.build().fetch_all(&self.pool).await?;

        let trips = rows
            .iter()
            .map(trip_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Queried {} candidates ({:?} tier)", trips.len(), spec.tier);

        Ok(trips)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Translate a filter into the candidate `SELECT`
///
/// Same semantics as [`crate::core::filters::matches_filter_spec`], with
/// country-to-continent expansion done by a sub-select on `countries`.
pub fn build_candidate_query(spec: &FilterSpec) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(SELECT_TRIPS);

    qb.push(" WHERE t.status <> 'CANCELLED'");

    // Flexible trips skip the date and capacity checks
    qb.push(" AND (ty.is_flexible_schedule OR (t.spots_left > 0 AND t.start_date >= ");
    qb.push_bind(spec.today);
    match &spec.departure {
        DepartureWindow::Any => {}
        DepartureWindow::Range { from, until } => {
            qb.push(" AND t.start_date >= ");
            qb.push_bind(*from);
            qb.push(" AND t.start_date < ");
            qb.push_bind(*until);
        }
        DepartureWindow::Months(months) => {
            let months: Vec<i32> = months.iter().map(|m| *m as i32).collect();
            qb.push(" AND EXTRACT(MONTH FROM t.start_date)::int = ANY(");
            qb.push_bind(months);
            qb.push(")");
        }
    }
    qb.push("))");

    if spec.has_geography() {
        qb.push(" AND (FALSE");

        if !spec.country_ids.is_empty() {
            qb.push(" OR t.country_id = ANY(");
            qb.push_bind(spec.country_ids.clone());
            qb.push(")");
        }

        let continents: Vec<String> = spec
            .continents
            .iter()
            .chain(spec.destinations.iter())
            .map(|c| c.as_str().to_string())
            .collect();
        if !continents.is_empty() {
            qb.push(" OR c.continent::text = ANY(");
            qb.push_bind(continents);
            qb.push(")");
        }

        if spec.expand_countries_to_continents && !spec.country_ids.is_empty() {
            qb.push(" OR c.continent IN (SELECT continent FROM countries WHERE id = ANY(");
            qb.push_bind(spec.country_ids.clone());
            qb.push("))");
        }

        qb.push(")");
    }

    if let Some(trip_type_id) = spec.trip_type_id {
        qb.push(" AND t.trip_type_id = ");
        qb.push_bind(trip_type_id);
    }

    if let Some((min, max)) = spec.difficulty_range {
        qb.push(" AND t.difficulty BETWEEN ");
        qb.push_bind(i16::from(min));
        qb.push(" AND ");
        qb.push_bind(i16::from(max));
    }

    if let Some(max_price) = spec.max_price {
        qb.push(" AND t.price::float8 <= ");
        qb.push_bind(max_price);
    }

    if !spec.exclude_ids.is_empty() {
        qb.push(" AND t.id <> ALL(");
        qb.push_bind(spec.exclude_ids.clone());
        qb.push(")");
    }

    qb.push(" GROUP BY t.id, c.id, ty.id ORDER BY t.start_date, t.id");
    qb
}

fn trip_from_row(row: &PgRow) -> Result<TripCandidate, StoreError> {
    let id: i64 = row.try_get("id")?;

    let continent_name: String = row.try_get("continent")?;
    let continent = Continent::from_name(&continent_name).ok_or_else(|| {
        StoreError::InvalidRecord(format!("trip {}: unknown continent {:?}", id, continent_name))
    })?;

    let status_name: String = row.try_get("status")?;
    let status = TripStatus::from_name(&status_name).ok_or_else(|| {
        StoreError::InvalidRecord(format!("trip {}: unknown status {:?}", id, status_name))
    })?;

    let difficulty: i16 = row.try_get("difficulty")?;
    let difficulty = u8::try_from(difficulty).map_err(|_| {
        StoreError::InvalidRecord(format!("trip {}: difficulty {} out of range", id, difficulty))
    })?;

    Ok(TripCandidate {
        id,
        title: row.try_get("title")?,
        country_id: row.try_get("country_id")?,
        country_name: row.try_get("country_name")?,
        continent,
        trip_type_id: row.try_get("trip_type_id")?,
        theme_ids: row.try_get("theme_ids")?,
        difficulty,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        price: row.try_get("price")?,
        max_capacity: row.try_get("max_capacity")?,
        spots_left: row.try_get("spots_left")?,
        status,
        is_flexible_schedule: row.try_get("is_flexible_schedule")?,
    })
}
