use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::models::{MatchingRules, ScoreThresholds, ScoringWeights, TierTolerance};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

/// Where the trip catalog is read from
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSettings {
    #[serde(default)]
    pub backend: CatalogBackend,
    /// JSON trip file for the memory backend
    pub path: Option<String>,
}

/// Overrides for the matching rules; unset values keep the defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingSettings {
    pub min_primary_results: Option<usize>,
    pub max_results: Option<usize>,
    pub strict_difficulty_slack: Option<u8>,
    pub relaxed_difficulty_slack: Option<u8>,
    pub strict_budget_multiplier: Option<f64>,
    pub relaxed_budget_multiplier: Option<f64>,
    pub strict_duration_tolerance_days: Option<i64>,
    pub relaxed_duration_tolerance_days: Option<i64>,
    pub relaxed_month_window: Option<u32>,
    pub duration_good_slack_days: Option<i64>,
    pub departing_soon_days: Option<i64>,
    pub high_score_threshold: Option<u8>,
    pub mid_score_threshold: Option<u8>,
}

impl MatchingSettings {
    pub fn to_rules(&self) -> MatchingRules {
        let defaults = MatchingRules::default();

        MatchingRules {
            min_primary_results: self.min_primary_results.unwrap_or(defaults.min_primary_results),
            max_results: self.max_results.unwrap_or(defaults.max_results),
            strict: TierTolerance {
                difficulty_slack: self
                    .strict_difficulty_slack
                    .unwrap_or(defaults.strict.difficulty_slack),
                budget_multiplier: self
                    .strict_budget_multiplier
                    .unwrap_or(defaults.strict.budget_multiplier),
                duration_tolerance_days: self
                    .strict_duration_tolerance_days
                    .unwrap_or(defaults.strict.duration_tolerance_days),
                month_window: defaults.strict.month_window,
            },
            relaxed: TierTolerance {
                difficulty_slack: self
                    .relaxed_difficulty_slack
                    .unwrap_or(defaults.relaxed.difficulty_slack),
                budget_multiplier: self
                    .relaxed_budget_multiplier
                    .unwrap_or(defaults.relaxed.budget_multiplier),
                duration_tolerance_days: self
                    .relaxed_duration_tolerance_days
                    .unwrap_or(defaults.relaxed.duration_tolerance_days),
                month_window: self
                    .relaxed_month_window
                    .unwrap_or(defaults.relaxed.month_window),
            },
            duration_good_slack_days: self
                .duration_good_slack_days
                .unwrap_or(defaults.duration_good_slack_days),
            departing_soon_days: self.departing_soon_days.unwrap_or(defaults.departing_soon_days),
            thresholds: ScoreThresholds {
                high: self.high_score_threshold.unwrap_or(defaults.thresholds.high),
                mid: self.mid_score_threshold.unwrap_or(defaults.thresholds.mid),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: ScoringWeights,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with TRIPMATCH_)
    /// 5. DATABASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., TRIPMATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("TRIPMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_database_url(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("TRIPMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// DATABASE_URL wins over any configured database URL
fn apply_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        Err(_) => Ok(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const MINIMAL: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 8080

        [database]
        url = "postgres://localhost/trips"
    "#;

    #[test]
    fn test_shipped_defaults_match_builtin_tables() {
        let settings = Settings::load_from("config/default.toml").unwrap();

        assert_eq!(settings.scoring.weights, ScoringWeights::default());
        assert_eq!(settings.matching.to_rules(), MatchingRules::default());
        assert_eq!(settings.logging.format, "json");
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(MINIMAL, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.catalog.backend, CatalogBackend::Postgres);
        assert_eq!(settings.scoring.weights, ScoringWeights::default());
        assert_eq!(settings.matching.to_rules(), MatchingRules::default());
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_overrides() {
        let toml = format!(
            "{}\n[catalog]\nbackend = \"memory\"\npath = \"trips.json\"\n\n[matching]\nmax_results = 5\nrelaxed_month_window = 3\n\n[scoring.weights]\nbase = 30.0\n",
            MINIMAL
        );
        let settings: Settings = Config::builder()
            .add_source(File::from_str(&toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.catalog.backend, CatalogBackend::Memory);
        assert_eq!(settings.catalog.path.as_deref(), Some("trips.json"));

        let rules = settings.matching.to_rules();
        assert_eq!(rules.max_results, 5);
        assert_eq!(rules.relaxed.month_window, 3);
        assert_eq!(rules.min_primary_results, 6);

        assert_eq!(settings.scoring.weights.base, 30.0);
        assert_eq!(settings.scoring.weights.theme_full, 25.0);
    }
}
