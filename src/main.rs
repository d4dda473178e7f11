use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use trip_matcher::config::{CatalogBackend, Settings};
use trip_matcher::routes::{self, trips::AppState};
use trip_matcher::{InMemoryTripStore, PostgresTripStore, Recommender, TripStore};

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let loaded = Settings::load();
    match &loaded {
        Ok(settings) => init_logging(&settings.logging.level, &settings.logging.format),
        Err(_) => init_logging("info", "json"),
    }

    info!("Starting trip matcher service...");

    let settings = loaded.map_err(|e| startup_error("Failed to load configuration", e))?;

    info!("Configuration loaded successfully");

    let store: Arc<dyn TripStore> = match settings.catalog.backend {
        CatalogBackend::Memory => {
            let path = settings
                .catalog
                .path
                .as_deref()
                .ok_or_else(|| startup_error("Memory catalog", "catalog.path is not set"))?;
            let store = InMemoryTripStore::from_json_file(path)
                .map_err(|e| startup_error("Failed to load trip catalog", e))?;
            info!("In-memory catalog initialized ({} trips)", store.len());
            Arc::new(store)
        }
        CatalogBackend::Postgres => {
            let db_max_conn = settings.database.max_connections.unwrap_or(10);
            let store = PostgresTripStore::from_settings(
                &settings.database.url,
                Some(db_max_conn),
                settings.database.min_connections,
                settings.database.acquire_timeout_secs,
                settings.database.idle_timeout_secs,
            )
            .await
            .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;
            info!("PostgreSQL catalog initialized (max: {} connections)", db_max_conn);
            Arc::new(store)
        }
    };

    let weights = settings.scoring.weights;
    let rules = settings.matching.to_rules();
    let recommender = Recommender::new(store, weights, rules);

    info!("Recommender initialized with weights: {:?}, rules: {:?}", weights, rules);

    let app_state = AppState { recommender };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
