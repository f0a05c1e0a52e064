//! CropIQ API Server
//!
//! Advisory backend for farmers, Farmer Producer Organizations and admins:
//! crop cycles, weather, yield and price forecasts, risk intelligence.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use sea_orm::{Database, DatabaseConnection};
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;
mod jobs;

#[cfg(test)]
mod test_utils;


use adapters::{
    OpenWeatherClient, PostgresAdvisoryRepository, PostgresCropCycleRepository,
    PostgresFpoRepository, PostgresIntelligenceRepository, PostgresMarketPriceRepository,
    PostgresProfileRepository, PostgresRecommendationRepository, PostgresSessionRepository,
    PostgresSystemLogRepository, PostgresWeatherRepository, PostgresYieldPredictionRepository,
};
use app::{
    AdvisoryService, AuthService, CropService, DashboardService, FpoService, IntelligenceService,
    MarketService, SchedulerService, WeatherService, YieldService,
};
use config::Config;
use jobs::ScheduledJobs;

pub type Auth = AuthService<PostgresProfileRepository, PostgresSessionRepository>;
pub type Fpos = FpoService<PostgresFpoRepository, PostgresProfileRepository>;
pub type Crops = CropService<
    PostgresCropCycleRepository,
    PostgresAdvisoryRepository,
    PostgresYieldPredictionRepository,
    PostgresIntelligenceRepository,
    PostgresFpoRepository,
    PostgresRecommendationRepository,
>;
pub type Advisories = AdvisoryService<
    PostgresAdvisoryRepository,
    PostgresCropCycleRepository,
    PostgresFpoRepository,
    PostgresWeatherRepository,
>;
pub type Yields = YieldService<
    PostgresYieldPredictionRepository,
    PostgresCropCycleRepository,
    PostgresFpoRepository,
    PostgresWeatherRepository,
>;
pub type Weather = WeatherService<PostgresWeatherRepository, OpenWeatherClient>;
pub type Market = MarketService<PostgresMarketPriceRepository>;
pub type Intelligence = IntelligenceService<
    PostgresIntelligenceRepository,
    PostgresCropCycleRepository,
    PostgresWeatherRepository,
    PostgresAdvisoryRepository,
    PostgresFpoRepository,
>;
pub type Dashboards = DashboardService<
    PostgresProfileRepository,
    PostgresFpoRepository,
    PostgresCropCycleRepository,
    PostgresAdvisoryRepository,
    PostgresYieldPredictionRepository,
    PostgresWeatherRepository,
    PostgresMarketPriceRepository,
    PostgresSystemLogRepository,
>;
pub type Scheduler = SchedulerService<
    ScheduledJobs,
    PostgresSystemLogRepository,
    PostgresProfileRepository,
    PostgresCropCycleRepository,
    PostgresWeatherRepository,
>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<Auth>,
    pub fpo_service: Arc<Fpos>,
    pub crop_service: Arc<Crops>,
    pub advisory_service: Arc<Advisories>,
    pub yield_service: Arc<Yields>,
    pub weather_service: Arc<Weather>,
    pub market_service: Arc<Market>,
    pub intelligence_service: Arc<Intelligence>,
    pub dashboard_service: Arc<Dashboards>,
    pub scheduler_service: Arc<Scheduler>,
    pub config: Config,
}

impl AppState {
    /// Wire adapters into services
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let profile_repo = Arc::new(PostgresProfileRepository::new(db.clone()));
        let session_repo = Arc::new(PostgresSessionRepository::new(db.clone()));
        let fpo_repo = Arc::new(PostgresFpoRepository::new(db.clone()));
        let crop_repo = Arc::new(PostgresCropCycleRepository::new(db.clone()));
        let advisory_repo = Arc::new(PostgresAdvisoryRepository::new(db.clone()));
        let prediction_repo = Arc::new(PostgresYieldPredictionRepository::new(db.clone()));
        let weather_repo = Arc::new(PostgresWeatherRepository::new(db.clone()));
        let price_repo = Arc::new(PostgresMarketPriceRepository::new(db.clone()));
        let intelligence_repo = Arc::new(PostgresIntelligenceRepository::new(db.clone()));
        let recommendation_repo = Arc::new(PostgresRecommendationRepository::new(db.clone()));
        let log_repo = Arc::new(PostgresSystemLogRepository::new(db));

        // Without an API key the client reports NotConfigured and the
        // weather service falls back to synthetic readings
        let weather_client = Arc::new(OpenWeatherClient::new(
            config.openweather_url.clone(),
            config.openweather_api_key.clone(),
        ));

        let auth_service = Arc::new(AuthService::new(
            profile_repo.clone(),
            session_repo,
            config.session_ttl_hours,
        ));

        let fpo_service = Arc::new(FpoService::new(fpo_repo.clone(), profile_repo.clone()));

        let crop_service = Arc::new(CropService::new(
            crop_repo.clone(),
            advisory_repo.clone(),
            prediction_repo.clone(),
            intelligence_repo.clone(),
            fpo_repo.clone(),
            recommendation_repo,
        ));

        let advisory_service = Arc::new(AdvisoryService::new(
            advisory_repo.clone(),
            crop_repo.clone(),
            fpo_repo.clone(),
            weather_repo.clone(),
        ));

        let yield_service = Arc::new(YieldService::new(
            prediction_repo.clone(),
            crop_repo.clone(),
            fpo_repo.clone(),
            weather_repo.clone(),
        ));

        let weather_service = Arc::new(WeatherService::new(
            weather_repo.clone(),
            weather_client,
            config.weather_cache_ttl_hours,
        ));

        let market_service = Arc::new(MarketService::new(price_repo.clone()));

        let intelligence_service = Arc::new(IntelligenceService::new(
            intelligence_repo,
            crop_repo.clone(),
            weather_repo.clone(),
            advisory_repo.clone(),
            fpo_repo.clone(),
        ));

        let dashboard_service = Arc::new(DashboardService::new(
            profile_repo.clone(),
            fpo_repo,
            crop_repo.clone(),
            advisory_repo,
            prediction_repo,
            weather_repo.clone(),
            price_repo,
            log_repo.clone(),
        ));

        let jobs = Arc::new(ScheduledJobs {
            crop_repo: crop_repo.clone(),
            weather: weather_service.clone(),
            advisories: advisory_service.clone(),
            yields: yield_service.clone(),
            crops: crop_service.clone(),
            market: market_service.clone(),
            intelligence: intelligence_service.clone(),
        });

        let scheduler_service = Arc::new(SchedulerService::new(
            jobs,
            log_repo,
            profile_repo,
            crop_repo,
            weather_repo,
            config.scheduler_enabled,
        ));

        Self {
            auth_service,
            fpo_service,
            crop_service,
            advisory_service,
            yield_service,
            weather_service,
            market_service,
            intelligence_service,
            dashboard_service,
            scheduler_service,
            config,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the full router
pub fn router(state: AppState) -> anyhow::Result<Router> {
    // Rate limiting config: 2 req/sec sustained, burst of 5
    // Uses PeerIpKeyExtractor to get client IP from socket connection
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(2)
            .burst_size(5)
            .finish()
            .context("Failed to build governor config")?,
    );

    // Rate-limited routes (account creation and login)
    let rate_limited_routes = Router::new()
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/signin", post(handlers::signin))
        .layer(GovernorLayer {
            config: governor_config,
        });

    let protected_routes = Router::new()
        // Auth
        .route("/auth/signout", post(handlers::signout))
        .route(
            "/auth/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        // FPO
        .route("/fpo", post(handlers::register_fpo))
        .route(
            "/fpo/members",
            get(handlers::list_members).post(handlers::add_member),
        )
        // Crops
        .route(
            "/crops",
            get(handlers::list_crops).post(handlers::create_crop),
        )
        .route("/crops/recommendations", get(handlers::crop_recommendations))
        .route(
            "/crops/:id",
            get(handlers::get_crop)
                .put(handlers::update_crop)
                .delete(handlers::delete_crop),
        )
        // Advisories
        .route(
            "/advisories",
            get(handlers::list_advisories).post(handlers::create_advisory),
        )
        .route(
            "/advisories/:id",
            put(handlers::update_advisory).delete(handlers::delete_advisory),
        )
        // Yield predictions
        .route(
            "/yield-predictions",
            get(handlers::get_predictions).post(handlers::create_prediction),
        )
        .route("/yield-predictions/:id", put(handlers::update_prediction))
        // Weather refresh (admin)
        .route("/weather", post(handlers::refresh_weather))
        // Market writes (admin)
        .route("/market/prices", post(handlers::upsert_prices))
        // Intelligence
        .route(
            "/intelligence",
            get(handlers::get_intelligence).post(handlers::post_intelligence),
        )
        // Dashboard
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/dashboard/analytics", get(handlers::get_analytics))
        // Scheduler
        .route("/scheduler", post(handlers::run_tasks))
        .route("/scheduler/status", get(handlers::scheduler_status))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let app = Router::new()
        // Health check (no auth)
        .route("/health", get(health))
        // Public reads
        .route("/weather", get(handlers::get_weather))
        .route("/market/prices", get(handlers::list_prices))
        .route("/market/predictions", get(handlers::predict_prices))
        // Webhook (no auth, uses signature verification)
        .route("/scheduler/webhook", post(handlers::scheduler_webhook))
        .merge(rate_limited_routes)
        .merge(protected_routes)
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cropiq_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CropIQ API...");

    // Load configuration
    let config = Config::from_env()?;
    if config.openweather_api_key.is_none() {
        tracing::warn!("OPENWEATHER_API_KEY not set, serving synthetic weather");
    }

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    let state = AppState::new(db, config.clone());

    match state.auth_service.purge_expired_sessions().await {
        Ok(purged) => tracing::info!(purged, "Expired sessions removed"),
        Err(e) => tracing::warn!(error = %e, "Failed to purge expired sessions"),
    }

    if config.scheduler_enabled {
        state.scheduler_service.clone().spawn();
    } else {
        tracing::info!("Scheduler loop disabled");
    }

    let app = router(state)?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
