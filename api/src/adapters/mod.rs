//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod openweather;
pub mod postgres;

pub use openweather::OpenWeatherClient;
pub use postgres::{
    PostgresAdvisoryRepository, PostgresCropCycleRepository, PostgresFpoRepository,
    PostgresIntelligenceRepository, PostgresMarketPriceRepository, PostgresProfileRepository,
    PostgresRecommendationRepository, PostgresSessionRepository, PostgresSystemLogRepository,
    PostgresWeatherRepository, PostgresYieldPredictionRepository,
};
