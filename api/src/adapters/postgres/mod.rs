//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod advisory_repo;
pub mod crop_cycle_repo;
pub mod fpo_repo;
pub mod intelligence_repo;
pub mod market_price_repo;
pub mod profile_repo;
pub mod system_log_repo;
pub mod weather_repo;
pub mod yield_prediction_repo;

#[cfg(test)]
mod integration_tests;

pub use advisory_repo::PostgresAdvisoryRepository;
pub use crop_cycle_repo::PostgresCropCycleRepository;
pub use fpo_repo::PostgresFpoRepository;
pub use intelligence_repo::PostgresIntelligenceRepository;
pub use market_price_repo::PostgresMarketPriceRepository;
pub use profile_repo::{PostgresProfileRepository, PostgresSessionRepository};
pub use system_log_repo::{PostgresRecommendationRepository, PostgresSystemLogRepository};
pub use weather_repo::PostgresWeatherRepository;
pub use yield_prediction_repo::PostgresYieldPredictionRepository;
