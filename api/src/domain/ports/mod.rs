//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod repositories;
pub mod weather;

pub use repositories::{
    AdvisoryRepository, CropCycleRepository, FpoRepository, IntelligenceRepository,
    MarketPriceRepository, ProfileRepository, RecommendationRepository, SessionRepository,
    SystemLogRepository, WeatherRepository, YieldPredictionRepository,
};
pub use weather::WeatherProvider;
