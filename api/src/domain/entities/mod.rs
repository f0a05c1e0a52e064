//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod advisory;
pub mod crop_cycle;
pub mod fpo;
pub mod geo;
pub mod intelligence;
pub mod market;
pub mod profile;
pub mod recommendation;
pub mod system_log;
pub mod weather;
pub mod yield_prediction;

pub use advisory::{
    Advisory, AdvisoryDraft, AdvisoryFilter, AdvisoryId, AdvisoryType, AdvisoryUpdate,
    NewAdvisory, Priority,
};
pub use crop_cycle::{
    CropCycle, CropCycleFilter, CropCycleId, CropCycleUpdate, CropType, CycleStatus, GrowthStage,
    NewCropCycle,
};
pub use fpo::{Fpo, FpoMembership, NewFpo};
pub use geo::GeoPoint;
pub use intelligence::{
    AreaIntelligence, CommunityAlert, DecisionWarning, EconomicImpact, NewAreaIntelligence,
    NewCommunityAlert, NewDecisionWarning, NewEconomicImpact, NewRiskPrediction,
    NewSeasonalComparison, RegionalRisks, RiskAssessment, RiskLevel, RiskPrediction, RiskType,
    SeasonalComparison,
};
pub use market::{MarketPrice, MarketPriceFilter, NewMarketPrice};
pub use profile::{NewProfile, Profile, ProfileId, ProfileUpdate, Role, RoleCounts, Session};
pub use recommendation::{CropRecommendation, Range, Season};
pub use system_log::{LogLevel, SystemLog};
pub use weather::{ForecastDay, NewWeatherRecord, WeatherObservation, WeatherRecord, WeatherSource};
pub use yield_prediction::{
    NewYieldPrediction, YieldPrediction, YieldPredictionId, YieldPredictionUpdate,
};
