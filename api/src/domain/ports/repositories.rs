//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::entities::{
    Advisory, AdvisoryFilter, AdvisoryId, AdvisoryType, AdvisoryUpdate, AreaIntelligence,
    CommunityAlert, CropCycle, CropCycleFilter, CropCycleId, CropCycleUpdate, CropRecommendation,
    DecisionWarning, EconomicImpact, Fpo, FpoMembership, GeoPoint, GrowthStage, LogLevel,
    MarketPrice, MarketPriceFilter, NewAdvisory, NewAreaIntelligence, NewCommunityAlert,
    NewCropCycle, NewDecisionWarning, NewEconomicImpact, NewFpo, NewMarketPrice, NewProfile,
    NewRiskPrediction, NewSeasonalComparison, NewWeatherRecord, NewYieldPrediction, Profile,
    ProfileId, ProfileUpdate, RiskPrediction, RoleCounts, SeasonalComparison, Session, SystemLog,
    WeatherRecord, YieldPrediction, YieldPredictionId, YieldPredictionUpdate,
};
use crate::error::DomainError;

/// Repository for user profiles
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Profile>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, DomainError>;

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Profile>, DomainError>;

    /// Find several profiles at once; missing ids are skipped
    async fn find_by_ids(&self, ids: &[ProfileId]) -> Result<Vec<Profile>, DomainError>;

    async fn create(&self, profile: &NewProfile) -> Result<Profile, DomainError>;

    async fn update(&self, id: &ProfileId, update: &ProfileUpdate)
        -> Result<Profile, DomainError>;

    /// Count profiles per role
    async fn count_by_role(&self) -> Result<RoleCounts, DomainError>;

    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64, DomainError>;
}

/// Repository for bearer sessions
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<(), DomainError>;

    async fn find_by_token_hash(&self, hash: &str) -> Result<Option<Session>, DomainError>;

    async fn delete(&self, hash: &str) -> Result<(), DomainError>;

    /// Remove sessions that expired before `now`, returning how many went
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}

/// Repository for FPO organisations and their members
#[async_trait]
pub trait FpoRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Fpo>, DomainError>;

    /// Create or replace the organisation details for an FPO profile
    async fn upsert(&self, id: &ProfileId, fpo: &NewFpo) -> Result<Fpo, DomainError>;

    /// Add a farmer, reactivating a previous membership if one exists
    async fn add_member(
        &self,
        fpo_id: &ProfileId,
        farmer_id: &ProfileId,
    ) -> Result<FpoMembership, DomainError>;

    async fn active_member_ids(&self, fpo_id: &ProfileId) -> Result<Vec<ProfileId>, DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}

/// Repository for crop cycles
#[async_trait]
pub trait CropCycleRepository: Send + Sync {
    async fn find_by_id(&self, id: &CropCycleId) -> Result<Option<CropCycle>, DomainError>;

    /// List crop cycles, newest first
    async fn list(&self, filter: &CropCycleFilter) -> Result<Vec<CropCycle>, DomainError>;

    async fn count(&self, filter: &CropCycleFilter) -> Result<u64, DomainError>;

    async fn create(&self, crop: &NewCropCycle) -> Result<CropCycle, DomainError>;

    async fn update(
        &self,
        id: &CropCycleId,
        update: &CropCycleUpdate,
    ) -> Result<CropCycle, DomainError>;

    async fn set_stage(&self, id: &CropCycleId, stage: GrowthStage) -> Result<(), DomainError>;

    async fn delete(&self, id: &CropCycleId) -> Result<(), DomainError>;
}

/// Repository for advisories
#[async_trait]
pub trait AdvisoryRepository: Send + Sync {
    async fn find_by_id(&self, id: &AdvisoryId) -> Result<Option<Advisory>, DomainError>;

    /// List advisories, newest first
    async fn list(&self, filter: &AdvisoryFilter) -> Result<Vec<Advisory>, DomainError>;

    async fn create(&self, advisory: &NewAdvisory) -> Result<Advisory, DomainError>;

    async fn update(
        &self,
        id: &AdvisoryId,
        update: &AdvisoryUpdate,
    ) -> Result<Advisory, DomainError>;

    async fn delete(&self, id: &AdvisoryId) -> Result<(), DomainError>;

    /// Whether an advisory of this type exists for the crop since `since`
    async fn exists_since(
        &self,
        crop_cycle_id: &CropCycleId,
        advisory_type: AdvisoryType,
        since: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Number of advisories attached to each crop cycle
    async fn count_by_crop(
        &self,
        crop_ids: &[CropCycleId],
    ) -> Result<HashMap<CropCycleId, u64>, DomainError>;
}

/// Repository for yield predictions
#[async_trait]
pub trait YieldPredictionRepository: Send + Sync {
    async fn find_by_id(
        &self,
        id: &YieldPredictionId,
    ) -> Result<Option<YieldPrediction>, DomainError>;

    /// Predictions for the given crops (all crops when `None`), newest first
    async fn list(
        &self,
        crop_ids: Option<&[CropCycleId]>,
        limit: Option<u64>,
    ) -> Result<Vec<YieldPrediction>, DomainError>;

    async fn latest_for_crop(
        &self,
        crop_id: &CropCycleId,
    ) -> Result<Option<YieldPrediction>, DomainError>;

    async fn exists_for_date(
        &self,
        crop_id: &CropCycleId,
        date: NaiveDate,
    ) -> Result<bool, DomainError>;

    async fn create(&self, prediction: &NewYieldPrediction)
        -> Result<YieldPrediction, DomainError>;

    async fn update(
        &self,
        id: &YieldPredictionId,
        update: &YieldPredictionUpdate,
    ) -> Result<YieldPrediction, DomainError>;
}

/// Repository for cached weather rows
#[async_trait]
pub trait WeatherRepository: Send + Sync {
    async fn find(
        &self,
        location: &GeoPoint,
        date: NaiveDate,
    ) -> Result<Option<WeatherRecord>, DomainError>;

    /// Insert or replace the row for (location, date)
    async fn upsert(&self, record: &NewWeatherRecord) -> Result<WeatherRecord, DomainError>;

    /// Rows for a location from `from` (inclusive) up to `to` (inclusive, open when `None`),
    /// oldest first
    async fn list_range(
        &self,
        location: &GeoPoint,
        from: NaiveDate,
        to: Option<NaiveDate>,
    ) -> Result<Vec<WeatherRecord>, DomainError>;

    async fn count_for_date(&self, date: NaiveDate) -> Result<u64, DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}

/// Repository for market prices
#[async_trait]
pub trait MarketPriceRepository: Send + Sync {
    /// Prices matching the filter, newest date first
    async fn list(&self, filter: &MarketPriceFilter) -> Result<Vec<MarketPrice>, DomainError>;

    /// Insert or replace on (crop_type, market_name, district, state, date)
    async fn upsert(&self, price: &NewMarketPrice) -> Result<MarketPrice, DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}

/// Repository for the intelligence layer tables
#[async_trait]
pub trait IntelligenceRepository: Send + Sync {
    // Risk predictions

    async fn create_risk_prediction(
        &self,
        prediction: &NewRiskPrediction,
    ) -> Result<RiskPrediction, DomainError>;

    /// Unexpired predictions for the crops (all crops when `None`), highest probability first
    async fn active_risk_predictions(
        &self,
        crop_ids: Option<&[CropCycleId]>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RiskPrediction>, DomainError>;

    // Decision warnings

    async fn create_warning(
        &self,
        warning: &NewDecisionWarning,
    ) -> Result<DecisionWarning, DomainError>;

    async fn find_warning(&self, id: &Uuid) -> Result<Option<DecisionWarning>, DomainError>;

    /// Unacknowledged, undismissed warnings for a farmer, newest first
    async fn open_warnings(&self, farmer_id: &ProfileId)
        -> Result<Vec<DecisionWarning>, DomainError>;

    async fn acknowledge_warning(&self, id: &Uuid) -> Result<(), DomainError>;

    async fn dismiss_warning(&self, id: &Uuid) -> Result<(), DomainError>;

    // Area intelligence and community alerts

    /// Insert or replace the area row for a center point
    async fn upsert_area(
        &self,
        area: &NewAreaIntelligence,
    ) -> Result<AreaIntelligence, DomainError>;

    async fn active_areas(&self, now: DateTime<Utc>) -> Result<Vec<AreaIntelligence>, DomainError>;

    async fn create_alert(&self, alert: &NewCommunityAlert)
        -> Result<CommunityAlert, DomainError>;

    async fn active_alerts(&self, now: DateTime<Utc>) -> Result<Vec<CommunityAlert>, DomainError>;

    // Seasonal comparisons

    /// Replace every comparison stored for a crop cycle
    async fn replace_seasonal_comparisons(
        &self,
        crop_id: &CropCycleId,
        rows: &[NewSeasonalComparison],
    ) -> Result<Vec<SeasonalComparison>, DomainError>;

    async fn seasonal_comparisons(
        &self,
        crop_id: &CropCycleId,
    ) -> Result<Vec<SeasonalComparison>, DomainError>;

    // Economic impacts

    async fn create_economic_impact(
        &self,
        impact: &NewEconomicImpact,
    ) -> Result<EconomicImpact, DomainError>;

    /// Impacts recorded by a farmer, newest first
    async fn economic_impacts(
        &self,
        farmer_id: &ProfileId,
    ) -> Result<Vec<EconomicImpact>, DomainError>;
}

/// Repository for seasonal crop recommendations
#[async_trait]
pub trait RecommendationRepository: Send + Sync {
    async fn save(&self, recommendations: &[CropRecommendation]) -> Result<(), DomainError>;
}

/// Repository for persisted system log lines
#[async_trait]
pub trait SystemLogRepository: Send + Sync {
    async fn log(&self, level: LogLevel, message: &str) -> Result<(), DomainError>;

    /// Most recent entries, optionally filtered by level and message prefix
    async fn recent(
        &self,
        level: Option<LogLevel>,
        message_prefix: Option<&str>,
        limit: u64,
    ) -> Result<Vec<SystemLog>, DomainError>;
}
