//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

use crate::domain::entities::{
    Advisory, AdvisoryFilter, AdvisoryId, AdvisoryType, AdvisoryUpdate, AreaIntelligence,
    CommunityAlert, CropCycle, CropCycleFilter, CropCycleId, CropCycleUpdate, CropRecommendation,
    CycleStatus, DecisionWarning, EconomicImpact, Fpo, FpoMembership, GeoPoint, GrowthStage,
    LogLevel, MarketPrice, MarketPriceFilter, NewAdvisory, NewAreaIntelligence,
    NewCommunityAlert, NewCropCycle, NewDecisionWarning, NewEconomicImpact, NewFpo,
    NewMarketPrice, NewProfile, NewRiskPrediction, NewSeasonalComparison, NewWeatherRecord,
    NewYieldPrediction, Profile, ProfileId, ProfileUpdate, RiskPrediction, Role, RoleCounts,
    SeasonalComparison, Session, SystemLog, WeatherObservation, WeatherRecord, YieldPrediction,
    YieldPredictionId, YieldPredictionUpdate,
};
use crate::domain::ports::{
    AdvisoryRepository, CropCycleRepository, FpoRepository, IntelligenceRepository,
    MarketPriceRepository, ProfileRepository, RecommendationRepository, SessionRepository,
    SystemLogRepository, WeatherProvider, WeatherRepository, YieldPredictionRepository,
};
use crate::error::{DomainError, WeatherError};

fn in_scope(farmer_ids: &Option<Vec<ProfileId>>, farmer_id: &ProfileId) -> bool {
    farmer_ids
        .as_ref()
        .map(|ids| ids.contains(farmer_id))
        .unwrap_or(true)
}

// ============================================================================
// In-Memory Profile Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: Arc<RwLock<HashMap<ProfileId, Profile>>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a profile for testing
    pub fn with_profile(self, profile: Profile) -> Self {
        self.profiles.write().unwrap().insert(profile.id, profile);
        self
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Profile>, DomainError> {
        Ok(self.profiles.read().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, DomainError> {
        let profiles = self.profiles.read().unwrap();
        Ok(profiles
            .values()
            .find(|p| p.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Profile>, DomainError> {
        let profiles = self.profiles.read().unwrap();
        Ok(profiles
            .values()
            .find(|p| p.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[ProfileId]) -> Result<Vec<Profile>, DomainError> {
        let profiles = self.profiles.read().unwrap();
        Ok(ids.iter().filter_map(|id| profiles.get(id).cloned()).collect())
    }

    async fn create(&self, new_profile: &NewProfile) -> Result<Profile, DomainError> {
        let profile = Profile {
            id: ProfileId::new(),
            email: new_profile.email.clone(),
            phone: new_profile.phone.clone(),
            password_hash: new_profile.password_hash.clone(),
            full_name: new_profile.full_name.clone(),
            role: new_profile.role,
            language: new_profile.language.clone(),
            location_lat: None,
            location_lng: None,
            district: None,
            state: None,
            farm_size_acres: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.profiles
            .write()
            .unwrap()
            .insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn update(&self, id: &ProfileId, update: &ProfileUpdate) -> Result<Profile, DomainError> {
        let mut profiles = self.profiles.write().unwrap();
        let profile = profiles
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Profile {}", id)))?;

        if let Some(ref v) = update.full_name {
            profile.full_name = Some(v.clone());
        }
        if let Some(ref v) = update.language {
            profile.language = v.clone();
        }
        if let Some(v) = update.location_lat {
            profile.location_lat = Some(v);
        }
        if let Some(v) = update.location_lng {
            profile.location_lng = Some(v);
        }
        if let Some(ref v) = update.district {
            profile.district = Some(v.clone());
        }
        if let Some(ref v) = update.state {
            profile.state = Some(v.clone());
        }
        if let Some(v) = update.farm_size_acres {
            profile.farm_size_acres = Some(v);
        }
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn count_by_role(&self) -> Result<RoleCounts, DomainError> {
        let profiles = self.profiles.read().unwrap();
        let count = |role: Role| profiles.values().filter(|p| p.role == role).count() as u64;
        Ok(RoleCounts {
            total_users: profiles.len() as u64,
            farmers: count(Role::Farmer),
            fpos: count(Role::Fpo),
            admins: count(Role::Admin),
        })
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64, DomainError> {
        let profiles = self.profiles.read().unwrap();
        Ok(profiles.values().filter(|p| p.created_at >= since).count() as u64)
    }
}

// ============================================================================
// In-Memory Session Repository
// ============================================================================

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: &Session) -> Result<(), DomainError> {
        self.sessions
            .write()
            .unwrap()
            .insert(session.token_hash.clone(), session.clone());
        Ok(())
    }

    async fn find_by_token_hash(&self, hash: &str) -> Result<Option<Session>, DomainError> {
        Ok(self.sessions.read().unwrap().get(hash).cloned())
    }

    async fn delete(&self, hash: &str) -> Result<(), DomainError> {
        self.sessions.write().unwrap().remove(hash);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        Ok((before - sessions.len()) as u64)
    }
}

// ============================================================================
// In-Memory FPO Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryFpoRepository {
    fpos: Arc<RwLock<HashMap<ProfileId, Fpo>>>,
    members: Arc<RwLock<Vec<FpoMembership>>>,
}

impl InMemoryFpoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with an active membership
    pub fn with_member(self, fpo_id: ProfileId, farmer_id: ProfileId) -> Self {
        self.members.write().unwrap().push(FpoMembership {
            fpo_id,
            farmer_id,
            is_active: true,
            joined_at: Utc::now(),
        });
        self
    }

    /// Pre-populate with an inactive membership
    pub fn with_inactive_member(self, fpo_id: ProfileId, farmer_id: ProfileId) -> Self {
        self.members.write().unwrap().push(FpoMembership {
            fpo_id,
            farmer_id,
            is_active: false,
            joined_at: Utc::now(),
        });
        self
    }
}

#[async_trait]
impl FpoRepository for InMemoryFpoRepository {
    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Fpo>, DomainError> {
        Ok(self.fpos.read().unwrap().get(id).cloned())
    }

    async fn upsert(&self, id: &ProfileId, fpo: &NewFpo) -> Result<Fpo, DomainError> {
        let mut fpos = self.fpos.write().unwrap();
        let created_at = fpos.get(id).map(|f| f.created_at).unwrap_or_else(Utc::now);
        let stored = Fpo {
            id: *id,
            name: fpo.name.clone(),
            registration_number: fpo.registration_number.clone(),
            district: fpo.district.clone(),
            state: fpo.state.clone(),
            created_at,
        };
        fpos.insert(*id, stored.clone());
        Ok(stored)
    }

    async fn add_member(
        &self,
        fpo_id: &ProfileId,
        farmer_id: &ProfileId,
    ) -> Result<FpoMembership, DomainError> {
        let mut members = self.members.write().unwrap();
        if let Some(existing) = members
            .iter_mut()
            .find(|m| &m.fpo_id == fpo_id && &m.farmer_id == farmer_id)
        {
            existing.is_active = true;
            return Ok(existing.clone());
        }
        let membership = FpoMembership {
            fpo_id: *fpo_id,
            farmer_id: *farmer_id,
            is_active: true,
            joined_at: Utc::now(),
        };
        members.push(membership.clone());
        Ok(membership)
    }

    async fn active_member_ids(&self, fpo_id: &ProfileId) -> Result<Vec<ProfileId>, DomainError> {
        let members = self.members.read().unwrap();
        Ok(members
            .iter()
            .filter(|m| &m.fpo_id == fpo_id && m.is_active)
            .map(|m| m.farmer_id)
            .collect())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.fpos.read().unwrap().len() as u64)
    }
}

// ============================================================================
// In-Memory Crop Cycle Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryCropCycleRepository {
    crops: Arc<RwLock<Vec<CropCycle>>>,
}

impl InMemoryCropCycleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_crop(self, crop: CropCycle) -> Self {
        self.crops.write().unwrap().push(crop);
        self
    }

    fn matching(&self, filter: &CropCycleFilter) -> Vec<CropCycle> {
        let crops = self.crops.read().unwrap();
        let mut result: Vec<CropCycle> = crops
            .iter()
            .rev()
            .filter(|c| in_scope(&filter.farmer_ids, &c.farmer_id))
            .filter(|c| filter.status.map(|s| c.status == s).unwrap_or(true))
            .filter(|c| filter.created_since.map(|t| c.created_at >= t).unwrap_or(true))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }
}

#[async_trait]
impl CropCycleRepository for InMemoryCropCycleRepository {
    async fn find_by_id(&self, id: &CropCycleId) -> Result<Option<CropCycle>, DomainError> {
        let crops = self.crops.read().unwrap();
        Ok(crops.iter().find(|c| &c.id == id).cloned())
    }

    async fn list(&self, filter: &CropCycleFilter) -> Result<Vec<CropCycle>, DomainError> {
        Ok(self.matching(filter))
    }

    async fn count(&self, filter: &CropCycleFilter) -> Result<u64, DomainError> {
        Ok(self.matching(filter).len() as u64)
    }

    async fn create(&self, new_crop: &NewCropCycle) -> Result<CropCycle, DomainError> {
        let crop = CropCycle {
            id: CropCycleId::new(),
            farmer_id: new_crop.farmer_id,
            crop_type: new_crop.crop_type,
            crop_variety: new_crop.crop_variety.clone(),
            sowing_date: new_crop.sowing_date,
            expected_harvest_date: Some(new_crop.expected_harvest_date),
            actual_harvest_date: None,
            actual_yield_tons: None,
            field_size_acres: new_crop.field_size_acres,
            location_lat: new_crop.location_lat,
            location_lng: new_crop.location_lng,
            soil_type: new_crop.soil_type.clone(),
            irrigation_method: new_crop.irrigation_method.clone(),
            current_stage: GrowthStage::Sowing,
            status: CycleStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.crops.write().unwrap().push(crop.clone());
        Ok(crop)
    }

    async fn update(
        &self,
        id: &CropCycleId,
        update: &CropCycleUpdate,
    ) -> Result<CropCycle, DomainError> {
        let mut crops = self.crops.write().unwrap();
        let crop = crops
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Crop cycle {}", id)))?;

        if let Some(ref v) = update.crop_variety {
            crop.crop_variety = Some(v.clone());
        }
        if let Some(v) = update.expected_harvest_date {
            crop.expected_harvest_date = Some(v);
        }
        if let Some(v) = update.actual_harvest_date {
            crop.actual_harvest_date = Some(v);
        }
        if let Some(v) = update.actual_yield_tons {
            crop.actual_yield_tons = Some(v);
        }
        if let Some(v) = update.field_size_acres {
            crop.field_size_acres = Some(v);
        }
        if let Some(v) = update.location_lat {
            crop.location_lat = Some(v);
        }
        if let Some(v) = update.location_lng {
            crop.location_lng = Some(v);
        }
        if let Some(ref v) = update.soil_type {
            crop.soil_type = Some(v.clone());
        }
        if let Some(ref v) = update.irrigation_method {
            crop.irrigation_method = Some(v.clone());
        }
        if let Some(v) = update.current_stage {
            crop.current_stage = v;
        }
        if let Some(v) = update.status {
            crop.status = v;
        }
        crop.updated_at = Utc::now();
        Ok(crop.clone())
    }

    async fn set_stage(&self, id: &CropCycleId, stage: GrowthStage) -> Result<(), DomainError> {
        let mut crops = self.crops.write().unwrap();
        let crop = crops
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Crop cycle {}", id)))?;
        crop.current_stage = stage;
        Ok(())
    }

    async fn delete(&self, id: &CropCycleId) -> Result<(), DomainError> {
        self.crops.write().unwrap().retain(|c| &c.id != id);
        Ok(())
    }
}

// ============================================================================
// In-Memory Advisory Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryAdvisoryRepository {
    advisories: Arc<RwLock<Vec<Advisory>>>,
}

impl InMemoryAdvisoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_advisory(self, advisory: Advisory) -> Self {
        self.advisories.write().unwrap().push(advisory);
        self
    }

    /// Everything stored, in insertion order
    pub fn all(&self) -> Vec<Advisory> {
        self.advisories.read().unwrap().clone()
    }
}

#[async_trait]
impl AdvisoryRepository for InMemoryAdvisoryRepository {
    async fn find_by_id(&self, id: &AdvisoryId) -> Result<Option<Advisory>, DomainError> {
        let advisories = self.advisories.read().unwrap();
        Ok(advisories.iter().find(|a| &a.id == id).cloned())
    }

    async fn list(&self, filter: &AdvisoryFilter) -> Result<Vec<Advisory>, DomainError> {
        let advisories = self.advisories.read().unwrap();
        let mut result: Vec<Advisory> = advisories
            .iter()
            .rev()
            .filter(|a| in_scope(&filter.farmer_ids, &a.farmer_id))
            .filter(|a| !filter.unread_only || !a.is_read)
            .filter(|a| {
                filter
                    .advisory_type
                    .map(|t| a.advisory_type == t)
                    .unwrap_or(true)
            })
            .filter(|a| filter.created_since.map(|t| a.created_at >= t).unwrap_or(true))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            result.truncate(limit as usize);
        }
        Ok(result)
    }

    async fn create(&self, new_advisory: &NewAdvisory) -> Result<Advisory, DomainError> {
        let advisory = Advisory {
            id: AdvisoryId::new(),
            farmer_id: new_advisory.farmer_id,
            crop_cycle_id: new_advisory.crop_cycle_id,
            advisory_type: new_advisory.advisory_type,
            title: new_advisory.title.clone(),
            description: new_advisory.description.clone(),
            priority: new_advisory.priority,
            action_required: new_advisory.action_required,
            is_read: false,
            valid_until: new_advisory.valid_until,
            metadata: new_advisory.metadata.clone(),
            created_at: Utc::now(),
        };
        self.advisories.write().unwrap().push(advisory.clone());
        Ok(advisory)
    }

    async fn update(
        &self,
        id: &AdvisoryId,
        update: &AdvisoryUpdate,
    ) -> Result<Advisory, DomainError> {
        let mut advisories = self.advisories.write().unwrap();
        let advisory = advisories
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Advisory {}", id)))?;

        if let Some(v) = update.is_read {
            advisory.is_read = v;
        }
        if let Some(ref v) = update.title {
            advisory.title = v.clone();
        }
        if let Some(ref v) = update.description {
            advisory.description = v.clone();
        }
        if let Some(v) = update.priority {
            advisory.priority = v;
        }
        if let Some(v) = update.action_required {
            advisory.action_required = v;
        }
        if let Some(v) = update.valid_until {
            advisory.valid_until = Some(v);
        }
        if let Some(ref v) = update.metadata {
            advisory.metadata = v.clone();
        }
        Ok(advisory.clone())
    }

    async fn delete(&self, id: &AdvisoryId) -> Result<(), DomainError> {
        self.advisories.write().unwrap().retain(|a| &a.id != id);
        Ok(())
    }

    async fn exists_since(
        &self,
        crop_cycle_id: &CropCycleId,
        advisory_type: AdvisoryType,
        since: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let advisories = self.advisories.read().unwrap();
        Ok(advisories.iter().any(|a| {
            a.crop_cycle_id.as_ref() == Some(crop_cycle_id)
                && a.advisory_type == advisory_type
                && a.created_at >= since
        }))
    }

    async fn count_by_crop(
        &self,
        crop_ids: &[CropCycleId],
    ) -> Result<HashMap<CropCycleId, u64>, DomainError> {
        let advisories = self.advisories.read().unwrap();
        let mut counts = HashMap::new();
        for crop_id in advisories.iter().filter_map(|a| a.crop_cycle_id) {
            if crop_ids.contains(&crop_id) {
                *counts.entry(crop_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

// ============================================================================
// In-Memory Yield Prediction Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryYieldPredictionRepository {
    predictions: Arc<RwLock<Vec<YieldPrediction>>>,
}

impl InMemoryYieldPredictionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prediction(self, prediction: YieldPrediction) -> Self {
        self.predictions.write().unwrap().push(prediction);
        self
    }

    pub fn all(&self) -> Vec<YieldPrediction> {
        self.predictions.read().unwrap().clone()
    }
}

#[async_trait]
impl YieldPredictionRepository for InMemoryYieldPredictionRepository {
    async fn find_by_id(
        &self,
        id: &YieldPredictionId,
    ) -> Result<Option<YieldPrediction>, DomainError> {
        let predictions = self.predictions.read().unwrap();
        Ok(predictions.iter().find(|p| &p.id == id).cloned())
    }

    async fn list(
        &self,
        crop_ids: Option<&[CropCycleId]>,
        limit: Option<u64>,
    ) -> Result<Vec<YieldPrediction>, DomainError> {
        let predictions = self.predictions.read().unwrap();
        let mut result: Vec<YieldPrediction> = predictions
            .iter()
            .rev()
            .filter(|p| crop_ids.map(|ids| ids.contains(&p.crop_cycle_id)).unwrap_or(true))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            result.truncate(limit as usize);
        }
        Ok(result)
    }

    async fn latest_for_crop(
        &self,
        crop_id: &CropCycleId,
    ) -> Result<Option<YieldPrediction>, DomainError> {
        Ok(self
            .list(Some(std::slice::from_ref(crop_id)), Some(1))
            .await?
            .into_iter()
            .next())
    }

    async fn exists_for_date(
        &self,
        crop_id: &CropCycleId,
        date: NaiveDate,
    ) -> Result<bool, DomainError> {
        let predictions = self.predictions.read().unwrap();
        Ok(predictions
            .iter()
            .any(|p| &p.crop_cycle_id == crop_id && p.prediction_date == date))
    }

    async fn create(
        &self,
        new_prediction: &NewYieldPrediction,
    ) -> Result<YieldPrediction, DomainError> {
        let prediction = YieldPrediction {
            id: YieldPredictionId::new(),
            crop_cycle_id: new_prediction.crop_cycle_id,
            predicted_yield_tons: new_prediction.predicted_yield_tons,
            confidence_score: new_prediction.confidence_score,
            prediction_date: new_prediction.prediction_date,
            model_version: new_prediction.model_version.clone(),
            factors: new_prediction.factors.clone(),
            created_at: Utc::now(),
        };
        self.predictions.write().unwrap().push(prediction.clone());
        Ok(prediction)
    }

    async fn update(
        &self,
        id: &YieldPredictionId,
        update: &YieldPredictionUpdate,
    ) -> Result<YieldPrediction, DomainError> {
        let mut predictions = self.predictions.write().unwrap();
        let prediction = predictions
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Yield prediction {}", id)))?;

        if let Some(v) = update.predicted_yield_tons {
            prediction.predicted_yield_tons = v;
        }
        if let Some(v) = update.confidence_score {
            prediction.confidence_score = v;
        }
        if let Some(ref v) = update.factors {
            prediction.factors = v.clone();
        }
        Ok(prediction.clone())
    }
}

// ============================================================================
// In-Memory Weather Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryWeatherRepository {
    records: Arc<RwLock<Vec<WeatherRecord>>>,
}

impl InMemoryWeatherRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, record: WeatherRecord) -> Self {
        self.records.write().unwrap().push(record);
        self
    }

    pub fn all(&self) -> Vec<WeatherRecord> {
        self.records.read().unwrap().clone()
    }
}

#[async_trait]
impl WeatherRepository for InMemoryWeatherRepository {
    async fn find(
        &self,
        location: &GeoPoint,
        date: NaiveDate,
    ) -> Result<Option<WeatherRecord>, DomainError> {
        let records = self.records.read().unwrap();
        Ok(records
            .iter()
            .find(|r| &r.location() == location && r.date == date)
            .cloned())
    }

    async fn upsert(&self, new_record: &NewWeatherRecord) -> Result<WeatherRecord, DomainError> {
        let obs = &new_record.observation;
        let record = WeatherRecord {
            id: Uuid::new_v4(),
            location_lat: new_record.location.lat,
            location_lng: new_record.location.lng,
            date: new_record.date,
            temperature_min: obs.temperature_min,
            temperature_max: obs.temperature_max,
            humidity: obs.humidity,
            rainfall_mm: obs.rainfall_mm,
            wind_speed: obs.wind_speed,
            weather_condition: obs.weather_condition.clone(),
            forecast_data: obs.forecast.clone(),
            source: obs.source,
            expires_at: new_record.expires_at,
            created_at: Utc::now(),
        };

        let mut records = self.records.write().unwrap();
        records.retain(|r| !(r.location() == new_record.location && r.date == new_record.date));
        records.push(record.clone());
        Ok(record)
    }

    async fn list_range(
        &self,
        location: &GeoPoint,
        from: NaiveDate,
        to: Option<NaiveDate>,
    ) -> Result<Vec<WeatherRecord>, DomainError> {
        let records = self.records.read().unwrap();
        let mut result: Vec<WeatherRecord> = records
            .iter()
            .filter(|r| &r.location() == location && r.date >= from)
            .filter(|r| to.map(|t| r.date <= t).unwrap_or(true))
            .cloned()
            .collect();
        result.sort_by_key(|r| r.date);
        Ok(result)
    }

    async fn count_for_date(&self, date: NaiveDate) -> Result<u64, DomainError> {
        let records = self.records.read().unwrap();
        Ok(records.iter().filter(|r| r.date == date).count() as u64)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.records.read().unwrap().len() as u64)
    }
}

// ============================================================================
// In-Memory Market Price Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryMarketPriceRepository {
    prices: Arc<RwLock<Vec<MarketPrice>>>,
}

impl InMemoryMarketPriceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(self, price: MarketPrice) -> Self {
        self.prices.write().unwrap().push(price);
        self
    }
}

#[async_trait]
impl MarketPriceRepository for InMemoryMarketPriceRepository {
    async fn list(&self, filter: &MarketPriceFilter) -> Result<Vec<MarketPrice>, DomainError> {
        let prices = self.prices.read().unwrap();
        let mut result: Vec<MarketPrice> = prices
            .iter()
            .filter(|p| filter.crop_type.map(|c| p.crop_type == c).unwrap_or(true))
            .filter(|p| {
                filter
                    .state
                    .as_deref()
                    .map(|s| p.state == s)
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        result.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = filter.limit {
            result.truncate(limit as usize);
        }
        Ok(result)
    }

    async fn upsert(&self, price: &NewMarketPrice) -> Result<MarketPrice, DomainError> {
        let stored = MarketPrice {
            id: Uuid::new_v4(),
            crop_type: price.crop_type,
            market_name: price.market_name.clone(),
            district: price.district.clone(),
            state: price.state.clone(),
            price_per_quintal: price.price_per_quintal,
            date: price.date,
            created_at: Utc::now(),
        };

        let mut prices = self.prices.write().unwrap();
        prices.retain(|p| {
            !(p.crop_type == price.crop_type
                && p.market_name == price.market_name
                && p.district == price.district
                && p.state == price.state
                && p.date == price.date)
        });
        prices.push(stored.clone());
        Ok(stored)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.prices.read().unwrap().len() as u64)
    }
}

// ============================================================================
// In-Memory Intelligence Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryIntelligenceRepository {
    risks: Arc<RwLock<Vec<RiskPrediction>>>,
    warnings: Arc<RwLock<Vec<DecisionWarning>>>,
    areas: Arc<RwLock<Vec<AreaIntelligence>>>,
    alerts: Arc<RwLock<Vec<CommunityAlert>>>,
    comparisons: Arc<RwLock<Vec<SeasonalComparison>>>,
    impacts: Arc<RwLock<Vec<EconomicImpact>>>,
}

impl InMemoryIntelligenceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_risk(self, risk: RiskPrediction) -> Self {
        self.risks.write().unwrap().push(risk);
        self
    }

    pub fn with_warning(self, warning: DecisionWarning) -> Self {
        self.warnings.write().unwrap().push(warning);
        self
    }

    pub fn with_alert(self, alert: CommunityAlert) -> Self {
        self.alerts.write().unwrap().push(alert);
        self
    }

    pub fn warnings(&self) -> Vec<DecisionWarning> {
        self.warnings.read().unwrap().clone()
    }

    pub fn risks(&self) -> Vec<RiskPrediction> {
        self.risks.read().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<CommunityAlert> {
        self.alerts.read().unwrap().clone()
    }

    fn set_warning_flag(
        &self,
        id: &Uuid,
        apply: impl FnOnce(&mut DecisionWarning),
    ) -> Result<(), DomainError> {
        let mut warnings = self.warnings.write().unwrap();
        let warning = warnings
            .iter_mut()
            .find(|w| &w.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Warning {}", id)))?;
        apply(warning);
        Ok(())
    }
}

#[async_trait]
impl IntelligenceRepository for InMemoryIntelligenceRepository {
    async fn create_risk_prediction(
        &self,
        prediction: &NewRiskPrediction,
    ) -> Result<RiskPrediction, DomainError> {
        let a = &prediction.assessment;
        let stored = RiskPrediction {
            id: Uuid::new_v4(),
            crop_cycle_id: prediction.crop_cycle_id,
            risk_type: a.risk_type,
            risk_level: a.risk_level,
            probability: a.probability,
            time_to_impact_days: a.time_to_impact_days,
            confidence_score: a.confidence_score,
            affected_area_percentage: a.affected_area_percentage,
            economic_impact_estimate: a.economic_impact_estimate,
            prevention_cost_estimate: a.prevention_cost_estimate,
            predicted_loss_if_ignored: a.predicted_loss_if_ignored,
            mitigation_strategies: a.mitigation_strategies.clone(),
            contributing_factors: a.contributing_factors.clone(),
            model_version: prediction.model_version.clone(),
            expires_at: prediction.expires_at,
            created_at: Utc::now(),
        };
        self.risks.write().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn active_risk_predictions(
        &self,
        crop_ids: Option<&[CropCycleId]>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RiskPrediction>, DomainError> {
        let risks = self.risks.read().unwrap();
        let mut result: Vec<RiskPrediction> = risks
            .iter()
            .filter(|r| r.expires_at > now)
            .filter(|r| crop_ids.map(|ids| ids.contains(&r.crop_cycle_id)).unwrap_or(true))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        Ok(result)
    }

    async fn create_warning(
        &self,
        warning: &NewDecisionWarning,
    ) -> Result<DecisionWarning, DomainError> {
        let stored = DecisionWarning {
            id: Uuid::new_v4(),
            farmer_id: warning.farmer_id,
            crop_cycle_id: warning.crop_cycle_id,
            warning_type: warning.warning_type.clone(),
            risk_level: warning.risk_level,
            title: warning.title.clone(),
            description: warning.description.clone(),
            potential_loss_estimate: warning.potential_loss_estimate,
            is_acknowledged: false,
            is_dismissed: false,
            created_at: Utc::now(),
        };
        self.warnings.write().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn find_warning(&self, id: &Uuid) -> Result<Option<DecisionWarning>, DomainError> {
        let warnings = self.warnings.read().unwrap();
        Ok(warnings.iter().find(|w| &w.id == id).cloned())
    }

    async fn open_warnings(
        &self,
        farmer_id: &ProfileId,
    ) -> Result<Vec<DecisionWarning>, DomainError> {
        let warnings = self.warnings.read().unwrap();
        let mut result: Vec<DecisionWarning> = warnings
            .iter()
            .rev()
            .filter(|w| &w.farmer_id == farmer_id && w.is_open())
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn acknowledge_warning(&self, id: &Uuid) -> Result<(), DomainError> {
        self.set_warning_flag(id, |w| w.is_acknowledged = true)
    }

    async fn dismiss_warning(&self, id: &Uuid) -> Result<(), DomainError> {
        self.set_warning_flag(id, |w| w.is_dismissed = true)
    }

    async fn upsert_area(
        &self,
        area: &NewAreaIntelligence,
    ) -> Result<AreaIntelligence, DomainError> {
        let stored = AreaIntelligence {
            id: Uuid::new_v4(),
            center_lat: area.center.lat,
            center_lng: area.center.lng,
            radius_km: area.radius_km,
            active_crops: area.active_crops,
            total_area_acres: area.total_area_acres,
            crop_distribution: area.crop_distribution.clone(),
            regional_risks: area.regional_risks,
            expires_at: area.expires_at,
            updated_at: Utc::now(),
        };
        let mut areas = self.areas.write().unwrap();
        areas.retain(|a| a.center() != area.center);
        areas.push(stored.clone());
        Ok(stored)
    }

    async fn active_areas(&self, now: DateTime<Utc>) -> Result<Vec<AreaIntelligence>, DomainError> {
        let areas = self.areas.read().unwrap();
        Ok(areas.iter().filter(|a| a.expires_at > now).cloned().collect())
    }

    async fn create_alert(
        &self,
        alert: &NewCommunityAlert,
    ) -> Result<CommunityAlert, DomainError> {
        let stored = CommunityAlert {
            id: Uuid::new_v4(),
            alert_type: alert.alert_type.clone(),
            severity: alert.severity,
            description: alert.description.clone(),
            center_lat: alert.center.lat,
            center_lng: alert.center.lng,
            affected_radius_km: alert.affected_radius_km,
            is_active: true,
            expires_at: alert.expires_at,
            created_at: Utc::now(),
        };
        self.alerts.write().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn active_alerts(&self, now: DateTime<Utc>) -> Result<Vec<CommunityAlert>, DomainError> {
        let alerts = self.alerts.read().unwrap();
        Ok(alerts
            .iter()
            .filter(|a| a.is_active && a.expires_at > now)
            .cloned()
            .collect())
    }

    async fn replace_seasonal_comparisons(
        &self,
        crop_id: &CropCycleId,
        rows: &[NewSeasonalComparison],
    ) -> Result<Vec<SeasonalComparison>, DomainError> {
        let stored: Vec<SeasonalComparison> = rows
            .iter()
            .map(|row| SeasonalComparison {
                id: Uuid::new_v4(),
                crop_cycle_id: row.crop_cycle_id,
                comparison_season: row.comparison_season.clone(),
                compared_cycle_id: row.compared_cycle_id,
                total_rainfall_mm: row.total_rainfall_mm,
                avg_temperature: row.avg_temperature,
                rainfall_deviation_percent: row.rainfall_deviation_percent,
                temperature_deviation_percent: row.temperature_deviation_percent,
                yield_tons: row.yield_tons,
                created_at: Utc::now(),
            })
            .collect();

        let mut comparisons = self.comparisons.write().unwrap();
        comparisons.retain(|c| &c.crop_cycle_id != crop_id);
        comparisons.extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn seasonal_comparisons(
        &self,
        crop_id: &CropCycleId,
    ) -> Result<Vec<SeasonalComparison>, DomainError> {
        let comparisons = self.comparisons.read().unwrap();
        Ok(comparisons
            .iter()
            .filter(|c| &c.crop_cycle_id == crop_id)
            .cloned()
            .collect())
    }

    async fn create_economic_impact(
        &self,
        impact: &NewEconomicImpact,
    ) -> Result<EconomicImpact, DomainError> {
        let stored = EconomicImpact {
            id: Uuid::new_v4(),
            farmer_id: impact.farmer_id,
            advisory_id: impact.advisory_id,
            advisory_type: impact.advisory_type,
            risk_prediction_id: impact.risk_prediction_id,
            estimated_cost: impact.estimated_cost,
            estimated_loss_prevented: impact.estimated_loss_prevented,
            roi_percentage: impact.roi_percentage,
            created_at: Utc::now(),
        };
        self.impacts.write().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn economic_impacts(
        &self,
        farmer_id: &ProfileId,
    ) -> Result<Vec<EconomicImpact>, DomainError> {
        let impacts = self.impacts.read().unwrap();
        Ok(impacts
            .iter()
            .rev()
            .filter(|i| &i.farmer_id == farmer_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// In-Memory Recommendation Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryRecommendationRepository {
    saved: Arc<RwLock<Vec<CropRecommendation>>>,
}

impl InMemoryRecommendationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<CropRecommendation> {
        self.saved.read().unwrap().clone()
    }
}

#[async_trait]
impl RecommendationRepository for InMemoryRecommendationRepository {
    async fn save(&self, recommendations: &[CropRecommendation]) -> Result<(), DomainError> {
        self.saved
            .write()
            .unwrap()
            .extend(recommendations.iter().cloned());
        Ok(())
    }
}

// ============================================================================
// In-Memory System Log Repository
// ============================================================================

#[derive(Default)]
pub struct InMemorySystemLogRepository {
    logs: Arc<RwLock<Vec<SystemLog>>>,
}

impl InMemorySystemLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<SystemLog> {
        self.logs.read().unwrap().clone()
    }
}

#[async_trait]
impl SystemLogRepository for InMemorySystemLogRepository {
    async fn log(&self, level: LogLevel, message: &str) -> Result<(), DomainError> {
        self.logs.write().unwrap().push(SystemLog {
            id: Uuid::new_v4(),
            level,
            message: message.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn recent(
        &self,
        level: Option<LogLevel>,
        message_prefix: Option<&str>,
        limit: u64,
    ) -> Result<Vec<SystemLog>, DomainError> {
        let logs = self.logs.read().unwrap();
        Ok(logs
            .iter()
            .rev()
            .filter(|l| level.map(|lv| l.level == lv).unwrap_or(true))
            .filter(|l| message_prefix.map(|p| l.message.starts_with(p)).unwrap_or(true))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Mock Weather Provider
// ============================================================================

/// Weather provider that returns a fixed observation, or fails
#[derive(Default)]
pub struct MockWeatherProvider {
    observation: Option<WeatherObservation>,
    calls: Mutex<Vec<(GeoPoint, NaiveDate)>>,
}

impl MockWeatherProvider {
    /// Provider that always fails with `NotConfigured`
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observation(mut self, observation: WeatherObservation) -> Self {
        self.observation = Some(observation);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl WeatherProvider for MockWeatherProvider {
    async fn fetch(
        &self,
        location: &GeoPoint,
        date: NaiveDate,
    ) -> Result<WeatherObservation, WeatherError> {
        self.calls.lock().unwrap().push((*location, date));
        self.observation.clone().ok_or(WeatherError::NotConfigured)
    }
}
