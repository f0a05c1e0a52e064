//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::entities::{
    Advisory, AdvisoryId, AdvisoryType, CropCycle, CropCycleId, CropType, CycleStatus,
    DecisionWarning, GeoPoint, GrowthStage, MarketPrice, Priority, Profile, ProfileId,
    RiskLevel, RiskPrediction, RiskType, Role, WeatherObservation, WeatherRecord, WeatherSource,
    YieldPrediction, YieldPredictionId,
};

/// Ludhiana, Punjab
pub const TEST_LOCATION: GeoPoint = GeoPoint {
    lat: 30.9,
    lng: 75.85,
};

/// Create a test profile with the given role
pub fn test_profile(role: Role) -> Profile {
    let id = ProfileId::new();
    Profile {
        id,
        email: Some(format!("{}-{}@example.com", role, id)),
        phone: None,
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        full_name: Some("Test User".to_string()),
        role,
        language: "en".to_string(),
        location_lat: None,
        location_lng: None,
        district: Some("Ludhiana".to_string()),
        state: Some("Punjab".to_string()),
        farm_size_acres: Some(5.0),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn test_farmer() -> Profile {
    test_profile(Role::Farmer)
}

pub fn test_fpo() -> Profile {
    test_profile(Role::Fpo)
}

pub fn test_admin() -> Profile {
    test_profile(Role::Admin)
}

/// Create a test farmer with a location
pub fn test_farmer_at(location: GeoPoint) -> Profile {
    Profile {
        location_lat: Some(location.lat),
        location_lng: Some(location.lng),
        ..test_farmer()
    }
}

/// Create an active rice crop sown 30 days ago in Ludhiana
pub fn test_crop_cycle(farmer_id: ProfileId) -> CropCycle {
    let sowing = Utc::now().date_naive() - Duration::days(30);
    test_crop_cycle_sown(farmer_id, CropType::Rice, sowing)
}

/// Create an active crop of the given type and sowing date
pub fn test_crop_cycle_sown(
    farmer_id: ProfileId,
    crop_type: CropType,
    sowing_date: NaiveDate,
) -> CropCycle {
    let age = (Utc::now().date_naive() - sowing_date).num_days();
    CropCycle {
        id: CropCycleId::new(),
        farmer_id,
        crop_type,
        crop_variety: None,
        sowing_date,
        expected_harvest_date: Some(crop_type.expected_harvest_date(sowing_date)),
        actual_harvest_date: None,
        actual_yield_tons: None,
        field_size_acres: Some(5.0),
        location_lat: Some(TEST_LOCATION.lat),
        location_lng: Some(TEST_LOCATION.lng),
        soil_type: Some("loam".to_string()),
        irrigation_method: Some("drip".to_string()),
        current_stage: GrowthStage::for_age(age),
        status: CycleStatus::Active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Create an unread general advisory
pub fn test_advisory(farmer_id: ProfileId, crop_cycle_id: Option<CropCycleId>) -> Advisory {
    Advisory {
        id: AdvisoryId::new(),
        farmer_id,
        crop_cycle_id,
        advisory_type: AdvisoryType::General,
        title: "Test Advisory".to_string(),
        description: "Check your field".to_string(),
        priority: Priority::Medium,
        action_required: false,
        is_read: false,
        valid_until: None,
        metadata: serde_json::json!({}),
        created_at: Utc::now(),
    }
}

/// Create a mild, fresh weather row
pub fn test_weather(location: GeoPoint, date: NaiveDate) -> WeatherRecord {
    WeatherRecord {
        id: Uuid::new_v4(),
        location_lat: location.lat,
        location_lng: location.lng,
        date,
        temperature_min: 20.0,
        temperature_max: 28.0,
        humidity: 60.0,
        rainfall_mm: 5.0,
        wind_speed: 8.0,
        weather_condition: "Clear".to_string(),
        forecast_data: vec![],
        source: WeatherSource::Api,
        expires_at: Utc::now() + Duration::hours(6),
        created_at: Utc::now(),
    }
}

/// Weather row with the given readings
pub fn test_weather_with(
    location: GeoPoint,
    date: NaiveDate,
    temperature_max: f64,
    humidity: f64,
    rainfall_mm: f64,
) -> WeatherRecord {
    WeatherRecord {
        temperature_max,
        humidity,
        rainfall_mm,
        ..test_weather(location, date)
    }
}

/// Provider observation with fixed readings
pub fn test_observation() -> WeatherObservation {
    WeatherObservation {
        temperature_min: 21.0,
        temperature_max: 31.0,
        humidity: 65.0,
        rainfall_mm: 1.5,
        wind_speed: 10.0,
        weather_condition: "Clouds".to_string(),
        forecast: vec![],
        source: WeatherSource::Api,
    }
}

pub fn test_yield_prediction(crop_cycle_id: CropCycleId) -> YieldPrediction {
    YieldPrediction {
        id: YieldPredictionId::new(),
        crop_cycle_id,
        predicted_yield_tons: 2.8,
        confidence_score: 0.6,
        prediction_date: Utc::now().date_naive(),
        model_version: "v1.0".to_string(),
        factors: serde_json::json!({ "base_yield": 2.8 }),
        created_at: Utc::now(),
    }
}

pub fn test_market_price(crop_type: CropType, price: f64, date: NaiveDate) -> MarketPrice {
    MarketPrice {
        id: Uuid::new_v4(),
        crop_type,
        market_name: "Ludhiana Mandi".to_string(),
        district: "Ludhiana".to_string(),
        state: "Punjab".to_string(),
        price_per_quintal: price,
        date,
        created_at: Utc::now(),
    }
}

/// Create an unexpired high disease risk
pub fn test_risk_prediction(crop_cycle_id: CropCycleId) -> RiskPrediction {
    RiskPrediction {
        id: Uuid::new_v4(),
        crop_cycle_id,
        risk_type: RiskType::Disease,
        risk_level: RiskLevel::High,
        probability: 0.7,
        time_to_impact_days: 5,
        confidence_score: 0.75,
        affected_area_percentage: 100.0,
        economic_impact_estimate: 25_000.0,
        prevention_cost_estimate: 5_000.0,
        predicted_loss_if_ignored: 25_000.0,
        mitigation_strategies: vec!["Apply preventive fungicide".to_string()],
        contributing_factors: serde_json::json!({}),
        model_version: "v1.0".to_string(),
        expires_at: Utc::now() + Duration::days(7),
        created_at: Utc::now(),
    }
}

/// Create an open medium warning
pub fn test_warning(farmer_id: ProfileId, crop_cycle_id: Option<CropCycleId>) -> DecisionWarning {
    DecisionWarning {
        id: Uuid::new_v4(),
        farmer_id,
        crop_cycle_id,
        warning_type: "crop_rotation_risk".to_string(),
        risk_level: RiskLevel::Medium,
        title: "Crop Rotation Risk".to_string(),
        description: "Same crop as last season".to_string(),
        potential_loss_estimate: 25_000.0,
        is_acknowledged: false,
        is_dismissed: false,
        created_at: Utc::now(),
    }
}
