//! Rule-based advisory generation
//!
//! Turns today's weather and a crop's age into advisory drafts. The
//! scheduler binds the drafts to a farmer and crop and drops duplicates.

use chrono::NaiveDate;

use crate::domain::entities::{
    AdvisoryDraft, AdvisoryType, CropCycle, GrowthStage, Priority, WeatherRecord,
};

pub const HEAT_ALERT_TEMP_C: f64 = 38.0;
pub const HEAVY_RAIN_MM: f64 = 50.0;
pub const DRY_RAIN_MM: f64 = 2.0;
pub const DRY_HEAT_TEMP_C: f64 = 30.0;

/// Advisories triggered by a day's weather
pub fn weather_advisories(crop: &CropCycle, weather: &WeatherRecord) -> Vec<AdvisoryDraft> {
    let mut drafts = Vec::new();

    if weather.temperature_max > HEAT_ALERT_TEMP_C {
        drafts.push(AdvisoryDraft::new(
            AdvisoryType::WeatherWarning,
            "High Temperature Alert",
            format!(
                "Temperature above 38°C detected. Ensure adequate irrigation and consider providing shade to your {} crop.",
                crop.crop_type
            ),
            Priority::High,
            true,
        ));
    }

    if weather.rainfall_mm > HEAVY_RAIN_MM {
        drafts.push(AdvisoryDraft::new(
            AdvisoryType::WeatherWarning,
            "Heavy Rainfall Warning",
            "Heavy rainfall expected. Ensure proper drainage and avoid fertilizer application for the next 3 days.",
            Priority::Medium,
            true,
        ));
    }

    if weather.rainfall_mm < DRY_RAIN_MM && weather.temperature_max > DRY_HEAT_TEMP_C {
        drafts.push(AdvisoryDraft::new(
            AdvisoryType::Irrigation,
            "Irrigation Recommended",
            "Low rainfall and high temperatures indicate the need for irrigation. Consider light irrigation for optimal crop growth.",
            Priority::Medium,
            true,
        ));
    }

    drafts
}

/// Advisories tied to the crop's age and stage
pub fn growth_stage_advisories(crop: &CropCycle, today: NaiveDate) -> Vec<AdvisoryDraft> {
    let days = crop.days_since_sowing(today);
    let mut drafts = Vec::new();

    if (20..=25).contains(&days) && crop.current_stage == GrowthStage::Germination {
        drafts.push(AdvisoryDraft::new(
            AdvisoryType::Fertilizer,
            "First Fertilizer Application",
            format!(
                "Your {} crop is ready for the first fertilizer application. Apply urea at 40 kg per acre for optimal vegetative growth.",
                crop.crop_type
            ),
            Priority::High,
            true,
        ));
    }

    if (45..=50).contains(&days) && crop.current_stage == GrowthStage::Vegetative {
        drafts.push(AdvisoryDraft::new(
            AdvisoryType::Fertilizer,
            "Second Fertilizer Application",
            "Time for the second fertilizer dose. Apply NPK fertilizer as per soil test recommendations.",
            Priority::Medium,
            true,
        ));
    }

    if (30..=35).contains(&days) {
        drafts.push(AdvisoryDraft::new(
            AdvisoryType::PestControl,
            "Pest Monitoring Required",
            "Regular pest monitoring is crucial at this stage. Look for signs of common pests and take preventive measures if needed.",
            Priority::Medium,
            false,
        ));
    }

    drafts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CropType, ProfileId};
    use crate::test_utils::{test_crop_cycle_sown, test_weather_with, TEST_LOCATION};
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    fn crop_aged(days: i64, stage: GrowthStage) -> CropCycle {
        let mut crop = test_crop_cycle_sown(
            ProfileId::new(),
            CropType::Wheat,
            today() - Duration::days(days),
        );
        crop.current_stage = stage;
        crop
    }

    #[test]
    fn heat_alert_above_38() {
        let crop = crop_aged(40, GrowthStage::Vegetative);
        let weather = test_weather_with(TEST_LOCATION, today(), 39.0, 50.0, 10.0);

        let drafts = weather_advisories(&crop, &weather);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "High Temperature Alert");
        assert_eq!(drafts[0].priority, Priority::High);
        assert!(drafts[0].description.contains("wheat"));
    }

    #[test]
    fn exactly_38_is_not_an_alert() {
        let crop = crop_aged(40, GrowthStage::Vegetative);
        let weather = test_weather_with(TEST_LOCATION, today(), 38.0, 50.0, 10.0);
        assert!(weather_advisories(&crop, &weather).is_empty());
    }

    #[test]
    fn heavy_rain_and_dry_heat() {
        let crop = crop_aged(40, GrowthStage::Vegetative);

        let wet = test_weather_with(TEST_LOCATION, today(), 28.0, 90.0, 60.0);
        let drafts = weather_advisories(&crop, &wet);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "Heavy Rainfall Warning");

        let dry = test_weather_with(TEST_LOCATION, today(), 35.0, 30.0, 1.0);
        let drafts = weather_advisories(&crop, &dry);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].advisory_type, AdvisoryType::Irrigation);
    }

    #[test]
    fn hot_dry_day_gives_heat_and_irrigation() {
        let crop = crop_aged(40, GrowthStage::Vegetative);
        let weather = test_weather_with(TEST_LOCATION, today(), 41.0, 20.0, 0.0);

        let types: Vec<_> = weather_advisories(&crop, &weather)
            .into_iter()
            .map(|d| d.advisory_type)
            .collect();
        assert_eq!(
            types,
            vec![AdvisoryType::WeatherWarning, AdvisoryType::Irrigation]
        );
    }

    #[test]
    fn first_fertilizer_needs_germination_stage() {
        let crop = crop_aged(22, GrowthStage::Germination);
        let drafts = growth_stage_advisories(&crop, today());
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "First Fertilizer Application");

        let ahead = crop_aged(22, GrowthStage::Vegetative);
        assert!(growth_stage_advisories(&ahead, today()).is_empty());
    }

    #[test]
    fn second_fertilizer_window() {
        let crop = crop_aged(45, GrowthStage::Vegetative);
        let drafts = growth_stage_advisories(&crop, today());
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].priority, Priority::Medium);

        let late = crop_aged(51, GrowthStage::Vegetative);
        assert!(growth_stage_advisories(&late, today()).is_empty());
    }

    #[test]
    fn pest_monitoring_ignores_stage() {
        let crop = crop_aged(33, GrowthStage::Flowering);
        let drafts = growth_stage_advisories(&crop, today());
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].advisory_type, AdvisoryType::PestControl);
        assert!(!drafts[0].action_required);
    }
}
