//! Advisory service
//!
//! Scoped CRUD for advisories plus the scheduled rule-based generator.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::app::access::{require_owner, FarmerScope};
use crate::app::advisory_rules::{growth_stage_advisories, weather_advisories};
use crate::domain::entities::{
    Advisory, AdvisoryFilter, AdvisoryId, AdvisoryUpdate, CropCycleFilter, CycleStatus,
    NewAdvisory, Profile,
};
use crate::domain::ports::{
    AdvisoryRepository, CropCycleRepository, FpoRepository, WeatherRepository,
};
use crate::error::AppError;

pub const DEFAULT_LIST_LIMIT: u64 = 50;

/// Window in which a second advisory of the same type for a crop is suppressed
pub const DEDUP_WINDOW_HOURS: i64 = 24;

/// Service for advisory operations
pub struct AdvisoryService<AR, CR, FR, WR>
where
    AR: AdvisoryRepository,
    CR: CropCycleRepository,
    FR: FpoRepository,
    WR: WeatherRepository,
{
    advisories: Arc<AR>,
    crops: Arc<CR>,
    fpos: Arc<FR>,
    weather: Arc<WR>,
}

impl<AR, CR, FR, WR> AdvisoryService<AR, CR, FR, WR>
where
    AR: AdvisoryRepository,
    CR: CropCycleRepository,
    FR: FpoRepository,
    WR: WeatherRepository,
{
    pub fn new(advisories: Arc<AR>, crops: Arc<CR>, fpos: Arc<FR>, weather: Arc<WR>) -> Self {
        Self {
            advisories,
            crops,
            fpos,
            weather,
        }
    }

    /// Advisories visible to the caller, newest first
    pub async fn list(
        &self,
        profile: &Profile,
        mut filter: AdvisoryFilter,
    ) -> Result<Vec<Advisory>, AppError> {
        let scope = FarmerScope::for_profile(profile, self.fpos.as_ref()).await?;
        filter.farmer_ids = scope.farmer_ids();
        filter.limit = Some(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT));
        Ok(self.advisories.list(&filter).await?)
    }

    /// Create an advisory owned by the caller
    pub async fn create(
        &self,
        profile: &Profile,
        mut advisory: NewAdvisory,
    ) -> Result<Advisory, AppError> {
        if advisory.title.trim().is_empty() || advisory.description.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Type, title, and description are required".to_string(),
            ));
        }

        if let Some(crop_id) = advisory.crop_cycle_id {
            let crop = self
                .crops
                .find_by_id(&crop_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Crop cycle {}", crop_id)))?;
            require_owner(profile, &crop.farmer_id)?;
        }

        advisory.farmer_id = profile.id;
        Ok(self.advisories.create(&advisory).await?)
    }

    pub async fn update(
        &self,
        profile: &Profile,
        id: &AdvisoryId,
        update: &AdvisoryUpdate,
    ) -> Result<Advisory, AppError> {
        self.owned(profile, id).await?;
        Ok(self.advisories.update(id, update).await?)
    }

    pub async fn delete(&self, profile: &Profile, id: &AdvisoryId) -> Result<(), AppError> {
        self.owned(profile, id).await?;
        self.advisories.delete(id).await?;
        Ok(())
    }

    async fn owned(&self, profile: &Profile, id: &AdvisoryId) -> Result<Advisory, AppError> {
        let advisory = self
            .advisories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Advisory {}", id)))?;
        require_owner(profile, &advisory.farmer_id)?;
        Ok(advisory)
    }

    /// Run the weather and growth-stage rules over every active crop that has
    /// a location and a weather row for `today`.
    pub async fn generate_automated(
        &self,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<Advisory>, AppError> {
        let active = self
            .crops
            .list(&CropCycleFilter {
                status: Some(CycleStatus::Active),
                ..Default::default()
            })
            .await?;

        let since = now - Duration::hours(DEDUP_WINDOW_HOURS);
        let mut generated = Vec::new();

        for crop in active {
            let Some(location) = crop.location() else {
                continue;
            };
            let Some(weather) = self.weather.find(&location.rounded(), today).await? else {
                continue;
            };

            let drafts = weather_advisories(&crop, &weather)
                .into_iter()
                .chain(growth_stage_advisories(&crop, today));

            for draft in drafts {
                if self
                    .advisories
                    .exists_since(&crop.id, draft.advisory_type, since)
                    .await?
                {
                    continue;
                }

                let advisory = self
                    .advisories
                    .create(&draft.for_crop(crop.farmer_id, crop.id))
                    .await?;
                tracing::debug!(
                    crop_cycle_id = %crop.id,
                    advisory_type = %advisory.advisory_type,
                    "Generated advisory"
                );
                generated.push(advisory);
            }
        }

        tracing::info!(count = generated.len(), "Automated advisories generated");
        Ok(generated)
    }
}
