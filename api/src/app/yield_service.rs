//! Yield prediction service

use std::sync::Arc;

use chrono::NaiveDate;

use crate::app::access::{require_role, FarmerScope};
use crate::app::yield_model::{estimate, YieldEstimate, MODEL_VERSION};
use crate::domain::entities::{
    CropCycle, CropCycleFilter, CropCycleId, CycleStatus, NewYieldPrediction, Profile, Role,
    YieldPrediction, YieldPredictionId, YieldPredictionUpdate,
};
use crate::domain::ports::{
    CropCycleRepository, FpoRepository, WeatherRepository, YieldPredictionRepository,
};
use crate::error::{AppError, DomainError};

/// Service for yield predictions
pub struct YieldService<YR, CR, FR, WR>
where
    YR: YieldPredictionRepository,
    CR: CropCycleRepository,
    FR: FpoRepository,
    WR: WeatherRepository,
{
    predictions: Arc<YR>,
    crops: Arc<CR>,
    fpos: Arc<FR>,
    weather: Arc<WR>,
}

impl<YR, CR, FR, WR> YieldService<YR, CR, FR, WR>
where
    YR: YieldPredictionRepository,
    CR: CropCycleRepository,
    FR: FpoRepository,
    WR: WeatherRepository,
{
    pub fn new(predictions: Arc<YR>, crops: Arc<CR>, fpos: Arc<FR>, weather: Arc<WR>) -> Self {
        Self {
            predictions,
            crops,
            fpos,
            weather,
        }
    }

    /// Latest prediction for a crop the caller can see
    pub async fn latest_for_crop(
        &self,
        profile: &Profile,
        crop_id: &CropCycleId,
    ) -> Result<Option<YieldPrediction>, AppError> {
        let crop = self.find_crop(crop_id).await?;
        let scope = FarmerScope::for_profile(profile, self.fpos.as_ref()).await?;
        if !scope.contains(&crop.farmer_id) {
            return Err(DomainError::Forbidden("Crop cycle is outside your scope".into()).into());
        }
        Ok(self.predictions.latest_for_crop(crop_id).await?)
    }

    /// Every prediction for crops in the caller's scope, newest first
    pub async fn list(&self, profile: &Profile) -> Result<Vec<YieldPrediction>, AppError> {
        let scope = FarmerScope::for_profile(profile, self.fpos.as_ref()).await?;
        match scope.farmer_ids() {
            None => Ok(self.predictions.list(None, None).await?),
            Some(farmer_ids) => {
                let crop_ids: Vec<CropCycleId> = self
                    .crops
                    .list(&CropCycleFilter {
                        farmer_ids: Some(farmer_ids),
                        ..Default::default()
                    })
                    .await?
                    .into_iter()
                    .map(|c| c.id)
                    .collect();
                if crop_ids.is_empty() {
                    return Ok(vec![]);
                }
                Ok(self.predictions.list(Some(&crop_ids), None).await?)
            }
        }
    }

    /// Recompute and store a prediction (crop owner or admin)
    pub async fn create(
        &self,
        profile: &Profile,
        crop_id: &CropCycleId,
        today: NaiveDate,
    ) -> Result<YieldPrediction, AppError> {
        let crop = self.find_crop(crop_id).await?;
        if crop.farmer_id != profile.id && !profile.is_admin() {
            return Err(DomainError::Forbidden("You do not own this crop cycle".into()).into());
        }
        self.predict_and_store(&crop, today).await
    }

    /// Admin correction of a stored prediction
    pub async fn update(
        &self,
        profile: &Profile,
        id: &YieldPredictionId,
        update: &YieldPredictionUpdate,
    ) -> Result<YieldPrediction, AppError> {
        require_role(profile, Role::Admin)?;
        if let Some(confidence) = update.confidence_score {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(AppError::BadRequest(
                    "confidence_score must be between 0 and 1".to_string(),
                ));
            }
        }
        if self.predictions.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound(format!("Yield prediction {}", id)));
        }
        Ok(self.predictions.update(id, update).await?)
    }

    /// Predict every active crop that has no prediction dated `today`
    pub async fn generate_batch(&self, today: NaiveDate) -> Result<Vec<YieldPrediction>, AppError> {
        let active = self
            .crops
            .list(&CropCycleFilter {
                status: Some(CycleStatus::Active),
                ..Default::default()
            })
            .await?;

        let mut created = Vec::new();
        for crop in active {
            if self.predictions.exists_for_date(&crop.id, today).await? {
                continue;
            }
            created.push(self.predict_and_store(&crop, today).await?);
        }

        tracing::info!(count = created.len(), "Batch yield predictions completed");
        Ok(created)
    }

    /// Run the model for a crop against its season's weather
    pub async fn predict(
        &self,
        crop: &CropCycle,
        today: NaiveDate,
    ) -> Result<YieldEstimate, AppError> {
        let weather = match crop.location() {
            Some(location) => {
                self.weather
                    .list_range(&location.rounded(), crop.sowing_date, Some(today))
                    .await?
            }
            None => vec![],
        };
        Ok(estimate(crop, &weather, today))
    }

    async fn predict_and_store(
        &self,
        crop: &CropCycle,
        today: NaiveDate,
    ) -> Result<YieldPrediction, AppError> {
        let est = self.predict(crop, today).await?;
        let prediction = self
            .predictions
            .create(&NewYieldPrediction {
                crop_cycle_id: crop.id,
                predicted_yield_tons: est.yield_tons,
                confidence_score: est.confidence,
                prediction_date: today,
                model_version: MODEL_VERSION.to_string(),
                factors: est.factors,
            })
            .await?;

        tracing::debug!(
            crop_cycle_id = %crop.id,
            yield_tons = prediction.predicted_yield_tons,
            "Stored yield prediction"
        );
        Ok(prediction)
    }

    async fn find_crop(&self, crop_id: &CropCycleId) -> Result<CropCycle, AppError> {
        self.crops
            .find_by_id(crop_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Crop cycle {}", crop_id)))
    }
}
