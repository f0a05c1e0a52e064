//! Scheduled job runner
//!
//! Binds each scheduler task to the service call that does the work.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::adapters::PostgresCropCycleRepository;
use crate::app::{Task, TaskOutcome, TaskRunner};
use crate::domain::entities::{CropCycle, CropCycleFilter, CycleStatus, GeoPoint};
use crate::domain::ports::CropCycleRepository;
use crate::error::AppError;
use crate::{Advisories, Crops, Intelligence, Market, Weather, Yields};

pub struct ScheduledJobs {
    pub crop_repo: Arc<PostgresCropCycleRepository>,
    pub weather: Arc<Weather>,
    pub advisories: Arc<Advisories>,
    pub yields: Arc<Yields>,
    pub crops: Arc<Crops>,
    pub market: Arc<Market>,
    pub intelligence: Arc<Intelligence>,
}

#[async_trait]
impl TaskRunner for ScheduledJobs {
    async fn run(&self, task: Task, now: DateTime<Utc>) -> Result<TaskOutcome, AppError> {
        let today = now.date_naive();

        let count = match task {
            Task::WeatherUpdate => {
                let active = self
                    .crop_repo
                    .list(&CropCycleFilter {
                        status: Some(CycleStatus::Active),
                        ..Default::default()
                    })
                    .await?;
                let locations = distinct_locations(&active);
                if locations.is_empty() {
                    return Ok(TaskOutcome::Skipped {
                        reason: "No locations found".to_string(),
                    });
                }
                let updated = self.weather.refresh_stale(&locations, today, now).await?;
                return Ok(TaskOutcome::Completed {
                    count: updated,
                    total: Some(locations.len()),
                });
            }
            Task::GenerateAdvisories => self.advisories.generate_automated(today, now).await?.len(),
            Task::UpdateYieldPredictions => self.yields.generate_batch(today).await?.len(),
            Task::UpdateGrowthStages => self.crops.update_growth_stages(today).await?,
            Task::GenerateMarketData => self.market.generate_synthetic(today).await?,
            Task::IntelligenceUpdate => self.intelligence.generate_all_risks(today, now).await?,
            Task::AreaIntelligence => self.intelligence.update_all_areas(now).await?,
        };

        Ok(TaskOutcome::Completed { count, total: None })
    }
}

/// Rounded locations of the given crops, first occurrence wins
pub fn distinct_locations(crops: &[CropCycle]) -> Vec<GeoPoint> {
    let mut seen = HashSet::new();
    crops
        .iter()
        .filter_map(CropCycle::location)
        .map(|l| l.rounded())
        .filter(|l| seen.insert(l.key()))
        .collect()
}
