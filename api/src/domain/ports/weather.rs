//! Weather provider port
//!
//! Abstracts the third-party weather API so services can be tested with
//! canned observations.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::entities::{GeoPoint, WeatherObservation};
use crate::error::WeatherError;

/// Source of current conditions and a short forecast for a location
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch the observation for `date` at `location`
    async fn fetch(
        &self,
        location: &GeoPoint,
        date: NaiveDate,
    ) -> Result<WeatherObservation, WeatherError>;
}
