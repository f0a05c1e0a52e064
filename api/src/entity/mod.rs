//! SeaORM table models
//!
//! Row shapes for the tables created by `migrations/0001_init.sql`.

pub mod advisories;
pub mod area_intelligence;
pub mod community_alerts;
pub mod crop_cycles;
pub mod crop_recommendations;
pub mod decision_warnings;
pub mod economic_impacts;
pub mod fpo_farmers;
pub mod fpos;
pub mod market_prices;
pub mod profiles;
pub mod risk_predictions;
pub mod seasonal_comparisons;
pub mod sessions;
pub mod system_logs;
pub mod weather_data;
pub mod yield_predictions;
