//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod advisories;
pub mod auth;
pub mod crops;
pub mod dashboard;
pub mod fpo;
pub mod intelligence;
pub mod market;
pub mod scheduler;
pub mod weather;
pub mod yield_predictions;

pub use advisories::{create_advisory, delete_advisory, list_advisories, update_advisory};
pub use auth::{get_profile, signin, signout, signup, update_profile};
pub use crops::{create_crop, crop_recommendations, delete_crop, get_crop, list_crops, update_crop};
pub use dashboard::{get_analytics, get_dashboard};
pub use fpo::{add_member, list_members, register_fpo};
pub use intelligence::{get_intelligence, post_intelligence};
pub use market::{list_prices, predict_prices, upsert_prices};
pub use scheduler::{run_tasks, scheduler_status, scheduler_webhook};
pub use weather::{get_weather, refresh_weather};
pub use yield_predictions::{create_prediction, get_predictions, update_prediction};
