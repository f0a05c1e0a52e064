//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and external systems;
//! the rule modules (`advisory_rules`, `yield_model`, `risk_model`, ...) are
//! pure functions the services feed with repository data.

pub mod access;
pub mod advisory_rules;
pub mod advisory_service;
pub mod auth_service;
pub mod crop_service;
pub mod dashboard_service;
pub mod fpo_service;
pub mod harvest_timing;
pub mod insights;
pub mod intelligence_service;
pub mod market_analysis;
pub mod market_service;
pub mod risk_model;
pub mod scheduler_service;
pub mod weather_service;
pub mod yield_model;
pub mod yield_service;

pub use advisory_service::AdvisoryService;
pub use auth_service::AuthService;
pub use crop_service::CropService;
pub use dashboard_service::DashboardService;
pub use fpo_service::FpoService;
pub use intelligence_service::IntelligenceService;
pub use market_service::MarketService;
pub use scheduler_service::{SchedulerService, Task, TaskOutcome, TaskRunner};
pub use weather_service::WeatherService;
pub use yield_service::YieldService;
