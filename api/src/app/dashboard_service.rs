//! Role dashboards and analytics

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::app::access::FarmerScope;
use crate::app::crop_service::{summarize, CropSummary};
use crate::app::yield_model::round2;
use crate::domain::entities::{
    Advisory, AdvisoryFilter, CropCycle, CropCycleFilter, CropCycleId, CropType, CycleStatus,
    Profile, ProfileId, Role, RoleCounts, SystemLog, WeatherRecord, YieldPrediction,
};
use crate::domain::ports::{
    AdvisoryRepository, CropCycleRepository, FpoRepository, MarketPriceRepository,
    ProfileRepository, SystemLogRepository, WeatherRepository, YieldPredictionRepository,
};
use crate::error::AppError;

pub const DEFAULT_PERIOD_DAYS: i64 = 30;
pub const MAX_PERIOD_DAYS: i64 = 3650;

const FARMER_UNREAD_LIMIT: u64 = 5;
const FARMER_PREDICTION_LIMIT: u64 = 10;
const FARMER_TASK_LIMIT: usize = 3;
const FPO_UNREAD_LIMIT: u64 = 20;
const FPO_HIGH_PRIORITY_LIMIT: usize = 5;
const ADMIN_ADVISORY_LIMIT: u64 = 10;
const ADMIN_LOG_LIMIT: u64 = 20;
const GROWTH_WINDOW_DAYS: i64 = 30;

// ============================================================================
// Dashboards
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FarmerSummary {
    pub name: Option<String>,
    pub location: String,
    pub farm_size: Option<f64>,
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FarmerOverview {
    pub active_crops: usize,
    pub unread_advisories: usize,
    pub total_predicted_yield: f64,
    pub crop_distribution: BTreeMap<CropType, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FarmerDashboard {
    pub farmer: FarmerSummary,
    pub overview: FarmerOverview,
    pub active_crops: Vec<CropSummary>,
    pub unread_advisories: Vec<Advisory>,
    pub recent_predictions: Vec<YieldPrediction>,
    pub current_weather: Option<WeatherRecord>,
    pub upcoming_tasks: Vec<Advisory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FpoSummary {
    pub name: Option<String>,
    pub registration_number: Option<String>,
    pub total_farmers: usize,
    pub total_area: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FpoOverview {
    pub active_crops: usize,
    pub unread_advisories: usize,
    pub total_predicted_yield: f64,
    pub crop_distribution: BTreeMap<CropType, u64>,
    pub district_distribution: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberFarmer {
    pub farmer_id: ProfileId,
    pub full_name: Option<String>,
    pub farm_size_acres: Option<f64>,
    pub district: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FpoDashboard {
    pub fpo: FpoSummary,
    pub overview: FpoOverview,
    pub member_farmers: Vec<MemberFarmer>,
    pub active_crops: Vec<CropSummary>,
    pub high_priority_advisories: Vec<Advisory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemOverview {
    #[serde(flatten)]
    pub users: RoleCounts,
    pub total_fpos: u64,
    pub active_crops: u64,
    pub weather_data_points: u64,
    pub market_data_points: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrowthMetrics {
    pub new_users_last_30_days: u64,
    pub new_crops_last_30_days: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub system_overview: SystemOverview,
    pub growth_metrics: GrowthMetrics,
    pub crop_distribution: BTreeMap<CropType, u64>,
    pub recent_advisories: Vec<Advisory>,
    pub system_logs: Vec<SystemLog>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Dashboard {
    Farmer(Box<FarmerDashboard>),
    Fpo(Box<FpoDashboard>),
    Admin(Box<AdminDashboard>),
}

// ============================================================================
// Analytics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsMetric {
    YieldTrends,
    AdvisoryEffectiveness,
    CropPerformance,
}

impl std::str::FromStr for AnalyticsMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yield_trends" => Ok(AnalyticsMetric::YieldTrends),
            "advisory_effectiveness" => Ok(AnalyticsMetric::AdvisoryEffectiveness),
            "crop_performance" => Ok(AnalyticsMetric::CropPerformance),
            _ => Err(format!("Invalid metric: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    #[serde(rename = "yield")]
    pub yield_tons: f64,
    pub confidence: f64,
}

/// date → crop type → predictions made that day
#[derive(Debug, Clone, Serialize)]
pub struct YieldTrends {
    pub trends: BTreeMap<NaiveDate, BTreeMap<CropType, Vec<TrendPoint>>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvisoryEffectiveness {
    pub total_advisories: usize,
    pub read_advisories: usize,
    pub read_rate: f64,
    pub type_distribution: BTreeMap<String, u64>,
    pub priority_distribution: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CropPerformance {
    pub total_crops: u64,
    pub active_crops: u64,
    pub completed_crops: u64,
    pub total_area: f64,
    pub total_predicted_yield: f64,
    pub avg_confidence: f64,
    pub total_advisories: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Analytics {
    YieldTrends(YieldTrends),
    AdvisoryEffectiveness(AdvisoryEffectiveness),
    CropPerformance(BTreeMap<CropType, CropPerformance>),
}

fn crop_distribution(crops: &[CropCycle]) -> BTreeMap<CropType, u64> {
    let mut distribution = BTreeMap::new();
    for crop in crops {
        *distribution.entry(crop.crop_type).or_insert(0) += 1;
    }
    distribution
}

// ============================================================================
// Service
// ============================================================================

pub struct DashboardService<PR, FR, CR, AR, YR, WR, MR, LR>
where
    PR: ProfileRepository,
    FR: FpoRepository,
    CR: CropCycleRepository,
    AR: AdvisoryRepository,
    YR: YieldPredictionRepository,
    WR: WeatherRepository,
    MR: MarketPriceRepository,
    LR: SystemLogRepository,
{
    profiles: Arc<PR>,
    fpos: Arc<FR>,
    crops: Arc<CR>,
    advisories: Arc<AR>,
    predictions: Arc<YR>,
    weather: Arc<WR>,
    prices: Arc<MR>,
    logs: Arc<LR>,
}

impl<PR, FR, CR, AR, YR, WR, MR, LR> DashboardService<PR, FR, CR, AR, YR, WR, MR, LR>
where
    PR: ProfileRepository,
    FR: FpoRepository,
    CR: CropCycleRepository,
    AR: AdvisoryRepository,
    YR: YieldPredictionRepository,
    WR: WeatherRepository,
    MR: MarketPriceRepository,
    LR: SystemLogRepository,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        profiles: Arc<PR>,
        fpos: Arc<FR>,
        crops: Arc<CR>,
        advisories: Arc<AR>,
        predictions: Arc<YR>,
        weather: Arc<WR>,
        prices: Arc<MR>,
        logs: Arc<LR>,
    ) -> Self {
        Self {
            profiles,
            fpos,
            crops,
            advisories,
            predictions,
            weather,
            prices,
            logs,
        }
    }

    /// The dashboard for the caller's role
    pub async fn dashboard(
        &self,
        profile: &Profile,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Dashboard, AppError> {
        Ok(match profile.role {
            Role::Farmer => Dashboard::Farmer(Box::new(self.farmer(profile, today).await?)),
            Role::Fpo => Dashboard::Fpo(Box::new(self.fpo(profile).await?)),
            Role::Admin => Dashboard::Admin(Box::new(self.admin(now).await?)),
        })
    }

    async fn farmer(
        &self,
        profile: &Profile,
        today: NaiveDate,
    ) -> Result<FarmerDashboard, AppError> {
        let active = self
            .crops
            .list(&CropCycleFilter {
                farmer_ids: Some(vec![profile.id]),
                status: Some(CycleStatus::Active),
                ..Default::default()
            })
            .await?;

        let unread = self
            .advisories
            .list(&AdvisoryFilter {
                farmer_ids: Some(vec![profile.id]),
                unread_only: true,
                limit: Some(FARMER_UNREAD_LIMIT),
                ..Default::default()
            })
            .await?;

        let all_crop_ids: Vec<CropCycleId> = self
            .crops
            .list(&CropCycleFilter {
                farmer_ids: Some(vec![profile.id]),
                ..Default::default()
            })
            .await?
            .iter()
            .map(|c| c.id)
            .collect();
        let recent_predictions = if all_crop_ids.is_empty() {
            vec![]
        } else {
            self.predictions
                .list(Some(&all_crop_ids), Some(FARMER_PREDICTION_LIMIT))
                .await?
        };

        let current_weather = match profile.location() {
            Some(location) => self.weather.find(&location.rounded(), today).await?,
            None => None,
        };

        let upcoming_tasks = unread
            .iter()
            .filter(|a| a.action_required)
            .take(FARMER_TASK_LIMIT)
            .cloned()
            .collect();

        Ok(FarmerDashboard {
            farmer: FarmerSummary {
                name: profile.full_name.clone(),
                location: profile.location_label(),
                farm_size: profile.farm_size_acres,
                language: profile.language.clone(),
            },
            overview: FarmerOverview {
                active_crops: active.len(),
                unread_advisories: unread.len(),
                total_predicted_yield: round2(
                    recent_predictions.iter().map(|p| p.predicted_yield_tons).sum(),
                ),
                crop_distribution: crop_distribution(&active),
            },
            active_crops: summarize(active, self.advisories.as_ref(), self.predictions.as_ref())
                .await?,
            unread_advisories: unread,
            recent_predictions,
            current_weather,
            upcoming_tasks,
        })
    }

    async fn fpo(&self, profile: &Profile) -> Result<FpoDashboard, AppError> {
        let organisation = self
            .fpos
            .find_by_id(&profile.id)
            .await?
            .ok_or_else(|| AppError::NotFound("FPO not found".to_string()))?;

        let member_ids = self.fpos.active_member_ids(&profile.id).await?;
        let members = if member_ids.is_empty() {
            vec![]
        } else {
            self.profiles.find_by_ids(&member_ids).await?
        };

        let (active, unread) = if member_ids.is_empty() {
            (vec![], vec![])
        } else {
            let active = self
                .crops
                .list(&CropCycleFilter {
                    farmer_ids: Some(member_ids.clone()),
                    status: Some(CycleStatus::Active),
                    ..Default::default()
                })
                .await?;
            let unread = self
                .advisories
                .list(&AdvisoryFilter {
                    farmer_ids: Some(member_ids.clone()),
                    unread_only: true,
                    limit: Some(FPO_UNREAD_LIMIT),
                    ..Default::default()
                })
                .await?;
            (active, unread)
        };

        let mut district_distribution = BTreeMap::new();
        for member in &members {
            let district = member.district.clone().unwrap_or_else(|| "Unknown".to_string());
            *district_distribution.entry(district).or_insert(0) += 1;
        }

        let crop_distribution = crop_distribution(&active);
        let active_crops =
            summarize(active, self.advisories.as_ref(), self.predictions.as_ref()).await?;
        let total_predicted_yield = active_crops
            .iter()
            .filter_map(|c| c.latest_prediction.as_ref())
            .map(|p| p.predicted_yield_tons)
            .sum();

        let high_priority_advisories = unread
            .iter()
            .filter(|a| a.priority.is_urgent())
            .take(FPO_HIGH_PRIORITY_LIMIT)
            .cloned()
            .collect();

        Ok(FpoDashboard {
            fpo: FpoSummary {
                name: Some(organisation.name),
                registration_number: organisation.registration_number,
                total_farmers: members.len(),
                total_area: round2(members.iter().filter_map(|m| m.farm_size_acres).sum()),
            },
            overview: FpoOverview {
                active_crops: active_crops.len(),
                unread_advisories: unread.len(),
                total_predicted_yield: round2(total_predicted_yield),
                crop_distribution,
                district_distribution,
            },
            member_farmers: members
                .into_iter()
                .map(|m| MemberFarmer {
                    farmer_id: m.id,
                    full_name: m.full_name,
                    farm_size_acres: m.farm_size_acres,
                    district: m.district,
                    state: m.state,
                })
                .collect(),
            active_crops,
            high_priority_advisories,
        })
    }

    async fn admin(&self, now: DateTime<Utc>) -> Result<AdminDashboard, AppError> {
        let active = self
            .crops
            .list(&CropCycleFilter {
                status: Some(CycleStatus::Active),
                ..Default::default()
            })
            .await?;
        let since = now - Duration::days(GROWTH_WINDOW_DAYS);

        Ok(AdminDashboard {
            system_overview: SystemOverview {
                users: self.profiles.count_by_role().await?,
                total_fpos: self.fpos.count().await?,
                active_crops: active.len() as u64,
                weather_data_points: self.weather.count().await?,
                market_data_points: self.prices.count().await?,
            },
            growth_metrics: GrowthMetrics {
                new_users_last_30_days: self.profiles.count_created_since(since).await?,
                new_crops_last_30_days: self
                    .crops
                    .count(&CropCycleFilter {
                        created_since: Some(since),
                        ..Default::default()
                    })
                    .await?,
            },
            crop_distribution: crop_distribution(&active),
            recent_advisories: self
                .advisories
                .list(&AdvisoryFilter {
                    limit: Some(ADMIN_ADVISORY_LIMIT),
                    ..Default::default()
                })
                .await?,
            system_logs: self.logs.recent(None, None, ADMIN_LOG_LIMIT).await?,
        })
    }

    /// Scoped analytics over the last `period_days`
    pub async fn analytics(
        &self,
        profile: &Profile,
        metric: AnalyticsMetric,
        period_days: i64,
        now: DateTime<Utc>,
    ) -> Result<Analytics, AppError> {
        if !(1..=MAX_PERIOD_DAYS).contains(&period_days) {
            return Err(AppError::BadRequest(format!(
                "period must be between 1 and {} days",
                MAX_PERIOD_DAYS
            )));
        }
        let since = now
            .checked_sub_signed(Duration::days(period_days))
            .ok_or_else(|| AppError::BadRequest("period is out of range".to_string()))?;
        let scope = FarmerScope::for_profile(profile, self.fpos.as_ref()).await?;

        Ok(match metric {
            AnalyticsMetric::YieldTrends => {
                Analytics::YieldTrends(self.yield_trends(&scope, since.date_naive()).await?)
            }
            AnalyticsMetric::AdvisoryEffectiveness => Analytics::AdvisoryEffectiveness(
                self.advisory_effectiveness(&scope, since).await?,
            ),
            AnalyticsMetric::CropPerformance => {
                Analytics::CropPerformance(self.crop_performance(&scope, since).await?)
            }
        })
    }

    async fn yield_trends(
        &self,
        scope: &FarmerScope,
        since: NaiveDate,
    ) -> Result<YieldTrends, AppError> {
        let crops = self
            .crops
            .list(&CropCycleFilter {
                farmer_ids: scope.farmer_ids(),
                ..Default::default()
            })
            .await?;
        let crop_types: HashMap<CropCycleId, CropType> =
            crops.iter().map(|c| (c.id, c.crop_type)).collect();

        let mut trends: BTreeMap<NaiveDate, BTreeMap<CropType, Vec<TrendPoint>>> = BTreeMap::new();
        if crop_types.is_empty() {
            return Ok(YieldTrends { trends });
        }

        let ids: Vec<CropCycleId> = crop_types.keys().copied().collect();
        let mut predictions: Vec<YieldPrediction> = self
            .predictions
            .list(Some(&ids), None)
            .await?
            .into_iter()
            .filter(|p| p.prediction_date >= since)
            .collect();
        predictions.sort_by_key(|p| (p.prediction_date, p.created_at));

        for prediction in predictions {
            let Some(crop_type) = crop_types.get(&prediction.crop_cycle_id) else {
                continue;
            };
            trends
                .entry(prediction.prediction_date)
                .or_default()
                .entry(*crop_type)
                .or_default()
                .push(TrendPoint {
                    yield_tons: prediction.predicted_yield_tons,
                    confidence: prediction.confidence_score,
                });
        }

        Ok(YieldTrends { trends })
    }

    async fn advisory_effectiveness(
        &self,
        scope: &FarmerScope,
        since: DateTime<Utc>,
    ) -> Result<AdvisoryEffectiveness, AppError> {
        let advisories = self
            .advisories
            .list(&AdvisoryFilter {
                farmer_ids: scope.farmer_ids(),
                created_since: Some(since),
                ..Default::default()
            })
            .await?;

        let total = advisories.len();
        let read = advisories.iter().filter(|a| a.is_read).count();
        let read_rate = if total > 0 {
            round2(read as f64 / total as f64 * 100.0)
        } else {
            0.0
        };

        let mut type_distribution = BTreeMap::new();
        let mut priority_distribution = BTreeMap::new();
        for advisory in &advisories {
            *type_distribution
                .entry(advisory.advisory_type.to_string())
                .or_insert(0) += 1;
            *priority_distribution
                .entry(advisory.priority.to_string())
                .or_insert(0) += 1;
        }

        Ok(AdvisoryEffectiveness {
            total_advisories: total,
            read_advisories: read,
            read_rate,
            type_distribution,
            priority_distribution,
        })
    }

    async fn crop_performance(
        &self,
        scope: &FarmerScope,
        since: DateTime<Utc>,
    ) -> Result<BTreeMap<CropType, CropPerformance>, AppError> {
        let crops = self
            .crops
            .list(&CropCycleFilter {
                farmer_ids: scope.farmer_ids(),
                created_since: Some(since),
                ..Default::default()
            })
            .await?;
        let summaries =
            summarize(crops, self.advisories.as_ref(), self.predictions.as_ref()).await?;

        let mut performance: BTreeMap<CropType, CropPerformance> = BTreeMap::new();
        for summary in &summaries {
            let entry = performance.entry(summary.crop.crop_type).or_default();
            entry.total_crops += 1;
            entry.total_area += summary.crop.acres();
            entry.total_advisories += summary.advisory_count;
            match summary.crop.status {
                CycleStatus::Active => entry.active_crops += 1,
                CycleStatus::Completed => entry.completed_crops += 1,
            }
            if let Some(prediction) = &summary.latest_prediction {
                entry.total_predicted_yield += prediction.predicted_yield_tons;
                entry.avg_confidence += prediction.confidence_score;
            }
        }

        for entry in performance.values_mut() {
            entry.avg_confidence = round2(entry.avg_confidence / entry.total_crops as f64);
            entry.total_predicted_yield = round2(entry.total_predicted_yield);
            entry.total_area = round2(entry.total_area);
        }

        Ok(performance)
    }
}
