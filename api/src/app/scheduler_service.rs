//! Scheduled maintenance tasks
//!
//! Runs the periodic jobs (weather refresh, advisory generation, yield and
//! stage updates, market data, intelligence), records every run in
//! `system_logs`, and drives them from an in-process cadence loop.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Timelike, Utc};
use serde::Serialize;

use crate::domain::entities::{CropCycleFilter, CycleStatus, LogLevel, SystemLog};
use crate::domain::ports::{
    CropCycleRepository, ProfileRepository, SystemLogRepository, WeatherRepository,
};
use crate::error::AppError;

/// Log prefix shared by every run entry; the status endpoint filters on it
pub const RUN_LOG_PREFIX: &str = "Scheduled task";

const LAST_RUNS_LIMIT: u64 = 10;
const RECENT_ERRORS_LIMIT: u64 = 5;
const TICK_SECONDS: u64 = 60;

// ============================================================================
// Tasks and cadence
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    WeatherUpdate,
    GenerateAdvisories,
    UpdateYieldPredictions,
    UpdateGrowthStages,
    GenerateMarketData,
    IntelligenceUpdate,
    AreaIntelligence,
}

impl Task {
    /// Every task, in the order `all` runs them
    pub const ALL: [Task; 7] = [
        Task::WeatherUpdate,
        Task::GenerateAdvisories,
        Task::UpdateYieldPredictions,
        Task::UpdateGrowthStages,
        Task::GenerateMarketData,
        Task::IntelligenceUpdate,
        Task::AreaIntelligence,
    ];

    pub fn cadence(&self) -> Cadence {
        match self {
            Task::WeatherUpdate => Cadence::EveryHours(6),
            Task::GenerateAdvisories => Cadence::DailyAt(8),
            Task::UpdateYieldPredictions => Cadence::DailyAt(0),
            Task::UpdateGrowthStages => Cadence::EveryHours(12),
            Task::GenerateMarketData => Cadence::DailyAt(18),
            Task::IntelligenceUpdate => Cadence::DailyAt(2),
            Task::AreaIntelligence => Cadence::DailyAt(3),
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Task::WeatherUpdate => "weather_update",
            Task::GenerateAdvisories => "generate_advisories",
            Task::UpdateYieldPredictions => "update_yield_predictions",
            Task::UpdateGrowthStages => "update_growth_stages",
            Task::GenerateMarketData => "generate_market_data",
            Task::IntelligenceUpdate => "intelligence_update",
            Task::AreaIntelligence => "area_intelligence",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Task::ALL
            .iter()
            .find(|t| t.to_string() == s)
            .copied()
            .ok_or_else(|| format!("Invalid task: {}", s))
    }
}

/// A single task or every task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSelection {
    One(Task),
    All,
}

impl TaskSelection {
    pub fn tasks(&self) -> Vec<Task> {
        match self {
            TaskSelection::One(task) => vec![*task],
            TaskSelection::All => Task::ALL.to_vec(),
        }
    }
}

impl std::str::FromStr for TaskSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(TaskSelection::All)
        } else {
            s.parse().map(TaskSelection::One)
        }
    }
}

/// When a task runs, on the hour, in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// At hours divisible by n
    EveryHours(u32),
    /// Once a day at the given hour
    DailyAt(u32),
}

impl Cadence {
    fn matches_hour(&self, hour: u32) -> bool {
        match self {
            Cadence::EveryHours(n) => *n > 0 && hour % n == 0,
            Cadence::DailyAt(h) => hour == *h,
        }
    }

    /// First run time strictly after `after`
    pub fn next_run_after(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        let hour_start = after
            - Duration::minutes(after.minute() as i64)
            - Duration::seconds(after.second() as i64)
            - Duration::nanoseconds(after.nanosecond() as i64);

        (1..=48)
            .map(|h| hour_start + Duration::hours(h))
            .find(|t| self.matches_hour(t.hour()))
            .unwrap_or(hour_start + Duration::days(1))
    }
}

/// Tasks whose run time falls in `(last, now]`
pub fn due_tasks(last: DateTime<Utc>, now: DateTime<Utc>) -> Vec<Task> {
    Task::ALL
        .into_iter()
        .filter(|t| t.cadence().next_run_after(last) <= now)
        .collect()
}

// ============================================================================
// Runs
// ============================================================================

/// What a task did
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Completed { count: usize, total: Option<usize> },
    Skipped { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Skipped,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub task: Task,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub message: &'static str,
    pub results: Vec<TaskReport>,
    pub timestamp: DateTime<Utc>,
}

/// Executes the work behind each task
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn run(&self, task: Task, now: DateTime<Utc>) -> Result<TaskOutcome, AppError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemStats {
    pub total_users: u64,
    pub active_crops: u64,
    pub weather_data_today: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub scheduler_active: bool,
    pub last_runs: Vec<SystemLog>,
    pub system_stats: SystemStats,
    pub next_scheduled_runs: BTreeMap<Task, DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_errors: Option<Vec<SystemLog>>,
}

// ============================================================================
// Service
// ============================================================================

pub struct SchedulerService<R, LR, PR, CR, WR>
where
    R: TaskRunner,
    LR: SystemLogRepository,
    PR: ProfileRepository,
    CR: CropCycleRepository,
    WR: WeatherRepository,
{
    runner: Arc<R>,
    logs: Arc<LR>,
    profiles: Arc<PR>,
    crops: Arc<CR>,
    weather: Arc<WR>,
    loop_enabled: bool,
}

impl<R, LR, PR, CR, WR> SchedulerService<R, LR, PR, CR, WR>
where
    R: TaskRunner + 'static,
    LR: SystemLogRepository + 'static,
    PR: ProfileRepository + 'static,
    CR: CropCycleRepository + 'static,
    WR: WeatherRepository + 'static,
{
    pub fn new(
        runner: Arc<R>,
        logs: Arc<LR>,
        profiles: Arc<PR>,
        crops: Arc<CR>,
        weather: Arc<WR>,
        loop_enabled: bool,
    ) -> Self {
        Self {
            runner,
            logs,
            profiles,
            crops,
            weather,
            loop_enabled,
        }
    }

    /// Run the selected tasks in order. A failing task is reported and the
    /// rest still run.
    pub async fn run(&self, selection: TaskSelection, now: DateTime<Utc>) -> RunSummary {
        let mut results = Vec::new();
        for task in selection.tasks() {
            results.push(self.run_task(task, now).await);
        }
        RunSummary {
            message: "Scheduled tasks completed",
            results,
            timestamp: now,
        }
    }

    pub async fn run_task(&self, task: Task, now: DateTime<Utc>) -> TaskReport {
        tracing::info!(task = %task, "Running scheduled task");

        let (report, level, message) = match self.runner.run(task, now).await {
            Ok(TaskOutcome::Completed { count, total }) => (
                TaskReport {
                    task,
                    status: RunStatus::Completed,
                    count: Some(count),
                    total,
                    reason: None,
                    error: None,
                },
                LogLevel::Info,
                format!("{} completed: {} ({} records)", RUN_LOG_PREFIX, task, count),
            ),
            Ok(TaskOutcome::Skipped { reason }) => (
                TaskReport {
                    task,
                    status: RunStatus::Skipped,
                    count: None,
                    total: None,
                    error: None,
                    reason: Some(reason.clone()),
                },
                LogLevel::Info,
                format!("{} skipped: {} ({})", RUN_LOG_PREFIX, task, reason),
            ),
            Err(e) => {
                tracing::error!(task = %task, error = %e, "Scheduled task failed");
                (
                    TaskReport {
                        task,
                        status: RunStatus::Error,
                        count: None,
                        total: None,
                        reason: None,
                        error: Some(e.to_string()),
                    },
                    LogLevel::Error,
                    format!("{} failed: {}: {}", RUN_LOG_PREFIX, task, e),
                )
            }
        };

        if let Err(e) = self.logs.log(level, &message).await {
            tracing::warn!(task = %task, error = %e, "Failed to record scheduler run");
        }
        report
    }

    pub async fn status(
        &self,
        detailed: bool,
        now: DateTime<Utc>,
    ) -> Result<SchedulerStatus, AppError> {
        let last_runs = self
            .logs
            .recent(Some(LogLevel::Info), Some(RUN_LOG_PREFIX), LAST_RUNS_LIMIT)
            .await?;

        let system_stats = SystemStats {
            total_users: self.profiles.count_by_role().await?.total_users,
            active_crops: self
                .crops
                .count(&CropCycleFilter {
                    status: Some(CycleStatus::Active),
                    ..Default::default()
                })
                .await?,
            weather_data_today: self.weather.count_for_date(now.date_naive()).await?,
        };

        let next_scheduled_runs = Task::ALL
            .into_iter()
            .map(|t| (t, t.cadence().next_run_after(now)))
            .collect();

        let recent_errors = if detailed {
            Some(
                self.logs
                    .recent(Some(LogLevel::Error), None, RECENT_ERRORS_LIMIT)
                    .await?,
            )
        } else {
            None
        };

        Ok(SchedulerStatus {
            scheduler_active: self.loop_enabled,
            last_runs,
            system_stats,
            next_scheduled_runs,
            recent_errors,
        })
    }

    /// Spawn the cadence loop. Each minute it runs the tasks that came due
    /// since the previous tick.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(interval_secs = TICK_SECONDS, "Starting scheduler loop");

            let mut interval = tokio::time::interval(std::time::Duration::from_secs(TICK_SECONDS));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut last = Utc::now();

            loop {
                interval.tick().await;
                let now = Utc::now();
                for task in due_tasks(last, now) {
                    self.run_task(task, now).await;
                }
                last = now;
            }
        })
    }
}
