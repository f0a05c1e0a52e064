//! PostgreSQL adapter for IntelligenceRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::entities::{
    AdvisoryId, AreaIntelligence, CommunityAlert, CropCycleId, DecisionWarning, EconomicImpact,
    NewAreaIntelligence, NewCommunityAlert, NewDecisionWarning, NewEconomicImpact,
    NewRiskPrediction, NewSeasonalComparison, ProfileId, RegionalRisks, RiskLevel,
    RiskPrediction, RiskType, SeasonalComparison,
};
use crate::domain::ports::IntelligenceRepository;
use crate::entity::{
    area_intelligence, community_alerts, decision_warnings, economic_impacts, risk_predictions,
    seasonal_comparisons,
};
use crate::error::DomainError;

/// PostgreSQL implementation of IntelligenceRepository
pub struct PostgresIntelligenceRepository {
    db: DatabaseConnection,
}

impl PostgresIntelligenceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn set_warning_flag(
        &self,
        id: &Uuid,
        model: decision_warnings::ActiveModel,
    ) -> Result<(), DomainError> {
        let result = decision_warnings::Entity::update_many()
            .set(model)
            .filter(decision_warnings::Column::Id.eq(*id))
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("Decision warning {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl IntelligenceRepository for PostgresIntelligenceRepository {
    async fn create_risk_prediction(
        &self,
        prediction: &NewRiskPrediction,
    ) -> Result<RiskPrediction, DomainError> {
        let a = &prediction.assessment;
        let model = risk_predictions::ActiveModel {
            id: Set(Uuid::new_v4()),
            crop_cycle_id: Set(prediction.crop_cycle_id.0),
            risk_type: Set(a.risk_type.to_string()),
            risk_level: Set(a.risk_level.to_string()),
            probability: Set(a.probability),
            time_to_impact_days: Set(a.time_to_impact_days),
            confidence_score: Set(a.confidence_score),
            affected_area_percentage: Set(a.affected_area_percentage),
            economic_impact_estimate: Set(a.economic_impact_estimate),
            prevention_cost_estimate: Set(a.prevention_cost_estimate),
            predicted_loss_if_ignored: Set(a.predicted_loss_if_ignored),
            mitigation_strategies: Set(serde_json::json!(a.mitigation_strategies)),
            contributing_factors: Set(a.contributing_factors.clone()),
            model_version: Set(prediction.model_version.clone()),
            expires_at: Set(prediction.expires_at.fixed_offset()),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn active_risk_predictions(
        &self,
        crop_ids: Option<&[CropCycleId]>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RiskPrediction>, DomainError> {
        let mut query = risk_predictions::Entity::find()
            .filter(risk_predictions::Column::ExpiresAt.gt(now.fixed_offset()));
        if let Some(ids) = crop_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query
                .filter(risk_predictions::Column::CropCycleId.is_in(ids.iter().map(|id| id.0)));
        }

        let results = query
            .order_by_desc(risk_predictions::Column::Probability)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create_warning(
        &self,
        warning: &NewDecisionWarning,
    ) -> Result<DecisionWarning, DomainError> {
        let model = decision_warnings::ActiveModel {
            id: Set(Uuid::new_v4()),
            farmer_id: Set(warning.farmer_id.0),
            crop_cycle_id: Set(warning.crop_cycle_id.map(|id| id.0)),
            warning_type: Set(warning.warning_type.clone()),
            risk_level: Set(warning.risk_level.to_string()),
            title: Set(warning.title.clone()),
            description: Set(warning.description.clone()),
            potential_loss_estimate: Set(warning.potential_loss_estimate),
            is_acknowledged: Set(false),
            is_dismissed: Set(false),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn find_warning(&self, id: &Uuid) -> Result<Option<DecisionWarning>, DomainError> {
        let result = decision_warnings::Entity::find_by_id(*id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn open_warnings(
        &self,
        farmer_id: &ProfileId,
    ) -> Result<Vec<DecisionWarning>, DomainError> {
        let results = decision_warnings::Entity::find()
            .filter(decision_warnings::Column::FarmerId.eq(farmer_id.0))
            .filter(decision_warnings::Column::IsAcknowledged.eq(false))
            .filter(decision_warnings::Column::IsDismissed.eq(false))
            .order_by_desc(decision_warnings::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn acknowledge_warning(&self, id: &Uuid) -> Result<(), DomainError> {
        self.set_warning_flag(
            id,
            decision_warnings::ActiveModel {
                is_acknowledged: Set(true),
                ..Default::default()
            },
        )
        .await
    }

    async fn dismiss_warning(&self, id: &Uuid) -> Result<(), DomainError> {
        self.set_warning_flag(
            id,
            decision_warnings::ActiveModel {
                is_dismissed: Set(true),
                ..Default::default()
            },
        )
        .await
    }

    async fn upsert_area(
        &self,
        area: &NewAreaIntelligence,
    ) -> Result<AreaIntelligence, DomainError> {
        let model = area_intelligence::ActiveModel {
            id: Set(Uuid::new_v4()),
            center_lat: Set(area.center.lat),
            center_lng: Set(area.center.lng),
            radius_km: Set(area.radius_km),
            active_crops: Set(area.active_crops as i64),
            total_area_acres: Set(area.total_area_acres),
            crop_distribution: Set(area.crop_distribution.clone()),
            disease_pressure: Set(area.regional_risks.disease_pressure),
            pest_activity: Set(area.regional_risks.pest_activity),
            weather_stress: Set(area.regional_risks.weather_stress),
            expires_at: Set(area.expires_at.fixed_offset()),
            updated_at: Set(Utc::now().fixed_offset()),
        };

        let result = area_intelligence::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    area_intelligence::Column::CenterLat,
                    area_intelligence::Column::CenterLng,
                ])
                .update_columns([
                    area_intelligence::Column::RadiusKm,
                    area_intelligence::Column::ActiveCrops,
                    area_intelligence::Column::TotalAreaAcres,
                    area_intelligence::Column::CropDistribution,
                    area_intelligence::Column::DiseasePressure,
                    area_intelligence::Column::PestActivity,
                    area_intelligence::Column::WeatherStress,
                    area_intelligence::Column::ExpiresAt,
                    area_intelligence::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn active_areas(&self, now: DateTime<Utc>) -> Result<Vec<AreaIntelligence>, DomainError> {
        let results = area_intelligence::Entity::find()
            .filter(area_intelligence::Column::ExpiresAt.gt(now.fixed_offset()))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create_alert(
        &self,
        alert: &NewCommunityAlert,
    ) -> Result<CommunityAlert, DomainError> {
        let model = community_alerts::ActiveModel {
            id: Set(Uuid::new_v4()),
            alert_type: Set(alert.alert_type.clone()),
            severity: Set(alert.severity.to_string()),
            description: Set(alert.description.clone()),
            center_lat: Set(alert.center.lat),
            center_lng: Set(alert.center.lng),
            affected_radius_km: Set(alert.affected_radius_km),
            is_active: Set(true),
            expires_at: Set(alert.expires_at.fixed_offset()),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn active_alerts(&self, now: DateTime<Utc>) -> Result<Vec<CommunityAlert>, DomainError> {
        let results = community_alerts::Entity::find()
            .filter(community_alerts::Column::IsActive.eq(true))
            .filter(community_alerts::Column::ExpiresAt.gt(now.fixed_offset()))
            .order_by_desc(community_alerts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn replace_seasonal_comparisons(
        &self,
        crop_id: &CropCycleId,
        rows: &[NewSeasonalComparison],
    ) -> Result<Vec<SeasonalComparison>, DomainError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        seasonal_comparisons::Entity::delete_many()
            .filter(seasonal_comparisons::Column::CropCycleId.eq(crop_id.0))
            .exec(&txn)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let now = Utc::now().fixed_offset();
        let mut stored = Vec::with_capacity(rows.len());
        for row in rows {
            let model = seasonal_comparisons::ActiveModel {
                id: Set(Uuid::new_v4()),
                crop_cycle_id: Set(row.crop_cycle_id.0),
                comparison_season: Set(row.comparison_season.clone()),
                compared_cycle_id: Set(row.compared_cycle_id.0),
                total_rainfall_mm: Set(row.total_rainfall_mm),
                avg_temperature: Set(row.avg_temperature),
                rainfall_deviation_percent: Set(row.rainfall_deviation_percent),
                temperature_deviation_percent: Set(row.temperature_deviation_percent),
                yield_tons: Set(row.yield_tons),
                created_at: Set(now),
            };
            let inserted = model
                .insert(&txn)
                .await
                .map_err(|e| DomainError::Database(e.to_string()))?;
            stored.push(inserted.into());
        }

        txn.commit()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(stored)
    }

    async fn seasonal_comparisons(
        &self,
        crop_id: &CropCycleId,
    ) -> Result<Vec<SeasonalComparison>, DomainError> {
        let results = seasonal_comparisons::Entity::find()
            .filter(seasonal_comparisons::Column::CropCycleId.eq(crop_id.0))
            .order_by_asc(seasonal_comparisons::Column::ComparisonSeason)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create_economic_impact(
        &self,
        impact: &NewEconomicImpact,
    ) -> Result<EconomicImpact, DomainError> {
        let model = economic_impacts::ActiveModel {
            id: Set(Uuid::new_v4()),
            farmer_id: Set(impact.farmer_id.0),
            advisory_id: Set(impact.advisory_id.map(|id| id.0)),
            advisory_type: Set(impact.advisory_type.map(|t| t.to_string())),
            risk_prediction_id: Set(impact.risk_prediction_id),
            estimated_cost: Set(impact.estimated_cost),
            estimated_loss_prevented: Set(impact.estimated_loss_prevented),
            roi_percentage: Set(impact.roi_percentage),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn economic_impacts(
        &self,
        farmer_id: &ProfileId,
    ) -> Result<Vec<EconomicImpact>, DomainError> {
        let results = economic_impacts::Entity::find()
            .filter(economic_impacts::Column::FarmerId.eq(farmer_id.0))
            .order_by_desc(economic_impacts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }
}

impl From<risk_predictions::Model> for RiskPrediction {
    fn from(model: risk_predictions::Model) -> Self {
        RiskPrediction {
            id: model.id,
            crop_cycle_id: CropCycleId(model.crop_cycle_id),
            risk_type: model.risk_type.parse().unwrap_or(RiskType::Disease),
            risk_level: model.risk_level.parse().unwrap_or(RiskLevel::Medium),
            probability: model.probability,
            time_to_impact_days: model.time_to_impact_days,
            confidence_score: model.confidence_score,
            affected_area_percentage: model.affected_area_percentage,
            economic_impact_estimate: model.economic_impact_estimate,
            prevention_cost_estimate: model.prevention_cost_estimate,
            predicted_loss_if_ignored: model.predicted_loss_if_ignored,
            mitigation_strategies: serde_json::from_value(model.mitigation_strategies)
                .unwrap_or_default(),
            contributing_factors: model.contributing_factors,
            model_version: model.model_version,
            expires_at: model.expires_at.with_timezone(&Utc),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<decision_warnings::Model> for DecisionWarning {
    fn from(model: decision_warnings::Model) -> Self {
        DecisionWarning {
            id: model.id,
            farmer_id: ProfileId(model.farmer_id),
            crop_cycle_id: model.crop_cycle_id.map(CropCycleId),
            warning_type: model.warning_type,
            risk_level: model.risk_level.parse().unwrap_or(RiskLevel::Medium),
            title: model.title,
            description: model.description,
            potential_loss_estimate: model.potential_loss_estimate,
            is_acknowledged: model.is_acknowledged,
            is_dismissed: model.is_dismissed,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<area_intelligence::Model> for AreaIntelligence {
    fn from(model: area_intelligence::Model) -> Self {
        AreaIntelligence {
            id: model.id,
            center_lat: model.center_lat,
            center_lng: model.center_lng,
            radius_km: model.radius_km,
            active_crops: model.active_crops.max(0) as u64,
            total_area_acres: model.total_area_acres,
            crop_distribution: model.crop_distribution,
            regional_risks: RegionalRisks {
                disease_pressure: model.disease_pressure,
                pest_activity: model.pest_activity,
                weather_stress: model.weather_stress,
            },
            expires_at: model.expires_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<community_alerts::Model> for CommunityAlert {
    fn from(model: community_alerts::Model) -> Self {
        CommunityAlert {
            id: model.id,
            alert_type: model.alert_type,
            severity: model.severity.parse().unwrap_or(RiskLevel::Medium),
            description: model.description,
            center_lat: model.center_lat,
            center_lng: model.center_lng,
            affected_radius_km: model.affected_radius_km,
            is_active: model.is_active,
            expires_at: model.expires_at.with_timezone(&Utc),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<seasonal_comparisons::Model> for SeasonalComparison {
    fn from(model: seasonal_comparisons::Model) -> Self {
        SeasonalComparison {
            id: model.id,
            crop_cycle_id: CropCycleId(model.crop_cycle_id),
            comparison_season: model.comparison_season,
            compared_cycle_id: CropCycleId(model.compared_cycle_id),
            total_rainfall_mm: model.total_rainfall_mm,
            avg_temperature: model.avg_temperature,
            rainfall_deviation_percent: model.rainfall_deviation_percent,
            temperature_deviation_percent: model.temperature_deviation_percent,
            yield_tons: model.yield_tons,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<economic_impacts::Model> for EconomicImpact {
    fn from(model: economic_impacts::Model) -> Self {
        EconomicImpact {
            id: model.id,
            farmer_id: ProfileId(model.farmer_id),
            advisory_id: model.advisory_id.map(AdvisoryId),
            advisory_type: model.advisory_type.and_then(|t| t.parse().ok()),
            risk_prediction_id: model.risk_prediction_id,
            estimated_cost: model.estimated_cost,
            estimated_loss_prevented: model.estimated_loss_prevented,
            roi_percentage: model.roi_percentage,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
