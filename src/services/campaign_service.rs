use crate::entities::{CampaignStatus, campaign_entity as campaigns, coupon_entity as coupons};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use std::collections::HashMap;

fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<()> {
    if end < start {
        return Err(AppError::ValidationError(
            "end_date must not be before start_date".into(),
        ));
    }
    Ok(())
}

fn check_non_negative(field: &str, v: Option<i64>) -> AppResult<()> {
    if v.is_some_and(|n| n < 0) {
        return Err(AppError::ValidationError(format!("{field} must be >= 0")));
    }
    Ok(())
}

/// 按状态计数并汇总预算与花费
pub fn summarize_campaigns(list: &[campaigns::Model]) -> CampaignSummaryResponse {
    let mut by_status: HashMap<String, u64> = HashMap::new();
    for status in [
        CampaignStatus::Draft,
        CampaignStatus::Active,
        CampaignStatus::Paused,
        CampaignStatus::Completed,
    ] {
        by_status.insert(status_label(status).to_string(), 0);
    }
    let mut summary = CampaignSummaryResponse::default();
    for c in list {
        summary.total += 1;
        *by_status.entry(status_label(c.status).to_string()).or_default() += 1;
        summary.total_budget += c.budget.unwrap_or(0);
        summary.total_spent += c.spent;
    }
    summary.by_status = by_status;
    summary
}

fn status_label(status: CampaignStatus) -> &'static str {
    match status {
        CampaignStatus::Draft => "DRAFT",
        CampaignStatus::Active => "ACTIVE",
        CampaignStatus::Paused => "PAUSED",
        CampaignStatus::Completed => "COMPLETED",
    }
}

#[derive(Clone)]
pub struct CampaignService {
    pool: DatabaseConnection,
}

impl CampaignService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &CampaignListQuery) -> AppResult<Vec<CampaignResponse>> {
        let mut select = campaigns::Entity::find();
        if let Some(status) = query.status {
            select = select.filter(campaigns::Column::Status.eq(status));
        }
        if let Some(kind) = query.campaign_type {
            select = select.filter(campaigns::Column::CampaignType.eq(kind));
        }
        let list = select
            .order_by_desc(campaigns::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, id: i64) -> AppResult<CampaignResponse> {
        Ok(self.find(id).await?.into())
    }

    pub async fn create(&self, req: CreateCampaignRequest) -> AppResult<CampaignResponse> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("Campaign name is required".into()));
        }
        check_window(req.start_date, req.end_date)?;
        check_non_negative("budget", req.budget)?;
        if let Some(coupon_id) = req.coupon_id {
            self.ensure_coupon(coupon_id).await?;
        }

        let now = Utc::now();
        let campaign = campaigns::ActiveModel {
            name: Set(name.to_string()),
            description: Set(req.description.filter(|d| !d.trim().is_empty())),
            campaign_type: Set(req.campaign_type),
            status: Set(CampaignStatus::Draft),
            target_segment: Set(req.target_segment.filter(|s| !s.trim().is_empty())),
            budget: Set(req.budget),
            spent: Set(0),
            start_date: Set(req.start_date),
            end_date: Set(req.end_date),
            sent_count: Set(0),
            open_count: Set(0),
            click_count: Set(0),
            convert_count: Set(0),
            coupon_id: Set(req.coupon_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Campaign {} created", campaign.id);
        Ok(campaign.into())
    }

    pub async fn update(&self, id: i64, req: UpdateCampaignRequest) -> AppResult<CampaignResponse> {
        let campaign = self.find(id).await?;
        let start = req.start_date.unwrap_or(campaign.start_date);
        let end = req.end_date.unwrap_or(campaign.end_date);
        check_window(start, end)?;
        check_non_negative("budget", req.budget)?;
        check_non_negative("spent", req.spent)?;
        if let Some(coupon_id) = req.coupon_id {
            self.ensure_coupon(coupon_id).await?;
        }

        let mut am = campaign.into_active_model();
        if let Some(name) = req.name.map(|n| n.trim().to_string()) {
            if name.is_empty() {
                return Err(AppError::ValidationError("Campaign name is required".into()));
            }
            am.name = Set(name);
        }
        if req.description.is_some() {
            am.description = Set(req.description.filter(|d| !d.trim().is_empty()));
        }
        if let Some(kind) = req.campaign_type {
            am.campaign_type = Set(kind);
        }
        if req.target_segment.is_some() {
            am.target_segment = Set(req.target_segment.filter(|s| !s.trim().is_empty()));
        }
        if req.budget.is_some() {
            am.budget = Set(req.budget);
        }
        if let Some(spent) = req.spent {
            am.spent = Set(spent);
        }
        if req.coupon_id.is_some() {
            am.coupon_id = Set(req.coupon_id);
        }
        am.start_date = Set(start);
        am.end_date = Set(end);
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?.into())
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let campaign = self.find(id).await?;
        campaigns::Entity::delete_by_id(campaign.id)
            .exec(&self.pool)
            .await?;
        log::info!("Campaign {} deleted", id);
        Ok(())
    }

    /// 状态由运营人员直接设置，不做自动流转
    pub async fn update_status(&self, id: i64, status: CampaignStatus) -> AppResult<CampaignResponse> {
        let campaign = self.find(id).await?;
        let mut am = campaign.into_active_model();
        am.status = Set(status);
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?.into())
    }

    pub async fn record_metrics(
        &self,
        id: i64,
        req: CampaignMetricsRequest,
    ) -> AppResult<CampaignResponse> {
        for (field, v) in [
            ("sent_count", req.sent_count),
            ("open_count", req.open_count),
            ("click_count", req.click_count),
            ("convert_count", req.convert_count),
            ("spent", req.spent),
        ] {
            check_non_negative(field, v)?;
        }
        let campaign = self.find(id).await?;
        let mut am = campaign.into_active_model();
        if let Some(v) = req.sent_count {
            am.sent_count = Set(v);
        }
        if let Some(v) = req.open_count {
            am.open_count = Set(v);
        }
        if let Some(v) = req.click_count {
            am.click_count = Set(v);
        }
        if let Some(v) = req.convert_count {
            am.convert_count = Set(v);
        }
        if let Some(v) = req.spent {
            am.spent = Set(v);
        }
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?.into())
    }

    pub async fn summary(&self) -> AppResult<CampaignSummaryResponse> {
        let list = campaigns::Entity::find().all(&self.pool).await?;
        Ok(summarize_campaigns(&list))
    }

    async fn find(&self, id: i64) -> AppResult<campaigns::Model> {
        campaigns::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Campaign not found".into()))
    }

    async fn ensure_coupon(&self, id: i64) -> AppResult<()> {
        coupons::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Coupon not found".into()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CampaignType;

    fn campaign(status: CampaignStatus, budget: Option<i64>, spent: i64) -> campaigns::Model {
        let now = Utc::now();
        campaigns::Model {
            id: 1,
            name: "봄 세일".into(),
            description: None,
            campaign_type: CampaignType::Email,
            status,
            target_segment: None,
            budget,
            spent,
            start_date: now,
            end_date: now,
            sent_count: 200,
            open_count: 50,
            click_count: 10,
            convert_count: 3,
            coupon_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_summary_counts_every_status() {
        let list = vec![
            campaign(CampaignStatus::Draft, Some(100_000), 0),
            campaign(CampaignStatus::Active, Some(50_000), 20_000),
            campaign(CampaignStatus::Active, None, 5_000),
        ];
        let s = summarize_campaigns(&list);
        assert_eq!(s.total, 3);
        assert_eq!(s.by_status["ACTIVE"], 2);
        assert_eq!(s.by_status["PAUSED"], 0);
        assert_eq!(s.total_budget, 150_000);
        assert_eq!(s.total_spent, 25_000);
    }

    #[test]
    fn test_rates_are_relative_to_sent() {
        let r = CampaignResponse::from(campaign(CampaignStatus::Active, None, 0));
        assert_eq!(r.open_rate, 25.0);
        assert_eq!(r.click_rate, 5.0);
        assert_eq!(r.conversion_rate, 1.5);
        assert_eq!(percent(1, 0), 0.0);
    }

    #[test]
    fn test_window_check() {
        let now = Utc::now();
        assert!(check_window(now, now).is_ok());
        assert!(check_window(now, now - chrono::Duration::days(1)).is_err());
    }
}
