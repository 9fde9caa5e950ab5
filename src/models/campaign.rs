use crate::entities::{CampaignStatus, CampaignType, campaign_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};

/// 百分比，保留一位小数；分母为 0 时为 0
pub fn percent(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CampaignResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub campaign_type: CampaignType,
    pub status: CampaignStatus,
    pub target_segment: Option<String>,
    pub budget: Option<i64>,
    pub spent: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub coupon_id: Option<i64>,
    pub sent_count: i64,
    pub open_count: i64,
    pub click_count: i64,
    pub convert_count: i64,
    /// 以下比率均相对发送数
    pub open_rate: f64,
    pub click_rate: f64,
    pub conversion_rate: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<campaign_entity::Model> for CampaignResponse {
    fn from(m: campaign_entity::Model) -> Self {
        Self {
            open_rate: percent(m.open_count, m.sent_count),
            click_rate: percent(m.click_count, m.sent_count),
            conversion_rate: percent(m.convert_count, m.sent_count),
            id: m.id,
            name: m.name,
            description: m.description,
            campaign_type: m.campaign_type,
            status: m.status,
            target_segment: m.target_segment,
            budget: m.budget,
            spent: m.spent,
            start_date: m.start_date,
            end_date: m.end_date,
            coupon_id: m.coupon_id,
            sent_count: m.sent_count,
            open_count: m.open_count,
            click_count: m.click_count,
            convert_count: m.convert_count,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct CampaignListQuery {
    pub status: Option<CampaignStatus>,
    pub campaign_type: Option<CampaignType>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub description: Option<String>,
    pub campaign_type: CampaignType,
    pub target_segment: Option<String>,
    pub budget: Option<i64>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub coupon_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub campaign_type: Option<CampaignType>,
    pub target_segment: Option<String>,
    pub budget: Option<i64>,
    pub spent: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub coupon_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateCampaignStatusRequest {
    pub status: CampaignStatus,
}

/// 绝对值写入
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CampaignMetricsRequest {
    pub sent_count: Option<i64>,
    pub open_count: Option<i64>,
    pub click_count: Option<i64>,
    pub convert_count: Option<i64>,
    pub spent: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct CampaignSummaryResponse {
    pub total: u64,
    pub by_status: HashMap<String, u64>,
    pub total_budget: i64,
    pub total_spent: i64,
}
