use super::common::double_option;
use crate::entities::{ReviewAlertStatus, ReviewSentiment, review_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: i64,
    pub source: String,
    pub author: String,
    pub content: String,
    pub rating: i16,
    pub review_date: DateTime<Utc>,
    pub sentiment: Option<ReviewSentiment>,
    pub topics: Option<String>,
    pub external_id: Option<String>,
    pub option_text: Option<String>,
    pub images: Vec<String>,
    pub product_url: Option<String>,
    pub is_alerted: bool,
    pub alert_status: Option<ReviewAlertStatus>,
    pub alert_note: Option<String>,
    pub resolved_type: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<review_entity::Model> for ReviewResponse {
    fn from(m: review_entity::Model) -> Self {
        Self {
            images: m
                .images
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default(),
            id: m.id,
            source: m.source,
            author: m.author,
            content: m.content,
            rating: m.rating,
            review_date: m.review_date,
            sentiment: m.sentiment,
            topics: m.topics,
            external_id: m.external_id,
            option_text: m.option_text,
            product_url: m.product_url,
            is_alerted: m.is_alerted,
            alert_status: m.alert_status,
            alert_note: m.alert_note,
            resolved_type: m.resolved_type,
            resolved_at: m.resolved_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct ReviewListQuery {
    pub source: Option<String>,
    pub sentiment: Option<ReviewSentiment>,
    pub min_rating: Option<i16>,
    pub max_rating: Option<i16>,
    /// true 时只返回被标记为投诉的评价
    pub alerted: Option<bool>,
    pub alert_status: Option<ReviewAlertStatus>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub source: String,
    pub author: String,
    pub content: String,
    /// 1..=5
    pub rating: i16,
    /// 缺省为当前时间
    pub review_date: Option<DateTime<Utc>>,
    pub sentiment: Option<ReviewSentiment>,
    pub topics: Option<String>,
    pub external_id: Option<String>,
    pub option_text: Option<String>,
    pub images: Option<Vec<String>>,
    pub product_url: Option<String>,
}

/// 编辑评价内容；评分或内容变化时重新判定投诉
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub source: Option<String>,
    pub author: Option<String>,
    pub content: Option<String>,
    pub rating: Option<i16>,
    pub review_date: Option<DateTime<Utc>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<ReviewSentiment>)]
    pub sentiment: Option<Option<ReviewSentiment>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub topics: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub option_text: Option<Option<String>>,
    pub images: Option<Vec<String>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub product_url: Option<Option<String>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateReviewAlertRequest {
    pub alert_status: ReviewAlertStatus,
    pub alert_note: Option<String>,
    /// 处理方式，如 REFUND / EXCHANGE / COMPENSATION
    pub resolved_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ReviewStatsResponse {
    pub total: u64,
    pub average_rating: f64,
    pub alerted: u64,
    pub new_alerts: u64,
    pub in_progress_alerts: u64,
    pub resolved_alerts: u64,
}
