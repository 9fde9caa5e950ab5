use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "review_sentiment")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewSentiment {
    #[sea_orm(string_value = "POSITIVE")]
    #[serde(alias = "positive", alias = "Positive")]
    Positive,
    #[sea_orm(string_value = "NEUTRAL")]
    #[serde(alias = "neutral", alias = "Neutral")]
    Neutral,
    #[sea_orm(string_value = "NEGATIVE")]
    #[serde(alias = "negative", alias = "Negative")]
    Negative,
}

/// 投诉处理进度: NEW -> IN_PROGRESS -> RESOLVED
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "review_alert_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewAlertStatus {
    #[sea_orm(string_value = "NEW")]
    New,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "RESOLVED")]
    Resolved,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 渠道，如 naver / coupang / mall
    pub source: String,
    pub author: String,
    pub content: String,
    pub rating: i16,
    pub review_date: DateTime<Utc>,
    pub sentiment: Option<ReviewSentiment>,
    pub topics: Option<String>,
    pub external_id: Option<String>,
    pub option_text: Option<String>,
    pub images: Option<Json>,
    pub product_url: Option<String>,
    pub is_alerted: bool,
    pub alert_status: Option<ReviewAlertStatus>,
    pub alert_note: Option<String>,
    pub resolved_type: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
