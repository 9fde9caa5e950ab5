use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 聊天机器人配置。只使用最新创建的一行
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "chatbot_configs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub welcome_message: String,
    pub system_prompt: String,
    pub brand_voice: String,
    pub response_style: String,
    pub max_tokens: i32,
    pub temperature: f64,
    pub require_phone_auth: bool,
    pub auto_greeting: bool,
    pub show_suggestions: bool,
    pub max_conversation_length: i32,
    pub enable_escalation: bool,
    pub escalation_keywords: Json,
    pub auto_escalate_on_fail: bool,
    pub max_fail_before_escalate: i32,
    pub business_hours_only: bool,
    pub business_hours_start: String,
    pub business_hours_end: String,
    /// 逗号分隔, 0=周日
    pub business_days: String,
    pub out_of_hours_message: String,
    pub default_language: String,
    /// 逗号分隔
    pub supported_languages: String,
    pub timezone: String,
    pub theme_color: String,
    pub chat_position: String,
    pub avatar_url: Option<String>,
    pub data_retention_days: i32,
    pub blocked_keywords: Json,
    pub sensitive_data_filter: bool,
    pub webhook_url: Option<String>,
    pub notification_email: Option<String>,
    pub version: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
