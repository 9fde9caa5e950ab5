use crate::entities::{chatbot_config_entity, prompt_template_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const RESPONSE_STYLES: &[&str] = &["CONCISE", "BALANCED", "DETAILED"];
pub const CHAT_POSITIONS: &[&str] = &["bottom-right", "bottom-left", "top-right", "top-left"];

/// JSON 数组列 -> 字符串列表，非字符串元素忽略
pub fn json_string_list(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// "1,2,3" -> [1, 2, 3]
pub fn parse_business_days(raw: &str) -> Vec<u32> {
    raw.split(',')
        .filter_map(|d| d.trim().parse::<u32>().ok())
        .collect()
}

pub fn split_languages(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatbotConfigResponse {
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
    pub escalation_keywords: Vec<String>,
    pub auto_escalate_on_fail: bool,
    pub max_fail_before_escalate: i32,
    pub business_hours_only: bool,
    pub business_hours_start: String,
    pub business_hours_end: String,
    pub business_days: Vec<u32>,
    pub out_of_hours_message: String,
    pub default_language: String,
    pub supported_languages: Vec<String>,
    pub timezone: String,
    pub theme_color: String,
    pub chat_position: String,
    pub avatar_url: Option<String>,
    pub data_retention_days: i32,
    pub blocked_keywords: Vec<String>,
    pub sensitive_data_filter: bool,
    pub webhook_url: Option<String>,
    pub notification_email: Option<String>,
    pub version: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<chatbot_config_entity::Model> for ChatbotConfigResponse {
    fn from(m: chatbot_config_entity::Model) -> Self {
        Self {
            id: m.id,
            escalation_keywords: json_string_list(&m.escalation_keywords),
            blocked_keywords: json_string_list(&m.blocked_keywords),
            business_days: parse_business_days(&m.business_days),
            supported_languages: split_languages(&m.supported_languages),
            name: m.name,
            is_active: m.is_active,
            welcome_message: m.welcome_message,
            system_prompt: m.system_prompt,
            brand_voice: m.brand_voice,
            response_style: m.response_style,
            max_tokens: m.max_tokens,
            temperature: m.temperature,
            require_phone_auth: m.require_phone_auth,
            auto_greeting: m.auto_greeting,
            show_suggestions: m.show_suggestions,
            max_conversation_length: m.max_conversation_length,
            enable_escalation: m.enable_escalation,
            auto_escalate_on_fail: m.auto_escalate_on_fail,
            max_fail_before_escalate: m.max_fail_before_escalate,
            business_hours_only: m.business_hours_only,
            business_hours_start: m.business_hours_start,
            business_hours_end: m.business_hours_end,
            out_of_hours_message: m.out_of_hours_message,
            default_language: m.default_language,
            timezone: m.timezone,
            theme_color: m.theme_color,
            chat_position: m.chat_position,
            avatar_url: m.avatar_url,
            data_retention_days: m.data_retention_days,
            sensitive_data_filter: m.sensitive_data_filter,
            webhook_url: m.webhook_url,
            notification_email: m.notification_email,
            version: m.version,
            published_at: m.published_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// 部分更新：只修改提供的字段
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateChatbotConfigRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub welcome_message: Option<String>,
    pub system_prompt: Option<String>,
    pub brand_voice: Option<String>,
    pub response_style: Option<String>,
    pub max_tokens: Option<i32>,
    pub temperature: Option<f64>,
    pub require_phone_auth: Option<bool>,
    pub auto_greeting: Option<bool>,
    pub show_suggestions: Option<bool>,
    pub max_conversation_length: Option<i32>,
    pub enable_escalation: Option<bool>,
    pub escalation_keywords: Option<Vec<String>>,
    pub auto_escalate_on_fail: Option<bool>,
    pub max_fail_before_escalate: Option<i32>,
    pub business_hours_only: Option<bool>,
    pub business_hours_start: Option<String>,
    pub business_hours_end: Option<String>,
    pub business_days: Option<Vec<u32>>,
    pub out_of_hours_message: Option<String>,
    pub default_language: Option<String>,
    pub supported_languages: Option<Vec<String>>,
    pub timezone: Option<String>,
    pub theme_color: Option<String>,
    pub chat_position: Option<String>,
    pub avatar_url: Option<String>,
    pub data_retention_days: Option<i32>,
    pub blocked_keywords: Option<Vec<String>>,
    pub sensitive_data_filter: Option<bool>,
    pub webhook_url: Option<String>,
    pub notification_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToggleChatbotResponse {
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PromptTemplateResponse {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub content: String,
    pub variables: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<prompt_template_entity::Model> for PromptTemplateResponse {
    fn from(m: prompt_template_entity::Model) -> Self {
        Self {
            id: m.id,
            variables: m.variables.as_ref().map(json_string_list).unwrap_or_default(),
            name: m.name,
            category: m.category,
            content: m.content,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePromptTemplateRequest {
    pub name: String,
    pub category: String,
    pub content: String,
    pub variables: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ChatbotStatsResponse {
    pub today_sessions: u64,
    pub week_sessions: u64,
    pub month_sessions: u64,
    /// 本月转人工比例（百分比，保留一位小数）
    pub escalation_rate: f64,
    pub avg_messages_per_session: f64,
}
