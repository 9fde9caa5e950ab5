use crate::entities::{ChatSenderType, ChatSessionStatus, chat_message_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StartChatRequest {
    pub phone: String,
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StartChatResponse {
    pub session_id: Uuid,
    /// 复用了该手机号未结束的会话
    pub resumed: bool,
    pub customer_name: Option<String>,
    pub welcome_message: String,
    pub show_suggestions: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatMessageResponse {
    pub id: i64,
    pub session_id: Uuid,
    pub sender_type: ChatSenderType,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<chat_message_entity::Model> for ChatMessageResponse {
    fn from(m: chat_message_entity::Model) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            sender_type: m.sender_type,
            content: m.content,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddChatMessageRequest {
    /// 商城组件只能写入 USER 或 BOT 消息，默认 USER
    pub sender_type: Option<ChatSenderType>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AddChatMessageResponse {
    pub message: ChatMessageResponse,
    /// 用户消息包含转人工关键词
    pub escalation_suggested: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EscalateChatRequest {
    pub reason: Option<String>,
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EscalateChatResponse {
    pub queue_position: u64,
    pub message: String,
    /// 非营业时间时返回配置的提示
    pub out_of_hours_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TranscriptEntry {
    pub sender_type: ChatSenderType,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EndChatRequest {
    pub summary: Option<String>,
    #[serde(default)]
    pub transcript: Vec<TranscriptEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatSessionSummary {
    pub id: Uuid,
    pub phone: String,
    pub customer_name: Option<String>,
    pub customer_id: Option<i64>,
    pub status: ChatSessionStatus,
    pub is_escalated: bool,
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalate_reason: Option<String>,
    pub priority: i32,
    pub assigned_to_id: Option<i64>,
    pub assigned_to_name: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub ended_at: Option<DateTime<Utc>>,
    pub started_at: DateTime<Utc>,
    pub last_message: Option<String>,
    pub message_count: u64,
    /// 等待分钟数（转人工 -> 分配或现在）
    pub waiting_time: i64,
    /// 咨询分钟数（分配 -> 结束或现在）
    pub consult_time: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatSessionDetail {
    #[serde(flatten)]
    pub session: ChatSessionSummary,
    pub messages: Vec<ChatMessageResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatAgentResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Option<String>,
    pub is_online: bool,
    pub max_chats: i32,
    pub current_chats: u64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignChatRequest {
    pub agent_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CompleteChatRequest {
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AgentMessageRequest {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetOnlineRequest {
    pub is_online: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct QueueStatsResponse {
    pub waiting: u64,
    pub assigned: u64,
    pub completed_today: u64,
    /// 分钟
    pub avg_wait_time: i64,
    pub avg_consult_time: i64,
    pub total_wait_time: i64,
    pub total_consult_time: i64,
}
