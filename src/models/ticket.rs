use crate::entities::{TicketPriority, TicketStatus, ticket_comment_entity, ticket_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TicketResponse {
    pub id: i64,
    pub subject: String,
    pub description: Option<String>,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
    pub assigned_to_id: Option<i64>,
    pub assigned_to_name: Option<String>,
    pub comment_count: u64,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TicketResponse {
    pub fn from_model(
        m: ticket_entity::Model,
        customer_name: Option<String>,
        assigned_to_name: Option<String>,
        comment_count: u64,
    ) -> Self {
        Self {
            id: m.id,
            subject: m.subject,
            description: m.description,
            status: m.status,
            priority: m.priority,
            customer_id: m.customer_id,
            customer_name,
            assigned_to_id: m.assigned_to_id,
            assigned_to_name,
            comment_count,
            closed_at: m.closed_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TicketCommentResponse {
    pub id: i64,
    pub ticket_id: i64,
    pub author_id: Option<i64>,
    pub author_name: Option<String>,
    pub content: String,
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

impl TicketCommentResponse {
    pub fn from_model(m: ticket_comment_entity::Model, author_name: Option<String>) -> Self {
        Self {
            id: m.id,
            ticket_id: m.ticket_id,
            author_id: m.author_id,
            author_name,
            content: m.content,
            is_internal: m.is_internal,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TicketDetailResponse {
    #[serde(flatten)]
    pub ticket: TicketResponse,
    pub comments: Vec<TicketCommentResponse>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct TicketListQuery {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub assigned_to_id: Option<i64>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct TicketStatsResponse {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub closed: u64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTicketRequest {
    pub subject: String,
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
    pub customer_id: Option<i64>,
    pub assigned_to_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateTicketStatusRequest {
    pub status: TicketStatus,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignTicketRequest {
    /// 为空表示取消分配
    pub assigned_to_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddTicketCommentRequest {
    pub content: String,
    #[serde(default)]
    pub is_internal: bool,
}
