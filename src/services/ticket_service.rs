use crate::entities::{
    TicketPriority, TicketStatus, customer_entity as customers, ticket_comment_entity as comments,
    ticket_entity as tickets, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::middlewares::StaffIdentity;
use crate::models::*;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;

/// 状态变更时 closed_at 的取值：结单时记录（已结单则保留原时间），重新打开时清空
pub fn next_closed_at(
    current: Option<DateTime<Utc>>,
    status: TicketStatus,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if status.is_finished() {
        Some(current.unwrap_or(now))
    } else {
        None
    }
}

#[derive(Clone)]
pub struct TicketService {
    pool: DatabaseConnection,
}

impl TicketService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &TicketListQuery) -> AppResult<PaginatedResponse<TicketResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let mut select = tickets::Entity::find();
        if let Some(status) = query.status {
            select = select.filter(tickets::Column::Status.eq(status));
        }
        if let Some(priority) = query.priority {
            select = select.filter(tickets::Column::Priority.eq(priority));
        }
        if let Some(assignee) = query.assigned_to_id {
            select = select.filter(tickets::Column::AssignedToId.eq(assignee));
        }

        let total = select.clone().count(&self.pool).await?;
        let list = select
            .order_by_desc(tickets::Column::CreatedAt)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?;

        let data = self.decorate(list).await?;
        Ok(PaginatedResponse::new(data, &params, total))
    }

    pub async fn stats(&self) -> AppResult<TicketStatsResponse> {
        let pool = &self.pool;
        let count = move |status: TicketStatus| {
            tickets::Entity::find()
                .filter(tickets::Column::Status.eq(status))
                .count(pool)
        };
        Ok(TicketStatsResponse {
            total: tickets::Entity::find().count(&self.pool).await?,
            open: count(TicketStatus::Open).await?,
            in_progress: count(TicketStatus::InProgress).await?,
            resolved: count(TicketStatus::Resolved).await?,
            closed: count(TicketStatus::Closed).await?,
        })
    }

    pub async fn get(&self, id: i64) -> AppResult<TicketDetailResponse> {
        let ticket = self.find(id).await?;
        let comment_rows = comments::Entity::find()
            .filter(comments::Column::TicketId.eq(id))
            .order_by_asc(comments::Column::CreatedAt)
            .order_by_asc(comments::Column::Id)
            .all(&self.pool)
            .await?;

        let author_ids: Vec<i64> = comment_rows.iter().filter_map(|c| c.author_id).collect();
        let authors = self.user_names(&author_ids).await?;
        let comment_list = comment_rows
            .into_iter()
            .map(|c| {
                let name = c.author_id.and_then(|id| authors.get(&id).cloned());
                TicketCommentResponse::from_model(c, name)
            })
            .collect();

        let mut decorated = self.decorate(vec![ticket]).await?;
        let ticket = decorated
            .pop()
            .ok_or_else(|| AppError::InternalError("ticket lookup failed".into()))?;
        Ok(TicketDetailResponse {
            ticket,
            comments: comment_list,
        })
    }

    pub async fn create(&self, req: CreateTicketRequest) -> AppResult<TicketResponse> {
        let subject = req.subject.trim();
        if subject.is_empty() {
            return Err(AppError::ValidationError("Subject is required".into()));
        }
        if let Some(customer_id) = req.customer_id {
            customers::Entity::find_by_id(customer_id)
                .one(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound("Customer not found".into()))?;
        }
        if let Some(agent) = req.assigned_to_id {
            self.ensure_user(agent).await?;
        }

        let now = Utc::now();
        let ticket = tickets::ActiveModel {
            subject: Set(subject.to_string()),
            description: Set(req.description.filter(|d| !d.trim().is_empty())),
            status: Set(TicketStatus::Open),
            priority: Set(req.priority.unwrap_or(TicketPriority::Medium)),
            customer_id: Set(req.customer_id),
            assigned_to_id: Set(req.assigned_to_id),
            closed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Ticket {} created", ticket.id);
        self.single(ticket).await
    }

    pub async fn update_status(&self, id: i64, status: TicketStatus) -> AppResult<TicketResponse> {
        let ticket = self.find(id).await?;
        let now = Utc::now();
        let closed_at = next_closed_at(ticket.closed_at, status, now);
        let mut am = ticket.into_active_model();
        am.status = Set(status);
        am.closed_at = Set(closed_at);
        am.updated_at = Set(now);
        let ticket = am.update(&self.pool).await?;
        self.single(ticket).await
    }

    pub async fn assign(&self, id: i64, assignee: Option<i64>) -> AppResult<TicketResponse> {
        let ticket = self.find(id).await?;
        if let Some(agent) = assignee {
            self.ensure_user(agent).await?;
        }
        let mut am = ticket.into_active_model();
        am.assigned_to_id = Set(assignee);
        am.updated_at = Set(Utc::now());
        let ticket = am.update(&self.pool).await?;
        self.single(ticket).await
    }

    pub async fn add_comment(
        &self,
        staff: &StaffIdentity,
        id: i64,
        req: AddTicketCommentRequest,
    ) -> AppResult<TicketCommentResponse> {
        let content = req.content.trim();
        if content.is_empty() {
            return Err(AppError::ValidationError("Comment content is required".into()));
        }
        let ticket = self.find(id).await?;

        let comment = comments::ActiveModel {
            ticket_id: Set(ticket.id),
            author_id: Set(Some(staff.user_id)),
            content: Set(content.to_string()),
            is_internal: Set(req.is_internal),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        let mut am = ticket.into_active_model();
        am.updated_at = Set(Utc::now());
        am.update(&self.pool).await?;

        let author = self.user_names(&[staff.user_id]).await?.remove(&staff.user_id);
        Ok(TicketCommentResponse::from_model(comment, author))
    }

    async fn find(&self, id: i64) -> AppResult<tickets::Model> {
        tickets::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Ticket not found".into()))
    }

    async fn ensure_user(&self, id: i64) -> AppResult<()> {
        users::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignee not found".into()))?;
        Ok(())
    }

    async fn single(&self, ticket: tickets::Model) -> AppResult<TicketResponse> {
        self.decorate(vec![ticket])
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError("ticket lookup failed".into()))
    }

    async fn user_names(&self, ids: &[i64]) -> AppResult<HashMap<i64, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.to_vec()))
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|u| (u.id, u.name)).collect())
    }

    /// 补充客户名、负责人名和评论数
    async fn decorate(&self, list: Vec<tickets::Model>) -> AppResult<Vec<TicketResponse>> {
        let customer_ids: Vec<i64> = list.iter().filter_map(|t| t.customer_id).collect();
        let customer_names: HashMap<i64, String> = if customer_ids.is_empty() {
            HashMap::new()
        } else {
            customers::Entity::find()
                .filter(customers::Column::Id.is_in(customer_ids))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect()
        };
        let agent_ids: Vec<i64> = list.iter().filter_map(|t| t.assigned_to_id).collect();
        let agent_names = self.user_names(&agent_ids).await?;

        let ticket_ids: Vec<i64> = list.iter().map(|t| t.id).collect();
        let mut comment_counts: HashMap<i64, u64> = HashMap::new();
        if !ticket_ids.is_empty() {
            let rows = comments::Entity::find()
                .filter(comments::Column::TicketId.is_in(ticket_ids))
                .all(&self.pool)
                .await?;
            for c in rows {
                *comment_counts.entry(c.ticket_id).or_default() += 1;
            }
        }

        Ok(list
            .into_iter()
            .map(|t| {
                let customer = t.customer_id.and_then(|id| customer_names.get(&id).cloned());
                let agent = t.assigned_to_id.and_then(|id| agent_names.get(&id).cloned());
                let count = comment_counts.get(&t.id).copied().unwrap_or(0);
                TicketResponse::from_model(t, customer, agent, count)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_closed_at_is_stamped_and_cleared() {
        let now = Utc::now();
        let earlier = now - Duration::hours(3);

        assert_eq!(next_closed_at(None, TicketStatus::Resolved, now), Some(now));
        assert_eq!(next_closed_at(None, TicketStatus::Closed, now), Some(now));
        // RESOLVED -> CLOSED 保留最初的结单时间
        assert_eq!(
            next_closed_at(Some(earlier), TicketStatus::Closed, now),
            Some(earlier)
        );
        assert_eq!(next_closed_at(Some(earlier), TicketStatus::Open, now), None);
        assert_eq!(next_closed_at(None, TicketStatus::InProgress, now), None);
    }
}
