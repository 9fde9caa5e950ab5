use crate::entities::{
    ChatSenderType, ChatSessionStatus, TicketPriority, TicketStatus,
    chat_message_entity as messages, chat_session_entity as sessions,
    customer_entity as customers, role_entity as roles, ticket_entity as tickets,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::external::{EscalationNotice, WebhookService};
use crate::middlewares::StaffIdentity;
use crate::models::*;
use crate::services::ChatbotConfigService;
use crate::utils::time::{local_today, month_start, start_of_local_day, today_start};
use crate::utils::{format_kr_mobile, validate_kr_mobile};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDateTime, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

const DEFAULT_ESCALATE_REASON: &str = "Customer requested a human agent";
const DEFAULT_END_SUMMARY: &str = "Chatbot conversation";

/// 文本中出现的第一个关键词（忽略大小写）
pub fn find_keyword<'a>(text: &str, keywords: &'a [String]) -> Option<&'a str> {
    let lower = text.to_lowercase();
    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .find(|k| lower.contains(&k.to_lowercase()))
}

/// 营业时间判断: days 中 0 = 周日；区间为 [start, end)。时间配置无法解析时视为营业
pub fn is_within_business_hours(start: &str, end: &str, days: &[u32], at: NaiveDateTime) -> bool {
    if !days.contains(&at.weekday().num_days_from_sunday()) {
        return false;
    }
    let (Ok(open), Ok(close)) = (
        NaiveTime::parse_from_str(start.trim(), "%H:%M"),
        NaiveTime::parse_from_str(end.trim(), "%H:%M"),
    ) else {
        return true;
    };
    let now = at.time();
    now >= open && now < close
}

/// 等待分钟数: 转人工 -> 分配；未分配时已结束的会话算到结束，否则算到 now
pub fn waiting_minutes(s: &sessions::Model, now: DateTime<Utc>) -> i64 {
    let Some(escalated_at) = s.escalated_at else {
        return 0;
    };
    let end = match (s.assigned_at, s.status) {
        (Some(assigned), _) => assigned,
        (None, ChatSessionStatus::Closed) => s.ended_at.unwrap_or(now),
        (None, _) => now,
    };
    (end - escalated_at).num_minutes().max(0)
}

/// 咨询分钟数: 分配 -> 结束或 now
pub fn consult_minutes(s: &sessions::Model, now: DateTime<Utc>) -> i64 {
    match s.assigned_at {
        Some(assigned) => (s.ended_at.unwrap_or(now) - assigned).num_minutes().max(0),
        None => 0,
    }
}

/// 今日已完成会话的等待/咨询时间统计 (平均值, 合计)，单位分钟，四舍五入
pub fn queue_time_stats(rows: &[(DateTime<Utc>, DateTime<Utc>, DateTime<Utc>)]) -> (i64, i64, i64, i64) {
    if rows.is_empty() {
        return (0, 0, 0, 0);
    }
    let (mut wait_ms, mut consult_ms) = (0i64, 0i64);
    for (escalated, assigned, ended) in rows {
        wait_ms += (*assigned - *escalated).num_milliseconds();
        consult_ms += (*ended - *assigned).num_milliseconds();
    }
    let n = rows.len() as f64;
    let minutes = |ms: f64| (ms / 60_000.0).round() as i64;
    (
        minutes(wait_ms as f64 / n),
        minutes(consult_ms as f64 / n),
        minutes(wait_ms as f64),
        minutes(consult_ms as f64),
    )
}

/// 保留一位小数
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn escalation_rate(escalated: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        round1(escalated as f64 / total as f64 * 100.0)
    }
}

#[derive(Clone)]
pub struct ChatService {
    pool: DatabaseConnection,
    config_service: ChatbotConfigService,
    webhook: WebhookService,
}

impl ChatService {
    pub fn new(
        pool: DatabaseConnection,
        config_service: ChatbotConfigService,
        webhook: WebhookService,
    ) -> Self {
        Self {
            pool,
            config_service,
            webhook,
        }
    }

    // ---------------------------------------------------------------------
    // 商城聊天组件
    // ---------------------------------------------------------------------

    pub async fn start_session(&self, req: StartChatRequest) -> AppResult<StartChatResponse> {
        let config = self.config_service.current().await?;
        if !config.is_active {
            return Err(AppError::ValidationError("Chatbot is not active".into()));
        }

        let raw_phone = req.phone.trim();
        if raw_phone.is_empty() {
            return Err(AppError::ValidationError("Phone is required".into()));
        }
        let phone = if config.require_phone_auth {
            validate_kr_mobile(raw_phone)?;
            format_kr_mobile(raw_phone)
        } else {
            raw_phone.to_string()
        };

        let open = sessions::Entity::find()
            .filter(sessions::Column::Phone.eq(phone.clone()))
            .filter(sessions::Column::Status.ne(ChatSessionStatus::Closed))
            .order_by_desc(sessions::Column::CreatedAt)
            .one(&self.pool)
            .await?;
        if let Some(session) = open {
            return Ok(StartChatResponse {
                session_id: session.id,
                resumed: true,
                customer_name: session.customer_name,
                welcome_message: config.welcome_message,
                show_suggestions: config.show_suggestions,
            });
        }

        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        let customer = customers::Entity::find()
            .filter(
                Condition::any()
                    .add(customers::Column::Phone.eq(phone.clone()))
                    .add(customers::Column::Phone.eq(digits)),
            )
            .one(&self.pool)
            .await?;
        let customer_name = req
            .customer_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .or_else(|| customer.as_ref().map(|c| c.name.clone()));

        let now = Utc::now();
        let session = sessions::ActiveModel {
            id: Set(Uuid::new_v4()),
            phone: Set(phone),
            customer_name: Set(customer_name.clone()),
            customer_id: Set(customer.map(|c| c.id)),
            status: Set(ChatSessionStatus::Active),
            is_escalated: Set(false),
            priority: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        if config.auto_greeting {
            self.insert_message(session.id, ChatSenderType::Bot, &config.welcome_message, now)
                .await?;
        }

        log::info!("Chat session {} started", session.id);
        Ok(StartChatResponse {
            session_id: session.id,
            resumed: false,
            customer_name,
            welcome_message: config.welcome_message,
            show_suggestions: config.show_suggestions,
        })
    }

    pub async fn add_message(
        &self,
        session_id: Uuid,
        req: AddChatMessageRequest,
    ) -> AppResult<AddChatMessageResponse> {
        let session = self.open_session(session_id).await?;
        let content = req.content.trim();
        if content.is_empty() {
            return Err(AppError::ValidationError("Message content is required".into()));
        }
        let sender = req.sender_type.unwrap_or(ChatSenderType::User);
        if !matches!(sender, ChatSenderType::User | ChatSenderType::Bot) {
            return Err(AppError::ValidationError(
                "Only USER or BOT messages can be posted here".into(),
            ));
        }

        let config = self.config_service.current().await?;
        let mut escalation_suggested = false;
        if sender == ChatSenderType::User {
            let blocked = json_string_list(&config.blocked_keywords);
            if let Some(word) = find_keyword(content, &blocked) {
                log::warn!("Chat session {} message blocked by keyword '{}'", session_id, word);
                return Err(AppError::ValidationError(
                    "Message contains a blocked keyword".into(),
                ));
            }
            if config.enable_escalation && !session.is_escalated {
                let keywords = json_string_list(&config.escalation_keywords);
                escalation_suggested = find_keyword(content, &keywords).is_some();
            }
        }

        let now = Utc::now();
        let message = self.insert_message(session.id, sender, content, now).await?;
        self.touch(session, now).await?;

        Ok(AddChatMessageResponse {
            message: message.into(),
            escalation_suggested,
        })
    }

    pub async fn escalate(
        &self,
        session_id: Uuid,
        req: EscalateChatRequest,
    ) -> AppResult<EscalateChatResponse> {
        let session = self.open_session(session_id).await?;
        if session.status == ChatSessionStatus::Assigned {
            return Err(AppError::Conflict(
                "Session is already connected to an agent".into(),
            ));
        }
        let config = self.config_service.current().await?;

        let reason = req
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_ESCALATE_REASON.to_string());

        // 已在排队中的会话不重置排队时间
        let (session, newly_escalated) = if session.status == ChatSessionStatus::Escalated {
            (session, false)
        } else {
            let now = Utc::now();
            let mut am = session.into_active_model();
            am.is_escalated = Set(true);
            am.escalated_at = Set(Some(now));
            am.escalate_reason = Set(Some(reason.clone()));
            am.priority = Set(req.priority.unwrap_or(0).max(0));
            am.status = Set(ChatSessionStatus::Escalated);
            am.updated_at = Set(now);
            (am.update(&self.pool).await?, true)
        };

        let escalated_at = session.escalated_at.unwrap_or_else(Utc::now);
        let ahead = sessions::Entity::find()
            .filter(sessions::Column::Status.eq(ChatSessionStatus::Escalated))
            .filter(sessions::Column::AssignedToId.is_null())
            .filter(sessions::Column::EscalatedAt.lt(escalated_at))
            .count(&self.pool)
            .await?;
        let queue_position = ahead + 1;

        if newly_escalated {
            self.insert_message(
                session.id,
                ChatSenderType::System,
                &format!("[Agent requested] Reason: {reason}"),
                Utc::now(),
            )
            .await?;
            self.open_follow_up_ticket(&session, &reason).await?;

            if let Some(url) = config.webhook_url.clone() {
                self.webhook.spawn_escalation(
                    url,
                    EscalationNotice {
                        event: EscalationNotice::EVENT,
                        session_id: session.id,
                        phone: session.phone.clone(),
                        customer_name: session.customer_name.clone(),
                        reason: reason.clone(),
                        priority: session.priority,
                        queue_position,
                        escalated_at,
                    },
                );
            }
            log::info!(
                "Chat session {} escalated, queue position {}",
                session.id,
                queue_position
            );
        }

        let days = parse_business_days(&config.business_days);
        let open_now = is_within_business_hours(
            &config.business_hours_start,
            &config.business_hours_end,
            &days,
            Local::now().naive_local(),
        );

        Ok(EscalateChatResponse {
            queue_position,
            message: format!("An agent has been requested. Your queue position: {queue_position}"),
            out_of_hours_message: (!open_now).then(|| config.out_of_hours_message.clone()),
        })
    }

    /// 保存对话记录并结束会话
    pub async fn end_session(&self, session_id: Uuid, req: EndChatRequest) -> AppResult<()> {
        let session = self.open_session(session_id).await?;
        let now = Utc::now();

        for entry in req.transcript {
            let content = entry.content.trim();
            if content.is_empty() {
                continue;
            }
            self.insert_message(session.id, entry.sender_type, content, entry.created_at.unwrap_or(now))
                .await?;
        }

        let summary = req
            .summary
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_END_SUMMARY.to_string());
        self.close(session, Some(summary)).await?;
        log::info!("Chat session {} ended by customer", session_id);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // 客服控制台
    // ---------------------------------------------------------------------

    /// 所有转过人工的会话
    pub async fn list_sessions(&self) -> AppResult<Vec<ChatSessionSummary>> {
        let list = sessions::Entity::find()
            .filter(sessions::Column::IsEscalated.eq(true))
            .order_by_desc(sessions::Column::EscalatedAt)
            .all(&self.pool)
            .await?;
        self.summarize(list).await
    }

    /// 排队/处理中的会话和今天完成的会话
    pub async fn escalated_sessions(&self) -> AppResult<Vec<ChatSessionSummary>> {
        let list = sessions::Entity::find()
            .filter(sessions::Column::IsEscalated.eq(true))
            .filter(
                Condition::any()
                    .add(sessions::Column::Status.is_in([
                        ChatSessionStatus::Escalated,
                        ChatSessionStatus::Assigned,
                    ]))
                    .add(
                        Condition::all()
                            .add(sessions::Column::Status.eq(ChatSessionStatus::Closed))
                            .add(sessions::Column::EndedAt.gte(today_start())),
                    ),
            )
            .order_by_desc(sessions::Column::Priority)
            .order_by_asc(sessions::Column::EscalatedAt)
            .all(&self.pool)
            .await?;
        self.summarize(list).await
    }

    pub async fn detail(&self, session_id: Uuid) -> AppResult<ChatSessionDetail> {
        let session = self.find(session_id).await?;
        let message_list = messages::Entity::find()
            .filter(messages::Column::SessionId.eq(session_id))
            .order_by_asc(messages::Column::CreatedAt)
            .order_by_asc(messages::Column::Id)
            .all(&self.pool)
            .await?;
        let session = self
            .summarize(vec![session])
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError("chat session lookup failed".into()))?;
        Ok(ChatSessionDetail {
            session,
            messages: message_list.into_iter().map(Into::into).collect(),
        })
    }

    /// 可接待的客服: ADMIN 或拥有 customer_service 权限的在职员工
    pub async fn agents(&self) -> AppResult<Vec<ChatAgentResponse>> {
        let role_list = roles::Entity::find().all(&self.pool).await?;
        let agent_roles: HashMap<i64, String> = role_list
            .into_iter()
            .filter(|r| {
                r.name == "ADMIN"
                    || r
                        .permission_list()
                        .iter()
                        .any(|p| p == Permission::CustomerService.as_str())
            })
            .map(|r| (r.id, r.name))
            .collect();
        if agent_roles.is_empty() {
            return Ok(Vec::new());
        }

        let user_list = users::Entity::find()
            .filter(users::Column::IsActive.eq(true))
            .filter(users::Column::RoleId.is_in(agent_roles.keys().copied().collect::<Vec<_>>()))
            .order_by_asc(users::Column::Name)
            .all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(user_list.len());
        for user in user_list {
            let current_chats = self.assigned_count(user.id).await?;
            out.push(ChatAgentResponse {
                id: user.id,
                role: user.role_id.and_then(|id| agent_roles.get(&id).cloned()),
                name: user.name,
                email: user.email,
                is_online: user.is_online,
                max_chats: user.max_chats,
                current_chats,
            });
        }
        Ok(out)
    }

    pub async fn assign(&self, session_id: Uuid, agent_id: i64) -> AppResult<ChatSessionSummary> {
        let session = self.open_session(session_id).await?;
        let agent = users::Entity::find_by_id(agent_id)
            .one(&self.pool)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::NotFound("Agent not found".into()))?;

        let current = self.assigned_count(agent.id).await?;
        if current >= agent.max_chats.max(0) as u64 {
            return Err(AppError::ValidationError(format!(
                "{} has reached the chat limit ({})",
                agent.name, agent.max_chats
            )));
        }

        let now = Utc::now();
        let mut am = session.into_active_model();
        am.assigned_to_id = Set(Some(agent.id));
        am.assigned_at = Set(Some(now));
        am.status = Set(ChatSessionStatus::Assigned);
        am.updated_at = Set(now);
        let session = am.update(&self.pool).await?;

        self.insert_message(
            session.id,
            ChatSenderType::System,
            &format!("[Agent assigned] {} has joined the conversation", agent.name),
            now,
        )
        .await?;
        log::info!("Chat session {} assigned to agent {}", session.id, agent.id);
        self.summary_of(session).await
    }

    /// 不指定客服直接开始咨询
    pub async fn start_consultation(&self, session_id: Uuid) -> AppResult<ChatSessionSummary> {
        let session = self.open_session(session_id).await?;
        let now = Utc::now();
        let mut am = session.into_active_model();
        am.assigned_at = Set(Some(now));
        am.status = Set(ChatSessionStatus::Assigned);
        am.updated_at = Set(now);
        let session = am.update(&self.pool).await?;

        self.insert_message(
            session.id,
            ChatSenderType::System,
            "[Consultation started] An agent has joined the conversation",
            now,
        )
        .await?;
        self.summary_of(session).await
    }

    pub async fn complete(&self, session_id: Uuid, summary: Option<String>) -> AppResult<ChatSessionSummary> {
        let session = self.open_session(session_id).await?;
        let summary = summary
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let session = self.close(session, summary).await?;
        self.summary_of(session).await
    }

    pub async fn agent_message(
        &self,
        staff: &StaffIdentity,
        session_id: Uuid,
        content: &str,
    ) -> AppResult<ChatMessageResponse> {
        let session = self.open_session(session_id).await?;
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::ValidationError("Message content is required".into()));
        }
        let now = Utc::now();
        let message = self
            .insert_message(session.id, ChatSenderType::Agent, content, now)
            .await?;
        self.touch(session, now).await?;
        log::debug!("Agent {} replied in session {}", staff.user_id, session_id);
        Ok(message.into())
    }

    pub async fn set_online(&self, user_id: i64, is_online: bool) -> AppResult<()> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        let mut am = user.into_active_model();
        am.is_online = Set(is_online);
        am.updated_at = Set(Utc::now());
        am.update(&self.pool).await?;
        Ok(())
    }

    pub async fn queue_stats(&self) -> AppResult<QueueStatsResponse> {
        let today = today_start();
        let waiting = sessions::Entity::find()
            .filter(sessions::Column::Status.eq(ChatSessionStatus::Escalated))
            .filter(sessions::Column::AssignedToId.is_null())
            .count(&self.pool)
            .await?;
        let assigned = sessions::Entity::find()
            .filter(sessions::Column::Status.eq(ChatSessionStatus::Assigned))
            .count(&self.pool)
            .await?;
        let completed = sessions::Entity::find()
            .filter(sessions::Column::Status.eq(ChatSessionStatus::Closed))
            .filter(sessions::Column::IsEscalated.eq(true))
            .filter(sessions::Column::EndedAt.gte(today))
            .all(&self.pool)
            .await?;

        let timed: Vec<_> = completed
            .iter()
            .filter_map(|s| Some((s.escalated_at?, s.assigned_at?, s.ended_at?)))
            .collect();
        let (avg_wait_time, avg_consult_time, total_wait_time, total_consult_time) =
            queue_time_stats(&timed);

        Ok(QueueStatsResponse {
            waiting,
            assigned,
            completed_today: completed.len() as u64,
            avg_wait_time,
            avg_consult_time,
            total_wait_time,
            total_consult_time,
        })
    }

    pub async fn chatbot_stats(&self) -> AppResult<ChatbotStatsResponse> {
        let now = Utc::now();
        let today = today_start();
        let week = now - Duration::days(7);
        let month = start_of_local_day(month_start(local_today()));

        let pool = &self.pool;
        let count_since = move |since: DateTime<Utc>| {
            sessions::Entity::find()
                .filter(sessions::Column::CreatedAt.gte(since))
                .count(pool)
        };
        let today_sessions = count_since(today).await?;
        let week_sessions = count_since(week).await?;

        let month_list = sessions::Entity::find()
            .filter(sessions::Column::CreatedAt.gte(month))
            .all(&self.pool)
            .await?;
        let month_sessions = month_list.len() as u64;
        let escalated = month_list.iter().filter(|s| s.is_escalated).count() as u64;

        let ids: Vec<Uuid> = month_list.iter().map(|s| s.id).collect();
        let message_total = if ids.is_empty() {
            0
        } else {
            messages::Entity::find()
                .filter(messages::Column::SessionId.is_in(ids))
                .count(&self.pool)
                .await?
        };
        let avg_messages_per_session = if month_sessions == 0 {
            0.0
        } else {
            round1(message_total as f64 / month_sessions as f64)
        };

        Ok(ChatbotStatsResponse {
            today_sessions,
            week_sessions,
            month_sessions,
            escalation_rate: escalation_rate(escalated, month_sessions),
            avg_messages_per_session,
        })
    }

    /// 删除超过保留天数的已结束会话（消息随外键级联删除）
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let config = self.config_service.current().await?;
        let days = i64::from(config.data_retention_days.max(1));
        let cutoff = Utc::now() - Duration::days(days);
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::Status.eq(ChatSessionStatus::Closed))
            .filter(sessions::Column::EndedAt.lt(cutoff))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn active_session_count(&self) -> AppResult<u64> {
        Ok(sessions::Entity::find()
            .filter(sessions::Column::Status.ne(ChatSessionStatus::Closed))
            .count(&self.pool)
            .await?)
    }

    // ---------------------------------------------------------------------

    async fn find(&self, id: Uuid) -> AppResult<sessions::Model> {
        sessions::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Chat session not found".into()))
    }

    async fn open_session(&self, id: Uuid) -> AppResult<sessions::Model> {
        let session = self.find(id).await?;
        if session.status == ChatSessionStatus::Closed {
            return Err(AppError::ValidationError("Chat session is closed".into()));
        }
        Ok(session)
    }

    async fn insert_message(
        &self,
        session_id: Uuid,
        sender: ChatSenderType,
        content: &str,
        at: DateTime<Utc>,
    ) -> AppResult<messages::Model> {
        Ok(messages::ActiveModel {
            session_id: Set(session_id),
            sender_type: Set(sender),
            content: Set(content.to_string()),
            created_at: Set(at),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?)
    }

    async fn touch(&self, session: sessions::Model, at: DateTime<Utc>) -> AppResult<()> {
        let mut am = session.into_active_model();
        am.updated_at = Set(at);
        am.update(&self.pool).await?;
        Ok(())
    }

    async fn close(
        &self,
        session: sessions::Model,
        summary: Option<String>,
    ) -> AppResult<sessions::Model> {
        let now = Utc::now();
        let mut am = session.into_active_model();
        am.status = Set(ChatSessionStatus::Closed);
        am.ended_at = Set(Some(now));
        if summary.is_some() {
            am.summary = Set(summary);
        }
        am.updated_at = Set(now);
        Ok(am.update(&self.pool).await?)
    }

    async fn assigned_count(&self, agent_id: i64) -> AppResult<u64> {
        Ok(sessions::Entity::find()
            .filter(sessions::Column::AssignedToId.eq(agent_id))
            .filter(sessions::Column::Status.eq(ChatSessionStatus::Assigned))
            .count(&self.pool)
            .await?)
    }

    /// 转人工时为已识别的客户创建一张高优先级工单
    async fn open_follow_up_ticket(&self, session: &sessions::Model, reason: &str) -> AppResult<()> {
        let Some(customer_id) = session.customer_id else {
            return Ok(());
        };
        let name = session.customer_name.as_deref().unwrap_or("Customer");
        let now = Utc::now();
        tickets::ActiveModel {
            subject: Set(format!("[Chatbot escalation] Consultation request from {name}")),
            description: Set(Some(format!(
                "Session ID: {}\nCustomer: {}\nPhone: {}\nReason: {}",
                session.id, name, session.phone, reason
            ))),
            status: Set(TicketStatus::Open),
            priority: Set(TicketPriority::High),
            customer_id: Set(Some(customer_id)),
            assigned_to_id: Set(None),
            closed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(())
    }

    async fn summary_of(&self, session: sessions::Model) -> AppResult<ChatSessionSummary> {
        self.summarize(vec![session])
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError("chat session lookup failed".into()))
    }

    /// 补充客服名、最后一条消息和消息数
    async fn summarize(&self, list: Vec<sessions::Model>) -> AppResult<Vec<ChatSessionSummary>> {
        let now = Utc::now();
        let ids: Vec<Uuid> = list.iter().map(|s| s.id).collect();

        let mut counts: HashMap<Uuid, u64> = HashMap::new();
        let mut last: HashMap<Uuid, String> = HashMap::new();
        if !ids.is_empty() {
            let rows = messages::Entity::find()
                .filter(messages::Column::SessionId.is_in(ids))
                .order_by_asc(messages::Column::CreatedAt)
                .order_by_asc(messages::Column::Id)
                .all(&self.pool)
                .await?;
            for m in rows {
                *counts.entry(m.session_id).or_default() += 1;
                last.insert(m.session_id, m.content);
            }
        }

        let agent_ids: Vec<i64> = list.iter().filter_map(|s| s.assigned_to_id).collect();
        let agent_names: HashMap<i64, String> = if agent_ids.is_empty() {
            HashMap::new()
        } else {
            users::Entity::find()
                .filter(users::Column::Id.is_in(agent_ids))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|u| (u.id, u.name))
                .collect()
        };

        Ok(list
            .into_iter()
            .map(|s| ChatSessionSummary {
                waiting_time: waiting_minutes(&s, now),
                consult_time: consult_minutes(&s, now),
                assigned_to_name: s.assigned_to_id.and_then(|id| agent_names.get(&id).cloned()),
                last_message: last.remove(&s.id),
                message_count: counts.get(&s.id).copied().unwrap_or(0),
                id: s.id,
                phone: s.phone,
                customer_name: s.customer_name,
                customer_id: s.customer_id,
                status: s.status,
                is_escalated: s.is_escalated,
                escalated_at: s.escalated_at,
                escalate_reason: s.escalate_reason,
                priority: s.priority,
                assigned_to_id: s.assigned_to_id,
                assigned_at: s.assigned_at,
                summary: s.summary,
                ended_at: s.ended_at,
                started_at: s.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, h, m, 0).unwrap()
    }

    fn session(status: ChatSessionStatus) -> sessions::Model {
        sessions::Model {
            id: Uuid::nil(),
            phone: "010-1234-5678".into(),
            customer_name: None,
            customer_id: None,
            status,
            is_escalated: true,
            escalated_at: Some(utc(9, 0)),
            escalate_reason: None,
            priority: 0,
            assigned_to_id: None,
            assigned_at: None,
            summary: None,
            ended_at: None,
            created_at: utc(8, 50),
            updated_at: utc(8, 50),
        }
    }

    #[test]
    fn test_business_hours() {
        let days = [1, 2, 3, 4, 5];
        // 2025-03-03 周一
        assert!(is_within_business_hours("09:00", "18:00", &days, at(2025, 3, 3, 9, 0)));
        assert!(is_within_business_hours("09:00", "18:00", &days, at(2025, 3, 3, 17, 59)));
        assert!(!is_within_business_hours("09:00", "18:00", &days, at(2025, 3, 3, 18, 0)));
        assert!(!is_within_business_hours("09:00", "18:00", &days, at(2025, 3, 3, 8, 59)));
        // 2025-03-02 周日
        assert!(!is_within_business_hours("09:00", "18:00", &days, at(2025, 3, 2, 10, 0)));
        assert!(is_within_business_hours("09:00", "18:00", &[0], at(2025, 3, 2, 10, 0)));
    }

    #[test]
    fn test_find_keyword_is_case_insensitive() {
        let words = vec!["상담원".to_string(), "Agent".to_string(), " ".to_string()];
        assert_eq!(find_keyword("상담원 연결해주세요", &words), Some("상담원"));
        assert_eq!(find_keyword("talk to an AGENT please", &words), Some("Agent"));
        assert_eq!(find_keyword("배송 조회", &words), None);
    }

    #[test]
    fn test_waiting_and_consult_minutes() {
        let now = utc(10, 0);
        let waiting = session(ChatSessionStatus::Escalated);
        assert_eq!(waiting_minutes(&waiting, now), 60);
        assert_eq!(consult_minutes(&waiting, now), 0);

        let mut assigned = session(ChatSessionStatus::Assigned);
        assigned.assigned_at = Some(utc(9, 15));
        assert_eq!(waiting_minutes(&assigned, now), 15);
        assert_eq!(consult_minutes(&assigned, now), 45);

        let mut closed = session(ChatSessionStatus::Closed);
        closed.ended_at = Some(utc(9, 20));
        assert_eq!(waiting_minutes(&closed, now), 20);
    }

    #[test]
    fn test_queue_time_stats() {
        assert_eq!(queue_time_stats(&[]), (0, 0, 0, 0));
        let rows = [
            (utc(9, 0), utc(9, 10), utc(9, 30)),
            (utc(9, 0), utc(9, 5), utc(9, 10)),
        ];
        // 等待 10 + 5 = 15 (平均 7.5 -> 8)，咨询 20 + 5 = 25 (平均 12.5 -> 13)
        assert_eq!(queue_time_stats(&rows), (8, 13, 15, 25));
    }

    #[test]
    fn test_escalation_rate() {
        assert_eq!(escalation_rate(0, 0), 0.0);
        assert_eq!(escalation_rate(1, 3), 33.3);
        assert_eq!(escalation_rate(2, 2), 100.0);
    }
}
