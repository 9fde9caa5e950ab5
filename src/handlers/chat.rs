use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

use crate::middlewares::require_staff;
use crate::models::*;
use crate::services::ChatService;

// ---------------------------------------------------------------------
// 商城聊天组件（公开）
// ---------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/mall/chat/sessions",
    tag = "chat",
    request_body = StartChatRequest,
    responses(
        (status = 200, description = "会话已开始或复用", body = StartChatResponse),
        (status = 400, description = "手机号格式错误")
    )
)]
pub async fn start_session(
    chat_service: web::Data<ChatService>,
    request: web::Json<StartChatRequest>,
) -> Result<HttpResponse> {
    match chat_service.start_session(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/mall/chat/sessions/{id}/messages",
    tag = "chat",
    request_body = AddChatMessageRequest,
    params(
        ("id" = Uuid, Path, description = "会话ID")
    ),
    responses(
        (status = 200, description = "消息已保存", body = AddChatMessageResponse),
        (status = 404, description = "会话不存在或已结束")
    )
)]
pub async fn add_message(
    chat_service: web::Data<ChatService>,
    path: web::Path<Uuid>,
    request: web::Json<AddChatMessageRequest>,
) -> Result<HttpResponse> {
    match chat_service
        .add_message(path.into_inner(), request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/mall/chat/sessions/{id}/escalate",
    tag = "chat",
    request_body = EscalateChatRequest,
    params(
        ("id" = Uuid, Path, description = "会话ID")
    ),
    responses(
        (status = 200, description = "已转人工", body = EscalateChatResponse),
        (status = 404, description = "会话不存在或已结束")
    )
)]
pub async fn escalate(
    chat_service: web::Data<ChatService>,
    path: web::Path<Uuid>,
    request: web::Json<EscalateChatRequest>,
) -> Result<HttpResponse> {
    match chat_service
        .escalate(path.into_inner(), request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/mall/chat/sessions/{id}/end",
    tag = "chat",
    request_body = EndChatRequest,
    params(
        ("id" = Uuid, Path, description = "会话ID")
    ),
    responses(
        (status = 200, description = "会话已结束"),
        (status = 404, description = "会话不存在")
    )
)]
pub async fn end_session(
    chat_service: web::Data<ChatService>,
    path: web::Path<Uuid>,
    request: web::Json<EndChatRequest>,
) -> Result<HttpResponse> {
    match chat_service
        .end_session(path.into_inner(), request.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Chat session ended"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---------------------------------------------------------------------
// 客服控制台
// ---------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/chat/sessions",
    tag = "chat",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "最近会话", body = Vec<ChatSessionSummary>)
    )
)]
pub async fn list_sessions(
    chat_service: web::Data<ChatService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match chat_service.list_sessions().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/chat/sessions/escalated",
    tag = "chat",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "转人工队列", body = Vec<ChatSessionSummary>)
    )
)]
pub async fn escalated_sessions(
    chat_service: web::Data<ChatService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match chat_service.escalated_sessions().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/chat/sessions/{id}",
    tag = "chat",
    params(
        ("id" = Uuid, Path, description = "会话ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "会话详情", body = ChatSessionDetail),
        (status = 404, description = "会话不存在")
    )
)]
pub async fn session_detail(
    chat_service: web::Data<ChatService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match chat_service.detail(path.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": detail
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/chat/sessions/{id}/assign",
    tag = "chat",
    request_body = AssignChatRequest,
    params(
        ("id" = Uuid, Path, description = "会话ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已分配客服", body = ChatSessionSummary),
        (status = 400, description = "客服已满或不可用")
    )
)]
pub async fn assign_session(
    chat_service: web::Data<ChatService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<AssignChatRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match chat_service
        .assign(path.into_inner(), request.agent_id)
        .await
    {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": session
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/chat/sessions/{id}/start",
    tag = "chat",
    params(
        ("id" = Uuid, Path, description = "会话ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "开始咨询", body = ChatSessionSummary)
    )
)]
pub async fn start_consultation(
    chat_service: web::Data<ChatService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match chat_service.start_consultation(path.into_inner()).await {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": session
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/chat/sessions/{id}/complete",
    tag = "chat",
    request_body = CompleteChatRequest,
    params(
        ("id" = Uuid, Path, description = "会话ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "咨询已完成", body = ChatSessionSummary)
    )
)]
pub async fn complete_session(
    chat_service: web::Data<ChatService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<CompleteChatRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match chat_service
        .complete(path.into_inner(), request.into_inner().summary)
        .await
    {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": session
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/chat/sessions/{id}/messages",
    tag = "chat",
    request_body = AgentMessageRequest,
    params(
        ("id" = Uuid, Path, description = "会话ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "回复已发送", body = ChatMessageResponse)
    )
)]
pub async fn agent_message(
    chat_service: web::Data<ChatService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<AgentMessageRequest>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::CustomerService) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match chat_service
        .agent_message(&staff, path.into_inner(), &request.content)
        .await
    {
        Ok(message) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": message
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/chat/agents",
    tag = "chat",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "客服列表", body = Vec<ChatAgentResponse>)
    )
)]
pub async fn list_agents(
    chat_service: web::Data<ChatService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match chat_service.agents().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/chat/agents/me/status",
    tag = "chat",
    request_body = SetOnlineRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "在线状态已更新")
    )
)]
pub async fn set_online(
    chat_service: web::Data<ChatService>,
    req: HttpRequest,
    request: web::Json<SetOnlineRequest>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::CustomerService) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match chat_service.set_online(staff.user_id, request.is_online).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "is_online": request.is_online }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/chat/queue/stats",
    tag = "chat",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "队列统计", body = QueueStatsResponse)
    )
)]
pub async fn queue_stats(
    chat_service: web::Data<ChatService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match chat_service.queue_stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 挂在 `/mall/chat` 下
pub fn widget_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/sessions", web::post().to(start_session))
        .route("/sessions/{id}/messages", web::post().to(add_message))
        .route("/sessions/{id}/escalate", web::post().to(escalate))
        .route("/sessions/{id}/end", web::post().to(end_session));
}

pub fn chat_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/chat")
            .route("/sessions", web::get().to(list_sessions))
            .route("/sessions/escalated", web::get().to(escalated_sessions))
            .route("/sessions/{id}", web::get().to(session_detail))
            .route("/sessions/{id}/assign", web::post().to(assign_session))
            .route("/sessions/{id}/start", web::post().to(start_consultation))
            .route("/sessions/{id}/complete", web::post().to(complete_session))
            .route("/sessions/{id}/messages", web::post().to(agent_message))
            .route("/agents", web::get().to(list_agents))
            .route("/agents/me/status", web::put().to(set_online))
            .route("/queue/stats", web::get().to(queue_stats)),
    );
}
