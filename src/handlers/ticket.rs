use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::require_staff;
use crate::models::*;
use crate::services::TicketService;

#[utoipa::path(
    get,
    path = "/tickets",
    tag = "ticket",
    params(TicketListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "工单列表"),
        (status = 403, description = "无权限")
    )
)]
pub async fn list_tickets(
    ticket_service: web::Data<TicketService>,
    req: HttpRequest,
    query: web::Query<TicketListQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match ticket_service.list(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/tickets/stats",
    tag = "ticket",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "工单统计", body = TicketStatsResponse)
    )
)]
pub async fn ticket_stats(
    ticket_service: web::Data<TicketService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match ticket_service.stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/tickets/{id}",
    tag = "ticket",
    params(
        ("id" = i64, Path, description = "工单ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "工单详情（含评论）", body = TicketDetailResponse),
        (status = 404, description = "工单不存在")
    )
)]
pub async fn get_ticket(
    ticket_service: web::Data<TicketService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match ticket_service.get(path.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": detail
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/tickets",
    tag = "ticket",
    request_body = CreateTicketRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "工单已创建", body = TicketResponse),
        (status = 400, description = "主题为空")
    )
)]
pub async fn create_ticket(
    ticket_service: web::Data<TicketService>,
    req: HttpRequest,
    request: web::Json<CreateTicketRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match ticket_service.create(request.into_inner()).await {
        Ok(ticket) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ticket
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/tickets/{id}/status",
    tag = "ticket",
    request_body = UpdateTicketStatusRequest,
    params(
        ("id" = i64, Path, description = "工单ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态已更新", body = TicketResponse),
        (status = 404, description = "工单不存在")
    )
)]
pub async fn update_ticket_status(
    ticket_service: web::Data<TicketService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateTicketStatusRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match ticket_service
        .update_status(path.into_inner(), request.status)
        .await
    {
        Ok(ticket) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ticket
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/tickets/{id}/assign",
    tag = "ticket",
    request_body = AssignTicketRequest,
    params(
        ("id" = i64, Path, description = "工单ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "负责人已更新", body = TicketResponse),
        (status = 404, description = "工单或员工不存在")
    )
)]
pub async fn assign_ticket(
    ticket_service: web::Data<TicketService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AssignTicketRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match ticket_service
        .assign(path.into_inner(), request.assigned_to_id)
        .await
    {
        Ok(ticket) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ticket
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/tickets/{id}/comments",
    tag = "ticket",
    request_body = AddTicketCommentRequest,
    params(
        ("id" = i64, Path, description = "工单ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "评论已添加", body = TicketCommentResponse),
        (status = 400, description = "评论内容为空"),
        (status = 404, description = "工单不存在")
    )
)]
pub async fn add_ticket_comment(
    ticket_service: web::Data<TicketService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AddTicketCommentRequest>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::CustomerService) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match ticket_service
        .add_comment(&staff, path.into_inner(), request.into_inner())
        .await
    {
        Ok(comment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": comment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn ticket_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tickets")
            .route("", web::get().to(list_tickets))
            .route("", web::post().to(create_ticket))
            .route("/stats", web::get().to(ticket_stats))
            .route("/{id}", web::get().to(get_ticket))
            .route("/{id}/status", web::patch().to(update_ticket_status))
            .route("/{id}/assign", web::patch().to(assign_ticket))
            .route("/{id}/comments", web::post().to(add_ticket_comment)),
    );
}
