use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::require_staff;
use crate::models::*;
use crate::services::{ChatService, ChatbotConfigService};

#[utoipa::path(
    get,
    path = "/chatbot/config",
    tag = "chatbot",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前机器人配置", body = ChatbotConfigResponse)
    )
)]
pub async fn get_config(
    config_service: web::Data<ChatbotConfigService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match config_service.get().await {
        Ok(config) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": config
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/chatbot/config",
    tag = "chatbot",
    request_body = UpdateChatbotConfigRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "配置已保存为草稿", body = ChatbotConfigResponse),
        (status = 400, description = "参数超出范围")
    )
)]
pub async fn update_config(
    config_service: web::Data<ChatbotConfigService>,
    req: HttpRequest,
    request: web::Json<UpdateChatbotConfigRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match config_service.update(request.into_inner()).await {
        Ok(config) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": config
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/chatbot/config/publish",
    tag = "chatbot",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "配置已发布", body = ChatbotConfigResponse)
    )
)]
pub async fn publish_config(
    config_service: web::Data<ChatbotConfigService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match config_service.publish().await {
        Ok(config) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": config
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/chatbot/config/toggle",
    tag = "chatbot",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "启用状态已切换", body = ToggleChatbotResponse)
    )
)]
pub async fn toggle_config(
    config_service: web::Data<ChatbotConfigService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match config_service.toggle().await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/chatbot/config/reset",
    tag = "chatbot",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已恢复默认配置", body = ChatbotConfigResponse)
    )
)]
pub async fn reset_config(
    config_service: web::Data<ChatbotConfigService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match config_service.reset().await {
        Ok(config) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": config
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/chatbot/templates",
    tag = "chatbot",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "提示词模板", body = Vec<PromptTemplateResponse>)
    )
)]
pub async fn list_templates(
    config_service: web::Data<ChatbotConfigService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match config_service.list_templates().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/chatbot/templates",
    tag = "chatbot",
    request_body = CreatePromptTemplateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "模板已创建", body = PromptTemplateResponse),
        (status = 400, description = "名称或内容为空")
    )
)]
pub async fn create_template(
    config_service: web::Data<ChatbotConfigService>,
    req: HttpRequest,
    request: web::Json<CreatePromptTemplateRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match config_service.create_template(request.into_inner()).await {
        Ok(template) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": template
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/chatbot/stats",
    tag = "chatbot",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "机器人会话统计", body = ChatbotStatsResponse)
    )
)]
pub async fn chatbot_stats(
    chat_service: web::Data<ChatService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match chat_service.chatbot_stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn chatbot_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/chatbot")
            .route("/config", web::get().to(get_config))
            .route("/config", web::put().to(update_config))
            .route("/config/publish", web::post().to(publish_config))
            .route("/config/toggle", web::post().to(toggle_config))
            .route("/config/reset", web::post().to(reset_config))
            .route("/templates", web::get().to(list_templates))
            .route("/templates", web::post().to(create_template))
            .route("/stats", web::get().to(chatbot_stats)),
    );
}
