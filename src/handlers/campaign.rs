use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::require_staff;
use crate::models::*;
use crate::services::CampaignService;

#[utoipa::path(
    get,
    path = "/campaigns",
    tag = "marketing",
    params(CampaignListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "活动列表", body = Vec<CampaignResponse>)
    )
)]
pub async fn list_campaigns(
    campaign_service: web::Data<CampaignService>,
    req: HttpRequest,
    query: web::Query<CampaignListQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::Marketing) {
        return Ok(e.error_response());
    }
    match campaign_service.list(&query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/campaigns/summary",
    tag = "marketing",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "活动汇总", body = CampaignSummaryResponse)
    )
)]
pub async fn campaign_summary(
    campaign_service: web::Data<CampaignService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::Marketing) {
        return Ok(e.error_response());
    }
    match campaign_service.summary().await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": summary
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/campaigns/{id}",
    tag = "marketing",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "活动详情", body = CampaignResponse),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn get_campaign(
    campaign_service: web::Data<CampaignService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::Marketing) {
        return Ok(e.error_response());
    }
    match campaign_service.get(path.into_inner()).await {
        Ok(campaign) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": campaign
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/campaigns",
    tag = "marketing",
    request_body = CreateCampaignRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "活动已创建", body = CampaignResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_campaign(
    campaign_service: web::Data<CampaignService>,
    req: HttpRequest,
    request: web::Json<CreateCampaignRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::Marketing) {
        return Ok(e.error_response());
    }
    match campaign_service.create(request.into_inner()).await {
        Ok(campaign) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": campaign
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/campaigns/{id}",
    tag = "marketing",
    request_body = UpdateCampaignRequest,
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "活动已更新", body = CampaignResponse),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn update_campaign(
    campaign_service: web::Data<CampaignService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateCampaignRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::Marketing) {
        return Ok(e.error_response());
    }
    match campaign_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(campaign) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": campaign
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/campaigns/{id}/status",
    tag = "marketing",
    request_body = UpdateCampaignStatusRequest,
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态已更新", body = CampaignResponse)
    )
)]
pub async fn update_campaign_status(
    campaign_service: web::Data<CampaignService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateCampaignStatusRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::Marketing) {
        return Ok(e.error_response());
    }
    match campaign_service
        .update_status(path.into_inner(), request.status)
        .await
    {
        Ok(campaign) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": campaign
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/campaigns/{id}/metrics",
    tag = "marketing",
    request_body = CampaignMetricsRequest,
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "指标已记录", body = CampaignResponse),
        (status = 400, description = "指标不能为负数")
    )
)]
pub async fn record_metrics(
    campaign_service: web::Data<CampaignService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<CampaignMetricsRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::Marketing) {
        return Ok(e.error_response());
    }
    match campaign_service
        .record_metrics(path.into_inner(), request.into_inner())
        .await
    {
        Ok(campaign) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": campaign
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/campaigns/{id}",
    tag = "marketing",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "活动已删除"),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn delete_campaign(
    campaign_service: web::Data<CampaignService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::Marketing) {
        return Ok(e.error_response());
    }
    match campaign_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Campaign deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn campaign_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/campaigns")
            .route("", web::get().to(list_campaigns))
            .route("", web::post().to(create_campaign))
            .route("/summary", web::get().to(campaign_summary))
            .route("/{id}", web::get().to(get_campaign))
            .route("/{id}", web::put().to(update_campaign))
            .route("/{id}", web::delete().to(delete_campaign))
            .route("/{id}/status", web::patch().to(update_campaign_status))
            .route("/{id}/metrics", web::put().to(record_metrics)),
    );
}
