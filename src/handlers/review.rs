use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::require_staff;
use crate::models::*;
use crate::services::ReviewService;

#[utoipa::path(
    get,
    path = "/reviews",
    tag = "review",
    params(ReviewListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "评价列表，按评价时间倒序"),
        (status = 403, description = "无权限")
    )
)]
pub async fn list_reviews(
    review_service: web::Data<ReviewService>,
    req: HttpRequest,
    query: web::Query<ReviewListQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match review_service.list(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/reviews/stats",
    tag = "review",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "评价与投诉统计", body = ReviewStatsResponse)
    )
)]
pub async fn review_stats(
    review_service: web::Data<ReviewService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match review_service.stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/reviews/{id}",
    tag = "review",
    params(
        ("id" = i64, Path, description = "评价ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "评价详情", body = ReviewResponse),
        (status = 404, description = "评价不存在")
    )
)]
pub async fn get_review(
    review_service: web::Data<ReviewService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match review_service.get(path.into_inner()).await {
        Ok(review) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": review
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/reviews",
    tag = "review",
    request_body = CreateReviewRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "评价已登记，低分或负面评价自动标记为投诉", body = ReviewResponse),
        (status = 400, description = "参数错误"),
        (status = 409, description = "同一渠道的外部ID已存在")
    )
)]
pub async fn create_review(
    review_service: web::Data<ReviewService>,
    req: HttpRequest,
    request: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match review_service.create(request.into_inner()).await {
        Ok(review) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": review
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/reviews/{id}",
    tag = "review",
    request_body = UpdateReviewRequest,
    params(
        ("id" = i64, Path, description = "评价ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "评价已更新", body = ReviewResponse),
        (status = 404, description = "评价不存在")
    )
)]
pub async fn update_review(
    review_service: web::Data<ReviewService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateReviewRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match review_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(review) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": review
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/reviews/{id}/alert",
    tag = "review",
    request_body = UpdateReviewAlertRequest,
    params(
        ("id" = i64, Path, description = "评价ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "投诉处理状态已更新", body = ReviewResponse),
        (status = 400, description = "评价未被标记为投诉"),
        (status = 404, description = "评价不存在")
    )
)]
pub async fn update_review_alert(
    review_service: web::Data<ReviewService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateReviewAlertRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match review_service
        .update_alert(path.into_inner(), request.into_inner())
        .await
    {
        Ok(review) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": review
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = "review",
    params(
        ("id" = i64, Path, description = "评价ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "评价已删除"),
        (status = 404, description = "评价不存在")
    )
)]
pub async fn delete_review(
    review_service: web::Data<ReviewService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match review_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Review deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn review_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reviews")
            .route("", web::get().to(list_reviews))
            .route("", web::post().to(create_review))
            .route("/stats", web::get().to(review_stats))
            .route("/{id}", web::get().to(get_review))
            .route("/{id}", web::put().to(update_review))
            .route("/{id}", web::delete().to(delete_review))
            .route("/{id}/alert", web::patch().to(update_review_alert)),
    );
}
