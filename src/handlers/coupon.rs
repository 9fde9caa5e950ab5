use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::require_staff;
use crate::models::*;
use crate::services::CouponService;

#[utoipa::path(
    get,
    path = "/coupons",
    tag = "marketing",
    params(CouponListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "优惠券列表", body = Vec<CouponResponse>)
    )
)]
pub async fn list_coupons(
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    query: web::Query<CouponListQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::Marketing) {
        return Ok(e.error_response());
    }
    match coupon_service.list(&query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/coupons",
    tag = "marketing",
    request_body = CreateCouponRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "优惠券已创建", body = CouponResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_coupon(
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    request: web::Json<CreateCouponRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::Marketing) {
        return Ok(e.error_response());
    }
    match coupon_service.create(request.into_inner()).await {
        Ok(coupon) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": coupon
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/coupons/{id}/toggle",
    tag = "marketing",
    params(
        ("id" = i64, Path, description = "优惠券ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "启用状态已切换", body = CouponResponse),
        (status = 404, description = "优惠券不存在")
    )
)]
pub async fn toggle_coupon(
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::Marketing) {
        return Ok(e.error_response());
    }
    match coupon_service.toggle(path.into_inner()).await {
        Ok(coupon) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": coupon
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/coupons/{id}",
    tag = "marketing",
    params(
        ("id" = i64, Path, description = "优惠券ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "优惠券已删除"),
        (status = 404, description = "优惠券不存在")
    )
)]
pub async fn delete_coupon(
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::Marketing) {
        return Ok(e.error_response());
    }
    match coupon_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Coupon deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 校验失败同样返回 200，`valid = false` 并附带原因
#[utoipa::path(
    post,
    path = "/coupons/validate",
    tag = "marketing",
    request_body = ValidateCouponRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "校验结果", body = CouponValidationResponse)
    )
)]
pub async fn validate_coupon(
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    request: web::Json<ValidateCouponRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::Marketing) {
        return Ok(e.error_response());
    }
    match coupon_service.validate(request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/coupons/redeem",
    tag = "marketing",
    request_body = RedeemCouponRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "核销成功，返回服务端计算的折扣", body = RedeemCouponResponse),
        (status = 400, description = "优惠券不满足使用条件"),
        (status = 404, description = "优惠券或客户不存在")
    )
)]
pub async fn redeem_coupon(
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    request: web::Json<RedeemCouponRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::Marketing) {
        return Ok(e.error_response());
    }
    match coupon_service.redeem(request.into_inner()).await {
        Ok(redemption) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": redemption
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/coupons/issue",
    tag = "marketing",
    request_body = IssueCouponRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已发放给商城会员", body = IssueCouponResponse),
        (status = 404, description = "优惠券不存在")
    )
)]
pub async fn issue_coupon(
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    request: web::Json<IssueCouponRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::Marketing) {
        return Ok(e.error_response());
    }
    match coupon_service.issue_to_mall_users(request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn coupon_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/coupons")
            .route("", web::get().to(list_coupons))
            .route("", web::post().to(create_coupon))
            .route("/validate", web::post().to(validate_coupon))
            .route("/redeem", web::post().to(redeem_coupon))
            .route("/issue", web::post().to(issue_coupon))
            .route("/{id}", web::delete().to(delete_coupon))
            .route("/{id}/toggle", web::patch().to(toggle_coupon)),
    );
}
