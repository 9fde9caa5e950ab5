use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::require_staff;
use crate::models::*;
use crate::services::PerformanceService;

#[utoipa::path(
    get,
    path = "/performance/base-products",
    tag = "performance",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "基础商品列表", body = Vec<BaseProductResponse>)
    )
)]
pub async fn list_products(
    performance_service: web::Data<PerformanceService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::PerformanceAnalytics) {
        return Ok(e.error_response());
    }
    match performance_service.list_products().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/performance/base-products",
    tag = "performance",
    request_body = CreateBaseProductRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "基础商品已创建", body = BaseProductResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_product(
    performance_service: web::Data<PerformanceService>,
    req: HttpRequest,
    request: web::Json<CreateBaseProductRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::PerformanceAnalytics) {
        return Ok(e.error_response());
    }
    match performance_service.create_product(request.into_inner()).await {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": product
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/performance/base-products/{id}",
    tag = "performance",
    request_body = UpdateBaseProductRequest,
    params(
        ("id" = i64, Path, description = "基础商品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "基础商品已更新", body = BaseProductResponse),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn update_product(
    performance_service: web::Data<PerformanceService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateBaseProductRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::PerformanceAnalytics) {
        return Ok(e.error_response());
    }
    match performance_service
        .update_product(path.into_inner(), request.into_inner())
        .await
    {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": product
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/performance/base-products/{id}",
    tag = "performance",
    params(
        ("id" = i64, Path, description = "基础商品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "基础商品已删除"),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn delete_product(
    performance_service: web::Data<PerformanceService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::PerformanceAnalytics) {
        return Ok(e.error_response());
    }
    match performance_service.delete_product(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Base product deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/performance/integrated-dashboard",
    tag = "performance",
    params(DateRangeQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "合作方业绩看板", body = IntegratedDashboardResponse),
        (status = 400, description = "日期区间无效")
    )
)]
pub async fn integrated_dashboard(
    performance_service: web::Data<PerformanceService>,
    req: HttpRequest,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::PerformanceAnalytics) {
        return Ok(e.error_response());
    }
    match performance_service.integrated_dashboard(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/performance/margin-formula",
    tag = "performance",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前毛利公式", body = MarginFormulaConfig)
    )
)]
pub async fn get_margin_formula(
    performance_service: web::Data<PerformanceService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::PerformanceAnalytics) {
        return Ok(e.error_response());
    }
    match performance_service.margin_formula().await {
        Ok(formula) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": formula
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/performance/margin-formula",
    tag = "performance",
    request_body = UpdateMarginFormulaRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "毛利公式已保存", body = MarginFormulaConfig),
        (status = 400, description = "公式不合法")
    )
)]
pub async fn update_margin_formula(
    performance_service: web::Data<PerformanceService>,
    req: HttpRequest,
    request: web::Json<UpdateMarginFormulaRequest>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::PerformanceAnalytics) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match performance_service
        .update_margin_formula(staff.user_id, request.into_inner())
        .await
    {
        Ok(formula) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": formula
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/performance/margin-details",
    tag = "performance",
    params(DateRangeQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "逐单毛利明细", body = MarginDetailsResponse)
    )
)]
pub async fn margin_details(
    performance_service: web::Data<PerformanceService>,
    req: HttpRequest,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::PerformanceAnalytics) {
        return Ok(e.error_response());
    }
    match performance_service.margin_details(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/performance/sales-statistics",
    tag = "performance",
    params(DateRangeQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "按日销售统计", body = SalesStatisticsResponse)
    )
)]
pub async fn sales_statistics(
    performance_service: web::Data<PerformanceService>,
    req: HttpRequest,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::PerformanceAnalytics) {
        return Ok(e.error_response());
    }
    match performance_service.sales_statistics(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn performance_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/performance")
            .route("/base-products", web::get().to(list_products))
            .route("/base-products", web::post().to(create_product))
            .route("/base-products/{id}", web::put().to(update_product))
            .route("/base-products/{id}", web::delete().to(delete_product))
            .route("/integrated-dashboard", web::get().to(integrated_dashboard))
            .route("/margin-formula", web::get().to(get_margin_formula))
            .route("/margin-formula", web::put().to(update_margin_formula))
            .route("/margin-details", web::get().to(margin_details))
            .route("/sales-statistics", web::get().to(sales_statistics)),
    );
}
