use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::require_staff;
use crate::models::*;
use crate::services::{ExcelService, OrderService};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub(crate) fn xlsx_attachment(bytes: Vec<u8>, filename: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(bytes)
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    params(OrderListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取订单列表成功"),
        (status = 401, description = "未授权"),
        (status = 403, description = "无权限")
    )
)]
pub async fn list_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<OrderListQuery>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::OrderManagement) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match order_service.list(&staff, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/stats",
    tag = "order",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "订单统计", body = OrderStatsResponse)
    )
)]
pub async fn order_stats(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::OrderManagement) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match order_service.stats(&staff).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "order",
    params(
        ("id" = i64, Path, description = "订单ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "订单详情", body = OrderResponse),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::OrderManagement) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match order_service.get(&staff, path.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders",
    tag = "order",
    request_body = CreateOrderRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "订单已创建", body = OrderResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::OrderManagement) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match order_service.create(&staff, request.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/orders/{id}",
    tag = "order",
    request_body = UpdateOrderRequest,
    params(
        ("id" = i64, Path, description = "订单ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "订单已更新", body = OrderResponse),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn update_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::OrderManagement) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match order_service
        .update(&staff, path.into_inner(), request.into_inner())
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    tag = "order",
    request_body = UpdateOrderStatusRequest,
    params(
        ("id" = i64, Path, description = "订单ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态已更新", body = OrderResponse),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn update_order_status(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::OrderManagement) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match order_service
        .update_status(&staff, path.into_inner(), request.status)
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/orders/{id}/tracking",
    tag = "order",
    request_body = UpdateTrackingRequest,
    params(
        ("id" = i64, Path, description = "订单ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "运单号已录入", body = OrderResponse),
        (status = 400, description = "运单号为空")
    )
)]
pub async fn update_tracking(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateTrackingRequest>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::OrderManagement) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match order_service
        .update_tracking(&staff, path.into_inner(), request.into_inner())
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders/tracking/clear",
    tag = "order",
    request_body = ClearTrackingRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "运单号已清除", body = ClearTrackingResponse)
    )
)]
pub async fn clear_tracking(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    request: web::Json<ClearTrackingRequest>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::OrderManagement) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match order_service.clear_tracking(&staff, &request.ids).await {
        Ok(cleared) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ClearTrackingResponse { cleared }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/duplicates",
    tag = "order",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "收件人电话重复的订单分组", body = DuplicateOrdersResponse)
    )
)]
pub async fn duplicate_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::OrderManagement) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match order_service.duplicates(&staff).await {
        Ok(duplicates) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": duplicates
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders/bulk-delete",
    tag = "order",
    request_body = BulkDeleteOrdersRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "订单已批量删除", body = BulkDeleteOrdersResponse),
        (status = 400, description = "未选择订单")
    )
)]
pub async fn bulk_delete_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    request: web::Json<BulkDeleteOrdersRequest>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::OrderManagement) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match order_service.bulk_delete(&staff, &request.ids).await {
        Ok(deleted) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": BulkDeleteOrdersResponse { deleted }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/orders/{id}",
    tag = "order",
    params(
        ("id" = i64, Path, description = "订单ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "订单已删除"),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn delete_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::OrderManagement) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match order_service.delete(&staff, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Order deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders/import",
    tag = "order",
    request_body(content = Vec<u8>, content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "导入结果", body = ImportResult),
        (status = 400, description = "文件无法解析")
    )
)]
pub async fn import_orders(
    excel_service: web::Data<ExcelService>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::OrderManagement) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match excel_service.import_orders(&staff, &body).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": result.message(),
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/export",
    tag = "order",
    params(OrderListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "订单 Excel 文件", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
    )
)]
pub async fn export_orders(
    excel_service: web::Data<ExcelService>,
    req: HttpRequest,
    query: web::Query<OrderListQuery>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::OrderManagement) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    let query = query.into_inner();
    match excel_service
        .export_orders(
            &staff,
            query.filter.unwrap_or_default(),
            query.search.as_deref(),
        )
        .await
    {
        Ok(bytes) => {
            let filename = format!("orders_{}.xlsx", chrono::Local::now().format("%Y%m%d"));
            Ok(xlsx_attachment(bytes, &filename))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/template",
    tag = "order",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "订单导入模板", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
    )
)]
pub async fn order_template(
    excel_service: web::Data<ExcelService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::OrderManagement) {
        return Ok(e.error_response());
    }
    match excel_service.order_template() {
        Ok(bytes) => Ok(xlsx_attachment(bytes, "order_template.xlsx")),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(list_orders))
            .route("", web::post().to(create_order))
            .route("/stats", web::get().to(order_stats))
            .route("/import", web::post().to(import_orders))
            .route("/export", web::get().to(export_orders))
            .route("/template", web::get().to(order_template))
            .route("/tracking/clear", web::post().to(clear_tracking))
            .route("/duplicates", web::get().to(duplicate_orders))
            .route("/bulk-delete", web::post().to(bulk_delete_orders))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}", web::put().to(update_order))
            .route("/{id}", web::delete().to(delete_order))
            .route("/{id}/status", web::patch().to(update_order_status))
            .route("/{id}/tracking", web::put().to(update_tracking)),
    );
}
