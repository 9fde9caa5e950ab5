use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::require_staff;
use crate::models::*;
use crate::services::{CustomerService, ExcelService};

#[utoipa::path(
    get,
    path = "/customers",
    tag = "customer",
    params(CustomerListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "客户列表"),
        (status = 403, description = "无权限")
    )
)]
pub async fn list_customers(
    customer_service: web::Data<CustomerService>,
    req: HttpRequest,
    query: web::Query<CustomerListQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match customer_service.list(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/customers/{id}",
    tag = "customer",
    params(
        ("id" = i64, Path, description = "客户ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "客户详情", body = CustomerResponse),
        (status = 404, description = "客户不存在")
    )
)]
pub async fn get_customer(
    customer_service: web::Data<CustomerService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match customer_service.get(path.into_inner()).await {
        Ok(customer) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": customer
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/customers",
    tag = "customer",
    request_body = CreateCustomerRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "客户已创建", body = CustomerResponse),
        (status = 409, description = "邮箱已存在")
    )
)]
pub async fn create_customer(
    customer_service: web::Data<CustomerService>,
    req: HttpRequest,
    request: web::Json<CreateCustomerRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match customer_service.create(request.into_inner()).await {
        Ok(customer) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": customer
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/customers/{id}",
    tag = "customer",
    request_body = UpdateCustomerRequest,
    params(
        ("id" = i64, Path, description = "客户ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "客户已更新", body = CustomerResponse),
        (status = 404, description = "客户不存在")
    )
)]
pub async fn update_customer(
    customer_service: web::Data<CustomerService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateCustomerRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match customer_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(customer) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": customer
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/customers/import",
    tag = "customer",
    request_body(content = Vec<u8>, content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "导入结果", body = ImportResult),
        (status = 400, description = "文件无法解析")
    )
)]
pub async fn import_customers(
    excel_service: web::Data<ExcelService>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::CustomerService) {
        return Ok(e.error_response());
    }
    match excel_service.import_customers(&body).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": result.message(),
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn customer_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/customers")
            .route("", web::get().to(list_customers))
            .route("", web::post().to(create_customer))
            .route("/import", web::post().to(import_customers))
            .route("/{id}", web::get().to(get_customer))
            .route("/{id}", web::put().to(update_customer)),
    );
}
