use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::require_staff;
use crate::models::*;
use crate::services::MallProductService;

// ---------------------------------------------------------------------
// 前台商品目录（无需登录）
// ---------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/mall/products",
    tag = "mall",
    params(ProductListQuery),
    responses(
        (status = 200, description = "上架商品列表")
    )
)]
pub async fn list_mall_products(
    product_service: web::Data<MallProductService>,
    query: web::Query<ProductListQuery>,
) -> Result<HttpResponse> {
    match product_service.list_public(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/mall/products/{id}",
    tag = "mall",
    params(
        ("id" = i64, Path, description = "商品ID")
    ),
    responses(
        (status = 200, description = "商品详情", body = MallProductResponse),
        (status = 404, description = "商品不存在或已下架")
    )
)]
pub async fn get_mall_product(
    product_service: web::Data<MallProductService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match product_service.view_public(path.into_inner()).await {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": product
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---------------------------------------------------------------------
// 后台商品管理
// ---------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/admin/mall/products",
    tag = "mall-admin",
    params(AdminProductListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "全部商品列表（含下架）")
    )
)]
pub async fn admin_list_products(
    product_service: web::Data<MallProductService>,
    req: HttpRequest,
    query: web::Query<AdminProductListQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::ShoppingMall) {
        return Ok(e.error_response());
    }
    match product_service.list_admin(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/mall/products/{id}",
    tag = "mall-admin",
    params(
        ("id" = i64, Path, description = "商品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "商品详情", body = MallProductResponse),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn admin_get_product(
    product_service: web::Data<MallProductService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::ShoppingMall) {
        return Ok(e.error_response());
    }
    match product_service.get(path.into_inner()).await {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": product
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/mall/products",
    tag = "mall-admin",
    request_body = CreateMallProductRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "商品已创建", body = MallProductResponse),
        (status = 400, description = "参数错误")
    )
)]
pub async fn admin_create_product(
    product_service: web::Data<MallProductService>,
    req: HttpRequest,
    request: web::Json<CreateMallProductRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::ShoppingMall) {
        return Ok(e.error_response());
    }
    match product_service.create(request.into_inner()).await {
        Ok(product) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": product
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/mall/products/{id}",
    tag = "mall-admin",
    request_body = UpdateMallProductRequest,
    params(
        ("id" = i64, Path, description = "商品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "商品已更新", body = MallProductResponse),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn admin_update_product(
    product_service: web::Data<MallProductService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateMallProductRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::ShoppingMall) {
        return Ok(e.error_response());
    }
    match product_service
        .update(path.into_inner(), request.into_inner())
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
    path = "/admin/mall/products/{id}",
    tag = "mall-admin",
    params(
        ("id" = i64, Path, description = "商品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "商品已删除"),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn admin_delete_product(
    product_service: web::Data<MallProductService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::ShoppingMall) {
        return Ok(e.error_response());
    }
    match product_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Product deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 挂在 /mall/products 作用域下
pub fn storefront_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_mall_products))
        .route("/{id}", web::get().to(get_mall_product));
}

/// 挂在 /admin/mall/products 作用域下
pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(admin_list_products))
        .route("", web::post().to(admin_create_product))
        .route("/{id}", web::get().to(admin_get_product))
        .route("/{id}", web::put().to(admin_update_product))
        .route("/{id}", web::delete().to(admin_delete_product));
}
