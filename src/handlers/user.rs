use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::require_staff;
use crate::models::*;
use crate::services::UserService;

#[utoipa::path(
    get,
    path = "/users",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "员工列表", body = Vec<StaffUserResponse>),
        (status = 403, description = "无权限")
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::SystemManagement) {
        return Ok(e.error_response());
    }
    match user_service.list_users().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "user",
    request_body = CreateStaffUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "员工已创建", body = StaffUserResponse),
        (status = 400, description = "请求参数错误"),
        (status = 409, description = "邮箱已存在")
    )
)]
pub async fn create_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<CreateStaffUserRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::SystemManagement) {
        return Ok(e.error_response());
    }
    match user_service.create_user(request.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "user",
    request_body = UpdateStaffUserRequest,
    params(
        ("id" = i64, Path, description = "员工ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "员工已更新", body = StaffUserResponse),
        (status = 404, description = "员工不存在")
    )
)]
pub async fn update_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateStaffUserRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::SystemManagement) {
        return Ok(e.error_response());
    }
    match user_service
        .update_user(path.into_inner(), request.into_inner())
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "user",
    params(
        ("id" = i64, Path, description = "员工ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "员工已删除"),
        (status = 400, description = "不能删除自己"),
        (status = 404, description = "员工不存在")
    )
)]
pub async fn delete_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::SystemManagement) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match user_service
        .delete_user(staff.user_id, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "User deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/roles",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "角色列表", body = Vec<RoleResponse>)
    )
)]
pub async fn list_roles(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::SystemManagement) {
        return Ok(e.error_response());
    }
    match user_service.list_roles().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/roles",
    tag = "user",
    request_body = CreateRoleRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "角色已创建", body = RoleResponse),
        (status = 400, description = "未知权限"),
        (status = 409, description = "角色名已存在")
    )
)]
pub async fn create_role(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<CreateRoleRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::SystemManagement) {
        return Ok(e.error_response());
    }
    match user_service.create_role(request.into_inner()).await {
        Ok(role) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": role
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/roles/{id}",
    tag = "user",
    request_body = UpdateRoleRequest,
    params(
        ("id" = i64, Path, description = "角色ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "角色已更新", body = RoleResponse),
        (status = 404, description = "角色不存在")
    )
)]
pub async fn update_role(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::SystemManagement) {
        return Ok(e.error_response());
    }
    match user_service
        .update_role(path.into_inner(), request.into_inner())
        .await
    {
        Ok(role) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": role
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/roles/{id}",
    tag = "user",
    params(
        ("id" = i64, Path, description = "角色ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "角色已删除"),
        (status = 400, description = "系统角色或仍有员工使用"),
        (status = 404, description = "角色不存在")
    )
)]
pub async fn delete_role(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::SystemManagement) {
        return Ok(e.error_response());
    }
    match user_service.delete_role(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Role deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/permissions",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "权限目录", body = Vec<PermissionInfo>)
    )
)]
pub async fn list_permissions(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::SystemManagement) {
        return Ok(e.error_response());
    }
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": user_service.permission_catalogue()
    })))
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("", web::post().to(create_user))
            .route("/{id}", web::put().to(update_user))
            .route("/{id}", web::delete().to(delete_user)),
    )
    .service(
        web::scope("/roles")
            .route("", web::get().to(list_roles))
            .route("", web::post().to(create_role))
            .route("/{id}", web::put().to(update_role))
            .route("/{id}", web::delete().to(delete_role)),
    )
    .route("/permissions", web::get().to(list_permissions));
}
