use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::{chat, product};
use crate::middlewares::{current_mall_user, require_staff};
use crate::models::*;
use crate::services::{CouponService, MallService};

// ---------------------------------------------------------------------
// 商城会员
// ---------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/mall/auth/signup",
    tag = "mall",
    request_body = MallSignupRequest,
    responses(
        (status = 200, description = "注册成功", body = MallAuthResponse),
        (status = 400, description = "请求参数错误"),
        (status = 409, description = "邮箱已注册")
    )
)]
pub async fn signup(
    mall_service: web::Data<MallService>,
    request: web::Json<MallSignupRequest>,
) -> Result<HttpResponse> {
    match mall_service.signup(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/mall/auth/login",
    tag = "mall",
    request_body = MallLoginRequest,
    responses(
        (status = 200, description = "登录成功", body = MallAuthResponse),
        (status = 401, description = "邮箱或密码错误")
    )
)]
pub async fn login(
    mall_service: web::Data<MallService>,
    request: web::Json<MallLoginRequest>,
) -> Result<HttpResponse> {
    match mall_service.login(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/mall/mypage/profile",
    tag = "mall",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "会员资料", body = MallUserResponse),
        (status = 401, description = "未登录")
    )
)]
pub async fn get_profile(
    mall_service: web::Data<MallService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let member = match current_mall_user(&req) {
        Ok(m) => m,
        Err(e) => return Ok(e.error_response()),
    };
    match mall_service.profile(member.user_id).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/mall/mypage/profile",
    tag = "mall",
    request_body = UpdateMallProfileRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "资料已更新", body = MallUserResponse),
        (status = 400, description = "当前密码错误或格式不合规")
    )
)]
pub async fn update_profile(
    mall_service: web::Data<MallService>,
    req: HttpRequest,
    request: web::Json<UpdateMallProfileRequest>,
) -> Result<HttpResponse> {
    let member = match current_mall_user(&req) {
        Ok(m) => m,
        Err(e) => return Ok(e.error_response()),
    };
    match mall_service
        .update_profile(member.user_id, request.into_inner())
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
    get,
    path = "/mall/mypage/stats",
    tag = "mall",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "我的订单与优惠券统计", body = MallStatsResponse)
    )
)]
pub async fn my_stats(
    mall_service: web::Data<MallService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let member = match current_mall_user(&req) {
        Ok(m) => m,
        Err(e) => return Ok(e.error_response()),
    };
    match mall_service.my_stats(member.user_id).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/mall/mypage/coupons",
    tag = "mall",
    params(UserCouponQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "我的优惠券", body = Vec<UserCouponResponse>)
    )
)]
pub async fn my_coupons(
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    query: web::Query<UserCouponQuery>,
) -> Result<HttpResponse> {
    let member = match current_mall_user(&req) {
        Ok(m) => m,
        Err(e) => return Ok(e.error_response()),
    };
    match coupon_service
        .user_coupons(member.user_id, query.status.unwrap_or_default())
        .await
    {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/mall/orders",
    tag = "mall",
    request_body = CheckoutRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "下单成功", body = MallOrderResponse),
        (status = 400, description = "商品为空或优惠券不可用")
    )
)]
pub async fn checkout(
    mall_service: web::Data<MallService>,
    req: HttpRequest,
    request: web::Json<CheckoutRequest>,
) -> Result<HttpResponse> {
    let member = match current_mall_user(&req) {
        Ok(m) => m,
        Err(e) => return Ok(e.error_response()),
    };
    match mall_service
        .checkout(member.user_id, request.into_inner())
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
    get,
    path = "/mall/orders",
    tag = "mall",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "我的订单", body = Vec<MallOrderResponse>)
    )
)]
pub async fn my_orders(
    mall_service: web::Data<MallService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let member = match current_mall_user(&req) {
        Ok(m) => m,
        Err(e) => return Ok(e.error_response()),
    };
    match mall_service.my_orders(member.user_id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/mall/orders/{id}",
    tag = "mall",
    params(
        ("id" = i64, Path, description = "商城订单ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "订单详情", body = MallOrderResponse),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn my_order(
    mall_service: web::Data<MallService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let member = match current_mall_user(&req) {
        Ok(m) => m,
        Err(e) => return Ok(e.error_response()),
    };
    match mall_service.my_order(member.user_id, path.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/mall/orders/{id}/cancel",
    tag = "mall",
    params(
        ("id" = i64, Path, description = "商城订单ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "订单已取消", body = MallOrderResponse),
        (status = 400, description = "当前状态不可取消")
    )
)]
pub async fn cancel_order(
    mall_service: web::Data<MallService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let member = match current_mall_user(&req) {
        Ok(m) => m,
        Err(e) => return Ok(e.error_response()),
    };
    match mall_service.cancel(member.user_id, path.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/mall/qna",
    tag = "mall",
    responses(
        (status = 200, description = "最近问答（作者已脱敏）", body = Vec<QnaResponse>)
    )
)]
pub async fn public_qna(mall_service: web::Data<MallService>) -> Result<HttpResponse> {
    match mall_service.public_qna().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/mall/qna",
    tag = "mall",
    request_body = CreateQnaRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "问题已提交", body = QnaResponse),
        (status = 400, description = "标题或内容为空")
    )
)]
pub async fn create_qna(
    mall_service: web::Data<MallService>,
    req: HttpRequest,
    request: web::Json<CreateQnaRequest>,
) -> Result<HttpResponse> {
    let member = match current_mall_user(&req) {
        Ok(m) => m,
        Err(e) => return Ok(e.error_response()),
    };
    match mall_service
        .create_qna(member.user_id, request.into_inner())
        .await
    {
        Ok(qna) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": qna
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---------------------------------------------------------------------
// 后台商城管理
// ---------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/admin/mall/orders",
    tag = "mall-admin",
    params(MallOrderListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "商城订单列表")
    )
)]
pub async fn admin_orders(
    mall_service: web::Data<MallService>,
    req: HttpRequest,
    query: web::Query<MallOrderListQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::ShoppingMall) {
        return Ok(e.error_response());
    }
    match mall_service.admin_orders(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/admin/mall/orders/{id}",
    tag = "mall-admin",
    request_body = UpdateMallOrderRequest,
    params(
        ("id" = i64, Path, description = "商城订单ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "订单已更新", body = MallOrderResponse),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn admin_update_order(
    mall_service: web::Data<MallService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateMallOrderRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::ShoppingMall) {
        return Ok(e.error_response());
    }
    match mall_service
        .admin_update_order(path.into_inner(), request.into_inner())
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
    get,
    path = "/admin/mall/users",
    tag = "mall-admin",
    params(MallUserListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "商城会员列表")
    )
)]
pub async fn admin_users(
    mall_service: web::Data<MallService>,
    req: HttpRequest,
    query: web::Query<MallUserListQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::ShoppingMall) {
        return Ok(e.error_response());
    }
    match mall_service.admin_users(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/mall/qna",
    tag = "mall-admin",
    params(QnaListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "问答列表", body = Vec<QnaResponse>)
    )
)]
pub async fn admin_qna(
    mall_service: web::Data<MallService>,
    req: HttpRequest,
    query: web::Query<QnaListQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&req, Permission::ShoppingMall) {
        return Ok(e.error_response());
    }
    match mall_service.admin_qna(query.answered).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/mall/qna/{id}/answer",
    tag = "mall-admin",
    request_body = AnswerQnaRequest,
    params(
        ("id" = i64, Path, description = "问答ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已回复", body = QnaResponse),
        (status = 404, description = "问答不存在")
    )
)]
pub async fn answer_qna(
    mall_service: web::Data<MallService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AnswerQnaRequest>,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::ShoppingMall) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match mall_service
        .answer_qna(staff.user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(qna) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": qna
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn mall_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/mall")
            .route("/auth/signup", web::post().to(signup))
            .route("/auth/login", web::post().to(login))
            .route("/mypage/profile", web::get().to(get_profile))
            .route("/mypage/profile", web::put().to(update_profile))
            .route("/mypage/stats", web::get().to(my_stats))
            .route("/mypage/coupons", web::get().to(my_coupons))
            .route("/orders", web::post().to(checkout))
            .route("/orders", web::get().to(my_orders))
            .route("/orders/{id}", web::get().to(my_order))
            .route("/orders/{id}/cancel", web::post().to(cancel_order))
            .route("/qna", web::get().to(public_qna))
            .route("/qna", web::post().to(create_qna))
            .service(web::scope("/products").configure(product::storefront_routes))
            .service(web::scope("/chat").configure(chat::widget_routes)),
    );
}

pub fn mall_admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/mall")
            .route("/orders", web::get().to(admin_orders))
            .route("/orders/{id}", web::patch().to(admin_update_order))
            .route("/users", web::get().to(admin_users))
            .route("/qna", web::get().to(admin_qna))
            .route("/qna/{id}/answer", web::post().to(answer_qna))
            .service(web::scope("/products").configure(product::admin_routes)),
    );
}
