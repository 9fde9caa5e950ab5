use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::require_staff;
use crate::models::*;
use crate::services::DashboardService;

#[utoipa::path(
    get,
    path = "/dashboard/kpis",
    tag = "dashboard",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "首页指标", body = DashboardKpiResponse),
        (status = 403, description = "无权限")
    )
)]
pub async fn kpis(
    dashboard_service: web::Data<DashboardService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let staff = match require_staff(&req, Permission::Dashboard) {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };
    match dashboard_service.kpis(&staff).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn dashboard_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/dashboard").route("/kpis", web::get().to(kpis)));
}
