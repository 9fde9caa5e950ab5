use actix_cors::Cors;

pub fn create_cors() -> Cors {
    Cors::default()
        // 后台与商城前端分别部署，来源不固定
        .allowed_origin_fn(|_, _req_head| true)
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allow_any_header()
        .expose_headers(vec!["Content-Disposition"])
        .supports_credentials()
        .max_age(3600)
}
