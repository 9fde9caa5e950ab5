use crate::error::{AppError, AppResult};
use crate::models::Permission;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

const ADMIN_ROLE: &str = "ADMIN";
const MALL_PREFIX: &str = "/api/v1/mall/";

/// 已登录的后台员工
#[derive(Debug, Clone)]
pub struct StaffIdentity {
    pub user_id: i64,
    pub role: Option<String>,
    /// 为空表示总部账号
    pub partner: Option<String>,
    pub permissions: Vec<String>,
}

impl StaffIdentity {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }

    pub fn is_headquarters(&self) -> bool {
        self.partner.is_none()
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.is_admin() || self.permissions.iter().any(|p| p == permission.as_str())
    }

    pub fn require(&self, permission: Permission) -> AppResult<()> {
        if self.has(permission) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

/// 已登录的商城会员
#[derive(Debug, Clone)]
pub struct MallIdentity {
    pub user_id: i64,
    pub email: String,
}

// 公开路径配置
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    // 仅 GET 公开
    read_only_paths: Vec<&'static str>,
    read_only_prefixes: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            // 完全匹配的公开路径
            exact_paths: vec![
                "/swagger-ui",
                "/swagger-ui/",
                "/api-docs/openapi.json",
                "/api/v1/auth/login",
                "/api/v1/auth/refresh",
            ],
            // 前缀匹配的公开路径
            prefix_paths: vec![
                "/swagger-ui/",
                "/api-docs/",
                "/api/v1/mall/auth/",
                "/api/v1/mall/chat/",
            ],
            read_only_paths: vec!["/api/v1/mall/qna", "/api/v1/mall/products"],
            read_only_prefixes: vec!["/api/v1/mall/products/"],
        }
    }

    fn is_public_path(&self, method: &Method, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }

        if method == Method::GET
            && (self.read_only_paths.contains(&path)
                || self.read_only_prefixes.iter().any(|&p| path.starts_with(p)))
        {
            return true;
        }

        // 检查前缀匹配
        self.prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S> AuthMiddlewareService<S> {
    /// 校验令牌并把身份写入请求扩展
    fn authenticate(&self, req: &ServiceRequest, token: &str) -> AppResult<()> {
        if req.path().starts_with(MALL_PREFIX) {
            let claims = self.jwt_service.verify_mall_token(token)?;
            let identity = MallIdentity {
                user_id: claims.user_id()?,
                email: claims.email.unwrap_or_default(),
            };
            req.extensions_mut().insert(identity);
        } else {
            let claims = self.jwt_service.verify_access_token(token)?;
            let identity = StaffIdentity {
                user_id: claims.user_id()?,
                role: claims.role,
                partner: claims.partner,
                permissions: claims.permissions,
            };
            req.extensions_mut().insert(identity);
        }
        Ok(())
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        // 检查是否为公开路径
        if self.public_paths.is_public_path(req.method(), req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        // 提取Authorization header
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::to_string);

        let Some(token) = token else {
            let error = AppError::AuthError("Missing access token".to_string());
            return Box::pin(async move { Err(error.into()) });
        };

        match self.authenticate(&req, &token) {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(e) => {
                log::debug!("Rejected token for {}: {e}", req.path());
                let error = AppError::AuthError("Invalid access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

/// 取出当前员工身份
pub fn current_staff(req: &HttpRequest) -> AppResult<StaffIdentity> {
    req.extensions()
        .get::<StaffIdentity>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Login required".to_string()))
}

/// 取出当前员工身份并校验权限
pub fn require_staff(req: &HttpRequest, permission: Permission) -> AppResult<StaffIdentity> {
    let staff = current_staff(req)?;
    staff.require(permission)?;
    Ok(staff)
}

/// 取出当前商城会员身份
pub fn current_mall_user(req: &HttpRequest) -> AppResult<MallIdentity> {
    req.extensions()
        .get::<MallIdentity>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Login required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff(role: Option<&str>, perms: &[&str]) -> StaffIdentity {
        StaffIdentity {
            user_id: 1,
            role: role.map(str::to_string),
            partner: None,
            permissions: perms.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new();
        assert!(paths.is_public_path(&Method::POST, "/api/v1/auth/login"));
        assert!(paths.is_public_path(&Method::POST, "/api/v1/mall/auth/signup"));
        assert!(paths.is_public_path(&Method::POST, "/api/v1/mall/chat/sessions"));
        assert!(paths.is_public_path(&Method::GET, "/api/v1/mall/qna"));
        assert!(!paths.is_public_path(&Method::POST, "/api/v1/mall/qna"));
        assert!(!paths.is_public_path(&Method::GET, "/api/v1/auth/me"));
        assert!(!paths.is_public_path(&Method::GET, "/api/v1/orders"));
        assert!(!paths.is_public_path(&Method::POST, "/api/v1/mall/orders"));
        assert!(paths.is_public_path(&Method::GET, "/api/v1/mall/products"));
        assert!(paths.is_public_path(&Method::GET, "/api/v1/mall/products/7"));
        assert!(!paths.is_public_path(&Method::POST, "/api/v1/mall/products"));
        assert!(!paths.is_public_path(&Method::GET, "/api/v1/admin/mall/products"));
    }

    #[test]
    fn test_admin_implies_every_permission() {
        let admin = staff(Some("ADMIN"), &[]);
        assert!(admin.require(Permission::SystemManagement).is_ok());
        assert!(admin.require(Permission::Marketing).is_ok());
    }

    #[test]
    fn test_permission_list_is_checked() {
        let s = staff(Some("PARTNER"), &["dashboard", "order_management"]);
        assert!(s.require(Permission::OrderManagement).is_ok());
        assert!(matches!(
            s.require(Permission::Marketing),
            Err(AppError::PermissionDenied)
        ));
    }
}
