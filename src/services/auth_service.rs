use crate::entities::{role_entity as roles, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{AccessTokenSubject, JwtService, hash_password, validate_password, verify_password};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = request.email.trim().to_lowercase();
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError(INVALID_CREDENTIALS.to_string()))?;

        // 停用账号与密码错误返回同样的提示
        if !user.is_active || !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
        }

        let mut am = user.into_active_model();
        am.last_login_at = Set(Some(Utc::now()));
        let user = am.update(&self.pool).await?;

        let role = self.load_role(user.role_id).await?;
        let access_token = self.issue_access_token(&user, role.as_ref())?;
        let refresh_token = self.jwt_service.generate_refresh_token(user.id)?;
        log::info!("Staff user {} logged in", user.id);

        Ok(AuthResponse {
            user: StaffUserResponse::from_models(user, role.as_ref()),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    /// 刷新访问令牌，角色与权限重新从数据库读取
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AccessTokenResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user = self.active_user(claims.user_id()?).await?;
        let role = self.load_role(user.role_id).await?;

        Ok(AccessTokenResponse {
            access_token: self.issue_access_token(&user, role.as_ref())?,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    pub async fn me(&self, user_id: i64) -> AppResult<StaffUserResponse> {
        let user = self.active_user(user_id).await?;
        let role = self.load_role(user.role_id).await?;
        Ok(StaffUserResponse::from_models(user, role.as_ref()))
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        let user = self.active_user(user_id).await?;
        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(AppError::ValidationError(
                "Current password is incorrect".to_string(),
            ));
        }
        validate_password(&request.new_password)?;

        let mut am = user.into_active_model();
        am.password_hash = Set(hash_password(&request.new_password)?);
        am.updated_at = Set(Utc::now());
        am.update(&self.pool).await?;
        Ok(())
    }

    async fn active_user(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::AuthError("Account not found or disabled".to_string()))
    }

    async fn load_role(&self, role_id: Option<i64>) -> AppResult<Option<roles::Model>> {
        match role_id {
            Some(id) => Ok(roles::Entity::find_by_id(id).one(&self.pool).await?),
            None => Ok(None),
        }
    }

    fn issue_access_token(
        &self,
        user: &users::Model,
        role: Option<&roles::Model>,
    ) -> AppResult<String> {
        let permissions = role.map(|r| r.permission_list()).unwrap_or_default();
        self.jwt_service.generate_access_token(AccessTokenSubject {
            user_id: user.id,
            role: role.map(|r| r.name.as_str()),
            partner: user.assigned_partner.as_deref(),
            permissions: &permissions,
        })
    }
}
