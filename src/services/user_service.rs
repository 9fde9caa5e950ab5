use crate::entities::{role_entity as roles, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{hash_password, validate_password};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;

const DEFAULT_MAX_CHATS: i32 = 5;

/// 校验权限标识并去重
fn normalize_permissions(raw: &[String]) -> AppResult<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for p in raw {
        let perm = Permission::parse(p.trim())
            .ok_or_else(|| AppError::ValidationError(format!("Unknown permission: {p}")))?;
        if !out.iter().any(|x| x == perm.as_str()) {
            out.push(perm.as_str().to_string());
        }
    }
    Ok(out)
}

fn normalize_partner(raw: Option<String>) -> Option<String> {
    raw.map(|p| p.trim().to_string()).filter(|p| !p.is_empty())
}

const ADMIN_ROLE: &str = "ADMIN";

/// 启动时创建的管理员：启用状态并持有 ADMIN 角色
pub fn bootstrap_admin_model(
    email: &str,
    password_hash: String,
    admin_role_id: i64,
    now: DateTime<Utc>,
) -> users::ActiveModel {
    users::ActiveModel {
        email: Set(email.trim().to_lowercase()),
        name: Set("Administrator".to_string()),
        password_hash: Set(password_hash),
        role_id: Set(Some(admin_role_id)),
        assigned_partner: Set(None),
        is_active: Set(true),
        is_online: Set(false),
        max_chats: Set(DEFAULT_MAX_CHATS),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 确保配置的管理员账号存在；已存在同邮箱员工时不做任何修改
    pub async fn ensure_bootstrap_admin(&self, email: &str, password: &str) -> AppResult<()> {
        let email = email.trim().to_lowercase();
        let exists = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.pool)
            .await?;
        if exists.is_some() {
            return Ok(());
        }
        let admin_role = roles::Entity::find()
            .filter(roles::Column::Name.eq(ADMIN_ROLE))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::InternalError("ADMIN role is missing".into()))?;
        bootstrap_admin_model(&email, hash_password(password)?, admin_role.id, Utc::now())
            .insert(&self.pool)
            .await?;
        log::info!("Bootstrap administrator {email} created");
        Ok(())
    }

    async fn role_map(&self) -> AppResult<HashMap<i64, roles::Model>> {
        Ok(roles::Entity::find()
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect())
    }

    async fn ensure_role_exists(&self, role_id: i64) -> AppResult<roles::Model> {
        roles::Entity::find_by_id(role_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::ValidationError(format!("Role {role_id} does not exist")))
    }

    pub async fn list_users(&self) -> AppResult<Vec<StaffUserResponse>> {
        let role_map = self.role_map().await?;
        let list = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list
            .into_iter()
            .map(|u| {
                let role = u.role_id.and_then(|id| role_map.get(&id));
                StaffUserResponse::from_models(u, role)
            })
            .collect())
    }

    pub async fn create_user(&self, req: CreateStaffUserRequest) -> AppResult<StaffUserResponse> {
        let email = req.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::ValidationError("A valid email is required".into()));
        }
        if req.name.trim().is_empty() {
            return Err(AppError::ValidationError("Name is required".into()));
        }
        validate_password(&req.password)?;
        let max_chats = req.max_chats.unwrap_or(DEFAULT_MAX_CHATS);
        if max_chats < 0 {
            return Err(AppError::ValidationError("max_chats must be >= 0".into()));
        }

        let exists = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .count(&self.pool)
            .await?;
        if exists > 0 {
            return Err(AppError::Conflict("Email is already registered".into()));
        }

        let role = match req.role_id {
            Some(id) => Some(self.ensure_role_exists(id).await?),
            None => None,
        };

        let now = Utc::now();
        let user = users::ActiveModel {
            email: Set(email),
            name: Set(req.name.trim().to_string()),
            password_hash: Set(hash_password(&req.password)?),
            role_id: Set(role.as_ref().map(|r| r.id)),
            assigned_partner: Set(normalize_partner(req.assigned_partner)),
            is_active: Set(true),
            is_online: Set(false),
            max_chats: Set(max_chats),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Staff user {} created", user.id);
        Ok(StaffUserResponse::from_models(user, role.as_ref()))
    }

    pub async fn update_user(
        &self,
        user_id: i64,
        req: UpdateStaffUserRequest,
    ) -> AppResult<StaffUserResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        let mut am = user.into_active_model();
        if let Some(name) = req.name {
            if name.trim().is_empty() {
                return Err(AppError::ValidationError("Name is required".into()));
            }
            am.name = Set(name.trim().to_string());
        }
        if let Some(role_id) = req.role_id {
            self.ensure_role_exists(role_id).await?;
            am.role_id = Set(Some(role_id));
        }
        if req.assigned_partner.is_some() {
            am.assigned_partner = Set(normalize_partner(req.assigned_partner));
        }
        if let Some(active) = req.is_active {
            am.is_active = Set(active);
        }
        if let Some(max_chats) = req.max_chats {
            if max_chats < 0 {
                return Err(AppError::ValidationError("max_chats must be >= 0".into()));
            }
            am.max_chats = Set(max_chats);
        }
        am.updated_at = Set(Utc::now());
        let user = am.update(&self.pool).await?;

        let role = match user.role_id {
            Some(id) => roles::Entity::find_by_id(id).one(&self.pool).await?,
            None => None,
        };
        Ok(StaffUserResponse::from_models(user, role.as_ref()))
    }

    pub async fn delete_user(&self, acting_user_id: i64, user_id: i64) -> AppResult<()> {
        if acting_user_id == user_id {
            return Err(AppError::ValidationError(
                "You cannot delete your own account".into(),
            ));
        }
        let res = users::Entity::delete_by_id(user_id).exec(&self.pool).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        log::info!("Staff user {user_id} deleted by {acting_user_id}");
        Ok(())
    }

    pub async fn list_roles(&self) -> AppResult<Vec<RoleResponse>> {
        let list = roles::Entity::find()
            .order_by_asc(roles::Column::Id)
            .all(&self.pool)
            .await?;
        let all_users = users::Entity::find().all(&self.pool).await?;
        let mut counts: HashMap<i64, u64> = HashMap::new();
        for u in &all_users {
            if let Some(rid) = u.role_id {
                *counts.entry(rid).or_default() += 1;
            }
        }
        Ok(list
            .into_iter()
            .map(|r| {
                let n = counts.get(&r.id).copied().unwrap_or(0);
                RoleResponse::from_model(r, n)
            })
            .collect())
    }

    pub async fn create_role(&self, req: CreateRoleRequest) -> AppResult<RoleResponse> {
        let name = req.name.trim().to_uppercase();
        if name.is_empty() || req.display_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Role name and display name are required".into(),
            ));
        }
        let permissions = normalize_permissions(&req.permissions)?;

        let exists = roles::Entity::find()
            .filter(roles::Column::Name.eq(name.clone()))
            .count(&self.pool)
            .await?;
        if exists > 0 {
            return Err(AppError::Conflict(format!("Role {name} already exists")));
        }

        let now = Utc::now();
        let role = roles::ActiveModel {
            name: Set(name),
            display_name: Set(req.display_name.trim().to_string()),
            description: Set(req.description),
            permissions: Set(serde_json::to_value(permissions)?),
            is_system: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(RoleResponse::from_model(role, 0))
    }

    pub async fn update_role(&self, role_id: i64, req: UpdateRoleRequest) -> AppResult<RoleResponse> {
        let role = roles::Entity::find_by_id(role_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Role not found".into()))?;

        let mut am = role.into_active_model();
        if let Some(display_name) = req.display_name {
            if display_name.trim().is_empty() {
                return Err(AppError::ValidationError("Display name is required".into()));
            }
            am.display_name = Set(display_name.trim().to_string());
        }
        if req.description.is_some() {
            am.description = Set(req.description);
        }
        if let Some(perms) = req.permissions {
            am.permissions = Set(serde_json::to_value(normalize_permissions(&perms)?)?);
        }
        am.updated_at = Set(Utc::now());
        let role = am.update(&self.pool).await?;

        let user_count = users::Entity::find()
            .filter(users::Column::RoleId.eq(role.id))
            .count(&self.pool)
            .await?;
        Ok(RoleResponse::from_model(role, user_count))
    }

    pub async fn delete_role(&self, role_id: i64) -> AppResult<()> {
        let role = roles::Entity::find_by_id(role_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Role not found".into()))?;
        if role.is_system {
            return Err(AppError::ValidationError(
                "System roles cannot be deleted".into(),
            ));
        }
        let assigned = users::Entity::find()
            .filter(users::Column::RoleId.eq(role_id))
            .count(&self.pool)
            .await?;
        if assigned > 0 {
            return Err(AppError::ValidationError(format!(
                "Role is still assigned to {assigned} user(s)"
            )));
        }
        roles::Entity::delete_by_id(role_id).exec(&self.pool).await?;
        Ok(())
    }

    pub fn permission_catalogue(&self) -> Vec<PermissionInfo> {
        Permission::ALL
            .into_iter()
            .map(|p| PermissionInfo {
                key: p,
                label: p.label().to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_permissions_dedups_and_validates() {
        let perms = normalize_permissions(&[
            "dashboard".to_string(),
            " marketing ".to_string(),
            "dashboard".to_string(),
        ])
        .unwrap();
        assert_eq!(perms, vec!["dashboard", "marketing"]);

        assert!(matches!(
            normalize_permissions(&["superuser".to_string()]),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_normalize_partner() {
        assert_eq!(normalize_partner(Some("  ".into())), None);
        assert_eq!(
            normalize_partner(Some(" coupang ".into())).as_deref(),
            Some("coupang")
        );
        assert_eq!(normalize_partner(None), None);
    }

    #[test]
    fn test_bootstrap_admin_is_active_and_holds_admin_role() {
        let now = Utc::now();
        let am = bootstrap_admin_model(" Admin@Example.com ", "hash".into(), 1, now);
        assert_eq!(am.email.as_ref(), "admin@example.com");
        assert_eq!(am.role_id.as_ref(), &Some(1));
        assert!(*am.is_active.as_ref());
        assert_eq!(am.password_hash.as_ref(), "hash");
        assert_eq!(am.max_chats.as_ref(), &DEFAULT_MAX_CHATS);
    }
}
