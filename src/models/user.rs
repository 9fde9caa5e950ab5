use crate::entities::{role_entity, user_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 后台员工资料
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StaffUserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role_id: Option<i64>,
    pub role: Option<String>,
    pub role_display_name: Option<String>,
    pub permissions: Vec<String>,
    pub assigned_partner: Option<String>,
    pub is_active: bool,
    pub is_online: bool,
    pub max_chats: i32,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl StaffUserResponse {
    pub fn from_models(user: user_entity::Model, role: Option<&role_entity::Model>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role_id: user.role_id,
            role: role.map(|r| r.name.clone()),
            role_display_name: role.map(|r| r.display_name.clone()),
            permissions: role.map(|r| r.permission_list()).unwrap_or_default(),
            assigned_partner: user.assigned_partner,
            is_active: user.is_active,
            is_online: user.is_online,
            max_chats: user.max_chats,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStaffUserRequest {
    #[schema(example = "agent@example.com")]
    pub email: String,
    #[schema(example = "Kim Minji")]
    pub name: String,
    #[schema(example = "Password123")]
    pub password: String,
    pub role_id: Option<i64>,
    /// 合作方账号填写合作方代码，总部账号留空
    pub assigned_partner: Option<String>,
    pub max_chats: Option<i32>,
}

/// assigned_partner 传空字符串表示改回总部账号
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStaffUserRequest {
    pub name: Option<String>,
    pub role_id: Option<i64>,
    pub assigned_partner: Option<String>,
    pub is_active: Option<bool>,
    pub max_chats: Option<i32>,
}
