use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 后台员工账号。assigned_partner 为空表示总部账号（可访问全部数据）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role_id: Option<i64>,
    pub assigned_partner: Option<String>,
    pub is_active: bool,
    pub is_online: bool,
    pub max_chats: i32,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
