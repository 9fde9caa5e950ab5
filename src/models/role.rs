use crate::entities::role_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 权限目录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Dashboard,
    OrderManagement,
    CustomerService,
    Marketing,
    PerformanceAnalytics,
    ShoppingMall,
    SystemManagement,
}

impl Permission {
    pub const ALL: [Permission; 7] = [
        Permission::Dashboard,
        Permission::OrderManagement,
        Permission::CustomerService,
        Permission::Marketing,
        Permission::PerformanceAnalytics,
        Permission::ShoppingMall,
        Permission::SystemManagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Dashboard => "dashboard",
            Permission::OrderManagement => "order_management",
            Permission::CustomerService => "customer_service",
            Permission::Marketing => "marketing",
            Permission::PerformanceAnalytics => "performance_analytics",
            Permission::ShoppingMall => "shopping_mall",
            Permission::SystemManagement => "system_management",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Permission::Dashboard => "Dashboard",
            Permission::OrderManagement => "Order management",
            Permission::CustomerService => "Customer service",
            Permission::Marketing => "Marketing",
            Permission::PerformanceAnalytics => "Performance analytics",
            Permission::ShoppingMall => "Shopping mall",
            Permission::SystemManagement => "System management",
        }
    }

    pub fn parse(raw: &str) -> Option<Permission> {
        Permission::ALL.into_iter().find(|p| p.as_str() == raw)
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PermissionInfo {
    pub key: Permission,
    pub label: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleResponse {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub is_system: bool,
    pub user_count: u64,
    pub created_at: DateTime<Utc>,
}

impl RoleResponse {
    pub fn from_model(m: role_entity::Model, user_count: u64) -> Self {
        let permissions = m.permission_list();
        Self {
            id: m.id,
            name: m.name,
            display_name: m.display_name,
            description: m.description,
            permissions,
            is_system: m.is_system,
            user_count,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoleRequest {
    #[schema(example = "CS_AGENT")]
    pub name: String,
    #[schema(example = "CS agent")]
    pub display_name: String,
    pub description: Option<String>,
    #[schema(example = json!(["dashboard", "customer_service"]))]
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_parse_round_trip() {
        for p in Permission::ALL {
            assert_eq!(Permission::parse(p.as_str()), Some(p));
        }
        assert_eq!(Permission::parse("root"), None);
    }

    #[test]
    fn test_permission_serializes_as_key() {
        let json = serde_json::to_string(&Permission::PerformanceAnalytics).unwrap();
        assert_eq!(json, "\"performance_analytics\"");
    }
}
