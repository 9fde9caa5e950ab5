use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 基础商品及其 KPI 计算参数
/// - kpi_supply_price: 供货价，NULL 时回退到 unit_price
/// - kpi_commission_rate: 手续费率，NULL 时使用全局默认费率
/// - kpi_unit_count: 每件商品计入的 KPI 件数
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "base_products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub partner_code: Option<String>,
    pub unit_price: i64,
    pub kpi_supply_price: Option<i64>,
    pub kpi_cost_price: Option<i64>,
    pub kpi_commission_rate: Option<f64>,
    pub kpi_unit_count: i32,
    pub kpi_count_enabled: bool,
    pub kpi_sales_enabled: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
