use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "mall_products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    /// 划线价，高于 price 时前台显示折扣率
    pub original_price: Option<i64>,
    pub stock: i32,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub images: Option<Json>,
    pub options: Option<Json>,
    pub is_active: bool,
    pub is_featured: bool,
    pub rating: Option<f64>,
    pub sold_count: i64,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// (原价 - 售价) / 原价，四舍五入到整数百分比
    pub fn discount_rate(&self) -> i64 {
        match self.original_price {
            Some(original) if original > 0 && original > self.price => {
                ((original - self.price) as f64 * 100.0 / original as f64).round() as i64
            }
            _ => 0,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
