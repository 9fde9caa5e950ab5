use super::common::double_option;
use crate::entities::mall_product_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MallProductResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    /// 0..=100
    pub discount_rate: i64,
    pub stock: i32,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub images: Vec<String>,
    #[schema(value_type = Option<Object>)]
    pub options: Option<serde_json::Value>,
    pub is_active: bool,
    pub is_featured: bool,
    pub rating: Option<f64>,
    pub sold_count: i64,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<mall_product_entity::Model> for MallProductResponse {
    fn from(m: mall_product_entity::Model) -> Self {
        Self {
            discount_rate: m.discount_rate(),
            images: m
                .images
                .clone()
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default(),
            id: m.id,
            name: m.name,
            description: m.description,
            price: m.price,
            original_price: m.original_price,
            stock: m.stock,
            category: m.category,
            tags: m.tags,
            options: m.options,
            is_active: m.is_active,
            is_featured: m.is_featured,
            rating: m.rating,
            sold_count: m.sold_count,
            view_count: m.view_count,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Rating,
    Popular,
}

/// 前台商品列表，只返回上架商品
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct ProductListQuery {
    pub category: Option<String>,
    /// 按名称、描述、标签模糊匹配
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub sort: Option<ProductSort>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// 后台商品列表，包含下架商品
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct AdminProductListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateMallProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub images: Option<Vec<String>>,
    #[schema(value_type = Option<Object>)]
    pub options: Option<serde_json::Value>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

/// 可空字段传 null 表示清除
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateMallProductRequest {
    pub name: Option<String>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub price: Option<i64>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub original_price: Option<Option<i64>>,
    pub stock: Option<i32>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub tags: Option<Option<String>>,
    pub images: Option<Vec<String>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<Object>)]
    pub options: Option<Option<serde_json::Value>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}
