use crate::entities::{DiscountType, coupon_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CouponResponse {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub min_order_amount: Option<i64>,
    pub max_discount_amount: Option<i64>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub usage_limit: Option<i32>,
    pub usage_per_customer: i32,
    pub used_count: i32,
    pub target_segment: Option<String>,
    pub target_customers: Option<Vec<i64>>,
    pub is_active: bool,
    pub usage_count: u64,
    pub total_discount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CouponResponse {
    pub fn from_model(m: coupon_entity::Model, usage_count: u64, total_discount: i64) -> Self {
        Self {
            target_customers: m
                .target_customers
                .as_ref()
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
            id: m.id,
            code: m.code,
            name: m.name,
            description: m.description,
            discount_type: m.discount_type,
            discount_value: m.discount_value,
            min_order_amount: m.min_order_amount,
            max_discount_amount: m.max_discount_amount,
            valid_from: m.valid_from,
            valid_until: m.valid_until,
            usage_limit: m.usage_limit,
            usage_per_customer: m.usage_per_customer,
            used_count: m.used_count,
            target_segment: m.target_segment,
            is_active: m.is_active,
            usage_count,
            total_discount,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CouponStatusFilter {
    Active,
    Expired,
    #[default]
    All,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct CouponListQuery {
    pub status: Option<CouponStatusFilter>,
    pub segment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCouponRequest {
    pub name: String,
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: f64,
    pub min_order_amount: Option<i64>,
    pub max_discount_amount: Option<i64>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub usage_limit: Option<i32>,
    pub usage_per_customer: Option<i32>,
    pub target_segment: Option<String>,
    pub target_customers: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ValidateCouponRequest {
    pub code: String,
    pub customer_id: Option<i64>,
    pub order_amount: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CouponBrief {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CouponValidationResponse {
    pub valid: bool,
    pub message: String,
    pub coupon: Option<CouponBrief>,
    pub discount_amount: i64,
    pub final_amount: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RedeemCouponRequest {
    pub code: String,
    pub customer_id: i64,
    pub order_amount: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RedeemCouponResponse {
    pub usage_id: i64,
    pub coupon_id: i64,
    pub code: String,
    pub customer_id: i64,
    pub order_amount: i64,
    pub discount_amount: i64,
    pub final_amount: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IssueCouponRequest {
    pub coupon_id: i64,
    /// 为空时发放给所有商城会员
    pub user_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssueCouponResponse {
    pub issued: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserCouponFilter {
    #[default]
    All,
    Available,
    Used,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct UserCouponQuery {
    pub status: Option<UserCouponFilter>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserCouponResponse {
    /// 会员券 id（下单时使用）
    pub id: i64,
    pub coupon_id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub min_order_amount: Option<i64>,
    pub max_discount_amount: Option<i64>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
    pub is_usable: bool,
    pub issued_at: DateTime<Utc>,
}
