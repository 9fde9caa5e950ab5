use crate::entities::{MallOrderStatus, mall_order_entity, mall_qna_entity, mall_user_entity};
use crate::utils::mask_name;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MallSignupRequest {
    pub name: String,
    #[schema(example = "shopper@example.com")]
    pub email: String,
    #[schema(example = "010-1234-5678")]
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MallLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MallUserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub total_spent: i64,
    pub created_at: DateTime<Utc>,
}

impl From<mall_user_entity::Model> for MallUserResponse {
    fn from(m: mall_user_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            total_spent: m.total_spent,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MallAuthResponse {
    pub user: MallUserResponse,
    pub token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateMallProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// 下单商品快照，同时作为 mall_orders.items 的元素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutItem {
    pub product_id: Option<i64>,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
    pub option: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ShippingAddress {
    pub recipient: Option<String>,
    pub phone: Option<String>,
    pub zip_code: String,
    pub address: String,
    pub address_detail: Option<String>,
}

impl ShippingAddress {
    /// "[우편번호] 주소 상세주소"
    pub fn full_address(&self) -> String {
        let mut addr = format!("[{}] {}", self.zip_code.trim(), self.address.trim());
        if let Some(detail) = self.address_detail.as_deref().map(str::trim) {
            if !detail.is_empty() {
                addr.push(' ');
                addr.push_str(detail);
            }
        }
        addr
    }
}

/// 客户端传来的金额字段一律忽略，由服务端重新计算
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
    pub shipping_address: ShippingAddress,
    /// mall_user_coupons.id
    pub user_coupon_id: Option<i64>,
    pub order_note: Option<String>,
    #[serde(default)]
    pub is_demo: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutTotals {
    pub subtotal: i64,
    pub shipping_fee: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MallOrderResponse {
    pub id: i64,
    pub order_number: String,
    pub user_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub recipient_name: String,
    pub recipient_phone: Option<String>,
    pub recipient_zip: String,
    pub recipient_addr: String,
    pub delivery_msg: Option<String>,
    pub status: MallOrderStatus,
    pub items: Vec<CheckoutItem>,
    pub subtotal: i64,
    pub shipping_fee: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
    pub user_coupon_id: Option<i64>,
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<mall_order_entity::Model> for MallOrderResponse {
    fn from(m: mall_order_entity::Model) -> Self {
        Self {
            items: serde_json::from_value(m.items).unwrap_or_default(),
            id: m.id,
            order_number: m.order_number,
            user_id: m.user_id,
            customer_name: m.customer_name,
            customer_email: m.customer_email,
            recipient_name: m.recipient_name,
            recipient_phone: m.recipient_phone,
            recipient_zip: m.recipient_zip,
            recipient_addr: m.recipient_addr,
            delivery_msg: m.delivery_msg,
            status: m.status,
            subtotal: m.subtotal,
            shipping_fee: m.shipping_fee,
            discount_amount: m.discount_amount,
            total_amount: m.total_amount,
            user_coupon_id: m.user_coupon_id,
            courier: m.courier,
            tracking_number: m.tracking_number,
            paid_at: m.paid_at,
            cancelled_at: m.cancelled_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MallStatsResponse {
    pub order_count: u64,
    pub total_spent: i64,
    pub coupon_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct MallOrderListQuery {
    pub status: Option<MallOrderStatus>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateMallOrderRequest {
    pub status: Option<MallOrderStatus>,
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct MallUserListQuery {
    pub search: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateQnaRequest {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub product_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct QnaListQuery {
    /// 为空时返回全部
    pub answered: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnswerQnaRequest {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QnaResponse {
    pub id: i64,
    pub product_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub category: String,
    pub answer: Option<String>,
    pub is_answered: bool,
    pub answered_at: Option<DateTime<Utc>>,
    /// 已脱敏
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

impl QnaResponse {
    pub fn from_model(m: mall_qna_entity::Model, author_name: &str) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            title: m.title,
            content: m.content,
            category: m.category,
            answer: m.answer,
            is_answered: m.is_answered,
            answered_at: m.answered_at,
            author_name: mask_name(author_name),
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_address() {
        let mut addr = ShippingAddress {
            recipient: None,
            phone: None,
            zip_code: "06236".into(),
            address: "서울 강남구 테헤란로 1".into(),
            address_detail: Some("101호".into()),
        };
        assert_eq!(addr.full_address(), "[06236] 서울 강남구 테헤란로 1 101호");
        addr.address_detail = Some("  ".into());
        assert_eq!(addr.full_address(), "[06236] 서울 강남구 테헤란로 1");
    }
}
