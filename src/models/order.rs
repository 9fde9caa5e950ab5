use crate::entities::{OrderStatus, order_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub order_number: String,
    pub customer_id: Option<i64>,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub orderer_name: Option<String>,
    pub contact_phone: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
    pub recipient_zip_code: Option<String>,
    pub recipient_addr: Option<String>,
    pub product_info: Option<String>,
    pub quantity: i32,
    pub base_price: i64,
    pub shipping_fee: i64,
    pub additional_fee: i64,
    pub total_amount: i64,
    pub order_source: Option<String>,
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    pub delivery_msg: Option<String>,
    pub gift_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<order_entity::Model> for OrderResponse {
    fn from(m: order_entity::Model) -> Self {
        Self {
            id: m.id,
            order_number: m.order_number,
            customer_id: m.customer_id,
            order_date: m.order_date,
            status: m.status,
            orderer_name: m.orderer_name,
            contact_phone: m.contact_phone,
            recipient_name: m.recipient_name,
            recipient_phone: m.recipient_phone,
            recipient_zip_code: m.recipient_zip_code,
            recipient_addr: m.recipient_addr,
            product_info: m.product_info,
            quantity: m.quantity,
            base_price: m.base_price,
            shipping_fee: m.shipping_fee,
            additional_fee: m.additional_fee,
            total_amount: m.total_amount,
            order_source: m.order_source,
            courier: m.courier,
            tracking_number: m.tracking_number,
            delivery_msg: m.delivery_msg,
            gift_sent: m.gift_sent,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// 订单列表筛选
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum OrderFilter {
    #[default]
    All,
    /// 尚未录入运单号
    PendingDelivery,
    WithTracking,
    Delivered,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct OrderListQuery {
    pub filter: Option<OrderFilter>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// 为空时自动生成 ORD-YYYYMMDD-XXXXXX
    pub order_number: Option<String>,
    pub customer_id: Option<i64>,
    pub order_date: Option<DateTime<Utc>>,
    pub status: Option<OrderStatus>,
    pub orderer_name: Option<String>,
    pub contact_phone: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
    pub recipient_zip_code: Option<String>,
    pub recipient_addr: Option<String>,
    pub product_info: Option<String>,
    pub quantity: Option<i32>,
    pub base_price: Option<i64>,
    pub shipping_fee: Option<i64>,
    pub additional_fee: Option<i64>,
    /// 为空时按 基础价 + 运费 + 附加费 计算
    pub total_amount: Option<i64>,
    pub order_source: Option<String>,
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    pub delivery_msg: Option<String>,
    pub gift_sent: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub customer_id: Option<i64>,
    pub order_date: Option<DateTime<Utc>>,
    pub status: Option<OrderStatus>,
    pub orderer_name: Option<String>,
    pub contact_phone: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
    pub recipient_zip_code: Option<String>,
    pub recipient_addr: Option<String>,
    pub product_info: Option<String>,
    pub quantity: Option<i32>,
    pub base_price: Option<i64>,
    pub shipping_fee: Option<i64>,
    pub additional_fee: Option<i64>,
    pub total_amount: Option<i64>,
    pub order_source: Option<String>,
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    pub delivery_msg: Option<String>,
    pub gift_sent: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTrackingRequest {
    pub courier: Option<String>,
    #[schema(example = "123456789012")]
    pub tracking_number: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClearTrackingRequest {
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearTrackingResponse {
    pub cleared: u64,
}

/// 配送状态统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DeliveryBuckets {
    pub total: u64,
    pub pending: u64,
    pub shipped: u64,
    pub delivered: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderStatsResponse {
    pub total: u64,
    pub pending: u64,
    /// 保留字段，始终为 0
    pub processing: u64,
    pub shipped: u64,
    pub delivered: u64,
    pub admin_orders: DeliveryBuckets,
    /// 仅总部账号返回商城订单统计
    pub mall_orders: Option<DeliveryBuckets>,
}

/// 同一收件人电话下的多条订单
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DuplicateOrderGroup {
    pub recipient_phone: String,
    pub count: u64,
    pub orders: Vec<OrderResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DuplicateOrdersResponse {
    pub groups: Vec<DuplicateOrderGroup>,
    pub total_groups: u64,
    pub total_orders: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkDeleteOrdersRequest {
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkDeleteOrdersResponse {
    pub deleted: u64,
}
