use crate::entities::{MallOrderStatus, OrderStatus, mall_order_entity as mall_orders, order_entity as orders};
use crate::error::{AppError, AppResult};
use crate::middlewares::StaffIdentity;
use crate::models::*;
use crate::utils::{generate_order_number, kr_phone_key};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use std::collections::BTreeMap;

/// 合作方账号只能看到自己来源的订单
pub(crate) fn scoped(query: Select<orders::Entity>, staff: &StaffIdentity) -> Select<orders::Entity> {
    match &staff.partner {
        Some(partner) => query.filter(orders::Column::OrderSource.eq(partner.clone())),
        None => query,
    }
}

fn no_tracking() -> Condition {
    Condition::any()
        .add(orders::Column::TrackingNumber.is_null())
        .add(orders::Column::TrackingNumber.eq(""))
}

fn apply_filter(query: Select<orders::Entity>, filter: OrderFilter) -> Select<orders::Entity> {
    match filter {
        OrderFilter::All => query,
        OrderFilter::PendingDelivery => query.filter(no_tracking()),
        OrderFilter::WithTracking => query.filter(no_tracking().not()),
        OrderFilter::Delivered => query.filter(orders::Column::Status.eq(OrderStatus::Delivered)),
    }
}

fn apply_search(query: Select<orders::Entity>, search: Option<&str>) -> Select<orders::Entity> {
    let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) else {
        return query;
    };
    query.filter(
        Condition::any()
            .add(orders::Column::OrderNumber.contains(term))
            .add(orders::Column::OrdererName.contains(term))
            .add(orders::Column::RecipientName.contains(term))
            .add(orders::Column::ContactPhone.contains(term))
            .add(orders::Column::RecipientPhone.contains(term))
            .add(orders::Column::ProductInfo.contains(term)),
    )
}

fn trimmed(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn check_amount(name: &str, v: Option<i64>) -> AppResult<()> {
    if v.is_some_and(|n| n < 0) {
        return Err(AppError::ValidationError(format!("{name} must be >= 0")));
    }
    Ok(())
}

/// 新订单的字段校验
pub fn validate_new_order(req: &CreateOrderRequest) -> AppResult<()> {
    let has_name = [&req.recipient_name, &req.orderer_name]
        .iter()
        .any(|n| n.as_deref().is_some_and(|s| !s.trim().is_empty()));
    if !has_name {
        return Err(AppError::ValidationError(
            "Recipient or orderer name is required".into(),
        ));
    }
    if req.quantity.is_some_and(|q| q < 1) {
        return Err(AppError::ValidationError("Quantity must be at least 1".into()));
    }
    check_amount("base_price", req.base_price)?;
    check_amount("shipping_fee", req.shipping_fee)?;
    check_amount("additional_fee", req.additional_fee)?;
    check_amount("total_amount", req.total_amount)?;
    Ok(())
}

/// 未提供总额时按 基础价 + 运费 + 附加费 计算
pub fn resolve_total(
    base: i64,
    shipping: i64,
    additional: i64,
    declared: Option<i64>,
) -> AppResult<i64> {
    match declared {
        Some(total) => Ok(total),
        None => base
            .checked_add(shipping)
            .and_then(|v| v.checked_add(additional))
            .ok_or_else(|| AppError::ValidationError("Order amount is too large".into())),
    }
}

/// 每条订单只落入一个配送状态：已送达 > 已发货(有运单号) > 待发货
pub fn bucket_orders<I>(rows: I) -> DeliveryBuckets
where
    I: IntoIterator<Item = (bool, bool)>,
{
    let mut b = DeliveryBuckets::default();
    for (has_tracking, delivered) in rows {
        b.total += 1;
        if delivered {
            b.delivered += 1;
        } else if has_tracking {
            b.shipped += 1;
        } else {
            b.pending += 1;
        }
    }
    b
}

/// 按收件人电话分组，只保留两条以上的组；组按订单数降序、电话升序，组内按下单时间降序
pub fn group_duplicates(rows: Vec<orders::Model>) -> Vec<DuplicateOrderGroup> {
    let mut by_phone: BTreeMap<String, (String, Vec<orders::Model>)> = BTreeMap::new();
    for order in rows {
        let Some(key) = order.recipient_phone.as_deref().and_then(kr_phone_key) else {
            continue;
        };
        let entry = by_phone
            .entry(key)
            .or_insert_with(|| (order.recipient_phone.clone().unwrap_or_default(), Vec::new()));
        entry.1.push(order);
    }

    let mut groups: Vec<DuplicateOrderGroup> = by_phone
        .into_values()
        .filter(|(_, list)| list.len() > 1)
        .map(|(phone, mut list)| {
            list.sort_by(|a, b| b.order_date.cmp(&a.order_date).then(b.id.cmp(&a.id)));
            DuplicateOrderGroup {
                recipient_phone: phone,
                count: list.len() as u64,
                orders: list.into_iter().map(OrderResponse::from).collect(),
            }
        })
        .collect();
    groups.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.recipient_phone.cmp(&b.recipient_phone))
    });
    groups
}

#[derive(Clone)]
pub struct OrderService {
    pool: DatabaseConnection,
}

impl OrderService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        staff: &StaffIdentity,
        query: &OrderListQuery,
    ) -> AppResult<PaginatedResponse<OrderResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let select = self.filtered(staff, query.filter.unwrap_or_default(), query.search.as_deref());

        let total = select.clone().count(&self.pool).await?;
        let list = select
            .order_by_desc(orders::Column::OrderDate)
            .order_by_desc(orders::Column::Id)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?;

        let items = list.into_iter().map(OrderResponse::from).collect();
        Ok(PaginatedResponse::new(items, &params, total))
    }

    /// 不分页的筛选结果（导出用）
    pub async fn list_all(
        &self,
        staff: &StaffIdentity,
        filter: OrderFilter,
        search: Option<&str>,
    ) -> AppResult<Vec<orders::Model>> {
        Ok(self
            .filtered(staff, filter, search)
            .order_by_desc(orders::Column::OrderDate)
            .all(&self.pool)
            .await?)
    }

    fn filtered(
        &self,
        staff: &StaffIdentity,
        filter: OrderFilter,
        search: Option<&str>,
    ) -> Select<orders::Entity> {
        let select = scoped(orders::Entity::find(), staff);
        apply_search(apply_filter(select, filter), search)
    }

    async fn find_scoped(&self, staff: &StaffIdentity, id: i64) -> AppResult<orders::Model> {
        scoped(orders::Entity::find_by_id(id), staff)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))
    }

    pub async fn get(&self, staff: &StaffIdentity, id: i64) -> AppResult<OrderResponse> {
        Ok(self.find_scoped(staff, id).await?.into())
    }

    pub async fn create(
        &self,
        staff: &StaffIdentity,
        req: CreateOrderRequest,
    ) -> AppResult<OrderResponse> {
        validate_new_order(&req)?;

        let now = Utc::now();
        let base_price = req.base_price.unwrap_or(0);
        let shipping_fee = req.shipping_fee.unwrap_or(0);
        let additional_fee = req.additional_fee.unwrap_or(0);
        // 合作方账号创建的订单强制归属该合作方
        let order_source = match &staff.partner {
            Some(p) => Some(p.clone()),
            None => trimmed(req.order_source),
        };
        let order_number = trimmed(req.order_number).unwrap_or_else(|| generate_order_number(now));

        let exists = orders::Entity::find()
            .filter(orders::Column::OrderNumber.eq(order_number.clone()))
            .count(&self.pool)
            .await?;
        if exists > 0 {
            return Err(AppError::Conflict(format!(
                "Order number {order_number} already exists"
            )));
        }

        let total_amount = resolve_total(base_price, shipping_fee, additional_fee, req.total_amount)?;
        let order = orders::ActiveModel {
            order_number: Set(order_number),
            customer_id: Set(req.customer_id),
            order_date: Set(req.order_date.unwrap_or(now)),
            status: Set(req.status.unwrap_or(OrderStatus::Pending)),
            orderer_name: Set(trimmed(req.orderer_name)),
            contact_phone: Set(trimmed(req.contact_phone)),
            recipient_name: Set(trimmed(req.recipient_name)),
            recipient_phone: Set(trimmed(req.recipient_phone)),
            recipient_zip_code: Set(trimmed(req.recipient_zip_code)),
            recipient_addr: Set(trimmed(req.recipient_addr)),
            product_info: Set(trimmed(req.product_info)),
            quantity: Set(req.quantity.unwrap_or(1)),
            base_price: Set(base_price),
            shipping_fee: Set(shipping_fee),
            additional_fee: Set(additional_fee),
            total_amount: Set(total_amount),
            order_source: Set(order_source),
            courier: Set(trimmed(req.courier)),
            tracking_number: Set(trimmed(req.tracking_number)),
            delivery_msg: Set(trimmed(req.delivery_msg)),
            gift_sent: Set(req.gift_sent.unwrap_or(false)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Order {} created by staff {}", order.order_number, staff.user_id);
        Ok(order.into())
    }

    pub async fn update(
        &self,
        staff: &StaffIdentity,
        id: i64,
        req: UpdateOrderRequest,
    ) -> AppResult<OrderResponse> {
        if req.quantity.is_some_and(|q| q < 1) {
            return Err(AppError::ValidationError("Quantity must be at least 1".into()));
        }
        check_amount("base_price", req.base_price)?;
        check_amount("shipping_fee", req.shipping_fee)?;
        check_amount("additional_fee", req.additional_fee)?;
        check_amount("total_amount", req.total_amount)?;

        let order = self.find_scoped(staff, id).await?;
        let mut am = order.into_active_model();

        macro_rules! set_opt_text {
            ($($field:ident),*) => {
                $(if let Some(v) = req.$field {
                    am.$field = Set(trimmed(Some(v)));
                })*
            };
        }
        set_opt_text!(
            orderer_name,
            contact_phone,
            recipient_name,
            recipient_phone,
            recipient_zip_code,
            recipient_addr,
            product_info,
            courier,
            tracking_number,
            delivery_msg
        );

        if let Some(v) = req.customer_id {
            am.customer_id = Set(Some(v));
        }
        if let Some(v) = req.order_date {
            am.order_date = Set(v);
        }
        if let Some(v) = req.status {
            am.status = Set(v);
        }
        if let Some(v) = req.quantity {
            am.quantity = Set(v);
        }
        if let Some(v) = req.base_price {
            am.base_price = Set(v);
        }
        if let Some(v) = req.shipping_fee {
            am.shipping_fee = Set(v);
        }
        if let Some(v) = req.additional_fee {
            am.additional_fee = Set(v);
        }
        if let Some(v) = req.total_amount {
            am.total_amount = Set(v);
        }
        if let Some(v) = req.gift_sent {
            am.gift_sent = Set(v);
        }
        // 合作方账号不能把订单改到其他合作方
        if staff.is_headquarters() {
            if let Some(v) = req.order_source {
                am.order_source = Set(trimmed(Some(v)));
            }
        }
        am.updated_at = Set(Utc::now());

        Ok(am.update(&self.pool).await?.into())
    }

    pub async fn update_status(
        &self,
        staff: &StaffIdentity,
        id: i64,
        status: OrderStatus,
    ) -> AppResult<OrderResponse> {
        let order = self.find_scoped(staff, id).await?;
        let mut am = order.into_active_model();
        am.status = Set(status);
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?.into())
    }

    pub async fn update_tracking(
        &self,
        staff: &StaffIdentity,
        id: i64,
        req: UpdateTrackingRequest,
    ) -> AppResult<OrderResponse> {
        let tracking = req.tracking_number.trim().to_string();
        if tracking.is_empty() {
            return Err(AppError::ValidationError("Tracking number is required".into()));
        }
        let order = self.find_scoped(staff, id).await?;
        let mut am = order.into_active_model();
        am.tracking_number = Set(Some(tracking));
        if req.courier.is_some() {
            am.courier = Set(trimmed(req.courier));
        }
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?.into())
    }

    /// 批量清除运单号与快递公司
    pub async fn clear_tracking(&self, staff: &StaffIdentity, ids: &[i64]) -> AppResult<u64> {
        if ids.is_empty() {
            return Err(AppError::ValidationError("No orders selected".into()));
        }
        let mut update = orders::Entity::update_many()
            .col_expr(orders::Column::TrackingNumber, Expr::value(Option::<String>::None))
            .col_expr(orders::Column::Courier, Expr::value(Option::<String>::None))
            .col_expr(orders::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(orders::Column::Id.is_in(ids.iter().copied()));
        if let Some(partner) = &staff.partner {
            update = update.filter(orders::Column::OrderSource.eq(partner.clone()));
        }
        let res = update.exec(&self.pool).await?;
        log::info!(
            "Tracking cleared on {} order(s) by staff {}",
            res.rows_affected,
            staff.user_id
        );
        Ok(res.rows_affected)
    }

    pub async fn delete(&self, staff: &StaffIdentity, id: i64) -> AppResult<()> {
        let order = self.find_scoped(staff, id).await?;
        orders::Entity::delete_by_id(order.id).exec(&self.pool).await?;
        log::info!("Order {} deleted by staff {}", order.order_number, staff.user_id);
        Ok(())
    }

    /// 收件人电话重复的订单
    pub async fn duplicates(&self, staff: &StaffIdentity) -> AppResult<DuplicateOrdersResponse> {
        let rows = scoped(orders::Entity::find(), staff)
            .filter(orders::Column::RecipientPhone.is_not_null())
            .filter(orders::Column::RecipientPhone.ne(""))
            .all(&self.pool)
            .await?;
        let groups = group_duplicates(rows);
        Ok(DuplicateOrdersResponse {
            total_groups: groups.len() as u64,
            total_orders: groups.iter().map(|g| g.count).sum(),
            groups,
        })
    }

    /// 批量删除，合作方账号只能删除自己来源的订单
    pub async fn bulk_delete(&self, staff: &StaffIdentity, ids: &[i64]) -> AppResult<u64> {
        if ids.is_empty() {
            return Err(AppError::ValidationError("No orders selected".into()));
        }
        let mut delete = orders::Entity::delete_many().filter(orders::Column::Id.is_in(ids.iter().copied()));
        if let Some(partner) = &staff.partner {
            delete = delete.filter(orders::Column::OrderSource.eq(partner.clone()));
        }
        let res = delete.exec(&self.pool).await?;
        log::info!(
            "{} order(s) deleted in bulk by staff {}",
            res.rows_affected,
            staff.user_id
        );
        Ok(res.rows_affected)
    }

    pub async fn stats(&self, staff: &StaffIdentity) -> AppResult<OrderStatsResponse> {
        let admin_rows = scoped(orders::Entity::find(), staff).all(&self.pool).await?;
        let admin = bucket_orders(
            admin_rows
                .iter()
                .map(|o| (o.has_tracking(), o.status == OrderStatus::Delivered)),
        );

        let mall = if staff.is_headquarters() {
            let rows = mall_orders::Entity::find().all(&self.pool).await?;
            Some(bucket_orders(rows.iter().map(|o| {
                let has_tracking = o
                    .tracking_number
                    .as_deref()
                    .is_some_and(|t| !t.trim().is_empty());
                (
                    has_tracking || o.status == MallOrderStatus::Shipped,
                    o.status == MallOrderStatus::Delivered,
                )
            })))
        } else {
            None
        };

        let combined = mall.unwrap_or_default();
        Ok(OrderStatsResponse {
            total: admin.total + combined.total,
            pending: admin.pending + combined.pending,
            processing: 0,
            shipped: admin.shipped + combined.shipped,
            delivered: admin.delivered + combined.delivered,
            admin_orders: admin,
            mall_orders: mall,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn order_to(id: i64, phone: Option<&str>, days_ago: i64) -> orders::Model {
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 3, 0, 0).unwrap() - Duration::days(days_ago);
        orders::Model {
            id,
            order_number: format!("ORD-{id}"),
            customer_id: None,
            order_date: at,
            status: OrderStatus::Pending,
            orderer_name: None,
            contact_phone: None,
            recipient_name: Some("홍길동".into()),
            recipient_phone: phone.map(str::to_string),
            recipient_zip_code: None,
            recipient_addr: None,
            product_info: None,
            quantity: 1,
            base_price: 10_000,
            shipping_fee: 0,
            additional_fee: 0,
            total_amount: 10_000,
            order_source: None,
            courier: None,
            tracking_number: None,
            delivery_msg: None,
            gift_sent: false,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_group_duplicates_by_recipient_phone() {
        let rows = vec![
            order_to(1, Some("010-1111-2222"), 3),
            order_to(2, Some("01011112222"), 1),
            order_to(3, Some("010-3333-4444"), 0),
            order_to(4, Some("02-123-4567"), 5),
            order_to(5, Some("02-123-4567"), 2),
            order_to(6, Some("02-123-4567"), 4),
            order_to(7, Some("없음"), 0),
            order_to(8, Some("없음"), 0),
            order_to(9, None, 0),
        ];
        let groups = group_duplicates(rows);
        // 非电话号码的值不参与分组
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].recipient_phone, "02-123-4567");
        assert_eq!(groups[0].count, 3);
        let ids: Vec<i64> = groups[0].orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![5, 6, 4]);

        // 带不带连字符视为同一号码
        assert_eq!(groups[1].count, 2);
        let ids: Vec<i64> = groups[1].orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_group_duplicates_ties_sorted_by_phone() {
        let rows = vec![
            order_to(1, Some("010-9999-0000"), 0),
            order_to(2, Some("010-9999-0000"), 1),
            order_to(3, Some("010-1111-0000"), 0),
            order_to(4, Some("010-1111-0000"), 1),
        ];
        let groups = group_duplicates(rows);
        assert_eq!(groups[0].recipient_phone, "010-1111-0000");
        assert_eq!(groups[1].recipient_phone, "010-9999-0000");
        assert!(group_duplicates(vec![order_to(1, Some("010-1111-0000"), 0)]).is_empty());
    }

    #[test]
    fn test_bucket_orders_partitions_every_row() {
        let rows = vec![
            (false, false), // pending
            (true, false),  // shipped
            (true, true),   // delivered
            (false, true),  // delivered without tracking
            (false, false),
        ];
        let b = bucket_orders(rows);
        assert_eq!(b.total, 5);
        assert_eq!(b.pending, 2);
        assert_eq!(b.shipped, 1);
        assert_eq!(b.delivered, 2);
        assert_eq!(b.pending + b.shipped + b.delivered, b.total);
    }

    #[test]
    fn test_validate_new_order() {
        let ok = CreateOrderRequest {
            recipient_name: Some("홍길동".into()),
            quantity: Some(2),
            base_price: Some(10000),
            ..Default::default()
        };
        assert!(validate_new_order(&ok).is_ok());

        let orderer_only = CreateOrderRequest {
            orderer_name: Some("김철수".into()),
            ..Default::default()
        };
        assert!(validate_new_order(&orderer_only).is_ok());

        let no_name = CreateOrderRequest {
            recipient_name: Some("   ".into()),
            ..Default::default()
        };
        assert!(validate_new_order(&no_name).is_err());

        let zero_qty = CreateOrderRequest {
            quantity: Some(0),
            ..ok.clone()
        };
        assert!(validate_new_order(&zero_qty).is_err());

        let negative = CreateOrderRequest {
            shipping_fee: Some(-1),
            ..ok
        };
        assert!(validate_new_order(&negative).is_err());
    }

    #[test]
    fn test_resolve_total() {
        assert_eq!(resolve_total(10000, 3000, 500, None).unwrap(), 13500);
        assert_eq!(resolve_total(10000, 3000, 500, Some(9000)).unwrap(), 9000);
    }

    #[test]
    fn test_resolve_total_overflow_is_a_validation_error() {
        let err = resolve_total(i64::MAX, 1, 0, None).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(resolve_total(i64::MAX - 1, 0, 2, None).is_err());
        assert_eq!(resolve_total(i64::MAX, 1, 0, Some(100)).unwrap(), 100);
    }
}
