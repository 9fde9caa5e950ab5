use crate::config::MallConfig;
use crate::entities::{
    MallOrderStatus, coupon_entity as coupons, coupon_usage_entity as usages,
    mall_order_entity as orders, mall_qna_entity as qna, mall_user_coupon_entity as user_coupons,
    mall_user_entity as mall_users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::evaluate_coupon;
use crate::utils::{
    JwtService, format_kr_mobile, generate_mall_order_number, hash_password,
    validate_kr_mobile, validate_mall_password, verify_password,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use std::collections::HashMap;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const QNA_PUBLIC_LIMIT: u64 = 50;
const DEFAULT_QNA_CATEGORY: &str = "general";
/// 单笔订单金额上限（원），保证运费与累计消费的加法不会溢出
pub const MAX_ORDER_AMOUNT: i64 = 1_000_000_000_000;

fn amount_too_large() -> AppError {
    AppError::ValidationError("Order amount is too large".into())
}

/// 校验商品行并计算小计
pub fn checkout_subtotal(items: &[CheckoutItem]) -> AppResult<i64> {
    if items.is_empty() {
        return Err(AppError::ValidationError("Order has no items".into()));
    }
    let mut subtotal: i64 = 0;
    for item in items {
        if item.name.trim().is_empty() {
            return Err(AppError::ValidationError("Item name is required".into()));
        }
        if item.quantity < 1 {
            return Err(AppError::ValidationError(format!(
                "Quantity of '{}' must be at least 1",
                item.name
            )));
        }
        if item.price < 0 {
            return Err(AppError::ValidationError(format!(
                "Price of '{}' must be >= 0",
                item.name
            )));
        }
        subtotal = item
            .price
            .checked_mul(i64::from(item.quantity))
            .and_then(|line| subtotal.checked_add(line))
            .filter(|v| *v <= MAX_ORDER_AMOUNT)
            .ok_or_else(amount_too_large)?;
    }
    Ok(subtotal)
}

/// 满额免运费；折扣不超过小计
pub fn checkout_totals(subtotal: i64, discount: i64, config: &MallConfig) -> CheckoutTotals {
    let shipping_fee = if subtotal >= config.free_shipping_threshold {
        0
    } else {
        config.shipping_fee
    };
    let discount_amount = discount.clamp(0, subtotal);
    CheckoutTotals {
        subtotal,
        shipping_fee,
        discount_amount,
        total_amount: subtotal + shipping_fee - discount_amount,
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[derive(Clone)]
pub struct MallService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    config: MallConfig,
}

impl MallService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService, config: MallConfig) -> Self {
        Self {
            pool,
            jwt_service,
            config,
        }
    }

    pub async fn signup(&self, req: MallSignupRequest) -> AppResult<MallAuthResponse> {
        let name = req.name.trim();
        let email = req.email.trim().to_lowercase();
        if name.is_empty() || email.is_empty() || req.phone.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Name, email, phone and password are required".into(),
            ));
        }
        validate_kr_mobile(&req.phone)?;
        validate_mall_password(&req.password)?;

        let exists = mall_users::Entity::find()
            .filter(mall_users::Column::Email.eq(email.as_str()))
            .one(&self.pool)
            .await?;
        if exists.is_some() {
            return Err(AppError::Conflict("Email is already registered".into()));
        }

        let now = Utc::now();
        let user = mall_users::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email),
            phone: Set(format_kr_mobile(&req.phone)),
            password_hash: Set(hash_password(&req.password)?),
            total_spent: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        log::info!("Mall user {} signed up", user.id);

        self.auth_response(user)
    }

    pub async fn login(&self, req: MallLoginRequest) -> AppResult<MallAuthResponse> {
        let email = req.email.trim().to_lowercase();
        let user = mall_users::Entity::find()
            .filter(mall_users::Column::Email.eq(email))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError(INVALID_CREDENTIALS.to_string()))?;
        if !verify_password(&req.password, &user.password_hash)? {
            return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
        }
        self.auth_response(user)
    }

    fn auth_response(&self, user: mall_users::Model) -> AppResult<MallAuthResponse> {
        let token = self.jwt_service.generate_mall_token(user.id, &user.email)?;
        Ok(MallAuthResponse {
            user: user.into(),
            token,
            expires_in: self.jwt_service.get_mall_token_expires_in(),
        })
    }

    pub async fn profile(&self, user_id: i64) -> AppResult<MallUserResponse> {
        Ok(self.find_user(user_id).await?.into())
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        req: UpdateMallProfileRequest,
    ) -> AppResult<MallUserResponse> {
        let user = self.find_user(user_id).await?;
        let password_hash = match non_empty(req.new_password) {
            Some(new_password) => {
                let current = req.current_password.unwrap_or_default();
                if current.is_empty() {
                    return Err(AppError::ValidationError(
                        "Current password is required".into(),
                    ));
                }
                if !verify_password(&current, &user.password_hash)? {
                    return Err(AppError::ValidationError(
                        "Current password does not match".into(),
                    ));
                }
                validate_mall_password(&new_password)?;
                Some(hash_password(&new_password)?)
            }
            None => None,
        };

        let mut am = user.into_active_model();
        if let Some(name) = req.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::ValidationError("Name must not be empty".into()));
            }
            am.name = Set(name.to_string());
        }
        if let Some(phone) = req.phone {
            validate_kr_mobile(&phone)?;
            am.phone = Set(format_kr_mobile(&phone));
        }
        if let Some(hash) = password_hash {
            am.password_hash = Set(hash);
        }
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?.into())
    }

    pub async fn checkout(&self, user_id: i64, req: CheckoutRequest) -> AppResult<MallOrderResponse> {
        let user = self.find_user(user_id).await?;
        let subtotal = checkout_subtotal(&req.items)?;
        let addr = &req.shipping_address;
        if addr.zip_code.trim().is_empty() || addr.address.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Shipping address is required".into(),
            ));
        }

        let now = Utc::now();
        let txn = self.pool.begin().await?;

        let (coupon_pair, discount) = match req.user_coupon_id {
            Some(id) => {
                let (user_coupon, coupon) = self.usable_user_coupon(&txn, user.id, id).await?;
                let discount = evaluate_coupon(&coupon, now, subtotal, 0, None)
                    .map_err(|reason| AppError::ValidationError(reason.message()))?;
                (Some((user_coupon, coupon)), discount)
            }
            None => (None, 0),
        };
        let totals = checkout_totals(subtotal, discount, &self.config);

        let status = if req.is_demo {
            MallOrderStatus::Paid
        } else {
            MallOrderStatus::Pending
        };
        let order = orders::ActiveModel {
            order_number: Set(generate_mall_order_number(now)),
            user_id: Set(user.id),
            customer_name: Set(user.name.clone()),
            customer_email: Set(user.email.clone()),
            recipient_name: Set(non_empty(addr.recipient.clone()).unwrap_or_else(|| user.name.clone())),
            recipient_phone: Set(non_empty(addr.phone.clone())),
            recipient_zip: Set(addr.zip_code.trim().to_string()),
            recipient_addr: Set(addr.full_address()),
            delivery_msg: Set(non_empty(req.order_note)),
            status: Set(status),
            items: Set(serde_json::to_value(&req.items)?),
            subtotal: Set(totals.subtotal),
            shipping_fee: Set(totals.shipping_fee),
            discount_amount: Set(totals.discount_amount),
            total_amount: Set(totals.total_amount),
            user_coupon_id: Set(req.user_coupon_id),
            courier: Set(None),
            tracking_number: Set(None),
            paid_at: Set(req.is_demo.then_some(now)),
            cancelled_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some((user_coupon, coupon)) = coupon_pair {
            let mut uc = user_coupon.into_active_model();
            uc.is_used = Set(true);
            uc.used_at = Set(Some(now));
            uc.update(&txn).await?;

            let used_count = coupon.used_count;
            let coupon_id = coupon.id;
            let mut c = coupon.into_active_model();
            c.used_count = Set(used_count + 1);
            c.updated_at = Set(now);
            c.update(&txn).await?;

            usages::ActiveModel {
                coupon_id: Set(coupon_id),
                customer_id: Set(None),
                mall_user_id: Set(Some(user.id)),
                mall_order_id: Set(Some(order.id)),
                discount_amount: Set(totals.discount_amount),
                used_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        let total_spent = user.total_spent;
        let mut u = user.into_active_model();
        u.total_spent = Set(total_spent.saturating_add(totals.total_amount));
        u.updated_at = Set(now);
        u.update(&txn).await?;

        txn.commit().await?;
        log::info!(
            "Mall order {} placed by user {} (total {})",
            order.order_number,
            user_id,
            totals.total_amount
        );
        Ok(order.into())
    }

    async fn usable_user_coupon(
        &self,
        txn: &DatabaseTransaction,
        user_id: i64,
        user_coupon_id: i64,
    ) -> AppResult<(user_coupons::Model, coupons::Model)> {
        let user_coupon = user_coupons::Entity::find_by_id(user_coupon_id)
            .filter(user_coupons::Column::UserId.eq(user_id))
            .one(txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Coupon not found".into()))?;
        if user_coupon.is_used {
            return Err(AppError::ValidationError("Coupon has already been used".into()));
        }
        let coupon = coupons::Entity::find_by_id(user_coupon.coupon_id)
            .one(txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Coupon not found".into()))?;
        Ok((user_coupon, coupon))
    }

    pub async fn cancel(&self, user_id: i64, order_id: i64) -> AppResult<MallOrderResponse> {
        let order = orders::Entity::find_by_id(order_id)
            .filter(orders::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
        if !order.status.is_cancellable() {
            return Err(AppError::ValidationError(
                "Only pending or paid orders can be cancelled".into(),
            ));
        }

        let now = Utc::now();
        let txn = self.pool.begin().await?;

        if let Some(uc_id) = order.user_coupon_id {
            self.restore_coupon(&txn, uc_id, order.id).await?;
        }

        if let Some(user) = mall_users::Entity::find_by_id(user_id).one(&txn).await? {
            let total_spent = (user.total_spent - order.total_amount).max(0);
            let mut u = user.into_active_model();
            u.total_spent = Set(total_spent);
            u.updated_at = Set(now);
            u.update(&txn).await?;
        }

        let mut am = order.into_active_model();
        am.status = Set(MallOrderStatus::Cancelled);
        am.cancelled_at = Set(Some(now));
        am.updated_at = Set(now);
        let order = am.update(&txn).await?;

        txn.commit().await?;
        log::info!("Mall order {} cancelled by user {}", order.order_number, user_id);
        Ok(order.into())
    }

    async fn restore_coupon(
        &self,
        txn: &DatabaseTransaction,
        user_coupon_id: i64,
        order_id: i64,
    ) -> AppResult<()> {
        let Some(user_coupon) = user_coupons::Entity::find_by_id(user_coupon_id).one(txn).await? else {
            return Ok(());
        };
        let coupon_id = user_coupon.coupon_id;
        let mut uc = user_coupon.into_active_model();
        uc.is_used = Set(false);
        uc.used_at = Set(None);
        uc.update(txn).await?;

        if let Some(coupon) = coupons::Entity::find_by_id(coupon_id).one(txn).await? {
            let used_count = (coupon.used_count - 1).max(0);
            let mut c = coupon.into_active_model();
            c.used_count = Set(used_count);
            c.updated_at = Set(Utc::now());
            c.update(txn).await?;
        }
        usages::Entity::delete_many()
            .filter(usages::Column::MallOrderId.eq(order_id))
            .exec(txn)
            .await?;
        Ok(())
    }

    pub async fn my_orders(&self, user_id: i64) -> AppResult<Vec<MallOrderResponse>> {
        let list = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn my_order(&self, user_id: i64, order_id: i64) -> AppResult<MallOrderResponse> {
        orders::Entity::find_by_id(order_id)
            .filter(orders::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Order not found".into()))
    }

    pub async fn my_stats(&self, user_id: i64) -> AppResult<MallStatsResponse> {
        let user = self.find_user(user_id).await?;
        let order_count = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .count(&self.pool)
            .await?;

        let now = Utc::now();
        let unused = user_coupons::Entity::find()
            .filter(user_coupons::Column::UserId.eq(user_id))
            .filter(user_coupons::Column::IsUsed.eq(false))
            .all(&self.pool)
            .await?;
        let coupon_count = if unused.is_empty() {
            0
        } else {
            coupons::Entity::find()
                .filter(coupons::Column::Id.is_in(unused.iter().map(|uc| uc.coupon_id)))
                .all(&self.pool)
                .await?
                .into_iter()
                .filter(|c| c.is_live_at(now))
                .map(|c| unused.iter().filter(|uc| uc.coupon_id == c.id).count() as u64)
                .sum()
        };

        Ok(MallStatsResponse {
            order_count,
            total_spent: user.total_spent,
            coupon_count,
        })
    }

    pub async fn admin_orders(
        &self,
        query: &MallOrderListQuery,
    ) -> AppResult<PaginatedResponse<MallOrderResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let mut select = orders::Entity::find();
        if let Some(status) = query.status {
            select = select.filter(orders::Column::Status.eq(status));
        }
        let total = select.clone().count(&self.pool).await?;
        let list = select
            .order_by_desc(orders::Column::CreatedAt)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?;
        Ok(PaginatedResponse::new(
            list.into_iter().map(Into::into).collect(),
            &params,
            total,
        ))
    }

    pub async fn admin_update_order(
        &self,
        order_id: i64,
        req: UpdateMallOrderRequest,
    ) -> AppResult<MallOrderResponse> {
        let order = orders::Entity::find_by_id(order_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
        let now = Utc::now();
        let paid_at = order.paid_at;
        let cancelled_at = order.cancelled_at;
        let mut am = order.into_active_model();
        if let Some(status) = req.status {
            am.status = Set(status);
            match status {
                MallOrderStatus::Paid if paid_at.is_none() => am.paid_at = Set(Some(now)),
                MallOrderStatus::Cancelled if cancelled_at.is_none() => {
                    am.cancelled_at = Set(Some(now))
                }
                _ => {}
            }
        }
        if let Some(courier) = req.courier {
            am.courier = Set(non_empty(Some(courier)));
        }
        if let Some(tracking) = req.tracking_number {
            am.tracking_number = Set(non_empty(Some(tracking)));
        }
        am.updated_at = Set(now);
        let order = am.update(&self.pool).await?;
        log::info!("Mall order {} updated to {:?}", order.order_number, order.status);
        Ok(order.into())
    }

    pub async fn admin_users(
        &self,
        query: &MallUserListQuery,
    ) -> AppResult<PaginatedResponse<MallUserResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let mut select = mall_users::Entity::find();
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(mall_users::Column::Name.contains(search))
                    .add(mall_users::Column::Email.contains(search))
                    .add(mall_users::Column::Phone.contains(search)),
            );
        }
        let total = select.clone().count(&self.pool).await?;
        let list = select
            .order_by_desc(mall_users::Column::CreatedAt)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?;
        Ok(PaginatedResponse::new(
            list.into_iter().map(Into::into).collect(),
            &params,
            total,
        ))
    }

    pub async fn public_qna(&self) -> AppResult<Vec<QnaResponse>> {
        let list = qna::Entity::find()
            .order_by_desc(qna::Column::CreatedAt)
            .limit(QNA_PUBLIC_LIMIT)
            .all(&self.pool)
            .await?;
        self.decorate_qna(list).await
    }

    /// 后台问答列表，可按是否已回答筛选
    pub async fn admin_qna(&self, answered: Option<bool>) -> AppResult<Vec<QnaResponse>> {
        let mut select = qna::Entity::find();
        if let Some(answered) = answered {
            select = select.filter(qna::Column::IsAnswered.eq(answered));
        }
        let list = select
            .order_by_desc(qna::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        self.decorate_qna(list).await
    }

    pub async fn create_qna(&self, user_id: i64, req: CreateQnaRequest) -> AppResult<QnaResponse> {
        let title = req.title.trim();
        let content = req.content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(AppError::ValidationError(
                "Title and content are required".into(),
            ));
        }
        let user = self.find_user(user_id).await?;
        let now = Utc::now();
        let question = qna::ActiveModel {
            user_id: Set(user.id),
            product_id: Set(req.product_id),
            title: Set(title.to_string()),
            content: Set(content.to_string()),
            category: Set(non_empty(req.category).unwrap_or_else(|| DEFAULT_QNA_CATEGORY.to_string())),
            answer: Set(None),
            answered_by: Set(None),
            answered_at: Set(None),
            is_answered: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(QnaResponse::from_model(question, &user.name))
    }

    pub async fn answer_qna(
        &self,
        staff_id: i64,
        qna_id: i64,
        req: AnswerQnaRequest,
    ) -> AppResult<QnaResponse> {
        let answer = req.answer.trim();
        if answer.is_empty() {
            return Err(AppError::ValidationError("Answer is required".into()));
        }
        let question = qna::Entity::find_by_id(qna_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Question not found".into()))?;
        let now = Utc::now();
        let mut am = question.into_active_model();
        am.answer = Set(Some(answer.to_string()));
        am.answered_by = Set(Some(staff_id));
        am.answered_at = Set(Some(now));
        am.is_answered = Set(true);
        am.updated_at = Set(now);
        let question = am.update(&self.pool).await?;
        let mut decorated = self.decorate_qna(vec![question]).await?;
        decorated
            .pop()
            .ok_or_else(|| AppError::InternalError("Answered question vanished".into()))
    }

    async fn decorate_qna(&self, list: Vec<qna::Model>) -> AppResult<Vec<QnaResponse>> {
        let ids: Vec<i64> = list.iter().map(|q| q.user_id).collect();
        let names: HashMap<i64, String> = if ids.is_empty() {
            HashMap::new()
        } else {
            mall_users::Entity::find()
                .filter(mall_users::Column::Id.is_in(ids))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|u| (u.id, u.name))
                .collect()
        };
        Ok(list
            .into_iter()
            .map(|q| {
                let name = names.get(&q.user_id).map(String::as_str).unwrap_or_default();
                QnaResponse::from_model(q, name)
            })
            .collect())
    }

    async fn find_user(&self, user_id: i64) -> AppResult<mall_users::Model> {
        mall_users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: i64, quantity: i32) -> CheckoutItem {
        CheckoutItem {
            product_id: Some(1),
            name: "유기농 쌀 10kg".into(),
            price,
            quantity,
            option: None,
        }
    }

    #[test]
    fn test_checkout_subtotal() {
        assert_eq!(checkout_subtotal(&[item(12_000, 2), item(3_500, 1)]).unwrap(), 27_500);
        assert!(checkout_subtotal(&[]).is_err());
        assert!(checkout_subtotal(&[item(1_000, 0)]).is_err());
        assert!(checkout_subtotal(&[item(-1, 1)]).is_err());
        assert_eq!(checkout_subtotal(&[item(0, 3)]).unwrap(), 0);
    }

    #[test]
    fn test_checkout_subtotal_rejects_overflowing_amounts() {
        let err = checkout_subtotal(&[item(i64::MAX / 2, 3)]).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref m) if m == "Order amount is too large"));
        assert!(checkout_subtotal(&[item(i64::MAX, 1), item(1, 1)]).is_err());
        assert!(checkout_subtotal(&[item(MAX_ORDER_AMOUNT, 1), item(1, 1)]).is_err());
        assert_eq!(checkout_subtotal(&[item(MAX_ORDER_AMOUNT, 1)]).unwrap(), MAX_ORDER_AMOUNT);
        // 上限内的小计加上运费也不会溢出
        let t = checkout_totals(MAX_ORDER_AMOUNT, 0, &MallConfig::default());
        assert_eq!(t.total_amount, MAX_ORDER_AMOUNT);
    }

    #[test]
    fn test_checkout_totals_shipping_threshold() {
        let config = MallConfig::default();
        let below = checkout_totals(49_999, 0, &config);
        assert_eq!(below.shipping_fee, 3_000);
        assert_eq!(below.total_amount, 52_999);

        let at = checkout_totals(50_000, 5_000, &config);
        assert_eq!(at.shipping_fee, 0);
        assert_eq!(at.discount_amount, 5_000);
        assert_eq!(at.total_amount, 45_000);
    }

    #[test]
    fn test_checkout_totals_discount_capped_by_subtotal() {
        let config = MallConfig {
            shipping_fee: 2_500,
            free_shipping_threshold: 30_000,
        };
        let t = checkout_totals(10_000, 15_000, &config);
        assert_eq!(t.discount_amount, 10_000);
        assert_eq!(t.total_amount, 2_500);
    }
}
