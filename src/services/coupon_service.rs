use crate::entities::{
    DiscountType, coupon_entity as coupons, coupon_usage_entity as usages,
    customer_entity as customers, mall_user_coupon_entity as user_coupons,
    mall_user_entity as mall_users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::generate_coupon_code;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};

/// 优惠券不可用的原因，按校验顺序排列
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponRejection {
    Inactive,
    NotYetValid(DateTime<Utc>),
    Expired,
    UsageLimitReached,
    AlreadyUsed,
    BelowMinimum(i64),
    NotTargeted,
}

impl CouponRejection {
    pub fn message(&self) -> String {
        match self {
            CouponRejection::Inactive => "This coupon is inactive".to_string(),
            CouponRejection::NotYetValid(from) => format!(
                "This coupon is not valid yet (usable from {})",
                from.format("%Y-%m-%d")
            ),
            CouponRejection::Expired => "This coupon has expired".to_string(),
            CouponRejection::UsageLimitReached => "This coupon has reached its usage limit".to_string(),
            CouponRejection::AlreadyUsed => "This coupon has already been used".to_string(),
            CouponRejection::BelowMinimum(min) => {
                format!("Minimum order amount is {min} KRW")
            }
            CouponRejection::NotTargeted => "This coupon is not available for this customer".to_string(),
        }
    }
}

/// 校验时需要的客户维度信息
#[derive(Debug, Clone, Default)]
pub struct CouponAudience<'a> {
    pub customer_id: Option<i64>,
    pub segment: Option<&'a str>,
    pub grade: Option<&'a str>,
}

/// 折扣金额: PERCENT 向下取整并受最大折扣限制；FIXED 不超过订单金额
pub fn discount_for(coupon: &coupons::Model, order_amount: i64) -> i64 {
    let amount = order_amount.max(0);
    match coupon.discount_type {
        DiscountType::Percent => {
            let raw = (amount as f64 * coupon.discount_value / 100.0).floor() as i64;
            match coupon.max_discount_amount {
                Some(cap) if raw > cap => cap,
                _ => raw,
            }
        }
        DiscountType::Fixed => (coupon.discount_value.floor() as i64).min(amount),
    }
}

/// 依次检查: 启用、生效时间、过期、总次数、客户次数、最低金额、目标分群、指定客户。
/// audience 为 None 时跳过分群与指定客户检查（商城会员券）
pub fn evaluate_coupon(
    coupon: &coupons::Model,
    now: DateTime<Utc>,
    order_amount: i64,
    customer_usage: u64,
    audience: Option<&CouponAudience<'_>>,
) -> Result<i64, CouponRejection> {
    if !coupon.is_active {
        return Err(CouponRejection::Inactive);
    }
    if now < coupon.valid_from {
        return Err(CouponRejection::NotYetValid(coupon.valid_from));
    }
    if now > coupon.valid_until {
        return Err(CouponRejection::Expired);
    }
    if coupon
        .usage_limit
        .is_some_and(|limit| limit > 0 && coupon.used_count >= limit)
    {
        return Err(CouponRejection::UsageLimitReached);
    }
    if customer_usage >= coupon.usage_per_customer.max(1) as u64 {
        return Err(CouponRejection::AlreadyUsed);
    }
    if let Some(min) = coupon.min_order_amount {
        if order_amount < min {
            return Err(CouponRejection::BelowMinimum(min));
        }
    }
    if let Some(audience) = audience {
        if let Some(target) = coupon.target_segment.as_deref() {
            let matches = audience.segment == Some(target) || audience.grade == Some(target);
            if !matches {
                return Err(CouponRejection::NotTargeted);
            }
        }
        if let Some(list) = coupon
            .target_customers
            .as_ref()
            .and_then(|v| serde_json::from_value::<Vec<i64>>(v.clone()).ok())
        {
            let included = audience.customer_id.is_some_and(|id| list.contains(&id));
            if !included {
                return Err(CouponRejection::NotTargeted);
            }
        }
    }
    Ok(discount_for(coupon, order_amount))
}

/// 核销时的规则检查，不通过时以原因作为校验错误返回
pub fn redemption_discount(
    coupon: &coupons::Model,
    now: DateTime<Utc>,
    order_amount: i64,
    customer_usage: u64,
    audience: &CouponAudience<'_>,
) -> AppResult<i64> {
    evaluate_coupon(coupon, now, order_amount, customer_usage, Some(audience))
        .map_err(|reason| AppError::ValidationError(reason.message()))
}

fn validate_new_coupon(req: &CreateCouponRequest) -> AppResult<()> {
    if req.name.trim().is_empty() {
        return Err(AppError::ValidationError("Coupon name is required".into()));
    }
    match req.discount_type.unwrap_or(DiscountType::Percent) {
        DiscountType::Percent if !(req.discount_value > 0.0 && req.discount_value <= 100.0) => {
            return Err(AppError::ValidationError(
                "Percent discount must be greater than 0 and at most 100".into(),
            ));
        }
        DiscountType::Fixed if req.discount_value <= 0.0 => {
            return Err(AppError::ValidationError(
                "Fixed discount must be greater than 0".into(),
            ));
        }
        _ => {}
    }
    if req.valid_until <= req.valid_from {
        return Err(AppError::ValidationError(
            "valid_until must be after valid_from".into(),
        ));
    }
    for (field, v) in [
        ("min_order_amount", req.min_order_amount),
        ("max_discount_amount", req.max_discount_amount),
    ] {
        if v.is_some_and(|n| n < 0) {
            return Err(AppError::ValidationError(format!("{field} must be >= 0")));
        }
    }
    if req.usage_limit.is_some_and(|n| n < 1) || req.usage_per_customer.is_some_and(|n| n < 1) {
        return Err(AppError::ValidationError(
            "Usage limits must be at least 1".into(),
        ));
    }
    Ok(())
}

pub fn user_coupon_response(
    uc: user_coupons::Model,
    coupon: coupons::Model,
    now: DateTime<Utc>,
) -> UserCouponResponse {
    let is_expired = coupon.valid_until < now;
    UserCouponResponse {
        is_usable: !uc.is_used && coupon.is_live_at(now),
        id: uc.id,
        coupon_id: coupon.id,
        code: coupon.code,
        name: coupon.name,
        description: coupon.description,
        discount_type: coupon.discount_type,
        discount_value: coupon.discount_value,
        min_order_amount: coupon.min_order_amount,
        max_discount_amount: coupon.max_discount_amount,
        valid_from: coupon.valid_from,
        valid_until: coupon.valid_until,
        is_used: uc.is_used,
        used_at: uc.used_at,
        is_expired,
        issued_at: uc.created_at,
    }
}

/// 每张优惠券的 (使用次数, 折扣总额)
pub fn tally_usage(rows: &[usages::Model]) -> HashMap<i64, (u64, i64)> {
    let mut stats: HashMap<i64, (u64, i64)> = HashMap::new();
    for u in rows {
        let entry = stats.entry(u.coupon_id).or_default();
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(u.discount_amount);
    }
    stats
}

#[derive(Clone)]
pub struct CouponService {
    pool: DatabaseConnection,
}

impl CouponService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &CouponListQuery) -> AppResult<Vec<CouponResponse>> {
        let now = Utc::now();
        let mut select = coupons::Entity::find();
        match query.status.unwrap_or_default() {
            CouponStatusFilter::Active => {
                select = select
                    .filter(coupons::Column::IsActive.eq(true))
                    .filter(coupons::Column::ValidFrom.lte(now))
                    .filter(coupons::Column::ValidUntil.gte(now));
            }
            CouponStatusFilter::Expired => {
                select = select.filter(
                    Condition::any()
                        .add(coupons::Column::ValidUntil.lt(now))
                        .add(coupons::Column::IsActive.eq(false)),
                );
            }
            CouponStatusFilter::All => {}
        }
        if let Some(segment) = query.segment.as_deref().filter(|s| !s.trim().is_empty()) {
            select = select.filter(coupons::Column::TargetSegment.eq(segment.trim()));
        }
        let list = select
            .order_by_desc(coupons::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let stats = self
            .usage_stats(list.iter().map(|c| c.id).collect())
            .await?;

        Ok(list
            .into_iter()
            .map(|c| {
                let (count, total) = stats.get(&c.id).copied().unwrap_or_default();
                CouponResponse::from_model(c, count, total)
            })
            .collect())
    }

    pub async fn create(&self, req: CreateCouponRequest) -> AppResult<CouponResponse> {
        validate_new_coupon(&req)?;
        let now = Utc::now();
        let coupon = coupons::ActiveModel {
            code: Set(generate_coupon_code(now)),
            name: Set(req.name.trim().to_string()),
            description: Set(req.description.filter(|d| !d.trim().is_empty())),
            discount_type: Set(req.discount_type.unwrap_or(DiscountType::Percent)),
            discount_value: Set(req.discount_value),
            min_order_amount: Set(req.min_order_amount),
            max_discount_amount: Set(req.max_discount_amount),
            valid_from: Set(req.valid_from),
            valid_until: Set(req.valid_until),
            usage_limit: Set(req.usage_limit),
            usage_per_customer: Set(req.usage_per_customer.unwrap_or(1)),
            used_count: Set(0),
            target_segment: Set(req.target_segment.filter(|s| !s.trim().is_empty())),
            target_customers: Set(req.target_customers.map(|ids| json!(ids))),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Coupon {} created ({})", coupon.id, coupon.code);
        Ok(CouponResponse::from_model(coupon, 0, 0))
    }

    pub async fn toggle(&self, id: i64) -> AppResult<CouponResponse> {
        let coupon = self.find(id).await?;
        let is_active = !coupon.is_active;
        let mut am = coupon.into_active_model();
        am.is_active = Set(is_active);
        am.updated_at = Set(Utc::now());
        let coupon = am.update(&self.pool).await?;
        let (count, total) = self
            .usage_stats(vec![coupon.id])
            .await?
            .remove(&coupon.id)
            .unwrap_or_default();
        Ok(CouponResponse::from_model(coupon, count, total))
    }

    /// 按优惠券汇总使用次数与折扣总额
    async fn usage_stats(&self, ids: Vec<i64>) -> AppResult<HashMap<i64, (u64, i64)>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = usages::Entity::find()
            .filter(usages::Column::CouponId.is_in(ids))
            .all(&self.pool)
            .await?;
        Ok(tally_usage(&rows))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let coupon = self.find(id).await?;
        coupons::Entity::delete_by_id(coupon.id)
            .exec(&self.pool)
            .await?;
        log::info!("Coupon {} deleted", id);
        Ok(())
    }

    /// 校验结果以 valid=false + 原因返回，不作为错误
    pub async fn validate(&self, req: ValidateCouponRequest) -> AppResult<CouponValidationResponse> {
        if req.order_amount < 0 {
            return Err(AppError::ValidationError("order_amount must be >= 0".into()));
        }
        let code = req.code.trim();
        if code.is_empty() {
            return Err(AppError::ValidationError("Coupon code is required".into()));
        }
        let coupon = coupons::Entity::find()
            .filter(coupons::Column::Code.eq(code))
            .one(&self.pool)
            .await?;
        let Some(coupon) = coupon else {
            return Ok(CouponValidationResponse {
                valid: false,
                message: "Coupon not found".into(),
                coupon: None,
                discount_amount: 0,
                final_amount: req.order_amount,
            });
        };

        let (customer_usage, customer) = match req.customer_id {
            Some(customer_id) => {
                let used = usages::Entity::find()
                    .filter(usages::Column::CouponId.eq(coupon.id))
                    .filter(usages::Column::CustomerId.eq(customer_id))
                    .count(&self.pool)
                    .await?;
                let customer = customers::Entity::find_by_id(customer_id)
                    .one(&self.pool)
                    .await?;
                (used, customer)
            }
            None => (0, None),
        };
        let audience = CouponAudience {
            customer_id: req.customer_id,
            segment: customer.as_ref().and_then(|c| c.segment.as_deref()),
            grade: customer.as_ref().map(|c| c.grade.as_str()),
        };

        let brief = CouponBrief {
            id: coupon.id,
            code: coupon.code.clone(),
            name: coupon.name.clone(),
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value,
        };
        Ok(
            match evaluate_coupon(&coupon, Utc::now(), req.order_amount, customer_usage, Some(&audience)) {
                Ok(discount) => CouponValidationResponse {
                    valid: true,
                    message: "Coupon applied".into(),
                    coupon: Some(brief),
                    discount_amount: discount,
                    final_amount: req.order_amount - discount,
                },
                Err(reason) => CouponValidationResponse {
                    valid: false,
                    message: reason.message(),
                    coupon: Some(brief),
                    discount_amount: 0,
                    final_amount: req.order_amount,
                },
            },
        )
    }

    /// 后台为客户核销优惠券：与 validate 相同的规则，折扣由服务端计算
    pub async fn redeem(&self, req: RedeemCouponRequest) -> AppResult<RedeemCouponResponse> {
        if req.order_amount < 0 {
            return Err(AppError::ValidationError("order_amount must be >= 0".into()));
        }
        let code = req.code.trim();
        if code.is_empty() {
            return Err(AppError::ValidationError("Coupon code is required".into()));
        }

        let txn = self.pool.begin().await?;
        let coupon = coupons::Entity::find()
            .filter(coupons::Column::Code.eq(code))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Coupon not found".into()))?;
        let customer = customers::Entity::find_by_id(req.customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer not found".into()))?;
        let customer_usage = usages::Entity::find()
            .filter(usages::Column::CouponId.eq(coupon.id))
            .filter(usages::Column::CustomerId.eq(customer.id))
            .count(&txn)
            .await?;
        let audience = CouponAudience {
            customer_id: Some(customer.id),
            segment: customer.segment.as_deref(),
            grade: Some(customer.grade.as_str()),
        };
        let now = Utc::now();
        let discount = redemption_discount(&coupon, now, req.order_amount, customer_usage, &audience)?;

        // 条件更新，防止并发核销超过总次数
        let mut limit = Condition::any().add(coupons::Column::UsageLimit.is_null());
        if let Some(max) = coupon.usage_limit {
            limit = limit.add(coupons::Column::UsedCount.lt(max));
        }
        let updated = coupons::Entity::update_many()
            .col_expr(
                coupons::Column::UsedCount,
                Expr::col(coupons::Column::UsedCount).add(1),
            )
            .col_expr(coupons::Column::UpdatedAt, Expr::value(now))
            .filter(coupons::Column::Id.eq(coupon.id))
            .filter(limit)
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            return Err(AppError::ValidationError(
                CouponRejection::UsageLimitReached.message(),
            ));
        }

        let usage = usages::ActiveModel {
            coupon_id: Set(coupon.id),
            customer_id: Set(Some(customer.id)),
            mall_user_id: Set(None),
            mall_order_id: Set(None),
            discount_amount: Set(discount),
            used_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!(
            "Coupon {} redeemed for customer {} (discount {})",
            coupon.code,
            customer.id,
            discount
        );
        Ok(RedeemCouponResponse {
            usage_id: usage.id,
            coupon_id: coupon.id,
            code: coupon.code,
            customer_id: customer.id,
            order_amount: req.order_amount,
            discount_amount: discount,
            final_amount: req.order_amount - discount,
        })
    }

    /// 向商城会员发放优惠券，已持有的会员跳过
    pub async fn issue_to_mall_users(&self, req: IssueCouponRequest) -> AppResult<IssueCouponResponse> {
        let coupon = self.find(req.coupon_id).await?;
        let targets: Vec<i64> = match req.user_ids {
            Some(ids) => {
                let unique: HashSet<i64> = ids.into_iter().collect();
                if unique.is_empty() {
                    return Err(AppError::ValidationError("user_ids must not be empty".into()));
                }
                mall_users::Entity::find()
                    .filter(mall_users::Column::Id.is_in(unique))
                    .all(&self.pool)
                    .await?
                    .into_iter()
                    .map(|u| u.id)
                    .collect()
            }
            None => mall_users::Entity::find()
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|u| u.id)
                .collect(),
        };

        let holders: HashSet<i64> = user_coupons::Entity::find()
            .filter(user_coupons::Column::CouponId.eq(coupon.id))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|uc| uc.user_id)
            .collect();

        let now = Utc::now();
        let fresh: Vec<user_coupons::ActiveModel> = targets
            .iter()
            .filter(|id| !holders.contains(*id))
            .map(|id| user_coupons::ActiveModel {
                user_id: Set(*id),
                coupon_id: Set(coupon.id),
                is_used: Set(false),
                used_at: Set(None),
                created_at: Set(now),
                ..Default::default()
            })
            .collect();
        let issued = fresh.len() as u64;
        if !fresh.is_empty() {
            user_coupons::Entity::insert_many(fresh)
                .exec(&self.pool)
                .await?;
        }
        log::info!("Coupon {} issued to {} mall user(s)", coupon.id, issued);
        Ok(IssueCouponResponse {
            issued,
            skipped: targets.len() as u64 - issued,
        })
    }

    pub async fn user_coupons(
        &self,
        user_id: i64,
        filter: UserCouponFilter,
    ) -> AppResult<Vec<UserCouponResponse>> {
        let now = Utc::now();
        let mut select = user_coupons::Entity::find().filter(user_coupons::Column::UserId.eq(user_id));
        match filter {
            UserCouponFilter::Used => select = select.filter(user_coupons::Column::IsUsed.eq(true)),
            UserCouponFilter::Available => {
                select = select.filter(user_coupons::Column::IsUsed.eq(false))
            }
            UserCouponFilter::All => {}
        }
        let list = select
            .order_by_desc(user_coupons::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        let coupon_ids: Vec<i64> = list.iter().map(|uc| uc.coupon_id).collect();
        let coupon_map: HashMap<i64, coupons::Model> = if coupon_ids.is_empty() {
            HashMap::new()
        } else {
            coupons::Entity::find()
                .filter(coupons::Column::Id.is_in(coupon_ids))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };

        Ok(list
            .into_iter()
            .filter_map(|uc| {
                let coupon = coupon_map.get(&uc.coupon_id)?.clone();
                Some(user_coupon_response(uc, coupon, now))
            })
            .filter(|c| filter != UserCouponFilter::Available || c.is_usable)
            .collect())
    }

    async fn find(&self, id: i64) -> AppResult<coupons::Model> {
        coupons::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Coupon not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn usage(coupon_id: i64, discount_amount: i64) -> usages::Model {
        usages::Model {
            id: 0,
            coupon_id,
            customer_id: Some(1),
            mall_user_id: None,
            mall_order_id: None,
            discount_amount,
            used_at: Utc::now(),
        }
    }

    #[test]
    fn test_usage_tally_per_coupon() {
        let stats = tally_usage(&[usage(1, 1_000), usage(2, 500), usage(1, 2_500)]);
        assert_eq!(stats.get(&1), Some(&(2, 3_500)));
        assert_eq!(stats.get(&2), Some(&(1, 500)));
        assert_eq!(stats.get(&3), None);

        // 列表与启停接口用同一份统计生成响应
        let mut model = coupon(DiscountType::Fixed, 1_000.0);
        model.id = 1;
        let (count, total) = stats.get(&model.id).copied().unwrap_or_default();
        let resp = CouponResponse::from_model(model, count, total);
        assert_eq!((resp.usage_count, resp.total_discount), (2, 3_500));
    }

    fn coupon(kind: DiscountType, value: f64) -> coupons::Model {
        let now = Utc::now();
        coupons::Model {
            id: 1,
            code: "CPN1".into(),
            name: "테스트".into(),
            description: None,
            discount_type: kind,
            discount_value: value,
            min_order_amount: None,
            max_discount_amount: None,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            usage_limit: None,
            usage_per_customer: 1,
            used_count: 0,
            target_segment: None,
            target_customers: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_percent_discount_is_floored_and_capped() {
        let mut c = coupon(DiscountType::Percent, 15.0);
        assert_eq!(discount_for(&c, 33_333), 4_999);
        c.max_discount_amount = Some(3_000);
        assert_eq!(discount_for(&c, 33_333), 3_000);
    }

    #[test]
    fn test_fixed_discount_never_exceeds_amount() {
        let c = coupon(DiscountType::Fixed, 5_000.0);
        assert_eq!(discount_for(&c, 20_000), 5_000);
        assert_eq!(discount_for(&c, 3_000), 3_000);
    }

    #[test]
    fn test_rules_are_checked_in_order() {
        let now = Utc::now();
        let mut c = coupon(DiscountType::Fixed, 1_000.0);
        c.is_active = false;
        c.valid_until = now - Duration::hours(1);
        // 同时停用且过期时先报告停用
        assert_eq!(evaluate_coupon(&c, now, 10_000, 0, None), Err(CouponRejection::Inactive));

        let mut c = coupon(DiscountType::Fixed, 1_000.0);
        c.valid_from = now + Duration::hours(1);
        assert!(matches!(
            evaluate_coupon(&c, now, 10_000, 0, None),
            Err(CouponRejection::NotYetValid(_))
        ));

        let mut c = coupon(DiscountType::Fixed, 1_000.0);
        c.valid_until = now - Duration::hours(1);
        assert_eq!(evaluate_coupon(&c, now, 10_000, 0, None), Err(CouponRejection::Expired));

        let mut c = coupon(DiscountType::Fixed, 1_000.0);
        c.usage_limit = Some(5);
        c.used_count = 5;
        c.min_order_amount = Some(50_000);
        assert_eq!(
            evaluate_coupon(&c, now, 10_000, 1, None),
            Err(CouponRejection::UsageLimitReached)
        );

        let mut c = coupon(DiscountType::Fixed, 1_000.0);
        c.min_order_amount = Some(50_000);
        assert_eq!(evaluate_coupon(&c, now, 10_000, 1, None), Err(CouponRejection::AlreadyUsed));
        assert_eq!(
            evaluate_coupon(&c, now, 10_000, 0, None),
            Err(CouponRejection::BelowMinimum(50_000))
        );
        assert_eq!(evaluate_coupon(&c, now, 50_000, 0, None), Ok(1_000));
    }

    #[test]
    fn test_audience_rules() {
        let now = Utc::now();
        let mut c = coupon(DiscountType::Percent, 10.0);
        c.target_segment = Some("VIP".into());
        let gold = CouponAudience {
            customer_id: Some(7),
            segment: Some("NEW"),
            grade: Some("GOLD"),
        };
        let vip_by_grade = CouponAudience {
            customer_id: Some(7),
            segment: None,
            grade: Some("VIP"),
        };
        assert_eq!(
            evaluate_coupon(&c, now, 10_000, 0, Some(&gold)),
            Err(CouponRejection::NotTargeted)
        );
        assert_eq!(evaluate_coupon(&c, now, 10_000, 0, Some(&vip_by_grade)), Ok(1_000));
        // 商城会员券不检查分群
        assert_eq!(evaluate_coupon(&c, now, 10_000, 0, None), Ok(1_000));

        let mut c = coupon(DiscountType::Percent, 10.0);
        c.target_customers = Some(json!([1, 2, 3]));
        assert_eq!(
            evaluate_coupon(&c, now, 10_000, 0, Some(&gold)),
            Err(CouponRejection::NotTargeted)
        );
        let listed = CouponAudience {
            customer_id: Some(2),
            ..Default::default()
        };
        assert_eq!(evaluate_coupon(&c, now, 10_000, 0, Some(&listed)), Ok(1_000));
    }

    #[test]
    fn test_redemption_rejects_expired_and_exhausted_coupons() {
        let now = Utc::now();
        let audience = CouponAudience {
            customer_id: Some(1),
            segment: None,
            grade: Some("BRONZE"),
        };

        let mut expired = coupon(DiscountType::Fixed, 5_000.0);
        expired.valid_until = now - Duration::days(1);
        let err = redemption_discount(&expired, now, 20_000, 0, &audience).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref m) if m == "This coupon has expired"));

        let mut exhausted = coupon(DiscountType::Fixed, 5_000.0);
        exhausted.usage_limit = Some(1);
        exhausted.used_count = 1;
        let err = redemption_discount(&exhausted, now, 20_000, 0, &audience).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref m) if m.contains("usage limit")));

        // 同一客户超过每人次数
        let fresh = coupon(DiscountType::Fixed, 5_000.0);
        assert!(redemption_discount(&fresh, now, 20_000, 1, &audience).is_err());

        let mut minimum = coupon(DiscountType::Fixed, 5_000.0);
        minimum.min_order_amount = Some(30_000);
        assert!(redemption_discount(&minimum, now, 20_000, 0, &audience).is_err());
    }

    #[test]
    fn test_redemption_discount_is_computed_from_coupon() {
        let now = Utc::now();
        let audience = CouponAudience {
            customer_id: Some(1),
            ..Default::default()
        };
        let mut c = coupon(DiscountType::Percent, 10.0);
        c.max_discount_amount = Some(2_000);
        assert_eq!(redemption_discount(&c, now, 15_000, 0, &audience).unwrap(), 1_500);
        assert_eq!(redemption_discount(&c, now, 50_000, 0, &audience).unwrap(), 2_000);

        // 分群券在核销时同样检查客户
        c.target_segment = Some("VIP".into());
        assert!(redemption_discount(&c, now, 15_000, 0, &audience).is_err());
    }

    #[test]
    fn test_new_coupon_validation() {
        let now = Utc::now();
        let base = CreateCouponRequest {
            name: "봄맞이".into(),
            description: None,
            discount_type: Some(DiscountType::Percent),
            discount_value: 100.0,
            min_order_amount: None,
            max_discount_amount: None,
            valid_from: now,
            valid_until: now + Duration::days(7),
            usage_limit: None,
            usage_per_customer: None,
            target_segment: None,
            target_customers: None,
        };
        assert!(validate_new_coupon(&base).is_ok());

        let over = CreateCouponRequest {
            discount_value: 100.5,
            ..base.clone()
        };
        assert!(validate_new_coupon(&over).is_err());

        let zero_fixed = CreateCouponRequest {
            discount_type: Some(DiscountType::Fixed),
            discount_value: 0.0,
            ..base.clone()
        };
        assert!(validate_new_coupon(&zero_fixed).is_err());

        let backwards = CreateCouponRequest {
            valid_until: now,
            ..base
        };
        assert!(validate_new_coupon(&backwards).is_err());
    }
}
