use crate::config::PerformanceConfig;
use crate::entities::{
    app_setting_entity as settings, base_product_entity as products, order_entity as orders,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::time::{
    end_of_local_day, local_today, month_start, previous_month_end, previous_month_start,
    start_of_local_day, year_start,
};
use chrono::{Local, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use std::collections::{BTreeMap, HashMap};

pub const MARGIN_FORMULA_KEY: &str = "margin_formula";
pub const OTHER_PRODUCT: &str = "OTHER";

fn round(v: f64) -> i64 {
    v.round() as i64
}

fn order_quantity(o: &orders::Model) -> i64 {
    if o.quantity > 0 { i64::from(o.quantity) } else { 1 }
}

/// 订单来源不是已知合作方时归入默认合作方
pub fn resolve_partner<'a>(source: Option<&str>, config: &'a PerformanceConfig) -> &'a str {
    let source = source.map(str::trim).unwrap_or_default();
    config
        .partners
        .iter()
        .find(|p| p.code == source || p.name == source)
        .map(|p| p.code.as_str())
        .unwrap_or(config.default_partner.as_str())
}

/// 先找同一合作方且商品名包含在订单商品信息中的商品，找不到再忽略合作方
pub fn match_product<'a>(
    product_info: &str,
    partner: &str,
    products: &'a [products::Model],
    default_partner: &str,
) -> Option<&'a products::Model> {
    let contained = |p: &&products::Model| !p.name.is_empty() && product_info.contains(p.name.as_str());
    products
        .iter()
        .filter(contained)
        .find(|p| p.partner_code.as_deref().unwrap_or(default_partner) == partner)
        .or_else(|| products.iter().find(contained))
}

#[derive(Debug, Default, Clone)]
struct PartnerAccumulator {
    count: i64,
    count_for_kpi: i64,
    quantity: i64,
    base_price: i64,
    base_price_for_kpi: i64,
    shipping_fee: i64,
    supply: f64,
    cost: f64,
    commission: f64,
}

impl PartnerAccumulator {
    fn add(&mut self, order: &orders::Model, matched: Option<&products::Model>, default_rate: f64) {
        let qty = order_quantity(order);
        self.count += 1;
        self.quantity += qty;
        self.base_price += order.base_price;
        self.shipping_fee += order.shipping_fee;

        match matched {
            Some(p) => {
                if p.kpi_count_enabled {
                    self.count_for_kpi += i64::from(p.kpi_unit_count) * qty;
                }
                if p.kpi_sales_enabled {
                    self.base_price_for_kpi += order.base_price;
                }
                let supply = (p.kpi_supply_price.unwrap_or(p.unit_price) * qty) as f64;
                self.supply += supply;
                self.cost += (p.kpi_cost_price.unwrap_or(0) * qty) as f64;
                self.commission += supply * p.kpi_commission_rate.unwrap_or(default_rate);
            }
            None => {
                self.count_for_kpi += 1;
                self.base_price_for_kpi += order.base_price;
                self.supply += order.base_price as f64;
                self.commission += order.base_price as f64 * default_rate;
            }
        }
    }

    fn finish(&self, partner: &str, partner_name: &str, vat_rate: f64) -> PartnerKpi {
        let vat = round(self.supply * vat_rate);
        let supply_ex_vat = self.supply / (1.0 + vat_rate);
        let margin = supply_ex_vat - self.cost - self.shipping_fee as f64 - self.commission;
        PartnerKpi {
            partner: partner.to_string(),
            partner_name: partner_name.to_string(),
            count: self.count,
            count_for_kpi: self.count_for_kpi,
            quantity: self.quantity,
            base_price: self.base_price,
            base_price_for_kpi: self.base_price_for_kpi,
            shipping_fee: self.shipping_fee,
            supply_price: round(self.supply),
            cost: round(self.cost),
            commission: round(self.commission),
            vat,
            total_with_vat: round(self.supply) + vat,
            margin: round(margin),
        }
    }
}

/// 按合作方汇总，输出顺序与配置中的合作方顺序一致
pub fn aggregate_partner_kpis(
    rows: &[orders::Model],
    products: &[products::Model],
    config: &PerformanceConfig,
) -> Vec<PartnerKpi> {
    let mut acc: HashMap<&str, PartnerAccumulator> = HashMap::new();
    for order in rows {
        let partner = resolve_partner(order.order_source.as_deref(), config);
        let info = order.product_info.as_deref().unwrap_or_default();
        let matched = match_product(info, partner, products, &config.default_partner);
        acc.entry(partner)
            .or_default()
            .add(order, matched, config.default_commission_rate);
    }
    config
        .partners
        .iter()
        .map(|p| {
            acc.get(p.code.as_str())
                .cloned()
                .unwrap_or_default()
                .finish(&p.code, &p.name, config.vat_rate)
        })
        .collect()
}

pub fn kpi_totals(rows: &[PartnerKpi]) -> KpiTotals {
    rows.iter().fold(KpiTotals::default(), |mut t, r| {
        t.count += r.count;
        t.count_for_kpi += r.count_for_kpi;
        t.quantity += r.quantity;
        t.base_price += r.base_price;
        t.base_price_for_kpi += r.base_price_for_kpi;
        t.shipping_fee += r.shipping_fee;
        t.supply_price += r.supply_price;
        t.cost += r.cost;
        t.commission += r.commission;
        t.vat += r.vat;
        t.total_with_vat += r.total_with_vat;
        t.margin += r.margin;
        t
    })
}

pub fn product_sales(
    rows: &[orders::Model],
    products: &[products::Model],
    config: &PerformanceConfig,
) -> BTreeMap<String, i64> {
    let mut sales = BTreeMap::new();
    for order in rows {
        let partner = resolve_partner(order.order_source.as_deref(), config);
        let info = order.product_info.as_deref().unwrap_or_default();
        let key = match_product(info, partner, products, &config.default_partner)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| OTHER_PRODUCT.to_string());
        *sales.entry(key).or_insert(0) += order_quantity(order);
    }
    sales
}

pub fn default_margin_formula() -> MarginFormulaConfig {
    MarginFormulaConfig {
        version: 1,
        name: "Default margin formula".to_string(),
        description: "Margin = supply price - cost - shipping fee - commission".to_string(),
        formula: MarginFormula {
            base: MarginBase::SupplyPrice,
            vat_exclude: false,
            vat_rate: 0.1,
            deductions: vec![
                MarginDeduction {
                    id: "cost".to_string(),
                    kind: DeductionType::Cost,
                    enabled: true,
                    label: "Cost".to_string(),
                    description: "Uses the cost price from each base product".to_string(),
                    value_type: DeductionValueType::Kpi,
                    fixed_value: 0,
                    rate: None,
                    exclude_partners: Vec::new(),
                    operator: DeductionOperator::Subtract,
                },
                MarginDeduction {
                    id: "shippingFee".to_string(),
                    kind: DeductionType::ShippingFee,
                    enabled: true,
                    label: "Shipping fee".to_string(),
                    description: "Per-order shipping fee (not charged for rocket_growth)".to_string(),
                    value_type: DeductionValueType::Fixed,
                    fixed_value: 3000,
                    rate: None,
                    exclude_partners: vec!["rocket_growth".to_string()],
                    operator: DeductionOperator::Subtract,
                },
                MarginDeduction {
                    id: "commission".to_string(),
                    kind: DeductionType::Commission,
                    enabled: true,
                    label: "Commission".to_string(),
                    description: "Commission rate on the supply price".to_string(),
                    value_type: DeductionValueType::Rate,
                    fixed_value: 0,
                    rate: Some(0.02585),
                    exclude_partners: Vec::new(),
                    operator: DeductionOperator::Subtract,
                },
            ],
        },
        updated_at: None,
        updated_by: "system".to_string(),
    }
}

fn validate_formula(formula: &MarginFormula) -> AppResult<()> {
    if !(0.0..1.0).contains(&formula.vat_rate) {
        return Err(AppError::ValidationError(
            "vat_rate must be between 0 and 1".into(),
        ));
    }
    let mut ids = std::collections::HashSet::new();
    for d in &formula.deductions {
        if d.id.trim().is_empty() || !ids.insert(d.id.as_str()) {
            return Err(AppError::ValidationError(format!(
                "Deduction id '{}' is empty or duplicated",
                d.id
            )));
        }
        if d.fixed_value < 0 || d.rate.is_some_and(|r| !(0.0..=1.0).contains(&r)) {
            return Err(AppError::ValidationError(format!(
                "Deduction '{}' has an invalid value",
                d.label
            )));
        }
    }
    Ok(())
}

/// 单个订单按利润公式拆分。custom 项按 operator 增减，其余扣除项一律扣减
pub fn margin_line(
    order: &orders::Model,
    partner: &str,
    partner_name: &str,
    matched: Option<&products::Model>,
    formula: &MarginFormula,
    default_rate: f64,
) -> MarginLine {
    let qty = order_quantity(order);
    let supply = match (formula.base, matched) {
        (MarginBase::SupplyPrice, Some(p)) => p.kpi_supply_price.unwrap_or(p.unit_price) * qty,
        _ => order.base_price,
    };
    let supply_ex_vat = if formula.vat_exclude {
        round(supply as f64 / (1.0 + formula.vat_rate))
    } else {
        supply
    };

    let (mut cost, mut shipping_fee, mut commission) = (0, 0, 0);
    let mut custom = Vec::new();
    for d in formula.deductions.iter().filter(|d| d.enabled) {
        let excluded = d
            .exclude_partners
            .iter()
            .any(|x| x == partner || x == partner_name);
        if excluded {
            continue;
        }
        let value = match d.value_type {
            DeductionValueType::Fixed => d.fixed_value,
            DeductionValueType::Rate => round(supply as f64 * d.rate.unwrap_or(0.0)),
            DeductionValueType::Kpi => match d.kind {
                DeductionType::Cost => matched.and_then(|p| p.kpi_cost_price).unwrap_or(0) * qty,
                DeductionType::ShippingFee => order.shipping_fee,
                DeductionType::Commission => round(
                    supply as f64 * matched.and_then(|p| p.kpi_commission_rate).unwrap_or(default_rate),
                ),
                DeductionType::Custom => 0,
            },
        };
        match d.kind {
            DeductionType::Cost => cost += value,
            DeductionType::ShippingFee => shipping_fee += value,
            DeductionType::Commission => commission += value,
            DeductionType::Custom => custom.push(CustomDeductionLine {
                id: d.id.clone(),
                label: d.label.clone(),
                operator: d.operator,
                value,
            }),
        }
    }

    let custom_net: i64 = custom
        .iter()
        .map(|c| match c.operator {
            DeductionOperator::Add => c.value,
            DeductionOperator::Subtract => -c.value,
        })
        .sum();

    MarginLine {
        order_id: order.id,
        order_number: order.order_number.clone(),
        order_date: order.order_date,
        customer_name: order.orderer_name.clone(),
        product_info: order.product_info.clone(),
        matched_product: matched.map(|p| p.name.clone()),
        quantity: order.quantity,
        supply_price: supply,
        supply_price_ex_vat: supply_ex_vat,
        cost,
        shipping_fee,
        commission,
        margin: supply_ex_vat - cost - shipping_fee - commission + custom_net,
        custom_deductions: custom,
    }
}

pub fn margin_subtotal<'a, I>(lines: I) -> MarginSubtotal
where
    I: IntoIterator<Item = &'a MarginLine>,
{
    lines.into_iter().fold(MarginSubtotal::default(), |mut t, l| {
        t.count += 1;
        t.supply_price += l.supply_price;
        t.supply_price_ex_vat += l.supply_price_ex_vat;
        t.cost += l.cost;
        t.shipping_fee += l.shipping_fee;
        t.commission += l.commission;
        for c in &l.custom_deductions {
            *t.custom_totals.entry(c.id.clone()).or_insert(0) += c.value;
        }
        t.margin += l.margin;
        t
    })
}

fn merge_subtotals(a: &mut MarginSubtotal, b: &MarginSubtotal) {
    a.count += b.count;
    a.supply_price += b.supply_price;
    a.supply_price_ex_vat += b.supply_price_ex_vat;
    a.cost += b.cost;
    a.shipping_fee += b.shipping_fee;
    a.commission += b.commission;
    for (id, v) in &b.custom_totals {
        *a.custom_totals.entry(id.clone()).or_insert(0) += v;
    }
    a.margin += b.margin;
}

/// 按本地日期汇总，区间内没有订单的日期补零
pub fn daily_sales(rows: &[orders::Model], start: NaiveDate, end: NaiveDate) -> Vec<DailySales> {
    let mut by_day: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    for day in start.iter_days().take_while(|d| *d <= end) {
        by_day.insert(day, (0, 0));
    }
    for o in rows {
        let day = o.order_date.with_timezone(&Local).date_naive();
        if let Some(entry) = by_day.get_mut(&day) {
            entry.0 += 1;
            entry.1 += o.total_amount;
        }
    }
    by_day
        .into_iter()
        .map(|(date, (order_count, revenue))| DailySales {
            date,
            order_count,
            revenue,
        })
        .collect()
}

pub fn resolve_range(query: &DateRangeQuery) -> AppResult<(NaiveDate, NaiveDate)> {
    let today = local_today();
    let end = query.end_date.unwrap_or(today);
    let start = query.start_date.unwrap_or(end);
    if start > end {
        return Err(AppError::ValidationError(
            "start_date must not be after end_date".into(),
        ));
    }
    Ok((start, end))
}

fn validate_product_numbers(
    unit_price: Option<i64>,
    supply: Option<i64>,
    cost: Option<i64>,
    rate: Option<f64>,
    unit_count: Option<i32>,
) -> AppResult<()> {
    if [unit_price, supply, cost].iter().flatten().any(|v| *v < 0) {
        return Err(AppError::ValidationError("Prices must be >= 0".into()));
    }
    if rate.is_some_and(|r| !(0.0..=1.0).contains(&r)) {
        return Err(AppError::ValidationError(
            "Commission rate must be between 0 and 1".into(),
        ));
    }
    if unit_count.is_some_and(|c| c < 1) {
        return Err(AppError::ValidationError(
            "KPI unit count must be at least 1".into(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct PerformanceService {
    pool: DatabaseConnection,
    config: PerformanceConfig,
}

impl PerformanceService {
    pub fn new(pool: DatabaseConnection, config: PerformanceConfig) -> Self {
        Self { pool, config }
    }

    pub async fn list_products(&self) -> AppResult<Vec<BaseProductResponse>> {
        let list = products::Entity::find()
            .order_by_asc(products::Column::Name)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn create_product(&self, req: CreateBaseProductRequest) -> AppResult<BaseProductResponse> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("Product name is required".into()));
        }
        validate_product_numbers(
            Some(req.unit_price),
            req.kpi_supply_price,
            req.kpi_cost_price,
            req.kpi_commission_rate,
            req.kpi_unit_count,
        )?;
        let now = Utc::now();
        let product = products::ActiveModel {
            name: Set(name.to_string()),
            partner_code: Set(req.partner_code.filter(|c| !c.trim().is_empty())),
            unit_price: Set(req.unit_price),
            kpi_supply_price: Set(req.kpi_supply_price),
            kpi_cost_price: Set(req.kpi_cost_price),
            kpi_commission_rate: Set(req.kpi_commission_rate),
            kpi_unit_count: Set(req.kpi_unit_count.unwrap_or(1)),
            kpi_count_enabled: Set(req.kpi_count_enabled.unwrap_or(true)),
            kpi_sales_enabled: Set(req.kpi_sales_enabled.unwrap_or(true)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(product.into())
    }

    pub async fn update_product(
        &self,
        id: i64,
        req: UpdateBaseProductRequest,
    ) -> AppResult<BaseProductResponse> {
        validate_product_numbers(
            req.unit_price,
            req.kpi_supply_price.flatten(),
            req.kpi_cost_price.flatten(),
            req.kpi_commission_rate.flatten(),
            req.kpi_unit_count,
        )?;
        let product = self.find_product(id).await?;
        let mut am = product.into_active_model();
        if let Some(name) = req.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::ValidationError("Product name is required".into()));
            }
            am.name = Set(name.to_string());
        }
        if let Some(code) = req.partner_code {
            am.partner_code = Set(code.filter(|c| !c.trim().is_empty()));
        }
        if let Some(v) = req.unit_price {
            am.unit_price = Set(v);
        }
        if let Some(v) = req.kpi_supply_price {
            am.kpi_supply_price = Set(v);
        }
        if let Some(v) = req.kpi_cost_price {
            am.kpi_cost_price = Set(v);
        }
        if let Some(v) = req.kpi_commission_rate {
            am.kpi_commission_rate = Set(v);
        }
        if let Some(v) = req.kpi_unit_count {
            am.kpi_unit_count = Set(v);
        }
        if let Some(v) = req.kpi_count_enabled {
            am.kpi_count_enabled = Set(v);
        }
        if let Some(v) = req.kpi_sales_enabled {
            am.kpi_sales_enabled = Set(v);
        }
        if let Some(v) = req.is_active {
            am.is_active = Set(v);
        }
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?.into())
    }

    pub async fn delete_product(&self, id: i64) -> AppResult<()> {
        let product = self.find_product(id).await?;
        products::Entity::delete_by_id(product.id)
            .exec(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_product(&self, id: i64) -> AppResult<products::Model> {
        products::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".into()))
    }

    async fn active_products(&self) -> AppResult<Vec<products::Model>> {
        Ok(products::Entity::find()
            .filter(products::Column::IsActive.eq(true))
            .order_by_asc(products::Column::Id)
            .all(&self.pool)
            .await?)
    }

    async fn orders_between(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<orders::Model>> {
        Ok(orders::Entity::find()
            .filter(orders::Column::OrderDate.gte(start_of_local_day(start)))
            .filter(orders::Column::OrderDate.lt(end_of_local_day(end)))
            .order_by_asc(orders::Column::OrderDate)
            .all(&self.pool)
            .await?)
    }

    async fn period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        products: &[products::Model],
    ) -> AppResult<(PeriodKpi, Vec<orders::Model>)> {
        let rows = self.orders_between(start, end).await?;
        let by_partner = aggregate_partner_kpis(&rows, products, &self.config);
        let totals = kpi_totals(&by_partner);
        Ok((
            PeriodKpi {
                start_date: start,
                end_date: end,
                by_partner,
                totals,
            },
            rows,
        ))
    }

    pub async fn integrated_dashboard(
        &self,
        query: &DateRangeQuery,
    ) -> AppResult<IntegratedDashboardResponse> {
        let (start, end) = resolve_range(query)?;
        let products = self.active_products().await?;

        let (selected, _) = self.period(start, end, &products).await?;
        let (month_to_date, _) = self.period(month_start(end), end, &products).await?;
        let (last_month, _) = self
            .period(previous_month_start(end), previous_month_end(end), &products)
            .await?;
        let (year_to_date, year_rows) = self.period(year_start(end), end, &products).await?;

        Ok(IntegratedDashboardResponse {
            product_sales: product_sales(&year_rows, &products, &self.config),
            selected,
            month_to_date,
            last_month,
            year_to_date,
            vat_rate: self.config.vat_rate,
            default_commission_rate: self.config.default_commission_rate,
        })
    }

    pub async fn margin_formula(&self) -> AppResult<MarginFormulaConfig> {
        let row = settings::Entity::find_by_id(MARGIN_FORMULA_KEY.to_string())
            .one(&self.pool)
            .await?;
        match row {
            Some(row) => match serde_json::from_value(row.value) {
                Ok(config) => Ok(config),
                Err(e) => {
                    log::warn!("Stored margin formula is unreadable, using default: {e}");
                    Ok(default_margin_formula())
                }
            },
            None => Ok(default_margin_formula()),
        }
    }

    pub async fn update_margin_formula(
        &self,
        staff_id: i64,
        req: UpdateMarginFormulaRequest,
    ) -> AppResult<MarginFormulaConfig> {
        if let Some(formula) = &req.formula {
            validate_formula(formula)?;
        }
        let existing = settings::Entity::find_by_id(MARGIN_FORMULA_KEY.to_string())
            .one(&self.pool)
            .await?;
        let current = self.margin_formula().await?;
        let version = if existing.is_some() { current.version + 1 } else { 1 };

        let updated_by = users::Entity::find_by_id(staff_id)
            .one(&self.pool)
            .await?
            .map(|u| u.email)
            .unwrap_or_else(|| staff_id.to_string());
        let now = Utc::now();
        let config = MarginFormulaConfig {
            version,
            name: req
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(current.name),
            description: req
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or(current.description),
            formula: req.formula.unwrap_or(current.formula),
            updated_at: Some(now),
            updated_by: updated_by.clone(),
        };
        let value = serde_json::to_value(&config)?;

        match existing {
            Some(row) => {
                let mut am = row.into_active_model();
                am.value = Set(value);
                am.updated_by = Set(Some(updated_by));
                am.updated_at = Set(now);
                am.update(&self.pool).await?;
            }
            None => {
                settings::ActiveModel {
                    key: Set(MARGIN_FORMULA_KEY.to_string()),
                    value: Set(value),
                    updated_by: Set(Some(updated_by)),
                    updated_at: Set(now),
                }
                .insert(&self.pool)
                .await?;
            }
        }
        log::info!("Margin formula updated to version {}", config.version);
        Ok(config)
    }

    pub async fn margin_details(&self, query: &DateRangeQuery) -> AppResult<MarginDetailsResponse> {
        let (start, end) = resolve_range(query)?;
        let formula = self.margin_formula().await?;
        let products = self.active_products().await?;
        let rows = self.orders_between(start, end).await?;

        let mut by_partner: HashMap<&str, Vec<MarginLine>> = HashMap::new();
        for order in &rows {
            let partner = resolve_partner(order.order_source.as_deref(), &self.config);
            let partner_name = self.config.partner_name(partner).unwrap_or(partner);
            let info = order.product_info.as_deref().unwrap_or_default();
            let matched = match_product(info, partner, &products, &self.config.default_partner);
            let line = margin_line(
                order,
                partner,
                partner_name,
                matched,
                &formula.formula,
                self.config.default_commission_rate,
            );
            by_partner.entry(partner).or_default().push(line);
        }

        let mut grand_total = MarginSubtotal::default();
        let mut partners = Vec::new();
        for p in &self.config.partners {
            let lines = by_partner.remove(p.code.as_str()).unwrap_or_default();
            if lines.is_empty() {
                continue;
            }
            let totals = margin_subtotal(&lines);
            merge_subtotals(&mut grand_total, &totals);
            partners.push(PartnerMarginDetail {
                partner: p.code.clone(),
                partner_name: p.name.clone(),
                lines,
                totals,
            });
        }

        Ok(MarginDetailsResponse {
            start_date: start,
            end_date: end,
            formula,
            partners,
            grand_total,
        })
    }

    pub async fn sales_statistics(&self, query: &DateRangeQuery) -> AppResult<SalesStatisticsResponse> {
        let (start, end) = resolve_range(query)?;
        let rows = self.orders_between(start, end).await?;
        let daily = daily_sales(&rows, start, end);
        Ok(SalesStatisticsResponse {
            start_date: start,
            end_date: end,
            total_orders: daily.iter().map(|d| d.order_count).sum(),
            total_revenue: daily.iter().map(|d| d.revenue).sum(),
            daily,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::OrderStatus;
    use chrono::{TimeZone, Utc};

    fn product(id: i64, name: &str, partner: Option<&str>) -> products::Model {
        let now = Utc::now();
        products::Model {
            id,
            name: name.into(),
            partner_code: partner.map(str::to_string),
            unit_price: 10_000,
            kpi_supply_price: None,
            kpi_cost_price: None,
            kpi_commission_rate: None,
            kpi_unit_count: 1,
            kpi_count_enabled: true,
            kpi_sales_enabled: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn order(id: i64, source: Option<&str>, info: &str, qty: i32, base: i64, shipping: i64) -> orders::Model {
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 3, 0, 0).unwrap();
        orders::Model {
            id,
            order_number: format!("ORD-{id}"),
            customer_id: None,
            order_date: at,
            status: OrderStatus::Pending,
            orderer_name: Some("홍길동".into()),
            contact_phone: None,
            recipient_name: None,
            recipient_phone: None,
            recipient_zip_code: None,
            recipient_addr: None,
            product_info: Some(info.into()),
            quantity: qty,
            base_price: base,
            shipping_fee: shipping,
            additional_fee: 0,
            total_amount: base + shipping,
            order_source: source.map(str::to_string),
            courier: None,
            tracking_number: None,
            delivery_msg: None,
            gift_sent: false,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_resolve_partner_falls_back_to_default() {
        let config = PerformanceConfig::default();
        assert_eq!(resolve_partner(Some("smartstore"), &config), "smartstore");
        assert_eq!(resolve_partner(Some("Rocket Growth"), &config), "rocket_growth");
        assert_eq!(resolve_partner(Some("unknown"), &config), "coupang");
        assert_eq!(resolve_partner(None, &config), "coupang");
    }

    #[test]
    fn test_match_product_prefers_same_partner() {
        let list = vec![
            product(1, "쉴드4", Some("smartstore")),
            product(2, "쉴드4", Some("coupang")),
            product(3, "스탠드", None),
        ];
        let m = match_product("쉴드4 블랙 x2", "coupang", &list, "coupang").unwrap();
        assert_eq!(m.id, 2);
        let m = match_product("쉴드4 블랙", "mall", &list, "coupang").unwrap();
        assert_eq!(m.id, 1);
        // partner_code 为空的商品视为默认合作方
        let m = match_product("스탠드", "coupang", &list, "coupang").unwrap();
        assert_eq!(m.id, 3);
        assert!(match_product("케이블", "coupang", &list, "coupang").is_none());
    }

    #[test]
    fn test_aggregate_partner_kpis() {
        let config = PerformanceConfig::default();
        let mut p = product(1, "쉴드4", Some("coupang"));
        p.kpi_supply_price = Some(20_000);
        p.kpi_cost_price = Some(8_000);
        p.kpi_commission_rate = Some(0.1);
        p.kpi_unit_count = 2;
        let products = vec![p];
        let rows = vec![
            order(1, Some("coupang"), "쉴드4", 2, 50_000, 3_000),
            order(2, Some("nowhere"), "케이블", 1, 11_000, 0),
        ];

        let kpis = aggregate_partner_kpis(&rows, &products, &config);
        assert_eq!(kpis.len(), config.partners.len());
        let coupang = &kpis[0];
        assert_eq!(coupang.partner, "coupang");
        assert_eq!(coupang.count, 2);
        assert_eq!(coupang.count_for_kpi, 2 * 2 + 1);
        assert_eq!(coupang.quantity, 3);
        assert_eq!(coupang.base_price, 61_000);
        assert_eq!(coupang.supply_price, 40_000 + 11_000);
        assert_eq!(coupang.cost, 16_000);
        // 4000 + 11000 * 0.02585
        assert_eq!(coupang.commission, 4_284);
        assert_eq!(coupang.vat, 5_100);
        assert_eq!(coupang.total_with_vat, 56_100);

        let totals = kpi_totals(&kpis);
        assert_eq!(totals.count, 2);
        assert_eq!(totals.supply_price, 51_000);
        assert!(kpis[1..].iter().all(|k| k.count == 0));
    }

    #[test]
    fn test_product_sales_groups_unmatched() {
        let config = PerformanceConfig::default();
        let products = vec![product(1, "쉴드4", None)];
        let rows = vec![
            order(1, None, "쉴드4", 3, 0, 0),
            order(2, None, "케이블", 2, 0, 0),
            order(3, None, "쉴드4 미니", 0, 0, 0),
        ];
        let sales = product_sales(&rows, &products, &config);
        assert_eq!(sales.get("쉴드4"), Some(&4));
        assert_eq!(sales.get(OTHER_PRODUCT), Some(&2));
    }

    #[test]
    fn test_margin_line_with_default_formula() {
        let formula = default_margin_formula().formula;
        let mut p = product(1, "쉴드4", Some("coupang"));
        p.kpi_supply_price = Some(20_000);
        p.kpi_cost_price = Some(5_000);
        let o = order(1, Some("coupang"), "쉴드4", 2, 45_000, 0);

        let line = margin_line(&o, "coupang", "Coupang", Some(&p), &formula, 0.02585);
        assert_eq!(line.supply_price, 40_000);
        assert_eq!(line.supply_price_ex_vat, 40_000);
        assert_eq!(line.cost, 10_000);
        assert_eq!(line.shipping_fee, 3_000);
        assert_eq!(line.commission, 1_034);
        assert_eq!(line.margin, 40_000 - 10_000 - 3_000 - 1_034);

        // 排除的合作方不扣运费
        let line = margin_line(&o, "rocket_growth", "Rocket Growth", Some(&p), &formula, 0.02585);
        assert_eq!(line.shipping_fee, 0);
    }

    #[test]
    fn test_margin_line_vat_and_custom_items() {
        let mut formula = default_margin_formula().formula;
        formula.base = MarginBase::BasePrice;
        formula.vat_exclude = true;
        formula.deductions = vec![
            MarginDeduction {
                id: "packing".into(),
                kind: DeductionType::Custom,
                enabled: true,
                label: "포장비".into(),
                description: String::new(),
                value_type: DeductionValueType::Fixed,
                fixed_value: 500,
                rate: None,
                exclude_partners: vec![],
                operator: DeductionOperator::Subtract,
            },
            MarginDeduction {
                id: "rebate".into(),
                kind: DeductionType::Custom,
                enabled: true,
                label: "리베이트".into(),
                description: String::new(),
                value_type: DeductionValueType::Rate,
                fixed_value: 0,
                rate: Some(0.01),
                exclude_partners: vec![],
                operator: DeductionOperator::Add,
            },
        ];
        let o = order(1, None, "케이블", 1, 11_000, 2_500);
        let line = margin_line(&o, "coupang", "Coupang", None, &formula, 0.02585);
        assert_eq!(line.supply_price, 11_000);
        assert_eq!(line.supply_price_ex_vat, 10_000);
        assert_eq!(line.custom_deductions.len(), 2);
        assert_eq!(line.margin, 10_000 - 500 + 110);

        let subtotal = margin_subtotal([&line, &line]);
        assert_eq!(subtotal.count, 2);
        assert_eq!(subtotal.custom_totals.get("packing"), Some(&1_000));
        assert_eq!(subtotal.margin, line.margin * 2);
    }

    #[test]
    fn test_daily_sales_fills_gaps() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        let mut o = order(1, None, "x", 1, 10_000, 0);
        o.order_date = start_of_local_day(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
            + chrono::Duration::hours(12);
        let daily = daily_sales(&[o], start, end);
        assert_eq!(daily.len(), 3);
        assert_eq!(daily[0].order_count, 0);
        assert_eq!(daily[1].order_count, 1);
        assert_eq!(daily[1].revenue, 10_000);
    }

    #[test]
    fn test_resolve_range() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 3, day);
        let q = DateRangeQuery {
            start_date: d(1),
            end_date: d(5),
        };
        assert_eq!(resolve_range(&q).unwrap(), (d(1).unwrap(), d(5).unwrap()));
        let backwards = DateRangeQuery {
            start_date: d(5),
            end_date: d(1),
        };
        assert!(resolve_range(&backwards).is_err());
    }

    #[test]
    fn test_validate_formula_rejects_duplicates() {
        let mut formula = default_margin_formula().formula;
        assert!(validate_formula(&formula).is_ok());
        formula.deductions.push(formula.deductions[0].clone());
        assert!(validate_formula(&formula).is_err());
    }
}
