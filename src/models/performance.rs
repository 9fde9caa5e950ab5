use crate::entities::base_product_entity;
use super::common::double_option;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BaseProductResponse {
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

impl From<base_product_entity::Model> for BaseProductResponse {
    fn from(m: base_product_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            partner_code: m.partner_code,
            unit_price: m.unit_price,
            kpi_supply_price: m.kpi_supply_price,
            kpi_cost_price: m.kpi_cost_price,
            kpi_commission_rate: m.kpi_commission_rate,
            kpi_unit_count: m.kpi_unit_count,
            kpi_count_enabled: m.kpi_count_enabled,
            kpi_sales_enabled: m.kpi_sales_enabled,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBaseProductRequest {
    pub name: String,
    pub partner_code: Option<String>,
    pub unit_price: i64,
    pub kpi_supply_price: Option<i64>,
    pub kpi_cost_price: Option<i64>,
    pub kpi_commission_rate: Option<f64>,
    pub kpi_unit_count: Option<i32>,
    pub kpi_count_enabled: Option<bool>,
    pub kpi_sales_enabled: Option<bool>,
}

/// 可空字段传 null 表示清除该设置
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateBaseProductRequest {
    pub name: Option<String>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub partner_code: Option<Option<String>>,
    pub unit_price: Option<i64>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub kpi_supply_price: Option<Option<i64>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub kpi_cost_price: Option<Option<i64>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub kpi_commission_rate: Option<Option<f64>>,
    pub kpi_unit_count: Option<i32>,
    pub kpi_count_enabled: Option<bool>,
    pub kpi_sales_enabled: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct DateRangeQuery {
    /// YYYY-MM-DD，缺省为今天
    pub start_date: Option<NaiveDate>,
    /// YYYY-MM-DD，缺省为今天
    pub end_date: Option<NaiveDate>,
}

/// 单个合作方在某一期间的汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct PartnerKpi {
    pub partner: String,
    pub partner_name: String,
    pub count: i64,
    pub count_for_kpi: i64,
    pub quantity: i64,
    pub base_price: i64,
    pub base_price_for_kpi: i64,
    pub shipping_fee: i64,
    pub supply_price: i64,
    pub cost: i64,
    pub commission: i64,
    pub vat: i64,
    pub total_with_vat: i64,
    pub margin: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct KpiTotals {
    pub count: i64,
    pub count_for_kpi: i64,
    pub quantity: i64,
    pub base_price: i64,
    pub base_price_for_kpi: i64,
    pub shipping_fee: i64,
    pub supply_price: i64,
    pub cost: i64,
    pub commission: i64,
    pub vat: i64,
    pub total_with_vat: i64,
    pub margin: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PeriodKpi {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub by_partner: Vec<PartnerKpi>,
    pub totals: KpiTotals,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IntegratedDashboardResponse {
    pub selected: PeriodKpi,
    pub month_to_date: PeriodKpi,
    pub last_month: PeriodKpi,
    pub year_to_date: PeriodKpi,
    /// 年内按商品名统计的数量，未匹配的归入 OTHER
    pub product_sales: BTreeMap<String, i64>,
    pub vat_rate: f64,
    pub default_commission_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum MarginBase {
    SupplyPrice,
    BasePrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum DeductionType {
    Cost,
    ShippingFee,
    Commission,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeductionValueType {
    Kpi,
    Fixed,
    Rate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeductionOperator {
    #[default]
    Subtract,
    Add,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MarginDeduction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: DeductionType,
    pub enabled: bool,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub value_type: DeductionValueType,
    #[serde(default)]
    pub fixed_value: i64,
    #[serde(default)]
    pub rate: Option<f64>,
    /// 合作方代码或名称
    #[serde(default)]
    pub exclude_partners: Vec<String>,
    #[serde(default)]
    pub operator: DeductionOperator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MarginFormula {
    pub base: MarginBase,
    pub vat_exclude: bool,
    pub vat_rate: f64,
    pub deductions: Vec<MarginDeduction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MarginFormulaConfig {
    pub version: i32,
    pub name: String,
    pub description: String,
    pub formula: MarginFormula,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateMarginFormulaRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub formula: Option<MarginFormula>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CustomDeductionLine {
    pub id: String,
    pub label: String,
    pub operator: DeductionOperator,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MarginLine {
    pub order_id: i64,
    pub order_number: String,
    pub order_date: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub product_info: Option<String>,
    pub matched_product: Option<String>,
    pub quantity: i32,
    pub supply_price: i64,
    pub supply_price_ex_vat: i64,
    pub cost: i64,
    pub shipping_fee: i64,
    pub commission: i64,
    pub custom_deductions: Vec<CustomDeductionLine>,
    pub margin: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct MarginSubtotal {
    pub count: i64,
    pub supply_price: i64,
    pub supply_price_ex_vat: i64,
    pub cost: i64,
    pub shipping_fee: i64,
    pub commission: i64,
    /// 按自定义项 id 汇总的金额（未带符号）
    pub custom_totals: BTreeMap<String, i64>,
    pub margin: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PartnerMarginDetail {
    pub partner: String,
    pub partner_name: String,
    pub lines: Vec<MarginLine>,
    pub totals: MarginSubtotal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MarginDetailsResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub formula: MarginFormulaConfig,
    pub partners: Vec<PartnerMarginDetail>,
    pub grand_total: MarginSubtotal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailySales {
    pub date: NaiveDate,
    pub order_count: i64,
    pub revenue: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SalesStatisticsResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily: Vec<DailySales>,
    pub total_orders: i64,
    pub total_revenue: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_request_distinguishes_null_from_missing() {
        let req: UpdateBaseProductRequest =
            serde_json::from_value(json!({"kpi_cost_price": null, "unit_price": 9900})).unwrap();
        assert_eq!(req.kpi_cost_price, Some(None));
        assert_eq!(req.kpi_supply_price, None);
        assert_eq!(req.unit_price, Some(9900));
    }

    #[test]
    fn test_deduction_wire_format() {
        let d: MarginDeduction = serde_json::from_value(json!({
            "id": "custom_1",
            "type": "custom",
            "enabled": true,
            "label": "포장비",
            "value_type": "fixed",
            "fixed_value": 500,
            "operator": "add"
        }))
        .unwrap();
        assert_eq!(d.kind, DeductionType::Custom);
        assert_eq!(d.operator, DeductionOperator::Add);
        assert!(d.exclude_partners.is_empty());
    }
}
