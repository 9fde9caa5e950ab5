use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct RevenueKpi {
    pub total: i64,
    pub this_month: i64,
    pub last_month: i64,
    /// 环比增长率（%），上月为 0 时为 0
    pub growth: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct OrderKpi {
    pub total: u64,
    pub pending: u64,
    pub delivered: u64,
    pub average_value: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct CustomerKpi {
    pub total: u64,
    pub active: u64,
    pub new_this_month: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct TicketKpi {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub resolution_rate: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardKpiResponse {
    pub revenue: RevenueKpi,
    pub orders: OrderKpi,
    pub customers: CustomerKpi,
    pub tickets: TicketKpi,
    pub active_chat_sessions: u64,
}
