use crate::entities::{
    OrderStatus, TicketStatus, customer_entity as customers, order_entity as orders,
    ticket_entity as tickets,
};
use crate::error::AppResult;
use crate::middlewares::StaffIdentity;
use crate::models::*;
use crate::services::ChatService;
use crate::services::order_service::scoped;
use crate::utils::time::{
    local_today, month_start, previous_month_start, start_of_local_day,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

const ACTIVE_CUSTOMER: &str = "ACTIVE";

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn growth_rate(current: i64, previous: i64) -> f64 {
    if previous <= 0 {
        return 0.0;
    }
    round1((current - previous) as f64 / previous as f64 * 100.0)
}

/// 收入只统计已签收订单，月份按下单时间划分
pub fn summarize_orders(
    rows: &[orders::Model],
    this_month_from: DateTime<Utc>,
    last_month_from: DateTime<Utc>,
) -> (RevenueKpi, OrderKpi) {
    let mut revenue = RevenueKpi::default();
    let mut kpi = OrderKpi::default();
    for o in rows {
        kpi.total += 1;
        match o.status {
            OrderStatus::Pending => kpi.pending += 1,
            OrderStatus::Delivered => {
                kpi.delivered += 1;
                revenue.total += o.total_amount;
                if o.order_date >= this_month_from {
                    revenue.this_month += o.total_amount;
                } else if o.order_date >= last_month_from {
                    revenue.last_month += o.total_amount;
                }
            }
            _ => {}
        }
    }
    revenue.growth = growth_rate(revenue.this_month, revenue.last_month);
    if kpi.delivered > 0 {
        kpi.average_value = revenue.total / kpi.delivered as i64;
    }
    (revenue, kpi)
}

#[derive(Clone)]
pub struct DashboardService {
    pool: DatabaseConnection,
    chat_service: ChatService,
}

impl DashboardService {
    pub fn new(pool: DatabaseConnection, chat_service: ChatService) -> Self {
        Self { pool, chat_service }
    }

    pub async fn kpis(&self, staff: &StaffIdentity) -> AppResult<DashboardKpiResponse> {
        let today = local_today();
        let this_month_from = start_of_local_day(month_start(today));
        let last_month_from = start_of_local_day(previous_month_start(today));

        let rows = scoped(orders::Entity::find(), staff).all(&self.pool).await?;
        let (revenue, order_kpi) = summarize_orders(&rows, this_month_from, last_month_from);

        let customers = CustomerKpi {
            total: customers::Entity::find().count(&self.pool).await?,
            active: customers::Entity::find()
                .filter(customers::Column::Status.eq(ACTIVE_CUSTOMER))
                .count(&self.pool)
                .await?,
            new_this_month: customers::Entity::find()
                .filter(customers::Column::CreatedAt.gte(this_month_from))
                .count(&self.pool)
                .await?,
        };

        let statuses: Vec<TicketStatus> = tickets::Entity::find()
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|t| t.status)
            .collect();
        let count = |s: TicketStatus| statuses.iter().filter(|x| **x == s).count() as u64;
        let total = statuses.len() as u64;
        let resolved = count(TicketStatus::Resolved);
        let tickets = TicketKpi {
            total,
            open: count(TicketStatus::Open),
            in_progress: count(TicketStatus::InProgress),
            resolved,
            resolution_rate: if total == 0 {
                0.0
            } else {
                round1(resolved as f64 / total as f64 * 100.0)
            },
        };

        Ok(DashboardKpiResponse {
            revenue,
            orders: order_kpi,
            customers,
            tickets,
            active_chat_sessions: self.chat_service.active_session_count().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn order(status: OrderStatus, amount: i64, at: DateTime<Utc>) -> orders::Model {
        orders::Model {
            id: 1,
            order_number: "ORD-1".into(),
            customer_id: None,
            order_date: at,
            status,
            orderer_name: None,
            contact_phone: None,
            recipient_name: None,
            recipient_phone: None,
            recipient_zip_code: None,
            recipient_addr: None,
            product_info: None,
            quantity: 1,
            base_price: amount,
            shipping_fee: 0,
            additional_fee: 0,
            total_amount: amount,
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
    fn test_growth_rate() {
        assert_eq!(growth_rate(150, 100), 50.0);
        assert_eq!(growth_rate(50, 200), -75.0);
        assert_eq!(growth_rate(100, 0), 0.0);
    }

    #[test]
    fn test_summarize_orders() {
        let this_month = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let last_month = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let rows = vec![
            order(OrderStatus::Delivered, 30_000, this_month + chrono::Duration::days(2)),
            order(OrderStatus::Delivered, 20_000, last_month + chrono::Duration::days(2)),
            order(OrderStatus::Delivered, 10_000, last_month - chrono::Duration::days(40)),
            order(OrderStatus::Pending, 99_000, this_month),
            order(OrderStatus::Cancelled, 5_000, this_month),
        ];
        let (revenue, kpi) = summarize_orders(&rows, this_month, last_month);
        assert_eq!(revenue.total, 60_000);
        assert_eq!(revenue.this_month, 30_000);
        assert_eq!(revenue.last_month, 20_000);
        assert_eq!(revenue.growth, 50.0);
        assert_eq!(kpi.total, 5);
        assert_eq!(kpi.pending, 1);
        assert_eq!(kpi.delivered, 3);
        assert_eq!(kpi.average_value, 20_000);
    }
}
