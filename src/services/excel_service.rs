use crate::entities::OrderStatus;
use crate::error::{AppError, AppResult};
use crate::middlewares::StaffIdentity;
use crate::models::*;
use crate::services::{CustomerService, OrderService, UpsertOutcome};
use crate::utils::spreadsheet::{CellOut, Column, SheetRow, read_rows, write_sheet};
use chrono::{NaiveTime, TimeZone, Utc};

pub const ORDER_COLUMNS: &[Column] = &[
    Column::new("날짜", "order_date", 12.0),
    Column::new("주문번호", "order_number", 20.0),
    Column::new("주문자명", "orderer_name", 15.0),
    Column::new("수취인명", "recipient_name", 15.0),
    Column::new("수취인 전화번호", "recipient_phone", 15.0),
    Column::new("수취인 이동통신", "contact_phone", 15.0),
    Column::new("수취인 우편번호", "recipient_zip_code", 12.0),
    Column::new("수취인 주소", "recipient_addr", 40.0),
    Column::new("상품명 및 수량", "product_info", 30.0),
    Column::new("수량", "quantity", 8.0),
    Column::new("배송메시지", "delivery_msg", 30.0),
    Column::new("고객주문처명", "order_source", 15.0),
    Column::new("단가", "base_price", 12.0),
    Column::new("배송비", "shipping_fee", 10.0),
    Column::new("추가비용", "additional_fee", 10.0),
    Column::new("합계", "total_amount", 12.0),
    Column::new("사은품발송", "gift_sent", 12.0),
    Column::new("택배사", "courier", 15.0),
    Column::new("운송장번호", "tracking_number", 20.0),
    Column::new("주문상태", "status", 12.0),
];

pub const CUSTOMER_COLUMNS: &[Column] = &[
    Column::new("고객명", "name", 15.0),
    Column::new("이메일", "email", 25.0),
    Column::new("전화번호", "phone", 15.0),
    Column::new("회사", "company", 20.0),
    Column::new("등급", "grade", 10.0),
    Column::new("세그먼트", "segment", 12.0),
    Column::new("상태", "status", 10.0),
];

fn parse_flag(raw: Option<String>) -> bool {
    matches!(
        raw.as_deref().map(|s| s.trim().to_lowercase()).as_deref(),
        Some("y" | "yes" | "o" | "true" | "1" | "예" | "발송")
    )
}

fn money(row: &SheetRow, key: &str) -> Result<Option<i64>, String> {
    let v = row.int(key)?;
    if v.is_some_and(|n| n < 0) {
        return Err(format!("{key} must be >= 0"));
    }
    Ok(v)
}

/// 表格行 -> 新订单请求
pub fn order_from_row(row: &SheetRow) -> Result<CreateOrderRequest, String> {
    let recipient_name = row.text("recipient_name");
    let orderer_name = row.text("orderer_name");
    if recipient_name.is_none() && orderer_name.is_none() {
        return Err("recipient name is required".to_string());
    }
    let product_info = row
        .text("product_info")
        .ok_or_else(|| "product is required".to_string())?;

    let quantity = match row.int("quantity")? {
        Some(q) if q < 1 || q > i32::MAX as i64 => {
            return Err("quantity must be a positive integer".to_string());
        }
        Some(q) => Some(q as i32),
        None => None,
    };

    let order_date = row
        .date("order_date")?
        .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)));

    let status = match row.text("status") {
        Some(s) => Some(s.parse::<OrderStatus>()?),
        None => None,
    };

    Ok(CreateOrderRequest {
        order_number: row.text("order_number"),
        customer_id: None,
        order_date,
        status,
        orderer_name,
        contact_phone: row.text("contact_phone"),
        recipient_name,
        recipient_phone: row.text("recipient_phone"),
        recipient_zip_code: row.text("recipient_zip_code"),
        recipient_addr: row.text("recipient_addr"),
        product_info: Some(product_info),
        quantity,
        base_price: money(row, "base_price")?,
        shipping_fee: money(row, "shipping_fee")?,
        additional_fee: money(row, "additional_fee")?,
        total_amount: money(row, "total_amount")?,
        order_source: row.text("order_source"),
        courier: row.text("courier"),
        tracking_number: row.text("tracking_number"),
        delivery_msg: row.text("delivery_msg"),
        gift_sent: Some(parse_flag(row.text("gift_sent"))),
    })
}

/// 表格行 -> 客户
pub fn customer_from_row(row: &SheetRow) -> Result<CreateCustomerRequest, String> {
    let email = row
        .text("email")
        .ok_or_else(|| "email is required".to_string())?;
    if !email.contains('@') {
        return Err(format!("invalid email: {email}"));
    }
    let name = row
        .text("name")
        .ok_or_else(|| "name is required".to_string())?;
    Ok(CreateCustomerRequest {
        name,
        email,
        phone: row.text("phone"),
        company: row.text("company"),
        grade: row.text("grade"),
        segment: row.text("segment"),
        status: row.text("status"),
    })
}

fn error_text(e: &AppError) -> String {
    match e {
        AppError::ValidationError(m) | AppError::Conflict(m) | AppError::NotFound(m) => m.clone(),
        other => other.to_string(),
    }
}

/// 逐行解析并写入，单行失败只记录行号和原因
pub async fn tally_rows<T, P, F, Fut>(rows: &[SheetRow], parse: P, mut persist: F) -> ImportResult
where
    P: Fn(&SheetRow) -> Result<T, String>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = AppResult<UpsertOutcome>>,
{
    let mut result = ImportResult {
        total_rows: rows.len(),
        ..Default::default()
    };
    for row in rows {
        let req = match parse(row) {
            Ok(req) => req,
            Err(msg) => {
                result.record_failure(row.row_number, msg);
                continue;
            }
        };
        match persist(req).await {
            Ok(outcome) => {
                result.success_count += 1;
                match outcome {
                    UpsertOutcome::Created => result.created_count += 1,
                    UpsertOutcome::Updated => result.updated_count += 1,
                }
            }
            Err(e) => result.record_failure(row.row_number, error_text(&e)),
        }
    }
    result
}

#[derive(Clone)]
pub struct ExcelService {
    order_service: OrderService,
    customer_service: CustomerService,
}

impl ExcelService {
    pub fn new(order_service: OrderService, customer_service: CustomerService) -> Self {
        Self {
            order_service,
            customer_service,
        }
    }

    pub async fn import_orders(&self, staff: &StaffIdentity, bytes: &[u8]) -> AppResult<ImportResult> {
        let rows = read_rows(bytes, ORDER_COLUMNS)?;
        let result = tally_rows(&rows, order_from_row, move |req| async move {
            self.order_service
                .create(staff, req)
                .await
                .map(|_| UpsertOutcome::Created)
        })
        .await;
        log::info!("Order import by staff {}: {}", staff.user_id, result.message());
        Ok(result)
    }

    pub async fn import_customers(&self, bytes: &[u8]) -> AppResult<ImportResult> {
        let rows = read_rows(bytes, CUSTOMER_COLUMNS)?;
        let result = tally_rows(&rows, customer_from_row, |req| {
            self.customer_service.upsert_by_email(req)
        })
        .await;
        log::info!("Customer import: {}", result.message());
        Ok(result)
    }

    pub async fn export_orders(
        &self,
        staff: &StaffIdentity,
        filter: OrderFilter,
        search: Option<&str>,
    ) -> AppResult<Vec<u8>> {
        let list = self.order_service.list_all(staff, filter, search).await?;
        let rows: Vec<Vec<CellOut>> = list
            .into_iter()
            .map(|o| {
                vec![
                    CellOut::from(o.order_date.format("%Y-%m-%d").to_string()),
                    CellOut::from(o.order_number),
                    CellOut::from(o.orderer_name),
                    CellOut::from(o.recipient_name),
                    CellOut::from(o.recipient_phone),
                    CellOut::from(o.contact_phone),
                    CellOut::from(o.recipient_zip_code),
                    CellOut::from(o.recipient_addr),
                    CellOut::from(o.product_info),
                    CellOut::from(o.quantity),
                    CellOut::from(o.delivery_msg),
                    CellOut::from(o.order_source),
                    CellOut::from(o.base_price),
                    CellOut::from(o.shipping_fee),
                    CellOut::from(o.additional_fee),
                    CellOut::from(o.total_amount),
                    CellOut::from(if o.gift_sent { "Y" } else { "" }),
                    CellOut::from(o.courier),
                    CellOut::from(o.tracking_number),
                    CellOut::from(o.status.to_string()),
                ]
            })
            .collect();
        write_sheet("Orders", ORDER_COLUMNS, &rows)
    }

    pub fn order_template(&self) -> AppResult<Vec<u8>> {
        order_template()
    }
}

/// 只有表头和一行示例的导入模板
pub fn order_template() -> AppResult<Vec<u8>> {
    let sample = vec![
        CellOut::from(Utc::now().format("%Y-%m-%d").to_string()),
        CellOut::Empty,
        CellOut::from("김주문"),
        CellOut::from("홍길동"),
        CellOut::from("02-123-4567"),
        CellOut::from("010-1234-5678"),
        CellOut::from("06234"),
        CellOut::from("서울특별시 강남구 테헤란로 123"),
        CellOut::from("제주 감귤 5kg"),
        CellOut::from(1i64),
        CellOut::from("문 앞에 놓아주세요"),
        CellOut::Empty,
        CellOut::from(25000i64),
        CellOut::from(3000i64),
        CellOut::from(0i64),
        CellOut::Empty,
        CellOut::Empty,
        CellOut::Empty,
        CellOut::Empty,
        CellOut::from("PENDING"),
    ];
    write_sheet("Template", ORDER_COLUMNS, &[sample])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(columns: &[Column], rows: Vec<Vec<CellOut>>) -> Vec<SheetRow> {
        let bytes = write_sheet("T", columns, &rows).unwrap();
        read_rows(&bytes, columns).unwrap()
    }

    #[test]
    fn test_order_rows_report_successes_and_failures() {
        let cols = [
            Column::new("수취인명", "recipient_name", 10.0),
            Column::new("상품명 및 수량", "product_info", 10.0),
            Column::new("수량", "quantity", 10.0),
            Column::new("단가", "base_price", 10.0),
            Column::new("날짜", "order_date", 10.0),
        ];
        let rows = sheet(
            &cols,
            vec![
                vec!["홍길동".into(), "감귤".into(), 2i64.into(), 10000i64.into(), "2025-01-05".into()],
                vec!["".into(), "감귤".into(), 1i64.into(), 10000i64.into(), CellOut::Empty],
                vec!["김철수".into(), "배".into(), 0i64.into(), 5000i64.into(), CellOut::Empty],
                vec!["이영희".into(), "사과".into(), 1i64.into(), (-1i64).into(), CellOut::Empty],
                vec!["박민수".into(), "포도".into(), 3i64.into(), 7000i64.into(), "05/01/2025".into()],
            ],
        );
        let outcomes: Vec<_> = rows.iter().map(|r| (r.row_number, order_from_row(r))).collect();
        assert_eq!(outcomes.len(), 5);
        assert!(outcomes[0].1.is_ok());
        assert_eq!(outcomes[1].0, 3);
        assert!(outcomes[1].1.is_err());
        assert!(outcomes[2].1.is_err());
        assert!(outcomes[3].1.is_err());
        assert!(outcomes[4].1.is_err());

        let first = outcomes[0].1.as_ref().unwrap();
        assert_eq!(first.quantity, Some(2));
        assert_eq!(first.base_price, Some(10000));
        assert_eq!(
            first.order_date.map(|d| d.format("%Y-%m-%d").to_string()).as_deref(),
            Some("2025-01-05")
        );
    }

    #[tokio::test]
    async fn test_import_tally_counts_rows_and_keeps_sheet_row_numbers() {
        let cols = [
            Column::new("수취인명", "recipient_name", 10.0),
            Column::new("상품명 및 수량", "product_info", 10.0),
            Column::new("수량", "quantity", 10.0),
            Column::new("단가", "base_price", 10.0),
        ];
        let rows = sheet(
            &cols,
            vec![
                vec!["홍길동".into(), "감귤".into(), 2i64.into(), 10000i64.into()],
                vec!["".into(), "감귤".into(), 1i64.into(), 10000i64.into()],
                vec!["김철수".into(), "배".into(), 1i64.into(), 5000i64.into()],
                vec!["이영희".into(), "사과".into(), 0i64.into(), 3000i64.into()],
                vec!["중복".into(), "포도".into(), 1i64.into(), 7000i64.into()],
                vec!["박민수".into(), "포도".into(), 3i64.into(), 7000i64.into()],
            ],
        );

        let result = tally_rows(&rows, order_from_row, |req: CreateOrderRequest| async move {
            // 写入阶段的失败同样按行记录
            if req.recipient_name.as_deref() == Some("중복") {
                Err(AppError::Conflict("Order number already exists".into()))
            } else {
                Ok(UpsertOutcome::Created)
            }
        })
        .await;

        assert_eq!(result.total_rows, 6);
        assert_eq!(result.success_count, 3);
        assert_eq!(result.created_count, 3);
        assert_eq!(result.updated_count, 0);
        let failed_rows: Vec<usize> = result.failures.iter().map(|f| f.row).collect();
        // 表头占第 1 行
        assert_eq!(failed_rows, vec![3, 5, 6]);
        assert_eq!(result.failures[2].message, "Order number already exists");
        assert_eq!(result.message(), "3 of 6 row(s) imported, 3 failed");
    }

    #[tokio::test]
    async fn test_import_tally_splits_created_and_updated() {
        let rows = sheet(
            CUSTOMER_COLUMNS,
            vec![
                vec!["홍길동".into(), "hong@example.com".into()],
                vec!["김철수".into(), "kim@example.com".into()],
                vec!["이영희".into(), "bad-email".into()],
            ],
        );
        let result = tally_rows(&rows, customer_from_row, |req: CreateCustomerRequest| async move {
            if req.email.starts_with("hong") {
                Ok(UpsertOutcome::Updated)
            } else {
                Ok(UpsertOutcome::Created)
            }
        })
        .await;
        assert_eq!(result.success_count, 2);
        assert_eq!(result.created_count, 1);
        assert_eq!(result.updated_count, 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].row, 4);
    }

    #[test]
    fn test_order_row_parses_status_and_gift_flag() {
        let cols = [
            Column::new("수취인명", "recipient_name", 10.0),
            Column::new("상품명 및 수량", "product_info", 10.0),
            Column::new("주문상태", "status", 10.0),
            Column::new("사은품발송", "gift_sent", 10.0),
        ];
        let rows = sheet(
            &cols,
            vec![vec!["홍길동".into(), "감귤".into(), "shipped".into(), "Y".into()]],
        );
        let req = order_from_row(&rows[0]).unwrap();
        assert_eq!(req.status, Some(OrderStatus::Shipped));
        assert_eq!(req.gift_sent, Some(true));
    }

    #[test]
    fn test_customer_row_requires_email_with_at() {
        let rows = sheet(
            CUSTOMER_COLUMNS,
            vec![
                vec!["홍길동".into(), "hong@example.com".into()],
                vec!["김철수".into(), "not-an-email".into()],
                vec!["이영희".into(), CellOut::Empty, "010-1111-2222".into()],
            ],
        );
        assert!(customer_from_row(&rows[0]).is_ok());
        assert!(customer_from_row(&rows[1]).is_err());
        assert!(customer_from_row(&rows[2]).is_err());
    }

    #[test]
    fn test_template_sample_row_is_importable() {
        let bytes = order_template().unwrap();
        let rows = read_rows(&bytes, ORDER_COLUMNS).unwrap();
        assert_eq!(rows.len(), 1);
        let req = order_from_row(&rows[0]).unwrap();
        assert_eq!(req.recipient_name.as_deref(), Some("홍길동"));
        assert_eq!(req.quantity, Some(1));
        assert_eq!(req.status, Some(OrderStatus::Pending));
        assert_eq!(req.gift_sent, Some(false));
    }
}
