//! xlsx 读写工具
//!
//! 导入：读取第一个工作表，第 1 行为表头，表头可写列名或字段 key。
//! 导出：按列定义写出表头、列宽和数据行。

use crate::error::{AppError, AppResult};
use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use chrono::{Duration, NaiveDate};
use rust_xlsxwriter::{Format, Workbook};
use std::collections::HashMap;
use std::io::Cursor;

/// 列定义: 表头文字 <-> 字段 key
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    pub key: &'static str,
    pub width: f64,
}

impl Column {
    pub const fn new(header: &'static str, key: &'static str, width: f64) -> Self {
        Self { header, key, width }
    }

    fn matches(&self, raw: &str) -> bool {
        let raw = raw.trim();
        raw == self.header || raw.eq_ignore_ascii_case(self.key)
    }
}

/// 一行导入数据，row_number 为表格中的行号（从 1 开始，表头为第 1 行）
#[derive(Debug, Clone)]
pub struct SheetRow {
    pub row_number: usize,
    values: HashMap<&'static str, Data>,
}

impl SheetRow {
    pub fn get(&self, key: &str) -> Option<&Data> {
        self.values.get(key)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(cell_text)
    }

    pub fn int(&self, key: &str) -> Result<Option<i64>, String> {
        match self.get(key) {
            Some(cell) => cell_int(cell).map_err(|e| format!("{key}: {e}")),
            None => Ok(None),
        }
    }

    pub fn date(&self, key: &str) -> Result<Option<NaiveDate>, String> {
        match self.get(key) {
            Some(cell) => cell_date(cell).map_err(|e| format!("{key}: {e}")),
            None => Ok(None),
        }
    }
}

/// 读取第一个工作表并按列定义映射
pub fn read_rows(bytes: &[u8], columns: &[Column]) -> AppResult<Vec<SheetRow>> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::SpreadsheetError("workbook has no sheets".to_string()))??;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };

    // 表头列下标 -> 字段 key，未识别的列忽略
    let mapping: Vec<Option<&'static str>> = header_row
        .iter()
        .map(|cell| {
            let raw = cell.to_string();
            columns.iter().find(|c| c.matches(&raw)).map(|c| c.key)
        })
        .collect();

    if mapping.iter().all(Option::is_none) {
        return Err(AppError::ValidationError(
            "Header row does not contain any known column".to_string(),
        ));
    }

    let mut out = Vec::new();
    for (index, row) in rows.enumerate() {
        if row.iter().all(is_blank) {
            continue;
        }
        let mut values = HashMap::new();
        for (col, cell) in row.iter().enumerate() {
            if let Some(Some(key)) = mapping.get(col)
                && !is_blank(cell)
            {
                values.insert(*key, cell.clone());
            }
        }
        out.push(SheetRow {
            row_number: index + 2,
            values,
        });
    }
    Ok(out)
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

pub fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    };
    if text.is_empty() { None } else { Some(text) }
}

pub fn cell_int(cell: &Data) -> Result<Option<i64>, String> {
    match cell {
        Data::Empty => Ok(None),
        Data::Int(i) => Ok(Some(*i)),
        Data::Float(f) if f.fract() == 0.0 => Ok(Some(*f as i64)),
        Data::Float(f) => Err(format!("{f} is not a whole number")),
        Data::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned
                .parse::<i64>()
                .map(Some)
                .map_err(|_| format!("'{s}' is not a number"))
        }
        other => Err(format!("'{other}' is not a number")),
    }
}

pub fn cell_date(cell: &Data) -> Result<Option<NaiveDate>, String> {
    match cell {
        Data::Empty => Ok(None),
        Data::DateTime(dt) => Ok(Some(excel_serial_to_date(dt.as_f64())?)),
        Data::Float(f) => Ok(Some(excel_serial_to_date(*f)?)),
        Data::Int(i) => Ok(Some(excel_serial_to_date(*i as f64)?)),
        Data::String(s) | Data::DateTimeIso(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            let head = s.get(..10).unwrap_or(s);
            NaiveDate::parse_from_str(head, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| format!("'{s}' is not a date (YYYY-MM-DD)"))
        }
        other => Err(format!("'{other}' is not a date")),
    }
}

/// Excel 序列日期（1900 日期系统）
pub fn excel_serial_to_date(serial: f64) -> Result<NaiveDate, String> {
    if !(1.0..2_958_466.0).contains(&serial) {
        return Err(format!("{serial} is out of the Excel date range"));
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).ok_or("invalid epoch")?;
    Ok(epoch + Duration::days(serial.trunc() as i64))
}

/// 导出单元格
#[derive(Debug, Clone)]
pub enum CellOut {
    Text(String),
    Number(f64),
    Empty,
}

impl From<String> for CellOut {
    fn from(v: String) -> Self {
        CellOut::Text(v)
    }
}

impl From<&str> for CellOut {
    fn from(v: &str) -> Self {
        CellOut::Text(v.to_string())
    }
}

impl From<Option<String>> for CellOut {
    fn from(v: Option<String>) -> Self {
        v.map(CellOut::Text).unwrap_or(CellOut::Empty)
    }
}

impl From<i64> for CellOut {
    fn from(v: i64) -> Self {
        CellOut::Number(v as f64)
    }
}

impl From<i32> for CellOut {
    fn from(v: i32) -> Self {
        CellOut::Number(v as f64)
    }
}

/// 写出单个工作表并返回 xlsx 字节
pub fn write_sheet(sheet_name: &str, columns: &[Column], rows: &[Vec<CellOut>]) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, column) in columns.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, column.header, &header_format)?;
        worksheet.set_column_width(col, column.width)?;
    }

    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                CellOut::Text(s) => {
                    worksheet.write_string(r, col, s)?;
                }
                CellOut::Number(n) => {
                    worksheet.write_number(r, col, *n)?;
                }
                CellOut::Empty => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[Column] = &[
        Column::new("수취인명", "recipientName", 12.0),
        Column::new("상품명", "productInfo", 30.0),
        Column::new("수량", "quantity", 8.0),
        Column::new("주문일", "orderDate", 12.0),
    ];

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(
            excel_serial_to_date(45658.0).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert!(excel_serial_to_date(-3.0).is_err());
    }

    #[test]
    fn test_cell_int() {
        assert_eq!(cell_int(&Data::Float(3.0)).unwrap(), Some(3));
        assert_eq!(cell_int(&Data::String("1,200".into())).unwrap(), Some(1200));
        assert!(cell_int(&Data::Float(2.5)).is_err());
        assert!(cell_int(&Data::String("abc".into())).is_err());
        assert_eq!(cell_int(&Data::Empty).unwrap(), None);
    }

    #[test]
    fn test_cell_date_from_text() {
        assert_eq!(
            cell_date(&Data::String("2025-02-03".into())).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 3)
        );
        assert!(cell_date(&Data::String("03/02/2025".into())).is_err());
    }

    #[test]
    fn test_written_sheet_reads_back_by_header_or_key() {
        // 第二列使用 key 作为表头
        let columns = [COLUMNS[0], Column::new("productInfo", "x", 10.0), COLUMNS[2]];
        let rows = vec![
            vec![CellOut::from("홍길동"), CellOut::from("사과 5kg"), CellOut::from(2i64)],
            vec![CellOut::Empty, CellOut::Empty, CellOut::Empty],
            vec![CellOut::from("김철수"), CellOut::from("배 3kg"), CellOut::from("x")],
        ];
        let bytes = write_sheet("Orders", &columns, &rows).unwrap();

        let parsed = read_rows(&bytes, COLUMNS).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].row_number, 2);
        assert_eq!(parsed[0].text("recipientName").as_deref(), Some("홍길동"));
        assert_eq!(parsed[0].text("productInfo").as_deref(), Some("사과 5kg"));
        assert_eq!(parsed[0].int("quantity").unwrap(), Some(2));
        // 空行被跳过，但行号保持表格中的位置
        assert_eq!(parsed[1].row_number, 4);
        assert!(parsed[1].int("quantity").is_err());
    }

    #[test]
    fn test_unknown_header_is_rejected() {
        let columns = [Column::new("foo", "foo", 10.0)];
        let bytes = write_sheet("S", &columns, &[vec![CellOut::from("1")]]).unwrap();
        assert!(read_rows(&bytes, COLUMNS).is_err());
    }
}
