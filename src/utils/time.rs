//! 日期边界工具。业务日期按服务器本地时区划分

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, Utc};

/// 本地日期 00:00 对应的 UTC 时刻
pub fn start_of_local_day(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    naive
        .and_local_timezone(Local)
        .earliest()
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// 包含 end 当天的区间上界（次日 00:00）
pub fn end_of_local_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_local_day(date.succ_opt().unwrap_or(date))
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn today_start() -> DateTime<Utc> {
    start_of_local_day(local_today())
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn previous_month_start(date: NaiveDate) -> NaiveDate {
    let first = month_start(date);
    let last_of_prev = first.pred_opt().unwrap_or(first);
    month_start(last_of_prev)
}

/// 上个月最后一天
pub fn previous_month_end(date: NaiveDate) -> NaiveDate {
    let first = month_start(date);
    first.pred_opt().unwrap_or(first)
}

pub fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_boundaries() {
        assert_eq!(month_start(d(2025, 3, 17)), d(2025, 3, 1));
        assert_eq!(previous_month_start(d(2025, 3, 17)), d(2025, 2, 1));
        assert_eq!(previous_month_end(d(2025, 3, 17)), d(2025, 2, 28));
        assert_eq!(previous_month_start(d(2025, 1, 5)), d(2024, 12, 1));
        assert_eq!(year_start(d(2024, 7, 9)), d(2024, 1, 1));
    }

    #[test]
    fn test_local_day_range_is_one_day() {
        let start = start_of_local_day(d(2025, 6, 1));
        let end = end_of_local_day(d(2025, 6, 1));
        assert_eq!((end - start).num_hours(), 24);
    }
}
